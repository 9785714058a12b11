//! # Game Session
//!
//! The controller outer layers talk to. A session owns the current engine and
//! the scheduler driving it, validates board sizes, and makes sure a restart
//! fully stops the previous game's workers before the next world exists.

use crate::config::{self, ChaseConfig};
use crate::game::{
    Clock, Direction, GameEngine, GameEvent, GameStatus, Scheduler, SessionId, StopReport,
    SystemClock, WorldSnapshot,
};
use crate::input::Intent;
use crate::{ChaseError, ChaseResult};
use crossbeam_channel::{bounded, Receiver, Sender};
use log::info;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

/// Names of the four periodic workers, in start order.
pub const WORKER_NAMES: [&str; 4] = ["logic", "animation", "spawn-maintenance", "render"];

struct ActiveGame {
    session_id: SessionId,
    rows: usize,
    cols: usize,
    engine: Arc<GameEngine>,
    scheduler: Scheduler,
}

impl ActiveGame {
    /// Retires the engine first so no worker can mutate it while stopping.
    fn shut_down(&self) -> StopReport {
        self.engine.retire();
        self.scheduler.stop()
    }
}

/// A running chase game and its workers.
///
/// # Examples
///
/// ```no_run
/// use mazechase::{ChaseConfig, Direction, GameSession};
///
/// let session = GameSession::new(ChaseConfig::default());
/// session.start_game(21, 27).unwrap();
/// session.set_direction_intent(Direction::Left);
/// let snapshot = session.snapshot().unwrap();
/// println!("score {}", snapshot.score);
/// session.stop();
/// ```
pub struct GameSession {
    config: ChaseConfig,
    events_tx: Sender<GameEvent>,
    events_rx: Receiver<GameEvent>,
    current: Mutex<Option<ActiveGame>>,
}

impl GameSession {
    pub fn new(config: ChaseConfig) -> Self {
        let (events_tx, events_rx) = bounded(config.event_capacity.max(1));
        Self {
            config,
            events_tx,
            events_rx,
            current: Mutex::new(None),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Option<ActiveGame>> {
        self.current.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn config(&self) -> &ChaseConfig {
        &self.config
    }

    /// Checks a requested board size against the supported range.
    pub fn validate_dimensions(rows: usize, cols: usize) -> ChaseResult<()> {
        let range = config::MIN_BOARD_DIMENSION..=config::MAX_BOARD_DIMENSION;
        if range.contains(&rows) && range.contains(&cols) {
            Ok(())
        } else {
            Err(ChaseError::InvalidDimension {
                rows,
                cols,
                min: config::MIN_BOARD_DIMENSION,
                max: config::MAX_BOARD_DIMENSION,
            })
        }
    }

    /// Starts a new game, stopping any previous one first.
    ///
    /// An invalid size is rejected before anything changes, so the previous
    /// game keeps running.
    pub fn start_game(&self, rows: usize, cols: usize) -> ChaseResult<SessionId> {
        Self::validate_dimensions(rows, cols)?;

        let mut current = self.lock();
        if let Some(previous) = current.take() {
            let report = previous.shut_down();
            info!(
                "session {} replaced ({} workers joined, {} abandoned)",
                previous.session_id,
                report.joined.len(),
                report.abandoned.len()
            );
        }
        // Whatever is still queued belongs to the superseded game.
        while self.events_rx.try_recv().is_ok() {}

        let clock: Arc<dyn Clock> = Arc::new(SystemClock::new());
        let engine = Arc::new(GameEngine::new(
            self.config.clone(),
            clock,
            self.events_tx.clone(),
        ));
        let session_id = engine.initialize(rows, cols)?;
        let scheduler = self.build_scheduler(&engine);
        scheduler.start()?;

        *current = Some(ActiveGame {
            session_id,
            rows,
            cols,
            engine,
            scheduler,
        });
        info!("session {} running on a {}x{} board", session_id, rows, cols);
        Ok(session_id)
    }

    fn build_scheduler(&self, engine: &Arc<GameEngine>) -> Scheduler {
        let scheduler = Scheduler::new(self.config.join_timeout());
        let cadence = Duration::from_millis;

        let logic = engine.clone();
        scheduler.add_worker(
            WORKER_NAMES[0],
            cadence(self.config.logic_cadence_ms),
            Box::new(move || logic.tick().map(|_| ())),
        );

        let animation = engine.clone();
        scheduler.add_worker(
            WORKER_NAMES[1],
            cadence(self.config.animation_cadence_ms),
            Box::new(move || {
                animation.advance_animation();
                Ok(())
            }),
        );

        let maintenance = engine.clone();
        scheduler.add_worker(
            WORKER_NAMES[2],
            cadence(self.config.spawn_cadence_ms),
            Box::new(move || maintenance.maintain()),
        );

        let render = engine.clone();
        scheduler.add_worker(
            WORKER_NAMES[3],
            cadence(self.config.render_cadence_ms),
            Box::new(move || {
                render.publish_snapshot();
                Ok(())
            }),
        );

        scheduler
    }

    fn with_game<R>(&self, action: impl FnOnce(&ActiveGame) -> R) -> Option<R> {
        self.lock().as_ref().map(action)
    }

    /// Buffers a player turn. Ignored when no game is active.
    pub fn set_direction_intent(&self, direction: Direction) -> bool {
        self.with_game(|game| game.engine.request_player_direction(direction))
            .unwrap_or(false)
    }

    /// Pauses the game clock and every worker.
    pub fn pause(&self) -> bool {
        self.with_game(|game| {
            let paused = game.engine.pause();
            if paused {
                game.scheduler.pause();
            }
            paused
        })
        .unwrap_or(false)
    }

    pub fn resume(&self) -> bool {
        self.with_game(|game| {
            let resumed = game.engine.resume();
            if resumed {
                game.scheduler.resume();
            }
            resumed
        })
        .unwrap_or(false)
    }

    /// Pauses a playing game or resumes a paused one.
    pub fn toggle_pause(&self) -> bool {
        match self.status() {
            GameStatus::Playing => self.pause(),
            GameStatus::Paused => self.resume(),
            _ => false,
        }
    }

    /// Stops the workers. The last snapshot stays readable.
    pub fn stop(&self) -> StopReport {
        self.with_game(ActiveGame::shut_down).unwrap_or_default()
    }

    /// Ends the game now and publishes the game-over notification.
    pub fn end_game(&self) -> bool {
        self.with_game(|game| game.engine.end_game())
            .unwrap_or(false)
    }

    pub fn snapshot(&self) -> Option<WorldSnapshot> {
        self.with_game(|game| game.engine.snapshot()).flatten()
    }

    /// [`GameStatus::Menu`] before the first game.
    pub fn status(&self) -> GameStatus {
        self.with_game(|game| game.engine.status())
            .unwrap_or(GameStatus::Menu)
    }

    pub fn session_id(&self) -> Option<SessionId> {
        self.with_game(|game| game.session_id)
    }

    /// Whether workers are currently driving a game.
    pub fn is_active(&self) -> bool {
        self.with_game(|game| game.scheduler.is_running())
            .unwrap_or(false)
    }

    /// A receiver for session events. Every clone competes for the same events.
    pub fn events(&self) -> Receiver<GameEvent> {
        self.events_rx.clone()
    }

    /// The engine of the current game.
    pub fn engine(&self) -> Option<Arc<GameEngine>> {
        self.with_game(|game| game.engine.clone())
    }

    /// Applies one intent. Returns false once the session should close.
    ///
    /// `NewGame` reuses the current board size, or the default size before
    /// the first game.
    pub fn apply_intent(&self, intent: Intent) -> ChaseResult<bool> {
        match intent {
            Intent::Move(direction) => {
                self.set_direction_intent(direction);
            }
            Intent::TogglePause => {
                self.toggle_pause();
            }
            // steering is owned by the front end
            Intent::ToggleAutopilot => {}
            Intent::NewGame => {
                let (rows, cols) = self
                    .with_game(|game| (game.rows, game.cols))
                    .unwrap_or((config::DEFAULT_ROWS, config::DEFAULT_COLS));
                self.start_game(rows, cols)?;
            }
            Intent::Quit => {
                self.stop();
                return Ok(false);
            }
        }
        Ok(true)
    }
}

impl Drop for GameSession {
    fn drop(&mut self) {
        self.stop();
    }
}
