//! # Game Engine
//!
//! The lock-guarded owner of the [`World`]. Every mutation and every read goes
//! through one mutex, readers get deep copies, and events are sent only after
//! the lock is released.
//!
//! Ticks are all-or-nothing: the tick runs on a staged copy of the world and
//! the copy replaces the live world only when the tick returns normally. An
//! error or a panic leaves the previous state untouched.

use crate::config::ChaseConfig;
use crate::game::{Clock, Direction, GameStatus, SessionId, TickOutcome, World, WorldSnapshot};
use crate::{ChaseError, ChaseResult};
use crossbeam_channel::{Sender, TrySendError};
use log::{debug, error, info, warn};
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

/// Notifications published to observers.
#[derive(Debug, Clone)]
pub enum GameEvent {
    /// A tick completed
    Changed { tick: u64 },
    /// A fresh snapshot for renderers
    Render(Arc<WorldSnapshot>),
    /// The player animation advanced
    AnimationFrame { frame: u8 },
    /// The game ended by losing the last life or by request; offer a restart
    GameOver { score: u32 },
    /// The victory score was reached; offer name entry
    Victory { score: u32 },
}

impl GameEvent {
    pub fn is_terminal(&self) -> bool {
        matches!(self, GameEvent::GameOver { .. } | GameEvent::Victory { .. })
    }
}

/// Extracts a readable message from a panic payload.
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// Thread-safe world owner shared by the scheduler's workers.
#[derive(Debug)]
pub struct GameEngine {
    world: Mutex<Option<World>>,
    events: Sender<GameEvent>,
    retired: AtomicBool,
    config: ChaseConfig,
    clock: Arc<dyn Clock>,
}

impl GameEngine {
    /// Creates an engine with no game loaded.
    pub fn new(config: ChaseConfig, clock: Arc<dyn Clock>, events: Sender<GameEvent>) -> Self {
        Self {
            world: Mutex::new(None),
            events,
            retired: AtomicBool::new(false),
            config,
            clock,
        }
    }

    fn lock(&self) -> MutexGuard<'_, Option<World>> {
        self.world.lock().unwrap_or_else(|poisoned| {
            warn!("world lock poisoned, recovering last committed state");
            poisoned.into_inner()
        })
    }

    fn notify(&self, event: GameEvent) {
        match self.events.try_send(event) {
            Ok(()) => {}
            Err(TrySendError::Full(event)) => debug!("event channel full, dropping {:?}", event),
            Err(TrySendError::Disconnected(_)) => {}
        }
    }

    /// Generates a fresh world and replaces any previous one.
    pub fn initialize(&self, rows: usize, cols: usize) -> ChaseResult<SessionId> {
        let world = World::new(rows, cols, self.config.clone(), self.clock.clone())?;
        Ok(self.load(world))
    }

    /// Installs a prepared world.
    pub fn load(&self, world: World) -> SessionId {
        let session_id = world.session_id;
        *self.lock() = Some(world);
        self.retired.store(false, Ordering::SeqCst);
        session_id
    }

    /// Stops this engine from accepting any further mutation.
    pub fn retire(&self) {
        if !self.retired.swap(true, Ordering::SeqCst) {
            debug!("engine retired");
        }
    }

    pub fn is_retired(&self) -> bool {
        self.retired.load(Ordering::SeqCst)
    }

    /// Runs `apply` on a staged copy and commits it only if it succeeds.
    ///
    /// Returns `Ok(None)` when there is nothing to run against.
    fn commit<R>(
        &self,
        label: &str,
        apply: impl FnOnce(&mut World) -> ChaseResult<R>,
    ) -> ChaseResult<Option<R>> {
        if self.is_retired() {
            return Ok(None);
        }
        let mut guard = self.lock();
        let world = match guard.as_mut() {
            Some(world) => world,
            None => return Ok(None),
        };

        let mut staged = world.clone();
        match panic::catch_unwind(AssertUnwindSafe(|| apply(&mut staged))) {
            Ok(Ok(value)) => {
                *world = staged;
                Ok(Some(value))
            }
            Ok(Err(e)) => {
                warn!("{} rolled back: {}", label, e);
                Err(e)
            }
            Err(payload) => {
                let message = panic_message(payload.as_ref());
                error!("{} panicked and was rolled back: {}", label, message);
                Err(ChaseError::WorkerFault(format!("{} panicked: {}", label, message)))
            }
        }
    }

    /// Advances the world by one tick and publishes the result.
    pub fn tick(&self) -> ChaseResult<TickOutcome> {
        let committed = self.commit("tick", |world| {
            let outcome = world.tick()?;
            Ok((outcome, world.tick_count, world.score))
        })?;

        let (outcome, tick, score) = match committed {
            Some(result) => result,
            None => return Ok(TickOutcome::Skipped),
        };

        match outcome {
            TickOutcome::Skipped => {}
            TickOutcome::Continued => self.notify(GameEvent::Changed { tick }),
            TickOutcome::GameOver => {
                self.notify(GameEvent::Changed { tick });
                self.notify(GameEvent::GameOver { score });
            }
            TickOutcome::Victory => {
                self.notify(GameEvent::Changed { tick });
                self.notify(GameEvent::Victory { score });
            }
        }
        Ok(outcome)
    }

    /// Runs the respawn, power-up spawn and expiry steps between ticks.
    pub fn maintain(&self) -> ChaseResult<()> {
        self.commit("maintenance", |world| {
            world.run_maintenance();
            Ok(())
        })?;
        Ok(())
    }

    /// Buffers a player turn. Returns false when no game accepts input.
    pub fn request_player_direction(&self, direction: Direction) -> bool {
        if self.is_retired() {
            return false;
        }
        self.lock()
            .as_mut()
            .map_or(false, |world| world.request_direction(direction))
    }

    /// Ends the running game and publishes the game-over notification.
    pub fn end_game(&self) -> bool {
        if self.is_retired() {
            return false;
        }
        let ended = self
            .lock()
            .as_mut()
            .and_then(|world| world.end_game().then_some(world.score));
        match ended {
            Some(score) => {
                self.notify(GameEvent::GameOver { score });
                true
            }
            None => false,
        }
    }

    pub fn pause(&self) -> bool {
        let paused = !self.is_retired() && self.lock().as_mut().map_or(false, World::pause);
        if paused {
            info!("game paused");
        }
        paused
    }

    pub fn resume(&self) -> bool {
        let resumed = !self.is_retired() && self.lock().as_mut().map_or(false, World::resume);
        if resumed {
            info!("game resumed");
        }
        resumed
    }

    /// Advances the player animation and publishes the new frame.
    pub fn advance_animation(&self) -> Option<u8> {
        if self.is_retired() {
            return None;
        }
        let frame = self.lock().as_mut().and_then(World::advance_animation);
        if let Some(frame) = frame {
            self.notify(GameEvent::AnimationFrame { frame });
        }
        frame
    }

    /// Publishes a snapshot for renderers.
    pub fn publish_snapshot(&self) -> bool {
        if self.is_retired() {
            return false;
        }
        match self.snapshot() {
            Some(snapshot) => {
                self.notify(GameEvent::Render(Arc::new(snapshot)));
                true
            }
            None => false,
        }
    }

    /// Deep copy of the current world.
    pub fn snapshot(&self) -> Option<WorldSnapshot> {
        self.lock().as_ref().map(World::snapshot)
    }

    pub fn score(&self) -> u32 {
        self.lock().as_ref().map_or(0, |world| world.score)
    }

    pub fn lives(&self) -> u32 {
        self.lock().as_ref().map_or(0, |world| world.lives)
    }

    /// [`GameStatus::Menu`] until a game is initialised.
    pub fn status(&self) -> GameStatus {
        self.lock()
            .as_ref()
            .map_or(GameStatus::Menu, |world| world.status)
    }

    pub fn session_id(&self) -> Option<SessionId> {
        self.lock().as_ref().map(|world| world.session_id)
    }

    /// Reads the live world under the lock.
    pub fn inspect<R>(&self, read: impl FnOnce(&World) -> R) -> Option<R> {
        self.lock().as_ref().map(read)
    }

    /// Mutates the live world under the lock, bypassing tick staging.
    pub fn update<R>(&self, write: impl FnOnce(&mut World) -> R) -> Option<R> {
        if self.is_retired() {
            return None;
        }
        self.lock().as_mut().map(write)
    }

    pub fn config(&self) -> &ChaseConfig {
        &self.config
    }
}
