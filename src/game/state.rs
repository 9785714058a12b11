//! # World State Module
//!
//! The world model: grid, player, pursuers, score, lives, time and the active
//! power-up list, plus the rules that advance them one tick at a time.
//!
//! A tick runs a fixed sequence:
//!
//! 1. advance elapsed time
//! 2. move the player and collect whatever lies on the destination
//! 3. let every non-frozen pursuer decide and attempt a move
//! 4. resolve player/pursuer collisions
//! 5. respawn dots and pellets (interval gated)
//! 6. spawn a power-up (interval gated)
//! 7. expire power-ups and revert their effects
//! 8. restamp occupant tags
//!
//! `World` itself is not synchronised. [`crate::GameEngine`] owns it behind a
//! lock and commits a tick only when it completes.

use crate::config::{self, ChaseConfig};
use crate::game::{
    decide, ActivePowerUpView, CellContent, CellKind, Clock, Direction, Grid, Occupant, Player,
    Position, PowerUp, PowerUpKind, Pursuer, PursuerView, SessionId,
};
use crate::utils::nearest_passable;
use crate::{generate_maze, new_session_id, ChaseError, ChaseResult};
use log::{debug, info};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Lifecycle of a game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameStatus {
    Menu,
    Playing,
    Paused,
    GameOver,
    Victory,
}

impl GameStatus {
    /// Whether the game has ended.
    pub fn is_terminal(self) -> bool {
        matches!(self, GameStatus::GameOver | GameStatus::Victory)
    }
}

/// What a call to [`World::tick`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// The game was not playing; nothing changed
    Skipped,
    /// The world advanced and the game goes on
    Continued,
    /// This tick took the last life
    GameOver,
    /// This tick reached the victory score
    Victory,
}

/// Running totals for one game.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChaseStatistics {
    pub dots_eaten: u32,
    pub pellets_eaten: u32,
    pub power_ups_collected: u32,
    pub pursuers_caught: u32,
    pub lives_lost: u32,
    pub steps_taken: u64,
}

/// The complete mutable state of one game.
#[derive(Debug, Clone)]
pub struct World {
    pub session_id: SessionId,
    pub grid: Grid,
    pub player: Player,
    pub pursuers: Vec<Pursuer>,
    /// Pursuer reset positions spread over the maze's corners and edges
    pub spawn_slots: Vec<Position>,
    pub score: u32,
    pub lives: u32,
    pub status: GameStatus,
    pub elapsed_ms: u64,
    pub active_power_ups: Vec<PowerUp>,
    pub tick_count: u64,
    pub statistics: ChaseStatistics,
    start_ms: u64,
    last_dot_respawn_ms: u64,
    last_power_up_spawn_ms: u64,
    rng: StdRng,
    clock: Arc<dyn Clock>,
    config: ChaseConfig,
}

impl World {
    /// Generates a maze and populates it.
    ///
    /// Uses `config.seed` when set, a random seed otherwise.
    pub fn new(
        rows: usize,
        cols: usize,
        config: ChaseConfig,
        clock: Arc<dyn Clock>,
    ) -> ChaseResult<Self> {
        let seed = config.seed.unwrap_or_else(rand::random);
        let grid = generate_maze(rows, cols, seed)?;
        Ok(Self::with_grid(grid, config, clock, seed))
    }

    /// Populates an existing board: player at its spawn, pursuers on the
    /// first spawn slots.
    pub fn with_grid(grid: Grid, config: ChaseConfig, clock: Arc<dyn Clock>, seed: u64) -> Self {
        let now = clock.now_ms();
        let spawn_slots = Self::find_spawn_slots(&grid);
        let pursuers: Vec<Pursuer> = (0..config::PURSUER_COUNT)
            .map(|id| Pursuer::new(id, spawn_slots[id % spawn_slots.len()], seed, now))
            .collect();

        let mut world = Self {
            session_id: new_session_id(),
            player: Player::new(grid.player_spawn()),
            grid,
            pursuers,
            spawn_slots,
            score: 0,
            lives: config.initial_lives,
            status: GameStatus::Playing,
            elapsed_ms: 0,
            active_power_ups: Vec::new(),
            tick_count: 0,
            statistics: ChaseStatistics::default(),
            start_ms: now,
            last_dot_respawn_ms: now,
            last_power_up_spawn_ms: now,
            rng: StdRng::seed_from_u64(seed.wrapping_add(0x9e37_79b9)),
            clock,
            config,
        };
        world.stamp_occupants();
        info!(
            "session {} started on a {}x{} board, {} lives",
            world.session_id,
            world.grid.rows(),
            world.grid.cols(),
            world.lives
        );
        world
    }

    /// Nearest passable cells to eight areas: the four inner corners, the
    /// middles of the left and right edges, and the middles of the top and
    /// bottom edges.
    pub fn find_spawn_slots(grid: &Grid) -> Vec<Position> {
        let last_row = grid.rows() as i32 - 2;
        let last_col = grid.cols() as i32 - 2;
        let mid_row = grid.rows() as i32 / 2;
        let mid_col = grid.cols() as i32 / 2;
        let areas = [
            (1, 1),
            (1, last_col),
            (last_row, 1),
            (last_row, last_col),
            (mid_row, 1),
            (mid_row, last_col),
            (1, mid_col),
            (last_row, mid_col),
        ];

        let slots: Vec<Position> = areas
            .iter()
            .filter_map(|&(row, col)| {
                let area = Position::new(
                    row.clamp(0, grid.rows() as i32 - 1),
                    col.clamp(0, grid.cols() as i32 - 1),
                );
                nearest_passable(grid, area)
            })
            .collect();

        if slots.is_empty() {
            vec![grid.pursuer_anchor()]
        } else {
            slots
        }
    }

    pub fn config(&self) -> &ChaseConfig {
        &self.config
    }

    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }

    pub fn now_ms(&self) -> u64 {
        self.clock.now_ms()
    }

    /// Buffers a player turn. Accepted while playing or paused.
    pub fn request_direction(&mut self, direction: Direction) -> bool {
        match self.status {
            GameStatus::Playing | GameStatus::Paused => {
                self.player.request_direction(direction);
                true
            }
            _ => false,
        }
    }

    /// Freezes the game and its clock. Returns false when not playing.
    pub fn pause(&mut self) -> bool {
        if self.status != GameStatus::Playing {
            return false;
        }
        self.status = GameStatus::Paused;
        self.clock.pause();
        true
    }

    /// Returns false when not paused.
    pub fn resume(&mut self) -> bool {
        if self.status != GameStatus::Paused {
            return false;
        }
        self.clock.resume();
        self.status = GameStatus::Playing;
        true
    }

    /// Ends a running game. Returns false when it had already ended.
    pub fn end_game(&mut self) -> bool {
        if self.status.is_terminal() {
            return false;
        }
        if self.status == GameStatus::Paused {
            self.clock.resume();
        }
        self.status = GameStatus::GameOver;
        info!("session {} ended with score {}", self.session_id, self.score);
        true
    }

    /// Advances the player animation while playing.
    pub fn advance_animation(&mut self) -> Option<u8> {
        if self.status == GameStatus::Playing {
            Some(self.player.advance_animation())
        } else {
            None
        }
    }

    /// Advances the world by one tick.
    pub fn tick(&mut self) -> ChaseResult<TickOutcome> {
        if self.status != GameStatus::Playing {
            return Ok(TickOutcome::Skipped);
        }

        let now = self.clock.now_ms();
        self.elapsed_ms = now.saturating_sub(self.start_ms);
        self.tick_count += 1;

        self.move_player(now);
        self.move_pursuers(now);

        if let Some(outcome) = self.resolve_collisions() {
            self.stamp_occupants();
            return Ok(outcome);
        }

        if let Some(target) = self.config.victory_score {
            if self.score >= target {
                self.status = GameStatus::Victory;
                info!("session {} won with score {}", self.session_id, self.score);
                self.stamp_occupants();
                return Ok(TickOutcome::Victory);
            }
        }

        self.maintain_at(now);
        self.stamp_occupants();
        self.check_invariants()?;
        Ok(TickOutcome::Continued)
    }

    /// Runs the interval-gated spawn and expiry steps outside a tick.
    pub fn run_maintenance(&mut self) {
        if self.status != GameStatus::Playing {
            return;
        }
        let now = self.clock.now_ms();
        self.maintain_at(now);
        self.stamp_occupants();
    }

    fn maintain_at(&mut self, now: u64) {
        self.respawn_collectibles(now);
        self.spawn_power_up(now);
        self.expire_power_ups(now);
    }

    fn player_can_enter(&self, pos: Position) -> bool {
        if self.player.can_pass_walls {
            self.grid.is_valid_position(pos)
        } else {
            self.grid.is_passable(pos)
        }
    }

    fn move_player(&mut self, now: u64) {
        let here = self.player.position;
        if let Some(next) = self.player.next_direction {
            if self.player_can_enter(here.step(next)) {
                self.player.current_direction = Some(next);
                self.player.next_direction = None;
            }
        }

        if let Some(direction) = self.player.current_direction {
            let target = here.step(direction);
            if self.player_can_enter(target) {
                self.player.position = target;
                self.statistics.steps_taken += 1;
                self.collect_at(target, now);
            }
        }

        if self.player.magnet {
            for pos in self.player.position.cardinal_adjacent_positions() {
                if self.grid.content(pos) == Some(&CellContent::Dot) {
                    self.collect_at(pos, now);
                }
            }
        }
    }

    fn collect_at(&mut self, pos: Position, now: u64) {
        let content = match self.grid.get_mut(pos) {
            Some(cell) if cell.content.is_collectible() => {
                std::mem::replace(&mut cell.content, CellContent::Empty)
            }
            _ => return,
        };

        let points = match content {
            CellContent::Dot => {
                self.statistics.dots_eaten += 1;
                config::DOT_POINTS
            }
            CellContent::PowerPellet => {
                self.statistics.pellets_eaten += 1;
                self.activate_power_up(PowerUp::new(PowerUpKind::PowerMode, now), now);
                config::PELLET_POINTS
            }
            CellContent::PowerUp(power_up) => {
                self.statistics.power_ups_collected += 1;
                self.activate_power_up(power_up, now);
                config::POWER_UP_POINTS
            }
            CellContent::Empty | CellContent::Wall => 0,
        };

        let multiplier = if self.player.double_points { 2 } else { 1 };
        self.score += points * multiplier;
    }

    fn activate_power_up(&mut self, mut power_up: PowerUp, now: u64) {
        power_up.activate(now);
        debug!("power-up {:?} activated at {} ms", power_up.kind, now);
        match power_up.kind {
            PowerUpKind::SpeedBoost => self.player.speed_multiplier = 1.5,
            PowerUpKind::PursuerFreeze => self.pursuers.iter_mut().for_each(|p| p.frozen = true),
            PowerUpKind::DoublePoints => self.player.double_points = true,
            PowerUpKind::ExtraLife => self.lives += 1,
            PowerUpKind::PowerMode => self.pursuers.iter_mut().for_each(|p| p.frightened = true),
            PowerUpKind::WallPass => self.player.can_pass_walls = true,
            PowerUpKind::PointMagnet => self.player.magnet = true,
        }
        if power_up.is_active() {
            self.active_power_ups.push(power_up);
        }
    }

    fn move_pursuers(&mut self, now: u64) {
        let interval = self.config.decision_interval_ms;
        for pursuer in &mut self.pursuers {
            if pursuer.frozen {
                continue;
            }
            let direction = decide(pursuer, &self.grid, &self.player, now, interval);
            let target = pursuer.position.step(direction);
            if self.grid.is_passable(target) {
                pursuer.position = target;
            }
        }
    }

    fn slot_for(&self, id: usize) -> Position {
        self.spawn_slots[id % self.spawn_slots.len()]
    }

    /// First slot from `id % len` onward that is more than one step from the
    /// player. Falls back to the pursuer's own slot when none qualifies.
    fn slot_clear_of_player(&self, id: usize) -> Position {
        let len = self.spawn_slots.len();
        (0..len)
            .map(|offset| self.spawn_slots[(id + offset) % len])
            .find(|slot| slot.manhattan_distance(self.player.position) > 1)
            .unwrap_or_else(|| self.slot_for(id))
    }

    /// Returns the terminal outcome when a collision ended the game.
    fn resolve_collisions(&mut self) -> Option<TickOutcome> {
        for index in 0..self.pursuers.len() {
            if self.pursuers[index].position != self.player.position {
                continue;
            }

            if self.pursuers[index].frightened {
                self.score += config::PURSUER_POINTS;
                self.statistics.pursuers_caught += 1;
                let slot = self.slot_clear_of_player(self.pursuers[index].id);
                let pursuer = &mut self.pursuers[index];
                pursuer.position = slot;
                pursuer.reset();
                debug!("pursuer {} caught, back to {}", pursuer.id, slot);
                continue;
            }

            self.lives = self.lives.saturating_sub(1);
            self.statistics.lives_lost += 1;
            if self.lives == 0 {
                self.status = GameStatus::GameOver;
                info!("session {} over with score {}", self.session_id, self.score);
                return Some(TickOutcome::GameOver);
            }
            debug!("life lost, {} remaining", self.lives);
            self.reset_positions();
            break;
        }
        None
    }

    /// Sends the player back to its spawn and every pursuer to its slot.
    pub fn reset_positions(&mut self) {
        self.player.position = self.grid.player_spawn();
        self.player.stop();
        for index in 0..self.pursuers.len() {
            let slot = self.slot_for(self.pursuers[index].id);
            self.pursuers[index].position = slot;
        }
    }

    /// Cells a collectible or power-up may appear on: empty interior cells at
    /// least 3 steps from the player and 2 from every pursuer.
    pub fn spawn_candidates(&self) -> Vec<Position> {
        self.grid
            .interior_positions()
            .filter(|&pos| self.grid.content(pos) == Some(&CellContent::Empty))
            .filter(|&pos| pos.manhattan_distance(self.player.position) >= 3)
            .filter(|&pos| {
                self.pursuers
                    .iter()
                    .all(|p| pos.manhattan_distance(p.position) >= 2)
            })
            .collect()
    }

    fn respawn_collectibles(&mut self, now: u64) {
        if now.saturating_sub(self.last_dot_respawn_ms) < self.config.dot_respawn_interval_ms {
            return;
        }
        self.last_dot_respawn_ms = now;

        let mut placed = 0;
        for pos in self.spawn_candidates() {
            if self.rng.gen::<f64>() >= self.config.dot_respawn_chance {
                continue;
            }
            let content = if self.rng.gen::<f64>() < 0.9 {
                CellContent::Dot
            } else {
                CellContent::PowerPellet
            };
            self.grid.set_content(pos, content);
            placed += 1;
        }
        if placed > 0 {
            debug!("respawned {} collectibles", placed);
        }
    }

    fn spawn_power_up(&mut self, now: u64) {
        if now.saturating_sub(self.last_power_up_spawn_ms) < self.config.power_up_spawn_interval_ms {
            return;
        }
        self.last_power_up_spawn_ms = now;

        if self.rng.gen::<f64>() >= self.config.power_up_spawn_chance {
            return;
        }
        let candidates = self.spawn_candidates();
        if candidates.is_empty() {
            return;
        }
        let pos = candidates[self.rng.gen_range(0..candidates.len())];
        let kind = PowerUpKind::ALL[self.rng.gen_range(0..PowerUpKind::ALL.len())];
        self.grid
            .set_content(pos, CellContent::PowerUp(PowerUp::new(kind, now)));
        debug!("spawned {:?} at {}", kind, pos);
    }

    fn expire_power_ups(&mut self, now: u64) {
        let (expired, remaining): (Vec<PowerUp>, Vec<PowerUp>) = self
            .active_power_ups
            .drain(..)
            .partition(|p| p.is_expired(now));
        self.active_power_ups = remaining;

        for mut power_up in expired {
            power_up.deactivate();
            let still_active = self
                .active_power_ups
                .iter()
                .any(|p| p.kind == power_up.kind);
            if !still_active {
                self.revert_effect(power_up.kind);
            }
            debug!("power-up {:?} expired", power_up.kind);
        }
    }

    fn revert_effect(&mut self, kind: PowerUpKind) {
        match kind {
            PowerUpKind::SpeedBoost => self.player.speed_multiplier = 1.0,
            PowerUpKind::PursuerFreeze => self.pursuers.iter_mut().for_each(|p| p.frozen = false),
            PowerUpKind::DoublePoints => self.player.double_points = false,
            PowerUpKind::ExtraLife => {}
            PowerUpKind::PowerMode => self.pursuers.iter_mut().for_each(|p| p.frightened = false),
            PowerUpKind::WallPass => {
                self.player.can_pass_walls = false;
                if !self.grid.is_passable(self.player.position) {
                    let escape = nearest_passable(&self.grid, self.player.position)
                        .unwrap_or_else(|| self.grid.player_spawn());
                    debug!("wall pass ended inside a wall, moving player to {}", escape);
                    self.player.position = escape;
                    self.player.stop();
                }
            }
            PowerUpKind::PointMagnet => self.player.magnet = false,
        }
    }

    /// Clears stale occupant tags and stamps the current positions.
    pub fn stamp_occupants(&mut self) {
        self.grid.clear_occupants();
        for pursuer in &self.pursuers {
            self.grid
                .stamp_occupant(pursuer.position, Occupant::Pursuer(pursuer.id));
        }
        self.grid.stamp_occupant(self.player.position, Occupant::Player);
    }

    fn check_invariants(&self) -> ChaseResult<()> {
        if !self.grid.is_valid_position(self.player.position) {
            return Err(ChaseError::InvalidState(format!(
                "player left the board at {}",
                self.player.position
            )));
        }
        if let Some(stray) = self.pursuers.iter().find(|p| !self.grid.is_passable(p.position)) {
            return Err(ChaseError::InvalidState(format!(
                "pursuer {} stands in a wall at {}",
                stray.id, stray.position
            )));
        }
        Ok(())
    }

    /// Deep copy of everything an observer may read.
    pub fn snapshot(&self) -> WorldSnapshot {
        let now = self.clock.now_ms();
        WorldSnapshot {
            session_id: self.session_id,
            board: self.grid.clone(),
            player: self.player.clone(),
            pursuers: self.pursuers.iter().map(Pursuer::view).collect(),
            score: self.score,
            lives: self.lives,
            elapsed_ms: self.elapsed_ms,
            status: self.status,
            active_power_ups: self
                .active_power_ups
                .iter()
                .map(|p| ActivePowerUpView {
                    kind: p.kind,
                    remaining_secs: p.remaining_secs(now),
                })
                .collect(),
            tick: self.tick_count,
            statistics: self.statistics.clone(),
        }
    }
}

/// Immutable copy of the world handed to renderers and other observers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorldSnapshot {
    pub session_id: SessionId,
    pub board: Grid,
    pub player: Player,
    pub pursuers: Vec<PursuerView>,
    pub score: u32,
    pub lives: u32,
    pub elapsed_ms: u64,
    pub status: GameStatus,
    pub active_power_ups: Vec<ActivePowerUpView>,
    pub tick: u64,
    pub statistics: ChaseStatistics,
}

impl WorldSnapshot {
    /// The board as rendered cell tags.
    pub fn cell_kinds(&self) -> Vec<Vec<CellKind>> {
        self.board.kinds()
    }

    pub fn to_json(&self) -> ChaseResult<String> {
        Ok(serde_json::to_string(self)?)
    }
}
