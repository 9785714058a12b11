//! End-to-end rule scenarios driven tick by tick on a manual clock.

use crossbeam_channel::{bounded, Receiver};
use mazechase::{
    CellContent, ChaseConfig, ChaseResult, Direction, GameEngine, GameEvent, GameStatus,
    ManualClock, Position, PowerUpKind, TickOutcome, PURSUER_POINTS,
};
use std::sync::Arc;

/// An engine on a generated board with random spawning switched off.
fn quiet_engine(rows: usize, cols: usize, seed: u64) -> (GameEngine, Arc<ManualClock>, Receiver<GameEvent>) {
    let clock = Arc::new(ManualClock::new());
    let (tx, rx) = bounded(256);
    let config = ChaseConfig {
        dot_respawn_chance: 0.0,
        power_up_spawn_chance: 0.0,
        ..ChaseConfig::for_testing(seed)
    };
    let engine = GameEngine::new(config, clock.clone(), tx);
    engine.initialize(rows, cols).unwrap();
    (engine, clock, rx)
}

/// Freezes every pursuer and returns an open neighbour of the player along
/// with the direction leading to it.
fn freeze_and_pick_step(engine: &GameEngine) -> (Position, Direction) {
    engine
        .update(|world| {
            for pursuer in &mut world.pursuers {
                pursuer.frozen = true;
                pursuer.frightened = false;
            }
            let here = world.player.position;
            let next = world.grid.passable_neighbors(here)[0];
            let direction = Direction::from_delta(next - here).unwrap();
            (next, direction)
        })
        .unwrap()
}

#[test]
fn frightened_catch_scores_and_relocates_pursuer() -> ChaseResult<()> {
    let (engine, _clock, _rx) = quiet_engine(20, 25, 2024);

    let spawn = engine.inspect(|w| w.grid.player_spawn()).unwrap();
    let spawn_content = engine.inspect(|w| w.grid.content(spawn).cloned()).unwrap();
    assert!(matches!(spawn_content, Some(CellContent::Empty | CellContent::Dot)));

    let (next, direction) = freeze_and_pick_step(&engine);
    engine.update(|world| {
        world.grid.set_content(next, CellContent::Empty);
        world.pursuers[0].position = next;
        world.pursuers[0].frightened = true;
        world.request_direction(direction);
    });

    let before = engine.score();
    assert_eq!(engine.tick()?, TickOutcome::Continued);
    assert_eq!(engine.score(), before + PURSUER_POINTS);

    let (slots, caught) = engine
        .inspect(|w| (w.spawn_slots.clone(), w.pursuers[0].clone()))
        .unwrap();
    assert_eq!(slots.len(), 8);
    assert!(slots.contains(&caught.position));
    assert!(!caught.frightened);
    assert_eq!(engine.lives(), 3);
    Ok(())
}

#[test]
fn power_pellet_frightens_every_pursuer_until_expiry() -> ChaseResult<()> {
    let (engine, clock, _rx) = quiet_engine(21, 27, 9);
    let (next, direction) = freeze_and_pick_step(&engine);
    engine.update(|world| {
        world.grid.set_content(next, CellContent::PowerPellet);
        world.request_direction(direction);
    });

    engine.tick()?;
    let snapshot = engine.snapshot().unwrap();
    assert_eq!(snapshot.score, 50);
    assert!(snapshot.pursuers.iter().all(|p| p.frightened));
    assert_eq!(snapshot.active_power_ups.len(), 1);
    assert_eq!(snapshot.active_power_ups[0].kind, PowerUpKind::PowerMode);
    assert_eq!(snapshot.active_power_ups[0].remaining_secs, 20);

    clock.set(19_999);
    engine.maintain()?;
    assert!(engine.snapshot().unwrap().pursuers.iter().all(|p| p.frightened));

    clock.set(20_000);
    engine.update(|world| world.player.stop());
    assert_eq!(engine.tick()?, TickOutcome::Continued);
    let snapshot = engine.snapshot().unwrap();
    assert!(snapshot.pursuers.iter().all(|p| !p.frightened));
    assert!(snapshot.active_power_ups.is_empty());
    Ok(())
}

#[test]
fn losing_every_life_ends_the_game_exactly_once() -> ChaseResult<()> {
    let (engine, clock, rx) = quiet_engine(21, 27, 31);
    freeze_and_pick_step(&engine);

    let mut outcomes = Vec::new();
    for _ in 0..3 {
        engine.update(|world| world.pursuers[1].position = world.player.position);
        clock.advance(80);
        outcomes.push(engine.tick()?);
    }
    assert_eq!(
        outcomes,
        vec![TickOutcome::Continued, TickOutcome::Continued, TickOutcome::GameOver]
    );
    assert_eq!(engine.lives(), 0);
    assert_eq!(engine.status(), GameStatus::GameOver);

    let frozen = engine.snapshot().unwrap();
    engine.request_player_direction(Direction::Left);
    clock.advance(80);
    assert_eq!(engine.tick()?, TickOutcome::Skipped);
    engine.maintain()?;
    assert!(!engine.end_game());
    assert_eq!(engine.snapshot().unwrap(), frozen);

    let game_overs = rx.try_iter().filter(|e| matches!(e, GameEvent::GameOver { .. })).count();
    assert_eq!(game_overs, 1);
    Ok(())
}

#[test]
fn life_loss_sends_everyone_home() -> ChaseResult<()> {
    let (engine, clock, _rx) = quiet_engine(21, 27, 5);
    let (next, direction) = freeze_and_pick_step(&engine);
    engine.update(|world| {
        world.pursuers[2].position = next;
        world.request_direction(direction);
    });

    clock.advance(80);
    engine.tick()?;
    let (player, spawn, pursuer, slot) = engine
        .inspect(|w| {
            (
                w.player.position,
                w.grid.player_spawn(),
                w.pursuers[2].position,
                w.spawn_slots[2],
            )
        })
        .unwrap();
    assert_eq!(engine.lives(), 2);
    assert_eq!(player, spawn);
    assert_eq!(pursuer, slot);
    Ok(())
}

#[test]
fn respawn_is_gated_by_interval() -> ChaseResult<()> {
    let clock = Arc::new(ManualClock::new());
    let (tx, _rx) = bounded(16);
    let config = ChaseConfig {
        dot_respawn_chance: 1.0,
        power_up_spawn_chance: 0.0,
        ..ChaseConfig::for_testing(12)
    };
    let engine = GameEngine::new(config, clock.clone(), tx);
    engine.initialize(21, 27)?;
    engine.update(|world| {
        let collectibles: Vec<Position> = world
            .grid
            .positions()
            .filter(|&p| world.grid.content(p).map_or(false, |c| c.is_collectible()))
            .collect();
        for pos in collectibles {
            world.grid.set_content(pos, CellContent::Empty);
        }
    });

    clock.set(4_999);
    engine.maintain()?;
    let dots = |engine: &GameEngine| {
        engine
            .inspect(|w| w.grid.count_content(|c| c.is_collectible()))
            .unwrap()
    };
    assert_eq!(dots(&engine), 0);

    clock.set(5_000);
    engine.maintain()?;
    let after_first = engine.snapshot().unwrap().board;
    assert!(dots(&engine) > 0);

    engine.maintain()?;
    assert_eq!(engine.snapshot().unwrap().board, after_first);

    let (player, pursuers) = engine
        .inspect(|w| (w.player.position, w.pursuers.iter().map(|p| p.position).collect::<Vec<_>>()))
        .unwrap();
    for pos in after_first.positions().filter(|&p| {
        after_first.content(p).map_or(false, |c| c.is_collectible())
    }) {
        assert!(pos.manhattan_distance(player) >= 3);
        assert!(pursuers.iter().all(|&q| pos.manhattan_distance(q) >= 2));
    }
    Ok(())
}

#[test]
fn respawn_leaves_a_full_board_alone() -> ChaseResult<()> {
    let clock = Arc::new(ManualClock::new());
    let (tx, _rx) = bounded(16);
    let config = ChaseConfig {
        dot_respawn_chance: 1.0,
        power_up_spawn_chance: 0.0,
        ..ChaseConfig::for_testing(88)
    };
    let engine = GameEngine::new(config, clock.clone(), tx);
    engine.initialize(21, 27)?;
    let fresh = engine.snapshot().unwrap().board;

    for round in 1..=4 {
        clock.set(round * 5_000);
        engine.maintain()?;
        assert_eq!(engine.snapshot().unwrap().board, fresh);
    }
    Ok(())
}

#[test]
fn identical_seeds_play_identically() -> ChaseResult<()> {
    let run = || -> ChaseResult<_> {
        let (engine, clock, _rx) = quiet_engine(25, 31, 4242);
        let turns = [Direction::Left, Direction::Up, Direction::Right, Direction::Down];
        for step in 0..60 {
            if step % 15 == 0 {
                engine.request_player_direction(turns[step / 15]);
            }
            clock.advance(80);
            engine.tick()?;
        }
        let snapshot = engine.snapshot().unwrap();
        Ok((snapshot.board, snapshot.player.position, snapshot.pursuers, snapshot.score, snapshot.lives))
    };
    assert_eq!(run()?, run()?);
    Ok(())
}
