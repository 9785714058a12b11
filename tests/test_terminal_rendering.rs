//! Integration test for terminal rendering of world snapshots.

use crossbeam_channel::bounded;
use mazechase::{
    AsciiDisplay, CellContent, ChaseConfig, ChaseResult, Direction, GameEngine, ManualClock,
    PowerUp, PowerUpKind,
};
use std::sync::Arc;

fn engine_with_board(rows: usize, cols: usize, seed: u64) -> ChaseResult<GameEngine> {
    let (tx, _rx) = bounded(8);
    let config = ChaseConfig {
        dot_respawn_chance: 0.0,
        power_up_spawn_chance: 0.0,
        ..ChaseConfig::for_testing(seed)
    };
    let engine = GameEngine::new(config, Arc::new(ManualClock::new()), tx);
    engine.initialize(rows, cols)?;
    Ok(engine)
}

#[test]
fn test_board_frame_matches_snapshot() -> ChaseResult<()> {
    let engine = engine_with_board(11, 15, 12345)?;
    let snapshot = engine.snapshot().unwrap();
    let display = AsciiDisplay::new();

    let board = display.render_board(&snapshot);
    let lines: Vec<&str> = board.lines().collect();
    assert_eq!(lines.len(), 11);
    assert!(lines.iter().all(|line| line.chars().count() == 15));
    assert!(lines[0].chars().all(|c| c == '#'));
    assert!(lines[10].chars().all(|c| c == '#'));

    assert_eq!(board.matches('C').count(), 1);
    let player = snapshot.player.position;
    assert_eq!(lines[player.row as usize].chars().nth(player.col as usize), Some('C'));

    let first = snapshot.pursuers[0].position;
    let glyph = lines[first.row as usize].chars().nth(first.col as usize);
    assert!(matches!(glyph, Some('0'..='3')));
    assert!(board.contains('.'));
    Ok(())
}

#[test]
fn test_status_line_reports_power_ups() -> ChaseResult<()> {
    let engine = engine_with_board(15, 15, 7)?;
    engine.update(|world| {
        for pursuer in &mut world.pursuers {
            pursuer.frozen = true;
        }
        let here = world.player.position;
        let next = world.grid.passable_neighbors(here)[0];
        world.grid.set_content(
            next,
            CellContent::PowerUp(PowerUp::new(PowerUpKind::DoublePoints, 0)),
        );
        if let Some(direction) = Direction::from_delta(next - here) {
            world.request_direction(direction);
        }
    });
    engine.tick()?;

    let snapshot = engine.snapshot().unwrap();
    let status = AsciiDisplay::new().render_status(&snapshot);
    assert!(status.starts_with("Score: 200  Lives: 3  Time: 00:00  PLAYING"));
    assert!(status.contains("[Double Points 15s]"));
    Ok(())
}

#[test]
fn test_full_frame_includes_messages() -> ChaseResult<()> {
    let engine = engine_with_board(12, 12, 3)?;
    engine.end_game();
    let mut display = AsciiDisplay::new();
    display.add_message("first");
    display.add_message("second");

    let frame = display.render_game(&engine.snapshot().unwrap());
    assert!(frame.contains("GAME OVER"));
    assert!(frame.ends_with("first\nsecond\n"));
    Ok(())
}
