//! High-score persistence round trips through real files.

use mazechase::{ChaseError, ChaseResult, HighScoreTable, MAX_HIGH_SCORES};
use tempfile::tempdir;

#[test]
fn table_survives_save_and_load() -> ChaseResult<()> {
    let dir = tempdir()?;
    let path = dir.path().join("scores.json");

    let mut table = HighScoreTable::new();
    table.add_at("ada", 1500, 10)?;
    table.add_at("bob", 900, 20)?;
    table.add_at("cy", 1500, 5)?;
    table.save_to_path(&path)?;

    let loaded = HighScoreTable::load_from_path(&path)?;
    assert_eq!(loaded, table);
    let names: Vec<&str> = loaded.entries().iter().map(|e| e.name.as_str()).collect();
    assert_eq!(names, ["cy", "ada", "bob"]);
    Ok(())
}

#[test]
fn missing_file_is_an_empty_table() -> ChaseResult<()> {
    let dir = tempdir()?;
    let table = HighScoreTable::load_from_path(dir.path().join("absent.json"))?;
    assert!(table.is_empty());
    assert!(table.is_high_score(0));
    Ok(())
}

#[test]
fn hand_edited_file_is_reordered_and_capped() -> ChaseResult<()> {
    let dir = tempdir()?;
    let path = dir.path().join("scores.json");
    let entries: Vec<String> = (0..15)
        .map(|i| format!(r#"{{"name":"p{}","score":{},"timestamp_ms":{}}}"#, i, i * 10, i))
        .collect();
    std::fs::write(&path, format!(r#"{{"entries":[{}]}}"#, entries.join(",")))?;

    let table = HighScoreTable::load_from_path(&path)?;
    assert_eq!(table.len(), MAX_HIGH_SCORES);
    assert_eq!(table.highest().unwrap().score, 140);
    assert_eq!(table.entries().last().unwrap().score, 50);
    Ok(())
}

#[test]
fn corrupt_file_is_reported() -> ChaseResult<()> {
    let dir = tempdir()?;
    let path = dir.path().join("scores.json");
    std::fs::write(&path, "not json")?;
    assert!(matches!(
        HighScoreTable::load_from_path(&path),
        Err(ChaseError::Serde(_))
    ));
    Ok(())
}
