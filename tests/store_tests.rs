//! File-backed store tests: saves, leaderboard file and configuration

use std::fs;

use chrono::{TimeZone, Utc};
use polytris::core::{GameState, NewScore, SimpleRng};
use polytris::store::{Config, LeaderboardStore, SaveStore};
use polytris::types::GameSettings;
use tempfile::TempDir;

fn game(player: &str, seed: u32) -> GameState {
    let mut game = GameState::with_shuffle(
        GameSettings::new(10, 20, 5),
        player,
        Box::new(SimpleRng::new(seed)),
    );
    game.hard_drop();
    game
}

fn score(player: &str, points: u32, session: Option<&str>) -> NewScore {
    NewScore {
        player_name: player.to_string(),
        score: points,
        level: 1,
        lines: 0,
        piece_size: 4,
        field_size: "10x20".to_string(),
        session_id: session.map(str::to_string),
    }
}

#[test]
fn test_save_then_load_returns_same_record() {
    let dir = TempDir::new().unwrap();
    let store = SaveStore::open(dir.path().join("saves")).unwrap();
    let record = game("ada", 1).snapshot();

    let file = store.save(&record).unwrap();
    assert!(file.starts_with("ada_"));
    assert!(file.ends_with(".save"));
    assert_eq!(store.load(&file).unwrap(), record);
}

#[test]
fn test_new_save_supersedes_same_player_only() {
    let dir = TempDir::new().unwrap();
    let store = SaveStore::open(dir.path()).unwrap();
    let t1 = Utc.with_ymd_and_hms(2026, 3, 1, 10, 0, 0).unwrap();
    let t2 = Utc.with_ymd_and_hms(2026, 3, 1, 11, 0, 0).unwrap();
    let t3 = Utc.with_ymd_and_hms(2026, 3, 2, 9, 30, 0).unwrap();

    let first = store.save_at(&game("ada", 1).snapshot(), t1).unwrap();
    store.save_at(&game("ada_b", 2).snapshot(), t2).unwrap();
    let second = store.save_at(&game("ada", 3).snapshot(), t3).unwrap();

    let saves = store.list().unwrap();
    let names: Vec<&str> = saves.iter().map(|s| s.file_name.as_str()).collect();
    assert_eq!(names, vec![second.as_str(), "ada_b_20260301_110000.save"]);
    assert!(store.load(&first).is_err());
}

#[test]
fn test_list_summarizes_and_skips_broken_files() {
    let dir = TempDir::new().unwrap();
    let store = SaveStore::open(dir.path()).unwrap();
    let game = game("Bob Smith", 4);
    store.save(&game.snapshot()).unwrap();
    fs::write(dir.path().join("junk_20260101_000000.save"), "{ not json").unwrap();
    fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

    let saves = store.list().unwrap();
    assert_eq!(saves.len(), 1);
    let summary = &saves[0];
    assert!(summary.file_name.starts_with("Bob_Smith_"));
    assert_eq!(summary.player_name, "Bob Smith");
    assert_eq!(summary.score, game.score());
    assert_eq!(summary.field_size, "10x20");
    assert_eq!(summary.piece_size, 5);
}

#[test]
fn test_delete_and_rejected_names() {
    let dir = TempDir::new().unwrap();
    let store = SaveStore::open(dir.path()).unwrap();
    let file = store.save(&game("cy", 5).snapshot()).unwrap();

    assert!(store.delete("../leaders.json").is_err());
    assert!(store.load("").is_err());
    assert!(store.load("..").is_err());

    store.delete(&file).unwrap();
    assert!(store.list().unwrap().is_empty());
    assert!(store.delete(&file).is_err());
}

#[test]
fn test_leaderboard_file_round_trip() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("data").join("leaders.json");
    let store = LeaderboardStore::open(&path).unwrap();

    store.add_score(score("ada", 300, Some("s1"))).unwrap();
    store.add_score(score("bob", 500, Some("s2"))).unwrap();
    store.add_score(score("ada", 200, Some("s1"))).unwrap();

    let reopened = LeaderboardStore::open(&path).unwrap();
    let leaders = reopened.leaders(4, "10x20");
    let ranked: Vec<(&str, u32)> = leaders
        .iter()
        .map(|e| (e.player_name.as_str(), e.score))
        .collect();
    assert_eq!(ranked, vec![("bob", 500), ("ada", 300)]);
    assert!(reopened.leaders(5, "10x20").is_empty());
}

#[test]
fn test_corrupt_leaderboard_is_discarded() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("leaders.json");
    fs::write(&path, "[[[ definitely not a table").unwrap();

    let store = LeaderboardStore::open(&path).unwrap();
    assert!(!path.exists());
    assert!(store.load().is_empty());

    store.add_score(score("ada", 10, None)).unwrap();
    assert_eq!(store.leaders(4, "10x20").len(), 1);
}

#[test]
fn test_empty_leaderboard_file_reads_empty() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("leaders.json");
    fs::write(&path, "").unwrap();

    let store = LeaderboardStore::open(&path).unwrap();
    assert!(store.leaders(4, "10x20").is_empty());
}

#[test]
fn test_config_created_with_defaults_when_missing() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("polytris.toml");

    let config = Config::load_or_create(&path);
    assert_eq!(config, Config::default());
    assert!(path.exists());
    assert_eq!(Config::from_file(&path).unwrap(), config);
}

#[test]
fn test_broken_config_falls_back_to_defaults() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("polytris.toml");
    fs::write(&path, "[game\nfield_width = ").unwrap();

    assert_eq!(Config::load_or_create(&path), Config::default());
}

#[test]
fn test_config_overrides_are_read() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("polytris.toml");
    fs::write(
        &path,
        "[game]\nfield_width = 12\npiece_size = 6\nplayer_name = \"zed\"\n\n[controls]\nhard_drop = \"enter\"\n",
    )
    .unwrap();

    let config = Config::load_or_create(&path);
    assert_eq!(config.game.settings(), GameSettings::new(12, 20, 6));
    assert_eq!(config.game.player_name, "zed");
    assert_eq!(config.controls.hard_drop, "enter");
    assert_eq!(config.controls.rotate, "up");
}
