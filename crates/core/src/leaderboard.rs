//! Leaderboard module - per-field, per-piece-size ranking
//!
//! Scores are partitioned by field size and piece size. Each partition keeps at
//! most [`LEADERBOARD_SIZE`] entries sorted by score, highest first, and at most
//! one entry per session.
//!
//! Reads filter again: zero scores and duplicate sessions can still be present
//! in a table written by older builds or edited by hand.

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::game_state::GameState;
use crate::types::{DEFAULT_PLAYER_NAME, LEADERBOARD_SIZE};

/// One ranked result
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaderEntry {
    pub player_name: String,
    pub score: u32,
    pub level: u32,
    pub lines: u32,
    pub recorded_at: DateTime<Utc>,
    #[serde(default)]
    pub session_id: Option<String>,
}

/// A result about to be ranked
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewScore {
    pub player_name: String,
    pub score: u32,
    pub level: u32,
    pub lines: u32,
    pub piece_size: u8,
    /// `"WxH"`
    pub field_size: String,
    pub session_id: Option<String>,
}

impl NewScore {
    /// Result of a game in its current state
    pub fn from_game(game: &GameState) -> Self {
        Self {
            player_name: game.player_name().to_string(),
            score: game.score(),
            level: game.level(),
            lines: game.lines(),
            piece_size: game.piece_size(),
            field_size: game.settings().field_size(),
            session_id: Some(game.session_id().to_string()),
        }
    }
}

/// Partition key: `"<WxH>_<piece_size>"`
pub fn partition_key(field_size: &str, piece_size: u8) -> String {
    format!("{field_size}_{piece_size}")
}

/// All partitions, keyed by [`partition_key`]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LeaderTable {
    partitions: BTreeMap<String, Vec<LeaderEntry>>,
}

impl LeaderTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.partitions.is_empty()
    }

    /// Stored entries of a partition, without read filtering
    pub fn partition(&self, field_size: &str, piece_size: u8) -> &[LeaderEntry] {
        self.partitions
            .get(&partition_key(field_size, piece_size))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Raw access to a partition, bypassing ranking rules
    pub fn partition_mut(&mut self, field_size: &str, piece_size: u8) -> &mut Vec<LeaderEntry> {
        self.partitions
            .entry(partition_key(field_size, piece_size))
            .or_default()
    }

    /// Rank a result.
    ///
    /// A result for a session already on the board replaces that entry only when
    /// it scores strictly higher; it never adds a second entry.
    pub fn add_score(&mut self, new: NewScore, recorded_at: DateTime<Utc>) {
        let player_name = match new.player_name.trim() {
            "" => DEFAULT_PLAYER_NAME.to_string(),
            name => name.to_string(),
        };
        let entry = LeaderEntry {
            player_name,
            score: new.score,
            level: new.level,
            lines: new.lines,
            recorded_at,
            session_id: new.session_id.clone(),
        };

        let entries = self.partition_mut(&new.field_size, new.piece_size);
        let existing = new.session_id.as_deref().and_then(|session| {
            entries
                .iter()
                .position(|e| e.session_id.as_deref() == Some(session))
        });

        match existing {
            Some(idx) => {
                if entry.score > entries[idx].score {
                    entries[idx] = entry;
                }
            }
            None => entries.push(entry),
        }

        // Stable: equal scores keep their insertion order.
        entries.sort_by(|a, b| b.score.cmp(&a.score));
        entries.truncate(LEADERBOARD_SIZE);
    }

    /// Ranked entries of a partition.
    ///
    /// Drops scores of zero, keeps the highest entry of each session (the first
    /// one on ties), preserves stored order and returns at most
    /// [`LEADERBOARD_SIZE`] entries.
    pub fn leaders(&self, piece_size: u8, field_size: &str) -> Vec<LeaderEntry> {
        let entries = self.partition(field_size, piece_size);

        let mut best: HashMap<&str, usize> = HashMap::new();
        for (idx, entry) in entries.iter().enumerate() {
            if entry.score == 0 {
                continue;
            }
            if let Some(session) = entry.session_id.as_deref() {
                let slot = best.entry(session).or_insert(idx);
                if entry.score > entries[*slot].score {
                    *slot = idx;
                }
            }
        }

        entries
            .iter()
            .enumerate()
            .filter(|(idx, entry)| {
                entry.score > 0
                    && match entry.session_id.as_deref() {
                        Some(session) => best.get(session) == Some(idx),
                        None => true,
                    }
            })
            .map(|(_, entry)| entry.clone())
            .take(LEADERBOARD_SIZE)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 12, minute, 0).unwrap()
    }

    fn score(name: &str, score: u32, session: Option<&str>) -> NewScore {
        NewScore {
            player_name: name.to_string(),
            score,
            level: 1,
            lines: 0,
            piece_size: 4,
            field_size: "10x20".to_string(),
            session_id: session.map(str::to_string),
        }
    }

    fn raw(name: &str, score: u32, session: Option<&str>) -> LeaderEntry {
        LeaderEntry {
            player_name: name.to_string(),
            score,
            level: 1,
            lines: 0,
            recorded_at: at(0),
            session_id: session.map(str::to_string),
        }
    }

    #[test]
    fn test_partition_key() {
        assert_eq!(partition_key("10x20", 4), "10x20_4");
    }

    #[test]
    fn test_sorted_and_capped() {
        let mut table = LeaderTable::new();
        for i in 1..=15u32 {
            table.add_score(score("p", i * 10, None), at(i));
        }
        let stored = table.partition("10x20", 4);
        assert_eq!(stored.len(), LEADERBOARD_SIZE);
        assert_eq!(stored[0].score, 150);
        assert_eq!(stored[9].score, 60);
    }

    #[test]
    fn test_same_session_lower_score_is_ignored() {
        let mut table = LeaderTable::new();
        table.add_score(score("a", 500, Some("s1")), at(1));
        table.add_score(score("a", 300, Some("s1")), at(2));
        let stored = table.partition("10x20", 4);
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].score, 500);
        assert_eq!(stored[0].recorded_at, at(1));
    }

    #[test]
    fn test_same_session_higher_score_replaces() {
        let mut table = LeaderTable::new();
        table.add_score(score("a", 500, Some("s1")), at(1));
        table.add_score(score("b", 200, Some("s2")), at(2));
        table.add_score(score("a", 900, Some("s1")), at(3));
        let stored = table.partition("10x20", 4);
        assert_eq!(stored.len(), 2);
        assert_eq!(stored[0].score, 900);
        assert_eq!(stored[0].recorded_at, at(3));
    }

    #[test]
    fn test_blank_name_defaults() {
        let mut table = LeaderTable::new();
        table.add_score(score("  ", 10, None), at(1));
        assert_eq!(table.partition("10x20", 4)[0].player_name, DEFAULT_PLAYER_NAME);
    }

    #[test]
    fn test_partitions_are_separate() {
        let mut table = LeaderTable::new();
        table.add_score(score("a", 10, None), at(1));
        let mut other = score("b", 20, None);
        other.piece_size = 6;
        table.add_score(other, at(2));
        assert_eq!(table.leaders(4, "10x20").len(), 1);
        assert_eq!(table.leaders(6, "10x20").len(), 1);
        assert!(table.leaders(5, "10x20").is_empty());
    }

    #[test]
    fn test_read_filters_legacy_entries() {
        let mut table = LeaderTable::new();
        *table.partition_mut("10x20", 4) = vec![
            raw("a", 700, Some("s1")),
            raw("b", 400, None),
            raw("a", 900, Some("s1")),
            raw("c", 0, None),
            raw("d", 300, None),
        ];
        let names: Vec<_> = table
            .leaders(4, "10x20")
            .into_iter()
            .map(|e| (e.player_name, e.score))
            .collect();
        assert_eq!(
            names,
            vec![
                ("b".to_string(), 400),
                ("a".to_string(), 900),
                ("d".to_string(), 300)
            ]
        );
    }

    #[test]
    fn test_read_caps_at_ten() {
        let mut table = LeaderTable::new();
        *table.partition_mut("10x20", 4) = (1..=14).map(|i| raw("x", i, None)).collect();
        assert_eq!(table.leaders(4, "10x20").len(), LEADERBOARD_SIZE);
    }

    #[test]
    fn test_table_json_shape() {
        let mut table = LeaderTable::new();
        table.add_score(score("a", 10, Some("s")), at(1));
        let json = serde_json::to_value(&table).unwrap();
        assert!(json.get("10x20_4").is_some());
        let back: LeaderTable = serde_json::from_value(json).unwrap();
        assert_eq!(back, table);
    }
}
