//! Scoring module - line clear points, leveling and gravity speed
//!
//! Rules:
//! - A clear of `n` rows awards `LINE_SCORES[min(n, 4)] * level`.
//! - `level = lines / LINES_PER_LEVEL + 1`, recomputed after every clear.
//! - Each level gained awards a one-time `LEVEL_UP_BONUS`.
//! - Gravity interval is `max(MIN_SPEED_MS, BASE_SPEED_MS - (level - 1) * SPEED_STEP_MS)`.
//!
//! Drop bonuses are applied by the session, never by the engine itself.

use crate::types::{
    BASE_SPEED_MS, HARD_DROP_POINTS_PER_ROW, LEVEL_UP_BONUS, LINES_PER_LEVEL, LINE_SCORES,
    MIN_SPEED_MS, SOFT_DROP_POINTS_PER_ROW, SPEED_STEP_MS,
};

/// Points for clearing `rows` rows at once on `level`
pub fn line_clear_points(rows: usize, level: u32) -> u32 {
    let tier = rows.min(LINE_SCORES.len() - 1);
    LINE_SCORES[tier].saturating_mul(level)
}

/// Level implied by a cumulative line count
pub fn level_for_lines(lines: u32) -> u32 {
    lines / LINES_PER_LEVEL + 1
}

/// Gravity interval in milliseconds for `level`
///
/// Level 0 sits one step below the base speed.
pub fn speed_for_level(level: u32) -> u32 {
    let step = (i64::from(level) - 1) * i64::from(SPEED_STEP_MS);
    let speed = (i64::from(BASE_SPEED_MS) - step).max(i64::from(MIN_SPEED_MS));
    u32::try_from(speed).unwrap_or(BASE_SPEED_MS + SPEED_STEP_MS)
}

/// One-time bonus for `gained` levels
pub fn level_up_bonus(gained: u32) -> u32 {
    LEVEL_UP_BONUS.saturating_mul(gained)
}

/// Bonus for a drop of `rows` rows
pub fn drop_bonus(rows: u32, hard: bool) -> u32 {
    let per_row = if hard {
        HARD_DROP_POINTS_PER_ROW
    } else {
        SOFT_DROP_POINTS_PER_ROW
    };
    rows.saturating_mul(per_row)
}
