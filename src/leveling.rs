//! Cumulative-XP leveling table.
//!
//! The first 24 level thresholds are hand-tuned; beyond them the table is
//! extended programmatically up to the configured maximum level. Thresholds
//! are cumulative XP at level start and strictly increasing, so level lookup
//! is a scan for the highest threshold at or below the given XP.

use serde::{Deserialize, Serialize};

/// Hand-tuned cumulative XP thresholds for levels 1..=24.
const BASE_THRESHOLDS: [i64; 24] = [
    0, 100, 300, 700, 1_599, 3_100, 6_300, 12_700, 24_500, 51_100, 81_100, 116_100, 156_100,
    176_100, 196_100, 216_100, 246_100, 276_100, 316_100, 356_100, 406_100, 456_100, 516_100,
    576_100,
];

/// XP-to-level table, built once and queried read-only.
///
/// # Examples
///
/// ```rust
/// use sheetstat::LevelTable;
///
/// let table = LevelTable::new(250);
/// assert_eq!(table.level_for_xp(0), 1);
/// assert_eq!(table.level_for_xp(100), 2);
/// assert_eq!(table.level_for_xp(-50), 1);
/// assert_eq!(table.xp_at_level(2), 100);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LevelTable {
    thresholds: Vec<i64>,
}

impl LevelTable {
    /// Build the table sized to exactly `max_level` levels.
    ///
    /// A maximum below the hand-tuned range truncates the table, so
    /// `max_level` always caps lookups. Beyond the hand-tuned entries, each
    /// level adds `20000 + 10000 * floor((L - 14) / 2)` XP over the previous
    /// one.
    pub fn new(max_level: u32) -> Self {
        let max_level = max_level.max(1) as usize;
        let mut thresholds: Vec<i64> = BASE_THRESHOLDS.to_vec();
        thresholds.truncate(max_level);
        for level in thresholds.len()..max_level {
            let prev = thresholds[level - 1];
            let delta = 20_000 + 10_000 * ((level as i64 - 14) / 2);
            thresholds.push(prev + delta);
        }
        Self { thresholds }
    }

    /// Number of levels in the table.
    pub fn max_level(&self) -> u32 {
        self.thresholds.len() as u32
    }

    /// The highest level whose threshold is at or below `xp`. Never below 1,
    /// even for negative XP.
    pub fn level_for_xp(&self, xp: i64) -> u32 {
        let mut level = 1;
        for (i, &threshold) in self.thresholds.iter().enumerate().rev() {
            if xp >= threshold {
                level = i as u32 + 1;
                break;
            }
        }
        level
    }

    /// Cumulative XP at the start of `level`. Levels are clamped into the
    /// table range, so out-of-domain queries return the nearest threshold.
    pub fn xp_at_level(&self, level: u32) -> i64 {
        let idx = (level.max(1) as usize - 1).min(self.thresholds.len() - 1);
        self.thresholds[idx]
    }

    /// Position within the current level band, for the sheet's XP bar.
    pub fn progress(&self, xp: i64) -> XpProgress {
        let level = self.level_for_xp(xp);
        let curr_start = self.xp_at_level(level);
        // At max level the next threshold is the current one; span floors at 1.
        let next_start = self
            .thresholds
            .get(level as usize)
            .copied()
            .unwrap_or(curr_start);
        let span = (next_start - curr_start).max(1);
        let pct_raw = ((xp - curr_start) as f64 / span as f64 * 100.0).round() as i64;
        XpProgress {
            current: (xp - curr_start).max(0),
            next_at: next_start,
            span,
            pct: pct_raw.clamp(0, 100) as u8,
        }
    }
}

/// Position within a level's XP band. Invariant: `0 <= pct <= 100`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct XpProgress {
    /// XP earned since the current level started.
    pub current: i64,
    /// Cumulative XP at which the next level starts.
    pub next_at: i64,
    /// Width of the current band (minimum 1).
    pub span: i64,
    /// Rounded percentage through the band.
    pub pct: u8,
}

/// XP value of a non-player combatant from its challenge rating.
pub fn npc_xp_for_cr(cr: i64) -> i64 {
    cr * cr * 100
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strictly_increasing_to_250() {
        let table = LevelTable::new(250);
        assert_eq!(table.max_level(), 250);
        for level in 2..=250 {
            assert!(
                table.xp_at_level(level) > table.xp_at_level(level - 1),
                "threshold not increasing at level {level}"
            );
        }
    }

    #[test]
    fn test_level_roundtrip() {
        let table = LevelTable::new(250);
        for level in 1..=250 {
            assert_eq!(table.level_for_xp(table.xp_at_level(level)), level);
        }
    }

    #[test]
    fn test_max_level_below_base_table_truncates() {
        let table = LevelTable::new(10);
        assert_eq!(table.max_level(), 10);
        // XP past the shortened table still caps at the table's top level.
        assert_eq!(table.level_for_xp(1_000_000), 10);
        assert_eq!(table.xp_at_level(24), table.xp_at_level(10));
    }

    #[test]
    fn test_clamped_low_xp() {
        let table = LevelTable::new(250);
        assert_eq!(table.level_for_xp(0), 1);
        assert_eq!(table.level_for_xp(-100), 1);
    }

    #[test]
    fn test_tie_resolves_to_higher_level() {
        let table = LevelTable::new(250);
        // XP exactly at a threshold belongs to the level it starts.
        assert_eq!(table.level_for_xp(300), 3);
        assert_eq!(table.level_for_xp(299), 2);
    }

    #[test]
    fn test_progress_band() {
        let table = LevelTable::new(250);
        let progress = table.progress(200);
        assert_eq!(table.level_for_xp(200), 2);
        assert_eq!(progress.current, 100);
        assert_eq!(progress.next_at, 300);
        assert_eq!(progress.span, 200);
        assert_eq!(progress.pct, 50);
    }

    #[test]
    fn test_progress_at_max_level() {
        let table = LevelTable::new(24);
        let top = table.xp_at_level(24);
        let progress = table.progress(top + 5_000);
        assert_eq!(progress.next_at, top);
        assert_eq!(progress.span, 1);
        assert_eq!(progress.pct, 100);
        assert_eq!(progress.current, 5_000);
    }

    #[test]
    fn test_extension_formula() {
        let table = LevelTable::new(26);
        // Level 25 threshold = level 24 + 20000 + 10000 * floor((24-14)/2).
        let expected = 576_100 + 20_000 + 10_000 * 5;
        assert_eq!(table.xp_at_level(25), expected);
    }

    #[test]
    fn test_npc_xp() {
        assert_eq!(npc_xp_for_cr(3), 900);
        assert_eq!(npc_xp_for_cr(0), 0);
    }
}
