//! Banding step functions.
//!
//! Each band maps a stat total to a discrete tier output via an ordered
//! table of inclusive upper bounds. Bands are total over all reals: values
//! below the first breakpoint land in the first tier, values above the last
//! breakpoint clamp to the final output, never extrapolate.

/// An ordered inclusive-upper-bound breakpoint table.
///
/// # Examples
///
/// ```rust
/// use sheetstat::band::BandTable;
///
/// // First tier up to 9, second up to 19, everything above → 99.0.
/// let band = BandTable::new(&[(9.0, 0.0), (19.0, 10.0)], 99.0);
/// assert_eq!(band.lookup(-5.0), 0.0);
/// assert_eq!(band.lookup(9.0), 0.0);
/// assert_eq!(band.lookup(10.0), 10.0);
/// assert_eq!(band.lookup(500.0), 99.0);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct BandTable {
    breakpoints: Vec<(f64, f64)>,
    ceiling: f64,
}

impl BandTable {
    /// Build a band from `(upper_bound, output)` pairs plus the output used
    /// above the last bound. Breakpoints must be given in ascending order.
    pub fn new(breakpoints: &[(f64, f64)], ceiling: f64) -> Self {
        debug_assert!(
            breakpoints.windows(2).all(|w| w[0].0 < w[1].0),
            "band breakpoints must be ascending"
        );
        Self {
            breakpoints: breakpoints.to_vec(),
            ceiling,
        }
    }

    /// Tier output for `value`.
    pub fn lookup(&self, value: f64) -> f64 {
        for &(bound, output) in &self.breakpoints {
            if value <= bound {
                return output;
            }
        }
        self.ceiling
    }
}

/// HP multiplier from total CON. Thirteen tiers from 0.0 up to 4.0; bands of
/// width 20 up to 239, with the 240+ tier jumping to 4.0.
pub fn hp_multiplier(con: f64) -> f64 {
    hp_multiplier_table().lookup(con)
}

pub(crate) fn hp_multiplier_table() -> BandTable {
    BandTable::new(
        &[
            (19.0, 0.0),
            (39.0, 0.2),
            (59.0, 0.4),
            (79.0, 0.6),
            (99.0, 0.8),
            (119.0, 1.0),
            (139.0, 1.2),
            (159.0, 1.4),
            (179.0, 1.6),
            (199.0, 1.8),
            (219.0, 2.0),
            (239.0, 2.4),
        ],
        4.0,
    )
}

/// Movement bonus from total DEX. Eleven tiers of width 10, capped at 100.
pub fn dex_boost(dex: f64) -> f64 {
    BandTable::new(
        &[
            (9.0, 0.0),
            (19.0, 10.0),
            (29.0, 20.0),
            (39.0, 30.0),
            (49.0, 40.0),
            (59.0, 50.0),
            (69.0, 60.0),
            (79.0, 70.0),
            (89.0, 80.0),
            (99.0, 90.0),
            (109.0, 100.0),
        ],
        100.0,
    )
    .lookup(dex)
}

/// Number of damage dice from an attack stat total, floor 1, ceiling 10.
pub fn dice_count(value: f64) -> u8 {
    BandTable::new(
        &[
            (19.0, 1.0),
            (29.0, 2.0),
            (39.0, 3.0),
            (49.0, 4.0),
            (59.0, 5.0),
            (69.0, 6.0),
            (79.0, 7.0),
            (89.0, 8.0),
            (99.0, 9.0),
        ],
        10.0,
    )
    .lookup(value) as u8
}

/// Die size (faces) from an attack stat total: d4 through d12.
pub fn die_size(value: f64) -> u8 {
    BandTable::new(
        &[(9.0, 4.0), (29.0, 6.0), (59.0, 8.0), (79.0, 10.0)],
        12.0,
    )
    .lookup(value) as u8
}

/// d20 check modifier from an ability total. Negative totals clamp to 0
/// before banding.
pub fn check_modifier(total: f64) -> i64 {
    let n = total.max(0.0);
    if n <= 1.0 {
        -5
    } else if n <= 3.0 {
        -4
    } else if n <= 5.0 {
        -3
    } else if n <= 7.0 {
        -2
    } else if n <= 9.0 {
        -1
    } else {
        ((n - 10.0) / 5.0).floor() as i64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hp_multiplier_breakpoints() {
        let cases = [
            (0.0, 0.0),
            (19.0, 0.0),
            (20.0, 0.2),
            (39.0, 0.2),
            (40.0, 0.4),
            (240.0, 4.0),
            (500.0, 4.0),
        ];
        for (con, expected) in cases {
            assert_eq!(hp_multiplier(con), expected, "con = {con}");
        }
    }

    #[test]
    fn test_hp_multiplier_total_over_reals() {
        assert_eq!(hp_multiplier(-40.0), 0.0);
        assert_eq!(hp_multiplier(f64::MAX), 4.0);
    }

    #[test]
    fn test_dex_boost_bands() {
        assert_eq!(dex_boost(0.0), 0.0);
        assert_eq!(dex_boost(45.0), 40.0);
        assert_eq!(dex_boost(109.0), 100.0);
        assert_eq!(dex_boost(110.0), 100.0);
        assert_eq!(dex_boost(-3.0), 0.0);
    }

    #[test]
    fn test_dice_count_bounds() {
        assert_eq!(dice_count(0.0), 1);
        assert_eq!(dice_count(19.0), 1);
        assert_eq!(dice_count(20.0), 2);
        assert_eq!(dice_count(99.0), 9);
        assert_eq!(dice_count(100.0), 10);
        assert_eq!(dice_count(1_000.0), 10);
    }

    #[test]
    fn test_die_size_bounds() {
        assert_eq!(die_size(9.0), 4);
        assert_eq!(die_size(10.0), 6);
        assert_eq!(die_size(30.0), 8);
        assert_eq!(die_size(60.0), 10);
        assert_eq!(die_size(80.0), 12);
    }

    #[test]
    fn test_check_modifier() {
        assert_eq!(check_modifier(0.0), -5);
        assert_eq!(check_modifier(1.0), -5);
        assert_eq!(check_modifier(9.0), -1);
        assert_eq!(check_modifier(10.0), 0);
        assert_eq!(check_modifier(14.0), 0);
        assert_eq!(check_modifier(15.0), 1);
        assert_eq!(check_modifier(45.0), 7);
        assert_eq!(check_modifier(-12.0), -5);
    }
}
