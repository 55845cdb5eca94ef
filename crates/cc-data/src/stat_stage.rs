//! Stat-stage multiplier table — §4.2.
//!
//! A 13-entry table over stages [-6, 6]: positive stages multiply by
//! `(2 + n) / 2`, negative stages by `2 / (2 - n)`, giving the canonical
//! -6 → 0.25, 0 → 1.0, +6 → 4.0 progression. Kept as a lookup table rather
//! than computed inline so the exact values are visible and testable.
const TABLE: [(i8, f64); 13] = [
    (-6, 2.0 / 8.0),
    (-5, 2.0 / 7.0),
    (-4, 2.0 / 6.0),
    (-3, 2.0 / 5.0),
    (-2, 2.0 / 4.0),
    (-1, 2.0 / 3.0),
    (0, 1.0),
    (1, 3.0 / 2.0),
    (2, 4.0 / 2.0),
    (3, 5.0 / 2.0),
    (4, 6.0 / 2.0),
    (5, 7.0 / 2.0),
    (6, 8.0 / 2.0),
];

/// Multiplier for a stat stage, clamped to [-6, 6] before lookup.
pub fn stage_multiplier(stage: i8) -> f64 {
    let clamped = stage.clamp(-6, 6);
    TABLE[(clamped + 6) as usize].1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn boundary_values() {
        assert_eq!(stage_multiplier(-6), 0.25);
        assert_eq!(stage_multiplier(0), 1.0);
        assert_eq!(stage_multiplier(6), 4.0);
    }

    #[test]
    fn out_of_range_clamps() {
        assert_eq!(stage_multiplier(-20), stage_multiplier(-6));
        assert_eq!(stage_multiplier(20), stage_multiplier(6));
    }

    #[test]
    fn monotonically_increasing() {
        let values: Vec<f64> = (-6..=6).map(stage_multiplier).collect();
        for window in values.windows(2) {
            assert!(window[0] < window[1]);
        }
    }
}
