//! Seeded RNG — Mulberry32, used for every random draw inside a turn resolution.
//!
//! All randomness in a battle must flow through `BattleRng` so that a turn is
//! reproducible from its seed and draw count: replaying a turn log with the
//! same seed and the same number of draws must reproduce the same outcome.
//! The seed and running draw counter are persisted alongside the battle state
//! blob so a turn can be replayed exactly (§8 round-trip law).

use serde::{Deserialize, Serialize};

/// RNG state threaded through `resolveTurn`. Cheap to copy, serializes as two
/// integers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BattleRng {
    pub seed: u32,
    pub counter: u32,
}

impl BattleRng {
    /// Create an RNG with the given seed (counter starts at 0).
    pub fn new(seed: u32) -> Self {
        Self { seed, counter: 0 }
    }

    /// Next uniform draw in `[0, 1)`. Advances the counter by 1.
    pub fn next_f64(&mut self) -> f64 {
        self.counter = self.counter.wrapping_add(1);
        mulberry32(self.seed.wrapping_add(self.counter))
    }

    /// Random integer in `[min, max]` inclusive.
    pub fn next_int(&mut self, min: u32, max: u32) -> u32 {
        let value = self.next_f64();
        min + (value * (max - min + 1) as f64) as u32
    }

    /// `true` with probability `p` (`p` in `[0, 1]`).
    pub fn roll(&mut self, p: f64) -> bool {
        self.next_f64() < p
    }

    /// Coin flip, used to break fully-tied turn-order comparisons.
    pub fn coin_flip(&mut self) -> bool {
        self.roll(0.5)
    }

    /// Pick a random index from `[0, len)`. `None` if `len == 0`.
    pub fn random_index(&mut self, len: usize) -> Option<usize> {
        if len == 0 {
            return None;
        }
        Some(self.next_int(0, len as u32 - 1) as usize)
    }
}

/// Mulberry32 PRNG — fast, small state, good enough distribution for game
/// balance rolls. Not cryptographic; never used for credentials or tokens.
fn mulberry32(input: u32) -> f64 {
    let mut t: i32 = input.wrapping_add(0x6D2B79F5) as i32;

    let lhs = ((t as u32) ^ ((t as u32) >> 15)) as i32;
    let rhs = t | 1;
    t = lhs.wrapping_mul(rhs);

    let lhs2 = ((t as u32) ^ ((t as u32) >> 7)) as i32;
    let rhs2 = t | 61;
    let mul = lhs2.wrapping_mul(rhs2);
    t ^= t.wrapping_add(mul);

    let result = (t as u32) ^ ((t as u32) >> 14);
    result as f64 / 4294967296.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deterministic_same_seed() {
        let mut rng1 = BattleRng::new(42);
        let mut rng2 = BattleRng::new(42);
        for _ in 0..100 {
            assert_eq!(rng1.next_f64().to_bits(), rng2.next_f64().to_bits());
        }
    }

    #[test]
    fn different_seeds_differ() {
        let mut rng1 = BattleRng::new(42);
        let mut rng2 = BattleRng::new(43);
        assert_ne!(rng1.next_f64().to_bits(), rng2.next_f64().to_bits());
    }

    #[test]
    fn values_in_range() {
        let mut rng = BattleRng::new(12345);
        for _ in 0..1000 {
            let v = rng.next_f64();
            assert!((0.0..1.0).contains(&v), "value {v} out of [0, 1)");
        }
    }

    #[test]
    fn next_int_in_range() {
        let mut rng = BattleRng::new(999);
        for _ in 0..1000 {
            let v = rng.next_int(3, 7);
            assert!((3..=7).contains(&v), "next_int {v} out of [3, 7]");
        }
    }

    #[test]
    fn random_index_empty_is_none() {
        let mut rng = BattleRng::new(42);
        assert_eq!(rng.random_index(0), None);
        assert_eq!(rng.counter, 0);
    }

    #[test]
    fn counter_increments_once_per_draw() {
        let mut rng = BattleRng::new(42);
        assert_eq!(rng.counter, 0);
        rng.next_f64();
        assert_eq!(rng.counter, 1);
        rng.next_int(0, 10);
        assert_eq!(rng.counter, 2);
    }

    #[test]
    fn replay_reproduces_same_draws() {
        let seed = 7;
        let mut a = BattleRng::new(seed);
        let first_pass: Vec<u64> = (0..20).map(|_| a.next_f64().to_bits()).collect();

        let mut b = BattleRng::new(seed);
        let second_pass: Vec<u64> = (0..20).map(|_| b.next_f64().to_bits()).collect();

        assert_eq!(first_pass, second_pass);
    }
}
