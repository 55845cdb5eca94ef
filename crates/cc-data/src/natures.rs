//! Nature catalog — §4.1.
//!
//! 25 fixed pairs over the five staged stats: 20 boost/reduce combinations
//! plus 5 balanced natures (no boost, no reduce) kept distinct by name only,
//! matching the convention that a creature's nature is flavor as much as it
//! is mechanics.

use std::collections::HashMap;
use std::sync::OnceLock;

use cc_types::enums::Stat;
use cc_types::NatureId;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NatureDefinition {
    pub id: &'static str,
    pub name: &'static str,
    pub boost: Option<Stat>,
    pub reduce: Option<Stat>,
}

macro_rules! nat {
    ($id:literal, $name:literal, $boost:expr, $reduce:expr) => {
        NatureDefinition { id: $id, name: $name, boost: $boost, reduce: $reduce }
    };
}

use Stat::{Attack, Defense, SpAtk, SpDef, Speed};

const ALL_NATURES: &[NatureDefinition] = &[
    // Attack boost
    nat!("fierce", "Fierce", Some(Attack), Some(Defense)),
    nat!("brash", "Brash", Some(Attack), Some(SpAtk)),
    nat!("reckless", "Reckless", Some(Attack), Some(SpDef)),
    nat!("plodding", "Plodding", Some(Attack), Some(Speed)),
    // Defense boost
    nat!("stalwart", "Stalwart", Some(Defense), Some(Attack)),
    nat!("guarded", "Guarded", Some(Defense), Some(SpAtk)),
    nat!("armored", "Armored", Some(Defense), Some(SpDef)),
    nat!("sluggish", "Sluggish", Some(Defense), Some(Speed)),
    // Special Attack boost
    nat!("arcane", "Arcane", Some(SpAtk), Some(Attack)),
    nat!("volatile", "Volatile", Some(SpAtk), Some(Defense)),
    nat!("frenzied", "Frenzied", Some(SpAtk), Some(SpDef)),
    nat!("ponderous", "Ponderous", Some(SpAtk), Some(Speed)),
    // Special Defense boost
    nat!("warded", "Warded", Some(SpDef), Some(Attack)),
    nat!("tranquil", "Tranquil", Some(SpDef), Some(Defense)),
    nat!("measured", "Measured", Some(SpDef), Some(SpAtk)),
    nat!("patient", "Patient", Some(SpDef), Some(Speed)),
    // Speed boost
    nat!("swift", "Swift", Some(Speed), Some(Attack)),
    nat!("nimble", "Nimble", Some(Speed), Some(Defense)),
    nat!("hasty", "Hasty", Some(Speed), Some(SpAtk)),
    nat!("flighty", "Flighty", Some(Speed), Some(SpDef)),
    // Balanced (no boost, no reduce) — five flavors, one mechanic
    nat!("balanced", "Balanced", None, None),
    nat!("steady", "Steady", None, None),
    nat!("calm", "Calm", None, None),
    nat!("mild", "Mild", None, None),
    nat!("plain", "Plain", None, None),
];

fn by_id() -> &'static HashMap<&'static str, &'static NatureDefinition> {
    static BY_ID: OnceLock<HashMap<&'static str, &'static NatureDefinition>> = OnceLock::new();
    BY_ID.get_or_init(|| ALL_NATURES.iter().map(|n| (n.id, n)).collect())
}

pub fn get_nature(id: &str) -> Option<&'static NatureDefinition> {
    by_id().get(id).copied()
}

pub fn is_known_nature(id: &str) -> bool {
    by_id().contains_key(id)
}

/// ±10% per §4.2's `natureMult`; neutral natures multiply by 1.0.
pub fn nature_multiplier(nature: &NatureDefinition, stat: Stat) -> f64 {
    if nature.boost == Some(stat) {
        1.1
    } else if nature.reduce == Some(stat) {
        0.9
    } else {
        1.0
    }
}

pub fn nature_id(name: &str) -> NatureId {
    NatureId::from(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exactly_twenty_five_natures() {
        assert_eq!(ALL_NATURES.len(), 25);
    }

    #[test]
    fn ids_are_unique() {
        let mut ids: Vec<&str> = ALL_NATURES.iter().map(|n| n.id).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 25);
    }

    #[test]
    fn balanced_nature_has_no_boost_or_reduce() {
        let balanced = get_nature("balanced").unwrap();
        assert_eq!(balanced.boost, None);
        assert_eq!(balanced.reduce, None);
        assert_eq!(nature_multiplier(balanced, Stat::Attack), 1.0);
    }

    #[test]
    fn boost_and_reduce_multipliers() {
        let fierce = get_nature("fierce").unwrap();
        assert_eq!(nature_multiplier(fierce, Stat::Attack), 1.1);
        assert_eq!(nature_multiplier(fierce, Stat::Defense), 0.9);
        assert_eq!(nature_multiplier(fierce, Stat::Speed), 1.0);
    }

    #[test]
    fn unknown_nature_is_none() {
        assert!(get_nature("nonexistent").is_none());
    }
}
