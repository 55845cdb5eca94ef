//! The 18 elemental types and their effectiveness matrix — §4.1.
//!
//! Canonical type names are uppercase ASCII; `effectiveness(atk, def)` is the
//! single entry point into the matrix and defaults missing pairs to `1.0`
//! exactly as §4.1 specifies.

use std::collections::HashMap;
use std::sync::OnceLock;

use cc_types::TypeId;

/// The 18 canonical type names, in catalog order.
pub const ALL_TYPES: [&str; 18] = [
    "FIRE", "WATER", "GRASS", "ELECTRIC", "ICE", "EARTH", "AIR", "PSYCHIC", "SHADOW", "LIGHT",
    "METAL", "POISON", "ROCK", "INSECT", "SPIRIT", "DRAGON", "BEAST", "VOID",
];

pub fn is_known_type(id: &str) -> bool {
    ALL_TYPES.contains(&id)
}

pub fn type_id(name: &str) -> TypeId {
    TypeId::from(name)
}

/// `(attacking, defending, multiplier)` — only the non-1.0 entries are
/// listed; everything else defaults to 1.0 in `effectiveness()`.
const EFFECTIVENESS_ENTRIES: &[(&str, &str, f64)] = &[
    ("FIRE", "GRASS", 2.0),
    ("FIRE", "ICE", 2.0),
    ("FIRE", "INSECT", 2.0),
    ("FIRE", "METAL", 2.0),
    ("FIRE", "WATER", 0.5),
    ("FIRE", "ROCK", 0.5),
    ("FIRE", "DRAGON", 0.5),
    ("WATER", "FIRE", 2.0),
    ("WATER", "ROCK", 2.0),
    ("WATER", "EARTH", 2.0),
    ("WATER", "GRASS", 0.5),
    ("WATER", "DRAGON", 0.5),
    ("GRASS", "WATER", 2.0),
    ("GRASS", "ROCK", 2.0),
    ("GRASS", "EARTH", 2.0),
    ("GRASS", "FIRE", 0.5),
    ("GRASS", "POISON", 0.5),
    ("GRASS", "INSECT", 0.5),
    ("GRASS", "METAL", 0.5),
    ("GRASS", "DRAGON", 0.5),
    ("ELECTRIC", "WATER", 2.0),
    ("ELECTRIC", "AIR", 2.0),
    ("ELECTRIC", "GRASS", 0.5),
    ("ELECTRIC", "EARTH", 0.0),
    ("ELECTRIC", "DRAGON", 0.5),
    ("ICE", "GRASS", 2.0),
    ("ICE", "EARTH", 2.0),
    ("ICE", "AIR", 2.0),
    ("ICE", "DRAGON", 2.0),
    ("ICE", "FIRE", 0.5),
    ("ICE", "WATER", 0.5),
    ("ICE", "METAL", 0.5),
    ("EARTH", "FIRE", 2.0),
    ("EARTH", "ELECTRIC", 2.0),
    ("EARTH", "POISON", 2.0),
    ("EARTH", "ROCK", 2.0),
    ("EARTH", "METAL", 2.0),
    ("EARTH", "GRASS", 0.5),
    ("EARTH", "INSECT", 0.5),
    ("EARTH", "AIR", 0.0),
    ("AIR", "GRASS", 2.0),
    ("AIR", "INSECT", 2.0),
    ("AIR", "EARTH", 2.0),
    ("AIR", "ELECTRIC", 0.5),
    ("AIR", "ROCK", 0.5),
    ("AIR", "METAL", 0.5),
    ("PSYCHIC", "POISON", 2.0),
    ("PSYCHIC", "BEAST", 2.0),
    ("PSYCHIC", "PSYCHIC", 0.5),
    ("PSYCHIC", "METAL", 0.5),
    ("PSYCHIC", "SHADOW", 0.0),
    ("SHADOW", "PSYCHIC", 2.0),
    ("SHADOW", "SPIRIT", 2.0),
    ("SHADOW", "SHADOW", 0.5),
    ("SHADOW", "LIGHT", 0.5),
    ("LIGHT", "SHADOW", 2.0),
    ("LIGHT", "DRAGON", 2.0),
    ("LIGHT", "METAL", 0.5),
    ("LIGHT", "LIGHT", 0.5),
    ("METAL", "ICE", 2.0),
    ("METAL", "ROCK", 2.0),
    ("METAL", "LIGHT", 2.0),
    ("METAL", "FIRE", 0.5),
    ("METAL", "WATER", 0.5),
    ("METAL", "ELECTRIC", 0.5),
    ("METAL", "METAL", 0.5),
    ("POISON", "GRASS", 2.0),
    ("POISON", "SPIRIT", 2.0),
    ("POISON", "POISON", 0.5),
    ("POISON", "EARTH", 0.5),
    ("POISON", "ROCK", 0.5),
    ("POISON", "SHADOW", 0.5),
    ("POISON", "METAL", 0.0),
    ("ROCK", "FIRE", 2.0),
    ("ROCK", "ICE", 2.0),
    ("ROCK", "AIR", 2.0),
    ("ROCK", "INSECT", 2.0),
    ("ROCK", "WATER", 0.5),
    ("ROCK", "GRASS", 0.5),
    ("ROCK", "METAL", 0.5),
    ("ROCK", "EARTH", 0.5),
    ("INSECT", "GRASS", 2.0),
    ("INSECT", "PSYCHIC", 2.0),
    ("INSECT", "SHADOW", 2.0),
    ("INSECT", "FIRE", 0.5),
    ("INSECT", "POISON", 0.5),
    ("INSECT", "METAL", 0.5),
    ("SPIRIT", "PSYCHIC", 2.0),
    ("SPIRIT", "SHADOW", 2.0),
    ("SPIRIT", "POISON", 0.5),
    ("SPIRIT", "SPIRIT", 0.5),
    ("SPIRIT", "VOID", 0.0),
    ("DRAGON", "DRAGON", 2.0),
    ("DRAGON", "BEAST", 2.0),
    ("DRAGON", "METAL", 0.5),
    ("BEAST", "SPIRIT", 2.0),
    ("BEAST", "SHADOW", 2.0),
    ("BEAST", "METAL", 0.5),
    ("BEAST", "PSYCHIC", 0.5),
    ("VOID", "PSYCHIC", 2.0),
    ("VOID", "SPIRIT", 2.0),
    ("VOID", "LIGHT", 0.5),
    ("VOID", "VOID", 0.5),
];

fn matrix() -> &'static HashMap<(&'static str, &'static str), f64> {
    static MATRIX: OnceLock<HashMap<(&'static str, &'static str), f64>> = OnceLock::new();
    MATRIX.get_or_init(|| {
        EFFECTIVENESS_ENTRIES
            .iter()
            .map(|&(atk, def, mult)| ((atk, def), mult))
            .collect()
    })
}

/// Raw effectiveness multiplier for `attacking` against `defending`, before
/// the 1.5x super-effective cap applied in `cc_engine`'s damage formula.
/// Missing pairs default to 1.0.
pub fn effectiveness(attacking: &str, defending: &str) -> f64 {
    matrix()
        .get(&(attacking, defending))
        .copied()
        .unwrap_or(1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_types_present_and_unique() {
        assert_eq!(ALL_TYPES.len(), 18);
        let mut sorted = ALL_TYPES.to_vec();
        sorted.sort();
        sorted.dedup();
        assert_eq!(sorted.len(), 18);
    }

    #[test]
    fn missing_pair_defaults_to_neutral() {
        assert_eq!(effectiveness("FIRE", "PSYCHIC"), 1.0);
    }

    #[test]
    fn known_super_effective_pair() {
        assert_eq!(effectiveness("WATER", "FIRE"), 2.0);
    }

    #[test]
    fn known_immunity() {
        assert_eq!(effectiveness("ELECTRIC", "EARTH"), 0.0);
    }
}
