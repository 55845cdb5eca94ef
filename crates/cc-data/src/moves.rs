//! Move catalog — §4.1.
//!
//! Every type has a pool of four moves, looked up by `moves_for_type`. Move
//! ids are globally unique; a handful (`recover`) appear in every pool since
//! they are not type-specific.

use std::collections::HashMap;
use std::sync::OnceLock;

use cc_types::enums::{MoveCategory, Stat, StatusCondition};
use cc_types::{MoveEffect, MoveId};

/// Static move definition. `type_id` and `id`/`name` are `&'static str`
/// since the catalog is immutable process-wide state.
#[derive(Debug, Clone, PartialEq)]
pub struct MoveDefinition {
    pub id: &'static str,
    pub name: &'static str,
    pub type_id: &'static str,
    pub category: MoveCategory,
    pub power: u16,
    pub accuracy: u8,
    pub pp: u8,
    pub priority: i8,
    pub effect: Option<MoveEffect>,
}

const RECOVER: MoveDefinition = MoveDefinition {
    id: "recover",
    name: "Recover",
    type_id: "NORMAL",
    category: MoveCategory::Status,
    power: 0,
    accuracy: 100,
    pp: 10,
    priority: 0,
    effect: Some(MoveEffect::Heal {
        fraction: 0.5,
        deferred: false,
    }),
};

macro_rules! mv {
    ($id:literal, $name:literal, $type_id:literal, $cat:expr, $power:expr, $acc:expr, $pp:expr) => {
        MoveDefinition {
            id: $id,
            name: $name,
            type_id: $type_id,
            category: $cat,
            power: $power,
            accuracy: $acc,
            pp: $pp,
            priority: 0,
            effect: None,
        }
    };
    ($id:literal, $name:literal, $type_id:literal, $cat:expr, $power:expr, $acc:expr, $pp:expr, $prio:expr) => {
        MoveDefinition {
            id: $id,
            name: $name,
            type_id: $type_id,
            category: $cat,
            power: $power,
            accuracy: $acc,
            pp: $pp,
            priority: $prio,
            effect: None,
        }
    };
    ($id:literal, $name:literal, $type_id:literal, $cat:expr, $power:expr, $acc:expr, $pp:expr, $prio:expr, $effect:expr) => {
        MoveDefinition {
            id: $id,
            name: $name,
            type_id: $type_id,
            category: $cat,
            power: $power,
            accuracy: $acc,
            pp: $pp,
            priority: $prio,
            effect: Some($effect),
        }
    };
}

use MoveCategory::{Physical, Special, Status};

const ALL_MOVES: &[MoveDefinition] = &[
    RECOVER,
    // FIRE
    mv!(
        "fire_blast", "Fire Blast", "FIRE", Special, 110, 85, 8, 0,
        MoveEffect::StatusInflict { status: StatusCondition::Burned, chance: 0.1 }
    ),
    mv!(
        "flamethrower", "Flamethrower", "FIRE", Special, 95, 100, 12, 0,
        MoveEffect::StatusInflict { status: StatusCondition::Burned, chance: 0.1 }
    ),
    mv!(
        "fire_punch", "Fire Punch", "FIRE", Physical, 75, 100, 15, 0,
        MoveEffect::StatusInflict { status: StatusCondition::Burned, chance: 0.1 }
    ),
    // WATER
    mv!("hydro_pump", "Hydro Pump", "WATER", Special, 110, 85, 8),
    mv!("surf", "Surf", "WATER", Special, 95, 100, 12),
    mv!("aqua_jet", "Aqua Jet", "WATER", Physical, 40, 100, 20, 1),
    // GRASS
    mv!("solar_beam", "Solar Beam", "GRASS", Special, 110, 85, 8),
    mv!(
        "energy_ball", "Energy Ball", "GRASS", Special, 90, 100, 10, 0,
        MoveEffect::StatDrop { stat: Stat::SpDef, stages: -1 }
    ),
    mv!("leech_seed", "Leech Seed", "GRASS", Status, 0, 90, 10, 0, MoveEffect::LeechSeed),
    // ELECTRIC
    mv!(
        "thunder", "Thunder", "ELECTRIC", Special, 110, 70, 8, 0,
        MoveEffect::StatusInflict { status: StatusCondition::Paralysis, chance: 0.3 }
    ),
    mv!(
        "discharge", "Discharge", "ELECTRIC", Special, 85, 100, 12, 0,
        MoveEffect::StatusInflict { status: StatusCondition::Paralysis, chance: 0.1 }
    ),
    mv!("volt_tackle", "Volt Tackle", "ELECTRIC", Physical, 90, 100, 10, 0, MoveEffect::Recoil { fraction: 0.25 }),
    // ICE
    mv!(
        "blizzard", "Blizzard", "ICE", Special, 110, 70, 8, 0,
        MoveEffect::StatusInflict { status: StatusCondition::Freeze, chance: 0.1 }
    ),
    mv!(
        "ice_beam", "Ice Beam", "ICE", Special, 90, 100, 12, 0,
        MoveEffect::StatusInflict { status: StatusCondition::Freeze, chance: 0.1 }
    ),
    mv!("ice_shard", "Ice Shard", "ICE", Physical, 40, 100, 20, 1),
    // EARTH
    mv!("earthquake", "Earthquake", "EARTH", Physical, 100, 100, 10),
    mv!("fissure", "Fissure", "EARTH", Physical, 0, 30, 5, 0, MoveEffect::Ohko),
    mv!("mud_strike", "Mud Strike", "EARTH", Physical, 70, 100, 20),
    // AIR
    mv!(
        "hurricane", "Hurricane", "AIR", Special, 110, 70, 8, 0,
        MoveEffect::StatusInflict { status: StatusCondition::Confusion, chance: 0.3 }
    ),
    mv!("air_slash", "Air Slash", "AIR", Special, 85, 95, 12, 0, MoveEffect::Flinch { chance: 0.3 }),
    mv!("wing_strike", "Wing Strike", "AIR", Physical, 75, 100, 15),
    // PSYCHIC
    mv!(
        "psychic", "Psychic", "PSYCHIC", Special, 95, 100, 12, 0,
        MoveEffect::StatDrop { stat: Stat::SpDef, stages: -1 }
    ),
    mv!("psyshock", "Psyshock", "PSYCHIC", Special, 85, 100, 12, 0, MoveEffect::UsePhysicalDef),
    mv!(
        "calm_mind", "Calm Mind", "PSYCHIC", Status, 0, 100, 20, 0,
        MoveEffect::StatBoost { stat: Stat::SpAtk, stages: 2 }
    ),
    // SHADOW
    mv!(
        "shadow_ball", "Shadow Ball", "SHADOW", Special, 90, 100, 12, 0,
        MoveEffect::StatDrop { stat: Stat::SpDef, stages: -1 }
    ),
    mv!("curse", "Curse", "SHADOW", Status, 0, 100, 10, 0, MoveEffect::Curse { self_fraction: 0.25 }),
    mv!("night_strike", "Night Strike", "SHADOW", Physical, 75, 100, 15, 0, MoveEffect::Flinch { chance: 0.2 }),
    // LIGHT
    mv!("dazzling_beam", "Dazzling Beam", "LIGHT", Special, 95, 100, 12),
    mv!(
        "moonblast", "Moonblast", "LIGHT", Special, 95, 100, 12, 0,
        MoveEffect::StatDrop { stat: Stat::SpAtk, stages: -1 }
    ),
    mv!("holy_strike", "Holy Strike", "LIGHT", Physical, 75, 100, 15),
    // METAL
    mv!(
        "flash_cannon", "Flash Cannon", "METAL", Special, 90, 100, 12, 0,
        MoveEffect::StatDrop { stat: Stat::SpDef, stages: -1 }
    ),
    mv!("razor_edge", "Razor Edge", "METAL", Physical, 65, 100, 15, 0, MoveEffect::HighCrit),
    mv!("iron_head", "Iron Head", "METAL", Physical, 80, 100, 15, 0, MoveEffect::Flinch { chance: 0.3 }),
    // POISON
    mv!(
        "sludge_bomb", "Sludge Bomb", "POISON", Special, 90, 100, 12, 0,
        MoveEffect::StatusInflict { status: StatusCondition::Poison, chance: 0.3 }
    ),
    mv!("venom_burst", "Venom Burst", "POISON", Special, 65, 100, 15, 0, MoveEffect::DoubleIfPoisoned),
    mv!(
        "poison_fang", "Poison Fang", "POISON", Physical, 70, 100, 15, 0,
        MoveEffect::StatusInflict { status: StatusCondition::Poison, chance: 0.3 }
    ),
    // ROCK
    mv!("rock_slide", "Rock Slide", "ROCK", Physical, 75, 90, 10, 0, MoveEffect::Flinch { chance: 0.3 }),
    mv!("head_smash", "Head Smash", "ROCK", Physical, 120, 80, 8, 0, MoveEffect::Recoil { fraction: 0.5 }),
    mv!("focus_drill", "Focus Drill", "ROCK", Physical, 150, 90, 5, 0, MoveEffect::Focus),
    // INSECT
    mv!("megahorn", "Megahorn", "INSECT", Physical, 110, 85, 10),
    mv!("megadrain", "Megadrain", "INSECT", Special, 65, 100, 15, 0, MoveEffect::Drain { fraction: 0.5 }),
    mv!("bug_bite", "Bug Bite", "INSECT", Physical, 60, 100, 20),
    // SPIRIT
    mv!("shadow_sneak", "Shadow Sneak", "SPIRIT", Physical, 40, 100, 20, 1),
    mv!(
        "spirit_wave", "Spirit Wave", "SPIRIT", Special, 90, 100, 12, 0,
        MoveEffect::StatDrop { stat: Stat::SpAtk, stages: -1 }
    ),
    mv!("haze", "Haze", "SPIRIT", Status, 0, 100, 20, 0, MoveEffect::ResetStats),
    // DRAGON
    mv!("dragon_pulse", "Dragon Pulse", "DRAGON", Special, 90, 100, 10),
    mv!("outrage", "Outrage", "DRAGON", Physical, 110, 100, 10),
    mv!(
        "dragon_dance", "Dragon Dance", "DRAGON", Status, 0, 100, 20, 0,
        MoveEffect::StatBoost { stat: Stat::Attack, stages: 1 }
    ),
    // BEAST
    mv!("last_stand", "Last Stand", "BEAST", Physical, 120, 100, 15, 0, MoveEffect::HpScaling { floor_fraction: 0.2 }),
    mv!(
        "close_combat", "Close Combat", "BEAST", Physical, 100, 100, 15, 0,
        MoveEffect::StatDrop { stat: Stat::Defense, stages: -1 }
    ),
    mv!(
        "howl", "Howl", "BEAST", Status, 0, 100, 20, 0,
        MoveEffect::StatBoost { stat: Stat::Attack, stages: 1 }
    ),
    // VOID
    mv!(
        "void_beam", "Void Beam", "VOID", Special, 95, 100, 12, 0,
        MoveEffect::StatDrop { stat: Stat::SpAtk, stages: -1 }
    ),
    mv!("annihilate", "Annihilate", "VOID", Special, 120, 75, 5),
    mv!("phase_strike", "Phase Strike", "VOID", Physical, 70, 100, 15),
];

fn by_id() -> &'static HashMap<&'static str, &'static MoveDefinition> {
    static BY_ID: OnceLock<HashMap<&'static str, &'static MoveDefinition>> = OnceLock::new();
    BY_ID.get_or_init(|| ALL_MOVES.iter().map(|m| (m.id, m)).collect())
}

fn by_type() -> &'static HashMap<&'static str, Vec<&'static MoveDefinition>> {
    static BY_TYPE: OnceLock<HashMap<&'static str, Vec<&'static MoveDefinition>>> = OnceLock::new();
    BY_TYPE.get_or_init(|| {
        let mut map: HashMap<&'static str, Vec<&'static MoveDefinition>> = HashMap::new();
        for t in super::types::ALL_TYPES {
            map.insert(t, vec![&RECOVER]);
        }
        for m in ALL_MOVES {
            if m.id == "recover" {
                continue;
            }
            map.entry(m.type_id).or_default().push(m);
        }
        map
    })
}

pub fn get_move(id: &str) -> Option<&'static MoveDefinition> {
    by_id().get(id).copied()
}

/// The pool of move ids available to agents of the given type (always
/// includes the shared `recover` move alongside the type's own attacks).
pub fn moves_for_type(type_id: &str) -> Vec<MoveId> {
    by_type()
        .get(type_id)
        .map(|moves| moves.iter().map(|m| MoveId::from(m.id)).collect())
        .unwrap_or_default()
}

/// §3 invariant: every move id on an agent must belong to that type's pool.
pub fn is_move_in_type_pool(type_id: &str, move_id: &str) -> bool {
    by_type()
        .get(type_id)
        .map(|moves| moves.iter().any(|m| m.id == move_id))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_type_has_at_least_four_moves() {
        for t in super::super::types::ALL_TYPES {
            let pool = moves_for_type(t);
            assert!(pool.len() >= 4, "type {t} has only {} moves", pool.len());
        }
    }

    #[test]
    fn recover_is_shared() {
        assert!(is_move_in_type_pool("FIRE", "recover"));
        assert!(is_move_in_type_pool("WATER", "recover"));
    }

    #[test]
    fn scenario_fire_pool_matches_spec_example() {
        for id in ["fire_blast", "flamethrower", "fire_punch", "recover"] {
            assert!(is_move_in_type_pool("FIRE", id), "missing {id}");
        }
    }

    #[test]
    fn scenario_water_pool_matches_spec_example() {
        for id in ["hydro_pump", "surf", "aqua_jet", "recover"] {
            assert!(is_move_in_type_pool("WATER", id), "missing {id}");
        }
    }

    #[test]
    fn unknown_move_is_none() {
        assert!(get_move("not_a_real_move").is_none());
    }

    #[test]
    fn status_move_has_zero_power() {
        let recover = get_move("recover").unwrap();
        assert_eq!(recover.power, 0);
        assert_eq!(recover.category, MoveCategory::Status);
    }
}
