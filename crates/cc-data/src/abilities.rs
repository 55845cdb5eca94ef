//! Ability catalog — §4.1/§4.2.
//!
//! Each ability carries a trigger tag and a parametrized effect; the engine
//! matches on `AbilityEffect` rather than on the ability's name so that new
//! abilities only ever require a new catalog entry, never a new engine
//! branch, as long as their mechanic fits an existing effect shape.

use std::collections::HashMap;
use std::sync::OnceLock;

use cc_types::enums::{AbilityTrigger, MoveCategory, StatusCondition};
use cc_types::AbilityId;

/// Parametrized ability mechanics. Constants (thresholds, percentages) are
/// baked into the catalog entry rather than the engine so tuning an ability
/// never touches `cc-engine`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AbilityEffect {
    /// Boosts same-type moves when the holder is below `threshold` HP
    /// fraction. Blaze, Torrent, Overgrow, Swarm.
    LowHpTypeBoost { type_id: &'static str, threshold: f64, multiplier: f64 },
    /// Boosts physical damage while the holder carries a status condition.
    /// Guts.
    StatusedAttackBoost { multiplier: f64 },
    /// Boosts moves of one category. Iron Fist.
    CategoryBoost { category: MoveCategory, multiplier: f64 },
    /// Reduces incoming damage while the holder is at full HP. Multiscale.
    FullHpDamageReduction { multiplier: f64 },
    /// Flat situational damage boost applied at damage_calc. Dark Aura,
    /// Pixilate.
    SituationalBoost { multiplier: f64 },
    /// Attacker ignores a fraction of the defender's relevant defense stat.
    /// Corrosion.
    IgnoreDefenseFraction { fraction: f64 },
    /// Same-type attack bonus is this multiplier instead of the default 1.5.
    /// Adaptability.
    AdaptabilityStab { multiplier: f64 },
    /// Scales down super-effective damage taken. Resilience, Solid Rock,
    /// Filter.
    SuperEffectiveReduction { multiplier: f64 },
    /// Chance to dodge an incoming hit entirely, checked before the
    /// accuracy roll. Telepathy, Sand Veil.
    DodgeChance { chance: f64 },
    /// Immune to one type's moves, instead healing by a fraction of max HP.
    /// Volt Absorb.
    AbsorbType { type_id: &'static str, heal_fraction: f64 },
    /// Immune to one type's moves outright. Levitate.
    ImmuneToType { type_id: &'static str },
    /// Adds to the holder's priority bracket while at full HP. Gale Wings.
    PriorityBoostAtFullHp { bonus: i8 },
    /// Multiplies the accuracy roll denominator, capped at 100 by the
    /// engine. Compound Eyes.
    AccuracyMultiplier { multiplier: f64 },
    /// Survives a hit that would KO from full HP, once per battle. Sturdy.
    SurviveLethalAtFullHp,
    /// On landing a contact hit, chance to inflict a status on the
    /// defender. Inferno, Permafrost, Static, Poison Touch.
    ContactStatusChance { status: StatusCondition, chance: f64 },
    /// On being hit, chance to drop the attacker's highest stat. Cursed
    /// Body.
    ContactStatDropChance { chance: f64 },
    /// Heals a fraction of max HP at end of turn. Hydration, Photosynthesis,
    /// Ice Body.
    EndTurnHeal { fraction: f64 },
}

#[derive(Debug, Clone, PartialEq)]
pub struct AbilityDefinition {
    pub id: &'static str,
    pub name: &'static str,
    pub trigger: AbilityTrigger,
    pub effect: AbilityEffect,
}

macro_rules! ab {
    ($id:literal, $name:literal, $trigger:expr, $effect:expr) => {
        AbilityDefinition { id: $id, name: $name, trigger: $trigger, effect: $effect }
    };
}

use AbilityTrigger::{
    AccuracyCalc, BattleStart, BeforeFaint, BeforeHit, DamageCalc, DamageTaken, EndTurn,
};

const ALL_ABILITIES: &[AbilityDefinition] = &[
    ab!(
        "blaze", "Blaze", DamageCalc,
        AbilityEffect::LowHpTypeBoost { type_id: "FIRE", threshold: 0.33, multiplier: 1.5 }
    ),
    ab!(
        "torrent", "Torrent", DamageCalc,
        AbilityEffect::LowHpTypeBoost { type_id: "WATER", threshold: 0.33, multiplier: 1.5 }
    ),
    ab!(
        "overgrow", "Overgrow", DamageCalc,
        AbilityEffect::LowHpTypeBoost { type_id: "GRASS", threshold: 0.33, multiplier: 1.5 }
    ),
    ab!(
        "swarm", "Swarm", DamageCalc,
        AbilityEffect::LowHpTypeBoost { type_id: "INSECT", threshold: 0.33, multiplier: 1.5 }
    ),
    ab!("guts", "Guts", DamageCalc, AbilityEffect::StatusedAttackBoost { multiplier: 1.5 }),
    ab!(
        "iron_fist", "Iron Fist", DamageCalc,
        AbilityEffect::CategoryBoost { category: MoveCategory::Physical, multiplier: 1.1 }
    ),
    ab!(
        "multiscale", "Multiscale", DamageTaken,
        AbilityEffect::FullHpDamageReduction { multiplier: 0.75 }
    ),
    ab!("dark_aura", "Dark Aura", DamageCalc, AbilityEffect::SituationalBoost { multiplier: 1.15 }),
    ab!("pixilate", "Pixilate", DamageCalc, AbilityEffect::SituationalBoost { multiplier: 1.15 }),
    ab!(
        "corrosion", "Corrosion", DamageCalc,
        AbilityEffect::IgnoreDefenseFraction { fraction: 0.15 }
    ),
    ab!("adaptability", "Adaptability", DamageCalc, AbilityEffect::AdaptabilityStab { multiplier: 2.0 }),
    ab!(
        "resilience", "Resilience", DamageTaken,
        AbilityEffect::SuperEffectiveReduction { multiplier: 0.75 }
    ),
    ab!(
        "solid_rock", "Solid Rock", DamageTaken,
        AbilityEffect::SuperEffectiveReduction { multiplier: 0.75 }
    ),
    ab!("filter", "Filter", DamageTaken, AbilityEffect::SuperEffectiveReduction { multiplier: 0.75 }),
    ab!("telepathy", "Telepathy", BeforeHit, AbilityEffect::DodgeChance { chance: 0.1 }),
    ab!("sand_veil", "Sand Veil", BeforeHit, AbilityEffect::DodgeChance { chance: 0.1 }),
    ab!(
        "volt_absorb", "Volt Absorb", BeforeHit,
        AbilityEffect::AbsorbType { type_id: "ELECTRIC", heal_fraction: 0.25 }
    ),
    ab!("levitate", "Levitate", BeforeHit, AbilityEffect::ImmuneToType { type_id: "EARTH" }),
    ab!(
        "gale_wings", "Gale Wings", AbilityTrigger::SpeedCalc,
        AbilityEffect::PriorityBoostAtFullHp { bonus: 1 }
    ),
    ab!(
        "compound_eyes", "Compound Eyes", AccuracyCalc,
        AbilityEffect::AccuracyMultiplier { multiplier: 1.3 }
    ),
    ab!("sturdy", "Sturdy", BeforeFaint, AbilityEffect::SurviveLethalAtFullHp),
    ab!(
        "inferno", "Inferno", AbilityTrigger::AfterHit,
        AbilityEffect::ContactStatusChance { status: StatusCondition::Burned, chance: 0.15 }
    ),
    ab!(
        "permafrost", "Permafrost", AbilityTrigger::AfterHit,
        AbilityEffect::ContactStatusChance { status: StatusCondition::Freeze, chance: 0.1 }
    ),
    ab!(
        "static", "Static", AbilityTrigger::AfterHit,
        AbilityEffect::ContactStatusChance { status: StatusCondition::Paralysis, chance: 0.2 }
    ),
    ab!(
        "poison_touch", "Poison Touch", AbilityTrigger::AfterHit,
        AbilityEffect::ContactStatusChance { status: StatusCondition::Poison, chance: 0.15 }
    ),
    ab!(
        "cursed_body", "Cursed Body", AbilityTrigger::AfterHit,
        AbilityEffect::ContactStatDropChance { chance: 0.2 }
    ),
    ab!("hydration", "Hydration", EndTurn, AbilityEffect::EndTurnHeal { fraction: 0.0625 }),
    ab!("photosynthesis", "Photosynthesis", EndTurn, AbilityEffect::EndTurnHeal { fraction: 0.0625 }),
    ab!("ice_body", "Ice Body", EndTurn, AbilityEffect::EndTurnHeal { fraction: 0.0625 }),
];

/// Which abilities an agent of a given primary type is allowed to pick.
/// Every type has at least one native ability plus a couple of broadly
/// themed options; an ability may be available to more than one type.
const TYPE_ABILITIES: &[(&str, &[&str])] = &[
    ("FIRE", &["blaze", "inferno", "guts"]),
    ("WATER", &["torrent", "volt_absorb", "hydration"]),
    ("GRASS", &["overgrow", "photosynthesis", "guts"]),
    ("ELECTRIC", &["static", "volt_absorb", "compound_eyes"]),
    ("ICE", &["ice_body", "permafrost", "multiscale"]),
    ("EARTH", &["levitate", "solid_rock", "guts"]),
    ("AIR", &["gale_wings", "compound_eyes", "telepathy"]),
    ("PSYCHIC", &["telepathy", "adaptability", "dark_aura"]),
    ("SHADOW", &["cursed_body", "dark_aura", "pixilate"]),
    ("LIGHT", &["pixilate", "compound_eyes", "filter"]),
    ("METAL", &["iron_fist", "solid_rock", "filter"]),
    ("POISON", &["poison_touch", "corrosion", "guts"]),
    ("ROCK", &["solid_rock", "sturdy", "filter"]),
    ("INSECT", &["swarm", "compound_eyes", "sand_veil"]),
    ("SPIRIT", &["cursed_body", "sand_veil", "dark_aura"]),
    ("DRAGON", &["multiscale", "adaptability", "sturdy"]),
    ("BEAST", &["guts", "sand_veil", "sturdy"]),
    ("VOID", &["corrosion", "dark_aura", "cursed_body"]),
];

fn by_id() -> &'static HashMap<&'static str, &'static AbilityDefinition> {
    static BY_ID: OnceLock<HashMap<&'static str, &'static AbilityDefinition>> = OnceLock::new();
    BY_ID.get_or_init(|| ALL_ABILITIES.iter().map(|a| (a.id, a)).collect())
}

fn by_type() -> &'static HashMap<&'static str, &'static [&'static str]> {
    static BY_TYPE: OnceLock<HashMap<&'static str, &'static [&'static str]>> = OnceLock::new();
    BY_TYPE.get_or_init(|| TYPE_ABILITIES.iter().copied().collect())
}

pub fn get_ability(id: &str) -> Option<&'static AbilityDefinition> {
    by_id().get(id).copied()
}

pub fn abilities_for_type(type_id: &str) -> &'static [&'static str] {
    by_type().get(type_id).copied().unwrap_or(&[])
}

pub fn is_ability_allowed_for_type(type_id: &str, ability_id: &AbilityId) -> bool {
    abilities_for_type(type_id).contains(&ability_id.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_type_has_at_least_one_ability() {
        for type_id in super::super::types::ALL_TYPES {
            assert!(!abilities_for_type(type_id).is_empty(), "{type_id} has no abilities");
        }
    }

    #[test]
    fn every_type_ability_resolves_in_catalog() {
        for (_, ids) in TYPE_ABILITIES {
            for id in *ids {
                assert!(by_id().contains_key(id), "dangling ability id {id}");
            }
        }
    }

    #[test]
    fn unknown_ability_is_none() {
        assert!(get_ability("nonexistent").is_none());
    }

    #[test]
    fn known_ability_round_trips() {
        let def = get_ability("sturdy").unwrap();
        assert_eq!(def.name, "Sturdy");
        assert_eq!(def.effect, AbilityEffect::SurviveLethalAtFullHp);
    }
}
