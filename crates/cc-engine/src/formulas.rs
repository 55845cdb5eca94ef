//! Pure stat and damage math — §4.2.
//!
//! Every function here is stateless: given the same inputs (including the
//! RNG stream position) it always returns the same result. No battle state
//! is mutated; `resolution` is the only module that writes anything back.

use cc_data::abilities::AbilityEffect;
use cc_data::{abilities, moves::MoveDefinition, types};
use cc_types::enums::{MoveCategory, Stat};
use cc_types::{BattleRng, BattleSideState};

/// `maxHP(base, level)`: monotone in both base and level. EVs are not part
/// of this arena's agent model (no training mechanic), so the formula's
/// `ev` term is fixed at zero rather than threaded through as a parameter.
pub fn max_hp(base: u8, level: u32) -> u32 {
    (2 * base as u32 * level) / 100 + level + 10
}

/// `effectiveStat(base, level, natureMult)`, pre-stage. `natureMult` is
/// 0.9/1.0/1.1 from `cc_data::natures::nature_multiplier`.
pub fn effective_stat(base: u8, level: u32, nature_mult: f64) -> u32 {
    let raw = (2 * base as u32 * level) / 100 + 5;
    (raw as f64 * nature_mult).floor() as u32
}

/// A staged stat reads the battle-start snapshot and applies the current
/// stage multiplier live; the snapshot itself is never rewritten mid-battle.
fn staged(side: &BattleSideState, base: u32, stat: Stat) -> f64 {
    base as f64 * cc_data::stat_stage::stage_multiplier(side.stage(stat))
}

fn attacking_stat(side: &BattleSideState, category: MoveCategory) -> f64 {
    match category {
        MoveCategory::Physical => staged(side, side.effective_stats.attack, Stat::Attack),
        MoveCategory::Special => staged(side, side.effective_stats.sp_atk, Stat::SpAtk),
        MoveCategory::Status => 0.0,
    }
}

fn defending_stat(side: &BattleSideState, category: MoveCategory, use_physical_def: bool) -> f64 {
    if use_physical_def {
        return staged(side, side.effective_stats.defense, Stat::Defense);
    }
    match category {
        MoveCategory::Physical => staged(side, side.effective_stats.defense, Stat::Defense),
        MoveCategory::Special => staged(side, side.effective_stats.sp_def, Stat::SpDef),
        MoveCategory::Status => 0.0,
    }
}

fn scaled_power(power: u16, level: u32) -> f64 {
    power as f64 * (2.0 * level as f64 / 5.0 + 2.0)
}

fn has_effect(mv: &MoveDefinition, f: impl Fn(&cc_types::MoveEffect) -> bool) -> bool {
    mv.effect.as_ref().is_some_and(f)
}

/// Result of one damage calculation — the pieces the turn log needs on top
/// of the raw number.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DamageResult {
    pub damage: u32,
    pub crit: bool,
    pub type_effectiveness: f64,
}

/// `damage(attacker, defender, move, rng)` — §4.2's pseudo-formula,
/// including the ability deltas it names. Assumes the move has already
/// passed its accuracy roll and any dodge/immunity checks.
pub fn compute_damage(
    attacker: &BattleSideState,
    defender: &BattleSideState,
    mv: &MoveDefinition,
    rng: &mut BattleRng,
) -> DamageResult {
    let use_physical_def = has_effect(mv, |e| matches!(e, cc_types::MoveEffect::UsePhysicalDef));
    let atk = attacking_stat(attacker, mv.category);
    let def = defending_stat(defender, mv.category, use_physical_def).max(1.0);

    let mut base = (atk / def) * scaled_power(mv.power, attacker.level) * 0.25;

    if let Some(cc_types::MoveEffect::HpScaling { floor_fraction }) = &mv.effect {
        base *= attacker.hp_fraction().max(*floor_fraction);
    }
    if has_effect(mv, |e| matches!(e, cc_types::MoveEffect::DoubleIfPoisoned))
        && defender.status == cc_types::enums::StatusCondition::Poison
    {
        base *= 2.0;
    }

    let attacker_ability = abilities::get_ability(attacker.ability.as_str());
    let defender_ability = abilities::get_ability(defender.ability.as_str());

    let stab = match attacker_ability.map(|a| a.effect) {
        Some(AbilityEffect::AdaptabilityStab { multiplier }) if mv.type_id == attacker.primary_type.as_str() => {
            multiplier
        }
        _ if mv.type_id == attacker.primary_type.as_str() => 1.5,
        _ => 1.0,
    };

    let mut eff = types::effectiveness(mv.type_id, defender.primary_type.as_str()).min(1.5);
    if eff > 1.0 {
        if let Some(AbilityEffect::SuperEffectiveReduction { multiplier }) =
            defender_ability.map(|a| a.effect)
        {
            eff *= multiplier;
        }
    }

    if let Some(ability) = attacker_ability {
        match ability.effect {
            AbilityEffect::LowHpTypeBoost { type_id, threshold, multiplier }
                if mv.type_id == type_id && attacker.hp_fraction() < threshold =>
            {
                base *= multiplier;
            }
            AbilityEffect::StatusedAttackBoost { multiplier }
                if mv.category == MoveCategory::Physical
                    && attacker.status != cc_types::enums::StatusCondition::None =>
            {
                base *= multiplier;
            }
            AbilityEffect::CategoryBoost { category, multiplier } if mv.category == category => {
                base *= multiplier;
            }
            AbilityEffect::SituationalBoost { multiplier } if mv.type_id == attacker.primary_type.as_str() => {
                base *= multiplier;
            }
            AbilityEffect::IgnoreDefenseFraction { fraction } => {
                // Already folded into `def` would require recomputing; applied as a
                // post-hoc boost equivalent to a smaller defensive stat.
                base *= 1.0 / (1.0 - fraction).max(0.01);
            }
            _ => {}
        }
    }
    if let Some(AbilityEffect::FullHpDamageReduction { multiplier }) = defender_ability.map(|a| a.effect) {
        if defender.is_full_hp() {
            base *= multiplier;
        }
    }

    let crit_chance = if has_effect(mv, |e| matches!(e, cc_types::MoveEffect::HighCrit)) {
        0.125
    } else {
        0.0625
    };
    let crit = rng.next_f64() < crit_chance;
    let crit_mult = if crit { 1.25 } else { 1.0 };

    let rand_mult = 0.85 + rng.next_f64() * 0.15;

    let burn_mult = if attacker.status == cc_types::enums::StatusCondition::Burned
        && mv.category == MoveCategory::Physical
    {
        0.5
    } else {
        1.0
    };

    let raw = base * stab * eff * crit_mult * rand_mult * burn_mult;
    let damage = raw.max(1.0).floor() as u32;

    DamageResult { damage, crit, type_effectiveness: eff }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn max_hp_is_monotone_in_level() {
        assert!(max_hp(20, 10) < max_hp(20, 20));
    }

    #[test]
    fn max_hp_is_monotone_in_base() {
        assert!(max_hp(10, 10) < max_hp(30, 10));
    }

    #[test]
    fn effective_stat_applies_nature_mult() {
        let neutral = effective_stat(20, 10, 1.0);
        let boosted = effective_stat(20, 10, 1.1);
        assert!(boosted >= neutral);
    }
}
