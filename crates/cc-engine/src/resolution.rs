//! Turn resolution — §4.3's `resolveTurn` and its `applyMove` sub-steps.
//!
//! `resolve_turn` is the only function here that mutates a
//! `BattleStateBlob`; everything it calls either reads state or appends to
//! the event log. The caller (the battle coordinator) is responsible for
//! persisting the returned state and turn log and for translating a
//! `Some(outcome)` into the battle row's terminal fields.

use cc_data::abilities::{self, AbilityEffect};
use cc_data::moves::{self, MoveDefinition};
use cc_types::enums::{AbilityTrigger, Side, StatusCondition};
use cc_types::{BattleEndReason, BattleSideState, BattleStateBlob, MoveEffect, TurnEvent};

use crate::formulas;

/// Balance constants not spelled out as exact numbers in the design: these
/// are the values chosen to satisfy the named percentages/fractions.
mod constants {
    pub const BURN_FRACTION: f64 = 0.0625;
    pub const POISON_FRACTION: f64 = 1.0 / 12.0;
    pub const LEECH_SEED_FRACTION: f64 = 0.125;
    pub const CURSE_DAMAGE_FRACTION: f64 = 0.25;
    pub const WISH_HEAL_FRACTION: f64 = 0.5;
    pub const FOCUS_FAIL_CHANCE: f64 = 0.1;
    pub const PARALYSIS_SKIP_CHANCE: f64 = 0.15;
    pub const CONFUSION_SELF_HIT_CHANCE: f64 = 0.25;
    pub const CONFUSION_SELF_HIT_FRACTION: f64 = 0.1;
    pub const CONFUSION_MAX_TURNS: u8 = 3;
    pub const SLEEP_WAKE_TURN: u8 = 2;
}
use constants::*;

/// Non-terminal outcome of a resolved turn; `None` means the battle is
/// still active.
pub type TurnOutcome = Option<(Side, BattleEndReason)>;

fn heal_amount(side: &BattleSideState, fraction: f64) -> u32 {
    let missing = side.max_hp.saturating_sub(side.current_hp);
    let full = (side.max_hp as f64 * fraction).floor() as u32;
    full.min(missing)
}

fn damage_fraction(side: &BattleSideState, fraction: f64) -> u32 {
    ((side.max_hp as f64 * fraction).floor() as u32).max(1).min(side.current_hp)
}

fn best_boosted_stat(side: &BattleSideState) -> cc_types::enums::Stat {
    cc_types::enums::Stat::STAGED
        .into_iter()
        .max_by_key(|s| side.stage(*s))
        .unwrap_or(cc_types::enums::Stat::Attack)
}

/// Step 2: which side acts first this turn.
fn determine_first_side(state: &mut BattleStateBlob, move_a: &MoveDefinition, move_b: &MoveDefinition) -> Side {
    let gale_wings_bonus = |side: &BattleSideState, mv: &MoveDefinition| -> i8 {
        let has_gale_wings = abilities::get_ability(side.ability.as_str())
            .map(|a| matches!(a.effect, AbilityEffect::PriorityBoostAtFullHp { .. }))
            .unwrap_or(false);
        if has_gale_wings && side.is_full_hp() {
            if let AbilityEffect::PriorityBoostAtFullHp { bonus } =
                abilities::get_ability(side.ability.as_str()).unwrap().effect
            {
                return mv.priority + bonus;
            }
        }
        mv.priority
    };

    let prio_a = gale_wings_bonus(&state.side_a, move_a);
    let prio_b = gale_wings_bonus(&state.side_b, move_b);
    if prio_a != prio_b {
        return if prio_a > prio_b { Side::A } else { Side::B };
    }

    let speed_with_paralysis = |side: &BattleSideState| -> f64 {
        let staged = side.effective_stats.speed as f64
            * cc_data::stat_stage::stage_multiplier(side.stage(cc_types::enums::Stat::Speed));
        if side.status == StatusCondition::Paralysis {
            staged * 0.5
        } else {
            staged
        }
    };
    let speed_a = speed_with_paralysis(&state.side_a);
    let speed_b = speed_with_paralysis(&state.side_b);
    if speed_a != speed_b {
        return if speed_a > speed_b { Side::A } else { Side::B };
    }

    if state.side_a.level != state.side_b.level {
        return if state.side_a.level > state.side_b.level { Side::A } else { Side::B };
    }

    if state.side_a.base_stats.speed != state.side_b.base_stats.speed {
        return if state.side_a.base_stats.speed > state.side_b.base_stats.speed {
            Side::A
        } else {
            Side::B
        };
    }

    if state.rng.coin_flip() {
        Side::A
    } else {
        Side::B
    }
}

struct MoveOutcome {
    events: Vec<TurnEvent>,
    deduct_pp: bool,
}

/// §4.3.3 step (h): PP is spent whenever a move was actually attempted,
/// even if it missed, was dodged, or its status check consumed the turn.
/// It is not spent on a confusion self-hit, since no move was used.
fn deduct_pp(state: &mut BattleStateBlob, side: Side, move_id: &cc_types::MoveId) {
    if let Some(slot) = state.side_mut(side).moves.iter_mut().find(|m| &m.move_id == move_id) {
        slot.current_pp = slot.current_pp.saturating_sub(1);
    }
}

/// §4.3.3's `applyMove` — steps (a) through (h) for one side's move.
fn apply_move(state: &mut BattleStateBlob, mover: Side, move_id: &cc_types::MoveId) -> MoveOutcome {
    let mut events = vec![TurnEvent::UseMove { side: mover, move_id: move_id.clone() }];
    let opponent = mover.opposite();

    // (a) flinch
    if state.side(mover).per_turn.flinched {
        events.push(TurnEvent::Flinch { side: mover });
        return MoveOutcome { events, deduct_pp: true };
    }

    // (b) status-on-mover checks
    match state.side(mover).status {
        StatusCondition::Freeze => {
            let s = state.side_mut(mover);
            s.status = StatusCondition::None;
            s.status_counters.freeze_turns = 0;
            events.push(TurnEvent::Status { side: mover, status: StatusCondition::None });
            return MoveOutcome { events, deduct_pp: true };
        }
        StatusCondition::Sleep => {
            let s = state.side_mut(mover);
            s.status_counters.sleep_turns += 1;
            let wake = s.status_counters.sleep_turns >= SLEEP_WAKE_TURN || s.status_counters.woke_from_damage;
            if wake {
                s.status = StatusCondition::None;
                s.status_counters.sleep_turns = 0;
                s.status_counters.woke_from_damage = false;
                events.push(TurnEvent::Status { side: mover, status: StatusCondition::None });
            } else {
                events.push(TurnEvent::Status { side: mover, status: StatusCondition::Sleep });
                return MoveOutcome { events, deduct_pp: true };
            }
        }
        StatusCondition::Paralysis => {
            if state.rng.roll(PARALYSIS_SKIP_CHANCE) {
                events.push(TurnEvent::Status { side: mover, status: StatusCondition::Paralysis });
                return MoveOutcome { events, deduct_pp: true };
            }
        }
        StatusCondition::Confusion => {
            let s = state.side_mut(mover);
            s.status_counters.confusion_turns += 1;
            if s.status_counters.confusion_turns >= CONFUSION_MAX_TURNS {
                s.status = StatusCondition::None;
                s.status_counters.confusion_turns = 0;
                events.push(TurnEvent::Status { side: mover, status: StatusCondition::None });
            } else if state.rng.roll(CONFUSION_SELF_HIT_CHANCE) {
                let amount = damage_fraction(state.side(mover), CONFUSION_SELF_HIT_FRACTION);
                let s = state.side_mut(mover);
                s.current_hp = s.current_hp.saturating_sub(amount);
                events.push(TurnEvent::ConfusionSelfHit { side: mover, amount });
                return MoveOutcome { events, deduct_pp: false };
            }
        }
        _ => {}
    }

    let Some(mv) = moves::get_move(move_id.as_str()) else {
        return MoveOutcome { events, deduct_pp: false };
    };

    // (c) opponent ability immunities
    if let Some(ability) = abilities::get_ability(state.side(opponent).ability.as_str()) {
        match ability.effect {
            AbilityEffect::DodgeChance { chance } if state.rng.roll(chance) => {
                events.push(TurnEvent::Dodge { side: opponent });
                return MoveOutcome { events, deduct_pp: true };
            }
            AbilityEffect::AbsorbType { type_id, heal_fraction } if mv.type_id == type_id => {
                let amount = heal_amount(state.side(opponent), heal_fraction);
                state.side_mut(opponent).current_hp += amount;
                events.push(TurnEvent::Heal { side: opponent, amount });
                return MoveOutcome { events, deduct_pp: true };
            }
            AbilityEffect::ImmuneToType { type_id } if mv.type_id == type_id => {
                events.push(TurnEvent::Immune { side: opponent });
                return MoveOutcome { events, deduct_pp: true };
            }
            _ => {}
        }
    }

    // (d) accuracy roll
    let accuracy_mult = abilities::get_ability(state.side(mover).ability.as_str())
        .map(|a| match a.effect {
            AbilityEffect::AccuracyMultiplier { multiplier } => multiplier,
            _ => 1.0,
        })
        .unwrap_or(1.0);
    let accuracy = (mv.accuracy as f64 * accuracy_mult).min(100.0);
    if !state.rng.roll(accuracy / 100.0) {
        events.push(TurnEvent::Miss { side: mover });
        return MoveOutcome { events, deduct_pp: true };
    }

    // (e) OHKO
    if matches!(mv.effect, Some(MoveEffect::Ohko)) {
        let survives_sturdy = state.side(opponent).is_full_hp()
            && state.side(opponent).ability.as_str() == "sturdy"
            && !state.side(opponent).persistent.sturdy_used;
        if survives_sturdy {
            let s = state.side_mut(opponent);
            s.current_hp = 1;
            s.persistent.sturdy_used = true;
            events.push(TurnEvent::Ohko { side: opponent });
            events.push(TurnEvent::Ability { side: opponent, ability: "Sturdy".to_string() });
        } else {
            state.side_mut(opponent).current_hp = 0;
            events.push(TurnEvent::Ohko { side: opponent });
        }
        return MoveOutcome { events, deduct_pp: true };
    }

    // Focus: a chance to fail before committing to a high-power move.
    if matches!(mv.effect, Some(MoveEffect::Focus)) && state.rng.roll(FOCUS_FAIL_CHANCE) {
        events.push(TurnEvent::FocusFail { side: mover });
        return MoveOutcome { events, deduct_pp: true };
    }

    if mv.power > 0 {
        apply_damaging_move(state, mover, opponent, mv, &mut events);
    } else {
        apply_status_move(state, mover, opponent, mv, &mut events);
    }

    MoveOutcome { events, deduct_pp: true }
}

fn apply_damaging_move(
    state: &mut BattleStateBlob,
    mover: Side,
    opponent: Side,
    mv: &MoveDefinition,
    events: &mut Vec<TurnEvent>,
) {
    let (mover_side, opponent_side) = match mover {
        Side::A => (&state.side_a, &state.side_b),
        Side::B => (&state.side_b, &state.side_a),
    };
    let result = formulas::compute_damage(mover_side, opponent_side, mv, &mut state.rng);

    let would_ko_from_full = state.side(opponent).is_full_hp() && result.damage >= state.side(opponent).current_hp;
    let sturdy_saves = would_ko_from_full
        && state.side(opponent).ability.as_str() == "sturdy"
        && !state.side(opponent).persistent.sturdy_used;

    let was_asleep = state.side(opponent).status == StatusCondition::Sleep;
    let dealt = if sturdy_saves {
        let before = state.side(opponent).current_hp;
        state.side_mut(opponent).current_hp = 1;
        state.side_mut(opponent).persistent.sturdy_used = true;
        before.saturating_sub(1)
    } else {
        let before = state.side(opponent).current_hp;
        let after = before.saturating_sub(result.damage);
        state.side_mut(opponent).current_hp = after;
        before - after
    };
    if was_asleep && dealt > 0 {
        state.side_mut(opponent).status_counters.woke_from_damage = true;
    }

    events.push(TurnEvent::Damage {
        side: opponent,
        amount: dealt,
        crit: result.crit,
        type_effectiveness: result.type_effectiveness,
    });
    if sturdy_saves {
        events.push(TurnEvent::Ability { side: opponent, ability: "Sturdy".to_string() });
    }

    if let Some(effect) = &mv.effect {
        match effect {
            MoveEffect::Recoil { fraction } => {
                let amount = ((dealt as f64 * fraction).floor() as u32).min(state.side(mover).current_hp);
                state.side_mut(mover).current_hp -= amount;
                events.push(TurnEvent::Recoil { side: mover, amount });
            }
            MoveEffect::Drain { fraction } => {
                let amount = (dealt as f64 * fraction).floor() as u32;
                let missing = state.side(mover).max_hp - state.side(mover).current_hp;
                let capped = amount.min(missing);
                state.side_mut(mover).current_hp += capped;
                events.push(TurnEvent::Drain { side: mover, amount: capped });
            }
            MoveEffect::Flinch { chance } if state.rng.roll(*chance) => {
                state.side_mut(opponent).per_turn.flinched = true;
            }
            MoveEffect::StatusInflict { status, chance } if state.rng.roll(*chance) => {
                if state.side(opponent).status == StatusCondition::None {
                    state.side_mut(opponent).status = *status;
                    events.push(TurnEvent::StatusInflict { side: opponent, status: *status });
                }
            }
            _ => {}
        }
    }

    apply_contact_abilities(state, mover, opponent, events);
}

fn apply_contact_abilities(state: &mut BattleStateBlob, mover: Side, opponent: Side, events: &mut Vec<TurnEvent>) {
    if let Some(ability) = abilities::get_ability(state.side(mover).ability.as_str()) {
        if let AbilityEffect::ContactStatusChance { status, chance } = ability.effect {
            if state.rng.roll(chance) && state.side(opponent).status == StatusCondition::None {
                state.side_mut(opponent).status = status;
                events.push(TurnEvent::Ability { side: mover, ability: ability.name.to_string() });
                events.push(TurnEvent::StatusInflict { side: opponent, status });
            }
        }
    }
    if let Some(ability) = abilities::get_ability(state.side(opponent).ability.as_str()) {
        if let AbilityEffect::ContactStatDropChance { chance } = ability.effect {
            if state.rng.roll(chance) {
                let stat = best_boosted_stat(state.side(mover));
                state.side_mut(mover).bump_stage(stat, -1);
                events.push(TurnEvent::Ability { side: opponent, ability: ability.name.to_string() });
                events.push(TurnEvent::StatDrop { side: mover, stat, stages: -1 });
            }
        }
    }
}

fn apply_status_move(
    state: &mut BattleStateBlob,
    mover: Side,
    opponent: Side,
    mv: &MoveDefinition,
    events: &mut Vec<TurnEvent>,
) {
    let Some(effect) = &mv.effect else { return };
    match effect {
        MoveEffect::StatBoost { stat, stages } => {
            let new = state.side_mut(mover).bump_stage(*stat, *stages);
            events.push(TurnEvent::StatBoost { side: mover, stat: *stat, stages: new });
        }
        MoveEffect::StatDrop { stat, stages } => {
            let new = state.side_mut(opponent).bump_stage(*stat, *stages);
            events.push(TurnEvent::StatDrop { side: opponent, stat: *stat, stages: new });
        }
        MoveEffect::StatusInflict { status, chance } => {
            if state.rng.roll(*chance) && state.side(opponent).status == StatusCondition::None {
                state.side_mut(opponent).status = *status;
                events.push(TurnEvent::StatusInflict { side: opponent, status: *status });
            }
        }
        MoveEffect::Heal { fraction, deferred } => {
            if *deferred {
                state.side_mut(mover).persistent.wish_pending = true;
                events.push(TurnEvent::Wish { side: mover });
            } else {
                let amount = heal_amount(state.side(mover), *fraction);
                state.side_mut(mover).current_hp += amount;
                events.push(TurnEvent::Heal { side: mover, amount });
            }
        }
        MoveEffect::LeechSeed => {
            state.side_mut(opponent).persistent.leech_seeded = true;
            events.push(TurnEvent::LeechSeed { side: opponent });
        }
        MoveEffect::Curse { self_fraction } => {
            let amount = damage_fraction(state.side(mover), *self_fraction);
            state.side_mut(mover).current_hp = state.side(mover).current_hp.saturating_sub(amount);
            state.side_mut(opponent).persistent.cursed = true;
        }
        MoveEffect::ResetStats => {
            state.side_mut(mover).stat_stages.clear();
            state.side_mut(opponent).stat_stages.clear();
        }
        _ => {}
    }
}

/// Step 4/6: both-sides knockout check.
fn check_battle_end(state: &BattleStateBlob, first_side: Side) -> TurnOutcome {
    let a_down = state.side_a.is_fainted();
    let b_down = state.side_b.is_fainted();
    match (a_down, b_down) {
        (true, true) => Some((first_side, BattleEndReason::MutualKnockout)),
        (true, false) => Some((Side::B, BattleEndReason::Knockout)),
        (false, true) => Some((Side::A, BattleEndReason::Knockout)),
        (false, false) => None,
    }
}

/// Step 5: end-of-turn status damage, leech seed, curse, delayed wish, and
/// `end_turn`-triggered ability heals, in side order (A then B).
fn apply_end_of_turn(state: &mut BattleStateBlob, events: &mut Vec<TurnEvent>) {
    for side in [Side::A, Side::B] {
        if state.side(side).is_fainted() {
            continue;
        }
        if state.side(side).status == StatusCondition::Burned {
            let amount = damage_fraction(state.side(side), BURN_FRACTION);
            state.side_mut(side).current_hp = state.side(side).current_hp.saturating_sub(amount);
            events.push(TurnEvent::BurnDamage { side, amount });
        }
        if state.side(side).status == StatusCondition::Poison {
            let amount = damage_fraction(state.side(side), POISON_FRACTION);
            state.side_mut(side).current_hp = state.side(side).current_hp.saturating_sub(amount);
            events.push(TurnEvent::PoisonDamage { side, amount });
        }
        if state.side(side).persistent.leech_seeded {
            let healed_side = side.opposite();
            let amount = damage_fraction(state.side(side), LEECH_SEED_FRACTION);
            state.side_mut(side).current_hp = state.side(side).current_hp.saturating_sub(amount);
            let missing = state.side(healed_side).max_hp - state.side(healed_side).current_hp;
            let healed = amount.min(missing);
            state.side_mut(healed_side).current_hp += healed;
            events.push(TurnEvent::LeechSeedDamage { side, amount, healed_side });
        }
        if state.side(side).persistent.cursed {
            let amount = damage_fraction(state.side(side), CURSE_DAMAGE_FRACTION);
            state.side_mut(side).current_hp = state.side(side).current_hp.saturating_sub(amount);
            events.push(TurnEvent::CurseDamage { side, amount });
        }
        if state.side(side).persistent.wish_pending {
            state.side_mut(side).persistent.wish_pending = false;
            let amount = heal_amount(state.side(side), WISH_HEAL_FRACTION);
            state.side_mut(side).current_hp += amount;
            events.push(TurnEvent::WishHeal { side, amount });
        }
    }

    for side in [Side::A, Side::B] {
        if state.side(side).is_fainted() {
            continue;
        }
        if let Some(ability) = abilities::get_ability(state.side(side).ability.as_str()) {
            if ability.trigger == AbilityTrigger::EndTurn {
                if let AbilityEffect::EndTurnHeal { fraction } = ability.effect {
                    let amount = heal_amount(state.side(side), fraction);
                    if amount > 0 {
                        state.side_mut(side).current_hp += amount;
                        events.push(TurnEvent::Ability { side, ability: ability.name.to_string() });
                        events.push(TurnEvent::Heal { side, amount });
                    }
                }
            }
        }
    }
}

/// §4.3's `resolveTurn`: advances `state` by exactly one turn and returns
/// its event log plus a termination outcome, if the battle just ended.
pub fn resolve_turn(
    state: &mut BattleStateBlob,
    move_a: &cc_types::MoveId,
    move_b: &cc_types::MoveId,
) -> (Vec<TurnEvent>, TurnOutcome) {
    state.side_a.per_turn = Default::default();
    state.side_b.per_turn = Default::default();

    let Some(mv_a) = moves::get_move(move_a.as_str()) else {
        return (vec![], None);
    };
    let Some(mv_b) = moves::get_move(move_b.as_str()) else {
        return (vec![], None);
    };

    let first_side = determine_first_side(state, mv_a, mv_b);
    state.last_first_side = Some(first_side);
    let second_side = first_side.opposite();

    let mut events = Vec::new();

    let first_move = if first_side == Side::A { move_a } else { move_b };
    let outcome = apply_move(state, first_side, first_move);
    if outcome.deduct_pp {
        deduct_pp(state, first_side, first_move);
    }
    events.extend(outcome.events);
    if let Some(end) = check_battle_end(state, first_side) {
        events.push(TurnEvent::BattleEnd { winner: end.0, reason: end.1 });
        return (events, Some(end));
    }

    let second_move = if second_side == Side::A { move_a } else { move_b };
    let outcome = apply_move(state, second_side, second_move);
    if outcome.deduct_pp {
        deduct_pp(state, second_side, second_move);
    }
    events.extend(outcome.events);
    if let Some(end) = check_battle_end(state, first_side) {
        events.push(TurnEvent::BattleEnd { winner: end.0, reason: end.1 });
        return (events, Some(end));
    }

    apply_end_of_turn(state, &mut events);
    if let Some(end) = check_battle_end(state, first_side) {
        events.push(TurnEvent::BattleEnd { winner: end.0, reason: end.1 });
        return (events, Some(end));
    }

    (events, None)
}

/// The Timeout Scheduler's per-tick resolution: either side may have failed
/// to submit in time, in which case its move is simply absent rather than
/// invalid. A present move still applies normally (speed/priority only
/// matters when both sides act, so a lone mover just acts); end-of-turn
/// effects always run once, same as a normal turn.
pub fn resolve_timeout_turn(
    state: &mut BattleStateBlob,
    move_a: Option<&cc_types::MoveId>,
    move_b: Option<&cc_types::MoveId>,
) -> (Vec<TurnEvent>, TurnOutcome) {
    state.side_a.per_turn = Default::default();
    state.side_b.per_turn = Default::default();

    let mut events = Vec::new();
    if move_a.is_none() {
        events.push(TurnEvent::Timeout { side: Side::A });
    }
    if move_b.is_none() {
        events.push(TurnEvent::Timeout { side: Side::B });
    }

    for (side, move_id) in [(Side::A, move_a), (Side::B, move_b)] {
        let Some(move_id) = move_id else { continue };
        if moves::get_move(move_id.as_str()).is_none() {
            continue;
        }
        let outcome = apply_move(state, side, move_id);
        if outcome.deduct_pp {
            deduct_pp(state, side, move_id);
        }
        events.extend(outcome.events);
        if let Some(end) = check_battle_end(state, side) {
            events.push(TurnEvent::BattleEnd { winner: end.0, reason: end.1 });
            return (events, Some(end));
        }
    }

    apply_end_of_turn(state, &mut events);
    if let Some(end) = check_battle_end(state, Side::A) {
        events.push(TurnEvent::BattleEnd { winner: end.0, reason: end.1 });
        return (events, Some(end));
    }

    (events, None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use cc_types::{BaseStats, BattleRng, BattleStats, MoveSlot, PersistentFlags, PerTurnFlags, StatusCounters};
    use std::collections::BTreeMap;

    fn side(type_id: &str, ability: &str, move_ids: &[&str]) -> BattleSideState {
        let base_stats = BaseStats { hp: 17, attack: 17, defense: 17, sp_atk: 17, sp_def: 16, speed: 16 };
        let max_hp = formulas::max_hp(base_stats.hp, 5);
        BattleSideState {
            agent_id: cc_types::AgentId::new(),
            primary_type: cc_types::TypeId::from(type_id),
            ability: cc_types::AbilityId::from(ability),
            level: 5,
            base_stats,
            effective_stats: BattleStats {
                attack: formulas::effective_stat(base_stats.attack, 5, 1.0),
                defense: formulas::effective_stat(base_stats.defense, 5, 1.0),
                sp_atk: formulas::effective_stat(base_stats.sp_atk, 5, 1.0),
                sp_def: formulas::effective_stat(base_stats.sp_def, 5, 1.0),
                speed: formulas::effective_stat(base_stats.speed, 5, 1.0),
            },
            stat_stages: BTreeMap::new(),
            max_hp,
            current_hp: max_hp,
            status: StatusCondition::None,
            status_counters: StatusCounters::default(),
            moves: move_ids
                .iter()
                .map(|id| MoveSlot {
                    move_id: cc_types::MoveId::from(*id),
                    current_pp: moves::get_move(id).unwrap().pp,
                    max_pp: moves::get_move(id).unwrap().pp,
                })
                .collect(),
            per_turn: PerTurnFlags::default(),
            persistent: PersistentFlags::default(),
            consecutive_timeouts: 0,
        }
    }

    #[test]
    fn scenario_fire_vs_water_first_turn() {
        let mut state = BattleStateBlob {
            side_a: side("FIRE", "blaze", &["fire_blast", "flamethrower", "fire_punch", "recover"]),
            side_b: side("WATER", "torrent", &["hydro_pump", "surf", "aqua_jet", "recover"]),
            rng: BattleRng::new(42),
            last_first_side: None,
        };
        let move_a = cc_types::MoveId::from("fire_blast");
        let move_b = cc_types::MoveId::from("surf");
        let (events, outcome) = resolve_turn(&mut state, &move_a, &move_b);
        assert!(outcome.is_none());
        assert!(state.last_first_side.is_some());
        assert!(state.side_a.current_hp < state.side_a.max_hp);
        assert!(state.side_b.current_hp < state.side_b.max_hp);
        let damage_events: Vec<_> = events
            .iter()
            .filter(|e| matches!(e, TurnEvent::Damage { .. }))
            .collect();
        assert_eq!(damage_events.len(), 2);
    }

    #[test]
    fn knockout_ends_the_battle() {
        let mut state = BattleStateBlob {
            side_a: side("FIRE", "blaze", &["fire_blast", "flamethrower", "fire_punch", "recover"]),
            side_b: side("GRASS", "overgrow", &["solar_beam", "energy_ball", "leech_seed", "recover"]),
            rng: BattleRng::new(7),
            last_first_side: None,
        };
        state.side_b.current_hp = 1;
        let move_a = cc_types::MoveId::from("fire_blast");
        let move_b = cc_types::MoveId::from("solar_beam");
        let (events, outcome) = resolve_turn(&mut state, &move_a, &move_b);
        assert!(outcome.is_some());
        assert!(events.iter().any(|e| matches!(e, TurnEvent::BattleEnd { .. })));
    }

    #[test]
    fn timeout_turn_with_both_sides_absent_only_runs_end_of_turn_effects() {
        let mut state = BattleStateBlob {
            side_a: side("FIRE", "blaze", &["fire_blast", "flamethrower", "fire_punch", "recover"]),
            side_b: side("WATER", "torrent", &["hydro_pump", "surf", "aqua_jet", "recover"]),
            rng: BattleRng::new(3),
            last_first_side: None,
        };
        state.side_a.status = StatusCondition::Poison;
        let (events, outcome) = resolve_timeout_turn(&mut state, None, None);
        assert!(outcome.is_none());
        assert_eq!(events.iter().filter(|e| matches!(e, TurnEvent::Timeout { .. })).count(), 2);
        assert!(events.iter().any(|e| matches!(e, TurnEvent::PoisonDamage { .. })));
        assert!(state.side_a.current_hp < state.side_a.max_hp);
    }

    #[test]
    fn timeout_turn_with_one_side_present_still_applies_its_move() {
        let mut state = BattleStateBlob {
            side_a: side("FIRE", "blaze", &["fire_blast", "flamethrower", "fire_punch", "recover"]),
            side_b: side("WATER", "torrent", &["hydro_pump", "surf", "aqua_jet", "recover"]),
            rng: BattleRng::new(3),
            last_first_side: None,
        };
        let move_a = cc_types::MoveId::from("fire_blast");
        let (events, _) = resolve_timeout_turn(&mut state, Some(&move_a), None);
        assert!(events.iter().any(|e| matches!(e, TurnEvent::Timeout { side: Side::B })));
        assert!(state.side_b.current_hp < state.side_b.max_hp);
    }
}
