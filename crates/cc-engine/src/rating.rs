//! Post-battle rating update — §4.6's `applyBattleResults`.
//!
//! §1 explicitly defers the exact XP/ELO formulas to "a shared out-of-scope
//! module" and only requires that they be "applied exactly once per
//! terminal transition." Since no such module is reachable from this
//! repository, this is a concrete instance of that contract: a standard
//! logistic ELO update with a fixed K-factor, plus a flat per-outcome XP
//! award. See DESIGN.md's Open Question decisions.
//!
//! Every terminal battle in §4.3 has exactly one winner — even a mutual
//! knockout is awarded to `firstSide` rather than scored as a draw — so
//! this module only ever sees a winner/loser pair, never a tie.

pub const K_FACTOR: f64 = 32.0;
pub const WINNER_XP: u64 = 50;
pub const LOSER_XP: u64 = 10;
pub const XP_PER_LEVEL: u64 = 100;

/// The subset of an agent's rating fields this update reads and writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AgentRatingState {
    pub elo: i32,
    pub xp: u64,
    pub level: u32,
    pub wins: u32,
    pub fights: u32,
    pub win_streak: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RatingUpdate {
    pub elo: i32,
    pub xp: u64,
    pub level: u32,
    pub wins: u32,
    pub fights: u32,
    pub win_streak: u32,
}

fn expected_score(own_elo: i32, other_elo: i32) -> f64 {
    1.0 / (1.0 + 10f64.powf((other_elo - own_elo) as f64 / 400.0))
}

fn xp_and_level(xp: u64, level: u32, won: bool) -> (u64, u32) {
    let new_xp = xp + if won { WINNER_XP } else { LOSER_XP };
    let new_level = level.max((new_xp / XP_PER_LEVEL) as u32 + 1);
    (new_xp, new_level)
}

/// Computes both sides' post-battle rating in one call so the ELO delta is
/// derived once and applied symmetrically — winner gains exactly what the
/// loser loses, never off by a rounding unit from computing each side's
/// new value independently.
pub fn apply_battle_result(winner: AgentRatingState, loser: AgentRatingState) -> (RatingUpdate, RatingUpdate) {
    let expected_winner = expected_score(winner.elo, loser.elo);
    let delta = (K_FACTOR * (1.0 - expected_winner)).round() as i32;

    let (winner_xp, winner_level) = xp_and_level(winner.xp, winner.level, true);
    let (loser_xp, loser_level) = xp_and_level(loser.xp, loser.level, false);

    (
        RatingUpdate {
            elo: winner.elo + delta,
            xp: winner_xp,
            level: winner_level,
            wins: winner.wins + 1,
            fights: winner.fights + 1,
            win_streak: winner.win_streak + 1,
        },
        RatingUpdate {
            elo: loser.elo - delta,
            xp: loser_xp,
            level: loser_level,
            wins: loser.wins,
            fights: loser.fights + 1,
            win_streak: 0,
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fresh(elo: i32) -> AgentRatingState {
        AgentRatingState { elo, xp: 0, level: 1, wins: 0, fights: 0, win_streak: 0 }
    }

    #[test]
    fn equal_elo_moves_by_half_k_factor() {
        let (winner, loser) = apply_battle_result(fresh(1000), fresh(1000));
        assert_eq!(winner.elo - 1000, 16);
        assert_eq!(1000 - loser.elo, 16);
    }

    #[test]
    fn delta_is_symmetric_regardless_of_elo_gap() {
        let (winner, loser) = apply_battle_result(fresh(1200), fresh(900));
        let gain = winner.elo - 1200;
        let loss = 900 - loser.elo;
        assert_eq!(gain, loss);
        assert!(gain < 16, "favorite should gain less than an even match");
    }

    #[test]
    fn win_streak_resets_on_loss_and_increments_on_win() {
        let winner_state = AgentRatingState { win_streak: 4, ..fresh(1000) };
        let loser_state = AgentRatingState { win_streak: 7, ..fresh(1000) };
        let (winner, loser) = apply_battle_result(winner_state, loser_state);
        assert_eq!(winner.win_streak, 5);
        assert_eq!(loser.win_streak, 0);
    }

    #[test]
    fn xp_award_differs_by_outcome_and_can_level_up() {
        let high_xp = AgentRatingState { xp: 95, ..fresh(1000) };
        let (winner, _) = apply_battle_result(high_xp, fresh(1000));
        assert_eq!(winner.xp, 145);
        assert_eq!(winner.level, 2);
    }
}
