//! The `Agent` entity — §3.

use serde::{Deserialize, Serialize};

use crate::enums::{AgentStatus, PlayMode};
use crate::ids::{AbilityId, AgentId, MoveId, NatureId, TypeId};

/// Six base stats, each 1-35, summing to 100 at creation (§3 invariant).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BaseStats {
    pub hp: u8,
    pub attack: u8,
    pub defense: u8,
    pub sp_atk: u8,
    pub sp_def: u8,
    pub speed: u8,
}

impl BaseStats {
    pub fn sum(&self) -> u32 {
        self.hp as u32
            + self.attack as u32
            + self.defense as u32
            + self.sp_atk as u32
            + self.sp_def as u32
            + self.speed as u32
    }

    /// §3: sum must equal 100 at creation, per-stat cap 35.
    pub fn is_valid_creation_budget(&self) -> bool {
        let stats = [self.hp, self.attack, self.defense, self.sp_atk, self.sp_def, self.speed];
        stats.iter().all(|&s| s >= 1 && s <= 35) && self.sum() == 100
    }
}

/// Persistent agent row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Agent {
    pub id: AgentId,
    pub name: String,
    /// SHA-256 digest of the credential; plaintext is never stored (§3
    /// invariant 3). Historically named `api_key` upstream — see DESIGN.md.
    pub credential_digest: [u8; 32],
    pub owner_human_id: Option<String>,
    pub webhook_url: Option<String>,
    pub webhook_secret: Option<String>,
    pub primary_type: TypeId,
    pub base_stats: BaseStats,
    pub nature: NatureId,
    pub ability: AbilityId,
    pub moves: [MoveId; 4],
    pub level: u32,
    pub xp: u64,
    pub elo: i32,
    pub wins: u32,
    pub fights: u32,
    pub win_streak: u32,
    pub status: AgentStatus,
    pub play_mode: PlayMode,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl Agent {
    /// §3 invariant: an agent is considered retired (no longer eligible for
    /// queueing or challenges) once its status leaves `active`.
    pub fn is_playable(&self) -> bool {
        matches!(self.status, AgentStatus::Active)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_budget_sums_to_100() {
        let stats = BaseStats {
            hp: 16,
            attack: 17,
            defense: 17,
            sp_atk: 17,
            sp_def: 17,
            speed: 16,
        };
        assert_eq!(stats.sum(), 100);
        assert!(stats.is_valid_creation_budget());
    }

    #[test]
    fn rejects_stat_over_cap() {
        let stats = BaseStats {
            hp: 36,
            attack: 16,
            defense: 16,
            sp_atk: 16,
            sp_def: 8,
            speed: 8,
        };
        assert_eq!(stats.sum(), 100);
        assert!(!stats.is_valid_creation_budget());
    }

    #[test]
    fn rejects_wrong_sum() {
        let stats = BaseStats {
            hp: 10,
            attack: 10,
            defense: 10,
            sp_atk: 10,
            sp_def: 10,
            speed: 10,
        };
        assert!(!stats.is_valid_creation_budget());
    }
}
