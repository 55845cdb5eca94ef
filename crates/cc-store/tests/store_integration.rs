//! End-to-end persistence checks against a real on-disk database, matching
//! the pack's `tempfile`-backed persistence-testing style.

use std::collections::BTreeMap;

use cc_store::{agents, battles, queue, Store};
use cc_types::enums::{AgentStatus, BattlePhase, BattleStatus, PlayMode, Side, StatusCondition};
use cc_types::ids::{AbilityId, AgentId, BattleId, MoveId, NatureId, TypeId};
use cc_types::{
    Agent, BaseStats, Battle, BattleRng, BattleSideState, BattleStateBlob, BattleStats,
    BattleTurnLog, MoveSlot, PersistentFlags, PerTurnFlags, StatusCounters, TurnEvent,
};

fn sample_agent(name: &str, credential: u8) -> Agent {
    Agent {
        id: AgentId::new(),
        name: name.to_string(),
        credential_digest: [credential; 32],
        owner_human_id: None,
        webhook_url: Some("https://example.com/hook".to_string()),
        webhook_secret: Some("s3cr3t".to_string()),
        primary_type: TypeId::from("FIRE"),
        base_stats: BaseStats { hp: 16, attack: 17, defense: 17, sp_atk: 17, sp_def: 17, speed: 16 },
        nature: NatureId::from("fierce"),
        ability: AbilityId::from("blaze"),
        moves: [
            MoveId::from("fire_blast"),
            MoveId::from("flamethrower"),
            MoveId::from("fire_punch"),
            MoveId::from("recover"),
        ],
        level: 5,
        xp: 12_345,
        elo: 1000,
        wins: 2,
        fights: 5,
        win_streak: 1,
        status: AgentStatus::Active,
        play_mode: PlayMode::Auto,
        created_at: chrono::Utc::now(),
    }
}

fn sample_side(agent_id: AgentId) -> BattleSideState {
    BattleSideState {
        agent_id,
        primary_type: TypeId::from("FIRE"),
        ability: AbilityId::from("blaze"),
        level: 5,
        base_stats: BaseStats { hp: 16, attack: 17, defense: 17, sp_atk: 17, sp_def: 17, speed: 16 },
        effective_stats: BattleStats { attack: 20, defense: 20, sp_atk: 20, sp_def: 20, speed: 20 },
        stat_stages: BTreeMap::new(),
        max_hp: 30,
        current_hp: 30,
        status: StatusCondition::None,
        status_counters: StatusCounters::default(),
        moves: vec![MoveSlot { move_id: MoveId::from("fire_blast"), current_pp: 15, max_pp: 15 }],
        per_turn: PerTurnFlags::default(),
        persistent: PersistentFlags::default(),
        consecutive_timeouts: 0,
    }
}

#[test]
fn agent_and_battle_state_survive_a_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("clawcombat.db");
    let path_str = path.to_str().unwrap().to_string();

    let agent_a = sample_agent("ember", 1);
    let agent_b = sample_agent("splash", 2);
    let battle_id = BattleId::new();

    {
        let store = Store::open(&path_str).unwrap();
        store.with_conn(|c| agents::insert(c, &agent_a)).unwrap();
        store.with_conn(|c| agents::insert(c, &agent_b)).unwrap();

        let battle = Battle {
            id: battle_id,
            display_number: store.with_conn(battles::next_display_number).unwrap(),
            agent_a: agent_a.id,
            agent_b: agent_b.id,
            status: BattleStatus::Active,
            current_phase: BattlePhase::Waiting,
            turn_number: 0,
            pending_move_a: None,
            pending_move_b: None,
            state: Some(BattleStateBlob {
                side_a: sample_side(agent_a.id),
                side_b: sample_side(agent_b.id),
                rng: BattleRng::new(42),
                last_first_side: None,
            }),
            created_at: chrono::Utc::now(),
            started_at: Some(chrono::Utc::now()),
            last_turn_at: Some(chrono::Utc::now()),
            ended_at: None,
            winner: None,
        };
        store.with_conn(|c| battles::insert(c, &battle)).unwrap();

        let mut state = battle.state.clone().unwrap();
        state.side_b.current_hp -= 10;
        let turn_log = BattleTurnLog {
            battle_id,
            turn_number: 1,
            move_a: Some(MoveId::from("fire_blast")),
            move_b: Some(MoveId::from("fire_blast")),
            events: vec![TurnEvent::Damage { side: Side::B, amount: 10, crit: false, type_effectiveness: 1.0 }],
            hp_a: state.side_a.current_hp,
            hp_b: state.side_b.current_hp,
            created_at: chrono::Utc::now(),
        };
        store
            .with_conn(|c| {
                battles::record_resolved_turn(
                    c,
                    battle_id,
                    &state,
                    &turn_log,
                    BattleStatus::Active,
                    BattlePhase::Waiting,
                    None,
                    chrono::Utc::now(),
                )
            })
            .unwrap();
    }

    // Reopen against the same file — nothing above should have been lost.
    let store = Store::open(&path_str).unwrap();
    let fetched_agent = store.with_conn(|c| agents::get(c, agent_a.id)).unwrap().unwrap();
    assert_eq!(fetched_agent.xp, 12_345);
    assert_eq!(fetched_agent.wins, 2);

    let fetched_battle = store.with_conn(|c| battles::get(c, battle_id)).unwrap().unwrap();
    assert_eq!(fetched_battle.turn_number, 1);
    let state = fetched_battle.state.unwrap();
    assert_eq!(state.side_b.current_hp, 20);

    let history = store.with_conn(|c| battles::history(c, battle_id)).unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].hp_b, 20);

    let active = store.with_conn(|c| battles::active_battle_for_agent(c, agent_a.id)).unwrap();
    assert!(active.is_some());
}

#[test]
fn joining_queue_twice_for_the_same_agent_conflicts() {
    let store = Store::open_in_memory().unwrap();
    let agent = sample_agent("riptide", 9);
    store.with_conn(|c| agents::insert(c, &agent)).unwrap();

    store.with_conn(|c| queue::join(c, agent.id, chrono::Utc::now())).unwrap();
    let result = store.with_conn(|c| queue::join(c, agent.id, chrono::Utc::now()));
    assert!(result.is_err(), "duplicate queue entry should violate the primary key");
}
