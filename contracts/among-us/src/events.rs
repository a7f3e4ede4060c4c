//! Structured events. The state machine returns [`GameEvent`]s; they are
//! published only after the action has been committed to storage.

use soroban_sdk::{contractevent, contracttype, Address, BytesN, Env, Vec};

use crate::types::{Phase, Winner};

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum GameEvent {
    Initialized(Address),
    Configured(u32, u32, u32),
    VerifierSet(Address),
    PhaseChanged(Phase, Phase, u32),
    PlayerJoined(Address),
    PlayerMoved(Address, u32, u32),
    MeetingStarted(Address, u32),
    VoteCast(Address, u32, BytesN<32>),
    PlayerEjected(Address, u32, u32),
    MeetingSkipped(u32, u32),
    TaskCompleted(Address, u32),
    PlayerKilled(Address, Address),
    GameEnded(Winner),
}

// ═══════════════════════════════════════════════════════════════════════════════
//  Contract Events
// ═══════════════════════════════════════════════════════════════════════════════

#[contractevent]
pub struct EvInitialized {
    pub admin: Address,
}

#[contractevent]
pub struct EvGameConfigured {
    pub max_players: u32,
    pub impostor_count: u32,
    pub tasks_to_win: u32,
}

#[contractevent]
pub struct EvVerifierSet {
    pub verifier: Address,
}

#[contractevent]
pub struct EvPhaseChanged {
    pub from: u32,
    pub to: u32,
    pub round: u32,
}

#[contractevent]
pub struct EvPlayerJoined {
    pub player: Address,
}

#[contractevent]
pub struct EvPlayerMoved {
    pub player: Address,
    pub x: u32,
    pub y: u32,
}

#[contractevent]
pub struct EvMeetingStarted {
    pub caller: Address,
    pub round: u32,
}

/// The target is a commitment taken from the vote proof, not an address.
#[contractevent]
pub struct EvVoteCast {
    pub voter: Address,
    pub round: u32,
    pub target: BytesN<32>,
}

#[contractevent]
pub struct EvPlayerEjected {
    pub player: Address,
    pub round: u32,
    pub votes: u32,
}

#[contractevent]
pub struct EvMeetingSkipped {
    pub round: u32,
    pub ballots: u32,
}

#[contractevent]
pub struct EvTaskCompleted {
    pub player: Address,
    pub total_tasks: u32,
}

#[contractevent]
pub struct EvPlayerKilled {
    pub killer: Address,
    pub victim: Address,
}

#[contractevent]
pub struct EvGameEnded {
    pub winner: u32, // 1 = crew, 2 = impostors
}

pub fn publish_all(env: &Env, events: &Vec<GameEvent>) {
    for event in events.iter() {
        publish(env, event);
    }
}

fn publish(env: &Env, event: GameEvent) {
    match event {
        GameEvent::Initialized(admin) => EvInitialized { admin }.publish(env),
        GameEvent::Configured(max_players, impostor_count, tasks_to_win) => EvGameConfigured {
            max_players,
            impostor_count,
            tasks_to_win,
        }
        .publish(env),
        GameEvent::VerifierSet(verifier) => EvVerifierSet { verifier }.publish(env),
        GameEvent::PhaseChanged(from, to, round) => EvPhaseChanged {
            from: from as u32,
            to: to as u32,
            round,
        }
        .publish(env),
        GameEvent::PlayerJoined(player) => EvPlayerJoined { player }.publish(env),
        GameEvent::PlayerMoved(player, x, y) => EvPlayerMoved { player, x, y }.publish(env),
        GameEvent::MeetingStarted(caller, round) => EvMeetingStarted { caller, round }.publish(env),
        GameEvent::VoteCast(voter, round, target) => {
            EvVoteCast { voter, round, target }.publish(env)
        }
        GameEvent::PlayerEjected(player, round, votes) => {
            EvPlayerEjected { player, round, votes }.publish(env)
        }
        GameEvent::MeetingSkipped(round, ballots) => {
            EvMeetingSkipped { round, ballots }.publish(env)
        }
        GameEvent::TaskCompleted(player, total_tasks) => {
            EvTaskCompleted { player, total_tasks }.publish(env)
        }
        GameEvent::PlayerKilled(killer, victim) => EvPlayerKilled { killer, victim }.publish(env),
        GameEvent::GameEnded(winner) => EvGameEnded {
            winner: winner as u32,
        }
        .publish(env),
    }
}
