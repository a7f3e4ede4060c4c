use soroban_sdk::{contracttype, Address, BytesN, Env, Map};

use crate::machine::Match;
use crate::types::{GameConfig, GameState, MeetingRound, Player, ProofKind};
use crate::GameError;

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) enum DataKey {
    Admin,
    Verifier,
    Config,
    State,
    Players,
    Meeting,
    /// Consumed one-time proof token, scoped by kind.
    Nullifier(ProofKind, BytesN<32>),
}

// Ledger rate is approximately 5 seconds per ledger on Stellar
const LEDGER_RATE_SECS: u32 = 5;

// Instance data (config, registry, state): 30 days
const INSTANCE_TTL_SECONDS: u32 = 30 * 24 * 60 * 60;
pub(crate) const INSTANCE_TTL_LEDGERS: u32 = INSTANCE_TTL_SECONDS / LEDGER_RATE_SECS;

// Consumed nullifiers outlive the match that produced them: 120 days
const NULLIFIER_TTL_SECONDS: u32 = 120 * 24 * 60 * 60;
pub(crate) const NULLIFIER_TTL_LEDGERS: u32 = NULLIFIER_TTL_SECONDS / LEDGER_RATE_SECS;

pub(crate) fn is_initialized(env: &Env) -> bool {
    env.storage().instance().has(&DataKey::State)
}

pub(crate) fn load_admin(env: &Env) -> Result<Address, GameError> {
    env.storage()
        .instance()
        .get(&DataKey::Admin)
        .ok_or(GameError::NotInitialized)
}

pub(crate) fn load_verifier(env: &Env) -> Option<Address> {
    env.storage().instance().get(&DataKey::Verifier)
}

pub(crate) fn load_config(env: &Env) -> Result<GameConfig, GameError> {
    env.storage()
        .instance()
        .get(&DataKey::Config)
        .ok_or(GameError::NotInitialized)
}

pub(crate) fn load_state(env: &Env) -> Result<GameState, GameError> {
    env.storage()
        .instance()
        .get(&DataKey::State)
        .ok_or(GameError::NotInitialized)
}

pub(crate) fn load_players(env: &Env) -> Map<Address, Player> {
    env.storage()
        .instance()
        .get(&DataKey::Players)
        .unwrap_or_else(|| Map::new(env))
}

pub(crate) fn load_meeting(env: &Env) -> Option<MeetingRound> {
    env.storage().instance().get(&DataKey::Meeting)
}

/// Read the whole match into one owned snapshot.
pub(crate) fn load_match(env: &Env) -> Result<Match, GameError> {
    Ok(Match {
        admin: load_admin(env)?,
        verifier: load_verifier(env),
        config: load_config(env)?,
        state: load_state(env)?,
        players: load_players(env),
        meeting: load_meeting(env),
    })
}

/// Write a committed snapshot back. This is the only place the match is
/// persisted after `init`.
pub(crate) fn store_match(env: &Env, m: &Match) {
    let instance = env.storage().instance();
    instance.set(&DataKey::Admin, &m.admin);
    match &m.verifier {
        Some(verifier) => instance.set(&DataKey::Verifier, verifier),
        None => instance.remove(&DataKey::Verifier),
    }
    instance.set(&DataKey::Config, &m.config);
    instance.set(&DataKey::State, &m.state);
    instance.set(&DataKey::Players, &m.players);
    match &m.meeting {
        Some(meeting) => instance.set(&DataKey::Meeting, meeting),
        None => instance.remove(&DataKey::Meeting),
    }
    instance.extend_ttl(INSTANCE_TTL_LEDGERS, INSTANCE_TTL_LEDGERS);
}
