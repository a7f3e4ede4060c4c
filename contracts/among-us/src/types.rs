use soroban_sdk::{contracttype, Address, BytesN, Map, Symbol, Vec};

// ═══════════════════════════════════════════════════════════════════════════════
//  Enumerations (compact u32 encoding)
// ═══════════════════════════════════════════════════════════════════════════════

/// Coarse stage of the match. Exactly one is current at any time.
#[contracttype]
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Phase {
    Lobby = 0,
    Playing = 1,
    Meeting = 2,
    Ended = 3,
}

#[contracttype]
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Winner {
    None = 0,
    Crew = 1,
    Impostors = 2,
}

/// Scope of a one-time proof. Nullifiers are only unique within a kind.
#[contracttype]
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum ProofKind {
    Vote = 0,
    Task = 1,
    Kill = 2,
    ImpostorWin = 3,
}

/// How an impostor victory may be declared.
///
/// Roles are committed, never stored in the clear, so the contract cannot
/// count living impostors directly.
#[contracttype]
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum ImpostorWinRule {
    /// Only an impostor-win proof or the admin can end the game for impostors.
    ProofOnly = 0,
    /// Assume every impostor is alive; impostors win once the remaining crew
    /// can no longer outnumber them.
    AssumedParity = 1,
}

// ═══════════════════════════════════════════════════════════════════════════════
//  Stored records
// ═══════════════════════════════════════════════════════════════════════════════

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct GameConfig {
    pub max_players: u32,
    pub impostor_count: u32,
    pub tasks_to_win: u32,
    pub impostor_rule: ImpostorWinRule,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct GameState {
    pub phase: Phase,
    /// 0 in the lobby, 1 once the game starts, +1 each time a meeting closes.
    pub round: u32,
    pub winner: Winner,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Player {
    pub address: Address,
    pub color: Symbol,
    pub name: Symbol,
    pub player_hash: BytesN<32>,
    /// Hiding commitment to the player's role; the role itself never lands on-chain.
    pub role_commitment: BytesN<32>,
    pub alive: bool,
    pub task_count: u32,
    pub x: u32,
    pub y: u32,
}

/// Open meeting. Ballots map a voter to the target commitment taken from
/// their vote proof; the first ballot per voter is final.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct MeetingRound {
    pub round_index: u32,
    pub opened_by: Address,
    pub ballots: Map<Address, BytesN<32>>,
}

/// Envelope shared by every proof-gated action.
///
/// `public_inputs` layout: `[action_word, commitment, nullifier]`; see
/// [`crate::gate`] for the action word encoding.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ProofInput {
    pub proof_hash: BytesN<32>,
    pub nullifier: BytesN<32>,
    pub public_inputs: Vec<BytesN<32>>,
}
