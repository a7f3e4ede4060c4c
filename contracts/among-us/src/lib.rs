#![no_std]

//! # Among Us ZK
//!
//! On-chain coordinator for a social-deduction match. Players register with
//! a public identity hash and a hiding commitment to their secret role; the
//! role itself never reaches the ledger. Tasks, kills, votes and impostor
//! victory claims are each backed by an externally verified proof carrying a
//! one-time nullifier.
//!
//! ## Match flow
//! 1. The admin calls `init`, optionally `configure_game`, and `set_verifier`.
//! 2. Players `join_game` while the lobby is open; `start_game` needs at least
//!    four of them.
//! 3. While playing, crewmates submit task proofs and impostors submit kill
//!    proofs. Any living player may `start_meeting`.
//! 4. During a meeting every living player may cast one proof-backed vote.
//!    `finalize_meeting` ejects the target of a strict majority, if any.
//! 5. The crew wins when the task total reaches `tasks_to_win`. Impostors win
//!    through an impostor-win proof, the admin, or (optionally) assumed
//!    parity. `Ended` is terminal.
//!
//! ## Atomicity
//! Every action loads one snapshot, runs the pure [`machine::apply`], and
//! only on success writes the snapshot, flushes consumed nullifiers and
//! publishes events. A rejected action leaves storage untouched.

use soroban_sdk::{
    contract, contracterror, contractimpl, vec, Address, BytesN, Env, Map, Symbol,
};

mod events;
mod gate;
mod machine;
mod nullifier;
mod phase;
mod registry;
mod storage;
mod tally;
mod types;
mod win;

pub use events::GameEvent;
pub use gate::{decode_action_word, encode_action_word, PUBLIC_INPUT_WORDS};
pub use machine::{DEFAULT_MAX_PLAYERS, DEFAULT_TASKS_TO_WIN, MIN_PLAYERS};
pub use types::{
    GameConfig, GameState, ImpostorWinRule, MeetingRound, Phase, Player, ProofInput, ProofKind,
    Winner,
};

use gate::ContractVerifier;
use machine::{Action, Match};
use nullifier::NullifierLedger;

// ═══════════════════════════════════════════════════════════════════════════════
//  Errors
// ═══════════════════════════════════════════════════════════════════════════════

#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord)]
#[repr(u32)]
pub enum GameError {
    Unauthorized = 1,
    WrongPhase = 2,
    DuplicateJoin = 3,
    DuplicateIdentityHash = 4,
    RegistryFull = 5,
    MalformedProofMetadata = 6,
    VerifierNotConfigured = 7,
    ProofVerificationFailed = 8,
    NullifierReused = 9,
    VoteAlreadySubmitted = 10,
    NotRegisteredOrNotAlive = 11,
    GameAlreadyEnded = 12,
    AlreadyInitialized = 13,
    NotInitialized = 14,
    InvalidConfig = 15,
    NotEnoughPlayers = 16,
    InvalidWinner = 17,
    /// Proof is bound to a different round than the one in progress.
    StaleProofRound = 18,
    SelfTarget = 19,
    /// Kill proof commitment does not match the victim's identity hash.
    ProofTargetMismatch = 20,
    NoActiveMeeting = 21,
    PlayerNotFound = 22,
}

// ═══════════════════════════════════════════════════════════════════════════════
//  Contract
// ═══════════════════════════════════════════════════════════════════════════════

#[contract]
pub struct AmongUsContract;

#[contractimpl]
impl AmongUsContract {
    // ── Admin ────────────────────────────────────────────────────────────────

    /// Create the match in the lobby with default limits.
    pub fn init(env: Env, admin: Address, impostor_count: u32) -> Result<(), GameError> {
        if storage::is_initialized(&env) {
            return Err(GameError::AlreadyInitialized);
        }
        admin.require_auth();

        let m = Match::new(&env, admin.clone(), impostor_count)?;
        storage::store_match(&env, &m);
        events::publish_all(&env, &vec![&env, GameEvent::Initialized(admin)]);
        Ok(())
    }

    pub fn configure_game(
        env: Env,
        caller: Address,
        max_players: u32,
        impostor_count: u32,
        tasks_to_win: u32,
        impostor_rule: ImpostorWinRule,
    ) -> Result<(), GameError> {
        caller.require_auth();
        let config = GameConfig {
            max_players,
            impostor_count,
            tasks_to_win,
            impostor_rule,
        };
        Self::execute(&env, Action::Configure { caller, config })
    }

    pub fn set_verifier(env: Env, caller: Address, verifier: Address) -> Result<(), GameError> {
        caller.require_auth();
        Self::execute(&env, Action::SetVerifier { caller, verifier })
    }

    /// Administrative override. Not bound by the phase table.
    pub fn set_phase(env: Env, caller: Address, phase: Phase) -> Result<(), GameError> {
        caller.require_auth();
        Self::execute(&env, Action::SetPhase { caller, phase })
    }

    pub fn start_game(env: Env, caller: Address) -> Result<(), GameError> {
        caller.require_auth();
        Self::execute(&env, Action::StartGame { caller })
    }

    /// Close the open meeting without counting ballots.
    pub fn end_meeting(env: Env, caller: Address) -> Result<(), GameError> {
        caller.require_auth();
        Self::execute(&env, Action::EndMeeting { caller })
    }

    pub fn end_game_admin(env: Env, caller: Address, winner: Winner) -> Result<(), GameError> {
        caller.require_auth();
        Self::execute(&env, Action::EndGame { caller, winner })
    }

    pub fn upgrade(env: Env, new_wasm_hash: BytesN<32>) -> Result<(), GameError> {
        let admin = storage::load_admin(&env)?;
        admin.require_auth();
        env.deployer().update_current_contract_wasm(new_wasm_hash);
        Ok(())
    }

    // ── Players ──────────────────────────────────────────────────────────────

    pub fn join_game(
        env: Env,
        player: Address,
        color: Symbol,
        name: Symbol,
        player_hash: BytesN<32>,
        role_commitment: BytesN<32>,
    ) -> Result<(), GameError> {
        player.require_auth();
        Self::execute(
            &env,
            Action::Join {
                address: player,
                color,
                name,
                player_hash,
                role_commitment,
            },
        )
    }

    pub fn submit_move(env: Env, player: Address, x: u32, y: u32) -> Result<(), GameError> {
        player.require_auth();
        Self::execute(&env, Action::Move { player, x, y })
    }

    pub fn start_meeting(env: Env, caller: Address) -> Result<(), GameError> {
        caller.require_auth();
        Self::execute(&env, Action::StartMeeting { caller })
    }

    /// Cast a ballot. The target is the commitment inside the proof.
    pub fn submit_vote(env: Env, voter: Address, proof: ProofInput) -> Result<(), GameError> {
        voter.require_auth();
        Self::execute(&env, Action::Vote { voter, proof })
    }

    /// Tally the open meeting. Callable by the admin or any living player.
    pub fn finalize_meeting(env: Env, caller: Address) -> Result<(), GameError> {
        caller.require_auth();
        Self::execute(&env, Action::FinalizeMeeting { caller })
    }

    pub fn submit_task_proof(
        env: Env,
        player: Address,
        proof: ProofInput,
    ) -> Result<(), GameError> {
        player.require_auth();
        Self::execute(&env, Action::Task { player, proof })
    }

    pub fn submit_kill_proof(
        env: Env,
        killer: Address,
        victim: Address,
        proof: ProofInput,
    ) -> Result<(), GameError> {
        killer.require_auth();
        Self::execute(
            &env,
            Action::Kill {
                killer,
                victim,
                proof,
            },
        )
    }

    pub fn submit_impostor_win_proof(
        env: Env,
        caller: Address,
        proof: ProofInput,
    ) -> Result<(), GameError> {
        caller.require_auth();
        Self::execute(&env, Action::ImpostorWin { caller, proof })
    }

    // ── Reads ────────────────────────────────────────────────────────────────

    pub fn get_players(env: Env) -> Map<Address, Player> {
        storage::load_players(&env)
    }

    pub fn get_player(env: Env, player: Address) -> Result<Player, GameError> {
        storage::load_players(&env)
            .get(player)
            .ok_or(GameError::PlayerNotFound)
    }

    pub fn get_config(env: Env) -> Result<GameConfig, GameError> {
        storage::load_config(&env)
    }

    pub fn get_game_state(env: Env) -> Result<GameState, GameError> {
        storage::load_state(&env)
    }

    pub fn get_meeting(env: Env) -> Option<MeetingRound> {
        storage::load_meeting(&env)
    }

    pub fn get_admin(env: Env) -> Result<Address, GameError> {
        storage::load_admin(&env)
    }

    pub fn get_verifier(env: Env) -> Option<Address> {
        storage::load_verifier(&env)
    }

    pub fn is_nullifier_used(env: Env, kind: ProofKind, nullifier: BytesN<32>) -> bool {
        nullifier::is_used(&env, kind, nullifier)
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
//  Internal helpers
// ═══════════════════════════════════════════════════════════════════════════════

impl AmongUsContract {
    /// Load, apply, and commit only on success.
    fn execute(env: &Env, action: Action) -> Result<(), GameError> {
        let mut m = storage::load_match(env)?;
        let mut ledger = NullifierLedger::new(env);
        let verifier = ContractVerifier::new(env);

        let events = machine::apply(env, &mut m, &mut ledger, &verifier, action)?;

        storage::store_match(env, &m);
        ledger.flush();
        events::publish_all(env, &events);
        Ok(())
    }
}
