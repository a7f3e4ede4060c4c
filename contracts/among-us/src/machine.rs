//! Pure state machine core.
//!
//! [`apply`] takes an owned [`Match`] snapshot and one [`Action`], and either
//! returns the events to publish or an error. It never touches contract
//! storage except through the [`NullifierLedger`] read path; the contract
//! surface persists the snapshot and flushes staged nullifiers only on `Ok`.

use soroban_sdk::{Address, BytesN, Env, Map, Symbol, Vec};

use crate::events::GameEvent;
use crate::gate::{self, Binding, ProofVerifier};
use crate::nullifier::NullifierLedger;
use crate::phase::{self, Op};
use crate::registry;
use crate::tally::{self, Tally};
use crate::types::{
    GameConfig, GameState, ImpostorWinRule, MeetingRound, Phase, Player, ProofInput, ProofKind,
    Winner,
};
use crate::win;
use crate::GameError;

pub const MIN_PLAYERS: u32 = 4;
pub const DEFAULT_MAX_PLAYERS: u32 = 15;
pub const DEFAULT_TASKS_TO_WIN: u32 = 40;

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Match {
    pub admin: Address,
    pub verifier: Option<Address>,
    pub config: GameConfig,
    pub state: GameState,
    pub players: Map<Address, Player>,
    pub meeting: Option<MeetingRound>,
}

impl Match {
    /// Fresh lobby with default configuration.
    pub fn new(env: &Env, admin: Address, impostor_count: u32) -> Result<Self, GameError> {
        let config = GameConfig {
            max_players: DEFAULT_MAX_PLAYERS,
            impostor_count,
            tasks_to_win: DEFAULT_TASKS_TO_WIN,
            impostor_rule: ImpostorWinRule::ProofOnly,
        };
        validate_config(&config, 0)?;

        Ok(Self {
            admin,
            verifier: None,
            config,
            state: GameState {
                phase: Phase::Lobby,
                round: 0,
                winner: Winner::None,
            },
            players: Map::new(env),
            meeting: None,
        })
    }
}

/// Every state-changing request the contract accepts after `init`.
#[derive(Clone, Debug)]
pub enum Action {
    Configure {
        caller: Address,
        config: GameConfig,
    },
    SetVerifier {
        caller: Address,
        verifier: Address,
    },
    SetPhase {
        caller: Address,
        phase: Phase,
    },
    StartGame {
        caller: Address,
    },
    Join {
        address: Address,
        color: Symbol,
        name: Symbol,
        player_hash: BytesN<32>,
        role_commitment: BytesN<32>,
    },
    Move {
        player: Address,
        x: u32,
        y: u32,
    },
    StartMeeting {
        caller: Address,
    },
    Vote {
        voter: Address,
        proof: ProofInput,
    },
    FinalizeMeeting {
        caller: Address,
    },
    EndMeeting {
        caller: Address,
    },
    Task {
        player: Address,
        proof: ProofInput,
    },
    Kill {
        killer: Address,
        victim: Address,
        proof: ProofInput,
    },
    ImpostorWin {
        caller: Address,
        proof: ProofInput,
    },
    EndGame {
        caller: Address,
        winner: Winner,
    },
}

/// Apply `action` to `m`.
///
/// On `Err` the snapshot may be partially modified and must be discarded.
pub fn apply<V: ProofVerifier>(
    env: &Env,
    m: &mut Match,
    ledger: &mut NullifierLedger,
    verifier: &V,
    action: Action,
) -> Result<Vec<GameEvent>, GameError> {
    let mut events = Vec::new(env);

    match action {
        // ── Lobby setup ──────────────────────────────────────────────────────
        Action::Configure { caller, config } => {
            require_admin(m, &caller)?;
            phase::guard(m.state.phase, Op::ConfigureGame)?;
            validate_config(&config, m.players.len())?;
            events.push_back(GameEvent::Configured(
                config.max_players,
                config.impostor_count,
                config.tasks_to_win,
            ));
            m.config = config;
        }

        Action::SetVerifier { caller, verifier } => {
            require_admin(m, &caller)?;
            phase::guard(m.state.phase, Op::SetVerifier)?;
            m.verifier = Some(verifier.clone());
            events.push_back(GameEvent::VerifierSet(verifier));
        }

        Action::SetPhase { caller, phase } => {
            require_admin(m, &caller)?;
            force_phase(env, m, phase, &mut events);
        }

        Action::StartGame { caller } => {
            require_admin(m, &caller)?;
            phase::guard(m.state.phase, Op::StartGame)?;
            let joined = m.players.len();
            if joined < MIN_PLAYERS || joined <= 2 * m.config.impostor_count {
                return Err(GameError::NotEnoughPlayers);
            }
            m.state.round = 1;
            move_to(m, Phase::Playing, &mut events)?;
        }

        Action::Join {
            address,
            color,
            name,
            player_hash,
            role_commitment,
        } => {
            phase::guard(m.state.phase, Op::JoinGame)?;
            let player = Player {
                address: address.clone(),
                color,
                name,
                player_hash,
                role_commitment,
                alive: true,
                task_count: 0,
                x: 0,
                y: 0,
            };
            registry::join(&mut m.players, m.config.max_players, player)?;
            events.push_back(GameEvent::PlayerJoined(address));
        }

        // ── Playing ──────────────────────────────────────────────────────────
        Action::Move { player, x, y } => {
            phase::guard(m.state.phase, Op::SubmitMove)?;
            let mut record = registry::require_alive(&m.players, &player)?;
            record.x = x;
            record.y = y;
            m.players.set(player.clone(), record);
            events.push_back(GameEvent::PlayerMoved(player, x, y));
        }

        Action::Task { player, proof } => {
            phase::guard(m.state.phase, Op::SubmitTaskProof)?;
            let mut record = registry::require_alive(&m.players, &player)?;
            gate::gate(
                ledger,
                verifier,
                m.verifier.as_ref(),
                Binding::new(ProofKind::Task, m.state.round),
                &proof,
            )?;

            record.task_count = record.task_count.saturating_add(1);
            m.players.set(player.clone(), record);
            events.push_back(GameEvent::TaskCompleted(
                player,
                registry::total_tasks(&m.players),
            ));
            settle(m, Phase::Playing, &mut events)?;
        }

        Action::Kill {
            killer,
            victim,
            proof,
        } => {
            phase::guard(m.state.phase, Op::SubmitKillProof)?;
            registry::require_alive(&m.players, &killer)?;
            let target = registry::require_alive(&m.players, &victim)?;
            if killer == victim {
                return Err(GameError::SelfTarget);
            }
            gate::gate(
                ledger,
                verifier,
                m.verifier.as_ref(),
                Binding::targeting(ProofKind::Kill, m.state.round, &target.player_hash),
                &proof,
            )?;

            registry::mark_dead(&mut m.players, target);
            events.push_back(GameEvent::PlayerKilled(killer, victim));
            settle(m, Phase::Playing, &mut events)?;
        }

        Action::StartMeeting { caller } => {
            phase::guard(m.state.phase, Op::StartMeeting)?;
            registry::require_alive(&m.players, &caller)?;
            let round = m.state.round;
            m.meeting = Some(tally::open(env, round, caller.clone()));
            events.push_back(GameEvent::MeetingStarted(caller, round));
            move_to(m, Phase::Meeting, &mut events)?;
        }

        // ── Meeting ──────────────────────────────────────────────────────────
        Action::Vote { voter, proof } => {
            phase::guard(m.state.phase, Op::SubmitVote)?;
            registry::require_alive(&m.players, &voter)?;
            let mut meeting = m.meeting.clone().ok_or(GameError::NoActiveMeeting)?;
            if tally::has_voted(&meeting, &voter) {
                return Err(GameError::VoteAlreadySubmitted);
            }
            let target = gate::gate(
                ledger,
                verifier,
                m.verifier.as_ref(),
                Binding::new(ProofKind::Vote, meeting.round_index),
                &proof,
            )?;

            tally::record_ballot(&mut meeting, &voter, target.clone())?;
            events.push_back(GameEvent::VoteCast(voter, meeting.round_index, target));
            m.meeting = Some(meeting);
        }

        Action::FinalizeMeeting { caller } => {
            phase::guard(m.state.phase, Op::FinalizeMeeting)?;
            if caller != m.admin {
                registry::require_alive(&m.players, &caller)?;
            }
            let meeting = m.meeting.take().ok_or(GameError::NoActiveMeeting)?;

            let ejected = match tally::count(env, &meeting) {
                Tally::Majority { target, votes } => {
                    registry::find_alive_by_hash(&m.players, &target).map(|p| (p, votes))
                }
                Tally::NoMajority => None,
            };
            match ejected {
                Some((player, votes)) => {
                    events.push_back(GameEvent::PlayerEjected(
                        player.address.clone(),
                        meeting.round_index,
                        votes,
                    ));
                    registry::mark_dead(&mut m.players, player);
                }
                None => events.push_back(GameEvent::MeetingSkipped(
                    meeting.round_index,
                    meeting.ballots.len(),
                )),
            }

            m.state.round = m.state.round.saturating_add(1);
            settle(m, Phase::Playing, &mut events)?;
        }

        Action::EndMeeting { caller } => {
            require_admin(m, &caller)?;
            phase::guard(m.state.phase, Op::EndMeeting)?;
            if m.state.phase == Phase::Meeting {
                m.meeting = None;
                m.state.round = m.state.round.saturating_add(1);
                move_to(m, Phase::Playing, &mut events)?;
            }
        }

        // ── Game end ─────────────────────────────────────────────────────────
        Action::ImpostorWin { caller, proof } => {
            phase::guard(m.state.phase, Op::SubmitImpostorWinProof)?;
            registry::require_registered(&m.players, &caller)?;
            gate::gate(
                ledger,
                verifier,
                m.verifier.as_ref(),
                Binding::new(ProofKind::ImpostorWin, m.state.round),
                &proof,
            )?;
            end(m, Winner::Impostors, &mut events)?;
        }

        Action::EndGame { caller, winner } => {
            require_admin(m, &caller)?;
            phase::guard(m.state.phase, Op::EndGameAdmin)?;
            if winner == Winner::None {
                return Err(GameError::InvalidWinner);
            }
            end(m, winner, &mut events)?;
        }
    }

    Ok(events)
}

// ═══════════════════════════════════════════════════════════════════════════════
//  Helpers
// ═══════════════════════════════════════════════════════════════════════════════

fn require_admin(m: &Match, caller: &Address) -> Result<(), GameError> {
    if *caller != m.admin {
        return Err(GameError::Unauthorized);
    }
    Ok(())
}

pub fn validate_config(config: &GameConfig, registered: u32) -> Result<(), GameError> {
    let valid = config.max_players >= MIN_PLAYERS
        && config.max_players >= registered
        && config.tasks_to_win > 0
        && config.impostor_count >= 1
        && config.impostor_count.saturating_mul(2) < config.max_players;
    if !valid {
        return Err(GameError::InvalidConfig);
    }
    Ok(())
}

fn move_to(m: &mut Match, to: Phase, events: &mut Vec<GameEvent>) -> Result<(), GameError> {
    let from = m.state.phase;
    if !phase::is_edge(from, to) {
        return Err(GameError::WrongPhase);
    }
    m.state.phase = to;
    events.push_back(GameEvent::PhaseChanged(from, to, m.state.round));
    Ok(())
}

/// Run the win evaluator; end the game or continue in `next`.
fn settle(m: &mut Match, next: Phase, events: &mut Vec<GameEvent>) -> Result<(), GameError> {
    match win::evaluate(&m.config, &m.players) {
        Winner::None if m.state.phase == next => Ok(()),
        Winner::None => move_to(m, next, events),
        winner => end(m, winner, events),
    }
}

fn end(m: &mut Match, winner: Winner, events: &mut Vec<GameEvent>) -> Result<(), GameError> {
    m.meeting = None;
    m.state.winner = winner;
    move_to(m, Phase::Ended, events)?;
    events.push_back(GameEvent::GameEnded(winner));
    Ok(())
}

/// Admin override. Ignores the edge table but keeps derived state coherent.
fn force_phase(env: &Env, m: &mut Match, to: Phase, events: &mut Vec<GameEvent>) {
    let from = m.state.phase;

    if from == Phase::Meeting && to != Phase::Meeting {
        m.meeting = None;
    }
    if from == Phase::Ended && to != Phase::Ended {
        m.state.winner = Winner::None;
    }
    if from == Phase::Lobby && to != Phase::Lobby && m.state.round == 0 {
        m.state.round = 1;
    }
    if to == Phase::Meeting && m.meeting.is_none() {
        m.meeting = Some(tally::open(env, m.state.round, m.admin.clone()));
    }

    m.state.phase = to;
    events.push_back(GameEvent::PhaseChanged(from, to, m.state.round));
}
