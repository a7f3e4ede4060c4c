//! Phase protocol: which actions are legal in which phase, and which phase
//! edges exist.
//!
//! ```text
//! Lobby ──start_game──▶ Playing ──start_meeting──▶ Meeting
//!                         ▲  │                        │
//!                         │  └──────── win ───────┐   │ win
//!                         └─finalize/end_meeting──┼───┘
//!                                                 ▼
//!                                               Ended (terminal)
//! ```

use crate::types::Phase;
use crate::GameError;

/// Every phase-gated action. The admin `set_phase` override is not gated.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Op {
    ConfigureGame,
    SetVerifier,
    JoinGame,
    StartGame,
    SubmitMove,
    SubmitTaskProof,
    SubmitKillProof,
    StartMeeting,
    SubmitVote,
    FinalizeMeeting,
    EndMeeting,
    EndGameAdmin,
    SubmitImpostorWinProof,
}

const LOBBY: &[Phase] = &[Phase::Lobby];
const PLAYING: &[Phase] = &[Phase::Playing];
const MEETING: &[Phase] = &[Phase::Meeting];
const IN_PROGRESS: &[Phase] = &[Phase::Playing, Phase::Meeting];

impl Op {
    pub fn allowed_phases(self) -> &'static [Phase] {
        match self {
            Op::ConfigureGame | Op::SetVerifier | Op::JoinGame | Op::StartGame => LOBBY,
            Op::SubmitMove | Op::SubmitTaskProof | Op::SubmitKillProof | Op::StartMeeting => {
                PLAYING
            }
            Op::SubmitVote | Op::FinalizeMeeting => MEETING,
            Op::EndMeeting | Op::EndGameAdmin | Op::SubmitImpostorWinProof => IN_PROGRESS,
        }
    }
}

/// Reject `op` unless `current` allows it. An ended game reports
/// `GameAlreadyEnded` for every action, ahead of the phase table.
pub fn guard(current: Phase, op: Op) -> Result<(), GameError> {
    if current == Phase::Ended {
        return Err(GameError::GameAlreadyEnded);
    }
    if !op.allowed_phases().contains(&current) {
        return Err(GameError::WrongPhase);
    }
    Ok(())
}

/// Edges the game logic itself may take. `set_phase` bypasses this.
pub fn is_edge(from: Phase, to: Phase) -> bool {
    matches!(
        (from, to),
        (Phase::Lobby, Phase::Playing)
            | (Phase::Playing, Phase::Meeting)
            | (Phase::Meeting, Phase::Playing)
            | (Phase::Playing, Phase::Ended)
            | (Phase::Meeting, Phase::Ended)
    )
}

#[cfg(test)]
mod test {
    use super::*;

    const ALL_OPS: [Op; 13] = [
        Op::ConfigureGame,
        Op::SetVerifier,
        Op::JoinGame,
        Op::StartGame,
        Op::SubmitMove,
        Op::SubmitTaskProof,
        Op::SubmitKillProof,
        Op::StartMeeting,
        Op::SubmitVote,
        Op::FinalizeMeeting,
        Op::EndMeeting,
        Op::EndGameAdmin,
        Op::SubmitImpostorWinProof,
    ];

    #[test]
    fn ended_rejects_every_op_uniformly() {
        for op in ALL_OPS {
            assert_eq!(guard(Phase::Ended, op), Err(GameError::GameAlreadyEnded));
        }
    }

    #[test]
    fn lobby_only_allows_setup_ops() {
        for op in ALL_OPS {
            let expected = matches!(
                op,
                Op::ConfigureGame | Op::SetVerifier | Op::JoinGame | Op::StartGame
            );
            assert_eq!(guard(Phase::Lobby, op).is_ok(), expected, "{:?}", op);
        }
    }

    #[test]
    fn vote_requires_meeting() {
        assert_eq!(guard(Phase::Playing, Op::SubmitVote), Err(GameError::WrongPhase));
        assert!(guard(Phase::Meeting, Op::SubmitVote).is_ok());
        assert_eq!(guard(Phase::Meeting, Op::SubmitTaskProof), Err(GameError::WrongPhase));
    }

    #[test]
    fn admin_end_allowed_while_in_progress() {
        assert!(guard(Phase::Playing, Op::EndGameAdmin).is_ok());
        assert!(guard(Phase::Meeting, Op::EndGameAdmin).is_ok());
        assert_eq!(guard(Phase::Lobby, Op::EndGameAdmin), Err(GameError::WrongPhase));
    }

    #[test]
    fn ended_is_terminal_edge_wise() {
        for to in [Phase::Lobby, Phase::Playing, Phase::Meeting, Phase::Ended] {
            assert!(!is_edge(Phase::Ended, to));
        }
        assert!(is_edge(Phase::Meeting, Phase::Ended));
        assert!(!is_edge(Phase::Lobby, Phase::Meeting));
    }
}
