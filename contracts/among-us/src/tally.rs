use soroban_sdk::{Address, BytesN, Env, Map};

use crate::types::MeetingRound;
use crate::GameError;

/// Result of counting a meeting's ballots.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Tally {
    /// `target` holds a strict majority of the cast ballots.
    Majority { target: BytesN<32>, votes: u32 },
    /// Tie, split vote or no ballots at all.
    NoMajority,
}

pub fn open(env: &Env, round_index: u32, opened_by: Address) -> MeetingRound {
    MeetingRound {
        round_index,
        opened_by,
        ballots: Map::new(env),
    }
}

pub fn has_voted(meeting: &MeetingRound, voter: &Address) -> bool {
    meeting.ballots.contains_key(voter.clone())
}

/// First ballot per voter is final.
pub fn record_ballot(
    meeting: &mut MeetingRound,
    voter: &Address,
    target: BytesN<32>,
) -> Result<(), GameError> {
    if has_voted(meeting, voter) {
        return Err(GameError::VoteAlreadySubmitted);
    }
    meeting.ballots.set(voter.clone(), target);
    Ok(())
}

/// Count ballots per target. Abstentions are simply absent and do not
/// raise the bar: majority is `2 * votes > cast`.
pub fn count(env: &Env, meeting: &MeetingRound) -> Tally {
    let cast = meeting.ballots.len();
    let mut counts: Map<BytesN<32>, u32> = Map::new(env);
    for target in meeting.ballots.values().iter() {
        let votes = counts.get(target.clone()).unwrap_or(0) + 1;
        counts.set(target, votes);
    }

    for (target, votes) in counts.iter() {
        if votes * 2 > cast {
            return Tally::Majority { target, votes };
        }
    }
    Tally::NoMajority
}
