use soroban_sdk::{BytesN, Env, Vec};

use crate::storage::{DataKey, NULLIFIER_TTL_LEDGERS};
use crate::types::ProofKind;

/// Append-only set of consumed nullifiers, keyed by `(kind, nullifier)`.
///
/// Consumption is staged in memory while an action runs and only written by
/// [`NullifierLedger::flush`] once the action commits, so a rejected action
/// never burns a nullifier.
pub struct NullifierLedger<'a> {
    env: &'a Env,
    staged: Vec<DataKey>,
}

impl<'a> NullifierLedger<'a> {
    pub fn new(env: &'a Env) -> Self {
        Self {
            env,
            staged: Vec::new(env),
        }
    }

    pub fn is_consumed(&self, kind: ProofKind, nullifier: &BytesN<32>) -> bool {
        let key = DataKey::Nullifier(kind, nullifier.clone());
        self.staged.contains(&key) || self.env.storage().persistent().has(&key)
    }

    pub fn consume(&mut self, kind: ProofKind, nullifier: &BytesN<32>) {
        self.staged.push_back(DataKey::Nullifier(kind, nullifier.clone()));
    }

    #[cfg(test)]
    pub fn staged_len(&self) -> u32 {
        self.staged.len()
    }

    pub fn flush(self) {
        let persistent = self.env.storage().persistent();
        for key in self.staged.iter() {
            persistent.set(&key, &true);
            persistent.extend_ttl(&key, NULLIFIER_TTL_LEDGERS, NULLIFIER_TTL_LEDGERS);
        }
    }
}

/// Read-only lookup against committed storage.
pub fn is_used(env: &Env, kind: ProofKind, nullifier: BytesN<32>) -> bool {
    env.storage()
        .persistent()
        .has(&DataKey::Nullifier(kind, nullifier))
}
