//! Proof gate for vote, task, kill and impostor-win actions.
//!
//! Checks run cheapest first and all of them finish before the caller's
//! mutator touches the match:
//!
//! 1. envelope shape and positional public inputs
//! 2. commitment matches the caller's expected target, when there is one
//! 3. nullifier not yet consumed for this kind
//! 4. a verifier is configured
//! 5. the verifier accepts the proof
//!
//! Only after step 5 is the nullifier staged as consumed.
//!
//! ## Public inputs layout
//!
//! ```text
//! [0] action word : 24 zero bytes || kind (u32 BE) || round (u32 BE)
//! [1] commitment  : action-specific (vote target, task, victim, win claim)
//! [2] nullifier   : must equal the envelope nullifier
//! ```

use soroban_sdk::{contractclient, Address, BytesN, Env, Vec};

use crate::nullifier::NullifierLedger;
use crate::types::{ProofInput, ProofKind};
use crate::GameError;

pub const PUBLIC_INPUT_WORDS: u32 = 3;

const ACTION_WORD: u32 = 0;
const COMMITMENT_WORD: u32 = 1;
const NULLIFIER_WORD: u32 = 2;

/// External verifier contract.
#[contractclient(name = "ZkVerifierClient")]
pub trait ZkVerifier {
    fn verify(
        env: Env,
        proof_hash: BytesN<32>,
        nullifier: BytesN<32>,
        public_inputs: Vec<BytesN<32>>,
    ) -> bool;
}

/// Capability that decides proof validity. The contract uses
/// [`ContractVerifier`]; tests substitute deterministic fakes.
pub trait ProofVerifier {
    fn verify(&self, verifier: &Address, proof: &ProofInput) -> bool;
}

/// Calls the configured verifier contract. A trapping or non-boolean answer
/// counts as a rejection.
pub struct ContractVerifier<'a> {
    env: &'a Env,
}

impl<'a> ContractVerifier<'a> {
    pub fn new(env: &'a Env) -> Self {
        Self { env }
    }
}

impl ProofVerifier for ContractVerifier<'_> {
    fn verify(&self, verifier: &Address, proof: &ProofInput) -> bool {
        let client = ZkVerifierClient::new(self.env, verifier);
        matches!(
            client.try_verify(&proof.proof_hash, &proof.nullifier, &proof.public_inputs),
            Ok(Ok(true))
        )
    }
}

/// What a proof must be bound to.
pub struct Binding<'a> {
    pub kind: ProofKind,
    pub round: u32,
    /// Required commitment word, e.g. the victim of a kill.
    pub target: Option<&'a BytesN<32>>,
}

impl<'a> Binding<'a> {
    pub fn new(kind: ProofKind, round: u32) -> Self {
        Self {
            kind,
            round,
            target: None,
        }
    }

    pub fn targeting(kind: ProofKind, round: u32, target: &'a BytesN<32>) -> Self {
        Self {
            kind,
            round,
            target: Some(target),
        }
    }
}

/// Run every gate check for `binding`. Returns the proof's commitment word
/// and stages the nullifier in `ledger`.
pub fn gate<V: ProofVerifier>(
    ledger: &mut NullifierLedger,
    verifier: &V,
    verifier_ref: Option<&Address>,
    binding: Binding,
    proof: &ProofInput,
) -> Result<BytesN<32>, GameError> {
    let kind = binding.kind;
    let commitment = check_shape(proof, kind, binding.round)?;

    if let Some(target) = binding.target {
        if commitment != *target {
            return Err(GameError::ProofTargetMismatch);
        }
    }

    if ledger.is_consumed(kind, &proof.nullifier) {
        return Err(GameError::NullifierReused);
    }

    let verifier_ref = verifier_ref.ok_or(GameError::VerifierNotConfigured)?;
    if !verifier.verify(verifier_ref, proof) {
        return Err(GameError::ProofVerificationFailed);
    }

    ledger.consume(kind, &proof.nullifier);
    Ok(commitment)
}

fn check_shape(proof: &ProofInput, kind: ProofKind, round: u32) -> Result<BytesN<32>, GameError> {
    if is_zero(&proof.proof_hash) || is_zero(&proof.nullifier) {
        return Err(GameError::MalformedProofMetadata);
    }
    if proof.public_inputs.len() != PUBLIC_INPUT_WORDS {
        return Err(GameError::MalformedProofMetadata);
    }

    let action_word = word(&proof.public_inputs, ACTION_WORD)?;
    let commitment = word(&proof.public_inputs, COMMITMENT_WORD)?;
    let bound_nullifier = word(&proof.public_inputs, NULLIFIER_WORD)?;

    if bound_nullifier != proof.nullifier {
        return Err(GameError::MalformedProofMetadata);
    }

    let (word_kind, word_round) =
        decode_action_word(&action_word).ok_or(GameError::MalformedProofMetadata)?;
    if word_kind != kind as u32 {
        return Err(GameError::MalformedProofMetadata);
    }
    if word_round != round {
        return Err(GameError::StaleProofRound);
    }

    Ok(commitment)
}

fn word(inputs: &Vec<BytesN<32>>, index: u32) -> Result<BytesN<32>, GameError> {
    inputs.get(index).ok_or(GameError::MalformedProofMetadata)
}

fn is_zero(digest: &BytesN<32>) -> bool {
    digest.to_array() == [0u8; 32]
}

/// Encode the action word for `kind` in `round`.
pub fn encode_action_word(env: &Env, kind: ProofKind, round: u32) -> BytesN<32> {
    let mut word = [0u8; 32];
    word[24..28].copy_from_slice(&(kind as u32).to_be_bytes());
    word[28..32].copy_from_slice(&round.to_be_bytes());
    BytesN::from_array(env, &word)
}

/// Split an action word into `(kind, round)`. `None` if the padding is dirty.
pub fn decode_action_word(word: &BytesN<32>) -> Option<(u32, u32)> {
    let bytes = word.to_array();
    if bytes[..24].iter().any(|b| *b != 0) {
        return None;
    }
    let mut kind = [0u8; 4];
    let mut round = [0u8; 4];
    kind.copy_from_slice(&bytes[24..28]);
    round.copy_from_slice(&bytes[28..32]);
    Some((u32::from_be_bytes(kind), u32::from_be_bytes(round)))
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::AmongUsContract;
    use core::cell::Cell;
    use soroban_sdk::testutils::Address as _;
    use soroban_sdk::vec;

    struct CountingVerifier {
        accept: bool,
        calls: Cell<u32>,
    }

    impl CountingVerifier {
        fn new(accept: bool) -> Self {
            Self {
                accept,
                calls: Cell::new(0),
            }
        }
    }

    impl ProofVerifier for CountingVerifier {
        fn verify(&self, _verifier: &Address, _proof: &ProofInput) -> bool {
            self.calls.set(self.calls.get() + 1);
            self.accept
        }
    }

    fn digest(env: &Env, fill: u8) -> BytesN<32> {
        BytesN::from_array(env, &[fill; 32])
    }

    fn proof(env: &Env, kind: ProofKind, round: u32, nullifier: u8) -> ProofInput {
        let nullifier = digest(env, nullifier);
        ProofInput {
            proof_hash: digest(env, 0xEE),
            nullifier: nullifier.clone(),
            public_inputs: vec![
                env,
                encode_action_word(env, kind, round),
                digest(env, 0x42),
                nullifier,
            ],
        }
    }

    fn check(
        ledger: &mut NullifierLedger,
        verifier: &CountingVerifier,
        verifier_ref: &Address,
        kind: ProofKind,
        round: u32,
        p: &ProofInput,
    ) -> Result<BytesN<32>, GameError> {
        gate(ledger, verifier, Some(verifier_ref), Binding::new(kind, round), p)
    }

    fn with_contract<F: FnOnce(&Env)>(f: F) {
        let env = Env::default();
        let id = env.register(AmongUsContract, ());
        env.as_contract(&id, || f(&env));
    }

    #[test]
    fn accepted_proof_returns_commitment_and_stages_nullifier() {
        with_contract(|env| {
            let verifier_ref = Address::generate(env);
            let verifier = CountingVerifier::new(true);
            let mut ledger = NullifierLedger::new(env);
            let p = proof(env, ProofKind::Task, 1, 7);

            let commitment =
                check(&mut ledger, &verifier, &verifier_ref, ProofKind::Task, 1, &p).unwrap();

            assert_eq!(commitment, digest(env, 0x42));
            assert_eq!(verifier.calls.get(), 1);
            assert!(ledger.is_consumed(ProofKind::Task, &p.nullifier));
            assert!(!ledger.is_consumed(ProofKind::Vote, &p.nullifier));
        });
    }

    #[test]
    fn replay_is_rejected_without_calling_verifier() {
        with_contract(|env| {
            let verifier_ref = Address::generate(env);
            let verifier = CountingVerifier::new(true);
            let mut ledger = NullifierLedger::new(env);
            let p = proof(env, ProofKind::Kill, 2, 9);

            check(&mut ledger, &verifier, &verifier_ref, ProofKind::Kill, 2, &p).unwrap();
            let again = check(&mut ledger, &verifier, &verifier_ref, ProofKind::Kill, 2, &p);

            assert_eq!(again, Err(GameError::NullifierReused));
            assert_eq!(verifier.calls.get(), 1);
        });
    }

    #[test]
    fn failed_verification_stages_nothing() {
        with_contract(|env| {
            let verifier_ref = Address::generate(env);
            let verifier = CountingVerifier::new(false);
            let mut ledger = NullifierLedger::new(env);
            let p = proof(env, ProofKind::Vote, 3, 5);

            let result = check(&mut ledger, &verifier, &verifier_ref, ProofKind::Vote, 3, &p);

            assert_eq!(result, Err(GameError::ProofVerificationFailed));
            assert_eq!(ledger.staged_len(), 0);
        });
    }

    #[test]
    fn missing_verifier_rejected_after_cheap_checks() {
        with_contract(|env| {
            let verifier = CountingVerifier::new(true);
            let mut ledger = NullifierLedger::new(env);
            let p = proof(env, ProofKind::Task, 1, 4);

            let result = gate(&mut ledger, &verifier, None, Binding::new(ProofKind::Task, 1), &p);

            assert_eq!(result, Err(GameError::VerifierNotConfigured));
            assert_eq!(verifier.calls.get(), 0);
            assert_eq!(ledger.staged_len(), 0);
        });
    }

    #[test]
    fn malformed_metadata_never_reaches_verifier() {
        with_contract(|env| {
            let verifier_ref = Address::generate(env);
            let verifier = CountingVerifier::new(true);
            let mut ledger = NullifierLedger::new(env);

            let mut zero_hash = proof(env, ProofKind::Task, 1, 1);
            zero_hash.proof_hash = digest(env, 0);

            let mut short = proof(env, ProofKind::Task, 1, 2);
            short.public_inputs.pop_back();

            let mut unbound = proof(env, ProofKind::Task, 1, 3);
            unbound.public_inputs.set(NULLIFIER_WORD, digest(env, 0x99));

            let wrong_kind = proof(env, ProofKind::Vote, 1, 4);

            let mut dirty = proof(env, ProofKind::Task, 1, 5);
            dirty.public_inputs.set(ACTION_WORD, digest(env, 0x01));

            for p in [zero_hash, short, unbound, wrong_kind, dirty] {
                let result = check(&mut ledger, &verifier, &verifier_ref, ProofKind::Task, 1, &p);
                assert_eq!(result, Err(GameError::MalformedProofMetadata));
            }
            assert_eq!(verifier.calls.get(), 0);
        });
    }

    #[test]
    fn proof_for_another_round_is_stale() {
        with_contract(|env| {
            let verifier_ref = Address::generate(env);
            let verifier = CountingVerifier::new(true);
            let mut ledger = NullifierLedger::new(env);
            let p = proof(env, ProofKind::Vote, 1, 8);

            let result = check(&mut ledger, &verifier, &verifier_ref, ProofKind::Vote, 2, &p);

            assert_eq!(result, Err(GameError::StaleProofRound));
            assert_eq!(verifier.calls.get(), 0);
        });
    }

    #[test]
    fn target_mismatch_rejected_before_nullifier_and_verifier() {
        with_contract(|env| {
            let verifier_ref = Address::generate(env);
            let verifier = CountingVerifier::new(true);
            let mut ledger = NullifierLedger::new(env);
            let p = proof(env, ProofKind::Kill, 1, 6);
            let other = digest(env, 0x43);

            let binding = Binding::targeting(ProofKind::Kill, 1, &other);
            let result = gate(&mut ledger, &verifier, Some(&verifier_ref), binding, &p);
            assert_eq!(result, Err(GameError::ProofTargetMismatch));
            assert_eq!(verifier.calls.get(), 0);
            assert_eq!(ledger.staged_len(), 0);

            let victim = digest(env, 0x42);
            let binding = Binding::targeting(ProofKind::Kill, 1, &victim);
            let result = gate(&mut ledger, &verifier, Some(&verifier_ref), binding, &p);
            assert_eq!(result, Ok(victim));
            assert_eq!(verifier.calls.get(), 1);
        });
    }

    #[test]
    fn action_word_layout() {
        let env = Env::default();
        let word = encode_action_word(&env, ProofKind::Kill, 0x0102_0304);
        let bytes = word.to_array();
        assert_eq!(&bytes[24..28], &[0, 0, 0, 2]);
        assert_eq!(&bytes[28..32], &[1, 2, 3, 4]);
        assert_eq!(decode_action_word(&word), Some((2, 0x0102_0304)));
    }
}
