#![no_std]

//! # ZK Digest Verifier
//!
//! Reference verifier for the Among Us ZK game contract. It stands in for a
//! circuit verifier by checking that a proof hash is a keccak256 digest bound
//! to a verifying-key hash, the proof's nullifier and every public input.
//!
//! ## Binding
//!
//! ```text
//! proof_hash = keccak256("AUZK" || vk_hash || nullifier || input[0] || … || input[n-1])
//! ```
//!
//! `vk_hash` is fixed at deploy time by the constructor. A proof produced for
//! a different key, nullifier, input set or input order is rejected.
//!
//! The game contract lays out the inputs as
//! `[action_word, commitment, nullifier]`; this contract does not interpret
//! them beyond the digest, so the same key can serve every proof kind.

use soroban_sdk::{
    contract, contracterror, contractevent, contractimpl, contracttype, Bytes, BytesN, Env, Vec,
};

// ═══════════════════════════════════════════════════════════════════════════════
//  Error codes
// ═══════════════════════════════════════════════════════════════════════════════

/// Reason codes carried by [`EvVerifyFailed`].
#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord)]
#[repr(u32)]
pub enum ZkVerifyError {
    InputsEmpty = 1,
    InputsTooLong = 2,
    VerifyingKeyMissing = 3,
    DigestMismatch = 4,
}

// ═══════════════════════════════════════════════════════════════════════════════
//  Events
// ═══════════════════════════════════════════════════════════════════════════════

#[contractevent]
pub struct EvVerifyFailed {
    pub reason: u32,
}

#[contractevent]
pub struct EvVerifySuccess {
    pub inputs: u32,
}

// ═══════════════════════════════════════════════════════════════════════════════
//  Constants & storage
// ═══════════════════════════════════════════════════════════════════════════════

/// Domain separator: ASCII "AUZK" = 0x41555A4B
const PROOF_TAG: [u8; 4] = [0x41, 0x55, 0x5A, 0x4B];

pub const MAX_PUBLIC_INPUTS: u32 = 16;

#[contracttype]
#[derive(Clone)]
enum DataKey {
    VkHash,
}

// ═══════════════════════════════════════════════════════════════════════════════
//  Contract
// ═══════════════════════════════════════════════════════════════════════════════

#[contract]
pub struct ZkDigestVerifier;

#[contractimpl]
impl ZkDigestVerifier {
    pub fn __constructor(env: Env, vk_hash: BytesN<32>) {
        env.storage().instance().set(&DataKey::VkHash, &vk_hash);
    }

    /// Returns `true` iff `proof_hash` is the expected digest. Emits a
    /// diagnostic event either way.
    pub fn verify(
        env: Env,
        proof_hash: BytesN<32>,
        nullifier: BytesN<32>,
        public_inputs: Vec<BytesN<32>>,
    ) -> bool {
        match Self::check(&env, &proof_hash, &nullifier, &public_inputs) {
            Ok(()) => {
                EvVerifySuccess {
                    inputs: public_inputs.len(),
                }
                .publish(&env);
                true
            }
            Err(reason) => {
                EvVerifyFailed {
                    reason: reason as u32,
                }
                .publish(&env);
                false
            }
        }
    }

    pub fn vk_hash(env: Env) -> Option<BytesN<32>> {
        env.storage().instance().get(&DataKey::VkHash)
    }
}

impl ZkDigestVerifier {
    fn check(
        env: &Env,
        proof_hash: &BytesN<32>,
        nullifier: &BytesN<32>,
        public_inputs: &Vec<BytesN<32>>,
    ) -> Result<(), ZkVerifyError> {
        if public_inputs.is_empty() {
            return Err(ZkVerifyError::InputsEmpty);
        }
        if public_inputs.len() > MAX_PUBLIC_INPUTS {
            return Err(ZkVerifyError::InputsTooLong);
        }
        let vk_hash: BytesN<32> = env
            .storage()
            .instance()
            .get(&DataKey::VkHash)
            .ok_or(ZkVerifyError::VerifyingKeyMissing)?;

        if expected_proof_hash(env, &vk_hash, nullifier, public_inputs) != *proof_hash {
            return Err(ZkVerifyError::DigestMismatch);
        }
        Ok(())
    }
}

/// Digest a prover must submit as `proof_hash`.
pub fn expected_proof_hash(
    env: &Env,
    vk_hash: &BytesN<32>,
    nullifier: &BytesN<32>,
    public_inputs: &Vec<BytesN<32>>,
) -> BytesN<32> {
    let mut pre = Bytes::from_array(env, &PROOF_TAG);
    pre.append(&Bytes::from_array(env, &vk_hash.to_array()));
    pre.append(&Bytes::from_array(env, &nullifier.to_array()));
    for input in public_inputs.iter() {
        pre.append(&Bytes::from_array(env, &input.to_array()));
    }
    env.crypto().keccak256(&pre).into()
}

#[cfg(test)]
mod test {
    use super::*;
    use soroban_sdk::vec;

    fn digest(env: &Env, fill: u8) -> BytesN<32> {
        BytesN::from_array(env, &[fill; 32])
    }

    fn setup(env: &Env) -> (ZkDigestVerifierClient<'_>, BytesN<32>) {
        let vk = digest(env, 0x5A);
        let id = env.register(ZkDigestVerifier, (&vk,));
        (ZkDigestVerifierClient::new(env, &id), vk)
    }

    fn inputs(env: &Env) -> Vec<BytesN<32>> {
        vec![env, digest(env, 1), digest(env, 2), digest(env, 3)]
    }

    #[test]
    fn test_bound_digest_accepted() {
        let env = Env::default();
        let (client, vk) = setup(&env);
        let nullifier = digest(&env, 3);
        let public_inputs = inputs(&env);
        let proof_hash = expected_proof_hash(&env, &vk, &nullifier, &public_inputs);

        assert!(client.verify(&proof_hash, &nullifier, &public_inputs));
        assert_eq!(client.vk_hash(), Some(vk));
    }

    #[test]
    fn test_tampered_input_rejected() {
        let env = Env::default();
        let (client, vk) = setup(&env);
        let nullifier = digest(&env, 3);
        let public_inputs = inputs(&env);
        let proof_hash = expected_proof_hash(&env, &vk, &nullifier, &public_inputs);

        let mut tampered = public_inputs.clone();
        tampered.set(1, digest(&env, 9));
        assert!(!client.verify(&proof_hash, &nullifier, &tampered));
    }

    #[test]
    fn test_input_order_matters() {
        let env = Env::default();
        let (client, vk) = setup(&env);
        let nullifier = digest(&env, 3);
        let public_inputs = inputs(&env);
        let proof_hash = expected_proof_hash(&env, &vk, &nullifier, &public_inputs);

        let swapped = vec![&env, digest(&env, 2), digest(&env, 1), digest(&env, 3)];
        assert!(!client.verify(&proof_hash, &nullifier, &swapped));
    }

    #[test]
    fn test_wrong_nullifier_rejected() {
        let env = Env::default();
        let (client, vk) = setup(&env);
        let public_inputs = inputs(&env);
        let proof_hash = expected_proof_hash(&env, &vk, &digest(&env, 3), &public_inputs);

        assert!(!client.verify(&proof_hash, &digest(&env, 4), &public_inputs));
    }

    #[test]
    fn test_other_key_rejected() {
        let env = Env::default();
        let (client, _vk) = setup(&env);
        let nullifier = digest(&env, 3);
        let public_inputs = inputs(&env);
        let foreign = expected_proof_hash(&env, &digest(&env, 0x77), &nullifier, &public_inputs);

        assert!(!client.verify(&foreign, &nullifier, &public_inputs));
    }

    #[test]
    fn test_empty_and_oversized_inputs_rejected() {
        let env = Env::default();
        let (client, vk) = setup(&env);
        let nullifier = digest(&env, 3);

        let empty: Vec<BytesN<32>> = Vec::new(&env);
        let proof_hash = expected_proof_hash(&env, &vk, &nullifier, &empty);
        assert!(!client.verify(&proof_hash, &nullifier, &empty));

        let mut oversized = Vec::new(&env);
        for i in 0..=MAX_PUBLIC_INPUTS {
            oversized.push_back(digest(&env, i as u8));
        }
        let proof_hash = expected_proof_hash(&env, &vk, &nullifier, &oversized);
        assert!(!client.verify(&proof_hash, &nullifier, &oversized));
    }
}
