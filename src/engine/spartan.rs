//! Transparent backend: Spartan SNARK with computation commitments over
//! ristretto255. Key generation needs no randomness; the verifier re-derives
//! the commitment from the sparse matrices it receives.

use core::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};

use curve25519_dalek::Scalar;
use libspartan::{
    ComputationCommitment, ComputationDecommitment, InputsAssignment, Instance, SNARKGens,
    VarsAssignment, SNARK,
};
use merlin::Transcript;
use rand::{CryptoRng, RngCore};
use tracing::{debug, warn};

use super::{check_witness, ProofSystem};
use crate::{
    circuit::ConstraintSystem,
    error::{EngineError, TransportError},
    r1cs::{into_r1cs, SparseR1cs},
    scalar::FieldElement,
    transport::Artifact,
};

const TRANSCRIPT_LABEL: &[u8] = b"gadget-snark";

/// Everything the verifier needs: the public R1CS matrices and sizes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpartanVerifyingKey(pub SparseR1cs);

pub struct SpartanProvingKey {
    vk: SpartanVerifyingKey,
    system: ConstraintSystem<Scalar>,
    instance: Instance,
    gens: SNARKGens,
    comm: ComputationCommitment,
    decomm: ComputationDecommitment,
}

impl SpartanProvingKey {
    pub fn verifying_key(&self) -> &SpartanVerifyingKey {
        &self.vk
    }
}

/// Spartan proofs carry no equality of their own; two proofs are equal when
/// their canonical encodings are.
pub struct SpartanProof(pub SNARK);

impl fmt::Debug for SpartanProof {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SpartanProof").finish_non_exhaustive()
    }
}

impl PartialEq for SpartanProof {
    fn eq(&self, other: &Self) -> bool {
        match (bincode::serialize(&self.0), bincode::serialize(&other.0)) {
            (Ok(a), Ok(b)) => a == b,
            _ => false,
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SpartanEngine;

fn gens_for(r1cs: &SparseR1cs) -> SNARKGens {
    SNARKGens::new(
        r1cs.num_cons,
        r1cs.num_vars,
        r1cs.num_inputs,
        r1cs.num_non_zero_entries(),
    )
}

fn to_assignment(values: &[Scalar]) -> Result<libspartan::Assignment, String> {
    let bytes = values.iter().map(|v| v.to_bytes_le()).collect::<Vec<_>>();
    libspartan::Assignment::new(&bytes).map_err(|e| format!("{e:?}"))
}

impl ProofSystem for SpartanEngine {
    type Field = Scalar;
    type ProvingKey = SpartanProvingKey;
    type VerifyingKey = SpartanVerifyingKey;
    type Proof = SpartanProof;

    const NAME: &'static str = "spartan";

    fn generate<R: RngCore + CryptoRng>(
        &self,
        system: &ConstraintSystem<Scalar>,
        _rng: &mut R,
    ) -> Result<(Self::ProvingKey, Self::VerifyingKey), EngineError> {
        let r1cs = into_r1cs(system);
        let instance = r1cs.instance().map_err(EngineError::Setup)?;
        let gens = gens_for(&r1cs);
        let (comm, decomm) = SNARK::encode(&instance, &gens);
        debug!(
            num_cons = r1cs.num_cons,
            num_vars = r1cs.num_vars,
            num_inputs = r1cs.num_inputs,
            "spartan computation committed"
        );
        let vk = SpartanVerifyingKey(r1cs);
        Ok((
            SpartanProvingKey {
                vk: vk.clone(),
                system: system.clone(),
                instance,
                gens,
                comm,
                decomm,
            },
            vk,
        ))
    }

    fn prove<R: RngCore + CryptoRng>(
        &self,
        pk: &Self::ProvingKey,
        primary: &[Scalar],
        auxiliary: &[Scalar],
        _rng: &mut R,
    ) -> Result<Self::Proof, EngineError> {
        check_witness(&pk.system, primary, auxiliary)?;
        let vars: VarsAssignment = to_assignment(auxiliary).map_err(EngineError::Prover)?;
        let inputs: InputsAssignment = to_assignment(primary).map_err(EngineError::Prover)?;
        let mut transcript = Transcript::new(TRANSCRIPT_LABEL);
        let proof = SNARK::prove(
            &pk.instance,
            &pk.comm,
            &pk.decomm,
            vars,
            &inputs,
            &pk.gens,
            &mut transcript,
        );
        Ok(SpartanProof(proof))
    }

    fn verify_strong(
        &self,
        vk: &Self::VerifyingKey,
        primary: &[Scalar],
        proof: &Self::Proof,
    ) -> bool {
        let r1cs = &vk.0;
        if primary.len() != r1cs.num_inputs {
            warn!(
                expected = r1cs.num_inputs,
                actual = primary.len(),
                "primary input length does not match verifying key"
            );
            return false;
        }
        if let Err(e) = r1cs.check_sizes() {
            warn!(error = %e, "verifying key has unusable sizes");
            return false;
        }
        let inputs = match to_assignment(primary) {
            Ok(inputs) => inputs,
            Err(e) => {
                warn!(error = %e, "primary input rejected");
                return false;
            }
        };
        // libspartan asserts on keys and proofs that decode but do not fit
        // each other
        let outcome = catch_unwind(AssertUnwindSafe(|| {
            let instance = r1cs.instance()?;
            let gens = gens_for(r1cs);
            let (comm, _) = SNARK::encode(&instance, &gens);
            let mut transcript = Transcript::new(TRANSCRIPT_LABEL);
            proof
                .0
                .verify(&comm, &inputs, &mut transcript, &gens)
                .map_err(|e| format!("{e:?}"))
        }));
        match outcome {
            Ok(Ok(())) => true,
            Ok(Err(e)) => {
                warn!(error = %e, "spartan verification failed");
                false
            }
            Err(_) => {
                warn!("spartan verifier panicked on a malformed key or proof");
                false
            }
        }
    }
}

fn bincode_decode<T: serde::de::DeserializeOwned>(
    bytes: &[u8],
    artifact: &'static str,
) -> Result<T, TransportError> {
    let value: T = bincode::deserialize(bytes).map_err(|e| TransportError::Malformed {
        artifact,
        reason: e.to_string(),
    })?;
    Ok(value)
}

fn bincode_encode<T: serde::Serialize>(
    value: &T,
    artifact: &'static str,
) -> Result<Vec<u8>, TransportError> {
    bincode::serialize(value).map_err(|e| TransportError::Encode {
        artifact,
        reason: e.to_string(),
    })
}

/// Rejects encodings with bytes left over after the value.
fn exact<T: serde::Serialize>(
    value: T,
    bytes: &[u8],
    artifact: &'static str,
) -> Result<T, TransportError> {
    let used = bincode::serialized_size(&value).map_err(|e| TransportError::Malformed {
        artifact,
        reason: e.to_string(),
    })? as usize;
    if used != bytes.len() {
        return Err(TransportError::Malformed {
            artifact,
            reason: format!("{} trailing bytes", bytes.len().saturating_sub(used)),
        });
    }
    Ok(value)
}

impl Artifact for SpartanVerifyingKey {
    const LABEL: &'static str = "spartan verifying key";

    fn to_bytes(&self) -> Result<Vec<u8>, TransportError> {
        bincode_encode(&self.0, Self::LABEL)
    }

    fn from_bytes(bytes: &[u8]) -> Result<Self, TransportError> {
        let r1cs: SparseR1cs = bincode_decode(bytes, Self::LABEL)?;
        let r1cs = exact(r1cs, bytes, Self::LABEL)?;
        r1cs.check_sizes().map_err(|reason| TransportError::Malformed {
            artifact: Self::LABEL,
            reason,
        })?;
        for (row, col, value) in r1cs.a.iter().chain(&r1cs.b).chain(&r1cs.c) {
            if *row >= r1cs.num_cons || *col > r1cs.num_vars + r1cs.num_inputs {
                return Err(TransportError::Malformed {
                    artifact: Self::LABEL,
                    reason: format!("entry ({row}, {col}) out of range"),
                });
            }
            if Scalar::from_bytes_le(value).is_none() {
                return Err(TransportError::Malformed {
                    artifact: Self::LABEL,
                    reason: format!("entry ({row}, {col}) is not a canonical scalar"),
                });
            }
        }
        Ok(Self(r1cs))
    }
}

impl Artifact for SpartanProof {
    const LABEL: &'static str = "spartan proof";

    fn to_bytes(&self) -> Result<Vec<u8>, TransportError> {
        bincode_encode(&self.0, Self::LABEL)
    }

    fn from_bytes(bytes: &[u8]) -> Result<Self, TransportError> {
        let snark: SNARK = bincode_decode(bytes, Self::LABEL)?;
        Ok(Self(exact(snark, bytes, Self::LABEL)?))
    }
}
