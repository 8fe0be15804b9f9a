//! Proof system backends.
//!
//! The constraint system and witness are built by this crate; key
//! generation, proving and verification are delegated to an external
//! library behind [`ProofSystem`].

use core::fmt::Debug;

use rand::{CryptoRng, RngCore};
use serde_derive::{Deserialize, Serialize};

use crate::{
    circuit::ConstraintSystem,
    error::EngineError,
    scalar::FieldElement,
    transport::Artifact,
};

pub mod groth16;
pub mod spartan;

pub use self::groth16::Groth16Engine;
pub use self::spartan::SpartanEngine;

/// Which backend a run uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EngineKind {
    #[default]
    Groth16,
    Spartan,
}

pub trait ProofSystem {
    type Field: FieldElement;
    type ProvingKey;
    type VerifyingKey: Artifact + Clone + PartialEq + Debug;
    type Proof: Artifact + PartialEq + Debug;

    const NAME: &'static str;

    /// Derives a key pair bound to `system`.
    fn generate<R: RngCore + CryptoRng>(
        &self,
        system: &ConstraintSystem<Self::Field>,
        rng: &mut R,
    ) -> Result<(Self::ProvingKey, Self::VerifyingKey), EngineError>;

    fn prove<R: RngCore + CryptoRng>(
        &self,
        pk: &Self::ProvingKey,
        primary: &[Self::Field],
        auxiliary: &[Self::Field],
        rng: &mut R,
    ) -> Result<Self::Proof, EngineError>;

    /// Verifies `proof` for `primary`. The input length is checked against
    /// the key; any mismatch or malformed artifact yields `false`.
    fn verify_strong(
        &self,
        vk: &Self::VerifyingKey,
        primary: &[Self::Field],
        proof: &Self::Proof,
    ) -> bool;
}

/// Rejects assignments the backend would choke on or silently prove.
pub(crate) fn check_witness<F: FieldElement>(
    system: &ConstraintSystem<F>,
    primary: &[F],
    auxiliary: &[F],
) -> Result<(), EngineError> {
    if primary.len() != system.num_primary() {
        return Err(EngineError::InputLength {
            kind: "primary",
            expected: system.num_primary(),
            actual: primary.len(),
        });
    }
    if auxiliary.len() != system.num_auxiliary() {
        return Err(EngineError::InputLength {
            kind: "auxiliary",
            expected: system.num_auxiliary(),
            actual: auxiliary.len(),
        });
    }
    let assignment = system
        .assignment_from(primary, auxiliary)
        .ok_or_else(|| EngineError::Prover("assignment size mismatch".into()))?;
    match system.first_unsatisfied(&assignment) {
        Ok(None) => Ok(()),
        Ok(Some(index)) => Err(EngineError::Unsatisfied {
            index,
            annotation: system.constraints()[index].annotation.clone(),
        }),
        Err(e) => Err(EngineError::Prover(e.to_string())),
    }
}
