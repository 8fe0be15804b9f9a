//! Pairing-based backend: Groth16 over BN254 with the libsnark QAP
//! reduction.

use std::io::Cursor;

use ark_bn254::{Bn254, Fr};
use ark_groth16::{r1cs_to_qap::LibsnarkReduction, Groth16, Proof, ProvingKey, VerifyingKey};
use ark_relations::r1cs::{
    ConstraintSynthesizer, ConstraintSystemRef, LinearCombination as ArkLinearCombination,
    SynthesisError, Variable as ArkVariable,
};
use ark_serialize::{CanonicalDeserialize, CanonicalSerialize, Compress, Validate};
use rand::{CryptoRng, RngCore};
use tracing::{debug, warn};

use super::{check_witness, ProofSystem};
use crate::{
    circuit::{ConstraintSystem, LinearCombination},
    error::{EngineError, TransportError},
    transport::Artifact,
};

type Snark = Groth16<Bn254, LibsnarkReduction>;

/// Groth16 proving key together with the system it was generated from; the
/// prover needs both to synthesize the witness.
pub struct Groth16ProvingKey {
    key: ProvingKey<Bn254>,
    system: ConstraintSystem<Fr>,
}

impl Groth16ProvingKey {
    pub fn verifying_key(&self) -> &VerifyingKey<Bn254> {
        &self.key.vk
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Groth16Engine;

/// Replays a finalized system into arkworks. `witness` is `None` during
/// key generation.
struct SystemCircuit<'a> {
    system: &'a ConstraintSystem<Fr>,
    witness: Option<(&'a [Fr], &'a [Fr])>,
}

impl SystemCircuit<'_> {
    fn value(&self, index: usize) -> Result<Fr, SynthesisError> {
        let (primary, auxiliary) = self.witness.ok_or(SynthesisError::AssignmentMissing)?;
        let k = primary.len();
        if index < k {
            Ok(primary[index])
        } else {
            auxiliary
                .get(index - k)
                .copied()
                .ok_or(SynthesisError::AssignmentMissing)
        }
    }
}

fn lower(lc: &LinearCombination<Fr>, vars: &[ArkVariable]) -> ArkLinearCombination<Fr> {
    let mut out = ArkLinearCombination::zero();
    let constant = lc.constant_term();
    if constant != Fr::from(0u64) {
        out += (constant, ArkVariable::One);
    }
    for (var, coeff) in lc.terms() {
        out += (*coeff, vars[var.index()]);
    }
    out
}

impl ConstraintSynthesizer<Fr> for SystemCircuit<'_> {
    fn generate_constraints(self, cs: ConstraintSystemRef<Fr>) -> Result<(), SynthesisError> {
        let mut vars = Vec::with_capacity(self.system.num_variables());
        for i in 0..self.system.num_variables() {
            let var = if i < self.system.num_primary() {
                cs.new_input_variable(|| self.value(i))?
            } else {
                cs.new_witness_variable(|| self.value(i))?
            };
            vars.push(var);
        }
        for constraint in self.system.constraints() {
            cs.enforce_constraint(
                lower(&constraint.a, &vars),
                lower(&constraint.b, &vars),
                lower(&constraint.c, &vars),
            )?;
        }
        Ok(())
    }
}

impl ProofSystem for Groth16Engine {
    type Field = Fr;
    type ProvingKey = Groth16ProvingKey;
    type VerifyingKey = VerifyingKey<Bn254>;
    type Proof = Proof<Bn254>;

    const NAME: &'static str = "groth16";

    fn generate<R: RngCore + CryptoRng>(
        &self,
        system: &ConstraintSystem<Fr>,
        rng: &mut R,
    ) -> Result<(Self::ProvingKey, Self::VerifyingKey), EngineError> {
        let circuit = SystemCircuit {
            system,
            witness: None,
        };
        let key = Snark::generate_random_parameters_with_reduction(circuit, rng)
            .map_err(|e| EngineError::Setup(e.to_string()))?;
        debug!(
            public_inputs = key.vk.gamma_abc_g1.len() - 1,
            "groth16 key pair generated"
        );
        let vk = key.vk.clone();
        Ok((
            Groth16ProvingKey {
                key,
                system: system.clone(),
            },
            vk,
        ))
    }

    fn prove<R: RngCore + CryptoRng>(
        &self,
        pk: &Self::ProvingKey,
        primary: &[Fr],
        auxiliary: &[Fr],
        rng: &mut R,
    ) -> Result<Self::Proof, EngineError> {
        check_witness(&pk.system, primary, auxiliary)?;
        let circuit = SystemCircuit {
            system: &pk.system,
            witness: Some((primary, auxiliary)),
        };
        Snark::create_random_proof_with_reduction(circuit, &pk.key, rng)
            .map_err(|e| EngineError::Prover(e.to_string()))
    }

    fn verify_strong(&self, vk: &Self::VerifyingKey, primary: &[Fr], proof: &Self::Proof) -> bool {
        let expected = vk.gamma_abc_g1.len().saturating_sub(1);
        if primary.len() != expected || vk.gamma_abc_g1.is_empty() {
            warn!(
                expected,
                actual = primary.len(),
                "primary input length does not match verifying key"
            );
            return false;
        }
        let pvk = ark_groth16::prepare_verifying_key(vk);
        match Snark::verify_proof(&pvk, proof, primary) {
            Ok(valid) => valid,
            Err(e) => {
                warn!(error = %e, "groth16 verification errored");
                false
            }
        }
    }
}

fn to_canonical_bytes<T: CanonicalSerialize>(
    value: &T,
    artifact: &'static str,
) -> Result<Vec<u8>, TransportError> {
    let mut bytes = Vec::with_capacity(value.compressed_size());
    value
        .serialize_compressed(&mut bytes)
        .map_err(|e| TransportError::Encode {
            artifact,
            reason: e.to_string(),
        })?;
    Ok(bytes)
}

fn from_canonical_bytes<T: CanonicalDeserialize>(
    bytes: &[u8],
    artifact: &'static str,
) -> Result<T, TransportError> {
    let mut cursor = Cursor::new(bytes);
    let value = T::deserialize_with_mode(&mut cursor, Compress::Yes, Validate::Yes).map_err(|e| {
        TransportError::Malformed {
            artifact,
            reason: e.to_string(),
        }
    })?;
    if cursor.position() as usize != bytes.len() {
        return Err(TransportError::Malformed {
            artifact,
            reason: format!(
                "{} trailing bytes",
                bytes.len() - cursor.position() as usize
            ),
        });
    }
    Ok(value)
}

impl Artifact for VerifyingKey<Bn254> {
    const LABEL: &'static str = "groth16 verifying key";

    fn to_bytes(&self) -> Result<Vec<u8>, TransportError> {
        to_canonical_bytes(self, Self::LABEL)
    }

    fn from_bytes(bytes: &[u8]) -> Result<Self, TransportError> {
        from_canonical_bytes(bytes, Self::LABEL)
    }
}

impl Artifact for Proof<Bn254> {
    const LABEL: &'static str = "groth16 proof";

    fn to_bytes(&self) -> Result<Vec<u8>, TransportError> {
        to_canonical_bytes(self, Self::LABEL)
    }

    fn from_bytes(bytes: &[u8]) -> Result<Self, TransportError> {
        from_canonical_bytes(bytes, Self::LABEL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        builder::ConstraintBuilder,
        gadget::{CubicGadget, Gadget, PolynomialGadget},
        params::FieldContext,
    };
    use rand::{rngs::StdRng, SeedableRng};

    fn polynomial_system(coefficients: &[u64]) -> ConstraintSystem<Fr> {
        let ctx = FieldContext::<Fr>::init();
        let mut pb = ConstraintBuilder::new(&ctx);
        let out = pb.allocate("out").unwrap();
        let x = pb.allocate("x").unwrap();
        pb.declare_primary_input_count(1).unwrap();
        let coefficients = coefficients.iter().copied().map(Fr::from).collect();
        let mut g = PolynomialGadget::new(&mut pb, coefficients, out, x).unwrap();
        g.generate_constraints(&mut pb).unwrap();
        pb.finalize().unwrap()
    }

    fn cubic_system(constant: u64) -> ConstraintSystem<Fr> {
        polynomial_system(&[constant, 1, 0, 1])
    }

    fn f(v: u64) -> Fr {
        Fr::from(v)
    }

    #[test]
    fn test_prove_and_verify() {
        let mut rng = StdRng::seed_from_u64(7);
        let system = cubic_system(5);
        let engine = Groth16Engine;
        let (pk, vk) = engine.generate(&system, &mut rng).unwrap();
        assert_eq!(pk.verifying_key(), &vk);
        let proof = engine
            .prove(&pk, &[f(35)], &[f(3), f(9), f(27)], &mut rng)
            .unwrap();
        assert!(engine.verify_strong(&vk, &[f(35)], &proof));
        assert!(!engine.verify_strong(&vk, &[f(36)], &proof));
    }

    #[test]
    fn test_strong_input_length() {
        let mut rng = StdRng::seed_from_u64(8);
        let system = cubic_system(5);
        let engine = Groth16Engine;
        let (pk, vk) = engine.generate(&system, &mut rng).unwrap();
        let proof = engine
            .prove(&pk, &[f(35)], &[f(3), f(9), f(27)], &mut rng)
            .unwrap();
        assert!(!engine.verify_strong(&vk, &[], &proof));
        assert!(!engine.verify_strong(&vk, &[f(35), f(0)], &proof));
    }

    #[test]
    fn test_key_bound_to_system() {
        let mut rng = StdRng::seed_from_u64(9);
        let engine = Groth16Engine;
        let (pk, _) = engine.generate(&cubic_system(5), &mut rng).unwrap();
        let (_, other_vk) = engine.generate(&cubic_system(7), &mut rng).unwrap();
        let proof = engine
            .prove(&pk, &[f(35)], &[f(3), f(9), f(27)], &mut rng)
            .unwrap();
        assert!(!engine.verify_strong(&other_vk, &[f(35)], &proof));
    }

    #[test]
    fn test_key_of_larger_system_rejects() {
        let mut rng = StdRng::seed_from_u64(13);
        let engine = Groth16Engine;
        let (pk, _) = engine.generate(&cubic_system(5), &mut rng).unwrap();
        let larger = polynomial_system(&[5, 1, 0, 0, 0, 0, 0, 0, 0, 1]);
        let (_, larger_vk) = engine.generate(&larger, &mut rng).unwrap();
        let proof = engine
            .prove(&pk, &[f(35)], &[f(3), f(9), f(27)], &mut rng)
            .unwrap();
        assert!(!engine.verify_strong(&larger_vk, &[f(35)], &proof));
    }

    #[test]
    fn test_flipped_proof_bytes_never_verify() {
        let mut rng = StdRng::seed_from_u64(14);
        let engine = Groth16Engine;
        let (pk, vk) = engine.generate(&cubic_system(5), &mut rng).unwrap();
        let bytes = engine
            .prove(&pk, &[f(35)], &[f(3), f(9), f(27)], &mut rng)
            .unwrap()
            .to_bytes()
            .unwrap();

        for i in 0..bytes.len() {
            let mut flipped = bytes.clone();
            flipped[i] ^= 0x01;
            if let Ok(proof) = Proof::<Bn254>::from_bytes(&flipped) {
                assert!(!engine.verify_strong(&vk, &[f(35)], &proof), "byte {i}");
            }
        }
    }

    #[test]
    fn test_fresh_keys_per_generation() {
        let mut rng = StdRng::seed_from_u64(10);
        let system = cubic_system(5);
        let engine = Groth16Engine;
        let (pk, vk_a) = engine.generate(&system, &mut rng).unwrap();
        let (_, vk_b) = engine.generate(&system, &mut rng).unwrap();
        assert_ne!(vk_a, vk_b);
        let proof = engine
            .prove(&pk, &[f(35)], &[f(3), f(9), f(27)], &mut rng)
            .unwrap();
        assert!(!engine.verify_strong(&vk_b, &[f(35)], &proof));
    }

    #[test]
    fn test_unsatisfied_assignment_rejected() {
        let mut rng = StdRng::seed_from_u64(11);
        let system = cubic_system(5);
        let engine = Groth16Engine;
        let (pk, _) = engine.generate(&system, &mut rng).unwrap();
        let err = engine
            .prove(&pk, &[f(36)], &[f(3), f(9), f(27)], &mut rng)
            .unwrap_err();
        assert!(matches!(err, EngineError::Unsatisfied { index: 2, .. }));
    }

    #[test]
    fn test_artifact_roundtrip_and_corruption() {
        let mut rng = StdRng::seed_from_u64(12);
        let ctx = FieldContext::<Fr>::init();
        let mut pb = ConstraintBuilder::new(&ctx);
        let out = pb.allocate("out").unwrap();
        let x = pb.allocate("x").unwrap();
        pb.declare_primary_input_count(1).unwrap();
        let mut g = CubicGadget::new(&mut pb, out, x).unwrap();
        Gadget::<Fr>::generate_constraints(&mut g, &mut pb).unwrap();
        let system = pb.finalize().unwrap();

        let engine = Groth16Engine;
        let (pk, vk) = engine.generate(&system, &mut rng).unwrap();
        let proof = engine
            .prove(&pk, &[f(35)], &[f(3), f(9), f(27)], &mut rng)
            .unwrap();

        let vk_bytes = vk.to_bytes().unwrap();
        let proof_bytes = proof.to_bytes().unwrap();
        assert_eq!(VerifyingKey::<Bn254>::from_bytes(&vk_bytes).unwrap(), vk);
        assert_eq!(Proof::<Bn254>::from_bytes(&proof_bytes).unwrap(), proof);

        let truncated = &vk_bytes[..vk_bytes.len() - 1];
        assert!(matches!(
            VerifyingKey::<Bn254>::from_bytes(truncated),
            Err(TransportError::Malformed { .. })
        ));
        let mut padded = proof_bytes.clone();
        padded.push(0);
        assert!(matches!(
            Proof::<Bn254>::from_bytes(&padded),
            Err(TransportError::Malformed { .. })
        ));
        assert!(Proof::<Bn254>::from_bytes(&[]).is_err());
    }
}
