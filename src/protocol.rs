//! Parties: Prover, Verifier
//!
//! 1. Prover
//!     ConstraintSystem -> ProvingKey, VerifyingKey
//!     ProvingKey, Assignment -> Proof
//!     VerifyingKey, Proof -> Channel
//!
//! 2. Verifier
//!     Channel -> VerifyingKey, Proof
//!     VerifyingKey, PrimaryInput, Proof -> Verify
//!
//! The auxiliary input stays with the prover; only the envelope crosses.

use rand::{CryptoRng, RngCore};
use tracing::{info, warn};

use crate::{
    assignment::Assignment,
    circuit::ConstraintSystem,
    engine::ProofSystem,
    error::Result,
    transport::{decode, encode, Channel, Encoding, Envelope},
};

pub struct Prover<'e, E: ProofSystem> {
    engine: &'e E,
    proving_key: E::ProvingKey,
    verifying_key: E::VerifyingKey,
}

impl<'e, E: ProofSystem> Prover<'e, E> {
    pub fn setup<R: RngCore + CryptoRng>(
        engine: &'e E,
        system: &ConstraintSystem<E::Field>,
        rng: &mut R,
    ) -> Result<Self> {
        let (proving_key, verifying_key) = engine.generate(system, rng)?;
        info!(engine = E::NAME, constraints = system.num_constraints(), "key pair generated");
        Ok(Self {
            engine,
            proving_key,
            verifying_key,
        })
    }

    pub fn verifying_key(&self) -> &E::VerifyingKey {
        &self.verifying_key
    }

    pub fn prove<R: RngCore + CryptoRng>(
        &self,
        assignment: &Assignment<E::Field>,
        rng: &mut R,
    ) -> Result<E::Proof> {
        let primary = assignment.primary_input()?;
        let auxiliary = assignment.auxiliary_input()?;
        let proof = self
            .engine
            .prove(&self.proving_key, &primary, &auxiliary, rng)?;
        info!(engine = E::NAME, "proof generated");
        Ok(proof)
    }

    /// Encodes the verifying key and `proof` and sends them.
    pub fn publish<C: Channel>(
        &self,
        proof: &E::Proof,
        channel: &mut C,
        encoding: Encoding,
    ) -> Result<()> {
        let envelope = Envelope {
            verifying_key: encode(&self.verifying_key, encoding)?,
            proof: encode(proof, encoding)?,
        };
        channel.send(&envelope)?;
        info!(
            vk_bytes = envelope.verifying_key.len(),
            proof_bytes = envelope.proof.len(),
            "artifacts published"
        );
        Ok(())
    }
}

pub struct Verifier<'e, E: ProofSystem> {
    engine: &'e E,
    verifying_key: E::VerifyingKey,
    proof: E::Proof,
}

impl<'e, E: ProofSystem> Verifier<'e, E> {
    pub fn receive<C: Channel>(engine: &'e E, channel: &mut C, encoding: Encoding) -> Result<Self> {
        let envelope = channel.receive()?;
        let verifying_key = decode(&envelope.verifying_key, encoding)?;
        let proof = decode(&envelope.proof, encoding)?;
        Ok(Self {
            engine,
            verifying_key,
            proof,
        })
    }

    pub fn verifying_key(&self) -> &E::VerifyingKey {
        &self.verifying_key
    }

    pub fn proof(&self) -> &E::Proof {
        &self.proof
    }

    pub fn verify(&self, primary: &[E::Field]) -> bool {
        let verified = self
            .engine
            .verify_strong(&self.verifying_key, primary, &self.proof);
        if verified {
            info!(engine = E::NAME, "proof accepted");
        } else {
            warn!(engine = E::NAME, "proof rejected");
        }
        verified
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        builder::ConstraintBuilder,
        engine::{Groth16Engine, SpartanEngine},
        error::{Error, TransportError},
        gadget::{CubicGadget, Gadget},
        params::FieldContext,
        scalar::FieldElement,
        transport::MemoryChannel,
    };
    use rand::{rngs::StdRng, SeedableRng};

    fn exchange<E: ProofSystem>(engine: &E, encoding: Encoding) {
        let mut rng = StdRng::seed_from_u64(42);
        let ctx = FieldContext::<E::Field>::init();
        let mut pb = ConstraintBuilder::new(&ctx);
        let out = pb.allocate("out").unwrap();
        let x = pb.allocate("x").unwrap();
        pb.declare_primary_input_count(1).unwrap();
        let mut g = CubicGadget::new(&mut pb, out, x).unwrap();
        Gadget::<E::Field>::generate_constraints(&mut g, &mut pb).unwrap();
        let system = pb.finalize().unwrap();

        let prover = Prover::setup(engine, &system, &mut rng).unwrap();
        pb.set_value(x, ctx.element(3)).unwrap();
        pb.set_value(out, ctx.element(35)).unwrap();
        g.generate_witness(&mut pb).unwrap();
        let proof = prover.prove(pb.assignment(), &mut rng).unwrap();

        let mut channel = MemoryChannel::default();
        prover.publish(&proof, &mut channel, encoding).unwrap();
        let verifier = Verifier::receive(engine, &mut channel, encoding).unwrap();

        assert_eq!(verifier.verifying_key(), prover.verifying_key());
        assert_eq!(verifier.proof(), &proof);
        assert!(verifier.verify(&[ctx.element(35)]));
        assert!(!verifier.verify(&[ctx.element(36)]));
        assert!(!verifier.verify(&[]));
    }

    #[test]
    fn test_groth16_exchange() {
        exchange(&Groth16Engine, Encoding::Binary);
        exchange(&Groth16Engine, Encoding::Hex);
    }

    #[test]
    fn test_spartan_exchange() {
        exchange(&SpartanEngine, Encoding::Binary);
    }

    #[test]
    fn test_prove_with_missing_witness() {
        let mut rng = StdRng::seed_from_u64(5);
        let ctx = FieldContext::<ark_bn254::Fr>::init();
        let mut pb = ConstraintBuilder::new(&ctx);
        let out = pb.allocate("out").unwrap();
        let x = pb.allocate("x").unwrap();
        pb.declare_primary_input_count(1).unwrap();
        let mut g = CubicGadget::new(&mut pb, out, x).unwrap();
        Gadget::<ark_bn254::Fr>::generate_constraints(&mut g, &mut pb).unwrap();
        let system = pb.finalize().unwrap();
        let prover = Prover::setup(&Groth16Engine, &system, &mut rng).unwrap();
        pb.set_value(out, ark_bn254::Fr::one()).unwrap();
        assert!(matches!(
            prover.prove(pb.assignment(), &mut rng),
            Err(Error::Circuit(_))
        ));
    }

    #[test]
    fn test_receive_garbage() {
        let mut channel = MemoryChannel::default();
        channel
            .send(&Envelope {
                verifying_key: vec![0; 7],
                proof: vec![0; 7],
            })
            .unwrap();
        assert!(matches!(
            Verifier::receive(&Groth16Engine, &mut channel, Encoding::Binary),
            Err(Error::Transport(TransportError::Malformed { .. }))
        ));
    }
}
