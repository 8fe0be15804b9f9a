use core::fmt;

use rand::{rngs::StdRng, SeedableRng};
use serde_derive::Serialize;
use tracing::{info, info_span, warn};

use crate::{
    builder::ConstraintBuilder,
    config::Config,
    engine::{EngineKind, Groth16Engine, ProofSystem, SpartanEngine},
    error::{EngineError, Error, Result},
    gadget::{CubicGadget, Gadget},
    params::FieldContext,
    protocol::{Prover, Verifier},
    transport::{Channel, FileChannel},
};

/// Outcome of one run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Report {
    pub engine: EngineKind,
    pub num_constraints: usize,
    pub primary_input: Vec<String>,
    pub auxiliary_input: Vec<String>,
    /// Whether a proof was produced at all; a claim the witness does not
    /// satisfy has none.
    pub proved: bool,
    pub verified: bool,
    /// Whether the verifier's decoded key equals the prover's; `None` when
    /// nothing was published.
    pub verifying_key_round_trip: Option<bool>,
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Number of R1CS constraints: {}", self.num_constraints)?;
        writeln!(f, "Primary (public) input: [{}]", self.primary_input.join(", "))?;
        writeln!(
            f,
            "Auxiliary (private) input: [{}]",
            self.auxiliary_input.join(", ")
        )?;
        if self.proved {
            writeln!(f, "Deserialized Verification status: {}", self.verified)?;
        } else {
            writeln!(
                f,
                "Deserialized Verification status: false (claim not provable, no proof produced)"
            )?;
        }
        write!(
            f,
            "Verification key round-trip: {}",
            match self.verifying_key_round_trip {
                Some(true) => "ok",
                Some(false) => "MISMATCH",
                None => "skipped",
            }
        )
    }
}

pub fn run(config: &Config) -> Result<Report> {
    let mut channel = FileChannel::new(config.vk_path.clone(), config.proof_path.clone());
    run_over(config, &mut channel)
}

/// Same as [`run`] with the artifacts moving over `channel`.
pub fn run_over<C: Channel>(config: &Config, channel: &mut C) -> Result<Report> {
    match config.engine {
        EngineKind::Groth16 => run_with(&Groth16Engine, config, channel),
        EngineKind::Spartan => run_with(&SpartanEngine, config, channel),
    }
}

fn run_with<E: ProofSystem, C: Channel>(
    engine: &E,
    config: &Config,
    channel: &mut C,
) -> Result<Report> {
    let mut rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let ctx = FieldContext::<E::Field>::init();

    let prover_span = info_span!("prover", engine = E::NAME).entered();

    let mut pb = ConstraintBuilder::new(&ctx);
    let out = pb.allocate("out")?;
    let x = pb.allocate("x")?;
    pb.declare_primary_input_count(1)?;
    let mut gadget = CubicGadget::new(&mut pb, out, x)?;
    Gadget::<E::Field>::generate_constraints(&mut gadget, &mut pb)?;
    let system = pb.finalize()?;
    info!(
        constraints = system.num_constraints(),
        variables = system.num_variables(),
        "circuit built"
    );

    let prover = Prover::setup(engine, &system, &mut rng)?;

    pb.set_value(out, ctx.element(config.out))?;
    pb.set_value(x, ctx.element(config.x))?;
    gadget.generate_witness(&mut pb)?;
    let primary = pb.primary_input()?;
    let auxiliary = pb.auxiliary_input()?;

    let mut report = Report {
        engine: config.engine,
        num_constraints: system.num_constraints(),
        primary_input: ctx.render_all(&primary),
        auxiliary_input: ctx.render_all(&auxiliary),
        proved: false,
        verified: false,
        verifying_key_round_trip: None,
    };

    let proof = match prover.prove(pb.assignment(), &mut rng) {
        Ok(proof) => proof,
        Err(Error::Engine(EngineError::Unsatisfied { index, annotation })) => {
            warn!(index, %annotation, "claim is not provable, nothing published");
            return Ok(report);
        }
        Err(e) => return Err(e),
    };
    report.proved = true;
    prover.publish(&proof, channel, config.encoding)?;
    drop(prover_span);

    let _span = info_span!("verifier", engine = E::NAME).entered();
    let verifier = Verifier::receive(engine, channel, config.encoding)?;
    report.verified = verifier.verify(&primary);
    let round_trip = verifier.verifying_key() == prover.verifying_key();
    if !round_trip {
        warn!("decoded verifying key differs from the generated one");
    }
    report.verifying_key_round_trip = Some(round_trip);
    Ok(report)
}
