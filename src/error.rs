use std::path::PathBuf;

use thiserror::Error;

use crate::circuit::Variable;

/// Misuse of the constraint builder, a gadget or an assignment.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CircuitError {
    #[error("constraint builder is already finalized")]
    Finalized,
    #[error("primary input count already declared as {0}")]
    PrimaryInputsAlreadyDeclared(usize),
    #[error("primary input count was never declared")]
    PrimaryInputsUndeclared,
    #[error("{declared} primary inputs declared but only {allocated} variables allocated")]
    TooManyPrimaryInputs { declared: usize, allocated: usize },
    #[error("variable {0:?} was not allocated by this builder")]
    UnknownVariable(Variable),
    #[error("variable {0:?} has no assigned value")]
    Unassigned(Variable),
    #[error("{0} gadget already generated its constraints")]
    ConstraintsAlreadyGenerated(&'static str),
    #[error("{0} gadget has not generated its constraints yet")]
    ConstraintsNotGenerated(&'static str),
    #[error("polynomial gadget needs at least one coefficient")]
    EmptyPolynomial,
}

/// Failure inside a proof system engine.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("key generation failed: {0}")]
    Setup(String),
    #[error("proof generation failed: {0}")]
    Prover(String),
    #[error("{kind} input has {actual} values, key expects {expected}")]
    InputLength {
        kind: &'static str,
        expected: usize,
        actual: usize,
    },
    #[error("assignment violates constraint {index} ({annotation})")]
    Unsatisfied { index: usize, annotation: String },
}

/// Failure while encoding, moving or decoding artifacts.
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("i/o on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed {artifact}: {reason}")]
    Malformed {
        artifact: &'static str,
        reason: String,
    },
    #[error("could not encode {artifact}: {reason}")]
    Encode {
        artifact: &'static str,
        reason: String,
    },
    #[error("channel holds no artifacts")]
    Empty,
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("reading config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("parsing config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Circuit(#[from] CircuitError),
    #[error(transparent)]
    Engine(#[from] EngineError),
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error(transparent)]
    Config(#[from] ConfigError),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
