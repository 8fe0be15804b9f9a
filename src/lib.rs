pub mod assignment;
pub mod builder;
pub mod circuit;
pub mod config;
pub mod engine;
pub mod error;
pub mod gadget;
pub mod orchestrator;
pub mod params;
pub mod protocol;
pub mod r1cs;
pub mod scalar;
pub mod transport;

pub use crate::{
    config::Config,
    error::{Error, Result},
    orchestrator::{run, Report},
};
