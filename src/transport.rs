//! Moving verification artifacts from the prover to the verifier.
//!
//! Only the verifying key and the proof ever cross this boundary. Each is
//! written as its own single-shot payload with no framing, version tag or
//! checksum; pairing a key with its proof is up to whoever wires the channel.

use std::fs;
use std::path::{Path, PathBuf};

use serde_derive::{Deserialize, Serialize};
use tracing::debug;

use crate::error::TransportError;

/// A key or proof with a canonical byte encoding.
pub trait Artifact: Sized {
    const LABEL: &'static str;

    fn to_bytes(&self) -> Result<Vec<u8>, TransportError>;

    /// Fails on truncated, padded or otherwise malformed input.
    fn from_bytes(bytes: &[u8]) -> Result<Self, TransportError>;
}

/// Payload form on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Encoding {
    #[default]
    Binary,
    /// Lowercase hex text.
    Hex,
}

pub fn encode<A: Artifact>(artifact: &A, encoding: Encoding) -> Result<Vec<u8>, TransportError> {
    let bytes = artifact.to_bytes()?;
    Ok(match encoding {
        Encoding::Binary => bytes,
        Encoding::Hex => hex::encode(bytes).into_bytes(),
    })
}

pub fn decode<A: Artifact>(payload: &[u8], encoding: Encoding) -> Result<A, TransportError> {
    match encoding {
        Encoding::Binary => A::from_bytes(payload),
        Encoding::Hex => {
            let text = std::str::from_utf8(payload).map_err(|e| TransportError::Malformed {
                artifact: A::LABEL,
                reason: e.to_string(),
            })?;
            let bytes = hex::decode(text.trim()).map_err(|e| TransportError::Malformed {
                artifact: A::LABEL,
                reason: e.to_string(),
            })?;
            A::from_bytes(&bytes)
        }
    }
}

/// The two encoded artifacts handed from prover to verifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope {
    pub verifying_key: Vec<u8>,
    pub proof: Vec<u8>,
}

pub trait Channel {
    fn send(&mut self, envelope: &Envelope) -> Result<(), TransportError>;

    fn receive(&mut self) -> Result<Envelope, TransportError>;
}

/// One file per artifact.
#[derive(Debug, Clone)]
pub struct FileChannel {
    vk_path: PathBuf,
    proof_path: PathBuf,
}

impl FileChannel {
    pub fn new(vk_path: impl Into<PathBuf>, proof_path: impl Into<PathBuf>) -> Self {
        Self {
            vk_path: vk_path.into(),
            proof_path: proof_path.into(),
        }
    }

    pub fn vk_path(&self) -> &Path {
        &self.vk_path
    }

    pub fn proof_path(&self) -> &Path {
        &self.proof_path
    }
}

fn write_file(path: &Path, payload: &[u8]) -> Result<(), TransportError> {
    fs::write(path, payload).map_err(|source| TransportError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    debug!(path = %path.display(), bytes = payload.len(), "artifact written");
    Ok(())
}

fn read_file(path: &Path) -> Result<Vec<u8>, TransportError> {
    let payload = fs::read(path).map_err(|source| TransportError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    debug!(path = %path.display(), bytes = payload.len(), "artifact read");
    Ok(payload)
}

impl Channel for FileChannel {
    fn send(&mut self, envelope: &Envelope) -> Result<(), TransportError> {
        write_file(&self.vk_path, &envelope.verifying_key)?;
        write_file(&self.proof_path, &envelope.proof)
    }

    fn receive(&mut self) -> Result<Envelope, TransportError> {
        Ok(Envelope {
            verifying_key: read_file(&self.vk_path)?,
            proof: read_file(&self.proof_path)?,
        })
    }
}

/// In-process hand-off; `receive` takes the envelope out.
#[derive(Debug, Default)]
pub struct MemoryChannel {
    slot: Option<Envelope>,
}

impl Channel for MemoryChannel {
    fn send(&mut self, envelope: &Envelope) -> Result<(), TransportError> {
        self.slot = Some(envelope.clone());
        Ok(())
    }

    fn receive(&mut self) -> Result<Envelope, TransportError> {
        self.slot.take().ok_or(TransportError::Empty)
    }
}
