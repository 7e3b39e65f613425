use derive_more::From;

use crate::latency::LatencyError;

// -- Errors

#[derive(Debug, From)]
pub enum RegistryError {
    UnknownEndpoint(String),
    #[from]
    InvalidLatency(LatencyError),
}

impl std::error::Error for RegistryError {}

impl core::fmt::Display for RegistryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownEndpoint(name) => write!(f, "endpoint {name:?} does not exist"),
            Self::InvalidLatency(err) => write!(f, "{err}"),
        }
    }
}
