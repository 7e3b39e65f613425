// Implements the core engine of the mockbird test-double server: request
// fingerprinting, stub storage and matching per named endpoint, and
// synthetic latency injection.

mod endpoint;
mod errors;
mod fingerprint;
mod latency;
mod registry;
mod types;

pub use endpoint::{Endpoint, StoredResponse};
pub use errors::RegistryError;
pub use fingerprint::{fingerprint, Fingerprint, QueryParams, FINGERPRINT_LEN};
pub use latency::{LatencyError, LatencyInjector, LatencySpec};
pub use registry::Registry;
pub use types::{BoxedError, Result};
