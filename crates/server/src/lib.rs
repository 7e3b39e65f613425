// HTTP surface of the mockbird test-double server. The router owns all
// request decoding (endpoint names, path remainders, query parameters,
// bodies); the engine only ever sees decoded strings and bytes.

mod handlers;
mod passthrough;
mod routes;
mod settings;

pub use routes::{router, serve};

/// Seed for time-seeded latency draws on the HTTP surface. Deterministic
/// seeding stays available through the engine API.
pub(crate) fn time_seed() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map_or(0, |elapsed| elapsed.as_nanos() as u64)
}
