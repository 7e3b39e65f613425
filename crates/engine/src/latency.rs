use std::sync::Mutex;
use std::time::Duration;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rand_distr::StandardNormal;
use serde::{Deserialize, Serialize};

/// z-score separating the extreme ~1% tail of a standard normal curve.
/// Dividing the half-ranges by it makes min/max behave as soft percentile
/// bounds rather than hard truncation points.
const TAIL_Z_SCORE: f64 = 2.328;

// -- Errors

#[derive(Debug, PartialEq)]
pub enum LatencyError {
    NonFiniteBound { field: &'static str },
    NegativeBound { field: &'static str, value: f64 },
    UnorderedBounds { min_ms: f64, median_ms: f64, max_ms: f64 },
}

impl std::error::Error for LatencyError {}

impl core::fmt::Display for LatencyError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NonFiniteBound { field } => {
                write!(f, "latency {field} must be a finite number")
            }
            Self::NegativeBound { field, value } => {
                write!(f, "latency {field} must not be negative, got {value}")
            }
            Self::UnorderedBounds { min_ms, median_ms, max_ms } => write!(
                f,
                "latency bounds must satisfy min <= median <= max, got {min_ms}/{median_ms}/{max_ms}"
            ),
        }
    }
}

/// Declarative latency policy for an endpoint. Serializable so a
/// configured policy can be inspected and compared in tests.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum LatencySpec {
    None,
    Static { delay_ms: u64 },
    BoundedNormal { seed: u64, min_ms: f64, median_ms: f64, max_ms: f64 },
}

impl LatencySpec {
    pub fn validate(&self) -> Result<(), LatencyError> {
        match *self {
            Self::None | Self::Static { .. } => Ok(()),
            Self::BoundedNormal { min_ms, median_ms, max_ms, .. } => {
                for (field, value) in [("min_ms", min_ms), ("median_ms", median_ms), ("max_ms", max_ms)] {
                    if !value.is_finite() {
                        return Err(LatencyError::NonFiniteBound { field });
                    }
                    if value < 0.0 {
                        return Err(LatencyError::NegativeBound { field, value });
                    }
                }
                if min_ms > median_ms || median_ms > max_ms {
                    return Err(LatencyError::UnorderedBounds { min_ms, median_ms, max_ms });
                }
                Ok(())
            }
        }
    }
}

#[derive(Debug)]
struct BoundedNormal {
    min_ms: f64,
    median_ms: f64,
    max_ms: f64,
    left_spread: f64,
    right_spread: f64,
    rng: Mutex<ChaCha8Rng>,
}

impl BoundedNormal {
    fn new(seed: u64, min_ms: f64, median_ms: f64, max_ms: f64) -> Self {
        Self {
            min_ms,
            median_ms,
            max_ms,
            left_spread: (median_ms - min_ms) / TAIL_Z_SCORE,
            right_spread: (max_ms - median_ms) / TAIL_Z_SCORE,
            rng: Mutex::new(ChaCha8Rng::seed_from_u64(seed)),
        }
    }

    fn sample_ms(&self) -> f64 {
        let z: f64 = {
            let mut rng = self.rng.lock().expect("latency rng lock poisoned");
            rng.sample(StandardNormal)
        };
        if z < 0.0 {
            (z * self.left_spread + self.median_ms).max(self.min_ms)
        } else {
            (z * self.right_spread + self.median_ms).min(self.max_ms)
        }
    }
}

#[derive(Debug)]
enum Policy {
    None,
    Static(Duration),
    BoundedNormal(BoundedNormal),
}

/// A configured delay policy. Built once from a validated [`LatencySpec`];
/// a bounded-normal injector owns its generator, so repeated draws on one
/// injector form a reproducible sequence for a given seed while separate
/// instances stay independent.
#[derive(Debug)]
pub struct LatencyInjector {
    spec: LatencySpec,
    policy: Policy,
}

// -- Constructors

impl LatencyInjector {
    pub fn new(spec: LatencySpec) -> Result<Self, LatencyError> {
        spec.validate()?;
        let policy = match spec {
            LatencySpec::None => Policy::None,
            LatencySpec::Static { delay_ms } => Policy::Static(Duration::from_millis(delay_ms)),
            LatencySpec::BoundedNormal { seed, min_ms, median_ms, max_ms } => {
                Policy::BoundedNormal(BoundedNormal::new(seed, min_ms, median_ms, max_ms))
            }
        };
        Ok(Self { spec, policy })
    }

    #[must_use]
    pub fn none() -> Self {
        Self { spec: LatencySpec::None, policy: Policy::None }
    }
}

// -- Delay computation

impl LatencyInjector {
    #[must_use]
    pub fn spec(&self) -> LatencySpec {
        self.spec
    }

    /// Computes the next delay without sleeping. Fractional milliseconds
    /// from the bounded-normal draw are preserved.
    #[must_use]
    pub fn compute_delay(&self) -> Duration {
        match &self.policy {
            Policy::None => Duration::ZERO,
            Policy::Static(delay) => *delay,
            Policy::BoundedNormal(dist) => Duration::from_secs_f64(dist.sample_ms() / 1_000.0),
        }
    }

    /// Computes one delay and suspends the calling task for it. Holds no
    /// lock while sleeping.
    pub async fn wait(&self) {
        let delay = self.compute_delay();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
    }
}
