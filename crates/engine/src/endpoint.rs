use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use bytes::Bytes;

use crate::fingerprint::{fingerprint, Fingerprint, QueryParams};
use crate::latency::{LatencyError, LatencyInjector, LatencySpec};

/// A canned response recorded for one request shape. Immutable once
/// stored; an overwrite replaces the whole record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredResponse {
    pub content_type: String,
    pub body: Bytes,
}

impl StoredResponse {
    #[must_use]
    pub fn new<C, B>(content_type: C, body: B) -> Self
    where
        C: Into<String>,
        B: Into<Bytes>,
    {
        Self { content_type: content_type.into(), body: body.into() }
    }
}

/// A named collection of fingerprint-to-response mappings plus one active
/// latency policy. Lives for the process lifetime once created.
pub struct Endpoint {
    responses: RwLock<HashMap<Fingerprint, Arc<StoredResponse>>>,
    latency: RwLock<Arc<LatencyInjector>>,
}

// -- Constructors

impl Endpoint {
    #[must_use]
    pub fn new() -> Self {
        Self {
            responses: RwLock::new(HashMap::new()),
            latency: RwLock::new(Arc::new(LatencyInjector::none())),
        }
    }
}

impl Default for Endpoint {
    fn default() -> Self {
        Self::new()
    }
}

// -- Response table

impl Endpoint {
    /// Records a response under the fingerprint of the given request
    /// shape, overwriting any previous record for that shape. Replacement
    /// swaps the stored handle whole, so a racing lookup observes either
    /// the old or the new record, never a partial write.
    pub fn add_response(&self, path_remainder: &str, query: &QueryParams, response: StoredResponse) {
        let key = fingerprint(path_remainder, query);
        let mut responses = self.responses.write().expect("response table lock poisoned");
        responses.insert(key, Arc::new(response));
    }

    #[must_use]
    pub fn lookup(&self, path_remainder: &str, query: &QueryParams) -> Option<Arc<StoredResponse>> {
        let key = fingerprint(path_remainder, query);
        let responses = self.responses.read().expect("response table lock poisoned");
        responses.get(&key).cloned()
    }
}

// -- Latency

impl Endpoint {
    /// Replaces the active injector. Takes effect for subsequent lookups;
    /// delays already in flight keep the injector they started with.
    pub fn set_latency(&self, spec: LatencySpec) -> Result<(), LatencyError> {
        let injector = Arc::new(LatencyInjector::new(spec)?);
        let mut latency = self.latency.write().expect("latency lock poisoned");
        *latency = injector;
        Ok(())
    }

    #[must_use]
    pub fn latency_spec(&self) -> LatencySpec {
        self.latency.read().expect("latency lock poisoned").spec()
    }

    /// Applies the configured delay to the calling task. The injector
    /// handle is cloned out of the lock first, so nothing is held while
    /// sleeping.
    pub async fn apply_latency(&self) {
        let injector = {
            let latency = self.latency.read().expect("latency lock poisoned");
            Arc::clone(&latency)
        };
        injector.wait().await;
    }
}
