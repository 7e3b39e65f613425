use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use uuid::Uuid;

use crate::endpoint::{Endpoint, StoredResponse};
use crate::errors::RegistryError;
use crate::fingerprint::QueryParams;
use crate::latency::LatencySpec;

/// Top-level owner of all named endpoints.
///
/// Constructed once at process start and passed around by shared
/// reference; tests build independent registries for isolated runs. The
/// name table sits behind its own reader-writer lock while every endpoint
/// guards its own response table, so registrations against different
/// endpoints do not serialize against each other.
pub struct Registry {
    endpoints: RwLock<HashMap<String, Arc<Endpoint>>>,
}

// -- Constructors

impl Registry {
    #[must_use]
    pub fn new() -> Self {
        Self { endpoints: RwLock::new(HashMap::new()) }
    }

    #[must_use]
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::new())
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

// -- Operations

impl Registry {
    /// Creates an endpoint under a freshly generated name whose sole
    /// response answers the bare request shape (empty path remainder, no
    /// query parameters). Returns the generated name.
    pub fn create_anonymous(&self, response: StoredResponse) -> String {
        let name = Uuid::new_v4().to_string();
        let endpoint = Arc::new(Endpoint::new());
        endpoint.add_response("", &QueryParams::new(), response);

        let mut endpoints = self.endpoints.write().expect("endpoint table lock poisoned");
        endpoints.insert(name.clone(), endpoint);
        drop(endpoints);

        tracing::info!("created anonymous endpoint {name}");
        name
    }

    /// Records a response on the named endpoint, creating the endpoint
    /// first when the name is unseen. The existence check and the create
    /// happen under the table's write lock, so two concurrent first
    /// registrations for one name cannot produce duplicate endpoints.
    pub fn register(
        &self,
        name: &str,
        path_remainder: &str,
        query: &QueryParams,
        response: StoredResponse,
    ) {
        let endpoint = {
            let mut endpoints = self.endpoints.write().expect("endpoint table lock poisoned");
            Arc::clone(
                endpoints
                    .entry(name.to_string())
                    .or_insert_with(|| Arc::new(Endpoint::new())),
            )
        };
        endpoint.add_response(path_remainder, query, response);
        tracing::debug!("registered response on endpoint {name} (path: {path_remainder:?})");
    }

    #[must_use]
    pub fn find(&self, name: &str) -> Option<Arc<Endpoint>> {
        let endpoints = self.endpoints.read().expect("endpoint table lock poisoned");
        endpoints.get(name).cloned()
    }

    /// Swaps the latency policy of a known endpoint.
    pub fn configure_latency(&self, name: &str, spec: LatencySpec) -> Result<(), RegistryError> {
        let Some(endpoint) = self.find(name) else {
            return Err(RegistryError::UnknownEndpoint(name.to_string()));
        };
        endpoint.set_latency(spec)?;
        tracing::info!("configured latency on endpoint {name}: {spec:?}");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::Registry;
    use crate::endpoint::StoredResponse;
    use crate::errors::RegistryError;
    use crate::fingerprint::QueryParams;
    use crate::latency::LatencySpec;

    #[test]
    fn should_answer_the_bare_shape_on_an_anonymous_endpoint() {
        let registry = Registry::new();
        let name = registry.create_anonymous(StoredResponse::new("text/plain", "pong"));

        assert!(uuid::Uuid::parse_str(&name).is_ok());

        let endpoint = registry.find(&name).expect("endpoint was just created");
        let found = endpoint
            .lookup("", &QueryParams::new())
            .expect("bare shape was recorded");
        assert_eq!(found.body.as_ref(), b"pong");
    }

    #[test]
    fn should_generate_distinct_anonymous_names() {
        let registry = Registry::new();
        let first = registry.create_anonymous(StoredResponse::new("", ""));
        let second = registry.create_anonymous(StoredResponse::new("", ""));

        assert_ne!(first, second);
    }

    #[test]
    fn should_create_the_endpoint_on_first_registration() {
        let registry = Registry::new();
        let query: QueryParams = [("item", "42")].into_iter().collect();

        assert!(registry.find("cart").is_none());
        registry.register("cart", "", &query, StoredResponse::new("application/json", r#"{"ok":true}"#));

        let endpoint = registry.find("cart").expect("first registration creates");
        assert!(endpoint.lookup("", &query).is_some());
    }

    #[test]
    fn should_accumulate_responses_on_one_endpoint() {
        let registry = Registry::new();
        registry.register("cart", "a", &QueryParams::new(), StoredResponse::new("", "first"));
        registry.register("cart", "b", &QueryParams::new(), StoredResponse::new("", "second"));

        let endpoint = registry.find("cart").expect("endpoint exists");
        assert!(endpoint.lookup("a", &QueryParams::new()).is_some());
        assert!(endpoint.lookup("b", &QueryParams::new()).is_some());
    }

    #[test]
    fn should_report_unknown_names_distinctly() {
        let registry = Registry::new();

        assert!(registry.find("ghost").is_none());
        assert!(matches!(
            registry.configure_latency("ghost", LatencySpec::None),
            Err(RegistryError::UnknownEndpoint(name)) if name == "ghost"
        ));
    }

    #[test]
    fn should_configure_latency_on_a_known_endpoint() {
        let registry = Registry::new();
        registry.register("cart", "", &QueryParams::new(), StoredResponse::new("", ""));

        registry
            .configure_latency("cart", LatencySpec::Static { delay_ms: 30 })
            .expect("endpoint exists and spec is valid");

        let endpoint = registry.find("cart").expect("endpoint exists");
        assert_eq!(endpoint.latency_spec(), LatencySpec::Static { delay_ms: 30 });
    }

    #[test]
    fn should_keep_one_endpoint_under_concurrent_first_registrations() {
        let registry = Arc::new(Registry::new());

        let handles: Vec<_> = (0..16)
            .map(|worker| {
                let registry = Arc::clone(&registry);
                std::thread::spawn(move || {
                    let query: QueryParams =
                        [("worker", worker.to_string())].into_iter().collect();
                    registry.register("shared", "", &query, StoredResponse::new("", "x"));
                })
            })
            .collect();
        for handle in handles {
            handle.join().expect("registration thread panicked");
        }

        let endpoint = registry.find("shared").expect("endpoint exists");
        for worker in 0..16 {
            let query: QueryParams = [("worker", worker.to_string())].into_iter().collect();
            assert!(endpoint.lookup("", &query).is_some(), "lost write from worker {worker}");
        }
    }
}
