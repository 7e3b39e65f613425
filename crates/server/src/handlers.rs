use std::sync::Arc;

use axum::body::Body;
use axum::extract::{Path, Query, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use bytes::Bytes;
use mockbird_engine::{QueryParams, Registry, StoredResponse};

pub(crate) fn text_response(status: StatusCode, message: &str) -> Response {
    (status, message.to_string()).into_response()
}

fn content_type_of(headers: &HeaderMap) -> String {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
        .to_string()
}

// -- Registration

/// POST /mock
///
/// Creates an endpoint under a generated name that answers any bare
/// request with the posted payload. Responds with the generated name.
pub async fn create_mock(
    State(registry): State<Arc<Registry>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let name = registry.create_anonymous(StoredResponse::new(content_type_of(&headers), body));
    (StatusCode::OK, name).into_response()
}

/// POST /mock/:endpoint
pub async fn register_mock(
    Path(endpoint): Path<String>,
    Query(pairs): Query<Vec<(String, String)>>,
    State(registry): State<Arc<Registry>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    register(&registry, &endpoint, "", pairs, &headers, body)
}

/// POST /mock/:endpoint/*path
pub async fn register_mock_with_path(
    Path((endpoint, path)): Path<(String, String)>,
    Query(pairs): Query<Vec<(String, String)>>,
    State(registry): State<Arc<Registry>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    register(&registry, &endpoint, &path, pairs, &headers, body)
}

fn register(
    registry: &Registry,
    endpoint: &str,
    path_remainder: &str,
    pairs: Vec<(String, String)>,
    headers: &HeaderMap,
    body: Bytes,
) -> Response {
    let query: QueryParams = pairs.into_iter().collect();
    registry.register(
        endpoint,
        path_remainder,
        &query,
        StoredResponse::new(content_type_of(headers), body),
    );
    (StatusCode::OK, endpoint.to_string()).into_response()
}

// -- Playback

/// GET /endpoint/:endpoint
pub async fn play_endpoint(
    Path(endpoint): Path<String>,
    Query(pairs): Query<Vec<(String, String)>>,
    State(registry): State<Arc<Registry>>,
) -> Response {
    play(&registry, &endpoint, "", pairs).await
}

/// GET /endpoint/:endpoint/*path
pub async fn play_endpoint_with_path(
    Path((endpoint, path)): Path<(String, String)>,
    Query(pairs): Query<Vec<(String, String)>>,
    State(registry): State<Arc<Registry>>,
) -> Response {
    play(&registry, &endpoint, &path, pairs).await
}

/// Matches the request shape against the endpoint's recorded responses:
/// 404 when the name is unknown, 400 when no shape matches, otherwise the
/// stored payload after the configured latency has elapsed.
async fn play(
    registry: &Registry,
    endpoint_name: &str,
    path_remainder: &str,
    pairs: Vec<(String, String)>,
) -> Response {
    let Some(endpoint) = registry.find(endpoint_name) else {
        return text_response(StatusCode::NOT_FOUND, "Endpoint does not exist");
    };

    let query: QueryParams = pairs.into_iter().collect();
    let Some(stored) = endpoint.lookup(path_remainder, &query) else {
        tracing::debug!("no recorded response on {endpoint_name} for path {path_remainder:?}");
        return text_response(StatusCode::BAD_REQUEST, "No response for given parameters");
    };

    endpoint.apply_latency().await;

    let mut builder = Response::builder().status(StatusCode::OK);
    if !stored.content_type.is_empty() {
        builder = builder.header(header::CONTENT_TYPE, stored.content_type.as_str());
    }
    match builder.body(Body::from(stored.body.clone())) {
        Ok(response) => response,
        Err(err) => {
            tracing::error!("failed to assemble playback response: {err:?}");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}
