use axum::extract::Path;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use mockbird_engine::{LatencyInjector, LatencySpec};

use crate::handlers::text_response;
use crate::time_seed;

// Stateless helper endpoints: echo a status code, or hold a request for a
// while before answering 200. Unparsable inputs are rejected with 400
// rather than coerced to zero.

/// GET /response/:status
pub async fn echo_status(Path(status): Path<String>) -> Response {
    respond_with_status(&status)
}

/// GET /response/:status/*path, where the path remainder is ignored.
pub async fn echo_status_with_path(Path((status, _path)): Path<(String, String)>) -> Response {
    respond_with_status(&status)
}

fn respond_with_status(raw: &str) -> Response {
    let code = raw
        .parse::<u16>()
        .ok()
        .filter(|code| (200..=599).contains(code))
        .and_then(|code| StatusCode::from_u16(code).ok());
    match code {
        Some(code) => code.into_response(),
        None => text_response(StatusCode::BAD_REQUEST, &format!("Invalid status code {raw:?}")),
    }
}

/// GET /timeout/:spec
///
/// `:spec` is either a single delay (`/timeout/30`) or a
/// `min,median,max` triple (`/timeout/10,50,200`) for one time-seeded
/// bounded-normal draw. Sleeps, then answers 200.
pub async fn timeout(Path(spec): Path<String>) -> Response {
    wait_and_respond(&spec).await
}

/// GET /timeout/:spec/*path, where the path remainder is ignored.
pub async fn timeout_with_path(Path((spec, _path)): Path<(String, String)>) -> Response {
    wait_and_respond(&spec).await
}

async fn wait_and_respond(raw: &str) -> Response {
    match parse_timeout_spec(raw) {
        Ok(injector) => {
            injector.wait().await;
            StatusCode::OK.into_response()
        }
        Err(message) => text_response(StatusCode::BAD_REQUEST, &message),
    }
}

fn parse_timeout_spec(raw: &str) -> Result<LatencyInjector, String> {
    let fields: Vec<&str> = raw.split(',').collect();
    let spec = match fields.as_slice() {
        [delay] => LatencySpec::Static {
            delay_ms: delay
                .parse::<u64>()
                .map_err(|_| format!("Invalid timeout value {delay:?}"))?,
        },
        [min, median, max] => {
            let parse = |field: &str, label: &str| {
                field
                    .parse::<u64>()
                    .map(|value| value as f64)
                    .map_err(|_| format!("Invalid {label} timeout value {field:?}"))
            };
            LatencySpec::BoundedNormal {
                seed: time_seed(),
                min_ms: parse(min, "minimum")?,
                median_ms: parse(median, "median")?,
                max_ms: parse(max, "maximum")?,
            }
        }
        _ => return Err(format!("Invalid timeout specification {raw:?}")),
    };
    LatencyInjector::new(spec).map_err(|err| err.to_string())
}

#[cfg(test)]
mod tests {
    use mockbird_engine::LatencySpec;

    use super::parse_timeout_spec;

    #[test]
    fn should_parse_a_single_delay_as_static() {
        let injector = parse_timeout_spec("30").expect("single integer is valid");

        assert_eq!(injector.spec(), LatencySpec::Static { delay_ms: 30 });
    }

    #[test]
    fn should_parse_a_triple_as_bounded_normal() {
        let injector = parse_timeout_spec("10,50,200").expect("triple is valid");

        assert!(matches!(
            injector.spec(),
            LatencySpec::BoundedNormal { min_ms, median_ms, max_ms, .. }
                if min_ms == 10.0 && median_ms == 50.0 && max_ms == 200.0
        ));
    }

    #[test]
    fn should_reject_malformed_specs() {
        assert!(parse_timeout_spec("abc").is_err());
        assert!(parse_timeout_spec("10,50").is_err());
        assert!(parse_timeout_spec("10,50,200,400").is_err());
        assert!(parse_timeout_spec("-5").is_err());
    }

    #[test]
    fn should_reject_inverted_triples() {
        let err = parse_timeout_spec("100,50,200").expect_err("inverted bounds");

        assert!(err.contains("min <= median <= max"));
    }
}
