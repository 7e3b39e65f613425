use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use mockbird_engine::{LatencySpec, Registry};

use crate::handlers::text_response;
use crate::time_seed;

/// GET/POST /settings/:endpoint
///
/// Reconfigures the latency policy of a known endpoint. A request without
/// a `latency` parameter changes nothing. Malformed or inconsistent
/// numeric fields reject the whole update with one message per bad field;
/// the previous policy stays active.
pub async fn configure(
    Path(endpoint): Path<String>,
    Query(pairs): Query<Vec<(String, String)>>,
    State(registry): State<Arc<Registry>>,
) -> Response {
    if registry.find(&endpoint).is_none() {
        return text_response(StatusCode::NOT_FOUND, "Endpoint does not exist");
    }

    match parse_latency_settings(&pairs, time_seed()) {
        Ok(None) => StatusCode::OK.into_response(),
        Ok(Some(spec)) => match registry.configure_latency(&endpoint, spec) {
            Ok(()) => StatusCode::OK.into_response(),
            Err(err) => text_response(StatusCode::BAD_REQUEST, &err.to_string()),
        },
        Err(messages) => text_response(StatusCode::BAD_REQUEST, &messages.join("\n")),
    }
}

fn first_value<'a>(pairs: &'a [(String, String)], key: &str) -> Option<&'a str> {
    pairs
        .iter()
        .find(|(name, _)| name == key)
        .map(|(_, value)| value.as_str())
}

fn parse_field(pairs: &[(String, String)], key: &str, label: &str, errors: &mut Vec<String>) -> Option<u64> {
    let raw = first_value(pairs, key).unwrap_or("");
    match raw.parse::<u64>() {
        Ok(value) => Some(value),
        Err(_) => {
            errors.push(format!("Invalid {label} latency value {raw:?}"));
            None
        }
    }
}

/// Turns the decoded settings parameters into a latency spec. `Ok(None)`
/// means the request did not ask for a latency change; `Err` carries one
/// descriptive message per rejected field and leaves nothing applied.
fn parse_latency_settings(
    pairs: &[(String, String)],
    seed: u64,
) -> Result<Option<LatencySpec>, Vec<String>> {
    let Some(mode) = first_value(pairs, "latency") else {
        return Ok(None);
    };

    match mode {
        "none" => Ok(Some(LatencySpec::None)),
        "static" => {
            let mut errors = Vec::new();
            let delay_ms = parse_field(pairs, "latency_ms", "static", &mut errors);
            match delay_ms {
                Some(delay_ms) if errors.is_empty() => Ok(Some(LatencySpec::Static { delay_ms })),
                _ => Err(errors),
            }
        }
        "normal" => {
            let mut errors = Vec::new();
            let min_ms = parse_field(pairs, "latency_min_ms", "minimum", &mut errors);
            let median_ms = parse_field(pairs, "latency_median_ms", "median", &mut errors);
            let max_ms = parse_field(pairs, "latency_max_ms", "maximum", &mut errors);

            let (Some(min_ms), Some(median_ms), Some(max_ms)) = (min_ms, median_ms, max_ms) else {
                return Err(errors);
            };
            let spec = LatencySpec::BoundedNormal {
                seed,
                min_ms: min_ms as f64,
                median_ms: median_ms as f64,
                max_ms: max_ms as f64,
            };
            if let Err(err) = spec.validate() {
                return Err(vec![err.to_string()]);
            }
            Ok(Some(spec))
        }
        other => Err(vec![format!("Invalid latency {other:?}")]),
    }
}

#[cfg(test)]
mod tests {
    use mockbird_engine::LatencySpec;

    use super::parse_latency_settings;

    fn pairs(entries: &[(&str, &str)]) -> Vec<(String, String)> {
        entries
            .iter()
            .map(|(key, value)| ((*key).to_string(), (*value).to_string()))
            .collect()
    }

    #[test]
    fn should_leave_the_policy_alone_without_a_latency_parameter() {
        let parsed = parse_latency_settings(&pairs(&[("other", "1")]), 0);

        assert_eq!(parsed, Ok(None));
    }

    #[test]
    fn should_parse_a_static_update() {
        let parsed = parse_latency_settings(&pairs(&[("latency", "static"), ("latency_ms", "30")]), 0);

        assert_eq!(parsed, Ok(Some(LatencySpec::Static { delay_ms: 30 })));
    }

    #[test]
    fn should_reject_a_malformed_static_delay() {
        let parsed = parse_latency_settings(&pairs(&[("latency", "static"), ("latency_ms", "abc")]), 0);

        let messages = parsed.expect_err("malformed delay must be rejected");
        assert_eq!(messages.len(), 1);
        assert!(messages[0].contains("abc"), "message should cite the value: {}", messages[0]);
    }

    #[test]
    fn should_parse_a_normal_update_with_the_given_seed() {
        let parsed = parse_latency_settings(
            &pairs(&[
                ("latency", "normal"),
                ("latency_min_ms", "10"),
                ("latency_median_ms", "50"),
                ("latency_max_ms", "200"),
            ]),
            42,
        );

        assert_eq!(
            parsed,
            Ok(Some(LatencySpec::BoundedNormal {
                seed: 42,
                min_ms: 10.0,
                median_ms: 50.0,
                max_ms: 200.0,
            }))
        );
    }

    #[test]
    fn should_collect_one_message_per_bad_normal_field() {
        let parsed = parse_latency_settings(
            &pairs(&[
                ("latency", "normal"),
                ("latency_min_ms", "x"),
                ("latency_median_ms", "50"),
                ("latency_max_ms", "-3"),
            ]),
            0,
        );

        let messages = parsed.expect_err("two fields are malformed");
        assert_eq!(messages.len(), 2);
        assert!(messages[0].contains("minimum"));
        assert!(messages[1].contains("maximum"));
    }

    #[test]
    fn should_reject_unordered_normal_bounds() {
        let parsed = parse_latency_settings(
            &pairs(&[
                ("latency", "normal"),
                ("latency_min_ms", "100"),
                ("latency_median_ms", "50"),
                ("latency_max_ms", "200"),
            ]),
            0,
        );

        let messages = parsed.expect_err("inverted bounds must be rejected");
        assert!(messages[0].contains("min <= median <= max"));
    }

    #[test]
    fn should_reject_an_unknown_latency_mode() {
        let parsed = parse_latency_settings(&pairs(&[("latency", "jittery")]), 0);

        assert_eq!(parsed, Err(vec![r#"Invalid latency "jittery""#.to_string()]));
    }

    #[test]
    fn should_switch_latency_off() {
        let parsed = parse_latency_settings(&pairs(&[("latency", "none")]), 0);

        assert_eq!(parsed, Ok(Some(LatencySpec::None)));
    }
}
