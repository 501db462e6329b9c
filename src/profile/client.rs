//! Upstream profile service client
//!
//! Issues the single lookup call per request and folds every possible result
//! (HTTP status, body shape, transport error) into a [`LookupOutcome`].

use std::time::Duration;

use reqwest::header::ACCEPT;
use reqwest::StatusCode;
use thiserror::Error;

use super::model::{Envelope, LookupOutcome};
use crate::config::UpstreamConfig;
use crate::logger;

/// Longest body excerpt written to the error log
const BODY_LOG_LIMIT: usize = 512;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Invalid upstream base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    #[error("Failed to build HTTP client: {0}")]
    Build(#[from] reqwest::Error),
}

pub struct ProfileClient {
    lookup_url: String,
    client: reqwest::Client,
}

impl ProfileClient {
    pub fn new(upstream: &UpstreamConfig) -> Result<Self, ClientError> {
        let lookup_url = upstream.lookup_url();
        url::Url::parse(&lookup_url).map_err(|e| ClientError::InvalidBaseUrl {
            url: upstream.base_url.clone(),
            reason: e.to_string(),
        })?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(upstream.timeout_secs))
            .danger_accept_invalid_certs(upstream.accept_invalid_certs)
            .build()?;

        Ok(Self { lookup_url, client })
    }

    /// Look up one identifier. Never fails: errors become outcome variants.
    pub async fn lookup(&self, bis: &str) -> LookupOutcome {
        let request = self
            .client
            .get(&self.lookup_url)
            .query(&[("BIS", bis)])
            .header(ACCEPT, "application/json");

        let response = match request.send().await {
            Ok(resp) => resp,
            Err(e) => {
                let reason = describe_transport_error(&e);
                logger::log_upstream_failure(bis, &reason);
                return LookupOutcome::TransportFailure(reason);
            }
        };

        let status = response.status();
        let body = match response.bytes().await {
            Ok(b) => b,
            Err(e) => {
                let reason = describe_transport_error(&e);
                logger::log_upstream_failure(bis, &reason);
                return LookupOutcome::TransportFailure(reason);
            }
        };

        let outcome = classify(status, &body);
        match &outcome {
            LookupOutcome::Success(_) => {
                logger::log_debug(&format!("[Upstream] BIS={bis:?} -> {} (success)", status.as_u16()));
            }
            LookupOutcome::NotFound => {
                logger::log_info(&format!("No account for BIS={bis:?} (upstream {})", status.as_u16()));
            }
            LookupOutcome::Unauthorized => {
                logger::log_upstream_unauthorized(bis, &self.lookup_url, &body_excerpt(&body));
            }
            LookupOutcome::OtherError(code) => {
                logger::log_upstream_error(bis, *code, &body_excerpt(&body));
            }
            LookupOutcome::TransportFailure(_) => {}
        }
        outcome
    }
}

/// Map an upstream status and body to an outcome
///
/// 404 and a 200 carrying `{"status":"error"}` are both "not found".
/// Anything unrecognised is `OtherError`, never a panic.
pub fn classify(status: StatusCode, body: &[u8]) -> LookupOutcome {
    match status {
        StatusCode::NOT_FOUND => LookupOutcome::NotFound,
        StatusCode::UNAUTHORIZED => LookupOutcome::Unauthorized,
        StatusCode::OK => match serde_json::from_slice::<Envelope>(body) {
            Ok(Envelope::Success { data }) => LookupOutcome::Success(data.account),
            Ok(Envelope::Error { message }) => {
                logger::log_debug(&format!(
                    "[Upstream] error envelope: {}",
                    message.as_deref().unwrap_or("-")
                ));
                LookupOutcome::NotFound
            }
            Err(e) => {
                logger::log_warning(&format!("Unrecognised upstream body: {e}"));
                LookupOutcome::OtherError(status.as_u16())
            }
        },
        other => LookupOutcome::OtherError(other.as_u16()),
    }
}

fn describe_transport_error(e: &reqwest::Error) -> String {
    if e.is_timeout() {
        format!("timeout: {e}")
    } else if e.is_connect() {
        format!("connect: {e}")
    } else {
        e.to_string()
    }
}

fn body_excerpt(body: &[u8]) -> String {
    let text = String::from_utf8_lossy(body);
    if text.len() <= BODY_LOG_LIMIT {
        return text.into_owned();
    }
    let mut end = BODY_LOG_LIMIT;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &text[..end])
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::{
        matchers::{header, method, path, query_param},
        Mock, MockServer, ResponseTemplate,
    };

    fn upstream(base_url: String, timeout_secs: u64) -> UpstreamConfig {
        UpstreamConfig {
            base_url,
            lookup_path: "/api/public/linktree".to_string(),
            timeout_secs,
            accept_invalid_certs: false,
        }
    }

    fn success_body() -> serde_json::Value {
        serde_json::json!({
            "status": "success",
            "data": {
                "account": {
                    "name": "Harbour Cafe",
                    "buttons": [
                        {"label": "Menu", "link": "https://example.com/menu", "order": 1}
                    ]
                }
            }
        })
    }

    #[test]
    fn test_classify_statuses() {
        assert_eq!(classify(StatusCode::NOT_FOUND, b""), LookupOutcome::NotFound);
        assert_eq!(
            classify(StatusCode::UNAUTHORIZED, b"{}"),
            LookupOutcome::Unauthorized
        );
        assert_eq!(
            classify(StatusCode::BAD_GATEWAY, b"oops"),
            LookupOutcome::OtherError(502)
        );
        assert_eq!(
            classify(StatusCode::BAD_REQUEST, br#"{"status":"error"}"#),
            LookupOutcome::OtherError(400)
        );
        assert_eq!(
            classify(StatusCode::CREATED, &serde_json::to_vec(&success_body()).unwrap()),
            LookupOutcome::OtherError(201)
        );
    }

    #[test]
    fn test_classify_error_envelope_is_not_found() {
        let body = br#"{"status":"error","message":"x"}"#;
        assert_eq!(classify(StatusCode::OK, body), LookupOutcome::NotFound);
    }

    #[test]
    fn test_classify_unknown_shapes() {
        assert_eq!(
            classify(StatusCode::OK, b"<html>hi</html>"),
            LookupOutcome::OtherError(200)
        );
        assert_eq!(
            classify(StatusCode::OK, br#"{"status":"pending"}"#),
            LookupOutcome::OtherError(200)
        );
        assert_eq!(
            classify(StatusCode::OK, br#"{"status":"success","data":{}}"#),
            LookupOutcome::OtherError(200)
        );
    }

    #[test]
    fn test_classify_success() {
        let body = serde_json::to_vec(&success_body()).unwrap();
        match classify(StatusCode::OK, &body) {
            LookupOutcome::Success(account) => {
                assert_eq!(account.name, "Harbour Cafe");
                assert_eq!(account.buttons.len(), 1);
            }
            other => panic!("expected success, got {other:?}"),
        }
    }

    #[test]
    fn test_body_excerpt_truncates_on_char_boundary() {
        let body = "é".repeat(BODY_LOG_LIMIT);
        let excerpt = body_excerpt(body.as_bytes());
        assert!(excerpt.ends_with("..."));
        assert!(excerpt.len() <= BODY_LOG_LIMIT + 3);
    }

    #[test]
    fn test_invalid_base_url_rejected() {
        let result = ProfileClient::new(&upstream("not a url".to_string(), 5));
        assert!(matches!(result, Err(ClientError::InvalidBaseUrl { .. })));
    }

    #[tokio::test]
    async fn test_lookup_sends_encoded_identifier() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/public/linktree"))
            .and(query_param("BIS", "A&B 1"))
            .and(header("accept", "application/json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(success_body()))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = ProfileClient::new(&upstream(mock_server.uri(), 5)).unwrap();
        let outcome = client.lookup("A&B 1").await;

        assert!(matches!(outcome, LookupOutcome::Success(ref a) if a.name == "Harbour Cafe"));
    }

    #[tokio::test]
    async fn test_lookup_not_found_and_unauthorized() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(query_param("BIS", "missing"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&mock_server)
            .await;
        Mock::given(method("GET"))
            .and(query_param("BIS", "locked"))
            .respond_with(ResponseTemplate::new(401).set_body_string("bad key"))
            .mount(&mock_server)
            .await;

        let client = ProfileClient::new(&upstream(mock_server.uri(), 5)).unwrap();
        assert_eq!(client.lookup("missing").await, LookupOutcome::NotFound);
        assert_eq!(client.lookup("locked").await, LookupOutcome::Unauthorized);
    }

    #[tokio::test]
    async fn test_lookup_timeout_is_transport_failure() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(success_body())
                    .set_delay(Duration::from_secs(3)),
            )
            .mount(&mock_server)
            .await;

        let client = ProfileClient::new(&upstream(mock_server.uri(), 1)).unwrap();
        let outcome = client.lookup("slow").await;

        assert!(matches!(outcome, LookupOutcome::TransportFailure(_)));
    }

    #[tokio::test]
    async fn test_lookup_connection_refused() {
        // Bind then drop to get a port nothing listens on
        let port = std::net::TcpListener::bind("127.0.0.1:0")
            .unwrap()
            .local_addr()
            .unwrap()
            .port();
        let client = ProfileClient::new(&upstream(format!("http://127.0.0.1:{port}"), 2)).unwrap();

        assert!(matches!(
            client.lookup("1").await,
            LookupOutcome::TransportFailure(_)
        ));
    }
}
