//! HTTP grader client.
//!
//! Requests are POSTed as JSON to `{base_url}/grade`. The response body is either a bare
//! array of per-test-case records or an object wrapping them under `results`.

use super::{GradeRequest, Grader, GraderError};
use async_trait::async_trait;
use marker::parsers::outcome_parser::RawOutcome;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use util::config::AppConfig;

pub struct HttpGrader {
    client: Client,
    endpoint: String,
    timeout: Duration,
}

impl HttpGrader {
    /// `timeout` caps the whole request, connection included.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, GraderError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| GraderError::Transport(e.to_string()))?;

        Ok(Self {
            client,
            endpoint: format!("{}/grade", base_url.trim_end_matches('/')),
            timeout,
        })
    }

    pub fn from_config(config: &AppConfig) -> Result<Self, GraderError> {
        Self::new(&config.grader_url, config.grader_timeout())
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl Grader for HttpGrader {
    async fn grade(&self, request: &GradeRequest) -> Result<Vec<RawOutcome>, GraderError> {
        tracing::debug!(
            endpoint = %self.endpoint,
            problem = %request.problem_id,
            mode = %request.mode,
            "Sending code to grader"
        );

        let response = self
            .client
            .post(&self.endpoint)
            .json(request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    GraderError::Timeout(self.timeout)
                } else {
                    GraderError::Transport(e.to_string())
                }
            })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| {
            if e.is_timeout() {
                GraderError::Timeout(self.timeout)
            } else {
                GraderError::Transport(e.to_string())
            }
        })?;

        if !status.is_success() {
            return Err(GraderError::Status {
                status: status.as_u16(),
                body,
            });
        }

        parse_payload(&body)
    }
}

/// Decodes a grader response body into raw per-test-case records.
pub fn parse_payload(body: &str) -> Result<Vec<RawOutcome>, GraderError> {
    let value: Value =
        serde_json::from_str(body).map_err(|e| GraderError::MalformedPayload(e.to_string()))?;

    let records = match value {
        Value::Array(_) => value,
        Value::Object(mut map) => map.remove("results").ok_or_else(|| {
            GraderError::MalformedPayload("response has no 'results' field".into())
        })?,
        other => {
            return Err(GraderError::MalformedPayload(format!(
                "expected an array of results, got {other}"
            )));
        }
    };

    serde_json::from_value(records).map_err(|e| GraderError::MalformedPayload(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn accepts_bare_arrays_and_wrapped_results() {
        let bare = r#"[{"status": "Accepted"}, {"status": "Wrong Answer"}]"#;
        assert_eq!(parse_payload(bare).unwrap().len(), 2);

        let wrapped = r#"{"results": [{"passed": true}], "token": "abc"}"#;
        let records = parse_payload(wrapped).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].passed, Some(json!(true)));
    }

    #[test]
    fn rejects_payloads_without_records() {
        for body in ["not json", "{\"status\": \"ok\"}", "42", "{\"results\": 3}"] {
            assert!(
                matches!(parse_payload(body), Err(GraderError::MalformedPayload(_))),
                "{body}"
            );
        }
    }

    #[test]
    fn endpoint_is_derived_from_base_url() {
        let grader = HttpGrader::new("http://localhost:3001/", Duration::from_secs(5)).unwrap();
        assert_eq!(grader.endpoint(), "http://localhost:3001/grade");
    }
}
