//! HTTP client for the votes endpoint.

use serde::{Deserialize, Serialize};
use votewatch_core::Candidate;

use crate::config::DashboardConfig;

/// Body of a successful `GET /votes`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VotesSnapshot {
    pub romania: Vec<Candidate>,
    pub diaspora: Vec<Candidate>,
    pub combined: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

#[derive(Debug, thiserror::Error)]
pub enum ApiClientError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Server answered {status}: {message}")]
    Server { status: u16, message: String },
    #[error("Unexpected response: {0}")]
    InvalidResponse(String),
}

#[derive(Debug, Clone)]
pub struct ApiClient {
    client: reqwest::Client,
    votes_url: String,
}

impl ApiClient {
    pub fn new(config: &DashboardConfig) -> Result<Self, ApiClientError> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;
        Ok(Self {
            client,
            votes_url: config.votes_url(),
        })
    }

    pub fn votes_url(&self) -> &str {
        &self.votes_url
    }

    pub async fn fetch_votes(&self) -> Result<VotesSnapshot, ApiClientError> {
        let response = self.client.get(&self.votes_url).send().await?;
        let status = response.status();
        let body = response.text().await?;
        decode_votes(status.as_u16(), &body)
    }
}

/// Interpret a `/votes` response. Non-2xx answers carry `{ "error": ... }`.
pub fn decode_votes(status: u16, body: &str) -> Result<VotesSnapshot, ApiClientError> {
    if (200..300).contains(&status) {
        return serde_json::from_str(body)
            .map_err(|err| ApiClientError::InvalidResponse(err.to_string()));
    }

    let message = match serde_json::from_str::<ErrorBody>(body) {
        Ok(parsed) => parsed.error,
        Err(_) => body.chars().take(200).collect(),
    };
    Err(ApiClientError::Server { status, message })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_success() {
        let body = r#"{
            "romania": [{ "id": "A", "candidate": "Alpha", "party": null, "votes": 100 }],
            "diaspora": [],
            "combined": [{ "id": "A", "candidate": "Alpha", "party": "P", "votes": 100 }]
        }"#;
        let snapshot = decode_votes(200, body).unwrap();
        assert_eq!(snapshot.romania[0].votes, 100);
        assert!(snapshot.diaspora.is_empty());
        assert_eq!(snapshot.combined[0].party.as_deref(), Some("P"));
    }

    #[test]
    fn test_decode_bad_gateway_uses_error_message() {
        let err = decode_votes(502, r#"{ "error": "Fetch of u failed" }"#).unwrap_err();
        match err {
            ApiClientError::Server { status, message } => {
                assert_eq!(status, 502);
                assert_eq!(message, "Fetch of u failed");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_decode_non_json_error_body() {
        let err = decode_votes(500, "oops").unwrap_err();
        assert!(err.to_string().contains("oops"));
    }

    #[test]
    fn test_decode_malformed_success_body() {
        let err = decode_votes(200, r#"{ "romania": [] }"#).unwrap_err();
        assert!(matches!(err, ApiClientError::InvalidResponse(_)));
    }
}
