//! People/career-search collaborator boundary.
//!
//! Career networking questions ("find an alumnus at company X") are a
//! separate intent routed to a separate lookup service. The core only
//! recognizes the intent and forwards the raw query plus the extracted
//! entities; the service itself is out of scope.

use crate::generative::GenerativeError;
use crate::types::PeopleEntities;
use serde::Serialize;
use std::time::Duration;

pub trait PeopleSearchClient: Send + Sync {
    fn search(&self, raw_query: &str, entities: &PeopleEntities) -> Result<String, GenerativeError>;
}

#[derive(Debug, Serialize)]
struct PeopleSearchRequest<'a> {
    query: &'a str,
    institution: Option<&'a str>,
    major: Option<&'a str>,
    employer: Option<&'a str>,
}

/// Forwards to the lookup service over HTTP. Same degrade-on-failure
/// contract as the generative client: no internal retries.
pub struct HttpPeopleSearchClient {
    endpoint: String,
    client: reqwest::blocking::Client,
    timeout_secs: u64,
}

impl HttpPeopleSearchClient {
    pub fn new(endpoint: String, timeout_secs: u64) -> Result<Self, GenerativeError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| GenerativeError::HttpError(format!("client build failed: {e}")))?;
        Ok(Self {
            endpoint,
            client,
            timeout_secs,
        })
    }
}

impl PeopleSearchClient for HttpPeopleSearchClient {
    fn search(&self, raw_query: &str, entities: &PeopleEntities) -> Result<String, GenerativeError> {
        let request = PeopleSearchRequest {
            query: raw_query,
            institution: entities.institution.as_deref(),
            major: entities.major.as_deref(),
            employer: entities.employer.as_deref(),
        };

        let response = self
            .client
            .post(&self.endpoint)
            .json(&request)
            .send()
            .map_err(|e| {
                if e.is_timeout() {
                    GenerativeError::Timeout(self.timeout_secs)
                } else {
                    GenerativeError::HttpError(format!("request failed: {e}"))
                }
            })?;

        if !response.status().is_success() {
            return Err(GenerativeError::HttpError(format!(
                "HTTP {} from people-search service",
                response.status()
            )));
        }

        let text = response
            .text()
            .map_err(|e| GenerativeError::InvalidPayload(format!("read failed: {e}")))?;
        if text.trim().is_empty() {
            return Err(GenerativeError::EmptyResponse);
        }
        Ok(text)
    }
}

/// Fixed-answer client for tests; `unavailable()` mimics a dead service.
pub struct StaticPeopleSearchClient {
    response: Option<String>,
}

impl StaticPeopleSearchClient {
    pub fn answering(text: impl Into<String>) -> Self {
        Self {
            response: Some(text.into()),
        }
    }

    pub fn unavailable() -> Self {
        Self { response: None }
    }
}

impl PeopleSearchClient for StaticPeopleSearchClient {
    fn search(&self, _raw_query: &str, _entities: &PeopleEntities) -> Result<String, GenerativeError> {
        match &self.response {
            Some(text) => Ok(text.clone()),
            None => Err(GenerativeError::HttpError("connection refused".to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_static_client_round_trip() {
        let client = StaticPeopleSearchClient::answering("2 alumni found at Google");
        let entities = PeopleEntities {
            employer: Some("Google".to_string()),
            ..Default::default()
        };
        let out = client.search("find alumni at google", &entities).unwrap();
        assert!(out.contains("Google"));
    }

    #[test]
    fn test_unavailable_client_errors() {
        let client = StaticPeopleSearchClient::unavailable();
        assert!(client
            .search("find alumni", &PeopleEntities::default())
            .is_err());
    }
}
