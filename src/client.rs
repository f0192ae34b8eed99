//! HTTP client for the MonteSuivi JSON API.
//!
//! Used by the CLI to query a running server. The base URL comes from
//! `MONTESUIVI_URL` (default: `http://localhost:3000/api/v1`).

use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use thiserror::Error;
use uuid::Uuid;

use crate::config;
use crate::models::*;
use crate::report::KidReport;

/// HTTP client errors.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Server error: {0}")]
    Server(String),
}

/// Options for fetching a report, mirroring the report query parameters.
#[derive(Debug, Clone, Default)]
pub struct ReportOptions {
    pub from: Option<String>,
    pub to: Option<String>,
    pub include_percentages: bool,
}

impl ReportOptions {
    fn query(&self) -> Vec<(&'static str, String)> {
        let mut query = Vec::new();
        if let Some(from) = &self.from {
            query.push(("from", from.clone()));
        }
        if let Some(to) = &self.to {
            query.push(("to", to.clone()));
        }
        if self.include_percentages {
            query.push(("includePercentages", "true".to_string()));
        }
        query
    }
}

#[derive(Debug, Clone)]
pub struct TrackerClient {
    base_url: String,
    client: Client,
}

impl TrackerClient {
    pub fn from_env() -> Self {
        Self::new(config::api_url_from_env())
    }

    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client: Client::new(),
        }
    }

    fn get(&self, path: &str) -> reqwest::RequestBuilder {
        self.client.get(format!("{}{}", self.base_url, path))
    }

    async fn handle_response<T: DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> Result<T, ClientError> {
        let status = response.status();
        if status.is_success() {
            Ok(response.json().await?)
        } else {
            let body = response.text().await.unwrap_or_default();
            match status {
                StatusCode::NOT_FOUND => Err(ClientError::NotFound(body)),
                StatusCode::BAD_REQUEST => Err(ClientError::BadRequest(body)),
                _ => Err(ClientError::Server(format!("{}: {}", status, body))),
            }
        }
    }

    /// Check the server is up. Returns the reported status string.
    pub async fn health(&self) -> Result<String, ClientError> {
        let response = self.get("/health").send().await?;
        let body: serde_json::Value = self.handle_response(response).await?;
        Ok(body["status"].as_str().unwrap_or("unknown").to_string())
    }

    pub async fn list_kids(&self) -> Result<Vec<Kid>, ClientError> {
        let response = self.get("/kids").send().await?;
        self.handle_response(response).await
    }

    pub async fn get_kid_report(
        &self,
        kid_id: Uuid,
        options: &ReportOptions,
    ) -> Result<KidReport, ClientError> {
        let response = self
            .get(&format!("/kids/{}/report", kid_id))
            .query(&options.query())
            .send()
            .await?;
        self.handle_response(response).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_options_build_query() {
        let options = ReportOptions {
            from: Some("2024-01-01".to_string()),
            to: None,
            include_percentages: true,
        };
        assert_eq!(
            options.query(),
            vec![
                ("from", "2024-01-01".to_string()),
                ("includePercentages", "true".to_string()),
            ]
        );
        assert!(ReportOptions::default().query().is_empty());
    }

    #[test]
    fn base_url_drops_trailing_slash() {
        let client = TrackerClient::new("http://localhost:3000/api/v1/");
        assert_eq!(client.base_url, "http://localhost:3000/api/v1");
    }
}
