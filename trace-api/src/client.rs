//! HTTP client for the dashboard backend.
//!
//! ## Endpoints
//!
//! | Method | Path                        | Returns                  |
//! |--------|-----------------------------|--------------------------|
//! | GET    | `/health`                   | liveness only            |
//! | GET    | `/api/telemetry`            | `Vec<TelemetrySample>`   |
//! | GET    | `/api/active-users/:region` | `ActiveUsersSample`      |
//! | GET    | `/api/issues`               | `Vec<Issue>`             |
//! | GET    | `/api/resolutions`          | `Vec<Resolution>`        |
//! | GET    | `/api/health/:region`       | `HealthSnapshot`         |
//! | GET    | `/api/agents/status`        | `Vec<AgentStatus>`       |
//! | POST   | `/agent`                    | `AgentReply`             |
//! | POST   | `/remediate`                | `RemediationReply`       |

use std::time::Duration;

use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use tracing::debug;

use trace_types::{ActiveUsersSample, AgentStatus, HealthSnapshot, Issue, Resolution, TelemetrySample};

use crate::models::{AgentReply, AgentRequest, RemediateBody, RemediateRequest, RemediationReply};
use crate::ApiError;

/// Default backend address used when none is configured.
pub const DEFAULT_ENDPOINT: &str = "http://localhost:8000";

/// Default region queried when none is configured.
pub const DEFAULT_REGION: &str = "us-east-1";

/// Client for the dashboard REST API.
///
/// Cheap to clone; clones share the underlying connection pool.
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    endpoint: String,
    region: String,
}

impl ApiClient {
    /// Create a new builder for configuring the client.
    pub fn builder() -> ApiClientBuilder {
        ApiClientBuilder::default()
    }

    /// Base URL of the backend, without a trailing slash.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Region used for region-scoped queries.
    pub fn region(&self) -> &str {
        &self.region
    }

    /// Check that the backend answers on `/health`.
    pub async fn health_check(&self) -> Result<(), ApiError> {
        let response = self.client.get(self.url("/health")).send().await?;
        check_status(&response)?;
        Ok(())
    }

    /// Fetch the most recent `count` telemetry samples for the region.
    pub async fn telemetry(&self, count: usize) -> Result<Vec<TelemetrySample>, ApiError> {
        self.get_json(
            "/api/telemetry",
            &[("region", self.region.clone()), ("count", count.to_string())],
        )
        .await
    }

    /// Fetch the latest active-user sample for the region.
    pub async fn active_users(&self) -> Result<ActiveUsersSample, ApiError> {
        let path = format!("/api/active-users/{}", urlencoded(&self.region));
        self.get_json(&path, &[]).await
    }

    /// Fetch the currently active issues for the region.
    pub async fn issues(&self) -> Result<Vec<Issue>, ApiError> {
        self.get_json("/api/issues", &[("region", self.region.clone())]).await
    }

    /// Fetch up to `limit` resolutions for the region, newest first.
    pub async fn resolutions(&self, limit: usize) -> Result<Vec<Resolution>, ApiError> {
        self.get_json(
            "/api/resolutions",
            &[("region", self.region.clone()), ("limit", limit.to_string())],
        )
        .await
    }

    /// Fetch the region's health snapshot.
    pub async fn region_health(&self) -> Result<HealthSnapshot, ApiError> {
        let path = format!("/api/health/{}", urlencoded(&self.region));
        self.get_json(&path, &[]).await
    }

    /// Fetch the status of every agent in the hierarchy.
    pub async fn agent_statuses(&self) -> Result<Vec<AgentStatus>, ApiError> {
        self.get_json("/api/agents/status", &[]).await
    }

    /// Send a chat message to the principal agent.
    pub async fn chat(&self, message: &str, context: &str) -> Result<AgentReply, ApiError> {
        let request = AgentRequest::Chat {
            message: message.to_string(),
            context: context.to_string(),
        };
        self.post_agent(&request).await
    }

    /// Ask the principal agent to analyze an issue.
    pub async fn analyze(&self, issue: &Issue) -> Result<AgentReply, ApiError> {
        let request = AgentRequest::Analyze { issue: issue.clone() };
        self.post_agent(&request).await
    }

    /// Trigger remediation of an issue.
    ///
    /// Any HTTP response is returned as `Ok`, including error statuses;
    /// interpreting the status is the caller's decision. A body that is
    /// empty or not JSON yields `body: None`.
    pub async fn remediate(&self, issue_id: &str, action: &str) -> Result<RemediationReply, ApiError> {
        let request = RemediateRequest {
            issue_id: issue_id.to_string(),
            action: action.to_string(),
            region: Some(self.region.clone()),
        };

        let response = self.client.post(self.url("/remediate")).json(&request).send().await?;
        let status = response.status().as_u16();
        let bytes = response.bytes().await?;
        let body = serde_json::from_slice::<RemediateBody>(&bytes).ok();

        debug!(issue_id, action, status, parsed = body.is_some(), "remediate response");

        Ok(RemediationReply { status, body })
    }

    async fn post_agent(&self, request: &AgentRequest) -> Result<AgentReply, ApiError> {
        let response = self.client.post(self.url("/agent")).json(request).send().await?;
        check_status(&response)?;

        response.json().await.map_err(|e| ApiError::Parse(e.to_string()))
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, ApiError> {
        let url = self.url(path);
        debug!(%url, "GET");

        let response = self.client.get(&url).query(query).send().await?;
        check_status(&response)?;

        response.json().await.map_err(|e| ApiError::Parse(e.to_string()))
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.endpoint, path)
    }
}

fn check_status(response: &Response) -> Result<(), ApiError> {
    if response.status().is_success() {
        Ok(())
    } else {
        Err(ApiError::Status(response.status().as_u16()))
    }
}

/// Builder for ApiClient.
#[derive(Debug, Default)]
pub struct ApiClientBuilder {
    endpoint: Option<String>,
    region: Option<String>,
    timeout: Option<Duration>,
}

impl ApiClientBuilder {
    /// Set the backend base URL (e.g., "http://localhost:8000").
    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    /// Set the region to query (default: "us-east-1").
    pub fn region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    /// Set the request timeout (default: 10 seconds).
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Build the client.
    pub fn build(self) -> ApiClient {
        let timeout = self.timeout.unwrap_or(Duration::from_secs(10));

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| Client::new());

        let endpoint = self.endpoint.unwrap_or_else(|| DEFAULT_ENDPOINT.to_string());

        ApiClient {
            client,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            region: self.region.unwrap_or_else(|| DEFAULT_REGION.to_string()),
        }
    }
}

// URL encode a string for use in paths
fn urlencoded(s: &str) -> String {
    s.replace('%', "%25").replace('/', "%2F").replace(' ', "%20")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults() {
        let client = ApiClient::builder().build();
        assert_eq!(client.endpoint(), "http://localhost:8000");
        assert_eq!(client.region(), "us-east-1");
    }

    #[test]
    fn test_builder_custom() {
        let client = ApiClient::builder()
            .endpoint("https://trace.example.com/")
            .region("eu-central-1")
            .timeout(Duration::from_secs(2))
            .build();

        assert_eq!(client.endpoint(), "https://trace.example.com");
        assert_eq!(client.region(), "eu-central-1");
        assert_eq!(client.url("/api/issues"), "https://trace.example.com/api/issues");
    }

    #[test]
    fn test_urlencoded() {
        assert_eq!(urlencoded("us-east-1"), "us-east-1");
        assert_eq!(urlencoded("lab/west"), "lab%2Fwest");
        assert_eq!(urlencoded("a b"), "a%20b");
        assert_eq!(urlencoded("50%"), "50%25");
    }
}
