//! # trace-api
//!
//! Client for the TRACE dashboard REST backend.
//!
//! The backend exposes read endpoints for telemetry history, active users,
//! issues, resolutions, regional health and agent status, plus two action
//! endpoints: `/agent` (chat and issue analysis) and `/remediate`.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use trace_api::ApiClient;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = ApiClient::builder()
//!         .endpoint("http://localhost:8000")
//!         .region("us-east-1")
//!         .build();
//!
//!     let series = client.telemetry(100).await?;
//!     println!("Backfilled {} telemetry samples", series.len());
//!
//!     let issues = client.issues().await?;
//!     for issue in &issues {
//!         println!("{} [{}] {}", issue.id, issue.severity, issue.title);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! Remediation is special: [`ApiClient::remediate`] returns the HTTP status
//! alongside whatever body came back, and leaves the success decision to the
//! caller. Only transport failures are errors.

pub mod client;
pub mod error;
pub mod models;

pub use client::{ApiClient, ApiClientBuilder};
pub use error::ApiError;
pub use models::{AgentReply, AgentRequest, RemediateBody, RemediateRequest, RemediationReply};

// Re-export types for convenience
pub use trace_types::{ActiveUsersSample, AgentStatus, HealthSnapshot, Issue, Resolution, TelemetrySample};
