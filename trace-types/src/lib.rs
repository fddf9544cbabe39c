//! # trace-types
//!
//! Wire types for the TRACE network management stream. Both the live
//! WebSocket backend and the local synthetic generator speak in these types,
//! so consumers never need to know which one is feeding them.
//!
//! ## Features
//!
//! - `serde`: JSON (de)serialization matching the backend's field names
//!
//! ## Example
//!
//! ```rust
//! use trace_types::{Channel, Issue, Severity, StreamEvent};
//!
//! let issue = Issue::new("issue-mock-1", "Energy Spike", Severity::High)
//!     .affected_towers(["Tower-3"])
//!     .suggested_action("restart_agent");
//!
//! let event = StreamEvent::Issue(issue);
//! assert_eq!(event.channel(), Channel::Issue);
//! assert_eq!(event.channel().name(), "issue");
//! ```
//!
//! ## Wire format
//!
//! Events are framed as `{"event": "<channel>", "data": { ... }}`. Telemetry
//! fields are snake_case (`anomaly_score`); every other payload uses the
//! camelCase names the dashboard backend emits (`affectedTowers`).

mod agent;
mod event;
mod issue;
mod resolution;
mod telemetry;

pub use agent::*;
pub use event::*;
pub use issue::*;
pub use resolution::*;
pub use telemetry::*;

/// Names of the fixed agent pipeline stages, in order.
///
/// Purely presentational: issues carry this list as their `agentTrace`.
pub const AGENT_TRACE: [&str; 5] = ["Monitoring", "Prediction", "Decision xApp", "Action", "Learning"];
