//! # trace-dashboard
//!
//! A terminal dashboard and library for the TRACE telecom network
//! management stream.
//!
//! The dashboard consumes telemetry, active-user counts, network issues,
//! resolutions and regional health from a WebSocket backend. When the
//! backend is unreachable it switches to a synthetic generator and keeps
//! trying the socket in the background. Issues can be auto-remediated
//! through a staged pipeline, and an agent assistant answers questions
//! about them, with canned replies when the backend is down.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                         Application                          │
//! │  ┌─────────┐    ┌──────────┐    ┌─────────┐    ┌──────────┐  │
//! │  │   app   │───▶│   data   │───▶│   ui    │───▶│ Terminal │  │
//! │  │ (state) │    │ (buffers,│    │(render) │    │          │  │
//! │  └────┬────┘    │  issues) │    └─────────┘    └──────────┘  │
//! │       │         └──────────┘                                 │
//! │       ▼              ▲                                       │
//! │  ┌─────────┐         │          ┌─────────────┐              │
//! │  │ stream  │─────────┘          │ remediation │──▶ trace-api │
//! │  │ (bus)   │                    │ assistant   │              │
//! │  └────┬────┘                    │ backfill    │              │
//! │       ▼                         └─────────────┘              │
//! │  ┌─────────┐                                                 │
//! │  │ source  │◀── live WebSocket | synthetic | ChannelSource   │
//! │  └─────────┘                                                 │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! - **[`source`]**: Event sources ([`EventSource`] trait): the supervised
//!   live/synthetic stream and a channel source for embedding and tests
//! - **[`stream`]**: [`StreamClient`], per-channel subscriptions and the
//!   connection mode
//! - **[`data`]**: Rolling telemetry buffers, the issue tracker and the
//!   shared [`DashboardState`]
//! - **[`remediation`]**: The Analyze, Pipeline, Execute, Verify sequence
//!   against the backend
//! - **[`assistant`]**: Agent chat and issue analysis with offline fallbacks
//! - **[`backfill`]**: Startup history load over REST
//! - **[`config`]**: Layered [`Settings`]
//! - **[`app`]** / **[`events`]** / **[`ui`]**: The terminal front end
//!
//! ## Usage
//!
//! ### As a CLI tool
//!
//! ```bash
//! # Connect to a local backend, falling back to synthetic data
//! trace-dashboard
//!
//! # Synthetic data only, for a different region
//! trace-dashboard --offline --region eu-west-1
//!
//! # Collect for ten seconds and write a JSON summary
//! trace-dashboard --export summary.json --export-after 10
//! ```
//!
//! ### As a library with a channel source
//!
//! ```
//! use trace_dashboard::{App, ChannelSource, SharedState, StreamClient};
//! use trace_dashboard::trace_types::{Issue, Severity, StreamEvent};
//! use trace_dashboard::ui::Theme;
//!
//! let (tx, source) = ChannelSource::create("replay");
//! let client = StreamClient::with_source(Box::new(source));
//! let mut app = App::new(client, SharedState::default(), Theme::dark());
//!
//! tx.try_send(StreamEvent::Issue(Issue::new("issue-1", "Energy Spike", Severity::High))).unwrap();
//! app.tick();
//! assert_eq!(app.state.lock().issues.active_count(), 1);
//! ```

pub mod app;
pub mod assistant;
pub mod backfill;
pub mod config;
pub mod data;
pub mod events;
pub mod remediation;
pub mod source;
pub mod stream;
pub mod ui;

pub use trace_api;
pub use trace_types;

// Re-export main types for convenience
pub use app::{App, RemediationProgress, View};
pub use assistant::{Assistant, ChatMessage, Role};
pub use config::Settings;
pub use data::{DashboardState, History, IssueTracker, RollingBuffer, SharedState};
pub use remediation::{RemediationEvent, Remediator, Stage};
pub use source::{ChannelSource, EventSource, StreamError, SupervisedSource};
pub use stream::{StreamClient, StreamSettings};
