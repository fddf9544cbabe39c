//! Dashboard state built from the event stream.
//!
//! ## Submodules
//!
//! - [`duration`]: Parsing of interval settings ("1s", "800ms") and elapsed-time formatting
//! - [`history`]: Rolling buffers for telemetry and active users, sparkline series
//! - [`issues`]: Issue lifecycle tracker (active list plus resolved-id set)
//! - [`dashboard`]: [`DashboardState`] and the [`SharedState`] handle
//!
//! ## Data Flow
//!
//! ```text
//! StreamEvent (live or synthetic)
//!        │
//!        ▼
//! SharedState::apply()
//!        │
//!        ├──▶ History (telemetry 100, active users 60)
//!        ├──▶ IssueTracker::insert() (rejects resolved ids)
//!        ├──▶ resolutions (append, dedupe by id)
//!        └──▶ health (latest only)
//! ```

pub mod dashboard;
pub mod duration;
pub mod history;
pub mod issues;

pub use dashboard::{DashboardState, SharedState};
pub use history::{History, RollingBuffer, ACTIVE_USERS_CAPACITY, TELEMETRY_CAPACITY};
pub use issues::{IssueTracker, SeverityCounts};
