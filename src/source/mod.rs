//! Event source abstraction for the dashboard stream.
//!
//! Every producer of [`StreamEvent`]s (the live WebSocket, the synthetic
//! generator, or an in-memory channel) is surfaced to the UI thread through
//! the [`EventSource`] trait. The default source is a [`SupervisedSource`],
//! which keeps exactly one of live or synthetic running at any time.
//!
//! ```text
//!   LiveConnection ──┐
//!                    ├──▶ mpsc ──▶ SupervisedSource::poll ──▶ StreamClient
//!   SyntheticSource ─┘
//! ```

mod channel;
mod error;
mod live;
mod supervisor;
mod synthetic;

pub use channel::ChannelSource;
pub use error::StreamError;
pub use live::{parse_frame, subscribe_frame, LiveConnection};
pub use supervisor::{StreamSettings, SupervisedSource};
pub use synthetic::{SyntheticGenerator, SyntheticSource};

use std::fmt::Debug;

use trace_types::StreamEvent;

/// Trait for receiving stream events from various producers.
///
/// # Example
///
/// ```
/// use trace_dashboard::source::{ChannelSource, EventSource};
///
/// let (_tx, mut source) = ChannelSource::create("example");
/// while let Some(event) = source.poll() {
///     println!("{:?}", event.channel());
/// }
/// ```
pub trait EventSource: Send + Debug {
    /// Poll for the next event.
    ///
    /// Returns `Some(event)` if one is queued, `None` otherwise.
    /// This method must not block.
    fn poll(&mut self) -> Option<StreamEvent>;

    /// Returns a human-readable description of the source.
    ///
    /// Used for display in the TUI header.
    fn description(&self) -> &str;

    /// The most recent error reported by the source, if any.
    fn error(&self) -> Option<String>;
}
