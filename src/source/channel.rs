//! Channel-based event source.
//!
//! Receives events pushed through a tokio mpsc channel. Used to drive the
//! dashboard from another producer (a replay, an embedding application, or
//! a test) instead of the live/synthetic supervisor.

use tokio::sync::mpsc;

use trace_types::StreamEvent;

use super::EventSource;

/// A source fed through an mpsc channel.
///
/// # Example
///
/// ```
/// use trace_dashboard::source::{ChannelSource, EventSource};
/// use trace_dashboard::trace_types::{HealthSnapshot, HealthStatus, StreamEvent};
///
/// let (tx, mut source) = ChannelSource::create("replay");
/// tx.try_send(StreamEvent::Health(HealthSnapshot::new(95.0, HealthStatus::Healthy))).unwrap();
/// assert!(source.poll().is_some());
/// assert!(source.poll().is_none());
/// ```
#[derive(Debug)]
pub struct ChannelSource {
    receiver: mpsc::Receiver<StreamEvent>,
    description: String,
    closed: bool,
}

impl ChannelSource {
    /// Default channel capacity used by [`ChannelSource::create`].
    pub const CAPACITY: usize = 256;

    pub fn new(receiver: mpsc::Receiver<StreamEvent>, source_description: &str) -> Self {
        Self {
            receiver,
            description: format!("channel: {}", source_description),
            closed: false,
        }
    }

    /// Create a channel pair for sending events to a ChannelSource.
    pub fn create(source_description: &str) -> (mpsc::Sender<StreamEvent>, Self) {
        let (tx, rx) = mpsc::channel(Self::CAPACITY);
        (tx, Self::new(rx, source_description))
    }
}

impl EventSource for ChannelSource {
    fn poll(&mut self) -> Option<StreamEvent> {
        match self.receiver.try_recv() {
            Ok(event) => Some(event),
            Err(mpsc::error::TryRecvError::Empty) => None,
            Err(mpsc::error::TryRecvError::Disconnected) => {
                self.closed = true;
                None
            }
        }
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn error(&self) -> Option<String> {
        self.closed.then(|| "Channel closed".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use trace_types::{Issue, Severity};

    #[test]
    fn test_channel_source_poll() {
        let (tx, mut source) = ChannelSource::create("test");
        assert!(source.poll().is_none());
        assert_eq!(source.description(), "channel: test");

        tx.try_send(StreamEvent::Issue(Issue::new("issue-1", "Energy Spike", Severity::High)))
            .unwrap();
        assert!(matches!(source.poll(), Some(StreamEvent::Issue(_))));
        assert!(source.error().is_none());

        drop(tx);
        assert!(source.poll().is_none());
        assert_eq!(source.error().as_deref(), Some("Channel closed"));
    }
}
