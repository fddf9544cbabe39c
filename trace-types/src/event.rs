//! Stream events and the typed channels they travel on.

use std::fmt;
use std::str::FromStr;

use crate::{ActiveUsersSample, HealthSnapshot, Issue, Resolution, TelemetrySample};

/// A named event channel.
///
/// The wire name of each channel is what the backend uses in the `event`
/// field of a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Channel {
    Telemetry,
    ActiveUsers,
    Issue,
    Resolution,
    Health,
    /// Connection-mode announcements from the stream client itself.
    Connection,
}

impl Channel {
    pub const ALL: [Channel; 6] = [
        Channel::Telemetry,
        Channel::ActiveUsers,
        Channel::Issue,
        Channel::Resolution,
        Channel::Health,
        Channel::Connection,
    ];

    /// Wire name of the channel.
    pub fn name(&self) -> &'static str {
        match self {
            Channel::Telemetry => "telemetry",
            Channel::ActiveUsers => "activeUsers",
            Channel::Issue => "issue",
            Channel::Resolution => "resolution",
            Channel::Health => "health",
            Channel::Connection => "connection",
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error returned when parsing an unknown channel name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownChannel(pub String);

impl fmt::Display for UnknownChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown channel: {}", self.0)
    }
}

impl std::error::Error for UnknownChannel {}

impl FromStr for Channel {
    type Err = UnknownChannel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Channel::ALL
            .into_iter()
            .find(|c| c.name() == s)
            .ok_or_else(|| UnknownChannel(s.to_string()))
    }
}

/// Where the stream is currently getting its data from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum ConnectionMode {
    /// No data source has been established yet.
    #[default]
    Connecting,
    /// Connected to the live WebSocket backend.
    Live,
    /// Fed by the local synthetic generator.
    Synthetic,
}

impl ConnectionMode {
    pub fn label(&self) -> &'static str {
        match self {
            ConnectionMode::Connecting => "connecting",
            ConnectionMode::Live => "live",
            ConnectionMode::Synthetic => "synthetic",
        }
    }

    /// Whether the UI should treat the stream as connected.
    ///
    /// Synthetic mode counts as connected so the dashboard stays usable.
    pub fn is_connected(&self) -> bool {
        !matches!(self, ConnectionMode::Connecting)
    }
}

impl fmt::Display for ConnectionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One event on the stream.
///
/// Serialized as `{"event": "<channel>", "data": <payload>}`.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "event", content = "data", rename_all = "camelCase"))]
pub enum StreamEvent {
    Telemetry(TelemetrySample),
    ActiveUsers(ActiveUsersSample),
    Issue(Issue),
    Resolution(Resolution),
    Health(HealthSnapshot),
    Connection(ConnectionMode),
}

impl StreamEvent {
    /// The channel this event is published on.
    pub fn channel(&self) -> Channel {
        match self {
            StreamEvent::Telemetry(_) => Channel::Telemetry,
            StreamEvent::ActiveUsers(_) => Channel::ActiveUsers,
            StreamEvent::Issue(_) => Channel::Issue,
            StreamEvent::Resolution(_) => Channel::Resolution,
            StreamEvent::Health(_) => Channel::Health,
            StreamEvent::Connection(_) => Channel::Connection,
        }
    }
}
