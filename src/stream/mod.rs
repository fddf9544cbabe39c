//! The dashboard's single logical event stream.
//!
//! [`StreamClient`] is constructed once by the application root. After
//! [`StreamClient::start`], events from whichever source is active are
//! queued by background tasks and delivered to subscribers when the UI loop
//! calls [`StreamClient::pump`]. Callbacks therefore always run on the
//! caller's thread.
//!
//! ```no_run
//! use trace_dashboard::stream::{StreamClient, StreamSettings};
//! use trace_dashboard::trace_types::Channel;
//!
//! # tokio_test::block_on(async {
//! let mut client = StreamClient::new(StreamSettings::default());
//! client.subscribe(Channel::Telemetry, |event| println!("{:?}", event));
//! client.start();
//! loop {
//!     client.pump();
//!     tokio::time::sleep(std::time::Duration::from_millis(100)).await;
//! }
//! # });
//! ```

mod bus;

pub use bus::EventBus;
pub use crate::source::StreamSettings;

use std::time::Instant;

use tracing::info;

use trace_types::{Channel, ConnectionMode, StreamEvent};

use crate::source::{EventSource, SupervisedSource};

/// Upper bound on events delivered by one [`StreamClient::pump`] call, so a
/// burst cannot stall a frame.
pub const MAX_EVENTS_PER_PUMP: usize = 512;

/// Owner of the event source and the subscriber registry.
#[derive(Debug)]
pub struct StreamClient {
    settings: StreamSettings,
    bus: EventBus,
    source: Option<Box<dyn EventSource>>,
    mode: ConnectionMode,
    last_event: Option<Instant>,
    received: u64,
}

impl StreamClient {
    pub fn new(settings: StreamSettings) -> Self {
        Self {
            settings,
            bus: EventBus::new(),
            source: None,
            mode: ConnectionMode::Connecting,
            last_event: None,
            received: 0,
        }
    }

    /// A client reading from an already-running source.
    ///
    /// [`StreamClient::start`] is a no-op for such a client.
    pub fn with_source(source: Box<dyn EventSource>) -> Self {
        let mut client = Self::new(StreamSettings::default());
        client.source = Some(source);
        client
    }

    /// Spawn the live/synthetic supervisor.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(&mut self) {
        if self.source.is_some() {
            return;
        }
        info!(
            ws_url = %self.settings.ws_url,
            region = %self.settings.region,
            offline = self.settings.offline,
            "starting stream"
        );
        self.source = Some(Box::new(SupervisedSource::spawn(self.settings.clone())));
    }

    /// Register `callback` for every event on `channel`.
    pub fn subscribe<F>(&mut self, channel: Channel, callback: F)
    where
        F: FnMut(&StreamEvent) + 'static,
    {
        self.bus.subscribe(channel, callback);
    }

    /// Deliver queued events to subscribers without blocking.
    ///
    /// Returns the number of events delivered.
    pub fn pump(&mut self) -> usize {
        let Some(source) = self.source.as_mut() else {
            return 0;
        };

        let mut delivered = 0;
        while delivered < MAX_EVENTS_PER_PUMP {
            let Some(event) = source.poll() else {
                break;
            };
            match &event {
                StreamEvent::Connection(mode) => {
                    if *mode != self.mode {
                        info!(from = %self.mode, to = %mode, "stream mode changed");
                    }
                    self.mode = *mode;
                }
                _ => {
                    self.last_event = Some(Instant::now());
                    self.received += 1;
                }
            }
            self.bus.emit(&event);
            delivered += 1;
        }
        delivered
    }

    pub fn mode(&self) -> ConnectionMode {
        self.mode
    }

    pub fn is_running(&self) -> bool {
        self.source.is_some()
    }

    /// Description of the active source for the header.
    pub fn description(&self) -> &str {
        self.source.as_ref().map_or("not started", |s| s.description())
    }

    pub fn error(&self) -> Option<String> {
        self.source.as_ref().and_then(|s| s.error())
    }

    /// When the last data event (anything but a connection change) arrived.
    pub fn last_event(&self) -> Option<Instant> {
        self.last_event
    }

    pub fn events_received(&self) -> u64 {
        self.received
    }

    pub fn settings(&self) -> &StreamSettings {
        &self.settings
    }

    /// Stop every background task owned by the client.
    pub fn shutdown(&mut self) {
        if self.source.take().is_some() {
            info!("stream shut down");
        }
        self.mode = ConnectionMode::Connecting;
    }
}

impl Drop for StreamClient {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;
    use std::time::Duration;

    use trace_types::{Issue, Severity, TelemetrySample};

    use crate::source::ChannelSource;

    #[test]
    fn test_pump_fans_out_by_channel() {
        let (tx, source) = ChannelSource::create("test");
        let mut client = StreamClient::with_source(Box::new(source));

        let telemetry = Rc::new(RefCell::new(0));
        let issues = Rc::new(RefCell::new(Vec::new()));
        {
            let telemetry = telemetry.clone();
            client.subscribe(Channel::Telemetry, move |_| *telemetry.borrow_mut() += 1);
        }
        {
            let issues = issues.clone();
            client.subscribe(Channel::Issue, move |event| {
                if let StreamEvent::Issue(issue) = event {
                    issues.borrow_mut().push(issue.id.clone());
                }
            });
        }

        tx.try_send(StreamEvent::Telemetry(TelemetrySample::default())).unwrap();
        tx.try_send(StreamEvent::Issue(Issue::new("issue-1", "TRX Overload", Severity::Medium)))
            .unwrap();
        tx.try_send(StreamEvent::Telemetry(TelemetrySample::default())).unwrap();

        assert_eq!(client.pump(), 3);
        assert_eq!(*telemetry.borrow(), 2);
        assert_eq!(*issues.borrow(), vec!["issue-1".to_string()]);
        assert_eq!(client.events_received(), 3);
        assert!(client.last_event().is_some());

        // Nothing queued
        assert_eq!(client.pump(), 0);
    }

    #[test]
    fn test_connection_events_set_mode() {
        let (tx, source) = ChannelSource::create("test");
        let mut client = StreamClient::with_source(Box::new(source));
        assert_eq!(client.mode(), ConnectionMode::Connecting);

        tx.try_send(StreamEvent::Connection(ConnectionMode::Synthetic)).unwrap();
        client.pump();
        assert_eq!(client.mode(), ConnectionMode::Synthetic);
        assert!(client.last_event().is_none());

        tx.try_send(StreamEvent::Connection(ConnectionMode::Live)).unwrap();
        client.pump();
        assert_eq!(client.mode(), ConnectionMode::Live);
    }

    #[test]
    fn test_pump_before_start() {
        let mut client = StreamClient::new(StreamSettings::default());
        assert_eq!(client.pump(), 0);
        assert_eq!(client.description(), "not started");
        assert!(!client.is_running());
    }

    #[tokio::test]
    async fn test_start_offline_delivers_synthetic() {
        let settings = StreamSettings {
            offline: true,
            tick: Duration::from_millis(10),
            ..Default::default()
        };
        let mut client = StreamClient::new(settings);
        let telemetry = Rc::new(RefCell::new(0));
        {
            let telemetry = telemetry.clone();
            client.subscribe(Channel::Telemetry, move |_| *telemetry.borrow_mut() += 1);
        }
        client.start();

        for _ in 0..100 {
            client.pump();
            if *telemetry.borrow() > 0 {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }

        assert_eq!(client.mode(), ConnectionMode::Synthetic);
        assert!(*telemetry.borrow() > 0);

        client.shutdown();
        assert!(!client.is_running());
        assert_eq!(client.mode(), ConnectionMode::Connecting);
    }
}
