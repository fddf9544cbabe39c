//! Live/synthetic supervisor.
//!
//! A background task that prefers the live WebSocket and falls back to the
//! synthetic generator whenever the socket is unavailable. Both feed the same
//! bounded channel, and each switch is announced with a
//! [`StreamEvent::Connection`] event ahead of the data it governs.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use trace_types::{ConnectionMode, StreamEvent};

use super::live::LiveConnection;
use super::synthetic::{SyntheticGenerator, SyntheticSource};
use super::EventSource;

/// Settings for the supervised stream.
#[derive(Debug, Clone)]
pub struct StreamSettings {
    /// WebSocket endpoint of the live backend.
    pub ws_url: String,
    pub region: String,
    /// Interval between synthetic ticks.
    pub tick: Duration,
    /// Wait between live connection attempts while synthetic.
    pub reconnect_interval: Duration,
    pub connect_timeout: Duration,
    /// Never try the live socket.
    pub offline: bool,
    /// Capacity of the event channel between the tasks and the UI.
    pub buffer: usize,
}

impl Default for StreamSettings {
    fn default() -> Self {
        Self {
            ws_url: "ws://localhost:8000/ws".to_string(),
            region: "us-east-1".to_string(),
            tick: Duration::from_secs(1),
            reconnect_interval: Duration::from_secs(5),
            connect_timeout: Duration::from_secs(3),
            offline: false,
            buffer: 256,
        }
    }
}

/// Event source backed by the supervisor task.
///
/// Dropping it stops the supervisor, the socket and the generator.
#[derive(Debug)]
pub struct SupervisedSource {
    receiver: mpsc::Receiver<StreamEvent>,
    description: String,
    ws_url: String,
    region: String,
    last_error: Arc<Mutex<Option<String>>>,
    task: JoinHandle<()>,
}

impl SupervisedSource {
    /// Spawn the supervisor on the current tokio runtime.
    pub fn spawn(settings: StreamSettings) -> Self {
        let (tx, rx) = mpsc::channel(settings.buffer.max(1));
        let last_error = Arc::new(Mutex::new(None));
        let ws_url = settings.ws_url.clone();
        let region = settings.region.clone();

        let task = tokio::spawn(supervise(settings, tx, last_error.clone()));

        Self {
            receiver: rx,
            description: format!("connecting: {}", ws_url),
            ws_url,
            region,
            last_error,
            task,
        }
    }

    fn describe(&mut self, mode: ConnectionMode) {
        self.description = match mode {
            ConnectionMode::Connecting => format!("connecting: {}", self.ws_url),
            ConnectionMode::Live => format!("live: {}", self.ws_url),
            ConnectionMode::Synthetic => format!("synthetic: {}", self.region),
        };
    }
}

impl EventSource for SupervisedSource {
    fn poll(&mut self) -> Option<StreamEvent> {
        let event = self.receiver.try_recv().ok()?;
        if let StreamEvent::Connection(mode) = event {
            self.describe(mode);
        }
        Some(event)
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn error(&self) -> Option<String> {
        self.last_error.lock().clone()
    }
}

impl Drop for SupervisedSource {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn supervise(
    settings: StreamSettings,
    tx: mpsc::Sender<StreamEvent>,
    last_error: Arc<Mutex<Option<String>>>,
) {
    let mut synthetic: Option<SyntheticSource> = None;
    let mut failures = 0u32;

    loop {
        if !settings.offline {
            match LiveConnection::connect(&settings.ws_url, &settings.region, settings.connect_timeout).await {
                Ok(conn) => {
                    failures = 0;
                    if let Some(source) = synthetic.take() {
                        // Drain the generator before Live is announced
                        source.stop().await;
                        info!("live stream available, synthetic generator stopped");
                    }
                    *last_error.lock() = None;

                    if tx.send(StreamEvent::Connection(ConnectionMode::Live)).await.is_err() {
                        return;
                    }

                    match conn.forward(&tx).await {
                        Ok(forwarded) => {
                            debug!(forwarded, "event receiver dropped, supervisor exiting");
                            return;
                        }
                        Err(e) => {
                            warn!(error = %e, "live stream lost");
                            *last_error.lock() = Some(e.to_string());
                        }
                    }
                }
                Err(e) => {
                    failures += 1;
                    if failures == 1 {
                        warn!(error = %e, "live stream unavailable, using synthetic data");
                    } else {
                        debug!(error = %e, failures, "live stream still unavailable");
                    }
                    *last_error.lock() = Some(e.to_string());
                }
            }
        }

        if synthetic.is_none() {
            if tx.send(StreamEvent::Connection(ConnectionMode::Synthetic)).await.is_err() {
                return;
            }
            let generator = SyntheticGenerator::new(settings.region.clone());
            synthetic = Some(SyntheticSource::spawn(generator, settings.tick, tx.clone()));
        }

        if settings.offline {
            // The generator runs until this task is aborted
            std::future::pending::<()>().await;
        }

        tokio::time::sleep(settings.reconnect_interval).await;
        if tx.is_closed() {
            return;
        }
    }
}
