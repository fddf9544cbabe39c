//! Live WebSocket connection to the dashboard backend.
//!
//! After connecting, the client sends a `subscribe` frame for its region and
//! then reads `{"event": ..., "data": ...}` text frames. Frames on known data
//! channels are decoded into [`StreamEvent`]s; anything else (the server's
//! `connected` greeting, for example) is skipped.

use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use serde::Deserialize;
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tracing::{debug, info, warn};

use trace_types::{Channel, StreamEvent};

use super::StreamError;

/// An established connection to the live backend.
pub struct LiveConnection {
    socket: WebSocketStream<MaybeTlsStream<TcpStream>>,
    url: String,
}

impl std::fmt::Debug for LiveConnection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LiveConnection").field("url", &self.url).finish()
    }
}

impl LiveConnection {
    /// Connect to `url` and subscribe to `region`.
    ///
    /// Fails if the handshake does not complete within `timeout`.
    pub async fn connect(url: &str, region: &str, timeout: Duration) -> Result<Self, StreamError> {
        let (mut socket, _response) = match tokio::time::timeout(timeout, connect_async(url)).await {
            Ok(Ok(pair)) => pair,
            Ok(Err(e)) => {
                return Err(StreamError::Connect {
                    url: url.to_string(),
                    reason: e.to_string(),
                })
            }
            Err(_) => {
                return Err(StreamError::Connect {
                    url: url.to_string(),
                    reason: format!("no handshake within {:?}", timeout),
                })
            }
        };

        socket.send(Message::Text(subscribe_frame(region))).await?;
        info!(url, region, "live stream connected");

        Ok(Self {
            socket,
            url: url.to_string(),
        })
    }

    /// Forward decoded events into `tx` until the socket closes.
    ///
    /// Returns `Ok` with the number of forwarded events if the receiver went
    /// away, otherwise the error that ended the connection.
    pub async fn forward(mut self, tx: &mpsc::Sender<StreamEvent>) -> Result<u64, StreamError> {
        let mut forwarded = 0u64;

        while let Some(message) = self.socket.next().await {
            match message? {
                Message::Text(text) => match parse_frame(&text) {
                    Ok(Some(event)) => {
                        if tx.send(event).await.is_err() {
                            // Receiver dropped
                            return Ok(forwarded);
                        }
                        forwarded += 1;
                    }
                    Ok(None) => {}
                    Err(e) => warn!(error = %e, "dropping undecodable frame"),
                },
                Message::Close(frame) => {
                    debug!(?frame, "server sent close");
                    return Err(StreamError::Closed);
                }
                _ => {}
            }
        }

        Err(StreamError::Closed)
    }
}

/// The frame sent right after connecting.
pub fn subscribe_frame(region: &str) -> String {
    serde_json::json!({"event": "subscribe", "data": {"region": region}}).to_string()
}

#[derive(Deserialize)]
struct FrameHeader {
    event: String,
}

/// Decode one text frame.
///
/// Returns `Ok(None)` for frames on channels the dashboard does not consume.
/// `connection` frames are also skipped: connection mode is owned by the
/// client, not the server.
pub fn parse_frame(text: &str) -> Result<Option<StreamEvent>, StreamError> {
    let header: FrameHeader =
        serde_json::from_str(text).map_err(|e| StreamError::Decode(e.to_string()))?;

    match header.event.parse::<Channel>() {
        Ok(Channel::Connection) | Err(_) => {
            debug!(event = %header.event, "ignoring frame");
            Ok(None)
        }
        Ok(_) => serde_json::from_str(text)
            .map(Some)
            .map_err(|e| StreamError::Decode(e.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subscribe_frame() {
        let frame: serde_json::Value = serde_json::from_str(&subscribe_frame("us-east-1")).unwrap();
        assert_eq!(frame["event"], "subscribe");
        assert_eq!(frame["data"]["region"], "us-east-1");
    }

    #[test]
    fn test_parse_data_frames() {
        let text = r#"{"event":"telemetry","data":{"timestamp":"t","energy":70.1,"congestion":41.0,
            "anomaly_score":9.5,"traffic_load":44.2,"trx_utilization":80.0,"power_draw":105.2}}"#;
        let event = parse_frame(text).unwrap().unwrap();
        assert_eq!(event.channel(), Channel::Telemetry);

        let text = r#"{"event":"issue","data":{"id":"issue-0badf00d","title":"Energy Spike","severity":"critical"}}"#;
        match parse_frame(text).unwrap() {
            Some(StreamEvent::Issue(issue)) => assert_eq!(issue.id, "issue-0badf00d"),
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_skips_foreign_frames() {
        assert!(parse_frame(r#"{"event":"connected","data":{"status":"connected"}}"#).unwrap().is_none());
        assert!(parse_frame(r#"{"event":"connection","data":"live"}"#).unwrap().is_none());
    }

    #[test]
    fn test_bad_frames_are_decode_errors() {
        assert!(matches!(parse_frame("not json"), Err(StreamError::Decode(_))));

        // Known channel, wrong payload
        let text = r#"{"event":"health","data":{"score":"high"}}"#;
        assert!(matches!(parse_frame(text), Err(StreamError::Decode(_))));
    }
}
