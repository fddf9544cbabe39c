//! End-to-end stream tests against an in-process WebSocket backend.

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpListener;
use tokio::sync::{mpsc, oneshot};
use tokio_tungstenite::tungstenite::Message;

use trace_dashboard::trace_types::{Channel, ConnectionMode, Resolution, StreamEvent};
use trace_dashboard::ui::Theme;
use trace_dashboard::{App, SharedState, StreamClient, StreamSettings};

/// A backend that accepts one connection, reports the subscribe frame and
/// then sends every frame pushed into the returned sender. Dropping the
/// sender closes the socket.
async fn backend(listener: TcpListener) -> (mpsc::UnboundedSender<String>, oneshot::Receiver<String>) {
    let (frames_tx, mut frames_rx) = mpsc::unbounded_channel::<String>();
    let (subscribed_tx, subscribed_rx) = oneshot::channel();

    tokio::spawn(async move {
        let (tcp, _) = listener.accept().await.unwrap();
        let mut ws = tokio_tungstenite::accept_async(tcp).await.unwrap();

        if let Some(Ok(Message::Text(text))) = ws.next().await {
            let _ = subscribed_tx.send(text.to_string());
        }
        while let Some(frame) = frames_rx.recv().await {
            if ws.send(Message::Text(frame)).await.is_err() {
                return;
            }
        }
        let _ = ws.close(None).await;
    });

    (frames_tx, subscribed_rx)
}

fn settings(url: String) -> StreamSettings {
    StreamSettings {
        ws_url: url,
        tick: Duration::from_millis(20),
        reconnect_interval: Duration::from_secs(60),
        connect_timeout: Duration::from_secs(1),
        ..Default::default()
    }
}

/// Pump `app` until `done` holds or two seconds pass.
async fn pump_until(app: &mut App, mut done: impl FnMut(&App) -> bool) {
    tokio::time::timeout(Duration::from_secs(2), async {
        loop {
            app.tick();
            if done(&*app) {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("condition not reached within 2s");
}

fn issue_frame(id: &str) -> String {
    format!(r#"{{"event":"issue","data":{{"id":"{}","title":"Energy Spike","severity":"critical"}}}}"#, id)
}

#[tokio::test]
async fn test_live_stream_then_fallback_on_close() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let url = format!("ws://{}/ws", listener.local_addr().unwrap());
    let (frames, subscribed) = backend(listener).await;

    let mut client = StreamClient::new(settings(url.clone()));
    client.start();
    let mut app = App::new(client, SharedState::default(), Theme::dark());

    let subscribe: serde_json::Value = serde_json::from_str(&subscribed.await.unwrap()).unwrap();
    assert_eq!(subscribe["event"], "subscribe");
    assert_eq!(subscribe["data"]["region"], "us-east-1");

    frames
        .send(r#"{"event":"health","data":{"score":93.5,"status":"healthy"}}"#.to_string())
        .unwrap();
    pump_until(&mut app, |app| app.state.lock().health.is_some()).await;
    assert_eq!(app.mode(), ConnectionMode::Live);
    assert_eq!(app.source_description(), format!("live: {}", url));

    // No synthetic data while live
    tokio::time::sleep(Duration::from_millis(100)).await;
    app.tick();
    assert!(app.state.lock().history.telemetry.is_empty());

    drop(frames);
    pump_until(&mut app, |app| app.mode() == ConnectionMode::Synthetic).await;
    assert!(app.stream_error().is_some());
    pump_until(&mut app, |app| !app.state.lock().history.telemetry.is_empty()).await;
}

#[tokio::test]
async fn test_resolved_issue_stays_out_when_resent() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let url = format!("ws://{}/ws", listener.local_addr().unwrap());
    let (frames, _subscribed) = backend(listener).await;

    let mut client = StreamClient::new(settings(url));
    client.start();
    let mut app = App::new(client, SharedState::default(), Theme::dark());

    frames.send(issue_frame("issue-mock-1")).unwrap();
    pump_until(&mut app, |app| app.state.lock().issues.is_active("issue-mock-1")).await;

    let resolution = Resolution::new("resolution-1", "2024-05-01T12:00:00Z", "Automated Remediation Completed")
        .for_issue("issue-mock-1");
    app.state.lock().complete_remediation("issue-mock-1", resolution);

    // Same id again, followed by a marker issue to know the first was processed
    frames.send(issue_frame("issue-mock-1")).unwrap();
    frames.send(issue_frame("issue-marker")).unwrap();
    pump_until(&mut app, |app| app.state.lock().issues.is_active("issue-marker")).await;

    let state = app.state.lock();
    assert!(!state.issues.is_active("issue-mock-1"));
    assert!(state.issues.is_resolved("issue-mock-1"));
    assert_eq!(state.issues.active_count(), 1);
}

#[tokio::test]
async fn test_synthetic_stops_when_backend_appears() {
    // Reserve a port, then leave it closed so the first attempt fails
    let reserved = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = reserved.local_addr().unwrap();
    drop(reserved);

    let telemetry = Rc::new(Cell::new(0usize));
    let mut client = StreamClient::new(StreamSettings {
        reconnect_interval: Duration::from_millis(200),
        ..settings(format!("ws://{}/ws", addr))
    });
    let counter = telemetry.clone();
    client.subscribe(Channel::Telemetry, move |_| counter.set(counter.get() + 1));
    client.start();

    tokio::time::timeout(Duration::from_secs(2), async {
        while telemetry.get() == 0 {
            client.pump();
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("no synthetic telemetry");
    assert_eq!(client.mode(), ConnectionMode::Synthetic);

    let listener = TcpListener::bind(addr).await.unwrap();
    let (_frames, subscribed) = backend(listener).await;
    tokio::time::timeout(Duration::from_secs(2), subscribed)
        .await
        .expect("no reconnect")
        .unwrap();

    tokio::time::timeout(Duration::from_secs(2), async {
        while client.mode() != ConnectionMode::Live {
            client.pump();
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("never went live");

    client.pump();
    let seen = telemetry.get();
    tokio::time::sleep(Duration::from_millis(200)).await;
    client.pump();
    assert_eq!(telemetry.get(), seen);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_no_synthetic_events_after_live_is_announced() {
    let reserved = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = reserved.local_addr().unwrap();
    drop(reserved);

    let log = Rc::new(RefCell::new(Vec::<&'static str>::new()));
    let mut client = StreamClient::new(StreamSettings {
        tick: Duration::from_millis(1),
        reconnect_interval: Duration::from_millis(100),
        ..settings(format!("ws://{}/ws", addr))
    });
    let telemetry_log = log.clone();
    client.subscribe(Channel::Telemetry, move |_| telemetry_log.borrow_mut().push("telemetry"));
    let connection_log = log.clone();
    client.subscribe(Channel::Connection, move |event| {
        if matches!(event, StreamEvent::Connection(ConnectionMode::Live)) {
            connection_log.borrow_mut().push("live");
        }
    });
    client.start();

    tokio::time::timeout(Duration::from_secs(2), async {
        while !log.borrow().contains(&"telemetry") {
            client.pump();
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("no synthetic telemetry");

    let listener = TcpListener::bind(addr).await.unwrap();
    let (_frames, _subscribed) = backend(listener).await;

    tokio::time::timeout(Duration::from_secs(2), async {
        while !log.borrow().contains(&"live") {
            client.pump();
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("never went live");

    tokio::time::sleep(Duration::from_millis(100)).await;
    client.pump();

    let log = log.borrow();
    let live_at = log.iter().position(|e| *e == "live").unwrap();
    assert!(log[live_at + 1..].is_empty(), "events after live: {:?}", &log[live_at + 1..]);
}
