//! Integration tests against fake agent sockets
//!
//! Spins up in-process Unix listeners standing in for the agent's push
//! and command sockets, then drives the real listener/client code.

use std::time::Duration;

use serde_json::{json, Value};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::UnixListener;
use tokio::sync::{mpsc, watch};

use blpanel_agent::{AgentClient, PushListener};
use blpanel_core::{DeviceStatus, Error, PushEvent};

fn socket_path(dir: &tempfile::TempDir, name: &str) -> std::path::PathBuf {
    dir.path().join(name)
}

#[tokio::test]
async fn push_listener_skips_garbage_and_reports_close() {
    let dir = tempfile::tempdir().unwrap();
    let path = socket_path(&dir, "blueland.sock");
    let listener = UnixListener::bind(&path).unwrap();

    let server = tokio::spawn(async move {
        let (mut stream, _) = listener.accept().await.unwrap();
        stream
            .write_all(b"{\"mac\":\"AA:BB:CC:DD:EE:FF\",\"name\":\"Headphones\"}\n")
            .await
            .unwrap();
        stream.write_all(b"not-json\n").await.unwrap();
        stream.write_all(b"\n").await.unwrap();
        stream
            .write_all(b"{\"mac\":\"11:22:33:44:55:66\",\"name\":\"Speaker\"}\n")
            .await
            .unwrap();
        stream.flush().await.unwrap();
        // Dropping the stream closes the socket (zero-byte read downstream)
    });

    let (event_tx, mut event_rx) = mpsc::channel(16);
    let (_shutdown_tx, shutdown_rx) = watch::channel(false);

    let push = PushListener::connect(&path, event_tx, shutdown_rx)
        .await
        .unwrap();

    // The two valid announcements arrive in order; garbage and the empty
    // line are skipped without ending the stream.
    match event_rx.recv().await.unwrap() {
        PushEvent::Announcement(a) => {
            assert_eq!(a.mac.as_deref(), Some("AA:BB:CC:DD:EE:FF"));
            assert_eq!(a.name.as_deref(), Some("Headphones"));
        }
        other => panic!("expected announcement, got {other:?}"),
    }
    match event_rx.recv().await.unwrap() {
        PushEvent::Announcement(a) => {
            assert_eq!(a.mac.as_deref(), Some("11:22:33:44:55:66"));
        }
        other => panic!("expected announcement, got {other:?}"),
    }
    assert_eq!(event_rx.recv().await.unwrap(), PushEvent::Closed);

    server.await.unwrap();
    push.join().await;
}

#[tokio::test]
async fn push_listener_connect_failure_is_fatal_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = socket_path(&dir, "missing.sock");

    let (event_tx, _event_rx) = mpsc::channel(1);
    let (_shutdown_tx, shutdown_rx) = watch::channel(false);

    let err = PushListener::connect(&path, event_tx, shutdown_rx)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::PushConnect { .. }));
    assert!(err.is_fatal());
}

#[tokio::test]
async fn push_listener_stops_on_shutdown_signal() {
    let dir = tempfile::tempdir().unwrap();
    let path = socket_path(&dir, "blueland.sock");
    let listener = UnixListener::bind(&path).unwrap();

    let server = tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        // Hold the socket open without writing anything
        tokio::time::sleep(Duration::from_secs(5)).await;
        drop(stream);
    });

    let (event_tx, _event_rx) = mpsc::channel(1);
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let push = PushListener::connect(&path, event_tx, shutdown_rx)
        .await
        .unwrap();

    shutdown_tx.send(true).unwrap();
    // join() must return promptly even though the socket is still open
    tokio::time::timeout(Duration::from_secs(1), push.join())
        .await
        .expect("listener did not stop on shutdown");

    server.abort();
}

/// Fake agent that answers every request line with `reply(id, method, params)`
async fn spawn_fake_agent<F>(listener: UnixListener, reply: F)
where
    F: Fn(u64, &str, &Value) -> String + Send + 'static,
{
    tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        let (read_half, mut write_half) = stream.into_split();
        let mut lines = BufReader::new(read_half).lines();

        while let Ok(Some(line)) = lines.next_line().await {
            let request: Value = serde_json::from_str(&line).unwrap();
            let id = request["id"].as_u64().unwrap();
            let method = request["method"].as_str().unwrap().to_string();
            let response = reply(id, &method, &request["params"]);
            write_half
                .write_all(format!("{response}\n").as_bytes())
                .await
                .unwrap();
        }
    });
}

#[tokio::test]
async fn device_state_roundtrip() {
    let dir = tempfile::tempdir().unwrap();
    let path = socket_path(&dir, "agent.sock");
    let listener = UnixListener::bind(&path).unwrap();

    spawn_fake_agent(listener, |id, method, params| {
        assert_eq!(method, "DeviceState");
        assert_eq!(params["address"], "AA:BB:CC:DD:EE:FF");
        json!({
            "id": id,
            "result": { "Paired": true, "Connected": true, "Icon": "audio-headset" },
        })
        .to_string()
    })
    .await;

    let (_shutdown_tx, shutdown_rx) = watch::channel(false);
    let client = AgentClient::connect(&path, shutdown_rx).await.unwrap();

    let state = client
        .sender()
        .device_state("AA:BB:CC:DD:EE:FF")
        .await
        .unwrap();
    assert!(state.paired);
    assert!(state.connected);
    assert_eq!(state.icon.as_deref(), Some("audio-headset"));
    assert_eq!(state.status(), DeviceStatus::Connected);
}

#[tokio::test]
async fn agent_error_reply_surfaces_as_agent_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = socket_path(&dir, "agent.sock");
    let listener = UnixListener::bind(&path).unwrap();

    spawn_fake_agent(listener, |id, method, _| {
        assert_eq!(method, "PairConnDevice");
        json!({ "id": id, "error": "No such device" }).to_string()
    })
    .await;

    let (_shutdown_tx, shutdown_rx) = watch::channel(false);
    let client = AgentClient::connect(&path, shutdown_rx).await.unwrap();

    let err = client
        .sender()
        .set_connection("AA:BB:CC:DD:EE:FF", true)
        .await
        .unwrap_err();
    assert!(err.to_string().contains("No such device"));
    assert!(err.is_recoverable());
}

#[tokio::test]
async fn timeout_fails_only_the_timed_out_command() {
    let dir = tempfile::tempdir().unwrap();
    let path = socket_path(&dir, "agent.sock");
    let listener = UnixListener::bind(&path).unwrap();

    // Never answers DiscoverDevices; answers DeviceState after a delay
    // longer than the discover budget but well inside its own.
    tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        let (read_half, mut write_half) = stream.into_split();
        let mut lines = BufReader::new(read_half).lines();

        while let Ok(Some(line)) = lines.next_line().await {
            let request: Value = serde_json::from_str(&line).unwrap();
            if request["method"] == "DeviceState" {
                let id = request["id"].as_u64().unwrap();
                tokio::time::sleep(Duration::from_millis(300)).await;
                let reply = json!({
                    "id": id,
                    "result": { "Paired": true, "Connected": false },
                });
                write_half
                    .write_all(format!("{reply}\n").as_bytes())
                    .await
                    .unwrap();
            }
        }
    });

    let (_shutdown_tx, shutdown_rx) = watch::channel(false);
    let client = AgentClient::connect(&path, shutdown_rx).await.unwrap();
    let fast = client.sender().with_timeout(Duration::from_millis(100));
    let slow = client.sender().with_timeout(Duration::from_secs(5));

    let (discover, state) = tokio::join!(fast.discover(), slow.device_state("AA:BB:CC:DD:EE:FF"));

    assert!(matches!(discover.unwrap_err(), Error::CommandTimeout { .. }));
    // The state query outlives the unrelated timeout.
    let state = state.unwrap();
    assert!(state.paired);
    assert_eq!(state.status(), DeviceStatus::Paired);
}

#[tokio::test]
async fn unanswered_command_times_out() {
    let dir = tempfile::tempdir().unwrap();
    let path = socket_path(&dir, "agent.sock");
    let listener = UnixListener::bind(&path).unwrap();

    // Accept the connection but never reply
    tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        tokio::time::sleep(Duration::from_secs(5)).await;
        drop(stream);
    });

    let (_shutdown_tx, shutdown_rx) = watch::channel(false);
    let client = AgentClient::connect(&path, shutdown_rx).await.unwrap();
    let sender = client.sender().with_timeout(Duration::from_millis(50));

    let err = sender.discover().await.unwrap_err();
    assert!(matches!(err, Error::CommandTimeout { .. }));
}
