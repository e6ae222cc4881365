//! End-to-end synchronizer test against fake agent sockets
//!
//! Runs the real engine with a recording presenter and an in-process fake
//! agent serving both the push socket and the command socket.

use std::time::Duration;

use serde_json::{json, Value};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{UnixListener, UnixStream};
use tokio::sync::{mpsc, oneshot};

use blpanel_app::{Engine, Message, Presenter, Settings};
use blpanel_core::DeviceRecord;

/// What the presenter was asked to show, in call order
#[derive(Debug, Clone, PartialEq, Eq)]
enum Shown {
    Added(String),
    Updated(String),
    Cleared,
    Dialog(String, String),
}

struct RecordingPresenter {
    tx: mpsc::UnboundedSender<Shown>,
}

impl Presenter for RecordingPresenter {
    fn device_added(&mut self, record: &DeviceRecord) {
        let _ = self.tx.send(Shown::Added(record.display_name()));
    }
    fn device_updated(&mut self, record: &DeviceRecord) {
        let _ = self.tx.send(Shown::Updated(record.display_name()));
    }
    fn device_list_cleared(&mut self) {
        let _ = self.tx.send(Shown::Cleared);
    }
    fn dialog(&mut self, title: &str, body: &str) {
        let _ = self.tx.send(Shown::Dialog(title.into(), body.into()));
    }
}

async fn next_shown(rx: &mut mpsc::UnboundedReceiver<Shown>) -> Shown {
    tokio::time::timeout(Duration::from_secs(2), rx.recv())
        .await
        .expect("timed out waiting for presenter call")
        .expect("presenter channel closed")
}

/// Fake agent: answers commands and, once discovery is triggered, writes
/// announcements (including one garbage line) on the push socket.
fn spawn_fake_agent(
    agent_listener: UnixListener,
    push_stream_rx: oneshot::Receiver<UnixStream>,
) {
    tokio::spawn(async move {
        let (stream, _) = agent_listener.accept().await.unwrap();
        let (read_half, mut write_half) = stream.into_split();
        let mut lines = BufReader::new(read_half).lines();
        let mut push_stream_rx = Some(push_stream_rx);
        // Kept open so the listener never sees EOF mid-test
        let mut _push_held: Option<UnixStream> = None;

        while let Ok(Some(line)) = lines.next_line().await {
            let request: Value = serde_json::from_str(&line).unwrap();
            let id = request["id"].as_u64().unwrap();

            let reply = match request["method"].as_str().unwrap() {
                "DiscoverDevices" => {
                    if let Some(rx) = push_stream_rx.take() {
                        let mut push = rx.await.unwrap();
                        push.write_all(
                            b"{\"mac\":\"AA:BB:CC:DD:EE:FF\",\"name\":\"Headphones\"}\n\
                              not-json\n\
                              {\"mac\":\"11:22:33:44:55:66\",\"name\":\"Speaker\"}\n",
                        )
                        .await
                        .unwrap();
                        push.flush().await.unwrap();
                        _push_held = Some(push);
                    }
                    json!({ "id": id, "result": "Discovery started" })
                }
                "DeviceState" => json!({
                    "id": id,
                    "result": { "Paired": false, "Connected": false, "Icon": "audio-headset" },
                }),
                "PairConnDevice" => json!({ "id": id, "result": "Connected successfully" }),
                "DisconnectDevice" => json!({ "id": id, "result": "Disconnected" }),
                "RemoveDevice" => json!({ "id": id, "result": "Removed" }),
                other => json!({ "id": id, "error": format!("unknown method {other}") }),
            };

            write_half
                .write_all(format!("{reply}\n").as_bytes())
                .await
                .unwrap();
        }
    });
}

#[tokio::test]
async fn engine_reconciles_push_and_command_traffic() {
    let dir = tempfile::tempdir().unwrap();
    let settings = Settings {
        push_socket: dir.path().join("blueland.sock"),
        agent_socket: dir.path().join("agent.sock"),
        command_timeout_secs: 2,
    };

    let push_listener = UnixListener::bind(&settings.push_socket).unwrap();
    let agent_listener = UnixListener::bind(&settings.agent_socket).unwrap();

    // Hand the accepted push connection over to the fake agent
    let (push_stream_tx, push_stream_rx) = oneshot::channel();
    tokio::spawn(async move {
        let (stream, _) = push_listener.accept().await.unwrap();
        let _ = push_stream_tx.send(stream);
    });
    spawn_fake_agent(agent_listener, push_stream_rx);

    let (shown_tx, mut shown_rx) = mpsc::unbounded_channel();
    let engine = Engine::connect(&settings, Box::new(RecordingPresenter { tx: shown_tx }))
        .await
        .unwrap();
    let msg_tx = engine.msg_sender();

    let engine_task = tokio::spawn(async move {
        let mut engine = engine;
        engine.run().await.unwrap();
        engine.shutdown().await;
    });

    // Startup triggers a discovery cycle, clearing the (empty) list first.
    assert_eq!(next_shown(&mut shown_rx).await, Shown::Cleared);

    // Both valid announcements render; the garbage line renders nothing.
    // Each added device is followed by an icon resolution update.
    let mut added = Vec::new();
    let mut updated = Vec::new();
    while added.len() < 2 || updated.len() < 2 {
        match next_shown(&mut shown_rx).await {
            Shown::Added(name) => added.push(name),
            Shown::Updated(name) => updated.push(name),
            other => panic!("unexpected presenter call {other:?}"),
        }
    }
    assert_eq!(added, vec!["Headphones".to_string(), "Speaker".to_string()]);
    assert!(updated.contains(&"Headphones".to_string()));
    assert!(updated.contains(&"Speaker".to_string()));

    // Connect completion surfaces as a status dialog; observing the new
    // state would require a fresh DeviceState query.
    msg_tx
        .send(Message::SetConnection {
            address: "AA:BB:CC:DD:EE:FF".into(),
            connect: true,
        })
        .await
        .unwrap();
    assert_eq!(
        next_shown(&mut shown_rx).await,
        Shown::Dialog("Connection Status".into(), "Connected successfully".into())
    );

    // Forget removes the record locally and reports the agent's status.
    msg_tx
        .send(Message::ForgetDevice {
            address: "AA:BB:CC:DD:EE:FF".into(),
        })
        .await
        .unwrap();
    assert_eq!(
        next_shown(&mut shown_rx).await,
        Shown::Dialog("Forget Device Status".into(), "Removed".into())
    );

    msg_tx.send(Message::Quit).await.unwrap();
    tokio::time::timeout(Duration::from_secs(2), engine_task)
        .await
        .expect("engine did not shut down")
        .unwrap();
}
