//! Engine - the synchronizer's owner loop
//!
//! The single consumer of the inbound queue. Everything that mutates the
//! registry or touches the presenter runs here, in FIFO arrival order;
//! the push listener and command completion tasks only ever enqueue.

use tokio::sync::{mpsc, watch};

use crate::actions::handle_action;
use crate::handler::{self, Notice, UpdateAction};
use crate::message::Message;
use crate::presenter::Presenter;
use crate::settings::Settings;
use crate::state::AppState;
use blpanel_agent::{AgentClient, CommandSender, PushListener};
use blpanel_core::prelude::*;
use blpanel_core::PushEvent;

/// Capacity of the synchronizer's inbound queue
const QUEUE_CAPACITY: usize = 256;

/// Owns the application state, the inbound queue, and both backend
/// connections. Dropping through [`Engine::shutdown`] stops the listener
/// and cancels pending commands.
pub struct Engine {
    pub state: AppState,
    msg_tx: mpsc::Sender<Message>,
    msg_rx: mpsc::Receiver<Message>,
    sender: CommandSender,
    presenter: Box<dyn Presenter>,
    shutdown_tx: watch::Sender<bool>,
    listener: Option<PushListener>,
    client: AgentClient,
}

impl Engine {
    /// Connect both channels and assemble the engine.
    ///
    /// A failed command-socket connect is fatal (nothing works without
    /// it). A failed push-socket connect is fatal only to the listener:
    /// the engine starts anyway, logs the loss, and the degraded mode is
    /// surfaced through the queue like any other listener failure.
    pub async fn connect(settings: &Settings, presenter: Box<dyn Presenter>) -> Result<Self> {
        let (msg_tx, msg_rx) = mpsc::channel::<Message>(QUEUE_CAPACITY);
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let client = AgentClient::connect(&settings.agent_socket, shutdown_rx.clone()).await?;
        let sender = client.sender().with_timeout(settings.command_timeout());

        // The listener speaks PushEvent; adapt it onto the message queue.
        let (push_tx, push_rx) = mpsc::channel::<PushEvent>(QUEUE_CAPACITY);
        tokio::spawn(Self::forward_push_events(push_rx, msg_tx.clone()));

        let listener =
            match PushListener::connect(&settings.push_socket, push_tx, shutdown_rx).await {
                Ok(listener) => Some(listener),
                Err(e) => {
                    error!("Push listener failed to start: {}", e);
                    let _ = msg_tx
                        .send(Message::Push(PushEvent::Failed {
                            message: e.to_string(),
                        }))
                        .await;
                    None
                }
            };

        Ok(Self {
            state: AppState::new(),
            msg_tx,
            msg_rx,
            sender,
            presenter,
            shutdown_tx,
            listener,
            client,
        })
    }

    /// Get a sender for injecting messages (user input, signals)
    pub fn msg_sender(&self) -> mpsc::Sender<Message> {
        self.msg_tx.clone()
    }

    /// Run until quit is requested or the queue closes.
    ///
    /// Triggers a discovery cycle on entry, matching the original
    /// behavior of refreshing on startup.
    pub async fn run(&mut self) -> Result<()> {
        self.process_message(Message::Discover);

        loop {
            if self.state.should_quit() {
                info!("Quit requested");
                break;
            }

            match self.msg_rx.recv().await {
                Some(message) => self.process_message(message),
                None => {
                    info!("Message channel closed");
                    break;
                }
            }
        }

        Ok(())
    }

    /// Process one message through the update function, then carry out
    /// its effects: presenter notifications inline, agent calls as
    /// spawned tasks. Follow-up messages are drained before returning so
    /// one inbound item is fully applied before the next is taken.
    pub fn process_message(&mut self, message: Message) {
        let mut msg = Some(message);
        while let Some(m) = msg {
            let result = handler::update(&mut self.state, m);

            if let Some(action) = result.action {
                match action {
                    UpdateAction::Notify(notice) => self.notify(notice),
                    other => handle_action(other, self.msg_tx.clone(), self.sender.clone()),
                }
            }

            msg = result.message;
        }
    }

    /// Invoke exactly one presenter callback for a notice
    fn notify(&mut self, notice: Notice) {
        match notice {
            Notice::DeviceAdded(record) => self.presenter.device_added(&record),
            Notice::DeviceUpdated(record) => self.presenter.device_updated(&record),
            Notice::ListCleared => self.presenter.device_list_cleared(),
            Notice::Dialog { title, body } => self.presenter.dialog(&title, &body),
        }
    }

    /// Signal shutdown, join the listener, and cancel pending commands
    pub async fn shutdown(self) {
        info!("Engine shutting down");
        let _ = self.shutdown_tx.send(true);

        if let Some(listener) = self.listener {
            listener.join().await;
        }
        self.client.shutdown().await;
    }

    /// Forward decoded push events onto the synchronizer queue
    async fn forward_push_events(
        mut push_rx: mpsc::Receiver<PushEvent>,
        msg_tx: mpsc::Sender<Message>,
    ) {
        while let Some(event) = push_rx.recv().await {
            if msg_tx.send(Message::Push(event)).await.is_err() {
                break;
            }
        }
        debug!("Push event forwarder finished");
    }
}
