//! Blueland Panel - console client for the Blueland Bluetooth agent
//!
//! This is the binary entry point. All synchronization logic lives in
//! the workspace crates; this file only wires configuration, logging,
//! the console presenter, and user input into the engine.

mod console;

use std::path::PathBuf;

use clap::Parser;
use tracing::{info, warn};

use blpanel_app::{Engine, Message, Settings};
use console::ConsolePresenter;

/// Blueland Panel - console client for the Blueland Bluetooth agent
#[derive(Parser, Debug)]
#[command(name = "blpanel")]
#[command(about = "Console control panel for the Blueland Bluetooth agent", long_about = None)]
struct Args {
    /// Path to the push announcement socket
    #[arg(long, value_name = "PATH")]
    push_socket: Option<PathBuf>,

    /// Path to the agent command socket
    #[arg(long, value_name = "PATH")]
    agent_socket: Option<PathBuf>,

    /// Command timeout in seconds
    #[arg(long, value_name = "SECS")]
    timeout: Option<u64>,
}

impl Args {
    /// Overlay CLI flags onto the loaded settings
    fn apply(self, mut settings: Settings) -> Settings {
        if let Some(path) = self.push_socket {
            settings.push_socket = path;
        }
        if let Some(path) = self.agent_socket {
            settings.agent_socket = path;
        }
        if let Some(secs) = self.timeout {
            settings.command_timeout_secs = secs;
        }
        settings
    }
}

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    let args = Args::parse();

    blpanel_core::logging::init()?;

    let settings = args.apply(Settings::load()?);
    info!(
        "Using push socket {} and agent socket {}",
        settings.push_socket.display(),
        settings.agent_socket.display()
    );

    let mut engine = Engine::connect(&settings, Box::new(ConsolePresenter)).await?;
    let msg_tx = engine.msg_sender();

    // Stdin is read on a plain thread; blocking reads don't mix with the
    // runtime. The thread exits with the channel when the engine stops.
    let stdin_tx = msg_tx.clone();
    std::thread::spawn(move || console::stdin_reader_blocking(stdin_tx));

    // Ctrl-C folds into the same queue as any other quit request
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            if msg_tx.send(Message::Quit).await.is_err() {
                warn!("Engine already stopped before ctrl-c was delivered");
            }
        }
    });

    engine.run().await?;
    engine.shutdown().await;

    info!("blpanel exited cleanly");
    Ok(())
}
