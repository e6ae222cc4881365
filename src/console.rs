//! Console presenter and stdin command reader
//!
//! A deliberately plain rendering of the presentation contract: one line
//! per device event, dialogs printed as titled blocks, and a blocking
//! stdin reader translating short commands into queue messages.

use tokio::sync::mpsc;
use tracing::{error, info, warn};

use blpanel_app::{Message, Presenter};
use blpanel_core::DeviceRecord;

/// Renders presenter callbacks as stdout lines
#[derive(Debug, Default)]
pub struct ConsolePresenter;

impl Presenter for ConsolePresenter {
    fn device_added(&mut self, record: &DeviceRecord) {
        println!(
            "+ {}  [{}]  icon={}",
            record.display_name(),
            record.address,
            record.icon_name()
        );
    }

    fn device_updated(&mut self, record: &DeviceRecord) {
        println!(
            "~ {}  [{}]  {}  icon={}",
            record.display_name(),
            record.address,
            record.status.label(),
            record.icon_name()
        );
    }

    fn device_list_cleared(&mut self) {
        println!("--- device list cleared ---");
    }

    fn dialog(&mut self, title: &str, body: &str) {
        println!("== {title} ==");
        for line in body.lines() {
            println!("   {line}");
        }
    }
}

const HELP: &str = "\
commands:
  d                 discover devices
  i <address>       device information
  c <address>       connect (pair if needed)
  x <address>       disconnect
  f <address>       forget device
  q                 quit";

/// Read stdin commands and feed them to the message channel (blocking;
/// run on a plain thread, not the runtime)
pub fn stdin_reader_blocking(msg_tx: mpsc::Sender<Message>) {
    use std::io::BufRead;

    let stdin = std::io::stdin();
    let reader = stdin.lock();

    for line in reader.lines() {
        let line = match line {
            Ok(line) => line,
            Err(e) => {
                error!("Failed to read stdin: {}", e);
                break;
            }
        };

        let mut parts = line.trim().splitn(2, char::is_whitespace);
        let command = parts.next().unwrap_or("");
        let argument = parts.next().map(str::trim).unwrap_or("");

        let message = match (command, argument) {
            ("", _) => continue,
            ("d" | "discover", _) => Message::Discover,
            ("q" | "quit", _) => Message::Quit,
            ("i" | "info", address) if !address.is_empty() => Message::OpenDevice {
                address: address.to_string(),
            },
            ("c" | "connect", address) if !address.is_empty() => Message::SetConnection {
                address: address.to_string(),
                connect: true,
            },
            ("x" | "disconnect", address) if !address.is_empty() => Message::SetConnection {
                address: address.to_string(),
                connect: false,
            },
            ("f" | "forget", address) if !address.is_empty() => Message::ForgetDevice {
                address: address.to_string(),
            },
            _ => {
                warn!("Unknown stdin command: {}", line.trim());
                println!("{HELP}");
                continue;
            }
        };

        let quitting = matches!(message, Message::Quit);
        if msg_tx.blocking_send(message).is_err() || quitting {
            break;
        }
    }

    info!("Stdin reader exiting");
}
