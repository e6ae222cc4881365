//! blpanel-app - Device registry and synchronizer for Blueland Panel
//!
//! Reconciles the two independent backend channels -- push announcements
//! and command completions -- into one consistent, deduplicated view of
//! known devices. State management follows the TEA (The Elm Architecture)
//! pattern: a message queue, a pure `update` function, and an engine that
//! carries out the described effects.

pub mod actions;
pub mod engine;
pub mod handler;
pub mod message;
pub mod presenter;
pub mod registry;
pub mod settings;
pub mod state;

// Re-export primary types
pub use engine::Engine;
pub use handler::{Notice, UpdateAction, UpdateResult};
pub use message::{Message, StatePurpose};
pub use presenter::{NullPresenter, Presenter};
pub use registry::{DeviceRegistry, UpsertOutcome};
pub use settings::Settings;
pub use state::{AppPhase, AppState};

// Re-export agent types the binary wires up
pub use blpanel_agent::{AgentClient, CommandSender, PushListener};
