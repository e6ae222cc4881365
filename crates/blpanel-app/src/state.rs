//! Application state owned by the engine

use crate::registry::DeviceRegistry;

/// Application lifecycle phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AppPhase {
    #[default]
    Starting,
    Running,
    Quitting,
}

/// All mutable state owned by the synchronizer's execution context.
///
/// Nothing here is shared: the registry and flags are mutated only from
/// `handler::update`, which runs on the engine's single consumer loop.
#[derive(Debug, Default)]
pub struct AppState {
    pub phase: AppPhase,
    pub registry: DeviceRegistry,
    /// A discovery trigger is outstanding (cleared on completion)
    pub discovering: bool,
    /// The push channel ended or failed; no further device updates will
    /// arrive for the rest of the process lifetime
    pub push_lost: bool,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn should_quit(&self) -> bool {
        self.phase == AppPhase::Quitting
    }
}
