//! Application module
//!
//! Preferences, credentials, global key hooks and the capture pipeline.

pub mod config;
pub mod credentials;
pub mod hotkey;
pub mod orchestrator;
mod state;

pub use config::{Preferences, Theme};
#[cfg(test)]
pub use credentials::MemoryCredentials;
pub use credentials::{resolve_api_key, CredentialStore, KeyringCredentials};
pub use hotkey::{GlobalKeys, HotkeyBinding, HotkeyError, KeyHook};
pub use orchestrator::{
    CaptureOrchestrator, Collaborators, HostVisibility, HostWindow, LocalSpawner,
    PipelineSettings, RenderedResult, ResultPresenter, ResultStatus, SelectorLauncher, SessionId,
};
pub use state::AppState;
