//! Collaborators the inbox talks to. They are called synchronously from
//! within a single event-loop turn.

use crate::settings::SettingsDto;
use crate::types::{Notification, NotificationId, State};

/// Source of truth for notification records.
pub trait NotificationStore {
    /// List records, optionally restricted to one state.
    fn list(&self, state: Option<State>) -> anyhow::Result<Vec<Notification>>;
    fn mark_read(&self, id: NotificationId) -> anyhow::Result<()>;
    fn mark_unread(&self, id: NotificationId) -> anyhow::Result<()>;
    fn dismiss(&self, id: NotificationId) -> anyhow::Result<()>;
    /// Dismiss every active record matching the given ids; empty means "any".
    /// Returns the number of records dismissed.
    fn dismiss_by_filter(&self, session: &str, window: &str, pane: &str) -> anyhow::Result<usize>;
}

/// Maps tmux ids (`$1`, `@3`, `%7`) to human names. An empty result means
/// "unknown", and callers fall back to the raw id.
pub trait NameResolver {
    fn resolve_session_name(&self, id: &str) -> String;
    fn resolve_window_name(&self, id: &str) -> String;
    fn resolve_pane_name(&self, id: &str) -> String;
}

/// Resolver that knows no names; every label stays the raw id.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityResolver;

impl NameResolver for IdentityResolver {
    fn resolve_session_name(&self, id: &str) -> String {
        id.to_string()
    }

    fn resolve_window_name(&self, id: &str) -> String {
        id.to_string()
    }

    fn resolve_pane_name(&self, id: &str) -> String {
        id.to_string()
    }
}

/// Persistence for the opaque settings blob.
pub trait SettingsStore {
    /// `Ok(None)` when nothing has been saved yet.
    fn load(&self) -> anyhow::Result<Option<SettingsDto>>;
    fn save(&self, settings: &SettingsDto) -> anyhow::Result<()>;
}
