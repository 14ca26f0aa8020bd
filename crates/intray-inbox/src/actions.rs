//! Store-backed commands on the current selection.
//!
//! A command either succeeds and re-fetches the active set (rebuilding the
//! tree with the cursor carried over), or fails, records the error and leaves
//! the tree and cursor exactly as they were.

use anyhow::Context;
use intray_core::{NotificationId, NotificationStore, State};

use crate::model::InboxModel;

/// Where a "jump to source" should take the user. Executing the jump is up
/// to the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaneTarget {
    pub session: String,
    pub window: String,
    pub pane: String,
}

impl InboxModel {
    /// Fetch the active set from the store and rebuild, keeping the cursor.
    pub fn reload(&mut self, store: &dyn NotificationStore) -> anyhow::Result<()> {
        let state = self.criteria.state.unwrap_or(State::Active);
        let fetched = store
            .list(Some(state))
            .context("failed to load notifications");
        match fetched {
            Ok(notifications) => {
                self.last_error = None;
                self.set_notifications(notifications);
                Ok(())
            }
            Err(e) => Err(self.surface(e)),
        }
    }

    fn surface(&mut self, e: anyhow::Error) -> anyhow::Error {
        tracing::warn!(error = %format!("{e:#}"), "inbox command failed");
        self.last_error = Some(format!("{e:#}"));
        e
    }

    /// Run one store mutation, then reload on success.
    fn run<T>(
        &mut self,
        store: &dyn NotificationStore,
        what: &str,
        op: impl FnOnce(&dyn NotificationStore) -> anyhow::Result<T>,
    ) -> anyhow::Result<T> {
        match op(store).with_context(|| format!("failed to {what}")) {
            Ok(value) => {
                self.reload(store)?;
                Ok(value)
            }
            Err(e) => Err(self.surface(e)),
        }
    }

    fn selected_id(&self) -> Option<NotificationId> {
        self.selected_notification().map(|n| n.id)
    }

    /// Mark the selected notification read. `Ok(false)` when nothing is selected.
    pub fn mark_selected_read(&mut self, store: &dyn NotificationStore) -> anyhow::Result<bool> {
        let Some(id) = self.selected_id() else {
            return Ok(false);
        };
        self.run(store, &format!("mark notification {id} read"), |s| s.mark_read(id))?;
        Ok(true)
    }

    pub fn mark_selected_unread(&mut self, store: &dyn NotificationStore) -> anyhow::Result<bool> {
        let Some(id) = self.selected_id() else {
            return Ok(false);
        };
        self.run(store, &format!("mark notification {id} unread"), |s| s.mark_unread(id))?;
        Ok(true)
    }

    pub fn dismiss_selected(&mut self, store: &dyn NotificationStore) -> anyhow::Result<bool> {
        let Some(id) = self.selected_id() else {
            return Ok(false);
        };
        self.run(store, &format!("dismiss notification {id}"), |s| s.dismiss(id))?;
        Ok(true)
    }

    /// Dismiss every active notification in the selected session, window or
    /// pane group. Returns how many the store dismissed; `Ok(None)` when the
    /// selection is not such a group.
    pub fn dismiss_selected_group(
        &mut self,
        store: &dyn NotificationStore,
    ) -> anyhow::Result<Option<usize>> {
        let scope = match (self.tree.as_ref(), self.selected_addr()) {
            (Some(tree), Some(addr)) => tree.group_scope(addr),
            _ => None,
        };
        let Some(scope) = scope.filter(|s| s.count > 0) else {
            return Ok(None);
        };
        let dismissed = self.run(store, "dismiss group", |s| {
            s.dismiss_by_filter(&scope.session, &scope.window, &scope.pane)
        })?;
        tracing::debug!(
            session = %scope.session,
            window = %scope.window,
            pane = %scope.pane,
            dismissed,
            "dismissed group"
        );
        Ok(Some(dismissed))
    }

    /// Pane the selected notification came from.
    pub fn jump_target(&self) -> Option<PaneTarget> {
        let n = self.selected_notification()?;
        if n.session.is_empty() || n.pane.is_empty() {
            return None;
        }
        Some(PaneTarget {
            session: n.session.clone(),
            window: n.window.clone(),
            pane: n.pane.clone(),
        })
    }
}
