use intray_tree::{relocate_after_collapse, restore_selection, FoldOutcome};

use crate::model::InboxModel;

impl InboxModel {
    /// Expand the group under the cursor. No-op on leaves and outside the
    /// grouped view.
    pub fn expand_selected(&mut self) -> bool {
        match self.selected_identifier() {
            Some(id) => self.expand_group(&id),
            None => false,
        }
    }

    /// Collapse the group under the cursor.
    pub fn collapse_selected(&mut self) -> bool {
        match self.selected_identifier() {
            Some(id) => self.collapse_group(&id),
            None => false,
        }
    }

    /// Expand a group. The selected row keeps its identifier, so rows opened
    /// above it push the cursor down with it.
    pub fn expand_group(&mut self, identifier: &str) -> bool {
        let selected = self.selected_identifier();
        let Some(tree) = self.tree.as_mut() else {
            return false;
        };
        let Some(addr) = tree.find_by_identifier(identifier) else {
            return false;
        };
        let Some(keys) = tree.node_keys(&addr) else {
            return false;
        };
        if tree.node(&addr).is_some_and(|n| n.expanded) {
            return false;
        }
        tree.expand_node(&addr);
        self.expansion.update(&keys, true);
        restore_selection(tree, &mut self.cursor, selected.as_deref());
        true
    }

    /// Collapse a group. When the selection was somewhere inside it, the
    /// cursor lands on the collapsed group's own row.
    pub fn collapse_group(&mut self, identifier: &str) -> bool {
        let selected = self.selected_identifier();
        let Some(tree) = self.tree.as_mut() else {
            return false;
        };
        let Some(addr) = tree.find_by_identifier(identifier) else {
            return false;
        };
        let Some(keys) = tree.node_keys(&addr) else {
            return false;
        };
        if !tree.node(&addr).is_some_and(|n| n.expanded) {
            return false;
        }
        tree.collapse_node(&addr);
        self.expansion.update(&keys, false);
        relocate_after_collapse(tree, &mut self.cursor, selected.as_deref(), identifier);
        tracing::debug!(group = identifier, cursor = self.cursor.index(), "collapsed group");
        true
    }

    /// Toggle the selected group. When every group is folded this restores
    /// the default expansion instead.
    pub fn toggle_fold(&mut self) -> FoldOutcome {
        let selected = self.selected_identifier();
        let level = self.expand_level;
        let Some(tree) = self.tree.as_mut() else {
            return FoldOutcome::Ignored;
        };
        let Some(addr) = selected.as_deref().and_then(|id| tree.find_by_identifier(id)) else {
            return FoldOutcome::Ignored;
        };
        let outcome = tree.toggle_fold(&addr, level, &mut self.expansion);
        match outcome {
            FoldOutcome::DefaultsRestored => {
                restore_selection(tree, &mut self.cursor, selected.as_deref());
            }
            FoldOutcome::Toggled(_) | FoldOutcome::Ignored => {
                self.cursor.clamp(tree.visible_len());
            }
        }
        outcome
    }

    /// Re-fold the whole tree to the configured expand level.
    pub fn apply_default_expansion(&mut self) {
        let selected = self.selected_identifier();
        let level = self.expand_level;
        if let Some(tree) = self.tree.as_mut() {
            tree.apply_default_expansion(level, &mut self.expansion);
            restore_selection(tree, &mut self.cursor, selected.as_deref());
        }
    }

    /// Open every group and remember it.
    pub fn expand_all(&mut self) {
        let selected = self.selected_identifier();
        if let Some(tree) = self.tree.as_mut() {
            tree.apply_default_expansion(intray_core::MAX_EXPAND_LEVEL + 1, &mut self.expansion);
            restore_selection(tree, &mut self.cursor, selected.as_deref());
        }
    }
}

#[cfg(test)]
mod tests {
    use intray_core::Notification;

    use super::*;

    fn n(id: u64, session: &str, window: &str, pane: &str) -> Notification {
        Notification {
            id,
            session: session.into(),
            window: window.into(),
            pane: pane.into(),
            message: format!("m{id}"),
            ..Default::default()
        }
    }

    fn model() -> InboxModel {
        let mut m = InboxModel::new();
        m.set_notifications(vec![n(1, "$1", "@1", "%1"), n(2, "$2", "@1", "%2")]);
        m
    }

    #[test]
    fn collapse_selected_group_and_reexpand() {
        let mut m = model();
        m.select_row(4);
        assert!(m.collapse_selected());
        assert_eq!(m.row_count(), 5);
        assert_eq!(m.selected_identifier().as_deref(), Some("session:$2"));
        assert_eq!(m.expansion().get("session:$2"), Some(false));
        assert!(!m.collapse_selected());
        assert!(m.expand_selected());
        assert_eq!(m.row_count(), 8);
        assert_eq!(m.expansion().get("session:$2"), Some(true));
    }

    #[test]
    fn expanding_above_selection_keeps_it_selected() {
        let mut m = model();
        assert!(m.collapse_group("session:$1"));
        assert!(m.select_identifier("notif:2"));
        assert_eq!(m.cursor().index(), 4);
        assert!(m.expand_group("session:$1"));
        assert_eq!(m.selected_identifier().as_deref(), Some("notif:2"));
        assert_eq!(m.cursor().index(), 7);
    }

    #[test]
    fn leaves_do_not_fold() {
        let mut m = model();
        m.select_row(3);
        assert!(!m.collapse_selected());
        assert!(!m.expand_selected());
        assert_eq!(m.toggle_fold(), FoldOutcome::Ignored);
        assert_eq!(m.row_count(), 8);
    }

    #[test]
    fn collapsing_ancestor_moves_cursor_up() {
        let mut m = model();
        m.select_row(3);
        assert!(m.collapse_group("window:$1:@1"));
        assert_eq!(m.cursor().index(), 1);
        assert_eq!(m.selected_identifier().as_deref(), Some("window:$1:@1"));
    }

    #[test]
    fn fold_state_survives_reload() {
        let mut m = model();
        m.collapse_group("session:$1");
        let again = m.notifications().to_vec();
        m.set_notifications(again);
        assert_eq!(m.row_count(), 5);
    }

    #[test]
    fn toggle_from_fully_folded_restores_defaults() {
        let mut m = model();
        m.set_expand_level(0).unwrap();
        m.apply_default_expansion();
        assert_eq!(m.row_count(), 2);
        m.set_expand_level(1).unwrap();
        assert_eq!(m.toggle_fold(), FoldOutcome::DefaultsRestored);
        assert_eq!(m.row_count(), 4);
        assert_eq!(m.selected_identifier().as_deref(), Some("session:$1"));
    }

    #[test]
    fn expand_all_opens_everything() {
        let mut m = model();
        m.set_expand_level(0).unwrap();
        m.apply_default_expansion();
        m.expand_all();
        assert_eq!(m.row_count(), 8);
        assert_eq!(m.expansion().get("pane:$2:@1:%252"), Some(true));
    }
}
