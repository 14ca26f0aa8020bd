use intray_core::NameResolver;

use crate::expansion::{ExpansionState, NodeKeys};
use crate::node::{NodeAddr, NodeKind, TreeNode};
use crate::tree::{for_each_group_mut, NotificationTree};

/// Label shown for a group whose raw id is empty.
pub const EMPTY_LABEL: &str = "(empty)";

/// What a fold toggle ended up doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FoldOutcome {
    /// The targeted group flipped to this value.
    Toggled(bool),
    /// Every group was folded, so the default expansion was reapplied.
    DefaultsRestored,
    /// Target is not a group.
    Ignored,
}

impl NotificationTree {
    /// True when the tree has at least one group and none is expanded.
    pub fn all_groups_collapsed(&self) -> bool {
        fn walk(node: &TreeNode, seen: &mut bool) -> bool {
            for child in &node.children {
                if child.is_group() {
                    if child.expanded {
                        return false;
                    }
                    *seen = true;
                    if !walk(child, seen) {
                        return false;
                    }
                }
            }
            true
        }
        let mut seen = false;
        walk(&self.root, &mut seen) && seen
    }

    /// Open groups shallower than `level`, fold the rest, and persist every
    /// decision. Depth is the node kind's fixed structural depth, so a
    /// message group is depth 3 whatever the grouping. Any level above the
    /// deepest kind opens everything.
    pub fn apply_default_expansion(&mut self, level: u8, state: &mut ExpansionState) {
        for_each_group_mut(
            &mut self.root,
            &mut Vec::new(),
            &mut |node: &mut TreeNode, segments: &[String]| {
                let depth = node.kind.structural_depth().unwrap_or(0);
                node.expanded = depth < level;
                if let Some(keys) = NodeKeys::for_group(node.kind, segments) {
                    state.update(&keys, node.expanded);
                }
            },
        );
        tracing::debug!(level, "applied default expansion");
        self.invalidate_cache();
    }

    /// Toggle one group, persisting the change.
    ///
    /// When every group is already folded the toggle restores the default
    /// expansion instead, so the user is never left without anything to open.
    pub fn toggle_fold(
        &mut self,
        addr: &NodeAddr,
        default_level: u8,
        state: &mut ExpansionState,
    ) -> FoldOutcome {
        let Some(keys) = self.node_keys(addr) else {
            return FoldOutcome::Ignored;
        };
        if self.all_groups_collapsed() {
            self.apply_default_expansion(default_level, state);
            return FoldOutcome::DefaultsRestored;
        }
        match self.toggle_node(addr) {
            Some(expanded) => {
                state.update(&keys, expanded);
                FoldOutcome::Toggled(expanded)
            }
            None => FoldOutcome::Ignored,
        }
    }

    /// Fill in display labels. Titles are left alone, so identity and
    /// expansion keys do not depend on what the resolver returns.
    pub fn resolve_display(&mut self, resolver: &dyn NameResolver) {
        fn walk(node: &mut TreeNode, resolver: &dyn NameResolver) {
            for child in &mut node.children {
                child.display = display_label(child, resolver);
                walk(child, resolver);
            }
        }
        walk(&mut self.root, resolver);
    }
}

fn display_label(node: &TreeNode, resolver: &dyn NameResolver) -> String {
    let resolved = match node.kind {
        NodeKind::Session => resolver.resolve_session_name(&node.title),
        NodeKind::Window => resolver.resolve_window_name(&node.title),
        NodeKind::Pane => resolver.resolve_pane_name(&node.title),
        NodeKind::Root | NodeKind::Message | NodeKind::Notification => node.title.clone(),
    };
    if node.title.is_empty() && node.kind != NodeKind::Notification {
        return EMPTY_LABEL.to_string();
    }
    if resolved.is_empty() {
        node.title.clone()
    } else {
        resolved
    }
}
