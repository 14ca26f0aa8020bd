//! Cursor stability across rebuilds.
//!
//! Indices are meaningless once the tree is replaced, so the selection is
//! carried as a stable identifier: capture before the change, look it up
//! afterwards, clamp when it is gone.

use crate::node::NodeAddr;
use crate::tree::NotificationTree;

/// Scroll window over the row list. A zero height means "unbounded".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Viewport {
    pub offset: usize,
    pub height: usize,
}

impl Viewport {
    pub fn new(height: usize) -> Self {
        Self { offset: 0, height }
    }

    /// Scroll the least amount that puts `row` on screen.
    pub fn ensure_visible(&mut self, row: usize) {
        if self.height == 0 {
            return;
        }
        if row < self.offset {
            self.offset = row;
        } else if row >= self.offset + self.height {
            self.offset = row + 1 - self.height;
        }
    }

    /// Keep the window inside a list of `len` rows.
    pub fn clamp(&mut self, len: usize) {
        let max_offset = len.saturating_sub(self.height.max(1));
        self.offset = self.offset.min(max_offset);
    }
}

/// Selected row plus the viewport that shows it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Cursor {
    index: usize,
    viewport: Viewport,
}

impl Cursor {
    pub fn new(height: usize) -> Self {
        Self {
            index: 0,
            viewport: Viewport::new(height),
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn set_height(&mut self, height: usize, len: usize) {
        self.viewport.height = height;
        self.clamp(len);
    }

    /// Jump to `index` within a list of `len` rows.
    pub fn select(&mut self, index: usize, len: usize) {
        self.index = index;
        self.clamp(len);
    }

    /// Force the index into `[0, len-1]`, or 0 when empty.
    pub fn clamp(&mut self, len: usize) {
        self.index = self.index.min(len.saturating_sub(1));
        self.viewport.clamp(len);
        self.viewport.ensure_visible(self.index);
    }

    pub fn move_down(&mut self, len: usize) {
        if self.index + 1 < len {
            self.index += 1;
        }
        self.clamp(len);
    }

    pub fn move_up(&mut self, len: usize) {
        self.index = self.index.saturating_sub(1);
        self.clamp(len);
    }

    pub fn move_to_top(&mut self, len: usize) {
        self.select(0, len);
    }

    pub fn move_to_bottom(&mut self, len: usize) {
        self.select(len.saturating_sub(1), len);
    }

    pub fn reset(&mut self) {
        self.index = 0;
        self.viewport.offset = 0;
    }
}

// ── Tree protocol ──

/// Stable identifier of the selected visible row, if any.
pub fn capture_selection(tree: &NotificationTree, cursor: &Cursor) -> Option<String> {
    let addr = tree.visible_nodes().get(cursor.index())?;
    tree.node_identifier(addr)
}

/// Put the cursor back on `stable_id` if it is still visible, else clamp.
/// Returns whether the identifier was found.
pub fn restore_selection(
    tree: &NotificationTree,
    cursor: &mut Cursor,
    stable_id: Option<&str>,
) -> bool {
    let len = tree.visible_len();
    match stable_id.and_then(|id| tree.visible_index_of(id)) {
        Some(index) => {
            cursor.select(index, len);
            true
        }
        None => {
            if let Some(id) = stable_id {
                tracing::debug!(id, len, "selection gone after rebuild, clamping");
            }
            cursor.clamp(len);
            false
        }
    }
}

/// After folding `collapsed`, move the cursor onto the folded row when the
/// previous selection was inside it. Otherwise the selection is followed
/// as usual. Call with identifiers captured before the fold.
pub fn relocate_after_collapse(
    tree: &NotificationTree,
    cursor: &mut Cursor,
    selected_id: Option<&str>,
    collapsed_id: &str,
) {
    let Some(collapsed) = tree.find_by_identifier(collapsed_id) else {
        restore_selection(tree, cursor, selected_id);
        return;
    };
    let inside = selected_id
        .and_then(|id| tree.find_by_identifier(id))
        .is_some_and(|selected: NodeAddr| collapsed.contains(&selected));
    if !inside {
        restore_selection(tree, cursor, selected_id);
        return;
    }
    match tree.visible_nodes().iter().position(|addr| *addr == collapsed) {
        Some(index) => cursor.select(index, tree.visible_len()),
        None => cursor.clamp(tree.visible_len()),
    }
}

#[cfg(test)]
mod tests {
    use intray_core::{GroupBy, Notification};

    use super::*;
    use crate::expansion::ExpansionState;

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

    fn tree() -> NotificationTree {
        let input = vec![n(1, "$1", "@1", "%1"), n(2, "$2", "@1", "%2")];
        let mut tree = NotificationTree::build(&input, GroupBy::Pane).unwrap();
        tree.apply_expansion_state(&mut ExpansionState::new());
        tree
    }

    #[test]
    fn viewport_scrolls_minimally() {
        let mut v = Viewport::new(3);
        v.ensure_visible(2);
        assert_eq!(v.offset, 0);
        v.ensure_visible(5);
        assert_eq!(v.offset, 3);
        v.ensure_visible(4);
        assert_eq!(v.offset, 3);
        v.ensure_visible(1);
        assert_eq!(v.offset, 1);
    }

    #[test]
    fn unbounded_viewport_never_scrolls() {
        let mut v = Viewport::default();
        v.ensure_visible(100);
        assert_eq!(v.offset, 0);
    }

    #[test]
    fn cursor_moves_within_bounds() {
        let mut c = Cursor::new(2);
        c.move_up(3);
        assert_eq!(c.index(), 0);
        c.move_down(3);
        c.move_down(3);
        c.move_down(3);
        assert_eq!(c.index(), 2);
        assert_eq!(c.viewport().offset, 1);
        c.move_to_top(3);
        assert_eq!(c.index(), 0);
        assert_eq!(c.viewport().offset, 0);
    }

    #[test]
    fn clamp_on_shrink_and_empty() {
        let mut c = Cursor::new(0);
        c.select(7, 10);
        c.clamp(4);
        assert_eq!(c.index(), 3);
        c.clamp(0);
        assert_eq!(c.index(), 0);
    }

    #[test]
    fn restore_follows_identifier() {
        let t = tree();
        let mut c = Cursor::new(0);
        c.select(3, t.visible_len());
        let id = capture_selection(&t, &c).unwrap();
        assert_eq!(id, "notif:1");

        let grown = vec![
            n(2, "$2", "@1", "%2"),
            n(1, "$1", "@1", "%1"),
            n(3, "$0", "@1", "%9"),
        ];
        let mut rebuilt = NotificationTree::build(&grown, GroupBy::Pane).unwrap();
        rebuilt.apply_expansion_state(&mut ExpansionState::new());
        assert!(restore_selection(&rebuilt, &mut c, Some(&id)));
        // $0 sorts first and adds four rows ahead of the leaf
        assert_eq!(c.index(), 7);
    }

    #[test]
    fn restore_miss_clamps() {
        let t = tree();
        let mut c = Cursor::new(0);
        c.select(7, t.visible_len());
        let small = NotificationTree::build(&[n(1, "$1", "@1", "%1")], GroupBy::None).unwrap();
        assert!(!restore_selection(&small, &mut c, Some("notif:2")));
        assert_eq!(c.index(), 0);
    }

    #[test]
    fn collapse_moves_cursor_to_ancestor() {
        let mut t = tree();
        let mut c = Cursor::new(0);
        c.select(3, t.visible_len());
        let selected = capture_selection(&t, &c);
        let s1 = t.find_by_identifier("session:$1").unwrap();
        let collapsed_id = t.node_identifier(&s1).unwrap();
        t.collapse_node(&s1);
        relocate_after_collapse(&t, &mut c, selected.as_deref(), &collapsed_id);
        assert_eq!(c.index(), 0);
        assert_eq!(t.visible_len(), 5);
    }

    #[test]
    fn collapse_elsewhere_follows_selection() {
        let mut t = tree();
        let mut c = Cursor::new(0);
        c.select(7, t.visible_len());
        let selected = capture_selection(&t, &c);
        let s1 = t.find_by_identifier("session:$1").unwrap();
        t.collapse_node(&s1);
        relocate_after_collapse(&t, &mut c, selected.as_deref(), "session:$1");
        assert_eq!(c.index(), 4);
        assert_eq!(capture_selection(&t, &c).as_deref(), Some("notif:2"));
    }
}
