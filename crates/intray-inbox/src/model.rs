use std::collections::BTreeMap;

use intray_core::filter::{read_count, unread_count};
use intray_core::settings::DEFAULT_EXPAND_LEVEL;
use intray_core::{
    FilterCriteria, FilterPipeline, GroupBy, IdentityResolver, Level, NameResolver, Notification,
    SearchMatcher, SortOptions, ViewMode, DEFAULT_COLUMNS,
};
use intray_tree::{
    capture_selection, leaf_identifier, restore_selection, Cursor, ExpansionState, NodeAddr,
    NotificationTree, TreeNode,
};

/// All inbox state in one place: the raw records, the active filters, the
/// grouped tree, fold preferences and the cursor.
///
/// Every operation goes through `&mut self`; nothing here is shared or
/// global, and the tree is always replaced wholesale.
pub struct InboxModel {
    pub(crate) notifications: Vec<Notification>,
    pub(crate) filtered: Vec<Notification>,
    pub(crate) criteria: FilterCriteria,
    pub(crate) query: String,
    pub(crate) sort: SortOptions,
    pub(crate) group_by: GroupBy,
    pub(crate) expand_level: u8,
    pub(crate) view_mode: ViewMode,
    pub(crate) columns: Vec<String>,
    pub(crate) expansion: ExpansionState,
    pub(crate) tree: Option<NotificationTree>,
    pub(crate) cursor: Cursor,
    pub(crate) pipeline: FilterPipeline,
    pub(crate) resolver: Box<dyn NameResolver>,
    pub(crate) last_error: Option<String>,
}

impl Default for InboxModel {
    fn default() -> Self {
        Self::new()
    }
}

/// One rendered row of the current view.
#[derive(Debug, Clone, Copy)]
pub enum Row<'a> {
    Node {
        addr: &'a NodeAddr,
        node: &'a TreeNode,
        level: usize,
    },
    Notification(&'a Notification),
}

impl InboxModel {
    pub fn new() -> Self {
        Self {
            notifications: Vec::new(),
            filtered: Vec::new(),
            criteria: FilterCriteria::default(),
            query: String::new(),
            sort: SortOptions::default(),
            group_by: GroupBy::default(),
            expand_level: DEFAULT_EXPAND_LEVEL,
            view_mode: ViewMode::default(),
            columns: DEFAULT_COLUMNS.iter().map(|c| c.to_string()).collect(),
            expansion: ExpansionState::new(),
            tree: None,
            cursor: Cursor::default(),
            pipeline: FilterPipeline::default(),
            resolver: Box::new(IdentityResolver),
            last_error: None,
        }
    }

    // ── Accessors ──

    pub fn notifications(&self) -> &[Notification] {
        &self.notifications
    }

    pub fn filtered(&self) -> &[Notification] {
        &self.filtered
    }

    pub fn criteria(&self) -> &FilterCriteria {
        &self.criteria
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn sort(&self) -> SortOptions {
        self.sort
    }

    pub fn group_by(&self) -> GroupBy {
        self.group_by
    }

    pub fn expand_level(&self) -> u8 {
        self.expand_level
    }

    pub fn view_mode(&self) -> ViewMode {
        self.view_mode
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn expansion(&self) -> &ExpansionState {
        &self.expansion
    }

    pub fn tree(&self) -> Option<&NotificationTree> {
        self.tree.as_ref()
    }

    pub fn cursor(&self) -> &Cursor {
        &self.cursor
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn clear_error(&mut self) {
        self.last_error = None;
    }

    pub fn is_grouped(&self) -> bool {
        self.view_mode == ViewMode::Grouped
    }

    // ── Data ──

    /// Replace the raw record set and rebuild, keeping the selection.
    pub fn set_notifications(&mut self, notifications: Vec<Notification>) {
        self.notifications = notifications;
        self.refresh(true);
    }

    pub fn set_criteria(&mut self, criteria: FilterCriteria) {
        self.criteria = criteria;
        self.refresh(true);
    }

    pub fn set_search_matcher(&mut self, matcher: Box<dyn SearchMatcher>) {
        self.pipeline.set_matcher(matcher);
        self.refresh(true);
    }

    pub fn set_name_resolver(&mut self, resolver: Box<dyn NameResolver>) {
        self.resolver = resolver;
        if let Some(tree) = self.tree.as_mut() {
            tree.resolve_display(self.resolver.as_ref());
        }
    }

    // ── Search query ──

    pub fn set_query(&mut self, query: &str) {
        self.query = query.to_string();
        self.refresh(true);
    }

    pub fn push_query_char(&mut self, c: char) {
        self.query.push(c);
        self.refresh(true);
    }

    pub fn pop_query_char(&mut self) {
        if self.query.pop().is_some() {
            self.refresh(true);
        }
    }

    pub fn clear_query(&mut self) {
        if !self.query.is_empty() {
            self.query.clear();
            self.refresh(true);
        }
    }

    // ── Rebuild ──

    /// Re-run the filter pipeline and, in grouped mode, rebuild the tree.
    ///
    /// With `preserve_cursor` the selection is carried across by stable
    /// identifier and clamped when it no longer exists; otherwise the cursor
    /// goes back to the top.
    pub(crate) fn refresh(&mut self, preserve_cursor: bool) {
        let selected = if preserve_cursor {
            self.selected_identifier()
        } else {
            None
        };

        self.filtered =
            self.pipeline
                .apply(&self.notifications, &self.criteria, &self.query, self.sort);

        self.tree = if self.is_grouped() {
            let expansion = &mut self.expansion;
            let resolver = self.resolver.as_ref();
            NotificationTree::build(&self.filtered, self.group_by).map(|mut tree| {
                tree.prune_empty_groups();
                tree.apply_expansion_state(expansion);
                tree.resolve_display(resolver);
                tree
            })
        } else {
            None
        };

        if preserve_cursor {
            self.restore_cursor(selected.as_deref());
        } else {
            self.cursor.reset();
            self.cursor.clamp(self.row_count());
        }
        tracing::debug!(
            total = self.notifications.len(),
            filtered = self.filtered.len(),
            rows = self.row_count(),
            cursor = self.cursor.index(),
            "inbox refreshed"
        );
    }

    fn restore_cursor(&mut self, selected: Option<&str>) {
        match self.tree.as_ref() {
            Some(tree) => {
                restore_selection(tree, &mut self.cursor, selected);
            }
            None => {
                let len = self.row_count();
                let found = selected.and_then(|id| {
                    self.filtered
                        .iter()
                        .position(|n| leaf_identifier(n.id) == id)
                });
                match found {
                    Some(index) => self.cursor.select(index, len),
                    None => self.cursor.clamp(len),
                }
            }
        }
    }

    // ── Rows and selection ──

    /// Number of rows in the current view.
    pub fn row_count(&self) -> usize {
        match (self.is_grouped(), self.tree.as_ref()) {
            (true, Some(tree)) => tree.visible_len(),
            (true, None) => 0,
            (false, _) => self.filtered.len(),
        }
    }

    pub fn rows(&self) -> Vec<Row<'_>> {
        match self.tree.as_ref() {
            Some(tree) => tree
                .iter_visible()
                .map(|(addr, node)| Row::Node {
                    addr,
                    node,
                    level: tree.tree_level(addr),
                })
                .collect(),
            None if self.is_grouped() => Vec::new(),
            None => self.filtered.iter().map(Row::Notification).collect(),
        }
    }

    /// Stable identifier of the selected row.
    pub fn selected_identifier(&self) -> Option<String> {
        match self.tree.as_ref() {
            Some(tree) => capture_selection(tree, &self.cursor),
            None => self
                .filtered
                .get(self.cursor.index())
                .map(|n| leaf_identifier(n.id)),
        }
    }

    pub(crate) fn selected_addr(&self) -> Option<&NodeAddr> {
        self.tree.as_ref()?.visible_nodes().get(self.cursor.index())
    }

    /// Selected tree node (grouped view only).
    pub fn selected_node(&self) -> Option<&TreeNode> {
        let tree = self.tree.as_ref()?;
        tree.node(tree.visible_nodes().get(self.cursor.index())?)
    }

    /// Notification under the cursor: a leaf in grouped view, the row in a flat view.
    pub fn selected_notification(&self) -> Option<&Notification> {
        if self.is_grouped() {
            self.selected_node()?.notification.as_ref()
        } else {
            self.filtered.get(self.cursor.index())
        }
    }

    // ── Cursor ──

    pub fn move_down(&mut self) {
        let len = self.row_count();
        self.cursor.move_down(len);
    }

    pub fn move_up(&mut self) {
        let len = self.row_count();
        self.cursor.move_up(len);
    }

    pub fn move_to_top(&mut self) {
        let len = self.row_count();
        self.cursor.move_to_top(len);
    }

    pub fn move_to_bottom(&mut self) {
        let len = self.row_count();
        self.cursor.move_to_bottom(len);
    }

    pub fn select_row(&mut self, index: usize) {
        let len = self.row_count();
        self.cursor.select(index, len);
    }

    /// Move the cursor to the row with this identifier, if visible.
    pub fn select_identifier(&mut self, identifier: &str) -> bool {
        let index = match self.tree.as_ref() {
            Some(tree) => tree.visible_index_of(identifier),
            None => self
                .filtered
                .iter()
                .position(|n| leaf_identifier(n.id) == identifier),
        };
        match index {
            Some(index) => {
                self.select_row(index);
                true
            }
            None => false,
        }
    }

    pub fn set_viewport_height(&mut self, height: usize) {
        let len = self.row_count();
        self.cursor.set_height(height, len);
    }

    // ── Counts ──

    pub fn unread_count(&self) -> usize {
        unread_count(&self.filtered)
    }

    pub fn read_count(&self) -> usize {
        read_count(&self.filtered)
    }

    pub fn level_counts(&self) -> BTreeMap<Level, usize> {
        let mut counts = BTreeMap::new();
        for n in &self.filtered {
            *counts.entry(n.level).or_insert(0) += 1;
        }
        counts
    }
}

#[cfg(test)]
mod tests {
    use intray_core::{ReadFilter, SubstringMatcher};

    use super::*;

    fn n(id: u64, session: &str, window: &str, pane: &str, message: &str) -> Notification {
        Notification {
            id,
            timestamp: format!("2024-01-01T00:00:{id:02}Z"),
            session: session.into(),
            window: window.into(),
            pane: pane.into(),
            message: message.into(),
            ..Default::default()
        }
    }

    fn sample() -> Vec<Notification> {
        vec![
            n(1, "$1", "@1", "%1", "build done"),
            n(2, "$2", "@1", "%2", "tests failed"),
        ]
    }

    #[test]
    fn empty_inbox_has_no_tree() {
        let mut m = InboxModel::new();
        m.set_notifications(Vec::new());
        assert!(m.tree().is_none());
        assert_eq!(m.row_count(), 0);
        assert!(m.selected_identifier().is_none());
        assert_eq!(m.cursor().index(), 0);
    }

    #[test]
    fn grouped_rows_start_expanded() {
        let mut m = InboxModel::new();
        m.set_notifications(sample());
        assert_eq!(m.row_count(), 8);
        let levels: Vec<usize> = m
            .rows()
            .iter()
            .map(|r| match r {
                Row::Node { level, .. } => *level,
                Row::Notification(_) => usize::MAX,
            })
            .collect();
        assert_eq!(levels, vec![0, 1, 2, 3, 0, 1, 2, 3]);
    }

    #[test]
    fn query_keystrokes_keep_selection() {
        let mut m = InboxModel::new();
        m.set_notifications(sample());
        assert!(m.select_identifier("notif:2"));
        for c in "failed".chars() {
            m.push_query_char(c);
        }
        assert_eq!(m.filtered().len(), 1);
        assert_eq!(m.selected_identifier().as_deref(), Some("notif:2"));
        assert_eq!(m.cursor().index(), 3);
        m.pop_query_char();
        m.clear_query();
        assert_eq!(m.filtered().len(), 2);
        assert_eq!(m.selected_identifier().as_deref(), Some("notif:2"));
    }

    #[test]
    fn filtered_out_selection_clamps() {
        let mut m = InboxModel::new();
        m.set_notifications(sample());
        m.select_row(7);
        m.set_query("build");
        assert_eq!(m.row_count(), 4);
        assert_eq!(m.cursor().index(), 3);
        m.set_query("nothing matches this");
        assert_eq!(m.row_count(), 0);
        assert_eq!(m.cursor().index(), 0);
        assert!(m.tree().is_none());
    }

    #[test]
    fn flat_view_uses_leaf_identifiers() {
        let mut m = InboxModel::new();
        m.view_mode = ViewMode::Compact;
        m.set_notifications(sample());
        assert!(m.tree().is_none());
        assert_eq!(m.row_count(), 2);
        // default sort is newest first
        assert_eq!(m.selected_identifier().as_deref(), Some("notif:2"));
        m.move_down();
        assert_eq!(m.selected_notification().map(|n| n.id), Some(1));
        m.set_notifications(vec![sample()[0].clone()]);
        assert_eq!(m.selected_identifier().as_deref(), Some("notif:1"));
    }

    #[test]
    fn criteria_filter_rows() {
        let mut m = InboxModel::new();
        m.set_notifications(sample());
        m.set_criteria(FilterCriteria {
            session: "$2".into(),
            ..Default::default()
        });
        assert_eq!(m.filtered().len(), 1);
        assert_eq!(m.tree().unwrap().root().children.len(), 1);
        m.set_criteria(FilterCriteria {
            read: Some(ReadFilter::Read),
            ..Default::default()
        });
        assert!(m.tree().is_none());
    }

    #[test]
    fn matcher_swap_refilters() {
        let mut m = InboxModel::new();
        m.set_notifications(sample());
        m.set_query("failed tests");
        assert_eq!(m.filtered().len(), 1);
        m.set_search_matcher(Box::new(SubstringMatcher::default()));
        assert!(m.filtered().is_empty());
    }

    #[test]
    fn counts_over_filtered_set() {
        let mut m = InboxModel::new();
        let mut input = sample();
        input[0].read_timestamp = "2024-01-02T00:00:00Z".into();
        input[1].level = Level::Error;
        m.set_notifications(input);
        assert_eq!(m.unread_count(), 1);
        assert_eq!(m.read_count(), 1);
        assert_eq!(m.level_counts().get(&Level::Error), Some(&1));
        assert_eq!(m.level_counts().get(&Level::Info), Some(&1));
    }

    struct Upper;

    impl NameResolver for Upper {
        fn resolve_session_name(&self, id: &str) -> String {
            format!("session {id}")
        }
        fn resolve_window_name(&self, _id: &str) -> String {
            String::new()
        }
        fn resolve_pane_name(&self, _id: &str) -> String {
            String::new()
        }
    }

    #[test]
    fn resolver_fills_display_only() {
        let mut m = InboxModel::new();
        m.set_notifications(sample());
        m.set_name_resolver(Box::new(Upper));
        let first = &m.tree().unwrap().root().children[0];
        assert_eq!(first.display, "session $1");
        assert_eq!(first.title, "$1");
        m.set_query("build");
        assert_eq!(m.tree().unwrap().root().children[0].display, "session $1");
    }
}
