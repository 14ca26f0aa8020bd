use std::collections::BTreeMap;

use intray_core::{Level, Notification};
use serde::Serialize;

// ── Kinds ──

/// Closed set of node kinds in the grouped view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    Root,
    Session,
    Window,
    Pane,
    Message,
    Notification,
}

impl NodeKind {
    pub fn as_str(self) -> &'static str {
        match self {
            NodeKind::Root => "root",
            NodeKind::Session => "session",
            NodeKind::Window => "window",
            NodeKind::Pane => "pane",
            NodeKind::Message => "message",
            NodeKind::Notification => "notification",
        }
    }

    /// Group nodes are everything except the root and notification leaves.
    pub fn is_group(self) -> bool {
        match self {
            NodeKind::Session | NodeKind::Window | NodeKind::Pane | NodeKind::Message => true,
            NodeKind::Root | NodeKind::Notification => false,
        }
    }

    /// Fixed structural depth used by the default-expansion policy,
    /// independent of which grouping produced the tree.
    pub fn structural_depth(self) -> Option<u8> {
        match self {
            NodeKind::Session => Some(0),
            NodeKind::Window => Some(1),
            NodeKind::Pane => Some(2),
            NodeKind::Message => Some(3),
            NodeKind::Root | NodeKind::Notification => None,
        }
    }
}

/// The tmux location a notification came from.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct NotificationSource {
    pub session: String,
    pub window: String,
    pub pane: String,
}

// ── Node ──

/// One node of the grouped notification tree.
///
/// Nodes are rebuilt wholesale on every reload or filter change. Nothing
/// outside the tree holds on to them; identity across rebuilds is the
/// content-derived identifier, see [`crate::NotificationTree::node_identifier`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TreeNode {
    pub kind: NodeKind,
    /// Raw grouping key (tmux id or message text).
    pub title: String,
    /// Human label, filled by name resolution.
    pub display: String,
    pub expanded: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<TreeNode>,
    /// Set only on `NodeKind::Notification` leaves.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notification: Option<Notification>,
    pub count: usize,
    pub unread_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latest_event: Option<Notification>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub earliest_event: Option<Notification>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub level_counts: BTreeMap<Level, usize>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub sources: BTreeMap<String, NotificationSource>,
}

impl TreeNode {
    pub(crate) fn group(kind: NodeKind, title: &str) -> Self {
        Self {
            kind,
            title: title.to_string(),
            display: title.to_string(),
            expanded: false,
            children: Vec::new(),
            notification: None,
            count: 0,
            unread_count: 0,
            latest_event: None,
            earliest_event: None,
            level_counts: BTreeMap::new(),
            sources: BTreeMap::new(),
        }
    }

    pub(crate) fn leaf(n: &Notification) -> Self {
        let mut node = Self::group(NodeKind::Notification, &n.message);
        node.notification = Some(n.clone());
        node
    }

    pub fn is_group(&self) -> bool {
        self.kind.is_group()
    }

    /// Fold one notification into this group's aggregates.
    pub(crate) fn record(&mut self, n: &Notification) {
        self.count += 1;
        if !n.is_read() {
            self.unread_count += 1;
        }
        *self.level_counts.entry(n.level).or_insert(0) += 1;

        if !n.timestamp.is_empty() {
            let newer = self
                .latest_event
                .as_ref()
                .map_or(true, |latest| n.timestamp > latest.timestamp);
            if newer {
                self.latest_event = Some(n.clone());
            }
            let older = self
                .earliest_event
                .as_ref()
                .map_or(true, |earliest| n.timestamp < earliest.timestamp);
            if older {
                self.earliest_event = Some(n.clone());
            }
        }

        if !(n.session.is_empty() && n.window.is_empty() && n.pane.is_empty()) {
            self.sources.insert(
                n.source_key(),
                NotificationSource {
                    session: n.session.clone(),
                    window: n.window.clone(),
                    pane: n.pane.clone(),
                },
            );
        }
    }

    /// Number of notification leaves in this subtree.
    pub fn leaf_count(&self) -> usize {
        match self.kind {
            NodeKind::Notification => 1,
            _ => self.children.iter().map(TreeNode::leaf_count).sum(),
        }
    }
}

// ── Addresses ──

/// Child-index path from the root to a node. Only meaningful for the tree it
/// was taken from; use identifiers to carry a position across rebuilds.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct NodeAddr(Vec<usize>);

impl NodeAddr {
    pub fn root() -> Self {
        Self(Vec::new())
    }

    pub fn child(&self, index: usize) -> Self {
        let mut path = self.0.clone();
        path.push(index);
        Self(path)
    }

    pub fn indices(&self) -> &[usize] {
        &self.0
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of edges below the root.
    pub fn depth(&self) -> usize {
        self.0.len()
    }

    /// True when `self` is `other` or one of its ancestors.
    pub fn contains(&self, other: &NodeAddr) -> bool {
        other.0.starts_with(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn notif(ts: &str, read: bool) -> Notification {
        Notification {
            id: 1,
            timestamp: ts.into(),
            session: "$1".into(),
            window: "@1".into(),
            pane: "%1".into(),
            message: "m".into(),
            read_timestamp: if read { "x".into() } else { String::new() },
            ..Default::default()
        }
    }

    #[test]
    fn record_tracks_time_range() {
        let mut g = TreeNode::group(NodeKind::Session, "$1");
        g.record(&notif("2024-01-02T00:00:00Z", false));
        g.record(&notif("", true));
        g.record(&notif("2024-01-01T00:00:00Z", false));
        g.record(&notif("2024-01-03T00:00:00Z", false));
        assert_eq!(g.count, 4);
        assert_eq!(g.unread_count, 3);
        assert_eq!(
            g.latest_event.as_ref().unwrap().timestamp,
            "2024-01-03T00:00:00Z"
        );
        assert_eq!(
            g.earliest_event.as_ref().unwrap().timestamp,
            "2024-01-01T00:00:00Z"
        );
        assert_eq!(g.level_counts.get(&Level::Info), Some(&4));
        assert_eq!(g.sources.len(), 1);
    }

    #[test]
    fn empty_timestamps_never_set_range() {
        let mut g = TreeNode::group(NodeKind::Pane, "%1");
        g.record(&notif("", false));
        assert!(g.latest_event.is_none());
        assert!(g.earliest_event.is_none());
    }

    #[test]
    fn source_skipped_without_location() {
        let mut g = TreeNode::group(NodeKind::Message, "m");
        let mut n = notif("t", false);
        n.session.clear();
        n.window.clear();
        n.pane.clear();
        g.record(&n);
        assert!(g.sources.is_empty());
    }

    #[test]
    fn addr_containment() {
        let a = NodeAddr::root().child(0);
        let b = a.child(2).child(1);
        assert!(a.contains(&b));
        assert!(a.contains(&a));
        assert!(!b.contains(&a));
        assert!(!NodeAddr::root().child(1).contains(&b));
        assert!(NodeAddr::root().contains(&b));
        assert_eq!(b.depth(), 3);
    }

    #[test]
    fn serializes_for_json_output() {
        let mut g = TreeNode::group(NodeKind::Pane, "%1");
        g.record(&notif("2024-01-01T00:00:00Z", false));
        g.children.push(TreeNode::leaf(&notif("2024-01-01T00:00:00Z", false)));
        let v = serde_json::to_value(&g).unwrap();
        assert_eq!(v["kind"], "pane");
        assert_eq!(v["level_counts"]["info"], 1);
        assert_eq!(v["children"][0]["kind"], "notification");
        assert!(v["children"][0].get("children").is_none());
        assert_eq!(v["sources"]["$1\u{0}@1\u{0}%1"]["pane"], "%1");
    }

    #[test]
    fn kind_depths() {
        assert_eq!(NodeKind::Session.structural_depth(), Some(0));
        assert_eq!(NodeKind::Message.structural_depth(), Some(3));
        assert_eq!(NodeKind::Root.structural_depth(), None);
        assert!(!NodeKind::Notification.is_group());
    }
}
