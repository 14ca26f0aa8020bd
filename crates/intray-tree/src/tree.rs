use std::cell::OnceCell;

use intray_core::{GroupBy, Notification, NotificationId};

use crate::build::{build_tree, prune_empty_groups};
use crate::expansion::{escape_segment, ExpansionState, NodeKeys};
use crate::node::{NodeAddr, NodeKind, TreeNode};

/// Identifier of the root node.
pub const ROOT_IDENTIFIER: &str = "root";
/// Prefix of a notification leaf's identifier.
pub const LEAF_PREFIX: &str = "notif:";

/// Leaf identifier for a notification id.
pub fn leaf_identifier(id: NotificationId) -> String {
    format!("{LEAF_PREFIX}{id}")
}

/// The grouped tree plus its memoized visible-node list.
///
/// Every `&mut self` method that can change structure or fold flags drops the
/// memo, so [`NotificationTree::visible_nodes`] always matches the current
/// tree without callers having to invalidate anything themselves.
#[derive(Debug, Clone)]
pub struct NotificationTree {
    pub(crate) root: TreeNode,
    group_by: GroupBy,
    visible: OnceCell<Vec<NodeAddr>>,
}

impl NotificationTree {
    /// Build a tree; `None` when there is nothing to group.
    pub fn build(notifications: &[Notification], group_by: GroupBy) -> Option<Self> {
        build_tree(notifications, group_by).map(|root| Self::from_root(root, group_by))
    }

    pub fn from_root(root: TreeNode, group_by: GroupBy) -> Self {
        Self {
            root,
            group_by,
            visible: OnceCell::new(),
        }
    }

    pub fn root(&self) -> &TreeNode {
        &self.root
    }

    pub fn group_by(&self) -> GroupBy {
        self.group_by
    }

    pub fn node(&self, addr: &NodeAddr) -> Option<&TreeNode> {
        let mut node = &self.root;
        for &i in addr.indices() {
            node = node.children.get(i)?;
        }
        Some(node)
    }

    pub(crate) fn node_mut(&mut self, addr: &NodeAddr) -> Option<&mut TreeNode> {
        let mut node = &mut self.root;
        for &i in addr.indices() {
            node = node.children.get_mut(i)?;
        }
        Some(node)
    }

    /// Nodes from the root down to `addr`, root excluded.
    fn chain(&self, addr: &NodeAddr) -> Option<Vec<&TreeNode>> {
        let mut out = Vec::with_capacity(addr.depth());
        let mut node = &self.root;
        for &i in addr.indices() {
            node = node.children.get(i)?;
            out.push(node);
        }
        Some(out)
    }

    // ── Visible-node cache ──

    /// Flattened list of rows currently on screen, in render order.
    pub fn visible_nodes(&self) -> &[NodeAddr] {
        self.visible.get_or_init(|| {
            let mut out = Vec::new();
            collect_visible(&self.root, &NodeAddr::root(), &mut out);
            tracing::debug!(rows = out.len(), "rebuilt visible node list");
            out
        })
    }

    pub fn visible_len(&self) -> usize {
        self.visible_nodes().len()
    }

    pub fn visible_at(&self, index: usize) -> Option<(&NodeAddr, &TreeNode)> {
        let addr = self.visible_nodes().get(index)?;
        Some((addr, self.node(addr)?))
    }

    pub fn iter_visible(&self) -> impl Iterator<Item = (&NodeAddr, &TreeNode)> {
        self.visible_nodes()
            .iter()
            .filter_map(move |addr| Some((addr, self.node(addr)?)))
    }

    pub fn invalidate_cache(&mut self) {
        self.visible.take();
    }

    pub fn is_cache_valid(&self) -> bool {
        self.visible.get().is_some()
    }

    // ── Mutators ──

    pub fn prune_empty_groups(&mut self) {
        prune_empty_groups(&mut self.root);
        self.invalidate_cache();
    }

    /// Restore fold flags from persisted state. Groups with no stored entry
    /// start expanded; legacy entries are migrated as they are found.
    pub fn apply_expansion_state(&mut self, state: &mut ExpansionState) {
        let mut groups = 0usize;
        for_each_group_mut(
            &mut self.root,
            &mut Vec::new(),
            &mut |node: &mut TreeNode, segments: &[String]| {
                groups += 1;
                node.expanded = match NodeKeys::for_group(node.kind, segments) {
                    Some(keys) => state.lookup(&keys).unwrap_or(true),
                    None => true,
                };
            },
        );
        tracing::debug!(groups, entries = state.len(), "applied expansion state");
        self.invalidate_cache();
    }

    /// Set one group's fold flag. Returns false when `addr` is not a group.
    pub fn set_expanded(&mut self, addr: &NodeAddr, expanded: bool) -> bool {
        let changed = match self.node_mut(addr) {
            Some(node) if node.is_group() => {
                node.expanded = expanded;
                true
            }
            _ => false,
        };
        if changed {
            self.invalidate_cache();
        }
        changed
    }

    pub fn expand_node(&mut self, addr: &NodeAddr) -> bool {
        self.set_expanded(addr, true)
    }

    pub fn collapse_node(&mut self, addr: &NodeAddr) -> bool {
        self.set_expanded(addr, false)
    }

    /// Flip one group's fold flag; returns the new value.
    pub fn toggle_node(&mut self, addr: &NodeAddr) -> Option<bool> {
        let expanded = !self.node(addr).filter(|n| n.is_group())?.expanded;
        self.set_expanded(addr, expanded);
        Some(expanded)
    }

    // ── Identity ──

    /// Indentation level of a row: depth below the root, top-level rows are 0.
    pub fn tree_level(&self, addr: &NodeAddr) -> usize {
        addr.depth().saturating_sub(1)
    }

    /// Expansion keys for a group node.
    pub fn node_keys(&self, addr: &NodeAddr) -> Option<NodeKeys> {
        let chain = self.chain(addr)?;
        let node = chain.last()?;
        if !node.is_group() {
            return None;
        }
        let segments: Vec<String> = chain
            .iter()
            .filter(|n| n.is_group())
            .map(|n| n.title.clone())
            .collect();
        NodeKeys::for_group(node.kind, &segments)
    }

    /// Stable identifier: `root`, `notif:<id>` for leaves, the escaped
    /// expansion key for groups. Survives rebuilds from the same input.
    pub fn node_identifier(&self, addr: &NodeAddr) -> Option<String> {
        let node = self.node(addr)?;
        match node.kind {
            NodeKind::Root => Some(ROOT_IDENTIFIER.to_string()),
            NodeKind::Notification => node.notification.as_ref().map(|n| leaf_identifier(n.id)),
            NodeKind::Session | NodeKind::Window | NodeKind::Pane | NodeKind::Message => {
                self.node_keys(addr).map(|keys| keys.key)
            }
        }
    }

    /// Top-down lookup of a node by identifier.
    pub fn find_by_identifier(&self, identifier: &str) -> Option<NodeAddr> {
        if identifier == ROOT_IDENTIFIER {
            return Some(NodeAddr::root());
        }
        if let Some(id) = identifier.strip_prefix(LEAF_PREFIX) {
            let id: NotificationId = id.parse().ok()?;
            return find_leaf(&self.root, &NodeAddr::root(), &|n| n.id == id);
        }

        // group keys are `<kind>:<escaped>:<escaped>…`; escaped segments never contain ':'
        let mut parts = identifier.split(':');
        let kind = parts.next()?;
        let segments: Vec<&str> = parts.collect();
        if segments.is_empty() {
            return None;
        }
        let mut node = &self.root;
        let mut addr = NodeAddr::root();
        for segment in segments {
            let (i, child) = node
                .children
                .iter()
                .enumerate()
                .find(|(_, c)| c.is_group() && escape_segment(&c.title) == segment)?;
            node = child;
            addr = addr.child(i);
        }
        (node.kind.as_str() == kind).then_some(addr)
    }

    /// Row index of the visible node with this identifier.
    pub fn visible_index_of(&self, identifier: &str) -> Option<usize> {
        let target = self.find_by_identifier(identifier)?;
        self.visible_nodes().iter().position(|addr| *addr == target)
    }

    /// Leaf holding `target`, matched by id, else by content tuple.
    pub fn find_notification_path(&self, target: &Notification) -> Option<NodeAddr> {
        find_leaf(&self.root, &NodeAddr::root(), &|n| n.id == target.id).or_else(|| {
            find_leaf(&self.root, &NodeAddr::root(), &|n| {
                n.timestamp == target.timestamp
                    && n.message == target.message
                    && n.session == target.session
                    && n.window == target.window
                    && n.pane == target.pane
            })
        })
    }

    /// Dismissal scope of a session, window or pane group.
    ///
    /// `None` for other kinds, and for paths with an empty id, since an empty
    /// filter value would widen the scope to "any".
    pub fn group_scope(&self, addr: &NodeAddr) -> Option<GroupScope> {
        let chain = self.chain(addr)?;
        let node = *chain.last()?;
        if !matches!(node.kind, NodeKind::Session | NodeKind::Window | NodeKind::Pane) {
            return None;
        }
        let mut scope = GroupScope {
            count: node.count,
            ..GroupScope::default()
        };
        for n in &chain {
            let slot = match n.kind {
                NodeKind::Session => &mut scope.session,
                NodeKind::Window => &mut scope.window,
                NodeKind::Pane => &mut scope.pane,
                NodeKind::Root | NodeKind::Message | NodeKind::Notification => continue,
            };
            if n.title.is_empty() {
                return None;
            }
            *slot = n.title.clone();
        }
        Some(scope)
    }
}

/// Session/window/pane filter covering one group. Empty fields mean "any".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupScope {
    pub session: String,
    pub window: String,
    pub pane: String,
    pub count: usize,
}

fn collect_visible(node: &TreeNode, addr: &NodeAddr, out: &mut Vec<NodeAddr>) {
    for (i, child) in node.children.iter().enumerate() {
        let child_addr = addr.child(i);
        out.push(child_addr.clone());
        if child.is_group() && child.expanded {
            collect_visible(child, &child_addr, out);
        }
    }
}

fn find_leaf(
    node: &TreeNode,
    addr: &NodeAddr,
    pred: &dyn Fn(&Notification) -> bool,
) -> Option<NodeAddr> {
    for (i, child) in node.children.iter().enumerate() {
        let child_addr = addr.child(i);
        match (&child.kind, &child.notification) {
            (NodeKind::Notification, Some(n)) if pred(n) => return Some(child_addr),
            (NodeKind::Notification, _) => {}
            _ => {
                if let Some(found) = find_leaf(child, &child_addr, pred) {
                    return Some(found);
                }
            }
        }
    }
    None
}

/// Pre-order walk over group nodes, handing each its title path.
pub(crate) fn for_each_group_mut(
    node: &mut TreeNode,
    segments: &mut Vec<String>,
    f: &mut dyn FnMut(&mut TreeNode, &[String]),
) {
    for child in &mut node.children {
        if !child.is_group() {
            continue;
        }
        segments.push(child.title.clone());
        f(child, &segments[..]);
        for_each_group_mut(child, segments, f);
        segments.pop();
    }
}
