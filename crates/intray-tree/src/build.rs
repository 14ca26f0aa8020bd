use std::collections::HashMap;

use intray_core::{GroupBy, Notification};

use crate::node::{NodeKind, TreeNode};

/// Group notifications into a tree.
///
/// Returns `None` for an empty input; callers treat that as "no tree" rather
/// than rendering a bare root. Identical session/window/pane/message tuples
/// always land in the same group node regardless of input order.
pub fn build_tree(notifications: &[Notification], group_by: GroupBy) -> Option<TreeNode> {
    if notifications.is_empty() {
        return None;
    }

    let mut root = TreeNode::group(NodeKind::Root, "root");
    root.expanded = true;

    // composite path key -> index of the group within its parent
    let mut index: HashMap<String, usize> = HashMap::new();
    let depth = group_by.structural_depth();

    for n in notifications {
        root.record(n);

        let mut levels: Vec<(NodeKind, &str)> = [
            (NodeKind::Session, n.session.as_str()),
            (NodeKind::Window, n.window.as_str()),
            (NodeKind::Pane, n.pane.as_str()),
        ]
        .into_iter()
        .take(depth)
        .collect();
        if group_by.groups_messages() {
            levels.push((NodeKind::Message, n.message.as_str()));
        }

        let mut key = String::new();
        let mut current = &mut root;
        for (kind, title) in levels {
            key.push_str(kind.as_str());
            key.push('\u{0}');
            key.push_str(title);
            key.push('\u{0}');

            let idx = match index.get(&key) {
                Some(&idx) => idx,
                None => {
                    current.children.push(TreeNode::group(kind, title));
                    let idx = current.children.len() - 1;
                    index.insert(key.clone(), idx);
                    idx
                }
            };
            current = &mut current.children[idx];
            current.record(n);
        }
        current.children.push(TreeNode::leaf(n));
    }

    sort_children(&mut root);
    tracing::debug!(
        notifications = notifications.len(),
        groups = index.len(),
        group_by = %group_by,
        "built notification tree"
    );
    Some(root)
}

/// Case-insensitive title order at every level; ties keep insertion order.
fn sort_children(node: &mut TreeNode) {
    node.children
        .sort_by_cached_key(|child| child.title.to_lowercase());
    for child in &mut node.children {
        sort_children(child);
    }
}

/// Drop group nodes left without children; leaves are always kept.
pub fn prune_empty_groups(node: &mut TreeNode) {
    for child in &mut node.children {
        prune_empty_groups(child);
    }
    node.children
        .retain(|child| child.kind == NodeKind::Notification || !child.children.is_empty());
}
