use intray_core::Notification;
use intray_inbox::{InboxModel, Row};
use intray_store::{JsonSettingsStore, JsonlNotificationStore};
use intray_tree::TreeNode;

use crate::Paths;

pub struct TreeOptions {
    pub group_by: Option<String>,
    pub expand_level: Option<i64>,
    pub expand_all: bool,
    pub query: Option<String>,
    pub json: bool,
}

pub fn execute(paths: &Paths, opts: &TreeOptions) -> anyhow::Result<()> {
    let settings = JsonSettingsStore::new(&paths.settings);
    let store = JsonlNotificationStore::new(&paths.store);

    let mut model = InboxModel::load_settings(&settings)?;
    model.set_view_mode("grouped")?;
    if let Some(group_by) = &opts.group_by {
        model.set_group_by(group_by)?;
    }
    if let Some(query) = &opts.query {
        model.set_query(query);
    }
    model.reload(&store)?;

    if let Some(level) = opts.expand_level {
        model.set_expand_level(level)?;
        model.apply_default_expansion();
    } else if opts.expand_all {
        model.expand_all();
    }

    if opts.json {
        match model.tree() {
            Some(tree) => println!("{}", serde_json::to_string_pretty(tree.root())?),
            None => println!("null"),
        }
        return Ok(());
    }

    let lines = render(&model);
    if lines.is_empty() {
        println!("No notifications.");
    } else {
        for line in lines {
            println!("{line}");
        }
        println!(
            "\n({} shown, {} unread)",
            model.filtered().len(),
            model.unread_count()
        );
    }
    Ok(())
}

// ── Rendering ──

fn group_label(node: &TreeNode) -> &str {
    if node.display.is_empty() {
        &node.title
    } else {
        &node.display
    }
}

fn read_marker(n: &Notification) -> char {
    if n.is_read() {
        ' '
    } else {
        '*'
    }
}

fn leaf_line(n: &Notification) -> String {
    format!("{} [{}] #{} {}", read_marker(n), n.level, n.id, n.message)
}

/// One text line per visible row, indented two spaces per tree level.
pub(crate) fn render(model: &InboxModel) -> Vec<String> {
    model
        .rows()
        .into_iter()
        .map(|row| match row {
            Row::Node { node, level, .. } => {
                let indent = "  ".repeat(level);
                if node.is_group() {
                    let marker = if node.expanded { 'v' } else { '>' };
                    format!(
                        "{indent}{marker} {} ({}/{})",
                        group_label(node),
                        node.unread_count,
                        node.count
                    )
                } else if let Some(n) = &node.notification {
                    format!("{indent}{}", leaf_line(n))
                } else {
                    format!("{indent}{}", node.title)
                }
            }
            Row::Notification(n) => leaf_line(n),
        })
        .collect()
}
