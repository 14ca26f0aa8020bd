use intray_core::Notification;
use intray_inbox::{InboxModel, Row};
use intray_store::{JsonSettingsStore, JsonlNotificationStore};

use crate::Paths;

pub struct ListOptions {
    pub query: Option<String>,
    pub level: Option<String>,
    pub read: Option<String>,
    pub state: Option<String>,
    pub json: bool,
}

pub fn execute(paths: &Paths, opts: &ListOptions) -> anyhow::Result<()> {
    let settings = JsonSettingsStore::new(&paths.settings);
    let store = JsonlNotificationStore::new(&paths.store);

    let mut model = InboxModel::load_settings(&settings)?;
    model.set_view_mode("detailed")?;
    if let Some(level) = &opts.level {
        model.set_level_filter(level)?;
    }
    if let Some(read) = &opts.read {
        model.set_read_filter(read)?;
    }
    if let Some(state) = &opts.state {
        model.set_state_filter(state)?;
    }
    if let Some(query) = &opts.query {
        model.set_query(query);
    }
    model.reload(&store)?;

    if opts.json {
        println!("{}", serde_json::to_string_pretty(model.filtered())?);
        return Ok(());
    }

    if model.filtered().is_empty() {
        println!("No notifications match the filter.");
        return Ok(());
    }
    for row in model.rows() {
        if let Row::Notification(n) = row {
            println!("{}", format_line(n));
        }
    }
    let levels = model
        .level_counts()
        .iter()
        .map(|(level, count)| format!("{level}: {count}"))
        .collect::<Vec<_>>()
        .join(", ");
    println!(
        "\n({} shown, {} unread, {} read; {levels})",
        model.filtered().len(),
        model.unread_count(),
        model.read_count()
    );
    Ok(())
}

fn format_line(n: &Notification) -> String {
    let marker = if n.is_read() { ' ' } else { '*' };
    format!(
        "{:>4} {marker} {:<7} {:<20} {}:{}.{}  {}",
        n.id, n.level, n.timestamp, n.session, n.window, n.pane, n.message
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_shows_source_and_marker() {
        let n = Notification {
            id: 7,
            timestamp: "2024-05-01T09:00:00Z".into(),
            session: "$1".into(),
            window: "@2".into(),
            pane: "%3".into(),
            message: "tests passed".into(),
            ..Default::default()
        };
        assert_eq!(
            format_line(&n),
            "   7 * info    2024-05-01T09:00:00Z $1:@2.%3  tests passed"
        );
    }
}
