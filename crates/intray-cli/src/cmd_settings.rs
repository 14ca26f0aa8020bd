use clap::Subcommand;
use intray_inbox::InboxModel;
use intray_store::{JsonSettingsStore, JsonlNotificationStore};

use crate::Paths;

// ── CLI Schema ──

#[derive(Subcommand)]
pub enum SettingsCmd {
    /// Print the effective settings as JSON
    Show,
    /// Set the tree grouping (none, session, window, pane, message, pane_message)
    SetGroupBy { value: String },
    /// Set the default expand level (0-3) and re-fold the current tree
    SetExpandLevel { level: i64 },
    /// Set the view mode (compact, detailed, grouped)
    SetViewMode { value: String },
}

// ── Dispatch ──

pub fn run(cmd: SettingsCmd, paths: &Paths) -> anyhow::Result<()> {
    match cmd {
        SettingsCmd::Show => show(paths),
        SettingsCmd::SetGroupBy { value } => set_group_by(paths, &value),
        SettingsCmd::SetExpandLevel { level } => set_expand_level(paths, level),
        SettingsCmd::SetViewMode { value } => set_view_mode(paths, &value),
    }
}

// ── Command Implementations ──

fn show(paths: &Paths) -> anyhow::Result<()> {
    let store = JsonSettingsStore::new(&paths.settings);
    let model = InboxModel::load_settings(&store)?;
    println!("{}", serde_json::to_string_pretty(&model.to_settings())?);
    Ok(())
}

fn set_group_by(paths: &Paths, value: &str) -> anyhow::Result<()> {
    let store = JsonSettingsStore::new(&paths.settings);
    let mut model = InboxModel::load_settings(&store)?;
    model.set_group_by(value)?;
    model.save_settings(&store)?;
    println!("groupBy = {}", model.group_by());
    Ok(())
}

/// Folding decisions are per group, so the new level is applied against the
/// current notifications and the resulting expansion state is saved with it.
fn set_expand_level(paths: &Paths, level: i64) -> anyhow::Result<()> {
    let store = JsonSettingsStore::new(&paths.settings);
    let mut model = InboxModel::load_settings(&store)?;
    model.set_expand_level(level)?;
    let notifications = JsonlNotificationStore::new(&paths.store);
    if model.reload(&notifications).is_ok() {
        model.apply_default_expansion();
    }
    model.save_settings(&store)?;
    println!("defaultExpandLevel = {}", model.expand_level());
    Ok(())
}

fn set_view_mode(paths: &Paths, value: &str) -> anyhow::Result<()> {
    let store = JsonSettingsStore::new(&paths.settings);
    let mut model = InboxModel::load_settings(&store)?;
    model.set_view_mode(value)?;
    model.save_settings(&store)?;
    println!("viewMode = {}", model.view_mode().as_str());
    Ok(())
}
