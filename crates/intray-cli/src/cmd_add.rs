use anyhow::Context;
use intray_core::Level;
use intray_store::{JsonlNotificationStore, NewNotification};

use crate::Paths;

pub fn execute(
    paths: &Paths,
    message: String,
    session: String,
    window: String,
    pane: String,
    level: &str,
) -> anyhow::Result<()> {
    let level: Level = level.parse()?;
    let store = JsonlNotificationStore::new(&paths.store);
    let added = store
        .add(NewNotification {
            message,
            session,
            window,
            pane,
            level,
        })
        .context("failed to record notification")?;
    println!("Added notification {}", added.id);
    Ok(())
}
