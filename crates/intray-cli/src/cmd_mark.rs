use anyhow::bail;
use intray_core::NotificationStore;
use intray_store::JsonlNotificationStore;

use crate::Paths;

/// Session/window/pane scope for bulk dismissal. Empty fields match anything.
#[derive(Debug, Default)]
pub struct Scope {
    pub session: String,
    pub window: String,
    pub pane: String,
}

impl Scope {
    fn is_empty(&self) -> bool {
        self.session.is_empty() && self.window.is_empty() && self.pane.is_empty()
    }
}

pub fn mark_read(paths: &Paths, ids: &[u64]) -> anyhow::Result<()> {
    let store = JsonlNotificationStore::new(&paths.store);
    for &id in ids {
        store.mark_read(id)?;
        println!("Marked {id} as read");
    }
    Ok(())
}

pub fn mark_unread(paths: &Paths, ids: &[u64]) -> anyhow::Result<()> {
    let store = JsonlNotificationStore::new(&paths.store);
    for &id in ids {
        store.mark_unread(id)?;
        println!("Marked {id} as unread");
    }
    Ok(())
}

pub fn dismiss(paths: &Paths, ids: &[u64], scope: &Scope) -> anyhow::Result<()> {
    if ids.is_empty() && scope.is_empty() {
        bail!("nothing to dismiss: pass notification ids or a --session/--window/--pane scope");
    }
    let store = JsonlNotificationStore::new(&paths.store);
    for &id in ids {
        store.dismiss(id)?;
        println!("Dismissed {id}");
    }
    if !scope.is_empty() {
        let count = store.dismiss_by_filter(&scope.session, &scope.window, &scope.pane)?;
        println!("Dismissed {count} notification(s)");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use intray_core::State;
    use intray_store::NewNotification;

    fn setup() -> (tempfile::TempDir, Paths) {
        let tmp = tempfile::tempdir().unwrap();
        let paths = Paths {
            store: tmp.path().join("notifications.jsonl"),
            settings: tmp.path().join("settings.json"),
        };
        let store = JsonlNotificationStore::new(&paths.store);
        for (session, pane) in [("$1", "%1"), ("$1", "%2"), ("$2", "%3")] {
            store
                .add(NewNotification {
                    message: "hi".into(),
                    session: session.into(),
                    window: "@1".into(),
                    pane: pane.into(),
                    ..Default::default()
                })
                .unwrap();
        }
        (tmp, paths)
    }

    #[test]
    fn mark_read_then_unread() {
        let (_tmp, paths) = setup();
        mark_read(&paths, &[1, 2]).unwrap();
        let store = JsonlNotificationStore::new(&paths.store);
        let read: Vec<u64> = store
            .list(None)
            .unwrap()
            .into_iter()
            .filter(|n| n.is_read())
            .map(|n| n.id)
            .collect();
        assert_eq!(read, vec![1, 2]);
        mark_unread(&paths, &[1]).unwrap();
        assert!(!store.list(None).unwrap()[0].is_read());
    }

    #[test]
    fn dismiss_requires_target() {
        let (_tmp, paths) = setup();
        assert!(dismiss(&paths, &[], &Scope::default()).is_err());
    }

    #[test]
    fn dismiss_by_scope() {
        let (_tmp, paths) = setup();
        let scope = Scope {
            session: "$1".into(),
            ..Default::default()
        };
        dismiss(&paths, &[3], &scope).unwrap();
        let store = JsonlNotificationStore::new(&paths.store);
        assert!(store.list(Some(State::Active)).unwrap().is_empty());
    }

    #[test]
    fn unknown_id_fails() {
        let (_tmp, paths) = setup();
        assert!(mark_read(&paths, &[99]).is_err());
    }
}
