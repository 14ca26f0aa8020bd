//! Notification records kept one JSON object per line.
//!
//! Every mutation takes the sibling lock file, reads the whole file, edits
//! it in memory and writes it back atomically, so a crash mid-write leaves
//! the previous version intact.

use std::io::BufRead;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use intray_core::{Level, Notification, NotificationId, NotificationStore, State};
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

use crate::{lock_file, lock_path_for, write_atomic};

/// Fields supplied when recording a new notification.
#[derive(Debug, Clone, Default)]
pub struct NewNotification {
    pub message: String,
    pub session: String,
    pub window: String,
    pub pane: String,
    pub level: Level,
}

/// Current UTC time as RFC 3339 with whole seconds.
pub fn now_timestamp() -> anyhow::Result<String> {
    let now = OffsetDateTime::now_utc()
        .replace_nanosecond(0)
        .context("failed to truncate timestamp")?;
    now.format(&Rfc3339).context("failed to format timestamp")
}

pub struct JsonlNotificationStore {
    path: PathBuf,
}

impl JsonlNotificationStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read every record. A missing file is an empty store; malformed lines
    /// are skipped with a warning.
    pub fn read_all(&self) -> anyhow::Result<Vec<Notification>> {
        let file = match std::fs::File::open(&self.path) {
            Ok(f) => f,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(e).with_context(|| format!("cannot open {}", self.path.display()))
            }
        };
        let reader = std::io::BufReader::new(file);
        let mut records = Vec::new();
        for (i, line) in reader.lines().enumerate() {
            let line = line.with_context(|| format!("cannot read {}", self.path.display()))?;
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str::<Notification>(&line) {
                Ok(n) => records.push(n),
                Err(e) => tracing::warn!(
                    path = %self.path.display(),
                    line = i + 1,
                    error = %e,
                    "skipping malformed notification record"
                ),
            }
        }
        Ok(records)
    }

    fn write_all(&self, records: &[Notification]) -> anyhow::Result<()> {
        let mut out = String::new();
        for n in records {
            out.push_str(&serde_json::to_string(n)?);
            out.push('\n');
        }
        write_atomic(&self.path, out.as_bytes())
            .with_context(|| format!("cannot write {}", self.path.display()))
    }

    /// Locked read-modify-write.
    fn modify<T>(
        &self,
        f: impl FnOnce(&mut Vec<Notification>) -> anyhow::Result<T>,
    ) -> anyhow::Result<T> {
        let _lock = lock_file(&lock_path_for(&self.path))?;
        let mut records = self.read_all()?;
        let result = f(&mut records)?;
        self.write_all(&records)?;
        Ok(result)
    }

    fn update(&self, id: NotificationId, f: impl FnOnce(&mut Notification)) -> anyhow::Result<()> {
        self.modify(|records| match records.iter_mut().find(|n| n.id == id) {
            Some(n) => {
                f(n);
                Ok(())
            }
            None => bail!("notification {id} not found"),
        })
    }

    /// Append a new active, unread notification with the next free id.
    pub fn add(&self, new: NewNotification) -> anyhow::Result<Notification> {
        let timestamp = now_timestamp()?;
        let added = self.modify(|records| {
            let id = records.iter().map(|n| n.id).max().unwrap_or(0) + 1;
            let n = Notification {
                id,
                timestamp,
                session: new.session,
                window: new.window,
                pane: new.pane,
                message: new.message,
                level: new.level,
                state: State::Active,
                read_timestamp: String::new(),
            };
            records.push(n.clone());
            Ok(n)
        })?;
        tracing::debug!(id = added.id, "notification added");
        Ok(added)
    }
}

impl NotificationStore for JsonlNotificationStore {
    fn list(&self, state: Option<State>) -> anyhow::Result<Vec<Notification>> {
        let mut records = self.read_all()?;
        if let Some(state) = state {
            records.retain(|n| n.state == state);
        }
        Ok(records)
    }

    fn mark_read(&self, id: NotificationId) -> anyhow::Result<()> {
        let now = now_timestamp()?;
        self.update(id, |n| n.read_timestamp = now)
    }

    fn mark_unread(&self, id: NotificationId) -> anyhow::Result<()> {
        self.update(id, |n| n.read_timestamp.clear())
    }

    fn dismiss(&self, id: NotificationId) -> anyhow::Result<()> {
        self.update(id, |n| n.state = State::Dismissed)
    }

    fn dismiss_by_filter(&self, session: &str, window: &str, pane: &str) -> anyhow::Result<usize> {
        let count = self.modify(|records| {
            let mut count = 0;
            for n in records.iter_mut().filter(|n| n.state == State::Active) {
                let hit = (session.is_empty() || n.session == session)
                    && (window.is_empty() || n.window == window)
                    && (pane.is_empty() || n.pane == pane);
                if hit {
                    n.state = State::Dismissed;
                    count += 1;
                }
            }
            Ok(count)
        })?;
        tracing::debug!(session, window, pane, count, "dismissed by filter");
        Ok(count)
    }
}
