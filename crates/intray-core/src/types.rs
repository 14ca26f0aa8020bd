use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Notification ID assigned by the store; unique and stable across reloads.
pub type NotificationId = u64;

/// Lowest and highest accepted default expand level.
pub const MIN_EXPAND_LEVEL: u8 = 0;
pub const MAX_EXPAND_LEVEL: u8 = 3;

/// Default column order for table display.
pub const DEFAULT_COLUMNS: &[&str] = &[
    "id",
    "timestamp",
    "state",
    "level",
    "session",
    "window",
    "pane",
    "message",
];

// ── Level / State ──

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Level {
    #[default]
    Info,
    Warning,
    Error,
}

impl Level {
    pub fn as_str(self) -> &'static str {
        match self {
            Level::Info => "info",
            Level::Warning => "warning",
            Level::Error => "error",
        }
    }
}

impl FromStr for Level {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "info" => Ok(Level::Info),
            "warning" => Ok(Level::Warning),
            "error" => Ok(Level::Error),
            other => Err(ValidationError::InvalidLevel(other.to_string())),
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum State {
    #[default]
    Active,
    Dismissed,
}

impl State {
    pub fn as_str(self) -> &'static str {
        match self {
            State::Active => "active",
            State::Dismissed => "dismissed",
        }
    }
}

impl FromStr for State {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(State::Active),
            "dismissed" => Ok(State::Dismissed),
            other => Err(ValidationError::InvalidState(other.to_string())),
        }
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

// ── Notification ──

/// A single notification record as returned by the store.
///
/// Records are treated as immutable snapshots: read/dismiss changes happen in
/// the store and are observed by re-fetching, never by patching in place.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub id: NotificationId,
    /// ISO-8601 timestamp; lexicographic order equals chronological order.
    #[serde(default)]
    pub timestamp: String,
    #[serde(default)]
    pub session: String,
    #[serde(default)]
    pub window: String,
    #[serde(default)]
    pub pane: String,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub level: Level,
    #[serde(default)]
    pub state: State,
    /// Empty means unread.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub read_timestamp: String,
}

impl Notification {
    pub fn is_read(&self) -> bool {
        !self.read_timestamp.is_empty()
    }

    /// Composite `session/window/pane` key used for source bookkeeping.
    pub fn source_key(&self) -> String {
        format!("{}\u{0}{}\u{0}{}", self.session, self.window, self.pane)
    }
}

// ── GroupBy ──

/// Hierarchy selector for the grouped view.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum GroupBy {
    None,
    Session,
    Window,
    #[default]
    Pane,
    Message,
    PaneMessage,
}

impl GroupBy {
    pub const ALL: [GroupBy; 6] = [
        GroupBy::None,
        GroupBy::Session,
        GroupBy::Window,
        GroupBy::Pane,
        GroupBy::Message,
        GroupBy::PaneMessage,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            GroupBy::None => "none",
            GroupBy::Session => "session",
            GroupBy::Window => "window",
            GroupBy::Pane => "pane",
            GroupBy::Message => "message",
            GroupBy::PaneMessage => "pane_message",
        }
    }

    /// Number of structural levels (session/window/pane) below the root.
    pub fn structural_depth(self) -> usize {
        match self {
            GroupBy::None | GroupBy::Message => 0,
            GroupBy::Session => 1,
            GroupBy::Window => 2,
            GroupBy::Pane | GroupBy::PaneMessage => 3,
        }
    }

    /// Whether a message-text grouping level sits under the deepest structural level.
    pub fn groups_messages(self) -> bool {
        matches!(self, GroupBy::Message | GroupBy::PaneMessage)
    }
}

impl FromStr for GroupBy {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        GroupBy::ALL
            .into_iter()
            .find(|g| g.as_str() == s)
            .ok_or_else(|| ValidationError::InvalidGroupBy(s.to_string()))
    }
}

impl fmt::Display for GroupBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

// ── ViewMode ──

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ViewMode {
    Compact,
    Detailed,
    #[default]
    Grouped,
}

impl ViewMode {
    pub fn as_str(self) -> &'static str {
        match self {
            ViewMode::Compact => "compact",
            ViewMode::Detailed => "detailed",
            ViewMode::Grouped => "grouped",
        }
    }

    pub fn next(self) -> Self {
        match self {
            ViewMode::Compact => ViewMode::Detailed,
            ViewMode::Detailed => ViewMode::Grouped,
            ViewMode::Grouped => ViewMode::Compact,
        }
    }
}

impl FromStr for ViewMode {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "compact" => Ok(ViewMode::Compact),
            "detailed" => Ok(ViewMode::Detailed),
            "grouped" => Ok(ViewMode::Grouped),
            other => Err(ValidationError::InvalidViewMode(other.to_string())),
        }
    }
}

// ── Sorting ──

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortField {
    Id,
    #[default]
    Timestamp,
    State,
    Level,
    Session,
    Message,
    ReadStatus,
}

impl SortField {
    pub fn as_str(self) -> &'static str {
        match self {
            SortField::Id => "id",
            SortField::Timestamp => "timestamp",
            SortField::State => "state",
            SortField::Level => "level",
            SortField::Session => "session",
            SortField::Message => "message",
            SortField::ReadStatus => "read_status",
        }
    }
}

impl FromStr for SortField {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "id" => Ok(SortField::Id),
            "timestamp" => Ok(SortField::Timestamp),
            "state" => Ok(SortField::State),
            "level" => Ok(SortField::Level),
            "session" => Ok(SortField::Session),
            "message" => Ok(SortField::Message),
            "read_status" => Ok(SortField::ReadStatus),
            other => Err(ValidationError::InvalidSortField(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    pub fn as_str(self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }
}

impl FromStr for SortOrder {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "asc" => Ok(SortOrder::Asc),
            "desc" => Ok(SortOrder::Desc),
            other => Err(ValidationError::InvalidSortOrder(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SortOptions {
    pub field: SortField,
    pub order: SortOrder,
}

// ── Read filter ──

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadFilter {
    Read,
    Unread,
}

impl ReadFilter {
    pub fn as_str(self) -> &'static str {
        match self {
            ReadFilter::Read => "read",
            ReadFilter::Unread => "unread",
        }
    }

    pub fn matches(self, n: &Notification) -> bool {
        match self {
            ReadFilter::Read => n.is_read(),
            ReadFilter::Unread => !n.is_read(),
        }
    }
}

impl FromStr for ReadFilter {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "read" => Ok(ReadFilter::Read),
            "unread" => Ok(ReadFilter::Unread),
            other => Err(ValidationError::InvalidReadFilter(other.to_string())),
        }
    }
}

/// Structural filter criteria. `None` / empty strings are no-ops.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterCriteria {
    pub state: Option<State>,
    pub level: Option<Level>,
    pub session: String,
    pub window: String,
    pub pane: String,
    pub read: Option<ReadFilter>,
}

impl FilterCriteria {
    pub fn is_empty(&self) -> bool {
        self.state.is_none()
            && self.level.is_none()
            && self.session.is_empty()
            && self.window.is_empty()
            && self.pane.is_empty()
            && self.read.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn group_by_parse_and_fallback() {
        assert_eq!("window".parse::<GroupBy>().unwrap(), GroupBy::Window);
        assert_eq!(
            "pane_message".parse::<GroupBy>().unwrap(),
            GroupBy::PaneMessage
        );
        assert!("bogus".parse::<GroupBy>().is_err());
    }

    #[test]
    fn group_by_depths() {
        assert_eq!(GroupBy::None.structural_depth(), 0);
        assert_eq!(GroupBy::Window.structural_depth(), 2);
        assert_eq!(GroupBy::PaneMessage.structural_depth(), 3);
        assert!(GroupBy::Message.groups_messages());
        assert!(!GroupBy::Pane.groups_messages());
    }

    #[test]
    fn notification_read_flag() {
        let mut n = Notification::default();
        assert!(!n.is_read());
        n.read_timestamp = "2024-01-01T00:00:00Z".into();
        assert!(n.is_read());
    }

    #[test]
    fn notification_deserializes_with_defaults() {
        let n: Notification =
            serde_json::from_str(r#"{"id": 7, "message": "hi", "level": "error"}"#).unwrap();
        assert_eq!(n.id, 7);
        assert_eq!(n.level, Level::Error);
        assert_eq!(n.state, State::Active);
        assert!(n.session.is_empty());
        assert!(!n.is_read());
    }

    #[test]
    fn view_mode_cycles() {
        assert_eq!(ViewMode::Compact.next(), ViewMode::Detailed);
        assert_eq!(ViewMode::Detailed.next(), ViewMode::Grouped);
        assert_eq!(ViewMode::Grouped.next(), ViewMode::Compact);
    }

    #[test]
    fn empty_criteria() {
        assert!(FilterCriteria::default().is_empty());
        let c = FilterCriteria {
            pane: "%1".into(),
            ..Default::default()
        };
        assert!(!c.is_empty());
    }
}
