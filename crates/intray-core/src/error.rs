use thiserror::Error;

/// A rejected setter argument. The target state is left unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("invalid group-by value: {0:?} (expected none, session, window, pane, message or pane_message)")]
    InvalidGroupBy(String),
    #[error("invalid expand level: {0} (expected 0..=3)")]
    InvalidExpandLevel(i64),
    #[error("invalid view mode: {0:?} (expected compact, detailed or grouped)")]
    InvalidViewMode(String),
    #[error("invalid sort field: {0:?}")]
    InvalidSortField(String),
    #[error("invalid sort order: {0:?} (expected asc or desc)")]
    InvalidSortOrder(String),
    #[error("invalid level: {0:?} (expected info, warning or error)")]
    InvalidLevel(String),
    #[error("invalid state: {0:?} (expected active or dismissed)")]
    InvalidState(String),
    #[error("invalid read filter: {0:?} (expected read or unread)")]
    InvalidReadFilter(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_value() {
        let e = ValidationError::InvalidGroupBy("tabs".into());
        assert!(e.to_string().contains("\"tabs\""));
        let e = ValidationError::InvalidExpandLevel(9);
        assert!(e.to_string().contains('9'));
    }
}
