use std::cell::RefCell;

use regex::{Regex, RegexBuilder};

use crate::types::Notification;

/// Predicate deciding whether a notification matches a free-text query.
///
/// The filter pipeline only sees this trait, so alternative strategies can be
/// swapped in without touching the stage order.
pub trait SearchMatcher {
    fn matches(&self, notification: &Notification, query: &str) -> bool;

    /// Short identifier for logs and diagnostics.
    fn name(&self) -> &'static str;
}

/// Notification fields a matcher may look at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchField {
    Message,
    Session,
    Window,
    Pane,
    Level,
    State,
}

impl SearchField {
    pub const DEFAULT: [SearchField; 5] = [
        SearchField::Message,
        SearchField::Session,
        SearchField::Window,
        SearchField::Pane,
        SearchField::Level,
    ];

    fn value(self, n: &Notification) -> &str {
        match self {
            SearchField::Message => &n.message,
            SearchField::Session => &n.session,
            SearchField::Window => &n.window,
            SearchField::Pane => &n.pane,
            SearchField::Level => n.level.as_str(),
            SearchField::State => n.state.as_str(),
        }
    }
}

fn normalize(s: &str, case_insensitive: bool) -> String {
    if case_insensitive {
        s.to_lowercase()
    } else {
        s.to_string()
    }
}

// ── Token matcher ──

/// Whitespace-tokenized AND matching.
///
/// Every text token must be a substring of at least one searched field. The
/// tokens `read` and `unread` are read-status predicates rather than text; when
/// both appear they cancel out.
#[derive(Debug, Clone)]
pub struct TokenMatcher {
    pub case_insensitive: bool,
    pub fields: Vec<SearchField>,
}

impl Default for TokenMatcher {
    fn default() -> Self {
        Self {
            case_insensitive: true,
            fields: SearchField::DEFAULT.to_vec(),
        }
    }
}

impl TokenMatcher {
    fn token_matches(&self, n: &Notification, token: &str) -> bool {
        self.fields.iter().any(|field| {
            let value = field.value(n);
            !value.is_empty() && normalize(value, self.case_insensitive).contains(token)
        })
    }
}

impl SearchMatcher for TokenMatcher {
    fn matches(&self, n: &Notification, query: &str) -> bool {
        let mut want_read = false;
        let mut want_unread = false;
        let mut text_tokens = Vec::new();

        for token in query.split_whitespace() {
            match token.to_lowercase().as_str() {
                "read" => want_read = true,
                "unread" => want_unread = true,
                _ => text_tokens.push(normalize(token, self.case_insensitive)),
            }
        }

        if want_read && want_unread {
            want_read = false;
            want_unread = false;
        }
        if want_read && !n.is_read() {
            return false;
        }
        if want_unread && n.is_read() {
            return false;
        }

        text_tokens.iter().all(|t| self.token_matches(n, t))
    }

    fn name(&self) -> &'static str {
        "token"
    }
}

// ── Substring matcher ──

/// The whole query (trimmed) as one substring of any searched field.
#[derive(Debug, Clone)]
pub struct SubstringMatcher {
    pub case_insensitive: bool,
    pub fields: Vec<SearchField>,
}

impl Default for SubstringMatcher {
    fn default() -> Self {
        Self {
            case_insensitive: true,
            fields: SearchField::DEFAULT.to_vec(),
        }
    }
}

impl SearchMatcher for SubstringMatcher {
    fn matches(&self, n: &Notification, query: &str) -> bool {
        let query = query.trim();
        if query.is_empty() {
            return true;
        }
        let needle = normalize(query, self.case_insensitive);
        self.fields
            .iter()
            .any(|f| normalize(f.value(n), self.case_insensitive).contains(&needle))
    }

    fn name(&self) -> &'static str {
        "substring"
    }
}

// ── Regex matcher ──

/// Query compiled as a regular expression. An invalid pattern matches nothing.
///
/// The last compiled pattern is memoized, so one filter pass compiles once.
#[derive(Debug, Clone)]
pub struct RegexMatcher {
    pub case_insensitive: bool,
    pub fields: Vec<SearchField>,
    compiled: RefCell<Option<CompiledQuery>>,
}

#[derive(Debug, Clone)]
struct CompiledQuery {
    query: String,
    case_insensitive: bool,
    regex: Option<Regex>,
}

impl Default for RegexMatcher {
    fn default() -> Self {
        Self {
            case_insensitive: true,
            fields: SearchField::DEFAULT.to_vec(),
            compiled: RefCell::new(None),
        }
    }
}

impl RegexMatcher {
    pub fn new(case_insensitive: bool, fields: Vec<SearchField>) -> Self {
        Self {
            case_insensitive,
            fields,
            compiled: RefCell::new(None),
        }
    }

    /// Compiled form of `query`; `None` for an invalid pattern.
    fn regex_for(&self, query: &str) -> Option<Regex> {
        let mut compiled = self.compiled.borrow_mut();
        let stale = !matches!(
            compiled.as_ref(),
            Some(c) if c.query == query && c.case_insensitive == self.case_insensitive
        );
        if stale {
            let regex = match RegexBuilder::new(query)
                .case_insensitive(self.case_insensitive)
                .build()
            {
                Ok(re) => Some(re),
                Err(e) => {
                    tracing::debug!(query, error = %e, "invalid search pattern");
                    None
                }
            };
            *compiled = Some(CompiledQuery {
                query: query.to_string(),
                case_insensitive: self.case_insensitive,
                regex,
            });
        }
        compiled.as_ref().and_then(|c| c.regex.clone())
    }
}

impl SearchMatcher for RegexMatcher {
    fn matches(&self, n: &Notification, query: &str) -> bool {
        if query.trim().is_empty() {
            return true;
        }
        let Some(re) = self.regex_for(query) else {
            return false;
        };
        self.fields.iter().any(|f| {
            let value = f.value(n);
            !value.is_empty() && re.is_match(value)
        })
    }

    fn name(&self) -> &'static str {
        "regex"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Level;

    fn notif(message: &str, level: Level, read: bool) -> Notification {
        Notification {
            id: 1,
            message: message.into(),
            session: "$1".into(),
            window: "@2".into(),
            pane: "%3".into(),
            level,
            read_timestamp: if read {
                "2024-01-01T00:00:00Z".into()
            } else {
                String::new()
            },
            ..Default::default()
        }
    }

    #[test]
    fn token_and_semantics() {
        let m = TokenMatcher::default();
        let n = notif("Build finished", Level::Info, false);
        assert!(m.matches(&n, "build finished"));
        assert!(m.matches(&n, "FINISHED"));
        assert!(!m.matches(&n, "build failed"));
        assert!(m.matches(&n, ""));
        assert!(m.matches(&n, "   "));
    }

    #[test]
    fn token_searches_ids_and_level() {
        let m = TokenMatcher::default();
        let n = notif("disk", Level::Error, false);
        assert!(m.matches(&n, "%3"));
        assert!(m.matches(&n, "error disk"));
        assert!(!m.matches(&n, "warning"));
    }

    #[test]
    fn read_pseudo_tokens() {
        let m = TokenMatcher::default();
        let read = notif("x", Level::Error, true);
        let unread = notif("x", Level::Error, false);
        assert!(m.matches(&unread, "unread error"));
        assert!(!m.matches(&read, "unread error"));
        assert!(m.matches(&read, "READ"));
        assert!(!m.matches(&unread, "read"));
        // contradictory pair is ignored
        assert!(m.matches(&read, "read unread"));
        assert!(m.matches(&unread, "read unread"));
    }

    #[test]
    fn case_sensitive_token() {
        let m = TokenMatcher {
            case_insensitive: false,
            ..Default::default()
        };
        let n = notif("Deploy", Level::Info, false);
        assert!(m.matches(&n, "Deploy"));
        assert!(!m.matches(&n, "deploy"));
    }

    #[test]
    fn substring_keeps_whole_query() {
        let m = SubstringMatcher::default();
        let n = notif("tests passed on main", Level::Info, false);
        assert!(m.matches(&n, "passed on"));
        assert!(!m.matches(&n, "main passed"));
        assert_eq!(m.name(), "substring");
    }

    #[test]
    fn regex_matcher() {
        let m = RegexMatcher::default();
        let n = notif("job 42 failed", Level::Error, false);
        assert!(m.matches(&n, r"job \d+ FAILED"));
        assert!(!m.matches(&n, r"^failed"));
        assert!(!m.matches(&n, "("));
    }

    #[test]
    fn regex_invalid_pattern_stays_unmatched() {
        let m = RegexMatcher::default();
        let a = notif("job 1", Level::Info, false);
        let b = notif("(", Level::Info, false);
        for _ in 0..3 {
            assert!(!m.matches(&a, "("));
            assert!(!m.matches(&b, "("));
        }
        assert!(m.matches(&a, r"job \d"));
        assert!(!m.matches(&a, "("));
    }

    #[test]
    fn regex_recompiles_on_case_change() {
        let mut m = RegexMatcher::default();
        let n = notif("Deploy", Level::Info, false);
        assert!(m.matches(&n, "deploy"));
        m.case_insensitive = false;
        assert!(!m.matches(&n, "deploy"));
        assert!(m.matches(&n, "Deploy"));
    }

    #[test]
    fn regex_skips_empty_fields() {
        let m = RegexMatcher::default();
        let mut n = notif("x", Level::Info, false);
        n.window.clear();
        n.pane.clear();
        assert!(!m.matches(&n, "^$"));
        assert!(m.matches(&n, "^x$"));
    }
}
