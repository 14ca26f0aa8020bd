use std::cmp::Ordering;

use crate::search::{SearchMatcher, TokenMatcher};
use crate::types::{FilterCriteria, Notification, SortField, SortOptions, SortOrder};

/// Fixed-order filter pipeline:
/// state → level → session → window → pane → read-status → search → sort.
///
/// Each stage is a pure function of the previous stage's output and an empty
/// criterion skips its stage.
pub struct FilterPipeline {
    matcher: Box<dyn SearchMatcher>,
}

impl Default for FilterPipeline {
    fn default() -> Self {
        Self::new(Box::new(TokenMatcher::default()))
    }
}

impl FilterPipeline {
    pub fn new(matcher: Box<dyn SearchMatcher>) -> Self {
        Self { matcher }
    }

    pub fn set_matcher(&mut self, matcher: Box<dyn SearchMatcher>) {
        self.matcher = matcher;
    }

    pub fn matcher_name(&self) -> &'static str {
        self.matcher.name()
    }

    pub fn apply(
        &self,
        notifications: &[Notification],
        criteria: &FilterCriteria,
        query: &str,
        sort: SortOptions,
    ) -> Vec<Notification> {
        let mut result: Vec<Notification> = notifications
            .iter()
            .filter(|n| matches_criteria(n, criteria))
            .filter(|n| query.trim().is_empty() || self.matcher.matches(n, query))
            .cloned()
            .collect();
        sort_notifications(&mut result, sort);
        tracing::debug!(
            total = notifications.len(),
            kept = result.len(),
            matcher = self.matcher.name(),
            "filter pipeline applied"
        );
        result
    }
}

/// The structural stages, short-circuiting in pipeline order.
pub fn matches_criteria(n: &Notification, c: &FilterCriteria) -> bool {
    if let Some(state) = c.state {
        if n.state != state {
            return false;
        }
    }
    if let Some(level) = c.level {
        if n.level != level {
            return false;
        }
    }
    if !c.session.is_empty() && n.session != c.session {
        return false;
    }
    if !c.window.is_empty() && n.window != c.window {
        return false;
    }
    if !c.pane.is_empty() && n.pane != c.pane {
        return false;
    }
    if let Some(read) = c.read {
        if !read.matches(n) {
            return false;
        }
    }
    true
}

// ── Sort ──

fn compare_by_field(a: &Notification, b: &Notification, field: SortField) -> Ordering {
    match field {
        SortField::Id => a.id.cmp(&b.id),
        SortField::Timestamp => a.timestamp.cmp(&b.timestamp),
        SortField::State => a.state.as_str().cmp(b.state.as_str()),
        SortField::Level => a.level.as_str().cmp(b.level.as_str()),
        SortField::Session => a.session.cmp(&b.session),
        SortField::Message => a.message.cmp(&b.message),
        // unread before read in ascending order
        SortField::ReadStatus => a.is_read().cmp(&b.is_read()),
    }
}

/// Stable sort by field and order, then stably move unread ahead of read.
pub fn sort_notifications(notifications: &mut [Notification], sort: SortOptions) {
    notifications.sort_by(|a, b| {
        let ord = compare_by_field(a, b, sort.field);
        match sort.order {
            SortOrder::Asc => ord,
            SortOrder::Desc => ord.reverse(),
        }
    });
    notifications.sort_by_key(|n| n.is_read());
}

pub fn unread_count(notifications: &[Notification]) -> usize {
    notifications.iter().filter(|n| !n.is_read()).count()
}

pub fn read_count(notifications: &[Notification]) -> usize {
    notifications.len() - unread_count(notifications)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::SubstringMatcher;
    use crate::types::{Level, ReadFilter, State};

    fn n(id: u64, ts: &str, session: &str, level: Level, read: bool) -> Notification {
        Notification {
            id,
            timestamp: ts.into(),
            session: session.into(),
            window: "@1".into(),
            pane: "%1".into(),
            message: format!("message {id}"),
            level,
            state: State::Active,
            read_timestamp: if read { "2024-02-01T00:00:00Z".into() } else { String::new() },
        }
    }

    fn sample() -> Vec<Notification> {
        vec![
            n(1, "2024-01-01T10:00:00Z", "$1", Level::Info, false),
            n(2, "2024-01-01T11:00:00Z", "$1", Level::Error, true),
            n(3, "2024-01-01T12:00:00Z", "$2", Level::Error, false),
            n(4, "2024-01-01T09:00:00Z", "$2", Level::Warning, true),
        ]
    }

    fn ids(v: &[Notification]) -> Vec<u64> {
        v.iter().map(|n| n.id).collect()
    }

    #[test]
    fn empty_filters_keep_everything() {
        let p = FilterPipeline::default();
        let out = p.apply(&sample(), &FilterCriteria::default(), "", SortOptions::default());
        assert_eq!(out.len(), 4);
    }

    #[test]
    fn structural_filters_compose() {
        let p = FilterPipeline::default();
        let c = FilterCriteria {
            level: Some(Level::Error),
            session: "$1".into(),
            ..Default::default()
        };
        let out = p.apply(&sample(), &c, "", SortOptions::default());
        assert_eq!(ids(&out), vec![2]);
    }

    #[test]
    fn read_filter_stage() {
        let p = FilterPipeline::default();
        let c = FilterCriteria {
            read: Some(ReadFilter::Unread),
            ..Default::default()
        };
        let out = p.apply(&sample(), &c, "", SortOptions::default());
        assert_eq!(ids(&out), vec![3, 1]);
    }

    #[test]
    fn state_filter_drops_dismissed() {
        let mut all = sample();
        all[0].state = State::Dismissed;
        let c = FilterCriteria {
            state: Some(State::Active),
            ..Default::default()
        };
        let out = FilterPipeline::default().apply(&all, &c, "", SortOptions::default());
        assert!(!ids(&out).contains(&1));
    }

    #[test]
    fn search_runs_after_structure() {
        let p = FilterPipeline::default();
        let out = p.apply(&sample(), &FilterCriteria::default(), "unread error", SortOptions::default());
        assert_eq!(ids(&out), vec![3]);
    }

    #[test]
    fn default_sort_is_newest_first_unread_first() {
        let p = FilterPipeline::default();
        let out = p.apply(&sample(), &FilterCriteria::default(), "", SortOptions::default());
        // unread: 3 (12:00), 1 (10:00); read: 2 (11:00), 4 (09:00)
        assert_eq!(ids(&out), vec![3, 1, 2, 4]);
    }

    #[test]
    fn ascending_id_sort() {
        let mut all = sample();
        sort_notifications(
            &mut all,
            SortOptions {
                field: SortField::Id,
                order: SortOrder::Asc,
            },
        );
        assert_eq!(ids(&all), vec![1, 3, 2, 4]);
    }

    #[test]
    fn swapped_matcher_is_used() {
        let p = FilterPipeline::new(Box::new(SubstringMatcher::default()));
        assert_eq!(p.matcher_name(), "substring");
        let out = p.apply(&sample(), &FilterCriteria::default(), "message 3", SortOptions::default());
        assert_eq!(ids(&out), vec![3]);
    }

    #[test]
    fn counts() {
        let all = sample();
        assert_eq!(unread_count(&all), 2);
        assert_eq!(read_count(&all), 2);
    }
}
