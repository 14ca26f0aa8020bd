//! Settings import/export and the validated setters.
//!
//! Loading a persisted blob is lenient: a bad value is logged and replaced by
//! its default, so a hand-edited file never locks the user out. Interactive
//! setters are strict and leave the model untouched on error.

use std::str::FromStr;

use anyhow::Context;
use intray_core::settings::DEFAULT_EXPAND_LEVEL;
use intray_core::{
    FilterCriteria, FilterSettings, GroupBy, Level, ReadFilter, SettingsDto, SettingsStore,
    SortField, SortOrder, State, ValidationError, ViewMode, DEFAULT_COLUMNS, MAX_EXPAND_LEVEL,
    MIN_EXPAND_LEVEL,
};
use intray_tree::ExpansionState;

use crate::model::InboxModel;

/// Validate an expand level from user input or a settings file.
pub fn parse_expand_level(level: i64) -> Result<u8, ValidationError> {
    match u8::try_from(level) {
        Ok(l) if (MIN_EXPAND_LEVEL..=MAX_EXPAND_LEVEL).contains(&l) => Ok(l),
        _ => Err(ValidationError::InvalidExpandLevel(level)),
    }
}

/// Empty string means "no filter".
fn parse_optional<T: FromStr<Err = ValidationError>>(
    value: &str,
) -> Result<Option<T>, ValidationError> {
    let value = value.trim();
    if value.is_empty() {
        return Ok(None);
    }
    value.to_lowercase().parse().map(Some)
}

/// Strictly convert persisted filter strings into criteria.
pub fn parse_filters(filters: &FilterSettings) -> Result<FilterCriteria, ValidationError> {
    Ok(FilterCriteria {
        state: parse_optional::<State>(&filters.state)?,
        level: parse_optional::<Level>(&filters.level)?,
        session: filters.session.trim().to_string(),
        window: filters.window.trim().to_string(),
        pane: filters.pane.trim().to_string(),
        read: parse_optional::<ReadFilter>(&filters.read)?,
    })
}

fn lenient<T>(field: &str, parsed: Result<T, ValidationError>, fallback: T) -> T {
    parsed.unwrap_or_else(|e| {
        tracing::warn!(field, error = %e, "invalid persisted setting, using default");
        fallback
    })
}

fn criteria_to_filters(c: &FilterCriteria) -> FilterSettings {
    FilterSettings {
        level: c.level.map(|l| l.as_str().to_string()).unwrap_or_default(),
        state: c.state.map(|s| s.as_str().to_string()).unwrap_or_default(),
        session: c.session.clone(),
        window: c.window.clone(),
        pane: c.pane.clone(),
        read: c.read.map(|r| r.as_str().to_string()).unwrap_or_default(),
    }
}

impl InboxModel {
    /// Build a model from a persisted settings blob.
    pub fn from_settings(settings: &SettingsDto) -> Self {
        let mut model = Self::new();
        model.apply_settings(settings);
        model
    }

    /// Load settings through a store; missing settings mean defaults.
    pub fn load_settings(store: &dyn SettingsStore) -> anyhow::Result<Self> {
        let settings = store
            .load()
            .context("failed to load inbox settings")?
            .unwrap_or_default();
        Ok(Self::from_settings(&settings))
    }

    /// Lenient import of a settings blob, then rebuild.
    pub fn apply_settings(&mut self, s: &SettingsDto) {
        self.sort.field = lenient("sortBy", s.sort_by.parse(), SortField::default());
        self.sort.order = lenient("sortOrder", s.sort_order.parse(), SortOrder::default());
        self.view_mode = lenient("viewMode", s.view_mode.parse(), ViewMode::default());
        self.group_by = lenient("groupBy", s.group_by.parse(), GroupBy::default());
        self.expand_level = lenient(
            "defaultExpandLevel",
            parse_expand_level(s.default_expand_level),
            DEFAULT_EXPAND_LEVEL,
        );
        self.criteria = FilterCriteria {
            state: lenient("filters.state", parse_optional(&s.filters.state), None),
            level: lenient("filters.level", parse_optional(&s.filters.level), None),
            session: s.filters.session.trim().to_string(),
            window: s.filters.window.trim().to_string(),
            pane: s.filters.pane.trim().to_string(),
            read: lenient("filters.read", parse_optional(&s.filters.read), None),
        };
        self.columns = if s.columns.is_empty() {
            DEFAULT_COLUMNS.iter().map(|c| c.to_string()).collect()
        } else {
            s.columns.clone()
        };
        self.expansion = ExpansionState::from(s.expansion_state.clone());
        self.refresh(true);
    }

    /// Export current preferences, including fold state.
    pub fn to_settings(&self) -> SettingsDto {
        SettingsDto {
            sort_by: self.sort.field.as_str().to_string(),
            sort_order: self.sort.order.as_str().to_string(),
            columns: self.columns.clone(),
            filters: criteria_to_filters(&self.criteria),
            view_mode: self.view_mode.as_str().to_string(),
            group_by: self.group_by.as_str().to_string(),
            default_expand_level: i64::from(self.expand_level),
            expansion_state: self.expansion.as_map().clone(),
        }
    }

    pub fn save_settings(&self, store: &dyn SettingsStore) -> anyhow::Result<()> {
        store
            .save(&self.to_settings())
            .context("failed to save inbox settings")
    }

    // ── Strict setters ──

    pub fn set_group_by(&mut self, value: &str) -> Result<(), ValidationError> {
        let group_by: GroupBy = value.parse()?;
        if group_by != self.group_by {
            self.group_by = group_by;
            self.refresh(true);
        }
        Ok(())
    }

    pub fn set_expand_level(&mut self, level: i64) -> Result<(), ValidationError> {
        self.expand_level = parse_expand_level(level)?;
        Ok(())
    }

    pub fn set_view_mode(&mut self, value: &str) -> Result<(), ValidationError> {
        let mode: ViewMode = value.parse()?;
        if mode != self.view_mode {
            self.view_mode = mode;
            self.refresh(false);
        }
        Ok(())
    }

    /// Rotate compact → detailed → grouped; the cursor goes back to the top.
    pub fn cycle_view_mode(&mut self) -> ViewMode {
        self.view_mode = self.view_mode.next();
        self.refresh(false);
        self.view_mode
    }

    pub fn set_sort_by(&mut self, value: &str) -> Result<(), ValidationError> {
        self.sort.field = value.parse()?;
        self.refresh(true);
        Ok(())
    }

    pub fn set_sort_order(&mut self, value: &str) -> Result<(), ValidationError> {
        self.sort.order = value.parse()?;
        self.refresh(true);
        Ok(())
    }

    /// Replace all structural filters from their string form.
    pub fn set_filters(&mut self, filters: &FilterSettings) -> Result<(), ValidationError> {
        let criteria = parse_filters(filters)?;
        self.set_criteria(criteria);
        Ok(())
    }

    pub fn set_read_filter(&mut self, value: &str) -> Result<(), ValidationError> {
        self.criteria.read = parse_optional(value)?;
        self.refresh(true);
        Ok(())
    }

    pub fn set_level_filter(&mut self, value: &str) -> Result<(), ValidationError> {
        self.criteria.level = parse_optional(value)?;
        self.refresh(true);
        Ok(())
    }

    pub fn set_state_filter(&mut self, value: &str) -> Result<(), ValidationError> {
        self.criteria.state = parse_optional(value)?;
        self.refresh(true);
        Ok(())
    }
}
