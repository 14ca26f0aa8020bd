use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};

use crate::types::{GroupBy, SortField, SortOrder, ViewMode, DEFAULT_COLUMNS};

/// Default for `defaultExpandLevel`: sessions open, everything below folded.
pub const DEFAULT_EXPAND_LEVEL: u8 = 1;

/// Persisted filter values. Empty strings mean "no filter".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterSettings {
    pub level: String,
    pub state: String,
    pub session: String,
    pub window: String,
    pub pane: String,
    pub read: String,
}

/// User preferences blob exchanged with the settings store.
///
/// Enum-like fields stay strings here; the inbox validates them when the blob
/// is applied, so a hand-edited file with a bad value still loads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SettingsDto {
    pub sort_by: String,
    pub sort_order: String,
    pub columns: Vec<String>,
    pub filters: FilterSettings,
    pub view_mode: String,
    pub group_by: String,
    pub default_expand_level: i64,
    #[serde(deserialize_with = "deserialize_expansion_state")]
    pub expansion_state: BTreeMap<String, bool>,
}

impl Default for SettingsDto {
    fn default() -> Self {
        Self {
            sort_by: SortField::default().as_str().to_string(),
            sort_order: SortOrder::default().as_str().to_string(),
            columns: DEFAULT_COLUMNS.iter().map(|c| c.to_string()).collect(),
            filters: FilterSettings::default(),
            view_mode: ViewMode::default().as_str().to_string(),
            group_by: GroupBy::default().as_str().to_string(),
            default_expand_level: i64::from(DEFAULT_EXPAND_LEVEL),
            expansion_state: BTreeMap::new(),
        }
    }
}

/// Keep boolean entries, drop anything else with a warning.
fn deserialize_expansion_state<'de, D>(deserializer: D) -> Result<BTreeMap<String, bool>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<BTreeMap<String, serde_json::Value>> = Option::deserialize(deserializer)?;
    let mut out = BTreeMap::new();
    for (key, value) in raw.unwrap_or_default() {
        match value.as_bool() {
            Some(expanded) => {
                out.insert(key, expanded);
            }
            None => tracing::warn!(key, %value, "ignoring malformed expansion entry"),
        }
    }
    Ok(out)
}
