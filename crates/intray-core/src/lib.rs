pub mod error;
pub mod filter;
pub mod ports;
pub mod search;
pub mod settings;
pub mod types;

pub use error::ValidationError;
pub use filter::FilterPipeline;
pub use ports::{IdentityResolver, NameResolver, NotificationStore, SettingsStore};
pub use search::{RegexMatcher, SearchField, SearchMatcher, SubstringMatcher, TokenMatcher};
pub use settings::{FilterSettings, SettingsDto};
pub use types::*;
