pub mod actions;
pub mod folding;
pub mod model;
pub mod settings;

pub use actions::PaneTarget;
pub use model::{InboxModel, Row};
pub use settings::{parse_expand_level, parse_filters};
