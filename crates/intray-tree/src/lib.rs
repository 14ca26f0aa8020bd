pub mod build;
pub mod cursor;
pub mod expansion;
pub mod fold;
pub mod node;
pub mod tree;

pub use build::{build_tree, prune_empty_groups};
pub use cursor::{capture_selection, relocate_after_collapse, restore_selection, Cursor, Viewport};
pub use expansion::{escape_segment, expansion_key, legacy_expansion_key, ExpansionState, NodeKeys};
pub use fold::{FoldOutcome, EMPTY_LABEL};
pub use node::{NodeAddr, NodeKind, NotificationSource, TreeNode};
pub use tree::{leaf_identifier, GroupScope, NotificationTree, LEAF_PREFIX, ROOT_IDENTIFIER};
