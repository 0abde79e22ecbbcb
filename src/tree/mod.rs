//! Session forest: grouping, flattening and expansion bookkeeping.

mod build;
mod node;
mod visible;

pub use build::{build_tree, find_real_parent, sort_key};
pub use node::{NodeKind, TreeNode};
pub use visible::{flatten, resolve, resolve_mut, restore_expanded, NodeRef};
