pub mod list;
pub mod merge;

pub use list::{DepList, NodeId};
pub use merge::merge_sorted_dedup;
