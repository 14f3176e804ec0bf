pub mod core;
pub mod error;
pub mod parser;
pub mod resolver;
pub mod types;


pub use crate::core::{merge_sorted_dedup, DepList, NodeId};
pub use error::DepError;
pub use parser::{
    extract_flat_dependencies, parse_array, populate_typed_dependencies, DepKind, ParseMode,
};
pub use resolver::{LocalDb, RemoteIndex, Resolver, SyncDbs};
pub use types::AurPackage;
