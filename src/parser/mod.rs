pub mod array;
pub mod pkgbuild;

pub use array::{parse_array, ParseMode};
pub use pkgbuild::{extract_flat_dependencies, populate_typed_dependencies, DepKind};
