use crate::parser::DepKind;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DepError {
    #[error("Could not open PKGBUILD for dependency parsing: {}", .path.display())]
    RecipeNotFound {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed {kind} array on line {line}: {reason}")]
    MalformedRecipe {
        line: usize,
        kind: DepKind,
        reason: &'static str,
    },
}

pub type Result<T> = std::result::Result<T, DepError>;
