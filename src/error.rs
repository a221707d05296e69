//! Errors surfaced by component info extraction.

use crate::parser::ParseError;
use crate::program::tsconfig::TsconfigError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DocgenError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Tsconfig(#[from] TsconfigError),
    #[error("Could not find a component definition in \"{}\".", .path.display())]
    NoComponent { path: PathBuf },
    #[error(
        "Found more than one component definition in \"{}\". This is currently not supported; please ensure your module only defines a single React component.",
        .path.display()
    )]
    MultipleComponents { path: PathBuf },
    #[error("Component file \"{}\" doesn't have a default export.", .path.display())]
    MissingDefaultExport { path: PathBuf },
    #[error("File \"{}\" is not part of the program.", .path.display())]
    NotInProgram { path: PathBuf },
}

pub type Result<T, E = DocgenError> = std::result::Result<T, E>;
