//! Crate-wide error type.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("failed to read OBJ file {path}")]
    ObjRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed OBJ data in {path} at line {line}: {reason}")]
    ObjParse {
        path: PathBuf,
        line: usize,
        reason: String,
    },
}
