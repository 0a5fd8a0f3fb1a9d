use std::{io, path::PathBuf};

use crate::oid::Oid;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("unsupported digest algorithm: {0}")]
    UnsupportedAlgorithm(String),

    #[error("unsupported text encoding: {0}")]
    UnsupportedEncoding(String),

    /// Object kind outside blob, tree and commit.
    #[error("unsupported object type: {0}")]
    UnsupportedObjectType(String),

    #[error("compression failed: {0}")]
    Compression(#[source] io::Error),

    #[error("filesystem error at {}: {source}", .path.display())]
    Filesystem {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid object id: {0:?}")]
    InvalidOid(String),

    #[error("object id {oid} has {} bytes, expected {expected}", .oid.len())]
    DigestLength { oid: Oid, expected: usize },

    #[error("invalid tree entry name: {0:?}")]
    InvalidEntryName(String),

    #[error("unknown timezone: {0}")]
    UnknownTimezone(String),

    #[error("corrupt object {oid}: {reason}")]
    CorruptObject { oid: Oid, reason: String },
}

impl Error {
    /// Adapter for `map_err` that tags an I/O failure with the path involved.
    pub(crate) fn filesystem(path: impl Into<PathBuf>) -> impl FnOnce(io::Error) -> Self {
        let path = path.into();
        move |source| Self::Filesystem { path, source }
    }

    pub(crate) fn corrupt(oid: &Oid, reason: impl Into<String>) -> Self {
        Self::CorruptObject {
            oid: oid.clone(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
