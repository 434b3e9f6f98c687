// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use std::io;
use std::path::PathBuf;

use cid::Cid;
use thiserror::Error;

/// Coarse classification of an [`Error`], used by front-ends to pick an exit
/// status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display)]
#[strum(serialize_all = "kebab-case")]
pub enum ErrorKind {
    /// Read or write failure on an external byte source or sink.
    Io,
    /// Malformed or unsupported archive framing or header.
    Format,
    /// Block bytes that do not hash to their CID, or a referenced block that is absent.
    Integrity,
    /// Invalid caller input.
    Constraint,
}

/// Archive error
#[derive(Debug, Error)]
pub enum Error {
    #[error("Io error: {0}")]
    Io(#[from] io::Error),
    #[error("Io error on {}: {source}", path.display())]
    IoAt {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Invalid CAR file: {0}")]
    Format(String),
    #[error("CID/Block mismatch for block {declared}, actual: {actual}")]
    CidMismatch { declared: Cid, actual: Cid },
    #[error("Block {0} is referenced but missing from the archive")]
    MissingBlock(Cid),
    #[error("Malformed node {cid}: {reason}")]
    MalformedNode { cid: Cid, reason: String },
    #[error("Unsupported multihash code {code:#x} in {cid}")]
    UnsupportedHash { cid: Cid, code: u64 },
    #[error("{0}")]
    Constraint(String),
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Io(_) | Error::IoAt { .. } => ErrorKind::Io,
            Error::Format(_) => ErrorKind::Format,
            Error::CidMismatch { .. }
            | Error::MissingBlock(_)
            | Error::MalformedNode { .. }
            | Error::UnsupportedHash { .. } => ErrorKind::Integrity,
            Error::Constraint(_) => ErrorKind::Constraint,
        }
    }

    pub(crate) fn io_at(path: impl Into<PathBuf>) -> impl FnOnce(io::Error) -> Self {
        let path = path.into();
        move |source| Error::IoAt { path, source }
    }

    pub(crate) fn malformed(cid: Cid, reason: impl std::fmt::Display) -> Self {
        Error::MalformedNode {
            cid,
            reason: reason.to_string(),
        }
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds() {
        assert_eq!(
            Error::from(io::Error::from(io::ErrorKind::NotFound)).kind(),
            ErrorKind::Io
        );
        assert_eq!(Error::Format("bad".into()).kind(), ErrorKind::Format);
        assert_eq!(
            Error::MissingBlock(Cid::default()).kind(),
            ErrorKind::Integrity
        );
        assert_eq!(
            Error::Constraint("nope".into()).kind(),
            ErrorKind::Constraint
        );
    }

    #[test]
    fn io_at_names_the_path() {
        let err = Error::io_at("some/file.txt")(io::Error::from(io::ErrorKind::PermissionDenied));
        assert!(err.to_string().contains("some/file.txt"));
    }
}
