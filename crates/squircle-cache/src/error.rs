#![forbid(unsafe_code)]

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::registry::RegistryError;

pub type Result<T> = std::result::Result<T, CacheError>;

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("document registry error: {0}")]
    Registry(#[from] RegistryError),
}

impl CacheError {
    #[must_use]
    pub fn io(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    /// Underlying I/O error kind, if this is an I/O failure.
    #[must_use]
    pub fn io_kind(&self) -> Option<std::io::ErrorKind> {
        match self {
            Self::Io { source, .. } => Some(source.kind()),
            Self::Registry(RegistryError::Io(source)) => Some(source.kind()),
            Self::Registry(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io;

    use super::CacheError;

    #[test]
    fn io_error_mentions_path() {
        let error = CacheError::io(
            "/tmp/doc.cache",
            io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        );
        assert_eq!(error.to_string(), "I/O error on /tmp/doc.cache: denied");
        assert_eq!(error.io_kind(), Some(io::ErrorKind::PermissionDenied));
    }

    #[test]
    fn registry_version_error_has_no_io_kind() {
        let error = CacheError::from(crate::registry::RegistryError::UnsupportedVersion {
            found: 9,
            expected: 1,
        });
        assert_eq!(error.io_kind(), None);
    }
}
