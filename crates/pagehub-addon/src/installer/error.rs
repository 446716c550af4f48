//! Failure taxonomy for addon package operations.

use pagehub_core::error::{AppError, ErrorKind};
use thiserror::Error;

/// Error returned by every [`AddonInstaller`](super::AddonInstaller) operation.
#[derive(Debug, Error)]
pub enum InstallError {
    /// The upload was empty, too large, or not a `.zip` package.
    #[error("Invalid package: {0}")]
    InvalidInput(String),

    /// No `addon.json` was found in the package.
    #[error("Descriptor missing: {0}")]
    DescriptorMissing(String),

    /// The descriptor could not be parsed or lacks a required field.
    #[error("Descriptor invalid: {0}")]
    DescriptorInvalid(String),

    /// An addon with the same id already has a directory.
    #[error("Addon '{0}' is already installed")]
    AlreadyInstalled(String),

    /// No installed addon has this id.
    #[error("Addon '{0}' is not installed")]
    NotInstalled(String),

    /// Extraction, move or copy failed.
    #[error("I/O failure: {message}")]
    Io {
        /// What the installer was doing.
        message: String,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },
}

impl InstallError {
    pub(crate) fn io(message: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            message: message.into(),
            source,
        }
    }
}

impl From<zip::result::ZipError> for InstallError {
    fn from(err: zip::result::ZipError) -> Self {
        match err {
            zip::result::ZipError::Io(e) => Self::io("Failed to read package", e),
            other => Self::InvalidInput(format!("Corrupt zip archive: {other}")),
        }
    }
}

impl From<tokio::task::JoinError> for InstallError {
    fn from(err: tokio::task::JoinError) -> Self {
        Self::io(
            "Blocking filesystem task failed",
            std::io::Error::other(err.to_string()),
        )
    }
}

impl From<InstallError> for AppError {
    fn from(err: InstallError) -> Self {
        let kind = match &err {
            InstallError::InvalidInput(_)
            | InstallError::DescriptorMissing(_)
            | InstallError::DescriptorInvalid(_) => ErrorKind::Validation,
            InstallError::AlreadyInstalled(_) => ErrorKind::Conflict,
            InstallError::NotInstalled(_) => ErrorKind::NotFound,
            InstallError::Io { .. } => ErrorKind::Storage,
        };
        let message = err.to_string();
        match err {
            InstallError::Io { source, .. } => AppError::with_source(kind, message, source),
            _ => AppError::new(kind, message),
        }
    }
}
