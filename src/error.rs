//! Error type shared by the section patcher and the export pipeline.

use camino::Utf8PathBuf;
use thiserror::Error;

/// Coded result of a failed export, without the context carried by [`ExportError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    BadPath,
    TemplateMissing,
    UnsupportedCombination,
    CopyFailed,
    CannotOpen,
    CorruptFormat,
    UnsupportedFormat,
    InvalidData,
    SectionNotFound,
    ArchivePackingFailed,
    ManifestWriteFailed,
    Io,
}

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("output directory does not exist: {0}")]
    BadPath(Utf8PathBuf),

    #[error("export template not found: {0}")]
    TemplateMissing(String),

    #[error("embedding the pack is not supported for .dol template {0}")]
    UnsupportedCombination(Utf8PathBuf),

    #[error("failed to copy {from} to {to}")]
    CopyFailed {
        from: Utf8PathBuf,
        to: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot open {path} for patching")]
    CannotOpen {
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{path} is not a valid ELF image: {reason}")]
    CorruptFormat { path: Utf8PathBuf, reason: String },

    #[error("cannot patch {0}: .dol executables are not supported")]
    UnsupportedFormat(Utf8PathBuf),

    #[error("invalid embed location: {0}")]
    InvalidData(String),

    #[error("no \"pck\" section in {0}")]
    SectionNotFound(Utf8PathBuf),

    #[error("failed to save the pack to {path}")]
    ArchivePackingFailed {
        path: Utf8PathBuf,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("failed to write manifest {path}")]
    ManifestWriteFailed {
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl ExportError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ExportError::BadPath(_) => ErrorKind::BadPath,
            ExportError::TemplateMissing(_) => ErrorKind::TemplateMissing,
            ExportError::UnsupportedCombination(_) => ErrorKind::UnsupportedCombination,
            ExportError::CopyFailed { .. } => ErrorKind::CopyFailed,
            ExportError::CannotOpen { .. } => ErrorKind::CannotOpen,
            ExportError::CorruptFormat { .. } => ErrorKind::CorruptFormat,
            ExportError::UnsupportedFormat(_) => ErrorKind::UnsupportedFormat,
            ExportError::InvalidData(_) => ErrorKind::InvalidData,
            ExportError::SectionNotFound(_) => ErrorKind::SectionNotFound,
            ExportError::ArchivePackingFailed { .. } => ErrorKind::ArchivePackingFailed,
            ExportError::ManifestWriteFailed { .. } => ErrorKind::ManifestWriteFailed,
            ExportError::Io(_) => ErrorKind::Io,
        }
    }
}

pub type Result<T, E = ExportError> = std::result::Result<T, E>;
