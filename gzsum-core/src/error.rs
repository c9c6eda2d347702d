//! Error taxonomy for the archive pipelines.

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub type Result<T, E = ArchiveError> = std::result::Result<T, E>;

/// Step of a pipeline that touched the filesystem when an I/O fault happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    OpenSource,
    OpenSidecar,
    OpenDestination,
    /// Hashing the source for the checksum gate
    Digest,
    ReadSidecar,
    RewindSource,
    ClearSidecar,
    ReadSource,
    Compress,
    /// Writing the gzip trailer
    Finalize,
    WriteSidecar,
    Decompress,
    WriteDestination,
    Flush,
    /// Reading the finished artifact's size
    Stat,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Stage::OpenSource => "opening source",
            Stage::OpenSidecar => "opening checksum file",
            Stage::OpenDestination => "opening destination",
            Stage::Digest => "hashing source",
            Stage::ReadSidecar => "reading checksum file",
            Stage::RewindSource => "rewinding source",
            Stage::ClearSidecar => "clearing checksum file",
            Stage::ReadSource => "reading source",
            Stage::Compress => "writing compressed data",
            Stage::Finalize => "finalizing gzip stream",
            Stage::WriteSidecar => "writing checksum file",
            Stage::Decompress => "reading compressed data",
            Stage::WriteDestination => "writing destination",
            Stage::Flush => "flushing destination",
            Stage::Stat => "reading destination size",
        };
        f.write_str(s)
    }
}

/// Failure of an archive or unarchive run.
#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("{stage} failed for {}", .path.display())]
    Io {
        stage: Stage,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("{} is not a valid gzip stream", .path.display())]
    Format {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to remove source file {}", .path.display())]
    Cleanup {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl ArchiveError {
    pub(crate) fn io(stage: Stage, path: &Path, source: io::Error) -> Self {
        ArchiveError::Io {
            stage,
            path: path.to_path_buf(),
            source,
        }
    }

    /// The file the failing step was operating on.
    pub fn path(&self) -> &Path {
        match self {
            ArchiveError::Io { path, .. }
            | ArchiveError::Format { path, .. }
            | ArchiveError::Cleanup { path, .. } => path,
        }
    }

    /// The failing stage for I/O faults.
    pub fn stage(&self) -> Option<Stage> {
        match self {
            ArchiveError::Io { stage, .. } => Some(*stage),
            _ => None,
        }
    }

    /// True when the input was readable but is not gzip data.
    pub fn is_format(&self) -> bool {
        matches!(self, ArchiveError::Format { .. })
    }
}

/// Checksum gate failure, split by which stream could not be read.
#[derive(Debug, Error)]
pub enum GateError {
    #[error("failed to read source while hashing")]
    Source(#[source] io::Error),

    #[error("failed to read stored checksum")]
    Sidecar(#[source] io::Error),
}
