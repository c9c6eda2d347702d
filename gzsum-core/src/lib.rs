//! Checksum-gated gzip compression for single files.
//!
//! [`archive`] compresses a file into `<out>` and records the MD5 of its
//! plaintext in the `<out>.md5` sidecar, skipping all work when the sidecar
//! already holds the current digest. [`unarchive`] is the plain inverse.
//!
//! The artifact and its sidecar are not written atomically as a pair. The
//! sidecar is emptied before the artifact is rewritten, so an interrupted run
//! can only cause a needless recompression later, never a false match.

pub mod error;
pub mod files;
pub mod gate;
pub mod pipeline;
pub mod tee;

pub use error::{ArchiveError, GateError, Result, Stage};
pub use files::{sidecar_path, SIDECAR_EXTENSION};
pub use pipeline::{archive, unarchive, ArchiveOptions, ArchiveOutcome, Archiver};

// Re-export the codec for callers that want to tune it
pub use gzip_archive::{GzipCodec, GzipOptions};
