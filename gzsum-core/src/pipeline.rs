//! Archive (compress + checksum) and unarchive (decompress) pipelines.

use crate::error::{ArchiveError, GateError, Result, Stage};
use crate::files::{create_output, open_sidecar, sidecar_path_with, SIDECAR_EXTENSION};
use crate::gate::{checksum_gate, finalize_hex};
use crate::tee::TeeWriter;
use gzip_archive::{GzipCodec, GzipOptions};
use log::{debug, info};
use md5::digest::{Digest, FixedOutputReset};
use md5::Md5;
use std::fs::{self, File};
use std::io::{self, BufRead, BufReader, BufWriter, Read, Seek, SeekFrom, Write};
use std::path::Path;

const COPY_BUFFER: usize = 64 * 1024;

/// Settings for both pipelines.
#[derive(Clone, Debug, Default)]
pub struct ArchiveOptions {
    pub gzip: GzipOptions,
}

/// Result of an archive run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ArchiveOutcome {
    /// The sidecar already held the source digest; nothing was touched.
    Skipped { digest: String },
    /// The source was compressed, its digest stored and the source removed.
    Compressed {
        digest: String,
        bytes_in: u64,
        bytes_out: u64,
    },
}

impl ArchiveOutcome {
    pub fn is_skipped(&self) -> bool {
        matches!(self, ArchiveOutcome::Skipped { .. })
    }

    /// Lowercase hex digest of the source bytes.
    pub fn digest(&self) -> &str {
        match self {
            ArchiveOutcome::Skipped { digest } | ArchiveOutcome::Compressed { digest, .. } => digest,
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct Archiver {
    codec: GzipCodec,
}

impl Archiver {
    pub fn new(opts: ArchiveOptions) -> Self {
        Self {
            codec: GzipCodec::new(opts.gzip),
        }
    }

    pub fn codec(&self) -> &GzipCodec {
        &self.codec
    }

    /// Compress `source` into `dest`, storing its MD5 in `<dest>.md5`.
    pub fn archive(&self, source: impl AsRef<Path>, dest: impl AsRef<Path>) -> Result<ArchiveOutcome> {
        self.archive_with::<Md5>(source.as_ref(), dest.as_ref(), SIDECAR_EXTENSION)
    }

    /// [`Archiver::archive`] with any fixed-size digest and sidecar suffix.
    pub fn archive_with<D>(&self, source: &Path, dest: &Path, extension: &str) -> Result<ArchiveOutcome>
    where
        D: Digest + FixedOutputReset + Write,
    {
        let sidecar = sidecar_path_with(dest, extension);

        let mut src = File::open(source).map_err(|e| ArchiveError::io(Stage::OpenSource, source, e))?;
        let mut sum = open_sidecar(&sidecar).map_err(|e| ArchiveError::io(Stage::OpenSidecar, &sidecar, e))?;

        let mut hasher = D::new();
        debug!("Hashing {} against {}", source.display(), sidecar.display());
        let (matched, digest) = checksum_gate(&mut src, &mut sum, &mut hasher).map_err(|e| match e {
            GateError::Source(e) => ArchiveError::io(Stage::Digest, source, e),
            GateError::Sidecar(e) => ArchiveError::io(Stage::ReadSidecar, &sidecar, e),
        })?;
        if matched {
            info!("Checksum of {} matches {}, skipping", source.display(), sidecar.display());
            return Ok(ArchiveOutcome::Skipped { digest });
        }

        src.seek(SeekFrom::Start(0))
            .map_err(|e| ArchiveError::io(Stage::RewindSource, source, e))?;

        // The stale digest must be gone before the artifact it described is replaced.
        sum.seek(SeekFrom::Start(0))
            .and_then(|_| sum.set_len(0))
            .map_err(|e| ArchiveError::io(Stage::ClearSidecar, &sidecar, e))?;

        let out = create_output(dest).map_err(|e| ArchiveError::io(Stage::OpenDestination, dest, e))?;
        let mut encoder = self.codec.encoder(out);

        let bytes_in = {
            let mut tee = TeeWriter::new(&mut encoder, &mut hasher);
            copy_stream(&mut src, &mut tee).map_err(|e| match e {
                CopyError::Read(e) => ArchiveError::io(Stage::ReadSource, source, e),
                CopyError::Write(e) => ArchiveError::io(Stage::Compress, dest, e),
            })?
        };

        let out = gzip_archive::finish(encoder).map_err(|e| ArchiveError::io(Stage::Finalize, dest, e))?;
        out.sync_all().map_err(|e| ArchiveError::io(Stage::Flush, dest, e))?;
        let bytes_out = out
            .metadata()
            .map_err(|e| ArchiveError::io(Stage::Stat, dest, e))?
            .len();
        drop(out);

        let digest = finalize_hex(&mut hasher);
        sum.write_all(digest.as_bytes())
            .and_then(|_| sum.flush())
            .map_err(|e| ArchiveError::io(Stage::WriteSidecar, &sidecar, e))?;
        drop(sum);

        drop(src);
        fs::remove_file(source).map_err(|e| ArchiveError::Cleanup {
            path: source.to_path_buf(),
            source: e,
        })?;

        info!(
            "Compressed {} -> {} ({} -> {} bytes, {} {})",
            source.display(),
            dest.display(),
            bytes_in,
            bytes_out,
            extension,
            digest
        );

        Ok(ArchiveOutcome::Compressed {
            digest,
            bytes_in,
            bytes_out,
        })
    }

    /// Decompress the gzip stream `source` into `dest`. Returns the number of
    /// bytes written. No checksum is read or written.
    pub fn unarchive(&self, source: impl AsRef<Path>, dest: impl AsRef<Path>) -> Result<u64> {
        let source = source.as_ref();
        let dest = dest.as_ref();

        let src = File::open(source).map_err(|e| ArchiveError::io(Stage::OpenSource, source, e))?;
        let decode_error = |e: io::Error| {
            if gzip_archive::is_format_error(&e) {
                ArchiveError::Format {
                    path: source.to_path_buf(),
                    source: e,
                }
            } else {
                ArchiveError::io(Stage::Decompress, source, e)
            }
        };

        // Decode the header and first block before the destination is truncated.
        let mut decoded = BufReader::with_capacity(COPY_BUFFER, self.codec.decoder(src));
        decoded.fill_buf().map_err(decode_error)?;

        let out = create_output(dest).map_err(|e| ArchiveError::io(Stage::OpenDestination, dest, e))?;
        let mut writer = BufWriter::with_capacity(self.codec.options().buffer_size, out);

        let bytes = copy_stream(&mut decoded, &mut writer).map_err(|e| match e {
            CopyError::Read(e) => decode_error(e),
            CopyError::Write(e) => ArchiveError::io(Stage::WriteDestination, dest, e),
        })?;

        // Flush and sync explicitly; Drop would swallow the error.
        let out = writer
            .into_inner()
            .map_err(|e| ArchiveError::io(Stage::Flush, dest, e.into_error()))?;
        out.sync_all().map_err(|e| ArchiveError::io(Stage::Flush, dest, e))?;

        info!("Decompressed {} -> {} ({} bytes)", source.display(), dest.display(), bytes);
        Ok(bytes)
    }
}

/// Run the archive pipeline with default options.
pub fn archive(source: impl AsRef<Path>, dest: impl AsRef<Path>) -> Result<ArchiveOutcome> {
    Archiver::default().archive(source, dest)
}

/// Run the unarchive pipeline with default options.
pub fn unarchive(source: impl AsRef<Path>, dest: impl AsRef<Path>) -> Result<u64> {
    Archiver::default().unarchive(source, dest)
}

enum CopyError {
    Read(io::Error),
    Write(io::Error),
}

/// `io::copy` that keeps read and write failures apart.
fn copy_stream<R, W>(reader: &mut R, writer: &mut W) -> std::result::Result<u64, CopyError>
where
    R: Read + ?Sized,
    W: Write + ?Sized,
{
    let mut buf = vec![0u8; COPY_BUFFER];
    let mut total = 0u64;
    loop {
        let n = match reader.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(CopyError::Read(e)),
        };
        writer.write_all(&buf[..n]).map_err(CopyError::Write)?;
        total += n as u64;
    }
    Ok(total)
}
