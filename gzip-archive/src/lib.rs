use flate2::bufread::{GzDecoder, MultiGzDecoder};
use flate2::write::GzEncoder;
use flate2::Compression;
use std::io::{self, BufReader, BufWriter, Read, Write};

/// Settings for gzip compression/decompression.
///
/// Notes:
/// - `level` follows zlib semantics: 0 stores, 9 is slowest/smallest.
/// - `multi_member` makes the decoder continue past the first gzip member,
///   which is what `gzip -d` does with concatenated streams.
#[derive(Clone, Debug)]
pub struct GzipOptions {
    /// Compression level, clamped to 0-9.
    pub level: u32,

    /// Buffer size used for file/stream IO wrappers.
    pub buffer_size: usize,

    /// Decode every concatenated member instead of stopping after the first.
    pub multi_member: bool,
}

impl Default for GzipOptions {
    fn default() -> Self {
        Self {
            level: 6,
            buffer_size: 1024 * 1024, // 1 MiB
            multi_member: true,
        }
    }
}

/// Encoder produced by [`GzipCodec::encoder`]. Must be passed to [`finish`].
pub type Encoder<W> = GzEncoder<BufWriter<W>>;

/// Buffered gzip reader, single or multi-member depending on options.
pub enum Decoder<R: Read> {
    Single(GzDecoder<BufReader<R>>),
    Multi(MultiGzDecoder<BufReader<R>>),
}

impl<R: Read> Read for Decoder<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self {
            Decoder::Single(d) => d.read(buf),
            Decoder::Multi(d) => d.read(buf),
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct GzipCodec {
    opts: GzipOptions,
}

impl GzipCodec {
    pub fn new(opts: GzipOptions) -> Self {
        Self { opts }
    }

    pub fn options(&self) -> &GzipOptions {
        &self.opts
    }

    fn compression(&self) -> Compression {
        Compression::new(self.opts.level.min(9))
    }

    /// Wrap `writer` in a buffered gzip encoder.
    pub fn encoder<W: Write>(&self, writer: W) -> Encoder<W> {
        let writer = BufWriter::with_capacity(self.opts.buffer_size, writer);
        GzEncoder::new(writer, self.compression())
    }

    /// Wrap `reader` in a buffered gzip decoder.
    pub fn decoder<R: Read>(&self, reader: R) -> Decoder<R> {
        let reader = BufReader::with_capacity(self.opts.buffer_size, reader);
        if self.opts.multi_member {
            Decoder::Multi(MultiGzDecoder::new(reader))
        } else {
            Decoder::Single(GzDecoder::new(reader))
        }
    }

    /// Compress an in-memory buffer.
    pub fn compress_bytes(&self, input: &[u8]) -> io::Result<Vec<u8>> {
        let mut encoder = self.encoder(Vec::new());
        encoder.write_all(input)?;
        finish(encoder)
    }

    /// Decompress an in-memory buffer.
    pub fn decompress_bytes(&self, input: &[u8]) -> io::Result<Vec<u8>> {
        let mut out = Vec::new();
        self.decoder(input).read_to_end(&mut out)?;
        Ok(out)
    }
}

/// Write the gzip trailer and flush the buffer, returning the inner writer.
///
/// Dropping an [`Encoder`] instead also writes the trailer, but any error is
/// lost and the output may be truncated.
pub fn finish<W: Write>(encoder: Encoder<W>) -> io::Result<W> {
    let buffered = encoder.finish()?;
    buffered.into_inner().map_err(|e| e.into_error())
}

/// True when a decoder error means the input is not a valid gzip stream
/// (bad header, corrupt deflate data, CRC/length mismatch, truncation).
pub fn is_format_error(err: &io::Error) -> bool {
    matches!(
        err.kind(),
        io::ErrorKind::InvalidInput | io::ErrorKind::InvalidData | io::ErrorKind::UnexpectedEof
    )
}
