use std::io::{self, Read, Write};

use tracing::debug;

use crate::Error;

/// Every SRF container is padded so its length is a multiple of this block size
pub(crate) const PAD_BLOCK: u64 = 256;
/// Fill byte used for trailer padding
pub(crate) const PAD_BYTE: u8 = 0xFF;

/// A [`Write`] adapter that keeps a running additive modulo-256 sum of every
/// byte physically written through it, padding included.
///
/// The accumulator is scoped to one encode: wrap the output stream, write the
/// whole container through the wrapper, then call [`Self::finalize`] exactly
/// once to emit the 0xFF padding and the trailing check byte. The check byte
/// is chosen so that the completed file's byte sum is 0 modulo 256.
pub struct ChecksumWriter<W: Write> {
    inner: W,
    sum: u8,
    written: u64,
}

impl<W: Write> ChecksumWriter<W> {
    pub(crate) fn new(inner: W) -> Self {
        Self {
            inner,
            sum: 0,
            written: 0,
        }
    }

    /// Running byte sum modulo 256
    pub(crate) const fn sum(&self) -> u8 {
        self.sum
    }

    /// Number of bytes written through the wrapper so far
    pub(crate) const fn bytes_written(&self) -> u64 {
        self.written
    }

    /// Pads the stream with 0xFF to one byte short of the next 256-byte
    /// boundary, writes the check byte, flushes, and returns the inner writer.
    ///
    /// The padding bytes themselves are counted into the sum; the check byte
    /// is the value that brings the total to 0 modulo 256.
    pub(crate) fn finalize(mut self) -> io::Result<W> {
        let pad = (PAD_BLOCK - 1) - (self.written % PAD_BLOCK);
        debug!("padding trailer with {pad} fill bytes (sum so far: {})", self.sum);
        for _ in 0..pad {
            self.write_all(&[PAD_BYTE])?;
        }
        let check = self.sum.wrapping_neg();
        self.inner.write_all(&[check])?;
        self.written += 1;
        self.inner.flush()?;
        debug!("wrote check byte {check:#04x}, total length {}", self.written);
        Ok(self.inner)
    }
}

impl<W: Write> Write for ChecksumWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let n = self.inner.write(buf)?;
        for &b in &buf[..n] {
            self.sum = self.sum.wrapping_add(b);
        }
        self.written += n as u64;
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

/// Sums every byte of an already-encoded container.
///
/// The format only defines a write-time check byte; the original consumer
/// never verifies it on read, so neither does the default decode path. This
/// helper backs the opt-in verification mode.
///
/// # Errors
///
/// Returns [`Error::ChecksumMismatch`] if the byte sum is not 0 modulo 256 or
/// the length is not a multiple of the padding block, and [`Error::Io`] on
/// read failure.
pub fn verify_reader(mut r: impl Read) -> Result<(), Error> {
    let mut sum = 0u8;
    let mut length = 0u64;
    let mut buf = [0u8; 8192];
    loop {
        let n = r.read(&mut buf)?;
        if n == 0 {
            break;
        }
        for &b in &buf[..n] {
            sum = sum.wrapping_add(b);
        }
        length += n as u64;
    }
    if sum != 0 || length % PAD_BLOCK != 0 {
        return Err(Error::ChecksumMismatch {
            remainder: sum,
            length,
        });
    }
    Ok(())
}
