//! `std::io` adapters for transforms and hashes

use std::io::{self, Write};

use log::trace;
use zeroize::Zeroize;

use crate::error::{CryptoError, Result};
use crate::hash::HashAlgorithm;
use crate::hmac::Hmac;
use crate::transform::SymmetricTransform;
use crate::types::Direction;

fn to_io(e: CryptoError) -> io::Error {
    match e {
        CryptoError::Io(e) => e,
        other => io::Error::new(io::ErrorKind::InvalidData, other),
    }
}

/// Writer that pushes everything written through a `SymmetricTransform`
/// into `inner`.
///
/// Whole blocks are transformed as they arrive. The partial tail is held
/// back, and when decrypting with a length-carrying padding so is the last
/// whole block, so that [`finish`](Self::finish) can hand it to
/// `transform_final_block`.
pub struct CryptoWriter<W: Write> {
    inner: W,
    transform: SymmetricTransform,
    pending: Vec<u8>,
}

impl<W: Write> CryptoWriter<W> {
    pub fn new(inner: W, transform: SymmetricTransform) -> Self {
        CryptoWriter {
            inner,
            transform,
            pending: Vec::new(),
        }
    }

    pub fn get_ref(&self) -> &W {
        &self.inner
    }

    /// Transform the held-back tail, write it, and return the inner writer
    pub fn finish(mut self) -> Result<W> {
        let result = self.transform.transform_final_block(&self.pending);
        self.pending.zeroize();
        let mut out = result?;
        trace!("final block: {} bytes out", out.len());
        let written = self.inner.write_all(&out);
        out.zeroize();
        written?;
        self.inner.flush()?;
        Ok(self.inner)
    }

    /// Number of bytes that can go through `transform_block` now
    fn ready(&self) -> usize {
        let segment = self.transform.input_block_size();
        let mut ready = self.pending.len() / segment * segment;
        if ready > 0
            && ready == self.pending.len()
            && self.transform.direction() == Direction::Decrypt
            && self.transform.padding().carries_length()
        {
            ready -= segment;
        }
        ready
    }
}

impl<W: Write> Write for CryptoWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.pending.extend_from_slice(buf);
        let ready = self.ready();
        if ready > 0 {
            let mut out = self
                .transform
                .transform_block(&self.pending[..ready])
                .map_err(to_io)?;
            self.pending.drain(..ready);
            trace!("{} bytes in, {} bytes out", buf.len(), out.len());
            let written = self.inner.write_all(&out);
            out.zeroize();
            written?;
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

impl Write for HashAlgorithm {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        trace!("{}: {} bytes", self.kind().as_str(), buf.len());
        self.update(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Write for Hmac {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        trace!("HMAC-{}: {} bytes", self.kind().as_str(), buf.len());
        self.update(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
