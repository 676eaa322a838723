//! Base64 encoding and decoding as block transforms

use ::base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use log::debug;

use crate::error::{CryptoError, Result};

/// Encodes 3-byte input blocks into 4-byte output blocks
#[derive(Debug, Default)]
pub struct ToBase64Transform;

impl ToBase64Transform {
    pub fn new() -> Self {
        ToBase64Transform
    }

    pub fn input_block_size(&self) -> usize {
        3
    }

    pub fn output_block_size(&self) -> usize {
        4
    }

    /// Encode whole 3-byte blocks
    pub fn transform_block(&mut self, input: &[u8]) -> Result<Vec<u8>> {
        if input.is_empty() || input.len() % 3 != 0 {
            return Err(CryptoError::InvalidBlockSize(format!(
                "{} bytes is not a multiple of 3",
                input.len()
            )));
        }
        Ok(BASE64.encode(input).into_bytes())
    }

    /// Encode the tail of the input, with `=` padding
    pub fn transform_final_block(&mut self, input: &[u8]) -> Result<Vec<u8>> {
        Ok(BASE64.encode(input).into_bytes())
    }
}

/// Whether `FromBase64Transform` skips whitespace in its input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FromBase64Mode {
    IgnoreWhiteSpaces,
    DoNotIgnoreWhiteSpaces,
}

impl Default for FromBase64Mode {
    fn default() -> Self {
        FromBase64Mode::IgnoreWhiteSpaces
    }
}

/// Decodes Base64 text, buffering characters until a full quad is available
#[derive(Debug, Default)]
pub struct FromBase64Transform {
    mode: FromBase64Mode,
    pending: Vec<u8>,
}

impl FromBase64Transform {
    pub fn new() -> Self {
        Self::with_mode(FromBase64Mode::default())
    }

    pub fn with_mode(mode: FromBase64Mode) -> Self {
        FromBase64Transform {
            mode,
            pending: Vec::new(),
        }
    }

    pub fn input_block_size(&self) -> usize {
        1
    }

    pub fn output_block_size(&self) -> usize {
        3
    }

    /// Decode every complete quad seen so far
    pub fn transform_block(&mut self, input: &[u8]) -> Result<Vec<u8>> {
        self.accept(input);
        let whole = self.pending.len() / 4 * 4;
        let out = self.decode(whole)?;
        self.pending.drain(..whole);
        Ok(out)
    }

    /// Decode the rest of the input; leftover characters that do not form a
    /// quad are an error
    pub fn transform_final_block(&mut self, input: &[u8]) -> Result<Vec<u8>> {
        self.accept(input);
        let result = if self.pending.len() % 4 != 0 {
            Err(CryptoError::InvalidBase64(format!(
                "{} trailing characters do not form a quad",
                self.pending.len() % 4
            )))
        } else {
            self.decode(self.pending.len())
        };
        self.reset();
        result
    }

    pub fn reset(&mut self) {
        self.pending.clear();
    }

    fn accept(&mut self, input: &[u8]) {
        match self.mode {
            FromBase64Mode::IgnoreWhiteSpaces => self
                .pending
                .extend(input.iter().filter(|b| !b.is_ascii_whitespace())),
            FromBase64Mode::DoNotIgnoreWhiteSpaces => self.pending.extend_from_slice(input),
        }
    }

    fn decode(&self, len: usize) -> Result<Vec<u8>> {
        BASE64.decode(&self.pending[..len]).map_err(|e| {
            debug!("base64 decode failed: {}", e);
            CryptoError::InvalidBase64(e.to_string())
        })
    }
}
