//! CBC-MAC over TripleDES
//!
//! The message is encrypted in CBC mode under a zero IV and the last
//! ciphertext block is the tag. Zero padding is the default; an empty
//! message is treated as one zero block.

use log::debug;
use zeroize::Zeroize;

use crate::error::{CryptoError, Result};
use crate::transform::SymmetricTransform;
use crate::tripledes::TripleDes;
use crate::types::{CipherMode, Direction, PaddingMode};

const BLOCK: usize = TripleDes::BLOCK_SIZE;

pub struct MacTripleDes {
    transform: SymmetricTransform,
    padding: PaddingMode,
    pending: Vec<u8>,
    last: [u8; BLOCK],
    blocks: usize,
    hash_value: Option<Vec<u8>>,
}

impl MacTripleDes {
    /// Create with zero padding from a 16 or 24-byte key
    pub fn new(key: &[u8]) -> Result<Self> {
        Self::with_padding(key, PaddingMode::Zeros)
    }

    pub fn with_padding(key: &[u8], padding: PaddingMode) -> Result<Self> {
        let engine = TripleDes::new(key)?;
        let transform = SymmetricTransform::new(
            Box::new(engine),
            Direction::Encrypt,
            CipherMode::Cbc,
            padding,
            &[0u8; BLOCK],
            64,
        )?;
        debug!("MACTripleDES created, {} padding", padding.as_str());
        Ok(MacTripleDes {
            transform,
            padding,
            pending: Vec::with_capacity(BLOCK),
            last: [0u8; BLOCK],
            blocks: 0,
            hash_value: None,
        })
    }

    /// Tag length in bits
    pub fn hash_size(&self) -> usize {
        BLOCK * 8
    }

    pub fn update(&mut self, data: &[u8]) -> Result<()> {
        self.hash_value = None;
        self.pending.extend_from_slice(data);

        let full = self.pending.len() / BLOCK * BLOCK;
        if full > 0 {
            let mut out = self.transform.transform_block(&self.pending[..full])?;
            self.last.copy_from_slice(&out[full - BLOCK..]);
            out.zeroize();
            self.pending.drain(..full);
            self.blocks += full / BLOCK;
        }
        Ok(())
    }

    /// Produce the tag and start over with the same key
    pub fn finish(&mut self) -> Result<Vec<u8>> {
        let mut tail = std::mem::take(&mut self.pending);
        if tail.is_empty() && self.blocks == 0 && !self.padding.carries_length() {
            tail = vec![0u8; BLOCK];
        }

        let result = self.transform.transform_final_block(&tail);
        tail.zeroize();
        self.blocks = 0;
        let mut out = result?;

        if out.len() >= BLOCK {
            self.last.copy_from_slice(&out[out.len() - BLOCK..]);
        }
        out.zeroize();

        let tag = self.last.to_vec();
        self.last.zeroize();
        self.hash_value = Some(tag.clone());
        Ok(tag)
    }

    /// Authenticate a complete message, discarding any buffered input first
    pub fn compute(&mut self, data: &[u8]) -> Result<Vec<u8>> {
        self.initialize();
        self.update(data)?;
        self.finish()
    }

    pub fn hash_value(&self) -> Result<&[u8]> {
        self.hash_value
            .as_deref()
            .ok_or(CryptoError::NotYetComputed)
    }

    pub fn initialize(&mut self) {
        self.transform.reset();
        self.pending.zeroize();
        self.pending.clear();
        self.last.zeroize();
        self.blocks = 0;
        self.hash_value = None;
    }
}

impl Drop for MacTripleDes {
    fn drop(&mut self) {
        self.pending.zeroize();
        self.last.zeroize();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEY: &str = "0123456789abcdeffedcba987654321089abcdef01234567";

    fn mac(data: &[u8]) -> String {
        let mut m = MacTripleDes::new(&hex::decode(KEY).unwrap()).unwrap();
        hex::encode(m.compute(data).unwrap())
    }

    #[test]
    fn test_known_tags() {
        assert_eq!(mac(b"Now is the time for all "), "b2fbd705b999b15d");
        assert_eq!(mac(b"abc"), "aed87edc7ab55c01");
        assert_eq!(mac(b""), "3fd539e3abeb8b5b");
    }

    #[test]
    fn test_pkcs7_padding() {
        let mut m =
            MacTripleDes::with_padding(&hex::decode(KEY).unwrap(), PaddingMode::Pkcs7).unwrap();
        assert_eq!(hex::encode(m.compute(b"abc").unwrap()), "0de5de89efd287c9");
    }

    #[test]
    fn test_incremental_matches_one_shot() {
        let mut m = MacTripleDes::new(&hex::decode(KEY).unwrap()).unwrap();
        m.update(b"Now is the ").unwrap();
        m.update(b"time for all ").unwrap();
        let tag = m.finish().unwrap();
        assert_eq!(hex::encode(&tag), "b2fbd705b999b15d");
        assert_eq!(m.hash_value().unwrap(), tag.as_slice());

        // Reusable after finish
        m.update(b"abc").unwrap();
        assert_eq!(hex::encode(m.finish().unwrap()), "aed87edc7ab55c01");
    }

    #[test]
    fn test_rejects_weak_key() {
        let key = [0x01u8; 16];
        assert!(matches!(MacTripleDes::new(&key), Err(CryptoError::WeakKey)));
    }
}
