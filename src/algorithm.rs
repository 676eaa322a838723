//! Symmetric algorithm configuration and transform factory
//!
//! `SymmetricAlgorithm` carries the key, IV and mode settings for one cipher
//! family and hands out encryptors and decryptors. A fresh instance has a
//! random key of the default size and a random IV.

use log::{debug, warn};
use zeroize::Zeroize;

use crate::block::BlockCipher;
use crate::des::{self, Des};
use crate::error::{CryptoError, Result};
use crate::random;
use crate::rc2::Rc2;
use crate::rijndael::Rijndael;
use crate::transform::SymmetricTransform;
use crate::tripledes::{self, TripleDes};
use crate::types::{CipherMode, Direction, KeySizes, PaddingMode, SymmetricKind};

pub struct SymmetricAlgorithm {
    kind: SymmetricKind,
    key: Vec<u8>,
    iv: Vec<u8>,
    mode: CipherMode,
    padding: PaddingMode,
    /// Block size in bits
    block_size: u32,
    /// CFB feedback size in bits
    feedback_size: u32,
    /// RC2 only; `None` follows the key size
    effective_key_size: Option<u32>,
}

impl SymmetricAlgorithm {
    pub fn new(kind: SymmetricKind) -> Self {
        let mut alg = SymmetricAlgorithm {
            kind,
            key: Vec::new(),
            iv: Vec::new(),
            mode: CipherMode::default(),
            padding: PaddingMode::default(),
            block_size: kind.default_block_size(),
            feedback_size: kind.default_feedback_size(),
            effective_key_size: None,
        };
        alg.generate_key_of(kind.default_key_size());
        alg.generate_iv();
        alg
    }

    /// Create from an algorithm name such as "TripleDES" or
    /// "System.Security.Cryptography.Rijndael"
    pub fn create(name: &str) -> Result<Self> {
        Ok(Self::new(name.parse()?))
    }

    pub fn kind(&self) -> SymmetricKind {
        self.kind
    }

    pub fn legal_key_sizes(&self) -> &'static [KeySizes] {
        self.kind.legal_key_sizes()
    }

    pub fn legal_block_sizes(&self) -> &'static [KeySizes] {
        self.kind.legal_block_sizes()
    }

    /// Whether `bits` is a legal key size for this algorithm
    pub fn valid_key_size(&self, bits: u32) -> bool {
        self.legal_key_sizes().iter().any(|s| s.contains(bits))
    }

    pub fn key(&self) -> &[u8] {
        &self.key
    }

    /// Replace the key, rejecting illegal lengths and weak keys
    pub fn set_key(&mut self, key: &[u8]) -> Result<()> {
        self.validate_key(key)?;
        self.key.zeroize();
        self.key = key.to_vec();
        Ok(())
    }

    /// Key size in bits
    pub fn key_size(&self) -> u32 {
        self.key.len() as u32 * 8
    }

    /// Change the key size, generating a new random key of that size
    pub fn set_key_size(&mut self, bits: u32) -> Result<()> {
        if !self.valid_key_size(bits) {
            return Err(self.key_length_error(bits as usize / 8));
        }
        self.generate_key_of(bits);
        Ok(())
    }

    pub fn iv(&self) -> &[u8] {
        &self.iv
    }

    pub fn set_iv(&mut self, iv: &[u8]) -> Result<()> {
        let expected = self.block_size as usize / 8;
        if iv.len() != expected {
            return Err(CryptoError::InvalidIvLength {
                expected,
                actual: iv.len(),
            });
        }
        self.iv.zeroize();
        self.iv = iv.to_vec();
        Ok(())
    }

    pub fn mode(&self) -> CipherMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: CipherMode) {
        self.mode = mode;
    }

    pub fn padding(&self) -> PaddingMode {
        self.padding
    }

    pub fn set_padding(&mut self, padding: PaddingMode) {
        self.padding = padding;
    }

    /// Block size in bits
    pub fn block_size(&self) -> u32 {
        self.block_size
    }

    /// Change the block size. A new random IV is generated when the size
    /// actually changes.
    pub fn set_block_size(&mut self, bits: u32) -> Result<()> {
        if !self.legal_block_sizes().iter().any(|s| s.contains(bits)) {
            return Err(CryptoError::InvalidBlockSize(format!(
                "{} bits is not a legal {} block size",
                bits,
                self.kind.as_str()
            )));
        }
        if bits != self.block_size {
            self.block_size = bits;
            self.generate_iv();
        }
        Ok(())
    }

    /// CFB feedback size in bits
    pub fn feedback_size(&self) -> u32 {
        self.feedback_size
    }

    pub fn set_feedback_size(&mut self, bits: u32) -> Result<()> {
        if bits == 0 || bits % 8 != 0 || bits > self.block_size {
            return Err(CryptoError::InvalidFeedbackSize(bits));
        }
        self.feedback_size = bits;
        Ok(())
    }

    /// RC2 effective key size in bits
    pub fn effective_key_size(&self) -> u32 {
        self.effective_key_size.unwrap_or_else(|| self.key_size())
    }

    pub fn set_effective_key_size(&mut self, bits: u32) -> Result<()> {
        if self.kind != SymmetricKind::Rc2 {
            return Err(CryptoError::UnsupportedParameter(format!(
                "effective key size on {}",
                self.kind.as_str()
            )));
        }
        if !self.valid_key_size(bits) {
            return Err(CryptoError::InvalidEffectiveKeySize(bits));
        }
        self.effective_key_size = Some(bits);
        Ok(())
    }

    /// Replace the key with a random one of the current size
    pub fn generate_key(&mut self) {
        self.generate_key_of(self.key_size());
    }

    /// Replace the IV with a random one block long
    pub fn generate_iv(&mut self) {
        self.iv.zeroize();
        self.iv = random::random_bytes(self.block_size as usize / 8);
    }

    pub fn create_encryptor(&self) -> Result<SymmetricTransform> {
        self.create_transform(Direction::Encrypt, &self.key, &self.iv)
    }

    pub fn create_decryptor(&self) -> Result<SymmetricTransform> {
        self.create_transform(Direction::Decrypt, &self.key, &self.iv)
    }

    /// Encryptor for an explicit key and IV, using this instance's settings
    pub fn create_encryptor_with(&self, key: &[u8], iv: &[u8]) -> Result<SymmetricTransform> {
        self.validate_key(key)?;
        self.create_transform(Direction::Encrypt, key, iv)
    }

    pub fn create_decryptor_with(&self, key: &[u8], iv: &[u8]) -> Result<SymmetricTransform> {
        self.validate_key(key)?;
        self.create_transform(Direction::Decrypt, key, iv)
    }

    /// Encrypt a complete message
    pub fn encrypt(&self, data: &[u8]) -> Result<Vec<u8>> {
        let mut transform = self.create_encryptor()?;
        run(&mut transform, data)
    }

    /// Decrypt a complete message
    pub fn decrypt(&self, data: &[u8]) -> Result<Vec<u8>> {
        let mut transform = self.create_decryptor()?;
        run(&mut transform, data)
    }

    fn generate_key_of(&mut self, bits: u32) {
        let len = bits as usize / 8;
        let mut key = random::random_bytes(len);
        while self.validate_key(&key).is_err() {
            debug!("regenerating {} key", self.kind.as_str());
            random::fill_random(&mut key);
        }
        self.key.zeroize();
        self.key = key;
    }

    fn key_length_error(&self, actual: usize) -> CryptoError {
        let expected = self
            .legal_key_sizes()
            .iter()
            .map(|s| s.to_string())
            .collect::<Vec<_>>()
            .join(", ");
        CryptoError::InvalidKeyLength { expected, actual }
    }

    fn validate_key(&self, key: &[u8]) -> Result<()> {
        if !self.valid_key_size(key.len() as u32 * 8) {
            return Err(self.key_length_error(key.len()));
        }
        match self.kind {
            SymmetricKind::Des => des::check_key(key),
            SymmetricKind::TripleDes => {
                if tripledes::is_weak_key(key)? {
                    warn!("rejected weak TripleDES key");
                    return Err(CryptoError::WeakKey);
                }
                Ok(())
            }
            _ => Ok(()),
        }
    }

    fn engine(&self, key: &[u8]) -> Result<Box<dyn BlockCipher>> {
        let engine: Box<dyn BlockCipher> = match self.kind {
            SymmetricKind::Des => Box::new(Des::new(key)?),
            SymmetricKind::TripleDes => Box::new(TripleDes::new(key)?),
            SymmetricKind::Rc2 => {
                let effective = self.effective_key_size.unwrap_or(key.len() as u32 * 8);
                Box::new(Rc2::new(key, effective)?)
            }
            SymmetricKind::Rijndael => Box::new(Rijndael::new(key, self.block_size)?),
        };
        Ok(engine)
    }

    fn create_transform(
        &self,
        direction: Direction,
        key: &[u8],
        iv: &[u8],
    ) -> Result<SymmetricTransform> {
        let engine = self.engine(key)?;
        SymmetricTransform::new(
            engine,
            direction,
            self.mode,
            self.padding,
            iv,
            self.feedback_size,
        )
    }
}

impl Drop for SymmetricAlgorithm {
    fn drop(&mut self) {
        self.key.zeroize();
        self.iv.zeroize();
    }
}

/// Push a whole message through `transform`: every full block but the last
/// through `transform_block`, the rest through `transform_final_block`.
fn run(transform: &mut SymmetricTransform, data: &[u8]) -> Result<Vec<u8>> {
    let segment = transform.input_block_size();
    let leading = data.len().saturating_sub(1) / segment * segment;

    let mut out = if leading > 0 {
        transform.transform_block(&data[..leading])?
    } else {
        Vec::with_capacity(data.len() + segment)
    };
    out.extend_from_slice(&transform.transform_final_block(&data[leading..])?);
    Ok(out)
}

fn configured(
    kind: SymmetricKind,
    key: &[u8],
    iv: &[u8],
    mode: CipherMode,
    padding: PaddingMode,
) -> Result<SymmetricAlgorithm> {
    let mut alg = SymmetricAlgorithm::new(kind);
    alg.set_mode(mode);
    alg.set_padding(padding);
    if mode != CipherMode::Ecb {
        if kind == SymmetricKind::Rijndael {
            alg.set_block_size(iv.len() as u32 * 8)?;
        }
        alg.set_iv(iv)?;
    }
    alg.set_key(key)?;
    Ok(alg)
}

/// Encrypt `data` in one call. For Rijndael the block size follows the IV.
pub fn encrypt(
    kind: SymmetricKind,
    key: &[u8],
    iv: &[u8],
    mode: CipherMode,
    padding: PaddingMode,
    data: &[u8],
) -> Result<Vec<u8>> {
    configured(kind, key, iv, mode, padding)?.encrypt(data)
}

/// Decrypt `data` in one call. For Rijndael the block size follows the IV.
pub fn decrypt(
    kind: SymmetricKind,
    key: &[u8],
    iv: &[u8],
    mode: CipherMode,
    padding: PaddingMode,
    data: &[u8],
) -> Result<Vec<u8>> {
    configured(kind, key, iv, mode, padding)?.decrypt(data)
}
