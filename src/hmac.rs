//! Keyed-hash message authentication (RFC 2104)
//!
//! `HMAC(K, m) = H((K' ^ opad) || H((K' ^ ipad) || m))` where `K'` is the key
//! zero-extended to the hash block size, or first hashed if it is longer.

use log::debug;
use zeroize::Zeroize;

use crate::error::{CryptoError, Result};
use crate::hash::{self, Engine};
use crate::random;
use crate::types::HashKind;

const IPAD: u8 = 0x36;
const OPAD: u8 = 0x5c;

/// HMAC over any supported hash
pub struct Hmac {
    kind: HashKind,
    inner: Engine,
    ipad: Vec<u8>,
    opad: Vec<u8>,
    hash_value: Option<Vec<u8>>,
}

impl Hmac {
    pub fn new(kind: HashKind, key: &[u8]) -> Self {
        let block = kind.block_size();
        let mut k = if key.len() > block {
            hash::compute(kind, key)
        } else {
            key.to_vec()
        };
        k.resize(block, 0);

        let ipad: Vec<u8> = k.iter().map(|b| b ^ IPAD).collect();
        let opad: Vec<u8> = k.iter().map(|b| b ^ OPAD).collect();
        k.zeroize();

        debug!("HMAC-{} created, {}-byte key", kind.as_str(), key.len());

        let mut inner = Engine::new(kind);
        inner.update(&ipad);
        Hmac {
            kind,
            inner,
            ipad,
            opad,
            hash_value: None,
        }
    }

    /// Create with a random key one hash block long
    pub fn with_random_key(kind: HashKind) -> Self {
        let mut key = random::random_bytes(kind.block_size());
        let mac = Self::new(kind, &key);
        key.zeroize();
        mac
    }

    pub fn kind(&self) -> HashKind {
        self.kind
    }

    /// Tag length in bits
    pub fn hash_size(&self) -> usize {
        self.kind.digest_size() * 8
    }

    pub fn update(&mut self, data: &[u8]) {
        self.hash_value = None;
        self.inner.update(data);
    }

    /// Produce the tag; the key stays loaded for the next message
    pub fn finish(&mut self) -> Vec<u8> {
        let mut inner_digest = self.inner.finish();
        self.inner.update(&self.ipad);

        let mut outer = Engine::new(self.kind);
        outer.update(&self.opad);
        outer.update(&inner_digest);
        inner_digest.zeroize();

        let tag = outer.finish();
        self.hash_value = Some(tag.clone());
        tag
    }

    /// Authenticate a complete message, discarding any buffered input first
    pub fn compute(&mut self, data: &[u8]) -> Vec<u8> {
        self.initialize();
        self.update(data);
        self.finish()
    }

    /// Check `tag` against the tag of the buffered message
    pub fn verify(&mut self, tag: &[u8]) -> bool {
        let expected = self.finish();
        crate::utils::constant_time_eq(&expected, tag)
    }

    pub fn hash_value(&self) -> Result<&[u8]> {
        self.hash_value
            .as_deref()
            .ok_or(CryptoError::NotYetComputed)
    }

    pub fn initialize(&mut self) {
        self.inner = Engine::new(self.kind);
        self.inner.update(&self.ipad);
        if let Some(mut value) = self.hash_value.take() {
            value.zeroize();
        }
    }
}

impl Drop for Hmac {
    fn drop(&mut self) {
        self.ipad.zeroize();
        self.opad.zeroize();
        if let Some(value) = self.hash_value.as_mut() {
            value.zeroize();
        }
    }
}

/// One-shot HMAC
pub fn hmac(kind: HashKind, key: &[u8], data: &[u8]) -> Vec<u8> {
    Hmac::new(kind, key).compute(data)
}
