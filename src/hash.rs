//! Hash algorithm selection and the finalize-then-read hash object

use log::debug;
use zeroize::Zeroize;

use crate::error::{CryptoError, Result};
use crate::md5::Md5;
use crate::ripemd160::Ripemd160;
use crate::sha1::Sha1;
use crate::sha256::Sha256;
use crate::sha512::{Sha384, Sha512};
use crate::types::HashKind;

/// Running state of one of the supported engines
pub(crate) enum Engine {
    Md5(Md5),
    Sha1(Sha1),
    Sha256(Sha256),
    Sha384(Sha384),
    Sha512(Sha512),
    Ripemd160(Ripemd160),
}

impl Engine {
    pub fn new(kind: HashKind) -> Self {
        match kind {
            HashKind::Md5 => Engine::Md5(Md5::new()),
            HashKind::Sha1 => Engine::Sha1(Sha1::new()),
            HashKind::Sha256 => Engine::Sha256(Sha256::new()),
            HashKind::Sha384 => Engine::Sha384(Sha384::new()),
            HashKind::Sha512 => Engine::Sha512(Sha512::new()),
            HashKind::Ripemd160 => Engine::Ripemd160(Ripemd160::new()),
        }
    }

    pub fn update(&mut self, data: &[u8]) {
        match self {
            Engine::Md5(h) => h.update(data),
            Engine::Sha1(h) => h.update(data),
            Engine::Sha256(h) => h.update(data),
            Engine::Sha384(h) => h.update(data),
            Engine::Sha512(h) => h.update(data),
            Engine::Ripemd160(h) => h.update(data),
        }
    }

    /// Digest the buffered message; the engine is back in its initial state
    pub fn finish(&mut self) -> Vec<u8> {
        match self {
            Engine::Md5(h) => h.finish().to_vec(),
            Engine::Sha1(h) => h.finish().to_vec(),
            Engine::Sha256(h) => h.finish().to_vec(),
            Engine::Sha384(h) => h.finish().to_vec(),
            Engine::Sha512(h) => h.finish().to_vec(),
            Engine::Ripemd160(h) => h.finish().to_vec(),
        }
    }
}

/// Hash `data` in one call
pub fn compute(kind: HashKind, data: &[u8]) -> Vec<u8> {
    let mut engine = Engine::new(kind);
    engine.update(data);
    engine.finish()
}

/// Incremental hash object that keeps the last finalized digest
///
/// Data is fed with [`update`](Self::update); [`finish`](Self::finish)
/// produces the digest, stores it for [`hash_value`](Self::hash_value) and
/// leaves the object ready for a new message.
pub struct HashAlgorithm {
    kind: HashKind,
    engine: Engine,
    hash_value: Option<Vec<u8>>,
}

impl HashAlgorithm {
    pub fn new(kind: HashKind) -> Self {
        debug!("{} hash created", kind.as_str());
        HashAlgorithm {
            kind,
            engine: Engine::new(kind),
            hash_value: None,
        }
    }

    /// Create a hash object from an algorithm name such as "SHA256" or
    /// "System.Security.Cryptography.MD5"
    pub fn create(name: &str) -> Result<Self> {
        Ok(Self::new(name.parse()?))
    }

    pub fn kind(&self) -> HashKind {
        self.kind
    }

    /// Digest length in bits
    pub fn hash_size(&self) -> usize {
        self.kind.digest_size() * 8
    }

    pub fn update(&mut self, data: &[u8]) {
        self.hash_value = None;
        self.engine.update(data);
    }

    /// Feed the last piece of data and finalize
    pub fn transform_final_block(&mut self, data: &[u8]) -> Vec<u8> {
        self.update(data);
        self.finish()
    }

    pub fn finish(&mut self) -> Vec<u8> {
        let digest = self.engine.finish();
        self.hash_value = Some(digest.clone());
        digest
    }

    /// Hash a complete message, discarding any buffered input first
    pub fn compute_hash(&mut self, data: &[u8]) -> Vec<u8> {
        self.initialize();
        self.transform_final_block(data)
    }

    /// The most recently finalized digest
    pub fn hash_value(&self) -> Result<&[u8]> {
        self.hash_value
            .as_deref()
            .ok_or(CryptoError::NotYetComputed)
    }

    /// Drop buffered input and the stored digest
    pub fn initialize(&mut self) {
        self.engine = Engine::new(self.kind);
        if let Some(mut value) = self.hash_value.take() {
            value.zeroize();
        }
    }
}

impl Drop for HashAlgorithm {
    fn drop(&mut self) {
        if let Some(value) = self.hash_value.as_mut() {
            value.zeroize();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [HashKind; 6] = [
        HashKind::Md5,
        HashKind::Sha1,
        HashKind::Sha256,
        HashKind::Sha384,
        HashKind::Sha512,
        HashKind::Ripemd160,
    ];

    #[test]
    fn test_digest_sizes() {
        for kind in ALL {
            assert_eq!(compute(kind, b"abc").len(), kind.digest_size());
        }
    }

    #[test]
    fn test_hash_value_before_finish() {
        let mut sha = HashAlgorithm::new(HashKind::Sha1);
        assert!(matches!(sha.hash_value(), Err(CryptoError::NotYetComputed)));

        sha.update(b"abc");
        let digest = sha.finish();
        assert_eq!(sha.hash_value().unwrap(), digest.as_slice());

        sha.update(b"more");
        assert!(matches!(sha.hash_value(), Err(CryptoError::NotYetComputed)));
    }

    #[test]
    fn test_chunking_invariance() {
        let message: Vec<u8> = (0..1000u32).map(|i| (i * 7 + 3) as u8).collect();
        for kind in ALL {
            let whole = compute(kind, &message);
            for chunk in [1, 3, 63, 64, 65, 127, 128, 129, 500] {
                let mut h = HashAlgorithm::new(kind);
                for piece in message.chunks(chunk) {
                    h.update(piece);
                }
                assert_eq!(h.finish(), whole, "{} chunk {}", kind.as_str(), chunk);
            }
        }
    }

    #[test]
    fn test_compute_hash_discards_pending_input() {
        let mut md5 = HashAlgorithm::create("MD5").unwrap();
        md5.update(b"leftover");
        assert_eq!(
            hex::encode(md5.compute_hash(b"abc")),
            "900150983cd24fb0d6963f7d28e17f72"
        );
    }

    #[test]
    fn test_create_by_name() {
        let h = HashAlgorithm::create("System.Security.Cryptography.SHA384").unwrap();
        assert_eq!(h.kind(), HashKind::Sha384);
        assert_eq!(h.hash_size(), 384);
        assert!(matches!(
            HashAlgorithm::create("MD4"),
            Err(CryptoError::UnknownAlgorithm(_))
        ));
    }
}
