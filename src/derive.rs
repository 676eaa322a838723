//! Password-based key derivation
//!
//! `PasswordDeriveBytes` is PBKDF1 (iterated hash of password || salt) and
//! can produce at most one digest of output. `Rfc2898DeriveBytes` is PBKDF2
//! with HMAC as the pseudo-random function; successive `get_bytes` calls
//! continue the same output stream until `reset`.

use log::debug;
use zeroize::Zeroize;

use crate::error::{CryptoError, Result};
use crate::hash;
use crate::hmac::Hmac;
use crate::random;
use crate::types::HashKind;
use crate::utils::xor_in_place;

/// Smallest salt `Rfc2898DeriveBytes` accepts, in bytes
pub const MIN_SALT_SIZE: usize = 8;

pub struct PasswordDeriveBytes {
    password: Vec<u8>,
    salt: Vec<u8>,
    hash: HashKind,
    iterations: u32,
    derived: Option<Vec<u8>>,
    position: usize,
}

impl PasswordDeriveBytes {
    /// SHA-1 with 100 iterations
    pub fn new(password: &[u8], salt: &[u8]) -> Self {
        PasswordDeriveBytes {
            password: password.to_vec(),
            salt: salt.to_vec(),
            hash: HashKind::Sha1,
            iterations: 100,
            derived: None,
            position: 0,
        }
    }

    pub fn with_params(password: &[u8], salt: &[u8], hash: HashKind, iterations: u32) -> Result<Self> {
        if iterations == 0 {
            return Err(CryptoError::InvalidIterationCount);
        }
        let mut pdb = Self::new(password, salt);
        pdb.hash = hash;
        pdb.iterations = iterations;
        Ok(pdb)
    }

    pub fn salt(&self) -> &[u8] {
        &self.salt
    }

    pub fn hash_kind(&self) -> HashKind {
        self.hash
    }

    pub fn iteration_count(&self) -> u32 {
        self.iterations
    }

    /// Next `n` bytes of the derived key
    pub fn get_bytes(&mut self, n: usize) -> Result<Vec<u8>> {
        let max = self.hash.digest_size() - self.position;
        if n > max {
            return Err(CryptoError::OutputTooLong { requested: n, max });
        }
        let derived = match self.derived.take() {
            Some(derived) => derived,
            None => self.derive(),
        };
        let out = derived[self.position..self.position + n].to_vec();
        self.derived = Some(derived);
        self.position += n;
        Ok(out)
    }

    /// Start the output over from the first byte
    pub fn reset(&mut self) {
        self.position = 0;
    }

    fn derive(&self) -> Vec<u8> {
        debug!(
            "PBKDF1-{}: {} iterations",
            self.hash.as_str(),
            self.iterations
        );
        let mut input = Vec::with_capacity(self.password.len() + self.salt.len());
        input.extend_from_slice(&self.password);
        input.extend_from_slice(&self.salt);

        let mut t = hash::compute(self.hash, &input);
        input.zeroize();
        for _ in 1..self.iterations {
            let next = hash::compute(self.hash, &t);
            t.zeroize();
            t = next;
        }
        t
    }
}

impl Drop for PasswordDeriveBytes {
    fn drop(&mut self) {
        self.password.zeroize();
        if let Some(derived) = self.derived.as_mut() {
            derived.zeroize();
        }
    }
}

pub struct Rfc2898DeriveBytes {
    prf: Hmac,
    salt: Vec<u8>,
    iterations: u32,
    block_index: u32,
    /// Unconsumed tail of the last generated block
    buffer: Vec<u8>,
}

impl Rfc2898DeriveBytes {
    /// HMAC-SHA1
    pub fn new(password: &[u8], salt: &[u8], iterations: u32) -> Result<Self> {
        Self::with_hash(password, salt, iterations, HashKind::Sha1)
    }

    pub fn with_hash(
        password: &[u8],
        salt: &[u8],
        iterations: u32,
        hash: HashKind,
    ) -> Result<Self> {
        if salt.len() < MIN_SALT_SIZE {
            return Err(CryptoError::InvalidInput(format!(
                "salt must be at least {} bytes, got {}",
                MIN_SALT_SIZE,
                salt.len()
            )));
        }
        if iterations == 0 {
            return Err(CryptoError::InvalidIterationCount);
        }
        debug!("PBKDF2-HMAC-{}: {} iterations", hash.as_str(), iterations);
        Ok(Rfc2898DeriveBytes {
            prf: Hmac::new(hash, password),
            salt: salt.to_vec(),
            iterations,
            block_index: 0,
            buffer: Vec::new(),
        })
    }

    /// Generate a random salt of `salt_size` bytes
    pub fn with_random_salt(password: &[u8], salt_size: usize, iterations: u32) -> Result<Self> {
        Self::new(password, &random::random_bytes(salt_size), iterations)
    }

    pub fn salt(&self) -> &[u8] {
        &self.salt
    }

    pub fn iteration_count(&self) -> u32 {
        self.iterations
    }

    /// Next `n` bytes of the derived key stream
    pub fn get_bytes(&mut self, n: usize) -> Result<Vec<u8>> {
        let mut out = Vec::with_capacity(n);
        while out.len() < n {
            if self.buffer.is_empty() {
                self.buffer = self.next_block(n)?;
            }
            let take = (n - out.len()).min(self.buffer.len());
            out.extend_from_slice(&self.buffer[..take]);
            self.buffer.drain(..take);
        }
        Ok(out)
    }

    /// Start the output stream over
    pub fn reset(&mut self) {
        self.block_index = 0;
        self.buffer.zeroize();
        self.buffer.clear();
    }

    /// `F(P, S, c, i) = U1 ^ U2 ^ ... ^ Uc`
    fn next_block(&mut self, requested: usize) -> Result<Vec<u8>> {
        self.block_index = self.block_index.checked_add(1).ok_or(CryptoError::OutputTooLong {
            requested,
            max: 0,
        })?;

        let mut seed = self.salt.clone();
        seed.extend_from_slice(&self.block_index.to_be_bytes());
        let mut u = self.prf.compute(&seed);
        let mut t = u.clone();
        for _ in 1..self.iterations {
            let next = self.prf.compute(&u);
            u.zeroize();
            u = next;
            xor_in_place(&mut t, &u);
        }
        u.zeroize();
        Ok(t)
    }
}

impl Drop for Rfc2898DeriveBytes {
    fn drop(&mut self) {
        self.buffer.zeroize();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pbkdf1_sha1() {
        let salt = hex::decode("78578e5a5d63cb06").unwrap();
        let mut pdb = PasswordDeriveBytes::with_params(b"password", &salt, HashKind::Sha1, 1000).unwrap();
        assert_eq!(
            hex::encode(pdb.get_bytes(16).unwrap()),
            "dc19847e05c64d2faf10ebfb4a3d2a20"
        );
    }

    #[test]
    fn test_pbkdf1_md5() {
        let salt = hex::decode("78578e5a5d63cb06").unwrap();
        let mut pdb = PasswordDeriveBytes::with_params(b"password", &salt, HashKind::Md5, 1000).unwrap();
        assert_eq!(
            hex::encode(pdb.get_bytes(16).unwrap()),
            "c11246e6b87e77a09ab0643de76e1ea7"
        );
    }

    #[test]
    fn test_pbkdf1_defaults_and_limit() {
        let mut pdb = PasswordDeriveBytes::new(b"password", b"saltsalt");
        assert_eq!(pdb.iteration_count(), 100);
        let first = pdb.get_bytes(8).unwrap();
        let second = pdb.get_bytes(12).unwrap();
        assert_eq!(
            hex::encode([first, second].concat()),
            "18bdc3eebbc968d9ef6289881d0bf99e12896f81"
        );
        assert!(matches!(
            pdb.get_bytes(1),
            Err(CryptoError::OutputTooLong { requested: 1, max: 0 })
        ));

        pdb.reset();
        assert_eq!(pdb.get_bytes(20).unwrap().len(), 20);
        assert!(PasswordDeriveBytes::with_params(b"p", b"s", HashKind::Sha1, 0).is_err());
    }

    #[test]
    fn test_pbkdf2_rfc6070_long() {
        let mut kdf = Rfc2898DeriveBytes::new(
            b"passwordPASSWORDpassword",
            b"saltSALTsaltSALTsaltSALTsaltSALTsalt",
            4096,
        )
        .unwrap();
        assert_eq!(
            hex::encode(kdf.get_bytes(25).unwrap()),
            "3d2eec4fe41c849b80c8d83662c0e44a8b291a964cf2f07038"
        );
    }

    #[test]
    fn test_pbkdf2_sha1_vectors() {
        let mut kdf = Rfc2898DeriveBytes::new(b"password", b"saltsalt", 1).unwrap();
        assert_eq!(
            hex::encode(kdf.get_bytes(20).unwrap()),
            "a4b9cea206445d0c02fdf8aba90cfd9be38b602a"
        );
    }

    #[test]
    fn test_pbkdf2_stream_continues() {
        let expected = "59d86eb82797eb0fa6622ca84d20093d1217870bf9e7b603c3bcae375c3107924d87f76a8ff69b749c5da60ba6";
        let mut kdf = Rfc2898DeriveBytes::new(b"password", b"saltsalt", 2).unwrap();
        let mut out = kdf.get_bytes(7).unwrap();
        out.extend(kdf.get_bytes(30).unwrap());
        out.extend(kdf.get_bytes(8).unwrap());
        assert_eq!(hex::encode(&out), expected);

        kdf.reset();
        assert_eq!(hex::encode(kdf.get_bytes(45).unwrap()), expected);
    }

    #[test]
    fn test_pbkdf2_sha256() {
        let mut kdf = Rfc2898DeriveBytes::with_hash(b"password", b"NaClNaCl", 1000, HashKind::Sha256).unwrap();
        assert_eq!(
            hex::encode(kdf.get_bytes(32).unwrap()),
            "0b9cecf544fa82c804a930db96987c2d7c689865a781394f4ea6bf5f28bd97b4"
        );
    }

    #[test]
    fn test_pbkdf2_parameter_checks() {
        assert!(matches!(
            Rfc2898DeriveBytes::new(b"password", b"salt", 1000),
            Err(CryptoError::InvalidInput(_))
        ));
        assert!(matches!(
            Rfc2898DeriveBytes::new(b"password", b"saltsalt", 0),
            Err(CryptoError::InvalidIterationCount)
        ));
        let kdf = Rfc2898DeriveBytes::with_random_salt(b"password", 16, 10).unwrap();
        assert_eq!(kdf.salt().len(), 16);
    }
}
