//! Managed block ciphers, hash functions and chaining modes
//!
//! This library provides DES, TripleDES, RC2 and Rijndael block engines, the
//! ECB/CBC/CFB chaining layer with PKCS7, ANSIX923, ISO10126 and zero padding,
//! the MD5, SHA-1, SHA-256, SHA-384, SHA-512 and RIPEMD-160 hashes, HMAC,
//! MACTripleDES and password-based key derivation.
//!
//! # Example
//! ```no_run
//! use managed_crypto::{HashAlgorithm, HashKind, SymmetricAlgorithm, SymmetricKind};
//!
//! // Encrypt and decrypt with a random Rijndael key and IV
//! let aes = SymmetricAlgorithm::new(SymmetricKind::Rijndael);
//! let sealed = aes.encrypt(b"attack at dawn").unwrap();
//! assert_eq!(aes.decrypt(&sealed).unwrap(), b"attack at dawn");
//!
//! // Hash a message
//! let mut sha = HashAlgorithm::new(HashKind::Sha256);
//! let digest = sha.compute_hash(b"abc");
//! println!("SHA-256: {:02x?}", digest);
//! ```

mod error;
mod types;
mod utils;
mod block;
mod des;
mod tripledes;
mod rc2;
mod rijndael;
mod aes;
mod padding;
mod transform;
mod algorithm;
mod md;
mod md5;
mod sha1;
mod sha256;
mod sha512;
mod ripemd160;
mod hash;
mod hmac;
mod mac;
mod derive;
mod base64;
mod stream;
mod random;

pub use error::{CryptoError, Result};
pub use types::*;
pub use block::BlockCipher;
pub use des::{is_semi_weak_key, is_weak_key, Des};
pub use tripledes::{is_weak_key as is_weak_triple_des_key, TripleDes};
pub use rc2::Rc2;
pub use rijndael::{Rijndael, RijndaelReference};
pub use aes::Aes;
pub use padding::{pad, unpad};
pub use transform::SymmetricTransform;
pub use algorithm::{decrypt, encrypt, SymmetricAlgorithm};
pub use md5::Md5;
pub use sha1::Sha1;
pub use sha256::Sha256;
pub use sha512::{Sha384, Sha512};
pub use ripemd160::Ripemd160;
pub use hash::{compute as compute_hash, HashAlgorithm};
pub use hmac::{hmac, Hmac};
pub use mac::MacTripleDes;
pub use derive::{PasswordDeriveBytes, Rfc2898DeriveBytes};
pub use crate::base64::{FromBase64Mode, FromBase64Transform, ToBase64Transform};
pub use stream::CryptoWriter;
pub use random::{fill_random, random_bytes};
