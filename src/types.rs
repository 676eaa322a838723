//! Core data types shared by the ciphers, hashes and transforms

use std::fmt;
use std::str::FromStr;

use crate::error::CryptoError;

/// Block chaining mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CipherMode {
    Cbc,
    Ecb,
    Ofb,
    Cfb,
    Cts,
}

impl CipherMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            CipherMode::Cbc => "CBC",
            CipherMode::Ecb => "ECB",
            CipherMode::Ofb => "OFB",
            CipherMode::Cfb => "CFB",
            CipherMode::Cts => "CTS",
        }
    }
}

impl Default for CipherMode {
    fn default() -> Self {
        CipherMode::Cbc
    }
}

impl FromStr for CipherMode {
    type Err = CryptoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "CBC" => Ok(CipherMode::Cbc),
            "ECB" => Ok(CipherMode::Ecb),
            "OFB" => Ok(CipherMode::Ofb),
            "CFB" => Ok(CipherMode::Cfb),
            "CTS" => Ok(CipherMode::Cts),
            _ => Err(CryptoError::UnsupportedParameter(format!("cipher mode {}", s))),
        }
    }
}

/// Padding applied to the final block
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaddingMode {
    None,
    Pkcs7,
    Zeros,
    AnsiX923,
    Iso10126,
}

impl PaddingMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaddingMode::None => "None",
            PaddingMode::Pkcs7 => "PKCS7",
            PaddingMode::Zeros => "Zeros",
            PaddingMode::AnsiX923 => "ANSIX923",
            PaddingMode::Iso10126 => "ISO10126",
        }
    }

    /// Whether decryption strips a length-carrying pad from the last block
    pub fn carries_length(&self) -> bool {
        matches!(
            self,
            PaddingMode::Pkcs7 | PaddingMode::AnsiX923 | PaddingMode::Iso10126
        )
    }
}

impl Default for PaddingMode {
    fn default() -> Self {
        PaddingMode::Pkcs7
    }
}

impl FromStr for PaddingMode {
    type Err = CryptoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "NONE" => Ok(PaddingMode::None),
            "PKCS7" => Ok(PaddingMode::Pkcs7),
            "ZEROS" => Ok(PaddingMode::Zeros),
            "ANSIX923" => Ok(PaddingMode::AnsiX923),
            "ISO10126" => Ok(PaddingMode::Iso10126),
            _ => Err(CryptoError::UnsupportedParameter(format!("padding mode {}", s))),
        }
    }
}

/// Direction a transform runs in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Encrypt,
    Decrypt,
}

/// A range of legal sizes in bits: `min..=max` stepping by `skip`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeySizes {
    pub min: u32,
    pub max: u32,
    pub skip: u32,
}

impl KeySizes {
    pub const fn new(min: u32, max: u32, skip: u32) -> Self {
        KeySizes { min, max, skip }
    }

    /// Check whether `bits` falls on one of the legal sizes
    pub fn contains(&self, bits: u32) -> bool {
        if bits < self.min || bits > self.max {
            return false;
        }
        if self.skip == 0 {
            return bits == self.min;
        }
        (bits - self.min) % self.skip == 0
    }
}

impl fmt::Display for KeySizes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.min == self.max {
            write!(f, "{} bits", self.min)
        } else {
            write!(f, "{}..={} bits step {}", self.min, self.max, self.skip)
        }
    }
}

static SIXTY_FOUR_BITS: [KeySizes; 1] = [KeySizes::new(64, 64, 0)];
static TRIPLE_DES_KEY_SIZES: [KeySizes; 1] = [KeySizes::new(128, 192, 64)];
static RC2_KEY_SIZES: [KeySizes; 1] = [KeySizes::new(40, 128, 8)];
static RIJNDAEL_SIZES: [KeySizes; 1] = [KeySizes::new(128, 256, 64)];

/// Symmetric algorithm family
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymmetricKind {
    Des,
    TripleDes,
    Rc2,
    Rijndael,
}

impl SymmetricKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SymmetricKind::Des => "DES",
            SymmetricKind::TripleDes => "TripleDES",
            SymmetricKind::Rc2 => "RC2",
            SymmetricKind::Rijndael => "Rijndael",
        }
    }

    pub fn legal_key_sizes(&self) -> &'static [KeySizes] {
        match self {
            SymmetricKind::Des => &SIXTY_FOUR_BITS,
            SymmetricKind::TripleDes => &TRIPLE_DES_KEY_SIZES,
            SymmetricKind::Rc2 => &RC2_KEY_SIZES,
            SymmetricKind::Rijndael => &RIJNDAEL_SIZES,
        }
    }

    pub fn legal_block_sizes(&self) -> &'static [KeySizes] {
        match self {
            SymmetricKind::Des | SymmetricKind::TripleDes | SymmetricKind::Rc2 => &SIXTY_FOUR_BITS,
            SymmetricKind::Rijndael => &RIJNDAEL_SIZES,
        }
    }

    /// Default key size in bits
    pub fn default_key_size(&self) -> u32 {
        match self {
            SymmetricKind::Des => 64,
            SymmetricKind::TripleDes => 192,
            SymmetricKind::Rc2 => 128,
            SymmetricKind::Rijndael => 256,
        }
    }

    /// Default block size in bits
    pub fn default_block_size(&self) -> u32 {
        match self {
            SymmetricKind::Rijndael => 128,
            _ => 64,
        }
    }

    /// Default CFB feedback size in bits
    pub fn default_feedback_size(&self) -> u32 {
        match self {
            SymmetricKind::Rijndael => 128,
            _ => 8,
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        let short = name
            .strip_prefix("System.Security.Cryptography.")
            .unwrap_or(name)
            .to_ascii_uppercase();
        match short.as_str() {
            "DES" | "DESCRYPTOSERVICEPROVIDER" => Some(SymmetricKind::Des),
            "3DES" | "TRIPLEDES" | "TRIPLE DES" | "TRIPLEDESCRYPTOSERVICEPROVIDER" => {
                Some(SymmetricKind::TripleDes)
            }
            "RC2" | "RC2CRYPTOSERVICEPROVIDER" => Some(SymmetricKind::Rc2),
            "RIJNDAEL" | "RIJNDAELMANAGED" | "AES" => Some(SymmetricKind::Rijndael),
            _ => None,
        }
    }
}

impl FromStr for SymmetricKind {
    type Err = CryptoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SymmetricKind::from_name(s).ok_or_else(|| CryptoError::UnknownAlgorithm(s.to_string()))
    }
}

/// Hash algorithm family
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HashKind {
    Md5,
    Sha1,
    Sha256,
    Sha384,
    Sha512,
    Ripemd160,
}

impl HashKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            HashKind::Md5 => "MD5",
            HashKind::Sha1 => "SHA1",
            HashKind::Sha256 => "SHA256",
            HashKind::Sha384 => "SHA384",
            HashKind::Sha512 => "SHA512",
            HashKind::Ripemd160 => "RIPEMD160",
        }
    }

    /// Digest length in bytes
    pub fn digest_size(&self) -> usize {
        match self {
            HashKind::Md5 => 16,
            HashKind::Sha1 | HashKind::Ripemd160 => 20,
            HashKind::Sha256 => 32,
            HashKind::Sha384 => 48,
            HashKind::Sha512 => 64,
        }
    }

    /// Compression block length in bytes
    pub fn block_size(&self) -> usize {
        match self {
            HashKind::Sha384 | HashKind::Sha512 => 128,
            _ => 64,
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        let short = name
            .strip_prefix("System.Security.Cryptography.")
            .unwrap_or(name)
            .to_ascii_uppercase()
            .replace('-', "");
        match short.as_str() {
            "MD5" | "MD5CRYPTOSERVICEPROVIDER" => Some(HashKind::Md5),
            "SHA" | "SHA1" | "SHA1CRYPTOSERVICEPROVIDER" | "SHA1MANAGED" => Some(HashKind::Sha1),
            "SHA256" | "SHA256MANAGED" => Some(HashKind::Sha256),
            "SHA384" | "SHA384MANAGED" => Some(HashKind::Sha384),
            "SHA512" | "SHA512MANAGED" => Some(HashKind::Sha512),
            "RIPEMD160" | "RIPEMD160MANAGED" => Some(HashKind::Ripemd160),
            _ => None,
        }
    }
}

impl Default for HashKind {
    fn default() -> Self {
        HashKind::Sha1
    }
}

impl FromStr for HashKind {
    type Err = CryptoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        HashKind::from_name(s).ok_or_else(|| CryptoError::UnknownAlgorithm(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_sizes_contains() {
        let rc2 = KeySizes::new(40, 128, 8);
        assert!(rc2.contains(40));
        assert!(rc2.contains(128));
        assert!(rc2.contains(64));
        assert!(!rc2.contains(41));
        assert!(!rc2.contains(136));

        let des = KeySizes::new(64, 64, 0);
        assert!(des.contains(64));
        assert!(!des.contains(56));
    }

    #[test]
    fn test_legal_sizes_for_every_kind() {
        let kinds = [
            SymmetricKind::Des,
            SymmetricKind::TripleDes,
            SymmetricKind::Rc2,
            SymmetricKind::Rijndael,
        ];
        for kind in kinds {
            let keys = kind.legal_key_sizes();
            let blocks = kind.legal_block_sizes();
            assert!(!keys.is_empty() && !blocks.is_empty());
            assert!(keys.iter().any(|k| k.contains(kind.default_key_size())), "{}", kind.as_str());
            assert!(blocks.iter().any(|b| b.contains(kind.default_block_size())));
        }

        assert_eq!(SymmetricKind::Des.legal_key_sizes(), &[KeySizes::new(64, 64, 0)]);
        assert!(SymmetricKind::TripleDes.legal_key_sizes()[0].contains(128));
        assert!(!SymmetricKind::TripleDes.legal_key_sizes()[0].contains(160));
        assert!(SymmetricKind::Rc2.legal_key_sizes()[0].contains(56));
        assert!(SymmetricKind::Rijndael.legal_block_sizes()[0].contains(192));
        assert!(!SymmetricKind::Rc2.legal_block_sizes()[0].contains(128));
    }

    #[test]
    fn test_hash_names() {
        assert_eq!(HashKind::from_name("sha1"), Some(HashKind::Sha1));
        assert_eq!(HashKind::from_name("SHA-256"), Some(HashKind::Sha256));
        assert_eq!(
            HashKind::from_name("System.Security.Cryptography.RIPEMD160"),
            Some(HashKind::Ripemd160)
        );
        assert!("whirlpool".parse::<HashKind>().is_err());
    }

    #[test]
    fn test_symmetric_names() {
        assert_eq!(SymmetricKind::from_name("3des"), Some(SymmetricKind::TripleDes));
        assert_eq!(SymmetricKind::from_name("AES"), Some(SymmetricKind::Rijndael));
        assert_eq!("rc2".parse::<SymmetricKind>().unwrap(), SymmetricKind::Rc2);
    }

    #[test]
    fn test_mode_and_padding_parse() {
        assert_eq!("cfb".parse::<CipherMode>().unwrap(), CipherMode::Cfb);
        assert_eq!("pkcs7".parse::<PaddingMode>().unwrap(), PaddingMode::Pkcs7);
        assert!(PaddingMode::AnsiX923.carries_length());
        assert!(!PaddingMode::Zeros.carries_length());
    }
}
