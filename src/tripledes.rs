//! TripleDES (EDE) built from three DES engines

use log::warn;

use crate::block::BlockCipher;
use crate::des::Des;
use crate::error::{CryptoError, Result};

/// Whether two 8-byte DES keys agree on every non-parity bit
fn same_des_key(a: &[u8], b: &[u8]) -> bool {
    a.iter().zip(b.iter()).all(|(x, y)| (x ^ y) & 0xFE == 0)
}

/// Check whether a 16- or 24-byte TripleDES key degenerates to single DES.
///
/// A two-key bundle is weak when both halves match; a three-key bundle is
/// weak when the first and second, or the second and third, thirds match.
pub fn is_weak_key(key: &[u8]) -> Result<bool> {
    match key.len() {
        16 => Ok(same_des_key(&key[..8], &key[8..])),
        24 => Ok(same_des_key(&key[..8], &key[8..16]) || same_des_key(&key[8..16], &key[16..])),
        len => Err(CryptoError::InvalidKeyLength {
            expected: "16 or 24".to_string(),
            actual: len,
        }),
    }
}

/// TripleDES engine: encrypt with K1, decrypt with K2, encrypt with K3
pub struct TripleDes {
    k1: Des,
    k2: Des,
    k3: Des,
}

impl TripleDes {
    pub const BLOCK_SIZE: usize = 8;

    /// Create an engine from a 16-byte (K1, K2, K1) or 24-byte (K1, K2, K3) key
    pub fn new(key: &[u8]) -> Result<Self> {
        if is_weak_key(key)? {
            warn!("rejected TripleDES key that collapses to single DES");
            return Err(CryptoError::WeakKey);
        }
        let third = if key.len() == 24 { &key[16..24] } else { &key[..8] };
        Ok(TripleDes {
            k1: Des::expand(&key[..8]),
            k2: Des::expand(&key[8..16]),
            k3: Des::expand(third),
        })
    }
}

impl BlockCipher for TripleDes {
    fn block_size(&self) -> usize {
        Self::BLOCK_SIZE
    }

    fn encrypt_block(&self, block: &mut [u8]) {
        self.k1.encrypt_block(block);
        self.k2.decrypt_block(block);
        self.k3.encrypt_block(block);
    }

    fn decrypt_block(&self, block: &mut [u8]) {
        self.k3.decrypt_block(block);
        self.k2.encrypt_block(block);
        self.k1.decrypt_block(block);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const K1: [u8; 8] = [0x01, 0x23, 0x45, 0x67, 0x89, 0xAB, 0xCD, 0xEF];
    const K2: [u8; 8] = [0x23, 0x45, 0x67, 0x89, 0xAB, 0xCD, 0xEF, 0x01];
    const K3: [u8; 8] = [0x45, 0x67, 0x89, 0xAB, 0xCD, 0xEF, 0x01, 0x23];

    #[test]
    fn test_three_key_vector() {
        // NIST SP 800-67 example, first block
        let key = [K1, K2, K3].concat();
        let tdes = TripleDes::new(&key).unwrap();
        let mut block = *b"The qufc";
        tdes.encrypt_block(&mut block);
        assert_eq!(block, [0xA8, 0x26, 0xFD, 0x8C, 0xE5, 0x3B, 0x85, 0x5F]);
        tdes.decrypt_block(&mut block);
        assert_eq!(&block, b"The qufc");
    }

    #[test]
    fn test_two_key_matches_k1_k2_k1() {
        let two = TripleDes::new(&[K1, K2].concat()).unwrap();
        let three = TripleDes::new(&[K1, K2, K1].concat()).unwrap();
        let mut a = *b"12345678";
        let mut b = *b"12345678";
        two.encrypt_block(&mut a);
        three.encrypt_block(&mut b);
        assert_eq!(a, b);
    }

    #[test]
    fn test_equal_keys_reduce_to_des() {
        // K1 = K2 = K3 is rejected, but the EDE identity still holds for DES
        let des = Des::new(&K1).unwrap();
        let ede = TripleDes {
            k1: Des::expand(&K1),
            k2: Des::expand(&K1),
            k3: Des::expand(&K1),
        };
        let mut a = *b"abcdefgh";
        let mut b = *b"abcdefgh";
        des.encrypt_block(&mut a);
        ede.encrypt_block(&mut b);
        assert_eq!(a, b);
    }

    #[test]
    fn test_weak_bundles_rejected() {
        assert!(matches!(TripleDes::new(&[K1, K1].concat()), Err(CryptoError::WeakKey)));
        assert!(matches!(TripleDes::new(&[K1, K1, K2].concat()), Err(CryptoError::WeakKey)));
        assert!(matches!(TripleDes::new(&[K1, K2, K2].concat()), Err(CryptoError::WeakKey)));
        // K1 == K3 is the two-key variant and is allowed
        assert!(TripleDes::new(&[K1, K2, K1].concat()).is_ok());
    }

    #[test]
    fn test_parity_ignored_when_comparing_halves() {
        let mut k1_flipped = K1;
        for b in k1_flipped.iter_mut() {
            *b ^= 0x01;
        }
        assert!(is_weak_key(&[K1, k1_flipped].concat()).unwrap());
    }

    #[test]
    fn test_wrong_length() {
        assert!(matches!(
            TripleDes::new(&[0u8; 8]),
            Err(CryptoError::InvalidKeyLength { actual: 8, .. })
        ));
    }
}
