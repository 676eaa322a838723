//! RC2 block engine (RFC 2268)

use log::debug;
use zeroize::Zeroize;

use crate::block::BlockCipher;
use crate::error::{CryptoError, Result};

/// Key expansion permutation, derived from the digits of pi
const PITABLE: [u8; 256] = [
    0xd9, 0x78, 0xf9, 0xc4, 0x19, 0xdd, 0xb5, 0xed, 0x28, 0xe9, 0xfd, 0x79, 0x4a, 0xa0, 0xd8, 0x9d,
    0xc6, 0x7e, 0x37, 0x83, 0x2b, 0x76, 0x53, 0x8e, 0x62, 0x4c, 0x64, 0x88, 0x44, 0x8b, 0xfb, 0xa2,
    0x17, 0x9a, 0x59, 0xf5, 0x87, 0xb3, 0x4f, 0x13, 0x61, 0x45, 0x6d, 0x8d, 0x09, 0x81, 0x7d, 0x32,
    0xbd, 0x8f, 0x40, 0xeb, 0x86, 0xb7, 0x7b, 0x0b, 0xf0, 0x95, 0x21, 0x22, 0x5c, 0x6b, 0x4e, 0x82,
    0x54, 0xd6, 0x65, 0x93, 0xce, 0x60, 0xb2, 0x1c, 0x73, 0x56, 0xc0, 0x14, 0xa7, 0x8c, 0xf1, 0xdc,
    0x12, 0x75, 0xca, 0x1f, 0x3b, 0xbe, 0xe4, 0xd1, 0x42, 0x3d, 0xd4, 0x30, 0xa3, 0x3c, 0xb6, 0x26,
    0x6f, 0xbf, 0x0e, 0xda, 0x46, 0x69, 0x07, 0x57, 0x27, 0xf2, 0x1d, 0x9b, 0xbc, 0x94, 0x43, 0x03,
    0xf8, 0x11, 0xc7, 0xf6, 0x90, 0xef, 0x3e, 0xe7, 0x06, 0xc3, 0xd5, 0x2f, 0xc8, 0x66, 0x1e, 0xd7,
    0x08, 0xe8, 0xea, 0xde, 0x80, 0x52, 0xee, 0xf7, 0x84, 0xaa, 0x72, 0xac, 0x35, 0x4d, 0x6a, 0x2a,
    0x96, 0x1a, 0xd2, 0x71, 0x5a, 0x15, 0x49, 0x74, 0x4b, 0x9f, 0xd0, 0x5e, 0x04, 0x18, 0xa4, 0xec,
    0xc2, 0xe0, 0x41, 0x6e, 0x0f, 0x51, 0xcb, 0xcc, 0x24, 0x91, 0xaf, 0x50, 0xa1, 0xf4, 0x70, 0x39,
    0x99, 0x7c, 0x3a, 0x85, 0x23, 0xb8, 0xb4, 0x7a, 0xfc, 0x02, 0x36, 0x5b, 0x25, 0x55, 0x97, 0x31,
    0x2d, 0x5d, 0xfa, 0x98, 0xe3, 0x8a, 0x92, 0xae, 0x05, 0xdf, 0x29, 0x10, 0x67, 0x6c, 0xba, 0xc9,
    0xd3, 0x00, 0xe6, 0xcf, 0xe1, 0x9e, 0xa8, 0x2c, 0x63, 0x16, 0x01, 0x3f, 0x58, 0xe2, 0x89, 0xa9,
    0x0d, 0x38, 0x34, 0x1b, 0xab, 0x33, 0xff, 0xb0, 0xbb, 0x48, 0x0c, 0x5f, 0xb9, 0xb1, 0xcd, 0x2e,
    0xc5, 0xf3, 0xdb, 0x47, 0xe5, 0xa5, 0x9c, 0x77, 0x0a, 0xa6, 0x20, 0x68, 0xfe, 0x7f, 0xc1, 0xad,
];

const ROTATIONS: [u32; 4] = [1, 2, 3, 5];

/// RC2 block engine holding the 64-word expanded key
pub struct Rc2 {
    k: [u16; 64],
}

impl Rc2 {
    pub const BLOCK_SIZE: usize = 8;
    /// Smallest accepted key, in bytes (40 bits)
    pub const MIN_KEY_SIZE: usize = 5;
    /// Largest accepted key, in bytes (128 bits)
    pub const MAX_KEY_SIZE: usize = 16;

    /// Create an engine from a 5..=16 byte key, limiting the search space of
    /// the expanded key to `effective_key_bits` (1..=1024).
    pub fn new(key: &[u8], effective_key_bits: u32) -> Result<Self> {
        if key.len() < Self::MIN_KEY_SIZE || key.len() > Self::MAX_KEY_SIZE {
            return Err(CryptoError::InvalidKeyLength {
                expected: "5..=16".to_string(),
                actual: key.len(),
            });
        }
        if effective_key_bits == 0 || effective_key_bits > 1024 {
            return Err(CryptoError::InvalidEffectiveKeySize(effective_key_bits));
        }
        debug!(
            "RC2 key schedule: {} key bits, {} effective",
            key.len() * 8,
            effective_key_bits
        );

        let t = key.len();
        let t8 = ((effective_key_bits + 7) / 8) as usize;
        let tm = 0xFFu8 >> (8 * t8 as u32 - effective_key_bits);

        let mut l = [0u8; 128];
        l[..t].copy_from_slice(key);
        for i in t..128 {
            l[i] = PITABLE[(l[i - 1].wrapping_add(l[i - t])) as usize];
        }
        l[128 - t8] = PITABLE[(l[128 - t8] & tm) as usize];
        for i in (0..128 - t8).rev() {
            l[i] = PITABLE[(l[i + 1] ^ l[i + t8]) as usize];
        }

        let mut k = [0u16; 64];
        for (i, word) in k.iter_mut().enumerate() {
            *word = l[2 * i] as u16 | ((l[2 * i + 1] as u16) << 8);
        }
        l.zeroize();

        Ok(Rc2 { k })
    }

    fn load(block: &[u8]) -> [u16; 4] {
        let mut r = [0u16; 4];
        for (i, word) in r.iter_mut().enumerate() {
            *word = block[2 * i] as u16 | ((block[2 * i + 1] as u16) << 8);
        }
        r
    }

    fn store(r: &[u16; 4], block: &mut [u8]) {
        for (i, word) in r.iter().enumerate() {
            block[2 * i] = *word as u8;
            block[2 * i + 1] = (*word >> 8) as u8;
        }
    }

    fn mix(&self, r: &mut [u16; 4], j: &mut usize) {
        for i in 0..4 {
            let a = r[(i + 3) % 4];
            let b = r[(i + 2) % 4];
            let c = r[(i + 1) % 4];
            r[i] = r[i]
                .wrapping_add(self.k[*j])
                .wrapping_add(a & b)
                .wrapping_add(!a & c)
                .rotate_left(ROTATIONS[i]);
            *j += 1;
        }
    }

    fn mash(&self, r: &mut [u16; 4]) {
        for i in 0..4 {
            r[i] = r[i].wrapping_add(self.k[(r[(i + 3) % 4] & 63) as usize]);
        }
    }

    fn rmix(&self, r: &mut [u16; 4], j: &mut usize) {
        for i in (0..4).rev() {
            *j -= 1;
            let a = r[(i + 3) % 4];
            let b = r[(i + 2) % 4];
            let c = r[(i + 1) % 4];
            r[i] = r[i]
                .rotate_right(ROTATIONS[i])
                .wrapping_sub(self.k[*j])
                .wrapping_sub(a & b)
                .wrapping_sub(!a & c);
        }
    }

    fn rmash(&self, r: &mut [u16; 4]) {
        for i in (0..4).rev() {
            r[i] = r[i].wrapping_sub(self.k[(r[(i + 3) % 4] & 63) as usize]);
        }
    }
}

impl BlockCipher for Rc2 {
    fn block_size(&self) -> usize {
        Self::BLOCK_SIZE
    }

    fn encrypt_block(&self, block: &mut [u8]) {
        let mut r = Self::load(block);
        let mut j = 0;
        for _ in 0..5 {
            self.mix(&mut r, &mut j);
        }
        self.mash(&mut r);
        for _ in 0..6 {
            self.mix(&mut r, &mut j);
        }
        self.mash(&mut r);
        for _ in 0..5 {
            self.mix(&mut r, &mut j);
        }
        Self::store(&r, block);
    }

    fn decrypt_block(&self, block: &mut [u8]) {
        let mut r = Self::load(block);
        let mut j = 64;
        for _ in 0..5 {
            self.rmix(&mut r, &mut j);
        }
        self.rmash(&mut r);
        for _ in 0..6 {
            self.rmix(&mut r, &mut j);
        }
        self.rmash(&mut r);
        for _ in 0..5 {
            self.rmix(&mut r, &mut j);
        }
        Self::store(&r, block);
    }
}

impl Drop for Rc2 {
    fn drop(&mut self) {
        self.k.zeroize();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn check(key: &[u8], effective: u32, plain: [u8; 8], cipher: [u8; 8]) {
        let rc2 = Rc2::new(key, effective).unwrap();
        let mut block = plain;
        rc2.encrypt_block(&mut block);
        assert_eq!(block, cipher);
        rc2.decrypt_block(&mut block);
        assert_eq!(block, plain);
    }

    #[test]
    fn test_rfc2268_zero_key_63_bits() {
        check(
            &[0u8; 8],
            63,
            [0u8; 8],
            [0xeb, 0xb7, 0x73, 0xf9, 0x93, 0x27, 0x8e, 0xff],
        );
    }

    #[test]
    fn test_rfc2268_all_ones() {
        check(
            &[0xffu8; 8],
            64,
            [0xffu8; 8],
            [0x27, 0x8b, 0x27, 0xe4, 0x2e, 0x2f, 0x0d, 0x49],
        );
    }

    #[test]
    fn test_rfc2268_single_bit_key() {
        check(
            &[0x30, 0, 0, 0, 0, 0, 0, 0],
            64,
            [0x10, 0, 0, 0, 0, 0, 0, 0x01],
            [0x30, 0x64, 0x9e, 0xdf, 0x9b, 0xe7, 0xd2, 0xc2],
        );
    }

    #[test]
    fn test_rfc2268_seven_byte_key() {
        check(
            &[0x88, 0xbc, 0xa9, 0x0e, 0x90, 0x87, 0x5a],
            64,
            [0u8; 8],
            [0x6c, 0xcf, 0x43, 0x08, 0x97, 0x4c, 0x26, 0x7f],
        );
    }

    #[test]
    fn test_rfc2268_sixteen_byte_key() {
        let key = [
            0x88, 0xbc, 0xa9, 0x0e, 0x90, 0x87, 0x5a, 0x7f, 0x0f, 0x79, 0xc3, 0x84, 0x62, 0x7b,
            0xaf, 0xb2,
        ];
        check(&key, 64, [0u8; 8], [0x1a, 0x80, 0x7d, 0x27, 0x2b, 0xbe, 0x5d, 0xb1]);
        check(&key, 128, [0u8; 8], [0x22, 0x69, 0x55, 0x2a, 0xb0, 0xf8, 0x5c, 0xa6]);
    }

    #[test]
    fn test_key_length_range() {
        assert!(matches!(
            Rc2::new(&[0u8; 4], 32),
            Err(CryptoError::InvalidKeyLength { actual: 4, .. })
        ));
        assert!(matches!(
            Rc2::new(&[0u8; 17], 128),
            Err(CryptoError::InvalidKeyLength { actual: 17, .. })
        ));
        assert!(matches!(
            Rc2::new(&[0u8; 8], 0),
            Err(CryptoError::InvalidEffectiveKeySize(0))
        ));
    }
}
