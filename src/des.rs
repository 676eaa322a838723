//! Data Encryption Standard block engine.
//!
//! The key schedule is expanded once into sixteen rounds of eight 6-bit
//! subkey groups. The round function folds the S-boxes and the P permutation
//! into eight 64-entry lookup tables built at compile time.
//!
//! # Example
//!
//! ```
//! use managed_crypto::{BlockCipher, Des};
//!
//! let des = Des::new(&[0x13, 0x34, 0x57, 0x79, 0x9B, 0xBC, 0xDF, 0xF1]).unwrap();
//! let mut block = [0x01, 0x23, 0x45, 0x67, 0x89, 0xAB, 0xCD, 0xEF];
//! des.encrypt_block(&mut block);
//! assert_eq!(block, [0x85, 0xE8, 0x13, 0x54, 0x0F, 0x0A, 0xB4, 0x05]);
//! ```

use log::warn;
use zeroize::Zeroize;

use crate::block::BlockCipher;
use crate::error::{CryptoError, Result};

const IP: [u8; 64] = [
    58, 50, 42, 34, 26, 18, 10, 2, 60, 52, 44, 36, 28, 20, 12, 4,
    62, 54, 46, 38, 30, 22, 14, 6, 64, 56, 48, 40, 32, 24, 16, 8,
    57, 49, 41, 33, 25, 17,  9, 1, 59, 51, 43, 35, 27, 19, 11, 3,
    61, 53, 45, 37, 29, 21, 13, 5, 63, 55, 47, 39, 31, 23, 15, 7,
];

const FP: [u8; 64] = [
    40, 8, 48, 16, 56, 24, 64, 32, 39, 7, 47, 15, 55, 23, 63, 31,
    38, 6, 46, 14, 54, 22, 62, 30, 37, 5, 45, 13, 53, 21, 61, 29,
    36, 4, 44, 12, 52, 20, 60, 28, 35, 3, 43, 11, 51, 19, 59, 27,
    34, 2, 42, 10, 50, 18, 58, 26, 33, 1, 41,  9, 49, 17, 57, 25,
];

const PC1: [u8; 56] = [
    57, 49, 41, 33, 25, 17,  9,  1, 58, 50, 42, 34, 26, 18,
    10,  2, 59, 51, 43, 35, 27, 19, 11,  3, 60, 52, 44, 36,
    63, 55, 47, 39, 31, 23, 15,  7, 62, 54, 46, 38, 30, 22,
    14,  6, 61, 53, 45, 37, 29, 21, 13,  5, 28, 20, 12,  4,
];

const PC2: [u8; 48] = [
    14, 17, 11, 24,  1,  5,  3, 28, 15,  6, 21, 10,
    23, 19, 12,  4, 26,  8, 16,  7, 27, 20, 13,  2,
    41, 52, 31, 37, 47, 55, 30, 40, 51, 45, 33, 48,
    44, 49, 39, 56, 34, 53, 46, 42, 50, 36, 29, 32,
];

const P: [u8; 32] = [
    16,  7, 20, 21, 29, 12, 28, 17,
     1, 15, 23, 26,  5, 18, 31, 10,
     2,  8, 24, 14, 32, 27,  3,  9,
    19, 13, 30,  6, 22, 11,  4, 25,
];

const SHIFTS: [u32; 16] = [1, 1, 2, 2, 2, 2, 2, 2, 1, 2, 2, 2, 2, 2, 2, 1];

/// S-boxes, row-major: `SBOX[box][row * 16 + column]`
const SBOX: [[u8; 64]; 8] = [
    [
        14,  4, 13,  1,  2, 15, 11,  8,  3, 10,  6, 12,  5,  9,  0,  7,
         0, 15,  7,  4, 14,  2, 13,  1, 10,  6, 12, 11,  9,  5,  3,  8,
         4,  1, 14,  8, 13,  6,  2, 11, 15, 12,  9,  7,  3, 10,  5,  0,
        15, 12,  8,  2,  4,  9,  1,  7,  5, 11,  3, 14, 10,  0,  6, 13,
    ],
    [
        15,  1,  8, 14,  6, 11,  3,  4,  9,  7,  2, 13, 12,  0,  5, 10,
         3, 13,  4,  7, 15,  2,  8, 14, 12,  0,  1, 10,  6,  9, 11,  5,
         0, 14,  7, 11, 10,  4, 13,  1,  5,  8, 12,  6,  9,  3,  2, 15,
        13,  8, 10,  1,  3, 15,  4,  2, 11,  6,  7, 12,  0,  5, 14,  9,
    ],
    [
        10,  0,  9, 14,  6,  3, 15,  5,  1, 13, 12,  7, 11,  4,  2,  8,
        13,  7,  0,  9,  3,  4,  6, 10,  2,  8,  5, 14, 12, 11, 15,  1,
        13,  6,  4,  9,  8, 15,  3,  0, 11,  1,  2, 12,  5, 10, 14,  7,
         1, 10, 13,  0,  6,  9,  8,  7,  4, 15, 14,  3, 11,  5,  2, 12,
    ],
    [
         7, 13, 14,  3,  0,  6,  9, 10,  1,  2,  8,  5, 11, 12,  4, 15,
        13,  8, 11,  5,  6, 15,  0,  3,  4,  7,  2, 12,  1, 10, 14,  9,
        10,  6,  9,  0, 12, 11,  7, 13, 15,  1,  3, 14,  5,  2,  8,  4,
         3, 15,  0,  6, 10,  1, 13,  8,  9,  4,  5, 11, 12,  7,  2, 14,
    ],
    [
         2, 12,  4,  1,  7, 10, 11,  6,  8,  5,  3, 15, 13,  0, 14,  9,
        14, 11,  2, 12,  4,  7, 13,  1,  5,  0, 15, 10,  3,  9,  8,  6,
         4,  2,  1, 11, 10, 13,  7,  8, 15,  9, 12,  5,  6,  3,  0, 14,
        11,  8, 12,  7,  1, 14,  2, 13,  6, 15,  0,  9, 10,  4,  5,  3,
    ],
    [
        12,  1, 10, 15,  9,  2,  6,  8,  0, 13,  3,  4, 14,  7,  5, 11,
        10, 15,  4,  2,  7, 12,  9,  5,  6,  1, 13, 14,  0, 11,  3,  8,
         9, 14, 15,  5,  2,  8, 12,  3,  7,  0,  4, 10,  1, 13, 11,  6,
         4,  3,  2, 12,  9,  5, 15, 10, 11, 14,  1,  7,  6,  0,  8, 13,
    ],
    [
         4, 11,  2, 14, 15,  0,  8, 13,  3, 12,  9,  7,  5, 10,  6,  1,
        13,  0, 11,  7,  4,  9,  1, 10, 14,  3,  5, 12,  2, 15,  8,  6,
         1,  4, 11, 13, 12,  3,  7, 14, 10, 15,  6,  8,  0,  5,  9,  2,
         6, 11, 13,  8,  1,  4, 10,  7,  9,  5,  0, 15, 14,  2,  3, 12,
    ],
    [
        13,  2,  8,  4,  6, 15, 11,  1, 10,  9,  3, 14,  5,  0, 12,  7,
         1, 15, 13,  8, 10,  3,  7,  4, 12,  5,  6, 11,  0, 14,  9,  2,
         7, 11,  4,  1,  9, 12, 14,  2,  0,  6, 10, 13, 15,  3,  5,  8,
         2,  1, 14,  7,  4, 10,  8, 13, 15, 12,  9,  0,  3,  5,  6, 11,
    ],
];

/// S-box output already run through P, indexed by the raw 6-bit group
static SP: [[u32; 64]; 8] = build_sp();

/// IP and FP split per input byte; a block permutes to the OR of its rows
static IP_BYTES: [[u64; 256]; 8] = build_byte_table(&IP);
static FP_BYTES: [[u64; 256]; 8] = build_byte_table(&FP);

const WEAK_KEYS: [[u8; 8]; 4] = [
    [0x01, 0x01, 0x01, 0x01, 0x01, 0x01, 0x01, 0x01],
    [0x1F, 0x1F, 0x1F, 0x1F, 0x0E, 0x0E, 0x0E, 0x0E],
    [0xE0, 0xE0, 0xE0, 0xE0, 0xF1, 0xF1, 0xF1, 0xF1],
    [0xFE, 0xFE, 0xFE, 0xFE, 0xFE, 0xFE, 0xFE, 0xFE],
];

const SEMI_WEAK_KEYS: [[u8; 8]; 12] = [
    [0x01, 0xFE, 0x01, 0xFE, 0x01, 0xFE, 0x01, 0xFE],
    [0xFE, 0x01, 0xFE, 0x01, 0xFE, 0x01, 0xFE, 0x01],
    [0x1F, 0xE0, 0x1F, 0xE0, 0x0E, 0xF1, 0x0E, 0xF1],
    [0xE0, 0x1F, 0xE0, 0x1F, 0xF1, 0x0E, 0xF1, 0x0E],
    [0x01, 0xE0, 0x01, 0xE0, 0x01, 0xF1, 0x01, 0xF1],
    [0xE0, 0x01, 0xE0, 0x01, 0xF1, 0x01, 0xF1, 0x01],
    [0x1F, 0xFE, 0x1F, 0xFE, 0x0E, 0xFE, 0x0E, 0xFE],
    [0xFE, 0x1F, 0xFE, 0x1F, 0xFE, 0x0E, 0xFE, 0x0E],
    [0x01, 0x1F, 0x01, 0x1F, 0x01, 0x0E, 0x01, 0x0E],
    [0x1F, 0x01, 0x1F, 0x01, 0x0E, 0x01, 0x0E, 0x01],
    [0xE0, 0xFE, 0xE0, 0xFE, 0xF1, 0xFE, 0xF1, 0xFE],
    [0xFE, 0xE0, 0xFE, 0xE0, 0xFE, 0xF1, 0xFE, 0xF1],
];

/// Gather bits of `input` (numbered from 1 at the MSB of an `in_width`-bit
/// value) in the order listed by `table`.
const fn permute(input: u64, in_width: u32, table: &[u8]) -> u64 {
    let mut out = 0u64;
    let mut i = 0;
    while i < table.len() {
        out = (out << 1) | ((input >> (in_width - table[i] as u32)) & 1);
        i += 1;
    }
    out
}

const fn build_sp() -> [[u32; 64]; 8] {
    let mut sp = [[0u32; 64]; 8];
    let mut b = 0;
    while b < 8 {
        let mut x = 0;
        while x < 64 {
            let row = ((x >> 4) & 2) | (x & 1);
            let col = (x >> 1) & 0xF;
            let s = SBOX[b][row * 16 + col] as u64;
            sp[b][x] = permute(s << (28 - 4 * b), 32, &P) as u32;
            x += 1;
        }
        b += 1;
    }
    sp
}

const fn build_byte_table(table: &[u8; 64]) -> [[u64; 256]; 8] {
    let mut out = [[0u64; 256]; 8];
    let mut pos = 0;
    while pos < 8 {
        let mut v = 0;
        while v < 256 {
            out[pos][v] = permute((v as u64) << (56 - 8 * pos), 64, table);
            v += 1;
        }
        pos += 1;
    }
    out
}

fn permute_block(input: &[u8], table: &[[u64; 256]; 8]) -> u64 {
    input
        .iter()
        .zip(table.iter())
        .fold(0, |acc, (&b, row)| acc | row[b as usize])
}

/// Compare against a key table, ignoring the parity bit of each byte
fn matches_any(key: &[u8], table: &[[u8; 8]]) -> bool {
    table
        .iter()
        .any(|candidate| key.iter().zip(candidate.iter()).all(|(k, c)| (k ^ c) <= 1))
}

fn check_length(key: &[u8]) -> Result<()> {
    if key.len() != Des::KEY_SIZE {
        return Err(CryptoError::InvalidKeyLength {
            expected: "8".to_string(),
            actual: key.len(),
        });
    }
    Ok(())
}

/// Check whether `key` is one of the four DES weak keys
pub fn is_weak_key(key: &[u8]) -> Result<bool> {
    check_length(key)?;
    Ok(matches_any(key, &WEAK_KEYS))
}

/// Check whether `key` is one of the twelve DES semi-weak keys
pub fn is_semi_weak_key(key: &[u8]) -> Result<bool> {
    check_length(key)?;
    Ok(matches_any(key, &SEMI_WEAK_KEYS))
}

/// Reject weak and semi-weak keys
pub fn check_key(key: &[u8]) -> Result<()> {
    if is_weak_key(key)? {
        warn!("rejected DES weak key");
        return Err(CryptoError::WeakKey);
    }
    if is_semi_weak_key(key)? {
        warn!("rejected DES semi-weak key");
        return Err(CryptoError::SemiWeakKey);
    }
    Ok(())
}

/// DES block engine holding the expanded key schedule
pub struct Des {
    /// Sixteen rounds of eight 6-bit subkey groups
    subkeys: [[u8; 8]; 16],
}

impl Des {
    pub const BLOCK_SIZE: usize = 8;
    pub const KEY_SIZE: usize = 8;

    /// Create an engine, rejecting wrong lengths and weak keys
    pub fn new(key: &[u8]) -> Result<Self> {
        check_key(key)?;
        Ok(Self::expand(key))
    }

    /// Create an engine without the weak-key test. The caller checks the
    /// key length.
    pub(crate) fn expand(key: &[u8]) -> Self {
        let mut raw = [0u8; 8];
        raw.copy_from_slice(&key[..8]);
        let k56 = permute(u64::from_be_bytes(raw), 64, &PC1);
        raw.zeroize();

        let mut c = (k56 >> 28) & 0x0FFF_FFFF;
        let mut d = k56 & 0x0FFF_FFFF;
        let mut subkeys = [[0u8; 8]; 16];

        for (round, shift) in SHIFTS.iter().enumerate() {
            c = ((c << shift) | (c >> (28 - shift))) & 0x0FFF_FFFF;
            d = ((d << shift) | (d >> (28 - shift))) & 0x0FFF_FFFF;
            let k48 = permute((c << 28) | d, 56, &PC2);
            for (i, group) in subkeys[round].iter_mut().enumerate() {
                *group = ((k48 >> (42 - 6 * i)) & 0x3F) as u8;
            }
        }

        Des { subkeys }
    }

    fn feistel(half: u32, subkey: &[u8; 8]) -> u32 {
        let mut out = 0;
        for (i, group) in subkey.iter().enumerate() {
            // E-expansion: group i is bits 4i..4i+5 of the half block, cyclic
            let chunk = (half.rotate_left((4 * i as u32 + 31) % 32) >> 26) as u8 & 0x3F;
            out |= SP[i][(chunk ^ group) as usize];
        }
        out
    }

    fn crypt(&self, block: &mut [u8], decrypt: bool) {
        let permuted = permute_block(&block[..8], &IP_BYTES);
        let mut left = (permuted >> 32) as u32;
        let mut right = permuted as u32;

        for round in 0..16 {
            let subkey = if decrypt {
                &self.subkeys[15 - round]
            } else {
                &self.subkeys[round]
            };
            let next = left ^ Self::feistel(right, subkey);
            left = right;
            right = next;
        }

        let preoutput = ((right as u64) << 32) | left as u64;
        let output = permute_block(&preoutput.to_be_bytes(), &FP_BYTES);
        block[..8].copy_from_slice(&output.to_be_bytes());
    }
}

impl BlockCipher for Des {
    fn block_size(&self) -> usize {
        Self::BLOCK_SIZE
    }

    fn encrypt_block(&self, block: &mut [u8]) {
        self.crypt(block, false);
    }

    fn decrypt_block(&self, block: &mut [u8]) {
        self.crypt(block, true);
    }
}

impl Drop for Des {
    fn drop(&mut self) {
        self.subkeys.zeroize();
    }
}
