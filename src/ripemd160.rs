//! RIPEMD-160 hash implementation
//!
//! Two independent lines of five 16-step rounds run over each block and are
//! folded back into the chaining value at the end. Words are read and the
//! digest is written little-endian.

use zeroize::Zeroize;

use crate::md::{BlockBuffer, LengthOrder};
use crate::utils::{read_u32_le, write_u32_le};

const INIT: [u32; 5] = [0x67452301, 0xefcdab89, 0x98badcfe, 0x10325476, 0xc3d2e1f0];

// Constants
const K: [u32; 5] = [0x00000000, 0x5a827999, 0x6ed9eba1, 0x8f1bbcdc, 0xa953fd4e];
const KK: [u32; 5] = [0x50a28be6, 0x5c4dd124, 0x6d703ef3, 0x7a6d76e9, 0x00000000];

// Message schedule for left rounds
const R: [[usize; 16]; 5] = [
    [0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15],
    [7, 4, 13, 1, 10, 6, 15, 3, 12, 0, 9, 5, 2, 14, 11, 8],
    [3, 10, 14, 4, 9, 15, 8, 1, 2, 7, 0, 6, 13, 11, 5, 12],
    [1, 9, 11, 10, 0, 8, 12, 4, 13, 3, 7, 15, 14, 5, 6, 2],
    [4, 0, 5, 9, 7, 12, 2, 10, 14, 1, 3, 8, 11, 6, 15, 13],
];

// Message schedule for right rounds
const RR: [[usize; 16]; 5] = [
    [5, 14, 7, 0, 9, 2, 11, 4, 13, 6, 15, 8, 1, 10, 3, 12],
    [6, 11, 3, 7, 0, 13, 5, 10, 14, 15, 8, 12, 4, 9, 1, 2],
    [15, 5, 1, 3, 7, 14, 6, 9, 11, 8, 12, 2, 10, 0, 4, 13],
    [8, 6, 4, 1, 3, 11, 15, 0, 5, 12, 2, 13, 9, 7, 10, 14],
    [12, 15, 10, 4, 1, 5, 8, 7, 6, 2, 13, 14, 0, 3, 9, 11],
];

// Shift amounts for left rounds
const S: [[u32; 16]; 5] = [
    [11, 14, 15, 12, 5, 8, 7, 9, 11, 13, 14, 15, 6, 7, 9, 8],
    [7, 6, 8, 13, 11, 9, 7, 15, 7, 12, 15, 9, 11, 7, 13, 12],
    [11, 13, 6, 7, 14, 9, 13, 15, 14, 8, 13, 6, 5, 12, 7, 5],
    [11, 12, 14, 15, 14, 15, 9, 8, 9, 14, 5, 6, 8, 6, 5, 12],
    [9, 15, 5, 11, 6, 8, 13, 12, 5, 12, 13, 14, 11, 8, 5, 6],
];

// Shift amounts for right rounds
const SS: [[u32; 16]; 5] = [
    [8, 9, 9, 11, 13, 15, 15, 5, 7, 7, 8, 11, 14, 14, 12, 6],
    [9, 13, 15, 7, 12, 8, 9, 11, 7, 7, 12, 7, 6, 15, 13, 11],
    [9, 7, 15, 11, 8, 6, 6, 14, 12, 13, 5, 14, 13, 13, 7, 5],
    [15, 5, 8, 11, 14, 14, 6, 14, 6, 9, 12, 9, 12, 5, 15, 8],
    [8, 5, 12, 9, 12, 5, 14, 6, 8, 13, 6, 5, 15, 13, 11, 11],
];

/// Boolean functions
#[inline]
fn f(x: u32, y: u32, z: u32) -> u32 {
    x ^ y ^ z
}

#[inline]
fn g(x: u32, y: u32, z: u32) -> u32 {
    (x & y) | (!x & z)
}

#[inline]
fn h(x: u32, y: u32, z: u32) -> u32 {
    (x | !y) ^ z
}

#[inline]
fn i(x: u32, y: u32, z: u32) -> u32 {
    (x & z) | (y & !z)
}

#[inline]
fn j(x: u32, y: u32, z: u32) -> u32 {
    x ^ (y | !z)
}

/// Round function `n` (0-based) of the left line; the right line runs them in reverse
#[inline]
fn boolean(n: usize, x: u32, y: u32, z: u32) -> u32 {
    match n {
        0 => f(x, y, z),
        1 => g(x, y, z),
        2 => h(x, y, z),
        3 => i(x, y, z),
        _ => j(x, y, z),
    }
}

/// Compression function
fn compress(hash: &mut [u32; 5], block: &[u8; 64]) {
    let mut x = [0u32; 16];
    for (n, word) in x.iter_mut().enumerate() {
        *word = read_u32_le(&block[4 * n..]);
    }

    let (mut a, mut b, mut c, mut d, mut e) = (hash[0], hash[1], hash[2], hash[3], hash[4]);
    let (mut aa, mut bb, mut cc, mut dd, mut ee) = (hash[0], hash[1], hash[2], hash[3], hash[4]);

    for round in 0..5 {
        // Left line
        for step in 0..16 {
            let t = a
                .wrapping_add(boolean(round, b, c, d))
                .wrapping_add(x[R[round][step]])
                .wrapping_add(K[round])
                .rotate_left(S[round][step])
                .wrapping_add(e);
            a = e;
            e = d;
            d = c.rotate_left(10);
            c = b;
            b = t;
        }

        // Right line
        for step in 0..16 {
            let t = aa
                .wrapping_add(boolean(4 - round, bb, cc, dd))
                .wrapping_add(x[RR[round][step]])
                .wrapping_add(KK[round])
                .rotate_left(SS[round][step])
                .wrapping_add(ee);
            aa = ee;
            ee = dd;
            dd = cc.rotate_left(10);
            cc = bb;
            bb = t;
        }
    }

    // Final addition
    let t = hash[1].wrapping_add(c).wrapping_add(dd);
    hash[1] = hash[2].wrapping_add(d).wrapping_add(ee);
    hash[2] = hash[3].wrapping_add(e).wrapping_add(aa);
    hash[3] = hash[4].wrapping_add(a).wrapping_add(bb);
    hash[4] = hash[0].wrapping_add(b).wrapping_add(cc);
    hash[0] = t;
    x.zeroize();
}

/// Incremental RIPEMD-160 state
pub struct Ripemd160 {
    hash: [u32; 5],
    buffer: BlockBuffer<64>,
}

impl Ripemd160 {
    pub const DIGEST_SIZE: usize = 20;
    pub const BLOCK_SIZE: usize = 64;

    pub fn new() -> Self {
        Ripemd160 {
            hash: INIT,
            buffer: BlockBuffer::new(),
        }
    }

    pub fn update(&mut self, data: &[u8]) {
        let hash = &mut self.hash;
        self.buffer.update(data, |block| compress(hash, block));
    }

    /// Produce the digest and return to the initial state
    pub fn finish(&mut self) -> [u8; 20] {
        let hash = &mut self.hash;
        self.buffer
            .finish(8, LengthOrder::LittleEndian, |block| compress(hash, block));

        // Convert hash to bytes
        let mut result = [0u8; 20];
        for (n, word) in self.hash.iter().enumerate() {
            write_u32_le(&mut result[4 * n..], *word);
        }
        self.hash = INIT;
        result
    }
}

impl Default for Ripemd160 {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Ripemd160 {
    fn drop(&mut self) {
        self.hash.zeroize();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ripemd160(data: &[u8]) -> String {
        let mut hasher = Ripemd160::new();
        hasher.update(data);
        hex::encode(hasher.finish())
    }

    #[test]
    fn test_ripemd160_empty() {
        assert_eq!(ripemd160(b""), "9c1185a5c5e9fc54612808977ee8f548b2258d31");
    }

    #[test]
    fn test_ripemd160_a() {
        assert_eq!(ripemd160(b"a"), "0bdc9d2d256b3ee9daae347be6f4dc835a467ffe");
    }

    #[test]
    fn test_ripemd160_abc() {
        assert_eq!(ripemd160(b"abc"), "8eb208f7e05d987a9b044a8e98c6b087f15a0bfc");
    }

    #[test]
    fn test_ripemd160_message_digest() {
        assert_eq!(
            ripemd160(b"message digest"),
            "5d0689ef49d2fae572b881b123a85ffa21595f36"
        );
    }

    #[test]
    fn test_ripemd160_alphabet() {
        assert_eq!(
            ripemd160(b"abcdefghijklmnopqrstuvwxyz"),
            "f71c27109c692c1b56bbdceb5b9d2865b3708dbc"
        );
    }

    #[test]
    fn test_ripemd160_alphanumeric() {
        assert_eq!(
            ripemd160(b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789"),
            "b0e20b6e3116640286ed3a87a5713079b21f5189"
        );
    }

    #[test]
    fn test_ripemd160_digits() {
        assert_eq!(
            ripemd160(b"12345678901234567890123456789012345678901234567890123456789012345678901234567890"),
            "9b752e45573d4b39f4dbd3323cab82bf63326bfb"
        );
    }
}
