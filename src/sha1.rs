//! SHA-1 (FIPS 180-4)

use zeroize::Zeroize;

use crate::md::{BlockBuffer, LengthOrder};
use crate::utils::{read_u32_be, write_u32_be};

const INIT: [u32; 5] = [0x67452301, 0xefcdab89, 0x98badcfe, 0x10325476, 0xc3d2e1f0];

fn compress(state: &mut [u32; 5], block: &[u8; 64]) {
    let mut w = [0u32; 80];
    for i in 0..16 {
        w[i] = read_u32_be(&block[4 * i..]);
    }
    for i in 16..80 {
        w[i] = (w[i - 3] ^ w[i - 8] ^ w[i - 14] ^ w[i - 16]).rotate_left(1);
    }

    let (mut a, mut b, mut c, mut d, mut e) = (state[0], state[1], state[2], state[3], state[4]);

    for (i, word) in w.iter().enumerate() {
        let (f, k) = match i / 20 {
            0 => ((b & c) | (!b & d), 0x5a827999),
            1 => (b ^ c ^ d, 0x6ed9eba1),
            2 => ((b & c) | (b & d) | (c & d), 0x8f1bbcdc),
            _ => (b ^ c ^ d, 0xca62c1d6),
        };
        let t = a
            .rotate_left(5)
            .wrapping_add(f)
            .wrapping_add(e)
            .wrapping_add(k)
            .wrapping_add(*word);
        e = d;
        d = c;
        c = b.rotate_left(30);
        b = a;
        a = t;
    }

    state[0] = state[0].wrapping_add(a);
    state[1] = state[1].wrapping_add(b);
    state[2] = state[2].wrapping_add(c);
    state[3] = state[3].wrapping_add(d);
    state[4] = state[4].wrapping_add(e);
    w.zeroize();
}

/// Incremental SHA-1 state
pub struct Sha1 {
    state: [u32; 5],
    buffer: BlockBuffer<64>,
}

impl Sha1 {
    pub const DIGEST_SIZE: usize = 20;
    pub const BLOCK_SIZE: usize = 64;

    pub fn new() -> Self {
        Sha1 {
            state: INIT,
            buffer: BlockBuffer::new(),
        }
    }

    pub fn update(&mut self, data: &[u8]) {
        let state = &mut self.state;
        self.buffer.update(data, |block| compress(state, block));
    }

    /// Produce the digest and return to the initial state
    pub fn finish(&mut self) -> [u8; 20] {
        let state = &mut self.state;
        self.buffer
            .finish(8, LengthOrder::BigEndian, |block| compress(state, block));

        let mut out = [0u8; 20];
        for (i, word) in self.state.iter().enumerate() {
            write_u32_be(&mut out[4 * i..], *word);
        }
        self.state = INIT;
        out
    }
}

impl Default for Sha1 {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Sha1 {
    fn drop(&mut self) {
        self.state.zeroize();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sha1_hex(data: &[u8]) -> String {
        let mut sha = Sha1::new();
        sha.update(data);
        hex::encode(sha.finish())
    }

    #[test]
    fn test_fips_vectors() {
        assert_eq!(sha1_hex(b""), "da39a3ee5e6b4b0d3255bfef95601890afd80709");
        assert_eq!(sha1_hex(b"abc"), "a9993e364706816aba3e25717850c26c9cd0d89d");
        assert_eq!(
            sha1_hex(b"abcdbcdecdefdefgefghfghighijhijkijkljklmklmnlmnomnopnopq"),
            "84983e441c3bd26ebaae4aa1f95129e5e54670f1"
        );
    }

    #[test]
    fn test_million_a() {
        let mut sha = Sha1::new();
        let chunk = [b'a'; 1000];
        for _ in 0..1000 {
            sha.update(&chunk);
        }
        assert_eq!(hex::encode(sha.finish()), "34aa973cd4c4daa4f61eeb2bdbad27316534016f");
    }
}
