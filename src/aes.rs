//! T-table Rijndael engine for 128-bit blocks (AES)
//!
//! Each encryption table entry fuses the S-box with one column of the
//! MixColumn matrix; the decryption tables do the same for the inverse
//! S-box and InvMixColumn. The decryption schedule is the encryption schedule
//! reversed with InvMixColumn applied to the interior round keys, so both
//! directions run the same round shape.

use zeroize::Zeroize;

use crate::block::BlockCipher;
use crate::error::Result;
use crate::rijndael::{check_key, expand_key, mul, INV_SBOX, SBOX};

const fn build_te0() -> [u32; 256] {
    let mut t = [0u32; 256];
    let mut x = 0;
    while x < 256 {
        let s = SBOX[x];
        t[x] = ((mul(s, 2) as u32) << 24) | ((s as u32) << 16) | ((s as u32) << 8) | (mul(s, 3) as u32);
        x += 1;
    }
    t
}

const fn build_td0() -> [u32; 256] {
    let mut t = [0u32; 256];
    let mut x = 0;
    while x < 256 {
        let s = INV_SBOX[x];
        t[x] = ((mul(s, 0x0e) as u32) << 24)
            | ((mul(s, 0x09) as u32) << 16)
            | ((mul(s, 0x0d) as u32) << 8)
            | (mul(s, 0x0b) as u32);
        x += 1;
    }
    t
}

const fn rotate_table(t: &[u32; 256], by: u32) -> [u32; 256] {
    let mut r = [0u32; 256];
    let mut x = 0;
    while x < 256 {
        r[x] = t[x].rotate_right(by);
        x += 1;
    }
    r
}

static TE0: [u32; 256] = build_te0();
static TE1: [u32; 256] = rotate_table(&build_te0(), 8);
static TE2: [u32; 256] = rotate_table(&build_te0(), 16);
static TE3: [u32; 256] = rotate_table(&build_te0(), 24);

static TD0: [u32; 256] = build_td0();
static TD1: [u32; 256] = rotate_table(&build_td0(), 8);
static TD2: [u32; 256] = rotate_table(&build_td0(), 16);
static TD3: [u32; 256] = rotate_table(&build_td0(), 24);

#[inline(always)]
fn b0(w: u32) -> usize {
    (w >> 24) as usize
}

#[inline(always)]
fn b1(w: u32) -> usize {
    ((w >> 16) & 0xff) as usize
}

#[inline(always)]
fn b2(w: u32) -> usize {
    ((w >> 8) & 0xff) as usize
}

#[inline(always)]
fn b3(w: u32) -> usize {
    (w & 0xff) as usize
}

fn inv_mix_column(w: u32) -> u32 {
    TD0[SBOX[b0(w)] as usize]
        ^ TD1[SBOX[b1(w)] as usize]
        ^ TD2[SBOX[b2(w)] as usize]
        ^ TD3[SBOX[b3(w)] as usize]
}

fn load(block: &[u8]) -> [u32; 4] {
    let mut s = [0u32; 4];
    for (i, word) in s.iter_mut().enumerate() {
        *word = u32::from_be_bytes([block[4 * i], block[4 * i + 1], block[4 * i + 2], block[4 * i + 3]]);
    }
    s
}

fn store(s: &[u32; 4], block: &mut [u8]) {
    for (i, word) in s.iter().enumerate() {
        block[4 * i..4 * i + 4].copy_from_slice(&word.to_be_bytes());
    }
}

/// AES engine with precomputed encryption and decryption schedules
pub struct Aes {
    nr: usize,
    ek: Vec<u32>,
    dk: Vec<u32>,
}

impl Aes {
    pub const BLOCK_SIZE: usize = 16;

    /// Create an engine from a 16, 24 or 32-byte key
    pub fn new(key: &[u8]) -> Result<Self> {
        check_key(key)?;
        let ek = expand_key(key, 4);
        let nr = ek.len() / 4 - 1;

        let mut dk = Vec::with_capacity(ek.len());
        for round in (0..=nr).rev() {
            for c in 0..4 {
                let w = ek[4 * round + c];
                if round == 0 || round == nr {
                    dk.push(w);
                } else {
                    dk.push(inv_mix_column(w));
                }
            }
        }

        Ok(Aes { nr, ek, dk })
    }

    pub fn rounds(&self) -> usize {
        self.nr
    }
}

impl BlockCipher for Aes {
    fn block_size(&self) -> usize {
        Self::BLOCK_SIZE
    }

    fn encrypt_block(&self, block: &mut [u8]) {
        let rk = &self.ek;
        let mut s = load(block);
        for (c, word) in s.iter_mut().enumerate() {
            *word ^= rk[c];
        }

        for round in 1..self.nr {
            let k = &rk[4 * round..4 * round + 4];
            let t0 = TE0[b0(s[0])] ^ TE1[b1(s[1])] ^ TE2[b2(s[2])] ^ TE3[b3(s[3])] ^ k[0];
            let t1 = TE0[b0(s[1])] ^ TE1[b1(s[2])] ^ TE2[b2(s[3])] ^ TE3[b3(s[0])] ^ k[1];
            let t2 = TE0[b0(s[2])] ^ TE1[b1(s[3])] ^ TE2[b2(s[0])] ^ TE3[b3(s[1])] ^ k[2];
            let t3 = TE0[b0(s[3])] ^ TE1[b1(s[0])] ^ TE2[b2(s[1])] ^ TE3[b3(s[2])] ^ k[3];
            s = [t0, t1, t2, t3];
        }

        let k = &rk[4 * self.nr..4 * self.nr + 4];
        let mut out = [0u32; 4];
        for c in 0..4 {
            out[c] = (((SBOX[b0(s[c])] as u32) << 24)
                | ((SBOX[b1(s[(c + 1) % 4])] as u32) << 16)
                | ((SBOX[b2(s[(c + 2) % 4])] as u32) << 8)
                | (SBOX[b3(s[(c + 3) % 4])] as u32))
                ^ k[c];
        }
        store(&out, block);
        s.zeroize();
    }

    fn decrypt_block(&self, block: &mut [u8]) {
        let rk = &self.dk;
        let mut s = load(block);
        for (c, word) in s.iter_mut().enumerate() {
            *word ^= rk[c];
        }

        for round in 1..self.nr {
            let k = &rk[4 * round..4 * round + 4];
            let t0 = TD0[b0(s[0])] ^ TD1[b1(s[3])] ^ TD2[b2(s[2])] ^ TD3[b3(s[1])] ^ k[0];
            let t1 = TD0[b0(s[1])] ^ TD1[b1(s[0])] ^ TD2[b2(s[3])] ^ TD3[b3(s[2])] ^ k[1];
            let t2 = TD0[b0(s[2])] ^ TD1[b1(s[1])] ^ TD2[b2(s[0])] ^ TD3[b3(s[3])] ^ k[2];
            let t3 = TD0[b0(s[3])] ^ TD1[b1(s[2])] ^ TD2[b2(s[1])] ^ TD3[b3(s[0])] ^ k[3];
            s = [t0, t1, t2, t3];
        }

        let k = &rk[4 * self.nr..4 * self.nr + 4];
        let mut out = [0u32; 4];
        for c in 0..4 {
            out[c] = (((INV_SBOX[b0(s[c])] as u32) << 24)
                | ((INV_SBOX[b1(s[(c + 3) % 4])] as u32) << 16)
                | ((INV_SBOX[b2(s[(c + 2) % 4])] as u32) << 8)
                | (INV_SBOX[b3(s[(c + 1) % 4])] as u32))
                ^ k[c];
        }
        store(&out, block);
        s.zeroize();
    }
}

impl Drop for Aes {
    fn drop(&mut self) {
        self.ek.zeroize();
        self.dk.zeroize();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn check(key: &str, plain: &str, cipher: &str) {
        let aes = Aes::new(&hex::decode(key).unwrap()).unwrap();
        let mut block = hex::decode(plain).unwrap();
        aes.encrypt_block(&mut block);
        assert_eq!(hex::encode(&block), cipher);
        aes.decrypt_block(&mut block);
        assert_eq!(hex::encode(&block), plain);
    }

    #[test]
    fn test_te0_entries() {
        // S(0) = 0x63: 2*0x63 = 0xc6, 3*0x63 = 0xa5
        assert_eq!(TE0[0], 0xc66363a5);
        assert_eq!(TE1[0], 0xa5c66363);
    }

    #[test]
    fn test_fips197_appendix_c() {
        check(
            "000102030405060708090a0b0c0d0e0f",
            "00112233445566778899aabbccddeeff",
            "69c4e0d86a7b0430d8cdb78070b4c55a",
        );
        check(
            "000102030405060708090a0b0c0d0e0f1011121314151617",
            "00112233445566778899aabbccddeeff",
            "dda97ca4864cdfe06eaf70a0ec0d7191",
        );
        check(
            "000102030405060708090a0b0c0d0e0f101112131415161718191a1b1c1d1e1f",
            "00112233445566778899aabbccddeeff",
            "8ea2b7ca516745bfeafc49904b496089",
        );
    }

    #[test]
    fn test_fips197_appendix_b() {
        check(
            "2b7e151628aed2a6abf7158809cf4f3c",
            "3243f6a8885a308d313198a2e0370734",
            "3925841d02dc09fbdc118597196a0b32",
        );
    }

    #[test]
    fn test_round_counts() {
        assert_eq!(Aes::new(&[0u8; 16]).unwrap().rounds(), 10);
        assert_eq!(Aes::new(&[0u8; 24]).unwrap().rounds(), 12);
        assert_eq!(Aes::new(&[0u8; 32]).unwrap().rounds(), 14);
    }
}
