//! Rijndael block engine
//!
//! Rijndael allows the block and the key to be 128, 192 or 256 bits
//! independently; AES is the 128-bit-block subset. [`Rijndael::new`] picks
//! the T-table engine in [`crate::aes`] for 128-bit blocks and the byte-state
//! reference engine below for the wider blocks.
//!
//! All tables (log/antilog, S-box, inverse S-box) are computed at compile time.

use log::debug;
use zeroize::Zeroize;

use crate::aes::Aes;
use crate::block::BlockCipher;
use crate::error::{CryptoError, Result};

const fn xtime(x: u8) -> u8 {
    (x << 1) ^ if x & 0x80 != 0 { 0x1b } else { 0 }
}

/// Powers of the generator 0x03 in GF(2^8)
const fn build_alog() -> [u8; 256] {
    let mut t = [0u8; 256];
    let mut x: u8 = 1;
    let mut i = 0;
    while i < 256 {
        t[i] = x;
        x ^= xtime(x);
        i += 1;
    }
    t
}

const fn build_log(alog: &[u8; 256]) -> [u8; 256] {
    let mut t = [0u8; 256];
    let mut i = 0;
    while i < 255 {
        t[alog[i] as usize] = i as u8;
        i += 1;
    }
    t
}

const fn build_sbox(log: &[u8; 256], alog: &[u8; 256]) -> [u8; 256] {
    let mut s = [0u8; 256];
    let mut x = 0;
    while x < 256 {
        let inv = if x == 0 {
            0
        } else {
            alog[(255 - log[x] as usize) % 255]
        };
        s[x] = inv
            ^ inv.rotate_left(1)
            ^ inv.rotate_left(2)
            ^ inv.rotate_left(3)
            ^ inv.rotate_left(4)
            ^ 0x63;
        x += 1;
    }
    s
}

const fn build_inv_sbox(sbox: &[u8; 256]) -> [u8; 256] {
    let mut s = [0u8; 256];
    let mut x = 0;
    while x < 256 {
        s[sbox[x] as usize] = x as u8;
        x += 1;
    }
    s
}

pub(crate) const ALOG: [u8; 256] = build_alog();
pub(crate) const LOG: [u8; 256] = build_log(&ALOG);
pub(crate) const SBOX: [u8; 256] = build_sbox(&LOG, &ALOG);
pub(crate) const INV_SBOX: [u8; 256] = build_inv_sbox(&SBOX);

/// Multiply in GF(2^8) through the log/antilog tables
pub(crate) const fn mul(a: u8, b: u8) -> u8 {
    if a == 0 || b == 0 {
        0
    } else {
        ALOG[(LOG[a as usize] as usize + LOG[b as usize] as usize) % 255]
    }
}

pub(crate) fn sub_word(w: u32) -> u32 {
    ((SBOX[(w >> 24) as usize] as u32) << 24)
        | ((SBOX[((w >> 16) & 0xff) as usize] as u32) << 16)
        | ((SBOX[((w >> 8) & 0xff) as usize] as u32) << 8)
        | (SBOX[(w & 0xff) as usize] as u32)
}

/// Number of rounds for a block of `nb` and a key of `nk` 32-bit words
pub fn rounds(nb: usize, nk: usize) -> usize {
    nb.max(nk) + 6
}

/// Expand a key into `nb * (nr + 1)` big-endian column words
pub(crate) fn expand_key(key: &[u8], nb: usize) -> Vec<u32> {
    let nk = key.len() / 4;
    let nr = rounds(nb, nk);
    let total = nb * (nr + 1);
    let mut w = Vec::with_capacity(total);

    for chunk in key.chunks(4) {
        w.push(u32::from_be_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]));
    }

    let mut rcon: u8 = 1;
    for i in nk..total {
        let mut temp = w[i - 1];
        if i % nk == 0 {
            temp = sub_word(temp.rotate_left(8)) ^ ((rcon as u32) << 24);
            rcon = xtime(rcon);
        } else if nk > 6 && i % nk == 4 {
            temp = sub_word(temp);
        }
        w.push(w[i - nk] ^ temp);
    }
    w
}

pub(crate) fn check_key(key: &[u8]) -> Result<()> {
    match key.len() {
        16 | 24 | 32 => Ok(()),
        len => Err(CryptoError::InvalidKeyLength {
            expected: "16, 24 or 32".to_string(),
            actual: len,
        }),
    }
}

fn check_block_size(block_size_bits: u32) -> Result<usize> {
    match block_size_bits {
        128 | 192 | 256 => Ok((block_size_bits / 32) as usize),
        bits => Err(CryptoError::InvalidBlockSize(format!(
            "Rijndael block must be 128, 192 or 256 bits, got {}",
            bits
        ))),
    }
}

/// Byte-state Rijndael engine for any legal block and key size
pub struct RijndaelReference {
    /// Block length in 32-bit columns
    nb: usize,
    nr: usize,
    /// Row rotation amounts for rows 1..=3
    shifts: [usize; 4],
    w: Vec<u32>,
}

type State = [[u8; 8]; 4];

impl RijndaelReference {
    pub fn new(key: &[u8], block_size_bits: u32) -> Result<Self> {
        check_key(key)?;
        let nb = check_block_size(block_size_bits)?;
        let nr = rounds(nb, key.len() / 4);
        let shifts = if nb == 8 { [0, 1, 3, 4] } else { [0, 1, 2, 3] };
        Ok(RijndaelReference {
            nb,
            nr,
            shifts,
            w: expand_key(key, nb),
        })
    }

    pub fn rounds(&self) -> usize {
        self.nr
    }

    fn load(&self, block: &[u8]) -> State {
        let mut s = [[0u8; 8]; 4];
        for (i, byte) in block[..4 * self.nb].iter().enumerate() {
            s[i % 4][i / 4] = *byte;
        }
        s
    }

    fn store(&self, s: &State, block: &mut [u8]) {
        for (i, byte) in block[..4 * self.nb].iter_mut().enumerate() {
            *byte = s[i % 4][i / 4];
        }
    }

    fn add_round_key(&self, s: &mut State, round: usize) {
        for c in 0..self.nb {
            let k = self.w[round * self.nb + c];
            for (row, cells) in s.iter_mut().enumerate() {
                cells[c] ^= (k >> (24 - 8 * row)) as u8;
            }
        }
    }

    fn byte_sub(&self, s: &mut State, table: &[u8; 256]) {
        for row in s.iter_mut() {
            for cell in row[..self.nb].iter_mut() {
                *cell = table[*cell as usize];
            }
        }
    }

    fn shift_row(&self, s: &mut State, inverse: bool) {
        for row in 1..4 {
            let mut tmp = [0u8; 8];
            let shift = self.shifts[row];
            for c in 0..self.nb {
                if inverse {
                    tmp[(c + shift) % self.nb] = s[row][c];
                } else {
                    tmp[c] = s[row][(c + shift) % self.nb];
                }
            }
            s[row][..self.nb].copy_from_slice(&tmp[..self.nb]);
        }
    }

    fn mix_column(&self, s: &mut State, coef: [u8; 4]) {
        for c in 0..self.nb {
            let col = [s[0][c], s[1][c], s[2][c], s[3][c]];
            for row in 0..4 {
                s[row][c] = mul(coef[0], col[row])
                    ^ mul(coef[1], col[(row + 1) % 4])
                    ^ mul(coef[2], col[(row + 2) % 4])
                    ^ mul(coef[3], col[(row + 3) % 4]);
            }
        }
    }
}

impl BlockCipher for RijndaelReference {
    fn block_size(&self) -> usize {
        4 * self.nb
    }

    fn encrypt_block(&self, block: &mut [u8]) {
        let mut s = self.load(block);
        self.add_round_key(&mut s, 0);
        for round in 1..self.nr {
            self.byte_sub(&mut s, &SBOX);
            self.shift_row(&mut s, false);
            self.mix_column(&mut s, [2, 3, 1, 1]);
            self.add_round_key(&mut s, round);
        }
        self.byte_sub(&mut s, &SBOX);
        self.shift_row(&mut s, false);
        self.add_round_key(&mut s, self.nr);
        self.store(&s, block);
        s.zeroize();
    }

    fn decrypt_block(&self, block: &mut [u8]) {
        let mut s = self.load(block);
        self.add_round_key(&mut s, self.nr);
        for round in (1..self.nr).rev() {
            self.shift_row(&mut s, true);
            self.byte_sub(&mut s, &INV_SBOX);
            self.add_round_key(&mut s, round);
            self.mix_column(&mut s, [0x0e, 0x0b, 0x0d, 0x09]);
        }
        self.shift_row(&mut s, true);
        self.byte_sub(&mut s, &INV_SBOX);
        self.add_round_key(&mut s, 0);
        self.store(&s, block);
        s.zeroize();
    }
}

impl Drop for RijndaelReference {
    fn drop(&mut self) {
        self.w.zeroize();
    }
}

/// Rijndael engine, dispatching on block size
pub enum Rijndael {
    /// 128-bit block, T-table engine
    Table(Aes),
    /// 192- or 256-bit block, byte-state engine
    Reference(RijndaelReference),
}

impl Rijndael {
    /// Create an engine for a 16/24/32-byte key and a 128/192/256-bit block
    pub fn new(key: &[u8], block_size_bits: u32) -> Result<Self> {
        check_key(key)?;
        check_block_size(block_size_bits)?;
        debug!(
            "Rijndael engine: {}-bit key, {}-bit block",
            key.len() * 8,
            block_size_bits
        );
        if block_size_bits == 128 {
            Ok(Rijndael::Table(Aes::new(key)?))
        } else {
            Ok(Rijndael::Reference(RijndaelReference::new(key, block_size_bits)?))
        }
    }
}

impl BlockCipher for Rijndael {
    fn block_size(&self) -> usize {
        match self {
            Rijndael::Table(e) => e.block_size(),
            Rijndael::Reference(e) => e.block_size(),
        }
    }

    fn encrypt_block(&self, block: &mut [u8]) {
        match self {
            Rijndael::Table(e) => e.encrypt_block(block),
            Rijndael::Reference(e) => e.encrypt_block(block),
        }
    }

    fn decrypt_block(&self, block: &mut [u8]) {
        match self {
            Rijndael::Table(e) => e.decrypt_block(block),
            Rijndael::Reference(e) => e.decrypt_block(block),
        }
    }
}
