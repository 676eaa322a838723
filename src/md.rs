//! Merkle–Damgård block buffering shared by the hash engines
//!
//! The buffer accumulates input until a full block is available, hands each
//! full block to the engine's compression function, and applies the
//! `0x80 || zeros || bit-length` trailer at finalization.

use zeroize::Zeroize;

/// Byte order of the trailing bit-length field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LengthOrder {
    BigEndian,
    LittleEndian,
}

/// Partial-block accumulator for an `N`-byte compression block
pub(crate) struct BlockBuffer<const N: usize> {
    buf: [u8; N],
    pos: usize,
    /// Total message length in bytes
    total: u128,
}

impl<const N: usize> BlockBuffer<N> {
    pub fn new() -> Self {
        BlockBuffer {
            buf: [0u8; N],
            pos: 0,
            total: 0,
        }
    }

    /// Feed `data`, calling `compress` once per completed block
    pub fn update<F>(&mut self, mut data: &[u8], mut compress: F)
    where
        F: FnMut(&[u8; N]),
    {
        self.total += data.len() as u128;

        if self.pos > 0 {
            let take = (N - self.pos).min(data.len());
            self.buf[self.pos..self.pos + take].copy_from_slice(&data[..take]);
            self.pos += take;
            data = &data[take..];
            if self.pos < N {
                return;
            }
            compress(&self.buf);
            self.pos = 0;
        }

        let mut blocks = data.chunks_exact(N);
        for block in &mut blocks {
            let mut full = [0u8; N];
            full.copy_from_slice(block);
            compress(&full);
        }

        let rest = blocks.remainder();
        self.buf[..rest.len()].copy_from_slice(rest);
        self.pos = rest.len();
    }

    /// Apply the trailer with a `length_width`-byte bit count and compress
    /// the last one or two blocks. Leaves the buffer empty.
    pub fn finish<F>(&mut self, length_width: usize, order: LengthOrder, mut compress: F)
    where
        F: FnMut(&[u8; N]),
    {
        let bits = self.total.wrapping_mul(8);

        self.buf[self.pos] = 0x80;
        self.pos += 1;
        if self.pos > N - length_width {
            self.buf[self.pos..].fill(0);
            compress(&self.buf);
            self.pos = 0;
        }
        self.buf[self.pos..N - length_width].fill(0);

        let field = &mut self.buf[N - length_width..];
        match order {
            LengthOrder::BigEndian => {
                let be = bits.to_be_bytes();
                field.copy_from_slice(&be[16 - length_width..]);
            }
            LengthOrder::LittleEndian => {
                let le = bits.to_le_bytes();
                field.copy_from_slice(&le[..length_width]);
            }
        }
        compress(&self.buf);
        self.reset();
    }

    pub fn reset(&mut self) {
        self.buf.zeroize();
        self.pos = 0;
        self.total = 0;
    }
}

impl<const N: usize> Drop for BlockBuffer<N> {
    fn drop(&mut self) {
        self.buf.zeroize();
    }
}
