//! Single-block cipher interface
//!
//! Every engine in this crate expands its key once at construction and then
//! transforms one block at a time, in place. The expanded schedule is never
//! mutated afterwards, so an engine can be shared read-only between threads;
//! the chaining state lives in [`crate::transform::SymmetricTransform`].

/// A keyed block cipher with a fixed block size
pub trait BlockCipher: Send + Sync {
    /// Block length in bytes
    fn block_size(&self) -> usize;

    /// Encrypt exactly one block in place
    fn encrypt_block(&self, block: &mut [u8]);

    /// Decrypt exactly one block in place
    fn decrypt_block(&self, block: &mut [u8]);
}

impl<T: BlockCipher + ?Sized> BlockCipher for Box<T> {
    fn block_size(&self) -> usize {
        (**self).block_size()
    }

    fn encrypt_block(&self, block: &mut [u8]) {
        (**self).encrypt_block(block)
    }

    fn decrypt_block(&self, block: &mut [u8]) {
        (**self).decrypt_block(block)
    }
}
