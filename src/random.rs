//! Random key material from the operating system generator

use rand::rngs::OsRng;
use rand::RngCore;

/// Fill `dest` with random bytes
pub fn fill_random(dest: &mut [u8]) {
    OsRng.fill_bytes(dest);
}

/// Allocate `len` random bytes
pub fn random_bytes(len: usize) -> Vec<u8> {
    let mut bytes = vec![0u8; len];
    fill_random(&mut bytes);
    bytes
}
