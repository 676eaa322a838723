//! Byte and word helpers shared by the cipher and hash engines

/// Read big-endian u32 from bytes
pub fn read_u32_be(bytes: &[u8]) -> u32 {
    ((bytes[0] as u32) << 24)
        | ((bytes[1] as u32) << 16)
        | ((bytes[2] as u32) << 8)
        | (bytes[3] as u32)
}

/// Read little-endian u32 from bytes
pub fn read_u32_le(bytes: &[u8]) -> u32 {
    (bytes[0] as u32)
        | ((bytes[1] as u32) << 8)
        | ((bytes[2] as u32) << 16)
        | ((bytes[3] as u32) << 24)
}

/// Read big-endian u64 from bytes
pub fn read_u64_be(bytes: &[u8]) -> u64 {
    ((read_u32_be(&bytes[..4]) as u64) << 32) | (read_u32_be(&bytes[4..8]) as u64)
}

/// Write big-endian u32 into bytes
pub fn write_u32_be(bytes: &mut [u8], value: u32) {
    bytes[..4].copy_from_slice(&value.to_be_bytes());
}

/// Write little-endian u32 into bytes
pub fn write_u32_le(bytes: &mut [u8], value: u32) {
    bytes[..4].copy_from_slice(&value.to_le_bytes());
}

/// Write big-endian u64 into bytes
pub fn write_u64_be(bytes: &mut [u8], value: u64) {
    bytes[..8].copy_from_slice(&value.to_be_bytes());
}

/// XOR `src` into `dst`, element by element
pub fn xor_in_place(dst: &mut [u8], src: &[u8]) {
    for (d, s) in dst.iter_mut().zip(src.iter()) {
        *d ^= *s;
    }
}

/// Compare two byte strings without an early exit on the first mismatch
pub fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b.iter()).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
