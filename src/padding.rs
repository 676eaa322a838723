//! Final-block padding schemes
//!
//! Length-carrying schemes (PKCS7, ANSIX923, ISO10126) always append between
//! 1 and `block_size` bytes, the last of which holds the count. Zero padding
//! fills only up to the next boundary and cannot be removed.

use log::debug;

use crate::error::{CryptoError, Result};
use crate::random;
use crate::types::PaddingMode;

/// Return `data` followed by the padding for `mode`
pub fn pad(mode: PaddingMode, data: &[u8], block_size: usize) -> Result<Vec<u8>> {
    let rem = data.len() % block_size;
    let mut out = Vec::with_capacity(data.len() + block_size);
    out.extend_from_slice(data);

    match mode {
        PaddingMode::None => {
            if rem != 0 {
                return Err(CryptoError::InvalidInput(format!(
                    "{} bytes is not a multiple of the {}-byte block and padding is None",
                    data.len(),
                    block_size
                )));
            }
        }
        PaddingMode::Zeros => {
            if rem != 0 {
                out.resize(data.len() + block_size - rem, 0);
            }
        }
        PaddingMode::Pkcs7 => {
            let count = block_size - rem;
            out.resize(data.len() + count, count as u8);
        }
        PaddingMode::AnsiX923 => {
            let count = block_size - rem;
            out.resize(data.len() + count - 1, 0);
            out.push(count as u8);
        }
        PaddingMode::Iso10126 => {
            let count = block_size - rem;
            out.extend_from_slice(&random::random_bytes(count - 1));
            out.push(count as u8);
        }
    }
    Ok(out)
}

/// Validate and strip padding from decrypted `data` in place
pub fn unpad(mode: PaddingMode, data: &mut Vec<u8>, block_size: usize) -> Result<()> {
    if !mode.carries_length() {
        return Ok(());
    }

    let count = match data.last() {
        Some(&last) => last as usize,
        None => return Err(bad_padding(mode, "no data")),
    };
    if count == 0 || count > block_size || count > data.len() {
        return Err(bad_padding(mode, "count out of range"));
    }

    let fill = &data[data.len() - count..data.len() - 1];
    let valid = match mode {
        PaddingMode::Pkcs7 => fill.iter().fold(0u8, |acc, &b| acc | (b ^ count as u8)) == 0,
        PaddingMode::AnsiX923 => fill.iter().fold(0u8, |acc, &b| acc | b) == 0,
        _ => true,
    };
    if !valid {
        return Err(bad_padding(mode, "fill bytes do not match"));
    }

    data.truncate(data.len() - count);
    Ok(())
}

fn bad_padding(mode: PaddingMode, reason: &str) -> CryptoError {
    debug!("{} padding rejected: {}", mode.as_str(), reason);
    CryptoError::InvalidPadding
}
