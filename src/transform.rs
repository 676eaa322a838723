//! Chaining-mode wrapper turning a block engine into a stream transform
//!
//! A `SymmetricTransform` owns the engine and a feedback register seeded
//! from the IV. Every [`transform_block`](SymmetricTransform::transform_block)
//! call advances the register; [`transform_final_block`]
//! (SymmetricTransform::transform_final_block) applies or strips padding and
//! then reseeds the register so the transform can start a new message.
//!
//! CFB always runs the engine forward over the register and slides it by the
//! ciphertext segment, so the transform's input block is one segment.

use log::debug;
use zeroize::Zeroize;

use crate::block::BlockCipher;
use crate::error::{CryptoError, Result};
use crate::padding;
use crate::types::{CipherMode, Direction, PaddingMode};
use crate::utils::xor_in_place;

/// Largest engine block handled, in bytes (256-bit Rijndael)
const MAX_BLOCK: usize = 32;

pub struct SymmetricTransform {
    engine: Box<dyn BlockCipher>,
    direction: Direction,
    mode: CipherMode,
    padding: PaddingMode,
    /// Bytes consumed per step: the engine block, or the CFB segment
    segment: usize,
    iv: Vec<u8>,
    register: Vec<u8>,
}

impl SymmetricTransform {
    /// Wrap `engine`. The IV must be one engine block long except under ECB,
    /// where it is ignored. `feedback_bits` only matters for CFB.
    pub fn new(
        engine: Box<dyn BlockCipher>,
        direction: Direction,
        mode: CipherMode,
        padding: PaddingMode,
        iv: &[u8],
        feedback_bits: u32,
    ) -> Result<Self> {
        let block_size = engine.block_size();
        if block_size == 0 || block_size > MAX_BLOCK {
            return Err(CryptoError::InvalidBlockSize(format!(
                "{}-byte engine block",
                block_size
            )));
        }

        let segment = match mode {
            CipherMode::Ecb | CipherMode::Cbc => block_size,
            CipherMode::Cfb => {
                if feedback_bits == 0
                    || feedback_bits % 8 != 0
                    || feedback_bits as usize > block_size * 8
                {
                    return Err(CryptoError::InvalidFeedbackSize(feedback_bits));
                }
                feedback_bits as usize / 8
            }
            CipherMode::Ofb | CipherMode::Cts => {
                return Err(CryptoError::UnsupportedParameter(format!(
                    "cipher mode {}",
                    mode.as_str()
                )));
            }
        };

        let iv = if mode == CipherMode::Ecb {
            vec![0u8; block_size]
        } else if iv.len() != block_size {
            return Err(CryptoError::InvalidIvLength {
                expected: block_size,
                actual: iv.len(),
            });
        } else {
            iv.to_vec()
        };

        debug!(
            "{:?} transform: {}, {} padding, {}-byte block, {}-byte segment",
            direction,
            mode.as_str(),
            padding.as_str(),
            block_size,
            segment
        );

        Ok(SymmetricTransform {
            engine,
            direction,
            mode,
            padding,
            segment,
            register: iv.clone(),
            iv,
        })
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn mode(&self) -> CipherMode {
        self.mode
    }

    pub fn padding(&self) -> PaddingMode {
        self.padding
    }

    /// Input accepted per step, in bytes
    pub fn input_block_size(&self) -> usize {
        self.segment
    }

    pub fn output_block_size(&self) -> usize {
        self.segment
    }

    /// Transform whole blocks. The length must be a non-zero multiple of
    /// [`input_block_size`](Self::input_block_size).
    pub fn transform_block(&mut self, input: &[u8]) -> Result<Vec<u8>> {
        if input.is_empty() || input.len() % self.segment != 0 {
            return Err(CryptoError::InvalidBlockSize(format!(
                "{} bytes is not a multiple of {}",
                input.len(),
                self.segment
            )));
        }
        let mut out = input.to_vec();
        self.process(&mut out);
        Ok(out)
    }

    /// Transform the last piece of a message, then reseed from the IV
    pub fn transform_final_block(&mut self, input: &[u8]) -> Result<Vec<u8>> {
        let result = match self.direction {
            Direction::Encrypt => self.encrypt_final(input),
            Direction::Decrypt => self.decrypt_final(input),
        };
        self.reset();
        result
    }

    /// Return to the start of a message
    pub fn reset(&mut self) {
        self.register.copy_from_slice(&self.iv);
    }

    fn check_final_length(&self, input: &[u8]) -> Result<()> {
        if self.padding == PaddingMode::None && input.len() > self.segment {
            return Err(CryptoError::InvalidInput(format!(
                "final block of {} bytes exceeds {} with padding None",
                input.len(),
                self.segment
            )));
        }
        Ok(())
    }

    fn encrypt_final(&mut self, input: &[u8]) -> Result<Vec<u8>> {
        self.check_final_length(input)?;
        let mut out = padding::pad(self.padding, input, self.segment)?;
        self.process(&mut out);
        Ok(out)
    }

    fn decrypt_final(&mut self, input: &[u8]) -> Result<Vec<u8>> {
        self.check_final_length(input)?;
        if input.len() % self.segment != 0 {
            return Err(CryptoError::InvalidBlockSize(format!(
                "ciphertext of {} bytes is not a multiple of {}",
                input.len(),
                self.segment
            )));
        }
        let mut out = input.to_vec();
        self.process(&mut out);
        if let Err(e) = padding::unpad(self.padding, &mut out, self.segment) {
            out.zeroize();
            return Err(e);
        }
        Ok(out)
    }

    /// Run the mode over `data` in place; `data.len()` is a multiple of the segment
    fn process(&mut self, data: &mut [u8]) {
        match self.mode {
            CipherMode::Ecb => self.ecb(data),
            CipherMode::Cbc => self.cbc(data),
            _ => self.cfb(data),
        }
    }

    fn ecb(&self, data: &mut [u8]) {
        for block in data.chunks_exact_mut(self.segment) {
            match self.direction {
                Direction::Encrypt => self.engine.encrypt_block(block),
                Direction::Decrypt => self.engine.decrypt_block(block),
            }
        }
    }

    fn cbc(&mut self, data: &mut [u8]) {
        let mut scratch = [0u8; MAX_BLOCK];
        let previous = &mut scratch[..self.segment];
        for block in data.chunks_exact_mut(self.segment) {
            match self.direction {
                Direction::Encrypt => {
                    xor_in_place(block, &self.register);
                    self.engine.encrypt_block(block);
                    self.register.copy_from_slice(block);
                }
                Direction::Decrypt => {
                    previous.copy_from_slice(block);
                    self.engine.decrypt_block(block);
                    xor_in_place(block, &self.register);
                    self.register.copy_from_slice(previous);
                }
            }
        }
        scratch.zeroize();
    }

    fn cfb(&mut self, data: &mut [u8]) {
        let s = self.segment;
        let mut scratch = [0u8; MAX_BLOCK];
        let keystream = &mut scratch[..self.register.len()];
        for segment in data.chunks_exact_mut(s) {
            keystream.copy_from_slice(&self.register);
            self.engine.encrypt_block(keystream);

            self.register.rotate_left(s);
            let tail = self.register.len() - s;
            match self.direction {
                Direction::Encrypt => {
                    xor_in_place(segment, &keystream[..s]);
                    self.register[tail..].copy_from_slice(segment);
                }
                Direction::Decrypt => {
                    self.register[tail..].copy_from_slice(segment);
                    xor_in_place(segment, &keystream[..s]);
                }
            }
        }
        scratch.zeroize();
    }
}

impl Drop for SymmetricTransform {
    fn drop(&mut self) {
        self.iv.zeroize();
        self.register.zeroize();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aes::Aes;
    use crate::des::Des;

    fn des(key: &str) -> Box<dyn BlockCipher> {
        Box::new(Des::new(&hex::decode(key).unwrap()).unwrap())
    }

    fn aes(key: &str) -> Box<dyn BlockCipher> {
        Box::new(Aes::new(&hex::decode(key).unwrap()).unwrap())
    }

    fn transform(
        engine: Box<dyn BlockCipher>,
        direction: Direction,
        mode: CipherMode,
        padding: PaddingMode,
        iv: &str,
        feedback: u32,
    ) -> SymmetricTransform {
        SymmetricTransform::new(engine, direction, mode, padding, &hex::decode(iv).unwrap(), feedback)
            .unwrap()
    }

    // FIPS 81 examples, key 0123456789abcdef, "Now is the time for all "
    const FIPS81_KEY: &str = "0123456789abcdef";
    const FIPS81_IV: &str = "1234567890abcdef";
    const FIPS81_PLAIN: &[u8] = b"Now is the time for all ";

    #[test]
    fn test_des_ecb_fips81() {
        let mut t = transform(
            des(FIPS81_KEY),
            Direction::Encrypt,
            CipherMode::Ecb,
            PaddingMode::None,
            "",
            8,
        );
        let out = t.transform_block(FIPS81_PLAIN).unwrap();
        assert_eq!(hex::encode(out), "3fa40e8a984d48156a271787ab8883f9893d51ec4b563b53");
    }

    #[test]
    fn test_des_cbc_fips81() {
        let mut t = transform(
            des(FIPS81_KEY),
            Direction::Encrypt,
            CipherMode::Cbc,
            PaddingMode::None,
            FIPS81_IV,
            8,
        );
        let out = t.transform_block(FIPS81_PLAIN).unwrap();
        assert_eq!(hex::encode(&out), "e5c7cdde872bf27c43e934008c389c0f683788499a7c05f6");

        let mut d = transform(
            des(FIPS81_KEY),
            Direction::Decrypt,
            CipherMode::Cbc,
            PaddingMode::None,
            FIPS81_IV,
            8,
        );
        assert_eq!(d.transform_block(&out).unwrap(), FIPS81_PLAIN);
    }

    #[test]
    fn test_des_cfb8_fips81() {
        let mut t = transform(
            des(FIPS81_KEY),
            Direction::Encrypt,
            CipherMode::Cfb,
            PaddingMode::None,
            FIPS81_IV,
            8,
        );
        let out = t.transform_block(&FIPS81_PLAIN[..19]).unwrap();
        assert_eq!(hex::encode(&out), "f31fda07011462ee187f43d80a7cd9b5b0d290");

        let mut d = transform(
            des(FIPS81_KEY),
            Direction::Decrypt,
            CipherMode::Cfb,
            PaddingMode::None,
            FIPS81_IV,
            8,
        );
        assert_eq!(d.transform_block(&out).unwrap(), &FIPS81_PLAIN[..19]);
    }

    #[test]
    fn test_aes_cbc_sp800_38a() {
        let mut t = transform(
            aes("2b7e151628aed2a6abf7158809cf4f3c"),
            Direction::Encrypt,
            CipherMode::Cbc,
            PaddingMode::None,
            "000102030405060708090a0b0c0d0e0f",
            128,
        );
        let plain = hex::decode("6bc1bee22e409f96e93d7e117393172aae2d8a571e03ac9c9eb76fac45af8e51").unwrap();
        let out = t.transform_block(&plain).unwrap();
        assert_eq!(
            hex::encode(out),
            "7649abac8119b246cee98e9b12e9197d5086cb9b507219ee95db113a917678b2"
        );
    }

    #[test]
    fn test_aes_cfb128_sp800_38a() {
        let mut t = transform(
            aes("2b7e151628aed2a6abf7158809cf4f3c"),
            Direction::Encrypt,
            CipherMode::Cfb,
            PaddingMode::None,
            "000102030405060708090a0b0c0d0e0f",
            128,
        );
        let plain = hex::decode("6bc1bee22e409f96e93d7e117393172aae2d8a571e03ac9c9eb76fac45af8e51").unwrap();
        let out = t.transform_block(&plain).unwrap();
        assert_eq!(
            hex::encode(out),
            "3b3fd92eb72dad20333449f8e83cfb4ac8a64537a0b3a93fcde3cdad9f1ce58b"
        );
    }

    #[test]
    fn test_aes_cfb8_sp800_38a() {
        let mut t = transform(
            aes("2b7e151628aed2a6abf7158809cf4f3c"),
            Direction::Encrypt,
            CipherMode::Cfb,
            PaddingMode::None,
            "000102030405060708090a0b0c0d0e0f",
            8,
        );
        let plain = hex::decode("6bc1bee22e409f96e93d7e117393172aae2d").unwrap();
        let out = t.transform_block(&plain).unwrap();
        assert_eq!(hex::encode(out), "3b79424c9c0dd436bace9e0ed4586a4f32b9");
    }

    #[test]
    fn test_cfb8_pkcs7_pads_to_segment() {
        let mut t = transform(
            aes("2b7e151628aed2a6abf7158809cf4f3c"),
            Direction::Encrypt,
            CipherMode::Cfb,
            PaddingMode::Pkcs7,
            "000102030405060708090a0b0c0d0e0f",
            8,
        );
        assert_eq!(t.input_block_size(), 1);
        let out = t.transform_final_block(b"x").unwrap();
        assert_eq!(out.len(), 2);

        let mut d = transform(
            aes("2b7e151628aed2a6abf7158809cf4f3c"),
            Direction::Decrypt,
            CipherMode::Cfb,
            PaddingMode::Pkcs7,
            "000102030405060708090a0b0c0d0e0f",
            8,
        );
        assert_eq!(d.transform_final_block(&out).unwrap(), b"x");
    }

    #[test]
    fn test_block_size_enforced() {
        let mut t = transform(
            des(FIPS81_KEY),
            Direction::Encrypt,
            CipherMode::Cbc,
            PaddingMode::Pkcs7,
            FIPS81_IV,
            8,
        );
        assert!(matches!(t.transform_block(b"short"), Err(CryptoError::InvalidBlockSize(_))));
        assert!(matches!(t.transform_block(b""), Err(CryptoError::InvalidBlockSize(_))));
    }

    #[test]
    fn test_final_block_resets_register() {
        let mut t = transform(
            des(FIPS81_KEY),
            Direction::Encrypt,
            CipherMode::Cbc,
            PaddingMode::Pkcs7,
            FIPS81_IV,
            8,
        );
        let first = t.transform_final_block(b"message").unwrap();
        let second = t.transform_final_block(b"message").unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_none_padding_final_limits() {
        let mut t = transform(
            des(FIPS81_KEY),
            Direction::Encrypt,
            CipherMode::Ecb,
            PaddingMode::None,
            "",
            8,
        );
        assert!(matches!(
            t.transform_final_block(&[0u8; 16]),
            Err(CryptoError::InvalidInput(_))
        ));
        assert!(matches!(
            t.transform_final_block(&[0u8; 5]),
            Err(CryptoError::InvalidInput(_))
        ));
        assert!(t.transform_final_block(&[]).unwrap().is_empty());
        assert_eq!(t.transform_final_block(&[0u8; 8]).unwrap().len(), 8);
    }

    #[test]
    fn test_bad_padding_detected() {
        let mut enc = transform(
            des(FIPS81_KEY),
            Direction::Encrypt,
            CipherMode::Ecb,
            PaddingMode::None,
            "",
            8,
        );
        let forged = enc.transform_block(b"abcdefg\x05").unwrap();

        let mut dec = transform(
            des(FIPS81_KEY),
            Direction::Decrypt,
            CipherMode::Ecb,
            PaddingMode::Pkcs7,
            "",
            8,
        );
        assert!(matches!(
            dec.transform_final_block(&forged),
            Err(CryptoError::InvalidPadding)
        ));
    }

    #[test]
    fn test_rejects_bad_parameters() {
        let iv = hex::decode(FIPS81_IV).unwrap();
        for mode in [CipherMode::Ofb, CipherMode::Cts] {
            assert!(matches!(
                SymmetricTransform::new(des(FIPS81_KEY), Direction::Encrypt, mode, PaddingMode::Pkcs7, &iv, 8),
                Err(CryptoError::UnsupportedParameter(_))
            ));
        }
        assert!(matches!(
            SymmetricTransform::new(des(FIPS81_KEY), Direction::Encrypt, CipherMode::Cbc, PaddingMode::Pkcs7, &iv[..4], 8),
            Err(CryptoError::InvalidIvLength { expected: 8, actual: 4 })
        ));
        for feedback in [0, 12, 72] {
            assert!(matches!(
                SymmetricTransform::new(des(FIPS81_KEY), Direction::Encrypt, CipherMode::Cfb, PaddingMode::Pkcs7, &iv, feedback),
                Err(CryptoError::InvalidFeedbackSize(_))
            ));
        }
    }

    struct WideBlock;

    impl BlockCipher for WideBlock {
        fn block_size(&self) -> usize {
            64
        }

        fn encrypt_block(&self, _block: &mut [u8]) {}

        fn decrypt_block(&self, _block: &mut [u8]) {}
    }

    #[test]
    fn test_rejects_oversized_engine_block() {
        assert!(matches!(
            SymmetricTransform::new(Box::new(WideBlock), Direction::Encrypt, CipherMode::Ecb, PaddingMode::None, &[], 8),
            Err(CryptoError::InvalidBlockSize(_))
        ));
    }

    #[test]
    fn test_widest_block_chunked_matches_whole() {
        use crate::rijndael::RijndaelReference;

        let key: Vec<u8> = (0..32u8).collect();
        let iv: Vec<u8> = (0..32u8).map(|b| b.wrapping_mul(7)).collect();
        let plain: Vec<u8> = (0..96u8).collect();
        let engine = || -> Box<dyn BlockCipher> { Box::new(RijndaelReference::new(&key, 256).unwrap()) };

        for (mode, feedback) in [(CipherMode::Cbc, 256), (CipherMode::Cfb, 256), (CipherMode::Cfb, 64)] {
            let mut enc =
                SymmetricTransform::new(engine(), Direction::Encrypt, mode, PaddingMode::None, &iv, feedback).unwrap();
            let sealed = enc.transform_block(&plain).unwrap();
            assert_ne!(sealed, plain);

            let mut dec =
                SymmetricTransform::new(engine(), Direction::Decrypt, mode, PaddingMode::None, &iv, feedback).unwrap();
            let step = dec.input_block_size();
            let mut opened = Vec::new();
            for chunk in sealed.chunks(step) {
                opened.extend(dec.transform_block(chunk).unwrap());
            }
            assert_eq!(opened, plain, "{} feedback {}", mode.as_str(), feedback);
        }
    }
}
