//! Random primary identifiers.
//!
//! The persistence layer asks an [`IdGenerator`] for a key whenever an entity
//! is saved without one. [`RandomStringIdGenerator`] draws characters
//! uniformly from an alphabet until the string carries at least
//! `bit_strength` bits of entropy: length = ⌈bits / log2(|alphabet|)⌉.

use crate::config::IdsConfig;
use rand::{CryptoRng, Rng};
use thiserror::Error;

pub const ALPHABET_BIN: &str = "01";
pub const ALPHABET_OC: &str = "01234567";
pub const ALPHABET_HEX: &str = "0123456789abcdef";
pub const ALPHABET_ALNUM: &str = "0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz";
pub const ALPHABET_ALNUM_LOWCASE: &str = "0123456789abcdefghijklmnopqrstuvwxyz";
pub const ALPHABET_DIGITS: &str = "0123456789";

#[derive(Error, Debug, PartialEq, Eq)]
pub enum IdGeneratorError {
    #[error("Alphabet needs at least two distinct characters, got {0}")]
    AlphabetTooShort(usize),
    #[error("Bit strength must be non-zero")]
    ZeroStrength,
}

/// Pluggable primary-key strategy.
pub trait IdGenerator {
    fn generate(&self) -> String;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RandomStringIdGenerator {
    alphabet: Vec<char>,
    bit_strength: u32,
}

impl RandomStringIdGenerator {
    pub fn new(alphabet: &str, bit_strength: u32) -> Result<Self, IdGeneratorError> {
        let mut generator = Self::default();
        generator.set_alphabet(alphabet)?;
        generator.set_bit_strength(bit_strength)?;
        Ok(generator)
    }

    pub fn from_config(config: &IdsConfig) -> Result<Self, IdGeneratorError> {
        Self::new(&config.alphabet, config.bit_strength)
    }

    /// Duplicate characters are dropped so every symbol is equally likely.
    pub fn set_alphabet(&mut self, alphabet: &str) -> Result<(), IdGeneratorError> {
        let mut symbols: Vec<char> = Vec::with_capacity(alphabet.len());
        for c in alphabet.chars() {
            if !symbols.contains(&c) {
                symbols.push(c);
            }
        }
        if symbols.len() < 2 {
            return Err(IdGeneratorError::AlphabetTooShort(symbols.len()));
        }
        self.alphabet = symbols;
        Ok(())
    }

    pub fn set_bit_strength(&mut self, bit_strength: u32) -> Result<(), IdGeneratorError> {
        if bit_strength == 0 {
            return Err(IdGeneratorError::ZeroStrength);
        }
        self.bit_strength = bit_strength;
        Ok(())
    }

    pub fn alphabet(&self) -> String {
        self.alphabet.iter().collect()
    }

    pub fn bit_strength(&self) -> u32 {
        self.bit_strength
    }

    /// Number of characters in every generated identifier.
    pub fn length(&self) -> usize {
        let bits_per_char = (self.alphabet.len() as f64).log2();
        (self.bit_strength as f64 / bits_per_char).ceil() as usize
    }

    /// Generate with an explicit randomness source.
    pub fn generate_with<R: Rng + CryptoRng + ?Sized>(&self, rng: &mut R) -> String {
        (0..self.length())
            .map(|_| self.alphabet[rng.random_range(0..self.alphabet.len())])
            .collect()
    }
}

impl Default for RandomStringIdGenerator {
    fn default() -> Self {
        Self {
            alphabet: ALPHABET_ALNUM.chars().collect(),
            bit_strength: 128,
        }
    }
}

impl IdGenerator for RandomStringIdGenerator {
    fn generate(&self) -> String {
        self.generate_with(&mut rand::rng())
    }
}
