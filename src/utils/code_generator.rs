//! Short code generation and validation utilities.
//!
//! Codes are drawn from a fixed base62 alphabet (`0-9A-Z a-z`), which is
//! URL-safe without escaping. Two strategies share one validator:
//!
//! - [`CodeStrategy::Random`] - uniform symbols from a cryptographically secure RNG
//! - [`CodeStrategy::Sequential`] - bijective radix-62 encoding of a numeric id
//!
//! Random codes cannot be enumerated; sequential codes are collision-free by
//! construction but leak the ordinal of the record.

use rand::Rng;
use std::str::FromStr;

/// The 62-symbol alphabet, in radix order.
pub const ALPHABET: &[u8; 62] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz";

/// Shortest code length accepted anywhere in the system.
pub const MIN_CODE_LENGTH: usize = 4;

/// Longest code length accepted anywhere in the system.
pub const MAX_CODE_LENGTH: usize = 12;

const RADIX: u64 = ALPHABET.len() as u64;

/// Policy used to produce candidate codes for new links.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CodeStrategy {
    #[default]
    Random,
    Sequential,
}

impl FromStr for CodeStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "random" => Ok(Self::Random),
            "sequential" => Ok(Self::Sequential),
            other => Err(format!(
                "unknown code strategy '{other}' (expected 'random' or 'sequential')"
            )),
        }
    }
}

/// Generates and validates base62 short codes of a fixed length.
///
/// Thread-safe: holds no state besides the configured length, and every
/// [`generate`](Self::generate) call pulls from the thread-local CSPRNG.
#[derive(Debug, Clone, Copy)]
pub struct CodeGenerator {
    length: usize,
}

impl CodeGenerator {
    /// Creates a generator, clamping `length` into
    /// [`MIN_CODE_LENGTH`]..=[`MAX_CODE_LENGTH`].
    pub fn new(length: usize) -> Self {
        Self {
            length: length.clamp(MIN_CODE_LENGTH, MAX_CODE_LENGTH),
        }
    }

    /// The effective code length after clamping.
    pub fn length(&self) -> usize {
        self.length
    }

    /// Produces a random code of the configured length.
    ///
    /// Each symbol is sampled uniformly from [`ALPHABET`] with
    /// `rand::rng()`, a ChaCha-based CSPRNG periodically reseeded from the OS.
    pub fn generate(&self) -> String {
        let mut rng = rand::rng();
        (0..self.length)
            .map(|_| ALPHABET[rng.random_range(0..ALPHABET.len())] as char)
            .collect()
    }

    /// Encodes `id` in base62, left-padded with `'0'` to the configured length.
    ///
    /// Distinct ids always produce distinct codes.
    ///
    /// # Examples
    ///
    /// ```ignore
    /// let generator = CodeGenerator::new(6);
    /// assert_eq!(generator.from_id(0), "000000");
    /// assert_eq!(generator.from_id(61), "00000z");
    /// assert_eq!(generator.from_id(62), "000010");
    /// ```
    pub fn from_id(&self, id: u64) -> String {
        let mut digits = Vec::with_capacity(self.length);
        let mut num = id;

        while num > 0 {
            digits.push(ALPHABET[(num % RADIX) as usize]);
            num /= RADIX;
        }

        while digits.len() < self.length {
            digits.push(ALPHABET[0]);
        }

        digits.iter().rev().map(|&b| b as char).collect()
    }

    /// Inverts [`from_id`](Self::from_id).
    ///
    /// Returns `None` if `code` contains a symbol outside the alphabet or the
    /// value does not fit in a `u64`. Decoding a random code yields a number,
    /// but not one that means anything.
    pub fn decode(&self, code: &str) -> Option<u64> {
        code.bytes().try_fold(0u64, |acc, b| {
            let digit = symbol_value(b)?;
            acc.checked_mul(RADIX)?.checked_add(digit)
        })
    }

    /// Shared charset/length predicate for every code in the system.
    ///
    /// Accepts codes of [`MIN_CODE_LENGTH`]..=[`MAX_CODE_LENGTH`] symbols drawn
    /// from [`ALPHABET`]. Output of both strategies always passes.
    pub fn is_valid(code: &str) -> bool {
        (MIN_CODE_LENGTH..=MAX_CODE_LENGTH).contains(&code.len())
            && code.bytes().all(|b| b.is_ascii_alphanumeric())
    }

    /// Birthday-bound estimate of the chance that a new random code collides
    /// with one of `entries` existing codes at this generator's length.
    pub fn collision_probability(&self, entries: u64) -> f64 {
        collision_probability(self.length, entries)
    }
}

impl Default for CodeGenerator {
    fn default() -> Self {
        Self::new(7)
    }
}

/// Approximates the collision probability `k² / (2·62^L)`, capped at 1.0.
pub fn collision_probability(length: usize, entries: u64) -> f64 {
    if entries == 0 {
        return 0.0;
    }

    let combinations = (RADIX as f64).powi(length as i32);
    let k = entries as f64;

    (k * k / (2.0 * combinations)).min(1.0)
}

fn symbol_value(b: u8) -> Option<u64> {
    match b {
        b'0'..=b'9' => Some((b - b'0') as u64),
        b'A'..=b'Z' => Some((b - b'A') as u64 + 10),
        b'a'..=b'z' => Some((b - b'a') as u64 + 36),
        _ => None,
    }
}
