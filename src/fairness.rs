//! Commit-reveal primitives shared by the commit-reveal generator and the
//! verification engine.
//!
//! A commitment is `SHA-256("<house_seed>:<seed>:<draw_count>")`. Values are read
//! from 4-byte big-endian windows of the digest (8 hex characters each) and
//! reduced into the requested range. The disclosure published with a round is
//! `"<house_seed>:<draw_count>:<hex digest>"`.

use crate::errors::VerificationError;
use sha2::{Digest, Sha256};
use std::{fmt, str::FromStr};

const DISCLOSURE_SEPARATOR: char = ':';

/// Bytes per value window (8 hex characters).
const WINDOW_BYTES: usize = 4;

/// SHA-256 commitment over house seed, seed and draw counter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Commitment([u8; 32]);

impl Commitment {
    pub fn compute(house_seed: &str, seed: &str, draw_count: u64) -> Self {
        let preimage = format!("{}:{}:{}", house_seed, seed, draw_count);
        let mut hasher = Sha256::new();
        hasher.update(preimage.as_bytes());
        Self(hasher.finalize().into())
    }

    /// Lower-case hex encoding (64 characters)
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Big-endian integer read from the `index`-th 4-byte window.
    ///
    /// Window 0 is `hex[0..8]`, window 1 is `hex[8..16]`, and so on.
    pub fn window(&self, index: usize) -> u32 {
        let start = (index % (32 / WINDOW_BYTES)) * WINDOW_BYTES;
        let mut buf = [0u8; WINDOW_BYTES];
        buf.copy_from_slice(&self.0[start..start + WINDOW_BYTES]);
        u32::from_be_bytes(buf)
    }

    /// Map the `index`-th window into `[min, max]`. Caller guarantees `min <= max`.
    pub fn value_in_range(&self, index: usize, min: i64, max: i64) -> i64 {
        reduce_into_range(u64::from(self.window(index)), min, max)
    }
}

/// `value % (max - min + 1) + min`, computed without overflow for any `min <= max`.
pub fn reduce_into_range(value: u64, min: i64, max: i64) -> i64 {
    let span = i128::from(max) - i128::from(min) + 1;
    (i128::from(value) % span + i128::from(min)) as i64
}

/// Commit material published with a commit-reveal round
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Disclosure {
    pub house_seed: String,
    pub draw_count: u64,
    pub commit_hash: String,
}

impl fmt::Display for Disclosure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{sep}{}{sep}{}",
            self.house_seed,
            self.draw_count,
            self.commit_hash,
            sep = DISCLOSURE_SEPARATOR
        )
    }
}

impl FromStr for Disclosure {
    type Err = VerificationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split(DISCLOSURE_SEPARATOR).collect();
        let [house_seed, draw_count, commit_hash] = parts.as_slice() else {
            return Err(VerificationError::MalformedDisclosure(format!(
                "expected 3 fields, found {}",
                parts.len()
            )));
        };

        let draw_count = draw_count
            .parse::<u64>()
            .map_err(|e| VerificationError::InvalidDrawCount(format!("'{}': {}", draw_count, e)))?;

        Ok(Self {
            house_seed: house_seed.to_string(),
            draw_count,
            commit_hash: commit_hash.to_string(),
        })
    }
}
