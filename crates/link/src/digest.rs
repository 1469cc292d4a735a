//! Nilsimsa locality-sensitive digest.
//!
//! A 256-bit fingerprint built from counts of hashed character trigrams in a
//! sliding 5-byte window. Similar inputs set mostly the same bits, so
//! similarity is the number of agreeing bits rather than string distance.

use std::fmt;
use std::sync::OnceLock;

use serde::{Deserialize, Serialize};

/// Fixed text whose digest anchors the fuzzy bucket space.
pub const CALIBRATION_TEXT: &str = "The quick brown fox jumps over the lazy dog";

/// Highest raw comparison score (identical digests).
pub const MAX_SCORE: i32 = 128;

const TRAN: [u8; 256] = [
    0x02, 0xD6, 0x9E, 0x6F, 0xF9, 0x1D, 0x04, 0xAB, 0xD0, 0x22, 0x16, 0x1F, 0xD8, 0x73, 0xA1, 0xAC,
    0x3B, 0x70, 0x62, 0x96, 0x1E, 0x6E, 0x8F, 0x39, 0x9D, 0x05, 0x14, 0x4A, 0xA6, 0xBE, 0xAE, 0x0E,
    0xCF, 0xB9, 0x9C, 0x9A, 0xC7, 0x68, 0x13, 0xE1, 0x2D, 0xA4, 0xEB, 0x51, 0x8D, 0x64, 0x6B, 0x50,
    0x23, 0x80, 0x03, 0x41, 0xEC, 0xBB, 0x71, 0xCC, 0x7A, 0x86, 0x7F, 0x98, 0xF2, 0x36, 0x5E, 0xEE,
    0x8E, 0xCE, 0x4F, 0xB8, 0x32, 0xB6, 0x5F, 0x59, 0xDC, 0x1B, 0x31, 0x4C, 0x7B, 0xF0, 0x63, 0x01,
    0x6C, 0xBA, 0x07, 0xE8, 0x12, 0x77, 0x49, 0x3C, 0xDA, 0x46, 0xFE, 0x2F, 0x79, 0x1C, 0x9B, 0x30,
    0xE3, 0x00, 0x06, 0x7E, 0x2E, 0x0F, 0x38, 0x33, 0x21, 0xAD, 0xA5, 0x54, 0xCA, 0xA7, 0x29, 0xFC,
    0x5A, 0x47, 0x69, 0x7D, 0xC5, 0x95, 0xB5, 0xF4, 0x0B, 0x90, 0xA3, 0x81, 0x6D, 0x25, 0x55, 0x35,
    0xF5, 0x75, 0x74, 0x0A, 0x26, 0xBF, 0x19, 0x5C, 0x1A, 0xC6, 0xFF, 0x99, 0x5D, 0x84, 0xAA, 0x66,
    0x3E, 0xAF, 0x78, 0xB3, 0x20, 0x43, 0xC1, 0xED, 0x24, 0xEA, 0xE6, 0x3F, 0x18, 0xF3, 0xA0, 0x42,
    0x57, 0x08, 0x53, 0x60, 0xC3, 0xC0, 0x83, 0x40, 0x82, 0xD7, 0x09, 0xBD, 0x44, 0x2A, 0x67, 0xA8,
    0x93, 0xE0, 0xC2, 0x56, 0x9F, 0xD9, 0xDD, 0x85, 0x15, 0xB4, 0x8A, 0x27, 0x28, 0x92, 0x76, 0xDE,
    0xEF, 0xF8, 0xB2, 0xB7, 0xC9, 0x3D, 0x45, 0x94, 0x4B, 0x11, 0x0D, 0x65, 0xD5, 0x34, 0x8B, 0x91,
    0x0C, 0xFA, 0x87, 0xE9, 0x7C, 0x5B, 0xB1, 0x4D, 0xE5, 0xD4, 0xCB, 0x10, 0xA2, 0x17, 0x89, 0xBC,
    0xDB, 0xB0, 0xE2, 0x97, 0x88, 0x52, 0xF7, 0x48, 0xD3, 0x61, 0x2C, 0x3A, 0x2B, 0xD1, 0x8C, 0xFB,
    0xF1, 0xCD, 0xE4, 0x6A, 0xE7, 0xA9, 0xFD, 0xC4, 0x37, 0xC8, 0xD2, 0xF6, 0xDF, 0x58, 0x72, 0x4E,
];

fn tran3(a: u8, b: u8, c: u8, n: u8) -> usize {
    let t = |i: u8| TRAN[usize::from(i)];
    let mixed = (t(a.wrapping_add(n)) ^ t(b).wrapping_mul(n.wrapping_mul(2).wrapping_add(1)))
        .wrapping_add(t(c ^ t(n)));
    usize::from(mixed)
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Digest([u8; 32]);

impl Digest {
    pub fn of(text: &str) -> Self {
        let bytes = text.as_bytes();
        let mut acc = [0u32; 256];
        // window[0] is the byte just before the current one
        let mut window = [0u8; 4];

        for (seen, &c) in bytes.iter().enumerate() {
            let [w0, w1, w2, w3] = window;
            if seen > 1 {
                acc[tran3(c, w0, w1, 0)] += 1;
            }
            if seen > 2 {
                acc[tran3(c, w0, w2, 1)] += 1;
                acc[tran3(c, w1, w2, 2)] += 1;
            }
            if seen > 3 {
                acc[tran3(c, w0, w3, 3)] += 1;
                acc[tran3(c, w1, w3, 4)] += 1;
                acc[tran3(c, w2, w3, 5)] += 1;
                acc[tran3(w3, w0, c, 6)] += 1;
                acc[tran3(w3, w2, c, 7)] += 1;
            }
            window = [c, w0, w1, w2];
        }

        let trigrams = match bytes.len() {
            0..=2 => 0,
            3 => 1,
            4 => 4,
            n => 8 * n - 28,
        };
        let threshold = trigrams as f64 / 256.0;

        let mut out = [0u8; 32];
        for (i, &count) in acc.iter().enumerate() {
            if f64::from(count) > threshold {
                out[31 - (i >> 3)] |= 1 << (i & 7);
            }
        }
        Self(out)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Raw similarity: `128 - differing bits`, in `[-128, 128]`.
    pub fn compare(&self, other: &Digest) -> i32 {
        let differing: u32 = self
            .0
            .iter()
            .zip(other.0.iter())
            .map(|(a, b)| (a ^ b).count_ones())
            .sum();
        MAX_SCORE - differing as i32
    }

    /// Raw similarity rescaled to `[0, 1]`.
    pub fn similarity(&self, other: &Digest) -> f64 {
        f64::from(self.compare(other) + MAX_SCORE) / f64::from(2 * MAX_SCORE)
    }

    /// Bucket key: similarity against the calibration digest.
    pub fn bucket(&self) -> i32 {
        self.compare(reference())
    }

    pub fn to_hex(&self) -> String {
        self.0.iter().map(|b| format!("{b:02x}")).collect()
    }
}

impl fmt::Debug for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Digest({})", self.to_hex())
    }
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// Digest of [`CALIBRATION_TEXT`], computed once per process.
pub fn reference() -> &'static Digest {
    static REFERENCE: OnceLock<Digest> = OnceLock::new();
    REFERENCE.get_or_init(|| Digest::of(CALIBRATION_TEXT))
}
