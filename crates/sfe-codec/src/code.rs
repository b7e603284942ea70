//! Shannon-Fano-Elias code word computation.
//!
//! A symbol with probability `p` whose predecessors in transmission
//! order sum to `acc` is coded by the first `n = ceil(-log2 p) + 1`
//! bits of the binary expansion of the interval midpoint
//! `F = acc + p / 2`.
//!
//! ## Layout
//! The `n` bits land in positions `n..=1` of the returned word, most
//! significant first. Position `0` is a padding zero. Both ends print
//! from that layout, so it must not change.

use num_traits::ToPrimitive;
use sfe_core::{CodeError, CodeReply};

/// Longest code that still leaves room for the padding bit in a u64.
pub const MAX_CODE_BITS: u32 = 63;

/// `ceil(-log2(p)) + 1`, always at least 1 for `p` in (0, 1].
pub fn code_length(probability: f64) -> Result<u32, CodeError> {
    if !(probability > 0.0 && probability <= 1.0) {
        return Err(CodeError::InvalidProbability(probability));
    }
    let raw = (-probability.log2()).ceil() + 1.0;
    let length = raw
        .to_u64()
        .ok_or(CodeError::InvalidProbability(probability))?;
    if length > MAX_CODE_BITS as u64 {
        return Err(CodeError::CodeTooLong {
            length,
            max: MAX_CODE_BITS,
        });
    }
    Ok(length as u32)
}

/// Midpoint of the symbol's cumulative interval.
pub fn midpoint(accumulator: f64, probability: f64) -> f64 {
    accumulator + probability / 2.0
}

/// Extracts the `n` most significant fractional bits of `midpoint`.
pub fn extract_bits(midpoint: f64, n: u32) -> Result<CodeReply, CodeError> {
    if !(0.0..=1.0).contains(&midpoint) {
        return Err(CodeError::MidpointOutOfRange(midpoint));
    }
    if n > MAX_CODE_BITS {
        return Err(CodeError::CodeTooLong {
            length: n as u64,
            max: MAX_CODE_BITS,
        });
    }

    let mut bits = 0u64;
    let mut remaining = midpoint;
    for i in 1..=n {
        // 2^-i is exact in binary floating point for every i <= 63.
        let p = 0.5f64.powi(i as i32);
        let bit = remaining >= p;
        if bit {
            remaining -= p;
        }
        bits = (bits << 1) | bit as u64;
    }
    // padding
    bits <<= 1;

    Ok(CodeReply::new(bits, n as u64))
}

/// Code word for one symbol given the prefix sum of its predecessors.
pub fn encode_symbol(accumulator: f64, probability: f64) -> Result<CodeReply, CodeError> {
    let n = code_length(probability)?;
    extract_bits(midpoint(accumulator, probability), n)
}
