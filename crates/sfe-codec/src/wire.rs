//! Wire schema for the coding protocol.
//!
//! Every field is little-endian and messages carry no padding.
//!
//! ```text
//! count   (client -> server, once)        i32                      4 bytes
//! record  (client -> server, count times) i32 index | u8 glyph |
//!                                         f64 probability         13 bytes
//! reply   (server -> client, count times) u64 code_bits |
//!                                         u64 bit_count           16 bytes
//! ```
//!
//! There is no framing beyond these fixed sizes; the stream position
//! alone tells the reader which message comes next.

use bytes::{Buf, BufMut};
use sfe_core::{CodeReply, ProtocolError, SymbolRecord, ALPHABET_SIZE};
use static_assertions::const_assert_eq;

use crate::code::MAX_CODE_BITS;

pub const COUNT_LEN: usize = 4;
pub const RECORD_LEN: usize = 13;
pub const REPLY_LEN: usize = 16;

const_assert_eq!(RECORD_LEN, 4 + 1 + 8);
const_assert_eq!(REPLY_LEN, 8 + 8);

pub fn encode_count(count: i32, dst: &mut impl BufMut) {
    dst.put_i32_le(count);
}

pub fn decode_count(mut src: &[u8]) -> Result<i32, ProtocolError> {
    ensure_len(src, COUNT_LEN)?;
    Ok(src.get_i32_le())
}

/// A declared count is valid when it is non-negative and fits the byte alphabet.
pub fn validate_count(count: i32) -> Result<usize, ProtocolError> {
    let declared = usize::try_from(count).map_err(|_| ProtocolError::NegativeCount(count))?;
    if declared > ALPHABET_SIZE {
        return Err(ProtocolError::CountTooLarge {
            count,
            max: ALPHABET_SIZE,
        });
    }
    Ok(declared)
}

pub fn encode_record(record: &SymbolRecord, dst: &mut impl BufMut) {
    dst.put_i32_le(record.index);
    dst.put_u8(record.glyph);
    dst.put_f64_le(record.probability);
}

pub fn decode_record(mut src: &[u8]) -> Result<SymbolRecord, ProtocolError> {
    ensure_len(src, RECORD_LEN)?;
    let index = src.get_i32_le();
    let glyph = src.get_u8();
    let probability = src.get_f64_le();
    Ok(SymbolRecord::new(index, glyph, probability))
}

pub fn encode_reply(reply: &CodeReply, dst: &mut impl BufMut) {
    dst.put_u64_le(reply.code_bits);
    dst.put_u64_le(reply.bit_count);
}

/// Decodes a reply and rejects anything the encoder could not have produced:
/// a length outside `1..=MAX_CODE_BITS`, a set pad bit, or bits above the code.
pub fn decode_reply(mut src: &[u8]) -> Result<CodeReply, ProtocolError> {
    ensure_len(src, REPLY_LEN)?;
    let code_bits = src.get_u64_le();
    let bit_count = src.get_u64_le();

    let invalid = ProtocolError::InvalidReply {
        code_bits,
        bit_count,
        max: MAX_CODE_BITS,
    };
    if bit_count == 0 || bit_count > u64::from(MAX_CODE_BITS) {
        return Err(invalid);
    }
    // a 63-bit code fills the word, leaving nothing above it
    let stray_high = code_bits
        .checked_shr(bit_count as u32 + 1)
        .is_some_and(|high| high != 0);
    if code_bits & 1 != 0 || stray_high {
        return Err(invalid);
    }
    Ok(CodeReply::new(code_bits, bit_count))
}

fn ensure_len(src: &[u8], required: usize) -> Result<(), ProtocolError> {
    if src.len() < required {
        return Err(ProtocolError::Truncated {
            required,
            actual: src.len(),
        });
    }
    Ok(())
}
