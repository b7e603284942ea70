//! sfe-codec: the Shannon-Fano-Elias code protocol.
//!
//! `code` computes code words, `wire` serializes protocol messages and
//! `session` is the server-side coordinator state machine.

pub mod code;
pub mod session;
pub mod wire;

pub use code::{code_length, encode_symbol, extract_bits, midpoint, MAX_CODE_BITS};
pub use session::{Accumulator, Phase, Session};
