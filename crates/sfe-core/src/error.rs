//! Error taxonomy for the SFE-X coder.
//!
//! Nothing in the protocol is retried: every variant aborts the unit of
//! work it occurred in (the session on the server, the process on the
//! client). Each message names the operation that failed.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SfeError {
    /// Socket resolve/bind/listen/connect failure. Fatal to the process.
    #[error("transport setup failed during {op}: {source}")]
    TransportSetup {
        op: &'static str,
        #[source]
        source: std::io::Error,
    },

    /// Read/write failure mid-session. Fatal to the session.
    #[error("transport I/O failed during {op}: {source}")]
    TransportIo {
        op: &'static str,
        #[source]
        source: std::io::Error,
    },

    #[error("{op} timed out after {after_ms}ms")]
    Timeout { op: &'static str, after_ms: u64 },

    #[error("protocol violation: {0}")]
    Protocol(#[from] ProtocolError),

    #[error("code computation failed: {0}")]
    Code(#[from] CodeError),

    #[error("configuration error: {0}")]
    Config(String),

    /// A per-symbol stage lost its predecessor, so the ordered chain is broken.
    #[error("relay broken: {0}")]
    Relay(String),
}

impl SfeError {
    pub fn setup(op: &'static str, source: std::io::Error) -> Self {
        SfeError::TransportSetup { op, source }
    }

    pub fn io(op: &'static str, source: std::io::Error) -> Self {
        SfeError::TransportIo { op, source }
    }
}

/// Malformed or out-of-contract wire messages.
#[derive(Debug, Error, PartialEq)]
pub enum ProtocolError {
    #[error("declared symbol count {0} is negative")]
    NegativeCount(i32),

    #[error("declared symbol count {count} exceeds alphabet size {max}")]
    CountTooLarge { count: i32, max: usize },

    #[error("probability {probability} for glyph {glyph:#04x} is outside (0, 1]")]
    InvalidProbability { glyph: u8, probability: f64 },

    #[error("record index {actual} arrived at position {expected}")]
    OutOfSequence { expected: usize, actual: i32 },

    #[error("buffer too short: need {required} bytes, got {actual}")]
    Truncated { required: usize, actual: usize },

    #[error("symbol record received after all {declared} declared symbols")]
    UnexpectedRecord { declared: usize },

    #[error("symbol record received before the symbol count")]
    CountNotDeclared,

    #[error("symbol count declared twice (already {declared})")]
    CountAlreadyDeclared { declared: usize },

    /// A reply that cannot be a code word: length outside `1..=max` or
    /// bits set outside positions `bit_count..=1`.
    #[error("reply {code_bits:#x} of {bit_count} bits is not a code word of at most {max} bits")]
    InvalidReply { code_bits: u64, bit_count: u64, max: u32 },
}

/// Failures of the bit-extraction arithmetic.
#[derive(Debug, Error, PartialEq)]
pub enum CodeError {
    /// The code word plus its padding bit must fit in a u64.
    #[error("code length {length} exceeds maximum {max}")]
    CodeTooLong { length: u64, max: u32 },

    #[error("interval midpoint {0} is not in [0, 1]")]
    MidpointOutOfRange(f64),

    #[error("probability {0} has no finite code length")]
    InvalidProbability(f64),
}

pub type Result<T> = std::result::Result<T, SfeError>;
