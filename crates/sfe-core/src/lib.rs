//! sfe-core: domain types and client-side analysis for the SFE-X coder.
//!
//! - `analyzer`: byte frequency table over the input text
//! - `orderer`: transmission order of symbols (descending probability)
//! - `symbol`: symbol records and code replies
//! - `relay`: ordered hand-off chain for per-symbol tasks
//! - `config`, `error`: ambient configuration and error taxonomy

pub mod analyzer;
pub mod config;
pub mod error;
pub mod orderer;
pub mod relay;
pub mod symbol;

pub use analyzer::{analyze, FrequencyTable};
pub use config::{ClientConfig, CodingMode, ServerConfig};
pub use error::{CodeError, ProtocolError, Result, SfeError};
pub use orderer::{order, OrderedSymbols, PROBABILITY_EPSILON};
pub use symbol::{CodeReply, SymbolRecord};

/// Size of the byte alphabet; upper bound on a session's symbol count.
pub const ALPHABET_SIZE: usize = 256;
