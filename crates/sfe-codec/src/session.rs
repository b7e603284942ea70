//! Coordinator state machine for one client session.
//!
//! `AwaitingCount -> ProcessingSymbol(0) -> ... -> ProcessingSymbol(m-1) -> Done`
//!
//! The session owns the cumulative accumulator. Coding a record takes
//! `&mut self`, so whoever codes symbol `k` holds exclusive access and
//! the prefix sum it reads is exactly the sum of records `0..k`. The
//! server either drives one session in a loop or relays it between
//! per-symbol tasks; both paths go through [`Session::code_next`].

use sfe_core::{CodeReply, ProtocolError, Result, SymbolRecord};

use crate::code;
use crate::wire;

/// Tolerance for the end-of-session probability mass check.
const MASS_TOLERANCE: f64 = 1e-9;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    AwaitingCount,
    ProcessingSymbol(usize),
    Done,
}

/// Running sum of the probabilities coded so far.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Accumulator {
    sum: f64,
}

impl Accumulator {
    pub fn new() -> Self {
        Self { sum: 0.0 }
    }

    pub fn value(&self) -> f64 {
        self.sum
    }

    pub fn advance(&mut self, probability: f64) {
        self.sum += probability;
    }
}

#[derive(Debug)]
pub struct Session {
    phase: Phase,
    declared: usize,
    accumulator: Accumulator,
    enforce_sequence: bool,
}

impl Session {
    pub fn new(enforce_sequence: bool) -> Self {
        Self {
            phase: Phase::AwaitingCount,
            declared: 0,
            accumulator: Accumulator::new(),
            enforce_sequence,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn declared(&self) -> usize {
        self.declared
    }

    pub fn accumulator(&self) -> &Accumulator {
        &self.accumulator
    }

    pub fn is_done(&self) -> bool {
        self.phase == Phase::Done
    }

    /// Records the client's symbol count. A count of zero ends the session.
    pub fn declare(&mut self, count: i32) -> Result<usize> {
        if self.phase != Phase::AwaitingCount {
            return Err(ProtocolError::CountAlreadyDeclared {
                declared: self.declared,
            }
            .into());
        }
        let declared = wire::validate_count(count)?;
        self.declared = declared;
        self.phase = if declared == 0 {
            Phase::Done
        } else {
            Phase::ProcessingSymbol(0)
        };
        tracing::debug!(declared, "symbol count declared");
        Ok(declared)
    }

    /// Codes the record at the current position and advances.
    pub fn code_next(&mut self, record: &SymbolRecord) -> Result<CodeReply> {
        let position = match self.phase {
            Phase::ProcessingSymbol(k) => k,
            Phase::AwaitingCount => return Err(ProtocolError::CountNotDeclared.into()),
            Phase::Done => {
                return Err(ProtocolError::UnexpectedRecord {
                    declared: self.declared,
                }
                .into())
            }
        };

        if !(record.probability > 0.0 && record.probability <= 1.0) {
            return Err(ProtocolError::InvalidProbability {
                glyph: record.glyph,
                probability: record.probability,
            }
            .into());
        }

        if usize::try_from(record.index).ok() != Some(position) {
            if self.enforce_sequence {
                return Err(ProtocolError::OutOfSequence {
                    expected: position,
                    actual: record.index,
                }
                .into());
            }
            tracing::warn!(
                expected = position,
                actual = record.index,
                "record index does not match its position"
            );
        }

        let cumulative = self.accumulator.value();
        let reply = code::encode_symbol(cumulative, record.probability)?;
        self.accumulator.advance(record.probability);

        tracing::debug!(
            position,
            glyph = record.glyph,
            probability = record.probability,
            cumulative,
            code = %reply,
            "symbol coded"
        );

        self.phase = if position + 1 == self.declared {
            self.check_mass();
            Phase::Done
        } else {
            Phase::ProcessingSymbol(position + 1)
        };
        Ok(reply)
    }

    fn check_mass(&self) {
        let mass = self.accumulator.value();
        if (mass - 1.0).abs() > MASS_TOLERANCE {
            tracing::warn!(mass, "probabilities of the session do not sum to 1");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sfe_core::SfeError;

    #[test]
    fn test_phase_transitions() {
        let mut session = Session::new(true);
        assert_eq!(session.phase(), Phase::AwaitingCount);

        session.declare(2).unwrap();
        assert_eq!(session.phase(), Phase::ProcessingSymbol(0));

        let a = session.code_next(&SymbolRecord::new(0, b'a', 0.75)).unwrap();
        assert_eq!(a.render(), "01");
        assert_eq!(session.phase(), Phase::ProcessingSymbol(1));
        assert_eq!(session.accumulator().value(), 0.75);

        let b = session.code_next(&SymbolRecord::new(1, b'b', 0.25)).unwrap();
        assert_eq!(b.render(), "111");
        assert!(session.is_done());
    }

    #[test]
    fn test_zero_count_is_done() {
        let mut session = Session::new(true);
        assert_eq!(session.declare(0).unwrap(), 0);
        assert!(session.is_done());
    }

    #[test]
    fn test_record_before_count() {
        let mut session = Session::new(true);
        let err = session.code_next(&SymbolRecord::new(0, b'a', 1.0)).unwrap_err();
        assert!(matches!(err, SfeError::Protocol(ProtocolError::CountNotDeclared)));
    }

    #[test]
    fn test_record_after_done() {
        let mut session = Session::new(true);
        session.declare(1).unwrap();
        session.code_next(&SymbolRecord::new(0, b'a', 1.0)).unwrap();
        let err = session.code_next(&SymbolRecord::new(1, b'b', 1.0)).unwrap_err();
        assert!(matches!(
            err,
            SfeError::Protocol(ProtocolError::UnexpectedRecord { declared: 1 })
        ));
    }

    #[test]
    fn test_out_of_sequence_rejected_when_enforced() {
        let mut session = Session::new(true);
        session.declare(2).unwrap();
        let err = session.code_next(&SymbolRecord::new(1, b'b', 0.25)).unwrap_err();
        assert!(matches!(
            err,
            SfeError::Protocol(ProtocolError::OutOfSequence { expected: 0, actual: 1 })
        ));
    }

    #[test]
    fn test_out_of_sequence_tolerated_when_relaxed() {
        let mut session = Session::new(false);
        session.declare(1).unwrap();
        let reply = session.code_next(&SymbolRecord::new(42, b'z', 1.0)).unwrap();
        assert_eq!(reply.render(), "1");
    }

    #[test]
    fn test_invalid_probability() {
        let mut session = Session::new(true);
        session.declare(1).unwrap();
        let err = session.code_next(&SymbolRecord::new(0, b'a', 0.0)).unwrap_err();
        assert!(matches!(
            err,
            SfeError::Protocol(ProtocolError::InvalidProbability { glyph: b'a', .. })
        ));
    }

    #[test]
    fn test_second_count_rejected() {
        let mut session = Session::new(true);
        session.declare(2).unwrap();
        let err = session.declare(5).unwrap_err();
        assert!(matches!(
            err,
            SfeError::Protocol(ProtocolError::CountAlreadyDeclared { declared: 2 })
        ));
        assert_eq!(session.phase(), Phase::ProcessingSymbol(0));
    }

    #[test]
    fn test_negative_count() {
        let mut session = Session::new(true);
        let err = session.declare(-3).unwrap_err();
        assert!(matches!(err, SfeError::Protocol(ProtocolError::NegativeCount(-3))));
        assert_eq!(session.phase(), Phase::AwaitingCount);
    }
}
