//! Transmission order of the symbol list.
//!
//! The order produced here is the protocol's implicit shared state: the
//! coordinator derives each symbol's cumulative interval from the records
//! that precede it on the wire, so the comparator below and the send
//! order of the client must agree exactly.

use std::cmp::Ordering;

use crate::symbol::SymbolRecord;

/// Tolerance under which two probabilities count as tied.
pub const PROBABILITY_EPSILON: f64 = f64::EPSILON;

/// Descending probability; near-ties broken by ascending glyph.
pub fn compare(a: &SymbolRecord, b: &SymbolRecord) -> Ordering {
    let diff = b.probability - a.probability;
    if diff.abs() < PROBABILITY_EPSILON {
        a.glyph.cmp(&b.glyph)
    } else if diff > 0.0 {
        Ordering::Greater
    } else {
        Ordering::Less
    }
}

/// Records sorted into transmission order, indices renumbered to match.
#[derive(Debug, Clone, Default)]
pub struct OrderedSymbols {
    records: Vec<SymbolRecord>,
}

pub fn order(mut records: Vec<SymbolRecord>) -> OrderedSymbols {
    records.sort_by(compare);
    for (position, record) in records.iter_mut().enumerate() {
        record.index = position as i32;
    }
    OrderedSymbols { records }
}

/// Checks the ordering invariant on every adjacent pair.
pub fn is_ordered(records: &[SymbolRecord]) -> bool {
    records.windows(2).all(|pair| {
        let (a, b) = (&pair[0], &pair[1]);
        let tied = (a.probability - b.probability).abs() < PROBABILITY_EPSILON;
        if tied {
            a.glyph < b.glyph
        } else {
            a.probability > b.probability
        }
    })
}

impl OrderedSymbols {
    pub fn records(&self) -> &[SymbolRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Sum of all probabilities; 1 within floating-point tolerance for
    /// a list built from a frequency table.
    pub fn total_mass(&self) -> f64 {
        self.records.iter().map(|r| r.probability).sum()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, SymbolRecord> {
        self.records.iter()
    }
}

impl<'a> IntoIterator for &'a OrderedSymbols {
    type Item = &'a SymbolRecord;
    type IntoIter = std::slice::Iter<'a, SymbolRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}
