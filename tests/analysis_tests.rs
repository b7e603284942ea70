//! # Client Analysis Tests
//!
//! Validates the frequency analyzer and the transmission order produced
//! by the symbol orderer.

use sfe_core::orderer::{compare, is_ordered};
use sfe_core::{analyze, order, SymbolRecord, PROBABILITY_EPSILON};
use std::cmp::Ordering;
use std::time::Instant;

#[test]
fn test_aaab_frequencies_and_order() {
    let t = Instant::now();

    let table = analyze(b"aaab");
    assert_eq!(table.total_len(), 4);
    assert_eq!(table.distinct(), 2);
    assert_eq!(table.count(b'a'), 3);

    let ordered = order(table.records());
    let glyphs: Vec<u8> = ordered.iter().map(|r| r.glyph).collect();
    assert_eq!(glyphs, b"ab");
    assert_eq!(ordered.records()[0].probability, 0.75);
    assert_eq!(ordered.records()[1].probability, 0.25);

    println!("test_aaab_frequencies_and_order: Testing Overhead = {:?}", t.elapsed());
}

#[test]
fn test_records_follow_byte_order_before_sorting() {
    let table = analyze(b"zzzyx");
    let glyphs: Vec<u8> = table.records().iter().map(|r| r.glyph).collect();
    assert_eq!(glyphs, b"xyz");
}

#[test]
fn test_empty_input_has_no_symbols() {
    let table = analyze(b"");
    assert_eq!(table.distinct(), 0);
    assert!(table.records().is_empty());
    assert!(order(table.records()).is_empty());
}

#[test]
fn test_single_symbol_has_unit_probability() {
    let ordered = order(analyze(b"qqqqqq").records());
    assert_eq!(ordered.len(), 1);
    assert_eq!(ordered.records()[0].probability, 1.0);
}

/// Equal probabilities fall back to ascending glyph order.
#[test]
fn test_ties_break_by_glyph() {
    let ordered = order(analyze(b"dcbaabcd").records());
    let glyphs: Vec<u8> = ordered.iter().map(|r| r.glyph).collect();
    assert_eq!(glyphs, b"abcd");
    assert!(is_ordered(ordered.records()));
}

#[test]
fn test_indices_match_transmission_order() {
    let ordered = order(analyze(b"the quick brown fox jumps over the lazy dog").records());
    for (position, record) in ordered.iter().enumerate() {
        assert_eq!(record.index as usize, position);
    }
}

#[test]
fn test_ordering_invariant_on_mixed_text() {
    let text = b"Shannon-Fano-Elias codes are prefix-free; mississippi!!";
    let ordered = order(analyze(text).records());
    assert!(is_ordered(ordered.records()));
    assert!((ordered.total_mass() - 1.0).abs() < 1e-12);

    for pair in ordered.records().windows(2) {
        let (a, b) = (&pair[0], &pair[1]);
        let tied = (a.probability - b.probability).abs() < PROBABILITY_EPSILON;
        assert!(a.probability > b.probability || (tied && a.glyph < b.glyph));
    }
}

#[test]
fn test_compare_within_tolerance() {
    let a = SymbolRecord::new(0, b'b', 0.25);
    let b = SymbolRecord::new(1, b'a', 0.25 + PROBABILITY_EPSILON / 4.0);
    assert_eq!(compare(&a, &b), Ordering::Greater, "near-tie must order by glyph");

    let high = SymbolRecord::new(0, b'z', 0.5);
    let low = SymbolRecord::new(1, b'a', 0.25);
    assert_eq!(compare(&high, &low), Ordering::Less);
    assert_eq!(compare(&low, &high), Ordering::Greater);
}

#[test]
fn test_is_ordered_detects_violation() {
    let records = vec![
        SymbolRecord::new(0, b'a', 0.25),
        SymbolRecord::new(1, b'b', 0.75),
    ];
    assert!(!is_ordered(&records));
}
