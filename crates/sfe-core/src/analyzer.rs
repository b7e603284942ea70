use crate::symbol::SymbolRecord;

/// Occurrence counts over the 256-value byte alphabet.
#[derive(Debug, Clone)]
pub struct FrequencyTable {
    counts: [u64; 256],
    total_len: usize,
}

/// Counts every byte of `text`.
pub fn analyze(text: &[u8]) -> FrequencyTable {
    let mut counts = [0u64; 256];
    for &byte in text {
        counts[byte as usize] += 1;
    }
    FrequencyTable {
        counts,
        total_len: text.len(),
    }
}

impl FrequencyTable {
    pub fn total_len(&self) -> usize {
        self.total_len
    }

    pub fn count(&self, glyph: u8) -> u64 {
        self.counts[glyph as usize]
    }

    /// Number of byte values occurring at least once.
    pub fn distinct(&self) -> usize {
        self.counts.iter().filter(|&&c| c > 0).count()
    }

    /// One record per occurring byte, in increasing byte order.
    ///
    /// Indices here are provisional; the orderer renumbers them to match
    /// transmission order. Empty input yields no records.
    pub fn records(&self) -> Vec<SymbolRecord> {
        if self.total_len == 0 {
            return Vec::new();
        }
        let total = self.total_len as f64;
        (0..=u8::MAX)
            .filter(|&glyph| self.counts[glyph as usize] > 0)
            .enumerate()
            .map(|(i, glyph)| {
                SymbolRecord::new(i as i32, glyph, self.counts[glyph as usize] as f64 / total)
            })
            .collect()
    }
}
