use std::fmt;

/// One distinct byte of the input and its probability.
///
/// `index` is the record's position in the ordered symbol list. The
/// coordinator may use it to detect out-of-sequence delivery; no code
/// computation reads it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SymbolRecord {
    pub index: i32,
    pub glyph: u8,
    pub probability: f64,
}

impl SymbolRecord {
    pub fn new(index: i32, glyph: u8, probability: f64) -> Self {
        Self { index, glyph, probability }
    }

    /// The glyph as a `char`, reading bytes above 0x7F as Latin-1.
    ///
    /// For diagnostics only; the code table writes the raw byte.
    pub fn glyph_char(&self) -> char {
        char::from(self.glyph)
    }
}

/// A prefix-free code word.
///
/// Bits `bit_count` down to `1` of `code_bits` are the code, most
/// significant first. Bit `0` is a padding zero and never printed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CodeReply {
    pub code_bits: u64,
    pub bit_count: u64,
}

impl CodeReply {
    pub fn new(code_bits: u64, bit_count: u64) -> Self {
        Self { code_bits, bit_count }
    }

    /// Code bits, most significant first.
    pub fn bits(&self) -> impl Iterator<Item = u8> + '_ {
        (1..=self.bit_count).rev().map(move |pos| {
            let shifted = u32::try_from(pos).ok().and_then(|p| self.code_bits.checked_shr(p));
            match shifted {
                Some(shifted) => (shifted & 1) as u8,
                None => 0,
            }
        })
    }

    /// Renders exactly `bit_count` binary digits.
    pub fn render(&self) -> String {
        self.bits().map(|b| if b == 1 { '1' } else { '0' }).collect()
    }
}

impl fmt::Display for CodeReply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}
