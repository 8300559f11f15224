//! Codepoint stream scanner shared by both engines.
//!
//! Input has already been validated as UTF-8, so the scanner only looks at
//! lead bytes to step from one codepoint to the next.

use std::iter::FusedIterator;

/// Byte length of the UTF-8 sequence introduced by `lead`.
///
/// Continuation bytes never start a sequence in valid input; they are
/// reported as width 1 so a cursor always advances.
#[inline(always)]
pub const fn utf8_len(lead: u8) -> usize {
    match lead {
        0x00..=0x7F => 1,
        0xC0..=0xDF => 2,
        0xE0..=0xEF => 3,
        0xF0..=0xF7 => 4,
        _ => 1,
    }
}

/// A piece of text as seen by the engines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment<'a> {
    /// Maximal run of 7-bit characters. Never empty.
    Ascii(&'a str),
    /// A single non-ASCII codepoint.
    Char(char),
}

/// Left-to-right cursor over valid UTF-8.
#[derive(Debug, Clone)]
pub struct Scanner<'a> {
    text: &'a str,
    pos: usize,
}

impl<'a> Scanner<'a> {
    #[inline]
    pub fn new(text: &'a str) -> Self {
        Self { text, pos: 0 }
    }

    /// Byte offset of the next segment.
    #[inline]
    pub fn position(&self) -> usize {
        self.pos
    }
}

impl<'a> Iterator for Scanner<'a> {
    type Item = Segment<'a>;

    #[inline]
    fn next(&mut self) -> Option<Segment<'a>> {
        let bytes = self.text.as_bytes();
        let lead = *bytes.get(self.pos)?;
        let start = self.pos;

        if lead.is_ascii() {
            let run = bytes[start..]
                .iter()
                .position(|b| !b.is_ascii())
                .unwrap_or(bytes.len() - start);
            self.pos += run;
            return self.text.get(start..self.pos).map(Segment::Ascii);
        }

        self.pos += utf8_len(lead);
        self.text
            .get(start..self.pos)
            .and_then(|s| s.chars().next())
            .map(Segment::Char)
    }
}

impl FusedIterator for Scanner<'_> {}
