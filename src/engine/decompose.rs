//! Full decomposition with canonical ordering of combining marks.

use crate::{
    data::{CombiningClassTable, DecompositionTable},
    scanner::{Scanner, Segment},
    unicode::decompose_syllable,
};
use smallvec::SmallVec;

/// Marks collected since the last starter, tagged with the class they sort by.
type MarkRun = SmallVec<[(u8, char); 16]>;

/// Decomposition engine over borrowed tables.
///
/// Output is fully decomposed (canonical or compatibility) and every run of
/// non-starters is stably sorted by combining class.
#[derive(Debug, Clone, Copy)]
pub struct Decomposer<'t> {
    canonical: &'t DecompositionTable,
    compatibility: Option<&'t DecompositionTable>,
    classes: &'t CombiningClassTable,
}

impl<'t> Decomposer<'t> {
    /// `compatibility` is consulted before `canonical` when present.
    pub fn new(
        canonical: &'t DecompositionTable,
        compatibility: Option<&'t DecompositionTable>,
        classes: &'t CombiningClassTable,
    ) -> Self {
        Self {
            canonical,
            compatibility,
            classes,
        }
    }

    #[inline(always)]
    fn lookup(&self, c: char) -> Option<&'t str> {
        self.compatibility
            .and_then(|table| table.get(c))
            .or_else(|| self.canonical.get(c))
    }

    pub fn decompose(&self, text: &str) -> String {
        let mut out = String::with_capacity(text.len() + text.len() / 2);
        self.decompose_into(text, &mut out);
        out
    }

    pub fn decompose_into(&self, text: &str, out: &mut String) {
        let mut marks = MarkRun::new();

        for segment in Scanner::new(text) {
            match segment {
                Segment::Ascii(run) => {
                    flush(&mut marks, out);
                    out.push_str(run);
                }
                Segment::Char(c) => self.push(c, &mut marks, out),
            }
        }

        flush(&mut marks, out);
    }

    fn push(&self, c: char, marks: &mut MarkRun, out: &mut String) {
        let class = self.classes.get(c);
        if class != 0 {
            // A mark's whole expansion sorts under the mark's own class.
            match self.lookup(c) {
                Some(expansion) => marks.extend(expansion.chars().map(|m| (class, m))),
                None => marks.push((class, c)),
            }
            return;
        }

        if let Some(jamo) = decompose_syllable(c) {
            flush(marks, out);
            jamo.write_to(out);
            return;
        }

        match self.lookup(c) {
            // Expansions are already closed: classify without a second lookup.
            // A starter that expands to marks only (U+0F73) joins the open run.
            Some(expansion) => {
                for part in expansion.chars() {
                    match self.classes.get(part) {
                        0 => {
                            flush(marks, out);
                            out.push(part);
                        }
                        class => marks.push((class, part)),
                    }
                }
            }
            None => {
                flush(marks, out);
                out.push(c);
            }
        }
    }
}

/// Emit pending marks in ascending class order, arrival order within a class.
#[inline]
fn flush(marks: &mut MarkRun, out: &mut String) {
    if marks.is_empty() {
        return;
    }
    marks.sort_by_key(|&(class, _)| class);
    out.extend(marks.drain(..).map(|(_, c)| c));
}
