//! Canonical composition of decomposed, canonically ordered text.

use crate::{
    data::{CombiningClassTable, CompositionTable},
    scanner::{Scanner, Segment},
    unicode,
};
use smallvec::SmallVec;

/// `blocked` value while the accumulator is a leading non-starter: nothing
/// may compose onto it.
const NON_STARTER_HEAD: u16 = 256;

/// State of the current combining sequence.
#[derive(Debug, Default)]
struct Accumulator {
    /// Current (possibly already composed) starter.
    starter: Option<char>,
    /// 0 while unblocked, else the highest class left uncomposed.
    blocked: u16,
    /// Marks that did not compose, emitted after the starter.
    tail: SmallVec<[char; 8]>,
}

impl Accumulator {
    #[inline]
    fn flush(&mut self, out: &mut String) {
        if let Some(starter) = self.starter.take() {
            out.push(starter);
        }
        out.extend(self.tail.drain(..));
        self.blocked = 0;
    }

    #[inline]
    fn restart(&mut self, starter: char, blocked: u16) {
        self.starter = Some(starter);
        self.blocked = blocked;
    }
}

/// Composition engine over borrowed tables.
#[derive(Debug, Clone, Copy)]
pub struct Composer<'t> {
    compositions: &'t CompositionTable,
    classes: &'t CombiningClassTable,
}

impl<'t> Composer<'t> {
    pub fn new(compositions: &'t CompositionTable, classes: &'t CombiningClassTable) -> Self {
        Self {
            compositions,
            classes,
        }
    }

    pub fn compose(&self, text: &str) -> String {
        let mut out = String::with_capacity(text.len());
        self.compose_into(text, &mut out);
        out
    }

    pub fn compose_into(&self, text: &str, out: &mut String) {
        let mut acc = Accumulator::default();

        for segment in Scanner::new(text) {
            match segment {
                Segment::Ascii(run) => {
                    acc.flush(out);
                    // The last ASCII character may still take marks (e + U+0301).
                    let (head, last) = run.split_at(run.len() - 1);
                    out.push_str(head);
                    if let Some(c) = last.chars().next() {
                        acc.restart(c, 0);
                    }
                }
                Segment::Char(c) => self.push(c, &mut acc, out),
            }
        }

        acc.flush(out);
    }

    fn push(&self, x: char, acc: &mut Accumulator, out: &mut String) {
        let Some(starter) = acc.starter else {
            let blocked = match self.classes.get(x) {
                0 => 0,
                _ => NON_STARTER_HEAD,
            };
            acc.restart(x, blocked);
            return;
        };

        if acc.blocked == 0 {
            if let Some(syllable) = unicode::compose_pair(starter, x) {
                acc.starter = Some(syllable);
                return;
            }
        }

        let class = u16::from(self.classes.get(x));
        let composed = self
            .compositions
            .get(starter, x)
            .filter(|_| acc.blocked == 0 || acc.blocked < class);

        if let Some(composed) = composed {
            acc.starter = Some(composed);
        } else if class != 0 {
            // Marks arrive in ascending class order, so this only ever grows.
            acc.blocked = acc.blocked.max(class);
            acc.tail.push(x);
        } else {
            acc.flush(out);
            acc.restart(x, 0);
        }
    }
}
