//! Lookup tables and the providers that deliver them.
//!
//! The engines never know where their tables come from. A [`DataProvider`]
//! hands over four immutable tables; [`TableSet`](crate::tables::TableSet)
//! loads each one at most once.

pub mod codec;
pub mod icu;
pub mod memory;

use std::{collections::HashMap, fmt, io, path::PathBuf};
use thiserror::Error;

pub use codec::{DirectoryProvider, write_tables};
pub use icu::IcuProvider;
pub use memory::MemoryProvider;

/// The four named table resources.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TableResource {
    CanonicalDecomposition,
    CompatibilityDecomposition,
    CombiningClass,
    CanonicalComposition,
}

impl TableResource {
    pub const ALL: [Self; 4] = [
        Self::CanonicalDecomposition,
        Self::CompatibilityDecomposition,
        Self::CombiningClass,
        Self::CanonicalComposition,
    ];

    pub const fn name(self) -> &'static str {
        match self {
            Self::CanonicalDecomposition => "canonicalDecomposition",
            Self::CompatibilityDecomposition => "compatibilityDecomposition",
            Self::CombiningClass => "combiningClass",
            Self::CanonicalComposition => "canonicalComposition",
        }
    }

    /// Tag byte used by the binary codec.
    pub(crate) const fn tag(self) -> u8 {
        match self {
            Self::CanonicalDecomposition => 1,
            Self::CompatibilityDecomposition => 2,
            Self::CombiningClass => 3,
            Self::CanonicalComposition => 4,
        }
    }
}

impl fmt::Display for TableResource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Failure to deliver a table.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("failed to read table `{resource}` from {}: {source}", path.display())]
    Io {
        resource: TableResource,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("table `{resource}` is corrupt: {reason}")]
    Corrupt {
        resource: TableResource,
        reason: String,
    },

    #[error("table `{0}` is not available from this provider")]
    Missing(TableResource),
}

impl DataError {
    pub(crate) fn corrupt(resource: TableResource, reason: impl Into<String>) -> Self {
        Self::Corrupt {
            resource,
            reason: reason.into(),
        }
    }
}

/// Source of the four normalization tables.
///
/// Implementations must be deterministic: two loads of the same resource
/// return equal tables.
pub trait DataProvider: Send + Sync {
    /// Human-readable name, used in log events.
    fn name(&self) -> &'static str;

    fn canonical_decomposition(&self) -> Result<DecompositionTable, DataError>;

    fn compatibility_decomposition(&self) -> Result<DecompositionTable, DataError>;

    fn combining_class(&self) -> Result<CombiningClassTable, DataError>;

    fn canonical_composition(&self) -> Result<CompositionTable, DataError>;
}

/// Codepoint → class in `1..=255`. Absent codepoints are starters (class 0).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CombiningClassTable {
    classes: HashMap<char, u8>,
}

impl CombiningClassTable {
    #[inline(always)]
    pub fn get(&self, c: char) -> u8 {
        if c.is_ascii() {
            return 0;
        }
        self.classes.get(&c).copied().unwrap_or(0)
    }

    /// Record a class. Class 0 is the implicit default and is not stored.
    pub fn insert(&mut self, c: char, class: u8) {
        if class == 0 {
            self.classes.remove(&c);
        } else {
            self.classes.insert(c, class);
        }
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (char, u8)> + '_ {
        self.classes.iter().map(|(&c, &class)| (c, class))
    }
}

impl FromIterator<(char, u8)> for CombiningClassTable {
    fn from_iter<I: IntoIterator<Item = (char, u8)>>(iter: I) -> Self {
        let mut table = Self::default();
        for (c, class) in iter {
            table.insert(c, class);
        }
        table
    }
}

/// Codepoint → its full, pre-closed decomposition.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DecompositionTable {
    mappings: HashMap<char, Box<str>>,
}

impl DecompositionTable {
    #[inline(always)]
    pub fn get(&self, c: char) -> Option<&str> {
        self.mappings.get(&c).map(AsRef::as_ref)
    }

    /// Record a mapping. Identity and empty mappings are ignored.
    pub fn insert(&mut self, c: char, decomposition: &str) {
        let mut buf = [0u8; 4];
        if decomposition.is_empty() || decomposition == c.encode_utf8(&mut buf) {
            return;
        }
        self.mappings.insert(c, decomposition.into());
    }

    pub fn len(&self) -> usize {
        self.mappings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mappings.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (char, &str)> + '_ {
        self.mappings.iter().map(|(&c, d)| (c, d.as_ref()))
    }
}

impl<S: AsRef<str>> FromIterator<(char, S)> for DecompositionTable {
    fn from_iter<I: IntoIterator<Item = (char, S)>>(iter: I) -> Self {
        let mut table = Self::default();
        for (c, d) in iter {
            table.insert(c, d.as_ref());
        }
        table
    }
}

/// (starter, mark) → primary composite.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompositionTable {
    pairs: HashMap<(char, char), char>,
}

impl CompositionTable {
    #[inline(always)]
    pub fn get(&self, starter: char, mark: char) -> Option<char> {
        self.pairs.get(&(starter, mark)).copied()
    }

    pub fn insert(&mut self, starter: char, mark: char, composed: char) {
        self.pairs.insert((starter, mark), composed);
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = ((char, char), char)> + '_ {
        self.pairs.iter().map(|(&pair, &c)| (pair, c))
    }
}

impl FromIterator<((char, char), char)> for CompositionTable {
    fn from_iter<I: IntoIterator<Item = ((char, char), char)>>(iter: I) -> Self {
        Self {
            pairs: iter.into_iter().collect(),
        }
    }
}
