//! Tables derived from the Unicode data baked into `icu_normalizer`.
//!
//! Every scalar value is swept once per table. The sweep only reads the
//! compiled data; nothing here parses or validates UCD files.

use super::{
    CombiningClassTable, CompositionTable, DataError, DataProvider, DecompositionTable,
};
use crate::unicode::is_hangul_syllable;
use icu_normalizer::{
    DecomposingNormalizerBorrowed,
    properties::{
        CanonicalCombiningClassMapBorrowed, CanonicalCompositionBorrowed,
        CanonicalDecompositionBorrowed, Decomposed,
    },
};
use std::borrow::Cow;

/// Default provider, backed by `icu_normalizer`'s compiled data.
#[derive(Debug, Default, Clone, Copy)]
pub struct IcuProvider;

fn scalar_values() -> impl Iterator<Item = char> {
    (0..=char::MAX as u32).filter_map(char::from_u32)
}

/// Full decomposition of every non-Hangul codepoint for which `normalizer`
/// changes the single-character string.
fn sweep_decompositions(
    normalizer: &DecomposingNormalizerBorrowed<'static>,
    mut keep: impl FnMut(char, &str) -> bool,
) -> DecompositionTable {
    let mut table = DecompositionTable::default();
    let mut buf = [0u8; 4];

    for c in scalar_values().filter(|&c| !c.is_ascii() && !is_hangul_syllable(c)) {
        let single = c.encode_utf8(&mut buf);
        if let Cow::Owned(decomposed) = normalizer.normalize(single) {
            if decomposed != *single && keep(c, &decomposed) {
                table.insert(c, &decomposed);
            }
        }
    }

    table
}

impl DataProvider for IcuProvider {
    fn name(&self) -> &'static str {
        "icu_normalizer"
    }

    fn canonical_decomposition(&self) -> Result<DecompositionTable, DataError> {
        let nfd = DecomposingNormalizerBorrowed::new_nfd();
        Ok(sweep_decompositions(&nfd, |_, _| true))
    }

    /// Only the entries whose compatibility decomposition differs from the
    /// canonical one; the engine falls back to the canonical table.
    fn compatibility_decomposition(&self) -> Result<DecompositionTable, DataError> {
        let nfd = DecomposingNormalizerBorrowed::new_nfd();
        let nfkd = DecomposingNormalizerBorrowed::new_nfkd();
        let mut buf = [0u8; 4];

        Ok(sweep_decompositions(&nfkd, |c, compat| {
            nfd.normalize(c.encode_utf8(&mut buf)) != compat
        }))
    }

    fn combining_class(&self) -> Result<CombiningClassTable, DataError> {
        let ccc = CanonicalCombiningClassMapBorrowed::new();
        Ok(scalar_values()
            .map(|c| (c, ccc.get_u8(c)))
            .filter(|&(_, class)| class != 0)
            .collect())
    }

    /// Primary composites only: a pair is kept when it decomposes
    /// canonically to exactly two codepoints and composes back, which leaves
    /// out singletons and composition exclusions.
    fn canonical_composition(&self) -> Result<CompositionTable, DataError> {
        let decompose = CanonicalDecompositionBorrowed::new();
        let compose = CanonicalCompositionBorrowed::new();

        Ok(scalar_values()
            .filter(|&c| !is_hangul_syllable(c))
            .filter_map(|c| match decompose.decompose(c) {
                Decomposed::Expansion(starter, mark) => {
                    (compose.compose(starter, mark) == Some(c)).then_some(((starter, mark), c))
                }
                Decomposed::Default | Decomposed::Singleton(_) => None,
            })
            .collect())
    }
}
