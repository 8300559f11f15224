use crate::{
    data::{DataError, DataProvider, IcuProvider},
    engine::{Composer, Decomposer},
    form::NormalizationForm,
    quick_check,
    tables::TableSet,
};
use std::{
    borrow::Cow,
    sync::{Arc, LazyLock},
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum NormalizationError {
    #[error("input is not well-formed UTF-8 (valid up to byte {valid_up_to})")]
    InvalidEncoding { valid_up_to: usize },

    #[error("unsupported normalization form `{form}`")]
    UnsupportedForm {
        form: String,
        #[source]
        source: Option<DataError>,
    },
}

impl NormalizationError {
    pub(crate) fn unsupported(form: impl ToString) -> Self {
        Self::UnsupportedForm {
            form: form.to_string(),
            source: None,
        }
    }

    fn tables_unavailable(form: NormalizationForm) -> impl FnOnce(DataError) -> Self {
        move |source| Self::UnsupportedForm {
            form: form.to_string(),
            source: Some(source),
        }
    }
}

/// Check that `text` is well-formed UTF-8.
#[inline]
pub fn validate(text: &[u8]) -> Result<&str, NormalizationError> {
    #[cfg(feature = "simd")]
    {
        simdutf8::compat::from_utf8(text).map_err(|e| NormalizationError::InvalidEncoding {
            valid_up_to: e.valid_up_to(),
        })
    }
    #[cfg(not(feature = "simd"))]
    {
        std::str::from_utf8(text).map_err(|e| NormalizationError::InvalidEncoding {
            valid_up_to: e.valid_up_to(),
        })
    }
}

/// Normalization dispatcher: picks the engines for a form and feeds them
/// the tables it loads on first use.
///
/// Cheap to share; wrap in an `Arc` or keep in a `static`.
#[derive(Debug)]
pub struct Normalizer {
    tables: TableSet,
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Normalizer {
    /// Normalizer backed by [`IcuProvider`].
    pub fn new() -> Self {
        Self::builder().build()
    }

    pub fn builder() -> NormalizerBuilder {
        NormalizerBuilder::default()
    }

    pub fn tables(&self) -> &TableSet {
        &self.tables
    }

    /// Validate `text` as UTF-8, then normalize it.
    pub fn normalize<'a>(
        &self,
        text: &'a [u8],
        form: NormalizationForm,
    ) -> Result<Cow<'a, str>, NormalizationError> {
        self.normalize_str(validate(text)?, form)
    }

    /// Normalize text that is already known to be UTF-8.
    ///
    /// Returns `Cow::Borrowed` whenever the output equals the input.
    pub fn normalize_str<'a>(
        &self,
        text: &'a str,
        form: NormalizationForm,
    ) -> Result<Cow<'a, str>, NormalizationError> {
        if form == NormalizationForm::None || quick_check::is_known_normalized(text, form) {
            return Ok(Cow::Borrowed(text));
        }

        let unavailable = NormalizationError::tables_unavailable;
        let tables = &self.tables;

        let compatibility = if form.uses_compatibility() {
            Some(tables.compatibility_decomposition().map_err(unavailable(form))?)
        } else {
            None
        };
        let canonical = tables.canonical_decomposition().map_err(unavailable(form))?;
        let classes = tables.combining_class().map_err(unavailable(form))?;

        let mut out = Decomposer::new(canonical, compatibility, classes).decompose(text);

        if form.recomposes() {
            let compositions = tables.canonical_composition().map_err(unavailable(form))?;
            out = Composer::new(compositions, classes).compose(&out);
        }

        Ok(if out == text {
            Cow::Borrowed(text)
        } else {
            Cow::Owned(out)
        })
    }

    /// Conservative check: `true` means `text` is certainly in `form`.
    pub fn is_normalized(&self, text: &[u8], form: NormalizationForm) -> bool {
        quick_check::is_normalized(text, form)
    }
}

#[derive(Default)]
pub struct NormalizerBuilder {
    provider: Option<Arc<dyn DataProvider>>,
}

impl NormalizerBuilder {
    pub fn provider<P: DataProvider + 'static>(mut self, provider: P) -> Self {
        self.provider = Some(Arc::new(provider));
        self
    }

    /// Use a provider shared with other normalizers.
    pub fn shared_provider(mut self, provider: Arc<dyn DataProvider>) -> Self {
        self.provider = Some(provider);
        self
    }

    pub fn build(self) -> Normalizer {
        let provider = self.provider.unwrap_or_else(|| Arc::new(IcuProvider));
        Normalizer {
            tables: TableSet::new(provider),
        }
    }
}

static DEFAULT_NORMALIZER: LazyLock<Normalizer> = LazyLock::new(Normalizer::new);

/// The process-wide normalizer used by the free functions.
pub fn default_normalizer() -> &'static Normalizer {
    &DEFAULT_NORMALIZER
}

/// Normalize `text` with the process-wide [`Normalizer`].
pub fn normalize(
    text: &[u8],
    form: NormalizationForm,
) -> Result<Cow<'_, str>, NormalizationError> {
    DEFAULT_NORMALIZER.normalize(text, form)
}

/// [`normalize`] for `&str` input.
pub fn normalize_str(
    text: &str,
    form: NormalizationForm,
) -> Result<Cow<'_, str>, NormalizationError> {
    DEFAULT_NORMALIZER.normalize_str(text, form)
}

/// Conservative "already normalized" check; never a false positive.
pub fn is_normalized(text: &[u8], form: NormalizationForm) -> bool {
    quick_check::is_normalized(text, form)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{MemoryProvider, TableResource};
    use NormalizationForm as F;

    fn synthetic() -> MemoryProvider {
        MemoryProvider::new()
            .with_canonical_decomposition([('é', "e\u{301}")].into_iter().collect())
            .with_combining_class([('\u{301}', 230)].into_iter().collect())
            .with_canonical_composition([(('e', '\u{301}'), 'é')].into_iter().collect())
    }

    #[test]
    fn rejects_invalid_utf8() {
        let n = Normalizer::builder().provider(synthetic()).build();
        for form in NormalizationForm::ALL {
            let err = n.normalize(b"ab\x80", form).unwrap_err();
            assert!(matches!(err, NormalizationError::InvalidEncoding { valid_up_to: 2 }));
        }
    }

    #[test]
    fn none_and_ascii_load_nothing() {
        let n = Normalizer::builder().provider(MemoryProvider::new()).build();
        assert_eq!(n.normalize_str("é\u{301}", F::None).unwrap(), "é\u{301}");
        for form in NormalizationForm::ALL {
            assert_eq!(n.normalize(b"plain", form).unwrap(), "plain");
            assert_eq!(n.normalize(b"", form).unwrap(), "");
        }
        assert!(n.tables().loaded().is_empty());
    }

    #[test]
    fn loads_only_what_the_form_needs() {
        let n = Normalizer::builder().provider(synthetic()).build();
        assert_eq!(n.normalize_str("\u{10000}é", F::D).unwrap(), "\u{10000}e\u{301}");
        assert_eq!(
            n.tables().loaded(),
            [TableResource::CanonicalDecomposition, TableResource::CombiningClass]
        );

        assert_eq!(n.normalize_str("\u{10000}e\u{301}", F::C).unwrap(), "\u{10000}é");
        assert_eq!(
            n.tables().loaded(),
            [
                TableResource::CanonicalDecomposition,
                TableResource::CombiningClass,
                TableResource::CanonicalComposition
            ]
        );
    }

    #[test]
    fn missing_table_is_unsupported_form() {
        // no compatibility table: K-forms fail, canonical forms still work
        let n = Normalizer::builder().provider(synthetic()).build();
        for form in [F::KD, F::KC] {
            let err = n.normalize_str("\u{10000}é", form).unwrap_err();
            match err {
                NormalizationError::UnsupportedForm { form: name, source } => {
                    assert_eq!(name, form.name());
                    assert!(matches!(
                        source,
                        Some(DataError::Missing(TableResource::CompatibilityDecomposition))
                    ));
                }
                other => panic!("unexpected error: {other}"),
            }
        }
        assert!(n.normalize_str("\u{10000}é", F::D).is_ok());
        assert!(n.normalize_str("\u{10000}é", F::C).is_ok());
    }

    #[test]
    fn unchanged_output_is_borrowed() {
        let n = Normalizer::builder().provider(synthetic()).build();
        let input = "\u{10000}é";
        let out = n.normalize_str(input, F::C).unwrap();
        assert!(matches!(out, Cow::Borrowed(s) if s.as_ptr() == input.as_ptr()));

        let out = n.normalize_str(input, F::D).unwrap();
        assert!(matches!(out, Cow::Owned(_)));
    }

    #[test]
    fn free_functions_use_default_tables() {
        assert_eq!(normalize(b"e\xcc\x81", F::C).unwrap(), "é");
        assert_eq!(normalize_str("é", F::D).unwrap(), "e\u{301}");
        assert!(is_normalized(b"abc", F::KD));
        assert_eq!(default_normalizer().tables().provider_name(), "icu_normalizer");
    }
}
