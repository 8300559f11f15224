use crate::{
    form::NormalizationForm,
    normalizer::{Normalizer, default_normalizer},
    quick_check,
    stage::{Stage, StageError},
    testing::stage_contract::StageTestConfig,
};
use std::{borrow::Cow, sync::Arc};

/// Unicode Normalization Form C (Canonical Composition)
#[derive(Debug, Default, Clone, Copy)]
pub struct NfcStage;

/// Unicode Normalization Form D (Canonical Decomposition)
#[derive(Debug, Default, Clone, Copy)]
pub struct NfdStage;

/// Unicode Normalization Form KC (Compatibility Composition)
#[derive(Debug, Default, Clone, Copy)]
pub struct NfkcStage;

/// Unicode Normalization Form KD (Compatibility Decomposition)
#[derive(Debug, Default, Clone, Copy)]
pub struct NfkdStage;

pub const NFC: NfcStage = NfcStage;
pub const NFD: NfdStage = NfdStage;
pub const NFKC: NfkcStage = NfkcStage;
pub const NFKD: NfkdStage = NfkdStage;

/// Stage over a caller-built [`Normalizer`], e.g. one reading tables from a
/// custom [`DataProvider`](crate::DataProvider).
#[derive(Debug, Clone)]
pub struct NormalizerStage {
    normalizer: Arc<Normalizer>,
    form: NormalizationForm,
}

impl NormalizerStage {
    pub fn new(normalizer: Arc<Normalizer>, form: NormalizationForm) -> Self {
        Self { normalizer, form }
    }

    pub fn form(&self) -> NormalizationForm {
        self.form
    }

    pub fn normalizer(&self) -> &Arc<Normalizer> {
        &self.normalizer
    }
}

impl Stage for NormalizerStage {
    fn name(&self) -> &'static str {
        stage_name(self.form)
    }

    #[inline]
    fn needs_apply(&self, text: &str) -> Result<bool, StageError> {
        Ok(needs_form(text, self.form))
    }

    #[inline]
    fn apply<'a>(&self, text: Cow<'a, str>) -> Result<Cow<'a, str>, StageError> {
        apply_form(&self.normalizer, self.form, text)
    }
}

const fn stage_name(form: NormalizationForm) -> &'static str {
    match form {
        NormalizationForm::None => "none",
        NormalizationForm::D => "nfd",
        NormalizationForm::KD => "nfkd",
        NormalizationForm::C => "nfc",
        NormalizationForm::KC => "nfkc",
    }
}

#[inline(always)]
fn needs_form(text: &str, form: NormalizationForm) -> bool {
    form != NormalizationForm::None && !quick_check::is_known_normalized(text, form)
}

/// Normalize through `normalizer`, reusing an owned buffer when nothing changes.
fn apply_form<'a>(
    normalizer: &Normalizer,
    form: NormalizationForm,
    text: Cow<'a, str>,
) -> Result<Cow<'a, str>, StageError> {
    let failed = |source| StageError::Failed {
        stage: stage_name(form),
        source,
    };
    match text {
        Cow::Borrowed(s) => normalizer.normalize_str(s, form).map_err(failed),
        Cow::Owned(s) => {
            let rewritten = match normalizer.normalize_str(&s, form).map_err(failed)? {
                Cow::Borrowed(_) => None,
                Cow::Owned(out) => Some(out),
            };
            Ok(Cow::Owned(rewritten.unwrap_or(s)))
        }
    }
}

macro_rules! impl_normalization_stage {
    ($stage:ty, $form:expr) => {
        impl Stage for $stage {
            fn name(&self) -> &'static str {
                stage_name($form)
            }

            #[inline(always)]
            fn needs_apply(&self, text: &str) -> Result<bool, StageError> {
                Ok(needs_form(text, $form))
            }

            #[inline(always)]
            fn apply<'a>(&self, text: Cow<'a, str>) -> Result<Cow<'a, str>, StageError> {
                apply_form(default_normalizer(), $form, text)
            }
        }
    };
}

impl_normalization_stage!(NfcStage, NormalizationForm::C);
impl_normalization_stage!(NfdStage, NormalizationForm::D);
impl_normalization_stage!(NfkcStage, NormalizationForm::KC);
impl_normalization_stage!(NfkdStage, NormalizationForm::KD);

macro_rules! impl_stage_test_config {
    ($type:ty) => {
        impl StageTestConfig for $type {
            fn samples() -> &'static [&'static str] {
                &[
                    "café",
                    "naïve",
                    "e\u{0301}",
                    "ﬁle",
                    "①②③",
                    "한국어",
                    "a\u{0323}\u{0302}",
                    "",
                ]
            }
        }
    };
}

impl_stage_test_config!(NfcStage);
impl_stage_test_config!(NfdStage);
impl_stage_test_config!(NfkcStage);
impl_stage_test_config!(NfkdStage);
impl_stage_test_config!(NormalizerStage);

#[cfg(test)]
mod contract_tests {
    use super::*;
    use crate::assert_stage_contract;

    #[test]
    fn universal_contract_compliance() {
        assert_stage_contract!(NFC);
        assert_stage_contract!(NFD);
        assert_stage_contract!(NFKC);
        assert_stage_contract!(NFKD);

        let normalizer = Arc::new(Normalizer::new());
        for form in NormalizationForm::REWRITING {
            let stage = NormalizerStage::new(Arc::clone(&normalizer), form);
            assert_stage_contract!(stage.clone());
        }
    }

    #[test]
    fn samples_include_decomposed() {
        let decomposed = "cafe\u{0301}";
        let nfc = NFC.apply(Cow::Borrowed(decomposed)).unwrap();
        assert_eq!(nfc, "café");
        let nfd = NFD.apply(Cow::Borrowed(&nfc)).unwrap();
        assert_eq!(nfd, decomposed);
    }

    #[test]
    fn compatibility_decomposes_ligatures() {
        let ligature = "ﬁ";
        assert_eq!(NFKC.apply(Cow::Borrowed(ligature)).unwrap(), "fi");
        assert_eq!(NFKD.apply(Cow::Borrowed(ligature)).unwrap(), "fi");
        assert_eq!(NFC.apply(Cow::Borrowed(ligature)).unwrap(), ligature);
    }
}
