//! Conservative "already normalized" predicate.
//!
//! `true` is a guarantee, `false` only means "not proven, run the
//! normalizer". No tables are consulted.

use crate::{form::NormalizationForm, normalizer::validate};

/// Every codepoint at or below this is unchanged by NFC.
const NFC_SAFE_MAX: char = '\u{2FF}';

/// 7-bit bytes never decompose, never reorder and never start a
/// composition that changes them, in any form.
#[inline(always)]
pub fn is_allow_listed(text: &[u8]) -> bool {
    text.is_ascii()
}

pub fn is_normalized(text: &[u8], form: NormalizationForm) -> bool {
    if is_allow_listed(text) {
        return true;
    }
    form == NormalizationForm::C && validate(text).is_ok_and(is_nfc_safe)
}

/// Same check for text already known to be UTF-8.
#[inline]
pub(crate) fn is_known_normalized(text: &str, form: NormalizationForm) -> bool {
    is_allow_listed(text.as_bytes()) || (form == NormalizationForm::C && is_nfc_safe(text))
}

#[inline]
fn is_nfc_safe(text: &str) -> bool {
    text.chars().all(|c| c <= NFC_SAFE_MAX)
}
