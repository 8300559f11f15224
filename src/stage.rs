//! Normalization forms as pluggable text stages.
//!
//! A [`Stage`] pairs a cheap, conservative pre-check with a copy-on-write
//! transformation. Callers that chain text processing steps run
//! `needs_apply` first and skip `apply` entirely when it returns `false`, so
//! already-normalized input is passed through without allocation.

pub mod normalization;

pub use normalization::{
    NFC, NFD, NFKC, NFKD, NfcStage, NfdStage, NfkcStage, NfkdStage, NormalizerStage,
};

use crate::normalizer::NormalizationError;
use std::borrow::Cow;
use thiserror::Error;

/// Public error type for every stage.
#[derive(Debug, Error)]
pub enum StageError {
    #[error("normalization failed at stage `{stage}`")]
    Failed {
        stage: &'static str,
        #[source]
        source: NormalizationError,
    },
}

/// A single normalization step.
pub trait Stage: Send + Sync {
    /// Human-readable name, used in error messages.
    fn name(&self) -> &'static str;

    /// Fast pre-check. `Ok(false)` guarantees `apply` would return the text
    /// unchanged; `Ok(true)` only means it might not.
    fn needs_apply(&self, text: &str) -> Result<bool, StageError>;

    /// Allocation-aware transformation. Returns the input as-is when nothing
    /// changes.
    fn apply<'a>(&self, text: Cow<'a, str>) -> Result<Cow<'a, str>, StageError>;
}
