//! Unicode normalization (NFD, NFKD, NFC, NFKC) over pluggable table data.
//!
//! ```
//! use normform::{NormalizationForm, normalize};
//!
//! let nfc = normalize("e\u{301}".as_bytes(), NormalizationForm::C).unwrap();
//! assert_eq!(nfc, "\u{e9}");
//! ```

pub mod data;
pub mod engine;
pub mod form;
pub mod normalizer;
pub mod quick_check;
pub mod scanner;
pub mod stage;
pub mod tables;
pub mod unicode;

#[doc(hidden)]
pub mod testing {
    pub mod stage_contract;
}

pub use data::{
    DataError, DataProvider, DirectoryProvider, IcuProvider, MemoryProvider, TableResource,
};
pub use form::NormalizationForm;
pub use normalizer::{
    NormalizationError, Normalizer, NormalizerBuilder, default_normalizer, is_normalized,
    normalize, normalize_str,
};
pub use stage::{NFC, NFD, NFKC, NFKD, NormalizerStage, Stage, StageError};
pub use tables::TableSet;

#[cfg(test)]
mod tests {
    include!("tests/unit.rs");
    include!("tests/integration.rs");
    include!("tests/proptest.rs");
}
