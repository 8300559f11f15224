//! The two normalization engines.
//!
//! [`Decomposer`] turns any valid text into fully decomposed, canonically
//! ordered text. [`Composer`] expects exactly that as input and recomposes it.
//! Both borrow their tables and keep no state between calls.

pub mod compose;
pub mod decompose;

pub use compose::Composer;
pub use decompose::Decomposer;
