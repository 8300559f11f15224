//! The set of tables one [`Normalizer`](crate::Normalizer) works with.
//!
//! Each table sits behind its own `OnceLock`, so a form only pays for the
//! tables it needs and readers never see a half-built table. Two threads
//! racing on the first load may both ask the provider; the first result to
//! land is kept and the other is dropped.

use crate::data::{
    CombiningClassTable, CompositionTable, DataError, DataProvider, DecompositionTable,
    TableResource,
};
use std::{
    fmt,
    sync::{Arc, OnceLock},
    time::Instant,
};
use tracing::{debug, warn};

pub struct TableSet {
    provider: Arc<dyn DataProvider>,
    canonical: OnceLock<DecompositionTable>,
    compatibility: OnceLock<DecompositionTable>,
    classes: OnceLock<CombiningClassTable>,
    compositions: OnceLock<CompositionTable>,
}

impl fmt::Debug for TableSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TableSet")
            .field("provider", &self.provider.name())
            .field("canonical", &self.canonical.get().map(|t| t.len()))
            .field("compatibility", &self.compatibility.get().map(|t| t.len()))
            .field("classes", &self.classes.get().map(|t| t.len()))
            .field("compositions", &self.compositions.get().map(|t| t.len()))
            .finish()
    }
}

/// Entry count, for log events.
trait TableLen {
    fn entries(&self) -> usize;
}

impl TableLen for DecompositionTable {
    fn entries(&self) -> usize {
        self.len()
    }
}

impl TableLen for CombiningClassTable {
    fn entries(&self) -> usize {
        self.len()
    }
}

impl TableLen for CompositionTable {
    fn entries(&self) -> usize {
        self.len()
    }
}

impl TableSet {
    pub fn new(provider: Arc<dyn DataProvider>) -> Self {
        Self {
            provider,
            canonical: OnceLock::new(),
            compatibility: OnceLock::new(),
            classes: OnceLock::new(),
            compositions: OnceLock::new(),
        }
    }

    pub fn provider_name(&self) -> &'static str {
        self.provider.name()
    }

    fn load<'a, T: TableLen>(
        &self,
        cell: &'a OnceLock<T>,
        resource: TableResource,
        load: impl FnOnce(&dyn DataProvider) -> Result<T, DataError>,
    ) -> Result<&'a T, DataError> {
        if let Some(table) = cell.get() {
            return Ok(table);
        }

        let started = Instant::now();
        let table = load(self.provider.as_ref()).inspect_err(|err| {
            warn!(
                %resource,
                provider = self.provider.name(),
                %err,
                "failed to load normalization table"
            );
        })?;
        debug!(
            %resource,
            provider = self.provider.name(),
            entries = table.entries(),
            elapsed = ?started.elapsed(),
            "loaded normalization table"
        );
        Ok(cell.get_or_init(|| table))
    }

    pub fn canonical_decomposition(&self) -> Result<&DecompositionTable, DataError> {
        self.load(
            &self.canonical,
            TableResource::CanonicalDecomposition,
            |p| p.canonical_decomposition(),
        )
    }

    pub fn compatibility_decomposition(&self) -> Result<&DecompositionTable, DataError> {
        self.load(
            &self.compatibility,
            TableResource::CompatibilityDecomposition,
            |p| p.compatibility_decomposition(),
        )
    }

    pub fn combining_class(&self) -> Result<&CombiningClassTable, DataError> {
        self.load(&self.classes, TableResource::CombiningClass, |p| {
            p.combining_class()
        })
    }

    pub fn canonical_composition(&self) -> Result<&CompositionTable, DataError> {
        self.load(
            &self.compositions,
            TableResource::CanonicalComposition,
            |p| p.canonical_composition(),
        )
    }

    /// Resources already loaded, in [`TableResource::ALL`] order.
    pub fn loaded(&self) -> Vec<TableResource> {
        let present = [
            self.canonical.get().is_some(),
            self.compatibility.get().is_some(),
            self.classes.get().is_some(),
            self.compositions.get().is_some(),
        ];
        TableResource::ALL
            .into_iter()
            .zip(present)
            .filter_map(|(resource, loaded)| loaded.then_some(resource))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::MemoryProvider;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Counts how often the provider is asked for the class table.
    #[derive(Default)]
    struct Counting {
        class_loads: AtomicUsize,
    }

    impl DataProvider for Counting {
        fn name(&self) -> &'static str {
            "counting"
        }
        fn canonical_decomposition(&self) -> Result<DecompositionTable, DataError> {
            Ok(DecompositionTable::default())
        }
        fn compatibility_decomposition(&self) -> Result<DecompositionTable, DataError> {
            Err(DataError::Missing(TableResource::CompatibilityDecomposition))
        }
        fn combining_class(&self) -> Result<CombiningClassTable, DataError> {
            self.class_loads.fetch_add(1, Ordering::SeqCst);
            Ok([('\u{301}', 230)].into_iter().collect())
        }
        fn canonical_composition(&self) -> Result<CompositionTable, DataError> {
            Ok(CompositionTable::default())
        }
    }

    #[test]
    fn loads_each_table_once() {
        let provider = Arc::new(Counting::default());
        let tables = TableSet::new(provider.clone());

        assert!(tables.loaded().is_empty());
        for _ in 0..3 {
            assert_eq!(tables.combining_class().unwrap().get('\u{301}'), 230);
        }
        assert_eq!(provider.class_loads.load(Ordering::SeqCst), 1);
        assert_eq!(tables.loaded(), [TableResource::CombiningClass]);
    }

    #[test]
    fn failed_load_is_reported_and_not_cached() {
        let tables = TableSet::new(Arc::new(Counting::default()));
        for _ in 0..2 {
            assert!(matches!(
                tables.compatibility_decomposition(),
                Err(DataError::Missing(TableResource::CompatibilityDecomposition))
            ));
        }
        assert!(tables.loaded().is_empty());
    }

    #[test]
    fn concurrent_first_use_sees_complete_tables() {
        let classes: CombiningClassTable = (0x300u32..0x370)
            .filter_map(char::from_u32)
            .map(|c| (c, 230))
            .collect();
        let tables = TableSet::new(Arc::new(MemoryProvider::new().with_combining_class(classes)));

        std::thread::scope(|s| {
            for _ in 0..8 {
                s.spawn(|| assert_eq!(tables.combining_class().unwrap().len(), 0x70));
            }
        });
    }
}
