use super::{
    CombiningClassTable, CompositionTable, DataError, DataProvider, DecompositionTable,
    TableResource,
};

/// Provider over tables supplied by the caller.
///
/// Tables left unset fail to load with [`DataError::Missing`], which is how
/// tests exercise partial or broken data.
#[derive(Debug, Clone, Default)]
pub struct MemoryProvider {
    canonical: Option<DecompositionTable>,
    compatibility: Option<DecompositionTable>,
    classes: Option<CombiningClassTable>,
    compositions: Option<CompositionTable>,
}

impl MemoryProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_canonical_decomposition(mut self, table: DecompositionTable) -> Self {
        self.canonical = Some(table);
        self
    }

    pub fn with_compatibility_decomposition(mut self, table: DecompositionTable) -> Self {
        self.compatibility = Some(table);
        self
    }

    pub fn with_combining_class(mut self, table: CombiningClassTable) -> Self {
        self.classes = Some(table);
        self
    }

    pub fn with_canonical_composition(mut self, table: CompositionTable) -> Self {
        self.compositions = Some(table);
        self
    }
}

fn cloned<T: Clone>(table: &Option<T>, resource: TableResource) -> Result<T, DataError> {
    table.clone().ok_or(DataError::Missing(resource))
}

impl DataProvider for MemoryProvider {
    fn name(&self) -> &'static str {
        "memory"
    }

    fn canonical_decomposition(&self) -> Result<DecompositionTable, DataError> {
        cloned(&self.canonical, TableResource::CanonicalDecomposition)
    }

    fn compatibility_decomposition(&self) -> Result<DecompositionTable, DataError> {
        cloned(&self.compatibility, TableResource::CompatibilityDecomposition)
    }

    fn combining_class(&self) -> Result<CombiningClassTable, DataError> {
        cloned(&self.classes, TableResource::CombiningClass)
    }

    fn canonical_composition(&self) -> Result<CompositionTable, DataError> {
        cloned(&self.compositions, TableResource::CanonicalComposition)
    }
}
