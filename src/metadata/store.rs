//! In-memory store of discovered function metadata.

use crate::metadata::types::FunctionMetadata;

/// Ordered collection of function definitions for one app.
///
/// Populated by the discovery collaborator before initialization; the host
/// treats the contents as immutable once registration starts.
#[derive(Debug, Default)]
pub struct MetadataStore {
    functions: Vec<FunctionMetadata>,
}

impl MetadataStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store from an existing set of definitions.
    pub fn from_functions(functions: Vec<FunctionMetadata>) -> Self {
        Self { functions }
    }

    /// Add a function definition.
    pub fn add(&mut self, metadata: FunctionMetadata) {
        self.functions.push(metadata);
    }

    /// All definitions, in discovery order.
    pub fn functions(&self) -> &[FunctionMetadata] {
        &self.functions
    }

    /// Number of definitions.
    pub fn len(&self) -> usize {
        self.functions.len()
    }

    /// Whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }

    /// Look up a definition by exact name.
    pub fn get(&self, name: &str) -> Option<&FunctionMetadata> {
        self.functions.iter().find(|f| f.name == name)
    }
}
