//! Function metadata: discovery records, validation and the in-memory store.

pub mod descriptor;
pub mod store;
pub mod types;

pub use descriptor::FunctionDescriptor;
pub use store::MetadataStore;
pub use types::{
    is_valid_function_name, normalize_function_name, BindingDirection, BindingMetadata,
    FunctionKind, FunctionMetadata,
};
