//! Runtime-bound function descriptors.

use crate::metadata::types::FunctionMetadata;
use crate::routing::HttpTrigger;

/// The runtime-bound counterpart of [`FunctionMetadata`]: a function that
/// passed validation and is ready for registration and dispatch.
///
/// Invocation itself is the dispatch layer's concern; the descriptor carries
/// what registration needs, including the resolved HTTP trigger for
/// HTTP-triggered functions.
#[derive(Debug, Clone)]
pub struct FunctionDescriptor {
    /// Function name.
    pub name: String,
    /// The originating metadata.
    pub metadata: FunctionMetadata,
    /// Resolved HTTP trigger, for HTTP-triggered functions.
    pub http_trigger: Option<HttpTrigger>,
}

impl FunctionDescriptor {
    /// Create a descriptor for validated metadata.
    pub fn new(name: impl Into<String>, metadata: FunctionMetadata) -> Self {
        Self {
            name: name.into(),
            metadata,
            http_trigger: None,
        }
    }

    /// Attach the resolved HTTP trigger.
    pub fn with_http_trigger(mut self, trigger: HttpTrigger) -> Self {
        self.http_trigger = Some(trigger);
        self
    }
}
