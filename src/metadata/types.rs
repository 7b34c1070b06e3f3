//! Core metadata records describing discovered functions.
//!
//! A [`FunctionMetadata`] is produced by the external discovery collaborator
//! (already deserialized from the function manifest) and is immutable once
//! the host has registered it.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::PathBuf;

/// Maximum allowed function name length.
const MAX_FUNCTION_NAME_LENGTH: usize = 128;

/// Direction of data flow for a binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BindingDirection {
    In,
    Out,
    InOut,
}

/// Metadata for a single binding on a function.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BindingMetadata {
    /// Data flow direction.
    pub direction: BindingDirection,
    /// Binding type tag, e.g. "httpTrigger" or "blobTrigger".
    #[serde(rename = "type")]
    pub binding_type: String,
    /// Raw structured configuration as supplied by the manifest.
    pub raw: Value,
}

impl BindingMetadata {
    /// Create a new binding.
    pub fn new(direction: BindingDirection, binding_type: impl Into<String>, raw: Value) -> Self {
        Self {
            direction,
            binding_type: binding_type.into(),
            raw,
        }
    }

    /// Whether this is a trigger binding.
    pub fn is_trigger(&self) -> bool {
        self.binding_type.to_ascii_lowercase().ends_with("trigger")
    }

    /// Whether this is an HTTP trigger binding.
    pub fn is_http_trigger(&self) -> bool {
        self.binding_type.eq_ignore_ascii_case("httpTrigger")
    }

    /// Whether this is an input blob trigger binding.
    pub fn is_blob_trigger(&self) -> bool {
        self.direction == BindingDirection::In
            && self.binding_type.eq_ignore_ascii_case("blobTrigger")
    }

    /// The resolved "source" value from the raw configuration, if present.
    pub fn source(&self) -> Option<&str> {
        self.raw.get("source").and_then(Value::as_str)
    }
}

/// Whether a function is an ordinary executable function or a routing-only
/// proxy. Proxies have no language and never execute user code.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FunctionKind {
    #[default]
    Ordinary,
    Proxy,
}

/// Identity record for one discovered function.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunctionMetadata {
    /// Function name, unique within the app.
    pub name: String,
    /// Implementation language ("node", "python", "CSharp", ...). Proxies
    /// and codeless functions may leave this unset.
    pub language: Option<String>,
    /// Path to the user script, absent for codeless functions.
    pub script_file: Option<PathBuf>,
    /// Ordered bindings.
    pub bindings: Vec<BindingMetadata>,
    /// Ordinary function or routing-only proxy.
    pub kind: FunctionKind,
    /// True when the function has no user-authored script, making it
    /// language-agnostic for resolution purposes.
    pub is_codeless: bool,
}

impl FunctionMetadata {
    /// Create metadata for an ordinary function.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            language: None,
            script_file: None,
            bindings: Vec::new(),
            kind: FunctionKind::Ordinary,
            is_codeless: false,
        }
    }

    /// Create metadata for a routing-only proxy. The name is normalized the
    /// way proxy names are (whitespace stripped, trailing '%' removed).
    pub fn proxy(name: &str) -> Self {
        Self {
            name: normalize_function_name(name),
            language: None,
            script_file: None,
            bindings: Vec::new(),
            kind: FunctionKind::Proxy,
            is_codeless: true,
        }
    }

    /// Set the implementation language.
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    /// Set the script file path.
    pub fn with_script_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.script_file = Some(path.into());
        self
    }

    /// Append a binding.
    pub fn with_binding(mut self, binding: BindingMetadata) -> Self {
        self.bindings.push(binding);
        self
    }

    /// Mark the function as codeless.
    pub fn codeless(mut self, is_codeless: bool) -> Self {
        self.is_codeless = is_codeless;
        self
    }

    /// Whether this metadata describes a proxy.
    pub fn is_proxy(&self) -> bool {
        self.kind == FunctionKind::Proxy
    }

    /// The HTTP trigger binding, if the function has one.
    pub fn http_trigger_binding(&self) -> Option<&BindingMetadata> {
        self.bindings.iter().find(|b| b.is_http_trigger())
    }
}

/// Normalize a function or proxy name: strip all whitespace and any
/// trailing '%' characters.
pub fn normalize_function_name(name: &str) -> String {
    let stripped: String = name.chars().filter(|c| !c.is_whitespace()).collect();
    stripped.trim_end_matches('%').to_string()
}

/// Validate a function name: must start with an ASCII letter, continue with
/// letters, digits, '_' or '-', and be at most 128 characters.
pub fn is_valid_function_name(name: &str) -> bool {
    if name.is_empty() || name.len() > MAX_FUNCTION_NAME_LENGTH {
        return false;
    }
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}
