//! HTTP trigger attributes resolved from binding metadata.

use crate::metadata::BindingMetadata;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Authorization level required to invoke an HTTP-triggered function.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AuthLevel {
    Anonymous,
    #[default]
    Function,
    Admin,
}

/// Resolved HTTP trigger for one function: the allowed methods and the
/// route template. An empty method set means "all methods"; an empty route
/// defaults to the function name at registration time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpTrigger {
    /// Required authorization level.
    pub auth_level: AuthLevel,
    /// Allowed HTTP methods, lower-cased. Empty means all methods.
    pub methods: Vec<String>,
    /// Route template, e.g. "products/{category}/{id?}". May be empty.
    pub route: String,
}

impl HttpTrigger {
    /// Create a trigger allowing the given methods.
    pub fn new<I, S>(methods: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            auth_level: AuthLevel::default(),
            methods: methods
                .into_iter()
                .map(|m| m.as_ref().to_ascii_lowercase())
                .collect(),
            route: String::new(),
        }
    }

    /// Create a trigger allowing all methods.
    pub fn all_methods() -> Self {
        Self::new(std::iter::empty::<&str>())
    }

    /// Set the authorization level.
    pub fn with_auth_level(mut self, auth_level: AuthLevel) -> Self {
        self.auth_level = auth_level;
        self
    }

    /// Set the route template.
    pub fn with_route(mut self, route: impl Into<String>) -> Self {
        self.route = route.into();
        self
    }

    /// Resolve a trigger from a raw `httpTrigger` binding. Absent fields
    /// fall back to defaults (all methods, empty route, function auth).
    pub fn from_binding(binding: &BindingMetadata) -> Self {
        let methods = binding
            .raw
            .get("methods")
            .and_then(Value::as_array)
            .map(|methods| methods.iter().filter_map(Value::as_str))
            .map(HttpTrigger::new)
            .unwrap_or_default();

        let route = binding
            .raw
            .get("route")
            .and_then(Value::as_str)
            .unwrap_or_default();

        let auth_level = match binding.raw.get("authLevel").and_then(Value::as_str) {
            Some(level) if level.eq_ignore_ascii_case("anonymous") => AuthLevel::Anonymous,
            Some(level) if level.eq_ignore_ascii_case("admin") => AuthLevel::Admin,
            _ => AuthLevel::Function,
        };

        methods.with_route(route).with_auth_level(auth_level)
    }

    /// Whether the method sets of two triggers overlap. An empty set allows
    /// all methods and therefore intersects with anything.
    pub fn methods_intersect(&self, other: &HttpTrigger) -> bool {
        if self.methods.is_empty() || other.methods.is_empty() {
            return true;
        }
        self.methods.iter().any(|m| other.methods.contains(m))
    }
}

impl Default for HttpTrigger {
    fn default() -> Self {
        Self::all_methods()
    }
}
