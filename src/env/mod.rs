//! Process environment abstraction.
//!
//! The platform communicates with the host through a fixed vocabulary of
//! named settings (SKU, worker runtime, placeholder mode, log paths, ...).
//! Components read them through the [`Environment`] trait so tests can
//! substitute an in-memory map for the real process environment.

use std::collections::HashMap;
use std::sync::RwLock;

/// Well-known environment setting names.
pub mod settings {
    pub const WEBSITE_INSTANCE_ID: &str = "WEBSITE_INSTANCE_ID";
    pub const WEBSITE_SKU: &str = "WEBSITE_SKU";
    pub const WEBSITE_PLACEHOLDER_MODE: &str = "WEBSITE_PLACEHOLDER_MODE";
    pub const FUNCTIONS_WORKER_RUNTIME: &str = "FUNCTIONS_WORKER_RUNTIME";
    pub const FUNCTIONS_WORKER_RUNTIME_VERSION: &str = "FUNCTIONS_WORKER_RUNTIME_VERSION";
    pub const FUNCTIONS_EXTENSION_VERSION: &str = "FUNCTIONS_EXTENSION_VERSION";
    pub const FUNCTIONS_LOG_PATH: &str = "FUNCTIONS_LOG_PATH";
}

/// Well-known hosting plan SKU values.
pub mod sku {
    pub const DYNAMIC: &str = "Dynamic";
    pub const ELASTIC_PREMIUM: &str = "ElasticPremium";
    pub const FLEX_CONSUMPTION: &str = "FlexConsumption";
}

/// Read access to named configuration settings.
pub trait Environment: Send + Sync {
    /// Look up a setting by name. `None` when unset.
    fn get(&self, name: &str) -> Option<String>;

    /// Look up a setting, treating an empty value as unset.
    fn get_non_empty(&self, name: &str) -> Option<String> {
        self.get(name).filter(|v| !v.is_empty())
    }

    /// The explicit worker runtime ("node", "python", "dotnet", ...), if set.
    fn worker_runtime(&self) -> Option<String> {
        self.get_non_empty(settings::FUNCTIONS_WORKER_RUNTIME)
    }

    /// The worker runtime version ("3.9", "~8", ...), if set.
    fn worker_runtime_version(&self) -> Option<String> {
        self.get_non_empty(settings::FUNCTIONS_WORKER_RUNTIME_VERSION)
    }

    /// The hosting plan SKU, if the platform supplied one.
    fn website_sku(&self) -> Option<String> {
        self.get_non_empty(settings::WEBSITE_SKU)
    }

    /// Platform-supplied root directory for host log artifacts, if set.
    fn log_path(&self) -> Option<String> {
        self.get_non_empty(settings::FUNCTIONS_LOG_PATH)
    }

    /// Whether the host is a pre-warmed placeholder awaiting specialization.
    fn is_placeholder_mode(&self) -> bool {
        self.get(settings::WEBSITE_PLACEHOLDER_MODE).as_deref() == Some("1")
    }

    /// Whether the host runs on an elastic/dynamic hosting tier where
    /// cold-start work should be deferred.
    fn is_dynamic_sku(&self) -> bool {
        matches!(
            self.website_sku().as_deref(),
            Some(sku::DYNAMIC) | Some(sku::ELASTIC_PREMIUM) | Some(sku::FLEX_CONSUMPTION)
        )
    }

    /// Whether the SKU is Flex Consumption, which disallows legacy
    /// storage-polling blob triggers.
    fn is_flex_consumption_sku(&self) -> bool {
        self.website_sku().as_deref() == Some(sku::FLEX_CONSUMPTION)
    }

    /// Whether the host runs inside the hosted platform (as opposed to a
    /// local/self-hosted deployment), keyed off the instance id.
    fn is_azure_environment(&self) -> bool {
        self.get_non_empty(settings::WEBSITE_INSTANCE_ID).is_some()
    }
}

/// [`Environment`] backed by the real process environment.
#[derive(Debug, Default)]
pub struct SystemEnvironment;

impl SystemEnvironment {
    /// Create a new system environment.
    pub fn new() -> Self {
        Self
    }
}

impl Environment for SystemEnvironment {
    fn get(&self, name: &str) -> Option<String> {
        std::env::var(name).ok()
    }
}

/// In-memory [`Environment`] for tests and embedding.
#[derive(Debug, Default)]
pub struct TestEnvironment {
    values: RwLock<HashMap<String, String>>,
}

impl TestEnvironment {
    /// Create an empty test environment.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a variable, replacing any previous value.
    pub fn set(&self, name: impl Into<String>, value: impl Into<String>) {
        self.values
            .write()
            .expect("environment lock poisoned")
            .insert(name.into(), value.into());
    }

    /// Remove a variable.
    pub fn remove(&self, name: &str) {
        self.values
            .write()
            .expect("environment lock poisoned")
            .remove(name);
    }
}

impl Environment for TestEnvironment {
    fn get(&self, name: &str) -> Option<String> {
        self.values
            .read()
            .expect("environment lock poisoned")
            .get(name)
            .cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_test_environment_set_and_get() {
        let env = TestEnvironment::new();
        assert_eq!(env.get(settings::WEBSITE_SKU), None);

        env.set(settings::WEBSITE_SKU, sku::DYNAMIC);
        assert_eq!(env.get(settings::WEBSITE_SKU).as_deref(), Some("Dynamic"));

        env.remove(settings::WEBSITE_SKU);
        assert_eq!(env.get(settings::WEBSITE_SKU), None);
    }

    #[test]
    fn test_placeholder_mode() {
        let env = TestEnvironment::new();
        assert!(!env.is_placeholder_mode());

        env.set(settings::WEBSITE_PLACEHOLDER_MODE, "1");
        assert!(env.is_placeholder_mode());

        env.set(settings::WEBSITE_PLACEHOLDER_MODE, "0");
        assert!(!env.is_placeholder_mode());
    }

    #[test]
    fn test_dynamic_sku_detection() {
        let env = TestEnvironment::new();
        assert!(!env.is_dynamic_sku());

        env.set(settings::WEBSITE_SKU, sku::ELASTIC_PREMIUM);
        assert!(env.is_dynamic_sku());
        assert!(!env.is_flex_consumption_sku());

        env.set(settings::WEBSITE_SKU, sku::FLEX_CONSUMPTION);
        assert!(env.is_flex_consumption_sku());
    }

    #[test]
    fn test_log_path() {
        let env = TestEnvironment::new();
        assert_eq!(env.log_path(), None);

        env.set(settings::FUNCTIONS_LOG_PATH, "/home/logfiles");
        assert_eq!(env.log_path().as_deref(), Some("/home/logfiles"));
    }

    #[test]
    fn test_empty_value_is_treated_as_unset() {
        let env = TestEnvironment::new();
        env.set(settings::FUNCTIONS_WORKER_RUNTIME, "");
        assert_eq!(env.worker_runtime(), None);

        env.set(settings::FUNCTIONS_WORKER_RUNTIME, "node");
        assert_eq!(env.worker_runtime().as_deref(), Some("node"));
    }
}
