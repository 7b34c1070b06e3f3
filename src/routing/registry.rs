//! Route registry: validates HTTP-triggered functions and detects
//! overlapping routes.
//!
//! The registry is populated during the single-threaded registration phase
//! of initialization and treated as read-only afterwards.

use crate::env::Environment;
use crate::error::HostError;
use crate::metadata::FunctionDescriptor;
use crate::routing::trigger::HttpTrigger;
use tracing::debug;

/// Top-level path segments reserved for the host's own endpoints.
const RESERVED_ROUTE_PREFIXES: [&str; 2] = ["admin", "runtime"];

/// Blob trigger source value allowed on Flex Consumption.
const EVENT_GRID_SOURCE: &str = "EventGrid";

/// Registry of HTTP-triggered functions keyed by function name, preserving
/// registration order for first-registered-wins conflict reporting.
#[derive(Debug, Default)]
pub struct RouteRegistry {
    entries: Vec<(String, HttpTrigger)>,
}

impl RouteRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of registered HTTP functions.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether a function or proxy with the given name is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.entries.iter().any(|(n, _)| n == name)
    }

    /// The registered trigger for a function, if any.
    pub fn get(&self, name: &str) -> Option<&HttpTrigger> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, t)| t)
    }

    /// Validate a function and register its HTTP trigger.
    ///
    /// Checks run in order: duplicate function/proxy name, the Flex
    /// Consumption blob-trigger policy, then (for HTTP-triggered functions)
    /// route defaulting, reserved prefixes and route conflicts. An empty
    /// route on the trigger is defaulted to the function name in place.
    /// Functions without an HTTP trigger pass validation without being
    /// registered.
    pub fn register(
        &mut self,
        function: &mut FunctionDescriptor,
        env: &dyn Environment,
    ) -> Result<(), HostError> {
        if self.contains(&function.name) {
            return Err(HostError::DuplicateName {
                name: function.name.clone(),
            });
        }

        validate_blob_trigger_policy(function, env)?;

        let Some(trigger) = function.http_trigger.as_mut() else {
            return Ok(());
        };

        if trigger.route.is_empty() {
            trigger.route = function.name.clone();
        }

        let first_segment = trigger
            .route
            .trim_matches('/')
            .split('/')
            .next()
            .unwrap_or_default();
        if RESERVED_ROUTE_PREFIXES
            .iter()
            .any(|p| first_segment.eq_ignore_ascii_case(p))
        {
            return Err(HostError::ReservedRoute);
        }

        for (existing_name, existing_trigger) in &self.entries {
            if routes_conflict(trigger, existing_trigger) {
                return Err(HostError::RouteConflict {
                    existing: existing_name.clone(),
                });
            }
        }

        debug!(
            function = %function.name,
            route = %trigger.route,
            "registered http route"
        );
        self.entries.push((function.name.clone(), trigger.clone()));
        Ok(())
    }
}

/// On the Flex Consumption SKU, input blob triggers must use EventGrid as
/// their source; the legacy storage-polling mechanism is disabled there.
fn validate_blob_trigger_policy(
    function: &FunctionDescriptor,
    env: &dyn Environment,
) -> Result<(), HostError> {
    if !env.is_flex_consumption_sku() {
        return Ok(());
    }

    let legacy_blob_trigger = function
        .metadata
        .bindings
        .iter()
        .any(|b| b.is_blob_trigger() && b.source() != Some(EVENT_GRID_SOURCE));
    if legacy_blob_trigger {
        return Err(HostError::BlobTriggerPolicy {
            function: function.name.clone(),
        });
    }
    Ok(())
}

/// Whether two route templates conflict: same segment count, each segment
/// pair either textually equal (case-insensitive) or both parameter
/// placeholders, and the method sets intersect.
pub fn routes_conflict(first: &HttpTrigger, second: &HttpTrigger) -> bool {
    if !first.methods_intersect(second) {
        return false;
    }

    let first_segments: Vec<&str> = first.route.trim_matches('/').split('/').collect();
    let second_segments: Vec<&str> = second.route.trim_matches('/').split('/').collect();

    if first_segments.len() != second_segments.len() {
        return false;
    }

    first_segments
        .iter()
        .zip(second_segments.iter())
        .all(|(a, b)| {
            let a_is_param = a.starts_with('{') && a.ends_with('}');
            let b_is_param = b.starts_with('{') && b.ends_with('}');
            (a_is_param && b_is_param) || a.eq_ignore_ascii_case(b)
        })
}
