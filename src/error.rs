//! Host error taxonomy.
//!
//! Errors are split into host-fatal conditions (abort initialization),
//! per-function configuration errors (recorded, host keeps starting) and
//! registration conflicts (rejected per call; the embedder decides whether
//! that is fatal for the deployment).

use thiserror::Error;

/// Errors raised by the host and its components.
#[derive(Debug, Error)]
pub enum HostError {
    /// A per-function configuration problem. Recorded against the function;
    /// other functions keep initializing.
    #[error("{message}")]
    FunctionConfig {
        /// Name of the offending function.
        function: String,
        /// Human-readable description of the problem.
        message: String,
    },

    /// A host-fatal initialization failure.
    #[error("{0}")]
    Initialization(String),

    /// A function or proxy name is already registered.
    #[error("The function or proxy name '{name}' must be unique within the function app.")]
    DuplicateName {
        /// The conflicting name.
        name: String,
    },

    /// An HTTP route overlaps with a previously registered one.
    #[error("The route specified conflicts with the route defined by function '{existing}'.")]
    RouteConflict {
        /// Name of the function that registered the route first.
        existing: String,
    },

    /// The route starts with a reserved segment ("admin" or "runtime").
    #[error("The specified route conflicts with one or more built in routes.")]
    ReservedRoute,

    /// A legacy storage-polling blob trigger is not allowed on this SKU.
    #[error("The Flex Consumption SKU only supports EventGrid as the source for BlobTrigger functions. Please update function '{function}' to use EventGrid. For more information see https://aka.ms/blob-trigger-eg.")]
    BlobTriggerPolicy {
        /// Name of the offending function.
        function: String,
    },

    /// The operation observed a shutdown signal.
    #[error("the operation was cancelled")]
    Cancelled,

    /// A caller passed an invalid argument.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Worker process creation failed.
    #[error(transparent)]
    Worker(#[from] WorkerError),
}

impl HostError {
    /// Whether this error aborts host initialization entirely.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            HostError::Initialization(_) | HostError::Worker(_) | HostError::Cancelled
        )
    }

    /// Convenience constructor for per-function configuration errors.
    pub fn function_config(function: impl Into<String>, message: impl Into<String>) -> Self {
        HostError::FunctionConfig {
            function: function.into(),
            message: message.into(),
        }
    }
}

/// Errors from spawning or supervising a language worker process.
#[derive(Debug, Error)]
pub enum WorkerError {
    /// The worker executable could not be started.
    #[error("failed to spawn worker for language '{language}': {source}")]
    SpawnFailed {
        /// Language the worker was meant to serve.
        language: String,
        /// Underlying spawn error.
        #[source]
        source: std::io::Error,
    },

    /// No worker configuration exists for the requested language.
    #[error("no worker configuration registered for language '{language}'")]
    MissingConfig {
        /// The unresolvable language.
        language: String,
    },

    /// The worker exited before signalling readiness.
    #[error("worker for language '{language}' exited during startup with status {status}")]
    EarlyExit {
        /// Language the worker was serving.
        language: String,
        /// Process exit status code, -1 when unavailable.
        status: i32,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fatal_classification() {
        assert!(HostError::Initialization("boom".into()).is_fatal());
        assert!(HostError::Cancelled.is_fatal());
        assert!(!HostError::function_config("f", "bad").is_fatal());
        assert!(!HostError::ReservedRoute.is_fatal());
    }

    #[test]
    fn test_route_conflict_message_names_existing_function() {
        let err = HostError::RouteConflict {
            existing: "test2".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "The route specified conflicts with the route defined by function 'test2'."
        );
    }

    #[test]
    fn test_duplicate_name_message() {
        let err = HostError::DuplicateName {
            name: "test".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "The function or proxy name 'test' must be unique within the function app."
        );
    }
}
