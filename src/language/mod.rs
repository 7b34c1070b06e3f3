//! Single-runtime-language resolution.
//!
//! A function app is served by at most one out-of-process worker language.
//! The resolver decides whether a discovered function set satisfies that
//! constraint, and the verification gate turns violations into host-fatal
//! initialization errors.

use crate::env::settings;
use crate::error::HostError;
use crate::metadata::FunctionMetadata;
use tokio_util::sync::CancellationToken;

/// The language name shared by all .NET flavors after aliasing.
pub const DOTNET_LANGUAGE: &str = "dotnet";

/// Whether the language names a .NET in-process flavor ("CSharp" or
/// "DotNetAssembly").
pub fn is_dotnet_language(language: &str) -> bool {
    language.eq_ignore_ascii_case("csharp") || language.eq_ignore_ascii_case("dotnetassembly")
}

/// Canonical lower-case form of a language for comparison purposes.
/// "CSharp" and "DotNetAssembly" fold into "dotnet".
pub fn alias_language(language: &str) -> String {
    if is_dotnet_language(language) {
        DOTNET_LANGUAGE.to_string()
    } else {
        language.to_ascii_lowercase()
    }
}

/// Returns the aliased languages of the functions that participate in
/// language comparison: proxies, codeless functions and functions without a
/// language are excluded.
fn comparable_languages(functions: &[FunctionMetadata]) -> impl Iterator<Item = String> + '_ {
    functions
        .iter()
        .filter(|f| !f.is_proxy() && !f.is_codeless)
        .filter_map(|f| f.language.as_deref())
        .filter(|l| !l.is_empty())
        .map(alias_language)
}

/// Decide whether the function set is single-language.
///
/// With an explicit runtime, the set is accepted when it has no comparable
/// functions or at least one of them matches the runtime after aliasing;
/// the worker for that runtime serves the matching functions. Without one,
/// all comparable functions must share one aliased language. A `None`
/// function list is an invalid argument.
pub fn is_single_language(
    functions: Option<&[FunctionMetadata]>,
    worker_runtime: Option<&str>,
) -> Result<bool, HostError> {
    let functions = functions
        .ok_or_else(|| HostError::InvalidArgument("function list must not be null".into()))?;

    match worker_runtime.filter(|r| !r.is_empty()) {
        Some(runtime) => {
            let runtime = alias_language(runtime);
            let mut comparable = comparable_languages(functions).peekable();
            Ok(comparable.peek().is_none() || comparable.any(|l| l == runtime))
        }
        None => {
            let mut distinct: Vec<String> = comparable_languages(functions).collect();
            distinct.sort();
            distinct.dedup();
            Ok(distinct.len() <= 1)
        }
    }
}

/// Whether at least one comparable function matches the given runtime.
pub fn contains_function_matching_runtime(
    functions: &[FunctionMetadata],
    worker_runtime: &str,
) -> bool {
    let runtime = alias_language(worker_runtime);
    comparable_languages(functions).any(|l| l == runtime)
}

/// Infer the worker runtime from metadata: the single aliased language
/// shared by all comparable functions, if there is exactly one.
pub fn worker_runtime_from_metadata(functions: &[FunctionMetadata]) -> Option<String> {
    let mut distinct: Vec<String> = comparable_languages(functions).collect();
    distinct.sort();
    distinct.dedup();
    match distinct.len() {
        1 => distinct.pop(),
        _ => None,
    }
}

/// The language-validation gate run during host initialization.
///
/// Skipped entirely in placeholder mode or when dispatch goes through a
/// generic HTTP worker; otherwise observes cancellation before any work,
/// then fails host-fatally when the function set contradicts the configured
/// runtime.
pub fn verify_functions_match_language(
    functions: &[FunctionMetadata],
    worker_runtime: Option<&str>,
    placeholder_mode: bool,
    http_worker: bool,
    cancel: &CancellationToken,
) -> Result<(), HostError> {
    if placeholder_mode || http_worker {
        return Ok(());
    }

    if cancel.is_cancelled() {
        return Err(HostError::Cancelled);
    }

    match worker_runtime.filter(|r| !r.is_empty()) {
        Some(runtime) => {
            if !is_single_language(Some(functions), Some(runtime))? {
                return Err(HostError::Initialization(format!(
                    "Did not find functions with language [{runtime}]."
                )));
            }
        }
        None => {
            if !is_single_language(Some(functions), None)? {
                return Err(HostError::Initialization(format!(
                    "Found functions with more than one language. Select a language for your \
                     function app by specifying {} AppSetting",
                    settings::FUNCTIONS_WORKER_RUNTIME
                )));
            }
        }
    }

    Ok(())
}
