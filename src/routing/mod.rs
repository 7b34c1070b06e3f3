//! HTTP trigger metadata and the route registry.

mod registry;
mod trigger;

pub use registry::{routes_conflict, RouteRegistry};
pub use trigger::{AuthLevel, HttpTrigger};
