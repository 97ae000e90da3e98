//! Wizflow Resolver - symbolic template resolution
//!
//! Maps `(category, symbolic id)` to a concrete component across a
//! prioritized set of [`TemplatePack`]s, with:
//! - Memoization of hits in a bounded cache
//! - One-shot suffix fallback for flow steps (`chart-dark` → `chart`)
//! - A [`MissingTemplate`] diagnostic instead of an error on total failure
//!
//! The component type is generic; the flow crate uses shared step renderers.

#![warn(unreachable_pub)]

pub mod category;
pub mod config;
pub mod error;
pub mod pack;
pub mod resolver;

pub use category::{Category, NodeType};
pub use config::{ResolverConfig, DEFAULT_SUFFIX_PATTERN};
pub use error::{MissingTemplate, RegistryError};
pub use pack::TemplatePack;
pub use resolver::{CacheStats, Resolution, Resolver};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
