//! Resolver error types
//!
//! Resolution itself never fails (see [`MissingTemplate`]); these cover
//! registry construction and pack registration.

use crate::category::Category;
use std::collections::BTreeMap;
use std::fmt::{self, Display, Formatter};

/// Registry errors
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    /// A pack with this name is already registered
    #[error("template pack '{0}' is already registered")]
    DuplicatePack(String),

    /// Fallback suffix pattern does not compile
    #[error("invalid fallback suffix pattern: {0}")]
    InvalidPattern(#[from] regex::Error),
}

/// Diagnostic attached to a failed resolution
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingTemplate {
    /// Category searched
    pub category: Category,
    /// Id as requested
    pub requested: String,
    /// Id retried after suffix stripping, if any
    pub attempted_fallback: Option<String>,
    /// Ids registered per category at the time of the failure
    pub available: BTreeMap<Category, Vec<String>>,
}

impl Display for MissingTemplate {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "no {} registered for '{}'", self.category, self.requested)?;
        if let Some(fallback) = &self.attempted_fallback {
            write!(f, " (also tried '{fallback}')")?;
        }
        let available = self
            .available
            .get(&self.category)
            .map(|ids| ids.join(", "))
            .unwrap_or_default();
        write!(f, "; available: [{available}]")
    }
}
