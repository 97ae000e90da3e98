//! Wizflow Context - workspace-scoped context store
//!
//! Holds one JSON-like context tree per workspace and provides:
//! - Dot-path reads and copy-on-write writes with structural sharing
//! - Idempotent writes (deep-equal values produce no new snapshot)
//! - Change subscriptions and a bounded change tracker
//! - `{{dotted.path}}` interpolation
//!
//! # Example
//!
//! ```rust
//! use serde_json::json;
//! use wizflow_context::{ContextStore, WorkspaceId};
//!
//! let store = ContextStore::new();
//! let ws = WorkspaceId::new("acme");
//! let _ = store.insert_workspace(&ws, json!({"campaign": {"name": "Spring"}}));
//! let _ = store.update_by_context_path(&ws, "campaign.settings.budget", 1200_i64);
//!
//! assert_eq!(
//!     store.interpolate("{{campaign.name}}: {{ campaign.settings.budget }}", &ws),
//!     "Spring: 1200"
//! );
//! ```

#![warn(unreachable_pub)]

pub mod change;
pub mod diagnostic;
pub mod error;
pub mod path;
pub mod store;
pub mod template;
pub mod tracker;
pub mod value;

pub use change::{ChangeScope, ContextChange, Listener, SubscriptionId};
pub use diagnostic::{DropReason, StoreDiagnostic, WriteOutcome};
pub use error::{ContextError, Result};
pub use path::{ContextPath, PathError};
pub use store::{ContextStore, Snapshot, WorkspaceId};
pub use tracker::{ChangeRecord, ChangeTracker, DiffKind, PathDiff, TrackerConfig};
pub use value::{ContextObject, ContextValue};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
