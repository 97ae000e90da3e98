//! Wizflow Flow - linear wizard engine
//!
//! Walks the ordered nodes of a scenario, binds each node's result into the
//! workspace context and resolves each node's renderer:
//! - [`Workspace`], [`Scenario`], [`Node`] and typed [`NodeAttrs`]
//! - [`Navigator`] for advance/back/terminate decisions
//! - Built-in step renderers and the [`StepRenderer`] contract
//! - [`WizardSession`] tying store, resolver and navigator together
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use wizflow_context::ContextStore;
//! use wizflow_flow::{EngineConfig, Node, Scenario, StepAction, WizardSession, Workspace};
//!
//! # fn main() -> Result<(), wizflow_flow::FlowError> {
//! let workspace = Workspace::new("acme").with_scenario(
//!     Scenario::new("intro")
//!         .with_node(Node::new("q1", "form-step").with_context_path("form.q1".parse()?)),
//! );
//! let resolver = Arc::new(EngineConfig::default().build_resolver()?);
//! let mut session = WizardSession::open(&workspace, "intro", ContextStore::new(), resolver)?;
//!
//! let _ = session.dispatch(StepAction::Submit(Some("A".into())));
//! assert_eq!(session.store().get_context(&"acme".into(), Some("form.q1")), Some("A".into()));
//! # Ok(())
//! # }
//! ```

#![warn(unreachable_pub)]

pub mod attrs;
pub mod config;
pub mod error;
pub mod llm;
pub mod model;
pub mod navigator;
pub mod session;
pub mod step;

pub use attrs::{
    CustomAttrs, FieldType, FormAttrs, FormField, InfoAttrs, LlmQueryAttrs, NodeAttrs, NodeType,
    ReviewAttrs,
};
pub use config::{EngineConfig, LogConfig};
pub use error::{FlowError, LlmError, Result};
pub use llm::{EchoClient, LlmClient, LlmRequest};
pub use model::{Node, Scenario, Workspace};
pub use navigator::{IgnoreReason, Navigator, Transition};
pub use session::{CurrentStep, RequestTicket, StepOutcome, WizardSession};
pub use step::{
    builtin_pack, resolve_step, FormStep, InfoStep, LlmQueryStep, PlaceholderStep, ReviewStep,
    SharedRenderer, StepAction, StepInput, StepProps, StepRenderer, StepResolver, StepView,
    BUILTIN_PACK,
};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
