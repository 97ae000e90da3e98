//! Wizard session
//!
//! Bundles one store handle, a shared resolver and a navigator for one
//! scenario of one workspace. Async steps go through [`RequestTicket`]s so a
//! response that arrives after the user moved on is discarded instead of
//! being bound to the wrong node.

use crate::error::{FlowError, LlmError};
use crate::llm::LlmClient;
use crate::model::Workspace;
use crate::navigator::{IgnoreReason, Navigator, Transition};
use crate::step::{
    resolve_step, LlmQueryStep, PlaceholderStep, SharedRenderer, StepAction, StepInput, StepProps,
    StepResolver, StepView,
};
use serde::Serialize;
use std::fmt::{self, Debug, Display, Formatter};
use std::sync::Arc;
use ulid::Ulid;
use wizflow_context::{ContextStore, ContextValue, WorkspaceId};
use wizflow_resolver::{Category, MissingTemplate};

/// Handle on an in-flight async request
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestTicket {
    /// Unique request id
    pub id: Ulid,
    /// Node the request was issued for
    pub node_id: String,
    /// Navigator index at issue time
    pub index: usize,
    /// Navigator epoch at issue time
    pub epoch: u64,
}

impl Display for RequestTicket {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}#{}", self.id, self.node_id, self.epoch)
    }
}

/// Current node with its renderer and props
#[derive(Debug, Clone)]
pub struct CurrentStep {
    /// Renderer inputs
    pub props: StepProps,
    /// Resolved renderer, or a placeholder
    pub renderer: SharedRenderer,
    /// Id that matched in the resolver
    pub resolved_id: Option<String>,
    /// Diagnostic when the renderer is a placeholder
    pub missing: Option<MissingTemplate>,
}

impl CurrentStep {
    /// Render the step
    #[must_use]
    pub fn view(&self) -> StepView {
        self.renderer.render(&self.props)
    }

    /// Ask the renderer what an input means
    #[must_use]
    pub fn handle(&self, input: StepInput) -> StepAction {
        self.renderer.handle(&self.props, input)
    }

    /// Check if the renderer is a placeholder
    #[inline]
    #[must_use]
    pub fn is_placeholder(&self) -> bool {
        self.missing.is_some()
    }
}

/// What an input led to
#[derive(Debug, Clone, PartialEq)]
pub struct StepOutcome {
    /// Renderer's answer
    pub action: StepAction,
    /// Navigation result; `None` when the renderer chose to stay
    pub transition: Option<Transition>,
}

/// One user walking one scenario
pub struct WizardSession {
    store: ContextStore,
    resolver: Arc<StepResolver>,
    workspace_id: WorkspaceId,
    system_message: Option<String>,
    navigator: Navigator,
}

impl Debug for WizardSession {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("WizardSession")
            .field("workspace_id", &self.workspace_id)
            .field("scenario_id", &self.navigator.scenario_id())
            .field("index", &self.navigator.current_index())
            .field("epoch", &self.navigator.epoch())
            .finish_non_exhaustive()
    }
}

impl WizardSession {
    /// Open `scenario_id` of `workspace`
    ///
    /// Creates the workspace's context namespace from `initialContext` if it
    /// does not exist yet; existing data is kept.
    ///
    /// # Errors
    /// Returns error if the scenario does not exist.
    pub fn open(
        workspace: &Workspace,
        scenario_id: &str,
        store: ContextStore,
        resolver: Arc<StepResolver>,
    ) -> Result<Self, FlowError> {
        let scenario = workspace
            .scenario(scenario_id)
            .ok_or_else(|| FlowError::UnknownScenario {
                workspace_id: workspace.id.clone(),
                scenario_id: scenario_id.to_string(),
            })?;

        let _ = store.ensure_workspace(&workspace.id, workspace.initial_context.clone());
        let navigator = Navigator::new(store.clone(), workspace.id.clone(), scenario);

        tracing::info!(
            workspace = %workspace.id,
            scenario = scenario_id,
            nodes = navigator.len(),
            "wizard session opened"
        );

        Ok(Self {
            store,
            resolver,
            workspace_id: workspace.id.clone(),
            system_message: scenario.system_message.clone(),
            navigator,
        })
    }

    /// Navigator state
    #[inline]
    #[must_use]
    pub fn navigator(&self) -> &Navigator {
        &self.navigator
    }

    /// Store handle
    #[inline]
    #[must_use]
    pub fn store(&self) -> &ContextStore {
        &self.store
    }

    /// Workspace being edited
    #[inline]
    #[must_use]
    pub fn workspace_id(&self) -> &WorkspaceId {
        &self.workspace_id
    }

    /// Current workspace context tree
    #[must_use]
    pub fn context(&self) -> Option<ContextValue> {
        self.store.tree(&self.workspace_id)
    }

    /// Current node, its renderer and props
    ///
    /// The renderer is looked up by `tplFile`, then by the node type's
    /// default step; a placeholder stands in when both fail.
    #[must_use]
    pub fn current_step(&self) -> Option<CurrentStep> {
        let node = self.navigator.current_node()?.clone();
        let props = StepProps {
            is_first_node: self.navigator.is_first_node(),
            is_last_node: self.navigator.is_last_node(),
            context: self.context(),
            system_message: self.system_message.clone(),
            node,
        };

        let resolution = resolve_step(&self.resolver, &props.node);

        let (renderer, missing) = match (resolution.component, resolution.diagnostic) {
            (Some(renderer), _) => (renderer, None),
            (None, diagnostic) => {
                let missing = diagnostic.unwrap_or_else(|| MissingTemplate {
                    category: Category::FlowStep,
                    requested: props.node.tpl_file.clone(),
                    attempted_fallback: None,
                    available: self.resolver.available_ids(),
                });
                let placeholder: SharedRenderer = Arc::new(PlaceholderStep::new(missing.clone()));
                (placeholder, Some(missing))
            }
        };

        Some(CurrentStep {
            props,
            renderer,
            resolved_id: resolution.resolved_id,
            missing,
        })
    }

    /// Route a renderer action to the navigator
    ///
    /// `Stay` returns `None`.
    pub fn dispatch(&mut self, action: StepAction) -> Option<Transition> {
        match action {
            StepAction::Submit(result) => Some(self.navigator.submit(result)),
            StepAction::Previous => Some(self.navigator.back()),
            StepAction::Stay(message) => {
                tracing::debug!(message = message.as_deref().unwrap_or(""), "step stayed");
                None
            }
        }
    }

    /// Let the current renderer interpret `input`, then dispatch
    pub fn handle_input(&mut self, input: StepInput) -> StepOutcome {
        let Some(step) = self.current_step() else {
            return StepOutcome {
                action: StepAction::Stay(None),
                transition: Some(Transition::Ignored(IgnoreReason::Empty)),
            };
        };
        let action = step.handle(input);
        let transition = self.dispatch(action.clone());
        StepOutcome { action, transition }
    }

    /// Issue a ticket for an async request on the current node
    #[must_use]
    pub fn begin_request(&self) -> Option<RequestTicket> {
        let node = self.navigator.current_node()?;
        let ticket = RequestTicket {
            id: Ulid::new(),
            node_id: node.id.clone(),
            index: self.navigator.current_index(),
            epoch: self.navigator.epoch(),
        };
        tracing::debug!(%ticket, "request issued");
        Some(ticket)
    }

    /// Submit the result of a ticketed request
    ///
    /// Discarded with `Ignored(StaleRequest)` if any transition happened
    /// since the ticket was issued.
    pub fn complete_request(
        &mut self,
        ticket: &RequestTicket,
        result: Option<ContextValue>,
    ) -> Transition {
        let moved = ticket.epoch != self.navigator.epoch()
            || ticket.index != self.navigator.current_index();
        if moved {
            tracing::warn!(%ticket, epoch = self.navigator.epoch(), "late response discarded");
            return Transition::Ignored(IgnoreReason::StaleRequest);
        }
        self.navigator.submit_for(&ticket.node_id, result)
    }

    /// Run the current llmQuery node through `client`
    ///
    /// # Errors
    /// Returns error if the current node is not an llmQuery node or the
    /// client fails; no transition happens in that case.
    pub async fn run_llm_step(&mut self, client: &dyn LlmClient) -> Result<Transition, LlmError> {
        let step = self.current_step().ok_or(LlmError::NoCurrentNode)?;
        let crate::attrs::NodeAttrs::LlmQuery(query) = &step.props.node.attrs else {
            return Err(LlmError::NotAnLlmStep(step.props.node.id.clone()));
        };
        let request = LlmQueryStep::request(&step.props)
            .ok_or_else(|| LlmError::NotAnLlmStep(step.props.node.id.clone()))?;
        let ticket = self.begin_request().ok_or(LlmError::NoCurrentNode)?;

        let completion = client.complete(&request).await.map_err(|err| {
            tracing::warn!(%ticket, error = %err, "llm request failed");
            err
        })?;
        if completion.trim().is_empty() {
            return Err(LlmError::EmptyCompletion);
        }

        let result = LlmQueryStep::bind(query, completion.into());
        Ok(self.complete_request(&ticket, Some(result)))
    }
}
