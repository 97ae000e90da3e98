//! Testing utilities for wizflow workspace
//!
//! Shared fixtures, fake LLM clients and assertions.

#![allow(missing_docs)]

use parking_lot::Mutex;
use serde_json::json;
use std::collections::VecDeque;
use std::sync::Arc;
use wizflow_context::{ContextStore, WorkspaceId};
use wizflow_flow::{
    builtin_pack, FormAttrs, FormField, InfoAttrs, LlmClient, LlmError, LlmQueryAttrs, LlmRequest,
    Node, NodeAttrs, ReviewAttrs, Scenario, StepResolver, WizardSession, Workspace,
};

pub const WORKSPACE_ID: &str = "acme";
pub const TWO_STEP: &str = "two-step";
pub const CAMPAIGN: &str = "campaign";

pub fn workspace_id() -> WorkspaceId {
    WorkspaceId::new(WORKSPACE_ID)
}

pub fn answer_form() -> NodeAttrs {
    NodeAttrs::Form(FormAttrs {
        fields: vec![FormField::new("answer", "Answer").required()],
        submit_label: None,
    })
}

/// `q1 → form.q1`, `q2 → form.q2`, both single-field forms
pub fn two_step_scenario() -> Scenario {
    Scenario::new(TWO_STEP)
        .with_node(
            Node::new("q1", "form-step")
                .with_label("Question 1")
                .with_context_path("form.q1".parse().unwrap())
                .with_attrs(answer_form())
                .with_order(1),
        )
        .with_node(
            Node::new("q2", "form-step")
                .with_label("Question 2")
                .with_context_path("form.q2".parse().unwrap())
                .with_attrs(answer_form())
                .with_order(2),
        )
}

/// Form → LLM → review → info
pub fn campaign_scenario() -> Scenario {
    Scenario::new(CAMPAIGN)
        .with_system_message("You write marketing copy for {{brand.name}}.")
        .with_node(
            Node::new("basics", "form-step")
                .with_label("Campaign basics")
                .with_context_path("campaign.basics".parse().unwrap())
                .with_attrs(NodeAttrs::Form(FormAttrs {
                    fields: vec![
                        FormField::new("product", "Product").required(),
                        FormField::new("audience", "Audience"),
                    ],
                    submit_label: None,
                }))
                .with_order(1),
        )
        .with_node(
            Node::new("slogan", "llm-query-step-dark")
                .with_label("Slogan")
                .with_context_path("campaign.copy".parse().unwrap())
                .with_attrs(NodeAttrs::LlmQuery(LlmQueryAttrs {
                    prompt_template: "Slogan for {{campaign.basics.product}} aimed at {{campaign.basics.audience}}"
                        .to_string(),
                    output_key: Some("slogan".to_string()),
                    ..LlmQueryAttrs::default()
                }))
                .with_order(2),
        )
        .with_node(
            Node::new("review", "review-step")
                .with_label("Review")
                .with_context_path("campaign.review".parse().unwrap())
                .with_attrs(NodeAttrs::Review(ReviewAttrs {
                    source_paths: vec![
                        "campaign.basics.product".parse().unwrap(),
                        "campaign.copy.slogan".parse().unwrap(),
                    ],
                    template: Some(
                        "{{campaign.basics.product}}: {{campaign.copy.slogan}}".to_string(),
                    ),
                }))
                .with_order(3),
        )
        .with_node(
            Node::new("done", "info-step")
                .with_label("Done")
                .with_attrs(NodeAttrs::Info(InfoAttrs {
                    content: "Campaign for {{brand.name}} is ready.".to_string(),
                }))
                .with_order(4),
        )
}

pub fn sample_workspace() -> Workspace {
    Workspace::new(WORKSPACE_ID)
        .with_name("Acme")
        .with_initial_context(json!({"brand": {"name": "Acme"}}))
        .with_scenario(two_step_scenario())
        .with_scenario(campaign_scenario())
}

pub fn sample_workspace_json() -> String {
    serde_json::to_string_pretty(&sample_workspace()).unwrap()
}

pub fn builtin_resolver() -> Arc<StepResolver> {
    Arc::new(StepResolver::with_packs([builtin_pack()]).unwrap())
}

pub fn open_session(scenario_id: &str) -> WizardSession {
    WizardSession::open(
        &sample_workspace(),
        scenario_id,
        ContextStore::new(),
        builtin_resolver(),
    )
    .unwrap()
}

/// LLM client answering from a script, recording every request
#[derive(Debug, Default)]
pub struct ScriptedClient {
    replies: Mutex<VecDeque<Result<String, LlmError>>>,
    requests: Mutex<Vec<LlmRequest>>,
}

impl ScriptedClient {
    pub fn new(replies: impl IntoIterator<Item = Result<String, LlmError>>) -> Self {
        Self {
            replies: Mutex::new(replies.into_iter().collect()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn replying(text: &str) -> Self {
        Self::new([Ok(text.to_string())])
    }

    pub fn failing(message: &str) -> Self {
        Self::new([Err(LlmError::Upstream(message.to_string()))])
    }

    pub fn requests(&self) -> Vec<LlmRequest> {
        self.requests.lock().clone()
    }
}

#[async_trait::async_trait]
impl LlmClient for ScriptedClient {
    async fn complete(&self, request: &LlmRequest) -> Result<String, LlmError> {
        self.requests.lock().push(request.clone());
        self.replies
            .lock()
            .pop_front()
            .unwrap_or_else(|| Err(LlmError::Upstream("script exhausted".to_string())))
    }
}
