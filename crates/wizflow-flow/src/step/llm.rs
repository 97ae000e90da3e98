//! LLM query step

use super::{StepAction, StepInput, StepProps, StepRenderer, StepView};
use crate::attrs::{LlmQueryAttrs, NodeAttrs};
use crate::llm::LlmRequest;
use wizflow_context::{ContextObject, ContextValue};

/// Builds a prompt from the context and binds the completion
///
/// The completion arrives as [`StepInput::Values`]; with an `outputKey` it
/// is wrapped as `{outputKey: text}`. A bare continue waits.
#[derive(Debug, Clone, Copy, Default)]
pub struct LlmQueryStep;

impl LlmQueryStep {
    /// Request for the current node, `None` if it is not an llmQuery node
    #[must_use]
    pub fn request(props: &StepProps) -> Option<LlmRequest> {
        let NodeAttrs::LlmQuery(query) = &props.node.attrs else {
            return None;
        };
        let system = query
            .system_message
            .as_ref()
            .or(props.system_message.as_ref())
            .map(|message| props.interpolate(message));

        Some(LlmRequest {
            node_id: props.node.id.clone(),
            system,
            prompt: props.interpolate(&query.prompt_template),
            temperature: query.temperature,
        })
    }

    /// Shape a completion into the node result
    #[must_use]
    pub fn bind(attrs: &LlmQueryAttrs, completion: ContextValue) -> ContextValue {
        match &attrs.output_key {
            Some(key) => {
                let mut map = ContextObject::new();
                map.insert(key.clone(), completion);
                ContextValue::Object(map)
            }
            None => completion,
        }
    }
}

impl StepRenderer for LlmQueryStep {
    fn id(&self) -> &str {
        "llm-query-step"
    }

    fn render(&self, props: &StepProps) -> StepView {
        let mut view = StepView::base(self.id(), props);
        if let Some(request) = Self::request(props) {
            view.body = request.prompt;
        }
        view.submit_label = if props.is_last_node {
            "Accept and finish"
        } else {
            "Accept"
        }
        .to_string();
        view
    }

    fn handle(&self, props: &StepProps, input: StepInput) -> StepAction {
        match input {
            StepInput::Back => StepAction::Previous,
            StepInput::Continue => StepAction::Stay(Some("waiting for a completion".to_string())),
            StepInput::Values(completion) => match &props.node.attrs {
                NodeAttrs::LlmQuery(query) => {
                    StepAction::Submit(Some(Self::bind(query, completion)))
                }
                _ => StepAction::Submit(Some(completion)),
            },
        }
    }
}
