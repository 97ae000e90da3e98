//! Informational step

use super::{StepAction, StepInput, StepProps, StepRenderer, StepView};
use crate::attrs::NodeAttrs;

/// Shows interpolated content; any forward input submits with no result
#[derive(Debug, Clone, Copy, Default)]
pub struct InfoStep;

impl StepRenderer for InfoStep {
    fn id(&self) -> &str {
        "info-step"
    }

    fn render(&self, props: &StepProps) -> StepView {
        let mut view = StepView::base(self.id(), props);
        if let NodeAttrs::Info(info) = &props.node.attrs {
            view.body = props.interpolate(&info.content);
        }
        view
    }

    fn handle(&self, _props: &StepProps, input: StepInput) -> StepAction {
        match input {
            StepInput::Back => StepAction::Previous,
            StepInput::Continue | StepInput::Values(_) => StepAction::Submit(None),
        }
    }
}
