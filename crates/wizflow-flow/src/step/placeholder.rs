//! Placeholder for unresolved templates

use super::{StepAction, StepInput, StepProps, StepRenderer, StepView};
use wizflow_resolver::MissingTemplate;

/// Stands in for a renderer that could not be resolved
///
/// Surfaces the missing id. Values are refused; a manual continue moves on
/// without binding anything.
#[derive(Debug, Clone)]
pub struct PlaceholderStep {
    missing: MissingTemplate,
}

impl PlaceholderStep {
    /// Create placeholder for a failed resolution
    #[must_use]
    pub fn new(missing: MissingTemplate) -> Self {
        Self { missing }
    }

    /// Diagnostic this placeholder was created from
    #[inline]
    #[must_use]
    pub fn missing(&self) -> &MissingTemplate {
        &self.missing
    }
}

impl StepRenderer for PlaceholderStep {
    fn id(&self) -> &str {
        "placeholder"
    }

    fn render(&self, props: &StepProps) -> StepView {
        let mut view = StepView::base(self.id(), props);
        view.body = format!("Missing template: {}", self.missing);
        view.submit_label = "Continue".to_string();
        view
    }

    fn handle(&self, _props: &StepProps, input: StepInput) -> StepAction {
        match input {
            StepInput::Back => StepAction::Previous,
            StepInput::Continue => StepAction::Submit(None),
            StepInput::Values(_) => StepAction::Stay(Some(format!(
                "no template registered for '{}'",
                self.missing.requested
            ))),
        }
    }
}
