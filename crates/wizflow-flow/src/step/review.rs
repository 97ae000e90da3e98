//! Review step

use super::{StepAction, StepInput, StepProps, StepRenderer, StepView};
use crate::attrs::{NodeAttrs, ReviewAttrs};
use wizflow_context::{ContextObject, ContextValue};

/// Shows previously collected values and submits them as one object
///
/// The submitted object is keyed by the dotted source path. Missing sources
/// are left out.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReviewStep;

impl ReviewStep {
    fn collect(attrs: &ReviewAttrs, props: &StepProps) -> ContextObject {
        let Some(tree) = &props.context else {
            return ContextObject::new();
        };
        attrs
            .source_paths
            .iter()
            .filter_map(|path| {
                tree.get_path(path)
                    .map(|value| (path.to_string(), value.clone()))
            })
            .collect()
    }
}

impl StepRenderer for ReviewStep {
    fn id(&self) -> &str {
        "review-step"
    }

    fn render(&self, props: &StepProps) -> StepView {
        let mut view = StepView::base(self.id(), props);
        let NodeAttrs::Review(review) = &props.node.attrs else {
            return view;
        };

        view.body = match &review.template {
            Some(template) => props.interpolate(template),
            None => Self::collect(review, props)
                .iter()
                .map(|(path, value)| format!("{path}: {}", value.render()))
                .collect::<Vec<_>>()
                .join("\n"),
        };
        view
    }

    fn handle(&self, props: &StepProps, input: StepInput) -> StepAction {
        match input {
            StepInput::Back => StepAction::Previous,
            StepInput::Continue | StepInput::Values(_) => match &props.node.attrs {
                NodeAttrs::Review(review) => {
                    StepAction::Submit(Some(ContextValue::Object(Self::collect(review, props))))
                }
                _ => StepAction::Submit(None),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::step::test_props::props;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn review_props(template: Option<&str>) -> StepProps {
        props(
            NodeAttrs::Review(ReviewAttrs {
                source_paths: vec![
                    "form.q1.answer".parse().unwrap(),
                    "form.q2.answer".parse().unwrap(),
                    "form.missing".parse().unwrap(),
                ],
                template: template.map(str::to_string),
            }),
            json!({"form": {"q1": {"answer": "A"}, "q2": {"answer": "B"}}}),
        )
    }

    #[test]
    fn submits_collected_sources() {
        assert_eq!(
            ReviewStep.handle(&review_props(None), StepInput::Continue),
            StepAction::Submit(Some(
                json!({"form.q1.answer": "A", "form.q2.answer": "B"}).into()
            ))
        );
    }

    #[test]
    fn renders_template_when_present() {
        let template = "{{form.q1.answer}} then {{form.q2.answer}}";
        let view = ReviewStep.render(&review_props(Some(template)));
        assert_eq!(view.body, "A then B");
    }

    #[test]
    fn renders_listing_without_template() {
        let view = ReviewStep.render(&review_props(None));
        assert_eq!(view.body, "form.q1.answer: A\nform.q2.answer: B");
    }
}
