//! Form collection step

use super::{StepAction, StepInput, StepProps, StepRenderer, StepView};
use crate::attrs::{FieldType, FormField, NodeAttrs};
use wizflow_context::{ContextObject, ContextValue};

/// Collects field values and submits them as one object
///
/// Only declared fields are kept. Required fields must be non-empty; select
/// fields must hold one of their options; number fields accept numeric
/// strings.
#[derive(Debug, Clone, Copy, Default)]
pub struct FormStep;

impl StepRenderer for FormStep {
    fn id(&self) -> &str {
        "form-step"
    }

    fn render(&self, props: &StepProps) -> StepView {
        let mut view = StepView::base(self.id(), props);
        if let NodeAttrs::Form(form) = &props.node.attrs {
            view.fields = form
                .fields
                .iter()
                .map(|field| FormField {
                    label: props.interpolate(&field.label),
                    ..field.clone()
                })
                .collect();
            if let Some(label) = &form.submit_label {
                view.submit_label = props.interpolate(label);
            }
        }
        view
    }

    fn handle(&self, props: &StepProps, input: StepInput) -> StepAction {
        let values = match input {
            StepInput::Back => return StepAction::Previous,
            StepInput::Continue => ContextObject::new(),
            StepInput::Values(ContextValue::Object(map)) => map,
            StepInput::Values(_) => {
                return StepAction::Stay(Some("form input must be an object".to_string()))
            }
        };

        let NodeAttrs::Form(form) = &props.node.attrs else {
            return StepAction::Submit(Some(ContextValue::Object(values)));
        };
        if form.fields.is_empty() {
            return StepAction::Submit(Some(ContextValue::Object(values)));
        }

        let mut result = ContextObject::new();
        let mut problems = Vec::new();
        for field in &form.fields {
            match check_field(field, values.get(&field.name)) {
                Ok(Some(value)) => {
                    result.insert(field.name.clone(), value);
                }
                Ok(None) => {}
                Err(problem) => problems.push(problem),
            }
        }

        if problems.is_empty() {
            StepAction::Submit(Some(ContextValue::Object(result)))
        } else {
            StepAction::Stay(Some(problems.join("; ")))
        }
    }
}

fn is_blank(value: &ContextValue) -> bool {
    match value {
        ContextValue::Null => true,
        ContextValue::String(s) => s.trim().is_empty(),
        _ => false,
    }
}

fn check_field(
    field: &FormField,
    value: Option<&ContextValue>,
) -> Result<Option<ContextValue>, String> {
    let Some(value) = value.filter(|v| !is_blank(v)) else {
        return if field.required {
            Err(format!("'{}' is required", display_name(field)))
        } else {
            Ok(None)
        };
    };

    match field.field_type {
        FieldType::Number => match value {
            ContextValue::Number(_) => Ok(Some(value.clone())),
            ContextValue::String(s) => s
                .trim()
                .parse::<serde_json::Number>()
                .map(|n| Some(ContextValue::Number(n)))
                .map_err(|_| format!("'{}' must be a number", display_name(field))),
            _ => Err(format!("'{}' must be a number", display_name(field))),
        },
        FieldType::Checkbox => match value {
            ContextValue::Bool(_) => Ok(Some(value.clone())),
            ContextValue::String(s) if &**s == "true" => Ok(Some(true.into())),
            ContextValue::String(s) if &**s == "false" => Ok(Some(false.into())),
            _ => Err(format!("'{}' must be true or false", display_name(field))),
        },
        FieldType::Select if !field.options.is_empty() => {
            let chosen = value.as_str().unwrap_or_default();
            if field.options.iter().any(|o| o == chosen) {
                Ok(Some(value.clone()))
            } else {
                Err(format!(
                    "'{}' must be one of: {}",
                    display_name(field),
                    field.options.join(", ")
                ))
            }
        }
        FieldType::Text | FieldType::Textarea | FieldType::Select => Ok(Some(value.clone())),
    }
}

fn display_name(field: &FormField) -> &str {
    if field.label.is_empty() {
        &field.name
    } else {
        &field.label
    }
}
