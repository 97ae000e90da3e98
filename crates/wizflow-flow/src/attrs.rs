//! Typed node attributes
//!
//! `attrs` is a union tagged by `kind`. Kinds unknown to the engine are kept
//! verbatim as [`NodeAttrs::Custom`] so custom renderers can read them.
//! The navigator never looks inside; renderers do.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};
use wizflow_context::ContextPath;

pub use wizflow_resolver::NodeType;

/// Input widget of a form field
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FieldType {
    /// Single-line text
    #[default]
    Text,
    /// Multi-line text
    Textarea,
    /// Number
    Number,
    /// One of `options`
    Select,
    /// Boolean
    Checkbox,
}

/// One field of a form step
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormField {
    /// Key in the submitted object
    pub name: String,
    /// Prompt shown to the user
    #[serde(default)]
    pub label: String,
    /// Widget type
    #[serde(default)]
    pub field_type: FieldType,
    /// Submission is refused while this field is empty
    #[serde(default)]
    pub required: bool,
    /// Hint text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    /// Choices for `select`
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<String>,
}

impl FormField {
    /// Create optional text field
    #[must_use]
    pub fn new(name: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            label: label.into(),
            field_type: FieldType::Text,
            required: false,
            placeholder: None,
            options: Vec::new(),
        }
    }

    /// Mark as required
    #[inline]
    #[must_use]
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Set widget type
    #[inline]
    #[must_use]
    pub fn with_type(mut self, field_type: FieldType) -> Self {
        self.field_type = field_type;
        self
    }

    /// Set choices
    #[inline]
    #[must_use]
    pub fn with_options(mut self, options: Vec<String>) -> Self {
        self.options = options;
        self
    }
}

/// Attributes of a form step
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormAttrs {
    /// Fields in display order
    #[serde(default)]
    pub fields: Vec<FormField>,
    /// Label of the submit action
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub submit_label: Option<String>,
}

/// Attributes of an LLM query step
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LlmQueryAttrs {
    /// Prompt with `{{path}}` tokens
    pub prompt_template: String,
    /// Overrides the scenario system message
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_message: Option<String>,
    /// Wrap the completion as `{outputKey: text}`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_key: Option<String>,
    /// Sampling temperature forwarded to the client
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
}

/// Attributes of a review step
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewAttrs {
    /// Context values collected for review
    #[serde(default)]
    pub source_paths: Vec<ContextPath>,
    /// Summary with `{{path}}` tokens
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template: Option<String>,
}

/// Attributes of an info step
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InfoAttrs {
    /// Text with `{{path}}` tokens
    #[serde(default)]
    pub content: String,
}

/// Attributes of a kind the engine does not know
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomAttrs {
    /// Original `kind` tag
    pub kind: String,
    /// Remaining fields
    pub data: Map<String, Value>,
}

impl Default for CustomAttrs {
    fn default() -> Self {
        Self {
            kind: "custom".to_string(),
            data: Map::new(),
        }
    }
}

/// Step-kind specific node attributes
#[derive(Debug, Clone, PartialEq)]
pub enum NodeAttrs {
    /// Form collection
    Form(FormAttrs),
    /// LLM-backed generation
    LlmQuery(LlmQueryAttrs),
    /// Review of collected values
    Review(ReviewAttrs),
    /// Static content
    Info(InfoAttrs),
    /// Unknown kind, kept verbatim
    Custom(CustomAttrs),
}

impl Default for NodeAttrs {
    fn default() -> Self {
        Self::Custom(CustomAttrs::default())
    }
}

impl NodeAttrs {
    /// Coarse node type
    #[must_use]
    pub fn node_type(&self) -> NodeType {
        match self {
            Self::Form(_) => NodeType::Form,
            Self::LlmQuery(_) => NodeType::LlmQuery,
            Self::Review(_) => NodeType::Review,
            Self::Info(_) => NodeType::Info,
            Self::Custom(_) => NodeType::Custom,
        }
    }

    /// `kind` tag as written in files
    #[must_use]
    pub fn kind(&self) -> &str {
        match self {
            Self::Form(_) => "form",
            Self::LlmQuery(_) => "llmQuery",
            Self::Review(_) => "review",
            Self::Info(_) => "info",
            Self::Custom(custom) => &custom.kind,
        }
    }

    fn to_value(&self) -> Result<Value, serde_json::Error> {
        let body = match self {
            Self::Form(a) => serde_json::to_value(a)?,
            Self::LlmQuery(a) => serde_json::to_value(a)?,
            Self::Review(a) => serde_json::to_value(a)?,
            Self::Info(a) => serde_json::to_value(a)?,
            Self::Custom(a) => Value::Object(a.data.clone()),
        };
        let mut map = match body {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        map.insert("kind".to_string(), Value::String(self.kind().to_string()));
        Ok(Value::Object(map))
    }

    fn from_value(value: Value) -> Result<Self, serde_json::Error> {
        let mut map = match value {
            Value::Object(map) => map,
            Value::Null => return Ok(Self::default()),
            other => {
                return Err(serde::de::Error::custom(format!(
                    "node attrs must be an object, got {other}"
                )))
            }
        };
        let kind = match map.remove("kind") {
            Some(Value::String(kind)) => kind,
            Some(other) => {
                return Err(serde::de::Error::custom(format!(
                    "attrs kind must be a string, got {other}"
                )))
            }
            None => "custom".to_string(),
        };

        let body = Value::Object(map);
        Ok(match kind.as_str() {
            "form" => Self::Form(serde_json::from_value(body)?),
            "llmQuery" => Self::LlmQuery(serde_json::from_value(body)?),
            "review" => Self::Review(serde_json::from_value(body)?),
            "info" => Self::Info(serde_json::from_value(body)?),
            _ => match body {
                Value::Object(data) => Self::Custom(CustomAttrs { kind, data }),
                _ => Self::Custom(CustomAttrs {
                    kind,
                    data: Map::new(),
                }),
            },
        })
    }
}

impl Serialize for NodeAttrs {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_value()
            .map_err(serde::ser::Error::custom)?
            .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for NodeAttrs {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Self::from_value(value).map_err(serde::de::Error::custom)
    }
}
