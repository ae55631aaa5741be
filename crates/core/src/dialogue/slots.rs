use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Catch-all value of categorical slots. Never offered to the model.
pub const CATEGORICAL_OTHER_VALUE: &str = "__other__";

/// Rendered in prompts for slots without a value.
pub const UNDEFINED_SLOT_VALUE: &str = "undefined";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SlotType {
    Text,
    Bool,
    Float,
    Categorical { values: Vec<String> },
    List,
    Any,
}

impl SlotType {
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Bool => "bool",
            Self::Float => "float",
            Self::Categorical { .. } => "categorical",
            Self::List => "list",
            Self::Any => "any",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Slot {
    pub name: String,
    pub slot_type: SlotType,
    #[serde(default)]
    pub value: Option<Value>,
    /// True once the slot was set during the conversation, even if it has
    /// since been reset to no value.
    #[serde(default)]
    pub has_been_set: bool,
}

impl Slot {
    pub fn new(name: impl Into<String>, slot_type: SlotType) -> Self {
        Self { name: name.into(), slot_type, value: None, has_been_set: false }
    }

    pub fn with_value(mut self, value: Value) -> Self {
        self.value = Some(value);
        self.has_been_set = true;
        self
    }

    pub fn type_name(&self) -> &'static str {
        self.slot_type.type_name()
    }

    /// Values the model may choose from, formatted as a list literal.
    /// `None` means the slot is unconstrained.
    pub fn allowed_values(&self) -> Option<String> {
        match &self.slot_type {
            SlotType::Bool => Some("[True, False]".to_string()),
            SlotType::Categorical { values } => {
                let quoted = values
                    .iter()
                    .filter(|value| value.as_str() != CATEGORICAL_OTHER_VALUE)
                    .map(|value| quote_list_item(value))
                    .collect::<Vec<_>>();
                Some(format!("[{}]", quoted.join(", ")))
            }
            _ => None,
        }
    }
}

/// Quotes a list entry the way Python's `repr` quotes a string: single quotes
/// unless the text holds a single quote and no double quote.
fn quote_list_item(value: &str) -> String {
    let quote = if value.contains('\'') && !value.contains('"') { '"' } else { '\'' };
    let mut quoted = String::with_capacity(value.len() + 2);
    quoted.push(quote);
    for ch in value.chars() {
        match ch {
            '\\' => quoted.push_str("\\\\"),
            '\n' => quoted.push_str("\\n"),
            '\r' => quoted.push_str("\\r"),
            '\t' => quoted.push_str("\\t"),
            ch if ch == quote => {
                quoted.push('\\');
                quoted.push(ch);
            }
            ch => quoted.push(ch),
        }
    }
    quoted.push(quote);
    quoted
}

/// Text form of a slot value as shown in prompts.
pub fn slot_value_as_prompt_text(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => UNDEFINED_SLOT_VALUE.to_string(),
        Some(Value::String(text)) => text.clone(),
        Some(Value::Bool(true)) => "True".to_string(),
        Some(Value::Bool(false)) => "False".to_string(),
        Some(other) => other.to_string(),
    }
}
