//! Typed steps of a dialogue flow and their persisted JSON form.
//!
//! A step is stored as one JSON object. The variant is picked by the key that
//! only that variant has (`action`, `set_slots`, `collect`,
//! `generation_prompt`, `link`); objects with none of them are generic
//! branching steps.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::links::FlowLinks;
use crate::errors::FlowError;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawFlowStep")]
pub struct FlowStep {
    pub id: String,
    /// Position inside the owning flow. Stamped when the flow is assembled
    /// and never serialized.
    #[serde(skip)]
    pub idx: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "FlowLinks::is_empty")]
    pub next: FlowLinks,
    #[serde(flatten)]
    pub kind: StepKind,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum StepKind {
    Action(ActionStep),
    SetSlots(SetSlotsStep),
    CollectInformation(CollectInformationStep),
    GenerateResponse(GenerateResponseStep),
    Link(LinkStep),
    Generic(GenericStep),
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionStep {
    pub action: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SetSlotsStep {
    #[serde(rename = "set_slots", with = "slot_assignments")]
    pub slots: Vec<SlotAssignment>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct SlotAssignment {
    pub key: String,
    pub value: Value,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectInformationStep {
    pub collect: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub utter: Option<String>,
    #[serde(default)]
    pub ask_before_filling: bool,
    #[serde(default = "default_reset_after_flow_ends")]
    pub reset_after_flow_ends: bool,
    #[serde(default)]
    pub rejections: Vec<SlotRejection>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotRejection {
    #[serde(rename = "if")]
    pub condition: String,
    pub utter: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GenerateResponseStep {
    pub generation_prompt: String,
    #[serde(rename = "llm", default, skip_serializing_if = "Map::is_empty")]
    pub llm_config: Map<String, Value>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkStep {
    pub link: String,
}

/// Plain branching step: only `next` matters.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenericStep {}

fn default_reset_after_flow_ends() -> bool {
    true
}

impl CollectInformationStep {
    pub fn new(collect: impl Into<String>) -> Self {
        Self {
            collect: collect.into(),
            utter: None,
            ask_before_filling: false,
            reset_after_flow_ends: true,
            rejections: Vec::new(),
        }
    }

    /// Response used to ask for the slot, `utter_ask_<slot>` unless overridden.
    pub fn utter(&self) -> String {
        self.utter.clone().unwrap_or_else(|| format!("utter_ask_{}", self.collect))
    }
}

impl StepKind {
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Action(_) => "action",
            Self::SetSlots(_) => "set_slots",
            Self::CollectInformation(_) => "collect",
            Self::GenerateResponse(_) => "generate_response",
            Self::Link(_) => "link",
            Self::Generic(_) => "generic",
        }
    }

    fn from_attributes(attributes: Map<String, Value>) -> Result<Self, serde_json::Error> {
        let discriminant = ["action", "set_slots", "collect", "generation_prompt", "link"]
            .into_iter()
            .find(|key| attributes.contains_key(*key));
        let data = Value::Object(attributes);

        Ok(match discriminant {
            Some("action") => Self::Action(serde_json::from_value(data)?),
            Some("set_slots") => Self::SetSlots(serde_json::from_value(data)?),
            Some("collect") => Self::CollectInformation(serde_json::from_value(data)?),
            Some("generation_prompt") => Self::GenerateResponse(serde_json::from_value(data)?),
            Some("link") => Self::Link(serde_json::from_value(data)?),
            _ => Self::Generic(GenericStep {}),
        })
    }

    /// Suffix used for ids of steps the author left unnamed.
    fn default_id_postfix(&self) -> String {
        match self {
            Self::Action(step) => step.action.clone(),
            Self::SetSlots(_) => "set_slots".to_string(),
            Self::CollectInformation(step) => format!("collect_{}", step.collect),
            Self::GenerateResponse(_) => "generate".to_string(),
            Self::Link(step) => format!("link_{}", step.link),
            Self::Generic(_) => "step".to_string(),
        }
    }
}

#[derive(Deserialize)]
struct RawFlowStep {
    #[serde(default)]
    id: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    next: FlowLinks,
    #[serde(flatten)]
    attributes: Map<String, Value>,
}

impl TryFrom<RawFlowStep> for FlowStep {
    type Error = FlowError;

    fn try_from(raw: RawFlowStep) -> Result<Self, Self::Error> {
        let kind = StepKind::from_attributes(raw.attributes)
            .map_err(|error| FlowError::invalid_step(&raw.id, error))?;
        Ok(Self { id: raw.id, idx: 0, description: raw.description, next: raw.next, kind })
    }
}

impl FlowStep {
    pub fn new(id: impl Into<String>, kind: StepKind) -> Self {
        Self { id: id.into(), idx: 0, description: None, next: FlowLinks::default(), kind }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_next(mut self, next: FlowLinks) -> Self {
        self.next = next;
        self
    }

    pub fn from_json(data: &Value) -> Result<Self, FlowError> {
        let step_id = data.get("id").and_then(Value::as_str).unwrap_or_default().to_string();
        let raw: RawFlowStep = serde_json::from_value(data.clone())
            .map_err(|error| FlowError::invalid_step(step_id, error))?;
        Self::try_from(raw)
    }

    pub fn as_json(&self) -> Value {
        serde_json::to_value(self).unwrap_or_else(|_| Value::Object(Map::new()))
    }

    pub fn as_collect(&self) -> Option<&CollectInformationStep> {
        match &self.kind {
            StepKind::CollectInformation(step) => Some(step),
            _ => None,
        }
    }

    pub(crate) fn default_id(&self) -> String {
        format!("{}_{}", self.idx, self.kind.default_id_postfix())
    }
}

mod slot_assignments {
    use serde::ser::SerializeSeq;
    use serde::{Deserialize, Deserializer, Serializer};
    use serde_json::{Map, Value};

    use super::SlotAssignment;

    pub fn serialize<S>(slots: &[SlotAssignment], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut seq = serializer.serialize_seq(Some(slots.len()))?;
        for slot in slots {
            let mut entry = Map::new();
            entry.insert(slot.key.clone(), slot.value.clone());
            seq.serialize_element(&entry)?;
        }
        seq.end()
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<SlotAssignment>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let entries = Vec::<Map<String, Value>>::deserialize(deserializer)?;
        Ok(entries
            .into_iter()
            .flat_map(|entry| entry.into_iter().map(|(key, value)| SlotAssignment { key, value }))
            .collect())
    }
}
