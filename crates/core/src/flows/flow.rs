use std::collections::HashSet;

use serde::Deserialize;
use serde_json::{Map, Value};

use super::step::{CollectInformationStep, FlowStep};
use crate::errors::FlowError;

/// Prefix of flows that implement built-in conversation patterns rather than
/// user-facing tasks.
pub const PATTERN_FLOW_PREFIX: &str = "pattern_";

/// An authored task: an ordered list of steps. Immutable once assembled.
#[derive(Clone, Debug, PartialEq)]
pub struct Flow {
    pub id: String,
    pub description: Option<String>,
    steps: Vec<FlowStep>,
}

#[derive(Deserialize)]
struct RawFlow {
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    steps: Vec<Value>,
}

impl Flow {
    /// Assembles a flow, stamping each step's position and naming steps that
    /// were left without an id.
    pub fn new(
        id: impl Into<String>,
        description: Option<String>,
        steps: Vec<FlowStep>,
    ) -> Result<Self, FlowError> {
        let id = id.into();
        let mut seen = HashSet::new();
        let mut stamped = Vec::with_capacity(steps.len());

        for (idx, mut step) in steps.into_iter().enumerate() {
            step.idx = idx;
            if step.id.is_empty() {
                step.id = step.default_id();
            }
            if !seen.insert(step.id.clone()) {
                return Err(FlowError::DuplicateStepId { flow_id: id, step_id: step.id });
            }
            stamped.push(step);
        }

        Ok(Self { id, description, steps: stamped })
    }

    pub fn from_json(id: impl Into<String>, data: &Value) -> Result<Self, FlowError> {
        let id = id.into();
        let raw: RawFlow = serde_json::from_value(data.clone())
            .map_err(|error| FlowError::invalid_flow(&id, error))?;
        let steps = raw.steps.iter().map(FlowStep::from_json).collect::<Result<Vec<_>, _>>()?;
        Self::new(id, raw.description, steps)
    }

    pub fn as_json(&self) -> Value {
        let mut data = Map::new();
        if let Some(description) = &self.description {
            data.insert("description".to_string(), Value::String(description.clone()));
        }
        data.insert(
            "steps".to_string(),
            Value::Array(self.steps.iter().map(FlowStep::as_json).collect()),
        );
        Value::Object(data)
    }

    pub fn steps(&self) -> &[FlowStep] {
        &self.steps
    }

    pub fn step_by_id(&self, step_id: &str) -> Option<&FlowStep> {
        self.steps.iter().find(|step| step.id == step_id)
    }

    /// Collect steps paired with the step's description, in flow order.
    pub fn collect_steps(&self) -> impl Iterator<Item = (&FlowStep, &CollectInformationStep)> {
        self.steps.iter().filter_map(|step| step.as_collect().map(|collect| (step, collect)))
    }

    pub fn is_pattern(&self) -> bool {
        self.id.starts_with(PATTERN_FLOW_PREFIX)
    }
}

/// Every flow known to the assistant, in definition order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FlowsList {
    flows: Vec<Flow>,
}

impl FlowsList {
    pub fn new(flows: Vec<Flow>) -> Result<Self, FlowError> {
        let mut seen = HashSet::new();
        for flow in &flows {
            if !seen.insert(flow.id.as_str()) {
                return Err(FlowError::DuplicateFlowId(flow.id.clone()));
            }
        }
        Ok(Self { flows })
    }

    /// Reads `{"flows": {"<flow id>": {"description": ..., "steps": [...]}}}`.
    pub fn from_json(data: &Value) -> Result<Self, FlowError> {
        let Some(flows) = data.get("flows") else {
            return Ok(Self::default());
        };
        let flows = flows
            .as_object()
            .ok_or_else(|| FlowError::invalid_flow("<root>", "`flows` must be a mapping"))?;

        let flows = flows
            .iter()
            .map(|(flow_id, flow)| Flow::from_json(flow_id.clone(), flow))
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(flows)
    }

    pub fn is_empty(&self) -> bool {
        self.flows.is_empty()
    }

    pub fn len(&self) -> usize {
        self.flows.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Flow> {
        self.flows.iter()
    }

    /// Flows the user can start, i.e. everything except pattern flows.
    pub fn user_flows(&self) -> impl Iterator<Item = &Flow> {
        self.flows.iter().filter(|flow| !flow.is_pattern())
    }

    pub fn flow_by_id(&self, flow_id: &str) -> Option<&Flow> {
        self.flows.iter().find(|flow| flow.id == flow_id)
    }

    pub fn step_by_id(&self, step_id: &str, flow_id: &str) -> Option<&FlowStep> {
        self.flow_by_id(flow_id).and_then(|flow| flow.step_by_id(step_id))
    }
}
