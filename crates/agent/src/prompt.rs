//! Inputs of the command prompt and their rendering.
//!
//! The inputs are rebuilt from scratch every turn: nothing computed for one
//! conversation is kept around for the next.

use dialogue_commands_core::dialogue::{
    is_extractable, slot_value_as_prompt_text, top_relevant_frame, DialogueTracker,
};
use dialogue_commands_core::flows::{Flow, FlowStep, FlowsList};
use serde::Serialize;
use tera::{Context, Tera};
use thiserror::Error;

use crate::transcript::{readable_transcript, sanitize_message_for_prompt, DEFAULT_MAX_TURNS};

pub const DEFAULT_COMMAND_PROMPT_TEMPLATE: &str =
    include_str!("../templates/command_prompt.tera");

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PromptInputs {
    pub available_flows: Vec<FlowSummary>,
    pub current_conversation: String,
    pub flow_slots: Vec<FlowSlot>,
    pub current_flow: Option<String>,
    pub current_slot: Option<String>,
    pub current_slot_description: Option<String>,
    pub user_message: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct FlowSummary {
    pub name: String,
    pub description: Option<String>,
    pub slots: Vec<SlotSummary>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SlotSummary {
    pub name: String,
    pub description: Option<String>,
    pub allowed_values: Option<String>,
}

/// A slot of the active flow, including what the conversation holds for it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct FlowSlot {
    pub name: String,
    pub value: String,
    #[serde(rename = "type")]
    pub slot_type: String,
    pub allowed_values: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("could not build template context: {0}")]
    Context(#[source] tera::Error),
    #[error("could not render prompt template: {0}")]
    Template(#[source] tera::Error),
}

/// Turns a template and prompt inputs into the final prompt text.
pub trait PromptRenderer: Send + Sync {
    fn render(&self, template: &str, inputs: &PromptInputs) -> Result<String, RenderError>;
}

#[derive(Clone, Copy, Debug, Default)]
pub struct TeraRenderer;

impl PromptRenderer for TeraRenderer {
    fn render(&self, template: &str, inputs: &PromptInputs) -> Result<String, RenderError> {
        let context = Context::from_serialize(inputs).map_err(RenderError::Context)?;
        Tera::one_off(template, &context, false).map_err(RenderError::Template)
    }
}

/// Every user flow with the slots that may be filled without any knowledge
/// of the step currently running.
pub fn prepare_flows_for_template<T>(flows: &FlowsList, tracker: &T) -> Vec<FlowSummary>
where
    T: DialogueTracker + ?Sized,
{
    flows
        .user_flows()
        .map(|flow| FlowSummary {
            name: flow.id.clone(),
            description: flow.description.clone(),
            slots: flow
                .collect_steps()
                .filter(|(_, collect)| is_extractable(collect, tracker, None))
                .filter_map(|(step, collect)| {
                    let slot = tracker.slot(&collect.collect)?;
                    Some(SlotSummary {
                        name: collect.collect.clone(),
                        description: step.description.clone(),
                        allowed_values: slot.allowed_values(),
                    })
                })
                .collect(),
        })
        .collect()
}

/// Slots of the active flow that may be filled given the current step.
pub fn prepare_current_flow_slots<T>(
    top_flow: Option<&Flow>,
    current_step: Option<&FlowStep>,
    tracker: &T,
) -> Vec<FlowSlot>
where
    T: DialogueTracker + ?Sized,
{
    let Some(flow) = top_flow else {
        return Vec::new();
    };

    flow.collect_steps()
        .filter(|(_, collect)| is_extractable(collect, tracker, current_step))
        .filter_map(|(step, collect)| {
            let slot = tracker.slot(&collect.collect)?;
            Some(FlowSlot {
                name: collect.collect.clone(),
                value: slot_value_as_prompt_text(tracker.get_slot(&collect.collect)),
                slot_type: slot.type_name().to_string(),
                allowed_values: slot.allowed_values(),
                description: step.description.clone(),
            })
        })
        .collect()
}

/// Slot name and description when the current step asks for a slot.
pub fn prepare_current_slot(current_step: Option<&FlowStep>) -> (Option<String>, Option<String>) {
    match current_step.and_then(|step| step.as_collect().map(|collect| (step, collect))) {
        Some((step, collect)) => (Some(collect.collect.clone()), step.description.clone()),
        None => (None, None),
    }
}

pub fn assemble_prompt_inputs<T>(user_message: &str, tracker: &T, flows: &FlowsList) -> PromptInputs
where
    T: DialogueTracker + ?Sized,
{
    let top_frame = top_relevant_frame(tracker.stack());
    let top_flow = top_frame.and_then(|frame| frame.flow(flows));
    let current_step = top_frame.and_then(|frame| frame.step(flows));

    let flow_slots = prepare_current_flow_slots(top_flow, current_step, tracker);
    let (current_slot, current_slot_description) = prepare_current_slot(current_step);

    let latest_user_message = sanitize_message_for_prompt(user_message);
    let mut current_conversation = readable_transcript(tracker.turns(), DEFAULT_MAX_TURNS);
    current_conversation.push_str("\nUSER: ");
    current_conversation.push_str(&latest_user_message);

    PromptInputs {
        available_flows: prepare_flows_for_template(flows, tracker),
        current_conversation,
        flow_slots,
        current_flow: top_flow.map(|flow| flow.id.clone()),
        current_slot,
        current_slot_description,
        user_message: latest_user_message,
    }
}
