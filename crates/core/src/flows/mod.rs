pub mod flow;
pub mod links;
pub mod step;

pub use flow::{Flow, FlowsList, PATTERN_FLOW_PREFIX};
pub use links::{FlowLink, FlowLinks};
pub use step::{
    ActionStep, CollectInformationStep, FlowStep, GenerateResponseStep, GenericStep, LinkStep,
    SetSlotsStep, SlotAssignment, SlotRejection, StepKind,
};
