//! Read-only view of the dialogue's execution stack.

use serde::{Deserialize, Serialize};

use crate::flows::{Flow, FlowStep, FlowsList};

/// Pattern that asks for a slot on behalf of the flow below it. The flow being
/// filled is the relevant one, not the pattern itself.
pub const COLLECT_INFORMATION_PATTERN: &str = "pattern_collect_information";

/// Step ids a frame points at before the first or after the last step.
pub const START_STEP: &str = "START";
pub const END_STEP: &str = "END";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlowFrameType {
    #[default]
    Regular,
    Interrupt,
    Link,
    Correction,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StackFrame {
    UserFlow {
        flow_id: String,
        step_id: String,
        #[serde(default)]
        frame_type: FlowFrameType,
    },
    Pattern {
        flow_id: String,
        step_id: String,
    },
    Search,
    ChitChat,
}

impl StackFrame {
    pub fn user_flow(flow_id: impl Into<String>, step_id: impl Into<String>) -> Self {
        Self::UserFlow {
            flow_id: flow_id.into(),
            step_id: step_id.into(),
            frame_type: FlowFrameType::Regular,
        }
    }

    pub fn pattern(flow_id: impl Into<String>, step_id: impl Into<String>) -> Self {
        Self::Pattern { flow_id: flow_id.into(), step_id: step_id.into() }
    }

    pub fn flow_id(&self) -> Option<&str> {
        match self {
            Self::UserFlow { flow_id, .. } | Self::Pattern { flow_id, .. } => Some(flow_id),
            Self::Search | Self::ChitChat => None,
        }
    }

    pub fn step_id(&self) -> Option<&str> {
        match self {
            Self::UserFlow { step_id, .. } | Self::Pattern { step_id, .. } => Some(step_id),
            Self::Search | Self::ChitChat => None,
        }
    }

    pub fn flow<'a>(&self, flows: &'a FlowsList) -> Option<&'a Flow> {
        self.flow_id().and_then(|flow_id| flows.flow_by_id(flow_id))
    }

    /// `START` and `END` resolve to no step.
    pub fn step<'a>(&self, flows: &'a FlowsList) -> Option<&'a FlowStep> {
        let step_id = self.step_id().filter(|id| *id != START_STEP && *id != END_STEP)?;
        self.flow(flows).and_then(|flow| flow.step_by_id(step_id))
    }

    fn is_collect_information_pattern(&self) -> bool {
        matches!(self, Self::Pattern { flow_id, .. } if flow_id == COLLECT_INFORMATION_PATTERN)
    }
}

/// Topmost flow-backed frame, skipping the collect-information pattern and
/// frames that run no flow.
pub fn top_relevant_frame(stack: &[StackFrame]) -> Option<&StackFrame> {
    stack
        .iter()
        .rev()
        .filter(|frame| !frame.is_collect_information_pattern())
        .find(|frame| frame.flow_id().is_some())
}
