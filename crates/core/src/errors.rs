use thiserror::Error;

/// Failures while reading or assembling flow definitions.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum FlowError {
    #[error("invalid step `{step_id}`: {reason}")]
    InvalidStep { step_id: String, reason: String },
    #[error("invalid flow `{flow_id}`: {reason}")]
    InvalidFlow { flow_id: String, reason: String },
    #[error("flow `{flow_id}` defines step `{step_id}` more than once")]
    DuplicateStepId { flow_id: String, step_id: String },
    #[error("flow `{0}` is defined more than once")]
    DuplicateFlowId(String),
}

impl FlowError {
    pub(crate) fn invalid_step(step_id: impl Into<String>, reason: impl ToString) -> Self {
        Self::InvalidStep { step_id: step_id.into(), reason: reason.to_string() }
    }

    pub(crate) fn invalid_flow(flow_id: impl Into<String>, reason: impl ToString) -> Self {
        Self::InvalidFlow { flow_id: flow_id.into(), reason: reason.to_string() }
    }
}
