pub mod parser;
pub mod values;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

pub use parser::{parse_commands, CommandParser, FLOW_NAME_SLOT};
pub use values::{clean_extracted_value, is_null_token, nullable_slot_value};

/// Why a turn produced an [`Command::Error`] instead of regular commands.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    #[default]
    Generic,
    EmptyInput,
    InputTooLong,
}

impl ErrorKind {
    /// Name of the dialogue pattern that handles this error downstream.
    pub fn pattern_name(&self) -> &'static str {
        match self {
            Self::Generic => "pattern_internal_error_default",
            Self::EmptyInput => "pattern_internal_error_user_input_empty",
            Self::InputTooLong => "pattern_internal_error_user_input_too_long",
        }
    }
}

/// A typed instruction derived from model output for one dialogue turn.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum Command {
    SetSlot { name: String, value: Option<String> },
    StartFlow { flow: String },
    CancelFlow,
    ChitChatAnswer,
    SkipQuestion,
    KnowledgeAnswer,
    HumanHandoff,
    Clarify { options: Vec<String> },
    Error { kind: ErrorKind, info: BTreeMap<String, String> },
}

impl Command {
    pub fn set_slot(name: impl Into<String>, value: Option<String>) -> Self {
        Self::SetSlot { name: name.into(), value }
    }

    pub fn start_flow(flow: impl Into<String>) -> Self {
        Self::StartFlow { flow: flow.into() }
    }

    pub fn error(kind: ErrorKind) -> Self {
        Self::Error { kind, info: BTreeMap::new() }
    }

    pub fn error_with_info(kind: ErrorKind, info: BTreeMap<String, String>) -> Self {
        Self::Error { kind, info }
    }

    pub fn command_name(&self) -> &'static str {
        match self {
            Self::SetSlot { .. } => "set slot",
            Self::StartFlow { .. } => "start flow",
            Self::CancelFlow => "cancel flow",
            Self::ChitChatAnswer => "chitchat",
            Self::SkipQuestion => "skip question",
            Self::KnowledgeAnswer => "knowledge",
            Self::HumanHandoff => "human handoff",
            Self::Clarify { .. } => "clarify",
            Self::Error { .. } => "error",
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error { .. })
    }
}
