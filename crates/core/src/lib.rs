//! Core model of the command-generation layer.
//!
//! - `commands`: typed dialogue commands and the parser that extracts them
//!   from line-oriented model output.
//! - `flows`: flows and their steps, with a lossless JSON form.
//! - `dialogue`: slots, the execution stack, the tracker boundary and the
//!   gate deciding which slots may be filled in the current turn.
//! - `config`: layered generator configuration.

pub mod commands;
pub mod config;
pub mod dialogue;
pub mod errors;
pub mod flows;

pub use commands::{parse_commands, Command, CommandParser, ErrorKind};
pub use config::{GeneratorConfig, LoadOptions, LogFormat, LoggingConfig, UserInputConfig};
pub use dialogue::{
    is_extractable, top_relevant_frame, DialogueTracker, Slot, SlotType, StackFrame,
    TrackerSnapshot, Turn,
};
pub use errors::FlowError;
pub use flows::{CollectInformationStep, Flow, FlowStep, FlowsList, StepKind};
