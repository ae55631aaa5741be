//! Command generation for a conversational assistant.
//!
//! Each user turn goes through a fixed pipeline:
//! 1. **Guard** - no tracker or no flows means no commands.
//! 2. **Validation** (`generator`) - empty or over-long messages become error
//!    commands without contacting the model.
//! 3. **Prompt assembly** (`prompt`) - flows, fillable slots and the
//!    transcript are collected and rendered through a tera template.
//! 4. **Model call** (`llm`) - the pluggable `LlmClient`; failures count as
//!    an empty answer.
//! 5. **Parsing** - the answer is parsed into typed commands by the core
//!    crate's command parser.
//!
//! # Key Types
//!
//! - `CommandGenerator` - turn orchestrator
//! - `LlmClient` - model invocation boundary
//! - `PromptRenderer` - template rendering boundary, `TeraRenderer` by default

pub mod generator;
pub mod llm;
pub mod logging;
pub mod prompt;
pub mod transcript;

pub use generator::CommandGenerator;
pub use llm::LlmClient;
pub use prompt::{PromptInputs, PromptRenderer, TeraRenderer};
