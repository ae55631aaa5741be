use std::collections::BTreeMap;
use std::future::Future;

use dialogue_commands_core::commands::{parse_commands, Command, ErrorKind};
use dialogue_commands_core::config::{ConfigError, GeneratorConfig, UserInputConfig};
use dialogue_commands_core::dialogue::DialogueTracker;
use dialogue_commands_core::flows::FlowsList;

use crate::llm::{invoke_llm, LlmClient};
use crate::prompt::{
    assemble_prompt_inputs, PromptRenderer, RenderError, TeraRenderer,
    DEFAULT_COMMAND_PROMPT_TEMPLATE,
};

/// Produces the commands for one user turn by prompting a language model.
///
/// Holds only configuration and collaborators; every call works on the
/// tracker and flows it is handed, so one generator can serve concurrent
/// conversations.
pub struct CommandGenerator<L, R = TeraRenderer> {
    llm: L,
    renderer: R,
    prompt_template: String,
    user_input: UserInputConfig,
}

impl<L> CommandGenerator<L, TeraRenderer>
where
    L: LlmClient,
{
    pub fn new(llm: L) -> Self {
        Self {
            llm,
            renderer: TeraRenderer,
            prompt_template: DEFAULT_COMMAND_PROMPT_TEMPLATE.to_string(),
            user_input: UserInputConfig::default(),
        }
    }

    /// Builds a generator from loaded configuration. A configured template
    /// file replaces the built-in command prompt.
    pub fn from_config(llm: L, config: &GeneratorConfig) -> Result<Self, ConfigError> {
        let generator = Self::new(llm).with_user_input_config(config.user_input);
        Ok(match config.read_prompt_template()? {
            Some(template) => generator.with_prompt_template(template),
            None => generator,
        })
    }
}

impl<L, R> CommandGenerator<L, R>
where
    L: LlmClient,
    R: PromptRenderer,
{
    pub fn with_renderer<S>(self, renderer: S) -> CommandGenerator<L, S>
    where
        S: PromptRenderer,
    {
        CommandGenerator {
            llm: self.llm,
            renderer,
            prompt_template: self.prompt_template,
            user_input: self.user_input,
        }
    }

    pub fn with_prompt_template(mut self, template: impl Into<String>) -> Self {
        self.prompt_template = template.into();
        self
    }

    pub fn with_user_input_config(mut self, user_input: UserInputConfig) -> Self {
        self.user_input = user_input;
        self
    }

    pub fn user_input_config(&self) -> &UserInputConfig {
        &self.user_input
    }

    pub fn prompt_template(&self) -> &str {
        &self.prompt_template
    }

    /// Runs one turn: validate the message, render the prompt, ask the model
    /// and parse its answer.
    ///
    /// Without a tracker or without flows there is nothing to do and the
    /// result is empty. Every failure after that is reported as a single
    /// error command.
    pub async fn predict_commands<T>(
        &self,
        message: &str,
        flows: &FlowsList,
        tracker: Option<&T>,
    ) -> Vec<Command>
    where
        T: DialogueTracker + ?Sized,
    {
        let Some(tracker) = tracker else {
            return Vec::new();
        };
        if flows.is_empty() {
            return Vec::new();
        }

        if let Some(rejection) = self.validate_message(message) {
            tracing::warn!(
                event_name = "command_generator.input_rejected",
                error_kind = rejection_kind(&rejection),
                "user message rejected before prompting"
            );
            return vec![rejection];
        }

        let prompt = match self.render_template(message, tracker, flows) {
            Ok(prompt) => prompt,
            Err(error) => {
                tracing::error!(
                    event_name = "command_generator.prompt_render_failed",
                    error = %error,
                    "prompt template could not be rendered"
                );
                return vec![Command::error(ErrorKind::Generic)];
            }
        };
        tracing::debug!(
            event_name = "command_generator.prompt_rendered",
            prompt = %prompt,
            "command prompt rendered"
        );

        let action_list = invoke_llm(&self.llm, &prompt).await;
        tracing::info!(
            event_name = "command_generator.actions_generated",
            action_list = action_list.as_deref().unwrap_or_default(),
            "llm returned action list"
        );

        let commands = parse_commands(action_list.as_deref());
        tracing::info!(
            event_name = "command_generator.finished",
            command_count = commands.len(),
            commands = ?commands,
            "commands generated"
        );
        commands
    }

    /// Like [`Self::predict_commands`], but gives up as soon as `cancel`
    /// completes. An abandoned turn yields `None`, so a late model answer
    /// never turns into commands.
    pub async fn predict_commands_until<T, C>(
        &self,
        message: &str,
        flows: &FlowsList,
        tracker: Option<&T>,
        cancel: C,
    ) -> Option<Vec<Command>>
    where
        T: DialogueTracker + ?Sized,
        C: Future<Output = ()>,
    {
        tokio::select! {
            biased;
            _ = cancel => {
                tracing::info!(
                    event_name = "command_generator.cancelled",
                    "turn abandoned before the model answered"
                );
                None
            }
            commands = self.predict_commands(message, flows, tracker) => Some(commands),
        }
    }

    pub fn render_template<T>(
        &self,
        message: &str,
        tracker: &T,
        flows: &FlowsList,
    ) -> Result<String, RenderError>
    where
        T: DialogueTracker + ?Sized,
    {
        let inputs = assemble_prompt_inputs(message, tracker, flows);
        self.renderer.render(&self.prompt_template, &inputs)
    }

    /// The error command for a message that must not reach the model.
    pub fn validate_message(&self, message: &str) -> Option<Command> {
        if is_message_empty(message) {
            return Some(Command::error(ErrorKind::EmptyInput));
        }
        if self.user_input.exceeds_limit(message) {
            let mut info = BTreeMap::new();
            info.insert("max_characters".to_string(), self.user_input.max_characters.to_string());
            return Some(Command::error_with_info(ErrorKind::InputTooLong, info));
        }
        None
    }
}

fn is_message_empty(message: &str) -> bool {
    message.trim().is_empty()
}

fn rejection_kind(command: &Command) -> &'static str {
    match command {
        Command::Error { kind, .. } => kind.pattern_name(),
        other => other.command_name(),
    }
}
