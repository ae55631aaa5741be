use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use dialogue_commands_agent::{CommandGenerator, LlmClient};
use dialogue_commands_core::commands::{Command, ErrorKind};
use dialogue_commands_core::config::UserInputConfig;
use dialogue_commands_core::dialogue::{Slot, SlotType, StackFrame, TrackerSnapshot, Turn};
use dialogue_commands_core::flows::FlowsList;
use serde_json::json;

/// Answers every prompt with the same text and remembers the prompts.
struct ScriptedLlm {
    reply: String,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedLlm {
    fn replying(reply: &str) -> Arc<Self> {
        Arc::new(Self { reply: reply.to_string(), prompts: Mutex::new(Vec::new()) })
    }

    fn prompts(&self) -> Vec<String> {
        self.prompts.lock().map(|prompts| prompts.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl LlmClient for ScriptedLlm {
    async fn complete(&self, prompt: &str) -> Result<String> {
        if let Ok(mut prompts) = self.prompts.lock() {
            prompts.push(prompt.to_string());
        }
        Ok(self.reply.clone())
    }
}

struct FailingLlm;

#[async_trait]
impl LlmClient for FailingLlm {
    async fn complete(&self, _prompt: &str) -> Result<String> {
        Err(anyhow!("upstream returned 503"))
    }
}

/// Never answers.
struct StalledLlm;

#[async_trait]
impl LlmClient for StalledLlm {
    async fn complete(&self, _prompt: &str) -> Result<String> {
        std::future::pending::<()>().await;
        Ok("StartFlow(transfer_money)".to_string())
    }
}

fn flows() -> FlowsList {
    FlowsList::from_json(&json!({
        "flows": {
            "transfer_money": {
                "description": "send money to friends and family",
                "steps": [
                    {"id": "ask_recipient", "collect": "recipient"},
                    {"id": "ask_amount", "collect": "amount", "ask_before_filling": true},
                    {"id": "execute", "action": "action_execute_transfer"}
                ]
            }
        }
    }))
    .expect("flows")
}

fn tracker() -> TrackerSnapshot {
    TrackerSnapshot::new()
        .with_slot(Slot::new("recipient", SlotType::Text))
        .with_slot(Slot::new("amount", SlotType::Float))
        .with_frame(StackFrame::user_flow("transfer_money", "ask_amount"))
        .with_turn(Turn::user("I want to send money"))
        .with_turn(Turn::bot("How much?"))
}

#[tokio::test]
async fn model_output_is_parsed_in_line_order() {
    let llm = ScriptedLlm::replying(
        "SetSlot(amount, 50)\nSetSlot(recipient, 'John')\nSetSlot(amount, 60)",
    );
    let generator = CommandGenerator::new(Arc::clone(&llm));

    let commands =
        generator.predict_commands("50 to John, no 60", &flows(), Some(&tracker())).await;

    assert_eq!(
        commands,
        vec![
            Command::set_slot("amount", Some("50".to_owned())),
            Command::set_slot("recipient", Some("John".to_owned())),
            Command::set_slot("amount", Some("60".to_owned())),
        ]
    );

    let prompts = llm.prompts();
    assert_eq!(prompts.len(), 1);
    assert!(prompts[0].contains("USER: 50 to John, no 60"));
    assert!(prompts[0].contains(r#"asked the user for the slot "amount""#));
}

#[tokio::test]
async fn missing_tracker_or_flows_is_a_no_op() {
    let llm = ScriptedLlm::replying("StartFlow(transfer_money)");
    let generator = CommandGenerator::new(Arc::clone(&llm));

    assert!(generator.predict_commands::<TrackerSnapshot>("hi", &flows(), None).await.is_empty());
    assert!(generator
        .predict_commands("hi", &FlowsList::default(), Some(&tracker()))
        .await
        .is_empty());
    assert!(generator
        .predict_commands("", &FlowsList::default(), Some(&tracker()))
        .await
        .is_empty());
    assert!(llm.prompts().is_empty());
}

#[tokio::test]
async fn empty_messages_never_reach_the_model() {
    let llm = ScriptedLlm::replying("StartFlow(transfer_money)");
    let generator = CommandGenerator::new(Arc::clone(&llm));

    for message in ["", "   \n "] {
        let commands = generator.predict_commands(message, &flows(), Some(&tracker())).await;
        assert_eq!(commands, vec![Command::error(ErrorKind::EmptyInput)]);
    }
    assert!(llm.prompts().is_empty());
}

#[tokio::test]
async fn over_long_messages_are_rejected_with_the_limit() {
    let llm = ScriptedLlm::replying("ChitChat()");
    let generator = CommandGenerator::new(Arc::clone(&llm));
    let message = "a".repeat(421);

    let commands = generator.predict_commands(&message, &flows(), Some(&tracker())).await;

    let [Command::Error { kind: ErrorKind::InputTooLong, info }] = commands.as_slice() else {
        panic!("expected a single input-too-long error, got {commands:?}");
    };
    assert_eq!(info.get("max_characters").map(String::as_str), Some("420"));
    assert!(llm.prompts().is_empty());
}

#[tokio::test]
async fn negative_limit_lets_any_length_through() {
    let llm = ScriptedLlm::replying("ChitChat()");
    let generator = CommandGenerator::new(Arc::clone(&llm))
        .with_user_input_config(UserInputConfig { max_characters: -1 });

    let commands =
        generator.predict_commands(&"a".repeat(100_000), &flows(), Some(&tracker())).await;

    assert_eq!(commands, vec![Command::ChitChatAnswer]);
}

#[tokio::test]
async fn model_failures_become_a_generic_error() {
    let generator = CommandGenerator::new(FailingLlm);

    let commands = generator.predict_commands("send money", &flows(), Some(&tracker())).await;

    assert_eq!(commands, vec![Command::error(ErrorKind::Generic)]);
}

#[tokio::test]
async fn empty_model_answer_is_a_generic_error() {
    let llm = ScriptedLlm::replying("");
    let generator = CommandGenerator::new(Arc::clone(&llm));

    let commands = generator.predict_commands("send money", &flows(), Some(&tracker())).await;

    assert_eq!(commands, vec![Command::error(ErrorKind::Generic)]);
}

#[tokio::test]
async fn chatter_without_commands_yields_nothing() {
    let llm = ScriptedLlm::replying("I think the user is just saying hello.");
    let generator = CommandGenerator::new(Arc::clone(&llm));

    let commands = generator.predict_commands("hello", &flows(), Some(&tracker())).await;

    assert!(commands.is_empty());
}

#[tokio::test]
async fn broken_custom_template_is_a_generic_error() {
    let llm = ScriptedLlm::replying("ChitChat()");
    let generator = CommandGenerator::new(Arc::clone(&llm)).with_prompt_template("{% if %}");

    let commands = generator.predict_commands("hello", &flows(), Some(&tracker())).await;

    assert_eq!(commands, vec![Command::error(ErrorKind::Generic)]);
    assert!(llm.prompts().is_empty());
}

#[tokio::test]
async fn custom_template_receives_prompt_inputs() {
    let llm = ScriptedLlm::replying("StartFlow(transfer_money)");
    let generator = CommandGenerator::new(Arc::clone(&llm))
        .with_prompt_template("{{ current_flow }}|{{ current_slot }}|{{ user_message }}");

    let commands = generator.predict_commands("fifty", &flows(), Some(&tracker())).await;

    assert_eq!(commands, vec![Command::start_flow("transfer_money")]);
    assert_eq!(llm.prompts(), vec!["transfer_money|amount|fifty".to_string()]);
}

#[tokio::test]
async fn cancelled_turns_emit_no_commands() {
    let generator = CommandGenerator::new(StalledLlm);

    let outcome = generator
        .predict_commands_until(
            "send money",
            &flows(),
            Some(&tracker()),
            tokio::time::sleep(Duration::from_millis(10)),
        )
        .await;

    assert_eq!(outcome, None);
}

#[tokio::test]
async fn uncancelled_turns_complete() {
    let llm = ScriptedLlm::replying("CancelFlow()");
    let generator = CommandGenerator::new(Arc::clone(&llm));

    let outcome = generator
        .predict_commands_until("stop", &flows(), Some(&tracker()), std::future::pending::<()>())
        .await;

    assert_eq!(outcome, Some(vec![Command::CancelFlow]));
}
