use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::slots::Slot;
use super::stack::StackFrame;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Speaker {
    User,
    Bot,
}

/// One utterance of the conversation so far.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub speaker: Speaker,
    pub text: String,
}

impl Turn {
    pub fn user(text: impl Into<String>) -> Self {
        Self { speaker: Speaker::User, text: text.into() }
    }

    pub fn bot(text: impl Into<String>) -> Self {
        Self { speaker: Speaker::Bot, text: text.into() }
    }
}

/// Read-only conversation state consulted while generating commands.
pub trait DialogueTracker: Send + Sync {
    fn slot(&self, name: &str) -> Option<&Slot>;

    fn stack(&self) -> &[StackFrame];

    fn turns(&self) -> &[Turn];

    fn get_slot(&self, name: &str) -> Option<&Value> {
        self.slot(name).and_then(|slot| slot.value.as_ref())
    }
}

/// Owned tracker state captured for a single turn.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TrackerSnapshot {
    #[serde(default)]
    pub slots: BTreeMap<String, Slot>,
    #[serde(default)]
    pub stack: Vec<StackFrame>,
    #[serde(default)]
    pub turns: Vec<Turn>,
}

impl TrackerSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_slot(mut self, slot: Slot) -> Self {
        self.slots.insert(slot.name.clone(), slot);
        self
    }

    pub fn with_frame(mut self, frame: StackFrame) -> Self {
        self.stack.push(frame);
        self
    }

    pub fn with_turn(mut self, turn: Turn) -> Self {
        self.turns.push(turn);
        self
    }
}

impl DialogueTracker for TrackerSnapshot {
    fn slot(&self, name: &str) -> Option<&Slot> {
        self.slots.get(name)
    }

    fn stack(&self) -> &[StackFrame] {
        &self.stack
    }

    fn turns(&self) -> &[Turn] {
        &self.turns
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{DialogueTracker, TrackerSnapshot, Turn};
    use crate::dialogue::slots::{Slot, SlotType};
    use crate::dialogue::stack::StackFrame;

    #[test]
    fn snapshot_answers_tracker_queries() {
        let tracker = TrackerSnapshot::new()
            .with_slot(Slot::new("amount", SlotType::Float).with_value(json!(50)))
            .with_slot(Slot::new("recipient", SlotType::Text))
            .with_frame(StackFrame::user_flow("transfer_money", "ask_amount"))
            .with_turn(Turn::user("send 50 bucks"));

        assert_eq!(tracker.get_slot("amount"), Some(&json!(50)));
        assert_eq!(tracker.get_slot("recipient"), None);
        assert!(tracker.slot("unknown").is_none());
        assert_eq!(tracker.stack().len(), 1);
        assert_eq!(tracker.turns(), &[Turn::user("send 50 bucks")]);
    }
}
