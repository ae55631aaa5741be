pub mod extraction;
pub mod slots;
pub mod stack;
pub mod tracker;

pub use extraction::is_extractable;
pub use slots::{slot_value_as_prompt_text, Slot, SlotType, CATEGORICAL_OTHER_VALUE};
pub use stack::{top_relevant_frame, FlowFrameType, StackFrame, COLLECT_INFORMATION_PATTERN};
pub use tracker::{DialogueTracker, Speaker, TrackerSnapshot, Turn};
