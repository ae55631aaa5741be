//! Line-oriented extraction of [`Command`]s from free-form model output.
//!
//! Each line is tested against an ordered table of patterns. The first pattern
//! that matches anywhere in the line decides the command; lines that match
//! nothing are dropped so chatty model answers do not break a turn.

use std::sync::LazyLock;

use regex::{Captures, Regex};

use super::values::{clean_extracted_value, nullable_slot_value};
use super::{Command, ErrorKind};

/// Slot name the model sometimes uses when it means to start a flow.
pub const FLOW_NAME_SLOT: &str = "flow_name";

struct CommandPattern {
    name: &'static str,
    regex: Regex,
    build: fn(&Captures<'_>) -> Command,
}

impl CommandPattern {
    fn new(name: &'static str, pattern: &str, build: fn(&Captures<'_>) -> Command) -> Self {
        let regex = Regex::new(pattern).expect("command patterns are valid regexes");
        Self { name, regex, build }
    }
}

// Priority order matters: SetSlot must be tried before StartFlow.
static COMMAND_PATTERNS: LazyLock<Vec<CommandPattern>> = LazyLock::new(|| {
    vec![
        CommandPattern::new(
            "set_slot",
            r#"SetSlot\(([a-zA-Z_][a-zA-Z0-9_-]*?), ?"?([^)]*?)"?\)"#,
            build_set_slot,
        ),
        CommandPattern::new("start_flow", r"StartFlow\(([a-zA-Z_][a-zA-Z0-9_-]*?)\)", |caps| {
            Command::start_flow(caps[1].trim())
        }),
        CommandPattern::new("cancel_flow", r"CancelFlow\(\)", |_| Command::CancelFlow),
        CommandPattern::new("chitchat", r"ChitChat\(\)", |_| Command::ChitChatAnswer),
        CommandPattern::new("skip_question", r"SkipQuestion\(\)", |_| Command::SkipQuestion),
        CommandPattern::new("search_and_reply", r"SearchAndReply\(\)", |_| {
            Command::KnowledgeAnswer
        }),
        CommandPattern::new("human_handoff", r"HumanHandoff\(\)", |_| Command::HumanHandoff),
        CommandPattern::new("clarify", r"Clarify\(([a-zA-Z0-9_, ]+)\)", |caps| Command::Clarify {
            options: caps[1].split(',').map(|option| option.trim().to_string()).collect(),
        }),
    ]
});

fn build_set_slot(caps: &Captures<'_>) -> Command {
    let slot_name = caps[1].trim();
    let slot_value = clean_extracted_value(&caps[2]);
    if slot_name == FLOW_NAME_SLOT {
        Command::start_flow(slot_value)
    } else {
        Command::set_slot(slot_name, nullable_slot_value(slot_value))
    }
}

/// Characters that end a line of model output.
const LINE_BOUNDARIES: [char; 10] = [
    '\n', '\r', '\u{0b}', '\u{0c}', '\u{1c}', '\u{1d}', '\u{1e}', '\u{85}', '\u{2028}',
    '\u{2029}',
];

/// Parses the action list produced by the model.
///
/// An absent or empty answer is a failed model call and yields a single
/// generic error command. Any other input yields one command per matching
/// line, in line order and without deduplication.
pub fn parse_commands(actions: Option<&str>) -> Vec<Command> {
    let Some(actions) = actions.filter(|actions| !actions.is_empty()) else {
        return vec![Command::error(ErrorKind::Generic)];
    };

    actions.trim().split(LINE_BOUNDARIES).filter_map(parse_line).collect()
}

fn parse_line(line: &str) -> Option<Command> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }

    let command = COMMAND_PATTERNS.iter().find_map(|pattern| {
        pattern.regex.captures(line).map(|caps| {
            tracing::trace!(pattern = pattern.name, line = line, "command pattern matched");
            (pattern.build)(&caps)
        })
    });

    if command.is_none() {
        tracing::debug!(
            event_name = "command_parser.line_skipped",
            line = line,
            "model output line matched no command pattern"
        );
    }
    command
}

#[derive(Clone, Debug, Default)]
pub struct CommandParser;

impl CommandParser {
    pub fn new() -> Self {
        Self
    }

    pub fn parse(&self, actions: Option<&str>) -> Vec<Command> {
        parse_commands(actions)
    }
}
