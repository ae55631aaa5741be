use dialogue_commands_core::dialogue::{Speaker, Turn};

/// Number of most recent turns shown to the model.
pub const DEFAULT_MAX_TURNS: usize = 20;

/// Keeps a message on a single prompt line.
pub fn sanitize_message_for_prompt(text: &str) -> String {
    text.replace(['\r', '\n'], " ")
}

/// `USER: ...` / `AI: ...` lines for the last `max_turns` turns.
pub fn readable_transcript(turns: &[Turn], max_turns: usize) -> String {
    let start = turns.len().saturating_sub(max_turns);
    turns[start..]
        .iter()
        .map(|turn| {
            let speaker = match turn.speaker {
                Speaker::User => "USER",
                Speaker::Bot => "AI",
            };
            format!("{speaker}: {}", sanitize_message_for_prompt(&turn.text))
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use dialogue_commands_core::dialogue::Turn;

    use super::{readable_transcript, sanitize_message_for_prompt};

    #[test]
    fn newlines_are_flattened() {
        assert_eq!(sanitize_message_for_prompt("send money\nto John"), "send money to John");
    }

    #[test]
    fn transcript_keeps_only_recent_turns() {
        let turns = vec![
            Turn::user("hi"),
            Turn::bot("Hello! How can I help?"),
            Turn::user("send money"),
            Turn::bot("Who should\nreceive it?"),
        ];

        assert_eq!(
            readable_transcript(&turns, 2),
            "USER: send money\nAI: Who should receive it?"
        );
        assert_eq!(readable_transcript(&turns, 20).lines().count(), 4);
        assert_eq!(readable_transcript(&[], 20), "");
    }
}
