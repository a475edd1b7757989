/// Static last-resort phrases, consulted when the generative fallback is
/// offline or errored. Checked in order; the first hit wins.
pub fn fallback_reply(utterance: &str) -> String {
    let lower = utterance.to_lowercase();

    if lower.contains("how are you") {
        return "Running at full charge and ready to help.".to_string();
    }

    if lower
        .split_whitespace()
        .any(|word| matches!(word, "hello" | "hi" | "hey"))
    {
        return "Hey! Bosun at your service. How can I help?".to_string();
    }

    "I didn't catch that. Say 'help' to hear what I can do.".to_string()
}

pub fn help_text() -> String {
    [
        "I can help with a few things:",
        "'calculate 5 plus 3' or 'solve x^2 = 9' for math,",
        "'derivative of x^2' or 'integral of sin(x)' for calculus,",
        "'weather in <city>' for the forecast,",
        "'tell me about <topic>' for an encyclopedia summary,",
        "'add task <text>', 'list tasks', 'mark task <id> done' for to-dos,",
        "'set alarm for 07:30', 'remind me to <text> in 10 minutes', 'list timers',",
        "'remember <key> is <value>' and 'what is <key>' for facts,",
        "'create file <name>' / 'open file <name>' / 'delete file <name>',",
        "'send whatsapp to <contact> saying <text>',",
        "'tell me a joke', 'sleep' to stand by, or 'quit' to shut down.",
    ]
    .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn greeting_and_status_phrases() {
        assert!(fallback_reply("hello there").contains("Bosun"));
        assert!(fallback_reply("how are you").contains("charge"));
    }

    #[test]
    fn unknown_phrase_suggests_help() {
        assert!(fallback_reply("glorp").contains("help"));
    }

    #[test]
    fn greeting_needs_a_whole_word() {
        // "hi" inside another word is not a greeting.
        assert!(fallback_reply("this is fine").contains("didn't catch"));
    }
}
