use crate::models::Intent;

/// How a rule's trigger phrases are compared against the lowercased utterance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchPolicy {
    /// The whole utterance must equal one of the triggers.
    Exact,
    /// A trigger must appear as a substring.
    Contains,
}

pub struct RouteRule {
    pub intent: Intent,
    /// Declared synonyms, longest phrase first. All of them are stripped when
    /// computing the remainder.
    pub triggers: &'static [&'static str],
    pub policy: MatchPolicy,
    /// Extra predicate over the lowercased utterance. The rule only fires when
    /// the guard passes, otherwise matching continues down the table.
    pub guard: Option<fn(&str) -> bool>,
}

/// The dispatch priority list. Order is the resolution rule for overlapping
/// trigger vocabularies: the first matching entry wins, full stop. Control
/// commands outrank everything, the specific calculus phrases outrank the
/// generic solve/calculate triggers, and arithmetic outranks fact recall but
/// only when an operator is present, so "what is 5 plus 3" computes while
/// "what is color" recalls.
pub const RULES: &[RouteRule] = &[
    RouteRule {
        intent: Intent::Shutdown,
        triggers: &["shutdown", "exit", "quit"],
        policy: MatchPolicy::Exact,
        guard: None,
    },
    RouteRule {
        intent: Intent::StandBy,
        triggers: &["stop listening", "go to sleep", "sleep"],
        policy: MatchPolicy::Exact,
        guard: None,
    },
    RouteRule {
        intent: Intent::Help,
        triggers: &["what can you do", "commands", "help"],
        policy: MatchPolicy::Exact,
        guard: None,
    },
    RouteRule {
        intent: Intent::Remember,
        triggers: &["remember "],
        policy: MatchPolicy::Contains,
        guard: None,
    },
    RouteRule {
        intent: Intent::Derivative,
        triggers: &["derivative of"],
        policy: MatchPolicy::Contains,
        guard: None,
    },
    RouteRule {
        intent: Intent::Integral,
        triggers: &["integral of", "integrate"],
        policy: MatchPolicy::Contains,
        guard: None,
    },
    RouteRule {
        intent: Intent::Solve,
        triggers: &["solve"],
        policy: MatchPolicy::Contains,
        guard: None,
    },
    RouteRule {
        intent: Intent::Arithmetic,
        triggers: &["calculate", "evaluate"],
        policy: MatchPolicy::Contains,
        guard: None,
    },
    RouteRule {
        intent: Intent::Arithmetic,
        triggers: &["what is", "what's"],
        policy: MatchPolicy::Contains,
        guard: Some(contains_operator),
    },
    RouteRule {
        intent: Intent::Recall,
        triggers: &["what is ", "who is "],
        policy: MatchPolicy::Contains,
        guard: None,
    },
    RouteRule {
        intent: Intent::Encyclopedia,
        triggers: &["tell me about", "search for", "wikipedia"],
        policy: MatchPolicy::Contains,
        guard: None,
    },
    RouteRule {
        intent: Intent::Weather,
        triggers: &["weather in"],
        policy: MatchPolicy::Contains,
        guard: None,
    },
    RouteRule {
        intent: Intent::Weather,
        triggers: &["weather"],
        policy: MatchPolicy::Exact,
        guard: None,
    },
    RouteRule {
        intent: Intent::AddTask,
        triggers: &["add todo", "add task"],
        policy: MatchPolicy::Contains,
        guard: None,
    },
    RouteRule {
        intent: Intent::ListTasks,
        triggers: &["list tasks", "show todo"],
        policy: MatchPolicy::Contains,
        guard: None,
    },
    RouteRule {
        intent: Intent::CompleteTask,
        triggers: &["mark task"],
        policy: MatchPolicy::Contains,
        guard: Some(|cmd| cmd.contains("done")),
    },
    RouteRule {
        intent: Intent::SetAlarm,
        triggers: &["set alarm for", "set alarm"],
        policy: MatchPolicy::Contains,
        guard: None,
    },
    RouteRule {
        intent: Intent::ListTimers,
        triggers: &["list reminders", "list alarms", "list timers"],
        policy: MatchPolicy::Contains,
        guard: None,
    },
    RouteRule {
        intent: Intent::CancelTimer,
        triggers: &["cancel reminder", "cancel alarm", "cancel timer"],
        policy: MatchPolicy::Contains,
        guard: None,
    },
    RouteRule {
        intent: Intent::SetReminder,
        triggers: &["remind me to", "remind me"],
        policy: MatchPolicy::Contains,
        guard: None,
    },
    RouteRule {
        intent: Intent::CreateFile,
        triggers: &["create file"],
        policy: MatchPolicy::Contains,
        guard: None,
    },
    RouteRule {
        intent: Intent::OpenFile,
        triggers: &["open file"],
        policy: MatchPolicy::Contains,
        guard: None,
    },
    RouteRule {
        intent: Intent::DeleteFile,
        triggers: &["delete file"],
        policy: MatchPolicy::Contains,
        guard: None,
    },
    RouteRule {
        intent: Intent::SendMessage,
        triggers: &["send whatsapp", "send message"],
        policy: MatchPolicy::Contains,
        guard: None,
    },
    RouteRule {
        intent: Intent::Joke,
        triggers: &["fun fact", "joke"],
        policy: MatchPolicy::Contains,
        guard: None,
    },
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteDecision {
    pub intent: Intent,
    /// The utterance with the matched trigger (and its synonyms) removed and
    /// surrounding whitespace trimmed. Empty for exact-match rules.
    pub remainder: String,
}

/// Classify a single utterance against the rule table. The utterance is
/// lowercased and trimmed for matching; callers keep the original around for
/// logging and for the generative fallback.
pub fn route(utterance: &str) -> RouteDecision {
    let cmd = normalize(utterance);

    for rule in RULES {
        let matched = match rule.policy {
            MatchPolicy::Exact => rule.triggers.iter().any(|trigger| cmd == *trigger),
            MatchPolicy::Contains => rule.triggers.iter().any(|trigger| cmd.contains(trigger)),
        };

        if !matched {
            continue;
        }
        if let Some(guard) = rule.guard {
            if !guard(&cmd) {
                continue;
            }
        }

        let remainder = match rule.policy {
            MatchPolicy::Exact => String::new(),
            MatchPolicy::Contains => strip_triggers(&cmd, rule.triggers),
        };

        return RouteDecision {
            intent: rule.intent,
            remainder,
        };
    }

    RouteDecision {
        intent: Intent::Fallback,
        remainder: cmd,
    }
}

/// Collapse interior whitespace, trim, lowercase.
pub fn normalize(input: &str) -> String {
    input
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .trim()
        .to_lowercase()
}

/// Remove the first occurrence of each declared synonym, then trim. Trigger
/// lists are declared longest phrase first so "weather in" is consumed before
/// a bare "weather" could split it apart.
fn strip_triggers(cmd: &str, triggers: &[&str]) -> String {
    let mut rest = cmd.to_string();
    for trigger in triggers {
        if let Some(position) = rest.find(trigger) {
            rest.replace_range(position..position + trigger.len(), " ");
        }
    }

    rest.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn contains_operator(cmd: &str) -> bool {
    if cmd
        .chars()
        .any(|c| matches!(c, '+' | '-' | '*' | '/' | '^' | '×' | '÷' | '%'))
    {
        return true;
    }
    if cmd.contains("divided by") {
        return true;
    }

    cmd.split_whitespace()
        .any(|token| matches!(token, "plus" | "minus" | "times" | "mod"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn weather_remainder_is_location() {
        let decision = route("weather in paris");
        assert_eq!(decision.intent, Intent::Weather);
        assert_eq!(decision.remainder, "paris");
    }

    #[test]
    fn first_match_wins_over_later_rules() {
        // Contains both "derivative of" and "calculate"; the calculus rule is
        // declared earlier, so it takes the utterance.
        let decision = route("calculate the derivative of x^2");
        assert_eq!(decision.intent, Intent::Derivative);
    }

    #[test]
    fn what_is_with_operator_goes_to_arithmetic() {
        let decision = route("what is 5 plus 3");
        assert_eq!(decision.intent, Intent::Arithmetic);
        assert_eq!(decision.remainder, "5 plus 3");
    }

    #[test]
    fn what_is_without_operator_goes_to_recall() {
        let decision = route("what is color");
        assert_eq!(decision.intent, Intent::Recall);
        assert_eq!(decision.remainder, "color");
    }

    #[test]
    fn control_commands_match_whole_utterance_only() {
        assert_eq!(route("sleep").intent, Intent::StandBy);
        assert_eq!(route("quit").intent, Intent::Shutdown);
        // A control word inside a longer sentence is not a control command.
        assert_eq!(route("how do I quit smoking").intent, Intent::Fallback);
    }

    #[test]
    fn add_task_strips_either_synonym() {
        assert_eq!(route("add todo buy milk").remainder, "buy milk");
        assert_eq!(route("add task buy milk").remainder, "buy milk");
    }

    #[test]
    fn unmatched_utterance_falls_back() {
        let decision = route("write me a haiku about rust");
        assert_eq!(decision.intent, Intent::Fallback);
    }

    #[test]
    fn matching_is_case_insensitive() {
        assert_eq!(route("Weather In Paris").remainder, "paris");
    }

    #[test]
    fn bare_weather_is_exact() {
        assert_eq!(route("weather").intent, Intent::Weather);
        assert_eq!(route("weather paris").intent, Intent::Fallback);
    }
}
