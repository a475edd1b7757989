use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Conversation history kept in the memory document. Oldest entries are
/// evicted first once the cap is reached.
pub const CONVERSATION_LIMIT: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Assistant,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    Shutdown,
    StandBy,
    Help,
    Remember,
    Derivative,
    Integral,
    Solve,
    Arithmetic,
    Recall,
    Encyclopedia,
    Weather,
    AddTask,
    ListTasks,
    CompleteTask,
    SetAlarm,
    SetReminder,
    ListTimers,
    CancelTimer,
    CreateFile,
    OpenFile,
    DeleteFile,
    SendMessage,
    Joke,
    Fallback,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub at: DateTime<Utc>,
    pub role: Role,
    pub text: String,
}

/// One to-do entry. Ids are millisecond timestamps taken at creation, which
/// keeps them monotonic and lets users address them by their last digits.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub id: i64,
    pub text: String,
    pub done: bool,
}

/// The whole-document shape of `memory.json`. Unknown or missing fields fall
/// back to their defaults so a stale or hand-edited file still loads.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MemoryDocument {
    #[serde(default)]
    pub facts: BTreeMap<String, String>,
    #[serde(default)]
    pub conversations: Vec<ConversationTurn>,
}

impl MemoryDocument {
    /// Append a turn and evict from the front past [`CONVERSATION_LIMIT`].
    pub fn push_turn(&mut self, role: Role, text: impl Into<String>) {
        self.conversations.push(ConversationTurn {
            at: Utc::now(),
            role,
            text: text.into(),
        });

        if self.conversations.len() > CONVERSATION_LIMIT {
            let keep_from = self.conversations.len() - CONVERSATION_LIMIT;
            self.conversations = self.conversations.split_off(keep_from);
        }
    }
}

/// What a routed command produces. `StandBy` and `Shutdown` are control
/// signals for the caller, never user-facing text, and are never written to
/// the conversation log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    Text(String),
    StandBy,
    Shutdown,
}

impl Reply {
    pub fn is_control(&self) -> bool {
        !matches!(self, Reply::Text(_))
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Reply::Text(text) => Some(text),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conversation_log_is_capped_fifo() {
        let mut memory = MemoryDocument::default();
        for n in 0..(CONVERSATION_LIMIT + 1) {
            memory.push_turn(Role::User, format!("turn {n}"));
        }

        assert_eq!(memory.conversations.len(), CONVERSATION_LIMIT);
        assert_eq!(memory.conversations[0].text, "turn 1");
        assert_eq!(
            memory.conversations.last().unwrap().text,
            format!("turn {}", CONVERSATION_LIMIT)
        );
    }
}
