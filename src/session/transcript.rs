use chrono::Utc;
use serde::{Deserialize, Serialize};

/// Who produced a transcript item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Agent,
}

impl Sender {
    fn suffix(&self) -> &'static str {
        match self {
            Sender::User => "user",
            Sender::Agent => "agent",
        }
    }
}

/// One finalized transcript entry for a completed turn
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriptItem {
    /// Identifier derived from the flush time plus a sender suffix
    pub id: String,
    /// Finalized text for this speaker's side of the turn
    pub text: String,
    pub sender: Sender,
    /// Always true for items produced by a turn flush
    pub is_final: bool,
}

/// Accumulates transcript fragments for the turn in progress
///
/// Fragments arrive interleaved for both directions; when the agent signals
/// turn completion, each non-blank accumulator flushes into exactly one
/// item and resets. Whitespace-only accumulations are dropped.
#[derive(Debug, Default)]
pub struct TurnBuffer {
    user: String,
    agent: String,
}

impl TurnBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append_user(&mut self, fragment: &str) {
        self.user.push_str(fragment);
    }

    pub fn append_agent(&mut self, fragment: &str) {
        self.agent.push_str(fragment);
    }

    pub fn is_empty(&self) -> bool {
        self.user.is_empty() && self.agent.is_empty()
    }

    /// Flush the completed turn into finalized items, user side first
    pub fn complete_turn(&mut self) -> Vec<TranscriptItem> {
        let stamp = Utc::now().timestamp_millis();
        let mut items = Vec::with_capacity(2);

        for (text, sender) in [
            (std::mem::take(&mut self.user), Sender::User),
            (std::mem::take(&mut self.agent), Sender::Agent),
        ] {
            if text.trim().is_empty() {
                continue;
            }
            items.push(TranscriptItem {
                id: format!("{}-{}", stamp, sender.suffix()),
                text,
                sender,
                is_final: true,
            });
        }

        items
    }
}
