use serde::{Deserialize, Serialize};

/// Words that, if any appears as a whole word in a message, select a reply.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TriggerSpec {
    pub words: Vec<String>,
    pub reply: ReplyPool,
}

impl TriggerSpec {
    pub fn new<I, S>(words: I, reply: ReplyPool) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            words: words.into_iter().map(Into::into).collect(),
            reply,
        }
    }

    /// Lower-cased, trimmed, sorted and de-duplicated words. Blank words are dropped.
    pub fn normalized_words(&self) -> Vec<String> {
        let mut words: Vec<String> = self
            .words
            .iter()
            .map(|w| w.trim().to_lowercase())
            .filter(|w| !w.is_empty())
            .collect();
        words.sort();
        words.dedup();
        words
    }

    /// Identity of the word set, independent of order and case.
    pub fn canonical_key(&self) -> String {
        self.normalized_words().join("\u{1f}")
    }
}

/// Reply text for a trigger: a fixed string or a pool to pick from.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum ReplyPool {
    One(String),
    Many(Vec<String>),
}

impl From<&str> for ReplyPool {
    fn from(value: &str) -> Self {
        ReplyPool::One(value.to_string())
    }
}

/// Outcome of matching one incoming message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BotReplyDecision {
    pub incoming_message: String,
    /// The slice of the message that matched a trigger word.
    pub matched_trigger: String,
    pub chosen_reply: String,
}
