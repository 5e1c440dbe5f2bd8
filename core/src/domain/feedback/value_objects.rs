use serde::{Deserialize, Serialize};

pub const DISLIKE_REASON_PROMPT: &str = "请输入不满意的原因（可选）：";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Reaction {
    Like,
    Dislike,
}

/// Which kind of AI answer the feedback is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedbackMode {
    Food,
    Chat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FeedbackState {
    #[default]
    Open,
    Submitting,
    Submitted(Reaction),
}

impl FeedbackState {
    pub fn accepts_reaction(&self) -> bool {
        matches!(self, FeedbackState::Open)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeedbackInput {
    pub query: String,
    pub response: String,
    #[serde(rename = "type")]
    pub reaction: Reaction,
    pub mode: FeedbackMode,
    pub reason: String,
}
