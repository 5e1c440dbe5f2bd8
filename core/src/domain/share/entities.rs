use uuid::Uuid;

use crate::domain::render::{formatter::format_reply, markup::Markup};

/// A shareable rendering of one AI message.
#[derive(Debug, Clone, PartialEq)]
pub struct ShareCard {
    pub message_id: Uuid,
    /// Original unescaped text, also used for the clipboard fallback.
    pub content: String,
    pub markup: Markup,
}

impl ShareCard {
    pub fn new(message_id: Uuid, content: String) -> Self {
        let markup = format_reply(&content);
        Self {
            message_id,
            content,
            markup,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShareOutcome {
    /// The image collaborator produced an image at this location.
    Exported(String),
    CopiedToClipboard,
}
