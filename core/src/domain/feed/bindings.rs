use std::collections::HashMap;

use uuid::Uuid;

use crate::domain::feedback::value_objects::{FeedbackMode, FeedbackState};

/// Feedback and share state attached to one AI message.
#[derive(Debug, Clone, PartialEq)]
pub struct ActionBinding {
    /// Unescaped text of the answer; this is what gets rated and shared.
    pub original_content: String,
    /// What the user asked: the chat message for chat replies, and the meal
    /// description for result cards.
    pub query: String,
    pub mode: FeedbackMode,
    pub feedback: FeedbackState,
}

impl ActionBinding {
    pub fn new(original_content: String, query: String, mode: FeedbackMode) -> Self {
        Self {
            original_content,
            query,
            mode,
            feedback: FeedbackState::Open,
        }
    }
}

/// Message actions keyed by message id.
#[derive(Debug, Clone, Default)]
pub struct ActionTable {
    bindings: HashMap<Uuid, ActionBinding>,
}

impl ActionTable {
    pub fn bind(&mut self, message_id: Uuid, binding: ActionBinding) {
        self.bindings.insert(message_id, binding);
    }

    pub fn unbind(&mut self, message_id: &Uuid) -> Option<ActionBinding> {
        self.bindings.remove(message_id)
    }

    pub fn get(&self, message_id: &Uuid) -> Option<&ActionBinding> {
        self.bindings.get(message_id)
    }

    pub fn get_mut(&mut self, message_id: &Uuid) -> Option<&mut ActionBinding> {
        self.bindings.get_mut(message_id)
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}
