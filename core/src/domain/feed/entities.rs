use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::{
    clarification::PendingClarification,
    common::generate_timestamp,
    feed::bindings::{ActionBinding, ActionTable},
    meal::value_objects::MealType,
    render::{
        markup::Markup,
        views::{
            ResultCardView, render_chat_reply, render_clarification_card, render_error,
            render_loading, render_reply_actions, render_user_chat, render_user_meal,
        },
    },
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    fn css_class(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum MessageBody {
    UserMeal { meal_type: MealType, text: String },
    UserChat { text: String },
    Loading,
    Error { message: String },
    Result(ResultCardView),
    /// Rendered from the session's pending clarification.
    Clarification,
    ChatReply { reply: String },
}

impl MessageBody {
    pub fn role(&self) -> Role {
        match self {
            MessageBody::UserMeal { .. } | MessageBody::UserChat { .. } => Role::User,
            _ => Role::Assistant,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FeedMessage {
    pub id: Uuid,
    pub role: Role,
    pub body: MessageBody,
    pub created_at: DateTime<Utc>,
}

impl FeedMessage {
    pub fn new(body: MessageBody) -> Self {
        let (now, timestamp) = generate_timestamp();

        Self {
            id: Uuid::new_v7(timestamp),
            role: body.role(),
            body,
            created_at: now,
        }
    }

    /// Terminal rendering of the message. Clarification questions and
    /// options are numbered from 1.
    pub fn plain_text(&self, pending: Option<&PendingClarification>) -> String {
        match &self.body {
            MessageBody::UserMeal { meal_type, text } => {
                format!("{} {}: {}", meal_type.icon(), meal_type, text)
            }
            MessageBody::UserChat { text } => format!("💬 咨询: {text}"),
            MessageBody::Loading => "…".to_string(),
            MessageBody::Error { message } => format!("⚠ {message}"),
            MessageBody::Result(view) => view.share_text(),
            MessageBody::ChatReply { reply } => reply.clone(),
            MessageBody::Clarification => match pending {
                Some(pending) => pending
                    .ambiguous_items()
                    .iter()
                    .enumerate()
                    .map(|(index, item)| {
                        let options = item
                            .options
                            .iter()
                            .enumerate()
                            .map(|(o, option)| {
                                let mark = if pending.selected_option(index) == Some(o) {
                                    "*"
                                } else {
                                    ""
                                };
                                format!("[{}]{mark} {}", o + 1, option.label)
                            })
                            .collect::<Vec<_>>()
                            .join("  ");
                        format!("({}) {}\n    {options}", index + 1, item.question)
                    })
                    .collect::<Vec<_>>()
                    .join("\n"),
                None => String::new(),
            },
        }
    }
}

/// The scrolling message list of one session.
#[derive(Debug, Clone, Default)]
pub struct Feed {
    messages: Vec<FeedMessage>,
    actions: ActionTable,
}

impl Feed {
    pub fn push(&mut self, body: MessageBody) -> Uuid {
        let message = FeedMessage::new(body);
        let id = message.id;
        self.messages.push(message);
        id
    }

    pub fn push_with_actions(&mut self, body: MessageBody, binding: ActionBinding) -> Uuid {
        let id = self.push(body);
        self.actions.bind(id, binding);
        id
    }

    pub fn push_error(&mut self, message: impl Into<String>) -> Uuid {
        self.push(MessageBody::Error {
            message: message.into(),
        })
    }

    pub fn remove(&mut self, id: &Uuid) -> Option<FeedMessage> {
        let position = self.messages.iter().position(|m| &m.id == id)?;
        self.actions.unbind(id);
        Some(self.messages.remove(position))
    }

    pub fn get(&self, id: &Uuid) -> Option<&FeedMessage> {
        self.messages.iter().find(|m| &m.id == id)
    }

    pub fn messages(&self) -> &[FeedMessage] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn count(&self, predicate: impl Fn(&MessageBody) -> bool) -> usize {
        self.messages.iter().filter(|m| predicate(&m.body)).count()
    }

    pub fn actions(&self) -> &ActionTable {
        &self.actions
    }

    pub fn actions_mut(&mut self) -> &mut ActionTable {
        &mut self.actions
    }

    pub fn render(&self, pending: Option<&PendingClarification>) -> Markup {
        self.messages
            .iter()
            .map(|message| self.render_message(message, pending))
            .collect()
    }

    fn render_message(
        &self,
        message: &FeedMessage,
        pending: Option<&PendingClarification>,
    ) -> Markup {
        let body = match &message.body {
            MessageBody::UserMeal { meal_type, text } => render_user_meal(*meal_type, text),
            MessageBody::UserChat { text } => render_user_chat(text),
            MessageBody::Loading => render_loading(),
            MessageBody::Error { message } => render_error(message),
            MessageBody::Result(view) => view.render(),
            MessageBody::ChatReply { reply } => render_chat_reply(reply),
            MessageBody::Clarification => pending
                .filter(|p| p.card_id() == message.id)
                .map(render_clarification_card)
                .unwrap_or_default(),
        };

        let mut m = Markup::from_static(r#"<div class="message "#);
        m.push_static(message.role.css_class())
            .push_static(r#"" data-id=""#)
            .push_text(&message.id.to_string())
            .push_static(r#"">"#)
            .push_markup(&body);
        if let Some(binding) = self.actions.get(&message.id) {
            m.push_markup(&render_reply_actions(
                message.id,
                binding.mode,
                binding.feedback,
            ));
        }
        m.push_static("</div>");
        m
    }
}
