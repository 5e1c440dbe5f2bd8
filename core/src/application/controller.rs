use std::sync::{Mutex, MutexGuard, PoisonError};

use uuid::Uuid;

use crate::domain::{
    clarification::PendingClarification,
    common::{SessionConfig, entities::app_errors::CoreError},
    feed::{ActionBinding, Feed, FeedMessage, MessageBody},
    feedback::value_objects::{
        DISLIKE_REASON_PROMPT, FeedbackInput, FeedbackMode, FeedbackState, Reaction,
    },
    interaction::UserPrompt,
    meal::{
        entities::{AmbiguousItem, AnalysisOutcome, AnalysisResult, FoodEntry, MealRecord},
        ports::DietApi,
        value_objects::{AnalyzeMealInput, ChatInput, MealType, SaveMealInput},
    },
    render::{markup::Markup, views::{ResultCardView, render_meal_records}},
    session::{ChatMode, RequestKind, SessionState},
    share::{Clipboard, ImageExporter, ShareCard, ShareOutcome},
};

pub const NOT_CONFIGURED_MESSAGE: &str =
    "服务器未配置 API Key，请在 .env 文件中设置 MODELSCOPE_API_KEY";
pub const CONFIRM_RETRY_MESSAGE: &str = "网络错误，请重试";
pub const DELETE_RECORD_PROMPT: &str = "确定要删除这条记录吗？";

/// Result of a user action that may start a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Submission {
    /// Nothing happened: empty input, nothing to confirm, or another
    /// request is still outstanding.
    Ignored,
    /// The response was rendered as this feed message.
    Completed { message_id: Uuid },
}

#[derive(Debug, Default)]
struct ControllerState {
    session: SessionState,
    feed: Feed,
    records: Vec<MealRecord>,
}

impl ControllerState {
    fn render_result(
        &mut self,
        result: &AnalysisResult,
        meal_type: MealType,
        query: &str,
    ) -> (Uuid, SaveMealInput) {
        let view = ResultCardView::new(result);
        let binding = ActionBinding::new(view.share_text(), query.to_string(), FeedbackMode::Food);
        let message_id = self
            .feed
            .push_with_actions(MessageBody::Result(view), binding);

        let save = SaveMealInput {
            meal_type,
            total_calories: result.total_calories,
            foods: result.foods.clone(),
            advice: result.dietary_advice.clone(),
        };
        (message_id, save)
    }

    fn open_clarification(
        &mut self,
        description: &str,
        clear_foods: Vec<FoodEntry>,
        ambiguous_items: Vec<AmbiguousItem>,
    ) -> Uuid {
        self.close_clarification();

        let card_id = self.feed.push(MessageBody::Clarification);
        tracing::debug!(
            "awaiting {} clarification selection(s)",
            ambiguous_items.len()
        );
        self.session.pending = Some(PendingClarification::new(
            card_id,
            description.to_string(),
            clear_foods,
            ambiguous_items,
        ));
        card_id
    }

    fn close_clarification(&mut self) -> Option<PendingClarification> {
        let pending = self.session.pending.take()?;
        self.feed.remove(&pending.card_id());
        Some(pending)
    }
}

fn lock(state: &Mutex<ControllerState>) -> MutexGuard<'_, ControllerState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Marks one outstanding request. Dropping it, or completing it, clears the
/// in-flight flag, removes the loading placeholder and re-enables the
/// confirm control.
struct InFlight<'a> {
    state: &'a Mutex<ControllerState>,
    loading_id: Option<Uuid>,
    armed: bool,
}

impl InFlight<'_> {
    fn release(state: &mut ControllerState, loading_id: Option<Uuid>) {
        state.session.in_flight = None;
        if let Some(id) = loading_id {
            state.feed.remove(&id);
        }
        if let Some(pending) = state.session.pending.as_mut() {
            pending.set_confirming(false);
        }
    }

    /// Releases the request and renders its response under the same lock.
    fn complete<R>(mut self, render: impl FnOnce(&mut ControllerState) -> R) -> R {
        self.armed = false;
        let mut state = lock(self.state);
        Self::release(&mut state, self.loading_id);
        render(&mut state)
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if self.armed {
            let mut state = lock(self.state);
            Self::release(&mut state, self.loading_id);
        }
    }
}

/// Marks one feedback submission. Unless it is settled, dropping it
/// reopens the message's reaction controls.
struct PendingFeedback<'a> {
    state: &'a Mutex<ControllerState>,
    message_id: Uuid,
    armed: bool,
}

impl PendingFeedback<'_> {
    fn settle(mut self, feedback: FeedbackState) {
        self.armed = false;
        Self::set(self.state, &self.message_id, feedback);
    }

    fn set(state: &Mutex<ControllerState>, message_id: &Uuid, feedback: FeedbackState) {
        if let Some(binding) = lock(state).feed.actions_mut().get_mut(message_id) {
            binding.feedback = feedback;
        }
    }
}

impl Drop for PendingFeedback<'_> {
    fn drop(&mut self) {
        if self.armed {
            Self::set(self.state, &self.message_id, FeedbackState::Open);
        }
    }
}

/// Owns the session and the feed, and talks to the diet service.
pub struct ChatController<A: DietApi> {
    api: A,
    state: Mutex<ControllerState>,
}

impl<A: DietApi> ChatController<A> {
    pub fn new(api: A, config: SessionConfig) -> Self {
        Self {
            api,
            state: Mutex::new(ControllerState {
                session: SessionState::new(config.default_meal),
                ..ControllerState::default()
            }),
        }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    fn lock(&self) -> MutexGuard<'_, ControllerState> {
        lock(&self.state)
    }

    pub fn session(&self) -> SessionState {
        self.lock().session.clone()
    }

    pub fn is_busy(&self) -> bool {
        self.lock().session.is_busy()
    }

    pub fn confirm_enabled(&self) -> bool {
        let state = self.lock();
        !state.session.is_busy()
            && state
                .session
                .pending
                .as_ref()
                .is_some_and(PendingClarification::can_confirm)
    }

    pub fn messages(&self) -> Vec<FeedMessage> {
        self.lock().feed.messages().to_vec()
    }

    pub fn feed_len(&self) -> usize {
        self.lock().feed.len()
    }

    pub fn count_messages(&self, predicate: impl Fn(&MessageBody) -> bool) -> usize {
        self.lock().feed.count(predicate)
    }

    pub fn binding(&self, message_id: &Uuid) -> Option<ActionBinding> {
        self.lock().feed.actions().get(message_id).cloned()
    }

    pub fn render_feed(&self) -> Markup {
        let state = self.lock();
        state.feed.render(state.session.pending.as_ref())
    }

    pub fn plain_text(&self, message_id: &Uuid) -> Option<String> {
        let state = self.lock();
        let message = state.feed.get(message_id)?;
        Some(message.plain_text(state.session.pending.as_ref()))
    }

    pub fn set_meal_type(&self, meal_type: MealType) {
        self.lock().session.meal_type = meal_type;
    }

    pub fn set_mode(&self, mode: ChatMode) {
        self.lock().session.mode = mode;
    }

    /// Appends a warning when the service reports it has no model key.
    pub async fn check_status(&self) -> Option<Uuid> {
        match self.api.status().await {
            Ok(status) if !status.configured => {
                Some(self.lock().feed.push_error(NOT_CONFIGURED_MESSAGE))
            }
            Ok(_) => None,
            Err(e) => {
                tracing::warn!("Failed to check service status: {}", e);
                None
            }
        }
    }

    fn begin(
        &self,
        kind: RequestKind,
        user_message: impl FnOnce(&SessionState) -> MessageBody,
    ) -> Option<(InFlight<'_>, MealType)> {
        let mut state = self.lock();
        if state.session.is_busy() {
            tracing::debug!(
                "ignoring submission while {:?} is in flight",
                state.session.in_flight
            );
            return None;
        }

        let message = user_message(&state.session);
        state.feed.push(message);
        state.session.in_flight = Some(kind);
        let loading_id = state.feed.push(MessageBody::Loading);
        let meal_type = state.session.meal_type;

        Some((
            InFlight {
                state: &self.state,
                loading_id: Some(loading_id),
                armed: true,
            },
            meal_type,
        ))
    }

    /// Sends the input to the endpoint of the current mode and renders the
    /// answer.
    pub async fn submit(&self, text: &str) -> Submission {
        let text = text.trim();
        if text.is_empty() {
            return Submission::Ignored;
        }

        let mode = self.lock().session.mode;
        match mode {
            ChatMode::MealAnalysis => self.submit_meal(text).await,
            ChatMode::FreeChat => self.submit_chat(text).await,
        }
    }

    async fn submit_meal(&self, description: &str) -> Submission {
        let Some((in_flight, meal_type)) = self.begin(RequestKind::Analysis, |session| {
            MessageBody::UserMeal {
                meal_type: session.meal_type,
                text: description.to_string(),
            }
        }) else {
            return Submission::Ignored;
        };

        let response = self
            .api
            .analyze_meal(AnalyzeMealInput {
                meal_type,
                description: description.to_string(),
            })
            .await;

        let (message_id, save) = in_flight.complete(|state| match response {
            Ok(AnalysisOutcome::Clear(result)) => {
                let (id, save) = state.render_result(&result, meal_type, description);
                (id, Some(save))
            }
            Ok(AnalysisOutcome::NeedsClarification {
                clear_foods,
                ambiguous_items,
            }) => (
                state.open_clarification(description, clear_foods, ambiguous_items),
                None,
            ),
            Err(e) => {
                tracing::error!("Meal analysis failed: {}", e);
                (state.feed.push_error(e.user_message()), None)
            }
        });

        if let Some(save) = save {
            self.persist_meal(save).await;
        }
        Submission::Completed { message_id }
    }

    async fn submit_chat(&self, message: &str) -> Submission {
        let Some((in_flight, _)) = self.begin(RequestKind::Chat, |_| MessageBody::UserChat {
            text: message.to_string(),
        }) else {
            return Submission::Ignored;
        };

        let response = self
            .api
            .chat(ChatInput {
                message: message.to_string(),
            })
            .await;

        let message_id = in_flight.complete(|state| match response {
            Ok(reply) => {
                let binding =
                    ActionBinding::new(reply.clone(), message.to_string(), FeedbackMode::Chat);
                state
                    .feed
                    .push_with_actions(MessageBody::ChatReply { reply }, binding)
            }
            Err(e) => {
                tracing::error!("Chat request failed: {}", e);
                state.feed.push_error(e.user_message())
            }
        });

        Submission::Completed { message_id }
    }

    /// Records the answer to one clarification question. Returns whether
    /// every question is now answered.
    pub fn select_option(&self, item_index: usize, option_index: usize) -> Result<bool, CoreError> {
        let mut state = self.lock();
        let pending = state.session.pending.as_mut().ok_or(CoreError::NotFound)?;
        if pending.is_confirming() {
            return Err(CoreError::Busy);
        }
        pending.select(item_index, option_index)?;
        Ok(pending.is_complete())
    }

    /// Removes the clarification card and forgets its selections.
    pub fn remove_clarification(&self) -> bool {
        let mut state = self.lock();
        if state.session.in_flight == Some(RequestKind::Confirmation) {
            return false;
        }
        state.close_clarification().is_some()
    }

    /// Posts the collected selections and renders the final result.
    pub async fn confirm(&self) -> Submission {
        let (in_flight, input, description) = {
            let mut state = self.lock();
            if state.session.is_busy() {
                return Submission::Ignored;
            }
            let meal_type = state.session.meal_type;
            let Some(pending) = state.session.pending.as_mut() else {
                return Submission::Ignored;
            };
            if !pending.can_confirm() {
                return Submission::Ignored;
            }

            pending.set_confirming(true);
            let input = pending.confirmation_input(meal_type);
            let description = pending.description().to_string();
            state.session.in_flight = Some(RequestKind::Confirmation);

            (
                InFlight {
                    state: &self.state,
                    loading_id: None,
                    armed: true,
                },
                input,
                description,
            )
        };

        let meal_type = input.meal_type;
        tracing::debug!(
            "confirming {} clarified item(s)",
            input.clarified_items.len()
        );
        let response = self
            .api
            .confirm_clarification(input)
            .await
            .and_then(|outcome| match outcome {
                AnalysisOutcome::Clear(result) => Ok(result),
                AnalysisOutcome::NeedsClarification { .. } => Err(CoreError::MalformedResponse(
                    "confirmation answered with another clarification".to_string(),
                )),
            });

        let (message_id, save) = in_flight.complete(|state| match response {
            Ok(result) => {
                state.close_clarification();
                let (id, save) = state.render_result(&result, meal_type, &description);
                (id, Some(save))
            }
            Err(e) if e.is_semantic() => {
                state.close_clarification();
                (state.feed.push_error(e.user_message()), None)
            }
            Err(e) => {
                tracing::error!("Clarification confirmation failed: {}", e);
                (state.feed.push_error(CONFIRM_RETRY_MESSAGE), None)
            }
        });

        if let Some(save) = save {
            self.persist_meal(save).await;
        }
        Submission::Completed { message_id }
    }

    async fn persist_meal(&self, input: SaveMealInput) {
        if let Err(e) = self.api.save_meal(input).await {
            tracing::warn!("Failed to save meal record: {}", e);
            return;
        }
        if let Err(e) = self.refresh_records().await {
            tracing::warn!("Failed to reload meal records: {}", e);
        }
    }

    /// Rates an AI answer. Each answer accepts one successful rating;
    /// returns `Ok(false)` when the rating was not sent.
    pub async fn react<P: UserPrompt>(
        &self,
        message_id: Uuid,
        reaction: Reaction,
        prompt: &P,
    ) -> Result<bool, CoreError> {
        let (pending, query, response, mode) = {
            let mut state = self.lock();
            let binding = state
                .feed
                .actions_mut()
                .get_mut(&message_id)
                .ok_or(CoreError::NotFound)?;
            if !binding.feedback.accepts_reaction() {
                return Ok(false);
            }
            binding.feedback = FeedbackState::Submitting;
            (
                PendingFeedback {
                    state: &self.state,
                    message_id,
                    armed: true,
                },
                binding.query.clone(),
                binding.original_content.clone(),
                binding.mode,
            )
        };

        let reason = match reaction {
            Reaction::Dislike => prompt.prompt(DISLIKE_REASON_PROMPT).await.unwrap_or_default(),
            Reaction::Like => String::new(),
        };

        let result = self
            .api
            .submit_feedback(FeedbackInput {
                query,
                response,
                reaction,
                mode,
                reason,
            })
            .await;

        match result {
            Ok(()) => {
                pending.settle(FeedbackState::Submitted(reaction));
                Ok(true)
            }
            Err(e) => {
                tracing::warn!("Failed to submit feedback: {}", e);
                pending.settle(FeedbackState::Open);
                Err(e)
            }
        }
    }

    pub fn share_card(&self, message_id: Uuid) -> Result<ShareCard, CoreError> {
        let state = self.lock();
        let binding = state
            .feed
            .actions()
            .get(&message_id)
            .ok_or(CoreError::NotFound)?;
        Ok(ShareCard::new(message_id, binding.original_content.clone()))
    }

    /// Exports the message as an image, falling back to copying its text.
    pub async fn share<E: ImageExporter, C: Clipboard>(
        &self,
        message_id: Uuid,
        exporter: &E,
        clipboard: &C,
    ) -> Result<ShareOutcome, CoreError> {
        let card = self.share_card(message_id)?;
        match exporter.export(&card).await {
            Ok(location) => Ok(ShareOutcome::Exported(location)),
            Err(e) => {
                tracing::warn!("Share image export failed, copying text instead: {}", e);
                clipboard.copy(&card.content)?;
                Ok(ShareOutcome::CopiedToClipboard)
            }
        }
    }

    pub async fn refresh_records(&self) -> Result<Vec<MealRecord>, CoreError> {
        let records = self.api.list_meals().await?;
        self.lock().records = records.clone();
        Ok(records)
    }

    pub fn records(&self) -> Vec<MealRecord> {
        self.lock().records.clone()
    }

    pub fn render_records(&self) -> Markup {
        render_meal_records(&self.lock().records)
    }

    /// Deletes a meal record after the user confirms. Returns `Ok(false)`
    /// when the user declines.
    pub async fn delete_record<P: UserPrompt>(
        &self,
        record_id: i64,
        prompt: &P,
    ) -> Result<bool, CoreError> {
        if !prompt.confirm(DELETE_RECORD_PROMPT).await {
            return Ok(false);
        }

        self.api.delete_meal(record_id).await?;
        self.refresh_records().await?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::meal::{ports::MockDietApi, value_objects::ServiceStatus};

    #[tokio::test]
    async fn test_unconfigured_service_shows_warning() {
        let mut api = MockDietApi::new();
        api.expect_status().times(1).returning(|| {
            Box::pin(async {
                Ok(ServiceStatus {
                    configured: false,
                    message: None,
                })
            })
        });

        let controller = ChatController::new(api, SessionConfig::default());
        let id = controller.check_status().await.expect("warning rendered");
        assert_eq!(
            controller.plain_text(&id).as_deref(),
            Some(format!("⚠ {NOT_CONFIGURED_MESSAGE}").as_str())
        );
    }

    #[tokio::test]
    async fn test_status_failure_is_silent() {
        let mut api = MockDietApi::new();
        api.expect_status()
            .returning(|| Box::pin(async { Err(CoreError::Network("refused".to_string())) }));

        let controller = ChatController::new(api, SessionConfig::default());
        assert_eq!(controller.check_status().await, None);
        assert_eq!(controller.feed_len(), 0);
    }

    struct SilentPrompt;

    impl UserPrompt for SilentPrompt {
        async fn confirm(&self, _: &str) -> bool {
            false
        }

        async fn prompt(&self, _: &str) -> Option<String> {
            None
        }
    }

    #[tokio::test]
    async fn test_abandoned_feedback_reopens_reactions() {
        let mut api = MockDietApi::new();
        api.expect_chat()
            .returning(|_| Box::pin(async { Ok("多吃蔬菜".to_string()) }));
        api.expect_submit_feedback()
            .times(1)
            .returning(|_| Box::pin(std::future::pending()));

        let controller = ChatController::new(api, SessionConfig::default());
        controller.set_mode(ChatMode::FreeChat);
        let Submission::Completed { message_id } = controller.submit("晚饭吃什么").await else {
            panic!("chat should complete");
        };

        {
            let rating = controller.react(message_id, Reaction::Like, &SilentPrompt);
            tokio::pin!(rating);
            tokio::select! {
                biased;
                _ = &mut rating => panic!("feedback should still be outstanding"),
                _ = tokio::task::yield_now() => {}
            }
            assert_eq!(
                controller.binding(&message_id).unwrap().feedback,
                FeedbackState::Submitting
            );
        }

        assert_eq!(
            controller.binding(&message_id).unwrap().feedback,
            FeedbackState::Open
        );
    }

    #[tokio::test]
    async fn test_whitespace_submission_is_ignored() {
        let controller = ChatController::new(MockDietApi::new(), SessionConfig::default());
        assert_eq!(controller.submit("  \n ").await, Submission::Ignored);
        assert_eq!(controller.feed_len(), 0);
    }
}
