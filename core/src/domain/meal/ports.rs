use std::future::Future;

use crate::domain::{
    common::entities::app_errors::CoreError,
    feedback::value_objects::FeedbackInput,
    meal::{
        entities::{AnalysisOutcome, MealRecord},
        value_objects::{
            AnalyzeMealInput, ChatInput, ConfirmClarificationInput, SaveMealInput, ServiceStatus,
        },
    },
};

/// Remote diet service consumed by the chat controller.
#[cfg_attr(test, mockall::automock)]
pub trait DietApi: Send + Sync {
    fn analyze_meal(
        &self,
        input: AnalyzeMealInput,
    ) -> impl Future<Output = Result<AnalysisOutcome, CoreError>> + Send;

    fn confirm_clarification(
        &self,
        input: ConfirmClarificationInput,
    ) -> impl Future<Output = Result<AnalysisOutcome, CoreError>> + Send;

    fn chat(&self, input: ChatInput) -> impl Future<Output = Result<String, CoreError>> + Send;

    fn submit_feedback(
        &self,
        input: FeedbackInput,
    ) -> impl Future<Output = Result<(), CoreError>> + Send;

    fn status(&self) -> impl Future<Output = Result<ServiceStatus, CoreError>> + Send;

    fn save_meal(&self, input: SaveMealInput)
    -> impl Future<Output = Result<(), CoreError>> + Send;

    fn list_meals(&self) -> impl Future<Output = Result<Vec<MealRecord>, CoreError>> + Send;

    fn delete_meal(&self, record_id: i64) -> impl Future<Output = Result<(), CoreError>> + Send;
}
