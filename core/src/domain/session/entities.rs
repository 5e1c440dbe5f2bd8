use crate::domain::{clarification::PendingClarification, meal::value_objects::MealType};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChatMode {
    #[default]
    MealAnalysis,
    FreeChat,
}

impl ChatMode {
    pub fn placeholder(&self) -> &'static str {
        match self {
            ChatMode::MealAnalysis => "输入您的饮食内容...",
            ChatMode::FreeChat => "向我咨询饮食建议...",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestKind {
    Analysis,
    Chat,
    Confirmation,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkflowPhase {
    Idle,
    AwaitingAnalysis,
    AwaitingSelections,
    AwaitingConfirmResult,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct SessionState {
    pub meal_type: MealType,
    pub mode: ChatMode,
    pub in_flight: Option<RequestKind>,
    pub pending: Option<PendingClarification>,
}

impl SessionState {
    pub fn new(meal_type: MealType) -> Self {
        Self {
            meal_type,
            ..Self::default()
        }
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight.is_some()
    }

    /// The send control is enabled whenever nothing is in flight.
    pub fn input_enabled(&self) -> bool {
        !self.is_busy()
    }

    pub fn phase(&self) -> WorkflowPhase {
        match (self.in_flight, &self.pending) {
            (Some(RequestKind::Confirmation), _) => WorkflowPhase::AwaitingConfirmResult,
            (Some(_), _) => WorkflowPhase::AwaitingAnalysis,
            (None, Some(_)) => WorkflowPhase::AwaitingSelections,
            (None, None) => WorkflowPhase::Idle,
        }
    }
}
