use serde::Deserialize;

use crate::domain::{
    common::entities::app_errors::CoreError,
    meal::{
        entities::{AmbiguousItem, AnalysisOutcome, AnalysisResult, FoodEntry, Visualizations},
        value_objects::DEFAULT_HEALTH_SCORE,
    },
};

/// Wire shape shared by `/api/analyze-meal` and `/api/confirm-clarification`.
///
/// Every field is optional; absent arrays and numbers fall back to their
/// defaults when converted into an [`AnalysisOutcome`]. A score of 0 counts
/// as absent.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AnalysisPayload {
    pub status: Option<String>,
    pub error: Option<String>,
    pub foods: Option<Vec<FoodEntry>>,
    pub total_calories: Option<f64>,
    pub health_score: Option<f64>,
    pub dietary_advice: Option<String>,
    pub visualizations: Option<Visualizations>,
    pub clear_foods: Option<Vec<FoodEntry>>,
    pub ambiguous_items: Option<Vec<AmbiguousItem>>,
}

impl AnalysisPayload {
    pub fn into_outcome(self) -> Result<AnalysisOutcome, CoreError> {
        if let Some(error) = self.error.filter(|e| !e.is_empty()) {
            return Err(CoreError::ServerError(error));
        }

        match self.status.as_deref() {
            Some("clear") => Ok(AnalysisOutcome::Clear(AnalysisResult {
                total_calories: self.total_calories.unwrap_or_default(),
                foods: self.foods.unwrap_or_default(),
                health_score: self
                    .health_score
                    .filter(|score| *score != 0.0)
                    .unwrap_or(DEFAULT_HEALTH_SCORE),
                dietary_advice: self.dietary_advice,
                visualizations: self.visualizations.unwrap_or_default(),
            })),
            Some("need_clarification") => Ok(AnalysisOutcome::NeedsClarification {
                clear_foods: self.clear_foods.unwrap_or_default(),
                ambiguous_items: self.ambiguous_items.unwrap_or_default(),
            }),
            other => Err(CoreError::MalformedResponse(format!(
                "unexpected analysis status: {other:?}"
            ))),
        }
    }
}

/// Wire shape of `/api/chat`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChatPayload {
    pub reply: Option<String>,
    pub error: Option<String>,
}

impl ChatPayload {
    pub fn into_reply(self) -> Result<String, CoreError> {
        if let Some(error) = self.error.filter(|e| !e.is_empty()) {
            return Err(CoreError::ServerError(error));
        }
        self.reply
            .ok_or_else(|| CoreError::MalformedResponse("chat reply missing".to_string()))
    }
}

/// Body of a non-2xx answer.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ErrorPayload {
    pub error: Option<String>,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn decode(value: serde_json::Value) -> Result<AnalysisOutcome, CoreError> {
        serde_json::from_value::<AnalysisPayload>(value)
            .unwrap()
            .into_outcome()
    }

    #[test]
    fn test_clear_payload_with_missing_fields() {
        let outcome = decode(json!({ "status": "clear", "total_calories": 480 })).unwrap();
        let AnalysisOutcome::Clear(result) = outcome else {
            panic!("expected clear outcome");
        };
        assert_eq!(result.total_calories, 480.0);
        assert!(result.foods.is_empty());
        assert_eq!(result.health_score, DEFAULT_HEALTH_SCORE);
        assert_eq!(result.visualizations, Visualizations::default());
    }

    #[test]
    fn test_null_fields_fall_back() {
        let outcome = decode(json!({
            "status": "clear",
            "foods": null,
            "health_score": null,
            "visualizations": null
        }))
        .unwrap();
        let AnalysisOutcome::Clear(result) = outcome else {
            panic!("expected clear outcome");
        };
        assert_eq!(result.health_score, 70.0);
        assert_eq!(result.advice_or_default(), "请保持均衡饮食，适量摄入各类营养素。");
    }

    #[test]
    fn test_zero_score_uses_default() {
        let outcome = decode(json!({ "status": "clear", "health_score": 0 })).unwrap();
        let AnalysisOutcome::Clear(result) = outcome else {
            panic!("expected clear outcome");
        };
        assert_eq!(result.health_score, DEFAULT_HEALTH_SCORE);
    }

    #[test]
    fn test_loose_food_fields_still_render() {
        let outcome = decode(json!({
            "status": "clear",
            "total_calories": 232,
            "foods": [
                { "name": "米饭", "quantity": "一碗", "calories": null },
                { "name": "鸡蛋", "quantity": 2, "calories": "80" }
            ]
        }))
        .unwrap();
        let AnalysisOutcome::Clear(result) = outcome else {
            panic!("expected clear outcome");
        };
        assert_eq!(result.foods[0].calories, 0.0);
        assert_eq!(result.foods[1].quantity, "2");
        assert_eq!(result.foods[1].calories, 80.0);
    }

    #[test]
    fn test_loose_clarification_options() {
        let outcome = decode(json!({
            "status": "need_clarification",
            "ambiguous_items": [{
                "food": "米饭",
                "question": "几两？",
                "options": [{ "label": "二两", "value": 2, "calories": null }]
            }]
        }))
        .unwrap();
        let AnalysisOutcome::NeedsClarification { ambiguous_items, .. } = outcome else {
            panic!("expected clarification outcome");
        };
        assert_eq!(ambiguous_items[0].options[0].value, "2");
        assert_eq!(ambiguous_items[0].options[0].calories, 0.0);
    }

    #[test]
    fn test_error_takes_precedence_over_status() {
        let err = decode(json!({ "status": "clear", "error": "分析失败: timeout" })).unwrap_err();
        assert_eq!(err, CoreError::ServerError("分析失败: timeout".to_string()));
    }

    #[test]
    fn test_need_clarification_payload() {
        let outcome = decode(json!({
            "status": "need_clarification",
            "clear_foods": [{ "name": "鸡蛋", "quantity": "1个", "calories": 80 }],
            "ambiguous_items": [{
                "food": "米饭",
                "question": "请问米饭是什么分量？",
                "options": [
                    { "label": "小碗", "value": "small", "calories": 174 },
                    { "label": "大碗", "value": "large", "calories": 348 }
                ]
            }]
        }))
        .unwrap();

        let AnalysisOutcome::NeedsClarification {
            clear_foods,
            ambiguous_items,
        } = outcome
        else {
            panic!("expected clarification outcome");
        };
        assert_eq!(clear_foods.len(), 1);
        assert_eq!(ambiguous_items[0].options[1].calories, 348.0);
    }

    #[test]
    fn test_unknown_status_is_malformed() {
        assert!(matches!(
            decode(json!({ "status": "thinking" })),
            Err(CoreError::MalformedResponse(_))
        ));
        assert!(matches!(decode(json!({})), Err(CoreError::MalformedResponse(_))));
    }

    #[test]
    fn test_chat_payload() {
        let reply = ChatPayload {
            reply: Some("多喝水".to_string()),
            error: None,
        };
        assert_eq!(reply.into_reply().unwrap(), "多喝水");

        let missing = ChatPayload::default();
        assert!(matches!(
            missing.into_reply(),
            Err(CoreError::MalformedResponse(_))
        ));
    }
}
