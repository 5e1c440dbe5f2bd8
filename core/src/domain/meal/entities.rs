use chrono::{Datelike, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::domain::meal::{
    lenient,
    value_objects::{DEFAULT_DIETARY_ADVICE, MealType},
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FoodEntry {
    #[serde(default, deserialize_with = "lenient::text")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient::text")]
    pub quantity: String,
    #[serde(default, deserialize_with = "lenient::number")]
    pub calories: f64,
}

/// Everyday equivalents of a calorie total, computed by the service.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Visualizations {
    #[serde(default, deserialize_with = "lenient::number")]
    pub cola: f64,
    #[serde(default, deserialize_with = "lenient::number")]
    pub rice: f64,
    #[serde(default, deserialize_with = "lenient::number")]
    pub running_km: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClarificationOption {
    #[serde(default, deserialize_with = "lenient::text")]
    pub label: String,
    #[serde(default, deserialize_with = "lenient::text")]
    pub value: String,
    #[serde(default, deserialize_with = "lenient::number")]
    pub calories: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AmbiguousItem {
    #[serde(default, deserialize_with = "lenient::text")]
    pub food: String,
    #[serde(default, deserialize_with = "lenient::text")]
    pub question: String,
    #[serde(default, deserialize_with = "lenient::list")]
    pub options: Vec<ClarificationOption>,
}

/// A user's answer to one ambiguous item, in the shape the confirmation
/// endpoint expects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClarifiedItem {
    pub food: String,
    pub value: String,
    pub calories: f64,
    pub selected_label: String,
}

impl ClarifiedItem {
    pub fn from_option(item: &AmbiguousItem, option: &ClarificationOption) -> Self {
        Self {
            food: item.food.clone(),
            value: option.value.clone(),
            calories: option.calories,
            selected_label: option.label.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisResult {
    pub total_calories: f64,
    pub foods: Vec<FoodEntry>,
    pub health_score: f64,
    pub dietary_advice: Option<String>,
    pub visualizations: Visualizations,
}

impl AnalysisResult {
    pub fn advice_or_default(&self) -> &str {
        match self.dietary_advice.as_deref() {
            Some(advice) if !advice.is_empty() => advice,
            _ => DEFAULT_DIETARY_ADVICE,
        }
    }
}

/// Decoded answer of the analysis and confirmation endpoints.
#[derive(Debug, Clone, PartialEq)]
pub enum AnalysisOutcome {
    Clear(AnalysisResult),
    NeedsClarification {
        clear_foods: Vec<FoodEntry>,
        ambiguous_items: Vec<AmbiguousItem>,
    },
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MealRecord {
    pub id: i64,
    pub meal_type: String,
    #[serde(default)]
    pub foods: Vec<FoodEntry>,
    #[serde(default)]
    pub total_calories: Option<f64>,
    #[serde(default)]
    pub health_score: Option<f64>,
    #[serde(default, alias = "advice")]
    pub dietary_advice: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub likes: u32,
    #[serde(default)]
    pub dislikes: u32,
}

impl MealRecord {
    pub fn icon(&self) -> &'static str {
        self.meal_type
            .parse::<MealType>()
            .map(|meal| meal.icon())
            .unwrap_or("🍽️")
    }

    /// `M/D` date of the record, if the server sent a parseable timestamp.
    pub fn short_date(&self) -> Option<String> {
        let raw = self.created_at.as_deref()?;
        let parsed = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M")
            .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f"))
            .ok()?;
        Some(format!("{}/{}", parsed.month(), parsed.day()))
    }

    pub fn food_names(&self) -> String {
        self.foods
            .iter()
            .map(|food| food.name.as_str())
            .collect::<Vec<_>>()
            .join("、")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_meal_record_decodes_server_shape() {
        let record: MealRecord = serde_json::from_value(serde_json::json!({
            "id": 7,
            "meal_type": "午餐",
            "foods": [{"name": "米饭", "quantity": "中碗", "calories": 232}],
            "total_calories": 232,
            "health_score": null,
            "dietary_advice": "多吃蔬菜",
            "created_at": "2024-03-05 12:30"
        }))
        .unwrap();

        assert_eq!(record.icon(), "☀️");
        assert_eq!(record.short_date().as_deref(), Some("3/5"));
        assert_eq!(record.food_names(), "米饭");
        assert_eq!(record.likes, 0);
    }

    #[test]
    fn test_meal_record_unknown_type_and_date() {
        let record: MealRecord = serde_json::from_value(serde_json::json!({
            "id": 1,
            "meal_type": "夜宵",
            "created_at": "yesterday"
        }))
        .unwrap();

        assert_eq!(record.icon(), "🍽️");
        assert_eq!(record.short_date(), None);
        assert_eq!(record.food_names(), "");
    }

    #[test]
    fn test_model_fields_decode_leniently() {
        let item: AmbiguousItem = serde_json::from_value(serde_json::json!({
            "food": "米饭",
            "question": null,
            "options": [
                { "label": "两", "value": 2, "calories": null },
                { "label": "一碗", "value": "bowl", "calories": "232" }
            ]
        }))
        .unwrap();

        assert_eq!(item.question, "");
        assert_eq!(item.options[0].value, "2");
        assert_eq!(item.options[0].calories, 0.0);
        assert_eq!(item.options[1].calories, 232.0);

        let food: FoodEntry =
            serde_json::from_value(serde_json::json!({ "name": "鸡蛋", "quantity": 2, "calories": null }))
                .unwrap();
        assert_eq!(food.quantity, "2");
        assert_eq!(food.calories, 0.0);
    }
}
