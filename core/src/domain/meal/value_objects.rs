use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::domain::{
    common::entities::app_errors::CoreError,
    meal::entities::{ClarifiedItem, FoodEntry},
};

/// Baseline score used when the service omits `health_score`.
pub const DEFAULT_HEALTH_SCORE: f64 = 70.0;

pub const DEFAULT_DIETARY_ADVICE: &str = "请保持均衡饮食，适量摄入各类营养素。";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum MealType {
    #[default]
    #[serde(rename = "早餐")]
    Breakfast,
    #[serde(rename = "午餐")]
    Lunch,
    #[serde(rename = "晚餐")]
    Dinner,
    #[serde(rename = "零食")]
    Snack,
}

impl MealType {
    pub const ALL: [MealType; 4] = [
        MealType::Breakfast,
        MealType::Lunch,
        MealType::Dinner,
        MealType::Snack,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MealType::Breakfast => "早餐",
            MealType::Lunch => "午餐",
            MealType::Dinner => "晚餐",
            MealType::Snack => "零食",
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            MealType::Breakfast => "🌅",
            MealType::Lunch => "☀️",
            MealType::Dinner => "🌙",
            MealType::Snack => "🍪",
        }
    }
}

impl fmt::Display for MealType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MealType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "早餐" | "breakfast" => Ok(MealType::Breakfast),
            "午餐" | "lunch" => Ok(MealType::Lunch),
            "晚餐" | "dinner" => Ok(MealType::Dinner),
            "零食" | "snack" => Ok(MealType::Snack),
            other => Err(CoreError::InvalidConfig(format!("unknown meal type: {other}"))),
        }
    }
}

/// Display band of a health score.
///
/// Scores from 50 up to (but excluding) 70 fall through to `Fair`, and a
/// score of exactly 70 is `Good`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HealthBand {
    Excellent,
    Good,
    Fair,
    Poor,
}

impl HealthBand {
    pub fn from_score(score: f64) -> Self {
        if score >= 90.0 {
            HealthBand::Excellent
        } else if score >= 70.0 {
            HealthBand::Good
        } else if score < 50.0 {
            HealthBand::Poor
        } else {
            HealthBand::Fair
        }
    }

    pub fn css_class(&self) -> &'static str {
        match self {
            HealthBand::Excellent => "excellent",
            HealthBand::Good => "good",
            HealthBand::Fair => "fair",
            HealthBand::Poor => "poor",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalyzeMealInput {
    pub meal_type: MealType,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConfirmClarificationInput {
    pub meal_type: MealType,
    pub clear_foods: Vec<FoodEntry>,
    pub clarified_items: Vec<ClarifiedItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatInput {
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SaveMealInput {
    pub meal_type: MealType,
    pub total_calories: f64,
    pub foods: Vec<FoodEntry>,
    pub advice: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ServiceStatus {
    #[serde(default)]
    pub configured: bool,
    #[serde(default)]
    pub message: Option<String>,
}
