//! View models and templates for everything that appears in the feed.

use uuid::Uuid;

use crate::domain::{
    clarification::PendingClarification,
    feedback::value_objects::{FeedbackMode, FeedbackState, Reaction},
    meal::{
        entities::{AnalysisResult, FoodEntry, MealRecord, Visualizations},
        value_objects::{HealthBand, MealType},
    },
    render::{
        formatter::format_reply,
        markup::{Markup, format_number},
    },
};

pub const CONFIRM_LABEL: &str = "确认选择";
pub const CONFIRMING_LABEL: &str = "计算中...";

#[derive(Debug, Clone, PartialEq)]
pub struct ResultCardView {
    pub total_calories: f64,
    pub foods: Vec<FoodEntry>,
    pub health_score: f64,
    pub band: HealthBand,
    pub visualizations: Visualizations,
    pub dietary_advice: Option<String>,
    pub advice: String,
}

impl ResultCardView {
    pub fn new(result: &AnalysisResult) -> Self {
        Self {
            total_calories: result.total_calories,
            foods: result.foods.clone(),
            health_score: result.health_score,
            band: HealthBand::from_score(result.health_score),
            visualizations: result.visualizations,
            dietary_advice: result.dietary_advice.clone(),
            advice: result.advice_or_default().to_string(),
        }
    }

    /// Plain text used when the card is shared or rated.
    pub fn share_text(&self) -> String {
        let names = self
            .foods
            .iter()
            .map(|food| food.name.as_str())
            .collect::<Vec<_>>()
            .join("、");
        format!(
            "今日饮食：{}\n总计：{} 卡路里\n健康评分：{}分\n{}",
            names,
            format_number(self.total_calories),
            format_number(self.health_score),
            self.dietary_advice.as_deref().unwrap_or_default()
        )
    }

    pub fn render(&self) -> Markup {
        let mut m = Markup::from_static(r#"<div class="result-card"><div class="result-header"><div class="total-calories">"#);
        m.push_number(self.total_calories)
            .push_static(r#"<span> 卡路里</span></div></div><div class="food-list">"#);

        for food in &self.foods {
            m.push_static(r#"<div class="food-item"><span class="food-name">"#)
                .push_text(&food.name)
                .push_static(" ")
                .push_text(&food.quantity)
                .push_static(r#"</span><span class="food-calories">"#)
                .push_number(food.calories)
                .push_static(" 卡</span></div>");
        }

        m.push_static(r#"</div><div class="visualizations">"#);
        for (icon, value, label) in [
            ("🥤", self.visualizations.cola, "瓶可乐"),
            ("🍚", self.visualizations.rice, "碗米饭"),
            ("🏃", self.visualizations.running_km, "公里跑步"),
        ] {
            m.push_static(r#"<div class="viz-item"><div class="viz-icon">"#)
                .push_static(icon)
                .push_static(r#"</div><div class="viz-value">≈"#)
                .push_number(value)
                .push_static(r#"</div><div class="viz-label">"#)
                .push_static(label)
                .push_static("</div></div>");
        }

        m.push_static(r#"</div><div class="health-score"><div class="score-circle "#)
            .push_static(self.band.css_class())
            .push_static(r#"">"#)
            .push_number(self.health_score)
            .push_static(r#"</div><div class="score-text">健康评分</div></div>"#)
            .push_static(r#"<div class="dietary-advice"><h4>饮食建议</h4><p>"#)
            .push_text(&self.advice)
            .push_static("</p></div></div>");
        m
    }
}

pub fn render_user_meal(meal_type: MealType, text: &str) -> Markup {
    let mut m = Markup::from_static(r#"<div class="message-label">"#);
    m.push_static(meal_type.icon())
        .push_static(" ")
        .push_static(meal_type.as_str())
        .push_static(r#"</div><div class="message-content">"#)
        .push_text(text)
        .push_static("</div>");
    m
}

pub fn render_user_chat(text: &str) -> Markup {
    let mut m = Markup::from_static(
        r#"<div class="message-label">💬 咨询</div><div class="message-content">"#,
    );
    m.push_text(text).push_static("</div>");
    m
}

pub fn render_loading() -> Markup {
    Markup::from_static(
        r#"<div class="message-content"><div class="typing-indicator"><span></span><span></span><span></span></div></div>"#,
    )
}

pub fn render_error(message: &str) -> Markup {
    let mut m = Markup::from_static(r#"<div class="message-content error-message">"#);
    m.push_text(message).push_static("</div>");
    m
}

pub fn render_chat_reply(reply: &str) -> Markup {
    let mut m = Markup::from_static(r#"<div class="chat-reply">"#);
    m.push_markup(&format_reply(reply)).push_static("</div>");
    m
}

pub fn render_clarification_card(pending: &PendingClarification) -> Markup {
    let mut m = Markup::from_static(r#"<div class="clarification-card"><h4>需要确认一些信息</h4>"#);

    for (index, item) in pending.ambiguous_items().iter().enumerate() {
        let selected = pending.selected_option(index);
        m.push_static(r#"<div class="clarification-item" data-index=""#)
            .push_integer(index as i64)
            .push_static(r#""><div class="clarification-question">"#)
            .push_text(&item.question)
            .push_static(r#"</div><div class="clarification-options">"#);

        for (option_index, option) in item.options.iter().enumerate() {
            m.push_static(if selected == Some(option_index) {
                r#"<button class="option-btn selected" data-index=""#
            } else {
                r#"<button class="option-btn" data-index=""#
            })
            .push_integer(index as i64)
            .push_static(r#"" data-option=""#)
            .push_integer(option_index as i64)
            .push_static(r#"" data-value=""#)
            .push_text(&option.value)
            .push_static(r#"" data-calories=""#)
            .push_number(option.calories)
            .push_static(r#"">"#)
            .push_text(&option.label)
            .push_static("</button>");
        }
        m.push_static("</div></div>");
    }

    m.push_static(r#"<button class="confirm-clarification-btn""#);
    if !pending.can_confirm() {
        m.push_static(" disabled");
    }
    m.push_static(">")
        .push_static(if pending.is_confirming() {
            CONFIRMING_LABEL
        } else {
            CONFIRM_LABEL
        })
        .push_static("</button></div>");
    m
}

pub fn render_reply_actions(message_id: Uuid, mode: FeedbackMode, state: FeedbackState) -> Markup {
    let mut m = Markup::from_static(r#"<div class="reply-actions" data-message-id=""#);
    m.push_text(&message_id.to_string())
        .push_static(r#"" data-mode=""#)
        .push_static(match mode {
            FeedbackMode::Food => "food",
            FeedbackMode::Chat => "chat",
        })
        .push_static(r#"">"#);

    for (reaction, class, icon) in [
        (Reaction::Like, "like-feedback", "👍"),
        (Reaction::Dislike, "dislike-feedback", "👎"),
    ] {
        m.push_static(r#"<button class="feedback-btn "#).push_static(class);
        match state {
            FeedbackState::Submitted(chosen) if chosen == reaction => {
                m.push_static(r#" active" disabled>"#);
            }
            FeedbackState::Open => {
                m.push_static(r#"">"#);
            }
            _ => {
                m.push_static(r#"" disabled>"#);
            }
        }
        m.push_static("<span>")
            .push_static(icon)
            .push_static("</span></button>");
    }

    m.push_static(r#"<button class="share-btn">分享</button></div>"#);
    m
}

pub fn render_meal_records(records: &[MealRecord]) -> Markup {
    if records.is_empty() {
        return Markup::from_static(r#"<div class="empty-tip">暂无饮食记录</div>"#);
    }

    records
        .iter()
        .map(|record| {
            let names = record.food_names();
            let mut m = Markup::from_static(r#"<div class="record-item" data-id=""#);
            m.push_integer(record.id)
                .push_static(r#""><div class="record-header"><span class="record-icon">"#)
                .push_static(record.icon())
                .push_static(r#"</span><span class="record-type">"#)
                .push_text(&record.meal_type)
                .push_static(r#"</span><span class="record-date">"#)
                .push_text(record.short_date().as_deref().unwrap_or_default())
                .push_static(r#"</span><span class="record-calories">"#)
                .push_number(record.total_calories.unwrap_or_default())
                .push_static(r#" 卡</span></div><div class="record-foods">"#)
                .push_text(if names.is_empty() { "无详情" } else { &names })
                .push_static("</div>");

            if record.likes > 0 || record.dislikes > 0 {
                m.push_static(r#"<div class="record-reactions">"#);
                if record.likes > 0 {
                    m.push_static(r#"<span class="reaction-stat like-stat">👍 "#)
                        .push_integer(record.likes.into())
                        .push_static("</span>");
                }
                if record.dislikes > 0 {
                    m.push_static(r#"<span class="reaction-stat dislike-stat">👎 "#)
                        .push_integer(record.dislikes.into())
                        .push_static("</span>");
                }
                m.push_static("</div>");
            }

            m.push_static(r#"<button class="record-delete">删除</button></div>"#);
            m
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::meal::entities::{AmbiguousItem, ClarificationOption};

    fn result(score: f64) -> AnalysisResult {
        AnalysisResult {
            total_calories: 406.0,
            foods: vec![
                FoodEntry {
                    name: "米饭".to_string(),
                    quantity: "中碗".to_string(),
                    calories: 232.0,
                },
                FoodEntry {
                    name: "<炒青菜>".to_string(),
                    quantity: "1份".to_string(),
                    calories: 174.0,
                },
            ],
            health_score: score,
            dietary_advice: Some("搭配合理 & 清淡".to_string()),
            visualizations: Visualizations {
                cola: 1.5,
                rice: 1.8,
                running_km: 6.8,
            },
        }
    }

    #[test]
    fn test_result_card_contents() {
        let html = ResultCardView::new(&result(85.0)).render().into_string();
        assert!(html.contains(r#"<div class="total-calories">406<span> 卡路里</span>"#));
        assert!(html.contains("&lt;炒青菜&gt; 1份"));
        assert!(html.contains(r#"<div class="score-circle good">85</div>"#));
        assert!(html.contains("≈1.5"));
        assert!(html.contains("搭配合理 &amp; 清淡"));
        assert!(!html.contains("<炒青菜>"));
    }

    #[test]
    fn test_result_card_bands() {
        for (score, class) in [(95.0, "excellent"), (70.0, "good"), (60.0, "fair"), (30.0, "poor")] {
            let html = ResultCardView::new(&result(score)).render().into_string();
            assert!(html.contains(&format!("score-circle {class}\"")), "{score}");
        }
    }

    #[test]
    fn test_share_text() {
        let view = ResultCardView::new(&result(85.0));
        assert_eq!(
            view.share_text(),
            "今日饮食：米饭、<炒青菜>\n总计：406 卡路里\n健康评分：85分\n搭配合理 & 清淡"
        );

        let mut bare = result(70.0);
        bare.dietary_advice = None;
        let view = ResultCardView::new(&bare);
        assert!(view.share_text().ends_with("健康评分：70分\n"));
        assert_eq!(view.advice, "请保持均衡饮食，适量摄入各类营养素。");
    }

    #[test]
    fn test_clarification_card_confirm_state() {
        let mut pending = PendingClarification::new(
            Uuid::nil(),
            "米饭和可乐".to_string(),
            vec![],
            vec![AmbiguousItem {
                food: "可乐".to_string(),
                question: "请问可乐是<多大>杯？".to_string(),
                options: vec![
                    ClarificationOption {
                        label: "小杯 (300ml)".to_string(),
                        value: "small".to_string(),
                        calories: 130.0,
                    },
                    ClarificationOption {
                        label: "大杯 \"700ml\"".to_string(),
                        value: "large".to_string(),
                        calories: 300.0,
                    },
                ],
            }],
        );

        let html = render_clarification_card(&pending).into_string();
        assert!(html.contains("请问可乐是&lt;多大&gt;杯？"));
        assert!(html.contains(r#"<button class="confirm-clarification-btn" disabled>确认选择</button>"#));
        assert!(html.contains("大杯 &quot;700ml&quot;"));

        pending.select(0, 1).unwrap();
        let html = render_clarification_card(&pending).into_string();
        assert!(html.contains(r#"<button class="option-btn selected" data-index="0" data-option="1""#));
        assert!(html.contains(r#"<button class="confirm-clarification-btn">确认选择</button>"#));

        pending.set_confirming(true);
        let html = render_clarification_card(&pending).into_string();
        assert!(html.contains(r#"<button class="confirm-clarification-btn" disabled>计算中...</button>"#));
    }

    #[test]
    fn test_reply_actions_disable_after_submission() {
        let open = render_reply_actions(Uuid::nil(), FeedbackMode::Chat, FeedbackState::Open);
        assert!(!open.as_str().contains("disabled"));

        let done = render_reply_actions(
            Uuid::nil(),
            FeedbackMode::Food,
            FeedbackState::Submitted(Reaction::Dislike),
        )
        .into_string();
        assert!(done.contains(r#"<button class="feedback-btn like-feedback" disabled>"#));
        assert!(done.contains(r#"<button class="feedback-btn dislike-feedback active" disabled>"#));
    }

    #[test]
    fn test_meal_records() {
        assert_eq!(
            render_meal_records(&[]).as_str(),
            r#"<div class="empty-tip">暂无饮食记录</div>"#
        );

        let record: MealRecord = serde_json::from_value(serde_json::json!({
            "id": 3,
            "meal_type": "晚餐",
            "foods": [{"name": "饺子", "quantity": "10个", "calories": 400}],
            "total_calories": 400,
            "created_at": "2024-11-20 19:05",
            "likes": 2
        }))
        .unwrap();
        let html = render_meal_records(&[record]).into_string();
        assert!(html.contains(r#"<span class="record-icon">🌙</span>"#));
        assert!(html.contains(r#"<span class="record-date">11/20</span>"#));
        assert!(html.contains("400 卡"));
        assert!(html.contains("👍 2"));
        assert!(!html.contains("👎"));
    }

    #[test]
    fn test_user_messages_escape() {
        let html = render_user_meal(MealType::Snack, "<img src=x>").into_string();
        assert!(html.starts_with(r#"<div class="message-label">🍪 零食</div>"#));
        assert!(html.contains("&lt;img src=x&gt;"));

        let html = render_chat_reply("**a** <b>").into_string();
        assert_eq!(
            html,
            r#"<div class="chat-reply"><p><strong>a</strong> &lt;b&gt;</p></div>"#
        );
    }
}
