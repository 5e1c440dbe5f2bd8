use dietchat_core::domain::{render::Markup, session::SessionState};

const STYLE: &str = "\
body{font-family:-apple-system,'PingFang SC',sans-serif;max-width:720px;margin:0 auto;background:#f5f7f5}\
.message{margin:12px 0;padding:10px 14px;border-radius:12px;background:#fff}\
.message.user{background:#e8f5e9;margin-left:20%}\
.error-message{color:#c62828}\
.score-circle{display:inline-block;width:48px;height:48px;line-height:48px;border-radius:50%;text-align:center;color:#fff}\
.score-circle.excellent{background:#2e7d32}.score-circle.good{background:#66bb6a}\
.score-circle.fair{background:#ffa726}.score-circle.poor{background:#e53935}\
.option-btn.selected{background:#4caf50;color:#fff}\
.feedback-btn.active{border-color:#4caf50}";

/// Full HTML page for the current conversation and meal records.
pub fn render_document(session: &SessionState, feed: &Markup, records: &Markup) -> String {
    format!(
        concat!(
            "<!DOCTYPE html>\n<html lang=\"zh-CN\">\n<head>\n<meta charset=\"utf-8\">\n",
            "<title>饮食助手</title>\n<style>{style}</style>\n</head>\n<body>\n",
            "<header class=\"session\" data-meal=\"{meal}\" data-busy=\"{busy}\">",
            "{icon} {meal} · {placeholder}</header>\n",
            "<main class=\"chat-messages\">{feed}</main>\n",
            "<aside class=\"meal-records\"><h3>饮食记录</h3>{records}</aside>\n",
            "</body>\n</html>\n"
        ),
        style = STYLE,
        meal = session.meal_type,
        busy = session.is_busy(),
        icon = session.meal_type.icon(),
        placeholder = session.mode.placeholder(),
        feed = feed,
        records = records,
    )
}

#[cfg(test)]
mod tests {
    use dietchat_core::domain::{meal::MealType, session::ChatMode};

    use super::*;

    #[test]
    fn test_document_embeds_feed_and_session() {
        let mut session = SessionState::new(MealType::Dinner);
        session.mode = ChatMode::FreeChat;

        let html = render_document(
            &session,
            &Markup::text("<script>"),
            &Markup::from_static("<div class=\"empty-tip\">暂无饮食记录</div>"),
        );

        assert!(html.contains("data-meal=\"晚餐\""));
        assert!(html.contains("向我咨询饮食建议..."));
        assert!(html.contains("<main class=\"chat-messages\">&lt;script&gt;</main>"));
        assert!(html.contains("暂无饮食记录"));
    }
}
