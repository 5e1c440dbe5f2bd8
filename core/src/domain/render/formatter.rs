use std::sync::LazyLock;

use regex::Regex;

use crate::domain::render::markup::{Markup, escape_html};

static BOLD_STARS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\*\*(.+?)\*\*").unwrap());
static BOLD_UNDERSCORES: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"__(.+?)__").unwrap());
static ITALIC_STAR: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\*(.+?)\*").unwrap());
static ITALIC_UNDERSCORE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"_(.+?)_").unwrap());
static ORDERED_ITEM: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?m)^(\d+)\.\s+").unwrap());
static BULLET_ITEM: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?m)^[-*]\s+").unwrap());

/// Converts an AI reply into paragraph markup.
///
/// The text is escaped first and the markdown subset is substituted
/// afterwards, so the tags emitted here are the only markup in the output.
pub fn format_reply(text: &str) -> Markup {
    let escaped = escape_html(text);

    let formatted = BOLD_STARS.replace_all(&escaped, "<strong>${1}</strong>");
    let formatted = BOLD_UNDERSCORES.replace_all(&formatted, "<strong>${1}</strong>");
    let formatted = ITALIC_STAR.replace_all(&formatted, "<em>${1}</em>");
    let formatted = ITALIC_UNDERSCORE.replace_all(&formatted, "<em>${1}</em>");
    let formatted = ORDERED_ITEM.replace_all(&formatted, r#"<span class="list-number">${1}.</span> "#);
    let formatted = BULLET_ITEM.replace_all(&formatted, r#"<span class="list-bullet">•</span> "#);

    let formatted = formatted.replace("\n\n", "</p><p>").replace('\n', "<br>");

    Markup::from_escaped(format!("<p>{formatted}</p>"))
}
