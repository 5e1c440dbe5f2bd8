use std::fmt;

/// Escapes text for insertion into HTML element content or a quoted
/// attribute.
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// An HTML fragment that is safe to hand to a renderer.
///
/// Outside this crate a `Markup` can only be produced from escaped text or
/// from `'static` template literals, so dynamic text always goes through
/// [`escape_html`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Markup(String);

impl Markup {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(text: &str) -> Self {
        Self(escape_html(text))
    }

    pub fn from_static(template: &'static str) -> Self {
        Self(template.to_string())
    }

    /// Wraps a string that is already escaped markup.
    pub(crate) fn from_escaped(markup: String) -> Self {
        Self(markup)
    }

    pub fn push_static(&mut self, template: &'static str) -> &mut Self {
        self.0.push_str(template);
        self
    }

    pub fn push_text(&mut self, text: &str) -> &mut Self {
        self.0.push_str(&escape_html(text));
        self
    }

    pub fn push_markup(&mut self, markup: &Markup) -> &mut Self {
        self.0.push_str(&markup.0);
        self
    }

    pub fn push_number(&mut self, value: f64) -> &mut Self {
        self.0.push_str(&format_number(value));
        self
    }

    pub fn push_integer(&mut self, value: i64) -> &mut Self {
        self.0.push_str(&value.to_string());
        self
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for Markup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromIterator<Markup> for Markup {
    fn from_iter<I: IntoIterator<Item = Markup>>(iter: I) -> Self {
        let mut out = Markup::new();
        for markup in iter {
            out.push_markup(&markup);
        }
        out
    }
}

/// Formats a number the way a browser prints a JSON number: integral values
/// have no fractional part.
pub fn format_number(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 {
        format!("{value:.0}")
    } else {
        value.to_string()
    }
}
