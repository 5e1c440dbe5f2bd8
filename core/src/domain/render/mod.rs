pub mod formatter;
pub mod markup;
pub mod views;

pub use formatter::format_reply;
pub use markup::{Markup, escape_html};
