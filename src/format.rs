//! Bot message formatting.
//!
//! Converts the two formatting tokens the backend emits (`**bold**` spans and
//! `•` bullets) plus line breaks into HTML markup. Rules run in a fixed order,
//! each one on the output of the previous:
//!
//! 1. `\n` becomes `<br>`
//! 2. `**text**` becomes `<strong>text</strong>` (non-greedy)
//! 3. a line starting with `•` and a space gets an `&bull; ` prefix instead
//! 4. `<br><br>` becomes a single `<br>` followed by a spacer block
//!
//! ```rust
//! use chat_widget::format::format_bot_message;
//!
//! assert_eq!(format_bot_message("hi **there**"), "hi <strong>there</strong>");
//! ```

use std::sync::LazyLock;

use regex::Regex;

/// Line break markup.
pub const LINE_BREAK: &str = "<br>";

/// Fixed-height block inserted between paragraphs.
pub const PARAGRAPH_SPACER: &str = r#"<div style="height: 8px;"></div>"#;

static BOLD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\*\*(.*?)\*\*").expect("bold pattern is valid"));

// Line breaks are already markup by the time bullets are handled, so a line
// starts either at the beginning of the text or right after a `<br>`.
static BULLET: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(^|<br>)•\s").expect("bullet pattern is valid"));

/// Format raw bot text into markup.
#[must_use]
pub fn format_bot_message(raw: &str) -> String {
    let formatted = raw.replace('\n', LINE_BREAK);
    let formatted = BOLD.replace_all(&formatted, "<strong>${1}</strong>");
    let formatted = BULLET.replace_all(&formatted, "${1}&bull; ");
    formatted.replace("<br><br>", &format!("{LINE_BREAK}{PARAGRAPH_SPACER}"))
}
