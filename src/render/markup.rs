//! Markdown-ish cleanup for model output
//!
//! The model often answers with light markdown. Emphasis markers are removed
//! and list bullets at line starts become `•`.

use std::sync::LazyLock;

use regex::Regex;

static BOLD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\*\*(.+?)\*\*").expect("valid pattern"));
static ITALIC: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\*(.+?)\*").expect("valid pattern"));
static UNDERLINE_BOLD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"__(.+?)__").expect("valid pattern"));
static UNDERLINE_ITALIC: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"_(.+?)_").expect("valid pattern"));
static BULLET: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^[ \t]*[*+-][ \t]+").expect("valid pattern"));

/// Strip emphasis markup and normalize bullets
pub fn clean_markup(text: &str) -> String {
    // Bullets go first so a leading `* ` is not read as an italic opener.
    let text = BULLET.replace_all(text, "• ");
    let text = BOLD.replace_all(&text, "$1");
    let text = ITALIC.replace_all(&text, "$1");
    let text = UNDERLINE_BOLD.replace_all(&text, "$1");
    let text = UNDERLINE_ITALIC.replace_all(&text, "$1");
    text.into_owned()
}
