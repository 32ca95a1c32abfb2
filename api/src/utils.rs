use std::sync::OnceLock;

use regex::Regex;

static TAG_PATTERN: OnceLock<Regex> = OnceLock::new();

fn tag_pattern() -> &'static Regex {
    TAG_PATTERN.get_or_init(|| {
        // comments, then anything that looks like an opening or closing tag
        Regex::new(r"(?s)<!--.*?-->|</?[A-Za-z][^>]*>").expect("tag pattern is valid")
    })
}

/// Removes HTML tags and comments and trims surrounding whitespace. The text
/// between tags is kept as typed.
pub fn strip_markup(value: &str) -> String {
    tag_pattern().replace_all(value, "").trim().to_string()
}

/// Escapes the angle brackets `strip_markup` leaves behind.
pub fn escape_angle_brackets(value: &str) -> String {
    value.replace('<', "&lt;").replace('>', "&gt;")
}
