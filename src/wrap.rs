use crate::metrics::{string_width, Face};

/// Greedy word wrap.
///
/// Lines break only at whitespace. A word wider than `max_width` is placed
/// alone on its own line and overflows. Empty input yields one empty line.
pub fn wrap_text(text: &str, face: Face, size: f32, max_width: f32) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        if current.is_empty() {
            current.push_str(word);
            continue;
        }
        let candidate = format!("{} {}", current, word);
        if string_width(&candidate, face, size) <= max_width {
            current = candidate;
        } else {
            lines.push(std::mem::replace(&mut current, word.to_string()));
        }
    }

    if !current.is_empty() {
        lines.push(current);
    }
    if lines.is_empty() {
        lines.push(String::new());
    }
    lines
}
