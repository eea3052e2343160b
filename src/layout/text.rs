use crate::fonts::TextMeasure;

/// Greedy word wrap.
///
/// Words are appended to the current line until the measured width of the
/// candidate would exceed `max_width`; the line is then committed and the word
/// starts the next one. A single word wider than `max_width` sits alone on its
/// line. Whitespace runs collapse to one space, so re-wrapping the joined
/// output reproduces the same lines.
pub fn wrap(text: &str, max_width: f32, font_size: f32, measure: &dyn TextMeasure) -> Vec<String> {
    let mut lines = Vec::new();
    let mut line = String::new();

    for word in text.split_whitespace() {
        if line.is_empty() {
            line.push_str(word);
            continue;
        }
        let candidate = format!("{line} {word}");
        if measure.width(&candidate, font_size) > max_width {
            lines.push(std::mem::replace(&mut line, word.to_string()));
        } else {
            line = candidate;
        }
    }
    if !line.is_empty() {
        lines.push(line);
    }

    lines
}
