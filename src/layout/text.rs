use crate::units::Px;

/// Splits `text` into display lines of at most `max_line_length` characters.
///
/// Words are separated by single spaces and accumulated into a line buffer, each
/// followed by one separator space. A new line is started whenever the buffer
/// plus the next word would exceed `max_line_length`; since that check only runs
/// against a non-empty buffer, a word longer than the limit is never split and
/// ends up alone on an oversized line.
///
/// Lengths are counted in Unicode scalar values. Runs of spaces do not produce
/// empty words, and a line is only emitted when it has visible content, so an
/// empty (or all-space) `text` yields no lines at all. A `max_line_length` of 0
/// behaves like 1.
///
/// ```
/// use jokexp::layout::wrap;
///
/// let lines = wrap("Pourquoi les plongeurs plongent-ils toujours en arrière ?", 20);
/// assert_eq!(lines, ["Pourquoi les", "plongeurs", "plongent-ils", "toujours en arrière", "?"]);
/// ```
pub fn wrap(text: &str, max_line_length: usize) -> Vec<String> {
    let max_line_length = max_line_length.max(1);

    let mut lines: Vec<String> = Vec::new();
    let mut current = String::new();
    // tracked separately so we don't re-count the buffer for every word
    let mut current_len = 0usize;

    for word in text.split(' ').filter(|w| !w.is_empty()) {
        let word_len = word.chars().count();

        if current_len > 0 && current_len + word_len > max_line_length {
            push_trimmed(&mut lines, &current);
            current.clear();
            current_len = 0;
        }

        current.push_str(word);
        current.push(' ');
        current_len += word_len + 1;
    }

    push_trimmed(&mut lines, &current);
    lines
}

fn push_trimmed(lines: &mut Vec<String>, buffer: &str) {
    let line = buffer.trim();
    if !line.is_empty() {
        lines.push(line.to_string());
    }
}

/// A wrapped line along with where its baseline sits on the canvas
#[derive(Clone, PartialEq, Debug)]
pub struct PlacedLine {
    pub text: String,
    /// Vertical position of the baseline, measured from the top of the canvas.
    /// Lines are always centred horizontally.
    pub baseline: Px,
}

/// Assigns each line a baseline, starting at `first_baseline` and moving down by
/// `line_height` per line
pub fn place_lines<I, S>(lines: I, first_baseline: Px, line_height: Px) -> Vec<PlacedLine>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    lines
        .into_iter()
        .enumerate()
        .map(|(i, text)| PlacedLine {
            text: text.into(),
            baseline: first_baseline + line_height * i as f32,
        })
        .collect()
}
