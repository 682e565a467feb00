/// Turns a free-text topic into a filename-safe suffix: whitespace runs become
/// a single `_`, characters that are illegal in file names become `_`, runs of
/// `_` collapse, and `_` or `.` left dangling at either end is dropped. Returns `None` when
/// nothing usable remains.
pub fn normalize_topic(topic: &str) -> Option<String> {
    let joined = topic
        .split_whitespace()
        .map(replace_disallowed)
        .collect::<Vec<_>>()
        .join("_");
    let cleaned = cleanup_separators(&joined);
    if cleaned.is_empty() {
        None
    } else {
        Some(cleaned)
    }
}

fn replace_disallowed(word: &str) -> String {
    word.chars()
        .map(|ch| if is_disallowed_char(ch) { '_' } else { ch })
        .collect()
}

fn cleanup_separators(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut prev_underscore = false;

    for ch in value.chars() {
        if ch == '_' {
            if prev_underscore {
                continue;
            }
            prev_underscore = true;
        } else {
            prev_underscore = false;
        }
        out.push(ch);
    }

    out.trim_matches(|c: char| c == '_' || c == '.').to_string()
}

fn is_disallowed_char(ch: char) -> bool {
    matches!(ch, '\\' | '/' | ':' | '*' | '?' | '"' | '<' | '>' | '|') || ch.is_control()
}
