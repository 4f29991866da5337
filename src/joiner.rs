// 🧵 Line Joiner - Rebuild logical entries from OCR line wraps

/// Glyphs that stand for "same surname as above"
pub const DITTO_MARKS: [char; 3] = ['"', '\u{201C}', '\u{201D}'];

pub fn starts_with_ditto(line: &str) -> bool {
    line.chars().next().is_some_and(|c| DITTO_MARKS.contains(&c))
}

/// An uppercase letter or a ditto mark starts a new resident entry
pub fn opens_entry(line: &str) -> bool {
    line.chars()
        .next()
        .is_some_and(|c| c.is_ascii_uppercase() || DITTO_MARKS.contains(&c))
}

/// Merge wrapped lines into one string per entry.
///
/// Blank lines neither open nor close an entry. Any other line that does not
/// open an entry is a continuation of the current one.
pub fn join_entries(text: &str) -> Vec<String> {
    let mut entries = Vec::new();
    let mut buffer = String::new();

    for raw in text.lines() {
        let line = raw.trim();
        if line.is_empty() {
            continue;
        }

        if opens_entry(line) {
            if !buffer.is_empty() {
                entries.push(std::mem::take(&mut buffer));
            }
        } else if !buffer.is_empty() {
            buffer.push(' ');
        }
        buffer.push_str(line);
    }

    if !buffer.is_empty() {
        entries.push(buffer);
    }

    entries
}
