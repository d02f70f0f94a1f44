use crate::models::ParsedDocument;

/// Extract headings and searchable text from a reStructuredText document
///
/// A heading is a text line underlined (and optionally overlined) by one
/// repeated punctuation character at least as long as the text. Comment
/// lines (`.. ` without `::`) are skipped; directive lines are kept.
pub fn parse_rst(text: &str) -> ParsedDocument {
    let lines: Vec<&str> = text.lines().collect();
    let mut doc = ParsedDocument::new();
    let mut i = 0;

    while i < lines.len() {
        let line = lines[i];

        // Overlined heading: ===== / Title / =====
        if let Some(adornment) = adornment_char(line)
            && let (Some(title), Some(under)) = (lines.get(i + 1), lines.get(i + 2))
            && adornment_char(under) == Some(adornment)
            && !title.trim().is_empty()
            && under.trim().chars().count() >= title.trim().chars().count()
        {
            doc.push_heading(title.trim());
            i += 3;
            continue;
        }

        if !line.trim().is_empty()
            && !line.starts_with([' ', '\t'])
            && adornment_char(line).is_none()
            && let Some(under) = lines.get(i + 1)
            && adornment_char(under).is_some()
            && under.trim().chars().count() >= line.trim().chars().count()
        {
            doc.push_heading(line.trim());
            i += 2;
            continue;
        }

        if is_comment(line) {
            i += 1;
            // Indented continuation lines belong to the comment
            while i < lines.len() && lines[i].starts_with([' ', '\t']) {
                i += 1;
            }
            continue;
        }

        doc.push_text(line);
        i += 1;
    }

    doc
}

/// The repeated punctuation character of an adornment line, if it is one
fn adornment_char(line: &str) -> Option<char> {
    let trimmed = line.trim_end();
    let first = trimmed.chars().next()?;
    if !first.is_ascii_punctuation() || trimmed.chars().count() < 2 {
        return None;
    }
    trimmed.chars().all(|c| c == first).then_some(first)
}

fn is_comment(line: &str) -> bool {
    let trimmed = line.trim_end();
    (trimmed == ".." || trimmed.starts_with(".. ")) && !trimmed.contains("::")
}
