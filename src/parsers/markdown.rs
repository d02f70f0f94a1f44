use std::sync::LazyLock;

use regex::Regex;

use crate::models::ParsedDocument;

static COMMENT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<!--.*?-->").expect("comment pattern is a valid regex"));

/// `[text](target)` and `![alt](target)`
static LINK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"!?\[([^\]]*)\]\([^)]*\)").expect("link pattern is a valid regex")
});

static TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"</?[A-Za-z][^>]*>").expect("tag pattern is a valid regex"));

/// Extract headings and searchable text from a Markdown document
///
/// Handles ATX (`# Title`) and setext (`Title` over `===`) headings, skips YAML
/// front matter and HTML comments, keeps fenced code as body text and drops
/// link targets while keeping link text.
pub fn parse_markdown(text: &str) -> ParsedDocument {
    let text = COMMENT_RE.replace_all(text, "");
    let lines: Vec<&str> = text.lines().collect();
    let mut doc = ParsedDocument::new();

    let mut i = skip_front_matter(&lines);
    let mut fence: Option<&str> = None;

    while i < lines.len() {
        let line = lines[i];
        let trimmed = line.trim_start();

        if let Some(marker) = fence {
            if trimmed.starts_with(marker) {
                fence = None;
            } else {
                doc.push_text(line);
            }
            i += 1;
            continue;
        }

        if trimmed.starts_with("```") || trimmed.starts_with("~~~") {
            // The info string (```python) is not content
            fence = Some(&trimmed[..3]);
            i += 1;
            continue;
        }

        if let Some(heading) = atx_heading(trimmed) {
            doc.push_heading(&clean_inline(heading));
            i += 1;
            continue;
        }

        if !trimmed.is_empty() && lines.get(i + 1).is_some_and(|next| is_setext_underline(next)) {
            doc.push_heading(&clean_inline(trimmed));
            i += 2;
            continue;
        }

        doc.push_text(&clean_inline(line));
        i += 1;
    }

    doc
}

/// Index of the first line after a leading `---` ... `---` block
fn skip_front_matter(lines: &[&str]) -> usize {
    if lines.first().map(|l| l.trim_end()) != Some("---") {
        return 0;
    }
    match lines.iter().skip(1).position(|l| matches!(l.trim_end(), "---" | "...")) {
        Some(end) => end + 2,
        None => 0,
    }
}

fn atx_heading(line: &str) -> Option<&str> {
    let level = line.chars().take_while(|&c| c == '#').count();
    if level == 0 || level > 6 {
        return None;
    }
    let rest = &line[level..];
    if !rest.is_empty() && !rest.starts_with([' ', '\t']) {
        return None;
    }
    Some(rest.trim().trim_end_matches('#').trim_end())
}

fn is_setext_underline(line: &str) -> bool {
    let trimmed = line.trim();
    !trimmed.is_empty()
        && (trimmed.chars().all(|c| c == '=') || trimmed.chars().all(|c| c == '-'))
}

fn clean_inline(text: &str) -> String {
    let without_links = LINK_RE.replace_all(text, "$1");
    TAG_RE.replace_all(&without_links, "").into_owned()
}
