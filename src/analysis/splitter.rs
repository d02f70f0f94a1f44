use std::sync::LazyLock;

use regex::Regex;

static WORD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\w+").expect("word pattern is a valid regex"));

/// Split text into words: every maximal run of Unicode word characters
///
/// Word characters are letters, digits, combining marks and the underscore, so
/// identifiers such as `best_cost` or `__init__` survive as single words.
pub fn split_words(text: &str) -> Vec<String> {
    WORD_RE.find_iter(text).map(|m| m.as_str().to_string()).collect()
}
