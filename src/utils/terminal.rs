//! Terminal output sanitization
//!
//! Titles and summaries printed by `search` come straight from indexed pages
//! (or from an index file someone else produced), so they may carry escape
//! sequences. Everything shown in text mode goes through [`sanitize_line`].
//! JSON output is escaped by serde and does not need this.

/// Make untrusted text safe to print as a single terminal line
///
/// Removes ANSI CSI (`ESC [ ... letter`) and OSC (`ESC ] ... BEL` or
/// `ESC \`) sequences and other control characters, and folds runs of
/// whitespace (newlines included) into single spaces.
///
/// # Examples
///
/// ```
/// use doc_search::utils::terminal::sanitize_line;
///
/// assert_eq!(sanitize_line("\x1b[31mTabu\x1b[0m\nGRASP"), "Tabu GRASP");
/// ```
pub fn sanitize_line(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    let mut pending_space = false;

    while let Some(ch) = chars.next() {
        if ch == '\x1b' {
            match chars.peek() {
                Some('[') => {
                    chars.next();
                    // CSI ends at the first letter
                    for next_ch in chars.by_ref() {
                        if next_ch.is_ascii_alphabetic() {
                            break;
                        }
                    }
                }
                Some(']') => {
                    chars.next();
                    while let Some(next_ch) = chars.next() {
                        if next_ch == '\x07' {
                            break;
                        }
                        if next_ch == '\x1b' && chars.peek() == Some(&'\\') {
                            chars.next();
                            break;
                        }
                    }
                }
                _ => {}
            }
            continue;
        }

        if ch.is_whitespace() {
            pending_space = !result.is_empty();
            continue;
        }

        if ch.is_control() {
            continue;
        }

        if pending_space {
            result.push(' ');
            pending_space = false;
        }
        result.push(ch);
    }

    result
}
