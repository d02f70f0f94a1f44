use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};

// Same characters as JavaScript's encodeURIComponent leaves alone
const COMPONENT_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// How result links are formed for the rendered site
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkOptions {
    /// Prefix for every link (`https://example.org/docs/`, or empty for relative links)
    pub url_root: String,
    /// Appended to the docname for file-per-page sites
    pub file_suffix: String,
    /// Directory-per-page site (`content/tabu/` instead of `content/tabu.html`)
    pub dirhtml: bool,
}

impl Default for LinkOptions {
    fn default() -> Self {
        Self { url_root: String::new(), file_suffix: ".html".to_string(), dirhtml: false }
    }
}

/// Link to a result page with the query words to highlight
///
/// # Examples
///
/// ```
/// use doc_search::search::{LinkOptions, result_link};
///
/// let link = result_link("content/04_tabu_grasp", &["tabu".into()], &LinkOptions::default());
/// assert_eq!(link, "content/04_tabu_grasp.html?highlight=tabu");
/// ```
pub fn result_link(docname: &str, highlight_terms: &[String], options: &LinkOptions) -> String {
    let mut link = options.url_root.clone();
    if options.dirhtml {
        // index pages are served as their directory
        let dir =
            if docname == "index" { "" } else { docname.strip_suffix("/index").unwrap_or(docname) };
        link.push_str(dir);
        if !dir.is_empty() {
            link.push('/');
        }
    } else {
        link.push_str(docname);
        link.push_str(&options.file_suffix);
    }

    if !highlight_terms.is_empty() {
        link.push_str("?highlight=");
        link.extend(utf8_percent_encode(&highlight_terms.join(" "), COMPONENT_ENCODE_SET));
    }
    link
}
