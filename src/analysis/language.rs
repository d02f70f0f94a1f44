use super::splitter::split_words;
use super::stemmer::PorterStemmer;

/// English stopwords, never indexed and skipped in queries
pub const ENGLISH_STOPWORDS: &[&str] = &[
    "a", "and", "are", "as", "at", "be", "but", "by", "for", "if", "in", "into", "is", "it", "near",
    "no", "not", "of", "on", "or", "such", "that", "the", "their", "then", "there", "these", "they",
    "this", "to", "was", "will", "with",
];

/// Language-specific text rules used by the index builder and the query parser
pub trait SearchLanguage: Send + Sync {
    /// Short language name, as recorded in build metadata
    fn name(&self) -> &'static str;

    /// Stopword list; lookups are case-sensitive
    fn stopwords(&self) -> &'static [&'static str];

    /// Reduce a word to its index form (lower-cased stem)
    fn stem(&self, word: &str) -> String;

    fn split(&self, text: &str) -> Vec<String> {
        split_words(text)
    }

    fn is_stopword(&self, word: &str) -> bool {
        self.stopwords().contains(&word)
    }

    /// Whether a (usually already stemmed) word may be registered in the index
    ///
    /// Rejects stopwords and words shorter than three characters when they
    /// start with a Latin-1 character, and two-character kana words. The empty
    /// string passes, matching the behaviour of existing index files.
    fn word_filter(&self, word: &str) -> bool {
        let Some(first) = word.chars().next() else {
            return true;
        };
        let len = word.chars().count();
        let first = first as u32;

        let short_kana = len < 3 && (12354..=12435).contains(&first);
        let latin_rejected = first < 256 && (len < 3 || self.is_stopword(word));
        !(short_kana || latin_rejected)
    }
}

/// English rules: Porter stemming and the standard stopword list
#[derive(Debug, Clone, Copy, Default)]
pub struct English {
    stemmer: PorterStemmer,
}

impl English {
    pub fn new() -> Self {
        Self { stemmer: PorterStemmer::new() }
    }
}

impl SearchLanguage for English {
    fn name(&self) -> &'static str {
        "en"
    }

    fn stopwords(&self) -> &'static [&'static str] {
        ENGLISH_STOPWORDS
    }

    fn stem(&self, word: &str) -> String {
        self.stemmer.stem(word)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_word_filter_rejects_stopwords() {
        let en = English::new();
        assert!(!en.word_filter("the"));
        assert!(!en.word_filter("with"));
        assert!(en.word_filter("grasp"));
    }

    #[test]
    fn test_word_filter_is_case_sensitive_for_stopwords() {
        // Capitalised stopwords slip through, as they do in generated indexes
        let en = English::new();
        assert!(en.word_filter("The"));
        assert!(en.word_filter("NOT"));
    }

    #[test]
    fn test_word_filter_rejects_short_latin_words() {
        let en = English::new();
        assert!(!en.word_filter("us"));
        assert!(!en.word_filter("x"));
        assert!(en.word_filter("tsp"));
    }

    #[test]
    fn test_word_filter_short_kana() {
        let en = English::new();
        assert!(!en.word_filter("あい"));
        assert!(en.word_filter("あいう"));
    }

    #[test]
    fn test_word_filter_accepts_empty() {
        assert!(English::new().word_filter(""));
    }

    #[test]
    fn test_stem_lowercases() {
        assert_eq!(English::new().stem("Relinking"), "relink");
    }

    #[test]
    fn test_is_stopword() {
        let en = English::new();
        assert!(en.is_stopword("and"));
        assert!(!en.is_stopword("And"));
        assert!(!en.is_stopword("grasp"));
    }
}
