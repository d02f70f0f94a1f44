//! Porter stemming algorithm.
//!
//! Implements M.F. Porter's 1980 suffix-stripping algorithm in the form of his
//! reference C implementation, including its two departures from the paper
//! (`-bli` becomes `-ble` and `-logi` becomes `-log` in step 2). Index terms
//! produced by documentation generators use this exact variant (`always` is
//! stored as `alwai`, `greedy` as `greedi`), so the stemmer must match it
//! rule for rule for lookups to hit.
//!
//! # Examples
//!
//! ```
//! use doc_search::analysis::PorterStemmer;
//!
//! let stemmer = PorterStemmer::new();
//! assert_eq!(stemmer.stem("relinking"), "relink");
//! assert_eq!(stemmer.stem("greedy"), "greedi");
//! assert_eq!(stemmer.stem("probabilistic"), "probabilist");
//! ```

/// Step 2 rewrites, tried in order; the first suffix present wins even when
/// the measure condition then rejects the rewrite.
const STEP2_RULES: &[(&str, &str)] = &[
    ("ational", "ate"),
    ("tional", "tion"),
    ("enci", "ence"),
    ("anci", "ance"),
    ("izer", "ize"),
    ("bli", "ble"),
    ("alli", "al"),
    ("entli", "ent"),
    ("eli", "e"),
    ("ousli", "ous"),
    ("ization", "ize"),
    ("ation", "ate"),
    ("ator", "ate"),
    ("alism", "al"),
    ("iveness", "ive"),
    ("fulness", "ful"),
    ("ousness", "ous"),
    ("aliti", "al"),
    ("iviti", "ive"),
    ("biliti", "ble"),
    ("logi", "log"),
];

const STEP3_RULES: &[(&str, &str)] = &[
    ("icate", "ic"),
    ("ative", ""),
    ("alize", "al"),
    ("iciti", "ic"),
    ("ical", "ic"),
    ("ful", ""),
    ("ness", ""),
];

const STEP4_SUFFIXES: &[&str] = &[
    "al", "ance", "ence", "er", "ic", "able", "ible", "ant", "ement", "ment", "ent", "ion", "ou",
    "ism", "ate", "iti", "ous", "ive", "ize",
];

/// Stateless Porter stemmer
#[derive(Debug, Clone, Copy, Default)]
pub struct PorterStemmer;

impl PorterStemmer {
    pub fn new() -> Self {
        Self
    }

    /// Stem a single word
    ///
    /// The word is lower-cased first. Words of two characters or fewer are
    /// returned unchanged.
    pub fn stem(&self, word: &str) -> String {
        let lower = word.to_lowercase();
        if lower.chars().count() <= 2 {
            return lower;
        }

        let mut state = StemState { b: lower.chars().collect(), j: 0 };
        state.step1ab();
        state.step1c();
        state.step2();
        state.step3();
        state.step4();
        state.step5();
        state.b.into_iter().collect()
    }
}

/// Working buffer for one word
///
/// `b` always holds the current word; `j` is the length of the stem left in
/// front of the suffix matched by the last successful [`StemState::ends`].
struct StemState {
    b: Vec<char>,
    j: usize,
}

impl StemState {
    fn len(&self) -> usize {
        self.b.len()
    }

    fn is_consonant(&self, i: usize) -> bool {
        match self.b[i] {
            'a' | 'e' | 'i' | 'o' | 'u' => false,
            'y' => i == 0 || !self.is_consonant(i - 1),
            _ => true,
        }
    }

    /// Number of vowel-consonant sequences in `b[..j]`
    fn measure(&self) -> usize {
        let mut n = 0;
        let mut i = 0;
        loop {
            if i >= self.j {
                return n;
            }
            if !self.is_consonant(i) {
                break;
            }
            i += 1;
        }
        i += 1;
        loop {
            loop {
                if i >= self.j {
                    return n;
                }
                if self.is_consonant(i) {
                    break;
                }
                i += 1;
            }
            i += 1;
            n += 1;
            loop {
                if i >= self.j {
                    return n;
                }
                if !self.is_consonant(i) {
                    break;
                }
                i += 1;
            }
            i += 1;
        }
    }

    fn vowel_in_stem(&self) -> bool {
        (0..self.j).any(|i| !self.is_consonant(i))
    }

    fn double_consonant(&self, i: usize) -> bool {
        i >= 1 && self.b[i] == self.b[i - 1] && self.is_consonant(i)
    }

    /// consonant-vowel-consonant ending at `i`, where the last consonant is
    /// not w, x or y
    fn cvc(&self, i: usize) -> bool {
        if i < 2 || !self.is_consonant(i) || self.is_consonant(i - 1) || !self.is_consonant(i - 2)
        {
            return false;
        }
        !matches!(self.b[i], 'w' | 'x' | 'y')
    }

    fn ends(&mut self, suffix: &str) -> bool {
        let suffix: Vec<char> = suffix.chars().collect();
        let len = self.len();
        if suffix.len() > len || self.b[len - suffix.len()..] != suffix[..] {
            return false;
        }
        self.j = len - suffix.len();
        true
    }

    fn set_to(&mut self, replacement: &str) {
        self.b.truncate(self.j);
        self.b.extend(replacement.chars());
    }

    fn replace_if_measured(&mut self, replacement: &str) {
        if self.measure() > 0 {
            self.set_to(replacement);
        }
    }

    /// Plurals, -ed and -ing
    fn step1ab(&mut self) {
        let len = self.len();
        if self.b[len - 1] == 's' {
            if self.ends("sses") {
                self.b.truncate(len - 2);
            } else if self.ends("ies") {
                self.set_to("i");
            } else if self.b[len - 2] != 's' {
                self.b.pop();
            }
        }

        if self.ends("eed") {
            if self.measure() > 0 {
                self.b.pop();
            }
        } else if (self.ends("ed") || self.ends("ing")) && self.vowel_in_stem() {
            self.b.truncate(self.j);
            if self.ends("at") {
                self.set_to("ate");
            } else if self.ends("bl") {
                self.set_to("ble");
            } else if self.ends("iz") {
                self.set_to("ize");
            } else if self.double_consonant(self.len() - 1) {
                if !matches!(self.b[self.len() - 1], 'l' | 's' | 'z') {
                    self.b.pop();
                }
            } else {
                self.j = self.len();
                if self.measure() == 1 && self.cvc(self.len() - 1) {
                    self.set_to("e");
                }
            }
        }
    }

    /// Terminal y becomes i when the stem has a vowel
    fn step1c(&mut self) {
        if self.ends("y") && self.vowel_in_stem() {
            let last = self.len() - 1;
            self.b[last] = 'i';
        }
    }

    fn step2(&mut self) {
        for (suffix, replacement) in STEP2_RULES {
            if self.ends(suffix) {
                self.replace_if_measured(replacement);
                return;
            }
        }
    }

    fn step3(&mut self) {
        for (suffix, replacement) in STEP3_RULES {
            if self.ends(suffix) {
                self.replace_if_measured(replacement);
                return;
            }
        }
    }

    fn step4(&mut self) {
        let matched = STEP4_SUFFIXES.iter().any(|suffix| {
            if !self.ends(suffix) {
                return false;
            }
            // -ion is only a suffix after s or t
            *suffix != "ion" || (self.j >= 1 && matches!(self.b[self.j - 1], 's' | 't'))
        });
        if matched && self.measure() > 1 {
            self.b.truncate(self.j);
        }
    }

    /// Final -e and -ll
    fn step5(&mut self) {
        self.j = self.len();
        if self.len() == 0 {
            return;
        }
        if self.b[self.len() - 1] == 'e' {
            let m = self.measure();
            if m > 1 || (m == 1 && !(self.len() >= 2 && self.cvc(self.len() - 2))) {
                self.b.pop();
            }
        }
        let last = self.len() - 1;
        if self.b[last] == 'l' && self.double_consonant(last) && self.measure() > 1 {
            self.b.pop();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stem(word: &str) -> String {
        PorterStemmer::new().stem(word)
    }

    #[test]
    fn test_step1_plurals_and_participles() {
        assert_eq!(stem("caresses"), "caress");
        assert_eq!(stem("ponies"), "poni");
        assert_eq!(stem("cats"), "cat");
        assert_eq!(stem("feed"), "feed");
        assert_eq!(stem("agreed"), "agre");
        assert_eq!(stem("plastered"), "plaster");
        assert_eq!(stem("motoring"), "motor");
        assert_eq!(stem("sing"), "sing");
        assert_eq!(stem("conflated"), "conflat");
        assert_eq!(stem("hopping"), "hop");
        assert_eq!(stem("falling"), "fall");
        assert_eq!(stem("hissing"), "hiss");
        assert_eq!(stem("filing"), "file");
    }

    #[test]
    fn test_step1c_terminal_y() {
        assert_eq!(stem("happy"), "happi");
        assert_eq!(stem("sky"), "sky");
        assert_eq!(stem("always"), "alwai");
        assert_eq!(stem("greedy"), "greedi");
    }

    #[test]
    fn test_derivational_suffixes() {
        assert_eq!(stem("relational"), "relat");
        assert_eq!(stem("conditional"), "condit");
        assert_eq!(stem("generalization"), "gener");
        assert_eq!(stem("triplicate"), "triplic");
        assert_eq!(stem("hopeful"), "hope");
        assert_eq!(stem("goodness"), "good");
        assert_eq!(stem("revival"), "reviv");
        assert_eq!(stem("adjustable"), "adjust");
        assert_eq!(stem("effective"), "effect");
    }

    #[test]
    fn test_step5_final_e_and_double_l() {
        assert_eq!(stem("probate"), "probat");
        assert_eq!(stem("rate"), "rate");
        assert_eq!(stem("controll"), "control");
        assert_eq!(stem("roll"), "roll");
    }

    #[test]
    fn test_documentation_vocabulary() {
        assert_eq!(stem("relinking"), "relink");
        assert_eq!(stem("evolutionary"), "evolutionari");
        assert_eq!(stem("reactive"), "reactiv");
        assert_eq!(stem("probabilistic"), "probabilist");
        assert_eq!(stem("introduction"), "introduct");
        assert_eq!(stem("tracking"), "track");
        assert_eq!(stem("construction"), "construct");
        assert_eq!(stem("solutions"), "solut");
    }

    #[test]
    fn test_short_words_unchanged() {
        assert_eq!(stem("is"), "is");
        assert_eq!(stem("a"), "a");
        assert_eq!(stem(""), "");
    }

    #[test]
    fn test_lowercases_input() {
        assert_eq!(stem("GRASP"), "grasp");
        assert_eq!(stem("Running"), "run");
    }

    #[test]
    fn test_stems_that_collapse_below_three_chars() {
        // Callers fall back to the raw word in this case
        assert_eq!(stem("used"), "us");
        assert_eq!(stem("axes"), "ax");
    }
}
