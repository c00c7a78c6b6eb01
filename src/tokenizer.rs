use regex::Regex;

/// Capability of splitting raw text into an ordered list of tokens.
///
/// Any implementation can stand in for the default [`PatternTokenizer`]
/// as the analyzer of a [`crate::SequenceEncoder`]. Tokenization never
/// fails; an input with no tokens yields an empty list.
pub trait Tokenize {
    fn tokenize<'a>(&self, text: &'a str) -> Vec<&'a str>;
}

/// Pattern-based tokenizer splitting on word boundaries, acronyms and
/// camelCase humps.
///
/// Equivalent to the pattern `[A-Z]{2,}(?![a-z])|[A-Z][a-z]+(?=[A-Z])|['\w\-]+`:
/// maximal runs of word characters, apostrophes and hyphens are extracted
/// first, then each run starting with capitals is split the way the
/// alternation order implies, e.g. `NASAJetEngine` becomes `NASA`, `Jet`,
/// `Engine`. Runs without any alphanumeric content are dropped.
#[derive(Debug, Clone)]
pub struct PatternTokenizer {
    runs: Regex,
}

impl PatternTokenizer {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Default for PatternTokenizer {
    fn default() -> Self {
        Self {
            runs: Regex::new(r"['\w\-]+").expect("token run pattern"),
        }
    }
}

impl Tokenize for PatternTokenizer {
    fn tokenize<'a>(&self, text: &'a str) -> Vec<&'a str> {
        let mut tokens = Vec::new();
        for run in self.runs.find_iter(text) {
            let run = run.as_str();
            if !run.chars().any(char::is_alphanumeric) {
                continue;
            }
            split_humps(run, &mut tokens);
        }
        tokens
    }
}

/// Tokenize `text` with the default pattern tokenizer.
pub fn tokenize(text: &str) -> Vec<&str> {
    PatternTokenizer::default().tokenize(text)
}

/// Split one word-character run on acronym and camelCase boundaries.
///
/// The `regex` crate has no lookaround, so the boundary rules of the
/// original pattern are replayed by hand: an acronym keeps its capitals
/// unless the next character is lowercase (then its last capital starts
/// the following word), and a capitalized word ends where the next
/// capital begins. Runs led by anything other than a capital are kept
/// whole, as are the leftovers once no boundary rule applies.
fn split_humps<'a>(run: &'a str, out: &mut Vec<&'a str>) {
    let chars: Vec<(usize, char)> = run.char_indices().collect();
    let len = chars.len();
    let byte_at = |k: usize| if k < len { chars[k].0 } else { run.len() };
    let mut i = 0;
    while i < len {
        if chars[i].1.is_ascii_uppercase() {
            let mut j = i + 1;
            while j < len && chars[j].1.is_ascii_uppercase() {
                j += 1;
            }
            let capitals = j - i;
            if capitals >= 2 && (j == len || !chars[j].1.is_ascii_lowercase()) {
                out.push(&run[chars[i].0..byte_at(j)]);
                i = j;
                continue;
            }
            if capitals >= 3 {
                // acronym followed by a lowercase letter: its last capital
                // belongs to the next word
                out.push(&run[chars[i].0..byte_at(j - 1)]);
                i = j - 1;
                continue;
            }
            if capitals == 1 {
                let mut k = i + 1;
                while k < len && chars[k].1.is_ascii_lowercase() {
                    k += 1;
                }
                if k > i + 1 && k < len && chars[k].1.is_ascii_uppercase() {
                    out.push(&run[chars[i].0..byte_at(k)]);
                    i = k;
                    continue;
                }
            }
        }
        // no boundary rule applies: the rest of the run is one token
        out.push(&run[chars[i].0..]);
        break;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_acronym_and_camel_humps() {
        assert_eq!(tokenize("NASAJetEngine"), vec!["NASA", "Jet", "Engine"]);
    }

    #[test]
    fn acronym_followed_by_lowercase_donates_last_capital() {
        assert_eq!(tokenize("NASAjet"), vec!["NAS", "Ajet"]);
    }

    #[test]
    fn two_capitals_before_lowercase_stay_whole() {
        // [A-Z]{2,} cannot back off below two capitals, so the word-run
        // alternative wins
        assert_eq!(tokenize("ABc"), vec!["ABc"]);
    }

    #[test]
    fn lowercase_led_runs_are_not_split() {
        assert_eq!(tokenize("helloWorld"), vec!["helloWorld"]);
    }

    #[test]
    fn capitalized_words_split_at_each_hump() {
        assert_eq!(tokenize("McDonald"), vec!["Mc", "Donald"]);
    }

    #[test]
    fn acronym_before_digits() {
        assert_eq!(tokenize("USA2020"), vec!["USA", "2020"]);
    }

    #[test]
    fn punctuation_separates_tokens() {
        assert_eq!(
            tokenize("hi, my name is josh."),
            vec!["hi", "my", "name", "is", "josh"]
        );
    }

    #[test]
    fn apostrophes_and_hyphens_stay_inside_tokens() {
        assert_eq!(tokenize("don't re-rank"), vec!["don't", "re-rank"]);
    }

    #[test]
    fn runs_without_alphanumerics_are_dropped() {
        assert_eq!(tokenize("-- '' !!"), Vec::<&str>::new());
    }

    #[test]
    fn empty_input_yields_no_tokens() {
        assert_eq!(tokenize(""), Vec::<&str>::new());
    }

    #[test]
    fn custom_analyzer_can_replace_the_default() {
        struct Whitespace;
        impl Tokenize for Whitespace {
            fn tokenize<'a>(&self, text: &'a str) -> Vec<&'a str> {
                text.split_whitespace().collect()
            }
        }
        assert_eq!(Whitespace.tokenize("a b.c"), vec!["a", "b.c"]);
    }
}
