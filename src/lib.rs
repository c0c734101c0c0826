//! A spell checking and suggestion library compatible with Hunspell dictionaries.
//!
//! A [Dictionary] is compiled from the text of a Hunspell `.aff` file (affixes, flags and
//! suggestion tables) and `.dic` file (the word list). Once compiled it can check words and
//! produce an ordered stream of correction candidates for misspellings:
//!
//! ```
//! let aff = r#"
//! TRY esianrtolcdugmphbyfvkwzESIANRTOLCDUGMPHBYFVKWZ'
//! "#;
//! let dic = r#"2
//! hello
//! world
//! "#;
//! let dict = grimoire::Dictionary::new(aff, dic).unwrap();
//! assert!(dict.check("hello"));
//!
//! let mut suggestions = Vec::new();
//! dict.suggest("helo", &mut suggestions);
//! assert!(suggestions.contains(&"hello".to_string()));
//! ```

use core::hash::BuildHasher;

pub use aff::parser::{
    ConditionError, ParseCompoundRuleError, ParseDictionaryError, ParseDictionaryErrorKind,
    ParseDictionaryErrorSource, ParseFlagError, UnknownFlagTypeError,
};
pub use suggester::{Suggestion, SuggestionKind};

use aff::AffData;
use word_list::WordList;

mod aff;
mod casing;
mod checker;
mod macros;
mod suggester;
mod word_list;

/// Limit on the length of accepted input, in bytes.
///
/// Hunspell and Nuspell use the same cutoff. Anything longer is not a word: checking returns
/// `false` and suggesting produces nothing rather than spending time on edits of a huge input.
pub(crate) const MAX_WORD_LEN: usize = 360;

/// Internal representation of a flag.
///
/// Flags are parsed out of their textual representation (see `FlagType`) into this compressed
/// form. The zero value is reserved so that `Option<Flag>` costs nothing extra.
pub(crate) type Flag = core::num::NonZeroU16;

/// The set of all flags on a word or affix.
///
/// Internally this is a sorted, deduplicated boxed slice. Nearly all flagsets are tiny (a few
/// elements) so binary search on a slice beats a tree or hash set in both time and space.
#[derive(Debug, Default, PartialEq, Eq, Clone)]
pub(crate) struct FlagSet(Box<[Flag]>);

impl FromIterator<Flag> for FlagSet {
    fn from_iter<T: IntoIterator<Item = Flag>>(iter: T) -> Self {
        let flags: Vec<Flag> = iter.into_iter().collect();
        flags.into()
    }
}

impl From<Vec<Flag>> for FlagSet {
    fn from(mut flags: Vec<Flag>) -> Self {
        flags.sort_unstable();
        flags.dedup();
        Self(flags.into_boxed_slice())
    }
}

impl FlagSet {
    #[inline]
    pub fn iter(&self) -> core::slice::Iter<'_, Flag> {
        self.0.iter()
    }

    #[inline]
    pub fn contains(&self, flag: &Flag) -> bool {
        self.0.binary_search(flag).is_ok()
    }

    /// Checks whether `self` and `other` have at least one flag in common.
    ///
    /// Both sets are sorted so this is a linear merge walk.
    pub fn has_intersection(&self, other: &Self) -> bool {
        let mut left = self.iter().peekable();
        let mut right = other.iter().peekable();

        loop {
            match (left.peek(), right.peek()) {
                (Some(l), Some(r)) => match l.cmp(r) {
                    core::cmp::Ordering::Equal => return true,
                    core::cmp::Ordering::Less => {
                        left.next();
                    }
                    core::cmp::Ordering::Greater => {
                        right.next();
                    }
                },
                _ => return false,
            }
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// A dictionary: a word list plus the affixing, compounding and suggestion data which applies
/// to it.
///
/// The dictionary is generic over a hash builder used by the word list. `ahash` is the default:
/// dictionaries are trusted input so a fast non-cryptographic hash is the right tradeoff.
pub struct Dictionary<S: BuildHasher = ahash::RandomState> {
    pub(crate) words: WordList<S>,
    pub(crate) aff: AffData,
    /// The subset of the word list eligible for ngram and phonetic suggestions: every entry
    /// whose flagset has no flag marking it as forbidden, unsuggestable or compound-only.
    /// Computed once here so the fallback scan doesn't re-test flags on every call.
    pub(crate) ngram_words: Box<[(Box<str>, FlagSet)]>,
}

impl Dictionary {
    pub fn new(aff: &str, dic: &str) -> Result<Self, ParseDictionaryError> {
        Self::new_with_hasher(aff, dic, ahash::RandomState::new())
    }
}

impl<S: BuildHasher + Clone> Dictionary<S> {
    pub fn new_with_hasher(
        aff: &str,
        dic: &str,
        build_hasher: S,
    ) -> Result<Self, ParseDictionaryError> {
        let (words, aff) = aff::parser::parse(aff, dic, build_hasher)?;

        let bad_flags = [
            aff.options.forbidden_word_flag,
            aff.options.no_suggest_flag,
            aff.options.only_in_compound_flag,
        ];
        let ngram_words = words
            .iter()
            .filter(|(_stem, flags)| {
                !bad_flags
                    .iter()
                    .any(|flag| flag.map(|flag| flags.contains(&flag)).unwrap_or(false))
            })
            .map(|(stem, flags)| (stem.into(), flags.clone()))
            .collect();

        Ok(Self {
            words,
            aff,
            ngram_words,
        })
    }

    /// Checks that the word is valid according to the dictionary.
    pub fn check(&self, word: &str) -> bool {
        checker::Checker::new(self).check(word)
    }

    /// Fills `out` with suggested corrections for the (presumably misspelled) input word.
    ///
    /// `out` is cleared first. Suggestions are ordered best-first and contain no duplicates.
    pub fn suggest(&self, word: &str, out: &mut Vec<String>) {
        let mut suggestions = Vec::new();
        self.suggest_detailed(word, &mut suggestions);
        out.clear();
        out.extend(suggestions.into_iter().map(|suggestion| suggestion.text));
    }

    /// Like [`suggest`](Self::suggest) but each candidate also carries the
    /// [kind](SuggestionKind) of edit which produced it.
    pub fn suggest_detailed(&self, word: &str, out: &mut Vec<Suggestion>) {
        suggester::Suggester::new(self).suggest(word, out);
    }
}

impl<S: BuildHasher> core::fmt::Debug for Dictionary<S> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Dictionary")
            .field("words", &self.words.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod test {
    use crate::macros::{flag, flagset};

    #[test]
    fn flag_set_invariants() {
        let fs = flagset!['z', 'a', 'Z', 'A', 'a'];
        assert_eq!(fs, flagset!['A', 'Z', 'a', 'z']);
        assert_eq!(fs.iter().count(), 4);
    }

    #[test]
    fn flag_set_algebra() {
        assert!(flagset!['a', 'b', 'c'].has_intersection(&flagset!['b']));
        assert!(flagset!['a', 'c', 'x', 'z'].has_intersection(&flagset!['c', 'i', 'w']));
        assert!(!flagset!['a', 'b'].has_intersection(&flagset!['c', 'd']));
        assert!(!flagset![].has_intersection(&flagset!['a']));

        assert!(flagset!['a', 'b', 'c'].contains(&flag!('b')));
        assert!(!flagset!['a', 'c'].contains(&flag!('b')));
    }
}
