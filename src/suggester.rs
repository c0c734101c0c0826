//! Suggesting corrections for misspelled words.
//!
//! Suggestion is a pipeline of stages, cheapest and most precise first:
//!
//! 1. For each recapitalization of the input worth retrying, candidates are generated by
//!    permuting the variant (see `permutations`) and validated against the dictionary, first
//!    as plain affixed words and then as compounds.
//! 2. Words containing dashes are re-suggested chunk by chunk.
//! 3. If the cheap stages found nothing conclusive, the expensive fallback scans the whole
//!    word list for similarly written (`ngram`) and similarly sounding (`phonet`) words.
//!
//! Stages communicate through the output vector itself: it doubles as the record of what has
//! already been suggested, which later stages use for deduplication and for deciding whether
//! they should run at all.

mod ngram;
mod permutations;
mod phonet;

use core::hash::BuildHasher;
use std::borrow::Cow;
use std::ops::ControlFlow;

use crate::{
    casing::{self, Casing},
    checker::Checker,
    Dictionary, FlagSet, MAX_WORD_LEN,
};

use ngram::NgramSuggest;
use phonet::PhonetSuggest;

/// Cap on the suggestions taken from one edit round.
const MAX_SUGGESTIONS: usize = 15;

/// Cap on the suggestions taken from the phonetic fallback.
const MAX_PHONET_SUGGESTIONS: usize = 2;

/// The suggestion kinds strong enough that once one is found, weaker recapitalizations are
/// not worth exploring.
const GOOD_EDITS: [SuggestionKind; 2] = [SuggestionKind::RepChars, SuggestionKind::MapChars];

/// A correction candidate for a misspelled word.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Suggestion {
    /// The replacement text.
    pub text: String,
    /// The strategy that produced this candidate.
    pub kind: SuggestionKind,
}

/// The strategy that produced a [Suggestion].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SuggestionKind {
    /// The word uppercased, for input like "ansi" meaning "ANSI".
    Uppercase,
    /// A rewrite from the dictionary's REP table of common misspellings.
    RepChars,
    /// A substitution of related characters from the MAP table.
    MapChars,
    /// Two adjacent characters swapped.
    SwapChar,
    /// Two distant characters swapped.
    LongSwapChar,
    /// A character replaced by a keyboard neighbor from the KEY layout.
    BadCharKey,
    /// One character too many.
    ExtraChar,
    /// One character missing.
    ForgotChar,
    /// A character moved somewhere else in the word.
    MoveChar,
    /// A character replaced by one from the TRY alphabet.
    BadChar,
    /// A doubled two-character pattern collapsed.
    DoubleTwoChars,
    /// The word split in two, joined by a space or dash in a single suggestion.
    SpaceWord,
    /// The word split into two valid words.
    TwoWords,
    /// A dashed word with one chunk corrected.
    Dashes,
    /// The input was correct up to capitalization.
    Case,
    /// A capitalized form of a compound that requires it.
    ForceUcase,
    /// A similarly written word from the fallback scan.
    Ngram,
    /// A similarly sounding word from the fallback scan.
    Phonet,
}

/// A candidate made of several words, stringified with spaces and optionally also with
/// dashes.
struct MultiWordSuggestion {
    words: Vec<String>,
    kind: SuggestionKind,
    allow_dash: bool,
}

enum Candidate {
    Word(String, SuggestionKind),
    MultiWord(MultiWordSuggestion),
}

impl Candidate {
    fn kind(&self) -> SuggestionKind {
        match self {
            Self::Word(_text, kind) => *kind,
            Self::MultiWord(multiword) => multiword.kind,
        }
    }
}

/// State scoped to one top-level `suggest` call.
struct SuggestRun<'r> {
    /// The misspelled word (after input conversion), as typed.
    word: &'r str,
    captype: Casing,
    out: &'r mut Vec<Suggestion>,
    good_edits_found: bool,
}

pub(crate) struct Suggester<'a, S: BuildHasher> {
    checker: Checker<'a, S>,
    ngram_words: &'a [(Box<str>, FlagSet)],
}

impl<'a, S: BuildHasher> Suggester<'a, S> {
    pub fn new(dict: &'a Dictionary<S>) -> Self {
        Self {
            checker: Checker::new(dict),
            ngram_words: &dict.ngram_words,
        }
    }

    pub fn suggest(&self, word: &str, out: &mut Vec<Suggestion>) {
        out.clear();
        if word.len() >= MAX_WORD_LEN {
            return;
        }

        self.suggest_impl(word, out);
    }

    fn suggest_impl(&self, word: &str, out: &mut Vec<Suggestion>) {
        if word.is_empty() {
            return;
        }

        let word = self.checker.aff.input_conversions.convert(word);
        let (captype, variants) = casing::corrections(&word);
        let mut run = SuggestRun {
            word: &word,
            captype,
            out,
            good_edits_found: false,
        };

        // A fully lowercase word may be a compound that must be written capitalized. If the
        // capitalized form checks out it is the only suggestion worth making.
        if self
            .checker
            .aff
            .options
            .compound_force_uppercase_flag
            .is_some()
            && captype == Casing::None
        {
            for capitalized in casing::capitalizations(&word) {
                if self.checker.correct_any(&capitalized) {
                    self.handle(
                        &mut run,
                        Suggestion {
                            text: capitalized,
                            kind: SuggestionKind::ForceUcase,
                        },
                        false,
                    );
                    return;
                }
            }
        }

        for (idx, variant) in variants.iter().enumerate() {
            let mut nocompound = false;

            // The recapitalization itself may already be a correct word.
            if idx > 0 && self.checker.correct_any(variant) {
                self.handle(
                    &mut run,
                    Suggestion {
                        text: variant.clone(),
                        kind: SuggestionKind::Case,
                    },
                    false,
                );
            }

            if self
                .edits(variant, MAX_SUGGESTIONS, false, &mut run, &mut nocompound)
                .is_break()
            {
                return;
            }

            if !nocompound {
                let limit = self.checker.aff.options.max_compound_suggestions as usize;
                if self
                    .edits(&word, limit, true, &mut run, &mut nocompound)
                    .is_break()
                {
                    return;
                }
            }

            if run.good_edits_found {
                return;
            }
        }

        self.dash_suggest(&word, &mut run);
        self.ngram_and_phonet_suggest(&word, &mut run);
    }

    /// One edit round: runs the permutation generators over `word`, keeping candidates the
    /// dictionary accepts, until `limit` suggestions came out of this round.
    ///
    /// Breaks only when the whole suggestion stream should end (a split suggestion was found
    /// in one piece).
    fn edits(
        &self,
        word: &str,
        limit: usize,
        compounds: bool,
        run: &mut SuggestRun,
        nocompound: &mut bool,
    ) -> ControlFlow<()> {
        if limit == 0 {
            return ControlFlow::Continue(());
        }

        let mut emitted = 0usize;
        let mut terminate = false;

        let _ = self.permutations(word, &mut |candidate| {
            let kind = candidate.kind();
            let accepted = self.filter_and_handle(candidate, compounds, run);
            if accepted == 0 {
                return ControlFlow::Continue(());
            }

            if GOOD_EDITS.contains(&kind) {
                run.good_edits_found = true;
            }
            if matches!(
                kind,
                SuggestionKind::Uppercase | SuggestionKind::RepChars | SuggestionKind::MapChars
            ) {
                // An edit this precise makes trying compound interpretations pointless.
                *nocompound = true;
            }
            if kind == SuggestionKind::SpaceWord {
                terminate = true;
                return ControlFlow::Break(());
            }

            emitted += accepted;
            if emitted >= limit {
                return ControlFlow::Break(());
            }
            ControlFlow::Continue(())
        });

        if terminate {
            ControlFlow::Break(())
        } else {
            ControlFlow::Continue(())
        }
    }

    /// Drives the permutation generators in order of decreasing precision.
    fn permutations<F>(&self, word: &str, sink: &mut F) -> ControlFlow<()>
    where
        F: FnMut(Candidate) -> ControlFlow<()>,
    {
        use SuggestionKind::*;

        let aff = self.checker.aff;
        let dashes = use_dash(&aff.try_chars);

        sink(Candidate::Word(casing::uppercase(word), Uppercase))?;

        permutations::replchars(word, &aff.replacements, &mut |text| {
            if text.contains(' ') {
                // A replacement that produces a pair is offered whole and as two words.
                let words = text.split(' ').map(str::to_string).collect();
                sink(Candidate::Word(text, RepChars))?;
                sink(Candidate::MultiWord(MultiWordSuggestion {
                    words,
                    kind: RepChars,
                    allow_dash: false,
                }))
            } else {
                sink(Candidate::Word(text, RepChars))
            }
        })?;

        permutations::twowords(word, &mut |left, right| {
            sink(Candidate::Word(format!("{left} {right}"), SpaceWord))?;
            if dashes {
                sink(Candidate::Word(format!("{left}-{right}"), SpaceWord))?;
            }
            ControlFlow::Continue(())
        })?;

        permutations::mapchars(word, &aff.similarities, &mut |text| {
            sink(Candidate::Word(text, MapChars))
        })?;
        permutations::swapchar(word, &mut |text| sink(Candidate::Word(text, SwapChar)))?;
        permutations::longswapchar(word, &mut |text| {
            sink(Candidate::Word(text, LongSwapChar))
        })?;
        permutations::badcharkey(word, &aff.keyboard_closeness, &mut |text| {
            sink(Candidate::Word(text, BadCharKey))
        })?;
        permutations::extrachar(word, &mut |text| sink(Candidate::Word(text, ExtraChar)))?;
        permutations::forgotchar(word, &aff.try_chars, &mut |text| {
            sink(Candidate::Word(text, ForgotChar))
        })?;
        permutations::movechar(word, &mut |text| sink(Candidate::Word(text, MoveChar)))?;
        permutations::badchar(word, &aff.try_chars, &mut |text| {
            sink(Candidate::Word(text, BadChar))
        })?;
        permutations::doubletwochars(word, &mut |text| {
            sink(Candidate::Word(text, DoubleTwoChars))
        })?;

        if !aff.options.no_split_suggestions {
            permutations::twowords(word, &mut |left, right| {
                sink(Candidate::MultiWord(MultiWordSuggestion {
                    words: vec![left.to_string(), right.to_string()],
                    kind: TwoWords,
                    allow_dash: dashes,
                }))
            })?;
        }

        ControlFlow::Continue(())
    }

    /// Validates a candidate against the dictionary and, when it passes, normalizes and
    /// deduplicates it into the output. Returns how many suggestions came out of it.
    fn filter_and_handle(
        &self,
        candidate: Candidate,
        compounds: bool,
        run: &mut SuggestRun,
    ) -> usize {
        match candidate {
            Candidate::Word(text, kind) => {
                if !self.checker.correct(&text, compounds) {
                    return 0;
                }
                usize::from(self.handle(run, Suggestion { text, kind }, false))
            }
            Candidate::MultiWord(multiword) => {
                if !multiword
                    .words
                    .iter()
                    .all(|part| self.checker.correct(part, compounds))
                {
                    return 0;
                }

                let mut accepted = usize::from(self.handle(
                    run,
                    Suggestion {
                        text: multiword.words.join(" "),
                        kind: multiword.kind,
                    },
                    false,
                ));
                if multiword.allow_dash {
                    accepted += usize::from(self.handle(
                        run,
                        Suggestion {
                            text: multiword.words.join("-"),
                            kind: multiword.kind,
                        },
                        false,
                    ));
                }
                accepted
            }
        }
    }

    /// Normalizes an accepted candidate (casing, output conversion) and deduplicates it
    /// against everything already suggested. Returns whether the suggestion was kept.
    fn handle(&self, run: &mut SuggestRun, mut suggestion: Suggestion, check_inclusion: bool) -> bool {
        let options = &self.checker.aff.options;

        let keeps_case = self.checker.has_flag(&suggestion.text, options.keep_case_flag);
        if !keeps_case || self.checker.aff.is_sharps(&suggestion.text) {
            let coerced = casing::coerce(&suggestion.text, run.captype);
            if coerced != suggestion.text && !self.checker.is_forbidden(&coerced) {
                suggestion.text = coerced;
            }

            // In a split suggestion for a mixed-case word, the second piece keeps the casing
            // the user typed: "baRcelona" splitting as "ba rcelona" stays "ba Rcelona" only
            // when the user actually capitalized that character.
            if matches!(run.captype, Casing::Camel | Casing::Pascal) {
                if let Some(pos) = suggestion.text.find(' ') {
                    let suggested = suggestion.text[pos + 1..].chars().next();
                    let original = run
                        .word
                        .get(pos..)
                        .and_then(|rest| rest.chars().next());
                    if let (Some(suggested), Some(original)) = (suggested, original) {
                        if suggested != original
                            && suggested.to_uppercase().next() == Some(original)
                        {
                            suggestion.text.truncate(pos + 1);
                            suggestion.text.push_str(&run.word[pos..]);
                        }
                    }
                }
            }
        }

        if self.checker.is_forbidden(&suggestion.text) {
            return false;
        }

        if !self.checker.aff.output_conversions.is_empty() {
            if let Cow::Owned(converted) =
                self.checker.aff.output_conversions.convert(&suggestion.text)
            {
                suggestion.text = converted;
            }
        }

        if run
            .out
            .iter()
            .any(|existing| existing.text == suggestion.text)
        {
            return false;
        }

        // The fallback stages produce near-duplicates that merely add a prefix or suffix
        // around an earlier suggestion. Those aren't worth the space.
        if check_inclusion {
            let lowered = casing::lowercase(&suggestion.text);
            if run
                .out
                .iter()
                .any(|existing| lowered.contains(&casing::lowercase(&existing.text)))
            {
                return false;
            }
        }

        run.out.push(suggestion);
        true
    }

    /// Re-suggests each misspelled chunk of a dashed word within the word.
    fn dash_suggest(&self, word: &str, run: &mut SuggestRun) {
        if !word.contains('-')
            || run
                .out
                .iter()
                .any(|suggestion| suggestion.text.contains('-'))
        {
            return;
        }

        let chunks: Vec<&str> = word.split('-').collect();
        let mut chunk_suggestions = Vec::new();
        for (idx, chunk) in chunks.iter().enumerate() {
            if chunk.is_empty() || self.checker.correct_any(chunk) {
                continue;
            }

            self.suggest(chunk, &mut chunk_suggestions);
            for sub in chunk_suggestions.drain(..) {
                let mut candidate = String::with_capacity(word.len() + sub.text.len());
                for (chunk_idx, part) in chunks.iter().enumerate() {
                    if chunk_idx > 0 {
                        candidate.push('-');
                    }
                    if chunk_idx == idx {
                        candidate.push_str(&sub.text);
                    } else {
                        candidate.push_str(part);
                    }
                }

                if self.checker.check(&candidate) {
                    self.handle(
                        run,
                        Suggestion {
                            text: candidate,
                            kind: SuggestionKind::Dashes,
                        },
                        false,
                    );
                }
            }
        }
    }

    /// The expensive fallback: scans the suggestion-eligible part of the word list, scoring
    /// every entry by written similarity and, when the dictionary has a PHONE table, by
    /// phonetic similarity.
    fn ngram_and_phonet_suggest(&self, word: &str, run: &mut SuggestRun) {
        let options = &self.checker.aff.options;
        let ngram_enabled = options.max_ngram_suggestions > 0;
        let phonet_enabled = !self.checker.aff.phonetic_table.is_empty();
        if !ngram_enabled && !phonet_enabled {
            return;
        }

        let handled: Vec<String> = run
            .out
            .iter()
            .map(|suggestion| casing::lowercase(&suggestion.text))
            .collect();
        let mut ngram =
            ngram_enabled.then(|| NgramSuggest::new(self.checker.aff, word, handled));
        let mut phonet =
            phonet_enabled.then(|| PhonetSuggest::new(&self.checker.aff.phonetic_table, word));

        for (stem, flags) in self.ngram_words.iter() {
            if let Some(builder) = ngram.as_mut() {
                builder.step(stem, flags);
            }
            if let Some(builder) = phonet.as_mut() {
                builder.step(stem);
            }
        }

        if let Some(builder) = ngram {
            for text in builder
                .finish()
                .into_iter()
                .take(options.max_ngram_suggestions as usize)
            {
                self.handle(
                    run,
                    Suggestion {
                        text,
                        kind: SuggestionKind::Ngram,
                    },
                    true,
                );
            }
        }
        if let Some(builder) = phonet {
            for text in builder.finish().into_iter().take(MAX_PHONET_SUGGESTIONS) {
                self.handle(
                    run,
                    Suggestion {
                        text,
                        kind: SuggestionKind::Phonet,
                    },
                    false,
                );
            }
        }
    }
}

/// Whether dash-joined splits should be offered.
///
/// Hunspell derives this from the TRY alphabet: dictionaries for dash-using languages list
/// '-' in TRY, and latin-script ones list 'a' early. Crude, but it is the compatible behavior.
fn use_dash(try_chars: &str) -> bool {
    try_chars.contains('-') || try_chars.contains('a')
}

#[cfg(test)]
mod test {
    use crate::Dictionary;

    use super::*;

    fn dict(aff: &str, dic: &str) -> Dictionary {
        Dictionary::new(aff, dic).unwrap()
    }

    fn suggest(dict: &Dictionary, word: &str) -> Vec<String> {
        let mut suggestions = Vec::new();
        dict.suggest(word, &mut suggestions);
        suggestions
    }

    fn suggest_detailed(dict: &Dictionary, word: &str) -> Vec<Suggestion> {
        let mut suggestions = Vec::new();
        dict.suggest_detailed(word, &mut suggestions);
        suggestions
    }

    #[test]
    fn empty_suggest() {
        let dict = dict("", "1\nhello\n");
        assert!(suggest(&dict, "").is_empty());
    }

    #[test]
    fn huge_word_is_skipped() {
        let dict = dict("", "1\nhello\n");
        assert!(suggest(&dict, &"hello".repeat(MAX_WORD_LEN)).is_empty());
    }

    #[test]
    fn existing_suggestions_are_cleared() {
        let dict = dict("", "1\nhello\n");
        let mut suggestions = vec!["stale".to_string()];
        dict.suggest("", &mut suggestions);
        assert!(suggestions.is_empty());
    }

    #[test]
    fn uppercase_suggest() {
        let dict = dict("", "1\nANSI\n");
        let suggestions = suggest_detailed(&dict, "ansi");
        assert_eq!(suggestions[0].text, "ANSI");
        assert_eq!(suggestions[0].kind, SuggestionKind::Uppercase);
    }

    #[test]
    fn swap_suggest() {
        let dict = dict("", "2\nexample\nhave\n");
        assert!(suggest(&dict, "exmaple").contains(&"example".to_string()));
        // 4-character double swap.
        assert!(suggest(&dict, "ahev").contains(&"have".to_string()));
    }

    #[test]
    fn keyboard_suggest() {
        // The similarity fallback is disabled so only the KEY neighbors can find "dream".
        let aff = "KEY qwertyuiop|asdfghjkl|zxcvbnm\nMAXNGRAMSUGS 0\n";
        let dict = dict(aff, "1\ndream\n");

        assert!(suggest(&dict, "dteam").contains(&"dream".to_string()));
        assert!(suggest(&dict, "dresm").contains(&"dream".to_string()));
        assert!(!suggest(&dict, "dredm").contains(&"dream".to_string()));
    }

    #[test]
    fn extra_char_suggest() {
        let dict = dict("", "1\nadventure\n");
        assert!(suggest(&dict, "adveenture").contains(&"adventure".to_string()));
    }

    #[test]
    fn forgotten_char_suggest() {
        let aff = "TRY l\n";
        let dict = dict(aff, "1\nhello\n");
        assert!(suggest(&dict, "helo").contains(&"hello".to_string()));
    }

    #[test]
    fn wrong_char_suggest() {
        let aff = "TRY o\n";
        let dict = dict(aff, "1\nworld\n");
        assert!(suggest(&dict, "warld").contains(&"world".to_string()));
    }

    #[test]
    fn nosuggest_words_never_appear() {
        let aff = "TRY l\nNOSUGGEST N\n";
        let dict = dict(aff, "2\nhell/N\nhello\n");

        let suggestions = suggest(&dict, "helo");
        assert!(suggestions.contains(&"hello".to_string()));
        assert!(!suggestions.contains(&"hell".to_string()));
    }

    #[test]
    fn rep_suggest_is_a_good_edit() {
        let aff = r#"
TRY lots
REP 1
REP alot a_lot
"#;
        let dict = dict(aff, "3\na\nlot\nslot\n");

        let suggestions = suggest_detailed(&dict, "alot");
        assert_eq!(suggestions[0].text, "a lot");
        assert_eq!(suggestions[0].kind, SuggestionKind::RepChars);
        // The round still runs to completion ("slot" is a later, weaker hit) but no further
        // casing variants are explored afterwards.
        assert!(suggestions
            .iter()
            .any(|suggestion| suggestion.text == "slot"));
    }

    #[test]
    fn space_word_ends_the_stream() {
        let dict = dict("TRY x\n", "3\nice\ncream\nicecreams\n");

        let suggestions = suggest_detailed(&dict, "icecream");
        assert_eq!(
            suggestions.last().map(|suggestion| suggestion.kind),
            Some(SuggestionKind::SpaceWord)
        );
        assert!(suggestions
            .iter()
            .any(|suggestion| suggestion.text == "ice cream"));
    }

    #[test]
    fn case_suggest() {
        let dict = dict("", "1\nthe\n");

        let suggestions = suggest_detailed(&dict, "THe");
        assert_eq!(suggestions[0].text, "The");
        assert_eq!(suggestions[0].kind, SuggestionKind::Case);
    }

    #[test]
    fn keep_case_suggestions_stay_lowercase() {
        let aff = "KEEPCASE K\n";
        let dict = dict(aff, "1\nirc/K\n");

        let suggestions = suggest(&dict, "IRC");
        assert!(suggestions.contains(&"irc".to_string()));
        assert!(!suggestions.contains(&"IRC".to_string()));
    }

    #[test]
    fn force_uppercase_short_circuits() {
        let aff = r#"
COMPOUNDFLAG X
FORCEUCASE U
"#;
        let dict = dict(aff, "2\nbook/X\nshop/XU\n");

        let suggestions = suggest_detailed(&dict, "bookshop");
        assert_eq!(suggestions.len(), 1);
        assert_eq!(suggestions[0].text, "Bookshop");
        assert_eq!(suggestions[0].kind, SuggestionKind::ForceUcase);
    }

    #[test]
    fn compound_round_suggests_compounds() {
        let aff = r#"
TRY o
COMPOUNDFLAG X
"#;
        let dict = dict(aff, "2\nbook/X\nworm/X\n");

        // "bookwarm" isn't one affixed word away from anything, but replacing the 'a' makes
        // a valid compound.
        let suggestions = suggest_detailed(&dict, "bookwarm");
        assert!(suggestions
            .iter()
            .any(|suggestion| suggestion.text == "bookworm"));
    }

    #[test]
    fn dash_suggest() {
        let aff = "TRY e\n";
        let dict = dict(aff, "2\nco\noperate\n");

        let suggestions = suggest_detailed(&dict, "co-oparate");
        assert!(suggestions
            .iter()
            .any(|suggestion| suggestion.text == "co-operate"
                && suggestion.kind == SuggestionKind::Dashes));
    }

    #[test]
    fn dash_suggest_skipped_when_dashed_suggestion_exists() {
        // The edit round already finds the dashed dictionary entry, so the dash recursion
        // doesn't run at all.
        let aff = "TRY m\n";
        let dict = dict(aff, "2\ncream\nice-cream\n");

        let suggestions = suggest_detailed(&dict, "ice-creay");
        assert!(suggestions
            .iter()
            .any(|suggestion| suggestion.text == "ice-cream"
                && suggestion.kind == SuggestionKind::BadChar));
        assert!(suggestions
            .iter()
            .all(|suggestion| suggestion.kind != SuggestionKind::Dashes));
    }

    #[test]
    fn oconv_applies_to_suggestions() {
        let aff = r#"
TRY '
OCONV 1
OCONV ' ’
"#;
        let dict = dict(aff, "1\ncan't\n");

        let suggestions = suggest(&dict, "cant");
        assert!(suggestions.contains(&"can’t".to_string()));
    }

    #[test]
    fn ngram_suggest_when_edits_find_nothing() {
        let aff = "MAXNGRAMSUGS 2\n";
        let dict = dict(aff, "3\nhello\njello\nworld\n");

        let suggestions = suggest_detailed(&dict, "hullo");
        assert!(suggestions
            .iter()
            .any(|suggestion| suggestion.text == "hello"
                && suggestion.kind == SuggestionKind::Ngram));
        assert!(suggestions.len() <= 2);
    }

    #[test]
    fn fallback_skipped_without_ngram_or_phone() {
        let aff = "MAXNGRAMSUGS 0\n";
        let dict = dict(aff, "2\nhello\nworld\n");

        assert!(suggest(&dict, "hullo").is_empty());
    }

    #[test]
    fn phonet_suggest() {
        let aff = r#"
MAXNGRAMSUGS 0
PHONE 2
PHONE PH F
PHONE Z S
"#;
        let dict = dict(aff, "2\nphone\nother\n");

        let suggestions = suggest_detailed(&dict, "fone");
        assert!(suggestions
            .iter()
            .any(|suggestion| suggestion.text == "phone"
                && suggestion.kind == SuggestionKind::Phonet));
    }

    #[test]
    fn suggestions_are_deterministic() {
        let aff = "TRY esianrtolcdugmphbyfvkwz\nMAXNGRAMSUGS 3\n";
        let dict = dict(aff, "4\nhello\nworld\nhelp\nshell\n");

        assert_eq!(suggest(&dict, "helol"), suggest(&dict, "helol"));
    }

    #[test]
    fn use_dash_heuristic() {
        assert!(use_dash("abc-"));
        assert!(use_dash("xyza"));
        assert!(!use_dash("xyz"));
    }
}
