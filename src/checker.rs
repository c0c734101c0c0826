//! Checking whether words belong to the dictionary.
//!
//! The checker serves two callers with slightly different contracts. The public
//! `Dictionary::check` wants the forgiving interpretation: try recapitalizations, break the
//! word on `BREAK` patterns, accept numbers and abbreviations. The suggester wants a strict
//! oracle for its candidates: the exact text must be a valid affixed form (or a valid compound
//! during compound rounds), and words the dictionary marks as unsuggestable don't count.

use core::hash::BuildHasher;

use crate::{
    aff::{Affix, AffData, AffixKind},
    casing::{self, Casing},
    macros::has_flag,
    word_list::WordList,
    Dictionary, Flag, FlagSet, MAX_WORD_LEN,
};

const MAX_BREAK_DEPTH: usize = 9;

/// Fallback for `COMPOUNDWORDMAX`: how many stems a compound may be built from when the
/// dictionary doesn't say.
const MAX_COMPOUND_WORDS: usize = 8;

/// Fallback for `COMPOUNDMIN`: the minimum length of a compound part, in characters.
const DEFAULT_COMPOUND_MIN: usize = 3;

#[derive(Clone, Copy, PartialEq, Eq)]
enum CompoundPosition {
    Begin,
    Middle,
    End,
}

pub(crate) struct Checker<'a, S: BuildHasher> {
    pub(crate) words: &'a WordList<S>,
    pub(crate) aff: &'a AffData,
}

impl<'a, S: BuildHasher> Checker<'a, S> {
    pub fn new(dict: &'a Dictionary<S>) -> Self {
        Self {
            words: &dict.words,
            aff: &dict.aff,
        }
    }

    /// Checks that the word is valid according to the dictionary.
    pub fn check(&self, word: &str) -> bool {
        if word.len() > MAX_WORD_LEN {
            return false;
        }

        let word = self.aff.input_conversions.convert(word);

        if word.is_empty() {
            return true;
        }

        let trimmed_word = word.trim_end_matches('.');
        let abbreviated = trimmed_word.len() != word.len();

        if is_number(trimmed_word) {
            return true;
        }

        if self.spell_break(trimmed_word, 0) {
            return true;
        }

        if abbreviated {
            // The dots may belong to the word itself ("etc." style entries).
            return self.spell_break(&word, 0);
        }

        false
    }

    /// Recursively breaks up a word according to the dictionary's `BREAK` rules and checks
    /// that each broken piece is correct.
    fn spell_break(&self, word: &str, depth: usize) -> bool {
        if self.spell_casing(word) {
            return true;
        }

        if depth == MAX_BREAK_DEPTH {
            return false;
        }

        for pattern in self.aff.break_table.start_word_breaks() {
            if let Some(rest) = word.strip_prefix(pattern) {
                if self.spell_break(rest, depth + 1) {
                    return true;
                }
            }
        }

        for pattern in self.aff.break_table.end_word_breaks() {
            if let Some(rest) = word.strip_suffix(pattern) {
                if self.spell_break(rest, depth + 1) {
                    return true;
                }
            }
        }

        for pattern in self.aff.break_table.middle_word_breaks() {
            // Break the word into two - dropping the pattern - and check that both parts are
            // correct.
            if let Some((part1, part2)) = word.split_once(pattern) {
                // A match at the end of the string is not a middle word break.
                if part2.is_empty() {
                    continue;
                }

                if !self.spell_break(part1, depth + 1) {
                    continue;
                }

                if self.spell_break(part2, depth + 1) {
                    return true;
                }
            }
        }

        false
    }

    /// Checks one unbreakable word, retrying the recapitalizations its casing allows.
    fn spell_casing(&self, word: &str) -> bool {
        match casing::classify_casing(word) {
            Casing::None | Casing::Camel | Casing::Pascal => self.spell_exact(word, false),
            Casing::Init => {
                self.spell_exact(word, false) || self.spell_exact(&casing::lowercase(word), true)
            }
            Casing::All => {
                self.spell_exact(word, false)
                    || self.spell_exact(&casing::lowercase(word), true)
                    || self.spell_exact(&casing::titlecase(word), true)
            }
        }
    }

    /// Checks one word with exactly this capitalization. `recapitalized` is set when the word
    /// was coerced away from how it was typed, which `KEEPCASE` entries reject.
    fn spell_exact(&self, word: &str, recapitalized: bool) -> bool {
        if let Some(flags) = self.affix_form(word, true) {
            if recapitalized
                && has_flag!(flags, self.aff.options.keep_case_flag)
                && !self.aff.is_sharps(word)
            {
                return false;
            }
            return true;
        }

        self.compound_form(word, true)
    }

    /// The oracle used by the suggester to validate candidates.
    ///
    /// No recapitalization is tried - the candidate must be correct as spelled - and words
    /// marked `NOSUGGEST` (or `WARN` under `FORBIDWARN`) are rejected. During compound rounds
    /// only compound forms are accepted, otherwise only affix forms.
    pub fn correct(&self, word: &str, compounds: bool) -> bool {
        // Candidates containing spaces (REP pairs and word splits) are accepted when every
        // part is individually correct.
        if word.contains(' ') {
            return word
                .split(' ')
                .all(|part| !part.is_empty() && self.correct(part, compounds));
        }

        if compounds {
            self.compound_form(word, false)
        } else {
            self.affix_form(word, false).is_some()
        }
    }

    /// Like [`correct`](Self::correct) but accepting either form. Used for recapitalized
    /// variants and for the chunks of dashed words.
    pub fn correct_any(&self, word: &str) -> bool {
        self.correct(word, false) || self.correct(word, true)
    }

    /// Whether the stored form of this word carries `FORBIDDENWORD`.
    pub fn is_forbidden(&self, word: &str) -> bool {
        self.aff.options.forbidden_word_flag.is_some()
            && self
                .words
                .homonyms(word)
                .any(|flags| has_flag!(flags, self.aff.options.forbidden_word_flag))
    }

    /// Whether any entry stored under exactly this stem carries the flag.
    pub fn has_flag(&self, word: &str, flag: Option<Flag>) -> bool {
        flag.is_some() && self.words.homonyms(word).any(|flags| has_flag!(flags, flag))
    }

    /// Looks up the word as a bare stem or as a stem with affixes applied, returning the
    /// stem's flags on success.
    fn affix_form(&self, word: &str, allow_nosuggest: bool) -> Option<&'a FlagSet> {
        if word.is_empty() {
            return None;
        }

        // A FORBIDDENWORD entry vetoes the spelling outright, homonyms included.
        if self.is_forbidden(word) {
            return None;
        }

        for flags in self.words.homonyms(word) {
            if self.valid_bare(flags, allow_nosuggest) {
                return Some(flags);
            }
        }

        // One suffix, optionally combined with a cross-product prefix.
        for suffix in self.aff.suffixes.affixes_of(word) {
            if !self.affix_usable(suffix) {
                continue;
            }
            let stem = suffix.to_stem(word);
            if stem.is_empty() && !self.aff.options.fullstrip {
                continue;
            }
            if !suffix.condition_matches(&stem) {
                continue;
            }

            if !self.is_circumfix(suffix) {
                for flags in self.words.homonyms(&stem) {
                    if flags.contains(&suffix.flag)
                        && self.valid_affixed(flags, allow_nosuggest)
                    {
                        return Some(flags);
                    }
                }
            }

            if !suffix.crossproduct {
                continue;
            }
            for prefix in self.aff.prefixes.affixes_of(&stem) {
                if !prefix.crossproduct || !self.affix_usable(prefix) {
                    continue;
                }
                // A circumfix is a prefix/suffix pair that only occurs together.
                if self.is_circumfix(prefix) != self.is_circumfix(suffix) {
                    continue;
                }
                let stem = prefix.to_stem(&stem);
                if stem.is_empty() && !self.aff.options.fullstrip {
                    continue;
                }
                if !prefix.condition_matches(&stem) {
                    continue;
                }
                for flags in self.words.homonyms(&stem) {
                    if flags.contains(&suffix.flag)
                        && flags.contains(&prefix.flag)
                        && self.valid_affixed(flags, allow_nosuggest)
                    {
                        return Some(flags);
                    }
                }
            }
        }

        // One prefix alone.
        for prefix in self.aff.prefixes.affixes_of(word) {
            if !self.affix_usable(prefix) || self.is_circumfix(prefix) {
                continue;
            }
            let stem = prefix.to_stem(word);
            if stem.is_empty() && !self.aff.options.fullstrip {
                continue;
            }
            if !prefix.condition_matches(&stem) {
                continue;
            }
            for flags in self.words.homonyms(&stem) {
                if flags.contains(&prefix.flag) && self.valid_affixed(flags, allow_nosuggest) {
                    return Some(flags);
                }
            }
        }

        None
    }

    fn valid_bare(&self, flags: &FlagSet, allow_nosuggest: bool) -> bool {
        let options = &self.aff.options;
        !has_flag!(flags, options.need_affix_flag)
            && !has_flag!(flags, options.only_in_compound_flag)
            && self.suggestable(flags, allow_nosuggest)
    }

    fn valid_affixed(&self, flags: &FlagSet, allow_nosuggest: bool) -> bool {
        !has_flag!(flags, self.aff.options.only_in_compound_flag)
            && self.suggestable(flags, allow_nosuggest)
    }

    fn suggestable(&self, flags: &FlagSet, allow_nosuggest: bool) -> bool {
        let options = &self.aff.options;
        if has_flag!(flags, options.forbidden_word_flag) {
            return false;
        }
        if allow_nosuggest {
            return true;
        }
        !has_flag!(flags, options.no_suggest_flag)
            && !(options.forbid_warn && has_flag!(flags, options.warn_flag))
    }

    fn affix_usable<K: AffixKind>(&self, affix: &Affix<K>) -> bool {
        // Affixes restricted to compounds can't build a standalone word.
        !has_flag!(affix.flags, self.aff.options.only_in_compound_flag)
    }

    fn is_circumfix<K: AffixKind>(&self, affix: &Affix<K>) -> bool {
        has_flag!(affix.flags, self.aff.options.circumfix_flag)
    }

    /// Checks whether the word is a valid compound of dictionary stems.
    fn compound_form(&self, word: &str, allow_nosuggest: bool) -> bool {
        if word.is_empty() {
            return false;
        }

        if !self.aff.compound_rules.is_empty() {
            let mut parts = Vec::new();
            if self.compound_rule_split(word, &mut parts) {
                return true;
            }
        }

        let options = &self.aff.options;
        if options.compound_flag.is_some()
            || options.compound_begin_flag.is_some()
            || options.compound_last_flag.is_some()
        {
            let first_upper = word.chars().next().is_some_and(char::is_uppercase);
            if self.compound_pieces(word, 0, first_upper, allow_nosuggest) {
                return true;
            }
        }

        false
    }

    fn compound_min(&self) -> usize {
        self.aff
            .options
            .compound_min_length
            .map(|min| min.get() as usize)
            .unwrap_or(DEFAULT_COMPOUND_MIN)
    }

    fn max_compound_words(&self) -> usize {
        self.aff
            .options
            .compound_max_word_count
            .map(|max| max.get() as usize)
            .unwrap_or(MAX_COMPOUND_WORDS)
    }

    /// Tries to split `rest` into parts carrying the compounding flags. `parts_so_far` parts
    /// have already been matched to the left.
    fn compound_pieces(
        &self,
        rest: &str,
        parts_so_far: usize,
        first_upper: bool,
        allow_nosuggest: bool,
    ) -> bool {
        let min = self.compound_min();
        let char_count = rest.chars().count();

        for (chars_before, (byte_idx, _ch)) in rest.char_indices().enumerate() {
            if chars_before < min {
                continue;
            }
            // The tail only shrinks from here on.
            if char_count - chars_before < min {
                break;
            }

            let (head, tail) = rest.split_at(byte_idx);
            let position = if parts_so_far == 0 {
                CompoundPosition::Begin
            } else {
                CompoundPosition::Middle
            };
            let mut head_ok = self.compound_part(head, position, first_upper, allow_nosuggest);
            if !head_ok && parts_so_far == 0 && first_upper {
                // A capitalized compound still starts from a lowercase stem.
                let lowered = casing::lowercase(head);
                head_ok = lowered != head
                    && self.compound_part(&lowered, position, first_upper, allow_nosuggest);
            }
            if !head_ok {
                continue;
            }

            if parts_so_far + 2 <= self.max_compound_words()
                && self.compound_part(tail, CompoundPosition::End, first_upper, allow_nosuggest)
            {
                return true;
            }

            if parts_so_far + 2 < self.max_compound_words()
                && self.compound_pieces(tail, parts_so_far + 1, first_upper, allow_nosuggest)
            {
                return true;
            }
        }

        false
    }

    fn compound_part(
        &self,
        part: &str,
        position: CompoundPosition,
        first_upper: bool,
        allow_nosuggest: bool,
    ) -> bool {
        let options = &self.aff.options;
        let position_flag = match position {
            CompoundPosition::Begin => options.compound_begin_flag,
            CompoundPosition::Middle => options.compound_middle_flag,
            CompoundPosition::End => options.compound_last_flag,
        };

        for flags in self.words.homonyms(part) {
            if has_flag!(flags, options.forbidden_word_flag) {
                continue;
            }
            if !allow_nosuggest && has_flag!(flags, options.no_suggest_flag) {
                continue;
            }
            if !(has_flag!(flags, options.compound_flag) || has_flag!(flags, position_flag)) {
                continue;
            }
            // FORCEUCASE: a compound ending in this part must be capitalized.
            if position == CompoundPosition::End
                && has_flag!(flags, options.compound_force_uppercase_flag)
                && !first_upper
            {
                continue;
            }
            return true;
        }

        false
    }

    /// Tries to split `rest` into stems whose flag sequence matches a COMPOUNDRULE pattern.
    fn compound_rule_split<'s>(&'s self, rest: &str, parts: &mut Vec<&'s FlagSet>) -> bool {
        // With at least one part to the left, `rest` may close the compound.
        if !parts.is_empty() {
            for flags in self.words.homonyms(rest) {
                if !self.aff.compound_rules.has_any_flags(flags) {
                    continue;
                }
                parts.push(flags);
                let matched = self.aff.compound_rules.any_rule_matches(parts);
                parts.pop();
                if matched {
                    return true;
                }
            }
        }

        if parts.len() + 1 >= self.max_compound_words() {
            return false;
        }

        let min = self.compound_min();
        let char_count = rest.chars().count();
        for (chars_before, (byte_idx, _ch)) in rest.char_indices().enumerate() {
            if chars_before < min {
                continue;
            }
            if char_count - chars_before < min {
                break;
            }

            let (head, tail) = rest.split_at(byte_idx);
            for flags in self.words.homonyms(head) {
                if !self.aff.compound_rules.has_any_flags(flags) {
                    continue;
                }
                parts.push(flags);
                let matched = self.compound_rule_split(tail, parts);
                parts.pop();
                if matched {
                    return true;
                }
            }
        }

        false
    }
}

/// Checks if the input word is a number.
///
/// Numbers may have a leading `-` and can have separators within the number of `,`, `.` or
/// `-`, but not more than one separating digits.
fn is_number(word: &str) -> bool {
    let word = word.strip_prefix('-').unwrap_or(word);
    if word.is_empty() {
        return false;
    }

    let mut separated = true;
    for ch in word.chars() {
        match ch {
            '0'..='9' => separated = false,
            '.' | '-' | ',' if !separated => separated = true,
            _ => return false,
        }
    }

    true
}

#[cfg(test)]
mod test {
    use crate::Dictionary;

    use super::*;

    #[test]
    fn is_number_nuspell_unit_test() {
        // Upstream: <https://github.com/nuspell/nuspell/blob/349e0d6bc68b776af035ca3ff664a7fc55d69387/tests/unit_test.cxx#L461-L471>

        assert!(!is_number(""));
        assert!(is_number("1234567890"));
        assert!(is_number("-1234567890"));
        assert!(is_number("123.456.78-9,0"));
        assert!(is_number("-123.456.78-9,0"));
        assert!(!is_number("123..456.78-9,0"));
        assert!(!is_number("123.456.-78-9,0"));
        assert!(!is_number("123..456.78-9-,0"));
    }

    fn dict(aff: &str, dic: &str) -> Dictionary {
        Dictionary::new(aff, dic).unwrap()
    }

    #[test]
    fn bare_and_affixed_words() {
        let aff = r#"
PFX A Y 1
PFX A 0 re .

SFX S Y 2
SFX S 0 s [^y]
SFX S y ies y
"#;
        let dic = r#"2
try/S
cover/AS
"#;
        let dict = dict(aff, dic);

        assert!(dict.check("try"));
        assert!(dict.check("tries"));
        assert!(!dict.check("trys"));
        assert!(dict.check("cover"));
        assert!(dict.check("covers"));
        assert!(dict.check("recover"));
        assert!(dict.check("recovers"));
        assert!(!dict.check("retry"));
        assert!(!dict.check("recovery"));
    }

    #[test]
    fn casing_variants_accepted() {
        let dict = dict("", "2\nhello\nIzmir\n");

        assert!(dict.check("hello"));
        assert!(dict.check("Hello"));
        assert!(dict.check("HELLO"));
        assert!(!dict.check("hELLO"));

        // A titlecased entry doesn't become valid lowercase.
        assert!(dict.check("Izmir"));
        assert!(dict.check("IZMIR"));
        assert!(!dict.check("izmir"));
    }

    #[test]
    fn keep_case_rejects_recapitalization() {
        let aff = "KEEPCASE K\n";
        let dict = dict(aff, "1\nirc/K\n");

        assert!(dict.check("irc"));
        assert!(!dict.check("IRC"));
        assert!(!dict.check("Irc"));
    }

    #[test]
    fn forbidden_word_rejected() {
        let aff = "FORBIDDENWORD F\n";
        let dict = dict(aff, "2\nfoo/F\nfoo\n");

        // The forbidden homonym wins.
        assert!(!dict.check("foo"));
    }

    #[test]
    fn break_patterns_split_words() {
        let dict = dict("", "2\nco\noperate\n");

        // The default break table splits on dashes.
        assert!(dict.check("co-operate"));
        assert!(!dict.check("co-operat"));
    }

    #[test]
    fn numbers_and_abbreviations() {
        let dict = dict("", "1\netc\n");

        assert!(dict.check("8675,309.0"));
        assert!(dict.check("etc."));
    }

    #[test]
    fn compound_flag_words() {
        let aff = "COMPOUNDFLAG X\n";
        let dict = dict(aff, "2\nbook/X\nworm/X\n");

        assert!(dict.check("bookworm"));
        assert!(dict.check("wormbook"));
        assert!(dict.check("bookwormbook"));
        assert!(!dict.check("bookw"));
        // Parts shorter than COMPOUNDMIN (default 3) don't compound.
        assert!(!dict.check("bookwo"));
    }

    #[test]
    fn compound_positional_flags() {
        let aff = r#"
COMPOUNDBEGIN B
COMPOUNDLAST E
"#;
        let dict = dict(aff, "2\nbook/B\nworm/E\n");

        assert!(dict.check("bookworm"));
        assert!(!dict.check("wormbook"));
    }

    #[test]
    fn compound_rules() {
        let aff = r#"
COMPOUNDMIN 1
COMPOUNDRULE 1
COMPOUNDRULE ab*c
"#;
        let dict = dict(aff, "3\nfoo/a\nbar/b\nbaz/c\n");

        assert!(dict.check("foobaz"));
        assert!(dict.check("foobarbaz"));
        assert!(dict.check("foobarbarbaz"));
        assert!(!dict.check("foobar"));
        assert!(!dict.check("bazfoo"));
    }

    #[test]
    fn compound_force_uppercase() {
        let aff = r#"
COMPOUNDFLAG X
FORCEUCASE U
"#;
        let dict = dict(aff, "2\nbook/X\nshop/XU\n");

        assert!(!dict.check("bookshop"));
        assert!(dict.check("Bookshop"));
        // The force-uppercase flag only binds the final part.
        assert!(dict.check("shopbook"));
    }

    #[test]
    fn suggestion_oracle_is_strict() {
        let aff = r#"
NOSUGGEST N
COMPOUNDFLAG X
"#;
        let dictionary = dict(aff, "3\nhello/N\nbook/X\nworm/X\n");
        let checker = Checker::new(&dictionary);

        // Valid for checking but not as a suggestion candidate.
        assert!(dictionary.check("hello"));
        assert!(!checker.correct("hello", false));

        // Compound rounds only accept compound forms and vice versa.
        assert!(checker.correct("bookworm", true));
        assert!(!checker.correct("bookworm", false));
        assert!(checker.correct("book", false));
        assert!(!checker.correct("book", true));

        // Space-separated candidates check each part.
        assert!(checker.correct("book worm", false));
        assert!(!checker.correct("book wor", false));
    }
}
