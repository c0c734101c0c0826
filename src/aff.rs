//! The model of a `.aff` file: affixes, flags, and the tables driving checking and suggestion.

pub(crate) mod parser;

use core::{marker::PhantomData, num::NonZeroU16, str::Chars};
use std::borrow::Cow;

use crate::{Flag, FlagSet};

/// The representation of a flag in a `.dic` or `.aff` file.
///
/// This representation also decides how we encode flags into `Flag`. This is controlled by the
/// `FLAG` directive in a `.aff` file.
#[derive(Debug, Default, Clone, Copy)]
pub(crate) enum FlagType {
    /// A single ascii character.
    ///
    /// This is the default representation if a `.aff` file does not specify another.
    #[default]
    Short,
    /// Two adjacent ascii characters.
    ///
    /// The french dictionary uses this. For example for some proper nouns like `Asimov/L'D'Q'`:
    /// `L'` is a flag, `D'` another, `Q'` another.
    Long,
    /// A number in the range `1..=65000`.
    ///
    /// Numeric flags are separated by commas, for example `actionfilm/70,7,252,976` from the
    /// Danish dictionary.
    Numeric,
    /// One UTF-8 character.
    Utf8,
}

/// The pattern in the last column of a `PFX`/`SFX` rule line.
///
/// Conditions are a tiny subset of regex: literals, the `.` wildcard, and positive or negative
/// character classes.
#[derive(Debug, PartialEq, Eq, Clone)]
pub(crate) struct Condition {
    /// The input pattern, kept as written. Matching interprets it directly.
    ///
    /// This string is non-empty.
    pattern: String,
    /// The number of `char`s that the pattern describes. A linear scan of the pattern is
    /// enough to tell how many characters it will attempt to match.
    chars: usize,
}

impl Condition {
    pub fn matches(&self, input: &str) -> bool {
        let mut input = input.chars();
        let mut pattern = self.pattern.chars().peekable();

        loop {
            match (pattern.next(), input.next()) {
                // If we're at the end of both inputs or the pattern is shorter, this is a match.
                (None, _) => return true,
                (Some(_), None) => return false,
                // Wildcard: skip the input character.
                (Some('.'), Some(_)) => (),
                // Character classes
                (Some('['), Some(input_ch)) => {
                    let negative = pattern.next_if_eq(&'^').is_some();
                    let mut found = false;

                    for ch in pattern.by_ref() {
                        if ch == ']' {
                            break;
                        }
                        if ch == input_ch {
                            found = true;
                        }
                    }

                    if found == negative {
                        return false;
                    }
                }
                // Literals: the pattern character must equal the input character.
                (Some(pattern_ch), Some(input_ch)) => {
                    if pattern_ch != input_ch {
                        return false;
                    }
                }
            }
        }
    }
}

/// Internal container type for a prefix or suffix.
#[derive(Debug, PartialEq, Eq, Clone)]
pub(crate) struct Affix<K> {
    /// The flag that words may use to reference this affix.
    pub flag: Flag,
    /// Whether the affix is compatible with the opposite affix. For a word to apply both a
    /// prefix and a suffix, both must have `crossproduct: true`.
    pub crossproduct: bool,
    /// What is stripped from the stem when the affix is applied.
    strip: Option<String>,
    /// What is added when the affix is applied.
    pub add: String,
    /// Condition that the stem is checked against to query if the affix is relevant.
    ///
    /// `None` is what Hunspell writes as `"."`: a pattern that always matches.
    condition: Option<Condition>,
    /// Continuation flags, included with the `add` in `.aff` files (separated by `/`).
    pub flags: FlagSet,
    phantom_data: PhantomData<K>,
}

impl<K: AffixKind> Affix<K> {
    pub fn new(
        flag: Flag,
        crossproduct: bool,
        strip: Option<&str>,
        add: &str,
        condition: Option<&str>,
        flags: FlagSet,
    ) -> Result<Self, parser::ConditionError> {
        let condition = condition.map(str::parse).transpose()?;

        Ok(Self {
            flag,
            crossproduct,
            strip: strip.map(|strip| strip.to_string()),
            add: add.to_string(),
            condition,
            flags,
            phantom_data: PhantomData,
        })
    }

    pub fn appending(&self) -> K::Chars<'_> {
        K::chars(&self.add)
    }

    pub fn strip(&self) -> Option<&str> {
        self.strip.as_deref()
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub(crate) struct Pfx;
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub(crate) struct Sfx;

/// Rules for replacing characters at the beginning of a stem.
pub(crate) type Prefix = Affix<Pfx>;
/// Rules for replacing characters at the end of a stem.
pub(crate) type Suffix = Affix<Sfx>;

/// A helper trait that, together with `Pfx` and `Sfx`, allows generically reading the
/// characters of a `&str` forwards or backwards. Prefixes are compared to words front-to-back,
/// suffixes back-to-front.
///
/// This is a "lending iterator" using a generic associated type so the iterator borrows only
/// from the input word.
pub(crate) trait AffixKind {
    type Chars<'a>: Iterator<Item = char>
    where
        Self: 'a;

    fn chars(word: &str) -> Self::Chars<'_>;
}

impl AffixKind for Pfx {
    type Chars<'a> = Chars<'a>;

    fn chars(word: &str) -> Self::Chars<'_> {
        word.chars()
    }
}

impl AffixKind for Sfx {
    type Chars<'a> = core::iter::Rev<Chars<'a>>;

    fn chars(word: &str) -> Self::Chars<'_> {
        word.chars().rev()
    }
}

impl Prefix {
    /// Converts a word which starts with this `Prefix` to the word's stem: the `add` is removed
    /// from the beginning and replaced with the `strip`.
    ///
    /// # Panics
    ///
    /// This function `expect`s that the `Prefix`'s `add` is a prefix of the input `word`.
    pub fn to_stem<'a>(&self, word: &'a str) -> Cow<'a, str> {
        let stripped = word
            .strip_prefix(&self.add)
            .expect("to_stem should only be called when the `add` is a prefix of the word");

        match &self.strip {
            Some(strip) => {
                let mut stem = strip.to_string();
                stem.push_str(stripped);
                Cow::Owned(stem)
            }
            None => Cow::Borrowed(stripped),
        }
    }

    /// Converts a stem into a word starting with this `Prefix`: the inverse of
    /// [`to_stem`](Self::to_stem).
    ///
    /// # Panics
    ///
    /// This function `expect`s that the given `word` starts with this `Prefix`'s `strip`, if
    /// this prefix has a `strip`.
    pub fn to_derived(&self, word: &str) -> String {
        let stripped = match &self.strip {
            Some(strip) => word
                .strip_prefix(strip)
                .expect("to_derived should only be called when `strip` is a prefix of the word"),
            None => word,
        };
        let mut derived = self.add.clone();
        derived.push_str(stripped);
        derived
    }

    pub fn condition_matches(&self, word: &str) -> bool {
        let condition = match self.condition.as_ref() {
            Some(condition) => condition,
            None => return true,
        };

        // Length in bytes is greater than or equal to length in chars.
        if word.len() < condition.chars {
            return false;
        }

        condition.matches(word)
    }
}

impl Suffix {
    /// Converts a word which ends with this `Suffix` to the word's stem: the `add` is removed
    /// from the end and replaced with the `strip`.
    ///
    /// # Panics
    ///
    /// This function `expect`s that the `Suffix`'s `add` is a suffix of the input `word`.
    pub fn to_stem<'a>(&self, word: &'a str) -> Cow<'a, str> {
        let stripped = word
            .strip_suffix(&self.add)
            .expect("to_stem should only be called when the `add` is a suffix of the word");

        match self.strip.as_deref() {
            Some(strip) => {
                let mut stem = stripped.to_string();
                stem.push_str(strip);
                Cow::Owned(stem)
            }
            None => Cow::Borrowed(stripped),
        }
    }

    /// Converts a stem into a word ending with this `Suffix`: the inverse of
    /// [`to_stem`](Self::to_stem).
    ///
    /// # Panics
    ///
    /// This function `expect`s that the given `word` ends with this `Suffix`'s `strip`, if this
    /// suffix has a `strip`.
    pub fn to_derived(&self, word: &str) -> String {
        let mut derived = match &self.strip {
            Some(strip) => word
                .strip_suffix(strip)
                .expect("to_derived should only be called when `strip` is a suffix of the word"),
            None => word,
        }
        .to_string();
        derived.push_str(&self.add);
        derived
    }

    pub fn condition_matches(&self, word: &str) -> bool {
        let condition = match self.condition.as_ref() {
            Some(condition) => condition,
            None => return true,
        };

        // The condition applies to the end of the word. Count backwards over the last
        // `condition.chars` characters to find where the match should start.
        let len_bytes = word.len();
        if len_bytes < condition.chars {
            return false;
        }

        let (chars, bytes) = word
            .char_indices()
            .rev()
            .take(condition.chars)
            .fold((0, 0), |(chars, _bytes), (byte_index, _ch)| {
                (chars + 1, len_bytes - byte_index)
            });

        if chars < condition.chars {
            return false;
        }
        condition.matches(&word[len_bytes - bytes..])
    }
}

pub(crate) type PrefixIndex = AffixIndex<Pfx>;
pub(crate) type SuffixIndex = AffixIndex<Sfx>;

/// A searchable collection of affixes, queried by word.
///
/// For prefixes, `affixes_of` returns an iterator over all of the `Prefix`es in the table whose
/// `add` text is a prefix of the search word. For suffixes the same is done from the end of the
/// word. For example with the `en_US.aff` suffixes
///
/// ```text
/// SFX D Y 4
/// SFX D   0     d          e
/// SFX D   y     ied        [^aeiou]y
/// SFX D   0     ed         [^ey]
/// SFX D   0     ed         [aeiou]y
/// ```
///
/// a lookup of "aced" yields the first, third and fourth rules (`d`, `ed`, `ed` are suffixes of
/// "aced") but not the second (`ied`).
///
/// Internally the affixes are kept in one table sorted by `add` text, like a flattened radix
/// tree. Iteration first emits affixes with empty `add`, then narrows the table to the run
/// sharing the word's first character via a precomputed character index, then narrows further
/// by linear scans per character.
#[derive(Debug)]
pub(crate) struct AffixIndex<C> {
    table: Vec<Affix<C>>,
    first_chars: Vec<char>,
    run_starts: Vec<usize>,
}

impl<C: AffixKind> FromIterator<Affix<C>> for AffixIndex<C> {
    fn from_iter<T: IntoIterator<Item = Affix<C>>>(iter: T) -> Self {
        let table: Vec<_> = iter.into_iter().collect();
        table.into()
    }
}

impl<C: AffixKind> From<Vec<Affix<C>>> for AffixIndex<C> {
    fn from(mut table: Vec<Affix<C>>) -> Self {
        // Sort the table lexicographically by the key ("add") text. The search iterator relies
        // on this ordering.
        table.sort_unstable_by(|a, b| a.appending().cmp(b.appending()));

        let mut first_chars = Vec::new();
        let mut run_starts = Vec::new();

        // Seek through the sorted table to the first element with a non-empty key.
        let mut run_start = table.partition_point(|affix| affix.appending().next().is_none());
        while run_start < table.len() {
            let ch = table[run_start]
                .appending()
                .next()
                .expect("the table is sorted so empty keys come before the partition point");

            // Remember the first character of this run of affixes and where the run starts so
            // reads can jump directly to it.
            first_chars.push(ch);
            run_starts.push(run_start);

            match table[run_start..].iter().position(|affix| {
                affix
                    .appending()
                    .next()
                    .expect("the table is sorted so empty keys come before the partition point")
                    > ch
            }) {
                Some(run_len) => run_start += run_len,
                None => break,
            }
        }
        // One extra element so that every run has an end: `run_starts` is always one longer
        // than `first_chars`.
        run_starts.push(table.len());

        Self {
            table,
            first_chars,
            run_starts,
        }
    }
}

impl<C: AffixKind> AffixIndex<C> {
    pub fn affixes_of<'index, 'word>(
        &'index self,
        word: &'word str,
    ) -> AffixesIter<'index, 'word, C> {
        AffixesIter {
            table: &self.table,
            first_chars: &self.first_chars,
            run_starts: &self.run_starts,
            chars: C::chars(word),
            chars_matched: 0,
        }
    }

    pub fn iter(&self) -> core::slice::Iter<'_, Affix<C>> {
        self.table.iter()
    }
}

/// An iterator over the affixes in an `AffixIndex` that might apply to a given word.
pub(crate) struct AffixesIter<'index, 'word, C: AffixKind + 'word> {
    table: &'index [Affix<C>],
    first_chars: &'index [char],
    run_starts: &'index [usize],
    chars: C::Chars<'word>,
    chars_matched: usize,
}

impl<'index, 'word, C: AffixKind> Iterator for AffixesIter<'index, 'word, C> {
    type Item = &'index Affix<C>;

    fn next(&mut self) -> Option<Self::Item> {
        // Affixes that append nothing match any word. They sort first, so emit them first.
        if self.chars_matched == 0 {
            if self.table.is_empty() {
                return None;
            }

            let item = &self.table[0];
            if item.appending().next().is_some() {
                // The empty portion of the table is done. Jump ahead to the run sharing the
                // word's first character.
                let ch = self.chars.next()?;
                let run = self.first_chars.iter().position(|c| *c == ch)?;

                // NOTE: `run_starts` always has at least one element and is always one element
                // longer than `first_chars`, so indexing at `0` and at `run + 1` is in bounds.
                let empty_offset = self.run_starts[0];
                let start = self.run_starts[run] - empty_offset;
                let end = self.run_starts[run + 1] - empty_offset;
                self.table = &self.table[start..end];
                self.chars_matched = 1;
            } else {
                self.table = &self.table[1..];
                return Some(item);
            }
        }

        loop {
            if self.table.is_empty() {
                return None;
            }

            // If the search key is exactly matched so far (up to the number of characters
            // we've seen), emit the item.
            let item = &self.table[0];
            if item.appending().count() == self.chars_matched {
                self.table = &self.table[1..];
                return Some(item);
            }

            // Narrow the table to the slice where the affixes' next key character matches the
            // word's next character.
            let ch = self.chars.next()?;

            let start = self
                .table
                .iter()
                .position(|affix| affix.appending().nth(self.chars_matched) == Some(ch))?;
            self.table = &self.table[start..];

            let end = self
                .table
                .partition_point(|affix| affix.appending().nth(self.chars_matched) == Some(ch));
            self.table = &self.table[..end];

            self.chars_matched += 1;
        }
    }
}

/// A collection of patterns used to break words into smaller words.
///
/// Internally a single `table` partitioned into three sections: patterns that apply at the
/// beginning of words, patterns that can apply anywhere in the middle, and patterns that must
/// apply at the end.
#[derive(Debug)]
pub(crate) struct BreakTable {
    table: Box<[Box<str>]>,
    start_breaks_end: usize,
    middle_breaks_end: usize,
}

impl Default for BreakTable {
    fn default() -> Self {
        Self::new(&["^-", "-", "-$"])
    }
}

impl BreakTable {
    pub fn new(breaks: &[&str]) -> Self {
        let mut start = Vec::new();
        let mut middle = Vec::new();
        let mut end = Vec::new();

        for &b in breaks.iter() {
            // Break patterns are parsed in a way that ensures they are non-empty.
            debug_assert!(!b.is_empty());

            if let Some(b) = b.strip_prefix('^') {
                start.push(b.into());
            } else if let Some(b) = b.strip_suffix('$') {
                end.push(b.into());
            } else {
                middle.push(b.into());
            }
        }

        let mut table = start;
        let start_breaks_end = table.len();
        table.append(&mut middle);
        let middle_breaks_end = table.len();
        table.append(&mut end);

        Self {
            table: table.into_boxed_slice(),
            start_breaks_end,
            middle_breaks_end,
        }
    }

    #[inline]
    pub fn start_word_breaks(&self) -> impl Iterator<Item = &str> {
        self.table[..self.start_breaks_end].iter().map(AsRef::as_ref)
    }

    #[inline]
    pub fn middle_word_breaks(&self) -> impl Iterator<Item = &str> {
        self.table[self.start_breaks_end..self.middle_breaks_end]
            .iter()
            .map(AsRef::as_ref)
    }

    #[inline]
    pub fn end_word_breaks(&self) -> impl Iterator<Item = &str> {
        self.table[self.middle_breaks_end..].iter().map(AsRef::as_ref)
    }
}

/// The `REP` table: pairs of common misspelling patterns and their corrections.
///
/// A dictionary uses `REP` to list typical faults, often same-sounding word parts. For example
/// en_US has `REP shun tion`. Patterns can be anchored: `^pat` applies at the beginning of the
/// word, `pat$` at the end, `^pat$` only to the whole word. The table is kept partitioned by
/// anchoring so the suggester can walk only the relevant section. An underscore in the
/// correction stands for a space.
#[derive(Debug, Default)]
pub(crate) struct ReplacementTable {
    table: Vec<(Box<str>, Box<str>)>,
    whole_word_end: usize,
    start_word_end: usize,
    end_word_end: usize,
}

impl ReplacementTable {
    pub fn new(pairs: &[(&str, &str)]) -> Self {
        let mut whole = Vec::new();
        let mut start = Vec::new();
        let mut end = Vec::new();
        let mut anywhere = Vec::new();

        for (from, to) in pairs.iter() {
            let to: Box<str> = to.replace('_', " ").into();
            if let Some(from) = from.strip_prefix('^') {
                match from.strip_suffix('$') {
                    Some(from) if !from.is_empty() => whole.push((from.into(), to)),
                    None if !from.is_empty() => start.push((from.into(), to)),
                    _ => (),
                }
            } else if let Some(from) = from.strip_suffix('$') {
                if !from.is_empty() {
                    end.push((from.into(), to));
                }
            } else if !from.is_empty() {
                anywhere.push((from.to_string().into(), to));
            }
        }

        let mut table = whole;
        let whole_word_end = table.len();
        table.append(&mut start);
        let start_word_end = table.len();
        table.append(&mut end);
        let end_word_end = table.len();
        table.append(&mut anywhere);

        Self {
            table,
            whole_word_end,
            start_word_end,
            end_word_end,
        }
    }

    pub fn whole_word_replacements(&self) -> impl Iterator<Item = (&str, &str)> {
        self.table[..self.whole_word_end]
            .iter()
            .map(|(from, to)| (from.as_ref(), to.as_ref()))
    }

    pub fn start_word_replacements(&self) -> impl Iterator<Item = (&str, &str)> {
        self.table[self.whole_word_end..self.start_word_end]
            .iter()
            .map(|(from, to)| (from.as_ref(), to.as_ref()))
    }

    pub fn end_word_replacements(&self) -> impl Iterator<Item = (&str, &str)> {
        self.table[self.start_word_end..self.end_word_end]
            .iter()
            .map(|(from, to)| (from.as_ref(), to.as_ref()))
    }

    pub fn any_place_replacements(&self) -> impl Iterator<Item = (&str, &str)> {
        self.table[self.end_word_end..]
            .iter()
            .map(|(from, to)| (from.as_ref(), to.as_ref()))
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
}

/// The `MAP` table: classes of characters (or character sequences) which sound or look alike,
/// such as `aáà` or `(ss)(ß)`.
#[derive(Debug, Default)]
pub(crate) struct SimilarityTable {
    groups: Box<[Box<[Box<str>]>]>,
}

impl From<Vec<Vec<String>>> for SimilarityTable {
    fn from(groups: Vec<Vec<String>>) -> Self {
        Self {
            groups: groups
                .into_iter()
                .map(|group| {
                    group
                        .into_iter()
                        .map(Into::into)
                        .collect::<Vec<Box<str>>>()
                        .into_boxed_slice()
                })
                .collect(),
        }
    }
}

impl SimilarityTable {
    pub fn groups(&self) -> impl Iterator<Item = &[Box<str>]> {
        self.groups.iter().map(AsRef::as_ref)
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

/// The conversion table used by ICONV and OCONV rules.
///
/// This is nothing more than a sequence of `(from, to)` replacement pairs. Not many
/// dictionaries use this rule. en_US and a few others use it to replace magic apostrophes "’"
/// with regular ones. Others like french have quite a few rules to normalize similar looking
/// unicode representations of letters.
#[derive(Debug, Default)]
pub(crate) struct ConversionTable {
    table: Box<[(Box<str>, Box<str>)]>,
}

impl From<Vec<(&str, &str)>> for ConversionTable {
    fn from(table: Vec<(&str, &str)>) -> Self {
        Self {
            table: table
                .into_iter()
                .map(|(from, to)| (from.into(), to.into()))
                .collect(),
        }
    }
}

impl ConversionTable {
    pub fn convert<'a>(&self, word: &'a str) -> Cow<'a, str> {
        // Conversion tables are typically very short (usually one entry, up to 49 in fr_FR) so
        // a scan over all patterns is fine.
        let mut converted = Cow::Borrowed(word);

        for (from, to) in self.table.iter() {
            if converted.contains(&**from) {
                converted = Cow::Owned(converted.replace(&**from, to));
            }
        }

        converted
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
}

/// One rule of the `PHONE` table.
///
/// The pattern grammar (inherited from aspell's phonetic tables): a literal run of characters,
/// an optional `(xy)` alternation matching one extra character, trailing `-`s marking matched
/// characters that are context only and are not consumed, `^`/`$` anchors, an optional priority
/// digit and `<` follow-up marker. Priorities and follow-up markers are accepted and ignored.
#[derive(Debug)]
struct PhoneticRule {
    letters: Box<str>,
    first: char,
    optional: Box<[char]>,
    lookahead: usize,
    start: bool,
    end: bool,
    replacement: Box<str>,
}

impl PhoneticRule {
    /// The number of characters consumed by this rule at `pos`, or `None` if it doesn't match.
    fn match_len(&self, word: &[char], pos: usize) -> Option<usize> {
        if self.start && pos != 0 {
            return None;
        }

        let mut len = 0;
        for pattern_ch in self.letters.chars() {
            if word.get(pos + len) != Some(&pattern_ch) {
                return None;
            }
            len += 1;
        }

        if !self.optional.is_empty() {
            let ch = word.get(pos + len)?;
            if !self.optional.contains(ch) {
                return None;
            }
            len += 1;
        }

        if self.end && pos + len != word.len() {
            return None;
        }

        // Context characters matched by a trailing `-` stay in the input for the next rule.
        Some(len.saturating_sub(self.lookahead).max(1))
    }
}

/// The `PHONE` table: rules rewriting a word into a rough phonetic form, so that suggestions
/// can be ranked by how a word sounds rather than how it is written.
#[derive(Debug, Default)]
pub(crate) struct PhoneticTable {
    rules: Vec<PhoneticRule>,
}

impl PhoneticTable {
    pub fn new(pairs: &[(&str, &str)]) -> Self {
        let mut rules = Vec::with_capacity(pairs.len());

        for (pattern, replacement) in pairs.iter() {
            let mut letters = String::new();
            let mut optional = Vec::new();
            let mut lookahead = 0;
            let mut start = false;
            let mut end = false;

            let mut chars = pattern.chars();
            while let Some(ch) = chars.next() {
                match ch {
                    '(' => {
                        for ch in chars.by_ref() {
                            if ch == ')' {
                                break;
                            }
                            optional.push(ch);
                        }
                    }
                    '-' => lookahead += 1,
                    '^' => start = true,
                    '$' => end = true,
                    '<' => (),
                    ch if ch.is_ascii_digit() => (),
                    ch => letters.push(ch),
                }
            }

            let first = match letters.chars().next() {
                Some(ch) => ch,
                // A rule with no literal part cannot be keyed; drop it.
                None => continue,
            };
            let replacement = match *replacement {
                "_" => "",
                other => other,
            };

            rules.push(PhoneticRule {
                letters: letters.into(),
                first,
                optional: optional.into(),
                lookahead,
                start,
                end,
                replacement: replacement.into(),
            });
        }

        Self { rules }
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Rewrites a word into its phonetic form.
    ///
    /// At each position the first matching rule wins and its replacement is emitted;
    /// characters matched by no rule are copied through. The input is uppercased first since
    /// `PHONE` rules are written in uppercase.
    pub fn transform(&self, word: &str) -> String {
        let word: Vec<char> = word.chars().flat_map(char::to_uppercase).collect();
        let mut out = String::with_capacity(word.len());
        let mut pos = 0;

        'next_position: while pos < word.len() {
            for rule in self.rules.iter() {
                if rule.first != word[pos] {
                    continue;
                }
                if let Some(consumed) = rule.match_len(&word, pos) {
                    out.push_str(&rule.replacement);
                    pos += consumed;
                    continue 'next_position;
                }
            }
            out.push(word[pos]);
            pos += 1;
        }

        out
    }
}

/// Individual elements of COMPOUNDRULE patterns.
///
/// Compound rules are a very small regex-like language for describing how stems might be
/// joined in a compound. Each element is a flag, optionally modified by a zero-or-one wildcard
/// (`?`) or a zero-or-more wildcard (`*`). Dictionaries typically use these to describe how to
/// compound numbers together, for example `n*1t` in en_US for ordinals like "10th".
#[derive(Debug, PartialEq, Eq)]
pub(crate) struct CompoundRuleElement {
    pub flag: Flag,
    pub modifier: Option<CompoundRuleModifier>,
}

#[derive(Debug, PartialEq, Eq)]
pub(crate) enum CompoundRuleModifier {
    ZeroOrOne,
    ZeroOrMore,
}

pub(crate) type CompoundRule = Box<[CompoundRuleElement]>;

fn compound_rule_matches(pattern: &[CompoundRuleElement], data: &[&FlagSet]) -> bool {
    use CompoundRuleModifier::*;

    // Backtracking over the wildcard interpretations with an explicit stack of
    // (pattern position, data position) states.
    let mut stack = vec![(0usize, 0usize)];

    while let Some((pattern_idx, data_idx)) = stack.pop() {
        if pattern_idx == pattern.len() {
            if data_idx == data.len() {
                return true;
            }
            continue;
        }

        let flag_matches = match data.get(data_idx) {
            Some(flagset) => flagset.contains(&pattern[pattern_idx].flag),
            None => false,
        };
        match pattern[pattern_idx].modifier {
            Some(ZeroOrOne) => {
                // The element may match zero times.
                stack.push((pattern_idx + 1, data_idx));
                if flag_matches {
                    // Or once: consume both the element and the data.
                    stack.push((pattern_idx + 1, data_idx + 1));
                }
            }
            Some(ZeroOrMore) => {
                // The element may match zero times.
                stack.push((pattern_idx + 1, data_idx));
                if flag_matches {
                    // Or again: consume the data but keep the element.
                    stack.push((pattern_idx, data_idx + 1));
                }
            }
            None => {
                if flag_matches {
                    stack.push((pattern_idx + 1, data_idx + 1));
                }
            }
        }
    }

    false
}

/// The COMPOUNDRULE table: patterns deciding whether a sequence of stems forms a valid
/// compound.
#[derive(Debug, Default)]
pub(crate) struct CompoundRuleTable {
    rules: Box<[CompoundRule]>,
    all_flags: FlagSet,
}

impl From<Vec<CompoundRule>> for CompoundRuleTable {
    fn from(rules: Vec<CompoundRule>) -> Self {
        let all_flags: Vec<_> = rules
            .iter()
            .flat_map(|rule| rule.iter().map(|element| element.flag))
            .collect();

        Self {
            rules: rules.into_boxed_slice(),
            all_flags: all_flags.into(),
        }
    }
}

impl CompoundRuleTable {
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Checks whether the given flagset has any flags in common with flags used in any
    /// compound rule. Entries with no rule flags can't participate in rule compounds at all,
    /// which makes this a cheap pre-filter.
    #[inline]
    pub fn has_any_flags(&self, flagset: &FlagSet) -> bool {
        self.all_flags.has_intersection(flagset)
    }

    /// Checks whether any rule matches the flagsets of a proposed split of a compound, one
    /// flagset per part.
    pub fn any_rule_matches(&self, flagsets: &[&FlagSet]) -> bool {
        self.rules
            .iter()
            .any(|rule| compound_rule_matches(rule, flagsets))
    }
}

/// Data parsed from a `.aff` file, minus the word list.
#[derive(Debug)]
pub(crate) struct AffData {
    pub prefixes: PrefixIndex,
    pub suffixes: SuffixIndex,
    pub replacements: ReplacementTable,
    pub similarities: SimilarityTable,
    pub break_table: BreakTable,
    pub compound_rules: CompoundRuleTable,
    pub input_conversions: ConversionTable,
    pub output_conversions: ConversionTable,
    pub phonetic_table: PhoneticTable,
    pub ignore_chars: String,
    pub keyboard_closeness: String,
    pub try_chars: String,
    pub options: AffOptions,
}

impl AffData {
    /// Whether the word falls under the german sharp-s special case: with `CHECKSHARPS` set,
    /// words containing 'ß' keep their casing as written.
    pub fn is_sharps(&self, word: &str) -> bool {
        self.options.checksharps && word.contains('ß')
    }
}

#[derive(Debug)]
pub(crate) struct AffOptions {
    pub checksharps: bool,
    pub forbid_warn: bool,
    pub fullstrip: bool,
    pub forbidden_word_flag: Option<Flag>,
    pub no_suggest_flag: Option<Flag>,
    pub only_in_compound_flag: Option<Flag>,
    pub keep_case_flag: Option<Flag>,
    pub need_affix_flag: Option<Flag>,
    pub circumfix_flag: Option<Flag>,
    pub warn_flag: Option<Flag>,
    // compounding options
    pub compound_flag: Option<Flag>,
    pub compound_begin_flag: Option<Flag>,
    pub compound_middle_flag: Option<Flag>,
    pub compound_last_flag: Option<Flag>,
    pub compound_force_uppercase_flag: Option<Flag>,
    // These `Option<NonZeroU16>`s represent counts and a zero value isn't accepted. Being the
    // same as a flag's representation is coincidence.
    pub compound_min_length: Option<NonZeroU16>,
    pub compound_max_word_count: Option<NonZeroU16>,
    // suggestion options
    pub max_compound_suggestions: u16,
    pub max_ngram_suggestions: u16,
    pub max_diff_factor: u16,
    pub only_max_diff: bool,
    pub no_split_suggestions: bool,
}

impl Default for AffOptions {
    fn default() -> Self {
        Self {
            checksharps: Default::default(),
            forbid_warn: Default::default(),
            fullstrip: Default::default(),
            forbidden_word_flag: Default::default(),
            no_suggest_flag: Default::default(),
            only_in_compound_flag: Default::default(),
            keep_case_flag: Default::default(),
            need_affix_flag: Default::default(),
            circumfix_flag: Default::default(),
            warn_flag: Default::default(),
            compound_flag: Default::default(),
            compound_begin_flag: Default::default(),
            compound_middle_flag: Default::default(),
            compound_last_flag: Default::default(),
            compound_force_uppercase_flag: Default::default(),
            compound_min_length: Default::default(),
            compound_max_word_count: Default::default(),
            max_compound_suggestions: 3,
            max_ngram_suggestions: 4,
            max_diff_factor: 5,
            only_max_diff: Default::default(),
            no_split_suggestions: Default::default(),
        }
    }
}

#[cfg(test)]
mod test {
    use crate::macros::{flag, flagset};

    use super::*;

    #[test]
    fn condition_matches() {
        // No special characters
        assert!("foo".parse::<Condition>().unwrap().matches("foo"));
        // The pattern may be shorter than the input
        assert!("foo".parse::<Condition>().unwrap().matches("food"));
        // But not longer
        assert!(!"foo".parse::<Condition>().unwrap().matches("fo"));

        // Wildcards
        assert!("f..".parse::<Condition>().unwrap().matches("foo"));

        // Positive character class
        let condition = "xx[abc]x".parse::<Condition>().unwrap();
        assert!(condition.matches("xxax"));
        assert!(condition.matches("xxbx"));
        assert!(condition.matches("xxcx"));
        assert!(!condition.matches("xxdx"));

        // Negative character class
        let condition = "xx[^abc]x".parse::<Condition>().unwrap();
        assert!(!condition.matches("xxax"));
        assert!(!condition.matches("xxbx"));
        assert!(!condition.matches("xxcx"));
        assert!(condition.matches("xxdx"));
    }

    #[test]
    fn prefix_suffix_stemming() {
        let prefix = Prefix::new(flag!('F'), false, Some("qw"), "Qwe", None, flagset![]).unwrap();
        assert_eq!(prefix.to_derived("qwrty").as_str(), "Qwerty");
        assert_eq!(prefix.to_stem("Qwerty").as_ref(), "qwrty");

        let suffix = Suffix::new(flag!('F'), false, Some("ie"), "ying", None, flagset![]).unwrap();
        assert_eq!(suffix.to_derived("pie").as_str(), "pying");
        assert_eq!(suffix.to_stem("pying").as_ref(), "pie");
    }

    #[test]
    fn empty_affix_index() {
        let index: PrefixIndex = [].into_iter().collect();
        assert!(index.affixes_of("anything").next().is_none());

        let index: SuffixIndex = [].into_iter().collect();
        assert!(index.affixes_of("anything").next().is_none());
    }

    #[test]
    fn affix_index_prefix_multiset() {
        fn prefix(add: &str) -> Prefix {
            Prefix::new(flag!(1), true, None, add, None, flagset![]).unwrap()
        }

        let index: PrefixIndex = [
            "", "a", "", "ab", "abx", "as", "asdf", "axx", "as", "bqwe", "ba", "rqwe",
        ]
        .into_iter()
        .map(prefix)
        .collect();

        let prefixes: Vec<_> = index
            .affixes_of("asdfg")
            .map(|prefix| prefix.add.as_str())
            .collect();

        assert_eq!(&["", "", "a", "as", "as", "asdf"], prefixes.as_slice());
    }

    #[test]
    fn affix_index_suffix_multiset() {
        fn suffix(add: &str) -> Suffix {
            Suffix::new(flag!(1), true, None, add, None, flagset![]).unwrap()
        }

        let index: SuffixIndex = [
            "", "", "a", "b", "b", "ab", "ub", "zb", "aub", "uub", "xub", "huub",
        ]
        .into_iter()
        .map(suffix)
        .collect();

        let suffixes: Vec<_> = index
            .affixes_of("ahahuub")
            .map(|suffix| suffix.add.as_str())
            .collect();

        assert_eq!(&["", "", "b", "b", "ub", "uub", "huub"], suffixes.as_slice());
    }

    #[test]
    fn break_table_partitions() {
        let table = BreakTable::new(&[
            "bsd", "zxc", "asd", "^bar", "^zoo", "^abc", "car$", "yoyo$", "air$",
        ]);

        let mut starts: Vec<_> = table.start_word_breaks().collect();
        starts.sort_unstable();
        assert_eq!(&["abc", "bar", "zoo"], starts.as_slice());

        let mut middles: Vec<_> = table.middle_word_breaks().collect();
        middles.sort_unstable();
        assert_eq!(&["asd", "bsd", "zxc"], middles.as_slice());

        let mut ends: Vec<_> = table.end_word_breaks().collect();
        ends.sort_unstable();
        assert_eq!(&["air", "car", "yoyo"], ends.as_slice());
    }

    #[test]
    fn replacement_table_partitions() {
        let table = ReplacementTable::new(&[
            ("^alot$", "a_lot"),
            ("^foo", "bar"),
            ("ie", "ei"),
            ("shun$", "tion"),
        ]);

        let whole: Vec<_> = table.whole_word_replacements().collect();
        assert_eq!(whole, [("alot", "a lot")]);
        let start: Vec<_> = table.start_word_replacements().collect();
        assert_eq!(start, [("foo", "bar")]);
        let end: Vec<_> = table.end_word_replacements().collect();
        assert_eq!(end, [("shun", "tion")]);
        let any: Vec<_> = table.any_place_replacements().collect();
        assert_eq!(any, [("ie", "ei")]);
    }

    #[test]
    fn conversion_table_convert() {
        let table: ConversionTable = vec![("’", "'"), ("ff", "f")].into();
        assert_eq!(table.convert("they’re"), "they're");
        assert_eq!(table.convert("effflux"), "eflux");
        assert!(matches!(table.convert("plain"), Cow::Borrowed("plain")));
    }

    #[test]
    fn phonetic_transform() {
        let table = PhoneticTable::new(&[
            ("PH", "F"),
            ("GH$", "F"),
            ("Z", "S"),
            ("DG(EIY)-", "J"),
        ]);

        assert_eq!(table.transform("phase"), "FASE");
        assert_eq!(table.transform("tough"), "TOUF");
        // "GH" not at the end does not match the anchored rule.
        assert_eq!(table.transform("ghost"), "GHOST");
        assert_eq!(table.transform("zebra"), "SEBRA");
        // "DG" followed by "e" rewrites to "J" and keeps the "E" for the next position.
        assert_eq!(table.transform("edge"), "EJE");
    }

    fn rule_matches(rule_text: &str, parts: &str) -> bool {
        let rule = parser::parse_compound_rule(rule_text, FlagType::default()).unwrap();
        let flagsets: Vec<_> = parts.chars().map(|ch| flagset![ch]).collect();
        let borrowed: Vec<_> = flagsets.iter().collect();
        compound_rule_matches(&rule, &borrowed)
    }

    #[test]
    fn compound_rule_matches_literal() {
        assert!(rule_matches("abc", "abc"));

        assert!(!rule_matches("abc", "ac"));
        assert!(!rule_matches("abc", "abcd"));
    }

    #[test]
    fn compound_rule_matches_zero_or_one() {
        assert!(rule_matches("ab?c", "ac"));
        assert!(rule_matches("ab?c", "abc"));

        assert!(!rule_matches("ab?c", "ab"));
        assert!(!rule_matches("ab?c", "bc"));
        assert!(!rule_matches("ab?c", "abbc"));
    }

    #[test]
    fn compound_rule_matches_zero_or_more() {
        assert!(rule_matches("ab*c", "ac"));
        assert!(rule_matches("ab*c", "abc"));
        assert!(rule_matches("ab*c", "abbc"));
        assert!(rule_matches("ab*c", "abbbc"));

        assert!(!rule_matches("ab*c", "ab"));
        assert!(!rule_matches("ab*c", "abbcc"));
    }

    #[test]
    fn compound_rule_simple_regex() {
        // Upstream: <https://github.com/nuspell/nuspell/blob/349e0d6bc68b776af035ca3ff664a7fc55d69387/tests/unit_test.cxx#L384-L393>
        assert!(rule_matches("abc?de*ff", "abdff"));
        assert!(rule_matches("abc?de*ff", "abcdff"));
        assert!(rule_matches("abc?de*ff", "abdeeff"));
        assert!(rule_matches("abc?de*ff", "abcdeff"));

        assert!(!rule_matches("abc?de*ff", "abcdeeeefff"));
        assert!(!rule_matches("abc?de*ff", "qwerty"));
    }
}
