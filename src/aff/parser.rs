//! The parser for `.aff` and `.dic` files.
//!
//! The overall shape: a table of line-keyword parser functions is folded over the lines of the
//! `.aff` file, collecting into a scratch-pad structure (`AffLineParser`). Types like
//! `AffixIndex` are cheapest to build all-at-once from their full contents, so the scratch-pad
//! holds plain `Vec`s until everything is read. The `.dic` file is handled ad-hoc afterwards.

use core::{
    fmt,
    hash::BuildHasher,
    iter::{Enumerate, Peekable, TakeWhile},
    num::NonZeroU16,
    str::{Chars, FromStr, SplitWhitespace},
};

use hashbrown::HashMap;

use crate::{word_list::WordList, Flag, FlagSet};

use super::{
    AffData, AffOptions, BreakTable, CompoundRule, CompoundRuleElement, CompoundRuleModifier,
    Condition, ConversionTable, FlagType, PhoneticTable, Prefix, ReplacementTable,
    SimilarityTable, Suffix,
};

type Result<T> = core::result::Result<T, ParseDictionaryError>;
type ParseResult = Result<()>;

#[derive(Debug, Default)]
struct AffLineParser<'aff> {
    options: AffOptions,
    // options only used for parsing:
    flag_type: FlagType,
    flag_aliases: Vec<FlagSet>,
    replacements: Vec<(&'aff str, &'aff str)>,
    similarities: Vec<Vec<String>>,
    input_conversions: Vec<(&'aff str, &'aff str)>,
    output_conversions: Vec<(&'aff str, &'aff str)>,
    phonetic_rules: Vec<(&'aff str, &'aff str)>,
    break_patterns: Option<Vec<&'aff str>>,
    ignore_chars: &'aff str,
    try_chars: &'aff str,
    keyboard_closeness: &'aff str,
    prefixes: Vec<Prefix>,
    suffixes: Vec<Suffix>,
    compound_rules: Vec<CompoundRule>,
}

type Parser = for<'aff> fn(&mut AffLineParser<'aff>, &mut Lines<'aff>) -> ParseResult;

// These parsers are only used for the `.aff` file's contents. The `.dic` file is handled
// ad-hoc.
const AFF_PARSERS: [(&str, Parser); 36] = [
    ("FLAG", parse_flag_type),
    // Flags
    ("FORBIDDENWORD", parse_forbidden_word_flag),
    ("NOSUGGEST", parse_no_suggest_flag),
    ("ONLYINCOMPOUND", parse_only_in_compound_flag),
    ("KEEPCASE", parse_keep_case_flag),
    ("NEEDAFFIX", parse_need_affix_flag),
    ("CIRCUMFIX", parse_circumfix_flag),
    ("WARN", parse_warn_flag),
    ("COMPOUNDFLAG", parse_compound_flag),
    ("COMPOUNDBEGIN", parse_compound_begin_flag),
    ("COMPOUNDMIDDLE", parse_compound_middle_flag),
    ("COMPOUNDLAST", parse_compound_last_flag),
    ("FORCEUCASE", parse_compound_force_uppercase_flag),
    // Bools
    ("CHECKSHARPS", parse_checksharps),
    ("FORBIDWARN", parse_forbid_warn),
    ("FULLSTRIP", parse_fullstrip),
    ("ONLYMAXDIFF", parse_only_max_diff),
    ("NOSPLITSUGS", parse_no_split_suggestions),
    // Numbers
    ("COMPOUNDMIN", parse_compound_min_length),
    ("COMPOUNDWORDMAX", parse_compound_max_word_count),
    ("MAXCPDSUGS", parse_max_compound_suggestions),
    ("MAXNGRAMSUGS", parse_max_ngram_suggestions),
    ("MAXDIFF", parse_max_diff_factor),
    // Strings
    ("IGNORE", parse_ignore_chars),
    ("KEY", parse_keyboard_closeness),
    ("TRY", parse_try_chars),
    // Tables
    ("REP", parse_replacements),
    ("MAP", parse_similarities),
    ("ICONV", parse_input_conversions),
    ("OCONV", parse_output_conversions),
    ("PHONE", parse_phonetic_rules),
    ("BREAK", parse_break_patterns),
    ("AF", parse_flag_aliases),
    ("PFX", parse_prefix_table),
    ("SFX", parse_suffix_table),
    ("COMPOUNDRULE", parse_compound_rule_table),
];

pub(crate) fn parse<S: BuildHasher + Clone>(
    aff_text: &str,
    dic_text: &str,
    build_hasher: S,
) -> Result<(WordList<S>, AffData)> {
    // First parse the aff file.
    let aff_text = aff_text.strip_prefix('\u{feff}').unwrap_or(aff_text);
    let mut lines = Lines::new(aff_text, ParseDictionaryErrorSource::Aff);
    let mut aff_parsers =
        HashMap::with_capacity_and_hasher(AFF_PARSERS.len(), build_hasher.clone());
    aff_parsers.extend(AFF_PARSERS);
    let mut cx = AffLineParser::default();

    while !lines.is_finished() {
        if let Some(parser) = lines.next_word().and_then(|key| aff_parsers.get(key)) {
            (parser)(&mut cx, &mut lines)?;
        }

        lines.advance_line();
    }

    // Then parse the dic file into a WordList.
    let dic_text = dic_text.strip_prefix('\u{feff}').unwrap_or(dic_text);
    let mut lines = Lines::new(dic_text, ParseDictionaryErrorSource::Dic);
    if lines.is_finished() {
        return Err(lines.error(ParseDictionaryErrorKind::Empty));
    }
    let row_count = lines
        .take_exactly_one_word()?
        .parse::<usize>()
        .map_err(|err| lines.error(ParseDictionaryErrorKind::MalformedNumber(err)))?;
    let mut words = WordList::with_capacity_and_hasher(row_count, build_hasher);

    for row in 1..=row_count {
        lines.advance_line();
        if lines.is_finished() {
            return Err(lines.error(ParseDictionaryErrorKind::MismatchedRowCount {
                expected: row_count,
                actual: row,
            }));
        }

        // NOTE: morphological fields after the first word are ignored.
        let word = match lines.next_word() {
            Some(word) => word,
            // Empty lines are skipped.
            None => continue,
        };
        let (stem, flagset) = parse_dic_line(word, cx.flag_type, &cx.flag_aliases, cx.ignore_chars)
            .map_err(|err| lines.error(ParseDictionaryErrorKind::MalformedFlag(err)))?;
        words.insert(stem.into(), flagset);
    }

    // Collect everything into AffData.
    let aff = AffData {
        prefixes: cx.prefixes.into(),
        suffixes: cx.suffixes.into(),
        replacements: ReplacementTable::new(&cx.replacements),
        similarities: cx.similarities.into(),
        break_table: match cx.break_patterns {
            Some(patterns) => BreakTable::new(&patterns),
            None => BreakTable::default(),
        },
        compound_rules: cx.compound_rules.into(),
        input_conversions: cx.input_conversions.into(),
        output_conversions: cx.output_conversions.into(),
        phonetic_table: PhoneticTable::new(&cx.phonetic_rules),
        ignore_chars: cx.ignore_chars.to_string(),
        keyboard_closeness: cx.keyboard_closeness.to_string(),
        try_chars: cx.try_chars.to_string(),
        options: cx.options,
    };

    Ok((words, aff))
}

fn parse_flag_type(cx: &mut AffLineParser, lines: &mut Lines) -> ParseResult {
    let word = lines.take_exactly_one_word()?;

    word.parse::<FlagType>()
        .map(|flag_type| cx.flag_type = flag_type)
        .map_err(|err| lines.error(ParseDictionaryErrorKind::UnknownFlagType(err)))
}

fn parse_forbidden_word_flag(cx: &mut AffLineParser, lines: &mut Lines) -> ParseResult {
    lines
        .parse_flag(cx)
        .map(|flag| cx.options.forbidden_word_flag = Some(flag))
}

fn parse_no_suggest_flag(cx: &mut AffLineParser, lines: &mut Lines) -> ParseResult {
    lines
        .parse_flag(cx)
        .map(|flag| cx.options.no_suggest_flag = Some(flag))
}

fn parse_only_in_compound_flag(cx: &mut AffLineParser, lines: &mut Lines) -> ParseResult {
    lines
        .parse_flag(cx)
        .map(|flag| cx.options.only_in_compound_flag = Some(flag))
}

fn parse_keep_case_flag(cx: &mut AffLineParser, lines: &mut Lines) -> ParseResult {
    lines
        .parse_flag(cx)
        .map(|flag| cx.options.keep_case_flag = Some(flag))
}

fn parse_need_affix_flag(cx: &mut AffLineParser, lines: &mut Lines) -> ParseResult {
    lines
        .parse_flag(cx)
        .map(|flag| cx.options.need_affix_flag = Some(flag))
}

fn parse_circumfix_flag(cx: &mut AffLineParser, lines: &mut Lines) -> ParseResult {
    lines
        .parse_flag(cx)
        .map(|flag| cx.options.circumfix_flag = Some(flag))
}

fn parse_warn_flag(cx: &mut AffLineParser, lines: &mut Lines) -> ParseResult {
    lines
        .parse_flag(cx)
        .map(|flag| cx.options.warn_flag = Some(flag))
}

fn parse_compound_flag(cx: &mut AffLineParser, lines: &mut Lines) -> ParseResult {
    lines
        .parse_flag(cx)
        .map(|flag| cx.options.compound_flag = Some(flag))
}

fn parse_compound_begin_flag(cx: &mut AffLineParser, lines: &mut Lines) -> ParseResult {
    lines
        .parse_flag(cx)
        .map(|flag| cx.options.compound_begin_flag = Some(flag))
}

fn parse_compound_middle_flag(cx: &mut AffLineParser, lines: &mut Lines) -> ParseResult {
    lines
        .parse_flag(cx)
        .map(|flag| cx.options.compound_middle_flag = Some(flag))
}

fn parse_compound_last_flag(cx: &mut AffLineParser, lines: &mut Lines) -> ParseResult {
    lines
        .parse_flag(cx)
        .map(|flag| cx.options.compound_last_flag = Some(flag))
}

fn parse_compound_force_uppercase_flag(cx: &mut AffLineParser, lines: &mut Lines) -> ParseResult {
    lines
        .parse_flag(cx)
        .map(|flag| cx.options.compound_force_uppercase_flag = Some(flag))
}

fn parse_checksharps(cx: &mut AffLineParser, lines: &mut Lines) -> ParseResult {
    lines.parse_bool().map(|b| cx.options.checksharps = b)
}

fn parse_forbid_warn(cx: &mut AffLineParser, lines: &mut Lines) -> ParseResult {
    lines.parse_bool().map(|b| cx.options.forbid_warn = b)
}

fn parse_fullstrip(cx: &mut AffLineParser, lines: &mut Lines) -> ParseResult {
    lines.parse_bool().map(|b| cx.options.fullstrip = b)
}

fn parse_only_max_diff(cx: &mut AffLineParser, lines: &mut Lines) -> ParseResult {
    lines.parse_bool().map(|b| cx.options.only_max_diff = b)
}

fn parse_no_split_suggestions(cx: &mut AffLineParser, lines: &mut Lines) -> ParseResult {
    lines
        .parse_bool()
        .map(|b| cx.options.no_split_suggestions = b)
}

fn parse_compound_min_length(cx: &mut AffLineParser, lines: &mut Lines) -> ParseResult {
    lines
        .parse_short()
        .map(|s| cx.options.compound_min_length = NonZeroU16::new(s))
}

fn parse_compound_max_word_count(cx: &mut AffLineParser, lines: &mut Lines) -> ParseResult {
    lines
        .parse_short()
        .map(|s| cx.options.compound_max_word_count = NonZeroU16::new(s))
}

fn parse_max_compound_suggestions(cx: &mut AffLineParser, lines: &mut Lines) -> ParseResult {
    lines
        .parse_short()
        .map(|s| cx.options.max_compound_suggestions = s)
}

fn parse_max_ngram_suggestions(cx: &mut AffLineParser, lines: &mut Lines) -> ParseResult {
    lines
        .parse_short()
        .map(|s| cx.options.max_ngram_suggestions = s)
}

fn parse_max_diff_factor(cx: &mut AffLineParser, lines: &mut Lines) -> ParseResult {
    let s = lines.parse_short()?;
    cx.options.max_diff_factor = if s > 10 { 5 } else { s };
    Ok(())
}

fn parse_ignore_chars<'a>(cx: &mut AffLineParser<'a>, lines: &mut Lines<'a>) -> ParseResult {
    lines
        .take_exactly_one_word()
        .map(|word| cx.ignore_chars = word)
}

fn parse_keyboard_closeness<'a>(cx: &mut AffLineParser<'a>, lines: &mut Lines<'a>) -> ParseResult {
    lines
        .take_exactly_one_word()
        .map(|word| cx.keyboard_closeness = word)
}

fn parse_try_chars<'a>(cx: &mut AffLineParser<'a>, lines: &mut Lines<'a>) -> ParseResult {
    lines
        .take_exactly_one_word()
        .map(|word| cx.try_chars = word)
}

fn parse_replacements<'aff>(cx: &mut AffLineParser<'aff>, lines: &mut Lines<'aff>) -> ParseResult {
    lines.parse_table2("REP", |from, to| {
        cx.replacements.push((from, to));
        Ok(())
    })
}

fn parse_similarities<'aff>(cx: &mut AffLineParser<'aff>, lines: &mut Lines<'aff>) -> ParseResult {
    lines.parse_table1("MAP", |group| {
        let mut entries = Vec::new();
        let mut chars = group.chars();
        while let Some(ch) = chars.next() {
            if ch == '(' {
                let mut entry = String::new();
                for ch in chars.by_ref() {
                    if ch == ')' {
                        break;
                    }
                    entry.push(ch);
                }
                if !entry.is_empty() {
                    entries.push(entry);
                }
            } else {
                entries.push(ch.to_string());
            }
        }
        cx.similarities.push(entries);
        Ok(())
    })
}

fn parse_input_conversions<'aff>(
    cx: &mut AffLineParser<'aff>,
    lines: &mut Lines<'aff>,
) -> ParseResult {
    lines.parse_table2("ICONV", |from, to| {
        cx.input_conversions.push((from, to));
        Ok(())
    })
}

fn parse_output_conversions<'aff>(
    cx: &mut AffLineParser<'aff>,
    lines: &mut Lines<'aff>,
) -> ParseResult {
    lines.parse_table2("OCONV", |from, to| {
        cx.output_conversions.push((from, to));
        Ok(())
    })
}

fn parse_phonetic_rules<'aff>(
    cx: &mut AffLineParser<'aff>,
    lines: &mut Lines<'aff>,
) -> ParseResult {
    lines.parse_table2("PHONE", |pattern, replacement| {
        cx.phonetic_rules.push((pattern, replacement));
        Ok(())
    })
}

fn parse_break_patterns<'aff>(
    cx: &mut AffLineParser<'aff>,
    lines: &mut Lines<'aff>,
) -> ParseResult {
    let patterns = cx.break_patterns.get_or_insert_with(Vec::new);
    lines.parse_table1("BREAK", |pattern| {
        patterns.push(pattern);
        Ok(())
    })
}

fn parse_flag_aliases(cx: &mut AffLineParser, lines: &mut Lines) -> ParseResult {
    let flag_type = cx.flag_type;
    let aliases = &mut cx.flag_aliases;
    lines.parse_table1("AF", |alias| {
        let flagset = parse_flags_from_chars(flag_type, alias.chars())?;
        aliases.push(flagset);
        Ok(())
    })
}

fn parse_prefix_table(cx: &mut AffLineParser, lines: &mut Lines) -> ParseResult {
    let flag_type = cx.flag_type;
    let aliases = core::mem::take(&mut cx.flag_aliases);
    let result = lines.parse_affix_table(
        "PFX",
        flag_type,
        |flag, crossproduct, strip, add, condition, flagset_str| {
            let flagset = decode_flagset(flagset_str, flag_type, &aliases)?;
            let prefix = Prefix::new(flag, crossproduct, strip, add, condition, flagset)?;
            cx.prefixes.push(prefix);
            Ok(())
        },
    );
    cx.flag_aliases = aliases;
    result
}

fn parse_suffix_table(cx: &mut AffLineParser, lines: &mut Lines) -> ParseResult {
    let flag_type = cx.flag_type;
    let aliases = core::mem::take(&mut cx.flag_aliases);
    let result = lines.parse_affix_table(
        "SFX",
        flag_type,
        |flag, crossproduct, strip, add, condition, flagset_str| {
            let flagset = decode_flagset(flagset_str, flag_type, &aliases)?;
            let suffix = Suffix::new(flag, crossproduct, strip, add, condition, flagset)?;
            cx.suffixes.push(suffix);
            Ok(())
        },
    );
    cx.flag_aliases = aliases;
    result
}

fn parse_compound_rule_table(cx: &mut AffLineParser, lines: &mut Lines) -> ParseResult {
    let flag_type = cx.flag_type;
    let rules = &mut cx.compound_rules;
    lines.parse_table1("COMPOUNDRULE", |word| {
        let rule = parse_compound_rule(word, flag_type)?;
        rules.push(rule);
        Ok(())
    })
}

/// A helper type that means "words on a line split by whitespace with comments dropped." This
/// is a concretion of `impl Iterator<Item = &'a str>`.
type Words<'text> = TakeWhile<SplitWhitespace<'text>, for<'b, 'c> fn(&'b &'c str) -> bool>;

fn line_words(line: &str) -> Words<'_> {
    line.split_whitespace()
        .take_while((|word| !word.starts_with('#')) as for<'b, 'c> fn(&'b &'c str) -> bool)
}

struct Lines<'text> {
    lines: Peekable<Enumerate<core::str::Lines<'text>>>,
    words: Option<Words<'text>>,
    source: ParseDictionaryErrorSource,
}

impl<'text> Lines<'text> {
    fn new(text: &'text str, source: ParseDictionaryErrorSource) -> Self {
        let mut lines = text.lines().enumerate().peekable();
        let words = lines.peek().map(|(_line_no, line)| line_words(line));

        Self {
            lines,
            words,
            source,
        }
    }

    fn is_finished(&mut self) -> bool {
        self.lines.peek().is_none()
    }

    fn advance_line(&mut self) {
        self.lines.next();
        self.words = self.lines.peek().map(|(_line_no, line)| line_words(line));
    }

    fn next_word(&mut self) -> Option<&'text str> {
        let mut words = self.words.take()?;
        let word = words.next()?;
        self.words = Some(words);
        Some(word)
    }

    /// Takes the remaining words on the line, erroring unless there are exactly `expected` of
    /// them (after any already consumed).
    fn take_exactly<const N: usize>(&mut self) -> Result<[&'text str; N]> {
        let mut words = match self.words.take() {
            Some(words) => words,
            None => {
                return Err(self.error(ParseDictionaryErrorKind::MismatchedArity {
                    expected: N,
                    actual: 0,
                }))
            }
        };

        let mut taken = [""; N];
        for (actual, slot) in taken.iter_mut().enumerate() {
            match words.next() {
                Some(word) => *slot = word,
                None => {
                    return Err(self.error(ParseDictionaryErrorKind::MismatchedArity {
                        expected: N,
                        actual,
                    }))
                }
            }
        }

        let remaining = words.count();
        if remaining > 0 {
            return Err(self.error(ParseDictionaryErrorKind::MismatchedArity {
                expected: N,
                actual: N + remaining,
            }));
        }

        Ok(taken)
    }

    fn take_exactly_one_word(&mut self) -> Result<&'text str> {
        self.take_exactly::<1>().map(|[word]| word)
    }

    fn parse_flag(&mut self, cx: &AffLineParser) -> Result<Flag> {
        let word = self.take_exactly_one_word()?;
        parse_flag_from_str(cx.flag_type, word)
            .map_err(|err| self.error(ParseDictionaryErrorKind::MalformedFlag(err)))
    }

    fn parse_bool(&mut self) -> Result<bool> {
        // Boolean options are specified by the bare keyword. For example a `CHECKSHARPS` line
        // means `checksharps` is true. Otherwise it's false.
        let count = self
            .words
            .take()
            .map(|words| words.count())
            .unwrap_or_default();
        if count > 0 {
            return Err(self.error(ParseDictionaryErrorKind::MismatchedArity {
                expected: 0,
                actual: count,
            }));
        }
        Ok(true)
    }

    fn parse_short(&mut self) -> Result<u16> {
        let word = self.take_exactly_one_word()?;
        word.parse::<u16>()
            .map_err(|err| self.error(ParseDictionaryErrorKind::MalformedNumber(err)))
    }

    /// Parses a table whose header line carries the row count and whose rows each carry one
    /// word, like `BREAK` or `MAP`.
    fn parse_table1<F>(&mut self, key: &str, mut f: F) -> ParseResult
    where
        F: FnMut(&'text str) -> core::result::Result<(), ParseDictionaryErrorKind>,
    {
        let row_count = self
            .take_exactly_one_word()?
            .parse::<usize>()
            .map_err(|err| self.error(ParseDictionaryErrorKind::MalformedNumber(err)))?;

        for row in 1..=row_count {
            self.advance_line();
            if self.is_finished() || self.next_word() != Some(key) {
                return Err(self.error(ParseDictionaryErrorKind::MismatchedRowCount {
                    expected: row_count,
                    actual: row,
                }));
            }

            let [word] = self.take_exactly::<1>()?;
            f(word).map_err(|kind| self.error(kind))?;
        }

        Ok(())
    }

    /// Like [`parse_table1`](Self::parse_table1) but each row carries two words, like `REP` or
    /// `OCONV`.
    fn parse_table2<F>(&mut self, key: &str, mut f: F) -> ParseResult
    where
        F: FnMut(&'text str, &'text str) -> core::result::Result<(), ParseDictionaryErrorKind>,
    {
        let row_count = self
            .take_exactly_one_word()?
            .parse::<usize>()
            .map_err(|err| self.error(ParseDictionaryErrorKind::MalformedNumber(err)))?;

        for row in 1..=row_count {
            self.advance_line();
            if self.is_finished() || self.next_word() != Some(key) {
                return Err(self.error(ParseDictionaryErrorKind::MismatchedRowCount {
                    expected: row_count,
                    actual: row,
                }));
            }

            let [word1, word2] = self.take_exactly::<2>()?;
            f(word1, word2).map_err(|kind| self.error(kind))?;
        }

        Ok(())
    }

    fn parse_affix_table<F>(&mut self, key: &str, flag_type: FlagType, mut f: F) -> ParseResult
    where
        F: FnMut(
            Flag,         // flag
            bool,         // crossproduct
            Option<&str>, // strip
            &str,         // add
            Option<&str>, // condition
            &str,         // flagset
        ) -> core::result::Result<(), ParseDictionaryErrorKind>,
    {
        // The header takes the shape:
        // PFX flag cross_product row_count
        // SFX flag cross_product row_count
        let [flag_str, crossproduct, row_count] = self.take_exactly::<3>()?;

        let flag = parse_flag_from_str(flag_type, flag_str)
            .map_err(|err| self.error(ParseDictionaryErrorKind::MalformedFlag(err)))?;
        let crossproduct = match crossproduct {
            "Y" => true,
            "N" => false,
            _ => return Err(self.error(ParseDictionaryErrorKind::MalformedAffix)),
        };
        let row_count = row_count
            .parse::<usize>()
            .map_err(|err| self.error(ParseDictionaryErrorKind::MalformedNumber(err)))?;

        for row in 1..=row_count {
            // Each row takes the shape:
            // PFX flag stripping prefix [condition [morphological_fields...]]
            // SFX flag stripping suffix [condition [morphological_fields...]]
            self.advance_line();
            if self.is_finished() || self.next_word() != Some(key) {
                return Err(self.error(ParseDictionaryErrorKind::MismatchedRowCount {
                    expected: row_count,
                    actual: row,
                }));
            }

            if self.next_word() != Some(flag_str) {
                return Err(self.error(ParseDictionaryErrorKind::MalformedAffix));
            }

            let strip = match self.next_word() {
                Some("0") => None,
                Some(word) => Some(word),
                None => {
                    return Err(self.error(ParseDictionaryErrorKind::MismatchedArity {
                        expected: 3,
                        actual: 1,
                    }))
                }
            };

            // The add needs to be split from its continuation flagset.
            let (add, flagset) = match self.next_word() {
                Some(word) => split_word_and_flagset_naive(word),
                None => {
                    return Err(self.error(ParseDictionaryErrorKind::MismatchedArity {
                        expected: 3,
                        actual: 2,
                    }))
                }
            };

            // "." is the empty condition - it always matches. We use `None` for that fast lane
            // instead.
            let condition = self.next_word().filter(|&cond| cond != ".");

            // NOTE: any remaining words on the line are morphological fields, which we don't
            // currently parse.

            f(flag, crossproduct, strip, add, condition, flagset)
                .map_err(|kind| self.error(kind))?
        }

        Ok(())
    }

    fn error(&mut self, kind: ParseDictionaryErrorKind) -> ParseDictionaryError {
        ParseDictionaryError {
            kind,
            source: self.source,
            line_number: self
                .lines
                .peek()
                .map(|(line_number, _line)| line_number + 1),
        }
    }
}

fn try_flag_from_u16(val: u16) -> core::result::Result<Flag, ParseFlagError> {
    Flag::new(val).ok_or(ParseFlagError::ZeroFlag)
}

fn try_flag_from_char(ch: char) -> core::result::Result<Flag, ParseFlagError> {
    let val = ch as u32;
    if val > u16::MAX as u32 {
        return Err(ParseFlagError::FlagAbove65535);
    }
    try_flag_from_u16(val as u16)
}

fn parse_flag_from_str(
    flag_type: FlagType,
    input: &str,
) -> core::result::Result<Flag, ParseFlagError> {
    use ParseFlagError::*;
    debug_assert!(!input.is_empty());

    match flag_type {
        FlagType::Short => {
            let mut chars = input.chars();
            let ch = chars.next().ok_or(ZeroFlag)?;
            if ch.is_ascii() {
                // The flag is ASCII: it's a valid `u8` so it can fit into a `u16`.
                try_flag_from_u16(ch as u16)
            } else {
                Err(NonAscii(ch))
            }
        }
        FlagType::Long => {
            let mut chars = input.chars();
            let c1 = chars.next().ok_or(ZeroFlag)?;
            if !c1.is_ascii() {
                return Err(NonAscii(c1));
            }
            let c2 = chars.next().ok_or(MissingSecondChar(c1))?;
            if !c2.is_ascii() {
                return Err(NonAscii(c2));
            }

            try_flag_from_u16(u16::from_ne_bytes([c1 as u8, c2 as u8]))
        }
        FlagType::Numeric => {
            let number = input.parse::<u16>().map_err(ParseIntError)?;
            try_flag_from_u16(number)
        }
        FlagType::Utf8 => {
            let mut chars = input.chars();
            let ch = chars.next().ok_or(ZeroFlag)?;
            try_flag_from_char(ch)
        }
    }
}

pub(crate) fn parse_flags_from_chars(
    flag_type: FlagType,
    mut chars: Chars,
) -> core::result::Result<FlagSet, ParseFlagError> {
    use ParseFlagError::*;

    match flag_type {
        FlagType::Short => chars
            .map(|ch| {
                if ch.is_ascii() {
                    try_flag_from_u16(ch as u16)
                } else {
                    Err(NonAscii(ch))
                }
            })
            .collect(),
        FlagType::Long => {
            let mut flags = Vec::new();
            while let Some(c1) = chars.next() {
                if !c1.is_ascii() {
                    return Err(NonAscii(c1));
                }
                let c2 = chars.next().ok_or(MissingSecondChar(c1))?;
                if !c2.is_ascii() {
                    return Err(NonAscii(c2));
                }
                flags.push(try_flag_from_u16(u16::from_ne_bytes([c1 as u8, c2 as u8]))?);
            }
            Ok(flags.into())
        }
        FlagType::Numeric => {
            let mut flags = Vec::new();
            let mut number = String::new();
            let mut separated = false;
            for ch in chars.by_ref() {
                if ch.is_ascii_digit() {
                    number.push(ch);
                    separated = false;
                } else if ch == ',' {
                    if separated {
                        return Err(DuplicateComma);
                    }
                    separated = true;
                    let n = number.parse::<u16>().map_err(ParseIntError)?;
                    number.clear();
                    flags.push(try_flag_from_u16(n)?);
                }
            }
            if !number.is_empty() {
                let n = number.parse::<u16>().map_err(ParseIntError)?;
                flags.push(try_flag_from_u16(n)?);
            }
            Ok(flags.into())
        }
        FlagType::Utf8 => chars.map(try_flag_from_char).collect(),
    }
}

/// Input is assumed to be a single word, i.e. not containing whitespace. This only splits on
/// the slash, it doesn't handle escaping.
// NOTE: in practice no dictionary uses escaping for affix continuation flags.
fn split_word_and_flagset_naive(input: &str) -> (&str, &str) {
    input.split_once('/').unwrap_or((input, ""))
}

/// Attempt to look up the flagset as an alias, falling back to parsing it directly.
fn decode_flagset(
    input: &str,
    flag_type: FlagType,
    aliases: &[FlagSet],
) -> core::result::Result<FlagSet, ParseFlagError> {
    // Fast lane for numeric flag-types and empty aliases.
    if matches!(flag_type, FlagType::Numeric) || aliases.is_empty() {
        return parse_flags_from_chars(flag_type, input.chars());
    }

    if let Some(index) = input
        .parse::<u16>()
        .ok()
        .map(|i| i as usize)
        .filter(|&i| i > 0 && i <= aliases.len())
    {
        // NOTE: the aliases are 1-indexed.
        Ok(aliases[index - 1].clone())
    } else {
        parse_flags_from_chars(flag_type, input.chars())
    }
}

fn parse_dic_line(
    input: &str,
    flag_type: FlagType,
    aliases: &[FlagSet],
    ignore_chars: &str,
) -> core::result::Result<(String, FlagSet), ParseFlagError> {
    let mut chars = input.chars();
    let mut stem = String::new();
    let mut escape = false;
    for ch in chars.by_ref() {
        match ch {
            '\\' => escape = !escape,
            '/' if !escape => break,
            _ => {
                stem.push(ch);
                escape = false;
            }
        }
    }
    if !ignore_chars.is_empty() {
        stem.retain(|ch| !ignore_chars.contains(ch));
    }
    let flags_str: String = chars.collect();
    let flag_set = decode_flagset(&flags_str, flag_type, aliases)?;

    Ok((stem, flag_set))
}

#[derive(Debug, PartialEq, Eq, Clone)]
pub enum ParseCompoundRuleError {
    ParseFlagError(ParseFlagError),
    InvalidFormat,
}

impl fmt::Display for ParseCompoundRuleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ParseFlagError(err) => write!(f, "failed to parse flag: {}", err),
            Self::InvalidFormat => f.write_str("invalid compound rule format"),
        }
    }
}

impl From<ParseFlagError> for ParseCompoundRuleError {
    fn from(err: ParseFlagError) -> Self {
        Self::ParseFlagError(err)
    }
}

impl From<ParseCompoundRuleError> for ParseDictionaryErrorKind {
    fn from(err: ParseCompoundRuleError) -> Self {
        Self::MalformedCompoundRule(err)
    }
}

pub(crate) fn parse_compound_rule(
    input: &str,
    flag_type: FlagType,
) -> core::result::Result<CompoundRule, ParseCompoundRuleError> {
    use ParseCompoundRuleError::InvalidFormat;

    let mut rule: Vec<CompoundRuleElement> = Vec::new();

    let mut push_modifier = |rule: &mut Vec<CompoundRuleElement>,
                             modifier: CompoundRuleModifier|
     -> core::result::Result<(), ParseCompoundRuleError> {
        // A wildcard must follow a flag and cannot be doubled up.
        let last = rule.last_mut().ok_or(InvalidFormat)?;
        if last.modifier.is_some() {
            return Err(InvalidFormat);
        }
        last.modifier = Some(modifier);
        Ok(())
    };

    match flag_type {
        FlagType::Short | FlagType::Utf8 => {
            for ch in input.chars() {
                match ch {
                    '*' => push_modifier(&mut rule, CompoundRuleModifier::ZeroOrMore)?,
                    '?' => push_modifier(&mut rule, CompoundRuleModifier::ZeroOrOne)?,
                    ch => {
                        if matches!(flag_type, FlagType::Short) && !ch.is_ascii() {
                            return Err(ParseFlagError::NonAscii(ch).into());
                        }
                        rule.push(CompoundRuleElement {
                            flag: try_flag_from_char(ch)?,
                            modifier: None,
                        });
                    }
                }
            }
        }
        // For multi-character flag types the flags are parenthesized: `(aa)(bb)*(cc)`.
        FlagType::Long | FlagType::Numeric => {
            let mut chars = input.chars().peekable();
            loop {
                match chars.next() {
                    Some('(') => {
                        let mut flag_str = String::new();
                        loop {
                            match chars.next() {
                                Some(')') if !flag_str.is_empty() => break,
                                Some(ch) if ch != ')' => flag_str.push(ch),
                                _ => return Err(InvalidFormat),
                            }
                        }
                        let flag = parse_flag_from_str(flag_type, &flag_str)?;
                        rule.push(CompoundRuleElement {
                            flag,
                            modifier: None,
                        });
                    }
                    Some('*') => push_modifier(&mut rule, CompoundRuleModifier::ZeroOrMore)?,
                    Some('?') => push_modifier(&mut rule, CompoundRuleModifier::ZeroOrOne)?,
                    Some(_) => return Err(InvalidFormat),
                    None => break,
                }
            }
        }
    }

    if rule.is_empty() {
        return Err(InvalidFormat);
    }

    Ok(rule.into_boxed_slice())
}

#[derive(Debug, PartialEq, Eq, Clone)]
pub struct ParseDictionaryError {
    pub kind: ParseDictionaryErrorKind,
    pub source: ParseDictionaryErrorSource,
    pub line_number: Option<usize>,
}

impl fmt::Display for ParseDictionaryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.line_number {
            Some(line) => write!(
                f,
                "failed to parse {} file on line {}: {}",
                self.source, line, self.kind
            ),
            None => write!(f, "failed to parse {} file: {}", self.source, self.kind),
        }
    }
}

impl std::error::Error for ParseDictionaryError {}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum ParseDictionaryErrorSource {
    Dic,
    Aff,
}

impl fmt::Display for ParseDictionaryErrorSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Dic => write!(f, ".dic"),
            Self::Aff => write!(f, ".aff"),
        }
    }
}

#[derive(Debug, PartialEq, Eq, Clone)]
pub enum ParseDictionaryErrorKind {
    UnknownFlagType(UnknownFlagTypeError),
    MalformedFlag(ParseFlagError),
    MalformedNumber(core::num::ParseIntError),
    MismatchedArity { expected: usize, actual: usize },
    MismatchedRowCount { expected: usize, actual: usize },
    MalformedCompoundRule(ParseCompoundRuleError),
    MalformedAffix,
    MalformedCondition(ConditionError),
    Empty,
}

impl From<UnknownFlagTypeError> for ParseDictionaryErrorKind {
    fn from(err: UnknownFlagTypeError) -> Self {
        Self::UnknownFlagType(err)
    }
}

impl From<ParseFlagError> for ParseDictionaryErrorKind {
    fn from(err: ParseFlagError) -> Self {
        Self::MalformedFlag(err)
    }
}

impl From<ConditionError> for ParseDictionaryErrorKind {
    fn from(err: ConditionError) -> Self {
        Self::MalformedCondition(err)
    }
}

impl fmt::Display for ParseDictionaryErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownFlagType(err) => err.fmt(f),
            Self::MalformedFlag(err) => write!(f, "flag is malformed: {}", err),
            Self::MalformedNumber(err) => err.fmt(f),
            Self::MismatchedArity { expected, actual } => {
                write!(f, "expected {} arguments but found {}", expected, actual)
            }
            Self::MismatchedRowCount { expected, actual } => {
                write!(f, "expected {} rows but found {}", expected, actual)
            }
            Self::MalformedCompoundRule(err) => {
                write!(f, "compound rule is malformed: {}", err)
            }
            Self::MalformedAffix => write!(f, "failed to parse affix"),
            Self::MalformedCondition(err) => write!(f, "condition is malformed: {}", err),
            Self::Empty => write!(f, "the file is empty"),
        }
    }
}

#[derive(Debug, PartialEq, Eq, Clone)]
pub struct UnknownFlagTypeError(String);

impl FromStr for FlagType {
    type Err = UnknownFlagTypeError;

    fn from_str(s: &str) -> core::result::Result<Self, Self::Err> {
        match s {
            "long" => Ok(Self::Long),
            "num" => Ok(Self::Numeric),
            "UTF-8" => Ok(Self::Utf8),
            _ => Err(UnknownFlagTypeError(s.to_string())),
        }
    }
}

impl fmt::Display for UnknownFlagTypeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "expected FLAG to be `long`, `num` or `UTF-8` if set, found {}",
            self.0
        )
    }
}

#[derive(Debug, PartialEq, Eq, Clone)]
pub enum ParseFlagError {
    NonAscii(char),
    MissingSecondChar(char),
    ParseIntError(core::num::ParseIntError),
    DuplicateComma,
    ZeroFlag,
    FlagAbove65535,
}

impl fmt::Display for ParseFlagError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NonAscii(ch) => write!(f, "expected ascii char, found {}", ch),
            Self::MissingSecondChar(ch) => {
                write!(f, "expected two chars, {} is missing its second", ch)
            }
            Self::ParseIntError(err) => err.fmt(f),
            Self::DuplicateComma => f.write_str("unexpected extra comma"),
            Self::ZeroFlag => f.write_str("flag cannot be zero"),
            Self::FlagAbove65535 => f.write_str("flag's binary representation exceeds 65535"),
        }
    }
}

/// An error arising from validating a [`Condition`].
///
/// Conditions are a subset of regular expressions that include positive and negative character
/// classes and the wildcard character. A condition fails validation if a character class is
/// left open (for example `foo[bar`), closed without being opened (`foo]`), or empty (`[]`).
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum ConditionError {
    /// The pattern contained a closing `]` with no matching opening `[`.
    UnopenedCharacterClass,
    /// The pattern contained an opening `[` with no matching closing `]`.
    UnclosedCharacterClass,
    /// The pattern contained the literal `[]` which is not a valid character class.
    EmptyCharacterClass,
}

impl fmt::Display for ConditionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnopenedCharacterClass => {
                f.write_str("closing bracket has no matching opening bracket")
            }
            Self::UnclosedCharacterClass => {
                f.write_str("opening bracket has no matching closing bracket")
            }
            Self::EmptyCharacterClass => f.write_str("empty bracket expression"),
        }
    }
}

impl FromStr for Condition {
    type Err = ConditionError;

    fn from_str(s: &str) -> core::result::Result<Self, Self::Err> {
        let mut chars = 0;
        let mut iter = s.chars();

        while let Some(ch) = iter.next() {
            match ch {
                '[' => {
                    let mut closed = false;
                    let mut members = 0;
                    for ch in iter.by_ref() {
                        if ch == ']' {
                            closed = true;
                            break;
                        }
                        // A leading `^` negates the class rather than being a member of it.
                        if !(members == 0 && ch == '^') {
                            members += 1;
                        }
                    }
                    if !closed {
                        return Err(ConditionError::UnclosedCharacterClass);
                    }
                    if members == 0 {
                        return Err(ConditionError::EmptyCharacterClass);
                    }
                    chars += 1;
                }
                ']' => return Err(ConditionError::UnopenedCharacterClass),
                _ => chars += 1,
            }
        }

        Ok(Self {
            pattern: s.to_string(),
            chars,
        })
    }
}

#[cfg(test)]
mod test {
    use crate::macros::{flag, flagset};

    use super::*;

    fn aff_data(aff: &str) -> AffData {
        let (_words, data) = parse(aff, "0\n", ahash::RandomState::new()).unwrap();
        data
    }

    #[test]
    fn parse_suggestion_options() {
        let aff = r#"
# a comment
TRY abc
KEY qwe|asd
MAXNGRAMSUGS 7
MAXDIFF 3
ONLYMAXDIFF
NOSPLITSUGS
MAXCPDSUGS 2
"#;
        let data = aff_data(aff);
        assert_eq!(data.try_chars, "abc");
        assert_eq!(data.keyboard_closeness, "qwe|asd");
        assert_eq!(data.options.max_ngram_suggestions, 7);
        assert_eq!(data.options.max_diff_factor, 3);
        assert!(data.options.only_max_diff);
        assert!(data.options.no_split_suggestions);
        assert_eq!(data.options.max_compound_suggestions, 2);
    }

    #[test]
    fn parse_rep_table() {
        let aff = r#"
REP 2
REP alot a_lot
REP ie ei
"#;
        let data = aff_data(aff);
        assert_eq!(data.replacements.any_place_replacements().count(), 2);
        assert!(data
            .replacements
            .any_place_replacements()
            .any(|(from, to)| from == "alot" && to == "a lot"));
    }

    #[test]
    fn parse_map_table() {
        let aff = r#"
MAP 2
MAP aàâ
MAP (ss)(ß)
"#;
        let data = aff_data(aff);
        let groups: Vec<Vec<&str>> = data
            .similarities
            .groups()
            .map(|group| group.iter().map(|entry| entry.as_ref()).collect())
            .collect();
        assert_eq!(groups, vec![vec!["a", "à", "â"], vec!["ss", "ß"]]);
    }

    #[test]
    fn parse_phone_table() {
        let aff = r#"
PHONE 2
PHONE PH F
PHONE Z S
"#;
        let data = aff_data(aff);
        assert!(!data.phonetic_table.is_empty());
        assert_eq!(data.phonetic_table.transform("phiz"), "FIS");
    }

    #[test]
    fn parse_affixes_and_dic() {
        let aff = r#"
PFX A Y 1
PFX A 0 re .

SFX S Y 2
SFX S 0 s [^sxy]
SFX S y ies [^aeiou]y
"#;
        let dic = r#"2
try/S
cover/AS
"#;
        let (words, data) = parse(aff, dic, ahash::RandomState::new()).unwrap();
        assert_eq!(words.len(), 2);
        assert_eq!(
            words.homonyms("try").next().cloned(),
            Some(flagset!['S'])
        );
        assert_eq!(data.prefixes.iter().count(), 1);
        assert_eq!(data.suffixes.iter().count(), 2);
    }

    #[test]
    fn parse_flag_aliases() {
        let aff = r#"
AF 2
AF AB
AF Z
"#;
        let dic = r#"1
word/1
"#;
        let (words, _data) = parse(aff, dic, ahash::RandomState::new()).unwrap();
        assert_eq!(
            words.homonyms("word").next().cloned(),
            Some(flagset!['A', 'B'])
        );
    }

    #[test]
    fn parse_long_and_numeric_flags() {
        assert_eq!(
            parse_flags_from_chars(FlagType::Numeric, "5,12".chars()),
            Ok(FlagSet::from_iter([flag!(5), flag!(12)]))
        );
        assert_eq!(
            parse_flags_from_chars(FlagType::Long, "aabb".chars())
                .unwrap()
                .iter()
                .count(),
            2
        );
        assert!(parse_flags_from_chars(FlagType::Long, "abc".chars()).is_err());
    }

    #[test]
    fn dic_line_escaping_and_ignore() {
        let (stem, flags) =
            parse_dic_line("foo\\/bar/S", FlagType::Short, &[], "").unwrap();
        assert_eq!(stem, "foo/bar");
        assert_eq!(flags, flagset!['S']);

        let (stem, _flags) = parse_dic_line("tar-tışma", FlagType::Short, &[], "-ı").unwrap();
        assert_eq!(stem, "tartşma");
    }

    #[test]
    fn mismatched_row_count_errors() {
        let aff = r#"
REP 3
REP a b
"#;
        let err = parse(aff, "0\n", ahash::RandomState::new()).unwrap_err();
        assert!(matches!(
            err.kind,
            ParseDictionaryErrorKind::MismatchedRowCount { expected: 3, .. }
        ));
        assert_eq!(err.source, ParseDictionaryErrorSource::Aff);
    }

    #[test]
    fn empty_dic_errors() {
        let err = parse("", "", ahash::RandomState::new()).unwrap_err();
        assert!(matches!(err.kind, ParseDictionaryErrorKind::Empty));
    }
}
