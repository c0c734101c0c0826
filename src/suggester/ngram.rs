//! The fallback that suggests dictionary words written similarly to the misspelling.
//!
//! Where the edit stages ask "which small edit repairs the input", this stage asks "which
//! dictionary word looks most like the input" - the Hunspell "ngram" suggestion. It runs as a
//! funnel:
//!
//! 1. `step` scores every eligible stem by rough ngram similarity, keeping the best 100.
//! 2. `finish` expands prefixes and suffixes of those roots into surface forms and keeps the
//!    200 expansions that beat a noise threshold.
//! 3. The survivors are rescored with a weighted ngram measure plus a handful of bespoke
//!    metrics (longest common subsequence, shared prefix length, swap detection), and the
//!    best come out in descending order.
//!
//! This is by far the most expensive suggestion stage since it touches the whole word list,
//! which is why the orchestrator only runs it when the edit stages came up dry.

use std::collections::BinaryHeap;

use crate::{
    aff::AffData,
    casing,
    macros::has_flag,
    FlagSet,
};

// Scoring works in UTF-32: one `char` per element makes positional comparisons trivial, which
// they are not in UTF-8.
type Utf32String = Vec<char>;
type Utf32Str = [char];

/// How many stems survive the first scan.
const MAX_ROOTS: usize = 100;

/// How many expanded surface forms survive the second pass.
const MAX_GUESSES: usize = 200;

/// A wrapper reversing `Ord` by score so that `BinaryHeap` acts as a bounded min-heap: the
/// worst element sits on top, ready to be evicted when something better arrives.
#[derive(Debug, PartialEq, Eq)]
pub(super) struct MinScored<T: PartialEq + Eq> {
    pub score: isize,
    pub inner: T,
}

impl<T: PartialEq + Eq> Ord for MinScored<T> {
    fn cmp(&self, other: &Self) -> core::cmp::Ordering {
        self.score.cmp(&other.score).reverse()
    }
}

impl<T: PartialEq + Eq> PartialOrd<Self> for MinScored<T> {
    fn partial_cmp(&self, other: &Self) -> Option<core::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

pub(super) struct NgramSuggest<'a> {
    aff: &'a AffData,
    /// The misspelling as typed, used to gate which affix expansions are worth building.
    word: &'a str,
    /// The misspelling, lowercased.
    wrong: Utf32String,
    /// Lowercased texts already suggested by earlier stages. Stems the user has already seen
    /// are not rescanned.
    handled: Vec<String>,
    roots: BinaryHeap<MinScored<(&'a str, &'a FlagSet)>>,
    scratch: Utf32String,
}

impl<'a> NgramSuggest<'a> {
    pub fn new(aff: &'a AffData, word: &'a str, handled: Vec<String>) -> Self {
        let mut wrong = Utf32String::with_capacity(word.len());
        casing::lowercase_into_utf32(word, &mut wrong);

        Self {
            aff,
            word,
            wrong,
            handled,
            roots: BinaryHeap::with_capacity(MAX_ROOTS),
            scratch: Utf32String::new(),
        }
    }

    /// Scores one dictionary stem against the misspelling.
    pub fn step(&mut self, stem: &'a str, flags: &'a FlagSet) {
        let stem_lower = casing::lowercase(stem);
        if self.handled.iter().any(|handled| *handled == stem_lower) {
            return;
        }

        self.scratch.clear();
        self.scratch.extend(stem.chars());
        let mut score = left_common_substring_length(&self.wrong, &self.scratch) as isize;

        self.scratch.clear();
        self.scratch.extend(stem_lower.chars());
        score += ngram_similarity_longer_worse(3, &self.wrong, &self.scratch);

        let root = MinScored {
            score,
            inner: (stem, flags),
        };
        if self.roots.len() != MAX_ROOTS {
            self.roots.push(root);
        } else if self.roots.peek().is_some_and(|worst| score > worst.score) {
            self.roots.pop();
            self.roots.push(root);
        }
    }

    /// Expands, rescores and ranks everything gathered by [`step`](Self::step), returning
    /// candidate texts in descending order of likeness.
    pub fn finish(mut self) -> Vec<String> {
        // A noise threshold: score mangled copies of the misspelling (every fourth character
        // wildcarded) and ignore anything that can't beat their average. Expansions below it
        // resemble the input no better than a partly-erased copy does.
        let mut threshold = 0isize;
        let mangled = &mut self.scratch;
        for k in 1..=3 {
            mangled.clear();
            mangled.extend_from_slice(&self.wrong);
            let mut idx = k;
            while idx < mangled.len() {
                mangled[idx] = '*';
                idx += 4;
            }
            threshold += ngram_similarity_any_mismatch(self.wrong.len(), &self.wrong, mangled);
        }
        threshold /= 3;

        let mut expansions = Vec::new();
        let mut guesses: BinaryHeap<MinScored<String>> = BinaryHeap::with_capacity(MAX_GUESSES);
        let mut lower = Utf32String::new();
        let mut expansion_utf32 = Utf32String::new();

        for MinScored {
            inner: (stem, flags),
            ..
        } in core::mem::take(&mut self.roots)
        {
            self.expand_stem(stem, flags, &mut expansions);

            for expansion in expansions.drain(..) {
                expansion_utf32.clear();
                expansion_utf32.extend(expansion.chars());
                let mut score =
                    left_common_substring_length(&self.wrong, &expansion_utf32) as isize;

                lower.clear();
                casing::lowercase_into_utf32(&expansion, &mut lower);
                score += ngram_similarity_any_mismatch(self.wrong.len(), &self.wrong, &lower);

                if score < threshold {
                    continue;
                }

                let guess = MinScored {
                    score,
                    inner: expansion,
                };
                if guesses.len() != MAX_GUESSES {
                    guesses.push(guess);
                } else if guesses.peek().is_some_and(|worst| score > worst.score) {
                    guesses.pop();
                    guesses.push(guess);
                }
            }
        }

        // Rescore the surviving guesses with the detailed measures. `into_sorted_vec` on the
        // reversed ordering puts the best guesses first, which matters below: an exact
        // (case-insensitive) match ends the rescoring early.
        let mut guesses = guesses.into_sorted_vec();
        let mut lcs_state = Vec::new();
        for MinScored {
            score,
            inner: guess,
        } in guesses.iter_mut()
        {
            lower.clear();
            casing::lowercase_into_utf32(guess, &mut lower);

            let lcs = longest_common_subsequence_length(&self.wrong, &lower, &mut lcs_state);

            if self.wrong.len() == lower.len() && self.wrong.len() == lcs {
                *score += 2000;
                break;
            }

            let mut ngram2 = ngram_similarity_any_mismatch_weighted(2, &self.wrong, &lower);
            ngram2 += ngram_similarity_any_mismatch_weighted(2, &lower, &self.wrong);
            let ngram4 = ngram_similarity_any_mismatch(4, &self.wrong, &lower);
            let left_common = left_common_substring_length(&self.wrong, &lower);
            let (eq_chars_same_pos, eq_char_swapped) = count_eq_at_same_pos(&self.wrong, &lower);

            *score = 2 * lcs as isize;
            *score -= (self.wrong.len() as isize - lower.len() as isize).abs();
            *score += left_common as isize + ngram2 + ngram4;
            if eq_chars_same_pos != 0 {
                *score += 1;
            }
            if eq_char_swapped {
                *score += 10;
            }

            // The MAXDIFF knob: penalize guesses whose bigram overlap is too thin relative
            // to the combined length.
            if 5 * ngram2
                < ((self.wrong.len() + lower.len())
                    * (10 - self.aff.options.max_diff_factor as usize)) as isize
            {
                *score -= 1000;
            }
        }

        guesses.sort_unstable();

        let be_more_selective = guesses.first().is_some_and(|best| best.score > 1000);
        let mut out = Vec::new();
        for MinScored {
            score,
            inner: guess,
        } in guesses
        {
            // Iteration is in descending score order, so each cutoff ends the harvest.
            if be_more_selective && score <= 1000 {
                break;
            }
            if score < -100 && (!out.is_empty() || self.aff.options.only_max_diff) {
                break;
            }
            out.push(guess);
        }

        out
    }

    /// Collects the surface forms of a stem worth scoring: the stem itself plus any prefixed
    /// and suffixed derivations compatible with the ends of the misspelled word.
    fn expand_stem(&self, stem: &'a str, flags: &'a FlagSet, expansions: &mut Vec<String>) {
        let options = &self.aff.options;
        expansions.clear();
        let mut cross_suffixed = Vec::new();

        if !has_flag!(flags, options.need_affix_flag) {
            expansions.push(stem.to_string());
            cross_suffixed.push(false);
        }

        if flags.is_empty() {
            return;
        }

        for suffix in self.aff.suffixes.iter() {
            if !flags.contains(&suffix.flag) {
                continue;
            }
            if has_flag!(suffix.flags, options.only_in_compound_flag)
                || has_flag!(suffix.flags, options.circumfix_flag)
            {
                continue;
            }
            if suffix.strip().is_some_and(|strip| !stem.ends_with(strip)) {
                continue;
            }
            if !suffix.condition_matches(stem) {
                continue;
            }
            // Only derivations that could explain what the user typed.
            if !suffix.add.is_empty() && !self.word.ends_with(&suffix.add) {
                continue;
            }

            expansions.push(suffix.to_derived(stem));
            cross_suffixed.push(suffix.crossproduct);
        }

        // Cross products: prefixes on top of the cross-compatible suffixed forms.
        let mut crossed = Vec::new();
        for (suffixed, crossproduct) in expansions.iter().zip(cross_suffixed.iter()) {
            if !crossproduct {
                continue;
            }
            for prefix in self.aff.prefixes.iter() {
                if !prefix.crossproduct || !flags.contains(&prefix.flag) {
                    continue;
                }
                if has_flag!(prefix.flags, options.only_in_compound_flag)
                    || has_flag!(prefix.flags, options.circumfix_flag)
                {
                    continue;
                }
                if prefix
                    .strip()
                    .is_some_and(|strip| !suffixed.starts_with(strip))
                {
                    continue;
                }
                if !prefix.condition_matches(suffixed) {
                    continue;
                }
                if !prefix.add.is_empty() && !self.word.starts_with(&prefix.add) {
                    continue;
                }

                crossed.push(prefix.to_derived(suffixed));
            }
        }
        expansions.append(&mut crossed);

        for prefix in self.aff.prefixes.iter() {
            if !flags.contains(&prefix.flag) {
                continue;
            }
            if has_flag!(prefix.flags, options.only_in_compound_flag)
                || has_flag!(prefix.flags, options.circumfix_flag)
            {
                continue;
            }
            if prefix.strip().is_some_and(|strip| !stem.starts_with(strip)) {
                continue;
            }
            if !prefix.condition_matches(stem) {
                continue;
            }
            if !prefix.add.is_empty() && !self.word.starts_with(&prefix.add) {
                continue;
            }

            expansions.push(prefix.to_derived(stem));
        }
    }
}

pub(super) fn left_common_substring_length(left: &Utf32Str, right: &Utf32Str) -> usize {
    if left.is_empty() || right.is_empty() {
        return 0;
    }

    // The first characters may match modulo case (the typist skipped shift); the rest must
    // match exactly.
    if left[0] != right[0] && !casing::is_char_eq_lowercase(left[0], right[0]) {
        return 0;
    }

    index_of_mismatch(&left[1..], &right[1..])
        .map(|idx| idx + 1)
        .unwrap_or(left.len())
}

fn index_of_mismatch<T: Eq>(left: &[T], right: &[T]) -> Option<usize> {
    left.iter()
        .enumerate()
        .find_map(|(idx, item)| match right.get(idx) {
            Some(other) if other == item => None,
            _ => Some(idx),
        })
}

/// The shared-kgram score for k up to `n`, with a penalty when `right` is much longer than
/// `left`. Used for scanning roots: a long dictionary word containing the misspelling isn't
/// actually a close match.
pub(super) fn ngram_similarity_longer_worse(n: usize, left: &Utf32Str, right: &Utf32Str) -> isize {
    if right.is_empty() {
        return 0;
    }
    let mut score = ngram_similarity(n, left, right);
    let d = (left.len() as isize - right.len() as isize) - 2;
    if d > 0 {
        score -= d;
    }
    score
}

/// Like [ngram_similarity_longer_worse] but penalizing length mismatch in either direction.
pub(super) fn ngram_similarity_any_mismatch(n: usize, left: &Utf32Str, right: &Utf32Str) -> isize {
    if right.is_empty() {
        return 0;
    }
    let mut score = ngram_similarity(n, left, right);
    let d = (right.len() as isize - left.len() as isize).abs() - 2;
    if d > 0 {
        score -= d;
    }
    score
}

/// Counts the kgrams of `left` (for every k up to `n`) that occur anywhere in `right`.
///
/// Each k level that shares fewer than two kgrams ends the count: longer grams can't do
/// better than the shorter grams they contain.
fn ngram_similarity(n: usize, left: &Utf32Str, right: &Utf32Str) -> isize {
    let n = n.min(left.len());
    let mut score = 0;

    for k in 1..=n {
        let mut k_score = 0;
        for i in 0..=left.len() - k {
            let kgram = &left[i..i + k];
            if contains_subslice(right, kgram) {
                k_score += 1;
            }
        }
        score += k_score;
        if k_score < 2 {
            break;
        }
    }

    score
}

/// The weighted variant: kgrams of `left` missing from `right` subtract from the score, and
/// missing word-edge kgrams subtract double.
fn ngram_similarity_weighted(n: usize, left: &Utf32Str, right: &Utf32Str) -> isize {
    let n = n.min(left.len());
    let mut score = 0;

    for k in 1..=n {
        for i in 0..=left.len() - k {
            let kgram = &left[i..i + k];
            if contains_subslice(right, kgram) {
                score += 1;
            } else {
                score -= 1;
                if i == 0 || i == left.len() - k {
                    score -= 1;
                }
            }
        }
    }

    score
}

pub(super) fn ngram_similarity_any_mismatch_weighted(
    n: usize,
    left: &Utf32Str,
    right: &Utf32Str,
) -> isize {
    if right.is_empty() {
        return 0;
    }
    let mut score = ngram_similarity_weighted(n, left, right);
    let d = (right.len() as isize - left.len() as isize).abs() - 2;
    if d > 0 {
        score -= d;
    }
    score
}

fn contains_subslice<T: Eq>(slice: &[T], subslice: &[T]) -> bool {
    if subslice.len() > slice.len() {
        return false;
    }

    let window = slice.len() - subslice.len();
    for i in 0..=window {
        if slice[i..].starts_with(subslice) {
            return true;
        }
    }

    false
}

/// Classic two-row dynamic programming over `state_buffer`, which is reused across calls to
/// avoid reallocating.
pub(super) fn longest_common_subsequence_length<T: Eq>(
    left: &[T],
    right: &[T],
    state_buffer: &mut Vec<usize>,
) -> usize {
    state_buffer.clear();
    state_buffer.resize(right.len(), 0);

    let mut above_prev = 0;
    for item in left.iter() {
        above_prev = 0;
        let mut left_prev = 0;
        for idx in 0..right.len() {
            let above = state_buffer[idx];
            let current = &mut state_buffer[idx];
            *current = if *item == right[idx] {
                above_prev + 1
            } else {
                above.max(left_prev)
            };
            above_prev = above;
            left_prev = *current;
        }
        above_prev = left_prev;
    }

    above_prev
}

/// Counts positions where both slices hold the same element, and detects whether the slices
/// are equal except for one transposed pair.
pub(super) fn count_eq_at_same_pos<T: Eq + Copy>(left: &[T], right: &[T]) -> (usize, bool) {
    let n = left.len().min(right.len());
    let count = left
        .iter()
        .zip(right.iter())
        .filter(|(l, r)| l == r)
        .count();

    let mut is_swap = false;
    // Exactly two mismatches: check whether they mirror each other.
    if left.len() == right.len() && n - count == 2 {
        let mut first_mismatch = None;
        for (l, r) in left.iter().zip(right.iter()) {
            if l != r {
                if let Some((l1, r1)) = first_mismatch {
                    is_swap = l1 == r && r1 == l;
                    break;
                }
                first_mismatch = Some((l, r));
            }
        }
    }

    (count, is_swap)
}

#[cfg(test)]
mod test {
    use super::*;

    fn utf32(word: &str) -> Utf32String {
        word.chars().collect()
    }

    #[test]
    fn index_of_mismatch_test() {
        assert_eq!(index_of_mismatch(b"abcd", b"abcd"), None);
        assert_eq!(index_of_mismatch(b"abcd", b"abxy"), Some(2));
        assert_eq!(index_of_mismatch(b"abcd", b"abc"), Some(3));
        assert_eq!(index_of_mismatch(b"abc", b"abcd"), None);
    }

    #[test]
    fn contains_subslice_test() {
        assert!(contains_subslice(b"abcd", b"abcd"));
        assert!(contains_subslice(b"abcd", b"abc"));
        assert!(contains_subslice(b"abcd", b"bcd"));
        assert!(contains_subslice(b"abcd", b"b"));
        assert!(!contains_subslice(b"abcd", b"cb"));
    }

    #[test]
    fn ngram_similarity_test() {
        // 11 shared kgrams: a, c, u, a, l, l, y, ua, al, ly, ual
        assert_eq!(
            ngram_similarity(3, &utf32("actually"), &utf32("akchualy")),
            11
        );
    }

    #[test]
    fn left_common_substring_test() {
        assert_eq!(
            left_common_substring_length(&utf32("hello"), &utf32("help")),
            3
        );
        // The first character may differ by case only.
        assert_eq!(
            left_common_substring_length(&utf32("hello"), &utf32("Help")),
            3
        );
        assert_eq!(left_common_substring_length(&utf32("hello"), &utf32("yelp")), 0);
        assert_eq!(
            left_common_substring_length(&utf32("abc"), &utf32("abc")),
            3
        );
    }

    #[test]
    fn longest_common_subsequence_length_test() {
        let mut state_buffer = Vec::new();
        assert_eq!(
            longest_common_subsequence_length(b"aaa", b"aaa", &mut state_buffer),
            3
        );
        assert_eq!(
            longest_common_subsequence_length(b"aaaaa", b"bbbaa", &mut state_buffer),
            2
        );
        assert_eq!(
            longest_common_subsequence_length(b"hullo", b"hello", &mut state_buffer),
            4
        );
    }

    #[test]
    fn count_eq_at_same_pos_test() {
        assert_eq!(count_eq_at_same_pos(b"abcd", b"abcd"), (4, false));
        assert_eq!(count_eq_at_same_pos(b"abcd", b"acbd"), (2, true));
        assert_eq!(count_eq_at_same_pos(b"abcd", b"axyd"), (2, false));
    }

    #[test]
    fn suggests_similar_words() {
        let (_words, aff) = crate::aff::parser::parse(
            "MAXNGRAMSUGS 4\n",
            "0\n",
            ahash::RandomState::new(),
        )
        .unwrap();
        let empty = crate::FlagSet::default();

        let mut builder = NgramSuggest::new(&aff, "hullo", Vec::new());
        builder.step("hello", &empty);
        builder.step("jello", &empty);
        builder.step("unrelated", &empty);
        let suggestions = builder.finish();

        assert_eq!(suggestions.first().map(String::as_str), Some("hello"));
        assert!(!suggestions.iter().any(|word| word == "unrelated"));
    }

    #[test]
    fn skips_already_handled_stems() {
        let (_words, aff) = crate::aff::parser::parse(
            "MAXNGRAMSUGS 4\n",
            "0\n",
            ahash::RandomState::new(),
        )
        .unwrap();
        let empty = crate::FlagSet::default();

        let mut builder = NgramSuggest::new(&aff, "hullo", vec!["hello".to_string()]);
        builder.step("hello", &empty);
        assert!(builder.finish().is_empty());
    }
}
