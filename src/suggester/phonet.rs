//! The fallback that suggests dictionary words which sound like the misspelling.
//!
//! This only runs for dictionaries carrying a `PHONE` table. Both the misspelling and each
//! candidate stem are rewritten into a rough phonetic form by that table, and candidates are
//! ranked mainly by how similar the phonetic forms are - which catches misspellings like
//! "fonetik" that are written nothing like their correction but sound just like it.
//!
//! The scan shape mirrors the ngram fallback: `step` is fed every eligible stem and keeps a
//! bounded pool of the best, `finish` refines the ranking and yields texts best-first.

use std::collections::BinaryHeap;

use crate::{aff::PhoneticTable, casing};

use super::ngram::{
    count_eq_at_same_pos, left_common_substring_length, longest_common_subsequence_length,
    ngram_similarity_longer_worse, MinScored,
};

/// How many stems survive the scan.
const MAX_ROOTS: usize = 100;

pub(super) struct PhonetSuggest<'a> {
    table: &'a PhoneticTable,
    /// The misspelling, lowercased.
    wrong: Vec<char>,
    /// The phonetic form of the misspelling.
    wrong_phonet: Vec<char>,
    roots: BinaryHeap<MinScored<&'a str>>,
    scratch: Vec<char>,
}

impl<'a> PhonetSuggest<'a> {
    pub fn new(table: &'a PhoneticTable, word: &str) -> Self {
        let mut wrong = Vec::with_capacity(word.len());
        casing::lowercase_into_utf32(word, &mut wrong);
        let wrong_phonet = table.transform(word).chars().collect();

        Self {
            table,
            wrong,
            wrong_phonet,
            roots: BinaryHeap::with_capacity(MAX_ROOTS),
            scratch: Vec::new(),
        }
    }

    /// Scores one dictionary stem against the misspelling.
    pub fn step(&mut self, stem: &'a str) {
        // A cheap orthographic gate before paying for the phonetic transform: sound-alike
        // corrections still share most letters and roughly the length.
        let stem_chars = stem.chars().count();
        if stem_chars.abs_diff(self.wrong.len()) > 3 {
            return;
        }

        self.scratch.clear();
        casing::lowercase_into_utf32(stem, &mut self.scratch);
        let written_score = ngram_similarity_longer_worse(3, &self.wrong, &self.scratch);
        if written_score <= 2 {
            return;
        }

        self.scratch.clear();
        self.scratch.extend(self.table.transform(stem).chars());
        let score = 2 * ngram_similarity_longer_worse(3, &self.wrong_phonet, &self.scratch);

        let root = MinScored { score, inner: stem };
        if self.roots.len() != MAX_ROOTS {
            self.roots.push(root);
        } else if self.roots.peek().is_some_and(|worst| score > worst.score) {
            self.roots.pop();
            self.roots.push(root);
        }
    }

    /// Ranks the pool, breaking phonetic-score ties with orthographic detail, and yields the
    /// candidate texts best-first.
    pub fn finish(self) -> Vec<String> {
        // `into_sorted_vec` on the reversed ordering puts the best phonetic scores first.
        let mut scored = self.roots.into_sorted_vec();
        let mut lcs_state = Vec::new();
        let mut lower = Vec::new();

        for MinScored {
            score,
            inner: guess,
        } in scored.iter_mut()
        {
            lower.clear();
            casing::lowercase_into_utf32(guess, &mut lower);

            let lcs = longest_common_subsequence_length(&self.wrong, &lower, &mut lcs_state);
            *score = 2 * *score + 2 * lcs as isize;
            *score += left_common_substring_length(&self.wrong, &lower) as isize;
            *score -= (self.wrong.len() as isize - lower.len() as isize).abs();

            let (eq_chars_same_pos, eq_char_swapped) = count_eq_at_same_pos(&self.wrong, &lower);
            if eq_chars_same_pos != 0 {
                *score += 1;
            }
            if eq_char_swapped {
                *score += 10;
            }
        }

        scored.sort_unstable();
        scored
            .into_iter()
            .map(|candidate| candidate.inner.to_string())
            .collect()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn table(pairs: &[(&str, &str)]) -> PhoneticTable {
        PhoneticTable::new(pairs)
    }

    #[test]
    fn suggests_sound_alikes() {
        let table = table(&[("PH", "F"), ("GH$", "F"), ("Z", "S")]);

        let mut builder = PhonetSuggest::new(&table, "fone");
        builder.step("phone");
        builder.step("other");
        builder.step("phonetics");

        let suggestions = builder.finish();
        assert_eq!(suggestions.first().map(String::as_str), Some("phone"));
        assert!(!suggestions.iter().any(|word| word == "other"));
    }

    #[test]
    fn best_sound_match_ranks_first() {
        let table = table(&[("PH", "F")]);

        // Both candidates survive the written-similarity gate; the one that sounds the same
        // wins.
        let mut builder = PhonetSuggest::new(&table, "foto");
        builder.step("photo");
        builder.step("forto");

        let suggestions = builder.finish();
        assert_eq!(suggestions.first().map(String::as_str), Some("photo"));
    }
}
