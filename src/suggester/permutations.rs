//! Pure generators producing candidate corrections by permuting the misspelled word.
//!
//! None of these consult the dictionary. Each takes the word (plus whichever `.aff` table it
//! models) and pushes candidates into a sink; the suggester validates the candidates and the
//! sink's return value stops generation early once enough valid ones have been found.

use std::ops::ControlFlow;

use crate::aff::{ReplacementTable, SimilarityTable};

/// How far apart two characters may be for the distant-swap edits.
const MAX_CHAR_DISTANCE: usize = 4;

/// Candidates built by applying the `REP` table: each pattern occurrence rewritten to its
/// correction. A correction may contain a space, turning the word into a pair.
pub(super) fn replchars(
    word: &str,
    table: &ReplacementTable,
    sink: &mut dyn FnMut(String) -> ControlFlow<()>,
) -> ControlFlow<()> {
    if table.is_empty() || word.chars().nth(1).is_none() {
        return ControlFlow::Continue(());
    }

    for (from, to) in table.whole_word_replacements() {
        if word == from {
            sink(to.to_string())?;
        }
    }

    for (from, to) in table.start_word_replacements() {
        if let Some(rest) = word.strip_prefix(from) {
            let mut candidate = String::with_capacity(to.len() + rest.len());
            candidate.push_str(to);
            candidate.push_str(rest);
            sink(candidate)?;
        }
    }

    for (from, to) in table.end_word_replacements() {
        if let Some(head) = word.strip_suffix(from) {
            let mut candidate = String::with_capacity(head.len() + to.len());
            candidate.push_str(head);
            candidate.push_str(to);
            sink(candidate)?;
        }
    }

    for (from, to) in table.any_place_replacements() {
        for (idx, _) in word.match_indices(from) {
            let mut candidate = String::with_capacity(word.len() - from.len() + to.len());
            candidate.push_str(&word[..idx]);
            candidate.push_str(to);
            candidate.push_str(&word[idx + from.len()..]);
            sink(candidate)?;
        }
    }

    ControlFlow::Continue(())
}

/// Every way of splitting the word into two non-empty halves.
pub(super) fn twowords(
    word: &str,
    sink: &mut dyn FnMut(&str, &str) -> ControlFlow<()>,
) -> ControlFlow<()> {
    for (idx, _ch) in word.char_indices().skip(1) {
        sink(&word[..idx], &word[idx..])?;
    }

    ControlFlow::Continue(())
}

/// Candidates built from the `MAP` table: characters replaced by others from their similarity
/// class, including several at once ("olso" considering both o's for "ölsö").
pub(super) fn mapchars(
    word: &str,
    table: &SimilarityTable,
    sink: &mut dyn FnMut(String) -> ControlFlow<()>,
) -> ControlFlow<()> {
    if table.is_empty() || word.chars().nth(1).is_none() {
        return ControlFlow::Continue(());
    }

    mapchars_at(word, 0, table, sink)
}

fn mapchars_at(
    word: &str,
    start: usize,
    table: &SimilarityTable,
    sink: &mut dyn FnMut(String) -> ControlFlow<()>,
) -> ControlFlow<()> {
    if start >= word.len() {
        return ControlFlow::Continue(());
    }

    for group in table.groups() {
        for entry in group {
            // Only the first occurrence: later ones are covered by the recursion.
            let Some(pos) = word[start..].find(entry.as_ref()) else {
                continue;
            };
            let pos = start + pos;
            for other in group {
                if other == entry {
                    continue;
                }
                let mut replaced =
                    String::with_capacity(word.len() - entry.len() + other.len());
                replaced.push_str(&word[..pos]);
                replaced.push_str(other);
                replaced.push_str(&word[pos + entry.len()..]);
                let next_start = pos + other.len();
                sink(replaced.clone())?;
                mapchars_at(&replaced, next_start, table, sink)?;
            }
        }
    }

    ControlFlow::Continue(())
}

/// Every swap of two adjacent characters, plus the double swaps Hunspell tries for four and
/// five character words ("ahev" -> "have", "owudl" -> "would").
pub(super) fn swapchar(
    word: &str,
    sink: &mut dyn FnMut(String) -> ControlFlow<()>,
) -> ControlFlow<()> {
    let chars: Vec<char> = word.chars().collect();
    if chars.len() < 2 {
        return ControlFlow::Continue(());
    }

    let mut buffer = chars.clone();
    for idx in 0..chars.len() - 1 {
        buffer.swap(idx, idx + 1);
        sink(buffer.iter().collect())?;
        buffer.swap(idx, idx + 1);
    }

    match chars.len() {
        4 => {
            // Swap the first two and last two characters at once.
            buffer.swap(0, 1);
            buffer.swap(2, 3);
            sink(buffer.iter().collect())?;
            buffer.swap(0, 1);
            buffer.swap(2, 3);
        }
        5 => {
            // The same, and also the second & third with the last two.
            buffer.swap(0, 1);
            buffer.swap(3, 4);
            sink(buffer.iter().collect())?;
            buffer.swap(0, 1);
            buffer.swap(1, 2);
            sink(buffer.iter().collect())?;
            buffer.swap(1, 2);
            buffer.swap(3, 4);
        }
        _ => (),
    }

    ControlFlow::Continue(())
}

/// Swaps of two characters that aren't adjacent, up to a bounded distance apart.
pub(super) fn longswapchar(
    word: &str,
    sink: &mut dyn FnMut(String) -> ControlFlow<()>,
) -> ControlFlow<()> {
    let chars: Vec<char> = word.chars().collect();
    let mut buffer = chars.clone();

    for first in 0..chars.len() {
        for second in first + 2..chars.len() {
            if second - first > MAX_CHAR_DISTANCE {
                break;
            }
            if chars[first] == chars[second] {
                continue;
            }
            buffer.swap(first, second);
            sink(buffer.iter().collect())?;
            buffer.swap(first, second);
        }
    }

    ControlFlow::Continue(())
}

/// Replacements of each character with its neighbors on the `KEY` keyboard layout, and with
/// its own uppercase form (a missed shift key).
pub(super) fn badcharkey(
    word: &str,
    layout: &str,
    sink: &mut dyn FnMut(String) -> ControlFlow<()>,
) -> ControlFlow<()> {
    let chars: Vec<char> = word.chars().collect();

    for (idx, &ch) in chars.iter().enumerate() {
        let upper: String = ch.to_uppercase().collect();
        if upper.as_str() != ch.to_string() {
            sink(replace_char_at(&chars, idx, &upper))?;
        }

        for (pos, _) in layout.match_indices(ch) {
            if let Some(prev) = layout[..pos].chars().next_back().filter(|&kb| kb != '|') {
                sink(replace_char_at(&chars, idx, &prev.to_string()))?;
            }
            if let Some(next) = layout[pos..].chars().nth(1).filter(|&kb| kb != '|') {
                sink(replace_char_at(&chars, idx, &next.to_string()))?;
            }
        }
    }

    ControlFlow::Continue(())
}

/// Deletions of one character: the typo was a doubled key press.
pub(super) fn extrachar(
    word: &str,
    sink: &mut dyn FnMut(String) -> ControlFlow<()>,
) -> ControlFlow<()> {
    let chars: Vec<char> = word.chars().collect();
    if chars.len() < 2 {
        return ControlFlow::Continue(());
    }

    for idx in 0..chars.len() {
        let mut candidate = String::with_capacity(word.len());
        candidate.extend(&chars[..idx]);
        candidate.extend(&chars[idx + 1..]);
        sink(candidate)?;
    }

    ControlFlow::Continue(())
}

/// Insertions of one character from the `TRY` alphabet at every position. `TRY` is ordered by
/// letter frequency so likelier repairs come out first.
pub(super) fn forgotchar(
    word: &str,
    try_chars: &str,
    sink: &mut dyn FnMut(String) -> ControlFlow<()>,
) -> ControlFlow<()> {
    let chars: Vec<char> = word.chars().collect();

    for try_ch in try_chars.chars() {
        for idx in 0..=chars.len() {
            let mut candidate = String::with_capacity(word.len() + try_ch.len_utf8());
            candidate.extend(&chars[..idx]);
            candidate.push(try_ch);
            candidate.extend(&chars[idx..]);
            sink(candidate)?;
        }
    }

    ControlFlow::Continue(())
}

/// Moves of one character two or more positions away. Single-position moves are already
/// covered by the adjacent swaps.
pub(super) fn movechar(
    word: &str,
    sink: &mut dyn FnMut(String) -> ControlFlow<()>,
) -> ControlFlow<()> {
    let chars: Vec<char> = word.chars().collect();
    if chars.len() < 2 {
        return ControlFlow::Continue(());
    }

    // Forward moves.
    for from in 0..chars.len() {
        for to in from + 2..chars.len() {
            let mut candidate = String::with_capacity(word.len());
            candidate.extend(&chars[..from]);
            candidate.extend(&chars[from + 1..=to]);
            candidate.push(chars[from]);
            candidate.extend(&chars[to + 1..]);
            sink(candidate)?;
        }
    }

    // Backward moves.
    for from in 2..chars.len() {
        for to in 0..=from - 2 {
            let mut candidate = String::with_capacity(word.len());
            candidate.extend(&chars[..to]);
            candidate.push(chars[from]);
            candidate.extend(&chars[to..from]);
            candidate.extend(&chars[from + 1..]);
            sink(candidate)?;
        }
    }

    ControlFlow::Continue(())
}

/// Replacements of each character with every character of the `TRY` alphabet.
pub(super) fn badchar(
    word: &str,
    try_chars: &str,
    sink: &mut dyn FnMut(String) -> ControlFlow<()>,
) -> ControlFlow<()> {
    let chars: Vec<char> = word.chars().collect();

    for try_ch in try_chars.chars() {
        for (idx, &ch) in chars.iter().enumerate() {
            if ch == try_ch {
                continue;
            }
            let mut candidate = String::with_capacity(word.len() + try_ch.len_utf8());
            candidate.extend(&chars[..idx]);
            candidate.push(try_ch);
            candidate.extend(&chars[idx + 1..]);
            sink(candidate)?;
        }
    }

    ControlFlow::Continue(())
}

/// Collapses a repeated two-character pattern: "vacacation" looks like a typo of "vacation".
pub(super) fn doubletwochars(
    word: &str,
    sink: &mut dyn FnMut(String) -> ControlFlow<()>,
) -> ControlFlow<()> {
    let chars: Vec<char> = word.chars().collect();
    if chars.len() < 5 {
        return ControlFlow::Continue(());
    }

    // Count how long the characters keep repeating with period two; every third repeat in a
    // row completes an "abab" that collapses to "ab".
    let mut repeats = 0;
    for idx in 2..chars.len() {
        if chars[idx] == chars[idx - 2] {
            repeats += 1;
            if repeats == 3 {
                let mut candidate = String::with_capacity(word.len());
                candidate.extend(&chars[..idx - 1]);
                candidate.extend(&chars[idx + 1..]);
                sink(candidate)?;
                repeats = 0;
            }
        } else {
            repeats = 0;
        }
    }

    ControlFlow::Continue(())
}

fn replace_char_at(chars: &[char], idx: usize, with: &str) -> String {
    let mut candidate = String::with_capacity(chars.len() + with.len());
    candidate.extend(&chars[..idx]);
    candidate.push_str(with);
    candidate.extend(&chars[idx + 1..]);
    candidate
}

#[cfg(test)]
mod test {
    use super::*;

    fn collect(
        generate: impl FnOnce(&mut dyn FnMut(String) -> ControlFlow<()>) -> ControlFlow<()>,
    ) -> Vec<String> {
        let mut out = Vec::new();
        let _ = generate(&mut |candidate| {
            out.push(candidate);
            ControlFlow::Continue(())
        });
        out
    }

    #[test]
    fn replchars_rewrites_patterns() {
        let table = ReplacementTable::new(&[("alot", "a_lot"), ("ie", "ei")]);

        assert!(collect(|sink| replchars("alot", &table, sink)).contains(&"a lot".to_string()));
        assert!(collect(|sink| replchars("recieve", &table, sink))
            .contains(&"receive".to_string()));
        // Both occurrences are rewritten, one at a time.
        assert_eq!(
            collect(|sink| replchars("dieciest", &table, sink)),
            ["deiciest", "dieceist"]
        );
    }

    #[test]
    fn replchars_respects_anchors() {
        let table = ReplacementTable::new(&[("^alot$", "a_lot")]);

        assert_eq!(collect(|sink| replchars("alot", &table, sink)), ["a lot"]);
        assert!(collect(|sink| replchars("alots", &table, sink)).is_empty());
    }

    #[test]
    fn twowords_splits_everywhere() {
        let mut splits = Vec::new();
        let _ = twowords("abc", &mut |left, right| {
            splits.push((left.to_string(), right.to_string()));
            ControlFlow::Continue(())
        });
        assert_eq!(
            splits,
            [
                ("a".to_string(), "bc".to_string()),
                ("ab".to_string(), "c".to_string())
            ]
        );
    }

    #[test]
    fn mapchars_substitutes_classes() {
        let table: SimilarityTable = vec![vec!["a".to_string(), "á".to_string()]].into();

        assert_eq!(
            collect(|sink| mapchars("banan", &table, sink)),
            ["bánan", "bánán"]
        );
    }

    #[test]
    fn swapchar_adjacent_and_double() {
        assert!(collect(|sink| swapchar("exmaple", sink)).contains(&"example".to_string()));
        // 4 characters: double swap of both halves.
        assert!(collect(|sink| swapchar("ahev", sink)).contains(&"have".to_string()));
        // 5 characters: two double swap variants.
        let candidates = collect(|sink| swapchar("owudl", sink));
        assert!(candidates.contains(&"would".to_string()));
    }

    #[test]
    fn longswapchar_distant_pairs() {
        let candidates = collect(|sink| longswapchar("abcd", sink));
        assert!(candidates.contains(&"cbad".to_string()));
        assert!(candidates.contains(&"dbca".to_string()));
        assert!(candidates.contains(&"adcb".to_string()));
        // Adjacent swaps belong to swapchar.
        assert!(!candidates.contains(&"bacd".to_string()));
    }

    #[test]
    fn longswapchar_is_bounded() {
        let candidates = collect(|sink| longswapchar("abcdefgh", sink));
        // Distance 4 is allowed, distance 5 is not.
        assert!(candidates.contains(&"ebcdafgh".to_string()));
        assert!(!candidates.contains(&"fbcdeagh".to_string()));
    }

    #[test]
    fn badcharkey_keyboard_neighbors() {
        let layout = "qwertyuiop|asdfghjkl|zxcvbnm";

        let candidates = collect(|sink| badcharkey("dteam", layout, sink));
        assert!(candidates.contains(&"dream".to_string()));
        // Missed shift key.
        assert!(candidates.contains(&"Dteam".to_string()));

        // The `|` row separator is never a neighbor.
        let candidates = collect(|sink| badcharkey("past", layout, sink));
        assert!(candidates.contains(&"oast".to_string()));
        assert!(!candidates.iter().any(|candidate| candidate.contains('|')));
    }

    #[test]
    fn extrachar_deletes_each_position() {
        assert_eq!(
            collect(|sink| extrachar("abc", sink)),
            ["bc", "ac", "ab"]
        );
        assert!(collect(|sink| extrachar("a", sink)).is_empty());
    }

    #[test]
    fn forgotchar_inserts_try_chars() {
        assert!(collect(|sink| forgotchar("helo", "l", sink)).contains(&"hello".to_string()));
        assert!(collect(|sink| forgotchar("helo", "", sink)).is_empty());
    }

    #[test]
    fn movechar_skips_adjacent_moves() {
        let candidates = collect(|sink| movechar("abcde", sink));
        // 'a' moved two positions forward.
        assert!(candidates.contains(&"bcade".to_string()));
        // 'e' moved to the front.
        assert!(candidates.contains(&"eabcd".to_string()));
        // A move by one is an adjacent swap, not a move.
        assert!(!candidates.contains(&"bacde".to_string()));
    }

    #[test]
    fn badchar_replaces_each_position() {
        assert!(collect(|sink| badchar("warld", "o", sink)).contains(&"world".to_string()));
        // Identity replacements are skipped.
        assert_eq!(
            collect(|sink| badchar("aaa", "a", sink)),
            Vec::<String>::new()
        );
        assert!(collect(|sink| badchar("warld", "", sink)).is_empty());
    }

    #[test]
    fn doubletwochars_collapses_repeats() {
        assert_eq!(
            collect(|sink| doubletwochars("vacacation", sink)),
            ["vacation"]
        );
        assert!(collect(|sink| doubletwochars("abab", sink)).is_empty());
        assert!(collect(|sink| doubletwochars("banana", sink)).contains(&"bana".to_string()));
    }

    #[test]
    fn generation_stops_when_sink_breaks() {
        let mut seen = 0;
        let flow = badchar("warld", "abcdefg", &mut |_candidate| {
            seen += 1;
            if seen == 3 {
                ControlFlow::Break(())
            } else {
                ControlFlow::Continue(())
            }
        });
        assert!(flow.is_break());
        assert_eq!(seen, 3);
    }
}
