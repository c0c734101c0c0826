//! End-to-end suggestion tests against a small english-like dictionary.

use grimoire::{Dictionary, Suggestion, SuggestionKind};
use once_cell::sync::Lazy;

const AFF: &str = r#"
TRY esianrtolcdugmphbyfvkwzESIANRTOLCDUGMPHBYFVKWZ'-
KEY qwertyuiop|asdfghjkl|zxcvbnm
MAXNGRAMSUGS 4
FORBIDDENWORD !

REP 3
REP alot a_lot
REP ie ei
REP shun tion

SFX S Y 1
SFX S 0 s [^sxy]
"#;

const DIC: &str = r#"16
the
a
lot
slot
receive
world
co
operate
cooperate
ice
cream
dream
hello
work/S
try/S
hte/!
"#;

static DICT: Lazy<Dictionary> = Lazy::new(|| Dictionary::new(AFF, DIC).unwrap());

fn suggest(word: &str) -> Vec<String> {
    let mut suggestions = Vec::new();
    DICT.suggest(word, &mut suggestions);
    suggestions
}

fn suggest_detailed(word: &str) -> Vec<Suggestion> {
    let mut suggestions = Vec::new();
    DICT.suggest_detailed(word, &mut suggestions);
    suggestions
}

#[test]
fn transposition_is_found_and_lowercased() {
    let suggestions = suggest_detailed("hte");
    assert_eq!(suggestions[0].text, "the");
    assert!(matches!(
        suggestions[0].kind,
        SuggestionKind::SwapChar | SuggestionKind::BadChar
    ));
}

#[test]
fn suggestions_follow_input_capitalization() {
    let suggestions = suggest_detailed("THe");
    assert_eq!(suggestions[0].text, "The");
    assert_eq!(suggestions[0].kind, SuggestionKind::Case);

    // An all-caps typo is corrected in all caps.
    let suggestions = suggest("HTE");
    assert!(suggestions.contains(&"THE".to_string()));
}

#[test]
fn replacement_table_pairs_win() {
    let suggestions = suggest_detailed("alot");
    assert_eq!(suggestions[0].text, "a lot");
    assert_eq!(suggestions[0].kind, SuggestionKind::RepChars);

    // A good edit ends the stream before the expensive fallback stages.
    assert!(suggestions
        .iter()
        .all(|suggestion| suggestion.kind != SuggestionKind::Ngram
            && suggestion.kind != SuggestionKind::Phonet));
}

#[test]
fn dashed_words_are_recursed() {
    let suggestions = suggest_detailed("co-oparate");
    assert!(suggestions
        .iter()
        .any(|suggestion| suggestion.text == "co-operate"
            && suggestion.kind == SuggestionKind::Dashes));
}

#[test]
fn replacement_ends_stream_before_fallback() {
    let suggestions = suggest_detailed("recieve");
    assert!(suggestions
        .iter()
        .any(|suggestion| suggestion.text == "receive"
            && suggestion.kind == SuggestionKind::RepChars));
    assert!(suggestions
        .iter()
        .all(|suggestion| suggestion.kind != SuggestionKind::Ngram
            && suggestion.kind != SuggestionKind::Phonet));
}

#[test]
fn ngram_fallback_for_distant_misspellings() {
    let suggestions = suggest_detailed("wrlds");

    let ngrams: Vec<_> = suggestions
        .iter()
        .filter(|suggestion| suggestion.kind == SuggestionKind::Ngram)
        .collect();
    assert!(!ngrams.is_empty());
    assert!(ngrams.len() <= 4);
    assert!(ngrams.iter().any(|suggestion| suggestion.text == "world"));

    // No ngram suggestion merely wraps an earlier suggestion.
    for (idx, ngram) in suggestions.iter().enumerate() {
        if ngram.kind != SuggestionKind::Ngram {
            continue;
        }
        let lowered = ngram.text.to_lowercase();
        assert!(!suggestions[..idx]
            .iter()
            .any(|earlier| lowered.contains(&earlier.text.to_lowercase())));
    }
}

#[test]
fn split_suggestion_in_one_piece_ends_the_stream() {
    let suggestions = suggest_detailed("icecream");
    assert_eq!(
        suggestions.last().map(|suggestion| suggestion.kind),
        Some(SuggestionKind::SpaceWord)
    );
    assert!(suggestions
        .iter()
        .any(|suggestion| suggestion.text == "ice cream"));
}

#[test]
fn forbidden_words_never_appear() {
    // "hte" is a forbidden entry and must not be resuggested for itself or neighbors.
    assert!(!suggest("hte").contains(&"hte".to_string()));
    assert!(!suggest("htes").contains(&"hte".to_string()));
}

#[test]
fn no_duplicate_suggestions() {
    for word in ["hte", "alot", "wrlds", "co-oparate", "icecream", "worls"] {
        let suggestions = suggest(word);
        let mut deduplicated = suggestions.clone();
        deduplicated.sort();
        deduplicated.dedup();
        assert_eq!(
            suggestions.len(),
            deduplicated.len(),
            "duplicate suggestion for {word:?}: {suggestions:?}"
        );
    }
}

#[test]
fn suggestions_are_deterministic() {
    for word in ["hte", "alot", "wrlds", "co-oparate", "icecream"] {
        assert_eq!(suggest_detailed(word), suggest_detailed(word));
    }
}

#[test]
fn affixed_forms_are_suggested() {
    // "worsk" -> "works": the correction is an affixed form, not a bare stem.
    let suggestions = suggest("worsk");
    assert!(suggestions.contains(&"works".to_string()));
}

#[test]
fn empty_try_alphabet_disables_insert_edits() {
    let dict = Dictionary::new("MAXNGRAMSUGS 0\n", "1\nworld\n").unwrap();
    let mut suggestions = Vec::new();

    // Without TRY there are no insertion or replacement candidates, and with the fallback
    // disabled the engine finds nothing at all for this input.
    dict.suggest("wrld", &mut suggestions);
    assert!(suggestions.is_empty());
}

#[test]
fn fallback_disabled_without_ngram_and_phone() {
    let dict = Dictionary::new("MAXNGRAMSUGS 0\n", "2\nhello\nworld\n").unwrap();
    let mut suggestions = Vec::new();
    dict.suggest("hullo", &mut suggestions);
    assert!(suggestions.is_empty());
}

#[test]
fn correct_words_come_back_clean() {
    assert!(DICT.check("world"));
    assert!(DICT.check("works"));
    assert!(DICT.check("co-operate"));
    assert!(!DICT.check("wrld"));
}
