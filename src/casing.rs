//! Classification and manipulation of word capitalization.
//!
//! Suggestion and checking behavior both branch on the "shape" of a word's casing: a fully
//! lowercase word is treated differently than an all-caps one or a mixed-case one. This module
//! classifies words into the five shapes Hunspell distinguishes and derives the recapitalized
//! variants that checking and suggesting retry.

/// The capitalization of a word.
// Hunspell: <https://github.com/hunspell/hunspell/blob/8f9bb2957bfd74ca153fad96083a54488b518ca5/src/hunspell/csutil.hxx#L91-L96>
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub(crate) enum Casing {
    /// All letters are lowercase. For example "foobar".
    None,
    /// First letter is capitalized only. For example "Foobar".
    Init,
    /// All letters are capitalized. For example "FOOBAR".
    All,
    /// Some but not all letters are capitalized. The first letter is not capitalized.
    /// For example "fooBar".
    Camel,
    /// Some but not all letters are capitalized. The first letter is capitalized.
    /// For example "FooBar".
    Pascal,
}

pub(crate) fn classify_casing(word: &str) -> Casing {
    let mut upper = 0;
    let mut lower = 0;

    for ch in word.chars() {
        if ch.is_uppercase() {
            upper += 1;
        }
        if ch.is_lowercase() {
            lower += 1;
        }
    }

    if upper == 0 {
        return Casing::None;
    }

    // `word.chars()` has at least one element or we would have returned above.
    let first_capital = word
        .chars()
        .next()
        .expect("word is non-empty")
        .is_uppercase();

    if first_capital && upper == 1 {
        Casing::Init
    } else if lower == 0 {
        Casing::All
    } else if first_capital {
        Casing::Pascal
    } else {
        Casing::Camel
    }
}

pub(crate) fn lowercase(word: &str) -> String {
    word.to_lowercase()
}

pub(crate) fn uppercase(word: &str) -> String {
    word.to_uppercase()
}

pub(crate) fn lowercase_into_utf32(word: &str, out: &mut Vec<char>) {
    out.extend(word.chars().flat_map(char::to_lowercase));
}

/// Uppercases the first character and lowercases the rest. "hELLO" becomes "Hello".
pub(crate) fn titlecase(word: &str) -> String {
    let mut chars = word.chars();
    let mut titlecased = String::with_capacity(word.len());
    if let Some(ch) = chars.next() {
        titlecased.extend(ch.to_uppercase());
    }
    titlecased.extend(chars.flat_map(char::to_lowercase));
    titlecased
}

/// Lowercases the first character only, leaving the tail as written. "FooBar" becomes "fooBar".
pub(crate) fn lowercase_first(word: &str) -> String {
    let mut chars = word.chars();
    let mut result = String::with_capacity(word.len());
    if let Some(ch) = chars.next() {
        result.extend(ch.to_lowercase());
    }
    result.extend(chars);
    result
}

/// Classifies the word and lists the recapitalizations worth retrying, most faithful first.
///
/// The first variant is always the word as typed. The others cover the theory that the word is
/// correct except for its capitalization: "KIttens" is worth retrying as "kIttens", "kittens"
/// and "Kittens".
pub(crate) fn corrections(word: &str) -> (Casing, Vec<String>) {
    let casing = classify_casing(word);

    let mut variants = vec![word.to_string()];
    match casing {
        Casing::None => (),
        Casing::Init | Casing::Camel => variants.push(lowercase(word)),
        Casing::Pascal => {
            variants.push(lowercase_first(word));
            variants.push(lowercase(word));
            variants.push(titlecase(word));
        }
        Casing::All => {
            variants.push(lowercase(word));
            variants.push(titlecase(word));
        }
    }

    // Recapitalizing can produce the original or an earlier variant (consider a Pascal word
    // like "Ab"). Don't retry those.
    let mut deduplicated: Vec<String> = Vec::with_capacity(variants.len());
    for variant in variants {
        if !deduplicated.contains(&variant) {
            deduplicated.push(variant);
        }
    }

    (casing, deduplicated)
}

/// The capitalized forms a lowercase word may be forced into.
pub(crate) fn capitalizations(word: &str) -> impl Iterator<Item = String> {
    core::iter::once(titlecase(word))
}

/// Rewrites a suggestion to match the casing of the misspelled input.
///
/// A suggestion found by lowercasing an "ALLCAPS" input should be suggested in all caps, and
/// one found for a "Titlecase" input should be titlecased.
pub(crate) fn coerce(text: &str, casing: Casing) -> String {
    match casing {
        Casing::Init | Casing::Pascal => {
            let mut chars = text.chars();
            match chars.next() {
                Some(ch) => {
                    let mut coerced: String = ch.to_uppercase().collect();
                    coerced.push_str(chars.as_str());
                    coerced
                }
                None => String::new(),
            }
        }
        Casing::All => uppercase(text),
        Casing::None | Casing::Camel => text.to_string(),
    }
}

/// Whether two characters are equal when compared in lowercase.
pub(crate) fn is_char_eq_lowercase(left: char, right: char) -> bool {
    left == right || left.to_lowercase().eq(right.to_lowercase())
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn classify_casing_nuspell_unit_test() {
        // Upstream: <https://github.com/nuspell/nuspell/blob/349e0d6bc68b776af035ca3ff664a7fc55d69387/tests/unit_test.cxx#L451-L459>

        assert_eq!(Casing::None, classify_casing(""));
        assert_eq!(Casing::None, classify_casing("здраво"));
        assert_eq!(Casing::Init, classify_casing("Здраво"));
        assert_eq!(Casing::All, classify_casing("ЗДРАВО"));
        assert_eq!(Casing::Camel, classify_casing("здРаВо"));
        assert_eq!(Casing::Pascal, classify_casing("ЗдрАво"));
    }

    #[test]
    fn case_conversions() {
        assert_eq!(titlecase("hELLO"), "Hello");
        assert_eq!(lowercase_first("FooBar"), "fooBar");
        assert_eq!(uppercase("straße"), "STRASSE");
        assert_eq!(lowercase("ΣΊΣΥΦΟΣ"), "σίσυφος");
    }

    #[test]
    fn corrections_variants() {
        let (casing, variants) = corrections("kittens");
        assert_eq!(casing, Casing::None);
        assert_eq!(variants, vec!["kittens".to_string()]);

        let (casing, variants) = corrections("Kittens");
        assert_eq!(casing, Casing::Init);
        assert_eq!(variants, vec!["Kittens".to_string(), "kittens".to_string()]);

        let (casing, variants) = corrections("KITTENS");
        assert_eq!(casing, Casing::All);
        assert_eq!(
            variants,
            vec![
                "KITTENS".to_string(),
                "kittens".to_string(),
                "Kittens".to_string()
            ]
        );

        let (casing, variants) = corrections("KIttens");
        assert_eq!(casing, Casing::Pascal);
        assert_eq!(
            variants,
            vec![
                "KIttens".to_string(),
                "kIttens".to_string(),
                "kittens".to_string(),
                "Kittens".to_string()
            ]
        );
    }

    #[test]
    fn coerce_to_casing() {
        assert_eq!(coerce("ansi", Casing::All), "ANSI");
        assert_eq!(coerce("hello", Casing::Init), "Hello");
        assert_eq!(coerce("hello", Casing::Pascal), "Hello");
        assert_eq!(coerce("hello", Casing::None), "hello");
        assert_eq!(coerce("heLLo", Casing::Camel), "heLLo");
    }
}
