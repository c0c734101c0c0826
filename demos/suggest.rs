/*
Most basic example for the suggester for quick debugging.

This example doesn't check whether the input word is in the dictionary first.

## Usage

```
$ cargo run --example suggest /usr/share/hunspell/en_US ansi
Compiled the dictionary in 127ms
Suggestions for "ansi": "ANSI", "ans", "anti" (checked in 1367µs)
```

The first argument is the path of a dictionary without its extension: `.aff` and `.dic` are
appended.
*/
use std::time::Instant;

use grimoire::Dictionary;

fn main() {
    let mut args = std::env::args().skip(1);
    let (base, word) = match (args.next(), args.next()) {
        (Some(base), Some(word)) => (base, word),
        _ => {
            eprintln!("Usage: suggest DICTIONARY_PATH WORD");
            std::process::exit(1);
        }
    };

    let aff = std::fs::read_to_string(format!("{base}.aff")).expect("readable .aff file");
    let dic = std::fs::read_to_string(format!("{base}.dic")).expect("readable .dic file");

    let now = Instant::now();
    let dict = match Dictionary::new(&aff, &dic) {
        Ok(dict) => dict,
        Err(err) => {
            eprintln!("Failed to compile the dictionary: {err}");
            std::process::exit(1);
        }
    };
    println!("Compiled the dictionary in {:?}", now.elapsed());

    let mut suggestions = Vec::with_capacity(5);
    let now = Instant::now();
    dict.suggest(&word, &mut suggestions);
    let time = now.elapsed();
    if suggestions.is_empty() {
        println!("No suggestions found for \"{word}\" (checked in {time:?})");
    } else {
        let suggestions = suggestions
            .into_iter()
            .fold(String::new(), |mut list, suggestion| {
                if !list.is_empty() {
                    list.push_str(", ");
                }
                list.push('"');
                list.push_str(&suggestion);
                list.push('"');
                list
            });
        println!("Suggestions for \"{word}\": {suggestions} (checked in {time:?})");
    }
}
