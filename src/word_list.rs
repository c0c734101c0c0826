//! Storage for the word list: every stem from the `.dic` file together with its flags.

use core::{
    fmt::Debug,
    hash::{BuildHasher, Hash, Hasher},
    marker::PhantomData,
};

use hashbrown::raw::{RawIter, RawIterHash, RawTable};

use crate::FlagSet;

/// A map from stem to flagset which allows duplicate stems.
///
/// Hunspell-like dictionaries are sets of stems, each carrying the flags that apply to it. A
/// stem may be defined on multiple lines with different flagsets ("homonyms") and merging them
/// is not correct: one flagset might allow an affix in compounds while another forbids it, and
/// checking must be able to try each interpretation separately. So conceptually this is a
/// `HashMap<Box<str>, Vec<FlagSet>>`, flattened.
///
/// Built on Hashbrown's "raw" API - a set of tools for building Swiss tables - which allows
/// inserting fully duplicate keys and iterating over everything sharing a hash.
pub(crate) struct WordList<S: BuildHasher> {
    table: RawTable<(Box<str>, FlagSet)>,
    build_hasher: S,
}

impl<S: BuildHasher> WordList<S> {
    pub fn with_capacity_and_hasher(capacity: usize, build_hasher: S) -> Self {
        Self {
            table: RawTable::with_capacity(capacity),
            build_hasher,
        }
    }

    pub fn insert(&mut self, stem: Box<str>, flags: FlagSet) {
        let hash = make_hash(&self.build_hasher, &stem);
        self.table.reserve(1, |(stem, _flags)| {
            make_hash(&self.build_hasher, stem)
        });
        // Insert without searching for an existing entry with this stem.
        self.table.insert(hash, (stem, flags), |(stem, _flags)| {
            make_hash(&self.build_hasher, stem)
        });
    }

    /// Iterates over the flagsets of every entry stored for exactly this stem.
    pub fn homonyms<'list, 'stem>(&'list self, stem: &'stem str) -> Homonyms<'list, 'stem> {
        let hash = make_hash(&self.build_hasher, stem);

        Homonyms {
            // Here we tie the lifetime of self to the iter.
            inner: unsafe { self.table.iter_hash(hash) },
            stem,
            marker: PhantomData,
        }
    }

    pub fn iter(&self) -> Words<'_> {
        Words {
            // Here we tie the lifetime of self to the iter.
            inner: unsafe { self.table.iter() },
            marker: PhantomData,
        }
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }
}

impl<S: BuildHasher> Debug for WordList<S> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

fn make_hash<S: BuildHasher>(build_hasher: &S, stem: &str) -> u64 {
    let mut state = build_hasher.build_hasher();
    stem.hash(&mut state);
    state.finish()
}

pub(crate) struct Words<'a> {
    inner: RawIter<(Box<str>, FlagSet)>,
    marker: PhantomData<&'a (Box<str>, FlagSet)>,
}

impl<'a> Iterator for Words<'a> {
    type Item = (&'a str, &'a FlagSet);

    fn next(&mut self) -> Option<Self::Item> {
        let bucket = self.inner.next()?;
        // SAFETY: the creator of the iterator (`iter`) ties the reference to the lifetime of
        // the WordList, which cannot be modified while the iterator is borrowed from it.
        let (stem, flags) = unsafe { bucket.as_ref() };
        Some((stem, flags))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl ExactSizeIterator for Words<'_> {
    fn len(&self) -> usize {
        self.inner.len()
    }
}

pub(crate) struct Homonyms<'list, 'stem> {
    inner: RawIterHash<(Box<str>, FlagSet)>,
    stem: &'stem str,
    marker: PhantomData<&'list (Box<str>, FlagSet)>,
}

impl<'list, 'stem> Iterator for Homonyms<'list, 'stem> {
    type Item = &'list FlagSet;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let bucket = self.inner.next()?;
            // SAFETY: as in `Words::next` - `homonyms` ties this reference to the WordList's
            // borrow, preventing concurrent modification of the table.
            let (stem, flags) = unsafe { bucket.as_ref() };
            if stem.as_ref() == self.stem {
                return Some(flags);
            }
        }
    }
}

#[cfg(test)]
mod test {
    use crate::macros::flagset;

    use super::*;

    fn word_list(entries: &[(&str, crate::FlagSet)]) -> WordList<ahash::RandomState> {
        let mut words =
            WordList::with_capacity_and_hasher(entries.len(), ahash::RandomState::new());
        for (stem, flags) in entries {
            words.insert((*stem).into(), flags.clone());
        }
        words
    }

    #[test]
    fn insert_and_read_duplicate_stems() {
        let words = word_list(&[
            ("hello", flagset!['S']),
            ("world", flagset!['S']),
            ("hello", flagset!['X']),
        ]);
        assert_eq!(words.len(), 3);

        let mut homonyms: Vec<_> = words.homonyms("hello").collect();
        homonyms.sort_by_key(|flags| flags.iter().count());
        assert_eq!(homonyms, [&flagset!['S'], &flagset!['X']]);

        assert_eq!(words.homonyms("world").count(), 1);
        assert_eq!(words.homonyms("missing").count(), 0);
    }

    #[test]
    fn iterate_all_entries() {
        let words = word_list(&[("one", flagset![]), ("two", flagset![]), ("three", flagset![])]);

        let mut stems: Vec<_> = words.iter().map(|(stem, _flags)| stem).collect();
        stems.sort_unstable();
        assert_eq!(stems, ["one", "three", "two"]);
    }
}
