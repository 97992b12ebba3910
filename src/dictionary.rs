use hashbrown::HashMap;
use simple_log::{debug, warn};

use crate::error::Result;
use crate::trie::{Completion, PrefixIndex};
use crate::util::process_text;

/// A [`PrefixIndex`] paired with an exact word -> frequency map.
///
/// The map is derived state. It is only written next to the matching index
/// mutation, so `frequency` always agrees with the index's terminal counts.
#[derive(Debug, Clone, Default)]
pub struct Dictionary {
    index: PrefixIndex,
    frequencies: HashMap<String, u64>,
    min_word_len: usize,
}

impl Dictionary {
    pub fn new(min_word_len: usize) -> Self {
        Dictionary {
            index: PrefixIndex::new(),
            frequencies: HashMap::new(),
            min_word_len,
        }
    }

    pub fn add_word(&mut self, word: &str, frequency: u64) -> Result<()> {
        self.index.insert(word, frequency)?;
        *self.frequencies.entry(word.to_string()).or_insert(0) += frequency;
        Ok(())
    }

    /// Tokenizes `content` and adds every token once, returning how many
    /// tokens were added.
    pub fn add_text(&mut self, content: &str) -> Result<usize> {
        let words = process_text(content, self.min_word_len);
        for w in words.iter() {
            self.add_word(w, 1)?;
        }
        debug!("added {} tokens", words.len());
        Ok(words.len())
    }

    pub fn remove_word(&mut self, word: &str) -> bool {
        if !self.index.delete(word) {
            return false;
        }
        if self.frequencies.remove(word).is_none() {
            warn!("{:?} was indexed without an exact frequency entry", word);
        }
        true
    }

    /// Removes every token of `content`, returning how many were present.
    pub fn remove_text(&mut self, content: &str) -> usize {
        let mut removed = 0;
        for w in process_text(content, self.min_word_len) {
            if self.remove_word(&w) {
                removed += 1;
            }
        }
        debug!("removed {} tokens", removed);
        removed
    }

    pub fn frequency(&self, word: &str) -> u64 {
        self.frequencies.get(word).copied().unwrap_or(0)
    }

    pub fn contains(&self, word: &str) -> bool {
        self.index.contains(word)
    }

    pub fn prefix_weight(&self, prefix: &str) -> u64 {
        self.index.prefix_weight(prefix)
    }

    pub fn autocomplete(&self, prefix: &str, limit: Option<usize>) -> Vec<Completion> {
        self.index.complete(prefix, limit)
    }

    pub fn index(&self) -> &PrefixIndex {
        &self.index
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// True when the exact map and the index agree word for word.
    pub fn is_consistent(&self) -> bool {
        self.frequencies.len() == self.index.len()
            && self
                .frequencies
                .iter()
                .all(|(word, &frequency)| self.index.frequency(word) == frequency)
    }
}
