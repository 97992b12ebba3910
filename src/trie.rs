//! Frequency-counting prefix tree over an index-addressed node arena.

use hashbrown::HashMap;

use crate::error::{IndexError, Result};

type NodeId = usize;

const ROOT: NodeId = 0;

#[derive(Debug, Default, Clone)]
struct TrieNode {
    children: HashMap<char, NodeId>,
    // (parent slot, symbol on the edge from the parent); `None` for the root
    parent: Option<(NodeId, char)>,
    terminal_count: u64,
    pass_count: u64,
}

impl TrieNode {
    fn child_of(parent: NodeId, symbol: char) -> Self {
        TrieNode {
            parent: Some((parent, symbol)),
            ..TrieNode::default()
        }
    }
}

/// A completed word and the frequency it was inserted with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completion {
    pub word: String,
    pub frequency: u64,
}

impl Completion {
    pub fn new(word: &str, frequency: u64) -> Self {
        Completion {
            word: word.to_string(),
            frequency,
        }
    }
}

#[derive(Debug, Clone)]
pub struct PrefixIndex {
    nodes: Vec<TrieNode>,
    free: Vec<NodeId>,
    words: usize,
}

impl Default for PrefixIndex {
    fn default() -> Self {
        Self::new()
    }
}

impl PrefixIndex {
    pub fn new() -> Self {
        PrefixIndex {
            nodes: vec![TrieNode::default()],
            free: Vec::new(),
            words: 0,
        }
    }

    /// Adds `frequency` occurrences of `word`.
    ///
    /// Inserting a word that is already present adds to its frequency. A zero
    /// frequency is rejected before anything is touched.
    pub fn insert(&mut self, word: &str, frequency: u64) -> Result<()> {
        if frequency == 0 {
            return Err(IndexError::InvalidArgument(format!(
                "frequency for {:?} must be positive",
                word
            )));
        }
        // The root carries the largest pass_count, so checking it covers the path.
        if self.nodes[ROOT].pass_count.checked_add(frequency).is_none() {
            return Err(IndexError::InvalidArgument(format!(
                "frequency {} for {:?} overflows the index weight",
                frequency, word
            )));
        }

        let mut node = ROOT;
        self.nodes[ROOT].pass_count += frequency;
        for ch in word.chars() {
            node = match self.nodes[node].children.get(&ch) {
                Some(&child) => child,
                None => self.attach(node, ch),
            };
            self.nodes[node].pass_count += frequency;
        }

        let end = &mut self.nodes[node];
        if end.terminal_count == 0 {
            self.words += 1;
        }
        end.terminal_count += frequency;
        Ok(())
    }

    pub fn insert_one(&mut self, word: &str) -> Result<()> {
        self.insert(word, 1)
    }

    /// Removes `word` together with its whole accumulated frequency.
    ///
    /// Returns `false` without touching the tree when the word is not stored.
    /// Nodes that no remaining word passes through are reclaimed, deepest
    /// first, stopping at the first ancestor that is still in use.
    pub fn delete(&mut self, word: &str) -> bool {
        let Some(end) = self.find(word) else {
            return false;
        };
        let removed = self.nodes[end].terminal_count;
        if removed == 0 {
            return false;
        }
        self.nodes[end].terminal_count = 0;
        self.words -= 1;

        let mut cursor = Some(end);
        while let Some(id) = cursor {
            let node = &mut self.nodes[id];
            debug_assert!(
                node.pass_count >= removed,
                "pass_count underflow on node {}: {} < {}",
                id,
                node.pass_count,
                removed
            );
            node.pass_count -= removed;
            cursor = node.parent.map(|(parent, _)| parent);
        }

        let mut id = end;
        while self.nodes[id].pass_count == 0 {
            let Some((parent, symbol)) = self.nodes[id].parent else {
                break;
            };
            debug_assert!(self.nodes[id].children.is_empty());
            self.nodes[parent].children.remove(&symbol);
            self.release(id);
            id = parent;
        }
        true
    }

    pub fn contains(&self, word: &str) -> bool {
        self.frequency(word) > 0
    }

    /// The frequency `word` was inserted with, 0 when it is not stored.
    pub fn frequency(&self, word: &str) -> u64 {
        self.find(word)
            .map_or(0, |node| self.nodes[node].terminal_count)
    }

    /// Total inserted weight of the words starting with `prefix`.
    pub fn prefix_weight(&self, prefix: &str) -> u64 {
        self.find(prefix).map_or(0, |node| self.nodes[node].pass_count)
    }

    pub fn has_prefix(&self, prefix: &str) -> bool {
        self.find(prefix).is_some()
    }

    /// Words starting with `prefix`, most frequent first.
    ///
    /// Ties are ordered by the word itself so output is reproducible. Every
    /// match is collected and sorted before `limit` is applied, so the cost is
    /// `O(m log m)` in the number of matches whatever the limit.
    pub fn complete(&self, prefix: &str, limit: Option<usize>) -> Vec<Completion> {
        let Some(start) = self.find(prefix) else {
            return Vec::new();
        };

        let mut completions = Vec::new();
        let mut stack = vec![(start, prefix.to_string())];
        while let Some((id, word)) = stack.pop() {
            let node = &self.nodes[id];
            for (&ch, &child) in node.children.iter() {
                let mut next = word.clone();
                next.push(ch);
                stack.push((child, next));
            }
            if node.terminal_count > 0 {
                completions.push(Completion {
                    word,
                    frequency: node.terminal_count,
                });
            }
        }

        completions.sort_by(|a, b| {
            b.frequency
                .cmp(&a.frequency)
                .then_with(|| a.word.cmp(&b.word))
        });
        if let Some(limit) = limit {
            completions.truncate(limit);
        }
        completions
    }

    /// Number of distinct words stored.
    pub fn len(&self) -> usize {
        self.words
    }

    pub fn is_empty(&self) -> bool {
        self.words == 0
    }

    /// Live nodes, root included.
    pub fn node_count(&self) -> usize {
        self.nodes.len() - self.free.len()
    }

    pub fn total_weight(&self) -> u64 {
        self.nodes[ROOT].pass_count
    }

    pub fn clear(&mut self) {
        self.nodes.clear();
        self.nodes.push(TrieNode::default());
        self.free.clear();
        self.words = 0;
    }

    /// Walks every node reachable from the root and checks the counting
    /// invariant, the parent links, and the live node and word tallies.
    pub fn check_invariants(&self) -> Result<()> {
        if self.nodes[ROOT].parent.is_some() {
            return Err(IndexError::Invariant("root has a parent".to_string()));
        }

        let mut live = 0;
        let mut words = 0;
        let mut stack = vec![ROOT];
        while let Some(id) = stack.pop() {
            live += 1;
            if live > self.nodes.len() {
                return Err(IndexError::Invariant(
                    "more reachable nodes than slots, the tree has a cycle".to_string(),
                ));
            }

            let node = &self.nodes[id];
            if id != ROOT && node.pass_count == 0 {
                return Err(IndexError::Invariant(format!(
                    "node {} is reachable with a zero pass_count",
                    id
                )));
            }
            if node.terminal_count > 0 {
                words += 1;
            }

            let mut expected = node.terminal_count;
            for (&ch, &child) in node.children.iter() {
                if self.nodes[child].parent != Some((id, ch)) {
                    return Err(IndexError::Invariant(format!(
                        "node {} is linked under {:?} from {} but points elsewhere",
                        child, ch, id
                    )));
                }
                expected += self.nodes[child].pass_count;
                stack.push(child);
            }
            if node.pass_count != expected {
                return Err(IndexError::Invariant(format!(
                    "node {} has pass_count {} but its word and children weigh {}",
                    id, node.pass_count, expected
                )));
            }
        }

        if live != self.node_count() {
            return Err(IndexError::Invariant(format!(
                "{} nodes reachable, {} allocated",
                live,
                self.node_count()
            )));
        }
        if words != self.words {
            return Err(IndexError::Invariant(format!(
                "{} terminal nodes found, {} words recorded",
                words, self.words
            )));
        }
        Ok(())
    }

    fn find(&self, path: &str) -> Option<NodeId> {
        path.chars()
            .try_fold(ROOT, |node, ch| self.nodes[node].children.get(&ch).copied())
    }

    fn attach(&mut self, parent: NodeId, symbol: char) -> NodeId {
        let node = TrieNode::child_of(parent, symbol);
        let id = match self.free.pop() {
            Some(id) => {
                self.nodes[id] = node;
                id
            }
            None => {
                self.nodes.push(node);
                self.nodes.len() - 1
            }
        };
        self.nodes[parent].children.insert(symbol, id);
        id
    }

    fn release(&mut self, id: NodeId) {
        self.nodes[id] = TrieNode::default();
        self.free.push(id);
    }
}

#[cfg(test)]
mod proptests;
