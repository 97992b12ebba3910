use std::collections::{BTreeMap, BTreeSet};

use proptest::prelude::*;

use super::{Completion, PrefixIndex};

#[derive(Debug, Clone)]
enum Op {
    Insert(String, u64),
    Delete(String),
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => ("[abc]{0,4}", 1u64..20).prop_map(|(word, frequency)| Op::Insert(word, frequency)),
        2 => "[abc]{0,4}".prop_map(Op::Delete),
    ]
}

fn prefixes(word: &str) -> impl Iterator<Item = &str> {
    word.char_indices()
        .map(move |(i, _)| &word[..i])
        .chain(std::iter::once(word))
}

fn apply(ops: &[Op]) -> (PrefixIndex, BTreeMap<String, u64>) {
    let mut index = PrefixIndex::new();
    let mut model = BTreeMap::new();
    for op in ops {
        match op {
            Op::Insert(word, frequency) => {
                index.insert(word, *frequency).unwrap();
                *model.entry(word.clone()).or_insert(0) += frequency;
            }
            Op::Delete(word) => {
                index.delete(word);
                model.remove(word);
            }
        }
    }
    (index, model)
}

proptest! {
    #[test]
    fn counts_hold_after_every_op(ops in prop::collection::vec(op(), 0..64)) {
        let mut index = PrefixIndex::new();
        let mut model: BTreeMap<String, u64> = BTreeMap::new();
        for op in ops {
            match op {
                Op::Insert(word, frequency) => {
                    index.insert(&word, frequency).unwrap();
                    *model.entry(word).or_insert(0) += frequency;
                }
                Op::Delete(word) => {
                    let removed = index.delete(&word);
                    prop_assert_eq!(model.remove(&word).is_some(), removed);
                    prop_assert!(!index.contains(&word));
                }
            }
            let checked = index.check_invariants();
            prop_assert!(checked.is_ok(), "{:?}", checked);
        }
    }

    #[test]
    fn index_matches_model(ops in prop::collection::vec(op(), 0..64)) {
        let (index, model) = apply(&ops);

        prop_assert_eq!(model.len(), index.len());
        for (word, frequency) in model.iter() {
            prop_assert_eq!(*frequency, index.frequency(word));
        }

        // one node per distinct non-empty prefix, plus the root
        let live: BTreeSet<&str> = model
            .keys()
            .flat_map(|word| prefixes(word))
            .filter(|prefix| !prefix.is_empty())
            .collect();
        prop_assert_eq!(live.len() + 1, index.node_count());

        for prefix in live.iter() {
            let expected: u64 = model
                .iter()
                .filter(|(word, _)| word.starts_with(prefix))
                .map(|(_, frequency)| frequency)
                .sum();
            prop_assert_eq!(expected, index.prefix_weight(prefix));
        }

        let mut expected: Vec<Completion> = model
            .iter()
            .map(|(word, frequency)| Completion::new(word, *frequency))
            .collect();
        expected.sort_by(|a, b| b.frequency.cmp(&a.frequency).then_with(|| a.word.cmp(&b.word)));
        prop_assert_eq!(expected, index.complete("", None));
    }

    #[test]
    fn limit_truncates_full_ranking(
        ops in prop::collection::vec(op(), 0..64),
        prefix in "[abc]{0,2}",
        limit in 0usize..6,
    ) {
        let (index, _) = apply(&ops);

        let full = index.complete(&prefix, None);
        let limited = index.complete(&prefix, Some(limit));
        prop_assert_eq!(&full[..limit.min(full.len())], &limited[..]);
    }
}
