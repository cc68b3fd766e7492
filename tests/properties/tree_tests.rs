use std::collections::BTreeSet;

use binpack::{AvlTree, NaturalOrder};
use proptest::prelude::*;

#[derive(Debug, Clone)]
enum TreeOp {
    Insert(u16),
    Remove(u16),
}

// ========== Strategies ==========

/// Keys are drawn from a small range so that duplicates and misses are common.
fn arb_tree_op() -> impl Strategy<Value = TreeOp> {
    prop_oneof![
        3 => (0u16..256).prop_map(TreeOp::Insert),
        2 => (0u16..256).prop_map(TreeOp::Remove),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    // For any sequence of inserts and removes, every node stays within the
    // balance bound and the tree holds exactly the model's keys, in order.
    #[test]
    fn tree_matches_ordered_set(ops in prop::collection::vec(arb_tree_op(), 1..300)) {
        let mut tree = AvlTree::new(NaturalOrder);
        let mut model = BTreeSet::new();

        for op in ops {
            match op {
                TreeOp::Insert(key) => {
                    prop_assert_eq!(tree.insert(key), model.insert(key));
                }
                TreeOp::Remove(key) => {
                    let expected = model.remove(&key).then_some(key);
                    prop_assert_eq!(tree.remove(&key), expected);
                }
            }

            prop_assert!(tree.is_balanced());
            prop_assert_eq!(tree.len(), model.len());
            prop_assert_eq!(tree.iter().len(), model.len());
            prop_assert_eq!(tree.min(), model.first());
            prop_assert_eq!(tree.max(), model.last());
        }

        let keys: Vec<u16> = tree.iter().copied().collect();
        let expected: Vec<u16> = model.into_iter().collect();
        prop_assert_eq!(keys, expected);
    }

    // The height bound follows from the balance invariant.
    #[test]
    fn height_is_logarithmic(keys in prop::collection::btree_set(any::<u32>(), 1..2000)) {
        let mut tree = AvlTree::new(NaturalOrder);
        for key in &keys {
            tree.insert(*key);
        }

        let bound = 1.45 * ((keys.len() + 2) as f64).log2();
        prop_assert!(
            (tree.height() as f64) <= bound,
            "height {} for {} keys",
            tree.height(),
            keys.len()
        );
    }

    // Boundary walks agree with a scan of the sorted keys.
    #[test]
    fn boundary_walks_match_scan(
        keys in prop::collection::btree_set(0u32..1000, 0..200),
        pivot in 0u32..1000,
    ) {
        let mut tree = AvlTree::new(NaturalOrder);
        for key in &keys {
            tree.insert(*key);
        }

        prop_assert_eq!(tree.first_where(|&k| k >= pivot), keys.range(pivot..).next());
        prop_assert_eq!(tree.last_where(|&k| k <= pivot), keys.range(..=pivot).next_back());
    }
}
