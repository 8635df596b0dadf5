//! Property tests: layer numbering and root identity under arbitrary growth.

use proptest::prelude::*;
use qcapacity::chain::LayerChain;
use qcapacity::{QcError, SchemaVariant, TierKind};

#[derive(Debug, Clone)]
enum Op {
    Append { at: usize, kind: TierKind },
    InsertBefore { at: usize, kind: TierKind },
}

// ---------------------------------------------------------------------------
// Helpers / Strategies
// ---------------------------------------------------------------------------

fn arb_kind() -> impl Strategy<Value = TierKind> {
    prop::sample::select(TierKind::ALL.to_vec())
}

fn arb_op() -> impl Strategy<Value = Op> {
    prop_oneof![
        (any::<usize>(), arb_kind()).prop_map(|(at, kind)| Op::Append { at, kind }),
        (any::<usize>(), arb_kind()).prop_map(|(at, kind)| Op::InsertBefore { at, kind }),
    ]
}

fn assert_contiguous(chain: &LayerChain) {
    for (expected, (handle, record)) in chain.iter().enumerate() {
        assert_eq!(record.layer_no(), expected);
        assert_eq!(chain.handle_at(expected), Some(handle));
        assert_eq!(chain.root_of(handle).unwrap(), chain.root());
    }
}

proptest! {
    #[test]
    fn numbering_stays_contiguous(
        root in arb_kind(),
        ops in prop::collection::vec(arb_op(), 0..24),
    ) {
        let mut chain = LayerChain::create_root(root, SchemaVariant::Current).unwrap();
        let original_root = chain.root();

        for op in ops {
            let before: Vec<_> = chain.iter().map(|(h, _)| h).collect();
            let n = before.len();
            match op {
                Op::Append { at, kind } => {
                    let pos = at % n;
                    let new = chain.append(before[pos], kind).unwrap();
                    prop_assert_eq!(chain.count(), n + 1);
                    prop_assert_eq!(chain.record(new).unwrap().layer_no(), pos + 1);
                    for (old_pos, handle) in before.iter().enumerate() {
                        let layer_no = chain.record(*handle).unwrap().layer_no();
                        if old_pos <= pos {
                            prop_assert_eq!(layer_no, old_pos);
                        } else {
                            prop_assert_eq!(layer_no, old_pos + 1);
                        }
                    }
                }
                Op::InsertBefore { at, kind } => {
                    let pos = at % n;
                    let result = chain.insert_before(before[pos], kind);
                    if pos == 0 {
                        prop_assert!(matches!(result, Err(QcError::NotFound(_))));
                        prop_assert_eq!(chain.count(), n);
                        continue;
                    }
                    let new = result.unwrap();
                    prop_assert_eq!(chain.count(), n + 1);
                    prop_assert_eq!(chain.record(new).unwrap().layer_no(), pos);
                    for (old_pos, handle) in before.iter().enumerate() {
                        let layer_no = chain.record(*handle).unwrap().layer_no();
                        if old_pos < pos {
                            prop_assert_eq!(layer_no, old_pos);
                        } else {
                            prop_assert_eq!(layer_no, old_pos + 1);
                        }
                    }
                }
            }
            prop_assert_eq!(chain.root(), original_root);
            assert_contiguous(&chain);
        }
    }

    #[test]
    fn kinds_keep_their_schema(
        kinds in prop::collection::vec(arb_kind(), 1..10),
    ) {
        let mut chain = LayerChain::create_root(TierKind::Cec, SchemaVariant::V1).unwrap();
        for kind in &kinds {
            let top = chain.top();
            chain.append(top, *kind).unwrap();
        }
        prop_assert_eq!(chain.count(), kinds.len() + 1);
        for ((_, record), kind) in chain.iter().skip(1).zip(&kinds) {
            prop_assert_eq!(record.kind(), *kind);
            prop_assert_eq!(record.schema().kind(), *kind);
        }
    }
}
