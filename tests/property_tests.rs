//! Property-based tests for history, merge and diff.
//!
//! These tests use proptest to verify properties hold across
//! many randomly generated inputs.

use proptest::prelude::*;
use recall::{diff, ChangeKind, History, Object, Snapshot, Store, Value};
use std::collections::BTreeMap;

fn counter(n: i64) -> Snapshot {
    Snapshot::from_object([("n", n)].into_iter().collect())
}

fn n_of(snapshot: &Snapshot) -> i64 {
    snapshot.get("n").and_then(Value::as_i64).unwrap_or(-1)
}

fn object_of(entries: &BTreeMap<String, i64>) -> Object {
    entries.iter().map(|(k, v)| (k.clone(), *v)).collect()
}

#[derive(Clone, Debug)]
enum Op {
    Push(i64),
    Undo,
    Redo,
}

prop_compose! {
    fn arbitrary_op()(variant in 0..3u8, n in 0..1000i64) -> Op {
        match variant {
            0 => Op::Push(n),
            1 => Op::Undo,
            _ => Op::Redo,
        }
    }
}

fn flat_object() -> impl Strategy<Value = BTreeMap<String, i64>> {
    prop::collection::btree_map("[a-f]", -3..3i64, 0..6)
}

proptest! {
    #[test]
    fn history_never_exceeds_capacity(
        max_len in 1..8usize,
        ops in prop::collection::vec(arbitrary_op(), 0..60),
    ) {
        let mut history = History::new(counter(0), max_len);

        for op in ops {
            match op {
                Op::Push(n) => history.push(counter(n)),
                Op::Undo => { history.undo(); }
                Op::Redo => { history.redo(); }
            }
            prop_assert!(history.len() <= max_len);
            prop_assert!(history.index() < history.len());
            prop_assert_eq!(history.can_undo(), history.index() > 0);
            prop_assert_eq!(history.can_redo(), history.index() + 1 < history.len());
        }
    }

    #[test]
    fn undo_redo_round_trip_under_capacity(
        max_len in 2..12usize,
        pushes in 1..12usize,
        back in 0..12usize,
    ) {
        let pushes = pushes.min(max_len - 1);
        let back = back.min(pushes);
        let mut history = History::new(counter(0), max_len);
        for n in 1..=pushes as i64 {
            history.push(counter(n));
        }

        for _ in 0..back {
            prop_assert!(history.undo().is_some());
        }
        prop_assert_eq!(n_of(history.current()), (pushes - back) as i64);

        for _ in 0..back {
            prop_assert!(history.redo().is_some());
        }
        prop_assert_eq!(n_of(history.current()), pushes as i64);
        prop_assert!(!history.can_redo());
    }

    #[test]
    fn over_capacity_keeps_newest_entries(max_len in 1..8usize, extra in 0..10usize) {
        let pushes = max_len + extra;
        let mut history = History::new(counter(0), max_len);
        for n in 1..=pushes as i64 {
            history.push(counter(n));
        }

        prop_assert_eq!(history.len(), max_len);
        prop_assert_eq!(n_of(history.current()), pushes as i64);

        let mut undone = 0;
        while history.undo().is_some() {
            undone += 1;
        }
        prop_assert_eq!(undone, max_len - 1);
        prop_assert_eq!(n_of(history.current()), (pushes + 1 - max_len) as i64);
    }

    #[test]
    fn new_push_after_undo_drops_redo_branch(pushes in 1..6i64, back in 1..6i64) {
        let back = back.min(pushes);
        let mut history = History::new(counter(0), 16);
        for n in 1..=pushes {
            history.push(counter(n));
        }
        for _ in 0..back {
            history.undo();
        }

        history.push(counter(100));

        prop_assert!(!history.can_redo());
        prop_assert_eq!(history.len() as i64, pushes - back + 2);
        prop_assert_eq!(n_of(history.current()), 100);
    }

    #[test]
    fn merge_is_shallow_union(base in flat_object(), partial in flat_object()) {
        let store = Store::new(Snapshot::from_object(object_of(&base)));
        store.merge(object_of(&partial)).unwrap();
        let state = store.get_state();

        let mut expected = base.clone();
        expected.extend(partial.clone());

        prop_assert_eq!(state.len(), expected.len());
        for (key, value) in &expected {
            prop_assert_eq!(state.get(key).and_then(Value::as_i64), Some(*value));
        }
    }

    #[test]
    fn diff_classifies_every_key(prev in flat_object(), next in flat_object()) {
        let changes = diff(
            &Snapshot::from_object(object_of(&prev)),
            &Snapshot::from_object(object_of(&next)),
        );

        let added = next.keys().filter(|k| !prev.contains_key(*k)).count();
        let removed = prev.keys().filter(|k| !next.contains_key(*k)).count();
        let updated = next
            .iter()
            .filter(|(k, v)| prev.get(*k).is_some_and(|old| old != *v))
            .count();

        let count = |kind: ChangeKind| changes.iter().filter(|c| c.kind() == kind).count();
        prop_assert_eq!(count(ChangeKind::Added), added);
        prop_assert_eq!(count(ChangeKind::Removed), removed);
        prop_assert_eq!(count(ChangeKind::Updated), updated);
    }

    #[test]
    fn diff_of_snapshot_with_itself_is_empty(state in flat_object()) {
        let snapshot = Snapshot::from_object(object_of(&state));
        prop_assert!(diff(&snapshot, &snapshot.clone()).is_empty());
    }
}
