//! Property tests: random batches of inserts, removals, reinsertions and
//! reorders inside move transactions keep the chain, the host tree and the
//! mount point in agreement with a plain `Vec` model.

use morph_testing::prelude::*;
use proptest::prelude::*;

#[derive(Debug, Clone)]
enum Op {
    /// Insert a fresh member; with `relink`, move it again after it wrote its
    /// content but before it finished.
    Insert { at: usize, relink: Option<usize> },
    Remove { at: usize },
    /// Put back a member removed earlier in the same batch.
    Reinsert { pick: usize, at: usize },
    Move { from: usize, to: usize },
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0usize..16, prop::option::of(0usize..16))
            .prop_map(|(at, relink)| Op::Insert { at, relink }),
        (0usize..16).prop_map(|at| Op::Remove { at }),
        (0usize..16, 0usize..16).prop_map(|(pick, at)| Op::Reinsert { pick, at }),
        (0usize..16, 0usize..16).prop_map(|(from, to)| Op::Move { from, to }),
    ]
}

fn batches() -> impl Strategy<Value = Vec<Vec<Op>>> {
    prop::collection::vec(prop::collection::vec(op(), 0..8), 1..6)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn move_batches_match_model(initial in 0usize..6, batches in batches()) {
        let mut rule = MorphTestRule::new();
        let labels: Vec<String> = (0..initial).map(|i| format!("[{i}]")).collect();
        let label_refs: Vec<&str> = labels.iter().map(String::as_str).collect();
        let rendered = rule.render_list(&label_refs).unwrap();
        let list = rendered.list;
        let mut model: Vec<(MorphId, String)> = rendered
            .members
            .iter()
            .copied()
            .zip(labels.iter().cloned())
            .collect();
        let mut removed: Vec<MorphId> = Vec::new();
        let mut next_label = initial;

        for batch in batches {
            rule.tree_mut().begin_move(list).unwrap();
            let mut batch_removed = Vec::new();
            for op in batch {
                match op {
                    Op::Insert { at, relink: None } => {
                        let at = at % (model.len() + 1);
                        let reference = model.get(at).map(|(id, _)| *id);
                        let label = format!("[{next_label}]");
                        next_label += 1;
                        let member = rule.render_member(list, &label, reference).unwrap();
                        model.insert(at, (member, label));
                    }
                    Op::Insert { at, relink: Some(to) } => {
                        let reference = model.get(at % (model.len() + 1)).map(|(id, _)| *id);
                        let label = format!("[{next_label}]");
                        next_label += 1;
                        let tree = rule.tree_mut();
                        let member = tree.create_morph(MorphOptions::default());
                        tree.insert_before_morph(list, member, reference).unwrap();
                        tree.set_content(member, label.as_str()).unwrap();
                        let to = to % (model.len() + 1);
                        let reference = model.get(to).map(|(id, _)| *id);
                        tree.insert_before_morph(list, member, reference).unwrap();
                        tree.finish_append(member).unwrap();
                        model.insert(to, (member, label));
                    }
                    Op::Remove { at } if !model.is_empty() => {
                        let (member, label) = model.remove(at % model.len());
                        rule.tree_mut().remove_child_morph(list, member).unwrap();
                        batch_removed.push((member, label));
                    }
                    Op::Reinsert { pick, at } if !batch_removed.is_empty() => {
                        let entry = batch_removed.remove(pick % batch_removed.len());
                        let at = at % (model.len() + 1);
                        let reference = model.get(at).map(|(id, _)| *id);
                        rule.tree_mut()
                            .insert_before_morph(list, entry.0, reference)
                            .unwrap();
                        model.insert(at, entry);
                    }
                    Op::Move { from, to } if model.len() > 1 => {
                        let entry = model.remove(from % model.len());
                        let to = to % (model.len() + 1);
                        let reference = model.get(to).map(|(id, _)| *id);
                        rule.tree_mut()
                            .insert_before_morph(list, entry.0, reference)
                            .unwrap();
                        model.insert(to, entry);
                    }
                    _ => {}
                }
            }
            rule.tree_mut().finish_move(list).unwrap();
            removed.extend(batch_removed.into_iter().map(|(member, _)| member));

            let expected: Vec<String> = model.iter().map(|(_, label)| label.clone()).collect();
            prop_assert_eq!(rule.labels(list), expected.clone());
            if expected.is_empty() {
                prop_assert_eq!(rule.html(), "<!---->");
            } else {
                prop_assert_eq!(rule.html(), expected.concat());
            }
            let violations = rule.tree().invariant_violations(list);
            prop_assert!(violations.is_empty(), "{:?}", violations);
            rule.assert_mount_bounds(list);
        }

        for member in removed {
            prop_assert_eq!(rule.tree().stability(member), Stability::Destroyed);
        }
        for (member, _) in &model {
            prop_assert_eq!(rule.tree().stability(*member), Stability::Attached);
        }
    }
}
