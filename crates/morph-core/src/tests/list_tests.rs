use super::*;
use crate::invariants::InvariantViolation;
use crate::memory::MemoryHost;
use crate::morph::MorphOptions;

fn setup() -> (MorphTree<MemoryHost>, NodeId) {
    let mut host = MemoryHost::new();
    let root = host.create_element("ul");
    (MorphTree::new(host), root)
}

fn build_list(
    tree: &mut MorphTree<MemoryHost>,
    root: NodeId,
    labels: &[&str],
) -> (MorphId, ListId, Vec<MorphId>) {
    let mount = tree.create_morph(MorphOptions::default());
    tree.init_for_appending_to_element(mount, root).unwrap();
    let list = tree.create_list();
    tree.mount_list(list, mount).unwrap();
    let mut members = Vec::new();
    for label in labels {
        let member = tree.create_morph(MorphOptions::default());
        tree.append_morph(list, member).unwrap();
        tree.set_content(member, *label).unwrap();
        tree.finish_append(member).unwrap();
        members.push(member);
    }
    tree.finish_list_append(list).unwrap();
    tree.finish_append(mount).unwrap();
    (mount, list, members)
}

fn html(tree: &MorphTree<MemoryHost>, root: NodeId) -> String {
    tree.host().inner_html(root)
}

fn members(tree: &MorphTree<MemoryHost>, list: ListId) -> Vec<MorphId> {
    tree.children(list).collect()
}

#[test]
fn built_list_links_members_in_order() {
    let (mut tree, root) = setup();
    let (mount, list, m) = build_list(&mut tree, root, &["a", "b", "c"]);

    assert_eq!(html(&tree, root), "abc");
    assert_eq!(members(&tree, list), m);
    assert_eq!(tree.list(list).unwrap().len(), 3);
    assert_eq!(tree.list_stability(list), ListStability::Attached);
    assert!(tree.morph(m[0]).unwrap().front_boundary());
    assert!(!tree.morph(m[1]).unwrap().front_boundary());
    assert!(tree.morph(m[2]).unwrap().back_boundary());

    let mount_entry = tree.morph(mount).unwrap();
    assert_eq!(mount_entry.content_state(), ContentState::List);
    assert_eq!(mount_entry.first_node(), tree.morph(m[0]).unwrap().first_node());
    assert_eq!(mount_entry.last_node(), tree.morph(m[2]).unwrap().last_node());
    assert!(tree.invariant_violations(list).is_empty());
}

#[test]
fn empty_list_renders_a_placeholder() {
    let (mut tree, root) = setup();
    let (mount, list, _) = build_list(&mut tree, root, &[]);

    assert_eq!(
        tree.morph(mount).unwrap().content_state(),
        ContentState::EmptyList
    );
    assert_eq!(tree.list(list).unwrap().content_state(), ContentState::EmptyList);
    assert_eq!(tree.list_stability(list), ListStability::Attached);
    assert_eq!(html(&tree, root), "<!---->");
}

#[test]
fn reorder_moves_nodes_and_mount_bounds() {
    let (mut tree, root) = setup();
    let (mount, list, m) = build_list(&mut tree, root, &["a", "b", "c"]);

    tree.begin_move(list).unwrap();
    tree.insert_before_morph(list, m[2], Some(m[0])).unwrap();
    tree.finish_move(list).unwrap();

    assert_eq!(html(&tree, root), "cab");
    assert_eq!(members(&tree, list), vec![m[2], m[0], m[1]]);
    assert_eq!(
        tree.morph(mount).unwrap().first_node(),
        tree.morph(m[2]).unwrap().first_node()
    );
    assert!(tree.morph(m[1]).unwrap().back_boundary());
    assert!(tree.invariant_violations(list).is_empty());
}

#[test]
fn reversing_by_appending_in_reverse() {
    let (mut tree, root) = setup();
    let (_, list, m) = build_list(&mut tree, root, &["a", "b", "c"]);

    tree.begin_move(list).unwrap();
    for member in m.iter().rev() {
        tree.append_morph(list, *member).unwrap();
    }
    tree.finish_move(list).unwrap();

    assert_eq!(html(&tree, root), "cba");
    assert!(tree.invariant_violations(list).is_empty());
}

#[test]
fn removal_is_deferred_until_finish() {
    let (mut tree, root) = setup();
    let (_, list, m) = build_list(&mut tree, root, &["a", "b", "c"]);

    tree.begin_move(list).unwrap();
    tree.remove_child_morph(list, m[1]).unwrap();

    assert_eq!(tree.stability(m[1]), Stability::Moving);
    assert_eq!(html(&tree, root), "abc");
    assert_eq!(members(&tree, list), vec![m[0], m[2]]);

    tree.finish_move(list).unwrap();

    assert_eq!(tree.stability(m[1]), Stability::Destroyed);
    assert_eq!(html(&tree, root), "ac");
    assert!(tree.invariant_violations(list).is_empty());
}

#[test]
fn removed_then_reinserted_member_survives() {
    let (mut tree, root) = setup();
    let (_, list, m) = build_list(&mut tree, root, &["a", "b", "c"]);

    tree.begin_move(list).unwrap();
    tree.remove_child_morph(list, m[1]).unwrap();
    tree.append_morph(list, m[1]).unwrap();
    tree.finish_move(list).unwrap();

    assert_eq!(tree.stability(m[1]), Stability::Attached);
    assert_eq!(html(&tree, root), "acb");
    assert_eq!(members(&tree, list), vec![m[0], m[2], m[1]]);
}

#[test]
fn removals_are_reported_in_order() {
    let (mut tree, root) = setup();
    let (_, list, m) = build_list(&mut tree, root, &["a", "b", "c"]);

    tree.begin_move(list).unwrap();
    tree.remove_child_morph(list, m[2]).unwrap();
    tree.remove_child_morph(list, m[0]).unwrap();

    let pending: Vec<MorphId> = tree.list(list).unwrap().pending_removals().collect();
    assert_eq!(pending, vec![m[2], m[0]]);
    tree.finish_move(list).unwrap();
    assert_eq!(html(&tree, root), "b");
}

#[test]
fn attached_list_only_changes_inside_a_move() {
    let (mut tree, root) = setup();
    let (_, list, m) = build_list(&mut tree, root, &["a"]);
    let fresh = tree.create_morph(MorphOptions::default());

    assert!(tree.append_morph(list, fresh).unwrap_err().is_state_violation());
    assert!(tree
        .remove_child_morph(list, m[0])
        .unwrap_err()
        .is_state_violation());
    assert!(tree.finish_move(list).unwrap_err().is_state_violation());
}

#[test]
fn fresh_member_renders_at_its_position() {
    let (mut tree, root) = setup();
    let (_, list, m) = build_list(&mut tree, root, &["a", "b", "c"]);

    tree.begin_move(list).unwrap();
    let fresh = tree.create_morph(MorphOptions::default());
    tree.insert_before_morph(list, fresh, Some(m[1])).unwrap();
    tree.set_content(fresh, "x").unwrap();
    tree.finish_append(fresh).unwrap();
    tree.finish_move(list).unwrap();

    assert_eq!(html(&tree, root), "axbc");
    assert_eq!(members(&tree, list), vec![m[0], fresh, m[1], m[2]]);
    assert!(tree.invariant_violations(list).is_empty());
}

#[test]
fn unfinished_member_moves_with_the_content_it_already_wrote() {
    let (mut tree, root) = setup();
    let (mount, list, m) = build_list(&mut tree, root, &["a", "b"]);

    tree.begin_move(list).unwrap();
    let fresh = tree.create_morph(MorphOptions::default());
    tree.insert_before_morph(list, fresh, Some(m[0])).unwrap();
    tree.set_content(fresh, crate::content::SafeString::new("<i>1</i><i>2</i>"))
        .unwrap();
    tree.insert_before_morph(list, fresh, None).unwrap();
    assert_eq!(html(&tree, root), "ab<i>1</i><i>2</i>");

    tree.set_content(fresh, "y").unwrap();
    tree.finish_append(fresh).unwrap();
    tree.finish_move(list).unwrap();

    assert_eq!(html(&tree, root), "aby");
    assert_eq!(members(&tree, list), vec![m[0], m[1], fresh]);
    assert_eq!(
        tree.morph(mount).unwrap().last_node(),
        tree.morph(fresh).unwrap().last_node()
    );
    assert!(tree.invariant_violations(list).is_empty());
}

#[test]
fn emptying_a_list_installs_a_placeholder() {
    let (mut tree, root) = setup();
    let (mount, list, m) = build_list(&mut tree, root, &["a", "b"]);

    tree.begin_move(list).unwrap();
    for member in &m {
        tree.remove_child_morph(list, *member).unwrap();
    }
    tree.finish_move(list).unwrap();

    assert_eq!(html(&tree, root), "<!---->");
    assert_eq!(
        tree.morph(mount).unwrap().content_state(),
        ContentState::EmptyList
    );
    assert!(m.iter().all(|member| tree.stability(*member) == Stability::Destroyed));
}

#[test]
fn filling_an_empty_list_removes_the_placeholder() {
    let (mut tree, root) = setup();
    let (mount, list, _) = build_list(&mut tree, root, &[]);

    tree.begin_move(list).unwrap();
    let fresh = tree.create_morph(MorphOptions::default());
    tree.append_morph(list, fresh).unwrap();
    tree.set_content(fresh, "z").unwrap();
    tree.finish_append(fresh).unwrap();
    tree.finish_move(list).unwrap();

    assert_eq!(html(&tree, root), "z");
    assert_eq!(tree.morph(mount).unwrap().content_state(), ContentState::List);
    assert_eq!(
        tree.morph(mount).unwrap().first_node(),
        tree.morph(fresh).unwrap().first_node()
    );
}

#[test]
fn members_move_between_lists_in_transactions() {
    let (mut tree, root) = setup();
    let (_, left, l) = build_list(&mut tree, root, &["a", "b"]);
    let (right_mount, right, r) = build_list(&mut tree, root, &["c"]);

    tree.begin_move(left).unwrap();
    tree.begin_move(right).unwrap();
    tree.append_morph(right, l[0]).unwrap();
    tree.finish_move(left).unwrap();
    tree.finish_move(right).unwrap();

    assert_eq!(html(&tree, root), "bca");
    assert_eq!(members(&tree, left), vec![l[1]]);
    assert_eq!(members(&tree, right), vec![r[0], l[0]]);
    assert_eq!(tree.stability(l[0]), Stability::Attached);
    assert_eq!(tree.morph(l[0]).unwrap().parent_morph(), Some(right_mount));
    assert!(tree.invariant_violations(left).is_empty());
    assert!(tree.invariant_violations(right).is_empty());
}

#[test]
fn moving_from_a_list_outside_a_transaction_is_rejected() {
    let (mut tree, root) = setup();
    let (_, _left, l) = build_list(&mut tree, root, &["a", "b"]);
    let (_, right, _) = build_list(&mut tree, root, &["c"]);

    tree.begin_move(right).unwrap();
    let err = tree.append_morph(right, l[0]).unwrap_err();

    assert!(err.is_state_violation());
}

#[test]
fn adjacent_lists_hand_over_a_boundary_member() {
    let (mut tree, root) = setup();
    let (_, left, l) = build_list(&mut tree, root, &["a"]);
    let (_, right, r) = build_list(&mut tree, root, &["c", "d"]);

    tree.begin_move(left).unwrap();
    tree.begin_move(right).unwrap();
    tree.append_morph(left, r[0]).unwrap();
    let fresh = tree.create_morph(MorphOptions::default());
    tree.append_morph(left, fresh).unwrap();
    tree.set_content(fresh, "x").unwrap();
    tree.finish_append(fresh).unwrap();
    tree.finish_move(left).unwrap();
    tree.finish_move(right).unwrap();

    assert_eq!(html(&tree, root), "acxd");
    assert_eq!(members(&tree, left), vec![l[0], r[0], fresh]);
    assert_eq!(members(&tree, right), vec![r[1]]);
    assert!(tree.invariant_violations(left).is_empty());
    assert!(tree.invariant_violations(right).is_empty());
}

#[test]
fn destroying_a_member_keeps_the_list_consistent() {
    let (mut tree, root) = setup();
    let (mount, list, m) = build_list(&mut tree, root, &["a", "b", "c"]);

    tree.destroy(m[0]).unwrap();

    assert_eq!(html(&tree, root), "bc");
    assert_eq!(tree.list_stability(list), ListStability::Attached);
    assert_eq!(
        tree.morph(mount).unwrap().first_node(),
        tree.morph(m[1]).unwrap().first_node()
    );
    assert!(tree.morph(m[1]).unwrap().front_boundary());
    assert!(tree.invariant_violations(list).is_empty());
}

#[test]
fn destroying_the_mount_takes_the_list_along() {
    let (mut tree, root) = setup();
    let (mount, list, m) = build_list(&mut tree, root, &["a", "b"]);

    tree.destroy(mount).unwrap();

    assert_eq!(html(&tree, root), "");
    assert_eq!(tree.list_stability(list), ListStability::Destroyed);
    assert!(m.iter().all(|member| tree.stability(*member) == Stability::Destroyed));
}

#[test]
fn unmounting_leaves_a_placeholder_and_frees_the_list() {
    let (mut tree, root) = setup();
    let (mount, list, m) = build_list(&mut tree, root, &["a", "b"]);

    let placeholder = tree.unmount_list(list).unwrap();

    assert_eq!(html(&tree, root), "<!---->");
    assert_eq!(tree.morph(mount).unwrap().first_node(), Some(placeholder));
    assert_eq!(tree.morph(mount).unwrap().content_state(), ContentState::Comment);
    assert_eq!(tree.list_stability(list), ListStability::Detached);
    assert_eq!(tree.list(list).unwrap().parent_morph(), None);
    assert!(m.iter().all(|member| tree.stability(*member) == Stability::Destroyed));
}

#[test]
fn clearing_is_limited_to_lists_being_built() {
    let (mut tree, root) = setup();
    let (_, attached, _) = build_list(&mut tree, root, &["a"]);
    assert!(tree.clear_list(attached).unwrap_err().is_state_violation());

    let mount = tree.create_morph(MorphOptions::default());
    tree.init_for_appending_to_element(mount, root).unwrap();
    let list = tree.create_list();
    tree.mount_list(list, mount).unwrap();
    let first = tree.create_morph(MorphOptions::default());
    let second = tree.create_morph(MorphOptions::default());
    tree.append_morph(list, first).unwrap();
    tree.append_morph(list, second).unwrap();

    let cleared = tree.clear_list(list).unwrap();

    assert_eq!(cleared, vec![first, second]);
    assert!(tree.list(list).unwrap().is_empty());
    assert_eq!(tree.morph(first).unwrap().owner_list(), None);
}

#[test]
fn unfinished_members_block_list_completion() {
    let (mut tree, root) = setup();
    let mount = tree.create_morph(MorphOptions::default());
    tree.init_for_appending_to_element(mount, root).unwrap();
    let list = tree.create_list();
    tree.mount_list(list, mount).unwrap();
    let member = tree.create_morph(MorphOptions::default());
    tree.append_morph(list, member).unwrap();
    tree.set_content(member, "a").unwrap();

    assert!(tree.finish_list_append(list).unwrap_err().is_state_violation());
    assert!(tree.finish_append(mount).unwrap_err().is_state_violation());
}

#[test]
fn a_member_cannot_reference_itself() {
    let (mut tree, root) = setup();
    let (_, list, m) = build_list(&mut tree, root, &["a", "b"]);

    tree.begin_move(list).unwrap();
    let err = tree.insert_before_morph(list, m[0], Some(m[0])).unwrap_err();

    assert!(err.is_state_violation());
}

#[test]
fn mounting_requires_an_unmounted_list() {
    let (mut tree, root) = setup();
    let (_, list, _) = build_list(&mut tree, root, &["a"]);
    let other = tree.create_morph(MorphOptions::default());
    tree.init_for_appending_to_element(other, root).unwrap();

    let err = tree.mount_list(list, other).unwrap_err();

    assert!(matches!(
        err,
        MorphError::StateViolation {
            subject: Subject::List(_),
            ..
        }
    ));
}

#[test]
fn move_token_closes_the_transaction() {
    let (mut tree, root) = setup();
    let (_, list, m) = build_list(&mut tree, root, &["a", "b", "c"]);

    let mut txn = tree.begin_move_transaction(list).unwrap();
    txn.insert_before(m[2], Some(m[0])).unwrap();
    txn.remove(m[1]).unwrap();
    txn.finish().unwrap();

    assert_eq!(html(&tree, root), "ca");
    assert_eq!(tree.list_stability(list), ListStability::Attached);
}

#[test]
fn dropped_move_token_still_finishes() {
    let (mut tree, root) = setup();
    let (_, list, m) = build_list(&mut tree, root, &["a", "b"]);

    {
        let mut txn = tree.begin_move_transaction(list).unwrap();
        txn.remove(m[0]).unwrap();
    }

    assert_eq!(tree.list_stability(list), ListStability::Attached);
    assert_eq!(html(&tree, root), "b");
}

#[test]
fn corrupted_chains_are_reported() {
    let (mut tree, root) = setup();
    let (_, list, m) = build_list(&mut tree, root, &["a", "b"]);

    tree.lists[list.0].as_mut().unwrap().len = 5;
    tree.morphs[m[1].0].as_mut().unwrap().previous_morph = None;

    let violations = tree.invariant_violations(list);
    assert!(violations.contains(&InvariantViolation::LengthMismatch {
        list,
        recorded: 5,
        walked: 2,
    }));
    assert!(violations.contains(&InvariantViolation::BrokenBackLink {
        morph: m[1],
        expected: Some(m[0]),
        found: None,
    }));
}
