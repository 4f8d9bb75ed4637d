use std::fmt;

use crate::collections::map::HashSet;
use crate::host::HostTree;
use crate::list::{ListId, ListStability};
use crate::morph::MorphId;
use crate::tree::MorphTree;

/// A structural inconsistency found by [`MorphTree::invariant_violations`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvariantViolation {
    /// The chain points at a destroyed morph.
    DanglingMember { list: ListId, morph: MorphId },
    /// Walking `next` links revisits a member.
    Cycle { list: ListId, morph: MorphId },
    BrokenBackLink {
        morph: MorphId,
        expected: Option<MorphId>,
        found: Option<MorphId>,
    },
    /// A member whose owner is some other list, or none.
    ForeignMember { list: ListId, morph: MorphId },
    /// A member whose parent is not the list's mount point.
    WrongParent { list: ListId, morph: MorphId },
    LastMemberMismatch {
        list: ListId,
        expected: Option<MorphId>,
        found: Option<MorphId>,
    },
    LengthMismatch {
        list: ListId,
        recorded: usize,
        walked: usize,
    },
    BoundaryFlags { morph: MorphId },
    /// The mount point's first or last node differs from the members'.
    MountBounds { list: ListId },
    /// Two consecutive members are not adjacent in the host tree.
    NotAdjacent { morph: MorphId, next: MorphId },
}

impl fmt::Display for InvariantViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InvariantViolation::DanglingMember { list, morph } => {
                write!(f, "list {list} links destroyed morph {morph}")
            }
            InvariantViolation::Cycle { list, morph } => {
                write!(f, "list {list} revisits morph {morph}")
            }
            InvariantViolation::BrokenBackLink {
                morph,
                expected,
                found,
            } => write!(
                f,
                "morph {morph} has previous {found:?}, expected {expected:?}"
            ),
            InvariantViolation::ForeignMember { list, morph } => {
                write!(f, "morph {morph} is linked into list {list} but not owned by it")
            }
            InvariantViolation::WrongParent { list, morph } => {
                write!(f, "morph {morph} does not point at the mount point of list {list}")
            }
            InvariantViolation::LastMemberMismatch {
                list,
                expected,
                found,
            } => write!(
                f,
                "list {list} records last member {found:?}, chain ends at {expected:?}"
            ),
            InvariantViolation::LengthMismatch {
                list,
                recorded,
                walked,
            } => write!(f, "list {list} records {recorded} members, chain has {walked}"),
            InvariantViolation::BoundaryFlags { morph } => {
                write!(f, "morph {morph} has stale boundary flags")
            }
            InvariantViolation::MountBounds { list } => {
                write!(f, "mount point of list {list} does not span its members")
            }
            InvariantViolation::NotAdjacent { morph, next } => {
                write!(f, "morphs {morph} and {next} are not adjacent in the host tree")
            }
        }
    }
}

impl<H: HostTree> MorphTree<H> {
    /// Walks `list` and reports every broken structural invariant. Host
    /// adjacency and mount bounds are only checked on attached lists; the
    /// other checks hold in every phase.
    pub fn invariant_violations(&self, list: ListId) -> Vec<InvariantViolation> {
        let mut violations = Vec::new();
        let Some(entry) = self.list(list) else {
            return violations;
        };
        let attached = entry.stability == ListStability::Attached;
        let mut visited: HashSet<MorphId> = HashSet::default();
        let mut previous: Option<MorphId> = None;
        let mut current = entry.first_child_morph;
        let mut walked = 0;
        while let Some(id) = current {
            if !visited.insert(id) {
                violations.push(InvariantViolation::Cycle { list, morph: id });
                break;
            }
            let Some(morph) = self.morph(id) else {
                violations.push(InvariantViolation::DanglingMember { list, morph: id });
                break;
            };
            walked += 1;
            if morph.previous_morph != previous {
                violations.push(InvariantViolation::BrokenBackLink {
                    morph: id,
                    expected: previous,
                    found: morph.previous_morph,
                });
            }
            if morph.owner_list != Some(list) {
                violations.push(InvariantViolation::ForeignMember { list, morph: id });
            }
            if morph.parent_morph != entry.parent_morph {
                violations.push(InvariantViolation::WrongParent { list, morph: id });
            }
            if morph.front_boundary != previous.is_none()
                || morph.back_boundary != morph.next_morph.is_none()
            {
                violations.push(InvariantViolation::BoundaryFlags { morph: id });
            }
            if attached {
                if let Some(previous_id) = previous {
                    let previous_last = self.morph(previous_id).and_then(|m| m.last_node);
                    let adjacent = match (previous_last, morph.first_node) {
                        (Some(last), Some(first)) => self.host.next_sibling(last) == Some(first),
                        _ => false,
                    };
                    if !adjacent {
                        violations.push(InvariantViolation::NotAdjacent {
                            morph: previous_id,
                            next: id,
                        });
                    }
                }
            }
            previous = Some(id);
            current = morph.next_morph;
        }
        if previous != entry.last_child_morph && !violations.iter().any(is_chain_break) {
            violations.push(InvariantViolation::LastMemberMismatch {
                list,
                expected: previous,
                found: entry.last_child_morph,
            });
        }
        if walked != entry.len {
            violations.push(InvariantViolation::LengthMismatch {
                list,
                recorded: entry.len,
                walked,
            });
        }
        if attached {
            if let (Some(mount), Some(first), Some(last)) = (
                entry.parent_morph.and_then(|mount| self.morph(mount)),
                entry.first_child_morph.and_then(|id| self.morph(id)),
                entry.last_child_morph.and_then(|id| self.morph(id)),
            ) {
                if mount.first_node != first.first_node || mount.last_node != last.last_node {
                    violations.push(InvariantViolation::MountBounds { list });
                }
            }
        }
        violations
    }
}

fn is_chain_break(violation: &InvariantViolation) -> bool {
    matches!(
        violation,
        InvariantViolation::Cycle { .. } | InvariantViolation::DanglingMember { .. }
    )
}
