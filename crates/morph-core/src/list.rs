//! Ordered, mountable collections of sibling morphs.
//!
//! A list is a doubly linked chain of member morphs threaded through the
//! arena. While the mount point is still appending, members are spliced in
//! directly. Once it is attached, every reorder, insertion and removal has to
//! happen inside a move transaction (`begin_move` .. `finish_move`), which
//! buffers removals and fixes the mount point's boundaries once at the end.

use std::fmt;

use crate::collections::OrderedSet;
use crate::error::{MorphError, Subject};
use crate::host::{HostTree, NodeId};
use crate::morph::{ContentState, Morph, MorphId, Stability};
use crate::range;
use crate::tree::MorphTree;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListId(pub(crate) usize);

impl ListId {
    #[inline]
    pub fn raw(self) -> usize {
        self.0
    }
}

impl fmt::Display for ListId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "L{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListStability {
    Detached,
    Appending,
    Attached,
    Moving,
    Destroyed,
}

impl ListStability {
    pub fn as_str(self) -> &'static str {
        match self {
            ListStability::Detached => "detached",
            ListStability::Appending => "appending",
            ListStability::Attached => "attached",
            ListStability::Moving => "moving",
            ListStability::Destroyed => "destroyed",
        }
    }
}

/// Where the list ends inside the host tree, captured when a move
/// transaction begins.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct MoveAnchor {
    pub(crate) parent: NodeId,
    pub(crate) next: Option<NodeId>,
    /// Placeholder standing in for an empty list.
    pub(crate) placeholder: Option<NodeId>,
}

#[derive(Debug)]
pub struct MorphList {
    pub(crate) first_child_morph: Option<MorphId>,
    pub(crate) last_child_morph: Option<MorphId>,
    pub(crate) parent_morph: Option<MorphId>,
    pub(crate) stability: ListStability,
    pub(crate) content_state: ContentState,
    pub(crate) removals: OrderedSet<MorphId>,
    pub(crate) anchor: Option<MoveAnchor>,
    pub(crate) len: usize,
}

impl MorphList {
    pub(crate) fn new() -> Self {
        Self {
            first_child_morph: None,
            last_child_morph: None,
            parent_morph: None,
            stability: ListStability::Detached,
            content_state: ContentState::Blank,
            removals: OrderedSet::default(),
            anchor: None,
            len: 0,
        }
    }

    pub fn first_child_morph(&self) -> Option<MorphId> {
        self.first_child_morph
    }

    pub fn last_child_morph(&self) -> Option<MorphId> {
        self.last_child_morph
    }

    /// The morph this list is mounted on.
    pub fn parent_morph(&self) -> Option<MorphId> {
        self.parent_morph
    }

    pub fn stability(&self) -> ListStability {
        self.stability
    }

    pub fn content_state(&self) -> ContentState {
        self.content_state
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Members removed during the current move transaction, in removal order.
    pub fn pending_removals(&self) -> impl Iterator<Item = MorphId> + '_ {
        self.removals.iter().copied()
    }
}

/// Iterator over the members of a list, first to last.
pub struct ChildMorphs<'a> {
    morphs: &'a [Option<Morph>],
    next: Option<MorphId>,
}

impl<'a> ChildMorphs<'a> {
    pub(crate) fn new(morphs: &'a [Option<Morph>], first: Option<MorphId>) -> Self {
        Self { morphs, next: first }
    }
}

impl Iterator for ChildMorphs<'_> {
    type Item = MorphId;

    fn next(&mut self) -> Option<MorphId> {
        let current = self.next?;
        self.next = self
            .morphs
            .get(current.0)
            .and_then(Option::as_ref)
            .and_then(|morph| morph.next_morph);
        Some(current)
    }
}

impl<H: HostTree> MorphTree<H> {
    /// Mounts `list` on `morph`; see [`MorphTree::set_morph_list`].
    pub fn mount_list(&mut self, list: ListId, morph: MorphId) -> Result<(), MorphError> {
        self.set_morph_list(morph, list)
    }

    /// Unmounts `list` from its mount point; see [`MorphTree::unmount_child`].
    pub fn unmount_list(&mut self, list: ListId) -> Result<NodeId, MorphError> {
        const OP: &str = "unmount a list";
        let entry = self.list_ref(list, OP)?;
        let Some(mount) = entry.parent_morph else {
            return Err(MorphError::state(
                Subject::List(list),
                OP,
                "a mounted list",
                entry.stability.as_str(),
            ));
        };
        self.unmount_child(mount)
    }

    /// Prepares a blank, detached morph to become a member of `list`. Its
    /// content will land at the list's current tail.
    pub fn init_for_appending_to_list(
        &mut self,
        morph: MorphId,
        list: ListId,
    ) -> Result<(), MorphError> {
        const OP: &str = "append into a list";
        let entry = self.morph_ref(morph, OP)?;
        if entry.stability != Stability::Detached || entry.content_state != ContentState::Blank {
            return Err(MorphError::state(
                Subject::Morph(morph),
                OP,
                "a blank, detached morph",
                entry.stability.as_str(),
            ));
        }
        let (parent, next) = self.list_tail(list, OP)?;
        self.morph_mut(morph, OP)?.begin_appending_at(parent, next);
        Ok(())
    }

    /// Host position right after the list's last member.
    fn list_tail(
        &self,
        list: ListId,
        operation: &'static str,
    ) -> Result<(Option<NodeId>, Option<NodeId>), MorphError> {
        let entry = self.list_ref(list, operation)?;
        let Some(mount) = entry.parent_morph else {
            return Err(MorphError::state(
                Subject::List(list),
                operation,
                "a mounted list",
                entry.stability.as_str(),
            ));
        };
        if let Some(anchor) = entry.anchor.filter(|_| entry.stability == ListStability::Moving) {
            return Ok((Some(anchor.parent), anchor.next));
        }
        let mount_entry = self.morph_ref(mount, operation)?;
        if mount_entry.stability == Stability::Appending {
            return Ok((mount_entry.append_parent, mount_entry.next_sibling));
        }
        match mount_entry.last_node {
            Some(last) => Ok((self.host.parent(last), self.host.next_sibling(last))),
            None => Err(MorphError::state(
                Subject::Morph(mount),
                operation,
                "a mount point with nodes",
                mount_entry.stability.as_str(),
            )),
        }
    }

    /// Appends `morph` at the end of `list`.
    pub fn append_morph(&mut self, list: ListId, morph: MorphId) -> Result<(), MorphError> {
        self.insert_before_morph(list, morph, None)
    }

    /// Inserts `morph` into `list` in front of `reference`, or at the end.
    ///
    /// While the mount point is appending this only splices the chain and
    /// retargets the morph's insertion point. Inside a move transaction the
    /// morph may also come from elsewhere in this list or from another list
    /// that is itself moving; its nodes are moved into place right away.
    pub fn insert_before_morph(
        &mut self,
        list: ListId,
        morph: MorphId,
        reference: Option<MorphId>,
    ) -> Result<(), MorphError> {
        const OP: &str = "insert a morph into a list";
        let entry = self.list_ref(list, OP)?;
        let list_stability = entry.stability;
        let Some(mount) = entry.parent_morph else {
            return Err(MorphError::state(
                Subject::List(list),
                OP,
                "a mounted list",
                list_stability.as_str(),
            ));
        };
        if reference == Some(morph) {
            return Err(MorphError::state(
                Subject::Morph(morph),
                OP,
                "a reference other than the inserted morph",
                "the same morph",
            ));
        }
        if let Some(reference) = reference {
            if self.morph_ref(reference, OP)?.owner_list != Some(list) {
                return Err(MorphError::state(
                    Subject::Morph(reference),
                    OP,
                    "a reference inside the target list",
                    "a morph outside it",
                ));
            }
        }
        let entry = self.morph_ref(morph, OP)?;
        if entry.stability == Stability::Detached && entry.content_state == ContentState::Blank {
            self.init_for_appending_to_list(morph, list)?;
        }
        if self.morph_ref(mount, OP)?.stability == Stability::Appending {
            return self.splice_while_building(list, morph, reference);
        }
        if list_stability != ListStability::Moving {
            return Err(MorphError::state(
                Subject::List(list),
                OP,
                "a list inside a move transaction",
                list_stability.as_str(),
            ));
        }
        let entry = self.morph_ref(morph, OP)?;
        if entry.stability == Stability::Appending {
            let is_blank = entry.first_node.is_none();
            if entry.owner_list == Some(list) {
                self.unlink_member(list, morph)?;
            }
            let (parent, next) = self.moving_insertion_point(list, reference, OP)?;
            if !is_blank {
                // Nodes already written follow the member to its new position.
                let (first, last) = self.endpoints(morph, OP)?;
                match self.host.parent(first) {
                    Some(_) => {
                        range::insert_range_before(&mut self.host, parent, first, last, next)
                    }
                    None => self.host.insert_before(parent, first, next),
                }
            }
            self.morph_mut(morph, OP)?.begin_appending_at(Some(parent), next);
            return self.link(list, morph, reference);
        }
        self.relocate(list, morph, reference)
    }

    fn splice_while_building(
        &mut self,
        list: ListId,
        morph: MorphId,
        reference: Option<MorphId>,
    ) -> Result<(), MorphError> {
        const OP: &str = "append a morph while building a list";
        let entry = self.list_ref(list, OP)?;
        if entry.stability != ListStability::Appending || entry.content_state == ContentState::EmptyList
        {
            return Err(MorphError::state(
                Subject::List(list),
                OP,
                "a list that is still being built",
                entry.stability.as_str(),
            ));
        }
        let entry = self.morph_ref(morph, OP)?;
        if entry.stability != Stability::Appending || entry.first_node.is_some() {
            return Err(MorphError::state(
                Subject::Morph(morph),
                OP,
                "a blank, appending morph",
                entry.stability.as_str(),
            ));
        }
        if entry.owner_list.is_some() || entry.parent_morph.is_some() {
            return Err(MorphError::state(
                Subject::Morph(morph),
                OP,
                "a morph outside any list",
                "a nested morph",
            ));
        }
        if let Some(reference) = reference {
            self.prepare_for_inserting_before_morph(morph, reference)?;
        }
        self.link(list, morph, reference)
    }

    fn moving_insertion_point(
        &self,
        list: ListId,
        reference: Option<MorphId>,
        operation: &'static str,
    ) -> Result<(NodeId, Option<NodeId>), MorphError> {
        match reference {
            Some(reference) => {
                let (first, _) = self.endpoints(reference, operation)?;
                match self.host.parent(first) {
                    Some(parent) => Ok((parent, Some(first))),
                    None => Err(MorphError::state(
                        Subject::Morph(reference),
                        operation,
                        "a reference connected to the host tree",
                        "disconnected",
                    )),
                }
            }
            None => {
                let entry = self.list_ref(list, operation)?;
                entry
                    .anchor
                    .map(|anchor| (anchor.parent, anchor.next))
                    .ok_or(MorphError::state(
                        Subject::List(list),
                        operation,
                        "a list inside a move transaction",
                        entry.stability.as_str(),
                    ))
            }
        }
    }

    /// Moves an existing morph's nodes into `list` and links it.
    fn relocate(
        &mut self,
        list: ListId,
        morph: MorphId,
        reference: Option<MorphId>,
    ) -> Result<(), MorphError> {
        const OP: &str = "move a morph into a list";
        let entry = self.morph_ref(morph, OP)?;
        match entry.owner_list {
            Some(owner) if owner == list => self.unlink_member(list, morph)?,
            Some(owner) => {
                let stability = self.list_ref(owner, OP)?.stability;
                if stability != ListStability::Moving {
                    return Err(MorphError::state(
                        Subject::List(owner),
                        OP,
                        "a source list inside a move transaction",
                        stability.as_str(),
                    ));
                }
                self.remove_child_morph(owner, morph)?;
            }
            None if entry.parent_morph.is_some() => {
                return Err(MorphError::state(
                    Subject::Morph(morph),
                    OP,
                    "a morph that is not a fixed child",
                    "a fixed child",
                ));
            }
            None => {}
        }
        let (parent, reference_node) = self.moving_insertion_point(list, reference, OP)?;
        let entry = self.morph_ref(morph, OP)?;
        match (entry.stability, entry.content_state) {
            (Stability::Detached, ContentState::Fragment) => {
                self.insert_fragment(morph, parent, reference_node, OP)?;
            }
            (Stability::Detached, ContentState::Contents | ContentState::Comment)
            | (
                Stability::Attached | Stability::Moving | Stability::Updating | Stability::WasStable,
                _,
            ) => {
                let (first, last) = self.endpoints(morph, OP)?;
                match self.host.parent(first) {
                    Some(_) => range::insert_range_before(
                        &mut self.host,
                        parent,
                        first,
                        last,
                        reference_node,
                    ),
                    None => self.host.insert_before(parent, first, reference_node),
                }
                // A span that already sat right at the tail pushes the anchor
                // past itself.
                if reference.is_none() && reference_node == Some(first) {
                    let next = self.host.next_sibling(last);
                    if let Some(anchor) = self.list_mut(list, OP)?.anchor.as_mut() {
                        anchor.next = next;
                    }
                }
            }
            (stability, _) => {
                return Err(MorphError::state(
                    Subject::Morph(morph),
                    OP,
                    "a morph with settled content",
                    stability.as_str(),
                ));
            }
        }
        let entry = self.morph_mut(morph, OP)?;
        if matches!(entry.stability, Stability::Detached | Stability::Moving) {
            entry.stability = Stability::Attached;
        }
        self.link(list, morph, reference)
    }

    /// Splices `morph` into the chain before `reference` and recomputes the
    /// boundary flags it and its neighbours carry.
    fn link(
        &mut self,
        list: ListId,
        morph: MorphId,
        reference: Option<MorphId>,
    ) -> Result<(), MorphError> {
        const OP: &str = "link a list member";
        let entry = self.list_ref(list, OP)?;
        let mount = entry.parent_morph;
        let previous = match reference {
            Some(reference) => self.morph_ref(reference, OP)?.previous_morph,
            None => entry.last_child_morph,
        };
        {
            let entry = self.morph_mut(morph, OP)?;
            entry.previous_morph = previous;
            entry.next_morph = reference;
            entry.owner_list = Some(list);
            entry.parent_morph = mount;
            entry.front_boundary = previous.is_none();
            entry.back_boundary = reference.is_none();
        }
        match previous {
            Some(previous) => {
                let entry = self.morph_mut(previous, OP)?;
                entry.next_morph = Some(morph);
                entry.back_boundary = false;
            }
            None => self.list_mut(list, OP)?.first_child_morph = Some(morph),
        }
        match reference {
            Some(reference) => {
                let entry = self.morph_mut(reference, OP)?;
                entry.previous_morph = Some(morph);
                entry.front_boundary = false;
            }
            None => self.list_mut(list, OP)?.last_child_morph = Some(morph),
        }
        self.list_mut(list, OP)?.len += 1;
        Ok(())
    }

    /// Removes `morph` from the chain without touching the host tree.
    pub(crate) fn unlink_member(&mut self, list: ListId, morph: MorphId) -> Result<(), MorphError> {
        const OP: &str = "unlink a list member";
        let entry = self.morph_ref(morph, OP)?;
        if entry.owner_list != Some(list) {
            return Err(MorphError::state(
                Subject::Morph(morph),
                OP,
                "a member of the list",
                "a morph outside it",
            ));
        }
        let (previous, next) = (entry.previous_morph, entry.next_morph);
        match previous {
            Some(previous) => {
                let entry = self.morph_mut(previous, OP)?;
                entry.next_morph = next;
                entry.back_boundary = next.is_none();
            }
            None => self.list_mut(list, OP)?.first_child_morph = next,
        }
        match next {
            Some(next) => {
                let entry = self.morph_mut(next, OP)?;
                entry.previous_morph = previous;
                entry.front_boundary = previous.is_none();
            }
            None => self.list_mut(list, OP)?.last_child_morph = previous,
        }
        let entry = self.morph_mut(morph, OP)?;
        entry.previous_morph = None;
        entry.next_morph = None;
        entry.owner_list = None;
        entry.parent_morph = None;
        entry.front_boundary = false;
        entry.back_boundary = false;
        let entry = self.list_mut(list, OP)?;
        entry.len = entry.len.saturating_sub(1);
        Ok(())
    }

    /// Unlinks a member inside a move transaction. Its nodes stay where they
    /// are until the transaction closes; it is destroyed then unless it was
    /// reinserted somewhere first.
    pub fn remove_child_morph(&mut self, list: ListId, morph: MorphId) -> Result<(), MorphError> {
        const OP: &str = "remove a morph from a list";
        let stability = self.list_ref(list, OP)?.stability;
        if stability != ListStability::Moving {
            return Err(MorphError::state(
                Subject::List(list),
                OP,
                "a list inside a move transaction",
                stability.as_str(),
            ));
        }
        self.unlink_member(list, morph)?;
        self.morph_mut(morph, OP)?.stability = Stability::Moving;
        self.list_mut(list, OP)?.removals.insert(morph);
        log::trace!("morph {morph} removed from list {list}");
        Ok(())
    }

    /// Opens a move transaction on an attached list.
    pub fn begin_move(&mut self, list: ListId) -> Result<(), MorphError> {
        const OP: &str = "begin a move";
        let entry = self.list_ref(list, OP)?;
        if entry.stability != ListStability::Attached {
            return Err(MorphError::state(
                Subject::List(list),
                OP,
                "an attached list",
                entry.stability.as_str(),
            ));
        }
        let Some(mount) = entry.parent_morph else {
            return Err(MorphError::state(
                Subject::List(list),
                OP,
                "a mounted list",
                entry.stability.as_str(),
            ));
        };
        let mount_entry = self.morph_ref(mount, OP)?;
        let Some(last) = mount_entry.last_node else {
            return Err(MorphError::state(
                Subject::Morph(mount),
                OP,
                "a mount point with nodes",
                mount_entry.stability.as_str(),
            ));
        };
        let Some(parent) = self.host.parent(last) else {
            return Err(MorphError::state(
                Subject::Morph(mount),
                OP,
                "a mount point connected to the host tree",
                "disconnected",
            ));
        };
        let placeholder = match mount_entry.content_state {
            ContentState::EmptyList => mount_entry.first_node,
            _ => None,
        };
        let anchor = MoveAnchor {
            parent,
            next: self.host.next_sibling(last),
            placeholder,
        };
        let entry = self.list_mut(list, OP)?;
        entry.anchor = Some(anchor);
        entry.removals.clear();
        entry.stability = ListStability::Moving;
        log::trace!("list {list} began a move");
        Ok(())
    }

    /// Closes a move transaction: fixes the mount point's boundaries, swaps
    /// between the placeholder and real members, and destroys every removed
    /// morph that was not reinserted.
    pub fn finish_move(&mut self, list: ListId) -> Result<(), MorphError> {
        const OP: &str = "finish a move";
        let entry = self.list_ref(list, OP)?;
        if entry.stability != ListStability::Moving {
            return Err(MorphError::state(
                Subject::List(list),
                OP,
                "a list inside a move transaction",
                entry.stability.as_str(),
            ));
        }
        let (mount, anchor) = match (entry.parent_morph, entry.anchor) {
            (Some(mount), Some(anchor)) => (mount, anchor),
            _ => {
                return Err(MorphError::state(
                    Subject::List(list),
                    OP,
                    "a mounted list with a move anchor",
                    entry.stability.as_str(),
                ));
            }
        };
        let members: Vec<MorphId> = self.children(list).collect();
        for member in &members {
            let entry = self.morph_ref(*member, OP)?;
            if entry.first_node.is_none() {
                return Err(MorphError::state(
                    Subject::Morph(*member),
                    OP,
                    "members that produced nodes",
                    entry.stability.as_str(),
                ));
            }
        }
        match (members.first(), members.last()) {
            (Some(&first_member), Some(&last_member)) => {
                if let Some(placeholder) = anchor.placeholder {
                    if let Some(parent) = self.host.parent(placeholder) {
                        self.host.remove_child(parent, placeholder);
                    }
                }
                let (first, _) = self.endpoints(first_member, OP)?;
                let (_, last) = self.endpoints(last_member, OP)?;
                self.list_mut(list, OP)?.content_state = ContentState::List;
                self.morph_mut(mount, OP)?.content_state = ContentState::List;
                self.update_first_node(mount, first)?;
                self.update_last_node(mount, last)?;
            }
            _ => {
                let placeholder = match anchor.placeholder {
                    Some(placeholder) if self.host.parent(placeholder).is_some() => placeholder,
                    _ => {
                        let placeholder = self.host.create_comment(&self.config.placeholder_text);
                        self.host.insert_before(anchor.parent, placeholder, anchor.next);
                        placeholder
                    }
                };
                self.list_mut(list, OP)?.content_state = ContentState::EmptyList;
                self.morph_mut(mount, OP)?.content_state = ContentState::EmptyList;
                self.update_first_node(mount, placeholder)?;
                self.update_last_node(mount, placeholder)?;
            }
        }
        let removals = {
            let entry = self.list_mut(list, OP)?;
            entry.stability = ListStability::Attached;
            entry.anchor = None;
            std::mem::take(&mut entry.removals)
        };
        let mut destroyed = 0;
        for removed in removals {
            let pending = self.morph(removed).is_some_and(|entry| {
                entry.owner_list.is_none() && entry.stability == Stability::Moving
            });
            if pending {
                self.teardown(removed, true)?;
                destroyed += 1;
            }
        }
        log::debug!(
            "list {list} finished a move: {} members, {destroyed} destroyed",
            members.len()
        );
        if self.config.verify_invariants {
            for violation in self.invariant_violations(list) {
                log::error!("list {list}: {violation}");
            }
        }
        Ok(())
    }

    /// Closes the initial append of a list. An empty list leaves the mount
    /// point to install a placeholder when it finishes appending.
    pub fn finish_list_append(&mut self, list: ListId) -> Result<(), MorphError> {
        const OP: &str = "finish appending a list";
        let entry = self.list_ref(list, OP)?;
        if entry.stability != ListStability::Appending {
            return Err(MorphError::state(
                Subject::List(list),
                OP,
                "an appending list",
                entry.stability.as_str(),
            ));
        }
        let Some(mount) = entry.parent_morph else {
            return Err(MorphError::state(
                Subject::List(list),
                OP,
                "a mounted list",
                entry.stability.as_str(),
            ));
        };
        let members: Vec<MorphId> = self.children(list).collect();
        for member in &members {
            let entry = self.morph_ref(*member, OP)?;
            if entry.first_node.is_none() || entry.stability == Stability::Appending {
                return Err(MorphError::state(
                    Subject::Morph(*member),
                    OP,
                    "members that finished appending",
                    entry.stability.as_str(),
                ));
            }
        }
        match (members.first(), members.last()) {
            (Some(&first_member), Some(&last_member)) => {
                let (first, _) = self.endpoints(first_member, OP)?;
                let (_, last) = self.endpoints(last_member, OP)?;
                let entry = self.morph_mut(mount, OP)?;
                entry.first_node = Some(first);
                entry.last_node = Some(last);
                let entry = self.list_mut(list, OP)?;
                entry.stability = ListStability::Attached;
                entry.content_state = ContentState::List;
            }
            _ => {
                self.list_mut(list, OP)?.content_state = ContentState::EmptyList;
                self.morph_mut(mount, OP)?.content_state = ContentState::EmptyList;
            }
        }
        log::trace!("list {list} finished appending {} members", members.len());
        Ok(())
    }

    /// Orphans every member of a list that is not attached yet and returns
    /// them in order. Their nodes are left alone.
    pub fn clear_list(&mut self, list: ListId) -> Result<Vec<MorphId>, MorphError> {
        const OP: &str = "clear a list";
        let stability = self.list_ref(list, OP)?.stability;
        if !matches!(stability, ListStability::Detached | ListStability::Appending) {
            return Err(MorphError::state(
                Subject::List(list),
                OP,
                "a detached or appending list",
                stability.as_str(),
            ));
        }
        self.detach_members(list)
    }

    pub(crate) fn detach_members(&mut self, list: ListId) -> Result<Vec<MorphId>, MorphError> {
        const OP: &str = "detach list members";
        let members: Vec<MorphId> = self.children(list).collect();
        for member in &members {
            let entry = self.morph_mut(*member, OP)?;
            entry.previous_morph = None;
            entry.next_morph = None;
            entry.owner_list = None;
            entry.parent_morph = None;
            entry.front_boundary = false;
            entry.back_boundary = false;
        }
        let entry = self.list_mut(list, OP)?;
        entry.first_child_morph = None;
        entry.last_child_morph = None;
        entry.len = 0;
        Ok(members)
    }

    /// Orphans the members and unbinds the list from its mount point.
    pub(crate) fn detach_list(&mut self, list: ListId) -> Result<Vec<MorphId>, MorphError> {
        const OP: &str = "detach a list";
        let members = self.detach_members(list)?;
        let entry = self.list_mut(list, OP)?;
        let mount = entry.parent_morph.take();
        entry.stability = ListStability::Detached;
        entry.content_state = ContentState::Blank;
        entry.removals.clear();
        entry.anchor = None;
        if let Some(mount) = mount {
            self.morph_mut(mount, OP)?.child_morph_list = None;
        }
        Ok(members)
    }
}

#[cfg(test)]
#[path = "tests/list_tests.rs"]
mod tests;

