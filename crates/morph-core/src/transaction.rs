//! Scoped tokens for the two bracketed protocols: an update pass on a morph
//! and a move transaction on a list.
//!
//! Each token borrows the tree mutably and dereferences to it, so the pass is
//! written against the token. Closing is explicit through `finish`; a token
//! that is dropped unfinished closes itself and logs a warning.

use std::ops::{Deref, DerefMut};

use crate::error::MorphError;
use crate::host::HostTree;
use crate::list::ListId;
use crate::morph::{MorphId, Stability};
use crate::tree::MorphTree;

pub struct UpdateTransaction<'a, H: HostTree> {
    tree: &'a mut MorphTree<H>,
    morph: MorphId,
    finished: bool,
}

impl<'a, H: HostTree> UpdateTransaction<'a, H> {
    pub fn morph(&self) -> MorphId {
        self.morph
    }

    /// Declares the morph unchanged.
    pub fn remained_stable(&mut self) -> Result<(), MorphError> {
        self.tree.remained_stable(self.morph)
    }

    pub fn finish(mut self) -> Result<(), MorphError> {
        self.finished = true;
        self.tree.finish_append(self.morph)
    }
}

impl<H: HostTree> Deref for UpdateTransaction<'_, H> {
    type Target = MorphTree<H>;

    fn deref(&self) -> &MorphTree<H> {
        self.tree
    }
}

impl<H: HostTree> DerefMut for UpdateTransaction<'_, H> {
    fn deref_mut(&mut self) -> &mut MorphTree<H> {
        self.tree
    }
}

impl<H: HostTree> Drop for UpdateTransaction<'_, H> {
    fn drop(&mut self) {
        if self.finished {
            return;
        }
        log::warn!("update of morph {} dropped without finish", self.morph);
        // Nothing was decided, so nothing changed.
        if self.tree.stability(self.morph) == Stability::Updating {
            let _ = self.tree.remained_stable(self.morph);
        }
        if let Err(err) = self.tree.finish_append(self.morph) {
            log::error!("closing dropped update of morph {}: {err}", self.morph);
        }
    }
}

pub struct MoveTransaction<'a, H: HostTree> {
    tree: &'a mut MorphTree<H>,
    list: ListId,
    finished: bool,
}

impl<'a, H: HostTree> MoveTransaction<'a, H> {
    pub fn list(&self) -> ListId {
        self.list
    }

    /// Appends `morph` at the end of the list.
    pub fn append(&mut self, morph: MorphId) -> Result<(), MorphError> {
        self.tree.insert_before_morph(self.list, morph, None)
    }

    pub fn insert_before(
        &mut self,
        morph: MorphId,
        reference: Option<MorphId>,
    ) -> Result<(), MorphError> {
        self.tree.insert_before_morph(self.list, morph, reference)
    }

    pub fn remove(&mut self, morph: MorphId) -> Result<(), MorphError> {
        self.tree.remove_child_morph(self.list, morph)
    }

    pub fn finish(mut self) -> Result<(), MorphError> {
        self.finished = true;
        self.tree.finish_move(self.list)
    }
}

impl<H: HostTree> Deref for MoveTransaction<'_, H> {
    type Target = MorphTree<H>;

    fn deref(&self) -> &MorphTree<H> {
        self.tree
    }
}

impl<H: HostTree> DerefMut for MoveTransaction<'_, H> {
    fn deref_mut(&mut self) -> &mut MorphTree<H> {
        self.tree
    }
}

impl<H: HostTree> Drop for MoveTransaction<'_, H> {
    fn drop(&mut self) {
        if self.finished {
            return;
        }
        log::warn!("move on list {} dropped without finish", self.list);
        if let Err(err) = self.tree.finish_move(self.list) {
            log::error!("closing dropped move on list {}: {err}", self.list);
        }
    }
}

impl<H: HostTree> MorphTree<H> {
    /// Opens an update pass on `morph` and returns a token that closes it.
    pub fn begin_update(&mut self, morph: MorphId) -> Result<UpdateTransaction<'_, H>, MorphError> {
        self.expect_update(morph)?;
        Ok(UpdateTransaction {
            tree: self,
            morph,
            finished: false,
        })
    }

    /// Opens a move transaction on `list` and returns a token that closes it.
    pub fn begin_move_transaction(
        &mut self,
        list: ListId,
    ) -> Result<MoveTransaction<'_, H>, MorphError> {
        self.begin_move(list)?;
        Ok(MoveTransaction {
            tree: self,
            list,
            finished: false,
        })
    }
}
