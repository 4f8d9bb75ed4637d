use crate::morph::MorphId;

/// Lifecycle callbacks attached to a morph through [`crate::MorphOptions`].
///
/// `will_clear`/`did_clear` bracket every operation that throws away the
/// content of a morph that already had some. `will_destroy` runs before the
/// morph is unlinked and `did_destroy` after its nodes left the host tree.
/// The unmount pair brackets the unmounting of a mounted list.
pub trait MorphObserver {
    fn will_clear(&self, _morph: MorphId) {}
    fn did_clear(&self, _morph: MorphId) {}
    fn will_destroy(&self, _morph: MorphId) {}
    fn did_destroy(&self, _morph: MorphId) {}
    fn will_unmount(&self, _morph: MorphId) {}
    fn did_unmount(&self, _morph: MorphId) {}
}
