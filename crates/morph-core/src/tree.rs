use std::fmt;
use std::fmt::Write as _;

use crate::config::MorphTreeConfig;
use crate::error::{MorphError, Subject};
use crate::host::HostTree;
use crate::list::{ChildMorphs, ListId, ListStability, MorphList};
use crate::morph::{Morph, MorphId, MorphOptions, Stability};

#[derive(Debug, Clone, Copy)]
pub(crate) enum Hook {
    WillClear,
    DidClear,
    WillDestroy,
    DidDestroy,
    WillUnmount,
    DidUnmount,
}

/// Arena owning every morph and list of one host document, together with the
/// host itself.
///
/// Ids are never reused: once a morph or list is destroyed its id keeps
/// reporting [`Stability::Destroyed`] and every operation on it fails.
pub struct MorphTree<H: HostTree> {
    pub(crate) host: H,
    pub(crate) morphs: Vec<Option<Morph>>,
    pub(crate) lists: Vec<Option<MorphList>>,
    pub(crate) config: MorphTreeConfig,
}

impl<H: HostTree> MorphTree<H> {
    pub fn new(host: H) -> Self {
        Self::with_config(host, MorphTreeConfig::default())
    }

    pub fn with_config(host: H, config: MorphTreeConfig) -> Self {
        Self {
            host,
            morphs: Vec::new(),
            lists: Vec::new(),
            config,
        }
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    /// Direct access to the host. Mutating nodes that belong to a morph
    /// bypasses every invariant this crate maintains.
    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn into_host(self) -> H {
        self.host
    }

    pub fn config(&self) -> &MorphTreeConfig {
        &self.config
    }

    /// Creates a blank, detached morph.
    pub fn create_morph(&mut self, options: MorphOptions) -> MorphId {
        let id = MorphId(self.morphs.len());
        self.morphs.push(Some(Morph::new(options)));
        id
    }

    /// Creates an unmounted, empty list.
    pub fn create_list(&mut self) -> ListId {
        let id = ListId(self.lists.len());
        self.lists.push(Some(MorphList::new()));
        id
    }

    pub fn morph(&self, id: MorphId) -> Option<&Morph> {
        self.morphs.get(id.0).and_then(Option::as_ref)
    }

    pub fn list(&self, id: ListId) -> Option<&MorphList> {
        self.lists.get(id.0).and_then(Option::as_ref)
    }

    pub fn stability(&self, id: MorphId) -> Stability {
        self.morph(id)
            .map_or(Stability::Destroyed, |morph| morph.stability)
    }

    pub fn list_stability(&self, id: ListId) -> ListStability {
        self.list(id)
            .map_or(ListStability::Destroyed, |list| list.stability)
    }

    pub fn live_morph_count(&self) -> usize {
        self.morphs.iter().filter(|morph| morph.is_some()).count()
    }

    /// Iterates the members of `list` from first to last.
    pub fn children(&self, list: ListId) -> ChildMorphs<'_> {
        ChildMorphs::new(
            &self.morphs,
            self.list(list).and_then(|list| list.first_child_morph),
        )
    }

    /// Each child of `morph`: the members of its mounted list, or the fixed
    /// children registered through `init_for_appending_to_morph`.
    pub fn child_morphs(&self, morph: MorphId) -> Vec<MorphId> {
        let Some(entry) = self.morph(morph) else {
            return Vec::new();
        };
        match entry.child_morph_list {
            Some(list) if entry.content_state.is_list() => self.children(list).collect(),
            _ => entry.child_morphs.clone(),
        }
    }

    pub(crate) fn morph_ref(
        &self,
        id: MorphId,
        operation: &'static str,
    ) -> Result<&Morph, MorphError> {
        self.morph(id).ok_or(MorphError::state(
            Subject::Morph(id),
            operation,
            "a live morph",
            Stability::Destroyed.as_str(),
        ))
    }

    pub(crate) fn morph_mut(
        &mut self,
        id: MorphId,
        operation: &'static str,
    ) -> Result<&mut Morph, MorphError> {
        self.morphs
            .get_mut(id.0)
            .and_then(Option::as_mut)
            .ok_or(MorphError::state(
                Subject::Morph(id),
                operation,
                "a live morph",
                Stability::Destroyed.as_str(),
            ))
    }

    pub(crate) fn list_ref(
        &self,
        id: ListId,
        operation: &'static str,
    ) -> Result<&MorphList, MorphError> {
        self.list(id).ok_or(MorphError::state(
            Subject::List(id),
            operation,
            "a live list",
            ListStability::Destroyed.as_str(),
        ))
    }

    pub(crate) fn list_mut(
        &mut self,
        id: ListId,
        operation: &'static str,
    ) -> Result<&mut MorphList, MorphError> {
        self.lists
            .get_mut(id.0)
            .and_then(Option::as_mut)
            .ok_or(MorphError::state(
                Subject::List(id),
                operation,
                "a live list",
                ListStability::Destroyed.as_str(),
            ))
    }

    pub(crate) fn notify(&self, morph: MorphId, hook: Hook) {
        let Some(observer) = self.morph(morph).and_then(|entry| entry.observer.as_ref()) else {
            return;
        };
        match hook {
            Hook::WillClear => observer.will_clear(morph),
            Hook::DidClear => observer.did_clear(morph),
            Hook::WillDestroy => observer.will_destroy(morph),
            Hook::DidDestroy => observer.did_destroy(morph),
            Hook::WillUnmount => observer.will_unmount(morph),
            Hook::DidUnmount => observer.did_unmount(morph),
        }
    }

    /// Renders the morph graph below `root`, one morph per line.
    pub fn format_tree(&self, root: MorphId) -> String {
        let mut output = String::new();
        self.format_morph(&mut output, root, 0);
        output
    }

    fn format_morph(&self, output: &mut String, id: MorphId, depth: usize) {
        let indent = "  ".repeat(depth);
        let Some(morph) = self.morph(id) else {
            let _ = writeln!(output, "{indent}[{id}] (destroyed)");
            return;
        };
        let span = match (morph.first_node, morph.last_node) {
            (Some(first), Some(last)) => format!("{first}..{last}"),
            _ => "-".to_owned(),
        };
        let _ = writeln!(
            output,
            "{indent}[{id}] {} {} {span}{}{}",
            morph.stability.as_str(),
            morph.content_state.as_str(),
            if morph.front_boundary { " front" } else { "" },
            if morph.back_boundary { " back" } else { "" },
        );
        for child in self.child_morphs(id) {
            self.format_morph(output, child, depth + 1);
        }
    }
}

impl<H: HostTree + fmt::Debug> fmt::Debug for MorphTree<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MorphTree")
            .field("host", &self.host)
            .field("live_morphs", &self.live_morph_count())
            .field("lists", &self.lists.iter().filter(|list| list.is_some()).count())
            .field("config", &self.config)
            .finish()
    }
}
