//! A morph tracks a contiguous sibling span of host nodes and swaps that
//! span's content without disturbing anything around it.

use std::any::Any;
use std::fmt;
use std::rc::Rc;

use crate::content::{Content, LastValue};
use crate::error::{MorphError, Subject};
use crate::host::{HostTree, NodeId, NodeKind};
use crate::list::{ListId, ListStability};
use crate::observer::MorphObserver;
use crate::range;
use crate::tree::{Hook, MorphTree};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MorphId(pub(crate) usize);

impl MorphId {
    #[inline]
    pub fn raw(self) -> usize {
        self.0
    }
}

impl fmt::Display for MorphId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// What a morph currently holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentState {
    Blank,
    /// A single placeholder comment.
    Comment,
    Contents,
    /// A detached fragment that has not been inserted yet.
    Fragment,
    List,
    /// A mounted list without members, represented by a placeholder.
    EmptyList,
}

impl ContentState {
    pub fn as_str(self) -> &'static str {
        match self {
            ContentState::Blank => "blank",
            ContentState::Comment => "a placeholder",
            ContentState::Contents => "contents",
            ContentState::Fragment => "a fragment",
            ContentState::List => "a mounted list",
            ContentState::EmptyList => "an empty mounted list",
        }
    }

    pub fn is_list(self) -> bool {
        matches!(self, ContentState::List | ContentState::EmptyList)
    }
}

/// Lifecycle phase of a morph.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stability {
    Detached,
    Appending,
    Attached,
    Updating,
    WasStable,
    Moving,
    Destroyed,
}

impl Stability {
    pub fn as_str(self) -> &'static str {
        match self {
            Stability::Detached => "detached",
            Stability::Appending => "appending",
            Stability::Attached => "attached",
            Stability::Updating => "updating",
            Stability::WasStable => "stable",
            Stability::Moving => "moving",
            Stability::Destroyed => "destroyed",
        }
    }
}

/// Per-morph settings fixed at creation.
#[derive(Clone, Default)]
pub struct MorphOptions {
    /// Element used as parsing context for markup content.
    pub contextual_element: Option<NodeId>,
    /// Treat plain text as markup.
    pub parse_text_as_html: bool,
    pub observer: Option<Rc<dyn MorphObserver>>,
}

impl MorphOptions {
    pub fn contextual_element(mut self, element: NodeId) -> Self {
        self.contextual_element = Some(element);
        self
    }

    pub fn parse_text_as_html(mut self) -> Self {
        self.parse_text_as_html = true;
        self
    }

    pub fn observer(mut self, observer: Rc<dyn MorphObserver>) -> Self {
        self.observer = Some(observer);
        self
    }
}

impl fmt::Debug for MorphOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MorphOptions")
            .field("contextual_element", &self.contextual_element)
            .field("parse_text_as_html", &self.parse_text_as_html)
            .field("observer", &self.observer.is_some())
            .finish()
    }
}

pub struct Morph {
    pub(crate) first_node: Option<NodeId>,
    pub(crate) last_node: Option<NodeId>,
    pub(crate) content_state: ContentState,
    pub(crate) stability: Stability,
    pub(crate) parent_morph: Option<MorphId>,
    pub(crate) owner_list: Option<ListId>,
    pub(crate) previous_morph: Option<MorphId>,
    pub(crate) next_morph: Option<MorphId>,
    pub(crate) child_morphs: Vec<MorphId>,
    pub(crate) child_morph_list: Option<ListId>,
    pub(crate) front_boundary: bool,
    pub(crate) back_boundary: bool,
    pub(crate) last_value: Option<LastValue>,
    pub(crate) append_parent: Option<NodeId>,
    pub(crate) next_sibling: Option<NodeId>,
    pub(crate) contextual_element: Option<NodeId>,
    pub(crate) parse_text_as_html: bool,
    pub(crate) observer: Option<Rc<dyn MorphObserver>>,
}

impl Morph {
    pub(crate) fn new(options: MorphOptions) -> Self {
        Self {
            first_node: None,
            last_node: None,
            content_state: ContentState::Blank,
            stability: Stability::Detached,
            parent_morph: None,
            owner_list: None,
            previous_morph: None,
            next_morph: None,
            child_morphs: Vec::new(),
            child_morph_list: None,
            front_boundary: false,
            back_boundary: false,
            last_value: None,
            append_parent: None,
            next_sibling: None,
            contextual_element: options.contextual_element,
            parse_text_as_html: options.parse_text_as_html,
            observer: options.observer,
        }
    }

    pub fn first_node(&self) -> Option<NodeId> {
        self.first_node
    }

    pub fn last_node(&self) -> Option<NodeId> {
        self.last_node
    }

    pub fn content_state(&self) -> ContentState {
        self.content_state
    }

    pub fn stability(&self) -> Stability {
        self.stability
    }

    pub fn parent_morph(&self) -> Option<MorphId> {
        self.parent_morph
    }

    pub fn owner_list(&self) -> Option<ListId> {
        self.owner_list
    }

    pub fn previous_morph(&self) -> Option<MorphId> {
        self.previous_morph
    }

    pub fn next_morph(&self) -> Option<MorphId> {
        self.next_morph
    }

    pub fn child_morph_list(&self) -> Option<ListId> {
        self.child_morph_list
    }

    pub fn front_boundary(&self) -> bool {
        self.front_boundary
    }

    pub fn back_boundary(&self) -> bool {
        self.back_boundary
    }

    /// Where appended content goes while the morph is appending.
    pub fn insertion_point(&self) -> Option<(NodeId, Option<NodeId>)> {
        self.append_parent.map(|parent| (parent, self.next_sibling))
    }

    pub(crate) fn begin_appending_at(&mut self, parent: Option<NodeId>, next: Option<NodeId>) {
        self.stability = Stability::Appending;
        self.append_parent = parent;
        self.next_sibling = next;
    }
}

impl fmt::Debug for Morph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Morph")
            .field("first_node", &self.first_node)
            .field("last_node", &self.last_node)
            .field("content_state", &self.content_state)
            .field("stability", &self.stability)
            .field("parent_morph", &self.parent_morph)
            .field("owner_list", &self.owner_list)
            .field("previous_morph", &self.previous_morph)
            .field("next_morph", &self.next_morph)
            .field("child_morphs", &self.child_morphs)
            .field("child_morph_list", &self.child_morph_list)
            .field("front_boundary", &self.front_boundary)
            .field("back_boundary", &self.back_boundary)
            .finish_non_exhaustive()
    }
}

/// The phases in which content may be written, narrowed from [`Stability`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WritePhase {
    Detached,
    Appending,
    Attached,
    Updating,
}

impl<H: HostTree> MorphTree<H> {
    /// Creates a detached morph that already holds `node`. Fragments are kept
    /// as fragments until the morph is inserted.
    pub fn create_with_node(
        &mut self,
        node: NodeId,
        options: MorphOptions,
    ) -> Result<MorphId, MorphError> {
        let morph = self.create_morph(options);
        self.set_node(morph, node)?;
        Ok(morph)
    }

    /// Creates an attached morph over the connected sibling span
    /// `[first, last]`.
    pub fn attach_range(
        &mut self,
        first: NodeId,
        last: NodeId,
        options: MorphOptions,
    ) -> Result<MorphId, MorphError> {
        let morph = self.create_morph(options);
        if !range::is_sibling_span(&self.host, first, last) {
            self.morphs[morph.0] = None;
            return Err(MorphError::UnsupportedContent {
                morph,
                found: "a disconnected node range".to_owned(),
            });
        }
        let entry = self.morph_mut(morph, "attach a range")?;
        entry.first_node = Some(first);
        entry.last_node = Some(last);
        entry.content_state = ContentState::Contents;
        entry.stability = Stability::Attached;
        Ok(morph)
    }

    /// Starts appending into `element`, after its existing children.
    pub fn init_for_appending_to_element(
        &mut self,
        morph: MorphId,
        element: NodeId,
    ) -> Result<(), MorphError> {
        self.require_initializable(morph, "append into an element")?;
        self.morph_mut(morph, "append into an element")?
            .begin_appending_at(Some(element), None);
        Ok(())
    }

    /// Starts appending `morph` as a fixed child of `parent`, inheriting the
    /// parent's insertion point.
    pub fn init_for_appending_to_morph(
        &mut self,
        morph: MorphId,
        parent: MorphId,
    ) -> Result<(), MorphError> {
        const OP: &str = "append into a morph";
        if morph == parent {
            return Err(MorphError::state(
                Subject::Morph(morph),
                OP,
                "a parent other than itself",
                "the same morph",
            ));
        }
        self.require_initializable(morph, OP)?;
        let parent_entry = self.morph_ref(parent, OP)?;
        if parent_entry.stability != Stability::Appending {
            return Err(MorphError::state(
                Subject::Morph(parent),
                OP,
                "an appending parent",
                parent_entry.stability.as_str(),
            ));
        }
        if parent_entry.content_state.is_list() {
            return Err(MorphError::state(
                Subject::Morph(parent),
                OP,
                "a parent without a mounted list",
                parent_entry.content_state.as_str(),
            ));
        }
        let (append_parent, next) = (parent_entry.append_parent, parent_entry.next_sibling);
        self.morph_mut(parent, OP)?.child_morphs.push(morph);
        let entry = self.morph_mut(morph, OP)?;
        entry.parent_morph = Some(parent);
        entry.begin_appending_at(append_parent, next);
        Ok(())
    }

    /// Starts appending in front of the attached morph `next`.
    pub fn init_for_inserting_before_morph(
        &mut self,
        morph: MorphId,
        next: MorphId,
    ) -> Result<(), MorphError> {
        const OP: &str = "insert before a morph";
        self.require_initializable(morph, OP)?;
        let (parent, reference) = self.attached_front(next, OP)?;
        self.morph_mut(morph, OP)?
            .begin_appending_at(parent, Some(reference));
        Ok(())
    }

    /// Retargets an appending morph that has not produced any node yet so its
    /// content lands in front of `next`.
    pub fn prepare_for_inserting_before_morph(
        &mut self,
        morph: MorphId,
        next: MorphId,
    ) -> Result<(), MorphError> {
        const OP: &str = "retarget an appending morph";
        let entry = self.morph_ref(morph, OP)?;
        if entry.stability != Stability::Appending {
            return Err(MorphError::state(
                Subject::Morph(morph),
                OP,
                "an appending morph",
                entry.stability.as_str(),
            ));
        }
        if entry.first_node.is_some() {
            return Err(MorphError::state(
                Subject::Morph(morph),
                OP,
                "a morph with no appended nodes",
                entry.content_state.as_str(),
            ));
        }
        let (parent, reference) = self.attached_front(next, OP)?;
        let entry = self.morph_mut(morph, OP)?;
        entry.append_parent = parent;
        entry.next_sibling = Some(reference);
        Ok(())
    }

    fn attached_front(
        &self,
        morph: MorphId,
        operation: &'static str,
    ) -> Result<(Option<NodeId>, NodeId), MorphError> {
        let entry = self.morph_ref(morph, operation)?;
        match (entry.stability, entry.first_node) {
            (Stability::Attached, Some(first)) => Ok((self.host.parent(first), first)),
            (stability, _) => Err(MorphError::state(
                Subject::Morph(morph),
                operation,
                "an attached reference morph",
                stability.as_str(),
            )),
        }
    }

    fn require_initializable(
        &self,
        morph: MorphId,
        operation: &'static str,
    ) -> Result<(), MorphError> {
        let entry = self.morph_ref(morph, operation)?;
        if entry.stability != Stability::Detached {
            return Err(MorphError::state(
                Subject::Morph(morph),
                operation,
                "a detached morph",
                entry.stability.as_str(),
            ));
        }
        if entry.content_state != ContentState::Blank {
            return Err(MorphError::state(
                Subject::Morph(morph),
                operation,
                "a blank morph",
                entry.content_state.as_str(),
            ));
        }
        Ok(())
    }

    /// Appends `node` (or every child of a fragment) at the insertion point.
    pub fn append_node(&mut self, morph: MorphId, node: NodeId) -> Result<(), MorphError> {
        const OP: &str = "append a node";
        let (parent, next) = self.appending_point(morph, OP)?;
        let span = if self.host.kind(node) == NodeKind::Fragment {
            self.host.first_child(node).zip(self.host.last_child(node))
        } else {
            Some((node, node))
        };
        self.host.insert_before(parent, node, next);
        if let Some((first, last)) = span {
            self.record_appended(morph, first, last, OP)?;
        }
        Ok(())
    }

    /// Appends the connected span `[first, last]` at the insertion point.
    pub fn append_nodes(
        &mut self,
        morph: MorphId,
        first: NodeId,
        last: NodeId,
    ) -> Result<(), MorphError> {
        const OP: &str = "append a node range";
        if !range::is_sibling_span(&self.host, first, last) {
            return Err(MorphError::UnsupportedContent {
                morph,
                found: "a disconnected node range".to_owned(),
            });
        }
        let (parent, next) = self.appending_point(morph, OP)?;
        match self.host.parent(first) {
            Some(_) => range::insert_range_before(&mut self.host, parent, first, last, next),
            None => self.host.insert_before(parent, first, next),
        }
        self.record_appended(morph, first, last, OP)
    }

    fn appending_point(
        &self,
        morph: MorphId,
        operation: &'static str,
    ) -> Result<(NodeId, Option<NodeId>), MorphError> {
        let entry = self.morph_ref(morph, operation)?;
        if entry.stability != Stability::Appending {
            return Err(MorphError::state(
                Subject::Morph(morph),
                operation,
                "an appending morph",
                entry.stability.as_str(),
            ));
        }
        if entry.content_state.is_list() {
            return Err(MorphError::state(
                Subject::Morph(morph),
                operation,
                "a morph without a mounted list",
                entry.content_state.as_str(),
            ));
        }
        self.insertion_point(morph, operation)
    }

    fn insertion_point(
        &self,
        morph: MorphId,
        operation: &'static str,
    ) -> Result<(NodeId, Option<NodeId>), MorphError> {
        self.morph_ref(morph, operation)?
            .insertion_point()
            .ok_or(MorphError::state(
                Subject::Morph(morph),
                operation,
                "an insertion point",
                "none",
            ))
    }

    fn record_appended(
        &mut self,
        morph: MorphId,
        first: NodeId,
        last: NodeId,
        operation: &'static str,
    ) -> Result<(), MorphError> {
        let entry = self.morph_mut(morph, operation)?;
        if entry.first_node.is_none() {
            entry.first_node = Some(first);
        }
        entry.last_node = Some(last);
        entry.content_state = ContentState::Contents;
        entry.last_value = None;
        Ok(())
    }

    /// Installs `content`, dispatching on its shape.
    pub fn set_content(
        &mut self,
        morph: MorphId,
        content: impl Into<Content>,
    ) -> Result<(), MorphError> {
        match content.into() {
            Content::List(list) => self.set_morph_list(morph, list),
            Content::Empty => self.clear_content(morph),
            Content::Text(text) | Content::Markup(text) if text.is_empty() => {
                self.clear_content(morph)
            }
            Content::Text(text) => {
                if self.morph_ref(morph, "set content")?.parse_text_as_html {
                    self.set_html(morph, &text)
                } else {
                    self.set_text(morph, &text)
                }
            }
            Content::Markup(markup) => self.set_html(morph, &markup),
            Content::Node(node) => self.set_node(morph, node),
            Content::Range(first, last) => self.set_range(morph, first, last),
        }
    }

    /// Like [`MorphTree::set_content`] for a dynamically typed value. Types
    /// outside the recognised content shapes are rejected.
    pub fn set_value<T: Any>(&mut self, morph: MorphId, value: T) -> Result<(), MorphError> {
        match Content::from_value(value) {
            Some(content) => self.set_content(morph, content),
            None => Err(MorphError::UnsupportedContent {
                morph,
                found: std::any::type_name::<T>().to_owned(),
            }),
        }
    }

    pub fn set_text(&mut self, morph: MorphId, text: &str) -> Result<(), MorphError> {
        const OP: &str = "set text";
        let phase = self.write_phase(morph, OP)?;
        if text.is_empty() {
            return self.clear_content(morph);
        }
        let value = LastValue::Text(text.to_owned());
        if self.skip_identical(morph, &value, OP)? {
            return Ok(());
        }
        self.discard_appended_value(morph, OP)?;
        if matches!(phase, WritePhase::Attached | WritePhase::Updating) {
            if let Some(node) = self.single_text_node(morph) {
                self.host.set_text(node, text);
                let entry = self.morph_mut(morph, OP)?;
                entry.last_value = Some(value);
                if entry.stability == Stability::Updating {
                    entry.stability = Stability::WasStable;
                }
                return Ok(());
            }
        }
        let node = self.host.create_text(text);
        self.install_node(morph, node, phase, OP)?;
        self.morph_mut(morph, OP)?.last_value = Some(value);
        Ok(())
    }

    pub fn set_html(&mut self, morph: MorphId, markup: &str) -> Result<(), MorphError> {
        const OP: &str = "set markup";
        let phase = self.write_phase(morph, OP)?;
        if markup.is_empty() {
            return self.clear_content(morph);
        }
        let value = LastValue::Markup(markup.to_owned());
        if self.skip_identical(morph, &value, OP)? {
            return Ok(());
        }
        self.discard_appended_value(morph, OP)?;
        let context = self.morph_ref(morph, OP)?.contextual_element;
        match phase {
            WritePhase::Detached => {
                let fragment = self.host.parse_html(markup, context);
                let entry = self.morph_mut(morph, OP)?;
                entry.first_node = Some(fragment);
                entry.last_node = Some(fragment);
                entry.content_state = ContentState::Fragment;
            }
            WritePhase::Appending | WritePhase::Updating => {
                if phase == WritePhase::Updating {
                    self.clear_for_render(morph)?;
                }
                let (parent, next) = self.appending_point(morph, OP)?;
                if let Some((first, last)) =
                    self.host.insert_html_before(parent, next, markup, context)
                {
                    self.record_appended(morph, first, last, OP)?;
                }
            }
            WritePhase::Attached => self.replace_attached_html(morph, markup, context, OP)?,
        }
        self.morph_mut(morph, OP)?.last_value = Some(value);
        Ok(())
    }

    /// Installs a single node, or every child of a fragment.
    pub fn set_node(&mut self, morph: MorphId, node: NodeId) -> Result<(), MorphError> {
        const OP: &str = "set node";
        let phase = self.write_phase(morph, OP)?;
        if self.host.kind(node) == NodeKind::Fragment {
            if phase == WritePhase::Detached {
                let entry = self.morph_mut(morph, OP)?;
                entry.first_node = Some(node);
                entry.last_node = Some(node);
                entry.content_state = ContentState::Fragment;
                entry.last_value = None;
                return Ok(());
            }
            let Some((first, last)) = self.host.first_child(node).zip(self.host.last_child(node))
            else {
                return self.clear_content(morph);
            };
            match phase {
                WritePhase::Attached => self.replace_attached(morph, first, last, OP)?,
                _ => {
                    if phase == WritePhase::Updating {
                        self.clear_for_render(morph)?;
                    }
                    self.append_node(morph, node)?;
                }
            }
        } else {
            self.install_node(morph, node, phase, OP)?;
        }
        self.morph_mut(morph, OP)?.last_value = None;
        Ok(())
    }

    /// Adopts the connected sibling span `[first, last]`.
    pub fn set_range(
        &mut self,
        morph: MorphId,
        first: NodeId,
        last: NodeId,
    ) -> Result<(), MorphError> {
        const OP: &str = "set a node range";
        if first == last {
            return self.set_node(morph, first);
        }
        let phase = self.write_phase(morph, OP)?;
        if !range::is_sibling_span(&self.host, first, last) {
            return Err(MorphError::UnsupportedContent {
                morph,
                found: "a disconnected node range".to_owned(),
            });
        }
        match phase {
            WritePhase::Detached => {
                return Err(MorphError::state(
                    Subject::Morph(morph),
                    OP,
                    "an appending or attached morph",
                    Stability::Detached.as_str(),
                ));
            }
            WritePhase::Appending | WritePhase::Updating => {
                if phase == WritePhase::Updating {
                    self.clear_for_render(morph)?;
                }
                self.append_nodes(morph, first, last)?;
            }
            WritePhase::Attached => self.replace_attached(morph, first, last, OP)?,
        }
        self.morph_mut(morph, OP)?.last_value = None;
        Ok(())
    }

    /// Replaces the content of an attached morph with a placeholder comment and
    /// returns it. Clearing a morph that already shows a placeholder is a
    /// no-op.
    pub fn clear(&mut self, morph: MorphId) -> Result<NodeId, MorphError> {
        const OP: &str = "clear";
        let entry = self.morph_ref(morph, OP)?;
        if entry.stability != Stability::Attached {
            return Err(MorphError::state(
                Subject::Morph(morph),
                OP,
                "an attached morph",
                entry.stability.as_str(),
            ));
        }
        if entry.content_state.is_list() {
            return Err(MorphError::state(
                Subject::Morph(morph),
                OP,
                "a morph without a mounted list",
                entry.content_state.as_str(),
            ));
        }
        if let (ContentState::Comment, Some(node)) = (entry.content_state, entry.first_node) {
            return Ok(node);
        }
        let placeholder = self.host.create_comment(&self.config.placeholder_text);
        self.replace_attached(morph, placeholder, placeholder, OP)?;
        let entry = self.morph_mut(morph, OP)?;
        entry.content_state = ContentState::Comment;
        entry.last_value = None;
        Ok(placeholder)
    }

    /// Throws away the content of an attached or updating morph and reopens
    /// it for appending at the same position.
    pub fn clear_for_render(&mut self, morph: MorphId) -> Result<(), MorphError> {
        const OP: &str = "clear for render";
        let entry = self.morph_ref(morph, OP)?;
        match entry.stability {
            Stability::Appending => return Ok(()),
            Stability::Attached | Stability::Updating => {}
            stability => {
                return Err(MorphError::state(
                    Subject::Morph(morph),
                    OP,
                    "an attached or updating morph",
                    stability.as_str(),
                ));
            }
        }
        if entry.content_state.is_list() {
            return Err(MorphError::state(
                Subject::Morph(morph),
                OP,
                "a morph without a mounted list",
                entry.content_state.as_str(),
            ));
        }
        let (first, last) = self.endpoints(morph, OP)?;
        let parent = self.host.parent(first);
        let next = self.host.next_sibling(last);
        self.notify(morph, Hook::WillClear);
        self.morph_mut(morph, OP)?.begin_appending_at(parent, next);
        range::clear_range(&mut self.host, first, last);
        self.notify(morph, Hook::DidClear);
        self.release_children(morph)?;
        let entry = self.morph_mut(morph, OP)?;
        entry.first_node = None;
        entry.last_node = None;
        entry.content_state = ContentState::Blank;
        entry.last_value = None;
        log::trace!("morph {morph} cleared for render");
        Ok(())
    }

    /// Opens an update pass on an attached morph.
    pub fn expect_update(&mut self, morph: MorphId) -> Result<(), MorphError> {
        const OP: &str = "expect an update";
        let entry = self.morph_mut(morph, OP)?;
        if entry.stability != Stability::Attached {
            return Err(MorphError::state(
                Subject::Morph(morph),
                OP,
                "an attached morph",
                entry.stability.as_str(),
            ));
        }
        entry.stability = Stability::Updating;
        Ok(())
    }

    /// Declares that an update pass left the morph untouched.
    pub fn remained_stable(&mut self, morph: MorphId) -> Result<(), MorphError> {
        const OP: &str = "keep a morph stable";
        let entry = self.morph_mut(morph, OP)?;
        if entry.stability != Stability::Updating {
            return Err(MorphError::state(
                Subject::Morph(morph),
                OP,
                "an updating morph",
                entry.stability.as_str(),
            ));
        }
        entry.stability = Stability::WasStable;
        Ok(())
    }

    /// Closes an append or update pass. A morph that produced no nodes gets a
    /// placeholder comment so it always occupies at least one node.
    pub fn finish_append(&mut self, morph: MorphId) -> Result<(), MorphError> {
        const OP: &str = "finish appending";
        match self.morph_ref(morph, OP)?.stability {
            Stability::WasStable => {
                self.morph_mut(morph, OP)?.stability = Stability::Attached;
                return Ok(());
            }
            // A mounted list reconciles itself through move transactions.
            Stability::Updating if self.morph_ref(morph, OP)?.content_state.is_list() => {
                self.morph_mut(morph, OP)?.stability = Stability::Attached;
                return Ok(());
            }
            Stability::Updating => self.clear_for_render(morph)?,
            Stability::Appending => {}
            stability => {
                return Err(MorphError::state(
                    Subject::Morph(morph),
                    OP,
                    "an appending or updating morph",
                    stability.as_str(),
                ));
            }
        }
        let entry = self.morph_ref(morph, OP)?;
        let content_state = entry.content_state;
        let list = entry.child_morph_list;
        if let (ContentState::List, Some(list)) = (content_state, list) {
            let stability = self.list_ref(list, OP)?.stability;
            if stability != ListStability::Attached {
                return Err(MorphError::state(
                    Subject::List(list),
                    OP,
                    "a finished list",
                    stability.as_str(),
                ));
            }
        }
        if matches!(content_state, ContentState::Blank | ContentState::EmptyList) {
            let (parent, next) = self.insertion_point(morph, OP)?;
            let placeholder = self.host.create_comment(&self.config.placeholder_text);
            self.host.insert_before(parent, placeholder, next);
            let entry = self.morph_mut(morph, OP)?;
            entry.first_node = Some(placeholder);
            entry.last_node = Some(placeholder);
            if content_state == ContentState::Blank {
                entry.content_state = ContentState::Comment;
            } else if let Some(list) = list {
                let list = self.list_mut(list, OP)?;
                list.stability = ListStability::Attached;
                list.content_state = ContentState::EmptyList;
            }
            log::trace!("morph {morph} finished empty, placeholder {placeholder}");
        }
        let entry = self.morph_mut(morph, OP)?;
        entry.stability = Stability::Attached;
        entry.append_parent = None;
        entry.next_sibling = None;
        let (first, last) = (entry.first_node, entry.last_node);
        if let (Some(first), Some(last)) = (first, last) {
            self.update_first_node(morph, first)?;
            self.update_last_node(morph, last)?;
        }
        Ok(())
    }

    /// Records a new first node and carries it up through every ancestor for
    /// which `morph` sits at the front.
    pub fn update_first_node(&mut self, morph: MorphId, node: NodeId) -> Result<(), MorphError> {
        self.update_boundary(morph, node, true)
    }

    /// Records a new last node and carries it up through every ancestor for
    /// which `morph` sits at the back.
    pub fn update_last_node(&mut self, morph: MorphId, node: NodeId) -> Result<(), MorphError> {
        self.update_boundary(morph, node, false)
    }

    fn update_boundary(
        &mut self,
        morph: MorphId,
        node: NodeId,
        front: bool,
    ) -> Result<(), MorphError> {
        const OP: &str = "update a boundary node";
        let mut current = morph;
        loop {
            let entry = self.morph_mut(current, OP)?;
            if front {
                entry.first_node = Some(node);
            } else {
                entry.last_node = Some(node);
            }
            if current != morph
                && entry.stability == Stability::Appending
                && entry.content_state == ContentState::Blank
            {
                entry.content_state = ContentState::Contents;
            }
            let at_boundary = if front {
                entry.front_boundary
            } else {
                entry.back_boundary
            };
            match (at_boundary, entry.parent_morph) {
                (true, Some(parent)) => current = parent,
                _ => return Ok(()),
            }
        }
    }

    /// Marks a fixed child as sitting at the front and/or back of its parent.
    /// List members get their flags from the list and cannot be changed here.
    pub fn set_boundaries(
        &mut self,
        morph: MorphId,
        front: bool,
        back: bool,
    ) -> Result<(), MorphError> {
        const OP: &str = "set boundary flags";
        let entry = self.morph_mut(morph, OP)?;
        if entry.owner_list.is_some() {
            return Err(MorphError::state(
                Subject::Morph(morph),
                OP,
                "a fixed child morph",
                "a list member",
            ));
        }
        if entry.parent_morph.is_none() {
            return Err(MorphError::state(
                Subject::Morph(morph),
                OP,
                "a fixed child morph",
                "a morph without a parent",
            ));
        }
        entry.front_boundary = front;
        entry.back_boundary = back;
        Ok(())
    }

    /// Inserts a top-level morph at the end of `parent`.
    pub fn append_to_node(&mut self, morph: MorphId, parent: NodeId) -> Result<(), MorphError> {
        self.insert_before_node(morph, parent, None)
    }

    /// Inserts a top-level morph into `parent` before `reference`. A detached
    /// morph becomes attached; an attached one moves with all of its nodes.
    pub fn insert_before_node(
        &mut self,
        morph: MorphId,
        parent: NodeId,
        reference: Option<NodeId>,
    ) -> Result<(), MorphError> {
        const OP: &str = "insert into a host node";
        let entry = self.morph_ref(morph, OP)?;
        if entry.parent_morph.is_some() || entry.owner_list.is_some() {
            return Err(MorphError::state(
                Subject::Morph(morph),
                OP,
                "a top-level morph",
                "a nested morph",
            ));
        }
        match (entry.stability, entry.content_state) {
            (Stability::Detached, ContentState::Blank) => {
                self.install_placeholder(morph, parent, reference, OP)?;
            }
            (Stability::Detached, ContentState::Fragment) => {
                self.insert_fragment(morph, parent, reference, OP)?;
            }
            (Stability::Detached | Stability::Attached, _) => {
                let (first, last) = self.endpoints(morph, OP)?;
                match self.host.parent(first) {
                    Some(_) => {
                        range::insert_range_before(&mut self.host, parent, first, last, reference)
                    }
                    None => self.host.insert_before(parent, first, reference),
                }
            }
            (stability, _) => {
                return Err(MorphError::state(
                    Subject::Morph(morph),
                    OP,
                    "a detached or attached morph",
                    stability.as_str(),
                ));
            }
        }
        self.morph_mut(morph, OP)?.stability = Stability::Attached;
        Ok(())
    }

    pub(crate) fn install_placeholder(
        &mut self,
        morph: MorphId,
        parent: NodeId,
        reference: Option<NodeId>,
        operation: &'static str,
    ) -> Result<NodeId, MorphError> {
        let placeholder = self.host.create_comment(&self.config.placeholder_text);
        self.host.insert_before(parent, placeholder, reference);
        let entry = self.morph_mut(morph, operation)?;
        entry.first_node = Some(placeholder);
        entry.last_node = Some(placeholder);
        entry.content_state = ContentState::Comment;
        Ok(placeholder)
    }

    /// Inserts the pending fragment of a detached morph and records its
    /// children as the morph's span.
    pub(crate) fn insert_fragment(
        &mut self,
        morph: MorphId,
        parent: NodeId,
        reference: Option<NodeId>,
        operation: &'static str,
    ) -> Result<(), MorphError> {
        let (fragment, _) = self.endpoints(morph, operation)?;
        let Some((first, last)) = self
            .host
            .first_child(fragment)
            .zip(self.host.last_child(fragment))
        else {
            self.install_placeholder(morph, parent, reference, operation)?;
            return Ok(());
        };
        self.host.insert_before(parent, fragment, reference);
        let entry = self.morph_mut(morph, operation)?;
        entry.first_node = Some(first);
        entry.last_node = Some(last);
        entry.content_state = ContentState::Contents;
        Ok(())
    }

    pub(crate) fn endpoints(
        &self,
        morph: MorphId,
        operation: &'static str,
    ) -> Result<(NodeId, NodeId), MorphError> {
        let entry = self.morph_ref(morph, operation)?;
        entry
            .first_node
            .zip(entry.last_node)
            .ok_or(MorphError::state(
                Subject::Morph(morph),
                operation,
                "a morph with nodes",
                entry.content_state.as_str(),
            ))
    }

    fn write_phase(&self, morph: MorphId, operation: &'static str) -> Result<WritePhase, MorphError> {
        let entry = self.morph_ref(morph, operation)?;
        if entry.content_state.is_list() {
            return Err(MorphError::state(
                Subject::Morph(morph),
                operation,
                "a morph without a mounted list",
                entry.content_state.as_str(),
            ));
        }
        match entry.stability {
            Stability::Detached => Ok(WritePhase::Detached),
            Stability::Appending => Ok(WritePhase::Appending),
            Stability::Attached => Ok(WritePhase::Attached),
            Stability::Updating => Ok(WritePhase::Updating),
            stability => Err(MorphError::state(
                Subject::Morph(morph),
                operation,
                "a detached, appending, attached or updating morph",
                stability.as_str(),
            )),
        }
    }

    fn skip_identical(
        &mut self,
        morph: MorphId,
        value: &LastValue,
        operation: &'static str,
    ) -> Result<bool, MorphError> {
        let entry = self.morph_mut(morph, operation)?;
        if entry.last_value.as_ref() != Some(value) {
            return Ok(false);
        }
        match entry.stability {
            Stability::Attached => Ok(true),
            Stability::Appending => Ok(entry.first_node.is_some()),
            Stability::Updating => {
                entry.stability = Stability::WasStable;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    /// Removes primitive content an appending morph already wrote, so the next
    /// write lands in its place instead of after it.
    fn discard_appended_value(
        &mut self,
        morph: MorphId,
        operation: &'static str,
    ) -> Result<(), MorphError> {
        let entry = self.morph_ref(morph, operation)?;
        if entry.stability != Stability::Appending || entry.last_value.is_none() {
            return Ok(());
        }
        let Some((first, last)) = entry.first_node.zip(entry.last_node) else {
            return Ok(());
        };
        let parent = self.host.parent(first);
        let next = self.host.next_sibling(last);
        self.clear_content(morph)?;
        if parent.is_some() {
            let entry = self.morph_mut(morph, operation)?;
            entry.append_parent = parent;
            entry.next_sibling = next;
        }
        Ok(())
    }

    fn single_text_node(&self, morph: MorphId) -> Option<NodeId> {
        let entry = self.morph(morph)?;
        match (entry.content_state, entry.first_node, entry.last_node) {
            (ContentState::Contents, Some(first), Some(last))
                if first == last
                    && entry.child_morphs.is_empty()
                    && self.host.kind(first) == NodeKind::Text =>
            {
                Some(first)
            }
            _ => None,
        }
    }

    fn install_node(
        &mut self,
        morph: MorphId,
        node: NodeId,
        phase: WritePhase,
        operation: &'static str,
    ) -> Result<(), MorphError> {
        match phase {
            WritePhase::Detached => {
                let entry = self.morph_mut(morph, operation)?;
                entry.first_node = Some(node);
                entry.last_node = Some(node);
                entry.content_state = ContentState::Contents;
                Ok(())
            }
            WritePhase::Appending => self.append_node(morph, node),
            WritePhase::Updating => {
                self.clear_for_render(morph)?;
                self.append_node(morph, node)
            }
            WritePhase::Attached => self.replace_attached(morph, node, node, operation),
        }
    }

    /// Swaps the span of an attached morph for `[first, last]`, which is moved
    /// into the old span's position.
    fn replace_attached(
        &mut self,
        morph: MorphId,
        first: NodeId,
        last: NodeId,
        operation: &'static str,
    ) -> Result<(), MorphError> {
        let (old_first, old_last) = self.endpoints(morph, operation)?;
        if (old_first, old_last) == (first, last) {
            return Ok(());
        }
        self.notify(morph, Hook::WillClear);
        if let Some(parent) = self.host.parent(old_first) {
            match self.host.parent(first) {
                Some(_) => range::insert_range_before(
                    &mut self.host,
                    parent,
                    first,
                    last,
                    Some(old_first),
                ),
                None => self.host.insert_before(parent, first, Some(old_first)),
            }
            range::clear_range(&mut self.host, old_first, old_last);
        }
        self.notify(morph, Hook::DidClear);
        self.release_children(morph)?;
        self.update_first_node(morph, first)?;
        self.update_last_node(morph, last)?;
        let entry = self.morph_mut(morph, operation)?;
        entry.content_state = ContentState::Contents;
        entry.last_value = None;
        Ok(())
    }

    fn replace_attached_html(
        &mut self,
        morph: MorphId,
        markup: &str,
        context: Option<NodeId>,
        operation: &'static str,
    ) -> Result<(), MorphError> {
        let (old_first, old_last) = self.endpoints(morph, operation)?;
        let Some(parent) = self.host.parent(old_first) else {
            return Err(MorphError::state(
                Subject::Morph(morph),
                operation,
                "a morph connected to the host tree",
                "disconnected",
            ));
        };
        let reference = self.host.next_sibling(old_last);
        self.notify(morph, Hook::WillClear);
        let replaced = self.host.replace_html(old_first, old_last, markup, context);
        self.notify(morph, Hook::DidClear);
        self.release_children(morph)?;
        let (first, last, content_state) = match replaced {
            Some((first, last)) => (first, last, ContentState::Contents),
            None => {
                let placeholder = self.host.create_comment(&self.config.placeholder_text);
                self.host.insert_before(parent, placeholder, reference);
                (placeholder, placeholder, ContentState::Comment)
            }
        };
        self.update_first_node(morph, first)?;
        self.update_last_node(morph, last)?;
        self.morph_mut(morph, operation)?.content_state = content_state;
        Ok(())
    }

    fn clear_content(&mut self, morph: MorphId) -> Result<(), MorphError> {
        const OP: &str = "clear content";
        match self.write_phase(morph, OP)? {
            WritePhase::Detached => {
                let entry = self.morph_mut(morph, OP)?;
                entry.first_node = None;
                entry.last_node = None;
                entry.content_state = ContentState::Blank;
                entry.last_value = None;
                Ok(())
            }
            WritePhase::Appending => {
                let entry = self.morph_ref(morph, OP)?;
                let Some((first, last)) = entry.first_node.zip(entry.last_node) else {
                    return Ok(());
                };
                self.notify(morph, Hook::WillClear);
                range::clear_range(&mut self.host, first, last);
                self.notify(morph, Hook::DidClear);
                self.release_children(morph)?;
                let entry = self.morph_mut(morph, OP)?;
                entry.first_node = None;
                entry.last_node = None;
                entry.content_state = ContentState::Blank;
                entry.last_value = None;
                Ok(())
            }
            WritePhase::Updating => self.clear_for_render(morph),
            WritePhase::Attached => self.clear(morph).map(|_| ()),
        }
    }

    /// Discards fixed children whose nodes went away with the parent's span.
    fn release_children(&mut self, morph: MorphId) -> Result<(), MorphError> {
        let children = std::mem::take(&mut self.morph_mut(morph, "release children")?.child_morphs);
        for child in children {
            if self.morph(child).is_some() {
                self.teardown(child, false)?;
            }
        }
        Ok(())
    }

    /// Mounts `list` on an appending morph that has no content yet.
    pub fn set_morph_list(&mut self, morph: MorphId, list: ListId) -> Result<(), MorphError> {
        const OP: &str = "mount a list";
        let entry = self.morph_ref(morph, OP)?;
        if entry.stability != Stability::Appending {
            return Err(MorphError::state(
                Subject::Morph(morph),
                OP,
                "an appending morph",
                entry.stability.as_str(),
            ));
        }
        if entry.content_state != ContentState::Blank || entry.first_node.is_some() {
            return Err(MorphError::state(
                Subject::Morph(morph),
                OP,
                "a morph with no content yet",
                entry.content_state.as_str(),
            ));
        }
        let list_entry = self.list_ref(list, OP)?;
        if list_entry.stability != ListStability::Detached
            || list_entry.parent_morph.is_some()
        {
            return Err(MorphError::state(
                Subject::List(list),
                OP,
                "an unmounted list",
                list_entry.stability.as_str(),
            ));
        }
        if list_entry.first_child_morph.is_some() {
            return Err(MorphError::state(
                Subject::List(list),
                OP,
                "an empty list",
                "a list with members",
            ));
        }
        let list_entry = self.list_mut(list, OP)?;
        list_entry.parent_morph = Some(morph);
        list_entry.stability = ListStability::Appending;
        list_entry.content_state = ContentState::List;
        let entry = self.morph_mut(morph, OP)?;
        entry.child_morph_list = Some(list);
        entry.content_state = ContentState::List;
        log::trace!("list {list} mounted on morph {morph}");
        Ok(())
    }

    /// Unmounts the list held by an attached morph, leaving a placeholder in
    /// its place. Former members are destroyed.
    pub fn unmount_child(&mut self, morph: MorphId) -> Result<NodeId, MorphError> {
        const OP: &str = "unmount a list";
        let entry = self.morph_ref(morph, OP)?;
        if entry.stability != Stability::Attached {
            return Err(MorphError::state(
                Subject::Morph(morph),
                OP,
                "an attached morph",
                entry.stability.as_str(),
            ));
        }
        let list = match (entry.content_state.is_list(), entry.child_morph_list) {
            (true, Some(list)) => list,
            _ => {
                return Err(MorphError::state(
                    Subject::Morph(morph),
                    OP,
                    "a morph with a mounted list",
                    entry.content_state.as_str(),
                ));
            }
        };
        let list_stability = self.list_ref(list, OP)?.stability;
        if list_stability != ListStability::Attached {
            return Err(MorphError::state(
                Subject::List(list),
                OP,
                "an attached list",
                list_stability.as_str(),
            ));
        }
        self.notify(morph, Hook::WillUnmount);
        let members = self.detach_list(list)?;
        self.notify(morph, Hook::DidUnmount);
        let placeholder = self.host.create_comment(&self.config.placeholder_text);
        self.replace_attached(morph, placeholder, placeholder, OP)?;
        self.morph_mut(morph, OP)?.content_state = ContentState::Comment;
        for member in members {
            if self.morph(member).is_some() {
                self.teardown(member, false)?;
            }
        }
        log::debug!("list {list} unmounted from morph {morph}");
        Ok(placeholder)
    }

    /// Destroys `morph`: its nodes leave the host tree, it leaves its parent
    /// or list, and its id reports [`Stability::Destroyed`] from now on.
    ///
    /// Destroying a member of an attached list runs a one-off move
    /// transaction on that list so the mount point stays consistent.
    pub fn destroy(&mut self, morph: MorphId) -> Result<(), MorphError> {
        const OP: &str = "destroy";
        if let Some(list) = self.morph_ref(morph, OP)?.owner_list {
            match self.list_ref(list, OP)?.stability {
                ListStability::Attached => {
                    self.begin_move(list)?;
                    self.remove_child_morph(list, morph)?;
                    return self.finish_move(list);
                }
                _ => self.unlink_member(list, morph)?,
            }
        }
        self.teardown(morph, true)
    }

    /// Tears down `morph` and everything below it. With `remove_nodes` unset
    /// only the graph is discarded; the caller already removed the nodes.
    pub(crate) fn teardown(&mut self, morph: MorphId, remove_nodes: bool) -> Result<(), MorphError> {
        const OP: &str = "destroy";
        let entry = self.morph_ref(morph, OP)?;
        let children = entry.child_morphs.clone();
        let list = entry.child_morph_list;
        let span = entry.first_node.zip(entry.last_node);
        let content_state = entry.content_state;
        let parent = entry.parent_morph;
        let owner = entry.owner_list;
        self.notify(morph, Hook::WillDestroy);
        for child in children {
            if self.morph(child).is_some() {
                self.teardown(child, false)?;
            }
        }
        if let Some(list) = list {
            if self.list(list).is_some() {
                for member in self.detach_members(list)? {
                    if self.morph(member).is_some() {
                        self.teardown(member, false)?;
                    }
                }
                self.lists[list.0] = None;
            }
        }
        if remove_nodes && content_state != ContentState::Fragment {
            if let Some((first, last)) = span {
                range::clear_range(&mut self.host, first, last);
            }
        }
        if let (None, Some(parent)) = (owner, parent) {
            if let Some(parent) = self.morphs.get_mut(parent.0).and_then(Option::as_mut) {
                parent.child_morphs.retain(|child| *child != morph);
            }
        }
        self.notify(morph, Hook::DidDestroy);
        self.morphs[morph.0] = None;
        log::trace!("morph {morph} destroyed");
        Ok(())
    }
}

#[cfg(test)]
#[path = "tests/morph_tests.rs"]
mod tests;
