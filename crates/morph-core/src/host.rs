//! Host tree abstraction.
//!
//! Morphs never own host nodes; they only remember handles into a tree that
//! lives behind the [`HostTree`] trait. The trait is deliberately small: node
//! creation, markup parsing, the two structural primitives (insert-before and
//! remove-child) and read access to the links around a node. Everything the
//! core needs on top of that lives in [`crate::range`].

use std::fmt;

use crate::range;

/// Handle to a node owned by a [`HostTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub usize);

impl NodeId {
    #[inline]
    pub fn new(raw: usize) -> Self {
        Self(raw)
    }

    #[inline]
    pub fn raw(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "n{}", self.0)
    }
}

/// Category of a host node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Element,
    Text,
    Comment,
    /// A detached container whose children move as a unit on insertion.
    Fragment,
}

/// Primitive operations a host document must provide.
///
/// Handles passed to these methods are always handles the same host produced.
/// Inserting a node that already has a parent moves it; inserting a fragment
/// moves its children and leaves the fragment empty.
pub trait HostTree {
    fn create_comment(&mut self, text: &str) -> NodeId;
    fn create_text(&mut self, text: &str) -> NodeId;

    /// Replaces the value of a text node in place.
    fn set_text(&mut self, node: NodeId, text: &str);

    /// Parses `markup` into a fresh detached fragment. `context` is the element
    /// the content will eventually live in, for hosts whose parsing rules depend
    /// on it (table sections, foreign content).
    fn parse_html(&mut self, markup: &str, context: Option<NodeId>) -> NodeId;

    fn insert_before(&mut self, parent: NodeId, node: NodeId, reference: Option<NodeId>);
    fn remove_child(&mut self, parent: NodeId, node: NodeId);

    fn parent(&self, node: NodeId) -> Option<NodeId>;
    fn next_sibling(&self, node: NodeId) -> Option<NodeId>;
    fn previous_sibling(&self, node: NodeId) -> Option<NodeId>;
    fn first_child(&self, node: NodeId) -> Option<NodeId>;
    fn last_child(&self, node: NodeId) -> Option<NodeId>;
    fn kind(&self, node: NodeId) -> NodeKind;

    /// Parses `markup` and inserts the result before `reference` inside
    /// `parent`. Returns the inserted first and last node, or `None` when the
    /// markup produced no nodes.
    fn insert_html_before(
        &mut self,
        parent: NodeId,
        reference: Option<NodeId>,
        markup: &str,
        context: Option<NodeId>,
    ) -> Option<(NodeId, NodeId)> {
        let fragment = self.parse_html(markup, context);
        let first = self.first_child(fragment)?;
        let last = self.last_child(fragment)?;
        range::insert_range_before(self, parent, first, last, reference);
        Some((first, last))
    }

    /// Replaces the connected span `[first, last]` with the nodes parsed from
    /// `markup`. Returns the new first and last node, or `None` when the markup
    /// produced no nodes (the old span is removed either way).
    fn replace_html(
        &mut self,
        first: NodeId,
        last: NodeId,
        markup: &str,
        context: Option<NodeId>,
    ) -> Option<(NodeId, NodeId)> {
        let parent = self.parent(first)?;
        let reference = self.next_sibling(last);
        range::clear_range(self, first, last);
        self.insert_html_before(parent, reference, markup, context)
    }
}
