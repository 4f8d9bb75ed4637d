//! In-memory [`HostTree`] used by tests, benches and the demo.
//!
//! Nodes live in a `Vec` and are never reused, so a handle stays valid for the
//! lifetime of the host. The markup parser understands elements, attributes,
//! comments, text with the basic entities and the usual void elements; it does
//! not apply context-specific parsing rules.

use std::fmt::Write as _;

use crate::host::{HostTree, NodeId, NodeKind};

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

#[derive(Debug, Clone)]
enum NodeData {
    Element {
        tag: String,
        attributes: Vec<(String, String)>,
    },
    Text(String),
    Comment(String),
    Fragment,
}

#[derive(Debug, Clone)]
struct HostNode {
    data: NodeData,
    parent: Option<NodeId>,
    first_child: Option<NodeId>,
    last_child: Option<NodeId>,
    previous: Option<NodeId>,
    next: Option<NodeId>,
}

impl HostNode {
    fn new(data: NodeData) -> Self {
        Self {
            data,
            parent: None,
            first_child: None,
            last_child: None,
            previous: None,
            next: None,
        }
    }
}

/// Arena-backed document.
///
/// # Panics
///
/// Every method panics when handed a [`NodeId`] this host did not create.
#[derive(Debug, Default)]
pub struct MemoryHost {
    nodes: Vec<HostNode>,
    mutations: usize,
}

impl MemoryHost {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&mut self, data: NodeData) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(HostNode::new(data));
        id
    }

    fn node(&self, id: NodeId) -> &HostNode {
        &self.nodes[id.0]
    }

    fn node_mut(&mut self, id: NodeId) -> &mut HostNode {
        &mut self.nodes[id.0]
    }

    pub fn create_element(&mut self, tag: &str) -> NodeId {
        self.push(NodeData::Element {
            tag: tag.to_ascii_lowercase(),
            attributes: Vec::new(),
        })
    }

    pub fn create_fragment(&mut self) -> NodeId {
        self.push(NodeData::Fragment)
    }

    pub fn set_attribute(&mut self, element: NodeId, name: &str, value: &str) {
        if let NodeData::Element { attributes, .. } = &mut self.node_mut(element).data {
            match attributes.iter_mut().find(|(existing, _)| existing == name) {
                Some((_, existing)) => *existing = value.to_owned(),
                None => attributes.push((name.to_owned(), value.to_owned())),
            }
        }
    }

    pub fn append_child(&mut self, parent: NodeId, node: NodeId) {
        self.insert_before(parent, node, None);
    }

    /// Creates `<tag>` holding a single text child.
    pub fn element_with_text(&mut self, tag: &str, text: &str) -> NodeId {
        let element = self.create_element(tag);
        let child = self.create_text(text);
        self.append_child(element, child);
        element
    }

    /// Number of structural or text mutations applied so far.
    pub fn mutation_count(&self) -> usize {
        self.mutations
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn children(&self, parent: NodeId) -> Vec<NodeId> {
        let mut children = Vec::new();
        let mut child = self.node(parent).first_child;
        while let Some(id) = child {
            children.push(id);
            child = self.node(id).next;
        }
        children
    }

    /// Text of a text or comment node.
    pub fn node_value(&self, node: NodeId) -> Option<&str> {
        match &self.node(node).data {
            NodeData::Text(text) | NodeData::Comment(text) => Some(text),
            _ => None,
        }
    }

    pub fn tag_name(&self, node: NodeId) -> Option<&str> {
        match &self.node(node).data {
            NodeData::Element { tag, .. } => Some(tag),
            _ => None,
        }
    }

    /// Serializes `node` including itself. Fragments serialize as their
    /// children.
    pub fn outer_html(&self, node: NodeId) -> String {
        let mut output = String::new();
        self.write_node(&mut output, node);
        output
    }

    pub fn inner_html(&self, node: NodeId) -> String {
        let mut output = String::new();
        for child in self.children(node) {
            self.write_node(&mut output, child);
        }
        output
    }

    fn write_node(&self, output: &mut String, id: NodeId) {
        match &self.node(id).data {
            NodeData::Text(text) => output.push_str(&escape_text(text)),
            NodeData::Comment(text) => {
                let _ = write!(output, "<!--{text}-->");
            }
            NodeData::Fragment => {
                for child in self.children(id) {
                    self.write_node(output, child);
                }
            }
            NodeData::Element { tag, attributes } => {
                output.push('<');
                output.push_str(tag);
                for (name, value) in attributes {
                    let _ = write!(output, " {name}=\"{}\"", escape_attribute(value));
                }
                output.push('>');
                if VOID_ELEMENTS.contains(&tag.as_str()) {
                    return;
                }
                for child in self.children(id) {
                    self.write_node(output, child);
                }
                let _ = write!(output, "</{tag}>");
            }
        }
    }

    fn detach(&mut self, node: NodeId) {
        let Some(parent) = self.node(node).parent else {
            return;
        };
        let (previous, next) = {
            let entry = self.node(node);
            (entry.previous, entry.next)
        };
        match previous {
            Some(previous) => self.node_mut(previous).next = next,
            None => self.node_mut(parent).first_child = next,
        }
        match next {
            Some(next) => self.node_mut(next).previous = previous,
            None => self.node_mut(parent).last_child = previous,
        }
        let entry = self.node_mut(node);
        entry.parent = None;
        entry.previous = None;
        entry.next = None;
    }

    fn link_before(&mut self, parent: NodeId, node: NodeId, reference: Option<NodeId>) {
        let previous = match reference {
            Some(reference) => self.node(reference).previous,
            None => self.node(parent).last_child,
        };
        {
            let entry = self.node_mut(node);
            entry.parent = Some(parent);
            entry.previous = previous;
            entry.next = reference;
        }
        match previous {
            Some(previous) => self.node_mut(previous).next = Some(node),
            None => self.node_mut(parent).first_child = Some(node),
        }
        match reference {
            Some(reference) => self.node_mut(reference).previous = Some(node),
            None => self.node_mut(parent).last_child = Some(node),
        }
    }

    fn parse_into(&mut self, fragment: NodeId, markup: &str) {
        let mut stack = vec![fragment];
        let mut rest = markup;
        while !rest.is_empty() {
            let parent = *stack.last().unwrap_or(&fragment);
            if let Some(body) = rest.strip_prefix("<!--") {
                let (text, tail) = match body.find("-->") {
                    Some(end) => (&body[..end], &body[end + 3..]),
                    None => (body, ""),
                };
                let comment = self.create_comment(text);
                self.link_before(parent, comment, None);
                rest = tail;
            } else if let Some(body) = rest.strip_prefix("</") {
                let end = body.find('>').unwrap_or(body.len());
                let name = body[..end].trim().to_ascii_lowercase();
                if let Some(depth) = stack
                    .iter()
                    .rposition(|open| self.tag_name(*open) == Some(name.as_str()))
                {
                    stack.truncate(depth.max(1));
                }
                rest = body.get(end + 1..).unwrap_or("");
            } else if rest.starts_with('<')
                && rest[1..].starts_with(|c: char| c.is_ascii_alphabetic())
            {
                let (tag, tail) = parse_tag(&rest[1..]);
                let element = self.push(NodeData::Element {
                    tag: tag.name.clone(),
                    attributes: tag.attributes,
                });
                self.link_before(parent, element, None);
                if !tag.self_closing && !VOID_ELEMENTS.contains(&tag.name.as_str()) {
                    stack.push(element);
                }
                rest = tail;
            } else {
                let end = rest
                    .char_indices()
                    .skip(1)
                    .find(|(_, c)| *c == '<')
                    .map_or(rest.len(), |(index, _)| index);
                let text = self.push(NodeData::Text(unescape(&rest[..end])));
                self.link_before(parent, text, None);
                rest = &rest[end..];
            }
        }
    }
}

struct ParsedTag {
    name: String,
    attributes: Vec<(String, String)>,
    self_closing: bool,
}

fn parse_tag(input: &str) -> (ParsedTag, &str) {
    let name_end = input
        .find(|c: char| c.is_whitespace() || c == '>' || c == '/')
        .unwrap_or(input.len());
    let mut tag = ParsedTag {
        name: input[..name_end].to_ascii_lowercase(),
        attributes: Vec::new(),
        self_closing: false,
    };
    let mut rest = &input[name_end..];
    loop {
        rest = rest.trim_start();
        if let Some(tail) = rest.strip_prefix("/>") {
            tag.self_closing = true;
            return (tag, tail);
        }
        if let Some(tail) = rest.strip_prefix('>') {
            return (tag, tail);
        }
        if rest.is_empty() {
            return (tag, rest);
        }
        if let Some(tail) = rest.strip_prefix('/') {
            rest = tail;
            continue;
        }
        let name_end = rest
            .find(|c: char| c.is_whitespace() || c == '=' || c == '>' || c == '/')
            .unwrap_or(rest.len());
        let name = rest[..name_end].to_ascii_lowercase();
        rest = rest[name_end..].trim_start();
        let mut value = String::new();
        if let Some(tail) = rest.strip_prefix('=') {
            let tail = tail.trim_start();
            let quote = tail.chars().next().filter(|c| *c == '"' || *c == '\'');
            match quote {
                Some(quote) => {
                    let body = &tail[1..];
                    let end = body.find(quote).unwrap_or(body.len());
                    value = unescape(&body[..end]);
                    rest = body.get(end + 1..).unwrap_or("");
                }
                None => {
                    let end = tail
                        .find(|c: char| c.is_whitespace() || c == '>')
                        .unwrap_or(tail.len());
                    value = unescape(&tail[..end]);
                    rest = &tail[end..];
                }
            }
        }
        tag.attributes.push((name, value));
    }
}

fn unescape(text: &str) -> String {
    if !text.contains('&') {
        return text.to_owned();
    }
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&nbsp;", "\u{a0}")
        .replace("&amp;", "&")
}

fn escape_text(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

fn escape_attribute(value: &str) -> String {
    value.replace('&', "&amp;").replace('"', "&quot;")
}

impl HostTree for MemoryHost {
    fn create_comment(&mut self, text: &str) -> NodeId {
        self.push(NodeData::Comment(text.to_owned()))
    }

    fn create_text(&mut self, text: &str) -> NodeId {
        self.push(NodeData::Text(text.to_owned()))
    }

    fn set_text(&mut self, node: NodeId, text: &str) {
        if let NodeData::Text(value) | NodeData::Comment(value) = &mut self.node_mut(node).data {
            value.clear();
            value.push_str(text);
            self.mutations += 1;
        }
    }

    fn parse_html(&mut self, markup: &str, _context: Option<NodeId>) -> NodeId {
        let fragment = self.create_fragment();
        self.parse_into(fragment, markup);
        fragment
    }

    fn insert_before(&mut self, parent: NodeId, node: NodeId, reference: Option<NodeId>) {
        if reference == Some(node) {
            return;
        }
        debug_assert!(
            reference.map_or(true, |reference| self.node(reference).parent == Some(parent)),
            "reference node {reference:?} is not a child of {parent}"
        );
        if matches!(self.node(node).data, NodeData::Fragment) {
            for child in self.children(node) {
                self.detach(child);
                self.link_before(parent, child, reference);
            }
        } else {
            self.detach(node);
            self.link_before(parent, node, reference);
        }
        self.mutations += 1;
    }

    fn remove_child(&mut self, parent: NodeId, node: NodeId) {
        debug_assert_eq!(self.node(node).parent, Some(parent));
        self.detach(node);
        self.mutations += 1;
    }

    fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.node(node).parent
    }

    fn next_sibling(&self, node: NodeId) -> Option<NodeId> {
        self.node(node).next
    }

    fn previous_sibling(&self, node: NodeId) -> Option<NodeId> {
        self.node(node).previous
    }

    fn first_child(&self, node: NodeId) -> Option<NodeId> {
        self.node(node).first_child
    }

    fn last_child(&self, node: NodeId) -> Option<NodeId> {
        self.node(node).last_child
    }

    fn kind(&self, node: NodeId) -> NodeKind {
        match self.node(node).data {
            NodeData::Element { .. } => NodeKind::Element,
            NodeData::Text(_) => NodeKind::Text,
            NodeData::Comment(_) => NodeKind::Comment,
            NodeData::Fragment => NodeKind::Fragment,
        }
    }
}

#[cfg(test)]
#[path = "tests/memory_tests.rs"]
mod tests;
