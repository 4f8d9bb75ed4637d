use std::any::Any;
use std::fmt;

use crate::host::NodeId;
use crate::list::ListId;

/// Markup that is trusted as-is and never escaped.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct SafeString(String);

impl SafeString {
    pub fn new(markup: impl Into<String>) -> Self {
        Self(markup.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for SafeString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SafeString {
    fn from(markup: &str) -> Self {
        Self::new(markup)
    }
}

impl From<String> for SafeString {
    fn from(markup: String) -> Self {
        Self(markup)
    }
}

/// Everything a morph can be asked to hold.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Content {
    Empty,
    /// Escaped text, unless the morph parses text as markup.
    Text(String),
    /// Markup parsed through the host.
    Markup(String),
    /// A single node, or every child of a fragment.
    Node(NodeId),
    /// An already connected sibling span.
    Range(NodeId, NodeId),
    /// A list to mount.
    List(ListId),
}

impl Content {
    pub fn text(text: impl Into<String>) -> Self {
        Content::Text(text.into())
    }

    pub fn markup(markup: impl Into<String>) -> Self {
        Content::Markup(markup.into())
    }

    /// True for the shapes that clear a morph.
    pub fn is_empty(&self) -> bool {
        match self {
            Content::Empty => true,
            Content::Text(text) | Content::Markup(text) => text.is_empty(),
            _ => false,
        }
    }

    /// Converts a dynamically typed value. Returns `None` for any type that is
    /// not one of the recognised content shapes; nothing is coerced to text.
    pub fn from_value<T: Any>(value: T) -> Option<Content> {
        let value: Box<dyn Any> = Box::new(value);
        let value = match value.downcast::<Content>() {
            Ok(content) => return Some(*content),
            Err(value) => value,
        };
        let value = match value.downcast::<String>() {
            Ok(text) => return Some(Content::Text(*text)),
            Err(value) => value,
        };
        let value = match value.downcast::<&'static str>() {
            Ok(text) => return Some(Content::Text((*text).to_owned())),
            Err(value) => value,
        };
        let value = match value.downcast::<SafeString>() {
            Ok(markup) => return Some(Content::Markup(markup.into_string())),
            Err(value) => value,
        };
        let value = match value.downcast::<NodeId>() {
            Ok(node) => return Some(Content::Node(*node)),
            Err(value) => value,
        };
        let value = match value.downcast::<(NodeId, NodeId)>() {
            Ok(range) => return Some(Content::Range(range.0, range.1)),
            Err(value) => value,
        };
        let value = match value.downcast::<ListId>() {
            Ok(list) => return Some(Content::List(*list)),
            Err(value) => value,
        };
        let value = match value.downcast::<Option<String>>() {
            Ok(text) => return Some(text.map_or(Content::Empty, Content::Text)),
            Err(value) => value,
        };
        if value.is::<()>() {
            return Some(Content::Empty);
        }
        None
    }
}

impl From<&str> for Content {
    fn from(text: &str) -> Self {
        Content::Text(text.to_owned())
    }
}

impl From<String> for Content {
    fn from(text: String) -> Self {
        Content::Text(text)
    }
}

impl From<SafeString> for Content {
    fn from(markup: SafeString) -> Self {
        Content::Markup(markup.into_string())
    }
}

impl From<NodeId> for Content {
    fn from(node: NodeId) -> Self {
        Content::Node(node)
    }
}

impl From<ListId> for Content {
    fn from(list: ListId) -> Self {
        Content::List(list)
    }
}

impl<T: Into<Content>> From<Option<T>> for Content {
    fn from(value: Option<T>) -> Self {
        value.map_or(Content::Empty, Into::into)
    }
}

/// Last primitive value a morph was given, used to skip identical updates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum LastValue {
    Text(String),
    Markup(String),
}
