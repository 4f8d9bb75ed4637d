use std::cell::RefCell;
use std::rc::Rc;

use morph_core::range;
use morph_core::{
    Content, HostTree, ListId, MemoryHost, MorphError, MorphId, MorphObserver, MorphOptions,
    MorphTree, MorphTreeConfig, NodeId,
};

/// Headless harness for exercising morph trees in tests.
///
/// `MorphTestRule` owns a [`MorphTree`] over a [`MemoryHost`] with a single
/// `<div>` root and exposes helpers for the render shapes tests reach for most:
/// a top-level morph, and a keyed list of text members.
pub struct MorphTestRule {
    tree: MorphTree<MemoryHost>,
    root: NodeId,
}

/// Handles to a list rendered through [`MorphTestRule::render_list`].
#[derive(Debug, Clone)]
pub struct RenderedList {
    pub mount: MorphId,
    pub list: ListId,
    pub members: Vec<MorphId>,
}

impl MorphTestRule {
    /// Create a new rule with invariant verification turned on.
    pub fn new() -> Self {
        Self::with_config(MorphTreeConfig {
            verify_invariants: true,
            ..MorphTreeConfig::default()
        })
    }

    pub fn with_config(config: MorphTreeConfig) -> Self {
        let mut host = MemoryHost::new();
        let root = host.create_element("div");
        Self {
            tree: MorphTree::with_config(host, config),
            root,
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn tree(&self) -> &MorphTree<MemoryHost> {
        &self.tree
    }

    pub fn tree_mut(&mut self) -> &mut MorphTree<MemoryHost> {
        &mut self.tree
    }

    /// Serialized children of the root element.
    pub fn html(&self) -> String {
        self.tree.host().inner_html(self.root)
    }

    /// Render a top-level morph holding `content` at the end of the root.
    pub fn render(&mut self, content: impl Into<Content>) -> Result<MorphId, MorphError> {
        self.render_with(content, MorphOptions::default())
    }

    pub fn render_with(
        &mut self,
        content: impl Into<Content>,
        options: MorphOptions,
    ) -> Result<MorphId, MorphError> {
        let morph = self.tree.create_morph(options);
        self.tree.init_for_appending_to_element(morph, self.root)?;
        self.tree.set_content(morph, content)?;
        self.tree.finish_append(morph)?;
        Ok(morph)
    }

    /// Render a mounted list with one text member per label at the end of
    /// the root.
    pub fn render_list(&mut self, labels: &[&str]) -> Result<RenderedList, MorphError> {
        let mount = self.tree.create_morph(MorphOptions::default());
        self.tree.init_for_appending_to_element(mount, self.root)?;
        let list = self.tree.create_list();
        self.tree.mount_list(list, mount)?;
        let members = self.append_labels(list, labels)?;
        self.tree.finish_list_append(list)?;
        self.tree.finish_append(mount)?;
        Ok(RenderedList {
            mount,
            list,
            members,
        })
    }

    /// Append one finished text member per label to a list that is being
    /// built or is inside a move transaction.
    pub fn append_labels(
        &mut self,
        list: ListId,
        labels: &[&str],
    ) -> Result<Vec<MorphId>, MorphError> {
        labels
            .iter()
            .map(|label| self.render_member(list, label, None))
            .collect()
    }

    /// Create a member holding `label`, insert it before `reference` and
    /// finish it.
    pub fn render_member(
        &mut self,
        list: ListId,
        label: &str,
        reference: Option<MorphId>,
    ) -> Result<MorphId, MorphError> {
        let member = self.tree.create_morph(MorphOptions::default());
        self.tree.insert_before_morph(list, member, reference)?;
        self.tree.set_content(member, label)?;
        self.tree.finish_append(member)?;
        Ok(member)
    }

    /// Serialized span of `morph`, or an empty string when it has none.
    pub fn span_html(&self, morph: MorphId) -> String {
        let Some((first, last)) = self
            .tree
            .morph(morph)
            .and_then(|entry| entry.first_node().zip(entry.last_node()))
        else {
            return String::new();
        };
        range::nodes_in_range(self.tree.host(), first, last)
            .into_iter()
            .map(|node| self.tree.host().outer_html(node))
            .collect()
    }

    /// Serialized span of each member of `list`, first to last.
    pub fn labels(&self, list: ListId) -> Vec<String> {
        self.tree
            .children(list)
            .map(|member| self.span_html(member))
            .collect()
    }

    /// Panics with every broken invariant of `list`.
    pub fn assert_consistent(&self, list: ListId) {
        let violations = self.tree.invariant_violations(list);
        assert!(
            violations.is_empty(),
            "list {list} is inconsistent:\n{}",
            violations
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join("\n")
        );
    }

    /// Panics unless the mount point of `list` spans exactly its members, or
    /// a single placeholder when it has none.
    pub fn assert_mount_bounds(&self, list: ListId) {
        let entry = self.tree.list(list).expect("live list");
        let mount = entry.parent_morph().expect("mounted list");
        let mount = self.tree.morph(mount).expect("live mount point");
        match (entry.first_child_morph(), entry.last_child_morph()) {
            (Some(first), Some(last)) => {
                assert_eq!(
                    mount.first_node(),
                    self.tree.morph(first).and_then(|m| m.first_node())
                );
                assert_eq!(
                    mount.last_node(),
                    self.tree.morph(last).and_then(|m| m.last_node())
                );
            }
            _ => {
                assert_eq!(mount.first_node(), mount.last_node());
                let node = mount.first_node().expect("placeholder");
                assert_eq!(self.tree.host().kind(node), morph_core::NodeKind::Comment);
            }
        }
    }
}

impl Default for MorphTestRule {
    fn default() -> Self {
        Self::new()
    }
}

/// Convenience helper for tests that only need temporary access to a
/// `MorphTestRule`.
pub fn run_test_tree<R>(f: impl FnOnce(&mut MorphTestRule) -> R) -> R {
    let mut rule = MorphTestRule::new();
    f(&mut rule)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MorphEvent {
    WillClear,
    DidClear,
    WillDestroy,
    DidDestroy,
    WillUnmount,
    DidUnmount,
}

/// Observer that records every lifecycle callback it receives.
#[derive(Debug, Default)]
pub struct RecordingObserver {
    events: RefCell<Vec<(MorphEvent, MorphId)>>,
}

impl RecordingObserver {
    pub fn new() -> Rc<Self> {
        Rc::new(Self::default())
    }

    pub fn events(&self) -> Vec<(MorphEvent, MorphId)> {
        self.events.borrow().clone()
    }

    /// Events recorded for `morph`, in order.
    pub fn events_for(&self, morph: MorphId) -> Vec<MorphEvent> {
        self.events
            .borrow()
            .iter()
            .filter(|(_, id)| *id == morph)
            .map(|(event, _)| *event)
            .collect()
    }

    pub fn options(self: &Rc<Self>) -> MorphOptions {
        MorphOptions::default().observer(self.clone())
    }

    fn record(&self, event: MorphEvent, morph: MorphId) {
        self.events.borrow_mut().push((event, morph));
    }
}

impl MorphObserver for RecordingObserver {
    fn will_clear(&self, morph: MorphId) {
        self.record(MorphEvent::WillClear, morph);
    }

    fn did_clear(&self, morph: MorphId) {
        self.record(MorphEvent::DidClear, morph);
    }

    fn will_destroy(&self, morph: MorphId) {
        self.record(MorphEvent::WillDestroy, morph);
    }

    fn did_destroy(&self, morph: MorphId) {
        self.record(MorphEvent::DidDestroy, morph);
    }

    fn will_unmount(&self, morph: MorphId) {
        self.record(MorphEvent::WillUnmount, morph);
    }

    fn did_unmount(&self, morph: MorphId) {
        self.record(MorphEvent::DidUnmount, morph);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rendered_list_reports_member_spans() {
        let mut rule = MorphTestRule::new();
        let rendered = rule.render_list(&["a", "b"]).unwrap();

        assert_eq!(rule.labels(rendered.list), vec!["a", "b"]);
        assert_eq!(rule.html(), "ab");
        rule.assert_consistent(rendered.list);
        rule.assert_mount_bounds(rendered.list);
    }

    #[test]
    fn observer_options_record_events() {
        let observer = RecordingObserver::new();
        let mut rule = MorphTestRule::new();
        let morph = rule.render_with("x", observer.options()).unwrap();

        rule.tree_mut().destroy(morph).unwrap();

        assert_eq!(
            observer.events_for(morph),
            vec![MorphEvent::WillDestroy, MorphEvent::DidDestroy]
        );
    }
}
