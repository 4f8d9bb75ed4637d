//! Splice helpers over sibling spans of a [`HostTree`].
//!
//! A span is described by its inclusive endpoints; every node between them is
//! reached by following `next_sibling` from the first one.

use crate::host::{HostTree, NodeId};

/// Removes every node of `[first, last]` from its parent. Does nothing when
/// the span is not connected.
pub fn clear_range<H: HostTree + ?Sized>(host: &mut H, first: NodeId, last: NodeId) {
    let Some(parent) = host.parent(first) else {
        return;
    };
    let mut node = first;
    loop {
        let next = host.next_sibling(node);
        host.remove_child(parent, node);
        if node == last {
            break;
        }
        match next {
            Some(next) => node = next,
            None => break,
        }
    }
}

/// Moves the span `[first, last]` in front of `reference` inside `parent`,
/// walking backwards so the span keeps its internal order.
pub fn insert_range_before<H: HostTree + ?Sized>(
    host: &mut H,
    parent: NodeId,
    first: NodeId,
    last: NodeId,
    reference: Option<NodeId>,
) {
    let mut node = last;
    let mut reference = reference;
    loop {
        let previous = host.previous_sibling(node);
        host.insert_before(parent, node, reference);
        if node == first {
            break;
        }
        reference = Some(node);
        match previous {
            Some(previous) => node = previous,
            None => break,
        }
    }
}

/// Returns true when `last` is reachable from `first` through next-sibling
/// links under a shared parent.
pub fn is_sibling_span<H: HostTree + ?Sized>(host: &H, first: NodeId, last: NodeId) -> bool {
    if host.parent(first) != host.parent(last) {
        return false;
    }
    let mut node = Some(first);
    while let Some(current) = node {
        if current == last {
            return true;
        }
        node = host.next_sibling(current);
    }
    false
}

/// Collects the nodes of `[first, last]` in document order.
pub fn nodes_in_range<H: HostTree + ?Sized>(host: &H, first: NodeId, last: NodeId) -> Vec<NodeId> {
    let mut nodes = Vec::new();
    let mut node = Some(first);
    while let Some(current) = node {
        nodes.push(current);
        if current == last {
            break;
        }
        node = host.next_sibling(current);
    }
    nodes
}
