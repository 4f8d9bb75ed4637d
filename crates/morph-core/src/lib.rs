#![doc = r"Range tracking and incremental reconciliation for mutable host trees."]

pub mod collections;
pub mod host;
pub mod memory;
pub mod range;

mod config;
mod content;
mod error;
mod invariants;
mod list;
mod morph;
mod observer;
mod transaction;
mod tree;

pub use config::MorphTreeConfig;
pub use content::{Content, SafeString};
pub use error::{MorphError, Subject};
pub use host::{HostTree, NodeId, NodeKind};
pub use invariants::InvariantViolation;
pub use list::{ChildMorphs, ListId, ListStability, MorphList};
pub use memory::MemoryHost;
pub use morph::{ContentState, Morph, MorphId, MorphOptions, Stability};
pub use observer::MorphObserver;
pub use transaction::{MoveTransaction, UpdateTransaction};
pub use tree::MorphTree;
