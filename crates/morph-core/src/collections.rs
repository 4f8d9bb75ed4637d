#[cfg(feature = "std-hash")]
pub mod map {
    pub use std::collections::hash_map::RandomState;
    pub use std::collections::{HashMap, HashSet};
}

#[cfg(not(feature = "std-hash"))]
pub mod map {
    pub use ahash::RandomState;
    pub use hashbrown::{HashMap, HashSet};
}

/// Insertion-ordered set used where iteration order must follow the order of
/// recording (for example the removal buffer of a move transaction).
pub type OrderedSet<T> = indexmap::IndexSet<T, map::RandomState>;
