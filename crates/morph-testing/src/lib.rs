//! Testing utilities and harness for morph trees

pub mod testing;

pub use testing::*;

pub mod prelude {
    pub use crate::testing::*;
    pub use morph_core::{
        Content, ContentState, ListId, ListStability, MorphError, MorphId, MorphOptions,
        MorphTree, SafeString, Stability,
    };
}
