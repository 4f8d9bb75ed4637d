/// Tree-wide settings.
#[derive(Debug, Clone, Default)]
pub struct MorphTreeConfig {
    /// Check list invariants after every closed transaction and log each
    /// violation at error level.
    pub verify_invariants: bool,
    /// Text of the comment node installed as a placeholder.
    pub placeholder_text: String,
}

impl MorphTreeConfig {
    /// Reads `MORPH_DEBUG`; any value turns on invariant verification.
    pub fn from_env() -> Self {
        Self {
            verify_invariants: std::env::var_os("MORPH_DEBUG").is_some(),
            ..Self::default()
        }
    }
}
