#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CoreError {
    #[error("Unknown {kind} tool '{name}'")]
    UnknownTool { kind: &'static str, name: String },

    #[error("{tool} needs at least {needed} points, record has {found}")]
    TooFewPoints {
        tool: &'static str,
        needed: usize,
        found: usize,
    },
}
