// Errors raised while building a control-flow graph.

/// Everything that can go wrong during construction. A single malformed
/// jump or label binding aborts the build; no partial graph is returned.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BuildError {
    /// A `break`/`continue` names a label with no active binding.
    #[error("unknown label `{0}`")]
    UnknownLabel(String),

    /// A `continue` (or unlabeled jump) has no enclosing loop to target.
    #[error("not in a loop{}", .label.as_deref().map(|l| format!(" (label `{l}` does not mark a loop)")).unwrap_or_default())]
    NotInLoop { label: Option<String> },

    /// Two labels with the same name are active at once.
    #[error("label `{0}` is already bound in an enclosing scope")]
    DuplicateLabelName(String),

    /// The same syntax node was bound to a label twice.
    #[error("node already carries a label")]
    DuplicateLabelNode,

    /// The same scope node was given a join block twice.
    #[error("scope already has a join block")]
    DuplicateJoin,

    /// A block was sealed after its completion had been set.
    #[error("block `{block}` already has a completion")]
    CompletionAlreadySet { block: String },
}
