// Scope registries for jump and merge targets.
//
// Entries are keyed by syntax node id and visible only while the node's
// lexical extent is being built; disposal is an explicit call on scope exit.
// The node -> label-name association is deliberately permanent: disposal
// frees the label *name* for rebinding but keeps the record of which node
// carried it, so diagnostics can still look it up afterwards.

use std::collections::HashMap;

use crate::domain::ast::{NodeId, SyntaxTree};
use crate::domain::block::BlockId;
use crate::domain::error::BuildError;

/// Where a jump lands: `enter` for continue (present only for loops),
/// `exit` for break.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JumpTargets {
    pub enter: Option<BlockId>,
    pub exit: BlockId,
}

#[derive(Debug, Default)]
pub struct ScopeRegistry {
    label_targets: HashMap<String, JumpTargets>,
    node_labels: HashMap<NodeId, String>,
    loop_targets: HashMap<NodeId, JumpTargets>,
    join_blocks: HashMap<NodeId, BlockId>,
}

impl ScopeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind a label name and its node. Both sides are bijective: a name and
    /// a node each bind at most once concurrently.
    pub fn set_label(
        &mut self,
        name: &str,
        node: NodeId,
        targets: JumpTargets,
    ) -> Result<(), BuildError> {
        if self.label_targets.contains_key(name) {
            return Err(BuildError::DuplicateLabelName(name.to_string()));
        }
        if self.node_labels.contains_key(&node) {
            return Err(BuildError::DuplicateLabelNode);
        }
        self.label_targets.insert(name.to_string(), targets);
        self.node_labels.insert(node, name.to_string());
        Ok(())
    }

    pub fn label_targets(&self, name: &str) -> Option<JumpTargets> {
        self.label_targets.get(name).copied()
    }

    /// The label name a node was bound under, surviving disposal.
    pub fn label_of(&self, node: NodeId) -> Option<&str> {
        self.node_labels.get(&node).map(String::as_str)
    }

    /// Unconditionally (re)bind a loop's jump targets.
    pub fn set_loop(&mut self, node: NodeId, targets: JumpTargets) {
        self.loop_targets.insert(node, targets);
    }

    pub fn set_join(&mut self, node: NodeId, block: BlockId) -> Result<(), BuildError> {
        if self.join_blocks.contains_key(&node) {
            return Err(BuildError::DuplicateJoin);
        }
        self.join_blocks.insert(node, block);
        Ok(())
    }

    pub fn join_of(&self, node: NodeId) -> Option<BlockId> {
        self.join_blocks.get(&node).copied()
    }

    /// Nearest enclosing loop registration, starting at the node itself.
    pub fn nearest_loop(&self, tree: &SyntaxTree, from: NodeId) -> Option<JumpTargets> {
        std::iter::once(from)
            .chain(tree.ancestors(from))
            .find_map(|n| self.loop_targets.get(&n).copied())
    }

    /// Nearest enclosing join registration, starting at the node's parent.
    /// Callers fall back to the program exit sink when this is `None`.
    pub fn nearest_join(&self, tree: &SyntaxTree, from: NodeId) -> Option<BlockId> {
        tree.ancestors(from).find_map(|n| self.join_blocks.get(&n).copied())
    }

    /// Free the label *name* bound to this node, if any. The node -> name
    /// record itself is kept.
    pub fn dispose_label(&mut self, node: NodeId) {
        if let Some(name) = self.node_labels.get(&node) {
            self.label_targets.remove(name);
        }
    }

    pub fn dispose_loop(&mut self, node: NodeId) {
        self.loop_targets.remove(&node);
    }
}
