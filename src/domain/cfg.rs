// The finished control-flow graph handed to consumers.

use std::collections::BTreeMap;
use std::collections::HashSet;

use crate::domain::block::{Block, BlockArena, BlockId};

/// Read-only view of a completed build: the block arena, the designated root
/// and exit sink, the dead-successor map, and the coverage report.
#[derive(Debug)]
pub struct Cfg {
    arena: BlockArena,
    root: BlockId,
    exit: BlockId,
    unreachable: BTreeMap<BlockId, BlockId>,
    unhandled: Vec<&'static str>,
}

impl Cfg {
    pub(crate) fn new(
        arena: BlockArena,
        root: BlockId,
        exit: BlockId,
        unreachable: BTreeMap<BlockId, BlockId>,
        unhandled: Vec<&'static str>,
    ) -> Self {
        Cfg { arena, root, exit, unreachable, unhandled }
    }

    pub fn root(&self) -> BlockId {
        self.root
    }

    pub fn exit(&self) -> BlockId {
        self.exit
    }

    pub fn block(&self, id: BlockId) -> &Block {
        self.arena.block(id)
    }

    /// All blocks in allocation order, live and dead alike.
    pub fn blocks(&self) -> impl Iterator<Item = (BlockId, &Block)> {
        self.arena.iter()
    }

    /// Dead successor blocks allocated after a break/continue, keyed by the
    /// sealed block they syntactically follow.
    pub fn unreachable(&self) -> &BTreeMap<BlockId, BlockId> {
        &self.unreachable
    }

    /// Syntax kinds no dedicated handler claimed during the build.
    pub fn unhandled_kinds(&self) -> &[&'static str] {
        &self.unhandled
    }

    /// Blocks reachable from the root by following completions, in
    /// deterministic visit order.
    pub fn reachable(&self) -> Vec<BlockId> {
        let mut order = Vec::new();
        let mut seen = HashSet::new();
        let mut queue = vec![self.root];
        while let Some(id) = queue.pop() {
            if !seen.insert(id) {
                continue;
            }
            order.push(id);
            if let Some(completion) = self.arena.block(id).completion() {
                for target in completion.targets() {
                    queue.push(target);
                }
            }
        }
        order.sort();
        order
    }
}
