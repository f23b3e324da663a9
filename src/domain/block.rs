// Basic blocks, steps, and completions.
//
// Blocks live in an arena and are referenced by index, so cyclic wiring
// (loop back edges) is just storing another handle. A block stays mutable
// until it is sealed with a completion; sealing is one-shot.

use crate::domain::error::BuildError;

/// Handle into a [`BlockArena`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BlockId(u32);

impl BlockId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Kind tag of a recorded step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepKind {
    NumberLiteral,
    StringLiteral,
    BooleanLiteral,
    NullLiteral,
    RegexLiteral,
    Identifier,
    UnaryOp,
    BinaryOp,
    LogicalOp,
    MemberAccess,
}

impl StepKind {
    /// Display label; matches the ESTree kind names of the source nodes.
    pub fn label(self) -> &'static str {
        match self {
            StepKind::NumberLiteral => "NumericLiteral",
            StepKind::StringLiteral => "StringLiteral",
            StepKind::BooleanLiteral => "BooleanLiteral",
            StepKind::NullLiteral => "NullLiteral",
            StepKind::RegexLiteral => "RegExpLiteral",
            StepKind::Identifier => "Identifier",
            StepKind::UnaryOp => "UnaryExpression",
            StepKind::BinaryOp => "BinaryExpression",
            StepKind::LogicalOp => "LogicalExpression",
            StepKind::MemberAccess => "MemberExpression",
        }
    }
}

/// One atomic recorded operation. Immutable once appended; order within a
/// block is append order, which is the evaluation order of the source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    pub kind: StepKind,
    pub text: String,
    /// Precomputed human-readable rendering, `"<kind> <text>"`.
    pub dump: String,
}

impl Step {
    pub fn new(kind: StepKind, text: impl Into<String>) -> Self {
        let text = text.into();
        let dump = format!("{} {}", kind.label(), text);
        Step { kind, text, dump }
    }
}

/// The typed outgoing edge(s) of a sealed block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    /// Ordinary post-execution flow to a single successor.
    Normal(BlockId),
    /// Structural entry into a not-yet-executed nested scope. Identical to
    /// `Normal` for connectivity; kept distinct so consumers can tell
    /// "falls through into a new scope" from "finished executing".
    Marker(BlockId),
    /// Two-way fork emitted right after the steps evaluating the test.
    Branch { on_true: BlockId, on_false: BlockId },
    /// Jump to the exit block of the resolved loop or label.
    Break(BlockId),
    /// Jump to the re-entry block of the resolved loop.
    Continue(BlockId),
}

impl Completion {
    pub fn kind_label(&self) -> &'static str {
        match self {
            Completion::Normal(_) => "normal",
            Completion::Marker(_) => "marker",
            Completion::Branch { .. } => "branch",
            Completion::Break(_) => "break",
            Completion::Continue(_) => "continue",
        }
    }

    pub fn targets(&self) -> Vec<BlockId> {
        match *self {
            Completion::Normal(t)
            | Completion::Marker(t)
            | Completion::Break(t)
            | Completion::Continue(t) => vec![t],
            Completion::Branch { on_true, on_false } => vec![on_true, on_false],
        }
    }
}

/// A straight-line sequence of steps ending in at most one completion.
#[derive(Debug)]
pub struct Block {
    name: String,
    steps: Vec<Step>,
    completion: Option<Completion>,
}

impl Block {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub fn completion(&self) -> Option<&Completion> {
        self.completion.as_ref()
    }
}

/// Owning arena for all blocks of one build.
#[derive(Debug, Default)]
pub struct BlockArena {
    blocks: Vec<Block>,
}

impl BlockArena {
    pub fn new() -> Self {
        BlockArena { blocks: Vec::new() }
    }

    pub fn alloc(&mut self, name: impl Into<String>) -> BlockId {
        let id = BlockId(self.blocks.len() as u32);
        self.blocks.push(Block { name: name.into(), steps: Vec::new(), completion: None });
        id
    }

    /// Set the block's completion. Sealing twice is an invariant violation.
    pub fn seal(&mut self, id: BlockId, completion: Completion) -> Result<(), BuildError> {
        let block = &mut self.blocks[id.index()];
        if block.completion.is_some() {
            return Err(BuildError::CompletionAlreadySet { block: block.name.clone() });
        }
        block.completion = Some(completion);
        Ok(())
    }

    pub fn is_open(&self, id: BlockId) -> bool {
        self.blocks[id.index()].completion.is_none()
    }

    pub fn push_step(&mut self, id: BlockId, step: Step) {
        self.blocks[id.index()].steps.push(step);
    }

    pub fn block(&self, id: BlockId) -> &Block {
        &self.blocks[id.index()]
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Iterate all blocks in allocation order.
    pub fn iter(&self) -> impl Iterator<Item = (BlockId, &Block)> {
        self.blocks.iter().enumerate().map(|(i, b)| (BlockId(i as u32), b))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seal_is_one_shot() {
        let mut arena = BlockArena::new();
        let a = arena.alloc("a");
        let b = arena.alloc("b");
        arena.seal(a, Completion::Normal(b)).unwrap();
        let err = arena.seal(a, Completion::Normal(b)).unwrap_err();
        assert_eq!(err, BuildError::CompletionAlreadySet { block: "a".into() });
    }

    #[test]
    fn step_dump_combines_kind_and_text() {
        let step = Step::new(StepKind::BinaryOp, "+");
        assert_eq!(step.dump, "BinaryExpression +");
        assert_eq!(Step::new(StepKind::Identifier, "a").dump, "Identifier a");
    }

    #[test]
    fn branch_has_two_targets() {
        let mut arena = BlockArena::new();
        let t = arena.alloc("t");
        let f = arena.alloc("f");
        let c = Completion::Branch { on_true: t, on_false: f };
        assert_eq!(c.targets(), vec![t, f]);
        assert_eq!(c.kind_label(), "branch");
    }
}
