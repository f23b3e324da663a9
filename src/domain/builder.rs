// CFG construction: a single deterministic recursive-descent pass over the
// syntax tree.
//
// The builder threads the "current block" cursor explicitly through every
// construct handler: each takes the cursor it should build from and returns
// the cursor the next sibling continues at. Construct handlers allocate
// blocks, append steps, and seal completions; `finish` runs once per node on
// the way out and performs coverage marking plus scope disposal
// (auto-seal-to-join, then loop removal, then label-name removal).

use std::collections::{BTreeMap, BTreeSet, HashSet};

use tracing::{debug, trace};

use crate::domain::ast::{NodeId, NodeKind, Pos, SyntaxTree};
use crate::domain::block::{BlockArena, BlockId, Completion, Step, StepKind};
use crate::domain::cfg::Cfg;
use crate::domain::error::BuildError;
use crate::domain::scope::{JumpTargets, ScopeRegistry};

/// Which end of a node's span names a freshly allocated block.
#[derive(Clone, Copy)]
enum Endpoint {
    Start,
    End,
}

pub struct CfgBuilder<'t> {
    tree: &'t SyntaxTree,
    arena: BlockArena,
    scopes: ScopeRegistry,
    unreachable: BTreeMap<BlockId, BlockId>,
    handled: HashSet<NodeId>,
    unhandled: HashSet<NodeId>,
    exit: BlockId,
}

impl<'t> CfgBuilder<'t> {
    /// Run the whole pass and hand back the finished graph.
    pub fn build(tree: &'t SyntaxTree) -> Result<Cfg, BuildError> {
        let mut arena = BlockArena::new();
        let root = arena.alloc("root");
        let exit = arena.alloc("end");
        let mut builder = CfgBuilder {
            tree,
            arena,
            scopes: ScopeRegistry::new(),
            unreachable: BTreeMap::new(),
            handled: HashSet::new(),
            unhandled: HashSet::new(),
            exit,
        };

        match tree.root() {
            Some(program) => builder.visit_program(program, root)?,
            None => builder.arena.seal(root, Completion::Normal(exit))?,
        }

        let unhandled: Vec<&'static str> = builder
            .unhandled
            .iter()
            .map(|&id| tree.node(id).kind.name())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        debug!(
            blocks = builder.arena.len(),
            dead = builder.unreachable.len(),
            unhandled = ?unhandled,
            "control-flow graph built"
        );
        Ok(Cfg::new(builder.arena, root, exit, builder.unreachable, unhandled))
    }

    fn visit_program(&mut self, node: NodeId, root: BlockId) -> Result<(), BuildError> {
        let NodeKind::Program { body } = &self.tree.node(node).kind else {
            unreachable!("tree root is always a program");
        };
        let entry = self.make_block(node, Endpoint::Start, "");
        self.arena.seal(root, Completion::Marker(entry))?;
        self.mark_handled(node);

        let mut cursor = entry;
        for &stmt in body {
            cursor = self.visit_stmt(stmt, cursor)?;
        }

        // No ancestor can register a join above the program, so this is the
        // overall exit sink.
        let sink = self.scopes.nearest_join(self.tree, node).unwrap_or(self.exit);
        self.arena.seal(cursor, Completion::Normal(sink))?;
        self.finish(node, sink)?;
        Ok(())
    }

    /// Process one statement; returns the cursor the next sibling starts at.
    fn visit_stmt(&mut self, node: NodeId, cursor: BlockId) -> Result<BlockId, BuildError> {
        match self.tree.node(node).kind.clone() {
            NodeKind::BlockStmt { body } => self.visit_block_stmt(node, &body, cursor),
            NodeKind::If { test, consequent, alternate } => {
                self.visit_if(node, test, consequent, alternate, cursor)
            }
            NodeKind::While { test, body } => self.visit_while(node, test, body, cursor),
            NodeKind::Labeled { body, .. } => {
                // The label identifier itself is not traversed; whichever
                // loop or block the label wraps claims this node.
                let cursor = self.visit_stmt(body, cursor)?;
                self.finish(node, cursor)
            }
            NodeKind::Break { label } => self.visit_jump(node, label, cursor, false),
            NodeKind::Continue { label } => self.visit_jump(node, label, cursor, true),
            NodeKind::ExprStmt { expr } => {
                self.mark_handled(node);
                self.visit_expr(expr, cursor)?;
                self.finish(node, cursor)
            }
            NodeKind::EmptyStmt => {
                self.mark_handled(node);
                self.finish(node, cursor)
            }
            // A bare expression in statement position records its steps and
            // leaves the cursor alone.
            _ => {
                self.visit_expr(node, cursor)?;
                Ok(cursor)
            }
        }
    }

    /// Block-scoped statement list. The join is registered so disposal seals
    /// whatever the cursor ends up as into it; a labeled list additionally
    /// gets a dedicated body block entered via `Marker`.
    fn visit_block_stmt(
        &mut self,
        node: NodeId,
        body: &[NodeId],
        cursor: BlockId,
    ) -> Result<BlockId, BuildError> {
        self.mark_handled(node);
        let join = self.make_block(node, Endpoint::End, "");
        self.scopes.set_join(node, join)?;

        let mut cursor = cursor;
        if let Some((labeled, name)) = self.enclosing_label(node) {
            self.mark_handled(labeled);
            let body_block = self.make_block(node, Endpoint::Start, "");
            self.scopes
                .set_label(&name, node, JumpTargets { enter: None, exit: join })?;
            self.arena.seal(cursor, Completion::Marker(body_block))?;
            cursor = body_block;
        }

        for &stmt in body {
            cursor = self.visit_stmt(stmt, cursor)?;
        }
        self.finish(node, cursor)
    }

    /// if/else. The test evaluates in place, in the fork block itself.
    fn visit_if(
        &mut self,
        node: NodeId,
        test: NodeId,
        consequent: NodeId,
        alternate: Option<NodeId>,
        cursor: BlockId,
    ) -> Result<BlockId, BuildError> {
        self.visit_expr(test, cursor)?;
        let fork = cursor;

        let consequent_block = self.make_block(consequent, Endpoint::Start, "truthy_");
        let join = self.visit_stmt(consequent, consequent_block)?;

        if let Some(alternate) = alternate {
            let alternate_block = self.make_block(alternate, Endpoint::End, "falsey_");
            let alternate_join = self.visit_stmt(alternate, alternate_block)?;
            self.arena.seal(alternate_join, Completion::Normal(join))?;
            self.arena.seal(
                fork,
                Completion::Branch { on_true: consequent_block, on_false: alternate_block },
            )?;
        } else {
            self.arena
                .seal(fork, Completion::Branch { on_true: consequent_block, on_false: join })?;
        }

        self.mark_handled(node);
        self.finish(node, join)
    }

    /// Pretest loop: Marker into the test block, Branch out of it, body
    /// Normal-seals back into the test (the back edge).
    fn visit_while(
        &mut self,
        node: NodeId,
        test: NodeId,
        body: NodeId,
        cursor: BlockId,
    ) -> Result<BlockId, BuildError> {
        let test_block = self.make_block(node, Endpoint::Start, "while_test_");
        let join = self.make_block(node, Endpoint::End, "while_join_");
        self.arena.seal(cursor, Completion::Marker(test_block))?;

        self.visit_expr(test, test_block)?;
        let body_block = self.make_block(test, Endpoint::End, "while_body_");
        self.arena
            .seal(test_block, Completion::Branch { on_true: body_block, on_false: join })?;

        let targets = JumpTargets { enter: Some(test_block), exit: join };
        if let Some((labeled, name)) = self.enclosing_label(node) {
            // Breaking to the label is the same as breaking the loop.
            self.mark_handled(labeled);
            self.scopes.set_label(&name, node, targets)?;
        }
        self.scopes.set_loop(node, targets);

        let body_join = self.visit_stmt(body, body_block)?;
        self.arena.seal(body_join, Completion::Normal(test_block))?;

        self.mark_handled(node);
        self.finish(node, join)
    }

    /// break / continue. Seals the current block with the resolved jump and
    /// parks the cursor on a fresh dead block so syntactically-following
    /// siblings still have a valid container.
    fn visit_jump(
        &mut self,
        node: NodeId,
        label: Option<String>,
        cursor: BlockId,
        is_continue: bool,
    ) -> Result<BlockId, BuildError> {
        self.mark_handled(node);
        let targets = match &label {
            Some(name) => self
                .scopes
                .label_targets(name)
                .ok_or_else(|| BuildError::UnknownLabel(name.clone()))?,
            None => self
                .scopes
                .nearest_loop(self.tree, node)
                .ok_or(BuildError::NotInLoop { label: None })?,
        };
        let completion = if is_continue {
            let enter = targets
                .enter
                .ok_or(BuildError::NotInLoop { label: label.clone() })?;
            Completion::Continue(enter)
        } else {
            Completion::Break(targets.exit)
        };
        self.arena.seal(cursor, completion)?;

        let dead = self.make_block(node, Endpoint::End, "unreachable_");
        self.unreachable.insert(cursor, dead);
        self.finish(node, dead)
    }

    /// Expression traversal. Never moves the cursor; only appends steps.
    /// Operands are visited before their operator is recorded, left to right.
    fn visit_expr(&mut self, node: NodeId, cursor: BlockId) -> Result<(), BuildError> {
        match self.tree.node(node).kind.clone() {
            NodeKind::Identifier { name } => {
                self.record_leaf(node, cursor, StepKind::Identifier, name)
            }
            NodeKind::NumberLit { raw } => {
                self.record_leaf(node, cursor, StepKind::NumberLiteral, raw)
            }
            NodeKind::StringLit { raw } => {
                self.record_leaf(node, cursor, StepKind::StringLiteral, raw)
            }
            NodeKind::BoolLit { value } => {
                self.record_leaf(node, cursor, StepKind::BooleanLiteral, value.to_string())
            }
            NodeKind::NullLit => self.record_leaf(node, cursor, StepKind::NullLiteral, "null"),
            NodeKind::RegexLit { raw } => {
                self.record_leaf(node, cursor, StepKind::RegexLiteral, raw)
            }
            NodeKind::Unary { op, argument } => {
                self.visit_expr(argument, cursor)?;
                self.record_op(node, cursor, StepKind::UnaryOp, op)
            }
            NodeKind::Binary { op, left, right } => {
                self.visit_expr(left, cursor)?;
                self.visit_expr(right, cursor)?;
                self.record_op(node, cursor, StepKind::BinaryOp, op)
            }
            NodeKind::Logical { op, left, right } => {
                self.visit_expr(left, cursor)?;
                self.visit_expr(right, cursor)?;
                self.record_op(node, cursor, StepKind::LogicalOp, op)
            }
            NodeKind::Member { object, property } => {
                self.visit_expr(object, cursor)?;
                self.visit_expr(property, cursor)?;
                self.record_op(node, cursor, StepKind::MemberAccess, "[]")
            }
            // Statements never appear in expression slots; the fallback arm
            // performs only the generic-exit bookkeeping.
            _ => {
                self.finish(node, cursor)?;
                Ok(())
            }
        }
    }

    /// Literals and bare identifiers record only in expression position.
    fn record_leaf(
        &mut self,
        node: NodeId,
        cursor: BlockId,
        kind: StepKind,
        text: impl Into<String>,
    ) -> Result<(), BuildError> {
        if self.in_expression_position(node) {
            self.mark_handled(node);
            self.arena.push_step(cursor, Step::new(kind, text));
        }
        self.finish(node, cursor)?;
        Ok(())
    }

    /// Operators and member accesses record regardless of position.
    fn record_op(
        &mut self,
        node: NodeId,
        cursor: BlockId,
        kind: StepKind,
        text: impl Into<String>,
    ) -> Result<(), BuildError> {
        self.mark_handled(node);
        self.arena.push_step(cursor, Step::new(kind, text));
        self.finish(node, cursor)?;
        Ok(())
    }

    /// Generic per-node exit: coverage marking, then disposal in order
    /// (auto-seal-to-join, loop removal, label-name removal). Returns the
    /// possibly-moved cursor.
    fn finish(&mut self, node: NodeId, cursor: BlockId) -> Result<BlockId, BuildError> {
        if !self.handled.contains(&node) {
            self.unhandled.insert(node);
        }
        let cursor = match self.scopes.join_of(node) {
            Some(join) if self.arena.is_open(cursor) => {
                self.arena.seal(cursor, Completion::Normal(join))?;
                join
            }
            _ => cursor,
        };
        self.scopes.dispose_loop(node);
        self.scopes.dispose_label(node);
        trace!(node = node.index(), "scope disposed");
        Ok(cursor)
    }

    fn mark_handled(&mut self, node: NodeId) {
        self.handled.insert(node);
        self.unhandled.remove(&node);
    }

    /// The label wrapping this node, if its direct parent is a labeled
    /// statement.
    fn enclosing_label(&self, node: NodeId) -> Option<(NodeId, String)> {
        let parent = self.tree.parent(node)?;
        match &self.tree.node(parent).kind {
            NodeKind::Labeled { label, .. } => Some((parent, label.clone())),
            _ => None,
        }
    }

    /// Expression position: direct child of an expression, an expression
    /// statement, the program root, a statement list, or the test slot of a
    /// conditional or pretest loop. Leaves elsewhere are left to the parent
    /// construct's own traversal.
    fn in_expression_position(&self, node: NodeId) -> bool {
        let Some(parent) = self.tree.parent(node) else {
            return false;
        };
        match &self.tree.node(parent).kind {
            kind if kind.is_expression() => true,
            NodeKind::ExprStmt { .. } | NodeKind::Program { .. } | NodeKind::BlockStmt { .. } => {
                true
            }
            NodeKind::If { test, .. } | NodeKind::While { test, .. } => *test == node,
            _ => false,
        }
    }

    fn make_block(&mut self, node: NodeId, endpoint: Endpoint, prefix: &str) -> BlockId {
        let span = self.tree.node(node).span;
        let Pos { line, column } = match endpoint {
            Endpoint::Start => span.start,
            Endpoint::End => span.end,
        };
        let name = format!("{}{}_{}_{}", prefix, self.tree.file().unwrap_or(""), line, column);
        let id = self.arena.alloc(&name);
        trace!(block = %name, "allocated block");
        id
    }
}
