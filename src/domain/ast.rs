// Syntax tree structures for flowsketch.
// The tree arrives pre-parsed (an external parser's output); nodes live in a
// flat arena and refer to each other by index so that parent walks and
// registry keys never need shared references.

/// Handle into a [`SyntaxTree`]'s node arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// A line/column pair as reported by the parser (1-based line, 0-based column).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pos {
    pub line: u32,
    pub column: u32,
}

/// Source extent of a node. Block display names are derived from these.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub start: Pos,
    pub end: Pos,
}

impl Span {
    pub fn new(start_line: u32, start_column: u32, end_line: u32, end_column: u32) -> Self {
        Span {
            start: Pos { line: start_line, column: start_column },
            end: Pos { line: end_line, column: end_column },
        }
    }
}

/// Supported syntax node kinds (closed set; the builder matches exhaustively).
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    Program { body: Vec<NodeId> },
    BlockStmt { body: Vec<NodeId> },
    ExprStmt { expr: NodeId },
    EmptyStmt,
    If { test: NodeId, consequent: NodeId, alternate: Option<NodeId> },
    While { test: NodeId, body: NodeId },
    Labeled { label: String, body: NodeId },
    Break { label: Option<String> },
    Continue { label: Option<String> },
    Identifier { name: String },
    NumberLit { raw: String },
    StringLit { raw: String },
    BoolLit { value: bool },
    NullLit,
    RegexLit { raw: String },
    Unary { op: String, argument: NodeId },
    Binary { op: String, left: NodeId, right: NodeId },
    Logical { op: String, left: NodeId, right: NodeId },
    Member { object: NodeId, property: NodeId },
}

impl NodeKind {
    /// ESTree-style kind name, used for coverage reporting and diagnostics.
    pub fn name(&self) -> &'static str {
        match self {
            NodeKind::Program { .. } => "Program",
            NodeKind::BlockStmt { .. } => "BlockStatement",
            NodeKind::ExprStmt { .. } => "ExpressionStatement",
            NodeKind::EmptyStmt => "EmptyStatement",
            NodeKind::If { .. } => "IfStatement",
            NodeKind::While { .. } => "WhileStatement",
            NodeKind::Labeled { .. } => "LabeledStatement",
            NodeKind::Break { .. } => "BreakStatement",
            NodeKind::Continue { .. } => "ContinueStatement",
            NodeKind::Identifier { .. } => "Identifier",
            NodeKind::NumberLit { .. } => "NumericLiteral",
            NodeKind::StringLit { .. } => "StringLiteral",
            NodeKind::BoolLit { .. } => "BooleanLiteral",
            NodeKind::NullLit => "NullLiteral",
            NodeKind::RegexLit { .. } => "RegExpLiteral",
            NodeKind::Unary { .. } => "UnaryExpression",
            NodeKind::Binary { .. } => "BinaryExpression",
            NodeKind::Logical { .. } => "LogicalExpression",
            NodeKind::Member { .. } => "MemberExpression",
        }
    }

    pub fn is_expression(&self) -> bool {
        matches!(
            self,
            NodeKind::Identifier { .. }
                | NodeKind::NumberLit { .. }
                | NodeKind::StringLit { .. }
                | NodeKind::BoolLit { .. }
                | NodeKind::NullLit
                | NodeKind::RegexLit { .. }
                | NodeKind::Unary { .. }
                | NodeKind::Binary { .. }
                | NodeKind::Logical { .. }
                | NodeKind::Member { .. }
        )
    }

    fn child_ids(&self) -> Vec<NodeId> {
        match self {
            NodeKind::Program { body } | NodeKind::BlockStmt { body } => body.clone(),
            NodeKind::ExprStmt { expr } => vec![*expr],
            NodeKind::If { test, consequent, alternate } => {
                let mut ids = vec![*test, *consequent];
                ids.extend(*alternate);
                ids
            }
            NodeKind::While { test, body } => vec![*test, *body],
            NodeKind::Labeled { body, .. } => vec![*body],
            NodeKind::Unary { argument, .. } => vec![*argument],
            NodeKind::Binary { left, right, .. } | NodeKind::Logical { left, right, .. } => {
                vec![*left, *right]
            }
            NodeKind::Member { object, property } => vec![*object, *property],
            NodeKind::EmptyStmt
            | NodeKind::Break { .. }
            | NodeKind::Continue { .. }
            | NodeKind::Identifier { .. }
            | NodeKind::NumberLit { .. }
            | NodeKind::StringLit { .. }
            | NodeKind::BoolLit { .. }
            | NodeKind::NullLit
            | NodeKind::RegexLit { .. } => Vec::new(),
        }
    }
}

/// One node of the arena.
#[derive(Debug)]
pub struct SyntaxNode {
    pub kind: NodeKind,
    pub span: Span,
    pub parent: Option<NodeId>,
}

/// Flat arena of syntax nodes plus an optional source-file identifier.
///
/// Children are pushed before the node that refers to them; `set_root` then
/// fixes up the parent links by walking down from the root.
#[derive(Debug, Default)]
pub struct SyntaxTree {
    file: Option<String>,
    nodes: Vec<SyntaxNode>,
    root: Option<NodeId>,
}

impl SyntaxTree {
    pub fn new(file: Option<String>) -> Self {
        SyntaxTree { file, nodes: Vec::new(), root: None }
    }

    pub fn push(&mut self, kind: NodeKind, span: Span) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(SyntaxNode { kind, span, parent: None });
        id
    }

    /// Designate the root and wire every node's parent link.
    pub fn set_root(&mut self, root: NodeId) {
        self.root = Some(root);
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            for child in self.nodes[id.index()].kind.child_ids() {
                self.nodes[child.index()].parent = Some(id);
                stack.push(child);
            }
        }
    }

    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    pub fn node(&self, id: NodeId) -> &SyntaxNode {
        &self.nodes[id.index()]
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.index()].parent
    }

    /// Walk from a node's parent up to the root.
    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(self.parent(id), move |&n| self.parent(n))
    }

    pub fn file(&self) -> Option<&str> {
        self.file.as_deref()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}
