//! ESTree JSON loader.
//!
//! Parsing source text is out of scope; the tree arrives as ESTree-style
//! JSON (the shape babylon emits, a `File` wrapper or a bare `Program`) and
//! is converted into the closed [`NodeKind`] set. Anything outside that set
//! is rejected up front rather than silently skipped.

use serde_json::Value;

use crate::domain::ast::{NodeId, NodeKind, Span, SyntaxTree};
use crate::ports::AstLoader;

#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("invalid AST JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unsupported syntax kind `{0}`")]
    UnsupportedKind(String),

    #[error("node is missing `{0}`")]
    MissingField(&'static str),
}

pub struct EstreeLoader;

impl AstLoader for EstreeLoader {
    fn load(&self, src: &str) -> anyhow::Result<SyntaxTree> {
        Ok(Self::parse(src)?)
    }
}

impl EstreeLoader {
    pub fn parse(src: &str) -> Result<SyntaxTree, LoadError> {
        let value: Value = serde_json::from_str(src)?;
        let program = if value["type"] == "File" { &value["program"] } else { &value };
        let file = program["loc"]["filename"].as_str().map(str::to_string);

        let mut tree = SyntaxTree::new(file);
        let root = Self::convert(program, &mut tree)?;
        tree.set_root(root);
        Ok(tree)
    }

    fn convert(v: &Value, tree: &mut SyntaxTree) -> Result<NodeId, LoadError> {
        let ty = v["type"].as_str().ok_or(LoadError::MissingField("type"))?;
        let span = Self::span(v)?;

        let kind = match ty {
            "Program" => NodeKind::Program { body: Self::convert_list(&v["body"], tree)? },
            "BlockStatement" => NodeKind::BlockStmt { body: Self::convert_list(&v["body"], tree)? },
            "ExpressionStatement" => {
                NodeKind::ExprStmt { expr: Self::convert(&v["expression"], tree)? }
            }
            "EmptyStatement" => NodeKind::EmptyStmt,
            "IfStatement" => {
                let test = Self::convert(&v["test"], tree)?;
                let consequent = Self::convert(&v["consequent"], tree)?;
                let alternate = match &v["alternate"] {
                    Value::Null => None,
                    alt => Some(Self::convert(alt, tree)?),
                };
                NodeKind::If { test, consequent, alternate }
            }
            "WhileStatement" => {
                let test = Self::convert(&v["test"], tree)?;
                let body = Self::convert(&v["body"], tree)?;
                NodeKind::While { test, body }
            }
            "LabeledStatement" => {
                let label = v["label"]["name"]
                    .as_str()
                    .ok_or(LoadError::MissingField("label"))?
                    .to_string();
                let body = Self::convert(&v["body"], tree)?;
                NodeKind::Labeled { label, body }
            }
            "BreakStatement" => NodeKind::Break { label: Self::jump_label(v) },
            "ContinueStatement" => NodeKind::Continue { label: Self::jump_label(v) },
            "Identifier" => NodeKind::Identifier {
                name: v["name"].as_str().ok_or(LoadError::MissingField("name"))?.to_string(),
            },
            "NumericLiteral" => NodeKind::NumberLit { raw: Self::raw(v) },
            "StringLiteral" => NodeKind::StringLit { raw: Self::raw(v) },
            "BooleanLiteral" => NodeKind::BoolLit {
                value: v["value"].as_bool().ok_or(LoadError::MissingField("value"))?,
            },
            "NullLiteral" => NodeKind::NullLit,
            "RegExpLiteral" => NodeKind::RegexLit { raw: Self::raw(v) },
            "UnaryExpression" => {
                let op = Self::operator(v)?;
                let argument = Self::convert(&v["argument"], tree)?;
                NodeKind::Unary { op, argument }
            }
            "BinaryExpression" => {
                let op = Self::operator(v)?;
                let left = Self::convert(&v["left"], tree)?;
                let right = Self::convert(&v["right"], tree)?;
                NodeKind::Binary { op, left, right }
            }
            "LogicalExpression" => {
                let op = Self::operator(v)?;
                let left = Self::convert(&v["left"], tree)?;
                let right = Self::convert(&v["right"], tree)?;
                NodeKind::Logical { op, left, right }
            }
            "MemberExpression" => {
                let object = Self::convert(&v["object"], tree)?;
                let property = Self::convert(&v["property"], tree)?;
                NodeKind::Member { object, property }
            }
            other => return Err(LoadError::UnsupportedKind(other.to_string())),
        };
        Ok(tree.push(kind, span))
    }

    fn convert_list(v: &Value, tree: &mut SyntaxTree) -> Result<Vec<NodeId>, LoadError> {
        match v.as_array() {
            Some(items) => items.iter().map(|item| Self::convert(item, tree)).collect(),
            None => Err(LoadError::MissingField("body")),
        }
    }

    fn jump_label(v: &Value) -> Option<String> {
        v["label"]["name"].as_str().map(str::to_string)
    }

    /// Raw source text of a literal; babylon keeps it under `extra.raw`,
    /// falling back to the parsed `value`.
    fn raw(v: &Value) -> String {
        if let Some(raw) = v["extra"]["raw"].as_str() {
            return raw.to_string();
        }
        match &v["value"] {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        }
    }

    fn operator(v: &Value) -> Result<String, LoadError> {
        v["operator"]
            .as_str()
            .map(str::to_string)
            .ok_or(LoadError::MissingField("operator"))
    }

    fn span(v: &Value) -> Result<Span, LoadError> {
        let pos = |which: &str, field: &str| -> Option<u64> { v["loc"][which][field].as_u64() };
        match (
            pos("start", "line"),
            pos("start", "column"),
            pos("end", "line"),
            pos("end", "column"),
        ) {
            (Some(sl), Some(sc), Some(el), Some(ec)) => {
                Ok(Span::new(sl as u32, sc as u32, el as u32, ec as u32))
            }
            _ => Err(LoadError::MissingField("loc")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ast::NodeKind;

    fn loc(line: u64) -> String {
        format!(
            r#""loc": {{"start": {{"line": {line}, "column": 0}}, "end": {{"line": {line}, "column": 10}}}}"#
        )
    }

    #[test]
    fn parses_a_minimal_program() {
        let json = format!(
            r#"{{"type": "Program", {}, "body": [
                {{"type": "ExpressionStatement", {},
                 "expression": {{"type": "Identifier", "name": "a", {}}}}}
            ]}}"#,
            loc(1),
            loc(1),
            loc(1)
        );
        let tree = EstreeLoader::parse(&json).unwrap();
        let root = tree.root().unwrap();
        assert!(matches!(tree.node(root).kind, NodeKind::Program { .. }));
        assert_eq!(tree.len(), 3);
    }

    #[test]
    fn rejects_unsupported_kinds() {
        let json = format!(r#"{{"type": "ForStatement", {}}}"#, loc(1));
        let err = EstreeLoader::parse(&json).unwrap_err();
        assert!(matches!(err, LoadError::UnsupportedKind(k) if k == "ForStatement"));
    }

    #[test]
    fn missing_loc_is_an_error() {
        let err = EstreeLoader::parse(r#"{"type": "Program", "body": []}"#).unwrap_err();
        assert!(matches!(err, LoadError::MissingField("loc")));
    }
}
