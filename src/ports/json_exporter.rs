//! JSON Exporter
//!
//! Serializes the finished graph as a flat DTO: every block with its steps
//! and completion, the unreachable pairs, and the coverage report.

use std::io::Result;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::domain::block::Completion;
use crate::domain::cfg::Cfg;
use crate::ports::GraphExporter;

#[derive(Debug, Serialize, Deserialize)]
pub struct GraphDto {
    pub root: String,
    pub exit: String,
    pub blocks: Vec<BlockDto>,
    pub unreachable: Vec<DeadPairDto>,
    pub unhandled: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct BlockDto {
    pub id: String,
    pub name: String,
    pub steps: Vec<String>,
    pub completion: Option<CompletionDto>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CompletionDto {
    pub kind: String,
    pub targets: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DeadPairDto {
    pub after: String,
    pub dead: String,
}

impl From<&Cfg> for GraphDto {
    fn from(cfg: &Cfg) -> Self {
        let id_of = |id: crate::domain::block::BlockId| format!("b{}", id.index());

        let blocks = cfg
            .blocks()
            .map(|(id, block)| {
                let completion = block.completion().map(|c| {
                    // Exhaustive on purpose: a new completion kind must show
                    // up here, not be silently dropped.
                    let kind = match c {
                        Completion::Normal(_) => "normal",
                        Completion::Marker(_) => "marker",
                        Completion::Branch { .. } => "branch",
                        Completion::Break(_) => "break",
                        Completion::Continue(_) => "continue",
                    };
                    CompletionDto {
                        kind: kind.to_string(),
                        targets: c.targets().into_iter().map(id_of).collect(),
                    }
                });
                BlockDto {
                    id: id_of(id),
                    name: block.name().to_string(),
                    steps: block.steps().iter().map(|s| s.dump.clone()).collect(),
                    completion,
                }
            })
            .collect();

        let unreachable = cfg
            .unreachable()
            .iter()
            .map(|(&after, &dead)| DeadPairDto { after: id_of(after), dead: id_of(dead) })
            .collect();

        GraphDto {
            root: id_of(cfg.root()),
            exit: id_of(cfg.exit()),
            blocks,
            unreachable,
            unhandled: cfg.unhandled_kinds().iter().map(|k| k.to_string()).collect(),
        }
    }
}

pub struct JsonExporter;

impl GraphExporter for JsonExporter {
    fn export(&self, cfg: &Cfg, path: &Path) -> Result<()> {
        let dto = GraphDto::from(cfg);
        let content = serde_json::to_string_pretty(&dto)?;
        std::fs::write(path, content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ast::{NodeKind, Span, SyntaxTree};
    use crate::domain::builder::CfgBuilder;

    #[test]
    fn dto_carries_completions_and_steps() {
        let mut tree = SyntaxTree::new(None);
        let a = tree.push(NodeKind::Identifier { name: "a".into() }, Span::new(1, 0, 1, 1));
        let stmt = tree.push(NodeKind::ExprStmt { expr: a }, Span::new(1, 0, 1, 2));
        let program = tree.push(NodeKind::Program { body: vec![stmt] }, Span::new(1, 0, 1, 2));
        tree.set_root(program);

        let cfg = CfgBuilder::build(&tree).unwrap();
        let dto = GraphDto::from(&cfg);

        assert_eq!(dto.root, "b0");
        assert_eq!(dto.exit, "b1");
        let root = dto.blocks.iter().find(|b| b.name == "root").unwrap();
        assert_eq!(root.completion.as_ref().unwrap().kind, "marker");
        assert!(dto
            .blocks
            .iter()
            .any(|b| b.steps.contains(&"Identifier a".to_string())));
    }
}
