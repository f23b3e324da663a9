//! Graphviz DOT Exporter
//!
//! Renders the reachable block graph as a DOT digraph: nodes labeled with the
//! block identifier plus its step dumps, edges labeled by completion kind.
//! Dead blocks from the unreachable map are drawn dashed.

use std::collections::HashSet;
use std::io::Result;
use std::path::Path;

use crate::domain::block::Completion;
use crate::domain::cfg::Cfg;
use crate::ports::GraphExporter;

pub struct DotExporter;

impl GraphExporter for DotExporter {
    fn export(&self, cfg: &Cfg, path: &Path) -> Result<()> {
        std::fs::write(path, Self::to_dot(cfg))
    }
}

impl DotExporter {
    /// Convert a finished graph to a DOT string.
    pub fn to_dot(cfg: &Cfg) -> String {
        let mut lines = Vec::new();

        lines.push("digraph Cfg {".to_string());
        lines.push("    rankdir=TB;".to_string());
        lines.push("    node [fontname=\"Helvetica\", fontsize=12, shape=box];".to_string());
        lines.push("    edge [fontname=\"Helvetica\", fontsize=10];".to_string());
        lines.push("".to_string());

        let reachable = cfg.reachable();
        let reachable_set: HashSet<_> = reachable.iter().copied().collect();

        for &id in &reachable {
            let block = cfg.block(id);
            let (shape, style) = if id == cfg.root() || id == cfg.exit() {
                ("box", "rounded")
            } else if matches!(block.completion(), Some(Completion::Branch { .. })) {
                ("diamond", "solid")
            } else {
                ("box", "solid")
            };
            lines.push(format!(
                "    b{} [label=\"{}\", shape={}, style=\"{}\"];",
                id.index(),
                Self::escape_label(&Self::block_label(cfg, id)),
                shape,
                style
            ));
        }

        // Dead successors are never wired into the live graph; render them
        // dashed, with a dashed edge back to the block they follow.
        for (&sealed, &dead) in cfg.unreachable() {
            if reachable_set.contains(&dead) {
                continue;
            }
            lines.push(format!(
                "    b{} [label=\"{}\", shape=box, style=\"dashed\"];",
                dead.index(),
                Self::escape_label(&Self::block_label(cfg, dead)),
            ));
            lines.push(format!(
                "    b{} -> b{} [label=\"unreachable\", style=dashed];",
                sealed.index(),
                dead.index()
            ));
        }

        lines.push("".to_string());

        for &id in &reachable {
            if let Some(completion) = cfg.block(id).completion() {
                match *completion {
                    Completion::Normal(t)
                    | Completion::Marker(t)
                    | Completion::Break(t)
                    | Completion::Continue(t) => {
                        lines.push(format!(
                            "    b{} -> b{} [label=\"{}\"];",
                            id.index(),
                            t.index(),
                            completion.kind_label()
                        ));
                    }
                    Completion::Branch { on_true, on_false } => {
                        lines.push(format!(
                            "    b{} -> b{} [label=\"true\"];",
                            id.index(),
                            on_true.index()
                        ));
                        lines.push(format!(
                            "    b{} -> b{} [label=\"false\"];",
                            id.index(),
                            on_false.index()
                        ));
                    }
                }
            }
        }

        lines.push("}".to_string());
        lines.join("\n")
    }

    fn block_label(cfg: &Cfg, id: crate::domain::block::BlockId) -> String {
        let block = cfg.block(id);
        let mut label = block.name().to_string();
        for step in block.steps() {
            label.push('\n');
            label.push_str(&step.dump);
        }
        label
    }

    fn escape_label(label: &str) -> String {
        label
            .replace('\\', "\\\\")
            .replace('"', "\\\"")
            .replace('\n', "\\n")
    }
}
