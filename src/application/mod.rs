// Use-case wiring: load a syntax tree, build the graph, export it.

use std::path::Path;

use anyhow::Context;

use crate::domain::builder::CfgBuilder;
use crate::domain::cfg::Cfg;
use crate::ports::{AstLoader, GraphExporter};

pub struct BuildUsecase<'a> {
    pub loader: &'a dyn AstLoader,
    pub exporter: &'a dyn GraphExporter,
}

impl BuildUsecase<'_> {
    pub fn run(&self, ast_json: &str, export_path: &Path) -> anyhow::Result<Cfg> {
        let tree = self.loader.load(ast_json).context("loading syntax tree")?;
        let cfg = CfgBuilder::build(&tree).context("control-flow graph construction failed")?;
        self.exporter
            .export(&cfg, export_path)
            .with_context(|| format!("writing {}", export_path.display()))?;
        Ok(cfg)
    }
}
