use std::io;
use std::path::Path;

use crate::domain::ast::SyntaxTree;
use crate::domain::cfg::Cfg;

pub mod dot_exporter;
pub mod json_exporter;

pub trait AstLoader {
    fn load(&self, src: &str) -> anyhow::Result<SyntaxTree>;
}

pub trait GraphExporter {
    fn export(&self, cfg: &Cfg, path: &Path) -> io::Result<()>;
}
