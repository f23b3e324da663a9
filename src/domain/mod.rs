// Domain layer: the syntax tree model and the CFG construction algorithm.

pub mod ast;
pub mod block;
pub mod builder;
pub mod cfg;
pub mod error;
pub mod scope;
