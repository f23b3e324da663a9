// Infrastructure implementations for flowsketch.

pub mod estree;

pub use estree::{EstreeLoader, LoadError};
