// Main library entry point for flowsketch.

pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod ports;
