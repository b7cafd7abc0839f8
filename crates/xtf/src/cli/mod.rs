//! CLI support for the `xtf` binary.

pub mod args;
pub mod commands;
pub mod context;
pub mod output;
