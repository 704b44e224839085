//! CLI subcommands.

pub mod proxy;
