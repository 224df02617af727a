//! CLI subcommands.

pub mod init;
pub mod list;
pub mod pack;
pub mod serve;
