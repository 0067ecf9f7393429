//! CLI subcommand implementations for the partfetch binary.

pub mod doctor;
pub mod extract_cmd;
pub mod fetch_cmd;
pub mod output;
