//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

/// Query filesystem metadata with SQL
#[derive(Parser, Debug)]
#[command(name = "dirql")]
#[command(version, about, long_about = None)]
pub struct Args {
    /// Directory to index
    #[arg(default_value = ".")]
    pub directory: PathBuf,

    /// Statement to run; repeatable. Without it, statements are read from stdin
    #[arg(short = 'e', long = "execute", value_name = "QUERY")]
    pub execute: Vec<String>,

    /// Output format
    #[arg(long, value_enum, default_value_t = Format::Table)]
    pub format: Format,

    /// Spell directories as absolute paths
    #[arg(long)]
    pub absolute: bool,

    /// Directory to skip while indexing; repeatable
    #[arg(long, value_name = "DIR")]
    pub ignore: Vec<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Format {
    Table,
    Json,
}
