//! Command-line interface for gzsum

use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "gzsum")]
#[command(about = "gzsum - gzip a file once, remembering its MD5", long_about = None)]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug). RUST_LOG overrides this.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Convert a file to gzip, recording its MD5 in <out>.md5
    ///
    /// Skipped when <out>.md5 already holds the checksum of <in>.
    /// The input file is removed after a successful run.
    Archive {
        /// Input file
        #[arg(value_name = "in")]
        input: PathBuf,

        /// Output gzip file
        #[arg(value_name = "out")]
        output: PathBuf,

        /// Gzip compression level (0-9, higher = better compression)
        #[arg(short, long, default_value = "6", value_parser = clap::value_parser!(u32).range(0..=9))]
        level: u32,
    },

    /// Unarchive a gzip file
    Unarchive {
        /// Input archive file
        #[arg(value_name = "in")]
        input: PathBuf,

        /// Output file to unarchive into
        #[arg(value_name = "out")]
        output: PathBuf,
    },
}
