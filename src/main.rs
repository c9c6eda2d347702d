//! gzsum - checksum-gated gzip archiver

use anyhow::{Context, Result};
use clap::Parser;
use gzsum_core::{ArchiveOptions, ArchiveOutcome, Archiver, GzipOptions};
use log::LevelFilter;
use std::io::Write;

mod cli;
use cli::{Cli, Commands};

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        _ => LevelFilter::Debug,
    };

    let mut builder = env_logger::Builder::new();
    builder.filter_level(level);

    // Just the level and message
    builder.format(|buf, record| writeln!(buf, "[{}] {}", record.level(), record.args()));

    // RUST_LOG wins over -v
    builder.parse_default_env();
    let _ = builder.try_init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Archive { input, output, level } => {
            let archiver = Archiver::new(ArchiveOptions {
                gzip: GzipOptions {
                    level,
                    ..GzipOptions::default()
                },
            });

            let outcome = archiver
                .archive(&input, &output)
                .with_context(|| format!("Failed to archive {} -> {}", input.display(), output.display()))?;

            match outcome {
                ArchiveOutcome::Skipped { .. } => {
                    println!("Checksum matched...");
                }
                ArchiveOutcome::Compressed {
                    digest,
                    bytes_in,
                    bytes_out,
                } => {
                    let ratio = if bytes_in > 0 {
                        (bytes_out as f64 / bytes_in as f64) * 100.0
                    } else {
                        0.0
                    };
                    println!("Archived: {} -> {}", input.display(), output.display());
                    println!("  Gzip level: {}", archiver.codec().options().level);
                    println!("  Original size: {} bytes", bytes_in);
                    println!("  Compressed size: {} bytes", bytes_out);
                    println!("  Ratio: {:.2}%", ratio);
                    println!("  MD5: {}", digest);
                }
            }

            Ok(())
        }

        Commands::Unarchive { input, output } => {
            let bytes = Archiver::default()
                .unarchive(&input, &output)
                .with_context(|| format!("Failed to unarchive {} -> {}", input.display(), output.display()))?;

            println!("Unarchived: {} -> {} ({} bytes)", input.display(), output.display(), bytes);
            Ok(())
        }
    }
}
