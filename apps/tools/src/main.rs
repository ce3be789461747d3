use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use packaging::{Manifest, PackagingJob};
use tracing_subscriber::EnvFilter;

const DEFAULT_LOG_FILTER: &str = "info";

#[derive(Parser, Debug)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Write manifest.json and build the .streamDeckPlugin bundle.
    Package {
        #[arg(long, default_value = ".")]
        plugin_dir: PathBuf,
        #[arg(long)]
        entry: PathBuf,
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Print the plugin manifest.
    Manifest,
}

/// `RUST_LOG` wins when it parses; otherwise `default` applies.
fn env_filter(rust_log: Option<&str>, default: &str) -> EnvFilter {
    rust_log
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .unwrap_or_else(|| EnvFilter::new(default))
}

fn main() -> Result<()> {
    let rust_log = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    tracing_subscriber::fmt()
        .with_env_filter(env_filter(rust_log.as_deref(), DEFAULT_LOG_FILTER))
        .init();
    let cli = Cli::parse();

    match cli.command {
        Command::Package {
            plugin_dir,
            entry,
            output,
        } => {
            let mut job = PackagingJob::new(plugin_dir, entry);
            if let Some(output) = output {
                job = job.with_output(output);
            }
            let report = job.run()?;
            println!(
                "packaged {} ({} entries, {} bytes)",
                report.output.display(),
                report.entries.len(),
                report.total_bytes
            );
        }
        Command::Manifest => {
            println!("{}", Manifest::steam_status_toggle().to_json_pretty()?);
        }
    }

    Ok(())
}

#[cfg(test)]
#[path = "tests/main_tests.rs"]
mod tests;
