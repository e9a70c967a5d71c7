use std::path::PathBuf;

use clap::Parser;

/// Command-line arguments
#[derive(Parser, Debug)]
#[command(name = "ferroftpd", about = "A passive-mode FTP server written in Rust.")]
pub struct Cli {
    /// Path to the configuration file
    #[arg(short, long)]
    pub config: Option<String>,

    /// Control-channel listen address, overriding the configuration file
    #[arg(short, long)]
    pub listen: Option<String>,

    /// Serve an existing directory instead of a seeded scratch root
    #[arg(short, long)]
    pub root: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}
