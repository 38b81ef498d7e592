//! CLI definition using clap

use anpr_types::{OutputFormat, Rect};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "anpr")]
#[command(author = "yuuji")]
#[command(version)]
#[command(about = "License plate recognition through a staged, queue-gated engine")]
#[command(long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Directory holding the packaged engine assets
    #[arg(long, global = true)]
    pub assets: Option<PathBuf>,

    /// Writable directory to stage assets into
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// External recognizer command
    #[arg(long, global = true)]
    pub engine: Option<String>,

    /// Output format (json, table). Uses config value if not specified.
    #[arg(long, short = 'f', global = true)]
    pub format: Option<OutputFormat>,

    /// Log filter (overridden by RUST_LOG)
    #[arg(long, global = true, default_value = "warn")]
    pub log_level: String,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Stage the packaged engine assets into the data directory
    Stage {
        /// List staged files afterwards
        #[arg(long)]
        list: bool,
    },

    /// Recognize plates in an image
    Recognize {
        /// Path to image file
        image: PathBuf,

        /// Country code. Uses config value if not specified.
        #[arg(long, short = 'c')]
        country: Option<String>,

        /// Ranked readings per plate. Uses config value if not specified.
        #[arg(long, short = 'n')]
        top_n: Option<u32>,

        /// Default region pattern (e.g., "md")
        #[arg(long, short = 'p')]
        region: Option<String>,

        /// Region of interest as x,y,width,height (repeatable)
        #[arg(long = "roi")]
        regions: Vec<Rect>,

        /// Send the image as an encoded byte buffer instead of a path
        #[arg(long)]
        bytes: bool,

        /// Let the engine detect the plate region
        #[arg(long)]
        detect_region: bool,
    },

    /// Show or update configuration
    Config {
        /// Show current configuration
        #[arg(long)]
        show: bool,

        /// Set default country
        #[arg(long)]
        set_country: Option<String>,

        /// Set default top-N
        #[arg(long)]
        set_top_n: Option<u32>,

        /// Set default region pattern
        #[arg(long)]
        set_region: Option<String>,

        /// Set prewarp transform
        #[arg(long)]
        set_prewarp: Option<String>,

        /// Set asset source directory
        #[arg(long)]
        set_assets: Option<PathBuf>,

        /// Set recognizer command
        #[arg(long)]
        set_engine: Option<String>,

        /// Set default output format
        #[arg(long)]
        set_format: Option<OutputFormat>,
    },
}
