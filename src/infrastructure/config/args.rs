//! Command-line arguments.

use super::app_config::LogLevel;
use crate::application::Continuation;
use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(
    name = "newsreel",
    version,
    about = "Pages through a news feed and resolves article images",
    long_about = None
)]
/// Command-line options. Each one overrides the matching config file setting.
pub struct CliArgs {
    /// Configuration file path.
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Log file path.
    #[arg(long, value_name = "PATH")]
    pub log_path: Option<PathBuf>,

    /// Log verbosity level.
    #[arg(long, value_enum)]
    pub log_level: Option<LogLevel>,

    /// Feed base address.
    #[arg(long, env = "NEWSREEL_FEED_URL", value_name = "URL")]
    pub base_url: Option<String>,

    /// Items requested per page.
    #[arg(long)]
    pub page_size: Option<u32>,

    /// Request timeout in seconds for feed and image downloads.
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// When the feed counts as exhausted.
    #[arg(long, value_enum)]
    pub continuation: Option<Continuation>,

    /// Number of pages to load before exiting.
    #[arg(long, default_value_t = 2)]
    pub pages: u32,

    /// Number of recycled image rows, i.e. the visible window size.
    #[arg(long, default_value_t = 5)]
    pub slots: usize,
}
