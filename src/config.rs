use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use reqwest::Url;

use crate::error::ConfigError;
use crate::rate_limit::{TimeUnit, WindowConfig};

// CLI argument structure
#[derive(Parser, Debug, Clone)]
#[command(name = "crpt-client")]
#[command(about = "Rate-limited document submission client")]
pub struct Args {
    // Document creation endpoint
    #[arg(short, long, default_value = "https://ismp.crpt.ru/api/v3/lk/documents/create")]
    pub endpoint: Url,

    // Rate window granularity; the window is one of these. Required.
    #[arg(short, long, value_enum)]
    pub time_unit: Option<TimeUnit>,

    // Max documents sent per window
    #[arg(short = 'l', long, default_value_t = 10, allow_negative_numbers = true)]
    pub request_limit: i64,

    // JSON document to submit; the built-in sample when absent
    #[arg(short, long)]
    pub document: Option<PathBuf>,

    // Opaque signature passed along with the document
    #[arg(short, long, default_value = "signature")]
    pub signature: String,

    // How many times to submit the document
    #[arg(short, long, default_value_t = 1)]
    pub repeat: u32,

    // HTTP request timeout in seconds
    #[arg(long, default_value_t = 30)]
    pub http_timeout: u64,

    // Log filter used when RUST_LOG is unset
    #[arg(long, default_value = "info")]
    pub log_level: String,

    // Print prometheus metrics before exiting
    #[arg(long)]
    pub print_metrics: bool,
}

impl Args {
    pub fn window(&self) -> Result<WindowConfig, ConfigError> {
        WindowConfig::new(self.time_unit, self.request_limit)
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout)
    }
}
