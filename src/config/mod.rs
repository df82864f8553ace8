#[cfg(feature = "cli")]
pub mod cli;
pub mod lambda;
pub mod toml_config;

pub use toml_config::ReportConfig;

#[cfg(feature = "cli")]
use chrono::NaiveDate;
#[cfg(feature = "cli")]
use clap::Parser;
#[cfg(feature = "cli")]
use std::path::PathBuf;

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Parser)]
#[command(name = "toll-report")]
#[command(about = "Builds last month's toll report and patches the expense report")]
pub struct CliConfig {
    /// Key used to look up portal credentials, usually the sender's email address
    #[arg(long)]
    pub sender: String,

    #[arg(long, help = "TOML file overriding the default report configuration")]
    pub config: Option<PathBuf>,

    #[arg(long, default_value = "./storage", help = "Directory holding one folder per bucket")]
    pub storage_root: PathBuf,

    #[arg(long, default_value = "./credentials.toml")]
    pub credentials_file: PathBuf,

    #[arg(long, help = "Write the reports under this directory instead of the storage root")]
    pub output_path: Option<PathBuf>,

    #[arg(long, help = "Report on the month before this date (YYYY-MM-DD)")]
    pub today: Option<NaiveDate>,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,
}

#[cfg(feature = "cli")]
impl CliConfig {
    pub fn report_config(&self) -> crate::utils::error::Result<ReportConfig> {
        match &self.config {
            Some(path) => ReportConfig::from_file(path),
            None => Ok(ReportConfig::default()),
        }
    }
}
