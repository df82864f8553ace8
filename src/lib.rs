pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::{
    cli::{FileCredentialStore, LocalStorage},
    CliConfig,
};

#[cfg(feature = "lambda")]
pub use config::lambda::{DynamoCredentialStore, LambdaConfig, S3Storage};

pub use config::ReportConfig;
pub use crate::core::{etl::EtlEngine, pipeline::TollReportPipeline, sink::StorageSink};
pub use utils::error::{Result, TollError};
