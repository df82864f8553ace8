pub mod aggregate;
pub mod etl;
pub mod extract;
pub mod pipeline;
pub mod portal;
pub mod sink;
pub mod workbook;

pub use crate::domain::model::{
    Credentials, DateRange, FinishedReports, NormalizedTable, RawDocument, RunSummary, Total,
};
pub use crate::domain::ports::{CredentialProvider, OutputSink, Pipeline, Storage};
pub use crate::utils::error::Result;
