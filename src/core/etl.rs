use crate::core::Pipeline;
use crate::domain::model::RunSummary;
use crate::utils::error::Result;

pub struct EtlEngine<P: Pipeline> {
    pipeline: P,
}

impl<P: Pipeline> EtlEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self { pipeline }
    }

    /// Runs one report for the sender identified by `key`. Nothing is delivered unless
    /// every step before `load` succeeded.
    pub async fn run(&self, key: &str) -> Result<RunSummary> {
        tracing::info!("Starting toll report run for {}", key);

        tracing::info!("Extracting data...");
        let extracted = self.pipeline.extract(key).await?;

        tracing::info!("Transforming data...");
        let reports = self.pipeline.transform(extracted).await?;

        tracing::info!("Loading reports...");
        let output_location = self.pipeline.load(&reports).await?;
        tracing::info!("Output saved to: {}", output_location);

        Ok(RunSummary {
            range: reports.range,
            total: reports.total,
            transactions: reports.transactions,
            output_location,
        })
    }
}
