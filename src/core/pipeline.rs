use crate::config::toml_config::ReportConfig;
use crate::core::aggregate::sum_amount;
use crate::core::extract::extract;
use crate::core::portal::PortalClient;
use crate::core::workbook::{
    build_tolls_workbook, patch_expense_report, read_workbook, write_workbook,
};
use crate::domain::model::{DateRange, ExtractedData, FinishedReports};
use crate::domain::ports::{CredentialProvider, OutputSink, Pipeline, Storage};
use crate::utils::error::Result;
use chrono::NaiveDate;

pub struct TollReportPipeline<C: CredentialProvider, S: Storage, O: OutputSink> {
    credentials: C,
    storage: S,
    sink: O,
    config: ReportConfig,
    portal: PortalClient,
    today: Option<NaiveDate>,
}

impl<C: CredentialProvider, S: Storage, O: OutputSink> TollReportPipeline<C, S, O> {
    pub fn new(credentials: C, storage: S, sink: O, config: ReportConfig) -> Result<Self> {
        let portal = PortalClient::new(config.portal.clone())?;
        Ok(Self {
            credentials,
            storage,
            sink,
            config,
            portal,
            today: None,
        })
    }

    /// Reports on the month before `today` instead of the month before the system date.
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = Some(today);
        self
    }

    fn date_range(&self) -> DateRange {
        match self.today {
            Some(today) => DateRange::previous_month(today),
            None => DateRange::for_today(),
        }
    }
}

#[async_trait::async_trait]
impl<C: CredentialProvider, S: Storage, O: OutputSink> Pipeline for TollReportPipeline<C, S, O> {
    async fn extract(&self, key: &str) -> Result<ExtractedData> {
        let range = self.date_range();
        tracing::info!("Reporting period: {}", range);

        let expense = &self.config.expense_report;
        tracing::debug!("Loading expense report {}/{}", expense.bucket, expense.key);
        let expense_report = self.storage.read_object(&expense.bucket, &expense.key).await?;

        let credentials = self.credentials.credentials(key).await?;
        let document = self.portal.fetch_transactions(&credentials, &range).await?;

        Ok(ExtractedData {
            range,
            document,
            expense_report,
        })
    }

    async fn transform(&self, extracted: ExtractedData) -> Result<FinishedReports> {
        let amount_header = &self.config.extract.amount_header;

        let table = extract(&extracted.document, &self.config.extract)?;
        let total = sum_amount(&table, amount_header)?;
        tracing::info!("{} transactions totalling {}", table.len(), total);

        let tolls =
            build_tolls_workbook(&table, amount_header, &self.config.output.tolls_sheet_name)?;
        let expense = patch_expense_report(
            read_workbook(&extracted.expense_report)?,
            &extracted.range,
            &total,
            &self.config.expense_report,
        )?;

        Ok(FinishedReports {
            range: extracted.range,
            total,
            transactions: table.len(),
            expense_report: write_workbook(&expense)?,
            tolls_report: write_workbook(&tolls)?,
        })
    }

    async fn load(&self, reports: &FinishedReports) -> Result<String> {
        tracing::debug!(
            "Delivering reports ({} + {} bytes)",
            reports.expense_report.len(),
            reports.tolls_report.len()
        );
        self.sink.deliver(reports).await
    }
}
