use crate::domain::model::FinishedReports;
use crate::domain::ports::{OutputSink, Storage};
use crate::utils::error::Result;

/// Delivers both reports through a `Storage` backend, all or nothing.
pub struct StorageSink<S: Storage> {
    storage: S,
    bucket: String,
    prefix: String,
}

impl<S: Storage> StorageSink<S> {
    pub fn new(storage: S, bucket: impl Into<String>, prefix: impl Into<String>) -> Self {
        Self {
            storage,
            bucket: bucket.into(),
            prefix: prefix.into(),
        }
    }

    fn object_key(&self, name: &str) -> String {
        let prefix = self.prefix.trim_matches('/');
        if prefix.is_empty() {
            name.to_string()
        } else {
            format!("{}/{}", prefix, name)
        }
    }
}

impl<S: Storage> OutputSink for StorageSink<S> {
    async fn deliver(&self, reports: &FinishedReports) -> Result<String> {
        let month = reports.range.month_label();
        let expense_key = self.object_key(&format!("expense-report-{}.xlsx", month));
        let tolls_key = self.object_key(&format!("tolls-{}.xlsx", month));

        self.storage
            .write_object(&self.bucket, &expense_key, &reports.expense_report)
            .await?;

        if let Err(err) = self
            .storage
            .write_object(&self.bucket, &tolls_key, &reports.tolls_report)
            .await
        {
            tracing::warn!("Tolls report upload failed, removing {}", expense_key);
            if let Err(cleanup) = self.storage.delete_object(&self.bucket, &expense_key).await {
                tracing::error!("Could not remove {}: {}", expense_key, cleanup);
            }
            return Err(err);
        }

        tracing::info!("Reports written to {}/{{{}, {}}}", self.bucket, expense_key, tolls_key);
        Ok(format!("{}/{}", self.bucket, self.object_key("")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{DateRange, Total};
    use crate::utils::error::TollError;
    use chrono::NaiveDate;
    use rust_decimal::Decimal;
    use std::collections::HashMap;
    use std::sync::Arc;
    use tokio::sync::Mutex;

    #[derive(Clone, Default)]
    struct MockStorage {
        files: Arc<Mutex<HashMap<String, Vec<u8>>>>,
        fail_on: Option<String>,
    }

    impl Storage for MockStorage {
        async fn read_object(&self, bucket: &str, key: &str) -> Result<Vec<u8>> {
            let files = self.files.lock().await;
            files
                .get(&format!("{}/{}", bucket, key))
                .cloned()
                .ok_or_else(|| TollError::NotFound {
                    kind: "object".to_string(),
                    key: key.to_string(),
                })
        }

        async fn write_object(&self, bucket: &str, key: &str, data: &[u8]) -> Result<()> {
            if self.fail_on.as_deref().is_some_and(|f| key.contains(f)) {
                return Err(TollError::IoError(std::io::Error::other("disk full")));
            }
            let mut files = self.files.lock().await;
            files.insert(format!("{}/{}", bucket, key), data.to_vec());
            Ok(())
        }

        async fn delete_object(&self, bucket: &str, key: &str) -> Result<()> {
            let mut files = self.files.lock().await;
            files.remove(&format!("{}/{}", bucket, key));
            Ok(())
        }
    }

    fn reports() -> FinishedReports {
        FinishedReports {
            range: DateRange::previous_month(NaiveDate::from_ymd_opt(2024, 3, 15).unwrap()),
            total: Total::new(Decimal::new(375, 2)),
            transactions: 3,
            expense_report: b"expense".to_vec(),
            tolls_report: b"tolls".to_vec(),
        }
    }

    #[tokio::test]
    async fn test_deliver_writes_both_reports() {
        let storage = MockStorage::default();
        let sink = StorageSink::new(storage.clone(), "toll-reporting", "reports/");

        let location = sink.deliver(&reports()).await.unwrap();

        assert_eq!(location, "toll-reporting/reports/");
        let files = storage.files.lock().await;
        assert_eq!(
            files.get("toll-reporting/reports/expense-report-2024-02.xlsx"),
            Some(&b"expense".to_vec())
        );
        assert_eq!(
            files.get("toll-reporting/reports/tolls-2024-02.xlsx"),
            Some(&b"tolls".to_vec())
        );
    }

    #[tokio::test]
    async fn test_failed_second_write_leaves_nothing_behind() {
        let storage = MockStorage {
            fail_on: Some("tolls-".to_string()),
            ..MockStorage::default()
        };
        let sink = StorageSink::new(storage.clone(), "toll-reporting", "reports");

        let result = sink.deliver(&reports()).await;

        assert!(matches!(result, Err(TollError::IoError(_))));
        assert!(storage.files.lock().await.is_empty());
    }
}
