use crate::domain::model::{Credentials, ExtractedData, FinishedReports};
use crate::utils::error::Result;
use async_trait::async_trait;

pub trait Storage: Send + Sync {
    /// Reads `key` from `bucket`. Missing objects surface as `TollError::NotFound`.
    fn read_object(
        &self,
        bucket: &str,
        key: &str,
    ) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_object(
        &self,
        bucket: &str,
        key: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
    fn delete_object(
        &self,
        bucket: &str,
        key: &str,
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

pub trait CredentialProvider: Send + Sync {
    fn credentials(
        &self,
        key: &str,
    ) -> impl std::future::Future<Output = Result<Credentials>> + Send;
}

pub trait OutputSink: Send + Sync {
    /// Delivers both reports and returns a description of where they went.
    fn deliver(
        &self,
        reports: &FinishedReports,
    ) -> impl std::future::Future<Output = Result<String>> + Send;
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self, key: &str) -> Result<ExtractedData>;
    async fn transform(&self, extracted: ExtractedData) -> Result<FinishedReports>;
    async fn load(&self, reports: &FinishedReports) -> Result<String>;
}
