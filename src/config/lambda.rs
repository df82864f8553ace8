#[cfg(feature = "lambda")]
use crate::config::toml_config::ReportConfig;
#[cfg(feature = "lambda")]
use crate::core::{CredentialProvider, Credentials, Storage};
#[cfg(feature = "lambda")]
use crate::utils::error::{Result, TollError};
#[cfg(feature = "lambda")]
use aws_sdk_dynamodb::types::AttributeValue;
#[cfg(feature = "lambda")]
use aws_sdk_dynamodb::Client as DynamoClient;
#[cfg(feature = "lambda")]
use aws_sdk_s3::error::{DisplayErrorContext, SdkError};
#[cfg(feature = "lambda")]
use aws_sdk_s3::operation::get_object::GetObjectError;
#[cfg(feature = "lambda")]
use aws_sdk_s3::Client as S3Client;
#[cfg(feature = "lambda")]
use aws_config::timeout::TimeoutConfig;
#[cfg(feature = "lambda")]
use std::env;
#[cfg(feature = "lambda")]
use std::time::Duration;

#[cfg(feature = "lambda")]
#[derive(Debug, Clone)]
pub struct LambdaConfig {
    pub report: ReportConfig,
    pub region: String,
    pub credentials_table: String,
    /// Deadline for each S3 and DynamoDB operation, retries included.
    pub aws_timeout_seconds: u64,
}

#[cfg(feature = "lambda")]
impl LambdaConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    fn from_lookup(var: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut report = match var("REPORT_CONFIG") {
            Some(path) => ReportConfig::from_file(path)?,
            None => ReportConfig::default(),
        };

        if let Some(bucket) = var("TOLL_BUCKET") {
            report.expense_report.bucket = bucket.clone();
            report.output.bucket = bucket;
        }
        if let Some(key) = var("EXPENSE_REPORT_KEY") {
            report.expense_report.key = key;
        }
        if let Some(prefix) = var("OUTPUT_PREFIX") {
            report.output.prefix = prefix;
        }
        if let Some(timeout) = var("PORTAL_TIMEOUT_SECONDS") {
            report.portal.timeout_seconds = parse_seconds("PORTAL_TIMEOUT_SECONDS", &timeout)?;
        }
        let aws_timeout_seconds = match var("AWS_TIMEOUT_SECONDS") {
            Some(timeout) => parse_seconds("AWS_TIMEOUT_SECONDS", &timeout)?,
            None => report.portal.timeout_seconds,
        };

        Ok(Self {
            report,
            region: var("AWS_REGION_NAME").unwrap_or_else(|| "us-east-1".to_string()),
            credentials_table: var("CREDENTIALS_TABLE")
                .unwrap_or_else(|| "TollCredentials".to_string()),
            aws_timeout_seconds,
        })
    }

    pub fn aws_timeout_config(&self) -> TimeoutConfig {
        TimeoutConfig::builder()
            .operation_timeout(Duration::from_secs(self.aws_timeout_seconds))
            .build()
    }
}

#[cfg(feature = "lambda")]
fn parse_seconds(field: &str, value: &str) -> Result<u64> {
    value
        .trim()
        .parse()
        .map_err(|_| TollError::InvalidConfigValueError {
            field: field.to_string(),
            value: value.to_string(),
            reason: "Expected a whole number of seconds".to_string(),
        })
}

#[cfg(feature = "lambda")]
impl crate::utils::validation::Validate for LambdaConfig {
    fn validate(&self) -> Result<()> {
        use crate::utils::validation::*;

        self.report.validate()?;
        validate_s3_bucket_name("expense_report.bucket", &self.report.expense_report.bucket)?;
        validate_s3_bucket_name("output.bucket", &self.report.output.bucket)?;
        validate_aws_region("region", &self.region)?;
        validate_non_empty_string("credentials_table", &self.credentials_table)?;
        validate_positive_number("aws_timeout_seconds", self.aws_timeout_seconds, 1)?;

        tracing::info!("Lambda configuration validation passed");
        Ok(())
    }
}

#[cfg(feature = "lambda")]
fn validate_s3_bucket_name(field_name: &str, bucket_name: &str) -> Result<()> {
    if bucket_name.len() < 3 || bucket_name.len() > 63 {
        return Err(TollError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: bucket_name.to_string(),
            reason: "S3 bucket name must be between 3 and 63 characters".to_string(),
        });
    }

    if !bucket_name
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '.')
    {
        return Err(TollError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: bucket_name.to_string(),
            reason: "S3 bucket name can only contain lowercase letters, numbers, hyphens, and dots"
                .to_string(),
        });
    }

    if bucket_name.starts_with('-') || bucket_name.ends_with('-') {
        return Err(TollError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: bucket_name.to_string(),
            reason: "S3 bucket name cannot start or end with a hyphen".to_string(),
        });
    }

    Ok(())
}

#[cfg(feature = "lambda")]
fn validate_aws_region(field_name: &str, region: &str) -> Result<()> {
    use crate::utils::validation::validate_non_empty_string;

    validate_non_empty_string(field_name, region)?;

    if !region
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
    {
        return Err(TollError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: region.to_string(),
            reason: "AWS region can only contain lowercase letters, numbers, and hyphens"
                .to_string(),
        });
    }

    Ok(())
}

#[cfg(feature = "lambda")]
fn sdk_error<E, R>(service: &str, err: SdkError<E, R>) -> TollError
where
    E: std::error::Error + Send + Sync + 'static,
    R: std::fmt::Debug + Send + Sync + 'static,
{
    let message = DisplayErrorContext(&err).to_string();
    match err {
        SdkError::TimeoutError(_) | SdkError::DispatchFailure(_) => {
            TollError::TransientIo { message }
        }
        _ => TollError::RemoteService {
            service: service.to_string(),
            message,
        },
    }
}

#[cfg(feature = "lambda")]
#[derive(Debug, Clone)]
pub struct S3Storage {
    client: S3Client,
}

#[cfg(feature = "lambda")]
impl S3Storage {
    pub fn new(client: S3Client) -> Self {
        Self { client }
    }
}

#[cfg(feature = "lambda")]
impl Storage for S3Storage {
    async fn read_object(&self, bucket: &str, key: &str) -> Result<Vec<u8>> {
        let resp = match self
            .client
            .get_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
        {
            Ok(resp) => resp,
            Err(SdkError::ServiceError(ctx)) if matches!(ctx.err(), GetObjectError::NoSuchKey(_)) => {
                return Err(TollError::NotFound {
                    kind: "S3 object".to_string(),
                    key: format!("s3://{}/{}", bucket, key),
                })
            }
            Err(e) => return Err(sdk_error("S3", e)),
        };

        let data = resp
            .body
            .collect()
            .await
            .map_err(|e| TollError::TransientIo {
                message: format!("Failed to collect S3 data: {}", e),
            })?;

        Ok(data.into_bytes().to_vec())
    }

    async fn write_object(&self, bucket: &str, key: &str, data: &[u8]) -> Result<()> {
        self.client
            .put_object()
            .bucket(bucket)
            .key(key)
            .body(data.to_vec().into())
            .send()
            .await
            .map_err(|e| sdk_error("S3", e))?;
        Ok(())
    }

    async fn delete_object(&self, bucket: &str, key: &str) -> Result<()> {
        self.client
            .delete_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| sdk_error("S3", e))?;
        Ok(())
    }
}

/// Looks up `{Username, Password}` by `EmailAddress` in a DynamoDB table.
#[cfg(feature = "lambda")]
#[derive(Debug, Clone)]
pub struct DynamoCredentialStore {
    client: DynamoClient,
    table: String,
}

#[cfg(feature = "lambda")]
impl DynamoCredentialStore {
    pub fn new(client: DynamoClient, table: impl Into<String>) -> Self {
        Self {
            client,
            table: table.into(),
        }
    }
}

#[cfg(feature = "lambda")]
impl CredentialProvider for DynamoCredentialStore {
    async fn credentials(&self, key: &str) -> Result<Credentials> {
        let output = self
            .client
            .get_item()
            .table_name(&self.table)
            .key("EmailAddress", AttributeValue::S(key.to_string()))
            .send()
            .await
            .map_err(|e| sdk_error("DynamoDB", e))?;

        let item = output.item().ok_or_else(|| TollError::NotFound {
            kind: "credentials".to_string(),
            key: key.to_string(),
        })?;

        let field = |name: &str| -> Result<String> {
            item.get(name)
                .and_then(|v| v.as_s().ok())
                .cloned()
                .ok_or_else(|| TollError::DataShape {
                    message: format!("credential record for {} has no string {}", key, name),
                })
        };

        Ok(Credentials::new(field("Username")?, field("Password")?))
    }
}

#[cfg(all(test, feature = "lambda"))]
mod tests {
    use super::*;
    use crate::utils::validation::Validate;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn test_from_lookup_defaults() {
        let config = LambdaConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.region, "us-east-1");
        assert_eq!(config.credentials_table, "TollCredentials");
        assert_eq!(config.report.portal.timeout_seconds, 30);
        assert_eq!(config.aws_timeout_seconds, 30);
        assert_eq!(
            config.aws_timeout_config().operation_timeout(),
            Some(Duration::from_secs(30))
        );
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_portal_timeout_override_bounds_aws_calls() {
        let config = LambdaConfig::from_lookup(lookup(&[
            ("PORTAL_TIMEOUT_SECONDS", "12"),
            ("TOLL_BUCKET", "fleet-tolls"),
        ]))
        .unwrap();
        assert_eq!(config.report.portal.timeout(), Duration::from_secs(12));
        assert_eq!(config.report.expense_report.bucket, "fleet-tolls");
        assert_eq!(config.report.output.bucket, "fleet-tolls");
        assert_eq!(
            config.aws_timeout_config().operation_timeout(),
            Some(Duration::from_secs(12))
        );
    }

    #[test]
    fn test_aws_timeout_override() {
        let config = LambdaConfig::from_lookup(lookup(&[
            ("PORTAL_TIMEOUT_SECONDS", "12"),
            ("AWS_TIMEOUT_SECONDS", "4"),
        ]))
        .unwrap();
        assert_eq!(config.report.portal.timeout_seconds, 12);
        assert_eq!(
            config.aws_timeout_config().operation_timeout(),
            Some(Duration::from_secs(4))
        );

        let zero = LambdaConfig::from_lookup(lookup(&[("AWS_TIMEOUT_SECONDS", "0")])).unwrap();
        assert!(zero.validate().is_err());
    }

    #[test]
    fn test_bad_timeout_is_config_error() {
        let err = LambdaConfig::from_lookup(lookup(&[("PORTAL_TIMEOUT_SECONDS", "soon")]))
            .unwrap_err();
        assert!(matches!(
            err,
            TollError::InvalidConfigValueError { ref field, .. } if field == "PORTAL_TIMEOUT_SECONDS"
        ));
    }

    #[test]
    fn test_bucket_name_rules() {
        assert!(validate_s3_bucket_name("bucket", "toll-reporting").is_ok());
        assert!(validate_s3_bucket_name("bucket", "Toll_Reporting").is_err());
        assert!(validate_s3_bucket_name("bucket", "-tolls").is_err());
        assert!(validate_s3_bucket_name("bucket", "ab").is_err());
    }

    #[test]
    fn test_region_rules() {
        assert!(validate_aws_region("region", "us-east-1").is_ok());
        assert!(validate_aws_region("region", "US_EAST").is_err());
        assert!(validate_aws_region("region", " ").is_err());
    }
}
