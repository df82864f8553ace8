use thiserror::Error;

#[derive(Error, Debug)]
pub enum TollError {
    #[error("Network request failed: {message}")]
    TransientIo { message: String },

    #[error("{service} returned an error: {message}")]
    RemoteService { service: String, message: String },

    #[error("Portal login was rejected for user {username}")]
    LoginRejected { username: String },

    #[error("Transaction table not found (selector: {selector})")]
    TableNotFound { selector: String },

    #[error("Unexpected document shape: {message}")]
    DataShape { message: String },

    #[error("Column '{column}' not found in table header")]
    ColumnNotFound { column: String },

    #[error("Row {row} has {found} cells, expected at least {required}")]
    MalformedRow {
        row: usize,
        found: usize,
        required: usize,
    },

    #[error("Invalid amount '{value}' in row {row}")]
    InvalidAmount { row: usize, value: String },

    #[error("The transaction table has no data rows")]
    EmptyResult,

    #[error("{kind} not found: {key}")]
    NotFound { kind: String, key: String },

    #[error("Spreadsheet error: {message}")]
    Spreadsheet { message: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    TransientIo,
    RemoteService,
    DataShape,
    EmptyResult,
    NotFound,
    Configuration,
    Output,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Medium,
    High,
    Critical,
}

impl TollError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            TollError::TransientIo { .. } => ErrorCategory::TransientIo,
            TollError::RemoteService { .. } => ErrorCategory::RemoteService,
            TollError::LoginRejected { .. }
            | TollError::TableNotFound { .. }
            | TollError::DataShape { .. }
            | TollError::ColumnNotFound { .. }
            | TollError::MalformedRow { .. }
            | TollError::InvalidAmount { .. } => ErrorCategory::DataShape,
            TollError::EmptyResult => ErrorCategory::EmptyResult,
            TollError::NotFound { .. } => ErrorCategory::NotFound,
            TollError::ConfigError { .. } | TollError::InvalidConfigValueError { .. } => {
                ErrorCategory::Configuration
            }
            TollError::Spreadsheet { .. } | TollError::IoError(_) => ErrorCategory::Output,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::TransientIo | ErrorCategory::RemoteService => ErrorSeverity::Medium,
            ErrorCategory::DataShape | ErrorCategory::EmptyResult | ErrorCategory::NotFound => {
                ErrorSeverity::High
            }
            ErrorCategory::Configuration | ErrorCategory::Output => ErrorSeverity::Critical,
        }
    }

    /// Whether re-running the whole job may succeed without any change.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self.category(),
            ErrorCategory::TransientIo | ErrorCategory::RemoteService
        )
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            TollError::TransientIo { .. } => "Check network connectivity and re-run the job",
            TollError::RemoteService { .. } => {
                "The remote service is failing; re-run later or check its status page"
            }
            TollError::LoginRejected { .. } => {
                "Verify the stored portal username and password for this sender"
            }
            TollError::TableNotFound { .. } | TollError::DataShape { .. } => {
                "The portal page layout may have changed, or the login silently failed"
            }
            TollError::ColumnNotFound { .. } => {
                "Check the extract.allowed_headers list against the portal's column names"
            }
            TollError::MalformedRow { .. } | TollError::InvalidAmount { .. } => {
                "Inspect the portal's transaction page; partial data is never reported"
            }
            TollError::EmptyResult => {
                "Confirm on the portal whether the previous month really had no tolls"
            }
            TollError::NotFound { .. } => {
                "Make sure the credential record and expense report template exist"
            }
            TollError::Spreadsheet { .. } => "Check that the expense report is a valid .xlsx file",
            TollError::IoError(_) => "Check file permissions and available disk space",
            TollError::ConfigError { .. } | TollError::InvalidConfigValueError { .. } => {
                "Fix the configuration and re-run"
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::TransientIo => format!("Could not reach the toll portal: {}", self),
            ErrorCategory::RemoteService => format!("A remote service failed: {}", self),
            ErrorCategory::DataShape => format!("The portal returned unexpected data: {}", self),
            ErrorCategory::EmptyResult => format!("No toll data to report: {}", self),
            ErrorCategory::NotFound => format!("Required input is missing: {}", self),
            ErrorCategory::Configuration => format!("Invalid configuration: {}", self),
            ErrorCategory::Output => format!("Could not produce the reports: {}", self),
        }
    }
}

impl From<reqwest::Error> for TollError {
    fn from(err: reqwest::Error) -> Self {
        if let Some(status) = err.status() {
            return TollError::RemoteService {
                service: "portal".to_string(),
                message: format!("HTTP {}", status),
            };
        }
        TollError::TransientIo {
            message: err.to_string(),
        }
    }
}

impl From<umya_spreadsheet::XlsxError> for TollError {
    fn from(err: umya_spreadsheet::XlsxError) -> Self {
        TollError::Spreadsheet {
            message: err.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, TollError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_result_is_not_retryable() {
        let err = TollError::EmptyResult;
        assert_eq!(err.category(), ErrorCategory::EmptyResult);
        assert!(!err.is_retryable());
        assert_eq!(err.severity(), ErrorSeverity::High);
    }

    #[test]
    fn test_login_rejection_is_a_data_shape_error() {
        let err = TollError::LoginRejected {
            username: "driver".to_string(),
        };
        assert_eq!(err.category(), ErrorCategory::DataShape);
        assert!(err.user_friendly_message().contains("unexpected data"));
    }

    #[test]
    fn test_transient_errors_are_retryable() {
        let err = TollError::TransientIo {
            message: "timed out".to_string(),
        };
        assert!(err.is_retryable());
        assert_eq!(err.severity(), ErrorSeverity::Medium);
    }

    #[test]
    fn test_severity_follows_category() {
        let cases = [
            (
                TollError::RemoteService {
                    service: "S3".to_string(),
                    message: "503".to_string(),
                },
                ErrorSeverity::Medium,
            ),
            (
                TollError::NotFound {
                    kind: "credentials".to_string(),
                    key: "driver@example.com".to_string(),
                },
                ErrorSeverity::High,
            ),
            (
                TollError::InvalidAmount {
                    row: 2,
                    value: "n/a".to_string(),
                },
                ErrorSeverity::High,
            ),
            (
                TollError::ConfigError {
                    message: "bad".to_string(),
                },
                ErrorSeverity::Critical,
            ),
            (
                TollError::Spreadsheet {
                    message: "corrupt".to_string(),
                },
                ErrorSeverity::Critical,
            ),
        ];
        for (err, severity) in cases {
            assert_eq!(err.severity(), severity, "{}", err);
        }
        assert!(ErrorSeverity::Medium < ErrorSeverity::High);
        assert!(ErrorSeverity::High < ErrorSeverity::Critical);
    }
}
