use crate::utils::error::{Result, TollError};
use crate::utils::validation::{
    validate_cell_reference, validate_non_empty_list, validate_non_empty_string,
    validate_positive_number, validate_url, Validate,
};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Everything the pipeline needs to know besides the caller's key.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    pub portal: PortalConfig,
    pub extract: ExtractConfig,
    pub expense_report: ExpenseConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PortalConfig {
    pub login_url: String,
    pub data_url: String,
    pub timeout_seconds: u64,
    /// CSS selector that is only present on the login form. Empty disables the check.
    pub login_failure_selector: String,
}

impl Default for PortalConfig {
    fn default() -> Self {
        Self {
            login_url: "https://csc.ntta.org/olcsc/AuthenticateUser.do".to_string(),
            data_url: "https://csc.ntta.org/olcsc/DisplayHtmlTransactions.do?buttonClicked=Y"
                .to_string(),
            timeout_seconds: 30,
            login_failure_selector: r#"input[name="password"]"#.to_string(),
        }
    }
}

impl PortalConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractConfig {
    pub table_id: String,
    pub allowed_headers: Vec<String>,
    pub amount_header: String,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            table_id: "record".to_string(),
            allowed_headers: [
                "Transaction Date/Time",
                "License Plate",
                "Location",
                "Transaction Type/Description",
                "Amount",
            ]
            .iter()
            .map(|h| h.to_string())
            .collect(),
            amount_header: "Amount".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExpenseConfig {
    pub bucket: String,
    pub key: String,
    pub start_date_cell: String,
    pub total_cell: String,
    pub date_format: String,
}

impl Default for ExpenseConfig {
    fn default() -> Self {
        Self {
            bucket: "toll-reporting".to_string(),
            key: "Theracare_Expense_Report.xlsx".to_string(),
            start_date_cell: "K5".to_string(),
            total_cell: "F10".to_string(),
            date_format: "mm/dd/yyyy".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub bucket: String,
    pub prefix: String,
    pub tolls_sheet_name: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            bucket: "toll-reporting".to_string(),
            prefix: "reports".to_string(),
            tolls_sheet_name: "Tolls".to_string(),
        }
    }
}

impl ReportConfig {
    /// Loads configuration from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(TollError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// Parses TOML after substituting `${VAR}` references from the environment.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content);

        toml::from_str(&processed_content).map_err(|e| TollError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        })
    }

    fn substitute_env_vars(content: &str) -> String {
        use regex::Regex;
        use std::sync::OnceLock;

        static RE: OnceLock<Regex> = OnceLock::new();
        let re = RE.get_or_init(|| Regex::new(r"\$\{([^}]+)\}").expect("valid env var regex"));

        re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        })
        .to_string()
    }
}

impl Validate for ReportConfig {
    fn validate(&self) -> Result<()> {
        validate_url("portal.login_url", &self.portal.login_url)?;
        validate_url("portal.data_url", &self.portal.data_url)?;
        validate_positive_number("portal.timeout_seconds", self.portal.timeout_seconds, 1)?;

        validate_non_empty_string("extract.table_id", &self.extract.table_id)?;
        validate_non_empty_list("extract.allowed_headers", &self.extract.allowed_headers)?;
        validate_non_empty_string("extract.amount_header", &self.extract.amount_header)?;
        if !self
            .extract
            .allowed_headers
            .iter()
            .any(|h| h.eq_ignore_ascii_case(&self.extract.amount_header))
        {
            return Err(TollError::InvalidConfigValueError {
                field: "extract.amount_header".to_string(),
                value: self.extract.amount_header.clone(),
                reason: "Amount header must be one of extract.allowed_headers".to_string(),
            });
        }

        validate_non_empty_string("expense_report.bucket", &self.expense_report.bucket)?;
        validate_non_empty_string("expense_report.key", &self.expense_report.key)?;
        validate_cell_reference(
            "expense_report.start_date_cell",
            &self.expense_report.start_date_cell,
        )?;
        validate_cell_reference("expense_report.total_cell", &self.expense_report.total_cell)?;

        validate_non_empty_string("output.bucket", &self.output.bucket)?;
        validate_non_empty_string("output.tolls_sheet_name", &self.output.tolls_sheet_name)?;

        tracing::debug!("Report configuration validation passed");
        Ok(())
    }
}
