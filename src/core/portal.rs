use crate::config::toml_config::PortalConfig;
use crate::domain::model::{Credentials, DateRange, RawDocument};
use crate::utils::error::{Result, TollError};
use reqwest::{Client, Response};
use scraper::{Html, Selector};

/// Cookie-carrying client for the toll portal's login and transaction pages.
pub struct PortalClient {
    client: Client,
    config: PortalConfig,
}

impl PortalClient {
    pub fn new(config: PortalConfig) -> Result<Self> {
        let client = Client::builder()
            .cookie_store(true)
            .timeout(config.timeout())
            .build()
            .map_err(|e| TollError::ConfigError {
                message: format!("Failed to build HTTP client: {}", e),
            })?;
        Ok(Self { client, config })
    }

    /// Logs in and queries the transactions for `range` within one session.
    pub async fn fetch_transactions(
        &self,
        credentials: &Credentials,
        range: &DateRange,
    ) -> Result<RawDocument> {
        self.login(credentials).await?;

        let (start, end) = range.portal_fields();
        tracing::debug!("Requesting transactions {} - {}", start, end);
        let response = self
            .client
            .post(&self.config.data_url)
            .form(&[("startDate", start.as_str()), ("endDate", end.as_str())])
            .send()
            .await?;
        let body = Self::success_body(response).await?;

        tracing::debug!("Transaction page received ({} bytes)", body.len());
        Ok(RawDocument::new(body))
    }

    async fn login(&self, credentials: &Credentials) -> Result<()> {
        tracing::debug!("Logging in to {} as {}", self.config.login_url, credentials.username);
        let response = self
            .client
            .post(&self.config.login_url)
            .form(&[
                ("userName", credentials.username.as_str()),
                ("password", credentials.password.as_str()),
            ])
            .send()
            .await?;
        let body = Self::success_body(response).await?;

        if self.still_on_login_form(&body)? {
            return Err(TollError::LoginRejected {
                username: credentials.username.clone(),
            });
        }
        Ok(())
    }

    fn still_on_login_form(&self, body: &str) -> Result<bool> {
        let marker = self.config.login_failure_selector.trim();
        if marker.is_empty() {
            return Ok(false);
        }
        let selector = Selector::parse(marker).map_err(|e| TollError::InvalidConfigValueError {
            field: "portal.login_failure_selector".to_string(),
            value: marker.to_string(),
            reason: format!("{:?}", e),
        })?;
        let document = Html::parse_document(body);
        let found = document.select(&selector).next().is_some();
        Ok(found)
    }

    async fn success_body(response: Response) -> Result<String> {
        let status = response.status();
        let url = response.url().to_string();
        tracing::debug!("Portal response status: {} ({})", status, url);

        if !status.is_success() {
            return Err(TollError::RemoteService {
                service: "portal".to_string(),
                message: format!("HTTP {} from {}", status, url),
            });
        }
        Ok(response.text().await?)
    }
}
