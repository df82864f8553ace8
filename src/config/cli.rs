use crate::core::{CredentialProvider, Credentials, Storage};
use crate::utils::error::{Result, TollError};
use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Directory-backed storage: buckets are subdirectories of `base_path`.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    base_path: PathBuf,
}

impl LocalStorage {
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }

    fn object_path(&self, bucket: &str, key: &str) -> PathBuf {
        self.base_path.join(bucket).join(key)
    }
}

impl Storage for LocalStorage {
    async fn read_object(&self, bucket: &str, key: &str) -> Result<Vec<u8>> {
        let full_path = self.object_path(bucket, key);
        fs::read(&full_path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => TollError::NotFound {
                kind: "object".to_string(),
                key: full_path.display().to_string(),
            },
            _ => TollError::IoError(e),
        })
    }

    async fn write_object(&self, bucket: &str, key: &str, data: &[u8]) -> Result<()> {
        let full_path = self.object_path(bucket, key);

        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent)?;
        }

        fs::write(full_path, data)?;
        Ok(())
    }

    async fn delete_object(&self, bucket: &str, key: &str) -> Result<()> {
        match fs::remove_file(self.object_path(bucket, key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[derive(Debug, Deserialize)]
struct CredentialRecord {
    username: String,
    password: String,
}

#[derive(Debug, Deserialize)]
struct CredentialFile {
    #[serde(default)]
    credentials: HashMap<String, CredentialRecord>,
}

/// Credentials kept in a local TOML file:
///
/// ```toml
/// [credentials."driver@example.com"]
/// username = "driver"
/// password = "${TOLL_PASSWORD}"
/// ```
pub struct FileCredentialStore {
    records: HashMap<String, CredentialRecord>,
}

impl FileCredentialStore {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => TollError::NotFound {
                kind: "credentials file".to_string(),
                key: path.as_ref().display().to_string(),
            },
            _ => TollError::IoError(e),
        })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let file: CredentialFile = toml::from_str(content).map_err(|e| TollError::ConfigError {
            message: format!("Invalid credentials file: {}", e),
        })?;
        let records = file
            .credentials
            .into_iter()
            .map(|(key, record)| {
                let record = CredentialRecord {
                    username: expand_env(&record.username),
                    password: expand_env(&record.password),
                };
                (key, record)
            })
            .collect();
        Ok(Self { records })
    }
}

/// Resolves a whole-value `${VAR}` reference; anything else is returned unchanged.
fn expand_env(value: &str) -> String {
    value
        .strip_prefix("${")
        .and_then(|rest| rest.strip_suffix('}'))
        .and_then(|name| std::env::var(name).ok())
        .unwrap_or_else(|| value.to_string())
}

impl CredentialProvider for FileCredentialStore {
    async fn credentials(&self, key: &str) -> Result<Credentials> {
        self.records
            .get(key)
            .map(|r| Credentials::new(r.username.clone(), r.password.clone()))
            .ok_or_else(|| TollError::NotFound {
                kind: "credentials".to_string(),
                key: key.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_local_storage_round_trip_and_delete() {
        let dir = TempDir::new().unwrap();
        let storage = LocalStorage::new(dir.path());

        storage
            .write_object("toll-reporting", "reports/a.xlsx", b"data")
            .await
            .unwrap();
        assert_eq!(
            storage
                .read_object("toll-reporting", "reports/a.xlsx")
                .await
                .unwrap(),
            b"data"
        );

        storage
            .delete_object("toll-reporting", "reports/a.xlsx")
            .await
            .unwrap();
        let err = storage
            .read_object("toll-reporting", "reports/a.xlsx")
            .await
            .unwrap_err();
        assert!(matches!(err, TollError::NotFound { .. }));

        // deleting twice is not an error
        storage
            .delete_object("toll-reporting", "reports/a.xlsx")
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_file_credential_lookup() {
        std::env::set_var("TEST_TOLL_PORTAL_PASSWORD", "from-env");
        let store = FileCredentialStore::from_toml_str(
            r#"
[credentials."driver@example.com"]
username = "driver"
password = "${TEST_TOLL_PORTAL_PASSWORD}"

[credentials."other@example.com"]
username = "other"
password = "plain"
"#,
        )
        .unwrap();

        let creds = store.credentials("driver@example.com").await.unwrap();
        assert_eq!(creds.username, "driver");
        assert_eq!(creds.password, "from-env");

        let creds = store.credentials("other@example.com").await.unwrap();
        assert_eq!(creds.password, "plain");

        let err = store.credentials("nobody@example.com").await.unwrap_err();
        assert!(matches!(err, TollError::NotFound { .. }));
        std::env::remove_var("TEST_TOLL_PORTAL_PASSWORD");
    }

    #[test]
    fn test_missing_credentials_file() {
        let result = FileCredentialStore::from_file("/nonexistent/credentials.toml");
        assert!(matches!(result, Err(TollError::NotFound { .. })));
    }
}
