//! Data source collaborators: where deals and email threads come from.
//!
//! A source either produces a whole `Dataset` or fails with a `DataError`;
//! the processor turns a failure into an empty run.

pub mod crm;
pub mod emails;

pub use crm::parse_crm;
pub use emails::parse_emails;

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;
use tracing::{info, warn};

use crate::config::DataConfig;
use crate::error::DataError;
use crate::pipeline::types::Dataset;

/// Supplies deals and threads for one run.
#[async_trait]
pub trait DataSource: Send + Sync {
    /// Source name, for logging.
    fn name(&self) -> &str;

    async fn load(&self) -> Result<Dataset, DataError>;
}

/// CRM CSV + email JSON on disk.
#[derive(Debug, Clone)]
pub struct FileDataSource {
    crm_path: PathBuf,
    email_path: PathBuf,
}

impl FileDataSource {
    pub fn new(crm_path: impl Into<PathBuf>, email_path: impl Into<PathBuf>) -> Self {
        Self {
            crm_path: crm_path.into(),
            email_path: email_path.into(),
        }
    }

    pub fn from_config(config: &DataConfig) -> Self {
        Self::new(&config.crm_path, &config.email_path)
    }

    async fn read_emails(&self) -> String {
        match fs::read_to_string(&self.email_path).await {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                warn!(path = %self.email_path.display(), "Email file not found, using no threads");
                String::from("[]")
            }
            Err(e) => {
                warn!(path = %self.email_path.display(), error = %e, "Failed to read email file, using no threads");
                String::from("[]")
            }
        }
    }
}

async fn read_required(path: &Path) -> Result<String, DataError> {
    fs::read_to_string(path).await.map_err(|e| {
        if e.kind() == ErrorKind::NotFound {
            DataError::NotFound {
                path: path.to_path_buf(),
            }
        } else {
            DataError::Io(e)
        }
    })
}

#[async_trait]
impl DataSource for FileDataSource {
    fn name(&self) -> &str {
        "files"
    }

    async fn load(&self) -> Result<Dataset, DataError> {
        let crm = read_required(&self.crm_path).await?;
        let deals = parse_crm(&crm)?;
        let threads = parse_emails(&self.read_emails().await);

        info!(
            deals = deals.len(),
            threads = threads.len(),
            crm = %self.crm_path.display(),
            "Loaded CRM data"
        );
        Ok(Dataset { deals, threads })
    }
}

/// A fixed dataset held in memory.
#[derive(Debug, Clone, Default)]
pub struct InMemorySource {
    dataset: Dataset,
}

impl InMemorySource {
    pub fn new(dataset: Dataset) -> Self {
        Self { dataset }
    }
}

#[async_trait]
impl DataSource for InMemorySource {
    fn name(&self) -> &str {
        "memory"
    }

    async fn load(&self) -> Result<Dataset, DataError> {
        Ok(self.dataset.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CRM: &str = "deal_id;deal_name;amount_eur;stage;last_activity\n\
                       OPP-123;Project Alpha;5 000;Negotiation;2025-07-01T12:00:00Z\n";

    const EMAILS: &str = r#"[{"deal_id": "OPP-123", "thread": [
        {"from": "ae@nudge.ai", "to": "marie.cfo@acme.com", "ts": "2025-07-01T09:00:00Z"}
    ]}]"#;

    #[tokio::test]
    async fn loads_both_files() {
        let dir = tempfile::tempdir().unwrap();
        let crm = dir.path().join("crm_events.csv");
        let emails = dir.path().join("emails.json");
        std::fs::write(&crm, CRM).unwrap();
        std::fs::write(&emails, EMAILS).unwrap();

        let dataset = FileDataSource::new(&crm, &emails).load().await.unwrap();
        assert_eq!(dataset.deals.len(), 1);
        assert_eq!(dataset.deals[0].amount_eur, 5000);
        assert_eq!(dataset.threads.len(), 1);
    }

    #[tokio::test]
    async fn missing_crm_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let source = FileDataSource::new(dir.path().join("nope.csv"), dir.path().join("e.json"));
        assert!(matches!(source.load().await, Err(DataError::NotFound { .. })));
    }

    #[tokio::test]
    async fn missing_email_file_means_no_threads() {
        let dir = tempfile::tempdir().unwrap();
        let crm = dir.path().join("crm_events.csv");
        std::fs::write(&crm, CRM).unwrap();

        let dataset = FileDataSource::new(&crm, dir.path().join("missing.json"))
            .load()
            .await
            .unwrap();
        assert_eq!(dataset.deals.len(), 1);
        assert!(dataset.threads.is_empty());
    }

    #[tokio::test]
    async fn from_config_uses_configured_paths() {
        let dir = tempfile::tempdir().unwrap();
        let config = DataConfig {
            crm_path: dir.path().join("crm.csv"),
            email_path: dir.path().join("emails.json"),
            output_path: dir.path().join("out.json"),
        };
        std::fs::write(&config.crm_path, CRM).unwrap();
        std::fs::write(&config.email_path, EMAILS).unwrap();

        let dataset = FileDataSource::from_config(&config).load().await.unwrap();
        assert_eq!(dataset.threads[0].deal_id, "OPP-123");
    }

    #[tokio::test]
    async fn in_memory_source_returns_its_dataset() {
        let source = InMemorySource::new(Dataset::default());
        assert_eq!(source.load().await.unwrap(), Dataset::default());
        assert_eq!(source.name(), "memory");
    }
}
