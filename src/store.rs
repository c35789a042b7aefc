//! Job log store: one pretty-printed JSON file per job, named `<id>.json`.

use crate::core::error::{AppError, Result};
use crate::core::models::Job;
use std::io::ErrorKind;
use std::path::PathBuf;

const MAX_ID_LEN: usize = 128;

/// Checks that a job id can double as a file name.
pub fn validate_job_id(id: &str) -> Result<()> {
    let usable = !id.is_empty()
        && id.len() <= MAX_ID_LEN
        && !id.starts_with('.')
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'));
    if usable {
        Ok(())
    } else {
        Err(AppError::InvalidJobId(id.to_string()))
    }
}

#[derive(Debug, Clone)]
pub struct JobLogStore {
    dir: PathBuf,
}

impl JobLogStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Creates the log directory if it does not exist yet.
    pub async fn ensure_dir(&self) -> Result<()> {
        tokio::fs::create_dir_all(&self.dir).await?;
        Ok(())
    }

    pub fn record_path(&self, id: &str) -> Result<PathBuf> {
        validate_job_id(id)?;
        Ok(self.dir.join(format!("{}.json", id)))
    }

    /// Writes the full job, replacing any earlier record with the same id.
    pub async fn persist(&self, job: &Job) -> Result<PathBuf> {
        let path = self.record_path(&job.id)?;
        let encoded = serde_json::to_vec_pretty(job)?;

        self.ensure_dir().await?;
        // unique per call so concurrent writers of one id never share a staging file
        let staging = self
            .dir
            .join(format!(".{}.{}.json.tmp", job.id, uuid::Uuid::new_v4().simple()));
        tokio::fs::write(&staging, &encoded).await?;
        if let Err(e) = tokio::fs::rename(&staging, &path).await {
            let _ = tokio::fs::remove_file(&staging).await;
            return Err(e.into());
        }

        tracing::debug!(target: "store", job_id = %job.id, "Wrote {}", path.display());
        Ok(path)
    }

    /// Loads the record for `id`.
    pub async fn retrieve(&self, id: &str) -> Result<Job> {
        let path = match self.record_path(id) {
            Ok(path) => path,
            Err(_) => return Err(AppError::NotFound(id.to_string())),
        };

        let raw = match tokio::fs::read(&path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(AppError::NotFound(id.to_string()))
            }
            Err(e) => return Err(e.into()),
        };

        serde_json::from_slice(&raw).map_err(|e| {
            tracing::warn!(target: "store", job_id = %id, "Undecodable record: {}", e);
            AppError::CorruptRecord {
                id: id.to_string(),
                reason: e.to_string(),
            }
        })
    }
}
