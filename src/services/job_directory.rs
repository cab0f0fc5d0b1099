//! Job directory collaborator
//!
//! Job records are owned elsewhere; this crate only reads them by id.

use std::path::Path;

use async_trait::async_trait;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::errors::{Result, TracerError};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobRecord {
    pub id: String,
    pub title: String,
    pub employer: String,
    #[serde(default)]
    pub tracer_links_enabled: bool,
}

#[async_trait]
pub trait JobDirectory: Send + Sync {
    async fn find_job(&self, job_id: &str) -> Result<Option<JobRecord>>;
}

/// In-memory directory, optionally seeded from a JSON file
#[derive(Default)]
pub struct MemoryJobDirectory {
    jobs: DashMap<String, JobRecord>,
}

impl MemoryJobDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_jobs(jobs: impl IntoIterator<Item = JobRecord>) -> Self {
        let directory = Self::new();
        for job in jobs {
            directory.upsert(job);
        }
        directory
    }

    /// Load a JSON array of job records
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            TracerError::file_operation(format!("无法读取职位文件 {}: {}", path.display(), e))
        })?;
        let jobs: Vec<JobRecord> = serde_json::from_str(&content).map_err(|e| {
            TracerError::serialization(format!("职位文件格式错误 {}: {}", path.display(), e))
        })?;

        info!("Loaded {} job records from {}", jobs.len(), path.display());
        Ok(Self::with_jobs(jobs))
    }

    pub fn upsert(&self, job: JobRecord) {
        self.jobs.insert(job.id.clone(), job);
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }
}

#[async_trait]
impl JobDirectory for MemoryJobDirectory {
    async fn find_job(&self, job_id: &str) -> Result<Option<JobRecord>> {
        Ok(self.jobs.get(job_id).map(|entry| entry.value().clone()))
    }
}
