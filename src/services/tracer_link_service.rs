//! Tracer link service
//!
//! Rewrites a résumé document so every outbound web link goes through
//! `{baseUrl}/cv/{token}`, issuing tokens idempotently per
//! (job, source path, destination).

use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info};

use crate::errors::{Result, TracerError};
use crate::services::job_directory::JobRecord;
use crate::services::link_extractor::extract_targets;
use crate::storage::{IssueOptions, NewTracerLink, SeaOrmStorage, TracerLink};
use crate::utils::{destination_url_hash, normalize_base_url, tracer_url};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RewrittenLink {
    pub source_path: String,
    pub source_label: String,
    pub destination_url: String,
    pub token: String,
    pub tracer_url: String,
}

pub struct TracerLinkService {
    storage: Arc<SeaOrmStorage>,
    options: IssueOptions,
}

impl TracerLinkService {
    pub fn new(storage: Arc<SeaOrmStorage>, options: IssueOptions) -> Self {
        Self { storage, options }
    }

    pub async fn get_or_create(&self, request: &NewTracerLink) -> Result<TracerLink> {
        self.storage
            .get_or_create_link(request, &self.options)
            .await
    }

    /// Rewrite every web link of `document` in place
    ///
    /// Jobs with tracer links disabled are left untouched and yield an empty list.
    pub async fn rewrite_document(
        &self,
        job: &JobRecord,
        document: &mut Value,
        base_url: &str,
    ) -> Result<Vec<RewrittenLink>> {
        if !job.tracer_links_enabled {
            debug!("Tracer links disabled for job {}, document unchanged", job.id);
            return Ok(Vec::new());
        }

        let base_url = normalize_base_url(base_url)
            .map_err(|e| TracerError::validation(format!("publicBaseUrl: {}", e)))?;

        let targets = extract_targets(document);
        let mut rewritten = Vec::with_capacity(targets.len());

        for target in targets {
            let link = self
                .get_or_create(&NewTracerLink {
                    job_id: job.id.clone(),
                    source_path: target.source_path.clone(),
                    source_label: target.source_label.clone(),
                    destination_url: target.destination_url.clone(),
                    destination_url_hash: destination_url_hash(&target.destination_url),
                    slug_prefix_seed: Some(job.employer.clone()),
                })
                .await?;

            let url = tracer_url(&base_url, &link.token);
            target.apply(document, &url);

            rewritten.push(RewrittenLink {
                source_path: link.source_path,
                source_label: link.source_label,
                destination_url: link.destination_url,
                token: link.token,
                tracer_url: url,
            });
        }

        info!(
            "Rewrote {} links for job {} via {}",
            rewritten.len(),
            job.id,
            base_url
        );
        Ok(rewritten)
    }

    pub async fn set_active(&self, link_id: &str, is_active: bool) -> Result<TracerLink> {
        self.storage.set_link_active(link_id, is_active).await
    }
}
