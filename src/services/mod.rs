//! Service layer for business logic
//!
//! Shared by the HTTP handlers and the CLI.

mod analytics_service;
pub mod classifier;
pub mod job_directory;
pub mod link_extractor;
pub mod readiness;
pub mod redirect;
pub mod token;
mod tracer_link_service;

pub use analytics_service::*;
pub use classifier::{ClickClassification, classify};
pub use job_directory::{JobDirectory, JobRecord, MemoryJobDirectory};
pub use link_extractor::{RewriteTarget, extract_targets};
pub use readiness::{
    HealthProbe, ProbeError, ReadinessChecker, ReadinessReport, ReadinessStatus, UreqProbe,
};
pub use redirect::{RedirectRequest, RedirectResolver, ResolvedRedirect};
pub use tracer_link_service::*;
