//! Tracerlink - privacy-preserving tracer links for résumé exports
//!
//! Every outbound link of an exported résumé is swapped for
//! `{baseUrl}/cv/{token}`. Opening it records one generalized, hashed click
//! event and redirects to the real destination.
//!
//! # Architecture
//! - `services`: link extraction, token issuance, redirects, click
//!   classification, analytics and readiness
//! - `storage`: sea-orm persistence for tracer links and click events
//! - `api`: HTTP endpoints and middleware
//! - `config`: static configuration (TOML + environment)
//! - `runtime`: server startup / shutdown and CLI mode
//! - `system`: logging

pub mod api;
pub mod cli;
pub mod config;
pub mod errors;
pub mod runtime;
pub mod services;
pub mod storage;
pub mod system;
pub mod utils;
