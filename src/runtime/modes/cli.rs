//! CLI mode
//!
//! One-shot commands that do not start the HTTP server.

use anyhow::{Context, Result};
use colored::Colorize;
use std::sync::Arc;

use crate::cli::{Commands, ConfigCommands};
use crate::config::{StaticConfig, get_config};
use crate::services::{ReadinessChecker, ReadinessStatus, UreqProbe};

pub async fn run_cli(command: Commands) -> Result<()> {
    match command {
        Commands::Serve => super::run_server().await,
        Commands::Readiness { force, origin } => run_readiness(force, origin).await,
        Commands::Config { action } => match action {
            ConfigCommands::Generate { output_path } => generate_config(output_path),
        },
    }
}

/// 打印就绪检查结果（JSON），未就绪时以非零状态退出
async fn run_readiness(force: bool, origin: Option<String>) -> Result<()> {
    let config = get_config();
    let checker = ReadinessChecker::new(Arc::new(UreqProbe), &config.tracer);
    let report = checker.check(origin.as_deref(), force).await;

    let json = serde_json::to_string_pretty(&report).context("Failed to serialize report")?;
    println!("{}", json);

    if report.status != ReadinessStatus::Ready {
        eprintln!(
            "{} {}",
            "[NOT READY]".red().bold(),
            report.reason.as_deref().unwrap_or("unknown reason")
        );
        std::process::exit(2);
    }
    Ok(())
}

fn generate_config(output_path: Option<String>) -> Result<()> {
    let path = output_path.unwrap_or_else(|| "config.example.toml".to_string());
    StaticConfig::default()
        .save_to_file(&path)
        .with_context(|| format!("Failed to write {}", path))?;
    println!("{} {}", "Sample configuration written to".green(), path);
    Ok(())
}
