//! Stackman - Entry Point
//!
//! Operator command line for deploying templates and managing deployments.

use std::collections::HashMap;
use std::env;
use std::sync::Arc;

use colored::Colorize;
use stackman::adapter::HttpAdapterClient;
use stackman::deploy::{DeploymentManager, OverallStatus};
use stackman::errors::ManagerError;
use stackman::filesys::file::File;
use stackman::logs::{init_logging, LogOptions};
use stackman::storage::layout::StorageLayout;
use stackman::storage::settings::Settings;
use stackman::storage::FileStore;
use stackman::utils::version_info;

use tracing::{error, info};

const USAGE: &str = "\
usage: stackman [--settings=<file>] <command>

commands:
  --deploy=<template.yml>   create the template's services and record the deployment
  --start=<id>              start every service of a deployment
  --stop=<id>               stop every service of a deployment
  --status=<id>             show the live status of a deployment
  --undeploy=<id>           delete every service, then the deployment record
  --list                    list recorded deployments
  --version                 print version information";

// sysexits EX_TEMPFAIL: the same command may succeed if retried
const EXIT_RETRYABLE: i32 = 75;

#[tokio::main]
async fn main() {
    // Parse command line arguments
    let args: Vec<String> = env::args().collect();
    let mut cli_args: HashMap<String, String> = HashMap::new();

    for arg in args.iter().skip(1) {
        if let Some((key, value)) = arg.split_once('=') {
            // Handle --key=value format
            let clean_key = key.trim_start_matches('-');
            cli_args.insert(clean_key.to_string(), value.to_string());
        } else if arg.starts_with("--") {
            // Handle standalone flags like --version
            let clean_key = arg.trim_start_matches('-');
            cli_args.insert(clean_key.to_string(), "true".to_string());
        }
    }

    // Print version and exit
    if cli_args.contains_key("version") {
        let version = version_info();
        match serde_json::to_string_pretty(&version) {
            Ok(json) => println!("{}", json),
            Err(e) => eprintln!("Failed to render version: {e}"),
        }
        return;
    }

    // Retrieve the settings file
    let default_layout = StorageLayout::default();
    let settings_file = cli_args
        .get("settings")
        .map(File::new)
        .unwrap_or_else(|| default_layout.settings_file());
    let settings = match Settings::load(&settings_file).await {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(1);
        }
    };
    let layout = settings
        .storage_dir
        .as_ref()
        .map(StorageLayout::new)
        .unwrap_or(default_layout);
    if let Err(e) = layout.setup().await {
        eprintln!("Failed to prepare {}: {e}", layout.base_dir.display());
        std::process::exit(1);
    }

    // Initialize logging
    let log_options = LogOptions {
        log_level: settings.log_level.clone(),
        json_format: settings.log_json,
        log_dir: settings
            .log_to_file
            .then(|| layout.logs_dir().path().to_path_buf()),
        ..Default::default()
    };
    if let Err(e) = init_logging(log_options) {
        eprintln!("Failed to initialize logging: {e}");
    }

    let result = match build_manager(&settings, &layout) {
        Ok(manager) => run_command(&manager, &cli_args).await,
        Err(e) => Err(e),
    };

    if let Err(e) = result {
        error!("{}", e);
        eprintln!("{} {}", "error:".red().bold(), e);
        std::process::exit(if e.is_retryable() { EXIT_RETRYABLE } else { 1 });
    }
}

fn build_manager(
    settings: &Settings,
    layout: &StorageLayout,
) -> Result<DeploymentManager, ManagerError> {
    let client = HttpAdapterClient::new(
        &settings.adapter.base_url,
        settings.adapter.request_timeout(),
    )?;
    let store = FileStore::new(layout.deployments_dir());

    info!(
        "Using adapter at {} with records in {}",
        client.base_url(),
        layout.deployments_dir().path().display()
    );

    Ok(DeploymentManager::new(Arc::new(client), Arc::new(store))
        .with_options(settings.fanout_options()))
}

async fn run_command(
    manager: &DeploymentManager,
    cli_args: &HashMap<String, String>,
) -> Result<(), ManagerError> {
    if let Some(path) = cli_args.get("deploy") {
        let template = tokio::fs::read_to_string(path).await?;
        let deployment = manager.deploy(&template).await?;
        println!("{}", serde_json::to_string_pretty(&deployment)?);
    } else if let Some(id) = cli_args.get("start") {
        let deployment = manager.get(id).await?;
        manager.start(&deployment).await?;
        println!("{} {}", "started".green(), deployment.id);
    } else if let Some(id) = cli_args.get("stop") {
        let deployment = manager.get(id).await?;
        manager.stop(&deployment).await?;
        println!("{} {}", "stopped".yellow(), deployment.id);
    } else if let Some(id) = cli_args.get("status") {
        let deployment = manager.get(id).await?;
        let status = manager.status(&deployment).await?;
        let overall = match status.overall {
            OverallStatus::Started => status.overall.as_str().green(),
            OverallStatus::Stopped => status.overall.as_str().yellow(),
            OverallStatus::Error => status.overall.as_str().red(),
        };
        println!("{} {}", deployment.id, overall.bold());
        println!("{}", serde_json::to_string_pretty(&status.services)?);
    } else if let Some(id) = cli_args.get("undeploy") {
        manager.undeploy(id).await?;
        println!("{} {}", "removed".green(), id);
    } else if cli_args.contains_key("list") {
        let deployments = manager.list().await?;
        println!("{}", serde_json::to_string_pretty(&deployments)?);
    } else {
        println!("{}", USAGE);
    }

    Ok(())
}
