//! `locationlog` - CLI for the location-logging service
//!
//! This binary runs the HTTP API server and offers a few commands for
//! inspecting the stored data and configuration.

#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;

use locationlog::cli::{Cli, Command, ConfigCommand, ServeCommand};
use locationlog::{init_logging, Config, HttpServer, LocationRecord, LocationStore};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbosity());

    match cli.command {
        Command::Serve(serve_cmd) => handle_serve(cli.config, &serve_cmd).await,
        Command::Last(last_cmd) => handle_last(&load_config(cli.config)?, last_cmd.json),
        Command::Status(status_cmd) => handle_status(&load_config(cli.config)?, status_cmd.json),
        Command::Config(config_cmd) => handle_config(cli.config, config_cmd),
    }
}

fn load_config(path: Option<PathBuf>) -> anyhow::Result<Config> {
    let config = Config::load_from(path).context("failed to load configuration")?;
    config.validate()?;
    Ok(config)
}

async fn handle_serve(config_path: Option<PathBuf>, cmd: &ServeCommand) -> anyhow::Result<()> {
    // Overrides go on before validation so a flag can replace a bad file value.
    let mut config = Config::load_from(config_path).context("failed to load configuration")?;
    cmd.apply_to(&mut config);
    config.validate()?;

    let store = LocationStore::open(config.database_path()).with_context(|| {
        format!(
            "failed to initialize location store at {}",
            config.database_path().display()
        )
    })?;

    let server = HttpServer::new(config.server.clone(), Arc::new(store));
    let addr = server.socket_addr();
    server
        .run()
        .await
        .with_context(|| format!("server on {addr} failed"))
}

/// Open the configured store for reading, or `None` if it doesn't exist yet.
fn open_existing(config: &Config) -> anyhow::Result<Option<LocationStore>> {
    let path = config.database_path();
    if !path.exists() {
        return Ok(None);
    }
    let store = LocationStore::open(path)
        .with_context(|| format!("failed to open database at {}", path.display()))?;
    Ok(Some(store))
}

fn handle_last(config: &Config, json: bool) -> anyhow::Result<()> {
    let latest = match open_existing(config)? {
        Some(store) => store.fetch_latest()?,
        None => None,
    };

    match (latest, json) {
        (Some(record), true) => println!("{}", serde_json::to_string_pretty(&record)?),
        (Some(record), false) => print_record(&record),
        (None, true) => println!("null"),
        (None, false) => println!("No locations found"),
    }
    Ok(())
}

fn handle_status(config: &Config, json: bool) -> anyhow::Result<()> {
    let (count, latest) = match open_existing(config)? {
        Some(store) => (store.count()?, store.fetch_latest()?),
        None => (0, None),
    };

    if json {
        let status = serde_json::json!({
            "database_path": config.database_path(),
            "database_exists": config.database_path().exists(),
            "listen_addr": config.server.socket_addr(),
            "record_count": count,
            "latest": latest,
        });
        println!("{}", serde_json::to_string_pretty(&status)?);
    } else {
        println!("locationlog status");
        println!("------------------");
        println!("Database:      {}", config.database_path().display());
        println!("Listen addr:   {}", config.server.socket_addr());
        println!("Records:       {count}");
        match latest {
            Some(record) => println!(
                "Latest:        #{} ({:.6}, {:.6}) at {}",
                record.id,
                record.latitude,
                record.longitude,
                record.timestamp.to_rfc3339()
            ),
            None => println!("Latest:        none"),
        }
    }
    Ok(())
}

fn handle_config(config_path: Option<PathBuf>, cmd: ConfigCommand) -> anyhow::Result<()> {
    match cmd {
        ConfigCommand::Show { json } => {
            let config = load_config(config_path)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&config)?);
            } else {
                println!("Current Configuration");
                println!("=====================");
                println!();
                println!("[Storage]");
                println!("  Database path:  {}", config.database_path().display());
                println!();
                println!("[Server]");
                println!("  Host:           {}", config.server.host);
                println!("  Port:           {}", config.server.port);
            }
        }
        ConfigCommand::Path => {
            let path = config_path.unwrap_or_else(Config::default_config_path);
            println!("{}", path.display());
        }
        ConfigCommand::Validate { file } => {
            let path = file
                .or(config_path)
                .unwrap_or_else(Config::default_config_path);
            println!("Validating configuration: {}", path.display());
            match Config::load_from(Some(path)).and_then(|config| config.validate()) {
                Ok(()) => println!("Configuration is valid."),
                Err(e) => println!("Configuration error: {e}"),
            }
        }
    }
    Ok(())
}

fn print_record(record: &LocationRecord) {
    println!("ID:         {}", record.id);
    println!("Latitude:   {:.6}", record.latitude);
    println!("Longitude:  {:.6}", record.longitude);
    println!("Timestamp:  {}", record.timestamp.to_rfc3339());
}
