//! # CLI Command Implementations

use crate::api::{self, AppState};
use crate::config::Config;
use crate::enrichment::build_directory;
use crate::error::AppError;
use starmap_core::RedbStore;
use std::path::Path;

// =============================================================================
// SERVER COMMAND
// =============================================================================

/// Open the store, build the commander directory and serve HTTP.
pub async fn cmd_server(config: &Config) -> Result<(), AppError> {
    let store = RedbStore::open(&config.database.path)?;
    let directory = build_directory(&config.directory)?;

    println!("Starmap Server Starting...");
    println!();
    println!("Configuration:");
    println!("  Host:      {}", config.server.host);
    println!("  Port:      {}", config.server.port);
    println!("  Database:  {}", config.database.path.display());
    println!("  Directory: {:?} {}", config.directory.kind, config.directory.base_url);
    println!();
    println!("Endpoints:");
    println!("  /systems   - Systems CRUD, population sum, lookup by name");
    println!("  /planets   - Planets CRUD");
    println!("  /stations  - Stations CRUD");
    println!("  GET /health - Health check");
    println!();
    println!("Press Ctrl+C to stop");
    println!();

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let state = AppState::new(store, directory);
    api::run_server(&addr, state, &config.http).await?;
    Ok(())
}

// =============================================================================
// STATUS COMMAND
// =============================================================================

/// Show row counts. A missing database is reported, never created.
pub fn cmd_status(db_path: &Path, json_mode: bool) -> Result<(), AppError> {
    if !db_path.exists() {
        if json_mode {
            let output = serde_json::json!({
                "database": db_path.to_string_lossy(),
                "exists": false,
            });
            println!(
                "{}",
                serde_json::to_string_pretty(&output).unwrap_or_default()
            );
        } else {
            println!(
                "No database at {}. Run `starmap init` first.",
                db_path.display()
            );
        }
        return Ok(());
    }

    let store = RedbStore::open(db_path)?;
    let counts = store.counts()?;

    if json_mode {
        let output = serde_json::json!({
            "database": db_path.to_string_lossy(),
            "exists": true,
            "systems": counts.systems,
            "planets": counts.planets,
            "stations": counts.stations,
        });
        println!(
            "{}",
            serde_json::to_string_pretty(&output).unwrap_or_default()
        );
        return Ok(());
    }

    println!("Starmap Status");
    println!("==============");
    println!("Database: {}", db_path.display());
    println!();
    println!("Systems:  {}", counts.systems);
    println!("Planets:  {}", counts.planets);
    println!("Stations: {}", counts.stations);

    Ok(())
}

// =============================================================================
// INIT COMMAND
// =============================================================================

/// Create an empty database, replacing an existing one only with `force`.
pub fn cmd_init(db_path: &Path, force: bool) -> Result<(), AppError> {
    if db_path.exists() {
        if !force {
            return Err(AppError::DatabaseExists(db_path.to_path_buf()));
        }
        std::fs::remove_file(db_path)?;
    }

    RedbStore::open(db_path)?;
    println!("Initialized new redb database at {}", db_path.display());

    Ok(())
}

// =============================================================================
// TESTS
// =============================================================================
