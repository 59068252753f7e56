//! # API Request/Response Types
//!
//! JSON shapes that exist only at the HTTP layer. Entity shapes live in
//! `starmap_core`.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

// =============================================================================
// HEALTH RESPONSE
// =============================================================================

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

impl Default for HealthResponse {
    fn default() -> Self {
        Self {
            status: "ok".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

// =============================================================================
// SYSTEM QUERIES
// =============================================================================

/// Optional `?email=` accepted on system create/update.
///
/// When present it must name the same commander as the body.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CommanderQuery {
    pub email: Option<String>,
}

/// `GET /systems/system_population_sum/{id}`.
///
/// `population_sum` is `null` for a system without planets.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PopulationSumResponse {
    pub population_sum: Option<u64>,
}

/// `GET /systems/get_system_by_name/{name}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemNameResponse {
    pub system_name: String,
    pub system_id: Uuid,
}
