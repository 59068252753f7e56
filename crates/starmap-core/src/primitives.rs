//! # Fixed Limits
//!
//! Compile-time constants shared by validation and storage.

/// Maximum length of an email address (RFC 5321 path limit).
pub const MAX_EMAIL_LENGTH: usize = 254;

// =============================================================================
// TABLE NAMES
// =============================================================================

/// System rows, keyed by id.
pub const SYSTEMS_TABLE: &str = "systems";

/// Planet rows, keyed by id.
pub const PLANETS_TABLE: &str = "planets";

/// Station rows, keyed by id.
pub const STATIONS_TABLE: &str = "stations";

/// Foreign-key index `(system_id, planet_id)`.
pub const PLANETS_BY_SYSTEM_TABLE: &str = "planets_by_system";

/// Foreign-key index `(planet_id, station_id)`.
pub const STATIONS_BY_PLANET_TABLE: &str = "stations_by_planet";
