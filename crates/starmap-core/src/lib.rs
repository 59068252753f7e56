//! # starmap-core
//!
//! Records, boundary validation and persistence for the starmap service.
//!
//! The service manages a strict three-level tree:
//!
//! ```text
//! System ──< Planet ──< Station
//! ```
//!
//! ## Layers
//!
//! - `types`: the persisted records, the read shapes that embed their parent,
//!   and the crate-wide `StarmapError`
//! - `validation`: small validator functions that report field-level errors
//! - `schema`: the create/update shapes accepted from callers and the typed
//!   values they validate into
//! - `storage`: `RedbStore`, one redb database holding every table
//!
//! ## Architectural Constraints
//!
//! - NO async, NO network: enrichment and HTTP live in the binary
//! - Every mutation is a single redb write transaction
//! - Reads compose parents explicitly inside one read transaction

// =============================================================================
// MODULES
// =============================================================================

pub mod primitives;
pub mod schema;
pub mod storage;
pub mod types;
pub mod validation;

// =============================================================================
// RE-EXPORTS
// =============================================================================

pub use schema::{
    CreatePlanet, CreateStation, CreateSystem, NewPlanet, NewStation, NewSystem, PlanetChanges,
    StationChanges, SystemChanges, UpdatePlanet, UpdateStation, UpdateSystem, Validate,
};
pub use storage::{RedbStore, StoreCounts};
pub use types::{
    EntityKind, Planet, PlanetRecord, StarmapError, Station, StationRecord, StationType, System,
};
pub use validation::{FieldError, ValidationErrors, is_valid_email};
