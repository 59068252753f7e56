//! # Core Type Definitions
//!
//! This module contains the records stored for each level of the hierarchy
//! and the read shapes returned to callers:
//! - `System`: stored and returned as-is
//! - `PlanetRecord` / `Planet`: the row, and the row with its `System` embedded
//! - `StationRecord` / `Station`: the row, and the row with its `Planet` embedded
//! - Error types (`StarmapError`)
//!
//! Records only ever reference their parent by id. Embedding happens in the
//! storage read path through `Planet::compose` and `Station::compose`.

use crate::validation::ValidationErrors;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use uuid::Uuid;

// =============================================================================
// ENTITY KIND
// =============================================================================

/// The three entity kinds, used to label errors and log lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum EntityKind {
    System,
    Planet,
    Station,
}

impl EntityKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::System => "system",
            Self::Planet => "planet",
            Self::Station => "station",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// STATION TYPE
// =============================================================================

/// Closed set of station categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StationType {
    Military,
    Research,
    Trade,
    Mining,
    Shipyard,
}

impl StationType {
    /// Wire name of the category.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Military => "military",
            Self::Research => "research",
            Self::Trade => "trade",
            Self::Mining => "mining",
            Self::Shipyard => "shipyard",
        }
    }
}

impl fmt::Display for StationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// SYSTEM
// =============================================================================

/// Top-level administrative domain with a named human commander.
///
/// `supreme_commander_name` is never supplied by callers; it is resolved from
/// `supreme_commander` by the enrichment step before the row is written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct System {
    pub id: Uuid,
    pub name: String,
    pub supreme_commander: String,
    pub supreme_commander_name: String,
    pub date_created: DateTime<Utc>,
}

// =============================================================================
// PLANET
// =============================================================================

/// Planet row as persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanetRecord {
    pub id: Uuid,
    pub name: String,
    pub project_id: Uuid,
    pub population_millions: u64,
    pub system_id: Uuid,
}

/// Planet as returned to callers, with its System embedded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Planet {
    pub id: Uuid,
    pub name: String,
    pub project_id: Uuid,
    pub population_millions: u64,
    pub system_id: Uuid,
    pub system: System,
}

impl Planet {
    /// Join a planet row with its already-fetched parent.
    #[must_use]
    pub fn compose(record: PlanetRecord, system: System) -> Self {
        Self {
            id: record.id,
            name: record.name,
            project_id: record.project_id,
            population_millions: record.population_millions,
            system_id: record.system_id,
            system,
        }
    }
}

// =============================================================================
// STATION
// =============================================================================

/// Station row as persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StationRecord {
    pub id: Uuid,
    pub name: String,
    pub commander: String,
    pub established_on: DateTime<Utc>,
    #[serde(rename = "type")]
    pub station_type: StationType,
    pub planet_id: Uuid,
}

/// Station as returned to callers, with its Planet (and that Planet's System)
/// embedded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Station {
    pub id: Uuid,
    pub name: String,
    pub commander: String,
    pub established_on: DateTime<Utc>,
    #[serde(rename = "type")]
    pub station_type: StationType,
    pub planet_id: Uuid,
    pub planet: Planet,
}

impl Station {
    /// Join a station row with its already-composed parent planet.
    #[must_use]
    pub fn compose(record: StationRecord, planet: Planet) -> Self {
        Self {
            id: record.id,
            name: record.name,
            commander: record.commander,
            established_on: record.established_on,
            station_type: record.station_type,
            planet_id: record.planet_id,
            planet,
        }
    }
}

// =============================================================================
// ERROR TYPES
// =============================================================================

/// Errors that can occur in starmap.
///
/// - `NotFound` covers both ids and name lookups; `key` is what was asked for
/// - `HasDependents` is returned instead of orphaning or cascading children
/// - Storage errors carry the backend message verbatim
#[derive(Debug, Error)]
pub enum StarmapError {
    /// No row matched the requested id or name.
    #[error("{entity} not found")]
    NotFound { entity: EntityKind, key: String },

    /// One or more fields failed boundary validation.
    #[error("Validation failed: {0}")]
    Validation(ValidationErrors),

    /// The row cannot be deleted while children still reference it.
    #[error("{entity} {id} still has {count} {dependents}(s)")]
    HasDependents {
        entity: EntityKind,
        id: Uuid,
        dependents: EntityKind,
        count: usize,
    },

    /// A name lookup matched more than one row.
    #[error("Multiple {entity}s named '{name}'")]
    AmbiguousName { entity: EntityKind, name: String },

    /// An aggregate over the children of `id` does not fit in `u64`.
    #[error("Population sum of {entity} {id} overflows")]
    SumOverflow { entity: EntityKind, id: Uuid },

    /// An insert collided with an existing primary key.
    #[error("Duplicate key: {entity} {id} already exists")]
    DuplicateKey { entity: EntityKind, id: Uuid },

    /// The storage backend failed.
    #[error("Storage error: {0}")]
    Storage(String),

    /// A row could not be encoded or decoded.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl StarmapError {
    /// Shorthand for an id-keyed `NotFound`.
    #[must_use]
    pub fn not_found(entity: EntityKind, id: Uuid) -> Self {
        Self::NotFound {
            entity,
            key: id.to_string(),
        }
    }
}

impl From<ValidationErrors> for StarmapError {
    fn from(errors: ValidationErrors) -> Self {
        Self::Validation(errors)
    }
}

impl From<postcard::Error> for StarmapError {
    fn from(e: postcard::Error) -> Self {
        Self::Serialization(e.to_string())
    }
}

impl From<redb::DatabaseError> for StarmapError {
    fn from(e: redb::DatabaseError) -> Self {
        Self::Storage(e.to_string())
    }
}

impl From<redb::TransactionError> for StarmapError {
    fn from(e: redb::TransactionError) -> Self {
        Self::Storage(e.to_string())
    }
}

impl From<redb::TableError> for StarmapError {
    fn from(e: redb::TableError) -> Self {
        Self::Storage(e.to_string())
    }
}

impl From<redb::StorageError> for StarmapError {
    fn from(e: redb::StorageError) -> Self {
        Self::Storage(e.to_string())
    }
}

impl From<redb::CommitError> for StarmapError {
    fn from(e: redb::CommitError) -> Self {
        Self::Storage(e.to_string())
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_system() -> System {
        System {
            id: Uuid::new_v4(),
            name: "Sol".to_string(),
            supreme_commander: "Sincere@april.biz".to_string(),
            supreme_commander_name: "Leanne Graham".to_string(),
            date_created: Utc::now(),
        }
    }

    #[test]
    fn station_type_wire_names() {
        for station_type in [
            StationType::Military,
            StationType::Research,
            StationType::Trade,
            StationType::Mining,
            StationType::Shipyard,
        ] {
            let json = serde_json::to_string(&station_type).expect("serialize");
            assert_eq!(json, format!("\"{}\"", station_type.as_str()));
        }
    }

    #[test]
    fn station_type_rejects_unknown_category() {
        let parsed = serde_json::from_str::<StationType>("\"casino\"");
        assert!(parsed.is_err());
    }

    #[test]
    fn planet_compose_embeds_parent() {
        let system = sample_system();
        let record = PlanetRecord {
            id: Uuid::new_v4(),
            name: "Earth".to_string(),
            project_id: Uuid::new_v4(),
            population_millions: 8000,
            system_id: system.id,
        };

        let planet = Planet::compose(record.clone(), system.clone());
        assert_eq!(planet.id, record.id);
        assert_eq!(planet.system_id, system.id);
        assert_eq!(planet.system, system);
    }

    #[test]
    fn station_serializes_type_field() {
        let system = sample_system();
        let planet = Planet::compose(
            PlanetRecord {
                id: Uuid::new_v4(),
                name: "Mars".to_string(),
                project_id: Uuid::new_v4(),
                population_millions: 0,
                system_id: system.id,
            },
            system,
        );
        let station = Station::compose(
            StationRecord {
                id: Uuid::new_v4(),
                name: "Olympus Yard".to_string(),
                commander: "Ervin Howell".to_string(),
                established_on: Utc::now(),
                station_type: StationType::Shipyard,
                planet_id: planet.id,
            },
            planet,
        );

        let value = serde_json::to_value(&station).expect("serialize");
        assert_eq!(value["type"], "shipyard");
        assert_eq!(value["planet"]["system"]["name"], "Sol");
    }

    #[test]
    fn not_found_message_names_entity() {
        let err = StarmapError::not_found(EntityKind::System, Uuid::nil());
        assert_eq!(err.to_string(), "system not found");
    }

    #[test]
    fn records_roundtrip_through_postcard() {
        let system = sample_system();
        let bytes = postcard::to_allocvec(&system).expect("encode");
        let decoded: System = postcard::from_bytes(&bytes).expect("decode");
        assert_eq!(decoded, system);
    }
}
