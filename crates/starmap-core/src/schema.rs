//! # Request Schemas
//!
//! Create and update shapes accepted from callers, one pair per entity.
//!
//! | Shape           | Omits                                           |
//! |-----------------|-------------------------------------------------|
//! | `Create*`       | server-assigned fields (id, derived name, date) |
//! | `Update*`       | immutable fields (id, foreign keys, project_id) |
//!
//! Shapes are plain deserialization targets. `Validate` turns each one into a
//! typed value (`NewPlanet`, `PlanetChanges`, ...) that storage accepts, so a
//! value that reaches the store has already passed every field check.

use crate::types::{PlanetRecord, StationRecord, StationType, System};
use crate::validation::{
    ValidationErrors, require_email, require_non_negative, require_past, require_text,
};
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, de};
use uuid::Uuid;

/// Formats tried, in order, for a timestamp without an offset.
const NAIVE_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// Validation of a request shape into its typed counterpart.
pub trait Validate: Sized {
    type Valid;

    /// Validate against an explicit clock reading.
    fn validate_at(self, now: DateTime<Utc>) -> Result<Self::Valid, ValidationErrors>;

    /// Validate against the current time.
    fn validate(self) -> Result<Self::Valid, ValidationErrors> {
        self.validate_at(Utc::now())
    }
}

/// RFC 3339 with an offset, or a naive timestamp taken as UTC.
fn parse_utc(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(timestamp) = DateTime::parse_from_rfc3339(raw) {
        return Some(timestamp.with_timezone(&Utc));
    }
    NAIVE_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
        .map(|naive| naive.and_utc())
}

fn deserialize_utc<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_utc(&raw).ok_or_else(|| de::Error::custom(format!("invalid datetime '{}'", raw)))
}

// =============================================================================
// SYSTEM
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateSystem {
    pub name: String,
    pub supreme_commander: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateSystem {
    pub name: String,
    pub supreme_commander: String,
}

/// A validated `CreateSystem`, still waiting for its commander name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSystem {
    pub name: String,
    pub supreme_commander: String,
}

impl NewSystem {
    /// Build the row: fresh id, creation time now.
    #[must_use]
    pub fn into_system(self, supreme_commander_name: String) -> System {
        System {
            id: Uuid::new_v4(),
            name: self.name,
            supreme_commander: self.supreme_commander,
            supreme_commander_name,
            date_created: Utc::now(),
        }
    }
}

/// A validated `UpdateSystem`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SystemChanges {
    pub name: String,
    pub supreme_commander: String,
}

impl SystemChanges {
    /// Overwrite the mutable fields, including the re-resolved commander name.
    pub fn apply(&self, system: &mut System, supreme_commander_name: &str) {
        system.name.clone_from(&self.name);
        system.supreme_commander.clone_from(&self.supreme_commander);
        supreme_commander_name.clone_into(&mut system.supreme_commander_name);
    }
}

fn validate_system_fields(name: &str, email: &str) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();
    errors.check(require_text("name", name));
    errors.check(require_email("supreme_commander", email));
    if errors.is_empty() { Ok(()) } else { Err(errors) }
}

impl Validate for CreateSystem {
    type Valid = NewSystem;

    fn validate_at(self, _now: DateTime<Utc>) -> Result<NewSystem, ValidationErrors> {
        validate_system_fields(&self.name, &self.supreme_commander)?;
        Ok(NewSystem {
            name: self.name,
            supreme_commander: self.supreme_commander,
        })
    }
}

impl Validate for UpdateSystem {
    type Valid = SystemChanges;

    fn validate_at(self, _now: DateTime<Utc>) -> Result<SystemChanges, ValidationErrors> {
        validate_system_fields(&self.name, &self.supreme_commander)?;
        Ok(SystemChanges {
            name: self.name,
            supreme_commander: self.supreme_commander,
        })
    }
}

// =============================================================================
// PLANET
// =============================================================================

/// `population_millions` is signed on the wire so that negative input reaches
/// validation and is reported against the field.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePlanet {
    pub name: String,
    pub project_id: Uuid,
    pub population_millions: i64,
    pub system_id: Uuid,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdatePlanet {
    pub name: String,
    pub population_millions: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPlanet {
    pub name: String,
    pub project_id: Uuid,
    pub population_millions: u64,
    pub system_id: Uuid,
}

impl NewPlanet {
    #[must_use]
    pub fn into_record(self) -> PlanetRecord {
        PlanetRecord {
            id: Uuid::new_v4(),
            name: self.name,
            project_id: self.project_id,
            population_millions: self.population_millions,
            system_id: self.system_id,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanetChanges {
    pub name: String,
    pub population_millions: u64,
}

impl PlanetChanges {
    pub fn apply(&self, record: &mut PlanetRecord) {
        record.name.clone_from(&self.name);
        record.population_millions = self.population_millions;
    }
}

impl Validate for CreatePlanet {
    type Valid = NewPlanet;

    fn validate_at(self, _now: DateTime<Utc>) -> Result<NewPlanet, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.check(require_text("name", &self.name));
        let population = errors.check(require_non_negative(
            "population_millions",
            self.population_millions,
        ));

        match population {
            Some(population_millions) if errors.is_empty() => Ok(NewPlanet {
                name: self.name,
                project_id: self.project_id,
                population_millions,
                system_id: self.system_id,
            }),
            _ => Err(errors),
        }
    }
}

impl Validate for UpdatePlanet {
    type Valid = PlanetChanges;

    fn validate_at(self, _now: DateTime<Utc>) -> Result<PlanetChanges, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.check(require_text("name", &self.name));
        let population = errors.check(require_non_negative(
            "population_millions",
            self.population_millions,
        ));

        match population {
            Some(population_millions) if errors.is_empty() => Ok(PlanetChanges {
                name: self.name,
                population_millions,
            }),
            _ => Err(errors),
        }
    }
}

// =============================================================================
// STATION
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateStation {
    pub name: String,
    pub commander: String,
    #[serde(deserialize_with = "deserialize_utc")]
    pub established_on: DateTime<Utc>,
    #[serde(rename = "type")]
    pub station_type: StationType,
    pub planet_id: Uuid,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateStation {
    pub name: String,
    pub commander: String,
    #[serde(deserialize_with = "deserialize_utc")]
    pub established_on: DateTime<Utc>,
    #[serde(rename = "type")]
    pub station_type: StationType,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewStation {
    pub name: String,
    pub commander: String,
    pub established_on: DateTime<Utc>,
    pub station_type: StationType,
    pub planet_id: Uuid,
}

impl NewStation {
    #[must_use]
    pub fn into_record(self) -> StationRecord {
        StationRecord {
            id: Uuid::new_v4(),
            name: self.name,
            commander: self.commander,
            established_on: self.established_on,
            station_type: self.station_type,
            planet_id: self.planet_id,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StationChanges {
    pub name: String,
    pub commander: String,
    pub established_on: DateTime<Utc>,
    pub station_type: StationType,
}

impl StationChanges {
    pub fn apply(&self, record: &mut StationRecord) {
        record.name.clone_from(&self.name);
        record.commander.clone_from(&self.commander);
        record.established_on = self.established_on;
        record.station_type = self.station_type;
    }
}

fn validate_station_fields(
    name: &str,
    commander: &str,
    established_on: DateTime<Utc>,
    now: DateTime<Utc>,
) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();
    errors.check(require_text("name", name));
    errors.check(require_text("commander", commander));
    errors.check(require_past("established_on", established_on, now));
    if errors.is_empty() { Ok(()) } else { Err(errors) }
}

impl Validate for CreateStation {
    type Valid = NewStation;

    fn validate_at(self, now: DateTime<Utc>) -> Result<NewStation, ValidationErrors> {
        validate_station_fields(&self.name, &self.commander, self.established_on, now)?;
        Ok(NewStation {
            name: self.name,
            commander: self.commander,
            established_on: self.established_on,
            station_type: self.station_type,
            planet_id: self.planet_id,
        })
    }
}

impl Validate for UpdateStation {
    type Valid = StationChanges;

    fn validate_at(self, now: DateTime<Utc>) -> Result<StationChanges, ValidationErrors> {
        validate_station_fields(&self.name, &self.commander, self.established_on, now)?;
        Ok(StationChanges {
            name: self.name,
            commander: self.commander,
            established_on: self.established_on,
            station_type: self.station_type,
        })
    }
}

// =============================================================================
// TESTS
// =============================================================================
