//! # redb-backed Store
//!
//! A disk-backed relational layout on top of the redb embedded database:
//! - ACID transactions, one write transaction per mutation
//! - MVCC: readers never block the single writer
//! - Rows are postcard-encoded and keyed by the UUID as `u128`
//!
//! ## Tables
//!
//! | Table                | Key                      | Value          |
//! |----------------------|--------------------------|----------------|
//! | `systems`            | system id                | `System`       |
//! | `planets`            | planet id                | `PlanetRecord` |
//! | `stations`           | station id               | `StationRecord`|
//! | `planets_by_system`  | (system id, planet id)   | `()`           |
//! | `stations_by_planet` | (planet id, station id)  | `()`           |
//!
//! The two index tables are the foreign keys: they are written in the same
//! transaction as the child row, checked before a parent is deleted, and
//! range-scanned for per-parent aggregates.

use crate::primitives::{
    PLANETS_BY_SYSTEM_TABLE, PLANETS_TABLE, STATIONS_BY_PLANET_TABLE, STATIONS_TABLE,
    SYSTEMS_TABLE,
};
use crate::schema::{PlanetChanges, StationChanges, SystemChanges};
use crate::{EntityKind, Planet, PlanetRecord, StarmapError, Station, StationRecord, System};
use redb::{Database, ReadableDatabase, ReadableTable, ReadableTableMetadata, TableDefinition};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::collections::BTreeMap;
use std::path::Path;
use uuid::Uuid;

type RowTable = TableDefinition<'static, u128, &'static [u8]>;
type IndexTable = TableDefinition<'static, (u128, u128), ()>;

const SYSTEMS: RowTable = TableDefinition::new(SYSTEMS_TABLE);
const PLANETS: RowTable = TableDefinition::new(PLANETS_TABLE);
const STATIONS: RowTable = TableDefinition::new(STATIONS_TABLE);
const PLANETS_BY_SYSTEM: IndexTable = TableDefinition::new(PLANETS_BY_SYSTEM_TABLE);
const STATIONS_BY_PLANET: IndexTable = TableDefinition::new(STATIONS_BY_PLANET_TABLE);

/// Row counts per entity table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StoreCounts {
    pub systems: u64,
    pub planets: u64,
    pub stations: u64,
}

/// The persistence handle shared by every request.
///
/// `RedbStore` is `Send + Sync`; each call opens its own transaction, so the
/// handle is shared behind an `Arc` without further locking.
pub struct RedbStore {
    db: Database,
}

impl std::fmt::Debug for RedbStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedbStore").finish_non_exhaustive()
    }
}

// =============================================================================
// ROW HELPERS
// =============================================================================

fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>, StarmapError> {
    Ok(postcard::to_allocvec(value)?)
}

fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, StarmapError> {
    Ok(postcard::from_bytes(bytes)?)
}

fn fetch<T: DeserializeOwned>(
    table: &impl ReadableTable<u128, &'static [u8]>,
    id: Uuid,
) -> Result<Option<T>, StarmapError> {
    match table.get(id.as_u128())? {
        Some(guard) => Ok(Some(decode(guard.value())?)),
        None => Ok(None),
    }
}

fn scan<T: DeserializeOwned>(
    table: &impl ReadableTable<u128, &'static [u8]>,
) -> Result<Vec<T>, StarmapError> {
    let mut rows = Vec::new();
    for entry in table.iter()? {
        let (_, value) = entry?;
        rows.push(decode(value.value())?);
    }
    Ok(rows)
}

/// Child ids recorded under `parent` in a foreign-key index, in id order.
fn children(
    index: &impl ReadableTable<(u128, u128), ()>,
    parent: Uuid,
) -> Result<Vec<Uuid>, StarmapError> {
    let parent = parent.as_u128();
    let mut ids = Vec::new();
    for entry in index.range((parent, 0u128)..=(parent, u128::MAX))? {
        let (key, _) = entry?;
        let (_, child) = key.value();
        ids.push(Uuid::from_u128(child));
    }
    Ok(ids)
}

/// A row references a parent that is no longer stored.
fn dangling(entity: EntityKind, id: Uuid) -> StarmapError {
    StarmapError::Storage(format!("dangling reference to {} {}", entity, id))
}

/// Parents fetched during one read, so listing N children of the same parent
/// costs one parent lookup rather than N.
#[derive(Default)]
struct ParentCache {
    systems: BTreeMap<Uuid, System>,
    planets: BTreeMap<Uuid, Planet>,
}

impl ParentCache {
    fn system(
        &mut self,
        systems: &impl ReadableTable<u128, &'static [u8]>,
        id: Uuid,
    ) -> Result<System, StarmapError> {
        if let Some(system) = self.systems.get(&id) {
            return Ok(system.clone());
        }
        let system: System =
            fetch(systems, id)?.ok_or_else(|| dangling(EntityKind::System, id))?;
        self.systems.insert(id, system.clone());
        Ok(system)
    }

    fn planet(
        &mut self,
        systems: &impl ReadableTable<u128, &'static [u8]>,
        planets: &impl ReadableTable<u128, &'static [u8]>,
        id: Uuid,
    ) -> Result<Planet, StarmapError> {
        if let Some(planet) = self.planets.get(&id) {
            return Ok(planet.clone());
        }
        let record: PlanetRecord =
            fetch(planets, id)?.ok_or_else(|| dangling(EntityKind::Planet, id))?;
        let system = self.system(systems, record.system_id)?;
        let planet = Planet::compose(record, system);
        self.planets.insert(id, planet.clone());
        Ok(planet)
    }
}

impl RedbStore {
    /// Open or create a store at the given path.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StarmapError> {
        let db = Database::create(path.as_ref())?;

        // Create every table up front so read transactions never miss one.
        {
            let write_txn = db.begin_write()?;
            write_txn.open_table(SYSTEMS)?;
            write_txn.open_table(PLANETS)?;
            write_txn.open_table(STATIONS)?;
            write_txn.open_table(PLANETS_BY_SYSTEM)?;
            write_txn.open_table(STATIONS_BY_PLANET)?;
            write_txn.commit()?;
        }

        Ok(Self { db })
    }

    /// Row counts per entity table.
    pub fn counts(&self) -> Result<StoreCounts, StarmapError> {
        let read_txn = self.db.begin_read()?;
        Ok(StoreCounts {
            systems: read_txn.open_table(SYSTEMS)?.len()?,
            planets: read_txn.open_table(PLANETS)?.len()?,
            stations: read_txn.open_table(STATIONS)?.len()?,
        })
    }

    // =========================================================================
    // SYSTEMS
    // =========================================================================

    /// All systems in id order.
    pub fn list_systems(&self) -> Result<Vec<System>, StarmapError> {
        let read_txn = self.db.begin_read()?;
        let systems = read_txn.open_table(SYSTEMS)?;
        scan(&systems)
    }

    pub fn get_system(&self, id: Uuid) -> Result<System, StarmapError> {
        let read_txn = self.db.begin_read()?;
        let systems = read_txn.open_table(SYSTEMS)?;
        fetch(&systems, id)?.ok_or_else(|| StarmapError::not_found(EntityKind::System, id))
    }

    pub fn insert_system(&self, system: &System) -> Result<(), StarmapError> {
        let write_txn = self.db.begin_write()?;
        {
            let mut systems = write_txn.open_table(SYSTEMS)?;
            let key = system.id.as_u128();
            if systems.get(key)?.is_some() {
                return Err(StarmapError::DuplicateKey {
                    entity: EntityKind::System,
                    id: system.id,
                });
            }
            systems.insert(key, encode(system)?.as_slice())?;
        }
        write_txn.commit()?;
        Ok(())
    }

    /// Overwrite name, email and resolved commander name.
    pub fn update_system(
        &self,
        id: Uuid,
        changes: &SystemChanges,
        supreme_commander_name: &str,
    ) -> Result<System, StarmapError> {
        let write_txn = self.db.begin_write()?;
        let system = {
            let mut systems = write_txn.open_table(SYSTEMS)?;
            let mut system: System = fetch(&systems, id)?
                .ok_or_else(|| StarmapError::not_found(EntityKind::System, id))?;
            changes.apply(&mut system, supreme_commander_name);
            systems.insert(id.as_u128(), encode(&system)?.as_slice())?;
            system
        };
        write_txn.commit()?;
        Ok(system)
    }

    /// Remove a system that no planet references.
    ///
    /// Returns the removed row.
    pub fn delete_system(&self, id: Uuid) -> Result<System, StarmapError> {
        let write_txn = self.db.begin_write()?;
        let system = {
            let mut systems = write_txn.open_table(SYSTEMS)?;
            let index = write_txn.open_table(PLANETS_BY_SYSTEM)?;
            let system: System = fetch(&systems, id)?
                .ok_or_else(|| StarmapError::not_found(EntityKind::System, id))?;

            let planets = children(&index, id)?;
            if !planets.is_empty() {
                return Err(StarmapError::HasDependents {
                    entity: EntityKind::System,
                    id,
                    dependents: EntityKind::Planet,
                    count: planets.len(),
                });
            }

            systems.remove(id.as_u128())?;
            system
        };
        write_txn.commit()?;
        Ok(system)
    }

    /// Sum of `population_millions` over the system's planets.
    ///
    /// `None` when the system has no planets, the same as SQL `SUM` over an
    /// empty set.
    pub fn system_population_sum(&self, id: Uuid) -> Result<Option<u64>, StarmapError> {
        let read_txn = self.db.begin_read()?;
        let systems = read_txn.open_table(SYSTEMS)?;
        let planets = read_txn.open_table(PLANETS)?;
        let index = read_txn.open_table(PLANETS_BY_SYSTEM)?;

        if systems.get(id.as_u128())?.is_none() {
            return Err(StarmapError::not_found(EntityKind::System, id));
        }

        let planet_ids = children(&index, id)?;
        if planet_ids.is_empty() {
            return Ok(None);
        }

        let mut sum: u64 = 0;
        for planet_id in planet_ids {
            let record: PlanetRecord = fetch(&planets, planet_id)?
                .ok_or_else(|| dangling(EntityKind::Planet, planet_id))?;
            sum = sum
                .checked_add(record.population_millions)
                .ok_or(StarmapError::SumOverflow {
                    entity: EntityKind::System,
                    id,
                })?;
        }
        Ok(Some(sum))
    }

    /// The single system whose name equals `name` exactly.
    ///
    /// More than one match is an `AmbiguousName` error rather than an
    /// arbitrary pick.
    pub fn find_system_by_name(&self, name: &str) -> Result<System, StarmapError> {
        let read_txn = self.db.begin_read()?;
        let systems = read_txn.open_table(SYSTEMS)?;

        let mut matches = scan::<System>(&systems)?
            .into_iter()
            .filter(|system| system.name == name);

        match (matches.next(), matches.next()) {
            (Some(system), None) => Ok(system),
            (None, _) => Err(StarmapError::NotFound {
                entity: EntityKind::System,
                key: name.to_string(),
            }),
            (Some(_), Some(_)) => Err(StarmapError::AmbiguousName {
                entity: EntityKind::System,
                name: name.to_string(),
            }),
        }
    }

    // =========================================================================
    // PLANETS
    // =========================================================================

    /// All planets in id order, each with its system embedded.
    pub fn list_planets(&self) -> Result<Vec<Planet>, StarmapError> {
        let read_txn = self.db.begin_read()?;
        let systems = read_txn.open_table(SYSTEMS)?;
        let planets = read_txn.open_table(PLANETS)?;

        let mut cache = ParentCache::default();
        scan::<PlanetRecord>(&planets)?
            .into_iter()
            .map(|record| {
                let system = cache.system(&systems, record.system_id)?;
                Ok(Planet::compose(record, system))
            })
            .collect()
    }

    pub fn get_planet(&self, id: Uuid) -> Result<Planet, StarmapError> {
        let read_txn = self.db.begin_read()?;
        let systems = read_txn.open_table(SYSTEMS)?;
        let planets = read_txn.open_table(PLANETS)?;

        let record: PlanetRecord =
            fetch(&planets, id)?.ok_or_else(|| StarmapError::not_found(EntityKind::Planet, id))?;
        let system = ParentCache::default().system(&systems, record.system_id)?;
        Ok(Planet::compose(record, system))
    }

    /// Insert a planet under an existing system.
    ///
    /// Fails with a system `NotFound` if `record.system_id` does not resolve.
    pub fn insert_planet(&self, record: &PlanetRecord) -> Result<Planet, StarmapError> {
        let write_txn = self.db.begin_write()?;
        let planet = {
            let systems = write_txn.open_table(SYSTEMS)?;
            let mut planets = write_txn.open_table(PLANETS)?;
            let mut index = write_txn.open_table(PLANETS_BY_SYSTEM)?;

            let system: System = fetch(&systems, record.system_id)?
                .ok_or_else(|| StarmapError::not_found(EntityKind::System, record.system_id))?;

            let key = record.id.as_u128();
            if planets.get(key)?.is_some() {
                return Err(StarmapError::DuplicateKey {
                    entity: EntityKind::Planet,
                    id: record.id,
                });
            }
            planets.insert(key, encode(record)?.as_slice())?;
            index.insert((record.system_id.as_u128(), key), ())?;

            Planet::compose(record.clone(), system)
        };
        write_txn.commit()?;
        Ok(planet)
    }

    pub fn update_planet(&self, id: Uuid, changes: &PlanetChanges) -> Result<Planet, StarmapError> {
        let write_txn = self.db.begin_write()?;
        let planet = {
            let systems = write_txn.open_table(SYSTEMS)?;
            let mut planets = write_txn.open_table(PLANETS)?;

            let mut record: PlanetRecord = fetch(&planets, id)?
                .ok_or_else(|| StarmapError::not_found(EntityKind::Planet, id))?;
            changes.apply(&mut record);
            planets.insert(id.as_u128(), encode(&record)?.as_slice())?;

            let system = ParentCache::default().system(&systems, record.system_id)?;
            Planet::compose(record, system)
        };
        write_txn.commit()?;
        Ok(planet)
    }

    /// Remove a planet that no station references.
    pub fn delete_planet(&self, id: Uuid) -> Result<Planet, StarmapError> {
        let write_txn = self.db.begin_write()?;
        let planet = {
            let systems = write_txn.open_table(SYSTEMS)?;
            let mut planets = write_txn.open_table(PLANETS)?;
            let mut planet_index = write_txn.open_table(PLANETS_BY_SYSTEM)?;
            let station_index = write_txn.open_table(STATIONS_BY_PLANET)?;

            let record: PlanetRecord = fetch(&planets, id)?
                .ok_or_else(|| StarmapError::not_found(EntityKind::Planet, id))?;

            let stations = children(&station_index, id)?;
            if !stations.is_empty() {
                return Err(StarmapError::HasDependents {
                    entity: EntityKind::Planet,
                    id,
                    dependents: EntityKind::Station,
                    count: stations.len(),
                });
            }

            let system = ParentCache::default().system(&systems, record.system_id)?;
            planets.remove(id.as_u128())?;
            planet_index.remove((record.system_id.as_u128(), id.as_u128()))?;
            Planet::compose(record, system)
        };
        write_txn.commit()?;
        Ok(planet)
    }

    // =========================================================================
    // STATIONS
    // =========================================================================

    /// All stations in id order, each with its planet and system embedded.
    pub fn list_stations(&self) -> Result<Vec<Station>, StarmapError> {
        let read_txn = self.db.begin_read()?;
        let systems = read_txn.open_table(SYSTEMS)?;
        let planets = read_txn.open_table(PLANETS)?;
        let stations = read_txn.open_table(STATIONS)?;

        let mut cache = ParentCache::default();
        scan::<StationRecord>(&stations)?
            .into_iter()
            .map(|record| {
                let planet = cache.planet(&systems, &planets, record.planet_id)?;
                Ok(Station::compose(record, planet))
            })
            .collect()
    }

    pub fn get_station(&self, id: Uuid) -> Result<Station, StarmapError> {
        let read_txn = self.db.begin_read()?;
        let systems = read_txn.open_table(SYSTEMS)?;
        let planets = read_txn.open_table(PLANETS)?;
        let stations = read_txn.open_table(STATIONS)?;

        let record: StationRecord = fetch(&stations, id)?
            .ok_or_else(|| StarmapError::not_found(EntityKind::Station, id))?;
        let planet = ParentCache::default().planet(&systems, &planets, record.planet_id)?;
        Ok(Station::compose(record, planet))
    }

    /// Insert a station under an existing planet.
    ///
    /// Fails with a planet `NotFound` if `record.planet_id` does not resolve.
    pub fn insert_station(&self, record: &StationRecord) -> Result<Station, StarmapError> {
        let write_txn = self.db.begin_write()?;
        let station = {
            let systems = write_txn.open_table(SYSTEMS)?;
            let planets = write_txn.open_table(PLANETS)?;
            let mut stations = write_txn.open_table(STATIONS)?;
            let mut index = write_txn.open_table(STATIONS_BY_PLANET)?;

            if planets.get(record.planet_id.as_u128())?.is_none() {
                return Err(StarmapError::not_found(
                    EntityKind::Planet,
                    record.planet_id,
                ));
            }
            let planet = ParentCache::default().planet(&systems, &planets, record.planet_id)?;

            let key = record.id.as_u128();
            if stations.get(key)?.is_some() {
                return Err(StarmapError::DuplicateKey {
                    entity: EntityKind::Station,
                    id: record.id,
                });
            }
            stations.insert(key, encode(record)?.as_slice())?;
            index.insert((record.planet_id.as_u128(), key), ())?;

            Station::compose(record.clone(), planet)
        };
        write_txn.commit()?;
        Ok(station)
    }

    pub fn update_station(
        &self,
        id: Uuid,
        changes: &StationChanges,
    ) -> Result<Station, StarmapError> {
        let write_txn = self.db.begin_write()?;
        let station = {
            let systems = write_txn.open_table(SYSTEMS)?;
            let planets = write_txn.open_table(PLANETS)?;
            let mut stations = write_txn.open_table(STATIONS)?;

            let mut record: StationRecord = fetch(&stations, id)?
                .ok_or_else(|| StarmapError::not_found(EntityKind::Station, id))?;
            changes.apply(&mut record);
            stations.insert(id.as_u128(), encode(&record)?.as_slice())?;

            let planet = ParentCache::default().planet(&systems, &planets, record.planet_id)?;
            Station::compose(record, planet)
        };
        write_txn.commit()?;
        Ok(station)
    }

    pub fn delete_station(&self, id: Uuid) -> Result<Station, StarmapError> {
        let write_txn = self.db.begin_write()?;
        let station = {
            let systems = write_txn.open_table(SYSTEMS)?;
            let planets = write_txn.open_table(PLANETS)?;
            let mut stations = write_txn.open_table(STATIONS)?;
            let mut index = write_txn.open_table(STATIONS_BY_PLANET)?;

            let record: StationRecord = fetch(&stations, id)?
                .ok_or_else(|| StarmapError::not_found(EntityKind::Station, id))?;
            let planet = ParentCache::default().planet(&systems, &planets, record.planet_id)?;

            stations.remove(id.as_u128())?;
            index.remove((record.planet_id.as_u128(), id.as_u128()))?;
            Station::compose(record, planet)
        };
        write_txn.commit()?;
        Ok(station)
    }
}

// =============================================================================
// TESTS
// =============================================================================
