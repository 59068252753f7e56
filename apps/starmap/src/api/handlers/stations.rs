//! # Station Handlers

use crate::api::{
    AppState,
    error::ApiError,
    extract::{PathParam, ValidJson},
};
use axum::{Json, extract::State};
use starmap_core::{CreateStation, Station, UpdateStation};
use uuid::Uuid;

/// `GET /stations`
pub async fn list_stations(
    State(state): State<AppState>,
) -> Result<Json<Vec<Station>>, ApiError> {
    Ok(Json(state.store.list_stations()?))
}

/// `GET /stations/{station_id}`
pub async fn get_station(
    State(state): State<AppState>,
    PathParam(station_id): PathParam<Uuid>,
) -> Result<Json<Station>, ApiError> {
    Ok(Json(state.store.get_station(station_id)?))
}

/// `POST /stations`
///
/// Fails with 404 when `planet_id` names no planet.
pub async fn create_station(
    State(state): State<AppState>,
    ValidJson(station): ValidJson<CreateStation>,
) -> Result<Json<Station>, ApiError> {
    let station = state.store.insert_station(&station.into_record())?;

    tracing::info!(
        station_id = %station.id,
        planet_id = %station.planet_id,
        station_type = %station.station_type,
        "Created station {}.",
        station.name
    );
    Ok(Json(station))
}

/// `PUT /stations/{station_id}`
pub async fn update_station(
    State(state): State<AppState>,
    PathParam(station_id): PathParam<Uuid>,
    ValidJson(changes): ValidJson<UpdateStation>,
) -> Result<Json<Station>, ApiError> {
    let station = state.store.update_station(station_id, &changes)?;

    tracing::info!(station_id = %station.id, "Updated station {}.", station.name);
    Ok(Json(station))
}

/// `DELETE /stations/{station_id}`
pub async fn delete_station(
    State(state): State<AppState>,
    PathParam(station_id): PathParam<Uuid>,
) -> Result<Json<Station>, ApiError> {
    let station = state.store.delete_station(station_id)?;

    tracing::info!(station_id = %station.id, "Deleted station {}.", station.name);
    Ok(Json(station))
}
