//! # Planet Handlers

use crate::api::{
    AppState,
    error::ApiError,
    extract::{PathParam, ValidJson},
};
use axum::{Json, extract::State};
use starmap_core::{CreatePlanet, Planet, UpdatePlanet};
use uuid::Uuid;

/// `GET /planets`
pub async fn list_planets(State(state): State<AppState>) -> Result<Json<Vec<Planet>>, ApiError> {
    Ok(Json(state.store.list_planets()?))
}

/// `GET /planets/{planet_id}`
pub async fn get_planet(
    State(state): State<AppState>,
    PathParam(planet_id): PathParam<Uuid>,
) -> Result<Json<Planet>, ApiError> {
    Ok(Json(state.store.get_planet(planet_id)?))
}

/// `POST /planets`
///
/// Fails with 404 when `system_id` names no system.
pub async fn create_planet(
    State(state): State<AppState>,
    ValidJson(planet): ValidJson<CreatePlanet>,
) -> Result<Json<Planet>, ApiError> {
    let planet = state.store.insert_planet(&planet.into_record())?;

    tracing::info!(
        planet_id = %planet.id,
        system_id = %planet.system_id,
        "Created planet {}.",
        planet.name
    );
    Ok(Json(planet))
}

/// `PUT /planets/{planet_id}`
pub async fn update_planet(
    State(state): State<AppState>,
    PathParam(planet_id): PathParam<Uuid>,
    ValidJson(changes): ValidJson<UpdatePlanet>,
) -> Result<Json<Planet>, ApiError> {
    let planet = state.store.update_planet(planet_id, &changes)?;

    tracing::info!(planet_id = %planet.id, "Updated planet {}.", planet.name);
    Ok(Json(planet))
}

/// `DELETE /planets/{planet_id}`
pub async fn delete_planet(
    State(state): State<AppState>,
    PathParam(planet_id): PathParam<Uuid>,
) -> Result<Json<Planet>, ApiError> {
    let planet = state.store.delete_planet(planet_id)?;

    tracing::info!(planet_id = %planet.id, "Deleted planet {}.", planet.name);
    Ok(Json(planet))
}
