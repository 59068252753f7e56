//! # System Handlers
//!
//! CRUD for systems plus the two ad-hoc reads (population sum, lookup by
//! name). Create and update resolve the commander's display name before any
//! write, so an unresolvable email leaves storage untouched.

use crate::api::{
    AppState,
    error::ApiError,
    extract::{PathParam, ValidJson},
    types::{CommanderQuery, PopulationSumResponse, SystemNameResponse},
};
use axum::{
    Json,
    extract::{Query, State},
};
use starmap_core::{CreateSystem, System, UpdateSystem, ValidationErrors};
use uuid::Uuid;

/// The optional `?email=` must agree with the body's commander.
fn check_query_email(query: &CommanderQuery, supreme_commander: &str) -> Result<(), ApiError> {
    match query.email.as_deref() {
        Some(email) if !email.eq_ignore_ascii_case(supreme_commander) => {
            Err(ValidationErrors::single("email", "must match supreme_commander").into())
        }
        _ => Ok(()),
    }
}

/// `GET /systems`
pub async fn list_systems(State(state): State<AppState>) -> Result<Json<Vec<System>>, ApiError> {
    Ok(Json(state.store.list_systems()?))
}

/// `GET /systems/{system_id}`
pub async fn get_system(
    State(state): State<AppState>,
    PathParam(system_id): PathParam<Uuid>,
) -> Result<Json<System>, ApiError> {
    Ok(Json(state.store.get_system(system_id)?))
}

/// `POST /systems`
pub async fn create_system(
    State(state): State<AppState>,
    Query(query): Query<CommanderQuery>,
    ValidJson(request): ValidJson<CreateSystem>,
) -> Result<Json<System>, ApiError> {
    check_query_email(&query, &request.supreme_commander)?;

    let commander_name = state
        .directory
        .resolve_name(&request.supreme_commander)
        .await?;

    let system = request.into_system(commander_name);
    state.store.insert_system(&system)?;

    tracing::info!(system_id = %system.id, "Created system {}.", system.name);
    Ok(Json(system))
}

/// `PUT /systems/{system_id}`
pub async fn update_system(
    State(state): State<AppState>,
    PathParam(system_id): PathParam<Uuid>,
    Query(query): Query<CommanderQuery>,
    ValidJson(changes): ValidJson<UpdateSystem>,
) -> Result<Json<System>, ApiError> {
    state.store.get_system(system_id)?;
    check_query_email(&query, &changes.supreme_commander)?;

    let commander_name = state
        .directory
        .resolve_name(&changes.supreme_commander)
        .await?;

    let system = state
        .store
        .update_system(system_id, &changes, &commander_name)?;

    tracing::info!(system_id = %system.id, "Updated system {}.", system.name);
    Ok(Json(system))
}

/// `DELETE /systems/{system_id}`
pub async fn delete_system(
    State(state): State<AppState>,
    PathParam(system_id): PathParam<Uuid>,
) -> Result<Json<System>, ApiError> {
    let system = state.store.delete_system(system_id)?;

    tracing::info!(system_id = %system.id, "Deleted system {}.", system.name);
    Ok(Json(system))
}

/// `GET /systems/system_population_sum/{system_id}`
pub async fn population_sum(
    State(state): State<AppState>,
    PathParam(system_id): PathParam<Uuid>,
) -> Result<Json<PopulationSumResponse>, ApiError> {
    let population_sum = state.store.system_population_sum(system_id)?;
    Ok(Json(PopulationSumResponse { population_sum }))
}

/// `GET /systems/get_system_by_name/{system_name}`
pub async fn get_system_by_name(
    State(state): State<AppState>,
    PathParam(system_name): PathParam<String>,
) -> Result<Json<SystemNameResponse>, ApiError> {
    let system = state.store.find_system_by_name(&system_name)?;
    Ok(Json(SystemNameResponse {
        system_name: system.name,
        system_id: system.id,
    }))
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_email_may_be_absent() {
        assert!(check_query_email(&CommanderQuery::default(), "Sincere@april.biz").is_ok());
    }

    #[test]
    fn query_email_matches_case_insensitively() {
        let query = CommanderQuery {
            email: Some("sincere@april.biz".to_string()),
        };
        assert!(check_query_email(&query, "Sincere@april.biz").is_ok());
    }

    #[test]
    fn query_email_mismatch_is_validation_error() {
        let query = CommanderQuery {
            email: Some("Shanna@melissa.tv".to_string()),
        };
        let err = check_query_email(&query, "Sincere@april.biz").expect_err("mismatch");
        assert_eq!(err.status(), axum::http::StatusCode::UNPROCESSABLE_ENTITY);
    }
}
