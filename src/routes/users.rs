/**
 * User Routes
 * JSON API endpoints for author profiles
 */
use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    Json,
};

use crate::db::models::{UpdateUser, User};
use crate::error::AppError;
use crate::middleware::Admin;
use crate::routes::query::{list_filters, QueryString};
use crate::routes::{json_body, parse_id, Envelope, MutationResponse};
use crate::state::AppState;
use crate::validator::Validator;

/// GET /api/user - Filtered, paginated list of users
pub async fn list_users(
    State(state): State<AppState>,
    Query(qs): Query<QueryString>,
) -> Result<Json<Envelope<Vec<User>>>, AppError> {
    let filters = list_filters::<User>(&qs)?;
    let (users, metadata) = state.models().users.list(&filters).await?;

    Ok(Json(Envelope::new(metadata, users)))
}

/// GET /api/user/{id}
pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Envelope<User>>, AppError> {
    let id = parse_id(&id)?;
    let user = state.models().users.get(id).await?;

    Ok(Json(Envelope::single(user)))
}

/// PUT /api/user/{id} - Replace the profile (auth required)
pub async fn update_user(
    State(state): State<AppState>,
    _admin: Admin,
    Path(id): Path<String>,
    payload: Result<Json<UpdateUser>, JsonRejection>,
) -> Result<Json<MutationResponse>, AppError> {
    let id = parse_id(&id)?;
    let input = json_body(payload)?;

    let mut v = Validator::new();
    v.check(!input.name.trim().is_empty(), "name", "must be provided");
    if !v.valid() {
        return Err(AppError::FailedValidation(v.into_errors()));
    }

    let rows_affected = state.models().users.update(id, &input).await?;

    Ok(Json(MutationResponse {
        message: "user updated".to_string(),
        id,
        rows_affected,
    }))
}
