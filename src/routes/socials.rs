/**
 * Social Link Routes
 * JSON API endpoints for the author's social links
 */
use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};

use crate::db::models::{NewSocial, Social};
use crate::error::AppError;
use crate::middleware::Admin;
use crate::routes::query::{list_filters, QueryString};
use crate::routes::{json_body, parse_id, Envelope};
use crate::state::AppState;
use crate::validator::Validator;

fn validate_social(v: &mut Validator, social: &NewSocial) {
    v.check(social.user_id > 0, "user_id", "must be greater than zero");
    v.check(
        !social.social_platform.trim().is_empty(),
        "social_platform",
        "must be provided",
    );
    v.check(
        social.link.starts_with("http://") || social.link.starts_with("https://"),
        "link",
        "must be an http or https URL",
    );
}

/// GET /api/social - Filtered, paginated list of social links
pub async fn list_socials(
    State(state): State<AppState>,
    Query(qs): Query<QueryString>,
) -> Result<Json<Envelope<Vec<Social>>>, AppError> {
    let filters = list_filters::<Social>(&qs)?;
    let (socials, metadata) = state.models().socials.list(&filters).await?;

    Ok(Json(Envelope::new(metadata, socials)))
}

/// GET /api/social/{id}
pub async fn get_social(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Envelope<Social>>, AppError> {
    let id = parse_id(&id)?;
    let social = state.models().socials.get(id).await?;

    Ok(Json(Envelope::single(social)))
}

/// POST /api/social - Add a social link (auth required)
pub async fn create_social(
    State(state): State<AppState>,
    _admin: Admin,
    payload: Result<Json<NewSocial>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let input = json_body(payload)?;

    let mut v = Validator::new();
    validate_social(&mut v, &input);
    if !v.valid() {
        return Err(AppError::FailedValidation(v.into_errors()));
    }

    // The owning user must exist.
    if let Err(err) = state.models().users.get(input.user_id).await {
        return match AppError::from(err) {
            AppError::NotFound => {
                let mut v = Validator::new();
                v.add_error("user_id", "does not exist");
                Err(AppError::FailedValidation(v.into_errors()))
            }
            other => Err(other),
        };
    }

    let social = state.models().socials.insert(&input).await?;
    let location = format!("/api/social/{}", social.id);

    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, location)],
        Json(Envelope::single(social)),
    ))
}
