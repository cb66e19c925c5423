/**
 * Blog Post Routes
 * JSON API endpoints for blog posts
 */
use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};

use crate::db::models::{BlogPost, NewBlogPost, UpdateBlogPost};
use crate::error::AppError;
use crate::middleware::Admin;
use crate::routes::query::{list_filters, QueryString};
use crate::routes::{json_body, parse_id, Envelope, MutationResponse};
use crate::state::AppState;
use crate::validator::Validator;

// ============================================================================
// Validation
// ============================================================================

const MAX_TITLE_LEN: usize = 500;

fn validate_post(v: &mut Validator, title: &str) {
    v.check(!title.trim().is_empty(), "title", "must be provided");
    v.check(
        title.chars().count() <= MAX_TITLE_LEN,
        "title",
        "must not be more than 500 characters long",
    );
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /api/post - Filtered, paginated list of posts
pub async fn list_posts(
    State(state): State<AppState>,
    Query(qs): Query<QueryString>,
) -> Result<Json<Envelope<Vec<BlogPost>>>, AppError> {
    let filters = list_filters::<BlogPost>(&qs)?;
    let (posts, metadata) = state.models().posts.list(&filters).await?;

    tracing::debug!(count = posts.len(), total = metadata.total_records, "listed blog posts");
    Ok(Json(Envelope::new(metadata, posts)))
}

/// GET /api/post/{id}
pub async fn get_post(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Envelope<BlogPost>>, AppError> {
    let id = parse_id(&id)?;
    let post = state.models().posts.get(id).await?;

    Ok(Json(Envelope::single(post)))
}

/// POST /api/post - Create a post (auth required)
pub async fn create_post(
    State(state): State<AppState>,
    _admin: Admin,
    payload: Result<Json<NewBlogPost>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let input = json_body(payload)?;

    let mut v = Validator::new();
    validate_post(&mut v, &input.title);
    if !v.valid() {
        return Err(AppError::FailedValidation(v.into_errors()));
    }

    let post = state.models().posts.insert(&input).await?;
    let location = format!("/api/post/{}", post.id);

    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, location)],
        Json(Envelope::single(post)),
    ))
}

/// PUT /api/post/{id} - Replace title, lead and content (auth required)
pub async fn update_post(
    State(state): State<AppState>,
    _admin: Admin,
    Path(id): Path<String>,
    payload: Result<Json<UpdateBlogPost>, JsonRejection>,
) -> Result<Json<MutationResponse>, AppError> {
    let id = parse_id(&id)?;
    let input = json_body(payload)?;

    let mut v = Validator::new();
    validate_post(&mut v, &input.title);
    if !v.valid() {
        return Err(AppError::FailedValidation(v.into_errors()));
    }

    let rows_affected = state.models().posts.update(id, &input).await?;

    Ok(Json(MutationResponse {
        message: "blog post updated".to_string(),
        id,
        rows_affected,
    }))
}

/// DELETE /api/post/{id} (auth required)
pub async fn delete_post(
    State(state): State<AppState>,
    _admin: Admin,
    Path(id): Path<String>,
) -> Result<Json<MutationResponse>, AppError> {
    let id = parse_id(&id)?;
    let rows_affected = state.models().posts.delete(id).await?;

    Ok(Json(MutationResponse {
        message: "blog post deleted".to_string(),
        id,
        rows_affected,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_title_is_rejected() {
        let mut v = Validator::new();
        validate_post(&mut v, "   ");
        assert_eq!(v.errors["title"], "must be provided");
    }

    #[test]
    fn test_long_title_is_rejected() {
        let mut v = Validator::new();
        validate_post(&mut v, &"x".repeat(MAX_TITLE_LEN + 1));
        assert!(!v.valid());

        let mut v = Validator::new();
        validate_post(&mut v, &"x".repeat(MAX_TITLE_LEN));
        assert!(v.valid());
    }
}
