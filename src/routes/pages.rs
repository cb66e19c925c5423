/**
 * Page Routes
 * Server rendered HTML pages of the blog
 */
use axum::{
    extract::{Path, State},
    response::{Html, Redirect},
};
use tera::Context;

use crate::db::filters::{Filters, DEFAULT_ORDER_BY, MAX_PAGE_SIZE};
use crate::db::list::Listable;
use crate::db::models::BlogPost;
use crate::error::{AppError, PageError};
use crate::routes::parse_id;
use crate::state::AppState;

/// Posts shown on the front page.
const HOME_POSTS: i64 = 3;

/// User whose profile is the about page.
const AUTHOR_ID: i64 = 1;

fn page_context(state: &AppState) -> Context {
    let site = &state.config().site;
    let mut context = Context::new();
    context.insert("site_title", &site.title);
    context.insert("site_description", &site.description);
    context
}

fn render(state: &AppState, name: &str, context: &Context) -> Result<Html<String>, PageError> {
    Ok(Html(state.templates().render(name, context)?))
}

/// GET /
pub async fn home(State(state): State<AppState>) -> Result<Html<String>, PageError> {
    let posts = state.models().posts.latest(HOME_POSTS).await?;

    let mut context = page_context(&state);
    context.insert("posts", &posts);
    render(&state, "home.html", &context)
}

/// GET /post - every post, newest first
pub async fn posts(State(state): State<AppState>) -> Result<Html<String>, PageError> {
    let filters = Filters {
        page: 1,
        page_size: MAX_PAGE_SIZE,
        order_by: vec![DEFAULT_ORDER_BY.to_string()],
        order_by_safe_list: BlogPost::ORDER_BY_SAFE_LIST,
        ..Filters::default()
    };
    let (posts, _) = state.models().posts.list(&filters).await?;

    let mut context = page_context(&state);
    context.insert("posts", &posts);
    render(&state, "posts.html", &context)
}

/// GET /post/{id}
pub async fn read_post(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Html<String>, PageError> {
    let id = parse_id(&id)?;
    let post = state.models().posts.get(id).await?;

    let mut context = page_context(&state);
    context.insert("post", &post);
    render(&state, "read.html", &context)
}

/// GET /about - the author's profile and social links
pub async fn about(State(state): State<AppState>) -> Result<Html<String>, PageError> {
    let user = state.models().users.get(AUTHOR_ID).await?;
    let socials = state.models().socials.by_user(user.id).await?;

    let mut context = page_context(&state);
    context.insert("user", &user);
    context.insert("socials", &socials);
    render(&state, "about.html", &context)
}

/// GET /latest - permanent redirect to the newest post
pub async fn latest(State(state): State<AppState>) -> Result<Redirect, PageError> {
    let posts = state.models().posts.latest(1).await?;
    let post = posts.first().ok_or(AppError::NotFound)?;

    let target = format!("/post/{}", post.id);
    tracing::info!(url = %target, "redirecting to latest post");
    Ok(Redirect::permanent(&target))
}
