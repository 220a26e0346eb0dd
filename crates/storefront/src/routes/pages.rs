//! Informational page route handlers.
//!
//! Serves the markdown pages linked from the footer.

use askama::Template;
use askama_web::WebTemplate;
use axum::{Router, extract::State, routing::get};
use chrono::NaiveDate;
use tracing::instrument;

use crate::error::{AppError, Result};
use crate::filters;
use crate::state::AppState;

/// Slugs served at `/{slug}`.
pub const PAGES: [&str; 6] = [
    "about",
    "contact",
    "careers",
    "terms-of-service",
    "privacy-policy",
    "disclaimer",
];

/// Content page template.
#[derive(Template, WebTemplate)]
#[template(path = "pages/content.html")]
pub struct ContentPageTemplate {
    pub title: String,
    pub description: String,
    pub updated_at: Option<NaiveDate>,
    pub content_html: String,
}

/// Serve a content page by slug.
///
/// # Errors
///
/// Returns 404 if the page wasn't loaded.
#[instrument(skip(state))]
pub fn serve_content_page(state: &AppState, slug: &str) -> Result<ContentPageTemplate> {
    let page = state
        .content()
        .get_page(slug)
        .ok_or_else(|| AppError::NotFound(format!("page {slug}")))?;

    Ok(ContentPageTemplate {
        title: page.meta.title.clone(),
        description: page.meta.description.clone().unwrap_or_default(),
        updated_at: page.meta.updated_at,
        content_html: page.content_html.clone(),
    })
}

/// Create the pages routes router.
pub fn router() -> Router<AppState> {
    PAGES.into_iter().fold(Router::new(), |router, slug| {
        router.route(
            &format!("/{slug}"),
            get(move |State(state): State<AppState>| async move {
                serve_content_page(&state, slug)
            }),
        )
    })
}
