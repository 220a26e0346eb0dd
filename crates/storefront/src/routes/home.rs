//! Home page route handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::{extract::State, response::IntoResponse};
use tower_sessions::Session;
use tracing::instrument;

use medicart_core::Notice;

use crate::filters;
use crate::models::take_notice;
use crate::routes::products::{ProductCardView, ProductDetailView};
use crate::services::ProductFilter;
use crate::state::AppState;

/// Number of products in the home page grid.
const FEATURED_COUNT: usize = 3;

/// Home page template.
#[derive(Template, WebTemplate)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    pub notice: Option<Notice>,
    pub hero: ProductDetailView,
    pub featured: Vec<ProductCardView>,
}

/// Display the home page.
#[instrument(skip(state, session))]
pub async fn home(State(state): State<AppState>, session: Session) -> impl IntoResponse {
    let hero = state.catalog().featured_product().await;
    let listing = state
        .catalog()
        .list_products(&ProductFilter {
            page: 1,
            ..ProductFilter::default()
        })
        .await;

    HomeTemplate {
        notice: take_notice(&session).await,
        hero: ProductDetailView::from(&hero),
        featured: listing
            .products
            .iter()
            .take(FEATURED_COUNT)
            .map(ProductCardView::from)
            .collect(),
    }
}
