//! Product listing, product detail and prescription upload handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use medicart_core::{Notice, PrescriptionUpload, Product, ProductId, UploadedFile};

use crate::error::{AppError, Result, add_breadcrumb};
use crate::filters;
use crate::models::{set_notice, take_notice};
use crate::services::{ProductFilter, SortOrder, SubmitError, cart, submit_upload};
use crate::state::AppState;

/// Related products shown under the detail page.
const RELATED_LIMIT: usize = 4;

// =============================================================================
// View Types
// =============================================================================

/// Product card display data for templates.
#[derive(Clone)]
pub struct ProductCardView {
    pub id: String,
    pub name: String,
    pub price: String,
    pub image_url: String,
    pub requires_prescription: bool,
    pub detail_url: String,
}

impl From<&Product> for ProductCardView {
    fn from(product: &Product) -> Self {
        Self {
            id: product.id.to_string(),
            name: product.name.clone(),
            price: product.price.display(),
            image_url: product.image_url.clone(),
            requires_prescription: product.requires_prescription,
            detail_url: detail_url(&product.id),
        }
    }
}

/// Product detail display data for templates.
#[derive(Clone)]
pub struct ProductDetailView {
    pub id: String,
    pub name: String,
    pub price: String,
    pub description: String,
    pub images: Vec<String>,
    pub requires_prescription: bool,
    pub details: Option<medicart_core::ProductDetails>,
    pub detail_url: String,
    pub upload_url: String,
}

impl From<&Product> for ProductDetailView {
    fn from(product: &Product) -> Self {
        let detail_url = detail_url(&product.id);
        Self {
            id: product.id.to_string(),
            name: product.name.clone(),
            price: product.price.display(),
            description: product.description.clone(),
            images: product.gallery(),
            requires_prescription: product.requires_prescription,
            details: product.details.clone(),
            upload_url: format!("{detail_url}/prescription"),
            detail_url,
        }
    }
}

/// A brand checkbox in the listing sidebar.
#[derive(Clone)]
pub struct BrandOption {
    pub name: String,
    pub input_id: String,
    pub checked: bool,
}

/// An entry in the sort dropdown.
#[derive(Clone)]
pub struct SortOption {
    pub value: &'static str,
    pub label: &'static str,
    pub selected: bool,
}

/// A numbered pagination link.
#[derive(Clone)]
pub struct PageLink {
    pub number: usize,
    pub url: String,
    pub current: bool,
}

fn detail_url(id: &ProductId) -> String {
    format!("/product-detail/{}", urlencoding::encode(id.as_str()))
}

// =============================================================================
// Listing
// =============================================================================

/// Listing query, parsed from repeated `brand` keys plus `rx`, `sort`, `page`.
fn parse_filter(pairs: &[(String, String)]) -> ProductFilter {
    let mut filter = ProductFilter {
        page: 1,
        ..ProductFilter::default()
    };
    for (key, value) in pairs {
        match key.as_str() {
            "brand" if !value.is_empty() => filter.brands.push(value.clone()),
            "rx" => filter.prescription_only = matches!(value.as_str(), "1" | "on" | "true"),
            "sort" => {
                filter.sort = SortOrder::ALL
                    .into_iter()
                    .find(|s| s.as_str() == value)
                    .unwrap_or_default();
            }
            "page" => filter.page = value.parse().unwrap_or(1),
            _ => {}
        }
    }
    filter
}

/// Build a listing URL for `filter` at `page`.
fn listing_url(filter: &ProductFilter, page: usize) -> String {
    let mut params: Vec<String> = filter
        .brands
        .iter()
        .map(|b| format!("brand={}", urlencoding::encode(b)))
        .collect();
    if filter.prescription_only {
        params.push("rx=1".to_string());
    }
    if filter.sort != SortOrder::Relevance {
        params.push(format!("sort={}", filter.sort.as_str()));
    }
    if page > 1 {
        params.push(format!("page={page}"));
    }
    if params.is_empty() {
        "/product-listing".to_string()
    } else {
        format!("/product-listing?{}", params.join("&"))
    }
}

/// Product listing page template.
#[derive(Template, WebTemplate)]
#[template(path = "products/index.html")]
pub struct ProductsIndexTemplate {
    pub notice: Option<Notice>,
    pub products: Vec<ProductCardView>,
    pub brands: Vec<BrandOption>,
    pub prescription_only: bool,
    pub sorts: Vec<SortOption>,
    pub total: usize,
    pub pages: Vec<PageLink>,
    pub prev_url: Option<String>,
    pub next_url: Option<String>,
    pub current_url: String,
}

/// Display the product listing.
#[instrument(skip(state, session))]
pub async fn index(
    State(state): State<AppState>,
    session: Session,
    Query(pairs): Query<Vec<(String, String)>>,
) -> impl IntoResponse {
    let filter = parse_filter(&pairs);
    let result = state.catalog().list_products(&filter).await;
    let brands = state.catalog().brands().await;

    let pages = (1..=result.total_pages)
        .map(|number| PageLink {
            number,
            url: listing_url(&filter, number),
            current: number == result.page,
        })
        .collect();

    ProductsIndexTemplate {
        notice: take_notice(&session).await,
        products: result.products.iter().map(ProductCardView::from).collect(),
        brands: brands
            .into_iter()
            .map(|name| BrandOption {
                input_id: format!("brand-{}", name.to_lowercase()),
                checked: filter.brands.contains(&name),
                name,
            })
            .collect(),
        prescription_only: filter.prescription_only,
        sorts: SortOrder::ALL
            .into_iter()
            .map(|sort| SortOption {
                value: sort.as_str(),
                label: sort.label(),
                selected: sort == filter.sort,
            })
            .collect(),
        total: result.total,
        pages,
        prev_url: (result.page > 1).then(|| listing_url(&filter, result.page - 1)),
        next_url: (result.page < result.total_pages).then(|| listing_url(&filter, result.page + 1)),
        current_url: listing_url(&filter, result.page),
    }
}

// =============================================================================
// Detail
// =============================================================================

/// Detail page query.
#[derive(Debug, Default, Deserialize)]
pub struct DetailQuery {
    /// Open the upload dialog on load (no-script fallback).
    #[serde(default)]
    pub upload: Option<String>,
}

/// Product detail page template.
#[derive(Template, WebTemplate)]
#[template(path = "products/show.html")]
pub struct ProductShowTemplate {
    pub notice: Option<Notice>,
    pub product: ProductDetailView,
    pub related: Vec<ProductCardView>,
    pub dialog_open: bool,
    /// Rejection shown inside the upload dialog.
    pub upload_error: Option<Notice>,
}

async fn render_detail(
    state: &AppState,
    product: &Product,
    notice: Option<Notice>,
    dialog_open: bool,
    upload_error: Option<Notice>,
) -> ProductShowTemplate {
    let related = state
        .catalog()
        .related_products(&product.id, RELATED_LIMIT)
        .await;
    ProductShowTemplate {
        notice,
        product: ProductDetailView::from(product),
        related: related.iter().map(ProductCardView::from).collect(),
        dialog_open,
        upload_error,
    }
}

async fn find_product(state: &AppState, id: &ProductId) -> Result<Product> {
    state
        .catalog()
        .get_product(id)
        .await
        .ok_or_else(|| AppError::NotFound(format!("product {id}")))
}

/// Display the featured product.
#[instrument(skip(state, session))]
pub async fn featured(
    State(state): State<AppState>,
    session: Session,
    Query(query): Query<DetailQuery>,
) -> impl IntoResponse {
    let product = state.catalog().featured_product().await;
    let notice = take_notice(&session).await;
    render_detail(&state, &product, notice, query.upload.is_some(), None).await
}

/// Display a product by ID.
///
/// # Errors
///
/// Returns 404 if the product doesn't exist.
#[instrument(skip(state, session))]
pub async fn show(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<String>,
    Query(query): Query<DetailQuery>,
) -> Result<impl IntoResponse> {
    let product = find_product(&state, &ProductId::new(id)).await?;
    add_breadcrumb("navigation", "Viewed product", Some(&[("product_id", product.id.as_str())]));
    let notice = take_notice(&session).await;
    Ok(render_detail(&state, &product, notice, query.upload.is_some(), None).await)
}

// =============================================================================
// Prescription upload
// =============================================================================

/// What the upload form asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum UploadIntent {
    Submit,
    Cancel,
}

/// The parsed multipart upload form.
struct UploadForm {
    intent: UploadIntent,
    file: Option<(UploadedFile, Vec<u8>)>,
}

async fn read_upload_form(mut multipart: Multipart) -> Result<UploadForm> {
    let mut intent = UploadIntent::Submit;
    let mut file = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.body_text()))?
    {
        match field.name() {
            Some("intent") => {
                let value = field
                    .text()
                    .await
                    .map_err(|e| AppError::BadRequest(e.body_text()))?;
                if value == "cancel" {
                    intent = UploadIntent::Cancel;
                }
            }
            Some("prescription") => {
                let name = field.file_name().unwrap_or_default().to_string();
                let mime_type = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::BadRequest(e.body_text()))?;
                // An empty part with no filename is what browsers send for
                // "no file chosen".
                if !(name.is_empty() && bytes.is_empty()) {
                    let uploaded = UploadedFile::new(name, bytes.len() as u64, mime_type);
                    file = Some((uploaded, bytes.to_vec()));
                }
            }
            _ => {}
        }
    }

    Ok(UploadForm { intent, file })
}

/// Handle the prescription upload dialog.
///
/// Cancel closes the dialog. Submit validates the file, stores it, adds the
/// product to the cart with the prescription attached and redirects back to
/// the product with a success notice. Rejections re-render the page with the
/// dialog open.
///
/// # Errors
///
/// Returns 404 for unknown products, 400 for malformed multipart bodies and
/// 502 when prescription storage fails.
#[instrument(skip(state, session, multipart), fields(product_id = %id))]
pub async fn upload_prescription(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<String>,
    multipart: Multipart,
) -> Result<Response> {
    let product = find_product(&state, &ProductId::new(id)).await?;
    let form = read_upload_form(multipart).await?;
    let back = detail_url(&product.id);

    let mut upload = PrescriptionUpload::new(product.id.clone());

    if form.intent == UploadIntent::Cancel {
        upload.cancel().map_err(|e| AppError::BadRequest(e.to_string()))?;
        return Ok(Redirect::to(&back).into_response());
    }

    let contents = match form.file {
        Some((file, contents)) => {
            if let Err(e) = upload.select(file) {
                tracing::info!(error = %e, "Prescription file rejected");
                return Ok(rejected(&state, &product, e.notice()).await);
            }
            contents
        }
        None => Vec::new(),
    };

    let mut uploaded_name = None;
    let mut closed = false;
    let result = submit_upload(
        &mut upload,
        &contents,
        state.prescriptions(),
        |file, _product_id| uploaded_name = Some(file.name.clone()),
        Some(|| closed = true),
    )
    .await;

    let reference = match result {
        Ok(reference) => reference,
        Err(SubmitError::Upload(e)) => return Ok(rejected(&state, &product, e.notice()).await),
        Err(SubmitError::Store(e)) => return Err(e.into()),
    };

    cart::add_item(&session, state.catalog(), &product, Some(reference)).await?;
    set_notice(&session, &Notice::uploaded(&product.id)).await?;
    add_breadcrumb(
        "upload",
        "Prescription uploaded",
        Some(&[("product_id", product.id.as_str())]),
    );
    tracing::info!(file_name = ?uploaded_name, dialog_closed = closed, "Prescription upload complete");

    Ok(Redirect::to(&back).into_response())
}

async fn rejected(state: &AppState, product: &Product, notice: Notice) -> Response {
    let page = render_detail(state, product, None, true, Some(notice)).await;
    (StatusCode::UNPROCESSABLE_ENTITY, page).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(query: &[(&str, &str)]) -> Vec<(String, String)> {
        query
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    #[test]
    fn test_parse_filter() {
        let filter = parse_filter(&pairs(&[
            ("brand", "HealthPlus"),
            ("brand", "PharmaCo"),
            ("rx", "1"),
            ("sort", "price-desc"),
            ("page", "2"),
        ]));
        assert_eq!(filter.brands, vec!["HealthPlus", "PharmaCo"]);
        assert!(filter.prescription_only);
        assert_eq!(filter.sort, SortOrder::PriceDesc);
        assert_eq!(filter.page, 2);
    }

    #[test]
    fn test_parse_filter_ignores_junk() {
        let filter = parse_filter(&pairs(&[("sort", "cheapest"), ("page", "x"), ("brand", "")]));
        assert_eq!(filter, ProductFilter { page: 1, ..ProductFilter::default() });
    }

    #[test]
    fn test_listing_url_round_trips_filter() {
        let filter = parse_filter(&pairs(&[("brand", "Health Plus"), ("sort", "name-asc")]));
        assert_eq!(
            listing_url(&filter, 2),
            "/product-listing?brand=Health%20Plus&sort=name-asc&page=2"
        );
        assert_eq!(listing_url(&ProductFilter::default(), 1), "/product-listing");
    }
}
