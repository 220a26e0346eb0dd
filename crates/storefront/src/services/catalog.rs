//! Product catalog and account data provider.
//!
//! Pages never reach for hard-coded data directly; they ask a [`Catalog`].
//! [`PlaceholderCatalog`] serves the built-in demo data and is the only
//! implementation for now.

use std::cmp::Ordering;

use chrono::NaiveDate;
use serde::Deserialize;

use medicart_core::{
    Cart, CartItem, CurrencyCode, OrderId, OrderStatus, Price, Product, ProductDetails, ProductId,
};

use crate::models::{OrderSummary, SavedAddress, UserProfile};

/// Products shown per listing page.
pub const PAGE_SIZE: usize = 9;

/// Listing sort order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
pub enum SortOrder {
    #[default]
    #[serde(rename = "relevance")]
    Relevance,
    #[serde(rename = "price-asc")]
    PriceAsc,
    #[serde(rename = "price-desc")]
    PriceDesc,
    #[serde(rename = "name-asc")]
    NameAsc,
}

impl SortOrder {
    pub const ALL: [Self; 4] = [Self::Relevance, Self::PriceAsc, Self::PriceDesc, Self::NameAsc];

    /// Query-string value.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Relevance => "relevance",
            Self::PriceAsc => "price-asc",
            Self::PriceDesc => "price-desc",
            Self::NameAsc => "name-asc",
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Relevance => "Relevance",
            Self::PriceAsc => "Price: Low to High",
            Self::PriceDesc => "Price: High to Low",
            Self::NameAsc => "Name: A-Z",
        }
    }

    fn compare(self, a: &Product, b: &Product) -> Ordering {
        match self {
            Self::Relevance => Ordering::Equal,
            Self::PriceAsc => a.price.amount.cmp(&b.price.amount),
            Self::PriceDesc => b.price.amount.cmp(&a.price.amount),
            Self::NameAsc => a.name.to_lowercase().cmp(&b.name.to_lowercase()),
        }
    }
}

/// Listing filter, sort and page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductFilter {
    /// Brands to include; empty means all.
    pub brands: Vec<String>,
    /// Only products that need a prescription.
    pub prescription_only: bool,
    pub sort: SortOrder,
    /// 1-based page number.
    pub page: usize,
}

impl ProductFilter {
    fn matches(&self, product: &Product) -> bool {
        (self.brands.is_empty() || self.brands.iter().any(|b| *b == product.brand))
            && (!self.prescription_only || product.requires_prescription)
    }
}

/// One page of listing results.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductPage {
    pub products: Vec<Product>,
    /// Matches across all pages.
    pub total: usize,
    pub page: usize,
    pub total_pages: usize,
}

/// Source of products, order history and profile data.
#[async_trait::async_trait]
pub trait Catalog: Send + Sync {
    /// Filtered, sorted, paginated listing.
    async fn list_products(&self, filter: &ProductFilter) -> ProductPage;

    async fn get_product(&self, id: &ProductId) -> Option<Product>;

    /// Product shown at `/product-detail` when no ID is given.
    async fn featured_product(&self) -> Product;

    /// Up to `limit` other products, same brand first.
    async fn related_products(&self, id: &ProductId, limit: usize) -> Vec<Product>;

    /// Brands offered as listing filters, sorted.
    async fn brands(&self) -> Vec<String>;

    /// Past orders, newest first.
    async fn order_history(&self) -> Vec<OrderSummary>;

    /// The shopper's most recent order before this session.
    async fn latest_order(&self) -> OrderSummary;

    async fn user_profile(&self) -> UserProfile;

    /// Cart a new session starts with.
    async fn seed_cart(&self) -> Cart;
}

/// Built-in demo catalog.
#[derive(Debug, Clone)]
pub struct PlaceholderCatalog {
    listing: Vec<Product>,
    featured: Product,
}

impl Default for PlaceholderCatalog {
    fn default() -> Self {
        Self::new()
    }
}

impl PlaceholderCatalog {
    #[must_use]
    pub fn new() -> Self {
        Self {
            listing: listing_products(),
            featured: featured_product(),
        }
    }

    fn all(&self) -> impl Iterator<Item = &Product> {
        std::iter::once(&self.featured).chain(self.listing.iter())
    }
}

#[async_trait::async_trait]
impl Catalog for PlaceholderCatalog {
    async fn list_products(&self, filter: &ProductFilter) -> ProductPage {
        let mut matches: Vec<&Product> = self.listing.iter().filter(|p| filter.matches(p)).collect();
        // Stable sort keeps catalog order for ties and for relevance.
        matches.sort_by(|a, b| filter.sort.compare(a, b));

        let total = matches.len();
        let total_pages = total.div_ceil(PAGE_SIZE).max(1);
        let page = filter.page.clamp(1, total_pages);
        let products = matches
            .into_iter()
            .skip((page - 1) * PAGE_SIZE)
            .take(PAGE_SIZE)
            .cloned()
            .collect();

        ProductPage {
            products,
            total,
            page,
            total_pages,
        }
    }

    async fn get_product(&self, id: &ProductId) -> Option<Product> {
        self.all().find(|p| p.id == *id).cloned()
    }

    async fn featured_product(&self) -> Product {
        self.featured.clone()
    }

    async fn related_products(&self, id: &ProductId, limit: usize) -> Vec<Product> {
        let brand = self.all().find(|p| p.id == *id).map(|p| p.brand.clone());
        let mut others: Vec<&Product> = self.listing.iter().filter(|p| p.id != *id).collect();
        others.sort_by_key(|p| Some(&p.brand) != brand.as_ref());
        others.into_iter().take(limit).cloned().collect()
    }

    async fn brands(&self) -> Vec<String> {
        let mut brands: Vec<String> = self.listing.iter().map(|p| p.brand.clone()).collect();
        brands.sort();
        brands.dedup();
        brands
    }

    async fn order_history(&self) -> Vec<OrderSummary> {
        vec![
            order("ORD456", (2024, 9, 15), 7500, OrderStatus::Delivered),
            order("ORD123", (2024, 8, 20), 11230, OrderStatus::Delivered),
            order("ORD007", (2024, 7, 1), 2599, OrderStatus::Cancelled),
        ]
    }

    async fn latest_order(&self) -> OrderSummary {
        order("ORD789", (2024, 10, 27), 3250, OrderStatus::PendingVerification)
    }

    async fn user_profile(&self) -> UserProfile {
        UserProfile {
            name: "Alex Doe".to_string(),
            email: "alex.doe@example.com".to_string(),
            member_since: "August 2023".to_string(),
            address: SavedAddress {
                line1: "123 Pharmacy Lane".to_string(),
                line2: String::new(),
                city: "Healthville".to_string(),
                postcode: "M3D 1C1".to_string(),
            },
        }
    }

    async fn seed_cart(&self) -> Cart {
        Cart::from_items(vec![
            CartItem {
                product_id: ProductId::new("prod-001"),
                name: "Atorvastatin 20mg".to_string(),
                quantity: 1,
                unit_price: usd(2550),
                requires_prescription: true,
                prescription: None,
            },
            CartItem {
                product_id: ProductId::new("prod-002"),
                name: "OTC Vitamin D3".to_string(),
                quantity: 2,
                unit_price: usd(1200),
                requires_prescription: false,
                prescription: None,
            },
        ])
    }
}

// =============================================================================
// Placeholder data
// =============================================================================

fn usd(cents: i64) -> Price {
    Price::from_cents(cents, CurrencyCode::USD)
}

fn order(id: &str, (y, m, d): (i32, u32, u32), pence: i64, status: OrderStatus) -> OrderSummary {
    OrderSummary {
        id: OrderId::new(id),
        placed_on: NaiveDate::from_ymd_opt(y, m, d).unwrap_or_default(),
        total: Price::from_cents(pence, CurrencyCode::GBP),
        status,
    }
}

fn listed(id: &str, name: &str, cents: i64, brand: &str, rx: bool, category: &str, image: &str) -> Product {
    let shade = if rx { "D6EAF8" } else { "EBF5FF" };
    Product {
        id: ProductId::new(id),
        name: name.to_string(),
        brand: brand.to_string(),
        category: category.to_string(),
        price: usd(cents),
        image_url: format!("https://placehold.co/400x300/{shade}/7A7A7A?text={image}"),
        requires_prescription: rx,
        description: String::new(),
        images: Vec::new(),
        details: None,
    }
}

fn listing_products() -> Vec<Product> {
    vec![
        listed("1", "Ibuprofen 200mg (100 Tablets)", 899, "HealthPlus", false, "Pain Relief", "Ibuprofen"),
        listed("2", "Amoxicillin 500mg Capsules", 1550, "PharmaCo", true, "Antibiotics", "Amoxicillin"),
        listed("3", "Vitamin C 1000mg Effervescent", 1200, "GenericMed", false, "Vitamins", "Vitamin+C"),
        listed("4", "Lisinopril 10mg (30 Tablets)", 2275, "HealthPlus", true, "Heart Health", "Lisinopril"),
        listed("5", "Allergy Relief Antihistamine", 925, "GenericMed", false, "Allergy", "Allergy+Relief"),
        listed("6", "Metformin 850mg", 1890, "PharmaCo", true, "Diabetes", "Metformin"),
        listed("7", "Aspirin Low Dose 81mg", 649, "HealthPlus", false, "Pain Relief", "Aspirin"),
        listed("8", "Atorvastatin 20mg (Statins)", 3500, "GenericMed", true, "Heart Health", "Atorvastatin"),
        listed("9", "Calcium + Vitamin D Tablets", 1499, "HealthPlus", false, "Vitamins", "Calcium"),
    ]
}

fn featured_product() -> Product {
    let image = |text: &str| format!("https://placehold.co/600x600/E2E8F0/4A5568?text={text}");
    Product {
        id: ProductId::new("prod_12345"),
        name: "Amoxicillin 500mg Capsules".to_string(),
        brand: "PharmaCo".to_string(),
        category: "Antibiotics".to_string(),
        price: usd(2599),
        image_url: image("Medication+View+1"),
        requires_prescription: true,
        description: "A broad-spectrum antibiotic used to treat a wide variety of bacterial \
                      infections. This medication is a penicillin-type antibiotic."
            .to_string(),
        images: vec![
            image("Medication+View+1"),
            image("Packaging"),
            image("Pill+Close-Up"),
        ],
        details: Some(ProductDetails {
            dosage: "Take one capsule every 8 hours, or as directed by your doctor. Complete \
                     the full course of treatment even if you feel better."
                .to_string(),
            side_effects: "Common side effects may include nausea, vomiting, or diarrhea. \
                           Contact your doctor if you experience severe side effects like skin \
                           rash, itching, or swelling."
                .to_string(),
            storage: "Store at room temperature away from moisture and heat. Keep out of reach \
                      of children and pets."
                .to_string(),
        }),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    fn names(page: &ProductPage) -> Vec<&str> {
        page.products.iter().map(|p| p.name.as_str()).collect()
    }

    #[tokio::test]
    async fn test_unfiltered_listing_is_one_full_page() {
        let catalog = PlaceholderCatalog::new();
        let page = catalog.list_products(&ProductFilter::default()).await;
        assert_eq!(page.total, 9);
        assert_eq!(page.total_pages, 1);
        assert_eq!(page.page, 1);
        assert_eq!(page.products[0].name, "Ibuprofen 200mg (100 Tablets)");
    }

    #[tokio::test]
    async fn test_brand_and_prescription_filters() {
        let catalog = PlaceholderCatalog::new();
        let filter = ProductFilter {
            brands: vec!["HealthPlus".to_string()],
            prescription_only: true,
            ..ProductFilter::default()
        };
        let page = catalog.list_products(&filter).await;
        assert_eq!(names(&page), vec!["Lisinopril 10mg (30 Tablets)"]);
    }

    #[tokio::test]
    async fn test_sort_by_price() {
        let catalog = PlaceholderCatalog::new();
        let filter = ProductFilter {
            sort: SortOrder::PriceAsc,
            ..ProductFilter::default()
        };
        let page = catalog.list_products(&filter).await;
        assert_eq!(page.products.first().unwrap().price.display(), "$6.49");
        assert_eq!(page.products.last().unwrap().price.display(), "$35.00");

        let filter = ProductFilter {
            sort: SortOrder::PriceDesc,
            ..ProductFilter::default()
        };
        let page = catalog.list_products(&filter).await;
        assert_eq!(page.products[0].name, "Atorvastatin 20mg (Statins)");
    }

    #[tokio::test]
    async fn test_page_is_clamped() {
        let catalog = PlaceholderCatalog::new();
        let filter = ProductFilter {
            page: 7,
            ..ProductFilter::default()
        };
        assert_eq!(catalog.list_products(&filter).await.page, 1);
    }

    #[tokio::test]
    async fn test_featured_product_is_findable() {
        let catalog = PlaceholderCatalog::new();
        let featured = catalog.featured_product().await;
        assert_eq!(featured.price.display(), "$25.99");
        assert_eq!(featured.gallery().len(), 3);
        assert_eq!(catalog.get_product(&featured.id).await, Some(featured));
        assert!(catalog.get_product(&ProductId::new("nope")).await.is_none());
    }

    #[tokio::test]
    async fn test_related_products_prefer_same_brand() {
        let catalog = PlaceholderCatalog::new();
        let related = catalog.related_products(&ProductId::new("prod_12345"), 4).await;
        assert_eq!(related.len(), 4);
        assert_eq!(related[0].brand, "PharmaCo");
        assert_eq!(related[1].brand, "PharmaCo");
        assert!(related.iter().all(|p| p.id.as_str() != "prod_12345"));
    }

    #[tokio::test]
    async fn test_brands_are_sorted_and_unique() {
        let catalog = PlaceholderCatalog::new();
        assert_eq!(
            catalog.brands().await,
            vec!["GenericMed", "HealthPlus", "PharmaCo"]
        );
    }

    #[tokio::test]
    async fn test_seed_cart_totals() {
        let cart = PlaceholderCatalog::new().seed_cart().await;
        assert_eq!(cart.subtotal().display(), "$49.50");
        assert!(cart.requires_prescription());
    }

    #[tokio::test]
    async fn test_order_history_uses_pounds() {
        let history = PlaceholderCatalog::new().order_history().await;
        assert_eq!(history.len(), 3);
        assert_eq!(history[1].total.display(), "£112.30");
        assert_eq!(history[2].status, OrderStatus::Cancelled);
    }
}
