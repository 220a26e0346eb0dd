//! Catalog product types.

use serde::{Deserialize, Serialize};

use super::id::ProductId;
use super::price::{CurrencyCode, Price};

/// A product in the pharmacy catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub brand: String,
    pub category: String,
    pub price: Price,
    /// Primary listing image.
    pub image_url: String,
    /// Whether a prescription must be uploaded before purchase.
    pub requires_prescription: bool,
    pub description: String,
    /// Gallery images for the detail page. Falls back to `image_url` when empty.
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub details: Option<ProductDetails>,
}

impl Product {
    /// Gallery images, never empty.
    #[must_use]
    pub fn gallery(&self) -> Vec<String> {
        if self.images.is_empty() {
            vec![self.image_url.clone()]
        } else {
            self.images.clone()
        }
    }
}

/// Medication information shown in the detail accordion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductDetails {
    pub dosage: String,
    pub side_effects: String,
    pub storage: String,
}

/// Delivery option chosen at checkout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ShippingMethod {
    #[default]
    Standard,
    Express,
}

impl ShippingMethod {
    pub const ALL: [Self; 2] = [Self::Standard, Self::Express];

    /// Form value.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Standard => "standard",
            Self::Express => "express",
        }
    }

    /// Flat per-order shipping cost.
    #[must_use]
    pub fn cost(self) -> Price {
        match self {
            Self::Standard => Price::from_cents(500, CurrencyCode::USD),
            Self::Express => Price::from_cents(1500, CurrencyCode::USD),
        }
    }

    /// Label shown next to the radio button.
    #[must_use]
    pub fn label(self) -> String {
        match self {
            Self::Standard => format!("Standard Shipping (5-7 days) - {}", self.cost()),
            Self::Express => format!("Express Shipping (1-2 days) - {}", self.cost()),
        }
    }
}

impl std::str::FromStr for ShippingMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "standard" => Ok(Self::Standard),
            "express" => Ok(Self::Express),
            _ => Err(format!("invalid shipping method: {s}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shipping_costs() {
        assert_eq!(ShippingMethod::Standard.cost().display(), "$5.00");
        assert_eq!(ShippingMethod::Express.cost().display(), "$15.00");
        assert_eq!(
            ShippingMethod::Express.label(),
            "Express Shipping (1-2 days) - $15.00"
        );
    }

    #[test]
    fn test_gallery_falls_back_to_listing_image() {
        let product = Product {
            id: ProductId::new("p1"),
            name: "Aspirin".to_string(),
            brand: "HealthPlus".to_string(),
            category: "Pain Relief".to_string(),
            price: Price::from_cents(649, CurrencyCode::USD),
            image_url: "https://example.test/aspirin.png".to_string(),
            requires_prescription: false,
            description: String::new(),
            images: Vec::new(),
            details: None,
        };
        assert_eq!(product.gallery(), vec![product.image_url.clone()]);
    }
}
