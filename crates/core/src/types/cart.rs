//! Shopping cart.

use serde::{Deserialize, Serialize};

use super::id::{PrescriptionRef, ProductId};
use super::price::{CurrencyCode, Price};
use super::product::{Product, ShippingMethod};

/// A line in the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    pub product_id: ProductId,
    pub name: String,
    pub quantity: u32,
    pub unit_price: Price,
    pub requires_prescription: bool,
    /// Reference to the uploaded prescription, if one was attached.
    #[serde(default)]
    pub prescription: Option<PrescriptionRef>,
}

impl CartItem {
    /// `quantity × unit_price`.
    #[must_use]
    pub fn line_total(&self) -> Price {
        self.unit_price.times(self.quantity)
    }
}

/// Cart contents for one shopper.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Cart {
    items: Vec<CartItem>,
}

impl Cart {
    /// Build a cart from existing lines. Lines with zero quantity are dropped.
    #[must_use]
    pub fn from_items(items: Vec<CartItem>) -> Self {
        Self {
            items: items.into_iter().filter(|i| i.quantity > 0).collect(),
        }
    }

    /// Add one unit of `product`.
    ///
    /// Merges into an existing line for the same product. A newly supplied
    /// prescription replaces the one already on the line.
    pub fn add_item(&mut self, product: &Product, prescription: Option<PrescriptionRef>) -> &CartItem {
        let index = self
            .items
            .iter()
            .position(|i| i.product_id == product.id)
            .unwrap_or_else(|| {
                self.items.push(CartItem {
                    product_id: product.id.clone(),
                    name: product.name.clone(),
                    quantity: 0,
                    unit_price: product.price,
                    requires_prescription: product.requires_prescription,
                    prescription: None,
                });
                self.items.len() - 1
            });

        #[allow(clippy::indexing_slicing)] // index was just found or pushed
        let line = &mut self.items[index];
        line.quantity = line.quantity.saturating_add(1);
        if prescription.is_some() {
            line.prescription = prescription;
        }
        line
    }

    /// Lines in insertion order.
    #[must_use]
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    /// Total number of units.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.items.iter().map(|i| i.quantity).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Currency of the cart, taken from its first line.
    #[must_use]
    pub fn currency(&self) -> CurrencyCode {
        self.items
            .first()
            .map_or_else(CurrencyCode::default, |i| i.unit_price.currency_code)
    }

    /// Σ(quantity × unit price).
    #[must_use]
    pub fn subtotal(&self) -> Price {
        self.items
            .iter()
            .fold(Price::zero(self.currency()), |acc, item| {
                acc.plus(item.line_total())
            })
    }

    /// Subtotal plus the flat shipping cost.
    #[must_use]
    pub fn total(&self, shipping: ShippingMethod) -> Price {
        self.subtotal().plus(shipping.cost())
    }

    /// Whether any line needs a verified prescription.
    #[must_use]
    pub fn requires_prescription(&self) -> bool {
        self.items.iter().any(|i| i.requires_prescription)
    }

    /// Lines that need a prescription but have none attached.
    pub fn missing_prescriptions(&self) -> impl Iterator<Item = &CartItem> {
        self.items
            .iter()
            .filter(|i| i.requires_prescription && i.prescription.is_none())
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    fn product(id: &str, cents: i64, rx: bool) -> Product {
        Product {
            id: ProductId::new(id),
            name: format!("Product {id}"),
            brand: "GenericMed".to_string(),
            category: "Test".to_string(),
            price: Price::from_cents(cents, CurrencyCode::USD),
            image_url: String::new(),
            requires_prescription: rx,
            description: String::new(),
            images: Vec::new(),
            details: None,
        }
    }

    #[test]
    fn test_totals_match_placeholder_checkout() {
        let mut cart = Cart::default();
        cart.add_item(&product("prod-001", 2550, true), None);
        cart.add_item(&product("prod-002", 1200, false), None);
        cart.add_item(&product("prod-002", 1200, false), None);

        assert_eq!(cart.item_count(), 3);
        assert_eq!(cart.subtotal().display(), "$49.50");
        assert_eq!(cart.total(ShippingMethod::Standard).display(), "$54.50");
        assert_eq!(cart.total(ShippingMethod::Express).display(), "$64.50");
    }

    #[test]
    fn test_add_item_merges_and_attaches_prescription() {
        let mut cart = Cart::default();
        let rx = product("prod_12345", 2599, true);
        cart.add_item(&rx, None);
        assert_eq!(cart.missing_prescriptions().count(), 1);

        let line = cart.add_item(&rx, Some(PrescriptionRef::new("rx-1")));
        assert_eq!(line.quantity, 2);
        assert_eq!(line.prescription.as_ref().unwrap().as_str(), "rx-1");
        assert_eq!(cart.items().len(), 1);
        assert_eq!(cart.missing_prescriptions().count(), 0);

        // A later add without a file keeps the attached prescription.
        cart.add_item(&rx, None);
        assert!(cart.items()[0].prescription.is_some());
    }

    #[test]
    fn test_empty_cart() {
        let mut cart = Cart::from_items(vec![CartItem {
            product_id: ProductId::new("x"),
            name: "x".to_string(),
            quantity: 0,
            unit_price: Price::from_cents(100, CurrencyCode::USD),
            requires_prescription: false,
            prescription: None,
        }]);
        assert!(cart.is_empty());
        assert_eq!(cart.subtotal().display(), "$0.00");

        cart.add_item(&product("a", 100, false), None);
        cart.clear();
        assert!(cart.is_empty());
        assert!(!cart.requires_prescription());
    }
}
