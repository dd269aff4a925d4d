//! Multi-vendor cart and its price quote.
//!
//! A cart can hold items from several vendors at once. Each vendor bills
//! its own delivery fee, waived once that vendor's share of the cart
//! reaches its minimum order. No tax or coupon rules are applied.

use serde::{Deserialize, Serialize};

use crate::catalog::{Catalog, Product};
use crate::error::{Result, VendorlyError};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartItem {
    pub product_id: String,
    pub vendor_id: String,
    pub quantity: u32,
    /// Price per unit captured when the item was added.
    pub unit_price: f64,
}

impl CartItem {
    pub fn line_total(&self) -> f64 {
        self.unit_price * self.quantity as f64
    }
}

/// A requested line, priced from the catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartLine {
    pub product_id: String,
    pub quantity: u32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Cart {
    items: Vec<CartItem>,
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a cart from requested lines, taking prices from `catalog`.
    pub fn from_lines(catalog: &Catalog, lines: &[CartLine]) -> Result<Self> {
        let mut cart = Self::new();
        for line in lines {
            let product = catalog.require_product(&line.product_id)?;
            cart.add(product, line.quantity)?;
        }
        Ok(cart)
    }

    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Add `quantity` units, merging with an existing line for the product.
    pub fn add(&mut self, product: &Product, quantity: u32) -> Result<()> {
        if quantity == 0 || !product.is_active {
            return Err(VendorlyError::InvalidQuantity {
                product_id: product.id.clone(),
                quantity,
            });
        }
        match self.items.iter_mut().find(|i| i.product_id == product.id) {
            Some(item) => {
                item.quantity = item.quantity.checked_add(quantity).ok_or_else(|| {
                    VendorlyError::InvalidQuantity {
                        product_id: product.id.clone(),
                        quantity,
                    }
                })?;
            }
            None => self.items.push(CartItem {
                product_id: product.id.clone(),
                vendor_id: product.vendor_id.clone(),
                quantity,
                unit_price: product.effective_price(),
            }),
        }
        Ok(())
    }

    /// Set a line's quantity; zero removes the line.
    pub fn update_quantity(&mut self, product_id: &str, quantity: u32) -> Result<()> {
        if quantity == 0 {
            return if self.remove(product_id) {
                Ok(())
            } else {
                Err(VendorlyError::UnknownProduct(product_id.to_string()))
            };
        }
        let item = self
            .items
            .iter_mut()
            .find(|i| i.product_id == product_id)
            .ok_or_else(|| VendorlyError::UnknownProduct(product_id.to_string()))?;
        item.quantity = quantity;
        Ok(())
    }

    pub fn remove(&mut self, product_id: &str) -> bool {
        let before = self.items.len();
        self.items.retain(|i| i.product_id != product_id);
        self.items.len() != before
    }

    pub fn subtotal(&self) -> f64 {
        self.items.iter().map(CartItem::line_total).sum()
    }

    /// Items grouped per vendor, vendors in the order first added.
    pub fn items_by_vendor(&self) -> Vec<(&str, Vec<&CartItem>)> {
        let mut groups: Vec<(&str, Vec<&CartItem>)> = Vec::new();
        for item in &self.items {
            match groups.iter_mut().find(|(v, _)| *v == item.vendor_id) {
                Some((_, list)) => list.push(item),
                None => groups.push((item.vendor_id.as_str(), vec![item])),
            }
        }
        groups
    }

    pub fn quote(&self, catalog: &Catalog) -> Result<CartQuote> {
        let mut vendors = Vec::new();
        for (vendor_id, items) in self.items_by_vendor() {
            let vendor = catalog.require_vendor(vendor_id)?;
            let subtotal: f64 = items.iter().map(|i| i.line_total()).sum();
            let threshold = vendor.minimum_order.filter(|m| *m > 0.0);
            let free = threshold.is_some_and(|m| subtotal >= m);
            vendors.push(VendorQuote {
                vendor_id: vendor.id.clone(),
                vendor_name: vendor.business_name.clone(),
                item_count: count_units(items.iter().copied())?,
                subtotal,
                delivery_fee: if free { 0.0 } else { vendor.delivery_fee },
                amount_for_free_delivery: threshold.map(|m| (m - subtotal).max(0.0)),
            });
        }

        let subtotal: f64 = vendors.iter().map(|v| v.subtotal).sum();
        let delivery_fee: f64 = vendors.iter().map(|v| v.delivery_fee).sum();
        tracing::debug!(vendors = vendors.len(), subtotal, delivery_fee, "quoted cart");

        Ok(CartQuote {
            item_count: count_units(self.items.iter())?,
            vendors,
            subtotal,
            delivery_fee,
            total: subtotal + delivery_fee,
        })
    }
}

/// Total units across `items`, rejecting a sum that overflows `u32`.
fn count_units<'a>(mut items: impl Iterator<Item = &'a CartItem>) -> Result<u32> {
    items.try_fold(0u32, |total, item| {
        total.checked_add(item.quantity).ok_or_else(|| VendorlyError::InvalidQuantity {
            product_id: item.product_id.clone(),
            quantity: item.quantity,
        })
    })
}

#[derive(Debug, Clone, Serialize)]
pub struct VendorQuote {
    pub vendor_id: String,
    pub vendor_name: String,
    pub item_count: u32,
    pub subtotal: f64,
    pub delivery_fee: f64,
    /// How much more to add for free delivery; 0 once reached, absent
    /// when the vendor never waives its fee.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount_for_free_delivery: Option<f64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CartQuote {
    pub vendors: Vec<VendorQuote>,
    pub item_count: u32,
    pub subtotal: f64,
    pub delivery_fee: f64,
    pub total: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(id: &str, quantity: u32) -> CartLine {
        CartLine { product_id: id.into(), quantity }
    }

    #[test]
    fn test_add_merges_lines() {
        let catalog = Catalog::builtin();
        let mut cart = Cart::new();
        cart.add(catalog.product("p1").unwrap(), 1).unwrap();
        cart.add(catalog.product("p1").unwrap(), 2).unwrap();
        assert_eq!(cart.items().len(), 1);
        assert_eq!(cart.items()[0].quantity, 3);
        assert_eq!(cart.subtotal(), 540.0);
    }

    #[test]
    fn test_add_rejects_zero_and_inactive() {
        let catalog = Catalog::builtin();
        let mut cart = Cart::new();
        assert!(cart.add(catalog.product("p1").unwrap(), 0).is_err());
        assert!(cart.add(catalog.product("p11").unwrap(), 1).is_err());
        assert!(cart.is_empty());
    }

    #[test]
    fn test_discount_price_captured() {
        let catalog = Catalog::builtin();
        let cart = Cart::from_lines(&catalog, &[line("p4", 2)]).unwrap();
        assert_eq!(cart.items()[0].unit_price, 62.0);
        assert_eq!(cart.subtotal(), 124.0);
    }

    #[test]
    fn test_update_and_remove() {
        let catalog = Catalog::builtin();
        let mut cart = Cart::from_lines(&catalog, &[line("p1", 1), line("p2", 1)]).unwrap();
        cart.update_quantity("p2", 4).unwrap();
        assert_eq!(cart.subtotal(), 180.0 + 240.0);
        cart.update_quantity("p1", 0).unwrap();
        assert_eq!(cart.items().len(), 1);
        assert!(cart.update_quantity("p1", 2).is_err());
        assert!(!cart.remove("p1"));
    }

    #[test]
    fn test_quote_waives_fee_above_minimum() {
        let catalog = Catalog::builtin();
        // Fresh Mart: 2 x 180 = 360 >= 200, free. Green Valley: 165 < 300, fee 25.
        let cart = Cart::from_lines(&catalog, &[line("p1", 2), line("p5", 1)]).unwrap();
        let quote = cart.quote(&catalog).unwrap();

        assert_eq!(quote.vendors.len(), 2);
        assert_eq!(quote.vendors[0].vendor_id, "v1");
        assert_eq!(quote.vendors[0].delivery_fee, 0.0);
        assert_eq!(quote.vendors[0].amount_for_free_delivery, Some(0.0));
        assert_eq!(quote.vendors[1].delivery_fee, 25.0);
        assert_eq!(quote.vendors[1].amount_for_free_delivery, Some(135.0));
        assert_eq!(quote.subtotal, 525.0);
        assert_eq!(quote.delivery_fee, 25.0);
        assert_eq!(quote.total, 550.0);
        assert_eq!(quote.item_count, 3);
    }

    #[test]
    fn test_quote_vendor_without_minimum() {
        let catalog = Catalog::builtin();
        let cart = Cart::from_lines(&catalog, &[line("p19", 1)]).unwrap();
        let quote = cart.quote(&catalog).unwrap();
        assert_eq!(quote.delivery_fee, 10.0);
        assert!(quote.vendors[0].amount_for_free_delivery.is_none());
    }

    #[test]
    fn test_quote_empty_cart() {
        let catalog = Catalog::builtin();
        let quote = Cart::new().quote(&catalog).unwrap();
        assert!(quote.vendors.is_empty());
        assert_eq!(quote.total, 0.0);
    }

    #[test]
    fn test_merge_overflow_is_rejected() {
        let catalog = Catalog::builtin();
        let err = Cart::from_lines(&catalog, &[line("p1", u32::MAX), line("p1", 1)]).unwrap_err();
        assert!(matches!(
            err,
            VendorlyError::InvalidQuantity { ref product_id, quantity: 1 } if product_id == "p1"
        ));

        let mut cart = Cart::new();
        cart.add(catalog.product("p1").unwrap(), u32::MAX).unwrap();
        assert!(cart.add(catalog.product("p1").unwrap(), 1).is_err());
        assert_eq!(cart.items()[0].quantity, u32::MAX);
    }

    #[test]
    fn test_quote_item_count_overflow_is_rejected() {
        let catalog = Catalog::builtin();
        // Same vendor, so both the vendor and cart totals overflow.
        let cart = Cart::from_lines(&catalog, &[line("p1", u32::MAX), line("p2", 1)]).unwrap();
        assert!(matches!(cart.quote(&catalog), Err(VendorlyError::InvalidQuantity { .. })));

        // Different vendors: only the cart-wide total overflows.
        let cart = Cart::from_lines(&catalog, &[line("p1", u32::MAX), line("p5", 1)]).unwrap();
        assert!(matches!(cart.quote(&catalog), Err(VendorlyError::InvalidQuantity { .. })));
    }

    #[test]
    fn test_from_lines_unknown_product() {
        let catalog = Catalog::builtin();
        let err = Cart::from_lines(&catalog, &[line("nope", 1)]).unwrap_err();
        assert!(matches!(err, VendorlyError::UnknownProduct(_)));
    }
}
