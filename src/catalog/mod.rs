//! In-memory vendor and product catalog.
//!
//! Rows come either from a JSON export (`{"vendors": [...], "products": [...]}`)
//! or from the bundled demo dataset.

mod builtin;
pub mod types;

pub use types::{Address, BusinessHours, DayHours, Product, Vendor};

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::{Result, VendorlyError};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Catalog {
    #[serde(default)]
    pub vendors: Vec<Vendor>,
    #[serde(default)]
    pub products: Vec<Product>,
}

impl Catalog {
    pub fn new(vendors: Vec<Vendor>, products: Vec<Product>) -> Self {
        Self { vendors, products }
    }

    /// The bundled Mumbai demo catalog.
    pub fn builtin() -> Self {
        Self::new(builtin::vendors(), builtin::products())
    }

    /// Read a JSON catalog export.
    pub fn load_from(path: &Path) -> Result<Self> {
        let data = fs::read_to_string(path)?;
        let catalog: Catalog = serde_json::from_str(&data)?;
        tracing::debug!(
            path = %path.display(),
            vendors = catalog.vendors.len(),
            products = catalog.products.len(),
            "loaded catalog"
        );
        Ok(catalog)
    }

    /// Catalog file if one is configured, otherwise the demo data.
    pub fn load_or_builtin(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(p) => Self::load_from(p),
            None => Ok(Self::builtin()),
        }
    }

    pub fn vendor(&self, id: &str) -> Option<&Vendor> {
        self.vendors.iter().find(|v| v.id == id)
    }

    pub fn require_vendor(&self, id: &str) -> Result<&Vendor> {
        self.vendor(id).ok_or_else(|| VendorlyError::UnknownVendor(id.to_string()))
    }

    pub fn product(&self, id: &str) -> Option<&Product> {
        self.products.iter().find(|p| p.id == id)
    }

    pub fn require_product(&self, id: &str) -> Result<&Product> {
        self.product(id).ok_or_else(|| VendorlyError::UnknownProduct(id.to_string()))
    }

    /// Active products listed by one vendor.
    pub fn products_of<'a>(&'a self, vendor_id: &'a str) -> impl Iterator<Item = &'a Product> + 'a {
        self.products
            .iter()
            .filter(move |p| p.is_active && p.vendor_id == vendor_id)
    }

    /// Active products whose name contains `query`, case-insensitively.
    pub fn search_products(&self, query: &str) -> Vec<&Product> {
        let q = query.trim().to_lowercase();
        self.products
            .iter()
            .filter(|p| p.is_active && p.name.to_lowercase().contains(&q))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_builtin_catalog_consistent() {
        let catalog = Catalog::builtin();
        assert!(!catalog.vendors.is_empty());
        for p in &catalog.products {
            assert!(catalog.vendor(&p.vendor_id).is_some(), "orphan product {}", p.id);
        }
    }

    #[test]
    fn test_products_of_skips_inactive() {
        let catalog = Catalog::builtin();
        let ids: Vec<&str> = catalog.products_of("v3").map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["p9", "p10"]);
    }

    #[test]
    fn test_search_products() {
        let catalog = Catalog::builtin();
        let found = catalog.search_products("APPLE");
        assert_eq!(found.len(), 4);
        assert!(catalog.search_products("tomato").iter().all(|p| p.is_active));
    }

    #[test]
    fn test_require_unknown() {
        let catalog = Catalog::builtin();
        assert!(matches!(
            catalog.require_vendor("nope"),
            Err(VendorlyError::UnknownVendor(_))
        ));
        assert!(catalog.require_product("p1").is_ok());
    }

    #[test]
    fn test_load_roundtrip_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("catalog.json");
        let catalog = Catalog::builtin();
        fs::write(&path, serde_json::to_string(&catalog).unwrap()).unwrap();

        let loaded = Catalog::load_from(&path).unwrap();
        assert_eq!(loaded.vendors.len(), catalog.vendors.len());
        assert_eq!(loaded.products.len(), catalog.products.len());
    }

    #[test]
    fn test_load_missing_file() {
        let dir = TempDir::new().unwrap();
        let err = Catalog::load_from(&dir.path().join("missing.json")).unwrap_err();
        assert!(matches!(err, VendorlyError::Io(_)));
    }
}
