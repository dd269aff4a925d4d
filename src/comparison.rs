//! Cross-vendor price comparison.
//!
//! Products are matched across vendors by name: lowercased and trimmed,
//! nothing fuzzier. A group is only worth showing when at least two
//! different vendors sell the item, so groups backed by a single vendor
//! are dropped even if that vendor lists the name twice.

use serde::Serialize;
use std::collections::{HashMap, HashSet};

use crate::catalog::{Catalog, Product, Vendor};
use crate::proximity::{quick_delivery_estimate, NearbyVendor, ProximitySearch};

/// Anything that can be grouped for comparison.
pub trait Listing {
    fn listing_name(&self) -> &str;
    fn listing_vendor(&self) -> &str;
}

impl Listing for Product {
    fn listing_name(&self) -> &str {
        &self.name
    }

    fn listing_vendor(&self) -> &str {
        &self.vendor_id
    }
}

/// Grouping key: case-insensitive, surrounding whitespace ignored.
pub fn comparison_key(name: &str) -> String {
    name.trim().to_lowercase()
}

#[derive(Debug, Clone, Serialize)]
pub struct ComparisonGroup<T> {
    /// Display name, taken from the first listing seen.
    pub product_name: String,
    pub members: Vec<T>,
}

impl<T: Listing> ComparisonGroup<T> {
    pub fn vendor_count(&self) -> usize {
        self.members
            .iter()
            .map(|m| m.listing_vendor())
            .collect::<HashSet<_>>()
            .len()
    }
}

/// Group listings by name, keeping groups sold by two or more vendors.
/// Groups appear in the order their first listing appears.
pub fn group_for_comparison<T: Listing + Clone>(items: &[T]) -> Vec<ComparisonGroup<T>> {
    let mut order: Vec<String> = Vec::new();
    let mut groups: HashMap<String, ComparisonGroup<T>> = HashMap::new();

    for item in items {
        let key = comparison_key(item.listing_name());
        groups
            .entry(key.clone())
            .or_insert_with(|| {
                order.push(key);
                ComparisonGroup {
                    product_name: item.listing_name().trim().to_string(),
                    members: Vec::new(),
                }
            })
            .members
            .push(item.clone());
    }

    order
        .into_iter()
        .filter_map(|k| groups.remove(&k))
        .filter(|g| g.vendor_count() >= 2)
        .collect()
}

// ─── Offers with vendor context ──────────────────────────────────

/// Vendor facts shown beside each offer.
#[derive(Debug, Clone, Serialize)]
pub struct VendorInfo {
    pub id: String,
    pub business_name: String,
    pub business_type: String,
    pub verified: bool,
    pub rating: f64,
    pub total_ratings: u32,
    pub delivery_radius: f64,
    pub delivery_fee: f64,
    pub minimum_order: f64,
    pub distance_km: f64,
    /// Storefront estimate, uncapped by the configured delivery range.
    pub estimated_delivery_minutes: u32,
}

impl VendorInfo {
    fn from_nearby(n: &NearbyVendor) -> Self {
        let v = &n.vendor;
        Self {
            id: v.id.clone(),
            business_name: v.business_name.clone(),
            business_type: v.business_type.clone(),
            verified: v.verified,
            rating: v.rating,
            total_ratings: v.total_ratings,
            delivery_radius: v.delivery_radius,
            delivery_fee: v.delivery_fee,
            minimum_order: v.minimum_order.unwrap_or(0.0),
            distance_km: n.distance_km,
            estimated_delivery_minutes: quick_delivery_estimate(n.distance_km),
        }
    }
}

/// A product together with the vendor selling it.
#[derive(Debug, Clone, Serialize)]
pub struct ProductOffer {
    #[serde(flatten)]
    pub product: Product,
    pub vendor_info: VendorInfo,
}

impl Listing for ProductOffer {
    fn listing_name(&self) -> &str {
        &self.product.name
    }

    fn listing_vendor(&self) -> &str {
        &self.product.vendor_id
    }
}

/// One row of a comparison table.
#[derive(Debug, Clone, Serialize)]
pub struct PriceComparisonItem {
    pub product_id: String,
    pub product_name: String,
    pub unit: String,
    pub vendor_id: String,
    pub vendor_name: String,
    pub rating: f64,
    pub distance_km: f64,
    pub estimated_delivery_minutes: u32,
    pub price: f64,
    pub delivery_fee: f64,
    /// Item price plus the vendor's delivery fee.
    pub total_price: f64,
    pub is_best_price: bool,
}

/// Summary of one product across vendors.
#[derive(Debug, Clone, Serialize)]
pub struct ProductComparison {
    pub product_name: String,
    pub lowest_price: f64,
    pub highest_price: f64,
    pub average_price: f64,
    pub price_range: f64,
    pub vendor_count: usize,
    /// Cheapest first.
    pub offers: Vec<PriceComparisonItem>,
}

impl ProductComparison {
    pub fn from_group(group: &ComparisonGroup<ProductOffer>) -> Self {
        let prices: Vec<f64> = group.members.iter().map(|o| o.product.effective_price()).collect();
        let lowest = prices.iter().copied().fold(f64::INFINITY, f64::min);
        let highest = prices.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let average = prices.iter().sum::<f64>() / prices.len() as f64;

        let mut offers: Vec<PriceComparisonItem> = group
            .members
            .iter()
            .map(|o| {
                let price = o.product.effective_price();
                PriceComparisonItem {
                    product_id: o.product.id.clone(),
                    product_name: o.product.name.clone(),
                    unit: o.product.unit.clone(),
                    vendor_id: o.vendor_info.id.clone(),
                    vendor_name: o.vendor_info.business_name.clone(),
                    rating: o.vendor_info.rating,
                    distance_km: o.vendor_info.distance_km,
                    estimated_delivery_minutes: o.vendor_info.estimated_delivery_minutes,
                    price,
                    delivery_fee: o.vendor_info.delivery_fee,
                    total_price: price + o.vendor_info.delivery_fee,
                    is_best_price: price == lowest,
                }
            })
            .collect();
        offers.sort_by(|a, b| a.price.total_cmp(&b.price));

        Self {
            product_name: group.product_name.clone(),
            lowest_price: lowest,
            highest_price: highest,
            average_price: average,
            price_range: highest - lowest,
            vendor_count: group.vendor_count(),
            offers,
        }
    }

    /// Offer with the lowest price including delivery.
    pub fn cheapest_delivered(&self) -> Option<&PriceComparisonItem> {
        self.offers
            .iter()
            .min_by(|a, b| a.total_price.total_cmp(&b.total_price))
    }
}

pub fn summarize(groups: &[ComparisonGroup<ProductOffer>]) -> Vec<ProductComparison> {
    groups.iter().map(ProductComparison::from_group).collect()
}

fn offers_for<'a>(
    products: impl Iterator<Item = &'a Product>,
    vendors: &HashMap<&str, &NearbyVendor>,
) -> Vec<ProductOffer> {
    products
        .filter_map(|p| {
            let n = vendors.get(p.vendor_id.as_str())?;
            Some(ProductOffer {
                product: p.clone(),
                vendor_info: VendorInfo::from_nearby(n),
            })
        })
        .collect()
}

/// Products sold by vendors within `radius_km`, grouped and summarised.
pub fn compare_nearby(search: &ProximitySearch, catalog: &Catalog, radius_km: f64) -> Vec<ProductComparison> {
    let nearby = search.nearby(&catalog.vendors, radius_km);
    let by_id: HashMap<&str, &NearbyVendor> = nearby.iter().map(|n| (n.vendor.id.as_str(), n)).collect();
    let offers = offers_for(catalog.products.iter().filter(|p| p.is_active), &by_id);
    summarize(&group_for_comparison(&offers))
}

/// Products whose name contains `query`, from any located vendor.
pub fn compare_product(search: &ProximitySearch, catalog: &Catalog, query: &str) -> Vec<ProductComparison> {
    let located: Vec<NearbyVendor> = search.sort_by_distance(&catalog.vendors);
    let by_id: HashMap<&str, &NearbyVendor> = located.iter().map(|n| (n.vendor.id.as_str(), n)).collect();
    let offers = offers_for(catalog.search_products(query).into_iter(), &by_id);
    summarize(&group_for_comparison(&offers))
}

// ─── Similar products ────────────────────────────────────────────

/// Share of the longer string's characters that occur anywhere in the
/// shorter one. 1.0 when both are empty.
pub fn name_similarity(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let (longer, shorter) = if a.len() > b.len() { (a, b) } else { (b, a) };
    if longer.is_empty() {
        return 1.0;
    }
    let pool: HashSet<char> = shorter.into_iter().collect();
    let matching = longer.iter().filter(|c| pool.contains(c)).count();
    matching as f64 / longer.len() as f64
}

pub const DEFAULT_SIMILARITY_THRESHOLD: f64 = 0.7;

#[derive(Debug, Clone, Serialize)]
pub struct SimilarProduct {
    #[serde(flatten)]
    pub product: Product,
    pub similarity_score: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vendor_distance_km: Option<f64>,
}

/// Other products in the target's category with a similar name,
/// most similar first.
pub fn find_similar_products(products: &[Product], target: &Product, threshold: f64) -> Vec<SimilarProduct> {
    let target_name = comparison_key(&target.name);
    let mut out: Vec<SimilarProduct> = products
        .iter()
        .filter(|p| p.id != target.id && p.category_id == target.category_id)
        .filter_map(|p| {
            let score = name_similarity(&target_name, &comparison_key(&p.name));
            (score >= threshold).then(|| SimilarProduct {
                product: p.clone(),
                similarity_score: score,
                vendor_distance_km: None,
            })
        })
        .collect();
    out.sort_by(|a, b| b.similarity_score.total_cmp(&a.similarity_score));
    out
}

/// `find_similar_products` over active catalog products, annotated with
/// the distance to each product's vendor.
pub fn similar_nearby(
    search: &ProximitySearch,
    catalog: &Catalog,
    target: &Product,
    threshold: f64,
) -> Vec<SimilarProduct> {
    let active: Vec<Product> = catalog.products.iter().filter(|p| p.is_active).cloned().collect();
    let mut out = find_similar_products(&active, target, threshold);
    for s in &mut out {
        s.vendor_distance_km = catalog
            .vendor(&s.product.vendor_id)
            .and_then(|v: &Vendor| crate::proximity::distance_to_vendor(&search.origin(), v));
    }
    out
}
