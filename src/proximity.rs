//! Vendor proximity: radius search, delivery coverage and ETA estimates.
//!
//! Vendors without geocoded addresses never appear in any result here.
//! Every list returned is sorted nearest-first unless a filter asks for a
//! different order; ties keep catalog order.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::catalog::Vendor;
use crate::error::VendorlyError;
use crate::geo::{format_distance, Coordinates, ProximityBand};

/// Per-deployment delivery model used for ETA estimates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeliveryParams {
    /// Minutes to pick and pack an order before a rider leaves.
    pub base_prep_minutes: f64,
    /// Rider speed in km per minute.
    pub speed_km_per_minute: f64,
    /// Beyond this distance no estimate is given.
    pub max_distance_km: f64,
}

impl Default for DeliveryParams {
    // 15 min prep plus 5 min per km, the storefront's default estimate.
    fn default() -> Self {
        Self {
            base_prep_minutes: 15.0,
            speed_km_per_minute: 0.2,
            max_distance_km: 25.0,
        }
    }
}

/// Estimated minutes from order to doorstep, or `None` when `distance_km`
/// is beyond `params.max_distance_km`.
pub fn estimate_delivery_time(distance_km: f64, params: &DeliveryParams) -> Option<u32> {
    if distance_km > params.max_distance_km || params.speed_km_per_minute <= 0.0 {
        return None;
    }
    let travel = distance_km / params.speed_km_per_minute;
    Some((params.base_prep_minutes + travel).ceil() as u32)
}

/// Accepts any finite radius of zero or more. Zero matches only vendors
/// at the exact origin.
pub fn check_radius(radius_km: f64) -> crate::error::Result<f64> {
    if radius_km.is_finite() && radius_km >= 0.0 {
        Ok(radius_km)
    } else {
        Err(VendorlyError::InvalidRadius(radius_km))
    }
}

/// `ceil(distance * 5 + 15)` minutes, with no distance cap.
pub fn quick_delivery_estimate(distance_km: f64) -> u32 {
    (distance_km * 5.0 + 15.0).ceil() as u32
}

/// A vendor annotated with its distance from the customer.
#[derive(Debug, Clone, Serialize)]
pub struct NearbyVendor {
    #[serde(flatten)]
    pub vendor: Vendor,
    pub distance_km: f64,
    pub distance_label: String,
    pub band: ProximityBand,
    pub estimated_delivery_minutes: Option<u32>,
    pub delivery_available: bool,
}

/// Order applied to a filtered vendor list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VendorSort {
    #[default]
    Distance,
    /// Highest rating first.
    Rating,
    /// Cheapest delivery first.
    DeliveryFeeLow,
    DeliveryFeeHigh,
}

impl FromStr for VendorSort {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "distance" => Ok(Self::Distance),
            "rating" => Ok(Self::Rating),
            "delivery_fee" | "fee" | "price_low" | "delivery_fee_low" => Ok(Self::DeliveryFeeLow),
            "price_high" | "delivery_fee_high" => Ok(Self::DeliveryFeeHigh),
            _ => Err(format!(
                "Unknown sort '{}'. Use 'distance', 'rating', 'price_low' or 'price_high'.",
                s
            )),
        }
    }
}

impl fmt::Display for VendorSort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Distance => write!(f, "distance"),
            Self::Rating => write!(f, "rating"),
            Self::DeliveryFeeLow => write!(f, "price_low"),
            Self::DeliveryFeeHigh => write!(f, "price_high"),
        }
    }
}

/// Search-page vendor filter.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LocationFilter {
    pub radius_km: f64,
    pub sort_by: VendorSort,
    /// Keep only vendors whose delivery radius covers the customer.
    /// When set, `radius_km` is ignored.
    pub delivery_only: bool,
    pub min_rating: f64,
    pub max_delivery_fee: f64,
    /// Local time at which vendors must be open.
    pub open_at: Option<NaiveDateTime>,
}

impl Default for LocationFilter {
    fn default() -> Self {
        Self {
            radius_km: 10.0,
            sort_by: VendorSort::Distance,
            delivery_only: false,
            min_rating: 0.0,
            max_delivery_fee: 100.0,
            open_at: None,
        }
    }
}

pub fn distance_to_vendor(origin: &Coordinates, vendor: &Vendor) -> Option<f64> {
    vendor.coordinates().map(|c| origin.distance_to(&c))
}

/// Whether the vendor's delivery radius reaches `origin`.
pub fn can_deliver(origin: &Coordinates, vendor: &Vendor) -> bool {
    distance_to_vendor(origin, vendor).is_some_and(|d| d <= vendor.delivery_radius)
}

/// Proximity queries around one customer position.
#[derive(Debug, Clone, Copy)]
pub struct ProximitySearch {
    origin: Coordinates,
    params: DeliveryParams,
}

impl ProximitySearch {
    pub fn new(origin: Coordinates) -> Self {
        Self { origin, params: DeliveryParams::default() }
    }

    pub fn with_delivery(mut self, params: DeliveryParams) -> Self {
        self.params = params;
        self
    }

    pub fn origin(&self) -> Coordinates {
        self.origin
    }

    pub fn annotate(&self, vendor: &Vendor) -> Option<NearbyVendor> {
        let d = distance_to_vendor(&self.origin, vendor)?;
        Some(NearbyVendor {
            vendor: vendor.clone(),
            distance_km: d,
            distance_label: format_distance(d),
            band: ProximityBand::of(d),
            estimated_delivery_minutes: estimate_delivery_time(d, &self.params),
            delivery_available: d <= vendor.delivery_radius,
        })
    }

    /// All located vendors, nearest first.
    pub fn sort_by_distance(&self, vendors: &[Vendor]) -> Vec<NearbyVendor> {
        let mut out: Vec<NearbyVendor> = vendors.iter().filter_map(|v| self.annotate(v)).collect();
        out.sort_by(|a, b| a.distance_km.total_cmp(&b.distance_km));
        out
    }

    /// Vendors within `radius_km`, nearest first.
    pub fn nearby(&self, vendors: &[Vendor], radius_km: f64) -> Vec<NearbyVendor> {
        let mut out = self.sort_by_distance(vendors);
        out.retain(|v| v.distance_km <= radius_km);
        out
    }

    /// Vendors whose own delivery radius covers the customer, nearest first.
    pub fn deliverable(&self, vendors: &[Vendor]) -> Vec<NearbyVendor> {
        let mut out = self.sort_by_distance(vendors);
        out.retain(|v| v.delivery_available);
        out
    }

    pub fn apply_filter(&self, vendors: &[Vendor], filter: &LocationFilter) -> Vec<NearbyVendor> {
        let mut out = if filter.delivery_only {
            self.deliverable(vendors)
        } else {
            self.nearby(vendors, filter.radius_km)
        };

        out.retain(|v| {
            v.vendor.rating >= filter.min_rating
                && v.vendor.delivery_fee <= filter.max_delivery_fee
                && filter.open_at.map_or(true, |t| v.vendor.is_open_at(t))
        });

        match filter.sort_by {
            VendorSort::Distance => {}
            VendorSort::Rating => out.sort_by(|a, b| b.vendor.rating.total_cmp(&a.vendor.rating)),
            VendorSort::DeliveryFeeLow => {
                out.sort_by(|a, b| a.vendor.delivery_fee.total_cmp(&b.vendor.delivery_fee))
            }
            VendorSort::DeliveryFeeHigh => {
                out.sort_by(|a, b| b.vendor.delivery_fee.total_cmp(&a.vendor.delivery_fee))
            }
        }
        out
    }
}

pub fn nearby(origin: Coordinates, vendors: &[Vendor], radius_km: f64) -> Vec<NearbyVendor> {
    ProximitySearch::new(origin).nearby(vendors, radius_km)
}

pub fn sort_by_distance(origin: Coordinates, vendors: &[Vendor]) -> Vec<NearbyVendor> {
    ProximitySearch::new(origin).sort_by_distance(vendors)
}

pub fn deliverable(origin: Coordinates, vendors: &[Vendor]) -> Vec<NearbyVendor> {
    ProximitySearch::new(origin).deliverable(vendors)
}
