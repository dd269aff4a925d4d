//! Vendor, product and address rows.
//!
//! These mirror rows owned by the hosted database. Nothing here enforces
//! the database's own validation rules; the engine only reads them.

use chrono::{Datelike, NaiveDateTime, NaiveTime, Weekday};
use serde::{Deserialize, Serialize};

use crate::geo::Coordinates;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Address {
    pub id: String,
    #[serde(default)]
    pub label: String,
    pub address_line1: String,
    #[serde(default)]
    pub address_line2: Option<String>,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    #[serde(default = "default_country")]
    pub country: String,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
}

fn default_country() -> String {
    "India".into()
}

impl Address {
    /// Geocoded position, if both halves are present and in range.
    pub fn coordinates(&self) -> Option<Coordinates> {
        match (self.latitude, self.longitude) {
            (Some(lat), Some(lng)) => Coordinates::new(lat, lng).ok(),
            _ => None,
        }
    }
}

/// Opening window for one weekday, "HH:MM" local time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DayHours {
    pub open: String,
    pub close: String,
    #[serde(default)]
    pub is_closed: bool,
}

impl DayHours {
    pub fn new(open: &str, close: &str) -> Self {
        Self { open: open.into(), close: close.into(), is_closed: false }
    }

    pub fn closed() -> Self {
        Self { open: "00:00".into(), close: "00:00".into(), is_closed: true }
    }

    /// Whether `t` falls in `[open, close)`. Windows that wrap past
    /// midnight (close <= open) are honoured. Unparseable times read as closed.
    pub fn contains(&self, t: NaiveTime) -> bool {
        if self.is_closed {
            return false;
        }
        let (Ok(open), Ok(close)) = (
            NaiveTime::parse_from_str(&self.open, "%H:%M"),
            NaiveTime::parse_from_str(&self.close, "%H:%M"),
        ) else {
            return false;
        };
        if close > open {
            t >= open && t < close
        } else {
            t >= open || t < close
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BusinessHours {
    pub monday: DayHours,
    pub tuesday: DayHours,
    pub wednesday: DayHours,
    pub thursday: DayHours,
    pub friday: DayHours,
    pub saturday: DayHours,
    pub sunday: DayHours,
}

impl BusinessHours {
    /// Same window every day of the week.
    pub fn daily(open: &str, close: &str) -> Self {
        let d = DayHours::new(open, close);
        Self {
            monday: d.clone(),
            tuesday: d.clone(),
            wednesday: d.clone(),
            thursday: d.clone(),
            friday: d.clone(),
            saturday: d.clone(),
            sunday: d,
        }
    }

    pub fn day(&self, weekday: Weekday) -> &DayHours {
        match weekday {
            Weekday::Mon => &self.monday,
            Weekday::Tue => &self.tuesday,
            Weekday::Wed => &self.wednesday,
            Weekday::Thu => &self.thursday,
            Weekday::Fri => &self.friday,
            Weekday::Sat => &self.saturday,
            Weekday::Sun => &self.sunday,
        }
    }

    pub fn is_open_at(&self, local: NaiveDateTime) -> bool {
        self.day(local.weekday()).contains(local.time())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Vendor {
    pub id: String,
    pub business_name: String,
    pub business_type: String,
    #[serde(default)]
    pub verified: bool,
    #[serde(default)]
    pub rating: f64,
    #[serde(default)]
    pub total_ratings: u32,
    pub address: Address,
    #[serde(default)]
    pub business_hours: Option<BusinessHours>,
    /// Kilometres from the shop the vendor is willing to deliver.
    pub delivery_radius: f64,
    pub delivery_fee: f64,
    /// Cart subtotal at which this vendor waives its delivery fee.
    #[serde(default)]
    pub minimum_order: Option<f64>,
}

impl Vendor {
    pub fn coordinates(&self) -> Option<Coordinates> {
        self.address.coordinates()
    }

    /// Vendors without published hours are treated as always open.
    pub fn is_open_at(&self, local: NaiveDateTime) -> bool {
        self.business_hours
            .as_ref()
            .map_or(true, |h| h.is_open_at(local))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub id: String,
    pub vendor_id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price: f64,
    #[serde(default)]
    pub discount_price: Option<f64>,
    pub category_id: String,
    #[serde(default)]
    pub stock: u32,
    #[serde(default)]
    pub unit: String,
    #[serde(default = "default_active")]
    pub is_active: bool,
    #[serde(default)]
    pub tags: Vec<String>,
}

fn default_active() -> bool {
    true
}

impl Product {
    /// The price a customer pays right now.
    pub fn effective_price(&self) -> f64 {
        match self.discount_price {
            Some(d) if d < self.price => d,
            _ => self.price,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d).unwrap().and_hms_opt(h, min, 0).unwrap()
    }

    #[test]
    fn test_day_hours_window() {
        let h = DayHours::new("09:00", "21:30");
        assert!(h.contains(NaiveTime::from_hms_opt(9, 0, 0).unwrap()));
        assert!(h.contains(NaiveTime::from_hms_opt(21, 29, 0).unwrap()));
        assert!(!h.contains(NaiveTime::from_hms_opt(21, 30, 0).unwrap()));
        assert!(!h.contains(NaiveTime::from_hms_opt(8, 59, 0).unwrap()));
    }

    #[test]
    fn test_day_hours_overnight() {
        let h = DayHours::new("18:00", "02:00");
        assert!(h.contains(NaiveTime::from_hms_opt(23, 0, 0).unwrap()));
        assert!(h.contains(NaiveTime::from_hms_opt(1, 0, 0).unwrap()));
        assert!(!h.contains(NaiveTime::from_hms_opt(12, 0, 0).unwrap()));
    }

    #[test]
    fn test_day_hours_malformed_is_closed() {
        let h = DayHours::new("nine", "21:00");
        assert!(!h.contains(NaiveTime::from_hms_opt(12, 0, 0).unwrap()));
        assert!(!DayHours::closed().contains(NaiveTime::from_hms_opt(12, 0, 0).unwrap()));
    }

    #[test]
    fn test_business_hours_weekday() {
        let mut hours = BusinessHours::daily("08:00", "20:00");
        hours.sunday = DayHours::closed();
        // 2026-10-18 is a Sunday, 2026-10-19 a Monday.
        assert!(!hours.is_open_at(at(2026, 10, 18, 10, 0)));
        assert!(hours.is_open_at(at(2026, 10, 19, 10, 0)));
    }

    #[test]
    fn test_effective_price() {
        let mut p = Product {
            id: "p".into(),
            vendor_id: "v".into(),
            name: "Milk".into(),
            description: String::new(),
            price: 60.0,
            discount_price: Some(55.0),
            category_id: "dairy".into(),
            stock: 1,
            unit: "1L".into(),
            is_active: true,
            tags: vec![],
        };
        assert_eq!(p.effective_price(), 55.0);
        p.discount_price = Some(70.0);
        assert_eq!(p.effective_price(), 60.0);
    }

    #[test]
    fn test_vendor_deserialize_defaults() {
        let json = r#"{
            "id": "v9",
            "business_name": "Test Shop",
            "business_type": "grocery",
            "address": {
                "id": "a9",
                "address_line1": "1 Main Rd",
                "city": "Mumbai",
                "state": "Maharashtra",
                "postal_code": "400058"
            },
            "delivery_radius": 3.0,
            "delivery_fee": 10.0
        }"#;
        let v: Vendor = serde_json::from_str(json).unwrap();
        assert!(v.coordinates().is_none());
        assert!(v.minimum_order.is_none());
        assert_eq!(v.address.country, "India");
        assert!(v.is_open_at(at(2026, 1, 1, 3, 0)));
    }
}
