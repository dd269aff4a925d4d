//! Demo catalog of vendors around western Mumbai.
//!
//! Used when no catalog file is configured, and by the tests. Vendor
//! positions are spread between 0.4 and 15 km from Andheri West so every
//! proximity bucket is represented.

use super::types::{Address, BusinessHours, DayHours, Product, Vendor};

struct VendorSeed {
    id: &'static str,
    name: &'static str,
    kind: &'static str,
    area: &'static str,
    postal_code: &'static str,
    coords: Option<(f64, f64)>,
    rating: f64,
    total_ratings: u32,
    verified: bool,
    radius: f64,
    fee: f64,
    minimum_order: Option<f64>,
    hours: Option<(&'static str, &'static str)>,
}

const VENDORS: &[VendorSeed] = &[
    VendorSeed {
        id: "v1", name: "Fresh Mart", kind: "grocery", area: "Andheri West",
        postal_code: "400058", coords: Some((19.1364, 72.8296)),
        rating: 4.5, total_ratings: 320, verified: true,
        radius: 5.0, fee: 20.0, minimum_order: Some(200.0),
        hours: Some(("07:00", "23:00")),
    },
    VendorSeed {
        id: "v2", name: "Green Valley Grocers", kind: "grocery", area: "Juhu",
        postal_code: "400049", coords: Some((19.1075, 72.8263)),
        rating: 4.2, total_ratings: 185, verified: true,
        radius: 5.0, fee: 25.0, minimum_order: Some(300.0),
        hours: Some(("08:00", "22:00")),
    },
    VendorSeed {
        id: "v3", name: "Daily Needs Store", kind: "convenience", area: "Bandra West",
        postal_code: "400050", coords: Some((19.0596, 72.8295)),
        rating: 4.7, total_ratings: 512, verified: true,
        radius: 6.0, fee: 30.0, minimum_order: Some(250.0),
        hours: Some(("06:00", "01:00")),
    },
    VendorSeed {
        id: "v4", name: "Organic Basket", kind: "organic", area: "Powai",
        postal_code: "400076", coords: Some((19.1176, 72.9060)),
        rating: 4.8, total_ratings: 98, verified: true,
        radius: 10.0, fee: 40.0, minimum_order: Some(500.0),
        hours: Some(("09:00", "21:00")),
    },
    VendorSeed {
        id: "v5", name: "Metro Supermart", kind: "supermarket", area: "Lower Parel",
        postal_code: "400013", coords: Some((18.9980, 72.8311)),
        rating: 4.0, total_ratings: 1204, verified: true,
        radius: 8.0, fee: 15.0, minimum_order: Some(400.0),
        hours: None,
    },
    VendorSeed {
        id: "v6", name: "Corner Kirana", kind: "kirana", area: "Andheri East",
        postal_code: "400069", coords: Some((19.1136, 72.8697)),
        rating: 3.9, total_ratings: 42, verified: false,
        radius: 3.0, fee: 0.0, minimum_order: None,
        hours: Some(("07:30", "22:30")),
    },
    VendorSeed {
        id: "v7", name: "Weekend Farmers Stall", kind: "market", area: "Versova",
        postal_code: "400061", coords: None,
        rating: 4.4, total_ratings: 27, verified: false,
        radius: 2.0, fee: 10.0, minimum_order: None,
        hours: None,
    },
];

// (id, vendor, name, price, discount, category, stock, unit, active)
type ProductSeed = (
    &'static str, &'static str, &'static str, f64, Option<f64>,
    &'static str, u32, &'static str, bool,
);

const PRODUCTS: &[ProductSeed] = &[
    ("p1", "v1", "Fresh Apples", 180.0, None, "fruits", 50, "kg", true),
    ("p2", "v1", "Bananas", 60.0, None, "fruits", 100, "dozen", true),
    ("p3", "v1", "Tomatoes", 40.0, None, "vegetables", 80, "kg", true),
    ("p4", "v1", "Whole Milk 1L", 66.0, Some(62.0), "dairy", 40, "1L", true),
    ("p5", "v2", "Fresh Apples", 165.0, None, "fruits", 30, "kg", true),
    ("p6", "v2", "Basmati Rice 1kg", 120.0, None, "staples", 60, "kg", true),
    ("p7", "v2", "Brown Bread", 45.0, None, "bakery", 25, "400g", true),
    ("p8", "v2", "Brown Bread", 80.0, None, "bakery", 12, "800g", true),
    ("p9", "v3", "  fresh apples ", 175.0, None, "fruits", 20, "kg", true),
    ("p10", "v3", "Paneer 200g", 90.0, None, "dairy", 15, "200g", true),
    ("p11", "v3", "Tomatoes", 30.0, None, "vegetables", 0, "kg", false),
    ("p12", "v4", "Bananas", 55.0, None, "fruits", 70, "dozen", true),
    ("p13", "v4", "Basmati Rice 1kg", 140.0, None, "staples", 35, "kg", true),
    ("p14", "v4", "Organic Honey", 350.0, None, "pantry", 10, "500g", true),
    ("p15", "v5", "Fresh Apples", 150.0, None, "fruits", 200, "kg", true),
    ("p16", "v6", "Basmati Rice 1kg", 110.0, None, "staples", 18, "kg", true),
    ("p17", "v6", "Tomatoes", 35.0, None, "vegetables", 40, "kg", true),
    ("p18", "v6", "Whole Milk", 64.0, None, "dairy", 30, "1L", true),
    ("p19", "v7", "Bananas", 50.0, None, "fruits", 40, "dozen", true),
];

fn seed_to_vendor(s: &VendorSeed) -> Vendor {
    Vendor {
        id: s.id.to_string(),
        business_name: s.name.to_string(),
        business_type: s.kind.to_string(),
        verified: s.verified,
        rating: s.rating,
        total_ratings: s.total_ratings,
        address: Address {
            id: format!("addr-{}", s.id),
            label: "Store".into(),
            address_line1: format!("{} Market Road", s.area),
            address_line2: None,
            city: "Mumbai".into(),
            state: "Maharashtra".into(),
            postal_code: s.postal_code.to_string(),
            country: "India".into(),
            latitude: s.coords.map(|c| c.0),
            longitude: s.coords.map(|c| c.1),
        },
        business_hours: s.hours.map(|(open, close)| {
            let mut h = BusinessHours::daily(open, close);
            if s.kind == "organic" {
                h.sunday = DayHours::closed();
            }
            h
        }),
        delivery_radius: s.radius,
        delivery_fee: s.fee,
        minimum_order: s.minimum_order,
    }
}

pub fn vendors() -> Vec<Vendor> {
    VENDORS.iter().map(seed_to_vendor).collect()
}

pub fn products() -> Vec<Product> {
    PRODUCTS
        .iter()
        .map(|&(id, vendor, name, price, discount, category, stock, unit, active)| Product {
            id: id.to_string(),
            vendor_id: vendor.to_string(),
            name: name.to_string(),
            description: String::new(),
            price,
            discount_price: discount,
            category_id: category.to_string(),
            stock,
            unit: unit.to_string(),
            is_active: active,
            tags: vec![],
        })
        .collect()
}
