//! Location providers: Nominatim and the built-in locality dataset.

use super::types::{LocationError, LocationSource, ResolvedLocation};
use crate::geo::distance_km;
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const NOMINATIM_URL: &str = "https://nominatim.openstreetmap.org";
const USER_AGENT: &str = "Vendorly/0.3 (hyperlocal-commerce)";
const TIMEOUT: Duration = Duration::from_secs(5);

// ─── Built-in dataset ───────────────────────────────────────────

struct BuiltinLocality {
    names: &'static [&'static str], // canonical + aliases
    area: &'static str,
    city: &'static str,
    state: &'static str,
    postal_code: &'static str,
    lat: f64,
    lng: f64,
}

const BUILTIN_LOCALITIES: &[BuiltinLocality] = &[
    BuiltinLocality {
        names: &["andheri west", "andheri"],
        area: "Andheri West", city: "Mumbai", state: "Maharashtra",
        postal_code: "400058", lat: 19.1356, lng: 72.8262,
    },
    BuiltinLocality {
        names: &["andheri east"],
        area: "Andheri East", city: "Mumbai", state: "Maharashtra",
        postal_code: "400069", lat: 19.1136, lng: 72.8697,
    },
    BuiltinLocality {
        names: &["juhu"],
        area: "Juhu", city: "Mumbai", state: "Maharashtra",
        postal_code: "400049", lat: 19.1075, lng: 72.8263,
    },
    BuiltinLocality {
        names: &["bandra west", "bandra"],
        area: "Bandra West", city: "Mumbai", state: "Maharashtra",
        postal_code: "400050", lat: 19.0596, lng: 72.8295,
    },
    BuiltinLocality {
        names: &["powai"],
        area: "Powai", city: "Mumbai", state: "Maharashtra",
        postal_code: "400076", lat: 19.1176, lng: 72.9060,
    },
    BuiltinLocality {
        names: &["lower parel"],
        area: "Lower Parel", city: "Mumbai", state: "Maharashtra",
        postal_code: "400013", lat: 18.9980, lng: 72.8311,
    },
    BuiltinLocality {
        names: &["mumbai", "bombay"],
        area: "", city: "Mumbai", state: "Maharashtra",
        postal_code: "400001", lat: 19.0760, lng: 72.8777,
    },
    BuiltinLocality {
        names: &["connaught place", "cp"],
        area: "Connaught Place", city: "New Delhi", state: "Delhi",
        postal_code: "110001", lat: 28.6315, lng: 77.2167,
    },
    BuiltinLocality {
        names: &["delhi", "new delhi"],
        area: "", city: "New Delhi", state: "Delhi",
        postal_code: "110001", lat: 28.6139, lng: 77.2090,
    },
    BuiltinLocality {
        names: &["koramangala"],
        area: "Koramangala", city: "Bangalore", state: "Karnataka",
        postal_code: "560034", lat: 12.9279, lng: 77.6271,
    },
    BuiltinLocality {
        names: &["bangalore", "bengaluru"],
        area: "", city: "Bangalore", state: "Karnataka",
        postal_code: "560001", lat: 12.9716, lng: 77.5946,
    },
    BuiltinLocality {
        names: &["t. nagar", "t nagar", "thyagaraya nagar"],
        area: "T. Nagar", city: "Chennai", state: "Tamil Nadu",
        postal_code: "600017", lat: 13.0418, lng: 80.2341,
    },
    BuiltinLocality {
        names: &["chennai", "madras"],
        area: "", city: "Chennai", state: "Tamil Nadu",
        postal_code: "600001", lat: 13.0827, lng: 80.2707,
    },
    BuiltinLocality {
        names: &["koregaon park"],
        area: "Koregaon Park", city: "Pune", state: "Maharashtra",
        postal_code: "411001", lat: 18.5362, lng: 73.8958,
    },
    BuiltinLocality {
        names: &["pune", "poona"],
        area: "", city: "Pune", state: "Maharashtra",
        postal_code: "411001", lat: 18.5204, lng: 73.8567,
    },
    BuiltinLocality {
        names: &["hitec city", "hitech city", "cyberabad"],
        area: "HITEC City", city: "Hyderabad", state: "Telangana",
        postal_code: "500081", lat: 17.4435, lng: 78.3772,
    },
    BuiltinLocality {
        names: &["hyderabad"],
        area: "", city: "Hyderabad", state: "Telangana",
        postal_code: "500001", lat: 17.3850, lng: 78.4867,
    },
    BuiltinLocality {
        names: &["kolkata", "calcutta"],
        area: "", city: "Kolkata", state: "West Bengal",
        postal_code: "700001", lat: 22.5726, lng: 88.3639,
    },
];

/// Compute edit distance between two strings (Levenshtein).
fn edit_distance(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let n = b.len();

    let mut prev = (0..=n).collect::<Vec<_>>();
    let mut curr = vec![0; n + 1];

    for (i, ca) in a.iter().enumerate() {
        curr[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let cost = usize::from(ca != cb);
            curr[j + 1] = (prev[j + 1] + 1).min(curr[j] + 1).min(prev[j] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    prev[n]
}

fn builtin_to_resolved(l: &BuiltinLocality) -> ResolvedLocation {
    let name = if l.area.is_empty() { l.city } else { l.area };
    ResolvedLocation {
        name: name.to_string(),
        area: l.area.to_string(),
        city: l.city.to_string(),
        state: l.state.to_string(),
        postal_code: Some(l.postal_code.to_string()),
        lat: l.lat,
        lng: l.lng,
        source: LocationSource::Builtin,
        display_name: None,
    }
}

/// Search the built-in dataset: exact alias, then substring, then
/// edit distance <= 2.
pub fn builtin_lookup(query: &str) -> Option<ResolvedLocation> {
    let q = query.trim().to_lowercase();
    if q.is_empty() {
        return None;
    }

    if let Some(l) = BUILTIN_LOCALITIES.iter().find(|l| l.names.contains(&q.as_str())) {
        return Some(builtin_to_resolved(l));
    }

    // Substring match; only for queries long enough to be meaningful.
    if q.len() >= 3 {
        for l in BUILTIN_LOCALITIES {
            if l.names.iter().any(|name| name.contains(q.as_str())) {
                return Some(builtin_to_resolved(l));
            }
        }
    }

    let mut best: Option<(&BuiltinLocality, usize)> = None;
    for l in BUILTIN_LOCALITIES {
        for name in l.names {
            let dist = edit_distance(&q, name);
            if dist <= 2 && best.map_or(true, |(_, d)| dist < d) {
                best = Some((l, dist));
            }
        }
    }
    best.map(|(l, _)| builtin_to_resolved(l))
}

/// Closest built-in locality within `max_km` of the point.
pub fn nearest_builtin(lat: f64, lng: f64, max_km: f64) -> Option<ResolvedLocation> {
    BUILTIN_LOCALITIES
        .iter()
        .map(|l| (l, distance_km(lat, lng, l.lat, l.lng)))
        .filter(|(_, d)| *d <= max_km)
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(l, _)| ResolvedLocation {
            lat,
            lng,
            ..builtin_to_resolved(l)
        })
}

/// A locality entry for the public list API.
#[derive(Debug, Clone, Serialize)]
pub struct LocalityInfo {
    pub name: String,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    pub lat: f64,
    pub lng: f64,
}

/// The full built-in locality list (quick-pick locations).
pub fn builtin_locality_list() -> Vec<LocalityInfo> {
    BUILTIN_LOCALITIES
        .iter()
        .map(|l| LocalityInfo {
            name: builtin_to_resolved(l).name,
            city: l.city.to_string(),
            state: l.state.to_string(),
            postal_code: l.postal_code.to_string(),
            lat: l.lat,
            lng: l.lng,
        })
        .collect()
}

// ─── Nominatim provider ─────────────────────────────────────────

#[derive(Deserialize, Debug, Clone, Default)]
pub struct NominatimAddress {
    pub suburb: Option<String>,
    pub neighbourhood: Option<String>,
    pub quarter: Option<String>,
    pub residential: Option<String>,
    pub city: Option<String>,
    pub town: Option<String>,
    pub village: Option<String>,
    pub municipality: Option<String>,
    pub state: Option<String>,
    pub region: Option<String>,
    pub postcode: Option<String>,
}

#[derive(Deserialize, Debug, Clone)]
pub struct NominatimResult {
    pub lat: String,
    pub lon: String,
    pub display_name: String,
    #[serde(default)]
    pub address: Option<NominatimAddress>,
}

fn first_of(options: &[&Option<String>]) -> String {
    options
        .iter()
        .find_map(|o| o.as_ref().filter(|s| !s.is_empty()).cloned())
        .unwrap_or_default()
}

/// Convert a Nominatim hit into a location. Coordinates fall back to
/// the caller's when given (reverse lookups keep the exact point).
pub fn nominatim_to_resolved(
    r: &NominatimResult,
    at: Option<(f64, f64)>,
) -> Result<ResolvedLocation, LocationError> {
    let (lat, lng) = match at {
        Some(p) => p,
        None => {
            let lat = r.lat.parse::<f64>().map_err(|e| LocationError::InvalidResponse(e.to_string()))?;
            let lng = r.lon.parse::<f64>().map_err(|e| LocationError::InvalidResponse(e.to_string()))?;
            (lat, lng)
        }
    };
    let a = r.address.clone().unwrap_or_default();
    let area = first_of(&[&a.suburb, &a.neighbourhood, &a.quarter, &a.residential]);
    let city = first_of(&[&a.city, &a.town, &a.village, &a.municipality]);
    let state = first_of(&[&a.state, &a.region]);
    let name = if !area.is_empty() {
        area.clone()
    } else if !city.is_empty() {
        city.clone()
    } else {
        r.display_name.split(',').next().unwrap_or("").trim().to_string()
    };

    Ok(ResolvedLocation {
        name,
        area,
        city,
        state,
        postal_code: a.postcode,
        lat,
        lng,
        source: LocationSource::Nominatim,
        display_name: Some(r.display_name.clone()),
    })
}

/// Forward search, best match first.
pub fn nominatim_search(
    base_url: &str,
    query: &str,
    country: Option<&str>,
    limit: usize,
) -> Result<Vec<ResolvedLocation>, LocationError> {
    let limit = limit.clamp(1, 10).to_string();
    let mut request = ureq::get(&format!("{}/search", base_url))
        .set("User-Agent", USER_AGENT)
        .timeout(TIMEOUT)
        .query("q", query)
        .query("format", "json")
        .query("addressdetails", "1")
        .query("limit", &limit);
    if let Some(cc) = country {
        request = request.query("countrycodes", cc);
    }

    let results: Vec<NominatimResult> = request
        .call()
        .map_err(|e| LocationError::Network(e.to_string()))?
        .into_json()
        .map_err(|e| LocationError::InvalidResponse(e.to_string()))?;

    if results.is_empty() {
        return Err(LocationError::NotFound(query.to_string()));
    }
    results.iter().map(|r| nominatim_to_resolved(r, None)).collect()
}

/// Reverse lookup of a point.
pub fn nominatim_reverse(base_url: &str, lat: f64, lng: f64) -> Result<ResolvedLocation, LocationError> {
    let response = ureq::get(&format!("{}/reverse", base_url))
        .set("User-Agent", USER_AGENT)
        .timeout(TIMEOUT)
        .query("format", "json")
        .query("lat", &lat.to_string())
        .query("lon", &lng.to_string())
        .query("addressdetails", "1")
        .query("zoom", "18")
        .call()
        .map_err(|e| LocationError::Network(e.to_string()))?;

    let val: serde_json::Value = response
        .into_json()
        .map_err(|e| LocationError::InvalidResponse(e.to_string()))?;
    if let Some(err) = val.get("error").and_then(|e| e.as_str()) {
        return Err(LocationError::NotFound(err.to_string()));
    }
    let r: NominatimResult =
        serde_json::from_value(val).map_err(|e| LocationError::InvalidResponse(e.to_string()))?;
    nominatim_to_resolved(&r, Some((lat, lng)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_exact() {
        let loc = builtin_lookup("Andheri West").unwrap();
        assert_eq!(loc.name, "Andheri West");
        assert_eq!(loc.city, "Mumbai");
        assert_eq!(loc.postal_code.as_deref(), Some("400058"));
        assert_eq!(loc.source, LocationSource::Builtin);
    }

    #[test]
    fn test_builtin_alias() {
        let loc = builtin_lookup("bengaluru").unwrap();
        assert_eq!(loc.name, "Bangalore");
        assert_eq!(loc.area, "");
    }

    #[test]
    fn test_builtin_substring() {
        let loc = builtin_lookup("koregaon").unwrap();
        assert_eq!(loc.name, "Koregaon Park");
    }

    #[test]
    fn test_builtin_fuzzy() {
        let loc = builtin_lookup("koramangla").unwrap();
        assert_eq!(loc.name, "Koramangala");
    }

    #[test]
    fn test_builtin_not_found() {
        assert!(builtin_lookup("xyznonexistent").is_none());
        assert!(builtin_lookup("   ").is_none());
    }

    #[test]
    fn test_nearest_builtin() {
        // A point just off Juhu beach.
        let loc = nearest_builtin(19.1, 72.826, 5.0).unwrap();
        assert_eq!(loc.name, "Juhu");
        assert_eq!(loc.lat, 19.1);
        assert!(nearest_builtin(0.0, 0.0, 25.0).is_none());
    }

    #[test]
    fn test_edit_distance() {
        assert_eq!(edit_distance("kitten", "sitting"), 3);
        assert_eq!(edit_distance("powai", "powaii"), 1);
        assert_eq!(edit_distance("", "abc"), 3);
        assert_eq!(edit_distance("abc", "abc"), 0);
    }

    #[test]
    fn test_nominatim_to_resolved() {
        let json = r#"{
            "lat": "19.1197",
            "lon": "72.8468",
            "display_name": "Andheri, K/W Ward, Mumbai, Maharashtra, 400053, India",
            "address": {
                "suburb": "Andheri",
                "city": "Mumbai",
                "state": "Maharashtra",
                "postcode": "400053"
            }
        }"#;
        let r: NominatimResult = serde_json::from_str(json).unwrap();
        let loc = nominatim_to_resolved(&r, None).unwrap();
        assert_eq!(loc.name, "Andheri");
        assert_eq!(loc.city, "Mumbai");
        assert_eq!(loc.postal_code.as_deref(), Some("400053"));
        assert!((loc.lat - 19.1197).abs() < 1e-9);
        assert_eq!(loc.source, LocationSource::Nominatim);
    }

    #[test]
    fn test_nominatim_town_fallback_and_point_override() {
        let json = r#"{
            "lat": "0", "lon": "0",
            "display_name": "Lonavala, Pune, Maharashtra, India",
            "address": { "town": "Lonavala", "region": "Western India" }
        }"#;
        let r: NominatimResult = serde_json::from_str(json).unwrap();
        let loc = nominatim_to_resolved(&r, Some((18.75, 73.4))).unwrap();
        assert_eq!(loc.name, "Lonavala");
        assert_eq!(loc.state, "Western India");
        assert_eq!(loc.lat, 18.75);
    }

    #[test]
    fn test_nominatim_bad_coordinates() {
        let r = NominatimResult {
            lat: "north".into(),
            lon: "0".into(),
            display_name: "x".into(),
            address: None,
        };
        assert!(matches!(
            nominatim_to_resolved(&r, None),
            Err(LocationError::InvalidResponse(_))
        ));
    }

    #[test]
    fn test_locality_list() {
        let list = builtin_locality_list();
        assert!(list.iter().any(|l| l.name == "HITEC City" && l.city == "Hyderabad"));
    }
}
