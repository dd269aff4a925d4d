//! Core types for the location subsystem.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::geo::{format_coords, Coordinates};

/// How a location was resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LocationSource {
    Cache,
    Nominatim,
    Builtin,
    Manual,
}

impl fmt::Display for LocationSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cache => write!(f, "Cache"),
            Self::Nominatim => write!(f, "Nominatim"),
            Self::Builtin => write!(f, "Built-in"),
            Self::Manual => write!(f, "Manual"),
        }
    }
}

/// A delivery location: a point plus the address parts shown in the header.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolvedLocation {
    pub name: String,
    /// Suburb or neighbourhood, e.g. "Andheri West".
    #[serde(default)]
    pub area: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub postal_code: Option<String>,
    pub lat: f64,
    pub lng: f64,
    pub source: LocationSource,
    /// Full display name from the provider
    #[serde(default)]
    pub display_name: Option<String>,
}

impl ResolvedLocation {
    pub fn coordinates(&self) -> Coordinates {
        Coordinates { lat: self.lat, lng: self.lng }
    }

    /// "Andheri West, Maharashtra" style header text.
    pub fn context_line(&self) -> String {
        let place = if self.area.is_empty() { &self.city } else { &self.area };
        if place.is_empty() {
            return self.name.clone();
        }
        let state = if self.state.is_empty() { "India" } else { &self.state };
        format!("{}, {}", place, state)
    }

    pub fn display_line(&self) -> String {
        format!(
            "\u{1F4CD} {}\n  \u{1F4D0} {}",
            self.context_line(),
            format_coords(self.lat, self.lng)
        )
    }
}

/// Options for forward lookups.
#[derive(Debug, Clone)]
pub struct ResolveOptions {
    /// ISO 3166-1 alpha-2 country filter passed to the geocoder.
    pub country: Option<String>,
    /// Maximum candidates for suggestion lists.
    pub limit: usize,
}

impl Default for ResolveOptions {
    fn default() -> Self {
        Self {
            country: Some("IN".into()),
            limit: 10,
        }
    }
}

/// Location resolution errors.
#[derive(Debug, Error)]
pub enum LocationError {
    #[error("Network error: {0}")]
    Network(String),
    #[error("Location not found: '{0}'")]
    NotFound(String),
    #[error("Invalid geocoder response: {0}")]
    InvalidResponse(String),
    #[error("Search query '{0}' is too short (minimum 3 characters)")]
    QueryTooShort(String),
}
