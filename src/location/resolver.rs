//! Location resolver: orchestrates the fallback chain.
//!
//! Forward flow:  Cache → Nominatim → built-in localities → error
//! Reverse flow:  Cache → Nominatim → nearest built-in locality → bare coordinates
//!
//! Lookups take `&self`, so one resolver can be shared across threads.
//! Only cache reads and writes hold the lock; network calls run unlocked.

use std::sync::{Mutex, MutexGuard};

use super::cache::LocationCache;
use super::providers;
use super::types::{LocationError, LocationSource, ResolveOptions, ResolvedLocation};
use crate::geo::format_coords;

/// Reverse lookups snap to a built-in locality only within this radius.
const BUILTIN_SNAP_KM: f64 = 25.0;

/// The location resolver with its fallback pipeline.
pub struct LocationResolver {
    cache: Mutex<LocationCache>,
    offline: bool,
    base_url: String,
    options: ResolveOptions,
}

impl Default for LocationResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl LocationResolver {
    pub fn new() -> Self {
        Self::with_cache(LocationCache::load())
    }

    /// Create a resolver with a specific cache.
    pub fn with_cache(cache: LocationCache) -> Self {
        Self {
            cache: Mutex::new(cache),
            offline: false,
            base_url: providers::NOMINATIM_URL.to_string(),
            options: ResolveOptions::default(),
        }
    }

    /// Set offline mode: skip network calls.
    pub fn set_offline(&mut self, offline: bool) {
        self.offline = offline;
    }

    /// Point at a self-hosted Nominatim instance.
    pub fn set_base_url(&mut self, url: &str) {
        self.base_url = url.trim_end_matches('/').to_string();
    }

    pub fn set_options(&mut self, options: ResolveOptions) {
        self.options = options;
    }

    /// The cache is rewritten whole on every put, so a poisoned lock still
    /// guards a consistent map.
    fn cache(&self) -> MutexGuard<'_, LocationCache> {
        self.cache.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Resolve an area or city name to a single location.
    pub fn resolve(&self, query: &str) -> Result<ResolvedLocation, LocationError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(LocationError::NotFound(String::new()));
        }

        let cached = self.cache().get(query);
        if let Some(loc) = cached {
            tracing::debug!(query, name = %loc.name, "location cache hit");
            return Ok(loc);
        }

        if !self.offline {
            match providers::nominatim_search(&self.base_url, query, self.options.country.as_deref(), 1) {
                Ok(mut found) if !found.is_empty() => {
                    let loc = found.swap_remove(0);
                    self.cache().put_with_key(query, &loc);
                    return Ok(loc);
                }
                Ok(_) => {}
                Err(e) => tracing::debug!(query, error = %e, "nominatim search failed, trying built-in"),
            }
        }

        providers::builtin_lookup(query).ok_or_else(|| LocationError::NotFound(query.to_string()))
    }

    /// Suggestions for a location search box.
    pub fn search(&self, query: &str) -> Result<Vec<ResolvedLocation>, LocationError> {
        let query = query.trim();
        if query.chars().count() < 3 {
            return Err(LocationError::QueryTooShort(query.to_string()));
        }

        if !self.offline {
            match providers::nominatim_search(
                &self.base_url,
                query,
                self.options.country.as_deref(),
                self.options.limit,
            ) {
                Ok(found) => return Ok(found),
                Err(e) => tracing::debug!(query, error = %e, "nominatim search failed, trying built-in"),
            }
        }

        providers::builtin_lookup(query)
            .map(|l| vec![l])
            .ok_or_else(|| LocationError::NotFound(query.to_string()))
    }

    /// Describe a point. Always yields a location; without a geocoder or a
    /// nearby built-in locality it is labelled with its coordinates.
    pub fn reverse(&self, lat: f64, lng: f64) -> ResolvedLocation {
        let key = LocationCache::coords_key(lat, lng);
        let cached = self.cache().get(&key);
        if let Some(loc) = cached {
            return loc;
        }

        if !self.offline {
            match providers::nominatim_reverse(&self.base_url, lat, lng) {
                Ok(loc) => {
                    self.cache().put_with_key(&key, &loc);
                    return loc;
                }
                Err(e) => tracing::debug!(lat, lng, error = %e, "nominatim reverse failed"),
            }
        }

        providers::nearest_builtin(lat, lng, BUILTIN_SNAP_KM)
            .unwrap_or_else(|| Self::from_manual(lat, lng))
    }

    /// Last location the user resolved, if still fresh.
    pub fn last_known(&self) -> Option<ResolvedLocation> {
        self.cache().most_recent()
    }

    /// Create a ResolvedLocation from raw coordinates.
    pub fn from_manual(lat: f64, lng: f64) -> ResolvedLocation {
        ResolvedLocation {
            name: format_coords(lat, lng),
            area: String::new(),
            city: String::new(),
            state: String::new(),
            postal_code: None,
            lat,
            lng,
            source: LocationSource::Manual,
            display_name: None,
        }
    }
}
