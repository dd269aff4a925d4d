//! File-based location cache at ~/.vendorly/cache.json.
//!
//! TTL: 30 days. Case-insensitive keys. Reverse lookups are keyed by
//! coordinates rounded to four decimals (about 11 m).

use super::types::{LocationSource, ResolvedLocation};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

const CACHE_TTL_MS: i64 = 30 * 24 * 3600 * 1000; // 30 days in ms

#[derive(Serialize, Deserialize, Clone)]
struct CacheEntry {
    location: ResolvedLocation,
    timestamp: i64,
}

impl CacheEntry {
    fn is_fresh(&self, now: i64) -> bool {
        now - self.timestamp <= CACHE_TTL_MS
    }
}

/// The location cache.
pub struct LocationCache {
    path: PathBuf,
    entries: HashMap<String, CacheEntry>,
}

impl LocationCache {
    /// Load cache from the default location (~/.vendorly/cache.json).
    pub fn load() -> Self {
        Self::load_from(Self::default_path())
    }

    /// Load cache from a specific path.
    pub fn load_from(path: PathBuf) -> Self {
        let entries = Self::read_file(&path).unwrap_or_default();
        Self { path, entries }
    }

    pub fn default_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".vendorly")
            .join("cache.json")
    }

    fn read_file(path: &Path) -> Option<HashMap<String, CacheEntry>> {
        let data = fs::read_to_string(path).ok()?;
        match serde_json::from_str(&data) {
            Ok(entries) => Some(entries),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "ignoring unreadable location cache");
                None
            }
        }
    }

    pub fn coords_key(lat: f64, lng: f64) -> String {
        format!("@{:.4},{:.4}", lat, lng)
    }

    /// Look up a query in the cache. Returns None if missing or expired.
    pub fn get(&self, query: &str) -> Option<ResolvedLocation> {
        let entry = self.entries.get(&query.trim().to_lowercase())?;
        if !entry.is_fresh(chrono::Utc::now().timestamp_millis()) {
            return None;
        }
        Some(ResolvedLocation {
            source: LocationSource::Cache,
            ..entry.location.clone()
        })
    }

    /// The most recently stored location (fallback for reverse lookups).
    pub fn most_recent(&self) -> Option<ResolvedLocation> {
        let now = chrono::Utc::now().timestamp_millis();
        self.entries
            .values()
            .filter(|e| e.is_fresh(now))
            .max_by_key(|e| e.timestamp)
            .map(|e| ResolvedLocation {
                source: LocationSource::Cache,
                ..e.location.clone()
            })
    }

    /// Store under `query` and under the resolved name, then persist.
    pub fn put_with_key(&mut self, query: &str, resolved: &ResolvedLocation) {
        let entry = CacheEntry {
            location: resolved.clone(),
            timestamp: chrono::Utc::now().timestamp_millis(),
        };
        let key = query.trim().to_lowercase();
        let name_key = resolved.name.to_lowercase();
        if name_key != key && !name_key.is_empty() {
            self.entries.insert(name_key, entry.clone());
        }
        self.entries.insert(key, entry);
        self.persist();
    }

    pub fn put(&mut self, resolved: &ResolvedLocation) {
        let name = resolved.name.clone();
        self.put_with_key(&name, resolved);
    }

    /// Drop expired entries and write the rest back to disk.
    fn persist(&mut self) {
        let now = chrono::Utc::now().timestamp_millis();
        self.entries.retain(|_, e| e.is_fresh(now));
        if let Some(parent) = self.path.parent() {
            let _ = fs::create_dir_all(parent);
        }
        match serde_json::to_string_pretty(&self.entries) {
            Ok(json) => {
                if let Err(e) = fs::write(&self.path, json) {
                    tracing::warn!(path = %self.path.display(), error = %e, "failed to write location cache");
                }
            }
            Err(e) => tracing::warn!(error = %e, "failed to serialize location cache"),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn test_cache() -> (LocationCache, TempDir) {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("cache.json");
        (LocationCache::load_from(path), dir)
    }

    fn location(name: &str, lat: f64, lng: f64) -> ResolvedLocation {
        ResolvedLocation {
            name: name.into(),
            area: name.into(),
            city: "Mumbai".into(),
            state: "Maharashtra".into(),
            postal_code: None,
            lat,
            lng,
            source: LocationSource::Nominatim,
            display_name: None,
        }
    }

    #[test]
    fn test_cache_put_get() {
        let (mut cache, _dir) = test_cache();
        cache.put(&location("Bandra West", 19.0596, 72.8295));

        let result = cache.get("bandra west").unwrap();
        assert_eq!(result.name, "Bandra West");
        assert_eq!(result.source, LocationSource::Cache);
        assert!((result.lat - 19.0596).abs() < 1e-9);
    }

    #[test]
    fn test_cache_case_insensitive() {
        let (mut cache, _dir) = test_cache();
        cache.put(&location("Lower Parel", 18.998, 72.8311));
        assert!(cache.get("LOWER PAREL").is_some());
        assert!(cache.get("  lower parel ").is_some());
    }

    #[test]
    fn test_cache_miss() {
        let (cache, _dir) = test_cache();
        assert!(cache.get("nonexistent").is_none());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_cache_persistence() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("cache.json");
        {
            let mut cache = LocationCache::load_from(path.clone());
            cache.put(&location("Powai", 19.1176, 72.906));
        }
        let cache2 = LocationCache::load_from(path);
        assert_eq!(cache2.get("powai").unwrap().name, "Powai");
    }

    #[test]
    fn test_expired_entry_ignored() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("cache.json");
        let json = r#"{
            "juhu": {
                "location": {
                    "name": "Juhu", "lat": 19.1075, "lng": 72.8263, "source": "nominatim"
                },
                "timestamp": 0
            }
        }"#;
        fs::write(&path, json).unwrap();

        let cache = LocationCache::load_from(path);
        assert_eq!(cache.len(), 1);
        assert!(cache.get("juhu").is_none());
        assert!(cache.most_recent().is_none());
    }

    #[test]
    fn test_expired_entries_pruned_on_write() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("cache.json");
        let json = r#"{
            "juhu": {
                "location": {
                    "name": "Juhu", "lat": 19.1075, "lng": 72.8263, "source": "nominatim"
                },
                "timestamp": 0
            }
        }"#;
        fs::write(&path, json).unwrap();

        let mut cache = LocationCache::load_from(path.clone());
        assert_eq!(cache.len(), 1);
        cache.put(&location("Powai", 19.1176, 72.906));
        assert_eq!(cache.len(), 1);

        let reloaded = LocationCache::load_from(path.clone());
        assert_eq!(reloaded.len(), 1);
        assert!(reloaded.get("powai").is_some());
        assert!(!fs::read_to_string(&path).unwrap().contains("Juhu"));
    }

    #[test]
    fn test_corrupt_file_starts_empty() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("cache.json");
        fs::write(&path, "{not json").unwrap();
        assert!(LocationCache::load_from(path).is_empty());
    }

    #[test]
    fn test_most_recent() {
        let (mut cache, _dir) = test_cache();
        cache.put(&location("First", 0.0, 0.0));
        std::thread::sleep(std::time::Duration::from_millis(10));
        cache.put(&location("Second", 1.0, 1.0));
        assert_eq!(cache.most_recent().unwrap().name, "Second");
    }

    #[test]
    fn test_put_with_key() {
        let (mut cache, _dir) = test_cache();
        cache.put_with_key("andheri", &location("Andheri West", 19.1356, 72.8262));
        assert!(cache.get("andheri").is_some());
        assert!(cache.get("andheri west").is_some());
    }

    #[test]
    fn test_coords_key() {
        assert_eq!(LocationCache::coords_key(19.13561, 72.82619), "@19.1356,72.8262");
    }
}
