//! TOML configuration, read from `--config` or ~/.vendorly/config.toml.
//!
//! Every section and key is optional; missing values take the
//! storefront defaults (10 km search radius, Asia/Kolkata time).

use chrono::{NaiveDateTime, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Result, VendorlyError};
use crate::location::cache::LocationCache;
use crate::location::providers::NOMINATIM_URL;
use crate::location::{LocationResolver, ResolveOptions};
use crate::proximity::{check_radius, DeliveryParams, LocationFilter};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct VendorlyConfig {
    pub search: SearchConfig,
    pub delivery: DeliveryParams,
    pub server: ServerConfig,
    pub location: LocationConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    pub radius_km: f64,
    pub min_rating: f64,
    pub max_delivery_fee: f64,
    pub similarity_threshold: f64,
    /// IANA zone used to decide whether vendors are open.
    pub timezone: String,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            radius_km: 10.0,
            min_rating: 0.0,
            max_delivery_fee: 100.0,
            similarity_threshold: crate::comparison::DEFAULT_SIMILARITY_THRESHOLD,
            timezone: "Asia/Kolkata".into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Emit JSON log lines instead of the compact format.
    pub json_logs: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".into(),
            port: 3000,
            json_logs: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LocationConfig {
    pub offline: bool,
    pub nominatim_url: String,
    /// Country filter for forward geocoding; empty disables it.
    pub country: String,
    pub cache_path: Option<PathBuf>,
    /// JSON catalog export. The demo catalog is used when unset.
    pub catalog_path: Option<PathBuf>,
}

impl Default for LocationConfig {
    fn default() -> Self {
        Self {
            offline: false,
            nominatim_url: NOMINATIM_URL.into(),
            country: "IN".into(),
            cache_path: None,
            catalog_path: None,
        }
    }
}

impl VendorlyConfig {
    pub fn default_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".vendorly")
            .join("config.toml")
    }

    /// Load from an explicit path (which must exist), or from the default
    /// path if present, or fall back to defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config = match path {
            Some(p) => Self::from_file(p)?,
            None => {
                let p = Self::default_path();
                if p.exists() {
                    Self::from_file(&p)?
                } else {
                    Self::default()
                }
            }
        };
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let data = fs::read_to_string(path)?;
        let config = Self::from_toml(&data)?;
        tracing::debug!(path = %path.display(), "loaded config");
        Ok(config)
    }

    pub fn from_toml(data: &str) -> Result<Self> {
        toml::from_str(data).map_err(|e| VendorlyError::Config { message: e.to_string() })
    }

    pub fn validate(&self) -> Result<()> {
        let fail = |message: String| Err(VendorlyError::Config { message });
        check_radius(self.search.radius_km)?;
        if !(0.0..=1.0).contains(&self.search.similarity_threshold) {
            return fail("search.similarity_threshold must be between 0 and 1".into());
        }
        if !(self.delivery.speed_km_per_minute > 0.0) {
            return fail("delivery.speed_km_per_minute must be positive".into());
        }
        if self.delivery.base_prep_minutes < 0.0 {
            return fail("delivery.base_prep_minutes must not be negative".into());
        }
        self.timezone()?;
        Ok(())
    }

    pub fn timezone(&self) -> Result<Tz> {
        self.search.timezone.parse::<Tz>().map_err(|_| VendorlyError::Config {
            message: format!(
                "Unknown timezone '{}'. Use IANA format (e.g. Asia/Kolkata).",
                self.search.timezone
            ),
        })
    }

    /// Current wall-clock time in the configured zone.
    pub fn local_now(&self) -> Result<NaiveDateTime> {
        Ok(Utc::now().with_timezone(&self.timezone()?).naive_local())
    }

    /// Search-page filter seeded from `[search]`.
    pub fn default_filter(&self) -> LocationFilter {
        LocationFilter {
            radius_km: self.search.radius_km,
            min_rating: self.search.min_rating,
            max_delivery_fee: self.search.max_delivery_fee,
            ..LocationFilter::default()
        }
    }

    pub fn resolver(&self) -> LocationResolver {
        let cache = match &self.location.cache_path {
            Some(p) => LocationCache::load_from(p.clone()),
            None => LocationCache::load(),
        };
        let mut resolver = LocationResolver::with_cache(cache);
        resolver.set_offline(self.location.offline);
        resolver.set_base_url(&self.location.nominatim_url);
        resolver.set_options(ResolveOptions {
            country: Some(self.location.country.clone()).filter(|c| !c.is_empty()),
            ..ResolveOptions::default()
        });
        resolver
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = VendorlyConfig::default();
        assert_eq!(config.search.radius_km, 10.0);
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.location.country, "IN");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml() {
        let config = VendorlyConfig::from_toml(
            r#"
            [search]
            radius_km = 5.0

            [delivery]
            base_prep_minutes = 10.0

            [location]
            offline = true
            "#,
        )
        .unwrap();
        assert_eq!(config.search.radius_km, 5.0);
        assert_eq!(config.search.timezone, "Asia/Kolkata");
        assert_eq!(config.delivery.base_prep_minutes, 10.0);
        assert_eq!(config.delivery.speed_km_per_minute, 0.2);
        assert!(config.location.offline);
        assert_eq!(config.default_filter().radius_km, 5.0);
    }

    #[test]
    fn test_invalid_values() {
        let bad_radius = VendorlyConfig::from_toml("[search]\nradius_km = -2.0\n").unwrap();
        assert!(matches!(bad_radius.validate(), Err(VendorlyError::InvalidRadius(_))));
        let zero_radius = VendorlyConfig::from_toml("[search]\nradius_km = 0.0\n").unwrap();
        assert!(zero_radius.validate().is_ok());

        let bad_tz = VendorlyConfig::from_toml("[search]\ntimezone = \"Mars/Olympus\"\n").unwrap();
        assert!(matches!(bad_tz.validate(), Err(VendorlyError::Config { .. })));

        let bad_speed = VendorlyConfig::from_toml("[delivery]\nspeed_km_per_minute = 0.0\n").unwrap();
        assert!(bad_speed.validate().is_err());
    }

    #[test]
    fn test_malformed_toml() {
        assert!(matches!(
            VendorlyConfig::from_toml("[search\nradius_km = "),
            Err(VendorlyError::Config { .. })
        ));
    }

    #[test]
    fn test_load_explicit_path() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("vendorly.toml");
        fs::write(&path, "[server]\nport = 8088\n").unwrap();
        let config = VendorlyConfig::load(Some(&path)).unwrap();
        assert_eq!(config.server.port, 8088);

        let missing = dir.path().join("missing.toml");
        assert!(matches!(VendorlyConfig::load(Some(&missing)), Err(VendorlyError::Io(_))));
    }

    #[test]
    fn test_timezone() {
        let config = VendorlyConfig::default();
        assert_eq!(config.timezone().unwrap(), chrono_tz::Asia::Kolkata);
        assert!(config.local_now().is_ok());
    }
}
