use crate::catalog::Catalog;
use crate::config::VendorlyConfig;
use crate::location::LocationResolver;

pub struct AppState {
    pub catalog: Catalog,
    pub config: VendorlyConfig,
    pub resolver: LocationResolver,
}

impl AppState {
    pub fn new(catalog: Catalog, config: VendorlyConfig, resolver: LocationResolver) -> Self {
        Self {
            catalog,
            config,
            resolver,
        }
    }
}
