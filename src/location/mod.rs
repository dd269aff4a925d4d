//! Delivery-location subsystem.
//!
//! Forward and reverse geocoding through Nominatim, a local file cache,
//! and a built-in list of popular localities with fuzzy matching for
//! offline use.

pub mod cache;
pub mod providers;
pub mod resolver;
pub mod types;

pub use providers::{builtin_locality_list, LocalityInfo};
pub use resolver::LocationResolver;
pub use types::{LocationError, LocationSource, ResolveOptions, ResolvedLocation};
