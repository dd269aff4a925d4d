pub mod cart;
pub mod catalog;
pub mod comparison;
pub mod config;
pub mod error;
pub mod geo;
pub mod location;
pub mod logging;
pub mod proximity;
pub mod server;

pub use error::{Result, VendorlyError};
