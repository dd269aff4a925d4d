use thiserror::Error;

use crate::location::LocationError;

#[derive(Error, Debug)]
pub enum VendorlyError {
    #[error("Invalid coordinates ({lat}, {lng}). Lat: -90..90, Lng: -180..180")]
    InvalidCoordinates { lat: f64, lng: f64 },

    #[error("Unknown vendor '{0}'")]
    UnknownVendor(String),

    #[error("Unknown product '{0}'")]
    UnknownProduct(String),

    #[error("Invalid quantity {quantity} for product '{product_id}'")]
    InvalidQuantity { product_id: String, quantity: u32 },

    #[error("Invalid search radius {0} km. Use a finite value of 0 or more")]
    InvalidRadius(f64),

    #[error("{0}")]
    Usage(String),

    #[error(transparent)]
    Location(#[from] LocationError),

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, VendorlyError>;
