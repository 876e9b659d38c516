// src/geo/mod.rs
//! Place-name resolution for the location pipeline.

pub mod cache;
pub mod nominatim;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::error::ServiceError;

pub use cache::CachedGeoResolver;
pub use nominatim::NominatimResolver;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinates {
    /// Latitude in [-90, 90], longitude in [-180, 180], both finite.
    pub fn new(lat: f64, lng: f64) -> Result<Self, ServiceError> {
        if !lat.is_finite() || !(-90.0..=90.0).contains(&lat) {
            return Err(ServiceError::invalid(format!(
                "latitude must be within [-90, 90], got {lat}"
            )));
        }
        if !lng.is_finite() || !(-180.0..=180.0).contains(&lng) {
            return Err(ServiceError::invalid(format!(
                "longitude must be within [-180, 180], got {lng}"
            )));
        }
        Ok(Self { lat, lng })
    }

    /// Label used when reverse resolution fails.
    pub fn fallback_label(&self) -> String {
        format!("Location ({:.2}, {:.2})", self.lat, self.lng)
    }
}

#[async_trait::async_trait]
pub trait GeoResolver: Send + Sync {
    /// Coordinates to a human place name, e.g. "Chennai, India".
    async fn reverse(&self, at: Coordinates) -> Result<String>;
    /// Place name to coordinates.
    async fn forward(&self, place: &str) -> Result<Coordinates>;
    fn name(&self) -> &'static str;
}
