// src/geo/nominatim.rs
use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

use super::{Coordinates, GeoResolver};

pub const NOMINATIM_BASE: &str = "https://nominatim.openstreetmap.org";

#[derive(Debug, Deserialize)]
struct ReverseResult {
    #[serde(default)]
    address: Address,
}

#[derive(Debug, Default, Deserialize)]
struct Address {
    city: Option<String>,
    town: Option<String>,
    village: Option<String>,
    county: Option<String>,
    state: Option<String>,
    country: Option<String>,
}

impl Address {
    /// Most specific locality, then `", country"` when known.
    fn place_name(self) -> Option<String> {
        let area = [self.city, self.town, self.village, self.county, self.state]
            .into_iter()
            .flatten()
            .map(|s| s.trim().to_string())
            .find(|s| !s.is_empty())?;
        match self.country.map(|c| c.trim().to_string()) {
            Some(c) if !c.is_empty() => Some(format!("{area}, {c}")),
            _ => Some(area),
        }
    }
}

#[derive(Debug, Deserialize)]
struct SearchResult {
    lat: String,
    lon: String,
}

/// OpenStreetMap Nominatim over HTTPS.
pub struct NominatimResolver {
    client: reqwest::Client,
    base_url: String,
}

impl NominatimResolver {
    pub fn new() -> Result<Self> {
        Self::with_base_url(NOMINATIM_BASE)
    }

    pub fn with_base_url(base_url: &str) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent("news-credibility-analyzer/0.1")
            .connect_timeout(Duration::from_secs(3))
            .timeout(Duration::from_secs(5))
            .build()
            .context("building nominatim http client")?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl GeoResolver for NominatimResolver {
    async fn reverse(&self, at: Coordinates) -> Result<String> {
        let lat = at.lat.to_string();
        let lon = at.lng.to_string();
        let res: ReverseResult = self
            .client
            .get(format!("{}/reverse", self.base_url))
            .query(&[("lat", lat.as_str()), ("lon", lon.as_str()), ("format", "json")])
            .send()
            .await
            .context("nominatim reverse get()")?
            .error_for_status()?
            .json()
            .await
            .context("nominatim reverse json")?;

        res.address
            .place_name()
            .ok_or_else(|| anyhow!("no locality for ({:.4}, {:.4})", at.lat, at.lng))
    }

    async fn forward(&self, place: &str) -> Result<Coordinates> {
        if place.len() > 200 {
            anyhow::bail!("place name too long (max 200 chars)");
        }
        let results: Vec<SearchResult> = self
            .client
            .get(format!("{}/search", self.base_url))
            .query(&[("q", place), ("format", "json"), ("limit", "1")])
            .send()
            .await
            .context("nominatim search get()")?
            .error_for_status()?
            .json()
            .await
            .context("nominatim search json")?;

        let first = results
            .into_iter()
            .next()
            .ok_or_else(|| anyhow!("no geocoding results for '{place}'"))?;
        let lat: f64 = first.lat.parse()?;
        let lng: f64 = first.lon.parse()?;
        Coordinates::new(lat, lng).map_err(|e| anyhow!(e))
    }

    fn name(&self) -> &'static str {
        "nominatim"
    }
}
