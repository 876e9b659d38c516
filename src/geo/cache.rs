// src/geo/cache.rs
use anyhow::Result;
use async_trait::async_trait;
use metrics::counter;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::Instant;

use super::{Coordinates, GeoResolver};

type CellKey = (i64, i64);

/// Read-through reverse-geocode cache keyed by rounded coordinates.
/// Only successful lookups are stored; a zero TTL disables caching.
pub struct CachedGeoResolver {
    inner: Arc<dyn GeoResolver>,
    ttl: Duration,
    scale: f64,
    entries: Mutex<HashMap<CellKey, (Instant, String)>>,
}

impl CachedGeoResolver {
    pub fn new(inner: Arc<dyn GeoResolver>, ttl: Duration, precision: u32) -> Self {
        Self {
            inner,
            ttl,
            scale: 10f64.powi(precision as i32),
            entries: Mutex::new(HashMap::new()),
        }
    }

    fn key(&self, at: Coordinates) -> CellKey {
        (
            (at.lat * self.scale).round() as i64,
            (at.lng * self.scale).round() as i64,
        )
    }

    fn lookup(&self, key: CellKey, now: Instant) -> Option<String> {
        let mut g = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        match g.get(&key) {
            Some((at, name)) if now.duration_since(*at) < self.ttl => Some(name.clone()),
            Some(_) => {
                g.remove(&key);
                None
            }
            None => None,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.lock().map(|g| g.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl GeoResolver for CachedGeoResolver {
    async fn reverse(&self, at: Coordinates) -> Result<String> {
        if self.ttl.is_zero() {
            return self.inner.reverse(at).await;
        }
        let key = self.key(at);
        if let Some(hit) = self.lookup(key, Instant::now()) {
            counter!("geo_cache_hits_total").increment(1);
            return Ok(hit);
        }

        let name = self.inner.reverse(at).await?;
        let now = Instant::now();
        let mut g = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        // expired cells are never looked up again once the user pans away
        g.retain(|_, (stored, _)| now.duration_since(*stored) < self.ttl);
        g.insert(key, (now, name.clone()));
        Ok(name)
    }

    async fn forward(&self, place: &str) -> Result<Coordinates> {
        self.inner.forward(place).await
    }

    fn name(&self) -> &'static str {
        self.inner.name()
    }
}
