//! An in-memory [LocationStore], useful for tests and for running searches
//! without a database
use crate::{
    error::{Error, Result},
    geo::BoundingBox,
    location::{Location, LocationStore, NewLocation},
};
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::RwLock;

#[derive(Debug, Default)]
pub struct MemoryStore {
    locations: RwLock<Vec<Location>>,
    queries: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-populated with the given locations. Their ids are
    /// kept as they are.
    pub fn with_locations<I: IntoIterator<Item = Location>>(locations: I) -> Self {
        Self {
            locations: RwLock::new(locations.into_iter().collect()),
            queries: AtomicUsize::new(0),
        }
    }

    /// The number of read queries that have been issued against this store
    pub fn query_count(&self) -> usize {
        self.queries.load(Ordering::Relaxed)
    }

    fn record_query(&self) {
        self.queries.fetch_add(1, Ordering::Relaxed);
    }
}

#[async_trait]
impl LocationStore for MemoryStore {
    async fn insert(&self, location: &NewLocation) -> Result<i64> {
        location.validate()?;
        let mut locations = self.locations.write().await;
        let id = locations.iter().map(|l| l.id).max().unwrap_or(0) + 1;
        locations.push(Location {
            id,
            name: location.name.clone(),
            address: location.address.clone(),
            latitude: location.latitude,
            longitude: location.longitude,
            category: location.category.clone(),
        });
        Ok(id)
    }

    async fn query_by_category_and_bounding_box(
        &self,
        category: &str,
        bbox: &BoundingBox,
    ) -> Result<Vec<Location>> {
        self.record_query();
        Ok(self
            .locations
            .read()
            .await
            .iter()
            .filter(|l| l.category == category && bbox.contains(&l.coordinate()))
            .cloned()
            .collect())
    }

    async fn query_by_category(&self, category: &str) -> Result<Vec<Location>> {
        self.record_query();
        let mut found: Vec<Location> = self
            .locations
            .read()
            .await
            .iter()
            .filter(|l| l.category == category)
            .cloned()
            .collect();
        found.sort_by_key(|l| l.id);
        Ok(found)
    }

    async fn get_by_id(&self, id: i64) -> Result<Location> {
        self.record_query();
        self.locations
            .read()
            .await
            .iter()
            .find(|l| l.id == id)
            .cloned()
            .ok_or_else(|| Error::NotFound(format!("location {id}")))
    }
}
