//! Database layer (Firestore or in-memory).

pub mod firestore;
pub mod memory;

pub use memory::MemoryStore;

use crate::error::AppError;
use crate::models::{Route, Trip};
use crate::time_utils::format_utc_rfc3339;
use serde::{Deserialize, Serialize};

/// Collection names as constants.
pub mod collections {
    pub const TRIPS: &str = "trips";
}

/// Stored trip document with ownership metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TripRecord {
    /// Subject of the JWT that owns the trip
    pub owner: String,
    pub trip: Trip,
    /// Last write (RFC3339)
    pub updated_at: String,
}

/// Outcome of a replace-by-key route write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RouteWrite {
    /// `true` when an existing route with the same key was replaced
    pub replaced: bool,
    /// Number of routes in the trip after the write
    pub route_count: usize,
}

/// Document ID for a user's trip. Both parts are escaped so `/` can't leak
/// into the Firestore path.
pub fn record_id(owner: &str, trip_id: &str) -> String {
    format!(
        "{}_{}",
        urlencoding::encode(owner),
        urlencoding::encode(trip_id)
    )
}

/// Trip storage.
#[derive(Clone)]
pub struct TripDb {
    backend: Backend,
}

#[derive(Clone)]
enum Backend {
    Firestore(::firestore::FirestoreDb),
    Memory(MemoryStore),
}

impl TripDb {
    /// Connect to Firestore.
    ///
    /// For local development with emulator, set FIRESTORE_EMULATOR_HOST.
    pub async fn connect(project_id: &str) -> Result<Self, AppError> {
        let client = firestore::connect(project_id).await?;
        Ok(Self {
            backend: Backend::Firestore(client),
        })
    }

    /// Process-local storage (development and tests).
    pub fn in_memory() -> Self {
        Self {
            backend: Backend::Memory(MemoryStore::default()),
        }
    }

    async fn get_record(&self, id: &str) -> Result<Option<TripRecord>, AppError> {
        match &self.backend {
            Backend::Firestore(client) => firestore::get_record(client, id).await,
            Backend::Memory(store) => Ok(store.get(id)),
        }
    }

    async fn put_record(&self, id: &str, record: TripRecord) -> Result<(), AppError> {
        match &self.backend {
            Backend::Firestore(client) => firestore::put_record(client, id, &record).await,
            Backend::Memory(store) => {
                store.put(id, record);
                Ok(())
            }
        }
    }

    // ─── Trip Operations ─────────────────────────────────────────

    /// Get a trip owned by `owner`.
    pub async fn get_trip(&self, owner: &str, trip_id: &str) -> Result<Option<Trip>, AppError> {
        Ok(self
            .get_record(&record_id(owner, trip_id))
            .await?
            .map(|record| record.trip))
    }

    /// Create or overwrite a trip.
    pub async fn put_trip(&self, owner: &str, trip: &Trip) -> Result<(), AppError> {
        let record = TripRecord {
            owner: owner.to_string(),
            trip: trip.clone(),
            updated_at: format_utc_rfc3339(chrono::Utc::now()),
        };
        self.put_record(&record_id(owner, &trip.id), record).await
    }

    // ─── Route Operations ────────────────────────────────────────

    /// Replace a route by key, appending it only if the key is new.
    ///
    /// This is a plain read-modify-write: concurrent writers to the same trip
    /// are last-write-wins.
    pub async fn replace_route(
        &self,
        owner: &str,
        trip_id: &str,
        route: Route,
    ) -> Result<RouteWrite, AppError> {
        let mut trip = self
            .get_trip(owner, trip_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Trip {}", trip_id)))?;

        let key = route.key.clone();
        let replaced = trip.upsert_route(route).is_some();
        let route_count = trip.routes.len();
        self.put_trip(owner, &trip).await?;

        tracing::debug!(trip_id, key = %key, replaced, route_count, "Route stored");
        Ok(RouteWrite {
            replaced,
            route_count,
        })
    }

    /// Delete a route by key. Returns `false` if the trip or route is absent.
    pub async fn delete_route(&self, owner: &str, trip_id: &str, key: &str) -> Result<bool, AppError> {
        let Some(mut trip) = self.get_trip(owner, trip_id).await? else {
            return Ok(false);
        };

        if trip.remove_route(key).is_none() {
            return Ok(false);
        }

        self.put_trip(owner, &trip).await?;
        tracing::debug!(trip_id, key, "Route deleted");
        Ok(true)
    }
}
