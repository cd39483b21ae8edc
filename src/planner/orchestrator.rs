// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Optimistic route saving.
//!
//! A submitted route shows up in the trip view at once with elevation
//! `Pending`, is stored, and then gets its elevation filled in by a background
//! task. Every view update swaps the routes vector wholesale so observers of
//! the watch channel always see a consistent snapshot.
//!
//! Storage writes go out one at a time and always carry the route as the view
//! shows it when the write is sent, so a slow write can't land a stale
//! placeholder on top of a settled elevation.

use crate::models::{ElevationStatus, Route, RouteElevation, Trip};
use crate::planner::{ElevationApi, PlannerError, RouteRepository};
use std::sync::Arc;
use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;

/// Owns the trip view and the save pipeline for one trip.
pub struct SaveOrchestrator<E, R> {
    trip_id: String,
    view: Arc<watch::Sender<Trip>>,
    write_lock: Arc<Mutex<()>>,
    elevation: Arc<E>,
    repository: Arc<R>,
}

/// Handle to the elevation computation started by [`SaveOrchestrator::submit`].
#[derive(Debug)]
pub struct PendingElevation {
    key: String,
    handle: JoinHandle<ElevationStatus>,
}

impl PendingElevation {
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Wait for the computation to settle.
    pub async fn settled(self) -> ElevationStatus {
        match self.handle.await {
            Ok(status) => status,
            Err(e) => {
                tracing::error!(key = %self.key, error = %e, "Elevation task did not complete");
                ElevationStatus::Unavailable
            }
        }
    }
}

impl<E: ElevationApi, R: RouteRepository> SaveOrchestrator<E, R> {
    /// Take ownership of a freshly loaded trip.
    ///
    /// Nothing can be in flight for a trip we just loaded, so any `Pending`
    /// placeholder in it is left over from an interrupted session.
    pub fn new(mut trip: Trip, elevation: Arc<E>, repository: Arc<R>) -> Self {
        let settled = trip.settle_pending();
        if settled > 0 {
            tracing::info!(
                trip_id = %trip.id,
                settled,
                "Cleared stale elevation placeholders"
            );
        }

        let trip_id = trip.id.clone();
        let (view, _) = watch::channel(trip);

        Self {
            trip_id,
            view: Arc::new(view),
            write_lock: Arc::new(Mutex::new(())),
            elevation,
            repository,
        }
    }

    pub fn trip_id(&self) -> &str {
        &self.trip_id
    }

    /// Snapshot of the current trip view.
    pub fn trip(&self) -> Trip {
        self.view.borrow().clone()
    }

    /// Observe trip view updates.
    pub fn subscribe(&self) -> watch::Receiver<Trip> {
        self.view.subscribe()
    }

    /// Save a route and start computing its elevation.
    ///
    /// Returns once the route itself is stored. If storing fails the view is
    /// rolled back and no elevation work is started.
    pub async fn submit(&self, route: Route) -> Result<PendingElevation, PlannerError> {
        if route.waypoints.len() < 2 {
            return Err(PlannerError::TooFewWaypoints {
                count: route.waypoints.len(),
            });
        }

        let pending = route.with_elevation(ElevationStatus::Pending);
        let key = pending.key.clone();

        let mut previous = None;
        self.view
            .send_modify(|trip| previous = trip.upsert_route(pending.clone()));

        let guard = self.write_lock.lock().await;
        let current = current_route(&self.view, &key)
            .ok_or_else(|| PlannerError::UnknownRoute(key.clone()))?;

        if let Err(e) = self.repository.replace_route(&self.trip_id, &current).await {
            tracing::warn!(trip_id = %self.trip_id, key = %key, error = %e, "Route save failed");
            self.view.send_modify(|trip| match previous.take() {
                Some(previous) => {
                    trip.replace_route(previous);
                }
                None => {
                    trip.remove_route(&key);
                }
            });
            return Err(e);
        }
        drop(guard);

        tracing::debug!(trip_id = %self.trip_id, key = %key, "Route saved, computing elevation");

        let handle = tokio::spawn(enrich(
            self.view.clone(),
            self.write_lock.clone(),
            self.elevation.clone(),
            self.repository.clone(),
            self.trip_id.clone(),
            pending,
        ));

        Ok(PendingElevation { key, handle })
    }

    /// Rename a stored route. Nothing else about the route changes.
    pub async fn rename_route(&self, key: &str, name: impl Into<String>) -> Result<(), PlannerError> {
        let name = name.into();
        let mut renamed = false;

        self.view.send_if_modified(|trip| {
            let Some(current) = trip.route(key) else {
                return false;
            };
            let updated = Route {
                name: name.clone(),
                ..current.clone()
            };
            renamed = trip.replace_route(updated);
            renamed
        });

        if !renamed {
            return Err(PlannerError::UnknownRoute(key.to_string()));
        }

        let _guard = self.write_lock.lock().await;
        match current_route(&self.view, key) {
            Some(route) => self.repository.replace_route(&self.trip_id, &route).await,
            // Removed while waiting; the delete already went out.
            None => Ok(()),
        }
    }

    /// Remove a route from the view and from storage.
    ///
    /// An elevation result that arrives later for this key is dropped.
    pub async fn remove_route(&self, key: &str) -> Result<(), PlannerError> {
        let mut removed = None;
        self.view.send_if_modified(|trip| {
            let index = trip.routes.iter().position(|r| r.key == key);
            removed = index.zip(trip.remove_route(key));
            removed.is_some()
        });

        let (index, route) = removed.ok_or_else(|| PlannerError::UnknownRoute(key.to_string()))?;

        let _guard = self.write_lock.lock().await;
        if let Err(e) = self.repository.delete_route(&self.trip_id, key).await {
            tracing::warn!(trip_id = %self.trip_id, key, error = %e, "Route delete failed");
            self.view.send_if_modified(|trip| {
                if trip.contains_route(key) {
                    return false;
                }
                let mut routes = trip.routes.clone();
                routes.insert(index.min(routes.len()), route);
                trip.routes = routes;
                true
            });
            return Err(e);
        }

        Ok(())
    }
}

/// Compute elevation for a stored route and reconcile the result into the view.
async fn enrich<E: ElevationApi, R: RouteRepository>(
    view: Arc<watch::Sender<Trip>>,
    write_lock: Arc<Mutex<()>>,
    elevation: Arc<E>,
    repository: Arc<R>,
    trip_id: String,
    route: Route,
) -> ElevationStatus {
    let status = match elevation.compute_profile(route.waypoints.clone()).await {
        Ok(summary) => ElevationStatus::Computed(RouteElevation::from(&summary)),
        Err(e) => {
            tracing::warn!(
                trip_id = %trip_id,
                key = %route.key,
                error = %e,
                "Saving route without elevation"
            );
            ElevationStatus::Unavailable
        }
    };

    // Only the computation for the waypoints currently shown may settle the entry.
    let applied = view.send_if_modified(|trip| {
        let updated = match trip.route(&route.key) {
            Some(current)
                if current.elevation.is_pending() && current.waypoints == route.waypoints =>
            {
                current.with_elevation(status.clone())
            }
            _ => return false,
        };
        trip.replace_route(updated)
    });

    if !applied {
        tracing::debug!(trip_id = %trip_id, key = %route.key, "Dropping stale elevation result");
        return status;
    }

    let _guard = write_lock.lock().await;
    if let Some(stored) = current_route(&view, &route.key) {
        if let Err(e) = repository.replace_route(&trip_id, &stored).await {
            // The stored copy keeps its placeholder and is cleared on next load.
            tracing::warn!(trip_id = %trip_id, key = %route.key, error = %e, "Elevation save failed");
        }
    }

    status
}

fn current_route(view: &watch::Sender<Trip>, key: &str) -> Option<Route> {
    view.borrow().route(key).cloned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Coordinate, ElevationSummary};
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Mutex as StdMutex;
    use std::time::Duration;
    use tokio::sync::Semaphore;

    /// Elevation API that waits for a permit per call.
    struct GatedElevation {
        gate: Semaphore,
        fail: AtomicBool,
    }

    impl GatedElevation {
        fn open() -> Arc<Self> {
            let api = Self::closed();
            api.gate.add_permits(1000);
            api
        }

        fn closed() -> Arc<Self> {
            Arc::new(Self {
                gate: Semaphore::new(0),
                fail: AtomicBool::new(false),
            })
        }
    }

    impl ElevationApi for GatedElevation {
        async fn compute_profile(
            &self,
            waypoints: Vec<Coordinate>,
        ) -> Result<ElevationSummary, PlannerError> {
            self.gate
                .acquire()
                .await
                .map_err(|e| PlannerError::Elevation(e.to_string()))?
                .forget();
            if self.fail.load(Ordering::SeqCst) {
                return Err(PlannerError::Elevation("HTTP 500".to_string()));
            }
            let gain = waypoints.len() as f64 * 10.0;
            Ok(ElevationSummary {
                elevation_gain: gain,
                total_ascent: gain,
                total_descent: 5.0,
                min_elevation: 100.0,
                max_elevation: 100.0 + gain,
                distance: 1000.0,
            })
        }
    }

    #[derive(Default)]
    struct MemoryRepository {
        writes: StdMutex<Vec<Route>>,
        deletes: StdMutex<Vec<String>>,
        fail: AtomicBool,
        /// Placeholder writes for a route with this name take 100 ms.
        slow_pending: StdMutex<Option<String>>,
    }

    impl MemoryRepository {
        fn writes(&self) -> Vec<Route> {
            self.writes.lock().unwrap().clone()
        }
    }

    impl RouteRepository for MemoryRepository {
        async fn replace_route(&self, _trip_id: &str, route: &Route) -> Result<(), PlannerError> {
            if self.fail.load(Ordering::SeqCst) {
                return Err(PlannerError::Persistence("HTTP 503".to_string()));
            }
            let slow = route.elevation.is_pending()
                && self.slow_pending.lock().unwrap().as_deref() == Some(route.name.as_str());
            if slow {
                tokio::time::sleep(Duration::from_millis(100)).await;
            }
            self.writes.lock().unwrap().push(route.clone());
            Ok(())
        }

        async fn delete_route(&self, _trip_id: &str, key: &str) -> Result<(), PlannerError> {
            if self.fail.load(Ordering::SeqCst) {
                return Err(PlannerError::Persistence("HTTP 503".to_string()));
            }
            self.deletes.lock().unwrap().push(key.to_string());
            Ok(())
        }
    }

    fn line(n: usize) -> Vec<Coordinate> {
        (0..n)
            .map(|i| Coordinate::new(61.0, 8.0 + i as f64 * 0.01))
            .collect()
    }

    fn orchestrator(
        trip: Trip,
        elevation: Arc<GatedElevation>,
    ) -> (SaveOrchestrator<GatedElevation, MemoryRepository>, Arc<MemoryRepository>) {
        let repository = Arc::new(MemoryRepository::default());
        (
            SaveOrchestrator::new(trip, elevation, repository.clone()),
            repository,
        )
    }

    #[tokio::test]
    async fn test_submit_shows_pending_then_computed() {
        let elevation = GatedElevation::closed();
        let (orch, repo) = orchestrator(Trip::new("t1", "Jotunheimen"), elevation.clone());

        let pending = orch.submit(Route::new("r1", "Ridge", line(3))).await.unwrap();
        assert_eq!(pending.key(), "r1");
        assert!(orch.trip().route("r1").unwrap().elevation.is_pending());
        assert!(repo.writes()[0].elevation.is_pending());

        elevation.gate.add_permits(1);
        let status = pending.settled().await;

        assert_eq!(status.gain(), Some(30.0));
        assert_eq!(orch.trip().route("r1").unwrap().elevation, status);
        let writes = repo.writes();
        assert_eq!(writes.len(), 2);
        assert_eq!(writes[1].elevation.gain(), Some(30.0));
    }

    #[tokio::test]
    async fn test_elevation_failure_settles_unavailable() {
        let elevation = GatedElevation::open();
        elevation.fail.store(true, Ordering::SeqCst);
        let (orch, repo) = orchestrator(Trip::new("t1", "Hardanger"), elevation);

        let status = orch
            .submit(Route::new("r1", "Plateau", line(2)))
            .await
            .unwrap()
            .settled()
            .await;

        assert_eq!(status, ElevationStatus::Unavailable);
        let trip = orch.trip();
        assert_eq!(trip.routes.len(), 1);
        assert_eq!(trip.routes[0].elevation, ElevationStatus::Unavailable);
        assert_eq!(repo.writes().last().unwrap().elevation, ElevationStatus::Unavailable);
    }

    #[tokio::test]
    async fn test_persistence_failure_rolls_back() {
        let elevation = GatedElevation::open();
        let (orch, repo) = orchestrator(Trip::new("t1", "Rondane"), elevation);
        repo.fail.store(true, Ordering::SeqCst);

        let err = orch
            .submit(Route::new("r1", "Loop", line(2)))
            .await
            .unwrap_err();

        assert!(matches!(err, PlannerError::Persistence(_)));
        assert!(orch.trip().routes.is_empty());
    }

    #[tokio::test]
    async fn test_failed_resave_restores_previous_route() {
        let mut trip = Trip::new("t1", "Rondane");
        trip.upsert_route(Route::new("r1", "Loop", line(2)));
        let (orch, repo) = orchestrator(trip.clone(), GatedElevation::open());
        repo.fail.store(true, Ordering::SeqCst);

        orch.submit(Route::new("r1", "Loop v2", line(4)))
            .await
            .unwrap_err();

        assert_eq!(orch.trip(), trip);
    }

    #[tokio::test]
    async fn test_late_result_after_delete_is_dropped() {
        let elevation = GatedElevation::closed();
        let (orch, repo) = orchestrator(Trip::new("t1", "Dovre"), elevation.clone());

        let pending = orch.submit(Route::new("r1", "Summit", line(3))).await.unwrap();
        orch.remove_route("r1").await.unwrap();

        elevation.gate.add_permits(1);
        pending.settled().await;

        assert!(orch.trip().routes.is_empty());
        assert_eq!(repo.writes().len(), 1);
        assert_eq!(*repo.deletes.lock().unwrap(), vec!["r1".to_string()]);
    }

    #[tokio::test]
    async fn test_late_result_for_reedited_route_is_dropped() {
        let elevation = GatedElevation::closed();
        let (orch, _repo) = orchestrator(Trip::new("t1", "Dovre"), elevation.clone());

        let first = orch.submit(Route::new("r1", "Summit", line(3))).await.unwrap();
        let second = orch.submit(Route::new("r1", "Summit", line(5))).await.unwrap();

        // Both computations finish; only the one for 5 waypoints may apply.
        elevation.gate.add_permits(2);
        first.settled().await;
        second.settled().await;

        let route = orch.trip().route("r1").cloned().unwrap();
        assert_eq!(route.waypoints.len(), 5);
        assert_eq!(route.elevation.gain(), Some(50.0));
    }

    #[tokio::test]
    async fn test_slow_resave_does_not_overwrite_elevation() {
        let elevation = GatedElevation::open();
        let (orch, repo) = orchestrator(Trip::new("t1", "Jotunheimen"), elevation);
        *repo.slow_pending.lock().unwrap() = Some("v2".to_string());

        // Same waypoints, new name: the first computation settles the new entry
        // while its placeholder write is still on the wire.
        let first = orch.submit(Route::new("r1", "v1", line(3))).await.unwrap();
        let second = orch.submit(Route::new("r1", "v2", line(3))).await.unwrap();
        first.settled().await;
        second.settled().await;

        let shown = orch.trip().route("r1").cloned().unwrap();
        assert_eq!(shown.name, "v2");
        assert_eq!(shown.elevation.gain(), Some(30.0));

        let stored = repo.writes().last().cloned().unwrap();
        assert!(!stored.elevation.is_pending());
        assert_eq!(stored, shown);
    }

    #[tokio::test]
    async fn test_slow_rename_does_not_overwrite_elevation() {
        let elevation = GatedElevation::closed();
        let (orch, repo) = orchestrator(Trip::new("t1", "Rondane"), elevation.clone());
        *repo.slow_pending.lock().unwrap() = Some("Renamed".to_string());

        let pending = orch.submit(Route::new("r1", "Loop", line(2))).await.unwrap();
        elevation.gate.add_permits(1);
        orch.rename_route("r1", "Renamed").await.unwrap();
        pending.settled().await;

        let shown = orch.trip().route("r1").cloned().unwrap();
        assert_eq!(shown.name, "Renamed");
        assert_eq!(shown.elevation.gain(), Some(20.0));

        let stored = repo.writes().last().cloned().unwrap();
        assert!(!stored.elevation.is_pending());
        assert_eq!(stored, shown);
    }

    #[tokio::test]
    async fn test_rename_keeps_route_count() {
        let mut trip = Trip::new("t1", "Lofoten");
        trip.upsert_route(Route::new("a", "North", line(2)));
        trip.upsert_route(Route::new("b", "South", line(3)));
        let (orch, repo) = orchestrator(trip, GatedElevation::open());

        orch.rename_route("b", "South ridge").await.unwrap();

        let trip = orch.trip();
        assert_eq!(trip.routes.len(), 2);
        assert_eq!(trip.route("a").unwrap().name, "North");
        assert_eq!(trip.route("b").unwrap().name, "South ridge");
        assert_eq!(trip.route("b").unwrap().waypoints, line(3));
        assert_eq!(repo.writes()[0].name, "South ridge");

        assert_eq!(
            orch.rename_route("zzz", "x").await,
            Err(PlannerError::UnknownRoute("zzz".to_string()))
        );
    }

    #[tokio::test]
    async fn test_failed_delete_restores_position() {
        let mut trip = Trip::new("t1", "Lofoten");
        for key in ["a", "b", "c"] {
            trip.upsert_route(Route::new(key, key, line(2)));
        }
        let (orch, repo) = orchestrator(trip, GatedElevation::open());
        repo.fail.store(true, Ordering::SeqCst);

        assert!(orch.remove_route("b").await.is_err());

        let keys: Vec<_> = orch.trip().routes.iter().map(|r| r.key.clone()).collect();
        assert_eq!(keys, ["a", "b", "c"]);
    }

    #[tokio::test]
    async fn test_stale_placeholders_settled_on_load() {
        let mut trip = Trip::new("t1", "Finnmark");
        trip.upsert_route(Route::new("a", "Old", line(2)).with_elevation(ElevationStatus::Pending));
        let (orch, _repo) = orchestrator(trip, GatedElevation::open());

        assert_eq!(
            orch.trip().route("a").unwrap().elevation,
            ElevationStatus::Unavailable
        );
    }

    #[tokio::test]
    async fn test_subscribers_see_updates() {
        let elevation = GatedElevation::closed();
        let (orch, _repo) = orchestrator(Trip::new("t1", "Senja"), elevation.clone());
        let mut rx = orch.subscribe();

        let pending = orch.submit(Route::new("r1", "Coast", line(2))).await.unwrap();
        rx.changed().await.unwrap();
        assert!(rx.borrow_and_update().route("r1").unwrap().elevation.is_pending());

        elevation.gate.add_permits(1);
        pending.settled().await;
        rx.changed().await.unwrap();
        assert_eq!(rx.borrow().route("r1").unwrap().elevation.gain(), Some(20.0));
    }
}
