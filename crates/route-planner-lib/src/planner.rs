//! The route planner: markers, derived route state and saved routes in one place
//!
//! Every operation runs synchronously on the caller's (UI) thread. Route
//! computations are not performed here; instead [`RoutePlanner::update_route`]
//! leaves a [`RouteRequest`] in an outbox which the caller collects with
//! [`RoutePlanner::take_request`], hands to a routing client, and feeds back
//! through [`RoutePlanner::apply_route_response`].

use crate::LatLng;
use crate::markers::{Marker, MarkerId, MarkerManager};
use crate::route::{RouteState, RouteStatus};
use crate::routing::{Profile, RequestId, RouteRequest, RouteResult, RoutingError};
use crate::storage::StorageBackend;
use crate::store::{SavedRoute, SavedRouteStore};

#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum SaveError {
    #[error("Route name must not be empty")]
    EmptyName,
}

pub struct RoutePlanner {
    markers: MarkerManager,
    route: RouteState,
    store: SavedRouteStore,
    profile: Profile,
    /// Request waiting to be dispatched
    outbox: Option<RouteRequest>,
    /// Name of the saved route last restored
    viewing: Option<String>,
    /// Contents of the "route name" input
    pub name_input: String,
    /// Set when a save was attempted with an empty name
    name_error: bool,
}

#[cfg_attr(feature = "profiling", profiling::all_functions)]
impl RoutePlanner {
    /// Create a planner, loading saved routes from `backend`
    pub fn new(backend: Box<dyn StorageBackend>, profile: Profile) -> Self {
        Self {
            markers: MarkerManager::new(),
            route: RouteState::new(),
            store: SavedRouteStore::load(backend),
            profile,
            outbox: None,
            viewing: None,
            name_input: String::new(),
            name_error: false,
        }
    }

    // ------------------------------------------------------------------
    // Markers
    // ------------------------------------------------------------------

    /// Place a marker at `position`; recomputes the route once two or more exist
    pub fn add_marker(&mut self, position: LatLng) -> MarkerId {
        let id = self.markers.add(position);
        tracing::debug!(
            "Added marker {} at ({:.5}, {:.5})",
            id.value(),
            position.lat,
            position.lng
        );
        if self.markers.len() > 1 {
            self.update_route();
        }
        id
    }

    /// Remove the marker `id` and recompute. Unknown ids leave the markers as they are.
    pub fn remove_marker(&mut self, id: MarkerId) -> bool {
        let removed = self.markers.remove(id);
        if removed {
            tracing::debug!("Removed marker {}", id.value());
        }
        self.update_route();
        removed
    }

    /// A marker was dragged to `position`
    pub fn move_marker(&mut self, id: MarkerId, position: LatLng) -> bool {
        let moved = self.markers.move_to(id, position);
        if moved {
            self.update_route();
        }
        moved
    }

    pub fn remove_all_markers(&mut self) {
        self.markers.clear();
        self.viewing = None;
        self.update_route();
    }

    #[inline]
    pub fn markers(&self) -> &[Marker] {
        self.markers.markers()
    }

    pub fn waypoints(&self) -> Vec<LatLng> {
        self.markers.waypoints()
    }

    // ------------------------------------------------------------------
    // Route
    // ------------------------------------------------------------------

    /// Discard the current route and, with two or more waypoints, queue a new
    /// computation. With fewer, distance and time drop to zero and nothing is
    /// queued.
    pub fn update_route(&mut self) {
        if self.markers.len() <= 1 {
            self.route.reset();
            self.outbox = None;
            return;
        }
        let request = self.route.begin(self.markers.waypoints(), self.profile);
        tracing::debug!(
            "Queued route request {} with {} waypoints",
            request.id,
            request.waypoints.len()
        );
        self.outbox = Some(request);
    }

    /// Take the request queued by the last recomputation, if not taken yet
    pub fn take_request(&mut self) -> Option<RouteRequest> {
        self.outbox.take()
    }

    /// Feed back the routing outcome of request `id`.
    ///
    /// Returns `false` when the response is stale and was ignored.
    pub fn apply_route_response(
        &mut self,
        id: RequestId,
        result: Result<RouteResult, RoutingError>,
    ) -> bool {
        self.route.apply(id, result)
    }

    #[inline]
    pub fn route(&self) -> &RouteState {
        &self.route
    }

    /// Meters
    #[inline]
    pub fn distance(&self) -> f64 {
        self.route.distance()
    }

    /// Seconds
    #[inline]
    pub fn estimated_time(&self) -> f64 {
        self.route.time()
    }

    pub fn status(&self) -> &RouteStatus {
        self.route.status()
    }

    pub fn profile(&self) -> Profile {
        self.profile
    }

    /// Change the travel profile and recompute
    pub fn set_profile(&mut self, profile: Profile) {
        if self.profile != profile {
            self.profile = profile;
            self.update_route();
        }
    }

    // ------------------------------------------------------------------
    // Saved routes
    // ------------------------------------------------------------------

    /// Snapshot the current waypoints and totals under `name`.
    ///
    /// An empty (or whitespace-only) name sets the name error flag and saves
    /// nothing. On success the name input and error flag are cleared.
    pub fn save_route(&mut self, name: &str) -> Result<usize, SaveError> {
        let name = name.trim();
        if name.is_empty() {
            self.name_error = true;
            return Err(SaveError::EmptyName);
        }

        let snapshot = SavedRoute {
            name: Some(name.to_string()),
            waypoints: self.markers.waypoints(),
            distance: self.route.distance(),
            estimated_time: self.route.time(),
        };
        let (index, persisted) = self.store.push(snapshot);
        if let Err(e) = persisted {
            tracing::error!("Failed to persist saved routes: {}", e);
        }
        tracing::info!("Saved route '{}' at index {}", name, index);

        self.name_input.clear();
        self.name_error = false;
        Ok(index)
    }

    /// Save using the current contents of [`Self::name_input`]
    pub fn save_route_from_input(&mut self) -> Result<usize, SaveError> {
        let name = std::mem::take(&mut self.name_input);
        let result = self.save_route(&name);
        if result.is_err() {
            self.name_input = name;
        }
        result
    }

    /// Replace the current markers with those of saved route `index`.
    ///
    /// The waypoints are replayed in order and the route is recomputed once
    /// afterwards. Returns `false` for an unknown index.
    pub fn restore_route(&mut self, index: usize) -> bool {
        let Some(saved) = self.store.get(index).cloned() else {
            tracing::warn!("No saved route at index {}", index);
            return false;
        };

        self.markers.clear();
        for waypoint in &saved.waypoints {
            self.markers.add(*waypoint);
        }
        self.update_route();
        self.viewing = Some(saved.display_name(index));

        tracing::info!(
            "Restored route '{}' with {} waypoints",
            saved.display_name(index),
            saved.waypoints.len()
        );
        true
    }

    /// Delete saved route `index`; later entries shift down by one
    pub fn delete_route(&mut self, index: usize) -> Option<SavedRoute> {
        let (removed, persisted) = self.store.remove(index)?;
        if let Err(e) = persisted {
            tracing::error!("Failed to persist saved routes: {}", e);
        }
        tracing::info!("Deleted saved route at index {}", index);
        if self.viewing.as_deref() == Some(removed.display_name(index).as_str()) {
            self.viewing = None;
        }
        Some(removed)
    }

    pub fn saved_routes(&self) -> &[SavedRoute] {
        self.store.routes()
    }

    /// Name of the saved route currently shown, if it was restored
    pub fn viewing(&self) -> Option<&str> {
        self.viewing.as_deref()
    }

    pub fn name_error(&self) -> bool {
        self.name_error
    }
}
