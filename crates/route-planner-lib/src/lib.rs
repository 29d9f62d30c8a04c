//! Route Planner Library - waypoints, routing and saved routes
//!
//! This library holds everything the route planner does that is independent of
//! the UI toolkit: the ordered list of waypoint markers, the derived route
//! state, the routing-service client and the persisted saved-route list.
//!
//! # Architecture
//!
//! - **[`RoutePlanner`]**: High-level component owning markers, route state and saved routes
//! - **[`MarkerManager`]**: Ordered waypoints addressed by stable [`MarkerId`]s
//! - **[`RouteState`]**: Distance, time, overlay and itinerary guarded by [`RequestId`] tokens
//! - **[`RoutingClient`]**: Injected routing service, implemented by [`OsrmClient`]
//! - **[`SavedRouteStore`]**: Named snapshots persisted through a [`StorageBackend`]
//!
//! The planner never blocks on the network: recomputations leave a
//! [`RouteRequest`] behind for the caller to dispatch, and responses are fed
//! back with the id they were issued under. Responses for anything but the
//! latest request are dropped.

mod coord;
pub mod format;
mod markers;
mod osrm;
mod planner;
mod route;
mod routing;
pub mod storage;
mod store;

// Public API exports
pub use coord::{LatLng, bounding_box};
pub use markers::{Marker, MarkerId, MarkerManager};
pub use osrm::{DEFAULT_OSRM_URL, OsrmClient, decode, parse_response};
pub use planner::{RoutePlanner, SaveError};
pub use route::{RouteState, RouteStatus};
pub use routing::{
    Instruction, MaybeSend, Profile, RequestId, RouteAlternative, RouteRequest, RouteResult,
    RouteSummary, RoutingClient, RoutingError,
};
pub use storage::{MemoryStorage, StorageBackend, StorageError, StorageResult};
pub use store::{SAVED_ROUTES_KEY, SavedRoute, SavedRouteStore};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_public_exports() {
        // Verify that the main entry points are accessible
        let _: fn(Box<dyn StorageBackend>, Profile) -> RoutePlanner = RoutePlanner::new;
        let _: fn(&str) -> Result<RouteResult, RoutingError> = parse_response;
        let _ = OsrmClient::new(DEFAULT_OSRM_URL);
    }
}
