//! Derived route state
//!
//! Holds the distance, time, path overlay and itinerary of the current
//! waypoint sequence. State only changes through [`RouteState::reset`],
//! [`RouteState::begin`] and [`RouteState::apply`]; responses are applied
//! only when they carry the most recently issued [`RequestId`].

use crate::LatLng;
use crate::routing::{
    Instruction, Profile, RequestId, RouteAlternative, RouteRequest, RouteResult, RoutingError,
};

/// Lifecycle of the current route computation
#[derive(Clone, Debug, Default, PartialEq)]
pub enum RouteStatus {
    /// Fewer than two waypoints, nothing to route
    #[default]
    Empty,
    /// Waiting for the response to this request
    Pending(RequestId),
    /// Latest response applied
    Ready,
    /// Latest request failed; distance and time are unknown
    Failed(String),
}

#[derive(Debug, Default)]
pub struct RouteState {
    distance: f64,
    time: f64,
    status: RouteStatus,
    /// Path and itinerary of the preferred alternative
    overlay: Option<RouteAlternative>,
    /// Last issued request id, if any
    latest: Option<RequestId>,
    next_id: u64,
}

impl RouteState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total distance in meters of the current route (0 when unknown)
    #[inline]
    pub fn distance(&self) -> f64 {
        self.distance
    }

    /// Total time in seconds of the current route (0 when unknown)
    #[inline]
    pub fn time(&self) -> f64 {
        self.time
    }

    #[inline]
    pub fn status(&self) -> &RouteStatus {
        &self.status
    }

    pub fn is_pending(&self) -> bool {
        matches!(self.status, RouteStatus::Pending(_))
    }

    pub fn overlay(&self) -> Option<&RouteAlternative> {
        self.overlay.as_ref()
    }

    /// Path to draw, empty when no route is shown
    pub fn geometry(&self) -> &[LatLng] {
        self.overlay
            .as_ref()
            .map(|o| o.geometry.as_slice())
            .unwrap_or_default()
    }

    /// Turn-by-turn itinerary, empty when no route is shown
    pub fn instructions(&self) -> &[Instruction] {
        self.overlay
            .as_ref()
            .map(|o| o.instructions.as_slice())
            .unwrap_or_default()
    }

    /// Drop the overlay and zero the totals.
    ///
    /// Any request still in flight becomes stale, since its id can no longer
    /// match: `latest` is cleared as well.
    pub fn reset(&mut self) {
        self.overlay = None;
        self.distance = 0.0;
        self.time = 0.0;
        self.status = RouteStatus::Empty;
        self.latest = None;
    }

    /// Start a new computation for `waypoints`, superseding any previous one
    pub fn begin(&mut self, waypoints: Vec<LatLng>, profile: Profile) -> RouteRequest {
        let id = RequestId(self.next_id);
        self.next_id += 1;

        self.overlay = None;
        self.latest = Some(id);
        self.status = RouteStatus::Pending(id);

        RouteRequest {
            id,
            waypoints,
            profile,
        }
    }

    /// Apply the outcome of request `id`.
    ///
    /// Returns `false` (and changes nothing) when `id` is not the latest issued
    /// request.
    pub fn apply(&mut self, id: RequestId, result: Result<RouteResult, RoutingError>) -> bool {
        if self.latest != Some(id) {
            tracing::debug!(
                "Discarding stale route response {} (latest: {:?})",
                id,
                self.latest
            );
            return false;
        }

        match result.and_then(|r| r.alternatives.into_iter().next().ok_or(RoutingError::NoRoute))
        {
            Ok(alternative) => {
                self.distance = alternative.summary.total_distance;
                self.time = alternative.summary.total_time;
                self.overlay = Some(alternative);
                self.status = RouteStatus::Ready;
                tracing::debug!(
                    "Route {} ready: {:.0} m, {:.0} s",
                    id,
                    self.distance,
                    self.time
                );
            }
            Err(e) => {
                tracing::warn!("Route {} failed: {}", id, e);
                self.distance = 0.0;
                self.time = 0.0;
                self.overlay = None;
                self.status = RouteStatus::Failed(e.to_string());
            }
        }
        true
    }
}
