//! Routing service abstraction
//!
//! The planner never talks to the network itself. It produces [`RouteRequest`]s
//! tagged with a [`RequestId`] and something implementing [`RoutingClient`]
//! turns them into [`RouteResult`]s.

use crate::LatLng;
use std::future::Future;

/// Token attached to every route computation. Ids grow monotonically so the
/// latest issued request can be told apart from stale ones.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RequestId(pub(crate) u64);

impl RequestId {
    pub fn value(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Travel profile passed to the routing service
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Profile {
    #[default]
    Foot,
    Bike,
    Car,
}

impl Profile {
    pub fn all() -> &'static [Self] {
        &[Self::Foot, Self::Bike, Self::Car]
    }

    /// Path segment used in OSRM URLs
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Foot => "foot",
            Self::Bike => "bike",
            Self::Car => "car",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Foot => "Walking",
            Self::Bike => "Cycling",
            Self::Car => "Driving",
        }
    }
}

impl std::str::FromStr for Profile {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "foot" | "walking" => Ok(Self::Foot),
            "bike" | "cycling" => Ok(Self::Bike),
            "car" | "driving" => Ok(Self::Car),
            other => Err(format!("unknown travel profile '{other}'")),
        }
    }
}

/// A request for a route through `waypoints` in order
#[derive(Clone, Debug, PartialEq)]
pub struct RouteRequest {
    pub id: RequestId,
    pub waypoints: Vec<LatLng>,
    pub profile: Profile,
}

/// Totals of a route alternative
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct RouteSummary {
    /// Meters
    pub total_distance: f64,
    /// Seconds
    pub total_time: f64,
}

/// One itinerary step
#[derive(Clone, Debug, PartialEq)]
pub struct Instruction {
    pub text: String,
    /// Meters
    pub distance: f64,
    /// Seconds
    pub time: f64,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct RouteAlternative {
    pub summary: RouteSummary,
    /// Path to draw on the map
    pub geometry: Vec<LatLng>,
    pub instructions: Vec<Instruction>,
}

/// Routing service answer; the first alternative is the preferred one
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RouteResult {
    pub alternatives: Vec<RouteAlternative>,
}

#[derive(Debug, thiserror::Error)]
pub enum RoutingError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Routing service returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Routing service error {code}: {message}")]
    Service { code: String, message: String },

    #[error("Malformed routing response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("No route found")]
    NoRoute,

    #[error("Request {0} was cancelled")]
    Cancelled(RequestId),

    #[error("Invalid routing service URL: {0}")]
    InvalidUrl(String),
}

/// Marker bound for futures that must be `Send` on native targets.
///
/// Browser fetch futures are `!Send`, so on wasm32 the bound is empty.
#[cfg(not(target_arch = "wasm32"))]
pub trait MaybeSend: Send {}
#[cfg(not(target_arch = "wasm32"))]
impl<T: Send> MaybeSend for T {}

#[cfg(target_arch = "wasm32")]
pub trait MaybeSend {}
#[cfg(target_arch = "wasm32")]
impl<T> MaybeSend for T {}

/// A service able to compute routes between ordered waypoints
pub trait RoutingClient: Send + Sync + 'static {
    /// Compute a route for `request`. Implementations should not assume they
    /// are the only request in flight.
    fn compute_route(
        &self,
        request: &RouteRequest,
    ) -> impl Future<Output = Result<RouteResult, RoutingError>> + MaybeSend + 'static;

    /// Signal that the result of `id` is no longer wanted
    fn cancel(&self, id: RequestId);
}
