//! OSRM v1 HTTP routing client
//!
//! Requests `GET {base}/{profile}/{lng,lat;lng,lat;...}` with full GeoJSON
//! geometry and turn-by-turn steps, and decodes the first-class parts of the
//! response into a [`RouteResult`].

use crate::routing::{
    Instruction, RequestId, RouteAlternative, RouteRequest, RouteResult, RouteSummary,
    RoutingClient, RoutingError,
};
use crate::{LatLng, MaybeSend};
use dashmap::DashMap;
use serde::Deserialize;
use std::future::Future;
use std::sync::Arc;

/// Public OSRM demo server
pub const DEFAULT_OSRM_URL: &str = "https://router.project-osrm.org/route/v1";

#[derive(Clone)]
pub struct OsrmClient {
    base_url: String,
    http: reqwest::Client,
    /// Requests still running, flagged `true` once cancelled
    running: Arc<DashMap<RequestId, bool>>,
}

impl OsrmClient {
    /// Create a client for the OSRM service at `base_url` (without trailing profile)
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_http_client(base_url, reqwest::Client::new())
    }

    /// Create a client with a request timeout (native only, browsers manage their own)
    #[cfg(not(target_arch = "wasm32"))]
    pub fn with_timeout(
        base_url: impl Into<String>,
        timeout: std::time::Duration,
    ) -> Result<Self, RoutingError> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self::with_http_client(base_url, http))
    }

    pub fn with_http_client(base_url: impl Into<String>, http: reqwest::Client) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            base_url,
            http,
            running: Arc::new(DashMap::new()),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Full request URL for `request`
    pub fn request_url(&self, request: &RouteRequest) -> String {
        let coordinates: Vec<String> = request
            .waypoints
            .iter()
            .map(|c| c.to_lng_lat_string())
            .collect();
        format!(
            "{}/{}/{}?overview=full&geometries=geojson&steps=true",
            self.base_url,
            request.profile.as_str(),
            coordinates.join(";")
        )
    }

    #[cfg(test)]
    fn running_len(&self) -> usize {
        self.running.len()
    }
}

/// Entry of a request in the running table, removed however the request ends
struct Running {
    table: Arc<DashMap<RequestId, bool>>,
    id: RequestId,
}

impl Running {
    fn start(table: Arc<DashMap<RequestId, bool>>, id: RequestId) -> Self {
        table.insert(id, false);
        Self { table, id }
    }

    /// Leave the table. Returns whether the request was cancelled meanwhile.
    fn finish(self) -> bool {
        self.table
            .remove(&self.id)
            .is_some_and(|(_, cancelled)| cancelled)
    }
}

impl Drop for Running {
    fn drop(&mut self) {
        self.table.remove(&self.id);
    }
}

impl RoutingClient for OsrmClient {
    fn compute_route(
        &self,
        request: &RouteRequest,
    ) -> impl Future<Output = Result<RouteResult, RoutingError>> + MaybeSend + 'static {
        let url = self.request_url(request);
        let http = self.http.clone();
        let id = request.id;
        let running = Running::start(self.running.clone(), id);

        async move {
            let outcome = if url.starts_with("http://") || url.starts_with("https://") {
                tracing::debug!("Requesting route {}: {}", id, url);
                fetch(&http, &url).await
            } else {
                Err(RoutingError::InvalidUrl(url))
            };

            // A superseded request may still complete; drop its result here
            if running.finish() {
                tracing::debug!("Dropping result of cancelled route request {}", id);
                return Err(RoutingError::Cancelled(id));
            }
            outcome
        }
    }

    fn cancel(&self, id: RequestId) {
        match self.running.get_mut(&id) {
            Some(mut cancelled) => *cancelled = true,
            None => tracing::trace!("Route request {} already finished, nothing to cancel", id),
        }
    }
}

async fn fetch(http: &reqwest::Client, url: &str) -> Result<RouteResult, RoutingError> {
    let response = http.get(url).send().await?;
    let status = response.status().as_u16();
    let body = response.text().await?;
    decode(status, &body)
}

/// Turn an HTTP status and body into a route result
pub fn decode(status: u16, body: &str) -> Result<RouteResult, RoutingError> {
    if !(200..300).contains(&status) {
        // OSRM reports "NoRoute" and friends with a 400 and a JSON body
        if let Ok(error) = serde_json::from_str::<OsrmResponse>(body)
            && error.code != "Ok"
        {
            return Err(error.into_error());
        }
        return Err(RoutingError::Status {
            status,
            body: body.to_string(),
        });
    }

    parse_response(body)
}

#[derive(Debug, Deserialize)]
struct OsrmResponse {
    code: String,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    routes: Vec<OsrmRoute>,
}

impl OsrmResponse {
    fn into_error(self) -> RoutingError {
        RoutingError::Service {
            code: self.code,
            message: self.message.unwrap_or_else(|| "no message".to_string()),
        }
    }
}

#[derive(Debug, Deserialize)]
struct OsrmRoute {
    distance: f64,
    duration: f64,
    geometry: Option<OsrmGeometry>,
    #[serde(default)]
    legs: Vec<OsrmLeg>,
}

#[derive(Debug, Deserialize)]
struct OsrmGeometry {
    coordinates: Vec<[f64; 2]>,
}

#[derive(Debug, Deserialize)]
struct OsrmLeg {
    #[serde(default)]
    steps: Vec<OsrmStep>,
}

#[derive(Debug, Deserialize)]
struct OsrmStep {
    distance: f64,
    duration: f64,
    #[serde(default)]
    name: String,
    maneuver: OsrmManeuver,
}

#[derive(Debug, Deserialize)]
struct OsrmManeuver {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    modifier: Option<String>,
}

/// Decode an OSRM route response body
pub fn parse_response(body: &str) -> Result<RouteResult, RoutingError> {
    #[cfg(feature = "profiling")]
    profiling::scope!("osrm::parse_response");

    let response: OsrmResponse = serde_json::from_str(body)?;
    if response.code != "Ok" {
        return Err(response.into_error());
    }
    if response.routes.is_empty() {
        return Err(RoutingError::NoRoute);
    }

    let alternatives = response
        .routes
        .into_iter()
        .map(|route| RouteAlternative {
            summary: RouteSummary {
                total_distance: route.distance,
                total_time: route.duration,
            },
            geometry: route
                .geometry
                .map(|g| {
                    g.coordinates
                        .into_iter()
                        .map(|[lng, lat]| LatLng::new(lat, lng))
                        .collect()
                })
                .unwrap_or_default(),
            instructions: route
                .legs
                .iter()
                .flat_map(|leg| leg.steps.iter())
                .map(|step| Instruction {
                    text: describe_step(step),
                    distance: step.distance,
                    time: step.duration,
                })
                .collect(),
        })
        .collect();

    Ok(RouteResult { alternatives })
}

fn describe_step(step: &OsrmStep) -> String {
    let modifier = step.maneuver.modifier.as_deref().unwrap_or("straight");
    let onto = if step.name.is_empty() {
        String::new()
    } else {
        format!(" onto {}", step.name)
    };

    match step.maneuver.kind.as_str() {
        "depart" => {
            if step.name.is_empty() {
                "Head out".to_string()
            } else {
                format!("Head out on {}", step.name)
            }
        }
        "arrive" => "You have arrived at your destination".to_string(),
        "roundabout" | "rotary" => format!("Enter the roundabout and exit{onto}"),
        "merge" => format!("Merge {modifier}{onto}"),
        "fork" => format!("Keep {modifier} at the fork{onto}"),
        "end of road" => format!("Turn {modifier} at the end of the road{onto}"),
        "continue" | "new name" => format!("Continue{onto}"),
        _ => match modifier {
            "straight" => format!("Go straight{onto}"),
            "uturn" => format!("Make a U-turn{onto}"),
            other => format!("Turn {other}{onto}"),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Profile;

    const SAMPLE: &str = r#"{
        "code": "Ok",
        "routes": [
            {
                "distance": 1234.5,
                "duration": 890.1,
                "geometry": {"type": "LineString", "coordinates": [[4.27, 51.53], [4.28, 51.54]]},
                "legs": [
                    {"steps": [
                        {"distance": 1000.0, "duration": 700.0, "name": "Markt",
                         "maneuver": {"type": "depart", "location": [4.27, 51.53]}},
                        {"distance": 234.5, "duration": 190.1, "name": "Kerkstraat",
                         "maneuver": {"type": "turn", "modifier": "left"}},
                        {"distance": 0.0, "duration": 0.0, "name": "",
                         "maneuver": {"type": "arrive"}}
                    ]}
                ]
            },
            {"distance": 2000.0, "duration": 1500.0, "legs": []}
        ]
    }"#;

    #[test]
    fn test_parse_response() {
        let result = parse_response(SAMPLE).unwrap();
        assert_eq!(result.alternatives.len(), 2);

        let first = &result.alternatives[0];
        assert_eq!(first.summary.total_distance, 1234.5);
        assert_eq!(first.summary.total_time, 890.1);
        assert_eq!(
            first.geometry,
            vec![LatLng::new(51.53, 4.27), LatLng::new(51.54, 4.28)]
        );

        let texts: Vec<_> = first.instructions.iter().map(|i| i.text.as_str()).collect();
        assert_eq!(
            texts,
            vec![
                "Head out on Markt",
                "Turn left onto Kerkstraat",
                "You have arrived at your destination"
            ]
        );

        assert!(result.alternatives[1].geometry.is_empty());
    }

    #[test]
    fn test_parse_service_error() {
        let body = r#"{"code": "NoSegment", "message": "Could not find a matching segment"}"#;
        match parse_response(body) {
            Err(RoutingError::Service { code, message }) => {
                assert_eq!(code, "NoSegment");
                assert_eq!(message, "Could not find a matching segment");
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_parse_empty_routes() {
        assert!(matches!(
            parse_response(r#"{"code": "Ok", "routes": []}"#),
            Err(RoutingError::NoRoute)
        ));
    }

    #[test]
    fn test_parse_malformed() {
        assert!(matches!(
            parse_response("<html>502</html>"),
            Err(RoutingError::Decode(_))
        ));
    }

    #[test]
    fn test_request_url() {
        let client = OsrmClient::new("https://example.org/route/v1/");
        let request = RouteRequest {
            id: RequestId(1),
            waypoints: vec![LatLng::new(51.5, 4.25), LatLng::new(51.6, 4.3)],
            profile: Profile::Foot,
        };
        assert_eq!(
            client.request_url(&request),
            "https://example.org/route/v1/foot/4.25,51.5;4.3,51.6?overview=full&geometries=geojson&steps=true"
        );
    }

    #[test]
    fn test_decode_error_status_with_osrm_body() {
        let body = r#"{"code": "NoRoute", "message": "Impossible route between points"}"#;
        match decode(400, body) {
            Err(RoutingError::Service { code, message }) => {
                assert_eq!(code, "NoRoute");
                assert_eq!(message, "Impossible route between points");
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_decode_error_status_with_other_body() {
        match decode(502, "<html>Bad Gateway</html>") {
            Err(RoutingError::Status { status, body }) => {
                assert_eq!(status, 502);
                assert_eq!(body, "<html>Bad Gateway</html>");
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_decode_success() {
        assert_eq!(decode(200, SAMPLE).unwrap().alternatives.len(), 2);
    }

    fn unreachable_request(id: u64) -> RouteRequest {
        RouteRequest {
            id: RequestId(id),
            waypoints: vec![LatLng::new(0.0, 0.0), LatLng::new(1.0, 1.0)],
            profile: Profile::Bike,
        }
    }

    #[tokio::test]
    async fn test_cancel_before_completion_drops_result() {
        let client = OsrmClient::new("ftp://example.org");
        let future = client.compute_route(&unreachable_request(3));
        client.cancel(RequestId(3));

        assert!(matches!(future.await, Err(RoutingError::Cancelled(RequestId(3)))));
        assert_eq!(client.running_len(), 0);
    }

    #[tokio::test]
    async fn test_cancel_after_completion_leaves_nothing_behind() {
        let client = OsrmClient::new("ftp://example.org");
        for id in 0..100 {
            let result = client.compute_route(&unreachable_request(id)).await;
            assert!(matches!(result, Err(RoutingError::InvalidUrl(_))));
            client.cancel(RequestId(id));
        }
        assert_eq!(client.running_len(), 0);
    }

    #[test]
    fn test_dropped_request_leaves_table() {
        let client = OsrmClient::new(DEFAULT_OSRM_URL);
        let future = client.compute_route(&unreachable_request(7));
        assert_eq!(client.running_len(), 1);
        drop(future);
        assert_eq!(client.running_len(), 0);
    }

    #[tokio::test]
    async fn test_invalid_url_is_rejected_without_network() {
        let client = OsrmClient::new("ftp://example.org");
        let request = RouteRequest {
            id: RequestId(0),
            waypoints: vec![LatLng::new(0.0, 0.0), LatLng::new(1.0, 1.0)],
            profile: Profile::Car,
        };
        let result = client.compute_route(&request).await;
        assert!(matches!(result, Err(RoutingError::InvalidUrl(_))));
    }
}
