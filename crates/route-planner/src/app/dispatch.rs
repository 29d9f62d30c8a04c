//! Runs the planner's route requests against a [`RoutingClient`]
//!
//! Each frame [`RouteDispatcher::poll`] spawns the request the planner has
//! queued (cancelling the one still in flight) and applies whatever responses
//! have arrived. Responses travel back over an unbounded channel; the planner
//! drops those that are no longer the latest.

use route_planner_lib::{RequestId, RoutePlanner, RouteResult, RoutingClient, RoutingError};
use std::sync::Arc;
use tokio::sync::mpsc;

struct RouteResponse {
    id: RequestId,
    result: Result<RouteResult, RoutingError>,
}

pub struct RouteDispatcher<C: RoutingClient> {
    client: Arc<C>,
    tx: mpsc::UnboundedSender<RouteResponse>,
    rx: mpsc::UnboundedReceiver<RouteResponse>,
    /// Request spawned most recently, with its start time, until it answers
    in_flight: Option<(RequestId, instant::Instant)>,
    /// Woken when a response arrives so it is applied without user input
    repaint: Option<egui::Context>,
}

impl<C: RoutingClient> RouteDispatcher<C> {
    pub fn new(client: C) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            client: Arc::new(client),
            tx,
            rx,
            in_flight: None,
            repaint: None,
        }
    }

    pub fn with_repaint(mut self, ctx: egui::Context) -> Self {
        self.repaint = Some(ctx);
        self
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Apply arrived responses, then dispatch the planner's queued request.
    ///
    /// Returns the number of responses the planner accepted.
    pub fn poll(&mut self, planner: &mut RoutePlanner) -> usize {
        profiling::scope!("RouteDispatcher::poll");

        let mut applied = 0;
        while let Ok(response) = self.rx.try_recv() {
            if let Some((id, started)) = self.in_flight
                && id == response.id
            {
                tracing::debug!(
                    "Route request {} answered in {:.0} ms",
                    id,
                    started.elapsed().as_secs_f64() * 1000.0
                );
                self.in_flight = None;
            }
            if planner.apply_route_response(response.id, response.result) {
                applied += 1;
            }
        }

        if let Some(request) = planner.take_request() {
            // Only requests that have not answered yet are cancelled
            if let Some((previous, _)) = self.in_flight.take() {
                tracing::debug!("Cancelling superseded route request {}", previous);
                self.client.cancel(previous);
            }

            let id = request.id;
            let future = self.client.compute_route(&request);
            let tx = self.tx.clone();
            let repaint = self.repaint.clone();
            eframe_entrypoints::async_runtime::spawn(async move {
                let result = future.await;
                // The receiver only goes away with the app
                let _ = tx.send(RouteResponse { id, result });
                if let Some(ctx) = repaint {
                    ctx.request_repaint();
                }
            });
            self.in_flight = Some((id, instant::Instant::now()));
        }
        applied
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use route_planner_lib::{
        LatLng, MaybeSend, MemoryStorage, Profile, RouteAlternative, RouteRequest, RouteStatus,
        RouteSummary,
    };
    use std::future::Future;
    use std::sync::Mutex;

    /// Answers every request with 1 km per waypoint; records cancellations
    #[derive(Default)]
    struct FakeClient {
        cancelled: Mutex<Vec<RequestId>>,
        fail: bool,
    }

    impl RoutingClient for FakeClient {
        fn compute_route(
            &self,
            request: &RouteRequest,
        ) -> impl Future<Output = Result<RouteResult, RoutingError>> + MaybeSend + 'static {
            let waypoints = request.waypoints.clone();
            let fail = self.fail;
            async move {
                if fail {
                    return Err(RoutingError::NoRoute);
                }
                let n = waypoints.len() as f64;
                Ok(RouteResult {
                    alternatives: vec![RouteAlternative {
                        summary: RouteSummary {
                            total_distance: n * 1000.0,
                            total_time: n * 600.0,
                        },
                        geometry: waypoints,
                        instructions: Vec::new(),
                    }],
                })
            }
        }

        fn cancel(&self, id: RequestId) {
            self.cancelled.lock().unwrap().push(id);
        }
    }

    fn planner() -> RoutePlanner {
        RoutePlanner::new(Box::new(MemoryStorage::new()), Profile::Foot)
    }

    /// Poll until `n` responses were accepted or the dispatcher went idle
    async fn settle(dispatcher: &mut RouteDispatcher<FakeClient>, planner: &mut RoutePlanner) {
        for _ in 0..100 {
            dispatcher.poll(planner);
            if !dispatcher.is_busy() {
                return;
            }
            tokio::task::yield_now().await;
        }
        panic!("route dispatcher did not settle");
    }

    #[tokio::test]
    async fn test_response_is_applied() {
        let mut planner = planner();
        let mut dispatcher = RouteDispatcher::new(FakeClient::default());

        planner.add_marker(LatLng::new(51.53, 4.27));
        planner.add_marker(LatLng::new(51.54, 4.28));
        settle(&mut dispatcher, &mut planner).await;

        assert_eq!(planner.status(), &RouteStatus::Ready);
        assert_eq!(planner.distance(), 2000.0);
        assert_eq!(planner.estimated_time(), 1200.0);
        assert_eq!(planner.route().geometry().len(), 2);
    }

    #[tokio::test]
    async fn test_superseded_request_is_cancelled_and_ignored() {
        let mut planner = planner();
        let mut dispatcher = RouteDispatcher::new(FakeClient::default());

        planner.add_marker(LatLng::new(51.53, 4.27));
        planner.add_marker(LatLng::new(51.54, 4.28));
        dispatcher.poll(&mut planner);
        let RouteStatus::Pending(first) = *planner.status() else {
            panic!("route request was not issued");
        };

        planner.add_marker(LatLng::new(51.55, 4.29));
        settle(&mut dispatcher, &mut planner).await;

        assert_eq!(*dispatcher.client().cancelled.lock().unwrap(), vec![first]);
        assert_eq!(planner.distance(), 3000.0);
        assert_eq!(planner.status(), &RouteStatus::Ready);
    }

    #[tokio::test]
    async fn test_answered_request_is_not_cancelled() {
        let mut planner = planner();
        let mut dispatcher = RouteDispatcher::new(FakeClient::default());

        planner.add_marker(LatLng::new(51.53, 4.27));
        planner.add_marker(LatLng::new(51.54, 4.28));
        dispatcher.poll(&mut planner);
        // Let the first request answer without draining its response
        for _ in 0..10 {
            tokio::task::yield_now().await;
        }

        planner.add_marker(LatLng::new(51.55, 4.29));
        settle(&mut dispatcher, &mut planner).await;

        assert!(dispatcher.client().cancelled.lock().unwrap().is_empty());
        assert_eq!(planner.distance(), 3000.0);
    }

    #[tokio::test]
    async fn test_failure_is_reported() {
        let mut planner = planner();
        let mut dispatcher = RouteDispatcher::new(FakeClient {
            fail: true,
            ..Default::default()
        });

        planner.add_marker(LatLng::new(51.53, 4.27));
        planner.add_marker(LatLng::new(51.54, 4.28));
        settle(&mut dispatcher, &mut planner).await;

        assert!(matches!(planner.status(), RouteStatus::Failed(_)));
        assert_eq!(planner.distance(), 0.0);
    }

    #[tokio::test]
    async fn test_response_after_clearing_is_dropped() {
        let mut planner = planner();
        let mut dispatcher = RouteDispatcher::new(FakeClient::default());

        planner.add_marker(LatLng::new(51.53, 4.27));
        planner.add_marker(LatLng::new(51.54, 4.28));
        dispatcher.poll(&mut planner);
        planner.remove_all_markers();
        settle(&mut dispatcher, &mut planner).await;

        assert_eq!(planner.status(), &RouteStatus::Empty);
        assert_eq!(planner.distance(), 0.0);
        assert!(planner.route().geometry().is_empty());
    }

    #[tokio::test]
    async fn test_restore_dispatches_once() {
        let mut planner = planner();
        let mut dispatcher = RouteDispatcher::new(FakeClient::default());

        planner.add_marker(LatLng::new(51.53, 4.27));
        planner.add_marker(LatLng::new(51.54, 4.28));
        planner.add_marker(LatLng::new(51.55, 4.29));
        settle(&mut dispatcher, &mut planner).await;
        planner.save_route("Loop").unwrap();

        planner.remove_all_markers();
        assert!(planner.restore_route(0));
        settle(&mut dispatcher, &mut planner).await;

        assert!(dispatcher.client().cancelled.lock().unwrap().is_empty());
        assert_eq!(planner.distance(), 3000.0);
        assert_eq!(planner.viewing(), Some("Loop"));
    }
}
