//! Route Planner - Application Library
//!
//! The egui/eframe application around `route-planner-lib`: a slippy map on
//! which clicks place waypoints, a routing dispatcher talking to OSRM, and a
//! sidebar with the route summary, saved routes and settings.

mod app;

pub use app::RoutePlannerApp;

eframe_entrypoints::eframe_app!("Route Planner", |cc| Box::new(RoutePlannerApp::new(cc)));
