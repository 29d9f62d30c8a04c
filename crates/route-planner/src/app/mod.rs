//! Application module
//!
//! This module provides the main application structure:
//! - Full-screen map view; clicks place, remove and drag waypoints
//! - Toggleable sidebar with tabs (Route, Saved and Settings)
//! - Route requests dispatched in the background, applied as they arrive
//! - Responsive layout (sidebar from bottom on portrait displays)

mod dispatch;
mod plugin;
pub(crate) mod settings;
mod state;
mod ui_panels;

use crate::app::dispatch::RouteDispatcher;
use crate::app::plugin::{MapEvent, MapEvents, WaypointPlugin};
use crate::app::settings::Settings;
use crate::app::state::{PersistedSettings, TilesProvider, UiSettings};
use eframe::egui;
use route_planner_lib::storage::default_storage_backend;
use route_planner_lib::{
    LatLng, MemoryStorage, OsrmClient, RoutePlanner, StorageBackend, bounding_box,
};
use walkers::{
    HttpTiles, Map, MapMemory, TileId,
    sources::{Attribution, OpenStreetMap, TileSource},
};

/// Initial map center
const HOME: LatLng = LatLng::new(51.5314342, 4.2700376);
const HOME_ZOOM: f64 = 15.0;

/// Thunderforest's OpenCycleMap tiles
pub struct OpenCycleMap;

impl TileSource for OpenCycleMap {
    fn tile_url(&self, tile_id: TileId) -> String {
        format!(
            "https://tile.thunderforest.com/cycle/{}/{}/{}.png",
            tile_id.zoom, tile_id.x, tile_id.y
        )
    }

    fn attribution(&self) -> Attribution {
        Attribution {
            text: "© OpenCycleMap, Thunderforest",
            url: "https://www.thunderforest.com/maps/opencyclemap/",
            logo_light: None,
            logo_dark: None,
        }
    }

    fn max_zoom(&self) -> u8 {
        18
    }
}

/// Main application structure
pub struct RoutePlannerApp {
    /// Markers, route state and saved routes
    planner: RoutePlanner,

    /// Runs route requests against the routing service
    dispatcher: RouteDispatcher<OsrmClient>,

    /// Current UI settings
    ui_settings: UiSettings,

    /// Map tiles provider (OpenStreetMap)
    tiles_osm: HttpTiles,

    /// Map tiles provider (OpenCycleMap)
    tiles_ocm: HttpTiles,

    /// Map state (camera position, zoom, etc.)
    map_memory: MapMemory,

    /// Filled by the map plugin, drained after the map is drawn
    map_events: MapEvents,

    /// Show help overlay
    show_help: bool,

    /// Recenter on the waypoints next frame
    pending_fit_bounds: bool,
}

impl RoutePlannerApp {
    pub fn new(cc: &eframe::CreationContext<'_>) -> Self {
        let cli_args = Settings::from_cli();

        let mut ui_settings = if cli_args.ignore_persisted {
            tracing::info!("Ignoring persisted state (--ignore-persisted flag)");
            UiSettings::default()
        } else {
            cc.storage
                .and_then(PersistedSettings::load)
                .map(PersistedSettings::into_ui_settings)
                .unwrap_or_default()
        };
        if let Some(pace) = cli_args.pace.filter(|p| p.is_finite() && *p > 0.0) {
            ui_settings.pace = pace;
        }

        let backend: Box<dyn StorageBackend> =
            match default_storage_backend(cli_args.storage_path.clone()) {
                Ok(backend) => backend,
                Err(e) => {
                    tracing::error!(
                        "Saved routes storage unavailable, keeping them in memory only: {}",
                        e
                    );
                    Box::new(MemoryStorage::new())
                }
            };
        let planner = RoutePlanner::new(backend, cli_args.profile);

        let dispatcher = RouteDispatcher::new(Self::routing_client(&cli_args))
            .with_repaint(cc.egui_ctx.clone());

        let tiles_osm = HttpTiles::new(OpenStreetMap, cc.egui_ctx.clone());
        let tiles_ocm = HttpTiles::new(OpenCycleMap, cc.egui_ctx.clone());

        let mut map_memory = MapMemory::default();
        let _ = map_memory.set_zoom(HOME_ZOOM);

        tracing::info!(
            "Routing with profile '{}' via {}, {} saved routes",
            cli_args.profile.as_str(),
            dispatcher.client().base_url(),
            planner.saved_routes().len()
        );

        Self {
            planner,
            dispatcher,
            ui_settings,
            tiles_osm,
            tiles_ocm,
            map_memory,
            map_events: MapEvents::default(),
            show_help: false,
            pending_fit_bounds: false,
        }
    }

    fn routing_client(cli_args: &Settings) -> OsrmClient {
        #[cfg(not(target_arch = "wasm32"))]
        if let Some(secs) = cli_args.routing_timeout_secs {
            match OsrmClient::with_timeout(
                cli_args.routing_url.clone(),
                std::time::Duration::from_secs(secs),
            ) {
                Ok(client) => return client,
                Err(e) => tracing::warn!("Ignoring routing timeout: {}", e),
            }
        }
        OsrmClient::new(cli_args.routing_url.clone())
    }

    /// Apply the pointer events the map plugin collected this frame
    fn handle_map_events(&mut self) {
        let events = match self.map_events.lock() {
            Ok(mut events) => std::mem::take(&mut *events),
            Err(poisoned) => std::mem::take(&mut *poisoned.into_inner()),
        };
        for event in events {
            match event {
                MapEvent::AddMarker(position) => {
                    self.planner.add_marker(position);
                }
                MapEvent::RemoveMarker(id) => {
                    self.planner.remove_marker(id);
                }
                MapEvent::MoveMarker(id, position) => {
                    self.planner.move_marker(id, position);
                }
            }
        }
    }

    /// Fit the map view to the bounding box of the waypoints
    fn fit_to_bounds(&mut self) {
        let Some((min_lat, min_lon, max_lat, max_lon)) = bounding_box(&self.planner.waypoints())
        else {
            return;
        };

        let center_lat = (min_lat + max_lat) / 2.0;
        let center_lon = (min_lon + max_lon) / 2.0;

        let lat_span = (max_lat - min_lat).abs();
        let lon_span = (max_lon - min_lon).abs();
        let max_span = lat_span.max(lon_span);

        let zoom = if max_span > 0.0 {
            let zoom_estimate = (4.0 * 360.0 / max_span).log2();
            (zoom_estimate - 0.5).clamp(1.0, 18.0)
        } else {
            HOME_ZOOM
        };

        self.map_memory
            .center_at(walkers::lat_lon(center_lat, center_lon));
        let _ = self.map_memory.set_zoom(zoom);

        tracing::trace!(
            "Fitted view to ({:.4}, {:.4}) - ({:.4}, {:.4}), zoom: {:.1}",
            min_lat,
            min_lon,
            max_lat,
            max_lon,
            zoom
        );
    }
}

#[profiling::all_functions]
impl eframe::App for RoutePlannerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Handle keyboard shortcuts
        ctx.input(|i| {
            if i.key_pressed(egui::Key::F1) {
                self.show_help = !self.show_help;
            }
            if i.key_pressed(egui::Key::H) && i.modifiers.ctrl {
                self.show_help = !self.show_help;
            }
        });

        // Responses that arrived since the last frame
        self.dispatcher.poll(&mut self.planner);

        if self.show_help {
            ui_panels::help_overlay(ctx, &mut self.show_help);
        }

        let actions =
            ui_panels::render_sidebar(ctx, &mut self.planner, &mut self.ui_settings);
        if actions.fit_bounds {
            self.pending_fit_bounds = true;
        }

        if self.pending_fit_bounds {
            self.pending_fit_bounds = false;
            self.fit_to_bounds();
        }

        let tiles_provider = self.ui_settings.tiles_provider;
        let attribution_text = tiles_provider.attribution();

        // Central panel: Map view (full screen)
        egui::CentralPanel::default()
            .frame(egui::Frame::NONE)
            .show(ctx, |ui| {
                profiling::scope!("map_panel");

                let route = self.planner.route();
                let waypoint_plugin = WaypointPlugin::new(
                    self.planner.markers(),
                    route.geometry(),
                    route.is_pending(),
                    self.map_events.clone(),
                );

                let tiles: &mut HttpTiles = match tiles_provider {
                    TilesProvider::OpenStreetMap => &mut self.tiles_osm,
                    TilesProvider::OpenCycleMap => &mut self.tiles_ocm,
                };

                let map = Map::new(
                    Some(tiles),
                    &mut self.map_memory,
                    walkers::lat_lon(HOME.lat, HOME.lng),
                )
                .with_plugin(waypoint_plugin);

                ui.add(map);

                ui_panels::sidebar_toggle_button(ui, &mut self.ui_settings);

                let painter = ui.painter();
                let screen_rect = ui.max_rect();
                painter.text(
                    screen_rect.center_bottom() + egui::vec2(0.0, -5.0),
                    egui::Align2::CENTER_BOTTOM,
                    attribution_text,
                    egui::FontId::proportional(10.0),
                    egui::Color32::from_black_alpha(180),
                );
            });

        self.handle_map_events();

        // Dispatch right away rather than on the next input event
        self.dispatcher.poll(&mut self.planner);
    }

    fn save(&mut self, storage: &mut dyn eframe::Storage) {
        // Settings only; saved routes are written as they change
        PersistedSettings::from(&self.ui_settings).save(storage);
    }
}
