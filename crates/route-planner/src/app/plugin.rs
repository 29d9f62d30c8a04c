//! Walkers plugin drawing the route and its waypoints, and turning pointer
//! input on the map into [`MapEvent`]s
//!
//! A click on empty map adds a waypoint, a click on a marker removes it, and
//! dragging a marker moves it once the drag ends. Events are queued in a
//! shared list and applied by the app after the map has been drawn.

use egui::{Color32, Stroke};
use route_planner_lib::{LatLng, Marker, MarkerId};
use std::sync::{Arc, Mutex};
use walkers::{Plugin, Projector};

/// Marker hit radius and drawn radius, in points
const MARKER_RADIUS: f32 = 8.0;

/// Pointer interaction on the map
#[derive(Clone, Debug, PartialEq)]
pub enum MapEvent {
    AddMarker(LatLng),
    RemoveMarker(MarkerId),
    MoveMarker(MarkerId, LatLng),
}

/// Map events produced by the plugin during a frame
pub type MapEvents = Arc<Mutex<Vec<MapEvent>>>;

pub struct WaypointPlugin {
    markers: Vec<Marker>,
    /// Route overlay, empty when there is none
    geometry: Vec<LatLng>,
    /// Draw the route faded while a newer one is being computed
    pending: bool,
    events: MapEvents,
}

impl WaypointPlugin {
    pub fn new(markers: &[Marker], geometry: &[LatLng], pending: bool, events: MapEvents) -> Self {
        Self {
            markers: markers.to_vec(),
            geometry: geometry.to_vec(),
            pending,
            events,
        }
    }

    fn push(&self, event: MapEvent) {
        tracing::trace!("Map event: {:?}", event);
        match self.events.lock() {
            Ok(mut events) => events.push(event),
            Err(poisoned) => poisoned.into_inner().push(event),
        }
    }

    fn render_route(&self, projector: &Projector, painter: &egui::Painter) {
        if self.geometry.len() < 2 {
            return;
        }
        let screen_points: Vec<egui::Pos2> = self
            .geometry
            .iter()
            .map(|c| to_screen(projector, *c))
            .collect();

        let alpha = if self.pending { 110 } else { 220 };
        painter.add(egui::Shape::line(
            screen_points.clone(),
            Stroke::new(7.0, Color32::from_black_alpha(alpha / 2)),
        ));
        painter.add(egui::Shape::line(
            screen_points,
            Stroke::new(
                4.0,
                Color32::from_rgba_unmultiplied(70, 130, 220, alpha),
            ),
        ));
    }

    fn render_marker(painter: &egui::Painter, pos: egui::Pos2, label: usize, hovered: bool) {
        let fill = if hovered {
            Color32::from_rgb(230, 80, 60)
        } else {
            Color32::from_rgb(40, 90, 200)
        };
        painter.circle(pos, MARKER_RADIUS, fill, Stroke::new(2.0, Color32::WHITE));
        painter.text(
            pos,
            egui::Align2::CENTER_CENTER,
            label.to_string(),
            egui::FontId::proportional(10.0),
            Color32::WHITE,
        );
    }
}

fn to_screen(projector: &Projector, c: LatLng) -> egui::Pos2 {
    let v = projector.project(walkers::lat_lon(c.lat, c.lng));
    egui::Pos2::new(v.x, v.y)
}

fn to_lat_lng(projector: &Projector, pos: egui::Pos2) -> LatLng {
    let position = projector.unproject(pos.to_vec2());
    LatLng::new(position.y(), position.x())
}

impl Plugin for WaypointPlugin {
    fn run(
        self: Box<Self>,
        ui: &mut egui::Ui,
        response: &egui::Response,
        projector: &Projector,
        _map_memory: &walkers::MapMemory,
    ) {
        profiling::scope!("WaypointPlugin::run");

        self.render_route(projector, ui.painter());

        let mut marker_clicked = false;
        for (index, marker) in self.markers.iter().enumerate() {
            let center = to_screen(projector, marker.position);
            let rect = egui::Rect::from_center_size(center, egui::Vec2::splat(MARKER_RADIUS * 2.5));
            let id = ui.id().with(("waypoint", marker.id.value()));
            let marker_response = ui
                .interact(rect, id, egui::Sense::click_and_drag())
                .on_hover_cursor(egui::CursorIcon::Grab)
                .on_hover_text("Click to remove, drag to move");

            let mut pos = center;
            if marker_response.dragged()
                && let Some(pointer) = marker_response.interact_pointer_pos()
            {
                pos = pointer;
            }

            if marker_response.drag_stopped() {
                if let Some(pointer) = marker_response.interact_pointer_pos() {
                    self.push(MapEvent::MoveMarker(marker.id, to_lat_lng(projector, pointer)));
                }
            } else if marker_response.clicked() {
                marker_clicked = true;
                self.push(MapEvent::RemoveMarker(marker.id));
            }

            Self::render_marker(
                ui.painter(),
                pos,
                index + 1,
                marker_response.hovered() || marker_response.dragged(),
            );
        }

        if response.clicked()
            && !marker_clicked
            && let Some(pointer) = response.interact_pointer_pos()
        {
            self.push(MapEvent::AddMarker(to_lat_lng(projector, pointer)));
        }
    }
}
