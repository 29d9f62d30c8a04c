//! UI panels for the application
//!
//! Sidebar with Route, Saved and Settings tabs, the map's sidebar toggle and
//! the help overlay.

use crate::app::state::{SidebarTab, TilesProvider, UiSettings};
use egui::{Color32, RichText, Ui};
use route_planner_lib::format::{format_distance, format_duration, meters_to_time};
use route_planner_lib::{Profile, RoutePlanner, RouteStatus};

/// Requests from the sidebar that the app carries out after drawing it
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SidebarActions {
    pub fit_bounds: bool,
}

/// One-line description of the route computation
fn status_text(status: &RouteStatus, waypoints: usize) -> String {
    match status {
        RouteStatus::Empty if waypoints == 0 => "Click on the map to add a waypoint".to_string(),
        RouteStatus::Empty => "Add another waypoint to get a route".to_string(),
        RouteStatus::Pending(_) => "⏳ Computing route...".to_string(),
        RouteStatus::Ready => "✓ Route ready".to_string(),
        RouteStatus::Failed(message) => format!("⚠ No route: {message}"),
    }
}

/// Render the sidebar toggle button (overlaid on top-right of map)
pub fn sidebar_toggle_button(ui: &mut Ui, ui_settings: &mut UiSettings) {
    let button_size = egui::vec2(40.0, 40.0);
    let margin = 10.0;

    let rect = ui.max_rect();
    let button_pos = rect.right_top() + egui::vec2(-button_size.x - margin, margin);
    let button_rect = egui::Rect::from_min_size(button_pos, button_size);

    let response = ui.allocate_rect(button_rect, egui::Sense::click());

    if response.clicked() {
        ui_settings.sidebar_open = !ui_settings.sidebar_open;
    }

    let bg_color = if response.hovered() {
        ui.visuals().widgets.hovered.bg_fill
    } else {
        ui.visuals().widgets.inactive.bg_fill
    };

    ui.painter().rect_filled(button_rect, 5.0, bg_color);

    let icon = if ui_settings.sidebar_open { "✕" } else { "☰" };

    ui.painter().text(
        button_rect.center(),
        egui::Align2::CENTER_CENTER,
        icon,
        egui::FontId::proportional(20.0),
        ui.visuals().text_color(),
    );
}

/// Render the main sidebar (responsive: side on landscape, bottom on portrait)
pub fn render_sidebar(
    ctx: &egui::Context,
    planner: &mut RoutePlanner,
    ui_settings: &mut UiSettings,
) -> SidebarActions {
    let mut actions = SidebarActions::default();
    if !ui_settings.sidebar_open {
        return actions;
    }

    let screen_size = ctx.viewport_rect().size();
    let is_portrait = screen_size.y > screen_size.x;

    if is_portrait {
        egui::TopBottomPanel::bottom("main_sidebar")
            .default_height(280.0)
            .min_height(180.0)
            .max_height(ctx.viewport_rect().height() * 0.6)
            .resizable(true)
            .show(ctx, |ui| {
                render_sidebar_content(ui, planner, ui_settings, &mut actions);
            });
    } else {
        egui::SidePanel::right("main_sidebar")
            .default_width(300.0)
            .min_width(260.0)
            .max_width(450.0)
            .resizable(true)
            .show(ctx, |ui| {
                render_sidebar_content(ui, planner, ui_settings, &mut actions);
            });
    }
    actions
}

fn render_sidebar_content(
    ui: &mut Ui,
    planner: &mut RoutePlanner,
    ui_settings: &mut UiSettings,
    actions: &mut SidebarActions,
) {
    ui.horizontal(|ui| {
        ui.selectable_value(&mut ui_settings.active_tab, SidebarTab::Route, "🗺 Route");
        ui.selectable_value(
            &mut ui_settings.active_tab,
            SidebarTab::Saved,
            format!("💾 Saved ({})", planner.saved_routes().len()),
        );
        ui.selectable_value(
            &mut ui_settings.active_tab,
            SidebarTab::Settings,
            "⚙ Settings",
        );
    });

    ui.separator();

    egui::ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui| match ui_settings.active_tab {
            SidebarTab::Route => render_route_tab(ui, planner, ui_settings.pace, actions),
            SidebarTab::Saved => render_saved_tab(ui, planner, ui_settings, actions),
            SidebarTab::Settings => render_settings_tab(ui, planner, ui_settings),
        });
}

fn render_route_tab(
    ui: &mut Ui,
    planner: &mut RoutePlanner,
    pace: f64,
    actions: &mut SidebarActions,
) {
    if let Some(name) = planner.viewing() {
        ui.label(RichText::new(format!("Currently viewing: {name}")).strong());
        ui.add_space(4.0);
    }

    let status = planner.status();
    let status_color = match status {
        RouteStatus::Failed(_) => ui.visuals().error_fg_color,
        RouteStatus::Pending(_) => ui.visuals().warn_fg_color,
        _ => ui.visuals().text_color(),
    };
    ui.label(RichText::new(status_text(status, planner.markers().len())).color(status_color));

    ui.add_space(8.0);
    ui.separator();

    ui.label(RichText::new("📊 Summary").strong());
    ui.add_space(4.0);

    egui::Grid::new("summary_grid")
        .num_columns(2)
        .spacing([12.0, 4.0])
        .show(ui, |ui| {
            ui.label("Waypoints:");
            ui.label(RichText::new(planner.markers().len().to_string()).strong());
            ui.end_row();

            ui.label("Distance:");
            ui.label(RichText::new(format_distance(planner.distance())).strong());
            ui.end_row();

            ui.label(format!("{}:", planner.profile().name()));
            ui.label(RichText::new(format_duration(planner.estimated_time())).strong());
            ui.end_row();

            ui.label("Walking estimate:");
            ui.label(RichText::new(meters_to_time(planner.distance(), pace)).strong())
                .on_hover_text(format!("At {pace:.1} min/km"));
            ui.end_row();
        });

    ui.add_space(8.0);
    ui.horizontal(|ui| {
        let has_markers = !planner.markers().is_empty();
        if ui
            .add_enabled(has_markers, egui::Button::new("🎯 Fit to Route"))
            .clicked()
        {
            actions.fit_bounds = true;
        }
        if ui
            .add_enabled(has_markers, egui::Button::new("🗑 Clear All"))
            .clicked()
        {
            planner.remove_all_markers();
        }
    });

    ui.add_space(8.0);
    ui.separator();

    render_save_form(ui, planner);

    let instructions = planner.route().instructions();
    if !instructions.is_empty() {
        ui.add_space(8.0);
        ui.separator();
        egui::CollapsingHeader::new(RichText::new("🧭 Itinerary").strong())
            .default_open(true)
            .show(ui, |ui| {
                for (i, step) in instructions.iter().enumerate() {
                    ui.horizontal_wrapped(|ui| {
                        ui.label(RichText::new(format!("{}.", i + 1)).weak());
                        ui.label(&step.text);
                        if step.distance > 0.0 {
                            ui.label(RichText::new(format_distance(step.distance)).small().weak());
                        }
                    });
                }
            });
    }
}

fn render_save_form(ui: &mut Ui, planner: &mut RoutePlanner) {
    ui.label(RichText::new("💾 Save Route").strong());
    ui.add_space(4.0);

    let mut submit = false;
    ui.horizontal(|ui| {
        let response = ui.add(
            egui::TextEdit::singleline(&mut planner.name_input)
                .hint_text("Route name")
                .desired_width(160.0),
        );
        if response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter)) {
            submit = true;
        }
        if ui.button("Save").clicked() {
            submit = true;
        }
    });

    if submit {
        // Failure is shown below through the name error flag
        let _ = planner.save_route_from_input();
    }

    if planner.name_error() {
        ui.label(
            RichText::new("Please enter a name for the route")
                .small()
                .color(ui.visuals().error_fg_color),
        );
    }
}

fn render_saved_tab(
    ui: &mut Ui,
    planner: &mut RoutePlanner,
    ui_settings: &mut UiSettings,
    actions: &mut SidebarActions,
) {
    if planner.saved_routes().is_empty() {
        ui.label(RichText::new("No saved routes yet").weak());
        ui.label(
            RichText::new("Place waypoints, then save them from the Route tab.")
                .small()
                .weak(),
        );
        return;
    }

    let mut to_restore = None;
    let mut to_delete = None;

    for (index, saved) in planner.saved_routes().iter().enumerate() {
        ui.horizontal(|ui| {
            ui.vertical(|ui| {
                ui.label(RichText::new(saved.display_name(index)).strong());
                ui.label(
                    RichText::new(format!(
                        "{} waypoints · {} · {}",
                        saved.waypoints.len(),
                        format_distance(saved.distance),
                        format_duration(saved.estimated_time)
                    ))
                    .small()
                    .weak(),
                );
            });

            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if ui.small_button("🗑").on_hover_text("Delete").clicked() {
                    to_delete = Some(index);
                }
                if ui.small_button("↺").on_hover_text("Show on map").clicked() {
                    to_restore = Some(index);
                }
            });
        });
        ui.separator();
    }

    if let Some(index) = to_restore
        && planner.restore_route(index)
    {
        ui_settings.active_tab = SidebarTab::Route;
        actions.fit_bounds = true;
    }
    if let Some(index) = to_delete {
        planner.delete_route(index);
    }
}

fn render_settings_tab(ui: &mut Ui, planner: &mut RoutePlanner, ui_settings: &mut UiSettings) {
    ui.label(RichText::new("🧭 Routing").strong());
    ui.add_space(6.0);

    egui::Grid::new("routing_grid")
        .num_columns(2)
        .spacing([12.0, 8.0])
        .show(ui, |ui| {
            ui.label("Profile:");
            let mut profile = planner.profile();
            egui::ComboBox::from_id_salt("profile_combo")
                .selected_text(profile.name())
                .show_ui(ui, |ui| {
                    for p in Profile::all() {
                        ui.selectable_value(&mut profile, *p, p.name());
                    }
                });
            if profile != planner.profile() {
                planner.set_profile(profile);
            }
            ui.end_row();

            ui.label("Walking pace:");
            ui.add(
                egui::Slider::new(&mut ui_settings.pace, 3.0..=20.0)
                    .suffix(" min/km")
                    .step_by(0.5),
            );
            ui.end_row();
        });

    ui.add_space(12.0);
    ui.separator();
    ui.add_space(8.0);

    ui.label(RichText::new("🗺 Map Tiles").strong());
    ui.add_space(6.0);

    for provider in TilesProvider::all() {
        let selected = ui_settings.tiles_provider == *provider;
        if ui.selectable_label(selected, provider.name()).clicked() {
            ui_settings.tiles_provider = *provider;
        }
    }

    ui.add_space(4.0);
    ui.label(
        RichText::new(ui_settings.tiles_provider.attribution())
            .small()
            .italics()
            .weak(),
    );

    ui.add_space(12.0);
    ui.separator();
    ui.add_space(8.0);

    ui.label(RichText::new("🔧 Debug").strong());
    ui.add_space(6.0);

    ui.checkbox(&mut ui_settings.show_profiling, "Show profiling controls");
    if ui_settings.show_profiling {
        ui.add_space(4.0);
        eframe_entrypoints::profiling_ui(ui);
    }

    ui.add_space(12.0);
    ui.separator();
    ui.add_space(8.0);

    ui.label(RichText::new("ℹ About").strong());
    ui.add_space(4.0);
    ui.label(RichText::new(format!("Route Planner {}", env!("CARGO_PKG_VERSION"))).small());
    ui.label(
        RichText::new(eframe_entrypoints::short_version_info())
            .small()
            .weak(),
    );
    ui.add_space(4.0);
    ui.label(RichText::new("Keyboard shortcuts:").small());
    ui.label(RichText::new("  F1 / Ctrl+H - Toggle help").small().weak());
}

/// Help overlay
pub fn help_overlay(ctx: &egui::Context, show_help: &mut bool) {
    egui::Window::new("Help")
        .collapsible(false)
        .resizable(false)
        .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
        .show(ctx, |ui| {
            ui.heading("Route Planner");
            ui.add_space(8.0);

            ui.label("Plan a route by placing waypoints on the map.");
            ui.add_space(12.0);

            ui.label(RichText::new("Waypoints").strong());
            ui.label("• Click on the map to add a waypoint");
            ui.label("• Click a waypoint to remove it");
            ui.label("• Drag a waypoint to move it");
            ui.label("• The route follows the waypoints in the order they were added");
            ui.add_space(8.0);

            ui.label(RichText::new("Saved Routes").strong());
            ui.label("• Name the route and press Save in the Route tab");
            ui.label("• Restore or delete routes in the Saved tab");
            ui.add_space(8.0);

            ui.label(RichText::new("Keyboard Shortcuts").strong());
            ui.label("• F1 or Ctrl+H - Toggle this help");
            ui.add_space(12.0);

            if ui.button("Close").clicked() {
                *show_help = false;
            }
        });
}

#[cfg(test)]
mod tests {
    use super::*;
    use route_planner_lib::{LatLng, MemoryStorage, RoutingError};

    #[test]
    fn test_status_text() {
        assert_eq!(
            status_text(&RouteStatus::Empty, 0),
            "Click on the map to add a waypoint"
        );
        assert_eq!(
            status_text(&RouteStatus::Empty, 1),
            "Add another waypoint to get a route"
        );
        assert_eq!(status_text(&RouteStatus::Ready, 2), "✓ Route ready");
    }

    #[test]
    fn test_failed_status_shows_reason() {
        let mut planner = RoutePlanner::new(Box::new(MemoryStorage::new()), Profile::Foot);
        planner.add_marker(LatLng::new(51.53, 4.27));
        planner.add_marker(LatLng::new(51.54, 4.28));
        let request = planner.take_request().unwrap();
        planner.apply_route_response(request.id, Err(RoutingError::NoRoute));

        let text = status_text(planner.status(), planner.markers().len());
        assert!(text.starts_with("⚠ No route: "));
        assert!(text.len() > "⚠ No route: ".len());
    }
}
