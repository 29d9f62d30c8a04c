//! Native and web entry points for the route planner's eframe app
//!
//! Besides starting the app, this crate owns the ambient setup every platform
//! needs: logging (and optional chrome tracing), version metadata, CLI or
//! URL-parameter configuration and task spawning.
//!
//! # Usage
//!
//! In the application's `lib.rs`:
//!
//! ```ignore
//! eframe_entrypoints::eframe_app!(
//!     "Route Planner",
//!     |cc| Box::new(MyApp::new(cc))
//! );
//! ```
//!
//! This generates `create_egui_app` plus a module-start hook registering it on
//! web builds, and `run_native()` on desktop builds. `main.rs` then calls
//! `my_app::run_native()`.

pub mod async_runtime;
pub mod cli;
pub mod profiling;

pub use cli::{get_env, parse_args};
pub use profiling::profiling_ui;

mod metadata;
pub use metadata::{log_version_info, short_version_info};

#[cfg(target_arch = "wasm32")]
pub mod web;
#[cfg(target_arch = "wasm32")]
pub use web::WebHandle;

pub use eframe;
pub use eframe::CreationContext;

/// Define the platform entry points for an eframe application.
///
/// * `$app_name` - window title and log prefix
/// * `$app_creator` - `fn(&CreationContext) -> Box<dyn eframe::App>` (a
///   non-capturing closure)
///
/// The calling crate must depend on `wasm-bindgen` for web builds and on
/// `tokio` with `rt-multi-thread` for native ones.
#[macro_export]
macro_rules! eframe_app {
    ($app_name:expr, $app_creator:expr) => {
        #[cfg(target_arch = "wasm32")]
        #[unsafe(no_mangle)] // SAFETY: there is no other global function of this name
        pub fn create_egui_app(
            cc: &$crate::eframe::CreationContext<'_>,
        ) -> Box<dyn $crate::eframe::App> {
            let creator: fn(&$crate::eframe::CreationContext<'_>) -> Box<dyn $crate::eframe::App> =
                $app_creator;
            creator(cc)
        }

        #[cfg(target_arch = "wasm32")]
        #[::wasm_bindgen::prelude::wasm_bindgen(start)]
        pub fn register_egui_app() {
            $crate::web::set_app_creator($app_name, env!("CARGO_PKG_VERSION"), create_egui_app);
        }

        /// Run the application on desktop platforms. Call this from `main.rs`.
        #[cfg(not(target_arch = "wasm32"))]
        pub fn run_native() -> Result<(), $crate::eframe::Error> {
            let rt = match ::tokio::runtime::Builder::new_multi_thread()
                .enable_all()
                .build()
            {
                Ok(rt) => rt,
                Err(e) => {
                    eprintln!("Failed to create Tokio runtime: {e}");
                    std::process::exit(1);
                }
            };

            rt.block_on(async {
                $crate::native_main_impl($app_name, env!("CARGO_PKG_VERSION"), $app_creator)
            })
        }
    };
}

/// Desktop entry point. Use the `eframe_app!` macro instead of calling this directly.
///
/// Must run inside a Tokio runtime so the app can spawn tasks from `update`.
#[cfg(not(target_arch = "wasm32"))]
#[doc(hidden)]
pub fn native_main_impl(
    app_name: &str,
    app_version: &str,
    app_creator: impl FnOnce(&eframe::CreationContext<'_>) -> Box<dyn eframe::App> + 'static,
) -> Result<(), eframe::Error> {
    // Before any logging, so early events reach the subscriber
    profiling::setup_logging_and_profiling();

    log_version_info(app_name, app_version);

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 720.0])
            .with_min_inner_size([480.0, 320.0])
            .with_title(app_name),
        ..Default::default()
    };

    eframe::run_native(
        app_name,
        native_options,
        Box::new(move |cc| Ok(app_creator(cc))),
    )
    .inspect_err(|e| tracing::error!("{} exited with an error: {}", app_name, e))
}
