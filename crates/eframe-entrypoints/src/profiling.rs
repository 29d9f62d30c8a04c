/*!
Logging setup and optional chrome tracing.

Two implementations share one API:

- with `feature = "profiling"`: a reloadable `tracing-chrome` layer sits next
  to the fmt layer, so a trace can be recorded on demand from the settings
  panel (or from startup with `ENABLE_PROFILING`). Stopping flushes
  `trace-*.json` into the working directory, ready for Perfetto.
- otherwise: logging only, and the profiling calls do nothing.

`RUST_LOG` always wins; without it a default filter is installed that keeps
the route planner crates verbose in debug builds and quiets eframe and the
HTTP stack.
*/

#[cfg(not(target_arch = "wasm32"))]
const DEFAULT_FILTER_DEBUG: &str = "debug,route_planner=debug,route_planner_lib=debug,eframe::native=warn,egui::context=warn,walkers=info,hyper_util=info,reqwest::connect=info";
#[cfg(not(target_arch = "wasm32"))]
const DEFAULT_FILTER_RELEASE: &str = "info,eframe=warn,egui::context=warn,walkers=warn";

#[cfg(not(target_arch = "wasm32"))]
fn default_filter() -> tracing_subscriber::EnvFilter {
    use tracing_subscriber::EnvFilter;

    if std::env::var("RUST_LOG").is_ok() {
        return EnvFilter::from_default_env();
    }
    if cfg!(debug_assertions) {
        EnvFilter::new(DEFAULT_FILTER_DEBUG)
    } else {
        EnvFilter::new(DEFAULT_FILTER_RELEASE)
    }
}

#[cfg(all(feature = "profiling", not(target_arch = "wasm32")))]
mod inner {
    use std::sync::Mutex;

    use tracing_chrome::{ChromeLayer, FlushGuard};
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::{Registry, reload};

    struct ProfilingState {
        reload_handle: reload::Handle<Option<ChromeLayer<Registry>>, Registry>,
        /// Flushes the trace file when dropped; `Some` while recording
        guard: Option<FlushGuard>,
    }

    static PROFILING_STATE: Mutex<Option<ProfilingState>> = Mutex::new(None);

    fn with_state<R>(f: impl FnOnce(&mut Option<ProfilingState>) -> R) -> R {
        let mut guard = match PROFILING_STATE.lock() {
            Ok(g) => g,
            Err(poisoned) => {
                tracing::warn!("Profiling state mutex poisoned; recovering");
                poisoned.into_inner()
            }
        };
        f(&mut guard)
    }

    pub fn setup_logging_and_profiling() {
        let fmt_layer = tracing_subscriber::fmt::layer().with_filter(super::default_filter());

        let (reload_layer, reload_handle) = reload::Layer::new(None::<ChromeLayer<Registry>>);
        let registry = tracing_subscriber::registry()
            .with(reload_layer)
            .with(fmt_layer);

        with_state(|state| {
            *state = Some(ProfilingState {
                reload_handle,
                guard: None,
            })
        });

        if registry.try_init().is_err() {
            tracing::warn!("A global tracing subscriber was already installed");
        }
        tracing::info!("Tracing initialized with reloadable chrome profiling layer");

        if std::env::var("ENABLE_PROFILING").is_ok() {
            tracing::info!("ENABLE_PROFILING set, recording from startup");
            start_profiling();
        }
    }

    pub fn start_profiling() {
        with_state(|state| {
            let Some(state) = state.as_mut() else {
                tracing::error!("Profiling state not initialized");
                return;
            };
            if state.guard.is_some() {
                tracing::warn!("Profiling already enabled");
                return;
            }

            let (chrome_layer, guard) = tracing_chrome::ChromeLayerBuilder::new().build();
            if let Err(e) = state.reload_handle.reload(Some(chrome_layer)) {
                tracing::error!("Failed to enable chrome layer: {:?}", e);
                return;
            }
            state.guard = Some(guard);
            tracing::info!("Profiling session started");
        })
    }

    pub fn stop_profiling() {
        with_state(|state| {
            let Some(state) = state.as_mut() else {
                tracing::error!("Profiling state not initialized");
                return;
            };
            if state.guard.is_none() {
                tracing::warn!("Profiling not enabled");
                return;
            }

            if let Err(e) = state.reload_handle.reload(None::<ChromeLayer<Registry>>) {
                tracing::error!("Failed to disable chrome layer: {:?}", e);
            }
            // Dropping the guard writes the trace file
            state.guard = None;

            let dir = std::env::current_dir()
                .map(|d| d.display().to_string())
                .unwrap_or_else(|_| ".".to_string());
            tracing::info!(
                "Profiling session stopped; open the newest trace-*.json in {} with https://ui.perfetto.dev",
                dir
            );
        })
    }

    pub fn is_profiling_enabled() -> bool {
        with_state(|state| state.as_ref().is_some_and(|s| s.guard.is_some()))
    }

    pub fn profiling_ui(ui: &mut egui::Ui) {
        egui::warn_if_debug_build(ui);

        let mut enabled = is_profiling_enabled();
        if ui.checkbox(&mut enabled, "Record chrome trace").changed() {
            if enabled {
                start_profiling();
            } else {
                stop_profiling();
            }
        }

        if enabled {
            ui.label("⏺ Recording. Uncheck to write the trace file.");
        }
    }
}

#[cfg(not(all(feature = "profiling", not(target_arch = "wasm32"))))]
mod inner {
    /// Install the logging subscriber. On the web `WebHandle::new` does this.
    pub fn setup_logging_and_profiling() {
        #[cfg(not(target_arch = "wasm32"))]
        {
            use tracing_subscriber::prelude::*;

            let fmt_layer = tracing_subscriber::fmt::layer().with_filter(super::default_filter());
            if tracing_subscriber::registry()
                .with(fmt_layer)
                .try_init()
                .is_err()
            {
                tracing::warn!("A global tracing subscriber was already installed");
            }
            tracing::info!("Logging initialized (profiling disabled in this build)");
        }
    }

    pub fn start_profiling() {
        tracing::info!("start_profiling() called but profiling is disabled in this build");
    }

    pub fn stop_profiling() {
        tracing::info!("stop_profiling() called but profiling is disabled in this build");
    }

    pub fn is_profiling_enabled() -> bool {
        false
    }

    pub fn profiling_ui(ui: &mut egui::Ui) {
        egui::warn_if_debug_build(ui);
        ui.label("Profiling is not enabled in this build.");
    }
}

pub use inner::{
    is_profiling_enabled, profiling_ui, setup_logging_and_profiling, start_profiling,
    stop_profiling,
};

#[cfg(all(test, not(target_arch = "wasm32")))]
mod tests {
    use super::*;

    #[test]
    fn test_default_filters_parse() {
        assert!(DEFAULT_FILTER_DEBUG.parse::<tracing_subscriber::EnvFilter>().is_ok());
        assert!(DEFAULT_FILTER_RELEASE.parse::<tracing_subscriber::EnvFilter>().is_ok());
    }

    #[test]
    fn test_not_recording_by_default() {
        assert!(!is_profiling_enabled());
    }
}
