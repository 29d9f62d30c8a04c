//! Browser entry point
//!
//! `WebHandle` is what the page's JavaScript constructs and starts. The app
//! itself is registered by the `eframe_app!` macro at module start, before
//! any handle exists.

use std::sync::OnceLock;
use wasm_bindgen::prelude::*;

type AppCreator = fn(&eframe::CreationContext<'_>) -> Box<dyn eframe::App>;

struct RegisteredApp {
    name: &'static str,
    version: &'static str,
    creator: AppCreator,
}

static REGISTERED_APP: OnceLock<RegisteredApp> = OnceLock::new();

/// Register the app started by `WebHandle::start`. Later calls are ignored.
pub fn set_app_creator(name: &'static str, version: &'static str, creator: AppCreator) {
    if REGISTERED_APP
        .set(RegisteredApp {
            name,
            version,
            creator,
        })
        .is_err()
    {
        tracing::warn!("App creator already registered; ignoring subsequent registration");
    }
}

/// `?envLOG_LEVEL=debug` overrides the default level
fn max_log_level() -> tracing::Level {
    match super::cli::get_env::<String>("LOG_LEVEL")
        .map(|s| s.to_uppercase())
        .as_deref()
    {
        Some("TRACE") => tracing::Level::TRACE,
        Some("DEBUG") => tracing::Level::DEBUG,
        Some("WARN") => tracing::Level::WARN,
        Some("ERROR") => tracing::Level::ERROR,
        Some(_) => tracing::Level::INFO,
        None if cfg!(debug_assertions) => tracing::Level::DEBUG,
        None => tracing::Level::INFO,
    }
}

/// Handle to the web app from JavaScript.
#[derive(Clone)]
#[wasm_bindgen]
pub struct WebHandle {
    runner: eframe::WebRunner,
}

#[wasm_bindgen]
impl WebHandle {
    /// Sets up logging and the panic hook.
    #[allow(clippy::new_without_default)]
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        // GET parameters must be known before the log level is chosen
        super::cli::parse_env();
        {
            use tracing_subscriber::layer::SubscriberExt;
            use tracing_subscriber::util::SubscriberInitExt;
            use tracing_wasm::WASMLayerConfigBuilder;

            let mut builder = WASMLayerConfigBuilder::new();
            builder.set_max_level(max_log_level());
            let _ = tracing_subscriber::registry()
                .with(tracing_wasm::WASMLayer::new(builder.build()))
                .try_init();
        }
        std::panic::set_hook(Box::new(console_error_panic_hook::hook));

        Self {
            runner: eframe::WebRunner::new(),
        }
    }

    /// Start the registered app on `canvas`.
    #[wasm_bindgen]
    pub async fn start(&self, canvas: web_sys::HtmlCanvasElement) -> Result<(), JsValue> {
        let Some(app) = REGISTERED_APP.get() else {
            return Err(JsValue::from_str("no app registered"));
        };
        super::log_version_info(app.name, app.version);

        let creator = app.creator;
        self.runner
            .start(
                canvas,
                eframe::WebOptions::default(),
                Box::new(move |cc| Ok(creator(cc))),
            )
            .await
    }

    #[wasm_bindgen]
    pub fn destroy(&self) {
        self.runner.destroy();
    }

    #[wasm_bindgen]
    pub fn has_panicked(&self) -> bool {
        self.runner.has_panicked()
    }

    #[wasm_bindgen]
    pub fn panic_message(&self) -> Option<String> {
        self.runner.panic_summary().map(|s| s.message())
    }

    #[wasm_bindgen]
    pub fn panic_callstack(&self) -> Option<String> {
        self.runner.panic_summary().map(|s| s.callstack())
    }
}
