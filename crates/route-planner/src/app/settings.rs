use clap::Parser;
use eframe_entrypoints::parse_args;
use route_planner_lib::{DEFAULT_OSRM_URL, Profile};
use std::path::PathBuf;

#[derive(Parser, Debug, Clone)]
#[clap(author, version, about, long_about = None)]
/// Route Planner - click waypoints on a map and get a routed path with distance and time
pub struct Settings {
    /// Base URL of the OSRM route service (without the profile segment)
    #[clap(long, default_value = DEFAULT_OSRM_URL)]
    pub routing_url: String,

    /// Travel profile: foot, bike or car
    #[clap(long, default_value = "foot")]
    pub profile: Profile,

    /// Walking pace in minutes per kilometer (overrides the saved setting)
    #[clap(long)]
    pub pace: Option<f64>,

    /// Abort routing requests after this many seconds (desktop only)
    #[clap(long, value_name = "SECONDS")]
    pub routing_timeout_secs: Option<u64>,

    /// File holding saved routes (desktop only, defaults to the user config directory)
    #[clap(long, value_name = "FILE")]
    pub storage_path: Option<PathBuf>,

    /// Ignore previously persisted UI settings and start fresh
    #[clap(long, default_value = "false")]
    pub ignore_persisted: bool,
}

impl Settings {
    pub fn from_cli() -> Self {
        match parse_args::<Settings>() {
            Ok(args) => args,
            Err(e) => {
                #[cfg(not(target_arch = "wasm32"))]
                e.exit();
                #[cfg(target_arch = "wasm32")]
                {
                    let user_msg = format!(
                        "Error parsing CLI:\n{}\n
    You should change the GET params, using the cli prefix.\n
    Starting anyway without args.",
                        e
                    );
                    if let Some(window) = web_sys::window() {
                        window.alert_with_message(&user_msg).unwrap_or(());
                    } else {
                        tracing::error!(user_msg);
                    }
                    Settings::parse_from(["route-planner"])
                }
            }
        }
    }
}
