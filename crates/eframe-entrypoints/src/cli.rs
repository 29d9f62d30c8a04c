//! Configuration from the command line (native) or the page URL (web)
//!
//! On the web there is no argv, so GET parameters stand in for it:
//! `?cliprofile=bike&cliignore-persisted` becomes
//! `--profile bike --ignore-persisted`, and `?envLOG_LEVEL=debug` provides
//! the value returned by `get_env("LOG_LEVEL")`.

use clap::Parser;
#[cfg(target_arch = "wasm32")]
use std::collections::HashMap;

#[cfg(target_arch = "wasm32")]
thread_local! {
    static ENV_MAP: std::cell::RefCell<HashMap<String, String>> = std::cell::RefCell::new(HashMap::new());
}

/// Read an environment variable (native) or `env`-prefixed GET parameter (web)
pub fn get_env<T: std::str::FromStr>(key: &str) -> Option<T> {
    #[cfg(target_arch = "wasm32")]
    {
        ENV_MAP.with(|map| map.borrow().get(key).and_then(|s| s.parse().ok()))
    }
    #[cfg(not(target_arch = "wasm32"))]
    {
        std::env::var(key).ok().and_then(|s| s.parse().ok())
    }
}

/// Split a query string into `cli` arguments and `env` values
#[cfg_attr(not(target_arch = "wasm32"), allow(dead_code))]
fn split_query(query: &str) -> (Vec<String>, Vec<(String, String)>) {
    let mut args = Vec::new();
    let mut env = Vec::new();

    for pair in query.split('&').filter(|p| !p.is_empty()) {
        let (key, value) = match pair.split_once('=') {
            Some((k, v)) => (k, v),
            None => (pair, ""),
        };
        if let Some(arg) = key.strip_prefix("cli") {
            if !arg.is_empty() {
                args.push(format!("--{}", arg));
            }
            if !value.is_empty() {
                args.push(value.to_string());
            }
        } else if let Some(var) = key.strip_prefix("env")
            && !var.is_empty()
        {
            env.push((var.to_string(), value.to_string()));
        }
    }

    (args, env)
}

#[cfg(target_arch = "wasm32")]
fn location_query() -> String {
    web_sys::window()
        .and_then(|w| w.location().search().ok())
        .map(|s| s.trim_start_matches('?').to_string())
        .unwrap_or_default()
}

/// Record `env`-prefixed GET parameters so `get_env` can see them.
/// On native this does nothing; real environment variables are used.
pub fn parse_env() {
    #[cfg(target_arch = "wasm32")]
    {
        let (_, env) = split_query(&location_query());
        ENV_MAP.with(|map| map.borrow_mut().extend(env));
    }
}

/// Parse `T` from argv on native, or from `cli`-prefixed GET parameters on web
pub fn parse_args<T: Parser>() -> Result<T, clap::Error> {
    #[cfg(not(target_arch = "wasm32"))]
    {
        T::try_parse()
    }
    #[cfg(target_arch = "wasm32")]
    {
        let (args, _) = split_query(&location_query());
        let bin = std::iter::once(T::command().get_name().to_string());
        T::try_parse_from(bin.chain(args))
    }
}
