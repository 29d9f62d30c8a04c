use shadow_rs::shadow;

shadow!(build);

/// Log the application version and build information at startup
pub fn log_version_info(app_name: &str, app_version: &str) {
    tracing::info!("{} {} ({})", app_name, app_version, short_version_info());
    tracing::info!(
        "Build date: {} ({})",
        build::BUILD_TIME_2822,
        build::BUILD_RUST_CHANNEL
    );
}

/// `branch@commit`, with `+dirty` for builds from a modified tree
pub fn short_version_info() -> String {
    format!(
        "{}@{}{}",
        build::BRANCH,
        build::SHORT_COMMIT,
        if build::GIT_CLEAN { "" } else { "+dirty" }
    )
}
