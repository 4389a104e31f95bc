use std::path::Path;

use poptart_types::ToastConfig;

use crate::error::ConfigError;

const APP_NAME: &str = "poptart";

/// Load persisted defaults.
///
/// With no explicit path the platform config location is used
/// (`~/.config/poptart/default-config.yml` on Linux); confy creates it with
/// defaults on first run.
pub fn load_config(path: Option<&Path>) -> Result<ToastConfig, ConfigError> {
    let config = match path {
        Some(path) => confy::load_path(path)?,
        None => confy::load(APP_NAME, None)?,
    };
    Ok(config)
}

/// Like [`load_config`] for the default location, but falls back to
/// built-in defaults with a warning instead of failing
pub fn load_or_default() -> ToastConfig {
    load_config(None).unwrap_or_else(|e| {
        tracing::warn!(error = %e, "using default configuration");
        ToastConfig::default()
    })
}
