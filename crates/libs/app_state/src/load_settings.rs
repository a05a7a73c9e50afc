use crate::{AppSettings, RawSettings};
use color_eyre::eyre::{Context, Result};
use std::path::Path;
use tracing::debug;

/// Load settings from `config/settings.yaml`, overridden by `.env` and `APP__*` variables.
pub fn load_app_settings() -> Result<AppSettings> {
    load_settings_from_path(Path::new("config/settings.yaml"), true)
}

/// Load settings from a specific yaml file.
///
/// When `use_env` is set, `.env` is loaded first and `APP__SECTION__KEY` variables
/// override values from the file (e.g. `APP__SECRETS__SPEECH_API_KEY`).
pub fn load_settings_from_path(path: &Path, use_env: bool) -> Result<AppSettings> {
    if use_env {
        // Need to load from dotenv to get it to overwrite the secrets from env.
        dotenv::from_path(".env").ok();
    }
    let config_path = path
        .canonicalize()
        .wrap_err_with(|| format!("Cannot find settings file {}", path.display()))?;
    debug!("Loading settings from {}", config_path.display());

    let mut builder = config::Config::builder().add_source(config::File::from(config_path));
    if use_env {
        builder = builder.add_source(
            config::Environment::with_prefix("APP")
                .separator("__")
                .try_parsing(true),
        );
    }

    let raw_settings = builder.build()?.try_deserialize::<RawSettings>()?;
    AppSettings::try_from(raw_settings)
}
