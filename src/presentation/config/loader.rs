use config::Environment as EnvironmentSource;
use config::{Config, ConfigError, File};

use super::{Environment, Settings};

/// Loads settings from, in increasing precedence: built-in defaults,
/// `appsettings.toml`, `appsettings.{environment}.toml`, and `APP_*`
/// environment variables (`APP_REDIS__URL` sets `redis.url`).
pub fn load_settings() -> Result<(Environment, Settings), ConfigError> {
    dotenvy::dotenv().ok();

    let environment = Environment::from_env().map_err(ConfigError::Message)?;

    let configuration = Config::builder()
        .add_source(File::with_name("appsettings").required(false))
        .add_source(File::with_name(&format!("appsettings.{}", environment.as_str())).required(false))
        .add_source(
            EnvironmentSource::with_prefix("APP")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    let settings: Settings = configuration.try_deserialize()?;
    Ok((environment, settings))
}
