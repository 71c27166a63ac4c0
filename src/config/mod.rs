//! Configuration loading: a `config/default` file and environment variables
//! layered over built-in defaults.

mod settings;

use crate::config::settings::PartialSettings;
use config::{Config, ConfigError, Environment, File};

pub use settings::{ServerSettings, SessionSettings, Settings};

/// Loads the configuration from the default file and environment variables,
/// merging whatever is present with the built-in defaults.
pub fn load_config() -> Result<Settings, ConfigError> {
    let builder = Config::builder()
        .add_source(File::with_name("config/default").required(false))
        .add_source(Environment::default().separator("_").try_parsing(true));

    let config = builder.build()?;

    // Deserialize what is available, then fill the gaps from defaults.
    let partial: PartialSettings = config.try_deserialize()?;
    let default = Settings::default();

    Ok(Settings {
        server: ServerSettings {
            host: partial
                .server
                .as_ref()
                .and_then(|s| s.host.clone())
                .unwrap_or(default.server.host),
            port: partial
                .server
                .as_ref()
                .and_then(|s| s.port)
                .unwrap_or(default.server.port),
        },
        session: SessionSettings {
            poll_timeout_secs: partial
                .session
                .as_ref()
                .and_then(|s| s.poll_timeout_secs)
                .unwrap_or(default.session.poll_timeout_secs),
        },
    })
}
