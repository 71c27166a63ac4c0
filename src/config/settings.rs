use serde::Deserialize;

/// Top-level configuration for the application.
///
/// Includes settings for the listener and for session behavior.
#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    pub server: ServerSettings,
    pub session: SessionSettings,
}

/// Listener settings: the host and port the server binds to.
#[derive(Debug, Deserialize, Clone)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

/// Session behavior settings.
#[derive(Debug, Deserialize, Clone)]
pub struct SessionSettings {
    /// Seconds a long-poll read may sit idle before the transport fires the
    /// connection's timeout signal and releases the slot.
    pub poll_timeout_secs: u64,
}

/// Partial configuration loaded from files or environment.
///
/// Allows partial specification of settings; missing values are filled from
/// defaults.
#[derive(Debug, Deserialize)]
pub struct PartialSettings {
    pub server: Option<PartialServerSettings>,
    pub session: Option<PartialSessionSettings>,
}

/// Partial listener settings with all values optional.
#[derive(Debug, Deserialize)]
pub struct PartialServerSettings {
    pub host: Option<String>,
    pub port: Option<u16>,
}

/// Partial session settings with all values optional.
#[derive(Debug, Deserialize)]
pub struct PartialSessionSettings {
    pub poll_timeout_secs: Option<u64>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server: ServerSettings {
                host: "127.0.0.1".to_string(),
                port: 8080,
            },
            session: SessionSettings {
                poll_timeout_secs: 30,
            },
        }
    }
}
