use serde::Deserialize;

/// Root application configuration. Loaded from environment variables
/// with the prefix `ZAPLINE__` and sensible development defaults.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_instance_name")]
    pub instance_name: String,
    /// Seed the in-memory stores with demo contacts, tags and team members.
    #[serde(default = "default_demo_data")]
    pub demo_data: bool,
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub dispatch: DispatchConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_http_port")]
    pub http_port: u16,
}

/// Settings for the simulated campaign dispatch loop. Sending is a timer
/// simulation over the in-memory store; the cadence of a campaign is
/// replayed on a compressed virtual clock.
#[derive(Debug, Clone, Deserialize)]
pub struct DispatchConfig {
    /// How often dispatching campaigns advance, in milliseconds.
    #[serde(default = "default_tick_ms")]
    pub tick_ms: u64,
    /// Virtual seconds that elapse per real second of ticking.
    #[serde(default = "default_time_scale")]
    pub time_scale: f64,
    /// Fraction of sent messages that end up delivered.
    #[serde(default = "default_delivery_rate")]
    pub delivery_rate: f64,
}

// Default functions
fn default_instance_name() -> String {
    "zapline-dev".to_string()
}
fn default_demo_data() -> bool {
    true
}
fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_http_port() -> u16 {
    8080
}
fn default_tick_ms() -> u64 {
    500
}
fn default_time_scale() -> f64 {
    60.0
}
fn default_delivery_rate() -> f64 {
    0.97
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            instance_name: default_instance_name(),
            demo_data: default_demo_data(),
            api: ApiConfig::default(),
            dispatch: DispatchConfig::default(),
        }
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            http_port: default_http_port(),
        }
    }
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            tick_ms: default_tick_ms(),
            time_scale: default_time_scale(),
            delivery_rate: default_delivery_rate(),
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, config::ConfigError> {
        let builder = config::Config::builder().add_source(
            config::Environment::with_prefix("ZAPLINE")
                .separator("__")
                .try_parsing(true)
                .list_separator(","),
        );

        let config = builder.build()?;
        config.try_deserialize()
    }
}
