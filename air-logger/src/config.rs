use serde::{Deserialize, Serialize};
use std::{fmt, time::Duration};
use uploader::Target;

#[cfg(target_os = "macos")]
const DEFAULT_PORT_PREFIX: &str = "/dev/cu.usbmodem";
#[cfg(not(target_os = "macos"))]
const DEFAULT_PORT_PREFIX: &str = "/dev/ttyACM";

#[cfg(target_os = "macos")]
const DEFAULT_FALLBACK_PORT: &str = "/dev/cu.usbmodem101";
#[cfg(not(target_os = "macos"))]
const DEFAULT_FALLBACK_PORT: &str = "/dev/ttyACM0";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub serial: SerialConfig,
    pub upload: UploadConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SerialConfig {
    /// Device path; when unset the port is discovered by prefix.
    #[serde(default)]
    pub port: Option<String>,
    pub port_prefix: String,
    pub fallback_port: String,
    pub baud_rate: u32,
    pub read_timeout_ms: u64,
}

#[derive(Clone, Serialize, Deserialize)]
pub struct UploadConfig {
    pub url: String,
    pub api_key: String,
    pub timeout_seconds: u64,
}

impl Config {
    /// Load configuration from built-in defaults, `air-logger/config.toml` (optional)
    /// and `KUUKI_` environment variables, later sources overriding earlier ones.
    pub fn load() -> Result<Self, config::ConfigError> {
        let _ = dotenvy::dotenv();

        defaults()?
            .add_source(config::File::with_name("air-logger/config").required(false))
            .add_source(
                config::Environment::with_prefix("KUUKI")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()
    }

    /// Built-in defaults overlaid with a TOML document.
    pub fn from_toml(toml: &str) -> Result<Self, config::ConfigError> {
        defaults()?
            .add_source(config::File::from_str(toml, config::FileFormat::Toml))
            .build()?
            .try_deserialize()
    }
}

fn defaults() -> Result<config::ConfigBuilder<config::builder::DefaultState>, config::ConfigError> {
    config::Config::builder()
        .set_default("serial.port_prefix", DEFAULT_PORT_PREFIX)?
        .set_default("serial.fallback_port", DEFAULT_FALLBACK_PORT)?
        .set_default("serial.baud_rate", 9600_i64)?
        .set_default("serial.read_timeout_ms", 2000_i64)?
        .set_default("upload.url", "https://api.thingspeak.com/update")?
        .set_default("upload.api_key", "")?
        .set_default("upload.timeout_seconds", 10_i64)
}

impl SerialConfig {
    pub fn read_timeout(&self) -> Duration {
        Duration::from_millis(self.read_timeout_ms)
    }

    /// The configured port, or the first attached one matching `port_prefix`.
    pub fn resolve_port(&self) -> String {
        match &self.port {
            Some(port) => port.clone(),
            None => serial_source::discover_port(&self.port_prefix, &self.fallback_port),
        }
    }
}

impl UploadConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    pub fn target(&self) -> Target {
        Target {
            url: self.url.clone(),
            api_key: self.api_key.clone(),
            timeout: self.timeout(),
        }
    }
}

impl fmt::Debug for UploadConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UploadConfig")
            .field("url", &self.url)
            .field("api_key", &"<redacted>")
            .field("timeout_seconds", &self.timeout_seconds)
            .finish()
    }
}
