//! Typed configuration record, built from the CLI surface via `clap`'s derive API.

use std::path::PathBuf;

use clap::Parser;

pub const DEFAULT_LIVE_MAPS_URL: &str = "https://www.beyondallreason.info/api/maps";
pub const DEFAULT_MQTT_TOPIC: &str = "maps/sync";
const DEFAULT_DELETE_AFTER_SECS: i64 = 4 * 60 * 60;
const DEFAULT_POLLING_INTERVAL_SECS: u64 = 10 * 60;
const DEFAULT_MQTT_PORT: u16 = 8883;

/// Synchronizes a local directory with a remotely-published live-map inventory.
#[derive(Debug, Parser)]
#[command(name = "mapsyncd", version, about)]
pub struct Config {
    /// Target directory to keep in sync.
    pub maps_directory: PathBuf,

    /// Log level: trace, debug, info, warn, or error.
    #[arg(long, default_value = "warn")]
    pub log_level: String,

    /// URL of the authoritative live-map inventory.
    #[arg(long, default_value = DEFAULT_LIVE_MAPS_URL)]
    pub live_maps_url: String,

    /// Seconds a file may be absent from the inventory before deletion. Negative
    /// disables deletion entirely.
    #[arg(long, default_value_t = DEFAULT_DELETE_AFTER_SECS)]
    pub delete_after: i64,

    /// Timer interval, in seconds, between periodic sync passes.
    #[arg(long, default_value_t = DEFAULT_POLLING_INTERVAL_SECS)]
    pub polling_interval: u64,

    /// MQTT broker host. Absence disables the subscription trigger source.
    #[arg(long)]
    pub mqtt_host: Option<String>,

    /// MQTT broker port.
    #[arg(long, default_value_t = DEFAULT_MQTT_PORT)]
    pub mqtt_port: u16,

    /// Disable TLS for the MQTT connection.
    #[arg(long)]
    pub mqtt_no_tls: bool,

    /// MQTT topic to subscribe to.
    #[arg(long, default_value = DEFAULT_MQTT_TOPIC)]
    pub mqtt_topic: String,

    /// MQTT username, falling back to the MQTT_USERNAME environment variable.
    #[arg(long, env = "MQTT_USERNAME")]
    pub mqtt_username: Option<String>,

    /// MQTT password, falling back to the MQTT_PASSWORD environment variable.
    #[arg(long, env = "MQTT_PASSWORD")]
    pub mqtt_password: Option<String>,

    /// URL pinged after every successful sync pass.
    #[arg(long)]
    pub healthcheck_url: Option<String>,
}

impl Config {
    pub fn mqtt_config(&self) -> Option<crate::triggers::mqtt::MqttConfig> {
        Some(crate::triggers::mqtt::MqttConfig {
            host: self.mqtt_host.clone()?,
            port: self.mqtt_port,
            tls: !self.mqtt_no_tls,
            topic: self.mqtt_topic.clone(),
            username: self.mqtt_username.clone(),
            password: self.mqtt_password.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_required_positional_with_defaults() {
        let config = Config::parse_from(["mapsyncd", "/var/lib/maps"]);
        assert_eq!(config.maps_directory, PathBuf::from("/var/lib/maps"));
        assert_eq!(config.delete_after, DEFAULT_DELETE_AFTER_SECS);
        assert_eq!(config.polling_interval, DEFAULT_POLLING_INTERVAL_SECS);
        assert_eq!(config.mqtt_port, DEFAULT_MQTT_PORT);
        assert!(config.mqtt_host.is_none());
    }

    #[test]
    fn mqtt_config_is_none_without_host() {
        let config = Config::parse_from(["mapsyncd", "/var/lib/maps"]);
        assert!(config.mqtt_config().is_none());
    }

    #[test]
    fn mqtt_config_inverts_no_tls_flag() {
        let config = Config::parse_from(["mapsyncd", "/var/lib/maps", "--mqtt-host", "broker", "--mqtt-no-tls"]);
        let mqtt = config.mqtt_config().unwrap();
        assert!(!mqtt.tls);
    }
}
