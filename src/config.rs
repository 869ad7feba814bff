use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;

/// Upper bound for `otp.ttl_secs`.
pub const MAX_OTP_TTL_SECS: i64 = 24 * 3600;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub messaging: MessagingConfig,
    #[serde(default)]
    pub sheet: SheetConfig,
    #[serde(default)]
    pub otp: OtpConfig,
    #[serde(default)]
    pub upload: UploadConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessagingConfig {
    #[serde(default)]
    pub api_key: String,
    #[serde(default)]
    pub api_url: String,
    #[serde(default = "default_campaign")]
    pub campaign_name: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SheetConfig {
    #[serde(default)]
    pub ingest_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OtpConfig {
    #[serde(default = "default_otp_ttl_secs")]
    pub ttl_secs: i64,
    #[serde(default = "default_sweep_interval_secs")]
    pub sweep_interval_secs: u64,
    #[serde(default = "default_max_entries")]
    pub max_entries: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadConfig {
    #[serde(default = "default_max_file_bytes")]
    pub max_file_bytes: usize,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    10000
}

fn default_campaign() -> String {
    "OTP5".to_string()
}

fn default_timeout_secs() -> u64 {
    15
}

fn default_otp_ttl_secs() -> i64 {
    300
}

fn default_sweep_interval_secs() -> u64 {
    60
}

fn default_max_entries() -> usize {
    10_000
}

fn default_max_file_bytes() -> usize {
    5 * 1024 * 1024
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for MessagingConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            api_url: String::new(),
            campaign_name: default_campaign(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Default for SheetConfig {
    fn default() -> Self {
        Self {
            ingest_url: String::new(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Default for OtpConfig {
    fn default() -> Self {
        Self {
            ttl_secs: default_otp_ttl_secs(),
            sweep_interval_secs: default_sweep_interval_secs(),
            max_entries: default_max_entries(),
        }
    }
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            max_file_bytes: default_max_file_bytes(),
        }
    }
}

impl MessagingConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl SheetConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl OtpConfig {
    pub fn ttl(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.ttl_secs)
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs.max(1))
    }
}

impl Config {
    /// Loads `CONFIG_PATH` (default `config.toml`) and applies environment overrides.
    /// A missing file is not an error: the config then comes from the environment alone.
    pub fn from_toml() -> Result<Self, Box<dyn std::error::Error>> {
        use std::io::ErrorKind;

        let config_path = env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string());

        let file = match std::fs::read_to_string(&config_path) {
            Ok(contents) => Some(contents),
            Err(e) if e.kind() == ErrorKind::NotFound => None,
            Err(e) => {
                return Err(format!("Failed to read config file {config_path}: {e}").into());
            }
        };

        Self::from_sources(file.as_deref(), |name| env::var(name).ok())
    }

    pub fn from_sources<F>(file: Option<&str>, get_env: F) -> Result<Self, Box<dyn std::error::Error>>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config: Config = match file {
            Some(contents) => {
                toml::from_str(contents).map_err(|e| format!("Failed to parse config file: {e}"))?
            }
            None => Config::default(),
        };

        let get_parse = |name: &str| get_env(name).and_then(|v| v.trim().parse::<u64>().ok());

        if let Some(v) = get_env("SERVER_HOST") {
            config.server.host = v;
        }
        if let Some(v) = get_env("PORT")
            && let Ok(p) = v.trim().parse()
        {
            config.server.port = p;
        }
        if let Some(v) = get_env("API_KEY") {
            config.messaging.api_key = v;
        }
        if let Some(v) = get_env("API_URL") {
            config.messaging.api_url = v;
        }
        if let Some(v) = get_env("MESSAGING_CAMPAIGN") {
            config.messaging.campaign_name = v;
        }
        if let Some(v) = get_env("GOOGLE_SHEET_URL") {
            config.sheet.ingest_url = v;
        }
        if let Some(n) = get_parse("HTTP_TIMEOUT_SECS") {
            config.messaging.timeout_secs = n;
            config.sheet.timeout_secs = n;
        }
        if let Some(n) = get_parse("OTP_TTL_SECS")
            && let Ok(n) = i64::try_from(n)
        {
            config.otp.ttl_secs = n;
        }
        if let Some(n) = get_parse("OTP_SWEEP_INTERVAL_SECS") {
            config.otp.sweep_interval_secs = n;
        }
        if let Some(n) = get_parse("OTP_MAX_ENTRIES") {
            config.otp.max_entries = n as usize;
        }
        if let Some(n) = get_parse("UPLOAD_MAX_FILE_BYTES") {
            config.upload.max_file_bytes = n as usize;
        }

        if !(1..=MAX_OTP_TTL_SECS).contains(&config.otp.ttl_secs) {
            return Err(format!(
                "otp.ttl_secs must be between 1 and {MAX_OTP_TTL_SECS}, got {}",
                config.otp.ttl_secs
            )
            .into());
        }

        Ok(config)
    }

    /// Names of the collaborator settings that are still empty.
    pub fn missing_required(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.messaging.api_key.trim().is_empty() {
            missing.push("API_KEY");
        }
        if self.messaging.api_url.trim().is_empty() {
            missing.push("API_URL");
        }
        if self.sheet.ingest_url.trim().is_empty() {
            missing.push("GOOGLE_SHEET_URL");
        }
        missing
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_defaults_without_file_or_env() {
        let config = Config::from_sources(None, env_from(&[])).unwrap();
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 10000);
        assert_eq!(config.messaging.campaign_name, "OTP5");
        assert_eq!(config.otp.ttl_secs, 300);
        assert_eq!(
            config.missing_required(),
            vec!["API_KEY", "API_URL", "GOOGLE_SHEET_URL"]
        );
    }

    #[test]
    fn test_env_overrides_file() {
        let file = r#"
            [server]
            port = 8080

            [messaging]
            api_key = "file-key"
            api_url = "https://messaging.example/send"

            [otp]
            ttl_secs = 120
        "#;
        let config = Config::from_sources(
            Some(file),
            env_from(&[
                ("API_KEY", "env-key"),
                ("GOOGLE_SHEET_URL", "https://sheet.example/exec"),
                ("PORT", "9000"),
            ]),
        )
        .unwrap();

        assert_eq!(config.server.port, 9000);
        assert_eq!(config.messaging.api_key, "env-key");
        assert_eq!(config.messaging.api_url, "https://messaging.example/send");
        assert_eq!(config.sheet.ingest_url, "https://sheet.example/exec");
        assert_eq!(config.otp.ttl_secs, 120);
        assert!(config.missing_required().is_empty());
    }

    #[test]
    fn test_unparseable_numbers_are_ignored() {
        let config = Config::from_sources(
            None,
            env_from(&[("PORT", "not-a-port"), ("OTP_TTL_SECS", "-5")]),
        )
        .unwrap();
        assert_eq!(config.server.port, 10000);
        assert_eq!(config.otp.ttl_secs, 300);
    }

    #[test]
    fn test_invalid_toml_is_an_error() {
        assert!(Config::from_sources(Some("[server"), env_from(&[])).is_err());
    }

    #[test]
    fn test_out_of_range_ttl_is_rejected() {
        for ttl in ["-30", "0", "9223372036854775807"] {
            let file = format!("[otp]\nttl_secs = {ttl}\n");
            assert!(Config::from_sources(Some(&file), env_from(&[])).is_err(), "ttl {ttl}");
        }

        assert!(
            Config::from_sources(None, env_from(&[("OTP_TTL_SECS", "86401")])).is_err()
        );

        let config = Config::from_sources(Some("[otp]\nttl_secs = 86400\n"), env_from(&[])).unwrap();
        assert_eq!(config.otp.ttl(), chrono::Duration::hours(24));
    }
}
