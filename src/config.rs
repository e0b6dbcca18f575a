//! Session configuration loading from the benchmark configuration file.
//!
//! The file is a flat `key=value` list shared by every benchmark on a test
//! machine. Lines starting with `#` are comments. The default location can be
//! overridden with the `RADBENCH_LOG_CONFIG` environment variable.
//!
//! # Keys
//!
//! | Key | Default | Description |
//! |---|---|---|
//! | `server_ip` | (required for network transports) | Collector host |
//! | `port` | (required for network transports) | Collector port |
//! | `transport` | `udp` | `udp`/`datagram`, `tcp`/`sync` or `memory` |
//! | `vardir` | `/var/radiation-benchmarks` | Local logs go to `<vardir>/log` |
//! | `ecc` | `OFF` | ECC setting recorded in the log file name |
//! | `max_errors_per_iter` | 500 | Error count cap per iteration |
//! | `max_infos_per_iter` | 500 | Info count cap per iteration |
//! | `iter_interval_print` | 1 | Emit timing every N iterations |
//! | `double_error_kill` | true | Kill on errors in consecutive iterations |
//! | `info_overflow_fatal` | true | Whether info overflow kills the process |

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::Serialize;
use thiserror::Error;

use crate::transport::TransportKind;

/// Default location of the machine-wide configuration file.
pub const DEFAULT_CONFIG_PATH: &str = "/etc/radiation-benchmarks.conf";

/// Environment variable that overrides [`DEFAULT_CONFIG_PATH`].
pub const CONFIG_PATH_ENV: &str = "RADBENCH_LOG_CONFIG";

const DEFAULT_VAR_DIR: &str = "/var/radiation-benchmarks";
const DEFAULT_ECC: &str = "OFF";
pub const DEFAULT_MAX_ERRORS_PER_ITER: usize = 500;
pub const DEFAULT_MAX_INFOS_PER_ITER: usize = 500;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Couldn't open {path}: {source}")]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed configuration line {line}: {content:?}")]
    Malformed { line: usize, content: String },

    #[error("Missing required key: {0}")]
    MissingKey(String),

    #[error("Invalid value for {key}: {value:?}")]
    InvalidValue { key: String, value: String },

    #[error("Benchmark name is {len} bytes, the header length prefix allows at most 255")]
    BenchmarkNameTooLong { len: usize },
}

/// Resolve the configuration file path, honoring [`CONFIG_PATH_ENV`].
pub fn config_path() -> PathBuf {
    match std::env::var(CONFIG_PATH_ENV) {
        Ok(val) if !val.trim().is_empty() => PathBuf::from(val),
        _ => PathBuf::from(DEFAULT_CONFIG_PATH),
    }
}

/// Parsed `key=value` configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigStore {
    values: HashMap<String, String>,
}

impl ConfigStore {
    /// Read and parse the file at `path`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Unreadable {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&text)
    }

    /// Parse configuration text. Later keys override earlier ones.
    pub fn parse(text: &str) -> Result<Self, ConfigError> {
        let mut values = HashMap::new();
        for (idx, raw) in text.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let Some((key, value)) = line.split_once('=') else {
                return Err(ConfigError::Malformed {
                    line: idx + 1,
                    content: raw.to_string(),
                });
            };
            let key = key.trim();
            if key.is_empty() {
                return Err(ConfigError::Malformed {
                    line: idx + 1,
                    content: raw.to_string(),
                });
            }
            values.insert(key.to_string(), value.trim().to_string());
        }
        Ok(Self { values })
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    pub fn require(&self, key: &str) -> Result<&str, ConfigError> {
        self.get(key)
            .ok_or_else(|| ConfigError::MissingKey(key.to_string()))
    }

    /// Parse an optional key. Present-but-invalid values are an error.
    pub fn parse_opt<T: FromStr>(&self, key: &str) -> Result<Option<T>, ConfigError> {
        match self.get(key) {
            None => Ok(None),
            Some(raw) => raw.parse::<T>().map(Some).map_err(|_| ConfigError::InvalidValue {
                key: key.to_string(),
                value: raw.to_string(),
            }),
        }
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.insert(key.into(), value.into());
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Collector address as written in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Endpoint {
    pub host: String,
    pub port: u16,
}

impl std::fmt::Display for Endpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

/// Threshold and throttling options applied to a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionOptions {
    pub max_errors_per_iter: usize,
    pub max_infos_per_iter: usize,
    pub iter_interval_print: usize,
    pub double_error_kill: bool,
    pub info_overflow_fatal: bool,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            max_errors_per_iter: DEFAULT_MAX_ERRORS_PER_ITER,
            max_infos_per_iter: DEFAULT_MAX_INFOS_PER_ITER,
            iter_interval_print: 1,
            double_error_kill: true,
            info_overflow_fatal: true,
        }
    }
}

impl SessionOptions {
    /// Apply any overrides present in `store` on top of `self`.
    pub fn merged_with(mut self, store: &ConfigStore) -> Result<Self, ConfigError> {
        if let Some(v) = store.parse_opt::<usize>("max_errors_per_iter")? {
            self.max_errors_per_iter = v;
        }
        if let Some(v) = store.parse_opt::<usize>("max_infos_per_iter")? {
            self.max_infos_per_iter = v;
        }
        if let Some(v) = store.parse_opt::<usize>("iter_interval_print")? {
            self.iter_interval_print = v.max(1);
        }
        if let Some(v) = store.parse_opt::<bool>("double_error_kill")? {
            self.double_error_kill = v;
        }
        if let Some(v) = store.parse_opt::<bool>("info_overflow_fatal")? {
            self.info_overflow_fatal = v;
        }
        Ok(self)
    }
}

/// Settings derived from a [`ConfigStore`].
#[derive(Debug, Clone)]
pub struct TelemetrySettings {
    pub transport: TransportKind,
    pub var_dir: PathBuf,
    pub ecc: String,
    store: ConfigStore,
}

impl TelemetrySettings {
    pub fn from_store(store: ConfigStore) -> Result<Self, ConfigError> {
        let transport = match store.get("transport") {
            None => TransportKind::Datagram,
            Some(raw) => raw.parse().map_err(|_| ConfigError::InvalidValue {
                key: "transport".into(),
                value: raw.to_string(),
            })?,
        };
        let var_dir = PathBuf::from(store.get("vardir").unwrap_or(DEFAULT_VAR_DIR));
        let ecc = store.get("ecc").unwrap_or(DEFAULT_ECC).to_string();
        Ok(Self {
            transport,
            var_dir,
            ecc,
            store,
        })
    }

    /// Collector endpoint. Only network transports need it, so it is
    /// resolved on demand rather than at parse time.
    pub fn endpoint(&self) -> Result<Endpoint, ConfigError> {
        let host = self.store.require("server_ip")?.to_string();
        let port = self
            .store
            .parse_opt::<u16>("port")?
            .ok_or_else(|| ConfigError::MissingKey("port".into()))?;
        Ok(Endpoint { host, port })
    }

    pub fn log_dir(&self) -> PathBuf {
        self.var_dir.join("log")
    }

    pub fn store(&self) -> &ConfigStore {
        &self.store
    }

    /// Return a serializable summary of all effective values.
    pub fn effective(&self, options: &SessionOptions) -> EffectiveConfig {
        EffectiveConfig {
            transport: self.transport.as_str(),
            endpoint: self.endpoint().ok(),
            log_dir: self.log_dir(),
            ecc: self.ecc.clone(),
            options: options.clone(),
        }
    }
}

/// Effective configuration summary (serializable).
#[derive(Debug, Clone, Serialize)]
pub struct EffectiveConfig {
    pub transport: &'static str,
    pub endpoint: Option<Endpoint>,
    pub log_dir: PathBuf,
    pub ecc: String,
    pub options: SessionOptions,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    // Serialize env-mutating tests to avoid cross-test pollution.
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    const SAMPLE: &str = "\
# collector
server_ip = 10.0.0.5
port=9000

vardir = /tmp/rad
";

    #[test]
    fn test_parse_trims_and_skips_comments() {
        let store = ConfigStore::parse(SAMPLE).unwrap();
        assert_eq!(store.len(), 3);
        assert_eq!(store.get("server_ip"), Some("10.0.0.5"));
        assert_eq!(store.get("port"), Some("9000"));
        assert_eq!(store.get("vardir"), Some("/tmp/rad"));
    }

    #[test]
    fn test_value_keeps_text_after_first_equals() {
        let store = ConfigStore::parse("opts = a=b").unwrap();
        assert_eq!(store.get("opts"), Some("a=b"));
    }

    #[test]
    fn test_line_without_equals_is_malformed() {
        let err = ConfigStore::parse("server_ip=1.2.3.4\nbogus\n").unwrap_err();
        assert!(matches!(err, ConfigError::Malformed { line: 2, .. }));
    }

    #[test]
    fn test_empty_key_is_malformed() {
        assert!(ConfigStore::parse(" = value").is_err());
    }

    #[test]
    fn test_missing_file_is_unreadable() {
        let err = ConfigStore::load("/definitely/not/here.conf").unwrap_err();
        assert!(matches!(err, ConfigError::Unreadable { .. }));
        assert!(err.to_string().contains("Couldn't open"));
    }

    #[test]
    fn test_settings_defaults() {
        let settings = TelemetrySettings::from_store(ConfigStore::default()).unwrap();
        assert_eq!(settings.transport, TransportKind::Datagram);
        assert_eq!(settings.log_dir(), PathBuf::from("/var/radiation-benchmarks/log"));
        assert_eq!(settings.ecc, "OFF");
        assert!(matches!(settings.endpoint(), Err(ConfigError::MissingKey(k)) if k == "server_ip"));
    }

    #[test]
    fn test_settings_endpoint_and_transport() {
        let mut store = ConfigStore::parse(SAMPLE).unwrap();
        store.insert("transport", "tcp");
        let settings = TelemetrySettings::from_store(store).unwrap();
        assert_eq!(settings.transport, TransportKind::Synchronous);
        let endpoint = settings.endpoint().unwrap();
        assert_eq!(endpoint.to_string(), "10.0.0.5:9000");
    }

    #[test]
    fn test_invalid_port_is_rejected() {
        let store = ConfigStore::parse("server_ip=h\nport=notaport").unwrap();
        let settings = TelemetrySettings::from_store(store).unwrap();
        assert!(matches!(
            settings.endpoint(),
            Err(ConfigError::InvalidValue { key, .. }) if key == "port"
        ));
    }

    #[test]
    fn test_unknown_transport_is_rejected() {
        let store = ConfigStore::parse("transport=carrier-pigeon").unwrap();
        assert!(TelemetrySettings::from_store(store).is_err());
    }

    #[test]
    fn test_options_overrides() {
        let store = ConfigStore::parse(
            "max_errors_per_iter=10\niter_interval_print=0\ndouble_error_kill=false",
        )
        .unwrap();
        let opts = SessionOptions::default().merged_with(&store).unwrap();
        assert_eq!(opts.max_errors_per_iter, 10);
        assert_eq!(opts.max_infos_per_iter, DEFAULT_MAX_INFOS_PER_ITER);
        assert_eq!(opts.iter_interval_print, 1, "interval has a floor of 1");
        assert!(!opts.double_error_kill);
        assert!(opts.info_overflow_fatal);
    }

    #[test]
    fn test_config_path_env_override() {
        let _lock = ENV_LOCK.lock().unwrap();
        std::env::remove_var(CONFIG_PATH_ENV);
        assert_eq!(config_path(), PathBuf::from(DEFAULT_CONFIG_PATH));
        std::env::set_var(CONFIG_PATH_ENV, "/tmp/custom.conf");
        assert_eq!(config_path(), PathBuf::from("/tmp/custom.conf"));
        std::env::remove_var(CONFIG_PATH_ENV);
    }

    #[test]
    fn test_effective_config_serializes() {
        let settings = TelemetrySettings::from_store(ConfigStore::parse(SAMPLE).unwrap()).unwrap();
        let eff = settings.effective(&SessionOptions::default());
        let json = serde_json::to_string(&eff).unwrap();
        assert!(json.contains("\"transport\":\"udp\""));
        assert!(json.contains("10.0.0.5"));
    }
}
