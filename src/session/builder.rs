//! Session construction: configuration, transport and local log acquisition.

use std::path::PathBuf;

use chrono::Local;

use super::terminator::{ProcessExit, Terminator};
use super::{IterationSession, SessionError};
use crate::config::{self, ConfigError, ConfigStore, SessionOptions, TelemetrySettings};
use crate::sink::{self, LocalLogSink};
use crate::transport::{self, protocol::MAX_BENCHMARK_NAME, Transport, TransportError};

/// Not-yet-started session.
///
/// Option precedence: builder calls, then configuration file keys, then
/// defaults.
pub struct SessionBuilder {
    benchmark_name: String,
    test_info: String,
    config_path: PathBuf,
    config: Option<ConfigStore>,
    transport: Option<Box<dyn Transport>>,
    terminator: Box<dyn Terminator>,
    local_log: bool,
    max_errors_per_iter: Option<usize>,
    max_infos_per_iter: Option<usize>,
    iter_interval_print: Option<usize>,
    double_error_kill: Option<bool>,
    info_overflow_fatal: Option<bool>,
}

impl SessionBuilder {
    pub fn new(benchmark_name: impl Into<String>, test_info: impl Into<String>) -> Self {
        Self {
            benchmark_name: benchmark_name.into(),
            test_info: test_info.into(),
            config_path: config::config_path(),
            config: None,
            transport: None,
            terminator: Box::new(ProcessExit::default()),
            local_log: true,
            max_errors_per_iter: None,
            max_infos_per_iter: None,
            iter_interval_print: None,
            double_error_kill: None,
            info_overflow_fatal: None,
        }
    }

    /// Read configuration from `path` instead of the default location.
    pub fn config_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config_path = path.into();
        self
    }

    /// Use an already-parsed configuration; no file is read.
    pub fn config(mut self, store: ConfigStore) -> Self {
        self.config = Some(store);
        self
    }

    /// Use `transport` instead of the one named in the configuration.
    pub fn transport(mut self, transport: impl Transport + 'static) -> Self {
        self.transport = Some(Box::new(transport));
        self
    }

    pub fn terminator(mut self, terminator: impl Terminator + 'static) -> Self {
        self.terminator = Box::new(terminator);
        self
    }

    /// Disable the local log file. The log file name is still derived.
    pub fn local_log(mut self, enabled: bool) -> Self {
        self.local_log = enabled;
        self
    }

    pub fn max_errors_per_iteration(mut self, max: usize) -> Self {
        self.max_errors_per_iter = Some(max);
        self
    }

    pub fn max_infos_per_iteration(mut self, max: usize) -> Self {
        self.max_infos_per_iter = Some(max);
        self
    }

    pub fn print_interval(mut self, interval: usize) -> Self {
        self.iter_interval_print = Some(interval.max(1));
        self
    }

    pub fn double_error_kill(mut self, enabled: bool) -> Self {
        self.double_error_kill = Some(enabled);
        self
    }

    pub fn info_overflow_fatal(mut self, fatal: bool) -> Self {
        self.info_overflow_fatal = Some(fatal);
        self
    }

    fn resolve_options(&self, store: &ConfigStore) -> Result<SessionOptions, ConfigError> {
        let mut options = SessionOptions::default().merged_with(store)?;
        if let Some(v) = self.max_errors_per_iter {
            options.max_errors_per_iter = v;
        }
        if let Some(v) = self.max_infos_per_iter {
            options.max_infos_per_iter = v;
        }
        if let Some(v) = self.iter_interval_print {
            options.iter_interval_print = v;
        }
        if let Some(v) = self.double_error_kill {
            options.double_error_kill = v;
        }
        if let Some(v) = self.info_overflow_fatal {
            options.info_overflow_fatal = v;
        }
        Ok(options)
    }

    /// Load configuration, open the transport and local log, and send the
    /// `CREATE_HEADER` message.
    ///
    /// Anything acquired before a failure is released on return.
    pub fn start(mut self) -> Result<IterationSession, SessionError> {
        let len = self.benchmark_name.len();
        if len > MAX_BENCHMARK_NAME {
            return Err(ConfigError::BenchmarkNameTooLong { len }.into());
        }

        let store = match self.config.take() {
            Some(store) => store,
            None => ConfigStore::load(&self.config_path)?,
        };
        let options = self.resolve_options(&store)?;
        let settings = TelemetrySettings::from_store(store)?;

        let transport = match self.transport.take() {
            Some(transport) => transport,
            None => transport::connect(&settings).map_err(|e| match e {
                TransportError::Config(e) => SessionError::Config(e),
                other => SessionError::Transport(other),
            })?,
        };

        let now = Local::now();
        let stem = sink::log_file_stem(&now, &self.benchmark_name, &settings.ecc, &sink::host_name());
        let (sink, log_file_name) = if self.local_log {
            let sink = LocalLogSink::create(&settings.log_dir(), &stem)?;
            let name = sink.path().display().to_string();
            (Some(sink), name)
        } else {
            let name = settings.log_dir().join(format!("{}.log", stem)).display().to_string();
            (None, name)
        };

        let mut session = IterationSession::new(
            self.benchmark_name,
            self.test_info,
            &options,
            transport,
            sink,
            self.terminator,
            log_file_name,
        );
        session.announce(&now)?;
        Ok(session)
    }
}
