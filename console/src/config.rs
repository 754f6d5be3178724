//! Console configuration loaded via OrthoConfig, with command-line overrides.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use clap::{Parser, ValueEnum};
use ortho_config::OrthoConfig;
use serde::Deserialize;
use thiserror::Error;
use url::Url;

const DEFAULT_API_BASE_URL: &str = "http://localhost:3000/";

/// Which resource backend the console talks to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// JSON over HTTP.
    #[default]
    Rest,
    /// Process-local collections, optionally seeded from a file.
    Memory,
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Rest => "rest",
            Self::Memory => "memory",
        })
    }
}

/// Raised when a backend name is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown backend {0:?}; expected `rest` or `memory`")]
pub struct UnknownBackendError(String);

impl FromStr for BackendKind {
    type Err = UnknownBackendError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "rest" => Ok(Self::Rest),
            "memory" => Ok(Self::Memory),
            _ => Err(UnknownBackendError(raw.to_owned())),
        }
    }
}

/// Raised when the configured base URL does not parse.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid API base URL {raw:?}: {reason}")]
pub struct InvalidBaseUrlError {
    raw: String,
    reason: String,
}

/// Settings for the console, read from `USER_CONSOLE_*` variables and
/// configuration files.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "USER_CONSOLE")]
pub struct ConsoleSettings {
    /// Base URL of the REST backend.
    pub api_base_url: Option<String>,
    /// Per-request timeout, in seconds.
    #[ortho_config(default = 10)]
    pub request_timeout_secs: u64,
    /// How long notifications stay up, in milliseconds.
    #[ortho_config(default = 2000)]
    pub notification_millis: u64,
    /// Backend name, `rest` or `memory`.
    pub backend: Option<String>,
    /// JSON document seeding the in-memory backend.
    pub seed_path: Option<PathBuf>,
}

impl ConsoleSettings {
    /// Configured base URL, falling back to the local development server.
    ///
    /// # Errors
    /// Fails when the configured value is not an absolute URL.
    pub fn api_base_url(&self) -> Result<Url, InvalidBaseUrlError> {
        let raw = self.api_base_url.as_deref().unwrap_or(DEFAULT_API_BASE_URL);
        Url::parse(raw).map_err(|err| InvalidBaseUrlError {
            raw: raw.to_owned(),
            reason: err.to_string(),
        })
    }

    /// Per-request timeout.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Notification duration.
    pub fn notification_duration(&self) -> Duration {
        Duration::from_millis(self.notification_millis)
    }

    /// Selected backend.
    ///
    /// # Errors
    /// Fails when the configured name is neither `rest` nor `memory`.
    pub fn backend(&self) -> Result<BackendKind, UnknownBackendError> {
        self.backend
            .as_deref()
            .map_or_else(|| Ok(BackendKind::default()), str::parse)
    }

    /// Apply command-line overrides on top of the loaded settings.
    #[must_use]
    pub fn with_overrides(mut self, args: CliArgs) -> Self {
        if let Some(url) = args.api_url {
            self.api_base_url = Some(url);
        }
        if let Some(backend) = args.backend {
            self.backend = Some(backend.to_string());
        }
        if let Some(seed) = args.seed {
            self.seed_path = Some(seed);
        }
        if let Some(timeout) = args.timeout_secs {
            self.request_timeout_secs = timeout;
        }
        self
    }
}

/// `user-console` command arguments.
#[derive(Debug, Clone, Default, Parser)]
#[command(
    name = "user-console",
    about = "Manage user records held by a REST backend",
    version
)]
pub struct CliArgs {
    /// Base URL of the REST backend.
    #[arg(long = "api-url", value_name = "url")]
    pub api_url: Option<String>,
    /// Backend to use.
    #[arg(long, value_enum)]
    pub backend: Option<BackendKind>,
    /// JSON seed document for the in-memory backend.
    #[arg(long, value_name = "path")]
    pub seed: Option<PathBuf>,
    /// Per-request timeout in seconds.
    #[arg(long = "timeout", value_name = "secs")]
    pub timeout_secs: Option<u64>,
}

#[cfg(test)]
mod tests {
    //! Unit tests for console configuration parsing.

    use super::*;
    use std::ffi::OsString;

    use env_lock::lock_env;
    use rstest::rstest;

    const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;
    const DEFAULT_NOTIFICATION_MILLIS: u64 = 2000;

    const VARS: [&str; 5] = [
        "USER_CONSOLE_API_BASE_URL",
        "USER_CONSOLE_REQUEST_TIMEOUT_SECS",
        "USER_CONSOLE_NOTIFICATION_MILLIS",
        "USER_CONSOLE_BACKEND",
        "USER_CONSOLE_SEED_PATH",
    ];

    fn load_from_empty_args() -> ConsoleSettings {
        ConsoleSettings::load_from_iter([OsString::from("user-console")])
            .expect("config should load")
    }

    #[rstest]
    fn default_values_are_used_when_missing() {
        let _guard = lock_env(VARS.map(|name| (name, None::<String>)));

        let settings = load_from_empty_args();
        assert_eq!(
            settings.api_base_url().expect("default url parses").as_str(),
            DEFAULT_API_BASE_URL
        );
        assert_eq!(settings.request_timeout(), Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS));
        assert_eq!(settings.notification_duration(), Duration::from_millis(DEFAULT_NOTIFICATION_MILLIS));
        assert_eq!(settings.backend(), Ok(BackendKind::Rest));
        assert!(settings.seed_path.is_none());
    }

    #[rstest]
    fn environment_overrides_are_respected() {
        let _guard = lock_env([
            ("USER_CONSOLE_API_BASE_URL", Some("http://api.test/v1/".to_owned())),
            ("USER_CONSOLE_REQUEST_TIMEOUT_SECS", Some("3".to_owned())),
            ("USER_CONSOLE_NOTIFICATION_MILLIS", Some("750".to_owned())),
            ("USER_CONSOLE_BACKEND", Some("memory".to_owned())),
            ("USER_CONSOLE_SEED_PATH", Some("/tmp/seed.json".to_owned())),
        ]);

        let settings = load_from_empty_args();
        assert_eq!(
            settings.api_base_url().expect("url parses").as_str(),
            "http://api.test/v1/"
        );
        assert_eq!(settings.request_timeout(), Duration::from_secs(3));
        assert_eq!(settings.notification_duration(), Duration::from_millis(750));
        assert_eq!(settings.backend(), Ok(BackendKind::Memory));
        assert_eq!(settings.seed_path, Some(PathBuf::from("/tmp/seed.json")));
    }

    #[rstest]
    fn command_line_overrides_win() {
        let _guard = lock_env([("USER_CONSOLE_BACKEND", Some("rest".to_owned()))]);
        let args = CliArgs::try_parse_from([
            "user-console",
            "--backend",
            "memory",
            "--seed",
            "seed.json",
            "--api-url",
            "http://other.test/",
        ])
        .expect("arguments parse");

        let settings = load_from_empty_args().with_overrides(args);
        assert_eq!(settings.backend(), Ok(BackendKind::Memory));
        assert_eq!(settings.seed_path, Some(PathBuf::from("seed.json")));
        assert_eq!(settings.api_base_url.as_deref(), Some("http://other.test/"));
    }

    #[rstest]
    #[case::relative("/user/")]
    #[case::garbage("not a url")]
    fn malformed_urls_are_rejected(#[case] raw: &str) {
        let settings = ConsoleSettings {
            api_base_url: Some(raw.to_owned()),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            notification_millis: DEFAULT_NOTIFICATION_MILLIS,
            backend: None,
            seed_path: None,
        };
        assert!(settings.api_base_url().is_err());
    }

    #[rstest]
    #[case::upper("MEMORY", Ok(BackendKind::Memory))]
    #[case::padded(" rest ", Ok(BackendKind::Rest))]
    #[case::unknown("sqlite", Err(UnknownBackendError("sqlite".to_owned())))]
    fn backend_names_parse(
        #[case] raw: &str,
        #[case] expected: Result<BackendKind, UnknownBackendError>,
    ) {
        assert_eq!(raw.parse::<BackendKind>(), expected);
    }
}
