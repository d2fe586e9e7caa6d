use std::env;
use std::time::Duration;

use reqwest::Url;

use crate::error::ConfigError;

/// Environment variable overriding the inference API base address.
pub const ENV_API_URL: &str = "HELION_API_URL";

/// Environment variable overriding the request timeout, in seconds.
pub const ENV_TIMEOUT_SECS: &str = "HELION_TIMEOUT_SECS";

/// Default inference API address (local deployment).
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000";

/// Default request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Settings used to reach the inference endpoint.
///
/// # Invariants
/// - `base_url` starts with `http://` or `https://`
/// - `base_url` never ends with `/`
/// - `timeout` is strictly positive
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
	base_url: String,
	timeout: Duration,
}

impl Default for ClientConfig {
	fn default() -> Self {
		Self { base_url: DEFAULT_BASE_URL.to_owned(), timeout: DEFAULT_TIMEOUT }
	}
}

impl ClientConfig {
	/// Creates a configuration for the given base address and timeout.
	///
	/// # Errors
	/// - `InvalidBaseUrl` if the address has no http(s) scheme
	/// - `InvalidTimeout` if `timeout` is zero
	pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ConfigError> {
		if timeout.is_zero() {
			return Err(ConfigError::InvalidTimeout(format!("{}s", timeout.as_secs())));
		}
		Ok(Self { base_url: normalize_base_url(base_url)?, timeout })
	}

	/// Reads the configuration from the process environment.
	///
	/// Unset variables fall back to the defaults.
	pub fn from_env() -> Result<Self, ConfigError> {
		Self::from_lookup(|key| env::var(key).ok())
	}

	/// Same as `from_env` with an injectable variable lookup.
	pub(crate) fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
	where
		F: Fn(&str) -> Option<String>,
	{
		let mut config = Self::default();

		if let Some(url) = lookup(ENV_API_URL) {
			config.base_url = normalize_base_url(&url)?;
		}

		if let Some(raw) = lookup(ENV_TIMEOUT_SECS) {
			let secs = raw
				.trim()
				.parse::<u64>()
				.ok()
				.filter(|s| *s > 0)
				.ok_or_else(|| ConfigError::InvalidTimeout(raw.clone()))?;
			config.timeout = Duration::from_secs(secs);
		}

		Ok(config)
	}

	pub fn base_url(&self) -> &str {
		&self.base_url
	}

	pub fn timeout(&self) -> Duration {
		self.timeout
	}

	/// Full URL of an endpoint path such as `/predict/lstm/3`.
	pub fn endpoint_url(&self, path: &str) -> String {
		if path.starts_with('/') {
			format!("{}{}", self.base_url, path)
		} else {
			format!("{}/{}", self.base_url, path)
		}
	}
}

fn normalize_base_url(input: &str) -> Result<String, ConfigError> {
	let trimmed = input.trim().trim_end_matches('/');
	let invalid = || ConfigError::InvalidBaseUrl(input.to_owned());

	let url = Url::parse(trimmed).map_err(|_| invalid())?;
	if !matches!(url.scheme(), "http" | "https") {
		return Err(invalid());
	}
	if url.host_str().is_none_or(str::is_empty) {
		return Err(invalid());
	}
	Ok(trimmed.to_owned())
}
