//! Error types for helion-core.

use thiserror::Error;

/// Input rejected before any request reaches the inference endpoint.
///
/// A validation error never touches the prediction history.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
	/// No model has been selected yet.
	#[error("Please select a model option.")]
	NoModelSelected,

	/// The identifier is not part of the model catalog.
	#[error("Invalid model selection: {0}")]
	UnknownModel(String),

	/// A variable-length model was selected but no length was chosen.
	#[error("Please choose an input sequence length.")]
	NoSequenceLength,

	/// A slot of the sequence window is blank.
	#[error("All sequence fields must be filled! (input sequence {} is empty)", .index + 1)]
	EmptyToken { index: usize },

	/// The selected model imposes its own length.
	#[error("Sequence length is locked to {length} by the selected model")]
	LengthLocked { length: usize },

	/// Requested length outside the range accepted by the selected model.
	#[error("Sequence length {length} is invalid, must be between {min} and {max}")]
	InvalidLength { length: usize, min: usize, max: usize },

	/// Slot index past the end of the window.
	#[error("Token index {index} out of range for a window of length {length}")]
	IndexOutOfRange { index: usize, length: usize },

	/// A prediction request is already in flight.
	#[error("A prediction is already in progress")]
	Busy,
}

/// Failure while talking to the inference endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
	/// Connection refused, DNS failure, broken pipe...
	#[error("network error: {0}")]
	Network(String),

	/// The request did not complete within the configured timeout.
	#[error("request timed out")]
	Timeout,

	/// The endpoint answered with a non-success status.
	#[error("server returned HTTP {code}{}", .detail.as_ref().map(|d| format!(": {d}")).unwrap_or_default())]
	Status { code: u16, detail: Option<String> },

	/// The response body did not carry a `predicted_event` string.
	#[error("malformed response: {0}")]
	MalformedResponse(String),

	/// The HTTP client itself could not be built.
	#[error("HTTP client error: {0}")]
	Client(String),
}

impl From<reqwest::Error> for TransportError {
	fn from(e: reqwest::Error) -> Self {
		if e.is_timeout() {
			TransportError::Timeout
		} else if e.is_decode() {
			TransportError::MalformedResponse(e.to_string())
		} else if e.is_builder() {
			TransportError::Client(e.to_string())
		} else if let Some(status) = e.status() {
			TransportError::Status { code: status.as_u16(), detail: None }
		} else {
			TransportError::Network(e.to_string())
		}
	}
}

/// Invalid client configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
	#[error("invalid base URL '{0}': expected an http:// or https:// address with a host")]
	InvalidBaseUrl(String),

	#[error("invalid timeout '{0}': expected a positive number of seconds")]
	InvalidTimeout(String),
}

/// Umbrella error for the crate.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
	#[error(transparent)]
	Validation(#[from] ValidationError),

	#[error(transparent)]
	Transport(#[from] TransportError),

	#[error(transparent)]
	Config(#[from] ConfigError),
}

/// Result alias using the crate error.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn empty_token_message_is_one_based() {
		let e = ValidationError::EmptyToken { index: 1 };
		assert_eq!(e.to_string(), "All sequence fields must be filled! (input sequence 2 is empty)");
	}

	#[test]
	fn status_message_includes_detail_when_present() {
		let with = TransportError::Status { code: 400, detail: Some("Invalid event: 'x'".into()) };
		let without = TransportError::Status { code: 500, detail: None };
		assert_eq!(with.to_string(), "server returned HTTP 400: Invalid event: 'x'");
		assert_eq!(without.to_string(), "server returned HTTP 500");
	}

	#[test]
	fn umbrella_is_transparent() {
		let e: Error = ValidationError::Busy.into();
		assert_eq!(e.to_string(), "A prediction is already in progress");
		assert!(matches!(e, Error::Validation(ValidationError::Busy)));
	}
}
