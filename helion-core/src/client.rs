use log::{debug, warn};
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};

use crate::catalog::ModelId;
use crate::config::ClientConfig;
use crate::error::TransportError;

/// A single prediction call, as built by the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PredictionRequest {
	/// Unique per request; the answer must be completed with the same id.
	pub id: u64,
	pub model: ModelId,
	/// Endpoint path relative to the API base address.
	pub endpoint: &'static str,
	pub input_sequence: Vec<String>,
}

/// JSON body sent to the inference endpoint.
#[derive(Debug, Serialize, Deserialize)]
pub struct PredictionPayload {
	pub input_sequence: Vec<String>,
}

/// JSON body returned on success.
#[derive(Debug, Serialize, Deserialize)]
pub struct PredictionResponse {
	pub predicted_event: String,
}

/// JSON body some deployments return with an error status.
#[derive(Debug, Deserialize)]
struct ErrorBody {
	detail: String,
}

/// Anything able to answer a prediction request.
///
/// The session never talks to the network directly; it hands a
/// `PredictionRequest` to an implementation of this trait.
pub trait InferenceClient {
	/// Returns the predicted event for the request's input sequence.
	fn predict(&self, request: &PredictionRequest) -> Result<String, TransportError>;
}

/// REST context holding a reusable blocking HTTP client.
#[derive(Debug, Clone)]
pub struct RestClient {
	client: Client,
	config: ClientConfig,
}

impl RestClient {
	/// Creates a new REST context with the configured timeout.
	pub fn new(config: ClientConfig) -> Result<Self, TransportError> {
		let client = Client::builder()
			.timeout(config.timeout())
			.build()
			.map_err(|e| TransportError::Client(e.to_string()))?;
		Ok(Self { client, config })
	}

	pub fn config(&self) -> &ClientConfig {
		&self.config
	}
}

impl InferenceClient for RestClient {
	/// Sends a POST request to the model's endpoint.
	fn predict(&self, request: &PredictionRequest) -> Result<String, TransportError> {
		let url = self.config.endpoint_url(request.endpoint);
		debug!("POST {url} input_sequence={:?}", request.input_sequence);

		let response = self
			.client
			.post(&url)
			.json(&PredictionPayload { input_sequence: request.input_sequence.clone() })
			.send()?;

		let status = response.status();
		let body = response.text()?;

		if !status.is_success() {
			let detail = serde_json::from_str::<ErrorBody>(&body).ok().map(|b| b.detail);
			warn!("{url} answered {status}: {}", detail.as_deref().unwrap_or("<no detail>"));
			return Err(TransportError::Status { code: status.as_u16(), detail });
		}

		parse_prediction(&body)
	}
}

/// Extracts `predicted_event` from a success body.
pub fn parse_prediction(body: &str) -> Result<String, TransportError> {
	serde_json::from_str::<PredictionResponse>(body)
		.map(|r| r.predicted_event)
		.map_err(|e| TransportError::MalformedResponse(e.to_string()))
}
