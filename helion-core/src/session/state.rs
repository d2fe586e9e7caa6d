use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use log::{debug, info, warn};

use super::history::{HistoryEntry, PredictionHistory};
use super::window::SequenceWindow;
use crate::catalog::{ModelId, ModelSelection};
use crate::client::PredictionRequest;
use crate::error::{TransportError, ValidationError};

/// Whether the session may issue a request and whether an error is shown.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SessionStatus {
	#[default]
	Idle,
	AwaitingResponse,
	Error(String),
}

impl SessionStatus {
	pub fn error_message(&self) -> Option<&str> {
		match self {
			SessionStatus::Error(message) => Some(message),
			_ => None,
		}
	}
}

impl fmt::Display for SessionStatus {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			SessionStatus::Idle => f.write_str("idle"),
			SessionStatus::AwaitingResponse => f.write_str("awaiting response"),
			SessionStatus::Error(message) => write!(f, "error: {message}"),
		}
	}
}

/// Every transition a session accepts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
	SelectModel(ModelId),
	SetSequenceLength(usize),
	SetToken { index: usize, value: String },
	BeginPrediction,
	CompletePrediction { id: u64, result: Result<String, TransportError> },
	ClearError,
	Reset,
}

/// What a successfully applied action produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
	/// State changed, nothing else to report.
	Updated,
	/// The caller must now run this request and feed the result back.
	Request(PredictionRequest),
	/// A prediction or failure was appended to the history.
	Recorded(HistoryEntry),
	/// The completion does not answer the request in flight.
	Discarded,
}

/// Request ids are unique for the whole process, so a reset session can
/// never mistake an answer to an older request for its own.
static NEXT_REQUEST_ID: AtomicU64 = AtomicU64::new(1);

/// Form state of one prediction session.
///
/// # Invariants
/// - with a `Fixed` selection the window length equals the locked length
/// - the history only grows, except on `reset`
/// - a successful completion slides the window, a failed one leaves it untouched
/// - `in_flight` is set exactly while the status is `AwaitingResponse`, and the
///   form cannot be edited during that time
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
	selection: Option<ModelSelection>,
	window: SequenceWindow,
	history: PredictionHistory,
	status: SessionStatus,
	in_flight: Option<u64>,
}

impl Session {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn selection(&self) -> Option<ModelSelection> {
		self.selection
	}

	pub fn window(&self) -> &SequenceWindow {
		&self.window
	}

	pub fn history(&self) -> &PredictionHistory {
		&self.history
	}

	pub fn status(&self) -> &SessionStatus {
		&self.status
	}

	/// True when the window length cannot be changed by the user.
	pub fn is_length_locked(&self) -> bool {
		self.selection.and_then(|s| s.locked_length()).is_some()
	}

	/// `Predict` before the first successful prediction, `Next` afterwards.
	pub fn button_label(&self) -> &'static str {
		if self.history.prediction_count() > 0 { "Next" } else { "Predict" }
	}

	/// Id of the request currently awaiting an answer.
	pub fn in_flight(&self) -> Option<u64> {
		self.in_flight
	}

	/// Reducer: applies one action.
	///
	/// Validation failures of `BeginPrediction` (and of `SelectModel` via
	/// `select_model_by_name`) are mirrored into `SessionStatus::Error`.
	/// Other rejected actions leave the state untouched.
	pub fn apply(&mut self, action: Action) -> Result<Outcome, ValidationError> {
		match action {
			Action::SelectModel(model) => self.select_model(model).map(|_| Outcome::Updated),
			Action::SetSequenceLength(length) => self.set_sequence_length(length).map(|_| Outcome::Updated),
			Action::SetToken { index, value } => self.set_token(index, value).map(|_| Outcome::Updated),
			Action::BeginPrediction => self.begin_prediction().map(Outcome::Request),
			Action::CompletePrediction { id, result } => Ok(self
				.complete_prediction(id, result)
				.map_or(Outcome::Discarded, Outcome::Recorded)),
			Action::ClearError => {
				self.clear_error();
				Ok(Outcome::Updated)
			}
			Action::Reset => {
				self.reset();
				Ok(Outcome::Updated)
			}
		}
	}

	/// Selects a model, locking the window length for fixed-length models.
	///
	/// The window is reinitialized to empty slots: the locked length for a
	/// fixed model, no slots at all for a variable one.
	pub fn select_model(&mut self, model: ModelId) -> Result<(), ValidationError> {
		self.ensure_editable()?;
		let selection = ModelSelection::new(model);
		debug!("selected model {model} ({selection:?})");
		self.window.resize(selection.locked_length().unwrap_or(0));
		self.selection = Some(selection);
		self.clear_error();
		Ok(())
	}

	/// Parses and selects a model by its wire name.
	pub fn select_model_by_name(&mut self, name: &str) -> Result<(), ValidationError> {
		self.ensure_editable()?;
		match name.parse::<ModelId>() {
			Ok(model) => self.select_model(model),
			Err(e) => Err(self.fail_validation(e)),
		}
	}

	/// Resizes the window to `length` empty slots.
	pub fn set_sequence_length(&mut self, length: usize) -> Result<(), ValidationError> {
		self.ensure_editable()?;
		let model = match self.selection {
			None => return Err(ValidationError::NoModelSelected),
			Some(ModelSelection::Fixed { length: locked, .. }) => {
				return Err(ValidationError::LengthLocked { length: locked });
			}
			Some(ModelSelection::Variable { model }) => model,
		};

		let policy = model.length_policy();
		if !policy.accepts(length) {
			let choices = policy.choices();
			return Err(ValidationError::InvalidLength {
				length,
				min: *choices.start(),
				max: *choices.end(),
			});
		}

		self.window.resize(length);
		Ok(())
	}

	pub fn set_token(&mut self, index: usize, value: impl Into<String>) -> Result<(), ValidationError> {
		self.ensure_editable()?;
		self.window.set(index, value)
	}

	/// Validates the form and, if it is complete, moves to `AwaitingResponse`.
	///
	/// No request may be issued while another one is in flight.
	pub fn begin_prediction(&mut self) -> Result<PredictionRequest, ValidationError> {
		// Keep the in-flight status; only report the rejection.
		self.ensure_editable()?;

		let selection = match self.selection {
			Some(s) => s,
			None => return Err(self.fail_validation(ValidationError::NoModelSelected)),
		};
		if self.window.is_empty() {
			return Err(self.fail_validation(ValidationError::NoSequenceLength));
		}
		if let Some(index) = self.window.first_blank() {
			return Err(self.fail_validation(ValidationError::EmptyToken { index }));
		}

		let request = PredictionRequest {
			id: NEXT_REQUEST_ID.fetch_add(1, Ordering::Relaxed),
			model: selection.model(),
			endpoint: selection.endpoint(),
			input_sequence: self.window.tokens().to_vec(),
		};
		debug!(
			"begin prediction #{} on {} with {:?}",
			request.id, request.endpoint, request.input_sequence
		);
		self.status = SessionStatus::AwaitingResponse;
		self.in_flight = Some(request.id);
		Ok(request)
	}

	/// Folds the endpoint's answer back into the session.
	///
	/// `id` is the id of the `PredictionRequest` the result answers.
	/// Returns the recorded history entry, or `None` when that request is
	/// not the one in flight (e.g. the session was reset in the meantime).
	pub fn complete_prediction(&mut self, id: u64, result: Result<String, TransportError>) -> Option<HistoryEntry> {
		if self.in_flight != Some(id) {
			warn!("dropping result of request #{id} received while {}", self.status);
			return None;
		}
		self.in_flight = None;

		let entry = match result {
			Ok(event) => {
				self.window.slide(event.clone());
				self.status = SessionStatus::Idle;
				let entry = self.history.push_prediction(event).clone();
				info!("{entry}");
				entry
			}
			Err(e) => {
				let message = format!("Prediction failed: {e}");
				warn!("{message}");
				self.status = SessionStatus::Error(message.clone());
				self.history.push_failure(message).clone()
			}
		};
		Some(entry)
	}

	/// Dismisses a displayed error.
	pub fn clear_error(&mut self) {
		if matches!(self.status, SessionStatus::Error(_)) {
			self.status = SessionStatus::Idle;
		}
	}

	/// Back to the initial, empty session.
	pub fn reset(&mut self) {
		debug!("session reset");
		*self = Self::default();
	}

	fn ensure_editable(&self) -> Result<(), ValidationError> {
		if self.in_flight.is_some() { Err(ValidationError::Busy) } else { Ok(()) }
	}

	fn fail_validation(&mut self, error: ValidationError) -> ValidationError {
		warn!("validation failed: {error}");
		self.status = SessionStatus::Error(error.to_string());
		error
	}
}
