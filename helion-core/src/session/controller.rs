use super::history::HistoryEntry;
use super::state::Session;
use crate::client::{InferenceClient, RestClient};
use crate::config::ClientConfig;
use crate::error::{Result, TransportError, ValidationError};

/// A session bound to an inference client.
///
/// Form edits go straight to the inner `Session`; `predict_next` is the
/// only operation that performs I/O.
#[derive(Debug)]
pub struct Controller<C> {
	session: Session,
	client: C,
}

impl Controller<RestClient> {
	/// Controller talking HTTP to the configured endpoint.
	pub fn connect(config: ClientConfig) -> std::result::Result<Self, TransportError> {
		Ok(Self::new(RestClient::new(config)?))
	}
}

impl<C: InferenceClient> Controller<C> {
	pub fn new(client: C) -> Self {
		Self { session: Session::new(), client }
	}

	pub fn session(&self) -> &Session {
		&self.session
	}

	pub fn session_mut(&mut self) -> &mut Session {
		&mut self.session
	}

	pub fn client(&self) -> &C {
		&self.client
	}

	/// Validates the form, calls the endpoint once and folds the answer back.
	///
	/// # Errors
	/// - `Error::Validation` if the form is incomplete or a request is
	///   already in flight; no request is sent
	/// - `Error::Transport` if the call failed; the failure is also
	///   recorded in the history and the window is left as it was
	pub fn predict_next(&mut self) -> Result<HistoryEntry> {
		let request = self.session.begin_prediction()?;
		let result = self.client.predict(&request);
		let failure = result.as_ref().err().cloned();

		match (self.session.complete_prediction(request.id, result), failure) {
			(_, Some(e)) => Err(e.into()),
			(Some(entry), None) => Ok(entry),
			// the request was superseded while the call was running
			(None, None) => Err(ValidationError::Busy.into()),
		}
	}

	/// Clears every piece of session state. No request is sent.
	pub fn reset(&mut self) {
		self.session.reset();
	}
}

#[cfg(test)]
mod tests {
	use std::cell::RefCell;
	use std::collections::VecDeque;

	use super::*;
	use crate::catalog::ModelId;
	use crate::client::PredictionRequest;
	use crate::error::Error;
	use crate::session::SessionStatus;

	/// Replays canned answers and remembers what it was asked.
	#[derive(Default)]
	struct ScriptedClient {
		answers: RefCell<VecDeque<std::result::Result<String, TransportError>>>,
		requests: RefCell<Vec<PredictionRequest>>,
	}

	impl ScriptedClient {
		fn with(answers: Vec<std::result::Result<String, TransportError>>) -> Self {
			Self { answers: RefCell::new(answers.into()), requests: RefCell::default() }
		}
	}

	impl InferenceClient for ScriptedClient {
		fn predict(&self, request: &PredictionRequest) -> std::result::Result<String, TransportError> {
			self.requests.borrow_mut().push(request.clone());
			self.answers
				.borrow_mut()
				.pop_front()
				.unwrap_or_else(|| Err(TransportError::Network("script exhausted".into())))
		}
	}

	fn lstm3(client: ScriptedClient) -> Controller<ScriptedClient> {
		let mut controller = Controller::new(client);
		let session = controller.session_mut();
		session.select_model(ModelId::Lstm3).unwrap();
		for (i, t) in ["a", "b", "c"].into_iter().enumerate() {
			session.set_token(i, t).unwrap();
		}
		controller
	}

	#[test]
	fn two_predictions_slide_the_window() {
		let mut controller = lstm3(ScriptedClient::with(vec![Ok("d".into()), Ok("e".into())]));

		controller.predict_next().unwrap();
		assert_eq!(controller.session().history().predicted_events().collect::<Vec<_>>(), ["d"]);
		assert_eq!(controller.session().window().tokens(), ["b", "c", "d"]);

		let entry = controller.predict_next().unwrap();
		assert_eq!(entry.title(), "Prediction 2");
		assert_eq!(controller.session().history().predicted_events().collect::<Vec<_>>(), ["d", "e"]);
		assert_eq!(controller.session().window().tokens(), ["c", "d", "e"]);

		let sent: Vec<Vec<String>> =
			controller.client().requests.borrow().iter().map(|r| r.input_sequence.clone()).collect();
		assert_eq!(sent, [vec!["a", "b", "c"], vec!["b", "c", "d"]]);
	}

	#[test]
	fn validation_failure_sends_nothing() {
		let mut controller = Controller::new(ScriptedClient::default());
		controller.session_mut().select_model(ModelId::LstmN).unwrap();
		controller.session_mut().set_sequence_length(2).unwrap();
		controller.session_mut().set_token(0, "a").unwrap();

		let err = controller.predict_next().unwrap_err();
		assert_eq!(err, Error::Validation(ValidationError::EmptyToken { index: 1 }));
		assert!(controller.client().requests.borrow().is_empty());
		assert!(controller.session().history().is_empty());
		assert!(matches!(controller.session().status(), SessionStatus::Error(_)));
	}

	#[test]
	fn server_error_is_recorded_and_retry_succeeds() {
		let mut controller = lstm3(ScriptedClient::with(vec![
			Err(TransportError::Status { code: 500, detail: None }),
			Ok("d".into()),
		]));

		let err = controller.predict_next().unwrap_err();
		assert!(matches!(err, Error::Transport(TransportError::Status { code: 500, .. })));
		assert_eq!(controller.session().history().len(), 1);
		assert_eq!(controller.session().window().tokens(), ["a", "b", "c"]);
		assert!(matches!(controller.session().status(), SessionStatus::Error(_)));

		controller.predict_next().unwrap();
		assert_eq!(controller.session().history().len(), 2);
		assert_eq!(controller.session().window().tokens(), ["b", "c", "d"]);
		assert_eq!(controller.session().status(), &SessionStatus::Idle);
	}

	#[test]
	fn reset_clears_everything() {
		let mut controller = lstm3(ScriptedClient::with(vec![Ok("d".into())]));
		controller.predict_next().unwrap();
		controller.reset();
		assert_eq!(controller.session(), &Session::new());
	}
}
