//! Property-based tests for the session state machine.
//!
//! These tests use proptest to verify:
//! - Fixed models keep their locked window length
//! - History is prefix-stable and counts successes
//! - Every success slides the window by exactly one token
//! - Blank slots never reach the client
//! - Reset always returns to the initial state
//! - Answers are only folded into the window of the request they belong to

#![cfg(test)]

use proptest::prelude::*;

use super::{Session, SessionStatus};
use crate::catalog::{LengthPolicy, ModelId};
use crate::client::PredictionRequest;
use crate::error::TransportError;

// =============================================================================
// Arbitrary Generators
// =============================================================================

fn arb_model() -> impl Strategy<Value = ModelId> {
	prop::sample::select(ModelId::ALL.to_vec())
}

fn arb_fixed_model() -> impl Strategy<Value = ModelId> {
	prop::sample::select(
		ModelId::ALL
			.into_iter()
			.filter(|m| matches!(m.length_policy(), LengthPolicy::Fixed(_)))
			.collect::<Vec<_>>(),
	)
}

fn arb_token() -> impl Strategy<Value = String> {
	"[a-z_]{1,12}"
}

prop_compose! {
	/// A session with a model selected and every slot filled.
	fn arb_ready_session()(
		model in arb_model(),
		length_seed in any::<usize>(),
		tokens in prop::collection::vec(arb_token(), 20),
	) -> Session {
		let mut session = Session::new();
		session.select_model(model).unwrap();
		if !session.is_length_locked() {
			let choices = model.length_policy().choices();
			let span = choices.end() - choices.start() + 1;
			session.set_sequence_length(choices.start() + length_seed % span).unwrap();
		}
		for i in 0..session.window().len() {
			session.set_token(i, tokens[i].clone()).unwrap();
		}
		session
	}
}

fn arb_outcome() -> impl Strategy<Value = Result<String, TransportError>> {
	prop_oneof![
		3 => arb_token().prop_map(Ok),
		1 => (400u16..600).prop_map(|code| Err(TransportError::Status { code, detail: None })),
		1 => Just(Err(TransportError::Timeout)),
	]
}

/// User edits and network answers, in any order.
#[derive(Debug, Clone)]
enum Step {
	Begin,
	/// Answer the request at `pick % issued.len()`, stale or not.
	Complete { pick: usize, outcome: Result<String, TransportError> },
	SelectModel(ModelId),
	SetLength(usize),
	SetToken { index: usize, token: String },
	Reset,
}

fn arb_step() -> impl Strategy<Value = Step> {
	prop_oneof![
		3 => Just(Step::Begin),
		4 => (any::<usize>(), arb_outcome()).prop_map(|(pick, outcome)| Step::Complete { pick, outcome }),
		1 => arb_model().prop_map(Step::SelectModel),
		1 => (0usize..22).prop_map(Step::SetLength),
		2 => (0usize..20, arb_token()).prop_map(|(index, token)| Step::SetToken { index, token }),
		1 => Just(Step::Reset),
	]
}

// =============================================================================
// Properties
// =============================================================================

proptest! {
	#[test]
	fn locked_length_survives_resize_attempts(model in arb_fixed_model(), lengths in prop::collection::vec(0usize..30, 1..10)) {
		let mut session = Session::new();
		session.select_model(model).unwrap();
		let locked = session.window().len();
		for length in lengths {
			prop_assert!(session.set_sequence_length(length).is_err());
			prop_assert_eq!(session.window().len(), locked);
		}
	}

	#[test]
	fn successes_slide_and_history_is_prefix_stable(
		mut session in arb_ready_session(),
		outcomes in prop::collection::vec(arb_outcome(), 1..25),
	) {
		let length = session.window().len();
		let mut successes = 0;

		for outcome in outcomes {
			let before_window = session.window().tokens().to_vec();
			let before_history = session.history().entries().to_vec();

			let request = session.begin_prediction().unwrap();
			session.complete_prediction(request.id, outcome.clone());

			let after = session.window().tokens();
			prop_assert_eq!(after.len(), length);
			prop_assert_eq!(&session.history().entries()[..before_history.len()], &before_history[..]);
			prop_assert_eq!(session.history().len(), before_history.len() + 1);

			match outcome {
				Ok(event) => {
					successes += 1;
					let mut expected = before_window[1..].to_vec();
					expected.push(event);
					prop_assert_eq!(after, &expected[..]);
					prop_assert_eq!(session.status(), &SessionStatus::Idle);
				}
				Err(_) => {
					prop_assert_eq!(after, &before_window[..]);
					prop_assert!(matches!(session.status(), SessionStatus::Error(_)));
				}
			}
		}

		prop_assert_eq!(session.history().prediction_count(), successes);
	}

	#[test]
	fn blank_slot_blocks_the_request(mut session in arb_ready_session(), slot_seed in any::<usize>(), blank in "[ \t]{0,3}") {
		let index = slot_seed % session.window().len();
		session.set_token(index, blank).unwrap();

		prop_assert!(session.begin_prediction().is_err());
		prop_assert!(session.history().is_empty());
		prop_assert!(matches!(session.status(), SessionStatus::Error(_)));
	}

	#[test]
	fn reset_from_any_state(
		mut session in arb_ready_session(),
		outcomes in prop::collection::vec(arb_outcome(), 0..5),
		leave_in_flight in any::<bool>(),
	) {
		for outcome in outcomes {
			let request = session.begin_prediction().unwrap();
			session.complete_prediction(request.id, outcome);
		}
		if leave_in_flight {
			session.begin_prediction().unwrap();
		}

		session.reset();
		prop_assert_eq!(session, Session::new());
	}

	#[test]
	fn answers_only_slide_their_own_window(
		mut session in arb_ready_session(),
		steps in prop::collection::vec(arb_step(), 1..60),
	) {
		let mut issued: Vec<PredictionRequest> = Vec::new();

		for step in steps {
			match step {
				Step::Begin => {
					if let Ok(request) = session.begin_prediction() {
						issued.push(request);
					}
				}
				Step::Complete { pick, outcome } => {
					if issued.is_empty() {
						continue;
					}
					let request = issued[pick % issued.len()].clone();
					let before = session.clone();
					let entry = session.complete_prediction(request.id, outcome.clone());

					if before.in_flight() != Some(request.id) {
						prop_assert_eq!(entry, None);
						prop_assert_eq!(&session, &before);
						continue;
					}

					// the form was frozen, so the window is still the one sent
					prop_assert_eq!(before.window().tokens(), &request.input_sequence[..]);
					match outcome {
						Ok(event) => {
							let mut expected = request.input_sequence[1..].to_vec();
							expected.push(event);
							prop_assert_eq!(session.window().tokens(), &expected[..]);
						}
						Err(_) => prop_assert_eq!(session.window().tokens(), &request.input_sequence[..]),
					}
					prop_assert_eq!(session.history().len(), before.history().len() + 1);
				}
				Step::SelectModel(model) => {
					let _ = session.select_model(model);
				}
				Step::SetLength(length) => {
					let _ = session.set_sequence_length(length);
				}
				Step::SetToken { index, token } => {
					let _ = session.set_token(index, token);
				}
				Step::Reset => session.reset(),
			}

			prop_assert_eq!(
				session.in_flight().is_some(),
				session.status() == &SessionStatus::AwaitingResponse
			);
		}
	}
}
