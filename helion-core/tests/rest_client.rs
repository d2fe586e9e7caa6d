//! Drives the REST client and the controller against a local mock of the
//! inference API served by actix-web on an ephemeral port.

use std::net::TcpListener;
use std::thread;
use std::time::Duration;

use actix_web::{App, HttpResponse, HttpServer, Responder, post, web};
use serde::Deserialize;

use helion_core::{
	ClientConfig, Controller, Error, HistoryEntry, InferenceClient, ModelId, PredictionRequest, RestClient,
	SessionStatus, TransportError,
};

#[derive(Deserialize)]
struct Payload {
	input_sequence: Vec<String>,
}

/// Predicts the letter following the last token; only single lowercase
/// letters are known events.
#[post("/predict/lstm/3")]
async fn next_letter(payload: web::Json<Payload>) -> impl Responder {
	if let Some(unknown) = payload
		.input_sequence
		.iter()
		.find(|t| t.len() != 1 || !t.chars().all(|c| c.is_ascii_lowercase()))
	{
		return HttpResponse::BadRequest().json(serde_json::json!({ "detail": format!("Invalid event: '{unknown}'") }));
	}
	let last = payload.input_sequence.last().and_then(|t| t.chars().next()).unwrap_or('a');
	let next = if last == 'z' { 'a' } else { (last as u8 + 1) as char };
	HttpResponse::Ok().json(serde_json::json!({ "predicted_event": next.to_string() }))
}

#[post("/predict/rnn/3")]
async fn always_fails() -> impl Responder {
	HttpResponse::InternalServerError().body("model crashed")
}

#[post("/predict/rnn/4")]
async fn wrong_shape() -> impl Responder {
	HttpResponse::Ok().json(serde_json::json!({ "event": "x" }))
}

#[post("/predict/rnn/5")]
async fn too_slow() -> impl Responder {
	actix_web::rt::time::sleep(Duration::from_secs(3)).await;
	HttpResponse::Ok().json(serde_json::json!({ "predicted_event": "late" }))
}

/// Starts the mock API on its own thread and returns its base address.
fn spawn_mock_api() -> String {
	let listener = TcpListener::bind("127.0.0.1:0").unwrap();
	let addr = listener.local_addr().unwrap();

	thread::spawn(move || {
		actix_web::rt::System::new().block_on(async move {
			let server = HttpServer::new(|| {
				App::new()
					.service(next_letter)
					.service(always_fails)
					.service(wrong_shape)
					.service(too_slow)
			})
			.workers(1)
			.listen(listener)
			.unwrap();
			server.run().await
		})
	});

	format!("http://{addr}")
}

fn controller_for(base_url: &str, timeout: Duration) -> Controller<RestClient> {
	Controller::connect(ClientConfig::new(base_url, timeout).unwrap()).unwrap()
}

fn fill(controller: &mut Controller<RestClient>, model: ModelId, tokens: &[&str]) {
	let session = controller.session_mut();
	session.select_model(model).unwrap();
	for (i, t) in tokens.iter().enumerate() {
		session.set_token(i, *t).unwrap();
	}
}

#[test]
fn sliding_window_against_live_endpoint() {
	let base = spawn_mock_api();
	let mut controller = controller_for(&base, Duration::from_secs(5));
	fill(&mut controller, ModelId::Lstm3, &["a", "b", "c"]);

	let first = controller.predict_next().unwrap();
	assert_eq!(first, HistoryEntry::Prediction { number: 1, event: "d".into() });
	assert_eq!(controller.session().window().tokens(), ["b", "c", "d"]);

	controller.predict_next().unwrap();
	assert_eq!(controller.session().history().predicted_events().collect::<Vec<_>>(), ["d", "e"]);
	assert_eq!(controller.session().window().tokens(), ["c", "d", "e"]);
	assert_eq!(controller.session().button_label(), "Next");
}

#[test]
fn error_detail_from_server_is_kept() {
	let base = spawn_mock_api();
	let mut controller = controller_for(&base, Duration::from_secs(5));
	fill(&mut controller, ModelId::Lstm3, &["a", "b", "zz"]);

	let err = controller.predict_next().unwrap_err();
	assert_eq!(
		err,
		Error::Transport(TransportError::Status { code: 400, detail: Some("Invalid event: 'zz'".into()) })
	);
	assert_eq!(controller.session().window().tokens(), ["a", "b", "zz"]);
}

#[test]
fn server_error_records_failure_and_keeps_window() {
	let base = spawn_mock_api();
	let mut controller = controller_for(&base, Duration::from_secs(5));
	fill(&mut controller, ModelId::Rnn3, &["a", "b", "c"]);

	let err = controller.predict_next().unwrap_err();
	assert!(matches!(err, Error::Transport(TransportError::Status { code: 500, detail: None })));

	let history = controller.session().history();
	assert_eq!(history.len(), 1);
	assert!(!history.entries()[0].is_prediction());
	assert_eq!(controller.session().window().tokens(), ["a", "b", "c"]);
	assert!(matches!(controller.session().status(), SessionStatus::Error(_)));
}

#[test]
fn missing_predicted_event_is_malformed() {
	let base = spawn_mock_api();
	let client = RestClient::new(ClientConfig::new(&base, Duration::from_secs(5)).unwrap()).unwrap();
	let request = PredictionRequest {
		id: 1,
		model: ModelId::Rnn4,
		endpoint: ModelId::Rnn4.endpoint(),
		input_sequence: vec!["a".into(), "b".into(), "c".into(), "d".into()],
	};

	assert!(matches!(client.predict(&request), Err(TransportError::MalformedResponse(_))));
}

#[test]
fn slow_endpoint_times_out() {
	let base = spawn_mock_api();
	let mut controller = controller_for(&base, Duration::from_secs(1));
	fill(&mut controller, ModelId::Rnn5, &["a", "b", "c", "d", "e"]);

	let err = controller.predict_next().unwrap_err();
	assert_eq!(err, Error::Transport(TransportError::Timeout));
	assert_eq!(controller.session().window().tokens(), ["a", "b", "c", "d", "e"]);
}

#[test]
fn unreachable_endpoint_is_a_network_error() {
	// Grab a free port, then release it so nothing listens there.
	let port = TcpListener::bind("127.0.0.1:0").unwrap().local_addr().unwrap().port();
	let mut controller = controller_for(&format!("http://127.0.0.1:{port}"), Duration::from_secs(2));
	fill(&mut controller, ModelId::Lstm3, &["a", "b", "c"]);

	let err = controller.predict_next().unwrap_err();
	assert!(matches!(err, Error::Transport(TransportError::Network(_))), "got {err:?}");
	assert_eq!(controller.session().history().len(), 1);
}
