//! Prediction session: form state, reducer and the effectful controller.
//!
//! A session holds:
//! - the selected model (`ModelSelection`), which may lock the window length
//! - the input window (`SequenceWindow`)
//! - the append-only outcome log (`PredictionHistory`)
//! - the request status (`SessionStatus`)
//!
//! `Session` is pure state; `Controller` pairs it with an `InferenceClient`
//! to run the sliding-window prediction loop.

/// Controller running one request per `predict_next` call.
pub mod controller;

/// Append-only record of predictions and failures.
pub mod history;

/// Session state and its reducer.
pub mod state;

/// Fixed-length input window.
pub mod window;

mod proptest;

pub use controller::Controller;
pub use history::{HistoryEntry, PredictionHistory};
pub use state::{Action, Outcome, Session, SessionStatus};
pub use window::SequenceWindow;
