//! Client library for a remote sequence-prediction API.
//!
//! This crate provides the pieces of a prediction session:
//! - A catalog of the served models and their endpoints
//! - A session state machine (model choice, input window, history, status)
//! - A blocking HTTP client for the inference endpoint
//! - Environment-driven configuration and typed errors
//!
//! The session itself never performs I/O; `session::Controller` runs the
//! sliding-window loop by pairing it with an `InferenceClient`.

/// Model identifiers, endpoint paths and length policies.
pub mod catalog;

/// Inference endpoint client (trait + REST implementation).
pub mod client;

/// Endpoint address and timeout settings.
pub mod config;

/// Validation, transport and configuration errors.
pub mod error;

/// Session state, reducer and controller.
pub mod session;

pub use catalog::{LengthPolicy, ModelId, ModelSelection};
pub use client::{InferenceClient, PredictionRequest, RestClient};
pub use config::ClientConfig;
pub use error::{ConfigError, Error, Result, TransportError, ValidationError};
pub use session::{Controller, HistoryEntry, Session, SessionStatus};
