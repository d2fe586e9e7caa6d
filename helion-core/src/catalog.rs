use std::fmt;
use std::ops::RangeInclusive;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// How many tokens a model expects in its input window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LengthPolicy {
	/// The model only accepts this exact length.
	Fixed(usize),
	/// The user picks a length within the range (inclusive).
	Variable(RangeInclusive<usize>),
}

impl LengthPolicy {
	/// Returns true if a window of `length` tokens is acceptable.
	pub fn accepts(&self, length: usize) -> bool {
		match self {
			LengthPolicy::Fixed(n) => *n == length,
			LengthPolicy::Variable(range) => range.contains(&length),
		}
	}

	/// Lengths a front-end may offer for this policy.
	pub fn choices(&self) -> RangeInclusive<usize> {
		match self {
			LengthPolicy::Fixed(n) => *n..=*n,
			LengthPolicy::Variable(range) => range.clone(),
		}
	}
}

/// Catalog of the models served by the inference API.
///
/// Each identifier maps to a display label, an endpoint path and a
/// length policy. The wire name (`as_str`) is what the user selects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ModelId {
	#[serde(rename = "rnn3")]
	Rnn3,
	#[serde(rename = "rnn4")]
	Rnn4,
	#[serde(rename = "rnn5")]
	Rnn5,
	#[serde(rename = "rnnN")]
	RnnN,
	#[serde(rename = "lstm3")]
	Lstm3,
	#[serde(rename = "lstm4")]
	Lstm4,
	#[serde(rename = "lstm5")]
	Lstm5,
	#[serde(rename = "lstmN")]
	LstmN,
	#[serde(rename = "lstmAll5to15")]
	LstmAll5To15,
	#[serde(rename = "lstmAll5to15_2layers")]
	LstmAll5To15TwoLayers,
	#[serde(rename = "lstmAll3to20")]
	LstmAll3To20,
}

/// Upper bound for the free-length `N` models.
pub const MAX_VARIABLE_LENGTH: usize = 20;

impl ModelId {
	/// Every model, in the order a selection list shows them.
	pub const ALL: [ModelId; 11] = [
		ModelId::Rnn3,
		ModelId::Rnn4,
		ModelId::Rnn5,
		ModelId::RnnN,
		ModelId::Lstm3,
		ModelId::Lstm4,
		ModelId::Lstm5,
		ModelId::LstmN,
		ModelId::LstmAll5To15,
		ModelId::LstmAll5To15TwoLayers,
		ModelId::LstmAll3To20,
	];

	pub fn as_str(&self) -> &'static str {
		match self {
			ModelId::Rnn3 => "rnn3",
			ModelId::Rnn4 => "rnn4",
			ModelId::Rnn5 => "rnn5",
			ModelId::RnnN => "rnnN",
			ModelId::Lstm3 => "lstm3",
			ModelId::Lstm4 => "lstm4",
			ModelId::Lstm5 => "lstm5",
			ModelId::LstmN => "lstmN",
			ModelId::LstmAll5To15 => "lstmAll5to15",
			ModelId::LstmAll5To15TwoLayers => "lstmAll5to15_2layers",
			ModelId::LstmAll3To20 => "lstmAll3to20",
		}
	}

	/// Human-readable name.
	pub fn label(&self) -> &'static str {
		match self {
			ModelId::Rnn3 => "RNN 3 Sequence Model",
			ModelId::Rnn4 => "RNN 4 Sequence Model",
			ModelId::Rnn5 => "RNN 5 Sequence Model",
			ModelId::RnnN => "RNN N Sequence Model",
			ModelId::Lstm3 => "LSTM 3 Sequence Model",
			ModelId::Lstm4 => "LSTM 4 Sequence Model",
			ModelId::Lstm5 => "LSTM 5 Sequence Model",
			ModelId::LstmN => "LSTM N Sequence Model",
			ModelId::LstmAll5To15 => "LSTM All 5-15 Sequence Model",
			ModelId::LstmAll5To15TwoLayers => "LSTM 5-15 Using 2 layers Sequence Model",
			ModelId::LstmAll3To20 => "LSTM 3-20 Sequence Model",
		}
	}

	/// Path of the prediction endpoint, relative to the API base address.
	pub fn endpoint(&self) -> &'static str {
		match self {
			ModelId::Rnn3 => "/predict/rnn/3",
			ModelId::Rnn4 => "/predict/rnn/4",
			ModelId::Rnn5 => "/predict/rnn/5",
			ModelId::RnnN => "/predict/rnn/n",
			ModelId::Lstm3 => "/predict/lstm/3",
			ModelId::Lstm4 => "/predict/lstm/4",
			ModelId::Lstm5 => "/predict/lstm/5",
			ModelId::LstmN => "/predict/lstm/n",
			ModelId::LstmAll5To15 => "/predict/all/5-15",
			ModelId::LstmAll5To15TwoLayers => "/predict/all/2layers/5-15",
			ModelId::LstmAll3To20 => "/predict/all/3-20",
		}
	}

	pub fn length_policy(&self) -> LengthPolicy {
		match self {
			ModelId::Rnn3 | ModelId::Lstm3 => LengthPolicy::Fixed(3),
			ModelId::Rnn4 | ModelId::Lstm4 => LengthPolicy::Fixed(4),
			ModelId::Rnn5 | ModelId::Lstm5 => LengthPolicy::Fixed(5),
			ModelId::RnnN | ModelId::LstmN => LengthPolicy::Variable(1..=MAX_VARIABLE_LENGTH),
			ModelId::LstmAll5To15 | ModelId::LstmAll5To15TwoLayers => LengthPolicy::Variable(5..=15),
			ModelId::LstmAll3To20 => LengthPolicy::Variable(3..=20),
		}
	}
}

impl fmt::Display for ModelId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl FromStr for ModelId {
	type Err = ValidationError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let s = s.trim();
		if s.is_empty() {
			return Err(ValidationError::NoModelSelected);
		}
		ModelId::ALL
			.into_iter()
			.find(|m| m.as_str() == s)
			.ok_or_else(|| ValidationError::UnknownModel(s.to_owned()))
	}
}

/// The user's model choice, carrying the length lock with it.
///
/// A fixed-length model can never be paired with another window length,
/// so there is no separate "length locked" flag to keep in sync.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelSelection {
	Fixed { model: ModelId, length: usize },
	Variable { model: ModelId },
}

impl ModelSelection {
	pub fn new(model: ModelId) -> Self {
		match model.length_policy() {
			LengthPolicy::Fixed(length) => ModelSelection::Fixed { model, length },
			LengthPolicy::Variable(_) => ModelSelection::Variable { model },
		}
	}

	pub fn model(&self) -> ModelId {
		match self {
			ModelSelection::Fixed { model, .. } | ModelSelection::Variable { model } => *model,
		}
	}

	/// The locked length, if any.
	pub fn locked_length(&self) -> Option<usize> {
		match self {
			ModelSelection::Fixed { length, .. } => Some(*length),
			ModelSelection::Variable { .. } => None,
		}
	}

	pub fn endpoint(&self) -> &'static str {
		self.model().endpoint()
	}
}
