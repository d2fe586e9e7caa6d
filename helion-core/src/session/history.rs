use std::fmt;

/// One outcome of a prediction attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HistoryEntry {
	/// A successful prediction. `number` is 1-based and counts successes only.
	Prediction { number: usize, event: String },
	/// A request that reached the transport layer and failed.
	Failure { message: String },
}

impl HistoryEntry {
	/// Card title as shown by front-ends.
	pub fn title(&self) -> String {
		match self {
			HistoryEntry::Prediction { number, .. } => format!("Prediction {number}"),
			HistoryEntry::Failure { .. } => "Error".to_owned(),
		}
	}

	/// Card body: the predicted event or the failure message.
	pub fn description(&self) -> &str {
		match self {
			HistoryEntry::Prediction { event, .. } => event,
			HistoryEntry::Failure { message } => message,
		}
	}

	pub fn is_prediction(&self) -> bool {
		matches!(self, HistoryEntry::Prediction { .. })
	}
}

impl fmt::Display for HistoryEntry {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}: {}", self.title(), self.description())
	}
}

/// Append-only record of the session's prediction attempts.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PredictionHistory {
	entries: Vec<HistoryEntry>,
	predictions: usize,
}

impl PredictionHistory {
	pub fn entries(&self) -> &[HistoryEntry] {
		&self.entries
	}

	pub fn len(&self) -> usize {
		self.entries.len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	/// Number of successful predictions.
	pub fn prediction_count(&self) -> usize {
		self.predictions
	}

	/// Predicted events in order, skipping failures.
	pub fn predicted_events(&self) -> impl Iterator<Item = &str> {
		self.entries.iter().filter_map(|e| match e {
			HistoryEntry::Prediction { event, .. } => Some(event.as_str()),
			HistoryEntry::Failure { .. } => None,
		})
	}

	pub(crate) fn push_prediction(&mut self, event: impl Into<String>) -> &HistoryEntry {
		self.predictions += 1;
		self.push(HistoryEntry::Prediction { number: self.predictions, event: event.into() })
	}

	pub(crate) fn push_failure(&mut self, message: impl Into<String>) -> &HistoryEntry {
		self.push(HistoryEntry::Failure { message: message.into() })
	}

	fn push(&mut self, entry: HistoryEntry) -> &HistoryEntry {
		self.entries.push(entry);
		&self.entries[self.entries.len() - 1]
	}
}
