use crate::error::ValidationError;

/// Fixed-length ordered list of the tokens sent to the model.
///
/// The length only changes through `resize`; `slide` keeps it constant
/// by dropping the oldest token for every token appended.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SequenceWindow {
	tokens: Vec<String>,
}

impl SequenceWindow {
	/// Creates a window of `length` empty slots.
	pub fn with_length(length: usize) -> Self {
		Self { tokens: vec![String::new(); length] }
	}

	pub fn len(&self) -> usize {
		self.tokens.len()
	}

	pub fn is_empty(&self) -> bool {
		self.tokens.is_empty()
	}

	pub fn tokens(&self) -> &[String] {
		&self.tokens
	}

	pub fn get(&self, index: usize) -> Option<&str> {
		self.tokens.get(index).map(String::as_str)
	}

	/// Discards every value and makes room for `length` empty slots.
	pub(crate) fn resize(&mut self, length: usize) {
		self.tokens = vec![String::new(); length];
	}

	/// Replaces the value of a single slot.
	pub(crate) fn set(&mut self, index: usize, value: impl Into<String>) -> Result<(), ValidationError> {
		let length = self.tokens.len();
		match self.tokens.get_mut(index) {
			Some(slot) => {
				*slot = value.into();
				Ok(())
			}
			None => Err(ValidationError::IndexOutOfRange { index, length }),
		}
	}

	/// Index of the first slot that is blank once trimmed.
	pub fn first_blank(&self) -> Option<usize> {
		self.tokens.iter().position(|t| t.trim().is_empty())
	}

	/// Drops the oldest token and appends `token`.
	///
	/// A zero-length window stays empty.
	pub(crate) fn slide(&mut self, token: impl Into<String>) {
		if self.tokens.is_empty() {
			return;
		}
		self.tokens.remove(0);
		self.tokens.push(token.into());
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn window(tokens: &[&str]) -> SequenceWindow {
		SequenceWindow { tokens: tokens.iter().map(|t| t.to_string()).collect() }
	}

	#[test]
	fn slide_keeps_length() {
		let mut w = window(&["a", "b", "c"]);
		w.slide("d");
		assert_eq!(w, window(&["b", "c", "d"]));
		w.slide("e");
		assert_eq!(w, window(&["c", "d", "e"]));
	}

	#[test]
	fn slide_on_single_slot_replaces_it() {
		let mut w = window(&["a"]);
		w.slide("z");
		assert_eq!(w.tokens(), ["z"]);
	}

	#[test]
	fn set_only_touches_one_slot() {
		let mut w = SequenceWindow::with_length(3);
		w.set(1, "login").unwrap();
		assert_eq!(w.tokens(), ["", "login", ""]);
		assert_eq!(w.set(3, "x"), Err(ValidationError::IndexOutOfRange { index: 3, length: 3 }));
	}

	#[test]
	fn blank_detection_trims_whitespace() {
		assert_eq!(window(&["a", "  ", "c"]).first_blank(), Some(1));
		assert_eq!(window(&["a", "b"]).first_blank(), None);
	}

	#[test]
	fn resize_discards_values() {
		let mut w = window(&["a", "b"]);
		w.resize(4);
		assert_eq!(w, SequenceWindow::with_length(4));
	}
}
