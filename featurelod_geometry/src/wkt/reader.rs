use anyhow::{Error, Result, anyhow};

/// A cursor over WKT text that keeps track of its position for error messages.
pub struct WktReader<'a> {
	bytes: &'a [u8],
	position: usize,
}

impl<'a> WktReader<'a> {
	pub fn new(text: &'a str) -> Self {
		Self {
			bytes: text.as_bytes(),
			position: 0,
		}
	}

	pub fn format_error(&self, msg: &str) -> Error {
		anyhow!("{msg} at position {}", self.position)
	}

	pub fn peek(&self) -> Option<u8> {
		self.bytes.get(self.position).copied()
	}

	pub fn advance(&mut self) {
		self.position += 1;
	}

	pub fn skip_whitespace(&mut self) {
		while self.peek().is_some_and(|b| b.is_ascii_whitespace()) {
			self.advance();
		}
	}

	/// Skips whitespace and returns `true` if the next byte is `byte`, consuming it.
	pub fn try_byte(&mut self, byte: u8) -> bool {
		self.skip_whitespace();
		if self.peek() == Some(byte) {
			self.advance();
			true
		} else {
			false
		}
	}

	pub fn expect_byte(&mut self, byte: u8) -> Result<()> {
		if self.try_byte(byte) {
			Ok(())
		} else {
			Err(self.format_error(&format!("expected '{}'", byte as char)))
		}
	}

	/// Skips whitespace and reads a run of ASCII letters, upper-cased. Returns an empty string if
	/// the next byte is not a letter.
	pub fn read_word(&mut self) -> String {
		self.skip_whitespace();
		let start = self.position;
		while self.peek().is_some_and(|b| b.is_ascii_alphabetic()) {
			self.advance();
		}
		String::from_utf8_lossy(&self.bytes[start..self.position]).to_ascii_uppercase()
	}

	/// Skips whitespace and returns `true` if a number starts at the next byte.
	pub fn at_number(&mut self) -> bool {
		self.skip_whitespace();
		self
			.peek()
			.is_some_and(|b| b.is_ascii_digit() || matches!(b, b'-' | b'+' | b'.'))
	}

	pub fn read_number(&mut self) -> Result<f64> {
		self.skip_whitespace();
		let start = self.position;
		while self
			.peek()
			.is_some_and(|b| b.is_ascii_digit() || matches!(b, b'-' | b'+' | b'.' | b'e' | b'E'))
		{
			self.advance();
		}
		std::str::from_utf8(&self.bytes[start..self.position])
			.ok()
			.and_then(|text| text.parse::<f64>().ok())
			.ok_or_else(|| self.format_error("invalid number"))
	}

	pub fn is_at_end(&mut self) -> bool {
		self.skip_whitespace();
		self.peek().is_none()
	}
}
