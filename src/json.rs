//! JSON encoding for grid responses
//!
//! DataTables clients are usually paired with a server that writes JSON with
//! `", "` and `": "` separators and ASCII-only string escapes. [`GridFormatter`]
//! reproduces that byte layout so responses from this crate are interchangeable
//! with those servers (including in fixtures that compare raw bodies).

use crate::error::Result;
use serde::Serialize;
use serde_json::ser::Formatter;
use std::io;

/// Options controlling how a view's output is encoded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JsonEncoding {
	/// Escape every non-ASCII character, and DEL, as `\uXXXX`
	pub ensure_ascii: bool,
}

impl Default for JsonEncoding {
	fn default() -> Self {
		Self { ensure_ascii: true }
	}
}

impl JsonEncoding {
	/// Encode a value into bytes
	///
	/// # Examples
	///
	/// ```
	/// use reinhardt_datatables::JsonEncoding;
	/// use serde_json::json;
	///
	/// let body = JsonEncoding::default()
	///     .encode(&json!([{"id": "1", "name": "Zoë"}]))
	///     .unwrap();
	/// assert_eq!(body, br#"[{"id": "1", "name": "Zo\u00eb"}]"#);
	/// ```
	pub fn encode<T>(&self, value: &T) -> Result<Vec<u8>>
	where
		T: Serialize + ?Sized,
	{
		let mut buffer = Vec::with_capacity(128);
		let formatter = GridFormatter::new(self.ensure_ascii);
		let mut serializer = serde_json::Serializer::with_formatter(&mut buffer, formatter);
		value.serialize(&mut serializer)?;
		Ok(buffer)
	}
}

/// `serde_json` formatter emitting spaced separators and optional ASCII escapes
#[derive(Debug, Clone, Copy)]
pub struct GridFormatter {
	ensure_ascii: bool,
}

impl GridFormatter {
	pub fn new(ensure_ascii: bool) -> Self {
		Self { ensure_ascii }
	}
}

impl Formatter for GridFormatter {
	fn begin_array_value<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
	where
		W: ?Sized + io::Write,
	{
		if first {
			Ok(())
		} else {
			writer.write_all(b", ")
		}
	}

	fn begin_object_key<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
	where
		W: ?Sized + io::Write,
	{
		if first {
			Ok(())
		} else {
			writer.write_all(b", ")
		}
	}

	fn begin_object_value<W>(&mut self, writer: &mut W) -> io::Result<()>
	where
		W: ?Sized + io::Write,
	{
		writer.write_all(b": ")
	}

	fn write_string_fragment<W>(&mut self, writer: &mut W, fragment: &str) -> io::Result<()>
	where
		W: ?Sized + io::Write,
	{
		if !self.ensure_ascii || !fragment.chars().any(needs_escape) {
			return writer.write_all(fragment.as_bytes());
		}

		let mut start = 0;
		for (index, ch) in fragment.char_indices() {
			if !needs_escape(ch) {
				continue;
			}
			writer.write_all(&fragment.as_bytes()[start..index])?;
			let mut units = [0u16; 2];
			for unit in ch.encode_utf16(&mut units) {
				write!(writer, "\\u{:04x}", unit)?;
			}
			start = index + ch.len_utf8();
		}
		writer.write_all(&fragment.as_bytes()[start..])
	}
}

// Control characters below 0x20 never reach here; serde_json escapes them itself.
fn needs_escape(ch: char) -> bool {
	!ch.is_ascii() || ch == '\u{7f}'
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;
	use serde_json::json;

	#[rstest]
	fn test_spaced_separators() {
		let body = JsonEncoding::default()
			.encode(&json!({"draw": 1, "data": [1, 2, 3]}))
			.unwrap();
		assert_eq!(body, br#"{"draw": 1, "data": [1, 2, 3]}"#);
	}

	#[rstest]
	fn test_empty_containers() {
		let body = JsonEncoding::default().encode(&json!({"data": [], "meta": {}})).unwrap();
		assert_eq!(body, br#"{"data": [], "meta": {}}"#);
	}

	#[rstest]
	fn test_astral_characters_use_surrogate_pairs() {
		let body = JsonEncoding::default().encode("ok 🎉").unwrap();
		assert_eq!(body, br#""ok \ud83c\udf89""#);
	}

	#[rstest]
	fn test_ensure_ascii_disabled_keeps_utf8() {
		let encoding = JsonEncoding {
			ensure_ascii: false,
		};
		let body = encoding.encode("Zoë").unwrap();
		assert_eq!(body, "\"Zoë\"".as_bytes());
	}

	#[rstest]
	fn test_control_characters_still_escaped() {
		let body = JsonEncoding::default().encode("a\nb\u{1f}é").unwrap();
		assert_eq!(body, br#""a\nb\u001f\u00e9""#);
	}

	#[rstest]
	#[case("a\u{7f}b", br#""a\u007fb""#.as_slice())]
	#[case("\u{7f}", br#""\u007f""#.as_slice())]
	#[case("~\u{7f}\u{80}", br#""~\u007f\u0080""#.as_slice())]
	fn test_delete_character_escaped(#[case] input: &str, #[case] expected: &[u8]) {
		let body = JsonEncoding::default().encode(input).unwrap();
		assert_eq!(body, expected);
	}

	#[rstest]
	fn test_delete_character_raw_without_ensure_ascii() {
		let encoding = JsonEncoding {
			ensure_ascii: false,
		};
		let body = encoding.encode("a\u{7f}b").unwrap();
		assert_eq!(body, b"\"a\x7fb\"");
	}
}
