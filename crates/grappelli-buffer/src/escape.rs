//! HTML-safe text encoding for buffered output.
//!
//! Escaped characters (minimum set):
//! - `&` → `&amp;`
//! - `<` → `&lt;`
//! - `>` → `&gt;`
//! - `"` → `&quot;`
//! - `'` → `&#x27;`
//!
//! Characters outside the allowlist (printable ASCII, tab/newline/carriage
//! return, Hiragana, Katakana, and the em dash) are emitted as hexadecimal
//! numeric entities. Short inputs are encoded through an on-stack scratch
//! buffer; longer inputs check a reusable buffer out of a process-wide pool
//! so steady-state renders stay allocation-free.

use once_cell::sync::Lazy;
use parking_lot::Mutex;

use crate::error::{WriteError, WriteResult};
use crate::sink::Sink;
use crate::writer::BufferWriter;

/// Worst-case escaped length of a single character (`&#x10FFFF;`).
const MAX_BYTES_PER_CHAR: usize = 10;

/// On-stack scratch size; inputs that could exceed it go through the pool.
const STACK_SCRATCH_BYTES: usize = 256;

/// Buffers kept for reuse once returned.
const POOL_KEEP: usize = 8;

/// Largest buffer the pool retains; bigger ones are dropped on return so a
/// single oversized input cannot pin its allocation for the process lifetime.
const POOL_MAX_BYTES: usize = 64 * 1024;

static SCRATCH_POOL: Lazy<Mutex<Vec<Vec<u8>>>> = Lazy::new(|| Mutex::new(Vec::new()));

fn checkout(min_len: usize) -> Vec<u8> {
	let mut buffer = SCRATCH_POOL.lock().pop().unwrap_or_default();
	if buffer.len() < min_len {
		buffer.resize(min_len, 0);
	}
	buffer
}

fn restore(buffer: Vec<u8>) {
	if buffer.len() > POOL_MAX_BYTES {
		return;
	}
	let mut pool = SCRATCH_POOL.lock();
	if pool.len() < POOL_KEEP {
		pool.push(buffer);
	}
}

/// Characters passed through without escaping.
///
/// The HTML specials are excluded before this check. The allowlist matches
/// the output policy: printable ASCII plus the whitespace controls, Hiragana,
/// Katakana, and the em dash.
fn is_safe_char(ch: char) -> bool {
	matches!(ch,
		'\t' | '\n' | '\r'
		| ' '..='~'
		| '\u{3040}'..='\u{309F}' // Hiragana
		| '\u{30A0}'..='\u{30FF}' // Katakana
		| '\u{2014}' // em dash
	)
}

fn put(out: &mut [u8], at: usize, bytes: &[u8]) -> usize {
	out[at..at + bytes.len()].copy_from_slice(bytes);
	bytes.len()
}

/// Emits `&#xN;` for `code`, uppercase hex, no leading zeros.
fn put_entity(out: &mut [u8], at: usize, code: u32) -> usize {
	let mut len = put(out, at, b"&#x");
	let mut digits = [0u8; 6];
	let mut position = digits.len();
	let mut value = code;
	loop {
		position -= 1;
		let digit = (value & 0xF) as u8;
		digits[position] = if digit < 10 { b'0' + digit } else { b'A' + digit - 10 };
		value >>= 4;
		if value == 0 {
			break;
		}
	}
	len += put(out, at + len, &digits[position..]);
	out[at + len] = b';';
	len + 1
}

/// Encodes `input` into `out`, returning the encoded length.
///
/// `out` must hold at least `input.len() * MAX_BYTES_PER_CHAR` bytes.
fn encode_into(input: &str, out: &mut [u8]) -> usize {
	let mut len = 0;
	for ch in input.chars() {
		match ch {
			'&' => len += put(out, len, b"&amp;"),
			'<' => len += put(out, len, b"&lt;"),
			'>' => len += put(out, len, b"&gt;"),
			'"' => len += put(out, len, b"&quot;"),
			'\'' => len += put(out, len, b"&#x27;"),
			ch if is_safe_char(ch) => {
				let written = ch.encode_utf8(&mut out[len..len + MAX_BYTES_PER_CHAR]);
				len += written.len();
			}
			ch => len += put_entity(out, len, ch as u32),
		}
	}
	len
}

impl<S: Sink> BufferWriter<'_, S> {
	/// Writes `input` HTML-escaped.
	///
	/// # Examples
	///
	/// ```
	/// use grappelli_buffer::{BufferWriter, MemorySink};
	///
	/// let mut sink = MemorySink::new();
	/// let mut writer = BufferWriter::new(&mut sink);
	/// writer.write_escaped("a < b").unwrap();
	/// writer.commit();
	/// assert_eq!(sink.committed_bytes(), b"a &lt; b");
	/// ```
	pub fn write_escaped(&mut self, input: &str) -> WriteResult<()> {
		if input.len() * MAX_BYTES_PER_CHAR <= STACK_SCRATCH_BYTES {
			let mut scratch = [0u8; STACK_SCRATCH_BYTES];
			let len = encode_into(input, &mut scratch);
			self.write(&scratch[..len])
		} else {
			let mut scratch = checkout(input.len() * MAX_BYTES_PER_CHAR);
			let len = encode_into(input, &mut scratch);
			let result = self.write(&scratch[..len]);
			restore(scratch);
			result
		}
	}

	/// Writes raw bytes HTML-escaped, validating them as UTF-8 first.
	///
	/// Undecodable input is surfaced as
	/// [`InvalidData`](crate::WriteError::InvalidData) rather than silently
	/// truncated.
	pub fn write_escaped_bytes(&mut self, input: &[u8]) -> WriteResult<()> {
		let text = std::str::from_utf8(input).map_err(|err| WriteError::InvalidData {
			offset: err.valid_up_to(),
		})?;
		self.write_escaped(text)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::sink::MemorySink;

	fn escape(input: &str) -> Vec<u8> {
		let mut sink = MemorySink::new();
		let mut writer = BufferWriter::new(&mut sink);
		writer.write_escaped(input).unwrap();
		writer.commit();
		sink.committed_bytes().to_vec()
	}

	#[test]
	fn test_minimum_escape_set() {
		assert_eq!(
			escape("<a & 'b' \"c\">"),
			b"&lt;a &amp; &#x27;b&#x27; &quot;c&quot;&gt;".to_vec()
		);
	}

	#[test]
	fn test_escaped_output_has_no_literal_specials() {
		let out = escape("<a & 'b' \"c\">");
		for forbidden in [b'<', b'>', b'"', b'\''] {
			assert!(!out.contains(&forbidden));
		}
		// Ampersands appear only as entity introducers.
		let text = String::from_utf8(out).unwrap();
		for (index, _) in text.match_indices('&') {
			assert!(text[index + 1..].starts_with(['a', 'l', 'g', 'q', '#']));
		}
	}

	#[test]
	fn test_plain_text_passes_through() {
		assert_eq!(escape("hello, world"), b"hello, world".to_vec());
	}

	#[test]
	fn test_allowlisted_scripts_pass_through() {
		assert_eq!(escape("ひらがな"), "ひらがな".as_bytes().to_vec());
		assert_eq!(escape("カタカナ"), "カタカナ".as_bytes().to_vec());
		assert_eq!(escape("a\u{2014}b"), "a\u{2014}b".as_bytes().to_vec());
	}

	#[test]
	fn test_characters_outside_safe_set_become_entities() {
		assert_eq!(escape("caf\u{E9}"), b"caf&#xE9;".to_vec());
		assert_eq!(escape("\u{1F600}"), b"&#x1F600;".to_vec());
		assert_eq!(escape("\u{0}"), b"&#x0;".to_vec());
	}

	#[test]
	fn test_stack_and_pooled_paths_agree() {
		let unit = "<a & 'b' \"c\">";
		let short = escape(unit);
		// 30 copies pushes the input well past the stack threshold.
		let long = escape(&unit.repeat(30));
		assert_eq!(long, short.repeat(30));
	}

	#[test]
	fn test_pooled_path_reuses_buffers() {
		let input = "x".repeat(STACK_SCRATCH_BYTES);
		// Two sequential pooled escapes; the second run checks out the buffer
		// the first returned.
		assert_eq!(escape(&input), input.as_bytes().to_vec());
		assert_eq!(escape(&input), input.as_bytes().to_vec());
	}

	#[test]
	fn test_oversized_buffers_are_not_retained() {
		// Scratch demand is 10x the input, well past the retention cap.
		let input = "y".repeat(2 * POOL_MAX_BYTES);
		assert_eq!(escape(&input), input.as_bytes().to_vec());
		let pool = SCRATCH_POOL.lock();
		assert!(pool.iter().all(|buffer| buffer.len() <= POOL_MAX_BYTES));
	}

	#[test]
	fn test_invalid_utf8_is_surfaced() {
		let mut sink = MemorySink::new();
		let mut writer = BufferWriter::new(&mut sink);
		let err = writer.write_escaped_bytes(b"ok \xFF nope").unwrap_err();
		assert_eq!(err, WriteError::InvalidData { offset: 3 });
		writer.commit();
		assert_eq!(sink.committed(), 0);
	}

	#[test]
	fn test_valid_bytes_round_through() {
		let mut sink = MemorySink::new();
		let mut writer = BufferWriter::new(&mut sink);
		writer.write_escaped_bytes("1 < 2".as_bytes()).unwrap();
		writer.commit();
		assert_eq!(sink.committed_bytes(), b"1 &lt; 2");
	}
}
