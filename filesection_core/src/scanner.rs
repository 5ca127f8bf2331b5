use tracing::debug;
use tracing::trace;

use crate::FilesectionError;
use crate::FilesectionResult;
use crate::config::ScanConfig;
use crate::cursor::Cursor;
use crate::cursor::is_ident_char;
use crate::cursor::is_whitespace;
use crate::section::Attributes;
use crate::section::Entry;
use crate::section::Filesection;

/// Scan `input` for filesection tags and return the ordered sequence of
/// plain-text runs and completed filesections.
///
/// The whole input is consumed in a single forward pass. Any malformed
/// tag aborts the scan with a [`FilesectionError`]; text that merely looks
/// like a tag (a stray `[`, a comment token with nothing behind it, an
/// unknown keyword) is kept as ordinary content.
///
/// ```
/// use filesection_core::Entry;
/// use filesection_core::ScanConfig;
/// use filesection_core::scan;
///
/// let entries = scan("a[filesection name=x]b[/filesection]c", &ScanConfig::default())?;
///
/// assert_eq!(entries.len(), 3);
/// assert_eq!(entries[0], Entry::Text("a".to_string()));
/// # Ok::<(), filesection_core::FilesectionError>(())
/// ```
pub fn scan(input: impl AsRef<str>, config: &ScanConfig) -> FilesectionResult<Vec<Entry>> {
	Scanner::new(input.as_ref(), config).run()
}

/// What the scanner currently expects at the cursor.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum Mode {
	/// Initial state; handled exactly like `NonSectionedContent`.
	Start,
	/// Accumulating plain text outside any tag.
	NonSectionedContent,
	/// A comment token matched; only a literal `[` keeps tag recognition
	/// going.
	ExpectOpeningBracket,
	/// Past the `[`, skipping whitespace, expecting the tag keyword.
	ExpectOpeningTagName,
	/// Inside an opening tag, expecting an attribute name or `]`.
	ExpectAttribute,
	/// Accumulating an attribute name.
	AttributeName,
	/// The attribute name was followed by whitespace; only `=` is valid.
	ExpectEqualSign,
	/// Past the `=`, expecting a quoted or unquoted value.
	ExpectAttributeValue,
	/// Inside a quoted attribute value.
	QuotedValue,
	/// Inside an unquoted attribute value.
	UnquotedValue,
	/// Inside a section body, collecting raw text until the closing tag.
	SectionBody,
}

/// The attribute name/value pair currently being built.
#[derive(Debug, Default)]
struct AttributeBuffer {
	name: String,
	value: String,
}

impl AttributeBuffer {
	fn reset(&mut self) {
		self.name.clear();
		self.value.clear();
	}
}

/// The quoted attribute value currently in progress.
#[derive(Debug, Default)]
struct QuoteState {
	/// The quote character that will terminate the value.
	quote: char,
	/// Byte offset where the value content starts, just past the opening
	/// quote.
	value_start: usize,
	/// Line of the opening quote, for the unterminated-quote diagnostic.
	open_line: usize,
}

/// One in-progress scan: cursor, active mode, accumulators, and the
/// result sequence. A fresh instance is created per [`scan`] call, so
/// concurrent scans over different inputs never share state.
struct Scanner<'a> {
	config: &'a ScanConfig,
	input: &'a str,
	cursor: Cursor<'a>,
	mode: Mode,
	/// Plain text accumulated since the last flush.
	content: String,
	/// Byte offset where the tag currently being recognized (or
	/// speculated on) began, including its comment token.
	tag_start: usize,
	/// Line of the opening tag of the section being parsed.
	open_line: usize,
	attribute: AttributeBuffer,
	attributes: Attributes,
	quote: QuoteState,
	/// Nesting depth inside the current section body.
	depth: usize,
	/// Byte offset where the current section body starts.
	body_start: usize,
	entries: Vec<Entry>,
}

impl<'a> Scanner<'a> {
	fn new(input: &'a str, config: &'a ScanConfig) -> Self {
		Self {
			config,
			input,
			cursor: Cursor::new(input),
			mode: Mode::Start,
			content: String::new(),
			tag_start: 0,
			open_line: 0,
			attribute: AttributeBuffer::default(),
			attributes: Attributes::default(),
			quote: QuoteState::default(),
			depth: 0,
			body_start: 0,
			entries: vec![],
		}
	}

	/// Drive the state machine until the cursor passes the end of the
	/// input. One step consumes at least one character; the transition for
	/// every (mode, character) pair either advances the cursor or fails
	/// the scan.
	fn run(mut self) -> FilesectionResult<Vec<Entry>> {
		// The first advance initializes the cursor at offset zero; every
		// later step must move it forward.
		self.cursor.advance(0)?;

		loop {
			let Some(current) = self.cursor.current() else {
				return self.finish();
			};

			match self.mode {
				Mode::Start | Mode::NonSectionedContent => self.on_content(current)?,
				Mode::ExpectOpeningBracket => self.on_expect_opening_bracket(current)?,
				Mode::ExpectOpeningTagName => self.on_expect_opening_tag_name(current)?,
				Mode::ExpectAttribute => self.on_expect_attribute(current)?,
				Mode::AttributeName => self.on_attribute_name(current)?,
				Mode::ExpectEqualSign => self.on_expect_equal_sign(current)?,
				Mode::ExpectAttributeValue => self.on_expect_attribute_value(current)?,
				Mode::QuotedValue => self.on_quoted_value(current)?,
				Mode::UnquotedValue => self.on_unquoted_value(current)?,
				Mode::SectionBody => self.on_section_body(current)?,
			}
		}
	}

	/// Plain content: look for the start of a tag, buffering everything
	/// else. With a comment token configured, only the token opens tag
	/// recognition and a bare `[` stays ordinary text.
	fn on_content(&mut self, current: char) -> FilesectionResult<()> {
		if let Some(token) = self.config.effective_comment_token() {
			if self.cursor.rest().starts_with(token) {
				self.tag_start = self.cursor.pos();
				self.mode = Mode::ExpectOpeningBracket;
				return self.cursor.advance(token.len());
			}

			return self.buffer_char(current);
		}

		if current == '[' {
			self.tag_start = self.cursor.pos();
			self.mode = Mode::ExpectOpeningTagName;
			return self.cursor.advance(1);
		}

		self.buffer_char(current)
	}

	/// Append one character of plain text and stay in content mode.
	fn buffer_char(&mut self, current: char) -> FilesectionResult<()> {
		self.mode = Mode::NonSectionedContent;
		self.content.push(current);
		self.cursor.advance(current.len_utf8())
	}

	fn on_expect_opening_bracket(&mut self, current: char) -> FilesectionResult<()> {
		if current == '[' {
			self.mode = Mode::ExpectOpeningTagName;
			return self.cursor.advance(1);
		}

		// The comment token did not introduce a tag after all; it was
		// ordinary text.
		self.restore_speculated_text();
		self.buffer_char(current)
	}

	fn on_expect_opening_tag_name(&mut self, current: char) -> FilesectionResult<()> {
		if is_whitespace(current) {
			return self.cursor.advance(current.len_utf8());
		}

		let keyword = self.config.tag_keyword.as_str();

		if !keyword.is_empty() && self.cursor.rest().starts_with(keyword) {
			self.flush_content();
			self.open_line = self.cursor.line();
			self.attributes = Attributes::default();
			self.mode = Mode::ExpectAttribute;
			trace!(line = self.open_line, "opening tag keyword matched");
			return self.cursor.advance(keyword.len());
		}

		// Not a tag: the `[` and any skipped whitespace were ordinary
		// text.
		self.restore_speculated_text();
		self.buffer_char(current)
	}

	/// Put the text consumed while speculating on a tag back into the
	/// content buffer, so failed recognition never loses or splits text.
	fn restore_speculated_text(&mut self) {
		let input = self.input;
		self.content.push_str(&input[self.tag_start..self.cursor.pos()]);
	}

	/// Flush buffered plain text as a single entry. Runs when a tag
	/// keyword is confirmed and at end of input, so consecutive text is
	/// never split across entries.
	fn flush_content(&mut self) {
		if self.content.is_empty() {
			return;
		}

		let text = std::mem::take(&mut self.content);
		trace!(bytes = text.len(), "flushing non-sectioned content");
		self.entries.push(Entry::Text(text));
	}

	fn on_expect_attribute(&mut self, current: char) -> FilesectionResult<()> {
		if is_whitespace(current) {
			return self.cursor.advance(current.len_utf8());
		}

		if is_ident_char(current) {
			self.attribute.reset();
			self.attribute.name.push(current);
			self.mode = Mode::AttributeName;
			return self.cursor.advance(current.len_utf8());
		}

		if current == ']' {
			return self.close_opening_tag();
		}

		Err(FilesectionError::UnexpectedToken {
			found: current,
			expected: "an attribute name or `]`",
			line: self.cursor.line(),
		})
	}

	/// `]` seen while an opening tag is being parsed: the tag is complete
	/// once the identity requirement holds, and the section body starts
	/// right after the bracket.
	fn close_opening_tag(&mut self) -> FilesectionResult<()> {
		if !self.attributes.has_identity() {
			return Err(FilesectionError::MissingIdentity {
				line: self.cursor.line(),
			});
		}

		self.mode = Mode::SectionBody;
		self.depth = 0;
		self.body_start = self.cursor.pos() + 1;
		self.cursor.advance(1)
	}

	fn on_attribute_name(&mut self, current: char) -> FilesectionResult<()> {
		if is_ident_char(current) {
			self.attribute.name.push(current);
			return self.cursor.advance(current.len_utf8());
		}

		if is_whitespace(current) {
			// The name stands alone for now: record it with an empty
			// value and require `=` before the value may follow.
			self.attributes
				.insert(self.attribute.name.clone(), String::new());
			self.mode = Mode::ExpectEqualSign;
			return self.cursor.advance(current.len_utf8());
		}

		if current == '=' {
			self.mode = Mode::ExpectAttributeValue;
			return self.cursor.advance(1);
		}

		Err(FilesectionError::UnexpectedToken {
			found: current,
			expected: "an attribute name character, whitespace, or `=`",
			line: self.cursor.line(),
		})
	}

	fn on_expect_equal_sign(&mut self, current: char) -> FilesectionResult<()> {
		if current == '=' {
			self.mode = Mode::ExpectAttributeValue;
			return self.cursor.advance(1);
		}

		Err(FilesectionError::UnexpectedToken {
			found: current,
			expected: "`=`",
			line: self.cursor.line(),
		})
	}

	fn on_expect_attribute_value(&mut self, current: char) -> FilesectionResult<()> {
		if is_whitespace(current) {
			return self.cursor.advance(current.len_utf8());
		}

		if current == '\'' || current == '"' {
			self.quote = QuoteState {
				quote: current,
				value_start: self.cursor.pos() + 1,
				open_line: self.cursor.line(),
			};
			self.mode = Mode::QuotedValue;
			return self.cursor.advance(1);
		}

		if is_ident_char(current) {
			self.attribute.value.push(current);
			self.mode = Mode::UnquotedValue;
			return self.cursor.advance(current.len_utf8());
		}

		Err(FilesectionError::UnexpectedToken {
			found: current,
			expected: "a quoted or unquoted attribute value",
			line: self.cursor.line(),
		})
	}

	fn on_quoted_value(&mut self, current: char) -> FilesectionResult<()> {
		if current == self.quote.quote {
			if escaped_at(self.input, self.cursor.pos()) {
				return self.cursor.advance(1);
			}

			// The value is the recorded span, with quote escapes
			// collapsed.
			let input = self.input;
			let raw = &input[self.quote.value_start..self.cursor.pos()];
			let value = unescape_quoted(raw, self.quote.quote);
			self.commit_attribute(value);
			self.quote = QuoteState::default();
			self.mode = Mode::ExpectAttribute;
			return self.cursor.advance(1);
		}

		if current == '\n' {
			return Err(FilesectionError::NewlineInQuotedValue {
				line: self.cursor.line(),
			});
		}

		self.cursor.advance(current.len_utf8())
	}

	fn on_unquoted_value(&mut self, current: char) -> FilesectionResult<()> {
		if is_ident_char(current) {
			self.attribute.value.push(current);
			return self.cursor.advance(current.len_utf8());
		}

		// Whitespace and `]` terminate the value; the terminator keeps
		// its expect-attribute meaning within this same step so the
		// cursor still moves strictly forward.
		if is_whitespace(current) {
			let value = std::mem::take(&mut self.attribute.value);
			self.commit_attribute(value);
			self.mode = Mode::ExpectAttribute;
			return self.cursor.advance(current.len_utf8());
		}

		if current == ']' {
			let value = std::mem::take(&mut self.attribute.value);
			self.commit_attribute(value);
			return self.close_opening_tag();
		}

		Err(FilesectionError::UnexpectedToken {
			found: current,
			expected: "an attribute value character, whitespace, or `]`",
			line: self.cursor.line(),
		})
	}

	/// Commit the pair being built into the section's attribute mapping
	/// and reset the pair buffers.
	fn commit_attribute(&mut self, value: String) {
		let name = std::mem::take(&mut self.attribute.name);
		trace!(name = %name, "attribute committed");
		self.attributes.insert(name, value);
		self.attribute.value.clear();
	}

	/// Section body: collect raw text, tracking nested tags, until the
	/// closing tag belonging to the current section. Nested tags stay
	/// verbatim inside the body.
	fn on_section_body(&mut self, current: char) -> FilesectionResult<()> {
		if let Some(len) = self.closing_tag_len() {
			if self.depth == 0 {
				let body = self.input[self.body_start..self.cursor.pos()].to_string();
				let attributes = std::mem::take(&mut self.attributes);
				debug!(
					line = self.cursor.line(),
					attributes = attributes.len(),
					"filesection completed"
				);
				self.entries
					.push(Entry::Filesection(Filesection { attributes, body }));
				self.mode = Mode::NonSectionedContent;
				return self.cursor.advance(len);
			}

			// A nested section's closing tag stays part of the body.
			self.depth -= 1;
			return self.cursor.advance(len);
		}

		if let Some(len) = self.opening_tag_len() {
			self.depth += 1;
			return self.cursor.advance(len);
		}

		self.cursor.advance(current.len_utf8())
	}

	/// Length of a closing tag (`CT? '[' WS* '/' TAG ']'`) starting at
	/// the cursor, if one is present.
	fn closing_tag_len(&self) -> Option<usize> {
		let rest = self.cursor.rest();
		let mut remaining = rest;

		if let Some(token) = self.config.effective_comment_token() {
			remaining = remaining.strip_prefix(token)?;
		}

		remaining = remaining.strip_prefix('[')?;
		remaining = remaining.trim_start_matches(is_whitespace);
		remaining = remaining.strip_prefix('/')?;
		remaining = remaining.strip_prefix(self.config.tag_keyword.as_str())?;
		remaining = remaining.strip_prefix(']')?;

		Some(rest.len() - remaining.len())
	}

	/// Length of a nested opening tag (`CT? '[' WS* TAG`) starting at the
	/// cursor, if one is present.
	fn opening_tag_len(&self) -> Option<usize> {
		let rest = self.cursor.rest();
		let mut remaining = rest;

		if let Some(token) = self.config.effective_comment_token() {
			remaining = remaining.strip_prefix(token)?;
		}

		remaining = remaining.strip_prefix('[')?;
		remaining = remaining.trim_start_matches(is_whitespace);
		remaining = remaining.strip_prefix(self.config.tag_keyword.as_str())?;

		Some(rest.len() - remaining.len())
	}

	/// End of input: flush what remains, or report what was left open.
	fn finish(mut self) -> FilesectionResult<Vec<Entry>> {
		match self.mode {
			Mode::Start | Mode::NonSectionedContent => {}
			Mode::ExpectOpeningBracket | Mode::ExpectOpeningTagName => {
				// The speculated tag never materialized; its text is
				// ordinary.
				self.restore_speculated_text();
			}
			Mode::QuotedValue => {
				return Err(FilesectionError::UnterminatedQuote {
					quote: self.quote.quote,
					line: self.quote.open_line,
				});
			}
			Mode::SectionBody => {
				return Err(FilesectionError::UnclosedSection {
					line: self.open_line,
				});
			}
			Mode::ExpectAttribute
			| Mode::AttributeName
			| Mode::ExpectEqualSign
			| Mode::ExpectAttributeValue
			| Mode::UnquotedValue => {
				return Err(FilesectionError::UnexpectedEof {
					expected: "the rest of a filesection opening tag",
					line: self.cursor.line(),
				});
			}
		}

		self.flush_content();

		Ok(self.entries)
	}
}

/// Whether the character at `pos` is escaped by an odd run of
/// backslashes.
fn escaped_at(input: &str, pos: usize) -> bool {
	let backslashes = input[..pos]
		.bytes()
		.rev()
		.take_while(|&byte| byte == b'\\')
		.count();

	backslashes % 2 == 1
}

/// Collapse `\<quote>` escapes inside a quoted value. Every other
/// backslash stays literal.
fn unescape_quoted(raw: &str, quote: char) -> String {
	let mut value = String::with_capacity(raw.len());
	let mut chars = raw.chars().peekable();

	while let Some(ch) = chars.next() {
		if ch == '\\' && chars.peek() == Some(&quote) {
			continue;
		}

		value.push(ch);
	}

	value
}
