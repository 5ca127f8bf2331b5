use miette::Diagnostic;
use thiserror::Error;

/// Errors raised while scanning a document for filesections.
///
/// Every variant is fatal: the scan aborts at the point of detection and
/// no partial result is returned. Variants carry the offending character
/// and the 1-indexed line where the scanner stopped.
#[derive(Debug, Diagnostic, Error)]
#[non_exhaustive]
pub enum FilesectionError {
	/// The cursor was asked to advance by zero after the first step. Only
	/// the very first step may use a zero offset (initialization); a later
	/// zero advance would make the scan non-terminating, so this is an
	/// internal invariant violation rather than an input error.
	#[error("cursor advance of zero at byte {pos}; only the first step may use a zero offset")]
	#[diagnostic(code(filesection::invalid_advance))]
	InvalidAdvance { pos: usize },

	#[error("unexpected token `{found}` on line {line}, expected {expected}")]
	#[diagnostic(code(filesection::unexpected_token))]
	UnexpectedToken {
		found: char,
		expected: &'static str,
		line: usize,
	},

	#[error("filesection opening tag on line {line} has no `name` or `vendor` attribute")]
	#[diagnostic(
		code(filesection::missing_identity),
		help("add at least one of `name=...` or `vendor=...` to the opening tag")
	)]
	MissingIdentity { line: usize },

	#[error("unterminated quoted attribute value opened with {quote} on line {line}")]
	#[diagnostic(code(filesection::unterminated_quote))]
	UnterminatedQuote { quote: char, line: usize },

	#[error("quoted attribute value on line {line} contains a raw newline")]
	#[diagnostic(
		code(filesection::newline_in_quoted_value),
		help("attribute values must stay on one line")
	)]
	NewlineInQuotedValue { line: usize },

	#[error("filesection opened on line {line} is never closed")]
	#[diagnostic(
		code(filesection::unclosed_section),
		help("close the section with `[/<tag keyword>]`")
	)]
	UnclosedSection { line: usize },

	#[error("unexpected end of input on line {line}, expected {expected}")]
	#[diagnostic(code(filesection::unexpected_eof))]
	UnexpectedEof {
		expected: &'static str,
		line: usize,
	},
}

pub type FilesectionResult<T> = Result<T, FilesectionError>;
