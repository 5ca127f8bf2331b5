use serde::Deserialize;
use serde::Serialize;

/// Tag keyword recognized when no override is configured.
pub const DEFAULT_TAG_KEYWORD: &str = "filesection";

/// Configuration for a scan. Consumed, never mutated, by the scanner.
///
/// The config is plain data and deserializes from any serde format, with
/// every field optional:
///
/// ```json
/// { "tag_keyword": "snippet", "comment_token": "//" }
/// ```
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct ScanConfig {
	/// The reserved keyword that follows `[` in an opening tag.
	pub tag_keyword: String,
	/// Optional literal prefix that must sit directly before `[` for a tag
	/// to be recognized, e.g. a line-comment marker. `None` or an empty
	/// string makes a bare `[` sufficient.
	pub comment_token: Option<String>,
}

impl Default for ScanConfig {
	fn default() -> Self {
		Self {
			tag_keyword: DEFAULT_TAG_KEYWORD.to_string(),
			comment_token: None,
		}
	}
}

impl ScanConfig {
	/// Config recognizing the given tag keyword, with no comment token.
	pub fn new(tag_keyword: impl Into<String>) -> Self {
		Self {
			tag_keyword: tag_keyword.into(),
			comment_token: None,
		}
	}

	/// Require `comment_token` directly before `[` for tag recognition.
	#[must_use]
	pub fn with_comment_token(mut self, comment_token: impl Into<String>) -> Self {
		self.comment_token = Some(comment_token.into());
		self
	}

	/// The comment token that gates tag recognition. An empty token
	/// behaves as if none were configured.
	pub(crate) fn effective_comment_token(&self) -> Option<&str> {
		self.comment_token
			.as_deref()
			.filter(|token| !token.is_empty())
	}
}
