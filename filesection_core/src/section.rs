use std::collections::BTreeMap;

use derive_more::Deref;
use derive_more::DerefMut;
use serde::Deserialize;
use serde::Serialize;

/// Attribute keys that give a filesection its identity. Every opening tag
/// must carry at least one of them.
pub const IDENTITY_ATTRIBUTES: [&str; 2] = ["name", "vendor"];

/// One entry of the scan result, in document order. Plain-text runs and
/// completed filesections alternate exactly as they appear in the input.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum Entry {
	/// A run of text outside any filesection.
	Text(String),
	/// A completed filesection.
	Filesection(Filesection),
}

impl Entry {
	/// The plain-text content, if this entry is a text run.
	pub fn as_text(&self) -> Option<&str> {
		match self {
			Self::Text(text) => Some(text),
			Self::Filesection(_) => None,
		}
	}

	/// The filesection, if this entry is one.
	pub fn as_filesection(&self) -> Option<&Filesection> {
		match self {
			Self::Text(_) => None,
			Self::Filesection(section) => Some(section),
		}
	}
}

/// A delimited region extracted from the input: the attribute mapping of
/// its opening tag plus the raw body text collected between the opening
/// and the matching closing tag.
///
/// Nested sections are not reduced to structured entries; a nested
/// opening/closing tag pair stays verbatim inside the outer body.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct Filesection {
	/// The attributes of the opening tag. Guaranteed to contain `name` or
	/// `vendor`.
	pub attributes: Attributes,
	/// The raw body text between the opening and closing tag.
	pub body: String,
}

impl Filesection {
	/// The `name` attribute, when present.
	pub fn name(&self) -> Option<&str> {
		self.attributes.get("name").map(String::as_str)
	}

	/// The `vendor` attribute, when present.
	pub fn vendor(&self) -> Option<&str> {
		self.attributes.get("vendor").map(String::as_str)
	}
}

/// The attribute mapping of a filesection opening tag. Attribute names
/// are unique per section; values may be empty.
#[derive(Clone, Debug, Default, Deref, DerefMut, Deserialize, Eq, PartialEq, Serialize)]
pub struct Attributes(
	#[deref]
	#[deref_mut]
	BTreeMap<String, String>,
);

impl Attributes {
	/// Whether the mapping contains one of the reserved identity keys.
	pub fn has_identity(&self) -> bool {
		IDENTITY_ATTRIBUTES.iter().any(|key| self.contains_key(*key))
	}
}

impl FromIterator<(String, String)> for Attributes {
	fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
		Self(iter.into_iter().collect())
	}
}
