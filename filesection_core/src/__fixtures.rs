use crate::section::Attributes;
use crate::section::Entry;
use crate::section::Filesection;

pub fn text_entry(text: &str) -> Entry {
	Entry::Text(text.to_string())
}

pub fn filesection_entry(pairs: &[(&str, &str)], body: &str) -> Entry {
	Entry::Filesection(Filesection {
		attributes: attributes(pairs),
		body: body.to_string(),
	})
}

pub fn attributes(pairs: &[(&str, &str)]) -> Attributes {
	pairs
		.iter()
		.map(|(name, value)| ((*name).to_string(), (*value).to_string()))
		.collect()
}

/// Reference document: three identically named sections separated by
/// prose.
pub fn multi_section_document() -> String {
	concat!(
		"foo\n\nbar\n\n",
		"[filesection name=foo]\nbody\nof\nfs\n[/filesection]",
		"\n\nbaz\n\nquux\n\n",
		"[filesection name=foo]\nbody\nof\nfs2\n[/filesection]",
		"\n\nqqq\n\n",
		"[filesection name=foo]\nbody\nof\nfs3\n[/filesection]",
		"\n",
	)
	.to_string()
}
