//! `filesection_core` is the scanner for filesection documents: ordinary
//! text files carrying logically separate sub-documents as delimited
//! `[filesection name=...]...[/filesection]` blocks. The scanner walks the
//! input once, character by character, and returns the ordered sequence of
//! plain-text runs and completed filesections.
//!
//! ## Processing model
//!
//! ```text
//! Input text
//!   → Scanner (single-pass state machine over a forward-only cursor)
//!   → Result sequence (Entry::Text | Entry::Filesection, document order)
//! ```
//!
//! Opening tags carry attributes (quoted or unquoted `name=value` pairs)
//! and must identify the section with a `name` or `vendor` attribute. An
//! optional comment token restricts recognition to tags sitting directly
//! behind a line-comment marker, so sections can ride inside source code
//! without disturbing the host language.
//!
//! Every malformed-input condition is fatal: the scan aborts at the point
//! of detection with a [`FilesectionError`] carrying the offending
//! character and line. There is no error recovery and no partial result.
//!
//! ## Quick start
//!
//! ```rust
//! use filesection_core::ScanConfig;
//! use filesection_core::scan;
//!
//! let input = "intro\n[filesection name=demo]\nbody\n[/filesection]\n";
//! let entries = scan(input, &ScanConfig::default()).unwrap();
//!
//! assert_eq!(entries.len(), 3);
//! assert_eq!(entries[1].as_filesection().and_then(|s| s.name()), Some("demo"));
//! ```

pub use config::*;
pub use error::*;
pub use scanner::*;
pub use section::*;

pub mod config;
pub(crate) mod cursor;
mod error;
mod scanner;
pub mod section;

#[cfg(test)]
mod __fixtures;
