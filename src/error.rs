//! Crate-wide error type.

use thiserror::Error;

/// Errors raised while loading trees, talking to a generator or touching the DOM.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MindMapError {
	/// The input could not be parsed as JSON at all.
	#[error("Invalid JSON: {0}")]
	InvalidJson(String),

	/// The tree root was not a JSON object.
	#[error("Tree root must be an object")]
	NotAnObject,

	/// The tree root has no usable `text` field.
	#[error("Tree is missing the text field")]
	MissingText,

	/// A generator answered with no children.
	#[error("Expansion produced no children")]
	EmptyExpansion,

	/// The topic generator failed.
	#[error("Generator failed: {0}")]
	Generator(String),

	/// A browser API was unavailable or refused the call.
	#[error("DOM error: {0}")]
	Dom(String),
}

impl From<serde_json::Error> for MindMapError {
	fn from(err: serde_json::Error) -> Self {
		Self::InvalidJson(err.to_string())
	}
}
