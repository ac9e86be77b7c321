use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::MindMapError;

/// A raw `{text, children}` descriptor, not yet placed on the canvas.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopicTree {
	pub text: String,
	#[serde(default)]
	pub children: Vec<TopicTree>,
}

impl TopicTree {
	pub fn new(text: impl Into<String>, children: Vec<TopicTree>) -> Self {
		Self {
			text: text.into(),
			children,
		}
	}

	pub fn leaf(text: impl Into<String>) -> Self {
		Self::new(text, Vec::new())
	}

	/// Parses an imported snapshot. The root must carry a non-empty `text`.
	///
	/// Maps can be expanded without bound, so the parser's nesting limit is
	/// lifted; an exported map of any depth reads back in.
	pub fn from_json(raw: &str) -> Result<Self, MindMapError> {
		let mut deserializer = serde_json::Deserializer::from_str(raw);
		deserializer.disable_recursion_limit();
		let value = Value::deserialize(&mut deserializer)?;
		deserializer.end()?;
		Self::from_value(&value)
	}

	/// Builds a tree from loosely shaped JSON.
	///
	/// Missing, `null` or non-array `children` are read as empty, and child
	/// entries without a string `text` are dropped rather than failing the
	/// whole tree.
	pub fn from_value(value: &Value) -> Result<Self, MindMapError> {
		let object = value.as_object().ok_or(MindMapError::NotAnObject)?;
		match object.get("text").and_then(Value::as_str) {
			Some(text) if !text.trim().is_empty() => Ok(Self {
				text: text.to_string(),
				children: Self::list_from_value(object.get("children")),
			}),
			_ => Err(MindMapError::MissingText),
		}
	}

	/// Reads a child list the way a generator answer is read: anything malformed is skipped.
	pub fn list_from_value(value: Option<&Value>) -> Vec<TopicTree> {
		value
			.and_then(Value::as_array)
			.map(|entries| entries.iter().filter_map(Self::child_from_value).collect())
			.unwrap_or_default()
	}

	/// Below the root any string is a valid label, the empty one included.
	fn child_from_value(value: &Value) -> Option<Self> {
		let object = value.as_object()?;
		let text = object.get("text")?.as_str()?;
		Some(Self {
			text: text.to_string(),
			children: Self::list_from_value(object.get("children")),
		})
	}

	pub fn to_json(&self) -> Result<String, MindMapError> {
		Ok(serde_json::to_string_pretty(self)?)
	}

	/// Number of descriptors in the tree, root included.
	pub fn node_count(&self) -> usize {
		1 + self.children.iter().map(TopicTree::node_count).sum::<usize>()
	}
}

/// Stable index of a node inside the scene arena.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
	pub fn index(self) -> usize {
		self.0
	}
}

/// Payload handed to the click callback.
#[derive(Clone, Debug, PartialEq)]
pub struct NodeClick {
	pub id: NodeId,
	pub text: String,
	pub depth: usize,
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn missing_children_reads_as_empty() {
		let tree = TopicTree::from_json(r#"{"text": "root"}"#).unwrap();
		assert_eq!(tree, TopicTree::leaf("root"));

		let tree = TopicTree::from_json(r#"{"text": "root", "children": null}"#).unwrap();
		assert!(tree.children.is_empty());
	}

	#[test]
	fn root_without_text_is_rejected() {
		assert_eq!(
			TopicTree::from_json(r#"{"children": []}"#),
			Err(MindMapError::MissingText)
		);
		assert_eq!(
			TopicTree::from_json(r#"{"text": "  "}"#),
			Err(MindMapError::MissingText)
		);
		assert_eq!(TopicTree::from_json("[1, 2]"), Err(MindMapError::NotAnObject));
		assert!(matches!(
			TopicTree::from_json("{not json"),
			Err(MindMapError::InvalidJson(_))
		));
	}

	#[test]
	fn malformed_children_are_skipped() {
		let tree = TopicTree::from_json(
			r#"{"text": "r", "children": [{"text": "a"}, 7, {"children": []}, {"text": "b", "children": "x"}]}"#,
		)
		.unwrap();
		assert_eq!(
			tree.children,
			vec![TopicTree::leaf("a"), TopicTree::leaf("b")]
		);
	}

	#[test]
	fn export_keeps_the_same_shape() {
		let raw = r#"{"text":"为什么人们会拖延？","children":[{"text":"a","children":[{"text":"a1","children":[]}]},{"text":"b","children":[]}]}"#;
		let tree = TopicTree::from_json(raw).unwrap();
		let exported = tree.to_json().unwrap();
		assert_eq!(TopicTree::from_json(&exported).unwrap(), tree);
		assert_eq!(tree.node_count(), 4);
	}

	#[test]
	fn empty_labels_below_the_root_survive_a_round_trip() {
		let tree = TopicTree::new(
			"root",
			vec![
				TopicTree::new("", vec![TopicTree::leaf("under empty")]),
				TopicTree::leaf("b"),
			],
		);
		let exported = tree.to_json().unwrap();
		assert_eq!(TopicTree::from_json(&exported).unwrap(), tree);
	}

	#[test]
	fn deep_maps_read_back_in() {
		let mut tree = TopicTree::leaf("bottom");
		for depth in (0..96).rev() {
			tree = TopicTree::new(format!("level {depth}"), vec![tree]);
		}
		let exported = tree.to_json().unwrap();
		let imported = TopicTree::from_json(&exported).unwrap();
		assert_eq!(imported.node_count(), 97);
		assert_eq!(imported, tree);
	}
}
