use std::collections::hash_map::DefaultHasher;
use std::future::ready;
use std::hash::{Hash, Hasher};
use std::sync::LazyLock;

use log::error;
use serde::Deserialize;

use super::{GeneratorFuture, TopicGenerator};
use crate::components::mind_map::TopicTree;

#[derive(Debug, Default, Deserialize)]
struct Presets {
	#[serde(default)]
	presets: Vec<TopicTree>,
	#[serde(default)]
	keywords: Vec<KeywordTree>,
	#[serde(default)]
	fallback: Vec<TopicTree>,
	#[serde(default)]
	expansions: Vec<Vec<TopicTree>>,
	#[serde(default)]
	starters: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct KeywordTree {
	keywords: Vec<String>,
	children: Vec<TopicTree>,
}

static PRESETS: LazyLock<Presets> = LazyLock::new(|| {
	serde_json::from_str(include_str!("presets.json")).unwrap_or_else(|err| {
		error!("Bundled presets are unreadable: {err}");
		Presets::default()
	})
});

const LAST_RESORT: [&str; 4] = ["原因与机制", "证据与数据", "案例与现象", "影响与结果"];
const LAST_RESORT_TOPIC: &str = "技术进步是否让人更幸福？";

fn stable_index(text: &str, len: usize) -> usize {
	let mut hasher = DefaultHasher::new();
	text.hash(&mut hasher);
	(hasher.finish() % len.max(1) as u64) as usize
}

fn last_resort() -> Vec<TopicTree> {
	LAST_RESORT.iter().map(|text| TopicTree::leaf(*text)).collect()
}

/// Deterministic generator backed by bundled trees. Never fails, never empty.
#[derive(Clone, Copy, Debug, Default)]
pub struct OfflineGenerator;

impl OfflineGenerator {
	/// Exact preset first, then keyword match, then the generic tree.
	pub fn tree_for(&self, topic: &str) -> TopicTree {
		let presets = &*PRESETS;
		if let Some(tree) = presets.presets.iter().find(|tree| tree.text == topic) {
			return tree.clone();
		}
		let children = presets
			.keywords
			.iter()
			.find(|entry| entry.keywords.iter().any(|word| topic.contains(word.as_str())))
			.map(|entry| entry.children.clone())
			.filter(|children| !children.is_empty())
			.or_else(|| Some(presets.fallback.clone()).filter(|c| !c.is_empty()))
			.unwrap_or_else(last_resort);
		TopicTree::new(topic, children)
	}

	/// One of the bundled expansion templates, picked by a hash of the text.
	pub fn children_for(&self, text: &str) -> Vec<TopicTree> {
		let templates = &PRESETS.expansions;
		templates
			.get(stable_index(text, templates.len()))
			.filter(|children| !children.is_empty())
			.cloned()
			.unwrap_or_else(last_resort)
	}
}

impl TopicGenerator for OfflineGenerator {
	fn generate_tree<'a>(&'a self, topic: &'a str) -> GeneratorFuture<'a, TopicTree> {
		Box::pin(ready(Ok(self.tree_for(topic))))
	}

	fn expand_node<'a>(
		&'a self,
		text: &'a str,
		_context: &'a str,
	) -> GeneratorFuture<'a, Vec<TopicTree>> {
		Box::pin(ready(Ok(self.children_for(text))))
	}
}

/// A starter question to open the map with.
pub fn starter_topic(seed: u64) -> &'static str {
	let starters = &PRESETS.starters;
	if starters.is_empty() {
		return LAST_RESORT_TOPIC;
	}
	starters[(seed % starters.len() as u64) as usize].as_str()
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn bundled_presets_parse() {
		let presets: Presets = serde_json::from_str(include_str!("presets.json")).unwrap();
		assert_eq!(presets.presets.len(), 3);
		assert_eq!(presets.keywords.len(), 3);
		assert_eq!(presets.expansions.len(), 5);
		assert!(presets.starters.len() > 30);
		assert!(!presets.fallback.is_empty());
	}

	#[test]
	fn exact_preset_wins() {
		let tree = OfflineGenerator.tree_for("为什么人们会拖延？");
		assert_eq!(tree.children.len(), 5);
		assert_eq!(tree.children[0].text, "大脑优先即时奖励而非长期利益");
		assert_eq!(tree.children[0].children.len(), 3);
	}

	#[test]
	fn keyword_and_generic_trees_keep_the_topic() {
		let topic = "年轻人躺平是理性选择还是逃避现实？";
		let tree = OfflineGenerator.tree_for(topic);
		assert_eq!(tree.text, topic);
		assert_eq!(tree.children[0].text, "是对过度竞争的理性反抗");

		let tree = OfflineGenerator.tree_for("anything else");
		assert_eq!(tree.text, "anything else");
		assert_eq!(tree.children.len(), 4);
	}

	#[test]
	fn expansions_are_stable_and_non_empty() {
		let first = OfflineGenerator.children_for("意志力是有限资源");
		assert_eq!(first, OfflineGenerator.children_for("意志力是有限资源"));
		assert_eq!(first.len(), 4);
	}

	#[test]
	fn starters_cycle() {
		let count = PRESETS.starters.len() as u64;
		assert_eq!(starter_topic(0), starter_topic(count));
		assert!(!starter_topic(17).is_empty());
	}
}
