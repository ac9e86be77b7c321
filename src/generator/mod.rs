//! Boundary to whatever supplies the text of new thoughts.
//!
//! The canvas never trusts a generator: every answer goes through
//! [`resolve_tree`] or [`resolve_children`], which fall back to the
//! [`OfflineGenerator`] on failure or on an empty answer.

mod offline;

use std::future::Future;
use std::pin::Pin;

use log::warn;

use crate::components::mind_map::TopicTree;
use crate::error::MindMapError;

pub use offline::{OfflineGenerator, starter_topic};

/// Future returned by a [`TopicGenerator`]; local because it may hold browser handles.
pub type GeneratorFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, MindMapError>> + 'a>>;

/// Produces topic trees and child thoughts.
pub trait TopicGenerator {
	/// Builds a whole tree for a new root topic.
	fn generate_tree<'a>(&'a self, topic: &'a str) -> GeneratorFuture<'a, TopicTree>;

	/// Produces fresh children for `text`. `context` lists its ancestors, root first.
	fn expand_node<'a>(
		&'a self,
		text: &'a str,
		context: &'a str,
	) -> GeneratorFuture<'a, Vec<TopicTree>>;
}

/// Asks `generator` for a tree, substituting the offline tree if it fails.
pub async fn resolve_tree(generator: &dyn TopicGenerator, topic: &str) -> TopicTree {
	match generator.generate_tree(topic).await {
		Ok(mut tree) if !tree.children.is_empty() => {
			if tree.text.trim().is_empty() {
				tree.text = topic.to_string();
			}
			tree
		}
		Ok(_) => {
			warn!("Generator returned an empty tree for {topic:?}, using offline tree");
			OfflineGenerator.tree_for(topic)
		}
		Err(err) => {
			warn!("Generator failed for {topic:?} ({err}), using offline tree");
			OfflineGenerator.tree_for(topic)
		}
	}
}

/// Asks `generator` for children, substituting offline children if it fails.
pub async fn resolve_children(
	generator: &dyn TopicGenerator,
	text: &str,
	context: &str,
) -> Vec<TopicTree> {
	match generator.expand_node(text, context).await {
		Ok(children) if !children.is_empty() => children,
		Ok(_) => {
			warn!("Generator returned no children for {text:?}, using offline expansion");
			OfflineGenerator.children_for(text)
		}
		Err(err) => {
			warn!("Expansion failed for {text:?} ({err}), using offline expansion");
			OfflineGenerator.children_for(text)
		}
	}
}

#[cfg(test)]
pub(crate) mod tests {
	use std::future::ready;
	use std::task::{Context, Poll, Waker};

	use super::*;

	/// Polls a future that never suspends.
	pub(crate) fn block_on<F: Future>(future: F) -> F::Output {
		let mut future = Box::pin(future);
		let mut cx = Context::from_waker(Waker::noop());
		match future.as_mut().poll(&mut cx) {
			Poll::Ready(value) => value,
			Poll::Pending => panic!("future suspended"),
		}
	}

	struct Broken;

	impl TopicGenerator for Broken {
		fn generate_tree<'a>(&'a self, _topic: &'a str) -> GeneratorFuture<'a, TopicTree> {
			Box::pin(ready(Err(MindMapError::Generator("offline".into()))))
		}

		fn expand_node<'a>(
			&'a self,
			_text: &'a str,
			_context: &'a str,
		) -> GeneratorFuture<'a, Vec<TopicTree>> {
			Box::pin(ready(Err(MindMapError::Generator("timeout".into()))))
		}
	}

	struct Hollow;

	impl TopicGenerator for Hollow {
		fn generate_tree<'a>(&'a self, _topic: &'a str) -> GeneratorFuture<'a, TopicTree> {
			Box::pin(ready(Ok(TopicTree::leaf(""))))
		}

		fn expand_node<'a>(
			&'a self,
			_text: &'a str,
			_context: &'a str,
		) -> GeneratorFuture<'a, Vec<TopicTree>> {
			Box::pin(ready(Ok(Vec::new())))
		}
	}

	struct Named;

	impl TopicGenerator for Named {
		fn generate_tree<'a>(&'a self, _topic: &'a str) -> GeneratorFuture<'a, TopicTree> {
			Box::pin(ready(Ok(TopicTree::new(" ", vec![TopicTree::leaf("x")]))))
		}

		fn expand_node<'a>(
			&'a self,
			_text: &'a str,
			_context: &'a str,
		) -> GeneratorFuture<'a, Vec<TopicTree>> {
			Box::pin(ready(Ok(vec![TopicTree::leaf("y")])))
		}
	}

	#[test]
	fn failures_fall_back_to_offline_answers() {
		for generator in [&Broken as &dyn TopicGenerator, &Hollow] {
			let tree = block_on(resolve_tree(generator, "远程办公是未来趋势还是效率陷阱？"));
			assert_eq!(tree.text, "远程办公是未来趋势还是效率陷阱？");
			assert!(!tree.children.is_empty());

			let children = block_on(resolve_children(generator, "some node", "root"));
			assert!(!children.is_empty());
		}
	}

	#[test]
	fn good_answers_pass_through() {
		let tree = block_on(resolve_tree(&Named, "topic"));
		assert_eq!(tree, TopicTree::new("topic", vec![TopicTree::leaf("x")]));
		assert_eq!(
			block_on(resolve_children(&Named, "a", "b")),
			vec![TopicTree::leaf("y")]
		);
	}
}
