use std::f64::consts::TAU;

use kurbo::Point;

use super::config::MindMapConfig;
use super::label::hit_half_extents;
use super::layout::{Anchor, layout_children};
use super::types::{NodeId, TopicTree};

/// Small deterministic generator for decorative variety.
#[derive(Clone, Debug)]
pub struct Jitter(u64);

impl Jitter {
	pub fn new(seed: u64) -> Self {
		Self(seed ^ 0x9e37_79b9_7f4a_7c15)
	}

	/// Uniform value in `[0, 1)`.
	pub fn next_f64(&mut self) -> f64 {
		self.0 = self
			.0
			.wrapping_mul(6_364_136_223_846_793_005)
			.wrapping_add(1_442_695_040_888_963_407);
		(self.0 >> 11) as f64 / (1u64 << 53) as f64
	}

	pub fn range(&mut self, (low, high): (f64, f64)) -> f64 {
		low + (high - low) * self.next_f64()
	}
}

/// A materialized, positioned topic.
#[derive(Clone, Debug)]
pub struct MindNode {
	pub text: String,
	pub position: Point,
	pub target: Point,
	/// Only used to tell whether the node has finished materializing.
	pub radius: f64,
	pub target_radius: f64,
	pub depth: usize,
	pub opacity: f64,
	pub expanded: bool,
	pub branch_direction: f64,
	pub parent: Option<NodeId>,
	/// Descriptors for this node's children, replaced wholesale on every expansion.
	pub pending: Vec<TopicTree>,
	/// Materialized children from the latest expansion.
	pub children: Vec<NodeId>,
	/// Cleared when a re-expansion of an ancestor discards this node.
	pub attached: bool,
}

impl MindNode {
	pub fn is_settled(&self) -> bool {
		(self.target_radius - self.radius).abs() < 0.01
	}
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ParticleTone {
	Light,
	Dim,
}

/// A dot flowing along the connector between a parent and one of its children.
#[derive(Clone, Debug)]
pub struct Particle {
	pub from: NodeId,
	pub to: NodeId,
	pub progress: f64,
	pub speed: f64,
	pub size: f64,
	pub wobble: f64,
	pub tone: ParticleTone,
}

/// Arena of nodes plus the connector particles between them.
///
/// Nodes are never removed individually. Re-expanding a node detaches its
/// previous children, which stay in the arena as dead entries.
#[derive(Clone, Debug)]
pub struct Scene {
	nodes: Vec<MindNode>,
	particles: Vec<Particle>,
	jitter: Jitter,
	config: MindMapConfig,
}

impl Scene {
	pub fn new(config: MindMapConfig, seed: u64) -> Self {
		Self {
			nodes: Vec::new(),
			particles: Vec::new(),
			jitter: Jitter::new(seed),
			config,
		}
	}

	/// Drops everything and places a fresh, invisible root at the world origin.
	pub fn reset(&mut self, root: TopicTree) -> NodeId {
		self.nodes.clear();
		self.particles.clear();
		self.nodes.push(MindNode {
			text: root.text,
			position: Point::ORIGIN,
			target: Point::ORIGIN,
			radius: 0.0,
			target_radius: self.config.settled_radius,
			depth: 0,
			opacity: 0.0,
			expanded: false,
			branch_direction: 0.0,
			parent: None,
			pending: root.children,
			children: Vec::new(),
			attached: true,
		});
		NodeId(0)
	}

	pub fn root(&self) -> Option<NodeId> {
		(!self.nodes.is_empty()).then_some(NodeId(0))
	}

	pub fn node(&self, id: NodeId) -> Option<&MindNode> {
		self.nodes.get(id.0)
	}

	pub fn is_attached(&self, id: NodeId) -> bool {
		self.node(id).is_some_and(|node| node.attached)
	}

	/// Attached nodes in insertion order.
	pub fn nodes(&self) -> impl DoubleEndedIterator<Item = (NodeId, &MindNode)> {
		self.nodes
			.iter()
			.enumerate()
			.filter(|(_, node)| node.attached)
			.map(|(index, node)| (NodeId(index), node))
	}

	pub fn node_count(&self) -> usize {
		self.nodes().count()
	}

	pub fn particles(&self) -> &[Particle] {
		&self.particles
	}

	/// Materializes `children` under `id` and returns the new node ids.
	///
	/// A node that is already expanded is only regenerated when `force` is set;
	/// its previous children and their particles are discarded, never merged.
	/// An empty descriptor list leaves the node untouched.
	pub fn expand(&mut self, id: NodeId, children: Vec<TopicTree>, force: bool) -> Vec<NodeId> {
		let Some(node) = self.nodes.get(id.0) else {
			return Vec::new();
		};
		if !node.attached || (node.expanded && !force) || children.is_empty() {
			return Vec::new();
		}

		let anchor = Anchor {
			position: node.target,
			depth: node.depth,
			branch_direction: node.branch_direction,
		};
		let (spawn_at, depth) = (node.position, node.depth + 1);
		let previous = node.children.clone();
		for child in previous {
			self.detach(child);
		}
		let nodes = &self.nodes;
		self.particles
			.retain(|p| nodes[p.from.0].attached && nodes[p.to.0].attached);

		let placements = layout_children(&anchor, &children, &self.config);
		let mut created = Vec::with_capacity(placements.len());
		for (descriptor, placement) in children.iter().zip(placements) {
			let child = NodeId(self.nodes.len());
			self.nodes.push(MindNode {
				text: descriptor.text.clone(),
				position: spawn_at,
				target: placement.position,
				radius: 0.0,
				target_radius: self.config.settled_radius,
				depth,
				opacity: 0.0,
				expanded: false,
				branch_direction: placement.angle,
				parent: Some(id),
				pending: descriptor.children.clone(),
				children: Vec::new(),
				attached: true,
			});
			self.spawn_particles(id, child);
			created.push(child);
		}

		let node = &mut self.nodes[id.0];
		node.pending = children;
		node.children = created.clone();
		node.expanded = true;
		created
	}

	fn detach(&mut self, id: NodeId) {
		let mut stack = vec![id];
		while let Some(current) = stack.pop() {
			if let Some(node) = self.nodes.get_mut(current.0) {
				node.attached = false;
				stack.extend(node.children.iter().copied());
			}
		}
	}

	fn spawn_particles(&mut self, from: NodeId, to: NodeId) {
		for _ in 0..self.config.particles_per_edge {
			let particle = Particle {
				from,
				to,
				progress: self.jitter.next_f64(),
				speed: self.jitter.range(self.config.particle_speed),
				size: self.jitter.range(self.config.particle_size),
				wobble: self.jitter.next_f64() * TAU,
				tone: if self.jitter.next_f64() > 0.5 {
					ParticleTone::Light
				} else {
					ParticleTone::Dim
				},
			};
			self.particles.push(particle);
		}
	}

	/// Eases every node toward its target and fades it in.
	pub fn advance_nodes(&mut self) {
		let (easing, step) = (self.config.node_easing, self.config.opacity_step);
		for node in self.nodes.iter_mut().filter(|node| node.attached) {
			node.position += (node.target - node.position) * easing;
			node.radius += (node.target_radius - node.radius) * easing;
			if node.opacity < 1.0 {
				node.opacity = (node.opacity + step).min(1.0);
			}
		}
	}

	/// Moves particles along their connectors, wrapping back to the start.
	pub fn advance_particles(&mut self) {
		let wobble = self.config.particle_wobble_step;
		for particle in &mut self.particles {
			particle.progress += particle.speed;
			particle.wobble += wobble;
			if particle.progress > 1.0 {
				particle.progress = 0.0;
			}
		}
	}

	/// Topmost visible node whose label box contains `world`, newest first.
	pub fn node_at(&self, world: Point, zoom: f64) -> Option<NodeId> {
		self.nodes()
			.rev()
			.filter(|(_, node)| node.opacity >= self.config.visible_opacity)
			.find(|(_, node)| {
				let (half_w, half_h) =
					hit_half_extents(&node.text, node.depth, zoom, self.config.hit_glyph_width);
				(world.x - node.position.x).abs() < half_w
					&& (world.y - node.position.y).abs() < half_h
			})
			.map(|(id, _)| id)
	}

	/// Texts from the root down to `id`, inclusive.
	pub fn lineage(&self, id: NodeId) -> Vec<&str> {
		let mut chain = Vec::new();
		let mut current = self.node(id);
		while let Some(node) = current {
			chain.push(node.text.as_str());
			current = node.parent.and_then(|parent| self.node(parent));
		}
		chain.reverse();
		chain
	}

	/// Rebuilds the `{text, children}` tree the scene currently represents.
	pub fn export(&self) -> Option<TopicTree> {
		self.root().map(|root| self.export_node(root))
	}

	fn export_node(&self, id: NodeId) -> TopicTree {
		let node = &self.nodes[id.0];
		let children = if node.expanded {
			node.children
				.iter()
				.map(|child| self.export_node(*child))
				.collect()
		} else {
			node.pending.clone()
		};
		TopicTree::new(node.text.clone(), children)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn sample() -> TopicTree {
		TopicTree::new(
			"为什么人们会拖延？",
			vec![
				TopicTree::new("a", vec![TopicTree::leaf("a1"), TopicTree::leaf("a2")]),
				TopicTree::leaf("b"),
				TopicTree::leaf("c"),
				TopicTree::leaf("d"),
				TopicTree::leaf("e"),
			],
		)
	}

	fn scene() -> Scene {
		Scene::new(MindMapConfig::default(), 7)
	}

	fn settle(scene: &mut Scene) {
		for _ in 0..400 {
			scene.advance_nodes();
		}
	}

	fn expand_pending(scene: &mut Scene, id: NodeId) -> Vec<NodeId> {
		let pending = scene.node(id).unwrap().pending.clone();
		scene.expand(id, pending, false)
	}

	#[test]
	fn jitter_is_deterministic_and_bounded() {
		let (mut a, mut b) = (Jitter::new(1), Jitter::new(1));
		for _ in 0..1000 {
			let value = a.next_f64();
			assert_eq!(value, b.next_f64());
			assert!((0.0..1.0).contains(&value));
		}
	}

	#[test]
	fn reset_creates_invisible_root() {
		let mut scene = scene();
		let root = scene.reset(sample());
		let node = scene.node(root).unwrap();
		assert_eq!(node.depth, 0);
		assert_eq!(node.opacity, 0.0);
		assert_eq!(node.position, Point::ORIGIN);
		assert!(!node.expanded);
		assert_eq!(node.pending.len(), 5);
		assert_eq!(scene.node_count(), 1);
	}

	#[test]
	fn expansion_places_children_and_particles() {
		let mut scene = scene();
		let root = scene.reset(sample());
		let children = expand_pending(&mut scene, root);

		assert_eq!(children.len(), 5);
		assert_eq!(scene.particles().len(), 5 * 6);
		for child in &children {
			let node = scene.node(*child).unwrap();
			assert_eq!(node.depth, 1);
			assert_eq!(node.parent, Some(root));
			assert_eq!(node.position, Point::ORIGIN);
			assert!((node.target.distance(Point::ORIGIN) - 220.0).abs() < 1e-9);
		}
		assert!(scene.node(root).unwrap().expanded);
		assert!(expand_pending(&mut scene, root).is_empty());
	}

	#[test]
	fn grandchildren_branch_from_their_parent_direction() {
		let mut scene = scene();
		let root = scene.reset(sample());
		let first = expand_pending(&mut scene, root)[0];
		let grandchildren = expand_pending(&mut scene, first);
		assert_eq!(grandchildren.len(), 2);

		let parent = scene.node(first).unwrap();
		let half = MindMapConfig::default().sector_width / 2.0;
		for id in grandchildren {
			let node = scene.node(id).unwrap();
			assert_eq!(node.depth, 2);
			let angle = (node.target - parent.target).atan2();
			assert!((angle - parent.branch_direction).abs() <= half + 1e-9);
		}
	}

	#[test]
	fn re_expansion_replaces_children() {
		let mut scene = scene();
		let root = scene.reset(sample());
		let first = expand_pending(&mut scene, root);
		expand_pending(&mut scene, first[0]);
		assert_eq!(scene.node_count(), 8);

		let fresh = vec![TopicTree::leaf("x"), TopicTree::leaf("y")];
		let second = scene.expand(root, fresh.clone(), true);
		assert_eq!(second.len(), 2);
		assert_eq!(scene.node(root).unwrap().children, second);
		assert_eq!(scene.node(root).unwrap().pending, fresh);
		assert_eq!(scene.node_count(), 3);
		for old in first {
			assert!(!scene.is_attached(old));
		}
		assert!(
			scene
				.particles()
				.iter()
				.all(|p| scene.is_attached(p.from) && scene.is_attached(p.to))
		);
		assert_eq!(scene.particles().len(), 2 * 6);
	}

	#[test]
	fn empty_expansion_is_a_no_op() {
		let mut scene = scene();
		let root = scene.reset(sample());
		assert!(scene.expand(root, Vec::new(), true).is_empty());
		assert!(!scene.node(root).unwrap().expanded);
		assert!(scene.expand(NodeId(99), vec![TopicTree::leaf("x")], true).is_empty());
	}

	#[test]
	fn nodes_fade_in_and_settle() {
		let mut scene = scene();
		let root = scene.reset(sample());
		let child = expand_pending(&mut scene, root)[0];
		settle(&mut scene);
		let node = scene.node(child).unwrap();
		assert_eq!(node.opacity, 1.0);
		assert!(node.is_settled());
		assert!(node.position.distance(node.target) < 1e-6);
	}

	#[test]
	fn particles_wrap_around() {
		let mut scene = scene();
		let root = scene.reset(sample());
		expand_pending(&mut scene, root);
		for _ in 0..1000 {
			scene.advance_particles();
			assert!(
				scene
					.particles()
					.iter()
					.all(|p| (0.0..=1.0).contains(&p.progress))
			);
		}
	}

	#[test]
	fn hit_test_prefers_newest_and_skips_invisible() {
		let mut scene = scene();
		let root = scene.reset(TopicTree::new("root", vec![TopicTree::leaf("only")]));
		assert_eq!(scene.node_at(Point::ORIGIN, 1.0), None);

		scene.advance_nodes();
		assert_eq!(scene.node_at(Point::ORIGIN, 1.0), Some(root));
		assert_eq!(scene.node_at(Point::new(500.0, 0.0), 1.0), None);

		// The child spawns on top of the root; once visible it wins.
		let child = expand_pending(&mut scene, root)[0];
		assert_eq!(scene.node_at(Point::ORIGIN, 1.0), Some(root));
		scene.advance_nodes();
		assert_eq!(scene.node_at(scene.node(child).unwrap().position, 1.0), Some(child));
	}

	#[test]
	fn hit_box_shrinks_when_zoomed_in() {
		let mut scene = scene();
		let root = scene.reset(TopicTree::leaf("abcdefghij"));
		scene.advance_nodes();
		// Half width at zoom 1: 10 * 16 * 0.6 / 2 = 48.
		assert_eq!(scene.node_at(Point::new(40.0, 0.0), 1.0), Some(root));
		assert_eq!(scene.node_at(Point::new(40.0, 0.0), 2.0), None);
		assert_eq!(scene.node_at(Point::new(0.0, 15.0), 1.0), Some(root));
		assert_eq!(scene.node_at(Point::new(0.0, 17.0), 1.0), None);
	}

	#[test]
	fn export_round_trips_through_expansions() {
		let tree = sample();
		let mut scene = scene();
		let root = scene.reset(tree.clone());
		assert_eq!(scene.export(), Some(tree.clone()));

		let first = expand_pending(&mut scene, root)[0];
		expand_pending(&mut scene, first);
		assert_eq!(scene.export(), Some(tree));
	}

	#[test]
	fn lineage_walks_to_the_root() {
		let mut scene = scene();
		let root = scene.reset(sample());
		let first = expand_pending(&mut scene, root)[0];
		let leaf = expand_pending(&mut scene, first)[1];
		assert_eq!(scene.lineage(leaf), vec!["为什么人们会拖延？", "a", "a2"]);
	}
}
