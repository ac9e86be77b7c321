use kurbo::{Point, Size};
use log::{debug, info, warn};

use super::camera::Camera;
use super::config::MindMapConfig;
use super::input::{PointerKind, PointerTracker, Release, wheel_factor};
use super::scene::{Jitter, Scene};
use super::theme::Theme;
use super::types::{NodeClick, NodeId, TopicTree};
use crate::error::MindMapError;

/// Loop clock advance per second of frame time; about 0.006 per 60 Hz frame.
const CLOCK_RATE: f64 = 0.375;
const CONTEXT_SEPARATOR: &str = " > ";

/// A decorative background speck, kept in screen space.
#[derive(Clone, Debug)]
pub struct Star {
	pub position: Point,
	pub size: f64,
	pub speed: f64,
	pub alpha: f64,
}

/// Identifies which load of the map an expansion request belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ExpansionTicket {
	pub node: NodeId,
	epoch: u64,
}

/// Where the children for a click will come from.
#[derive(Clone, Debug, PartialEq)]
pub enum ExpansionSource {
	/// The node still carries descriptors from the loaded tree.
	Pending(Vec<TopicTree>),
	/// Ask the generator for fresh children.
	Generate { text: String, context: String },
}

#[derive(Clone, Debug, PartialEq)]
pub struct ExpansionPlan {
	pub ticket: ExpansionTicket,
	pub source: ExpansionSource,
}

/// Everything the canvas mutates, owned in one place.
///
/// Input handlers and the frame tick are the only writers, and both run on the
/// browser's single thread, so no locking is involved.
pub struct MindMapState {
	config: MindMapConfig,
	camera: Camera,
	scene: Scene,
	pointer: PointerTracker,
	stardust: Vec<Star>,
	/// Last usable surface size the stars are spread over.
	star_field: Size,
	jitter: Jitter,
	theme: Theme,
	size: Size,
	time: f64,
	epoch: u64,
}

impl MindMapState {
	pub fn new(config: MindMapConfig, size: Size, seed: u64) -> Self {
		let size = sanitize(size);
		let mut jitter = Jitter::new(seed.rotate_left(17));
		let stardust = (0..config.stardust_count)
			.map(|_| Star {
				position: scatter(&mut jitter, size),
				size: jitter.range((0.3, 1.5)),
				speed: jitter.range((0.05, 0.25)),
				alpha: jitter.range((0.05, 0.25)),
			})
			.collect();

		Self {
			camera: Camera::new(&config, size),
			scene: Scene::new(config.clone(), seed),
			pointer: PointerTracker::new(&config),
			config,
			stardust,
			star_field: size,
			jitter,
			theme: Theme::default(),
			size,
			time: 0.0,
			epoch: 0,
		}
	}

	pub fn camera(&self) -> &Camera {
		&self.camera
	}

	pub fn scene(&self) -> &Scene {
		&self.scene
	}

	pub fn config(&self) -> &MindMapConfig {
		&self.config
	}

	pub fn stardust(&self) -> &[Star] {
		&self.stardust
	}

	pub fn theme(&self) -> Theme {
		self.theme
	}

	pub fn size(&self) -> Size {
		self.size
	}

	pub fn time(&self) -> f64 {
		self.time
	}

	pub fn is_dragging(&self) -> bool {
		self.pointer.is_dragging()
	}

	/// Replaces the whole map with a new root. Earlier expansion requests become stale.
	pub fn load_topic(&mut self, tree: TopicTree) {
		info!(
			"Loading topic {:?} with {} children",
			tree.text,
			tree.children.len()
		);
		self.theme = Theme::for_topic(&tree.text);
		self.epoch += 1;
		self.camera.reset();
		let root = self.scene.reset(tree);
		self.camera.focus(root, Point::ORIGIN, 0);
	}

	/// Parses and loads a snapshot. On error the current map is left as it was.
	pub fn import_json(&mut self, raw: &str) -> Result<(), MindMapError> {
		let tree = TopicTree::from_json(raw)?;
		self.load_topic(tree);
		Ok(())
	}

	pub fn export_tree(&self) -> Option<TopicTree> {
		self.scene.export()
	}

	/// Adapts to a new surface size. World-space state is untouched.
	///
	/// Stars keep their spread across a collapse to zero size and are
	/// rescaled from the last usable size once the surface comes back.
	pub fn resize(&mut self, size: Size) {
		let size = sanitize(size);
		debug!("Resizing map to {}x{}", size.width, size.height);
		self.size = size;
		self.camera.resize(size);
		if is_degenerate(size) {
			return;
		}

		let old = self.star_field;
		for star in &mut self.stardust {
			star.position = if is_degenerate(old) {
				scatter(&mut self.jitter, size)
			} else {
				Point::new(
					star.position.x / old.width * size.width,
					star.position.y / old.height * size.height,
				)
			};
		}
		self.star_field = size;
	}

	/// Advances one frame. Easing is per call; `dt` only drives the clock.
	pub fn tick(&mut self, dt: f64) {
		self.camera.update(self.pointer.is_dragging());
		self.advance_stardust();
		self.scene.advance_particles();
		self.scene.advance_nodes();
		if dt.is_finite() && dt > 0.0 {
			self.time += dt * CLOCK_RATE;
		}
	}

	fn advance_stardust(&mut self) {
		let Size { width, height } = self.star_field;
		if is_degenerate(self.star_field) {
			return;
		}
		for star in &mut self.stardust {
			star.position.y += star.speed;
			if star.position.y > height {
				star.position = Point::new(self.jitter.next_f64() * width, 0.0);
			}
		}
	}

	/// `now` is a millisecond timestamp, used to discard mouse events replayed after a tap.
	pub fn pointer_down(&mut self, kind: PointerKind, screen: Point, now: f64) {
		self.pointer.press(kind, screen, now);
	}

	pub fn pointer_move(&mut self, screen: Point) {
		if let Some(delta) = self.pointer.drag(screen) {
			self.camera.pan(delta);
		}
	}

	/// Ends a gesture; a click on a visible node is reported back.
	pub fn pointer_up(&mut self, kind: PointerKind, screen: Point, now: f64) -> Option<NodeClick> {
		match self.pointer.release(kind, screen, now) {
			Release::Click(point) => self.click_at(point),
			Release::DragEnd | Release::Ignored => None,
		}
	}

	pub fn pointer_leave(&mut self) {
		self.pointer.leave();
	}

	pub fn wheel(&mut self, screen: Point, delta_y: f64) {
		if let Some(factor) = wheel_factor(delta_y, &self.config) {
			self.camera.zoom_at(screen, factor);
		}
	}

	/// Resolves a click in screen space to the topmost node under it.
	pub fn click_at(&self, screen: Point) -> Option<NodeClick> {
		let world = self.camera.screen_to_world(screen);
		let id = self.scene.node_at(world, self.camera.zoom)?;
		let node = self.scene.node(id)?;
		Some(NodeClick {
			id,
			text: node.text.clone(),
			depth: node.depth,
		})
	}

	/// Decides how a clicked node gets its children.
	///
	/// The first click on a node that still carries descriptors from the loaded
	/// tree uses them; every later click asks for fresh children.
	pub fn request_expansion(&self, id: NodeId) -> Option<ExpansionPlan> {
		let node = self.scene.node(id).filter(|node| node.attached)?;
		let ticket = ExpansionTicket {
			node: id,
			epoch: self.epoch,
		};
		let source = if !node.expanded && !node.pending.is_empty() {
			ExpansionSource::Pending(node.pending.clone())
		} else {
			ExpansionSource::Generate {
				text: node.text.clone(),
				context: self.ancestor_context(id),
			}
		};
		debug!("Expansion requested for node {} at depth {}", id.index(), node.depth);
		Some(ExpansionPlan { ticket, source })
	}

	/// Ancestor texts of `id`, root first, excluding the node itself.
	pub fn ancestor_context(&self, id: NodeId) -> String {
		let mut lineage = self.scene.lineage(id);
		lineage.pop();
		lineage.join(CONTEXT_SEPARATOR)
	}

	/// Applies a resolved expansion in one step.
	///
	/// Answers are applied in the order they resolve, so the last one wins.
	/// Answers for a previous topic, or for a node discarded by a later
	/// re-expansion of an ancestor, are dropped.
	pub fn apply_expansion(
		&mut self,
		ticket: ExpansionTicket,
		children: Vec<TopicTree>,
	) -> Result<Vec<NodeId>, MindMapError> {
		if ticket.epoch != self.epoch || !self.scene.is_attached(ticket.node) {
			warn!(
				"Dropping stale expansion for node {}",
				ticket.node.index()
			);
			return Ok(Vec::new());
		}
		if children.is_empty() {
			return Err(MindMapError::EmptyExpansion);
		}

		let created = self.scene.expand(ticket.node, children, true);
		if let Some(node) = self.scene.node(ticket.node) {
			self.camera.focus(ticket.node, node.target, node.depth);
		}
		Ok(created)
	}
}

fn is_degenerate(size: Size) -> bool {
	size.width <= 0.0 || size.height <= 0.0
}

fn scatter(jitter: &mut Jitter, size: Size) -> Point {
	Point::new(jitter.next_f64() * size.width, jitter.next_f64() * size.height)
}

fn sanitize(size: Size) -> Size {
	let clean = |v: f64| if v.is_finite() && v > 0.0 { v } else { 0.0 };
	Size::new(clean(size.width), clean(size.height))
}
