use kurbo::{Point, Size, Vec2};

use super::config::MindMapConfig;
use super::types::NodeId;

/// Lowest zoom ever accepted, whatever the configuration says.
const ZOOM_FLOOR: f64 = 1e-3;

/// Virtual camera centred on a world point.
///
/// `screen = (world - position) * zoom + center`, where `center` is the middle
/// of the drawing surface in CSS pixels.
#[derive(Clone, Debug)]
pub struct Camera {
	pub position: Point,
	pub target: Point,
	pub zoom: f64,
	pub target_zoom: f64,
	pub focus: Option<NodeId>,
	center: Point,
	zoom_min: f64,
	zoom_max: f64,
	focus_step: f64,
	focus_cap: f64,
	easing: f64,
	drag_easing: f64,
}

impl Camera {
	pub fn new(config: &MindMapConfig, viewport: Size) -> Self {
		let zoom_min = config.zoom_min.max(ZOOM_FLOOR);
		let zoom_max = config.zoom_max.max(zoom_min);
		let mut camera = Self {
			position: Point::ORIGIN,
			target: Point::ORIGIN,
			zoom: 1.0,
			target_zoom: 1.0,
			focus: None,
			center: Point::ORIGIN,
			zoom_min,
			zoom_max,
			focus_step: config.focus_zoom_step,
			focus_cap: config.focus_zoom_cap,
			easing: config.camera_easing.clamp(0.0, 1.0),
			drag_easing: config.camera_drag_easing.clamp(0.0, 1.0),
		};
		camera.zoom = camera.clamp_zoom(1.0);
		camera.target_zoom = camera.zoom;
		camera.resize(viewport);
		camera
	}

	/// Snaps back to the world origin at zoom 1. The only place the camera jumps.
	pub fn reset(&mut self) {
		self.position = Point::ORIGIN;
		self.target = Point::ORIGIN;
		self.zoom = self.clamp_zoom(1.0);
		self.target_zoom = self.zoom;
		self.focus = None;
	}

	/// Recomputes the screen centre. World-space state is left untouched.
	pub fn resize(&mut self, viewport: Size) {
		let half = |v: f64| if v.is_finite() && v > 0.0 { v / 2.0 } else { 0.0 };
		self.center = Point::new(half(viewport.width), half(viewport.height));
	}

	pub fn center(&self) -> Point {
		self.center
	}

	pub fn world_to_screen(&self, world: Point) -> Point {
		self.center + (world - self.position) * self.zoom
	}

	pub fn screen_to_world(&self, screen: Point) -> Point {
		self.position + (screen - self.center) / self.zoom
	}

	/// Shifts the target by a screen-space pointer delta, scaled by the current zoom.
	pub fn pan(&mut self, delta: Vec2) {
		if !delta.is_finite() {
			return;
		}
		self.target -= delta / self.zoom;
	}

	/// Zooms by `factor` while keeping the world point under `screen` in place.
	pub fn zoom_at(&mut self, screen: Point, factor: f64) {
		if !factor.is_finite() || factor <= 0.0 || !screen.is_finite() {
			return;
		}
		let new_zoom = self.clamp_zoom(self.target_zoom * factor);
		let anchor = self.screen_to_world(screen);
		self.target = anchor - (screen - self.center) / new_zoom;
		self.target_zoom = new_zoom;
	}

	/// Centres on a node; deeper nodes are framed closer, up to the cap.
	pub fn focus(&mut self, id: NodeId, position: Point, depth: usize) {
		if position.is_finite() {
			self.target = position;
		}
		let zoom = (1.0 + depth as f64 * self.focus_step).min(self.focus_cap);
		self.target_zoom = self.clamp_zoom(zoom);
		self.focus = Some(id);
	}

	/// Eases position and zoom toward their targets, faster while dragging.
	pub fn update(&mut self, dragging: bool) {
		let easing = if dragging {
			self.drag_easing
		} else {
			self.easing
		};
		self.position += (self.target - self.position) * easing;
		self.zoom = self.clamp_zoom(self.zoom + (self.target_zoom - self.zoom) * easing);
	}

	fn clamp_zoom(&self, zoom: f64) -> f64 {
		if zoom.is_nan() {
			return self.zoom_min;
		}
		zoom.clamp(self.zoom_min, self.zoom_max)
	}
}
