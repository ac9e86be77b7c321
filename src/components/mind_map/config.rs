use std::f64::consts::PI;

/// Tunables for the camera, layout, animation and hit-testing.
///
/// Every easing factor is applied once per frame, so the feel of the map is
/// tied to the display refresh rate rather than wall-clock time.
#[derive(Clone, Debug, PartialEq)]
pub struct MindMapConfig {
	pub zoom_min: f64,
	pub zoom_max: f64,
	/// Extra zoom per depth level when focusing a node.
	pub focus_zoom_step: f64,
	/// Upper bound for focus zoom, below `zoom_max`.
	pub focus_zoom_cap: f64,
	pub camera_easing: f64,
	pub camera_drag_easing: f64,
	pub wheel_zoom_in: f64,
	pub wheel_zoom_out: f64,

	pub node_easing: f64,
	pub opacity_step: f64,
	/// Radius a node eases toward; reaching it means the node has settled.
	pub settled_radius: f64,

	pub root_distance: f64,
	pub branch_distance: f64,
	pub label_growth_per_char: f64,
	pub label_growth_cap: f64,
	/// Angular width of the fan used below the first level.
	pub sector_width: f64,

	pub particles_per_edge: usize,
	pub particle_speed: (f64, f64),
	pub particle_size: (f64, f64),
	pub particle_wobble_step: f64,
	pub stardust_count: usize,

	pub click_threshold: f64,
	/// Milliseconds after a touch during which mouse presses are treated as replays.
	pub emulated_mouse_window: f64,
	pub hit_glyph_width: f64,
	pub visible_opacity: f64,
	pub particle_visible_opacity: f64,
}

impl Default for MindMapConfig {
	fn default() -> Self {
		Self {
			zoom_min: 0.5,
			zoom_max: 3.0,
			focus_zoom_step: 0.15,
			focus_zoom_cap: 2.5,
			camera_easing: 0.08,
			camera_drag_easing: 0.25,
			wheel_zoom_in: 1.1,
			wheel_zoom_out: 0.9,

			node_easing: 0.12,
			opacity_step: 0.05,
			settled_radius: 10.0,

			root_distance: 220.0,
			branch_distance: 160.0,
			label_growth_per_char: 0.3,
			label_growth_cap: 40.0,
			sector_width: PI / 2.2,

			particles_per_edge: 6,
			particle_speed: (0.004, 0.010),
			particle_size: (0.5, 1.1),
			particle_wobble_step: 0.025,
			stardust_count: 80,

			click_threshold: 5.0,
			emulated_mouse_window: 800.0,
			hit_glyph_width: 0.6,
			visible_opacity: 0.05,
			particle_visible_opacity: 0.1,
		}
	}
}
