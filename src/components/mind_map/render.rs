use std::f64::consts::{FRAC_PI_2, PI, TAU};

use kurbo::{Point, Vec2};
use web_sys::CanvasRenderingContext2d;

use super::label::{display_label, label_font_size};
use super::state::MindMapState;

/// Translucent clear, leaving short trails behind moving particles.
const BACKDROP: &str = "rgba(14, 15, 20, 0.35)";
const FONT_FAMILY: &str = "-apple-system, BlinkMacSystemFont, 'SF Pro Text', 'Helvetica Neue', sans-serif";
/// Perpendicular offset of the connector curve's control point.
const CONTROL_OFFSET: f64 = 25.0;
const WOBBLE_AMPLITUDE: f64 = 0.8;

/// Text and glow colours for one depth band.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LevelColors {
	pub rgb: (u8, u8, u8),
	pub text_alpha: f64,
	pub glow_alpha: f64,
}

impl LevelColors {
	pub fn rgba(&self, alpha: f64) -> String {
		let (r, g, b) = self.rgb;
		format!("rgba({r}, {g}, {b}, {alpha})")
	}

	pub fn text(&self) -> String {
		self.rgba(self.text_alpha)
	}

	pub fn glow(&self) -> String {
		self.rgba(self.glow_alpha)
	}
}

const fn level(r: u8, g: u8, b: u8, text_alpha: f64, glow_alpha: f64) -> LevelColors {
	LevelColors {
		rgb: (r, g, b),
		text_alpha,
		glow_alpha,
	}
}

const LEVELS: [LevelColors; 7] = [
	level(235, 237, 242, 0.98, 0.15),
	level(162, 174, 192, 0.95, 0.12),
	level(178, 170, 195, 0.95, 0.12),
	level(198, 178, 188, 0.95, 0.12),
	level(170, 190, 182, 0.95, 0.12),
	level(195, 188, 175, 0.95, 0.12),
	level(180, 182, 185, 0.95, 0.12),
];

/// Deeper levels than the table reuse its last entry.
pub fn level_colors(depth: usize) -> &'static LevelColors {
	&LEVELS[depth.min(LEVELS.len() - 1)]
}

/// Point at `t` on the quadratic curve bowing sideways between two nodes.
pub fn connector_point(from: Point, to: Point, t: f64) -> Point {
	let mid = from.midpoint(to);
	let normal = (to - from).atan2() + FRAC_PI_2;
	let control = mid + Vec2::from_angle(normal) * CONTROL_OFFSET;
	let u = 1.0 - t;
	Point::new(
		u * u * from.x + 2.0 * u * t * control.x + t * t * to.x,
		u * u * from.y + 2.0 * u * t * control.y + t * t * to.y,
	)
}

/// Sideways wobble, perpendicular to the straight line between the nodes.
pub fn wobble_offset(from: Point, to: Point, phase: f64) -> Vec2 {
	let line = to - from;
	let length = line.hypot();
	if length < f64::EPSILON {
		return Vec2::ZERO;
	}
	Vec2::new(-line.y, line.x) / length * (phase.sin() * WOBBLE_AMPLITUDE)
}

pub fn render(state: &MindMapState, ctx: &CanvasRenderingContext2d, pixel_ratio: f64) {
	let size = state.size();
	let _ = ctx.set_transform(pixel_ratio, 0.0, 0.0, pixel_ratio, 0.0, 0.0);
	ctx.set_fill_style_str(BACKDROP);
	ctx.fill_rect(0.0, 0.0, size.width, size.height);
	draw_stardust(state, ctx);

	let camera = state.camera();
	let center = camera.center();
	ctx.save();
	let _ = ctx.translate(center.x, center.y);
	let _ = ctx.scale(camera.zoom, camera.zoom);
	let _ = ctx.translate(-camera.position.x, -camera.position.y);
	draw_particles(state, ctx);
	draw_nodes(state, ctx);
	ctx.restore();
}

fn draw_stardust(state: &MindMapState, ctx: &CanvasRenderingContext2d) {
	let time = state.time();
	for star in state.stardust() {
		let twinkle = (time * 1.5 + star.position.x).sin() * 0.4 + 0.6;
		ctx.set_fill_style_str(&format!("rgba(235, 237, 242, {})", star.alpha * twinkle));
		ctx.begin_path();
		let _ = ctx.arc(star.position.x, star.position.y, star.size, 0.0, TAU);
		ctx.fill();
	}
}

fn draw_particles(state: &MindMapState, ctx: &CanvasRenderingContext2d) {
	let scene = state.scene();
	let theme = state.theme();
	let threshold = state.config().particle_visible_opacity;

	for particle in scene.particles() {
		let (Some(from), Some(to)) = (scene.node(particle.from), scene.node(particle.to)) else {
			continue;
		};
		let presence = from.opacity.min(to.opacity);
		if !from.attached || !to.attached || presence < threshold {
			continue;
		}

		let point = connector_point(from.position, to.position, particle.progress)
			+ wobble_offset(from.position, to.position, particle.wobble);
		let alpha = presence * 0.25 * (particle.progress * PI).sin();
		let colors = level_colors(to.depth);
		let glow_radius = particle.size * 1.2;

		if let Ok(gradient) =
			ctx.create_radial_gradient(point.x, point.y, 0.0, point.x, point.y, glow_radius)
		{
			let _ = gradient.add_color_stop(0.0, &colors.rgba(alpha));
			let _ = gradient.add_color_stop(1.0, "rgba(0, 0, 0, 0)");
			#[allow(deprecated)]
			ctx.set_fill_style(&gradient);
			ctx.begin_path();
			let _ = ctx.arc(point.x, point.y, glow_radius, 0.0, TAU);
			ctx.fill();
		}

		ctx.set_global_alpha(alpha.clamp(0.0, 1.0));
		ctx.set_fill_style_str(theme.particle_color(particle.tone));
		ctx.begin_path();
		let _ = ctx.arc(point.x, point.y, particle.size * 0.5, 0.0, TAU);
		ctx.fill();
		ctx.set_global_alpha(1.0);
	}
}

fn draw_nodes(state: &MindMapState, ctx: &CanvasRenderingContext2d) {
	let zoom = state.camera().zoom;
	let threshold = state.config().visible_opacity;

	for (_, node) in state.scene().nodes() {
		if node.opacity < threshold {
			continue;
		}
		let colors = level_colors(node.depth);
		let font = label_font_size(node.depth, zoom);
		let label = display_label(&node.text);
		let Point { x, y } = node.position;
		// Freshly spawned labels start slightly scattered and pull together.
		let scatter = (1.0 - (node.opacity * 2.0).min(1.0)) * 2.0;

		ctx.save();
		ctx.set_font(&format!("500 {font}px {FONT_FAMILY}"));
		ctx.set_text_align("center");
		ctx.set_text_baseline("middle");

		let glow = colors.glow();
		ctx.set_global_alpha(node.opacity * 0.08);
		ctx.set_fill_style_str(&glow);
		ctx.set_shadow_color(&glow);
		ctx.set_shadow_blur(8.0 / zoom);
		let _ = ctx.fill_text(&label, x + scatter, y);

		ctx.set_global_alpha(node.opacity);
		ctx.set_fill_style_str(&colors.text());
		ctx.set_shadow_color("transparent");
		ctx.set_shadow_blur(0.0);
		let _ = ctx.fill_text(&label, x, y);
		ctx.restore();
	}
}
