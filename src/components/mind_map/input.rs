use kurbo::{Point, Vec2};

use super::config::MindMapConfig;

#[derive(Clone, Copy, Debug, Default, PartialEq)]
enum Gesture {
	#[default]
	Idle,
	Dragging { start: Point, last: Point },
}

/// Which device a pointer event came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PointerKind {
	Mouse,
	Touch,
}

/// What a pointer release turned out to be.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Release {
	/// Moved less than the click threshold; carries the release point.
	Click(Point),
	DragEnd,
	/// Release without a matching press.
	Ignored,
}

/// Tells clicks apart from drags for mouse and single-finger touch alike.
///
/// Browsers replay a tap as mouse events right after the touch ends. Mouse
/// presses arriving within `emulated_mouse_window` milliseconds of the last
/// touch are ignored so one tap never clicks twice.
#[derive(Clone, Debug)]
pub struct PointerTracker {
	gesture: Gesture,
	click_threshold: f64,
	emulated_mouse_window: f64,
	last_touch: Option<f64>,
}

impl PointerTracker {
	pub fn new(config: &MindMapConfig) -> Self {
		Self {
			gesture: Gesture::Idle,
			click_threshold: config.click_threshold,
			emulated_mouse_window: config.emulated_mouse_window,
			last_touch: None,
		}
	}

	pub fn is_dragging(&self) -> bool {
		matches!(self.gesture, Gesture::Dragging { .. })
	}

	fn is_emulated(&self, kind: PointerKind, now: f64) -> bool {
		kind == PointerKind::Mouse
			&& self
				.last_touch
				.is_some_and(|touched| (0.0..self.emulated_mouse_window).contains(&(now - touched)))
	}

	/// Starts a gesture. Returns `false` when the press was a replayed tap.
	pub fn press(&mut self, kind: PointerKind, screen: Point, now: f64) -> bool {
		if self.is_emulated(kind, now) {
			return false;
		}
		if kind == PointerKind::Touch {
			self.last_touch = Some(now);
		}
		self.gesture = Gesture::Dragging {
			start: screen,
			last: screen,
		};
		true
	}

	/// Returns the delta since the previous move while a drag is active.
	pub fn drag(&mut self, screen: Point) -> Option<Vec2> {
		match &mut self.gesture {
			Gesture::Dragging { last, .. } => {
				let delta = screen - *last;
				*last = screen;
				Some(delta)
			}
			Gesture::Idle => None,
		}
	}

	/// Ends the gesture. Travel strictly below the threshold counts as a click.
	pub fn release(&mut self, kind: PointerKind, screen: Point, now: f64) -> Release {
		if self.is_emulated(kind, now) {
			return Release::Ignored;
		}
		if kind == PointerKind::Touch {
			self.last_touch = Some(now);
		}
		match std::mem::take(&mut self.gesture) {
			Gesture::Dragging { start, .. } if start.distance(screen) < self.click_threshold => {
				Release::Click(screen)
			}
			Gesture::Dragging { .. } => Release::DragEnd,
			Gesture::Idle => Release::Ignored,
		}
	}

	/// The pointer left the surface; drop any drag without clicking.
	pub fn leave(&mut self) {
		self.gesture = Gesture::Idle;
	}
}

/// Zoom factor for one wheel notch, `None` for a purely horizontal scroll.
pub fn wheel_factor(delta_y: f64, config: &MindMapConfig) -> Option<f64> {
	if delta_y > 0.0 {
		Some(config.wheel_zoom_out)
	} else if delta_y < 0.0 {
		Some(config.wheel_zoom_in)
	} else {
		None
	}
}
