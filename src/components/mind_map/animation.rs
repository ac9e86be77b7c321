//! Browser scheduling: the repeating frame task and window listeners.
//!
//! Both are handles. Dropping one unhooks it from the browser, so tying them to
//! a component's lifetime is enough to stop ticking after unmount.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use log::{debug, warn};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::Window;

use crate::error::MindMapError;

/// Longest step handed to a frame, so a backgrounded tab does not lurch.
const MAX_FRAME_STEP: f64 = 0.1;
const FIRST_FRAME_STEP: f64 = 1.0 / 60.0;

/// Seconds between two `requestAnimationFrame` timestamps (milliseconds).
pub fn frame_step(last: Option<f64>, now: f64) -> f64 {
	match last {
		Some(last) if now.is_finite() && last.is_finite() => {
			((now - last) / 1000.0).clamp(0.0, MAX_FRAME_STEP)
		}
		_ => FIRST_FRAME_STEP,
	}
}

struct FrameShared {
	window: Window,
	handle: Cell<Option<i32>>,
	callback: RefCell<Option<Closure<dyn FnMut(f64)>>>,
	last_timestamp: Cell<Option<f64>>,
	cancelled: Cell<bool>,
}

impl FrameShared {
	fn schedule(&self) {
		if self.cancelled.get() {
			return;
		}
		let callback = self.callback.borrow();
		let Some(callback) = callback.as_ref() else {
			return;
		};
		match self
			.window
			.request_animation_frame(callback.as_ref().unchecked_ref())
		{
			Ok(id) => self.handle.set(Some(id)),
			Err(err) => warn!("requestAnimationFrame failed: {err:?}"),
		}
	}
}

/// A cancellable per-frame task.
///
/// The scheduled callback only holds a weak reference back to the loop, so
/// dropping the handle frees it; no frame runs after [`FrameLoop::cancel`].
pub struct FrameLoop {
	shared: Rc<FrameShared>,
}

impl FrameLoop {
	/// Calls `frame` once per display refresh with the elapsed seconds.
	pub fn start(mut frame: impl FnMut(f64) + 'static) -> Result<Self, MindMapError> {
		let window = web_sys::window().ok_or_else(|| MindMapError::Dom("no window".into()))?;
		let shared = Rc::new(FrameShared {
			window,
			handle: Cell::new(None),
			callback: RefCell::new(None),
			last_timestamp: Cell::new(None),
			cancelled: Cell::new(false),
		});

		let weak: Weak<FrameShared> = Rc::downgrade(&shared);
		let callback = Closure::<dyn FnMut(f64)>::new(move |timestamp: f64| {
			let Some(shared) = weak.upgrade() else {
				return;
			};
			if shared.cancelled.get() {
				return;
			}
			shared.handle.set(None);
			let dt = frame_step(shared.last_timestamp.replace(Some(timestamp)), timestamp);
			frame(dt);
			shared.schedule();
		});
		*shared.callback.borrow_mut() = Some(callback);
		shared.schedule();
		debug!("Frame loop started");

		Ok(Self { shared })
	}

	pub fn cancel(&self) {
		if self.shared.cancelled.replace(true) {
			return;
		}
		if let Some(id) = self.shared.handle.take() {
			let _ = self.shared.window.cancel_animation_frame(id);
		}
		debug!("Frame loop cancelled");
	}
}

impl Drop for FrameLoop {
	fn drop(&mut self) {
		self.cancel();
	}
}

/// A window event listener removed again on drop.
pub struct WindowListener {
	window: Window,
	event: &'static str,
	callback: Closure<dyn FnMut()>,
}

impl WindowListener {
	pub fn new(event: &'static str, callback: impl FnMut() + 'static) -> Result<Self, MindMapError> {
		let window = web_sys::window().ok_or_else(|| MindMapError::Dom("no window".into()))?;
		let callback = Closure::<dyn FnMut()>::new(callback);
		window
			.add_event_listener_with_callback(event, callback.as_ref().unchecked_ref())
			.map_err(|err| MindMapError::Dom(format!("{event} listener: {err:?}")))?;
		Ok(Self {
			window,
			event,
			callback,
		})
	}
}

impl Drop for WindowListener {
	fn drop(&mut self) {
		let _ = self
			.window
			.remove_event_listener_with_callback(self.event, self.callback.as_ref().unchecked_ref());
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn frame_step_is_clamped() {
		assert_eq!(frame_step(None, 1000.0), FIRST_FRAME_STEP);
		assert!((frame_step(Some(1000.0), 1016.0) - 0.016).abs() < 1e-12);
		assert_eq!(frame_step(Some(1000.0), 9000.0), MAX_FRAME_STEP);
		assert_eq!(frame_step(Some(1000.0), 900.0), 0.0);
		assert_eq!(frame_step(Some(f64::NAN), 900.0), FIRST_FRAME_STEP);
	}
}
