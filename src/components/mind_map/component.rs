use std::cell::RefCell;
use std::rc::Rc;

use kurbo::{Point, Size};
use leptos::prelude::*;
use leptos::task::spawn_local;
use log::{error, info, warn};
use wasm_bindgen::prelude::*;
use web_sys::{
	CanvasRenderingContext2d, HtmlCanvasElement, HtmlElement, MouseEvent, Touch, TouchEvent, WheelEvent,
	Window,
};

use super::animation::{FrameLoop, WindowListener};
use super::config::MindMapConfig;
use super::input::PointerKind;
use super::render;
use super::state::{ExpansionSource, ExpansionTicket, MindMapState};
use super::types::{NodeClick, TopicTree};
use crate::error::MindMapError;
use crate::generator::{OfflineGenerator, TopicGenerator, resolve_children};

type SharedState = Rc<RefCell<Option<MindMapState>>>;

/// Applies expansion answers to the shared state, one complete mutation at a time.
#[derive(Clone)]
struct Expander {
	state: SharedState,
	generator: Rc<dyn TopicGenerator>,
	on_change: Option<Callback<TopicTree>>,
}

impl Expander {
	fn expand(&self, click: &NodeClick) {
		let plan = self
			.state
			.borrow()
			.as_ref()
			.and_then(|state| state.request_expansion(click.id));
		let Some(plan) = plan else {
			return;
		};

		match plan.source {
			ExpansionSource::Pending(children) => self.apply(plan.ticket, children),
			ExpansionSource::Generate { text, context } => {
				let expander = self.clone();
				spawn_local(async move {
					let children =
						resolve_children(expander.generator.as_ref(), &text, &context).await;
					expander.apply(plan.ticket, children);
				});
			}
		}
	}

	fn apply(&self, ticket: ExpansionTicket, children: Vec<TopicTree>) {
		let snapshot = {
			let mut guard = self.state.borrow_mut();
			let Some(state) = guard.as_mut() else {
				return;
			};
			match state.apply_expansion(ticket, children) {
				Ok(created) if !created.is_empty() => {
					info!(
						"Expanded node {} into {} children",
						ticket.node.index(),
						created.len()
					);
					state.export_tree()
				}
				Ok(_) => None,
				Err(err) => {
					warn!("Expansion of node {} failed: {err}", ticket.node.index());
					None
				}
			}
		};
		if let (Some(tree), Some(on_change)) = (snapshot, self.on_change) {
			on_change.run(tree);
		}
	}
}

fn surface_size(
	canvas: &HtmlCanvasElement,
	window: &Window,
	fullscreen: bool,
	width: Option<f64>,
	height: Option<f64>,
) -> Size {
	let inner = |value: Result<JsValue, JsValue>| value.ok().and_then(|v| v.as_f64());
	if fullscreen {
		return Size::new(
			inner(window.inner_width()).unwrap_or(800.0),
			inner(window.inner_height()).unwrap_or(600.0),
		);
	}
	Size::new(
		width.unwrap_or_else(|| {
			canvas
				.parent_element()
				.map(|p| p.client_width() as f64)
				.unwrap_or(800.0)
		}),
		height.unwrap_or_else(|| {
			canvas
				.parent_element()
				.map(|p| p.client_height() as f64)
				.unwrap_or(600.0)
		}),
	)
}

/// Sizes the backing store for the device pixel ratio and returns the CSS size.
fn fit_canvas(canvas: &HtmlCanvasElement, window: &Window, size: Size) -> Size {
	let ratio = window.device_pixel_ratio().max(1.0);
	canvas.set_width((size.width * ratio) as u32);
	canvas.set_height((size.height * ratio) as u32);
	let style = HtmlElement::style(canvas);
	let _ = style.set_property("width", &format!("{}px", size.width));
	let _ = style.set_property("height", &format!("{}px", size.height));
	size
}

fn local_point(canvas: &HtmlCanvasElement, client_x: i32, client_y: i32) -> Point {
	let rect = canvas.get_bounding_client_rect();
	Point::new(
		client_x as f64 - rect.left(),
		client_y as f64 - rect.top(),
	)
}

fn touch_point(canvas: &HtmlCanvasElement, touch: &Touch) -> Point {
	local_point(canvas, touch.client_x(), touch.client_y())
}

fn set_cursor(canvas: &HtmlCanvasElement, cursor: &str) {
	let _ = HtmlElement::style(canvas).set_property("cursor", cursor);
}

fn mount(
	canvas: &HtmlCanvasElement,
	state: &SharedState,
	config: MindMapConfig,
	seed: u64,
	fullscreen: bool,
	width: Option<f64>,
	height: Option<f64>,
) -> Result<(FrameLoop, WindowListener), MindMapError> {
	let window = web_sys::window().ok_or_else(|| MindMapError::Dom("no window".into()))?;
	let ctx: CanvasRenderingContext2d = canvas
		.get_context("2d")
		.map_err(|err| MindMapError::Dom(format!("{err:?}")))?
		.ok_or_else(|| MindMapError::Dom("2d context unavailable".into()))?
		.dyn_into()
		.map_err(|_| MindMapError::Dom("not a 2d context".into()))?;
	ctx.set_image_smoothing_enabled(true);

	let size = fit_canvas(
		canvas,
		&window,
		surface_size(canvas, &window, fullscreen, width, height),
	);
	*state.borrow_mut() = Some(MindMapState::new(config, size, seed));

	let (state_resize, canvas_resize) = (state.clone(), canvas.clone());
	let listener = WindowListener::new("resize", move || {
		let Some(window) = web_sys::window() else {
			return;
		};
		let size = fit_canvas(
			&canvas_resize,
			&window,
			surface_size(&canvas_resize, &window, fullscreen, width, height),
		);
		if let Some(ref mut s) = *state_resize.borrow_mut() {
			s.resize(size);
		}
	})?;

	let state_frame = state.clone();
	let frame = FrameLoop::start(move |dt| {
		let ratio = web_sys::window()
			.map(|w| w.device_pixel_ratio().max(1.0))
			.unwrap_or(1.0);
		if let Some(ref mut s) = *state_frame.borrow_mut() {
			s.tick(dt);
			render::render(s, &ctx, ratio);
		}
	})?;

	Ok((frame, listener))
}

/// Canvas hosting an infinitely expandable mind-map.
///
/// Setting `tree` loads a new root (a generated topic or an imported
/// snapshot). Clicking a node reports it through `on_node_click` and asks the
/// generator for children; `on_change` receives the exported tree whenever
/// the map changes shape.
#[component]
pub fn MindMapCanvas(
	#[prop(into)] tree: Signal<Option<TopicTree>>,
	#[prop(optional)] generator: Option<Rc<dyn TopicGenerator>>,
	#[prop(optional)] on_node_click: Option<Callback<NodeClick>>,
	#[prop(optional)] on_change: Option<Callback<TopicTree>>,
	#[prop(optional)] config: Option<MindMapConfig>,
	#[prop(default = true)] fullscreen: bool,
	#[prop(default = None)] width: Option<f64>,
	#[prop(default = None)] height: Option<f64>,
) -> impl IntoView {
	let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
	let state: SharedState = Rc::new(RefCell::new(None));
	let frame_loop = StoredValue::new_local(None::<FrameLoop>);
	let resize_listener = StoredValue::new_local(None::<WindowListener>);
	let expander = Expander {
		state: state.clone(),
		generator: generator.unwrap_or_else(|| Rc::new(OfflineGenerator)),
		on_change,
	};
	let config = config.unwrap_or_default();
	let seed = js_sys::Date::now() as u64;
	let mounted = RwSignal::new(false);

	let state_init = state.clone();
	Effect::new(move |_| {
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let canvas: HtmlCanvasElement = canvas.into();
		if state_init.borrow().is_some() {
			return;
		}
		match mount(
			&canvas,
			&state_init,
			config.clone(),
			seed,
			fullscreen,
			width,
			height,
		) {
			Ok((frame, listener)) => {
				frame_loop.set_value(Some(frame));
				resize_listener.set_value(Some(listener));
				mounted.set(true);
			}
			Err(err) => error!("Mind map canvas unavailable: {err}"),
		}
	});

	let (state_load, on_change_load) = (state.clone(), expander.on_change);
	Effect::new(move |_| {
		let next = tree.get();
		// Topics set before the canvas exists are loaded once it mounts.
		if !mounted.get() {
			return;
		}
		let Some(next) = next else {
			return;
		};
		let snapshot = state_load.borrow_mut().as_mut().and_then(|s| {
			s.load_topic(next);
			s.theme().apply_to_document();
			s.export_tree()
		});
		if let (Some(tree), Some(on_change)) = (snapshot, on_change_load) {
			on_change.run(tree);
		}
	});

	let clicked = {
		let expander = expander.clone();
		move |click: Option<NodeClick>| {
			let Some(click) = click else {
				return;
			};
			info!("Node clicked: {:?} at depth {}", click.text, click.depth);
			if let Some(on_node_click) = on_node_click {
				on_node_click.run(click.clone());
			}
			expander.expand(&click);
		}
	};

	let state_md = state.clone();
	let on_mousedown = move |ev: MouseEvent| {
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let canvas: HtmlCanvasElement = canvas.into();
		let point = local_point(&canvas, ev.client_x(), ev.client_y());
		if let Some(ref mut s) = *state_md.borrow_mut() {
			s.pointer_down(PointerKind::Mouse, point, js_sys::Date::now());
			set_cursor(&canvas, "grabbing");
		}
	};

	let state_mm = state.clone();
	let on_mousemove = move |ev: MouseEvent| {
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let canvas: HtmlCanvasElement = canvas.into();
		let point = local_point(&canvas, ev.client_x(), ev.client_y());
		if let Some(ref mut s) = *state_mm.borrow_mut() {
			s.pointer_move(point);
		}
	};

	let (state_mu, clicked_mu) = (state.clone(), clicked.clone());
	let on_mouseup = move |ev: MouseEvent| {
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let canvas: HtmlCanvasElement = canvas.into();
		let point = local_point(&canvas, ev.client_x(), ev.client_y());
		set_cursor(&canvas, "grab");
		let click = state_mu
			.borrow_mut()
			.as_mut()
			.and_then(|s| s.pointer_up(PointerKind::Mouse, point, js_sys::Date::now()));
		clicked_mu(click);
	};

	let state_ml = state.clone();
	let on_mouseleave = move |_: MouseEvent| {
		if let Some(ref mut s) = *state_ml.borrow_mut() {
			s.pointer_leave();
		}
		if let Some(canvas) = canvas_ref.get() {
			set_cursor(&canvas.into(), "grab");
		}
	};

	let state_wh = state.clone();
	let on_wheel = move |ev: WheelEvent| {
		ev.prevent_default();
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let canvas: HtmlCanvasElement = canvas.into();
		let point = local_point(&canvas, ev.client_x(), ev.client_y());
		if let Some(ref mut s) = *state_wh.borrow_mut() {
			s.wheel(point, ev.delta_y());
		}
	};

	let state_ts = state.clone();
	let on_touchstart = move |ev: TouchEvent| {
		let touches = ev.touches();
		let (Some(canvas), Some(touch)) = (canvas_ref.get(), touches.item(0)) else {
			return;
		};
		if touches.length() != 1 {
			return;
		}
		let point = touch_point(&canvas.into(), &touch);
		if let Some(ref mut s) = *state_ts.borrow_mut() {
			s.pointer_down(PointerKind::Touch, point, js_sys::Date::now());
		}
	};

	let state_tm = state.clone();
	let on_touchmove = move |ev: TouchEvent| {
		let touches = ev.touches();
		let (Some(canvas), Some(touch)) = (canvas_ref.get(), touches.item(0)) else {
			return;
		};
		if touches.length() != 1 {
			return;
		}
		let point = touch_point(&canvas.into(), &touch);
		if let Some(ref mut s) = *state_tm.borrow_mut() {
			if s.is_dragging() {
				ev.prevent_default();
				s.pointer_move(point);
			}
		}
	};

	let state_te = state.clone();
	let on_touchend = move |ev: TouchEvent| {
		// Keeps the browser from replaying the tap as mouse events.
		ev.prevent_default();
		let changed = ev.changed_touches();
		let point = match (canvas_ref.get(), changed.item(0)) {
			(Some(canvas), Some(touch)) if changed.length() == 1 => {
				Some(touch_point(&canvas.into(), &touch))
			}
			_ => None,
		};
		let click = state_te.borrow_mut().as_mut().and_then(|s| match point {
			Some(point) => s.pointer_up(PointerKind::Touch, point, js_sys::Date::now()),
			None => {
				s.pointer_leave();
				None
			}
		});
		clicked(click);
	};

	let state_tc = state.clone();
	let on_touchcancel = move |_: TouchEvent| {
		if let Some(ref mut s) = *state_tc.borrow_mut() {
			s.pointer_leave();
		}
	};

	view! {
		<canvas
			node_ref=canvas_ref
			class="mind-map-canvas"
			on:mousedown=on_mousedown
			on:mousemove=on_mousemove
			on:mouseup=on_mouseup
			on:mouseleave=on_mouseleave
			on:wheel=on_wheel
			on:touchstart=on_touchstart
			on:touchmove=on_touchmove
			on:touchend=on_touchend
			on:touchcancel=on_touchcancel
			style="display: block; cursor: grab; touch-action: none;"
		/>
	}
}
