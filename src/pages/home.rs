use std::fmt;
use std::rc::Rc;

use leptos::ev::{MouseEvent, SubmitEvent};
use leptos::prelude::*;
use leptos::task::spawn_local;
use log::{info, warn};

use crate::components::mind_map::{MindMapCanvas, NodeClick, TopicTree};
use crate::generator::{OfflineGenerator, TopicGenerator, resolve_tree, starter_topic};

#[derive(Clone, Debug, PartialEq)]
enum Status {
	Ready,
	Thinking,
	Exploring(String),
	Failed(String),
}

impl fmt::Display for Status {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Status::Ready => write!(f, "Ready"),
			Status::Thinking => write!(f, "Thinking..."),
			Status::Exploring(text) => write!(f, "Exploring: {text}"),
			Status::Failed(reason) => write!(f, "Error: {reason}"),
		}
	}
}

/// Default Home Page
#[component]
pub fn Home() -> impl IntoView {
	let generator = StoredValue::new_local(Rc::new(OfflineGenerator) as Rc<dyn TopicGenerator>);
	let (tree, set_tree) = signal(None::<TopicTree>);
	let snapshot = RwSignal::new(None::<TopicTree>);
	let status = RwSignal::new(Status::Ready);
	let query = RwSignal::new(String::new());
	let import_text = RwSignal::new(String::new());
	let export_text = RwSignal::new(String::new());

	let explore = move |topic: String| {
		let topic = topic.trim().to_string();
		if topic.is_empty() {
			return;
		}
		status.set(Status::Thinking);
		let generator = generator.get_value();
		spawn_local(async move {
			let next = resolve_tree(generator.as_ref(), &topic).await;
			info!("Generated tree for {topic:?} with {} nodes", next.node_count());
			status.set(Status::Ready);
			set_tree.set(Some(next));
		});
	};

	explore(starter_topic(js_sys::Date::now() as u64).to_string());

	let on_search = move |ev: SubmitEvent| {
		ev.prevent_default();
		explore(query.get_untracked());
	};

	let on_import = move |_: MouseEvent| match TopicTree::from_json(&import_text.get_untracked()) {
		Ok(imported) => {
			status.set(Status::Ready);
			set_tree.set(Some(imported));
		}
		Err(err) => {
			warn!("Import rejected: {err}");
			status.set(Status::Failed(err.to_string()));
		}
	};

	let on_export = move |_: MouseEvent| {
		let json = snapshot
			.get_untracked()
			.map(|current| current.to_json())
			.transpose();
		match json {
			Ok(json) => export_text.set(json.unwrap_or_default()),
			Err(err) => status.set(Status::Failed(err.to_string())),
		}
	};

	let on_node_click = Callback::new(move |click: NodeClick| {
		status.set(Status::Exploring(click.text));
	});
	let on_change = Callback::new(move |current: TopicTree| snapshot.set(Some(current)));

	view! {
		<div class="fullscreen-map">
			<MindMapCanvas
				tree=tree
				generator=generator.get_value()
				on_node_click=on_node_click
				on_change=on_change
				fullscreen=true
			/>
			<div class="map-overlay">
				<form class="search" on:submit=on_search>
					<input
						type="text"
						placeholder="Ask a question..."
						prop:value=move || query.get()
						on:input=move |ev| query.set(event_target_value(&ev))
					/>
					<button type="submit">"Explore"</button>
				</form>
				<p class="status">
					{move || status.get().to_string()}
					{move || {
						snapshot.get().map(|current| format!(" · {} thoughts", current.node_count()))
					}}
				</p>
				<p class="subtitle">"Click a thought to expand it. Drag to pan. Scroll to zoom."</p>
				<details class="snapshot">
					<summary>"Import / export"</summary>
					<textarea
						placeholder="Paste a saved map"
						prop:value=move || import_text.get()
						on:input=move |ev| import_text.set(event_target_value(&ev))
					/>
					<button on:click=on_import>"Import"</button>
					<button on:click=on_export>"Export"</button>
					<textarea readonly=true prop:value=move || export_text.get() />
				</details>
			</div>
		</div>
	}
}
