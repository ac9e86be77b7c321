use leptos::prelude::*;

/// Shown for any route the router does not know.
#[component]
pub fn NotFound() -> impl IntoView {
	view! {
		<div class="not-found">
			<h1>"Nothing to think about here"</h1>
			<a href="/">"Back to the map"</a>
		</div>
	}
}
