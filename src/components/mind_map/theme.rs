use log::debug;
use wasm_bindgen::JsCast;
use web_sys::HtmlElement;

use super::scene::ParticleTone;

/// Muted palette picked from the wording of the root topic.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Theme {
	pub name: &'static str,
	pub primary: &'static str,
	pub secondary: &'static str,
	pub accent: &'static str,
	pub particle: &'static str,
	pub particle_dim: &'static str,
}

const THEMES: &[(&[&str], Theme)] = &[
	(
		&["为什么", "哲学", "思考", "意义", "本质", "存在", "真理"],
		Theme {
			name: "philosophy",
			primary: "rgba(88, 94, 118, 0.4)",
			secondary: "rgba(78, 84, 112, 0.3)",
			accent: "rgba(98, 104, 138, 0.5)",
			particle: "rgba(150, 156, 180, 0.6)",
			particle_dim: "rgba(120, 126, 160, 0.4)",
		},
	),
	(
		&["情感", "关系", "爱", "孤独", "友谊", "亲密", "感受"],
		Theme {
			name: "emotion",
			primary: "rgba(98, 84, 98, 0.4)",
			secondary: "rgba(88, 78, 92, 0.3)",
			accent: "rgba(108, 94, 108, 0.5)",
			particle: "rgba(168, 152, 172, 0.6)",
			particle_dim: "rgba(138, 126, 148, 0.4)",
		},
	),
	(
		&["科学", "理性", "逻辑", "分析", "研究", "系统"],
		Theme {
			name: "science",
			primary: "rgba(84, 94, 102, 0.4)",
			secondary: "rgba(74, 84, 92, 0.3)",
			accent: "rgba(94, 104, 112, 0.5)",
			particle: "rgba(152, 164, 176, 0.6)",
			particle_dim: "rgba(126, 138, 152, 0.4)",
		},
	),
	(
		&["艺术", "创意", "创造", "美", "想象", "设计"],
		Theme {
			name: "creative",
			primary: "rgba(92, 86, 102, 0.4)",
			secondary: "rgba(82, 78, 92, 0.3)",
			accent: "rgba(102, 96, 112, 0.5)",
			particle: "rgba(162, 154, 176, 0.6)",
			particle_dim: "rgba(132, 126, 152, 0.4)",
		},
	),
];

const DEFAULT_THEME: Theme = Theme {
	name: "default",
	primary: "rgba(88, 92, 102, 0.4)",
	secondary: "rgba(78, 82, 92, 0.3)",
	accent: "rgba(98, 102, 112, 0.5)",
	particle: "rgba(180, 184, 198, 0.6)",
	particle_dim: "rgba(150, 154, 168, 0.4)",
};

impl Default for Theme {
	fn default() -> Self {
		DEFAULT_THEME
	}
}

impl Theme {
	/// First keyword family found in the topic wins.
	pub fn for_topic(topic: &str) -> Self {
		let lower = topic.to_lowercase();
		THEMES
			.iter()
			.find(|(words, _)| words.iter().any(|word| lower.contains(word)))
			.map(|(_, theme)| *theme)
			.unwrap_or(DEFAULT_THEME)
	}

	pub fn particle_color(&self, tone: ParticleTone) -> &'static str {
		match tone {
			ParticleTone::Light => self.particle,
			ParticleTone::Dim => self.particle_dim,
		}
	}

	/// Publishes the palette as CSS custom properties on the document root.
	pub fn apply_to_document(&self) {
		let Some(root) = web_sys::window()
			.and_then(|window| window.document())
			.and_then(|document| document.document_element())
			.and_then(|element| element.dyn_into::<HtmlElement>().ok())
		else {
			return;
		};
		let style = root.style();
		for (name, value) in [
			("--theme-primary", self.primary),
			("--theme-secondary", self.secondary),
			("--theme-accent", self.accent),
			("--particle-light", self.particle),
			("--particle-dim", self.particle_dim),
		] {
			let _ = style.set_property(name, value);
		}
		debug!("Applied {} theme", self.name);
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn topics_pick_their_palette() {
		assert_eq!(Theme::for_topic("为什么越努力越焦虑？").name, "philosophy");
		assert_eq!(Theme::for_topic("孤独的城市").name, "emotion");
		assert_eq!(Theme::for_topic("系统设计").name, "science");
		assert_eq!(Theme::for_topic("想象力").name, "creative");
		assert_eq!(Theme::for_topic("房价高企").name, "default");
	}

	#[test]
	fn tone_selects_particle_color() {
		let theme = Theme::default();
		assert_eq!(theme.particle_color(ParticleTone::Light), theme.particle);
		assert_eq!(theme.particle_color(ParticleTone::Dim), theme.particle_dim);
	}
}
