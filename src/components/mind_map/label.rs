//! Label sizing and truncation shared by the renderer and the hit-tester.

use std::borrow::Cow;

/// Labels with more wide characters than this get the shorter limit.
const WIDE_CHAR_THRESHOLD: usize = 20;
const WIDE_MAX_CHARS: usize = 50;
const NARROW_MAX_CHARS: usize = 80;
const ELLIPSIS: &str = "...";

fn is_wide(c: char) -> bool {
	('\u{4e00}'..='\u{9fa5}').contains(&c)
}

pub fn wide_char_count(text: &str) -> usize {
	text.chars().filter(|c| is_wide(*c)).count()
}

/// The text actually painted for a node.
pub fn display_label(text: &str) -> Cow<'_, str> {
	let max_chars = if wide_char_count(text) > WIDE_CHAR_THRESHOLD {
		WIDE_MAX_CHARS
	} else {
		NARROW_MAX_CHARS
	};
	match text.char_indices().nth(max_chars) {
		Some((cut, _)) => Cow::Owned(format!("{}{ELLIPSIS}", &text[..cut])),
		None => Cow::Borrowed(text),
	}
}

/// World-space font size; dividing by zoom keeps glyphs roughly constant on screen.
pub fn label_font_size(depth: usize, zoom: f64) -> f64 {
	let base = (14.0 - depth as f64 * 0.4).max(10.0);
	base / zoom.max(1.0)
}

/// Slightly larger than the painted font so small labels stay easy to hit.
pub fn hit_font_size(depth: usize, zoom: f64) -> f64 {
	let base = (16.0 - depth as f64).max(12.0);
	base / zoom.max(1.0)
}

/// Half extents of a node's clickable box, centred on the node.
pub fn hit_half_extents(text: &str, depth: usize, zoom: f64, glyph_width: f64) -> (f64, f64) {
	let font = hit_font_size(depth, zoom);
	let chars = display_label(text).chars().count() as f64;
	(chars * font * glyph_width / 2.0, font)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn short_labels_are_untouched() {
		assert!(matches!(display_label("hello"), Cow::Borrowed("hello")));
	}

	#[test]
	fn narrow_labels_cut_at_eighty() {
		let text = "a".repeat(81);
		let shown = display_label(&text);
		assert_eq!(shown.chars().count(), 83);
		assert!(shown.ends_with("..."));
		assert!(matches!(display_label(&"a".repeat(80)), Cow::Borrowed(_)));
	}

	#[test]
	fn wide_labels_cut_at_fifty() {
		let text = "拖".repeat(60);
		let shown = display_label(&text);
		assert_eq!(shown, format!("{}...", "拖".repeat(50)));

		// Twenty wide characters is not enough to switch limits.
		let mixed = format!("{}{}", "拖".repeat(20), "a".repeat(60));
		assert!(matches!(display_label(&mixed), Cow::Borrowed(_)));
	}

	#[test]
	fn font_shrinks_with_depth_and_zoom() {
		assert_eq!(label_font_size(0, 1.0), 14.0);
		assert_eq!(label_font_size(100, 1.0), 10.0);
		assert_eq!(label_font_size(0, 2.0), 7.0);
		assert_eq!(label_font_size(0, 0.5), 14.0);
		assert_eq!(hit_font_size(2, 1.0), 14.0);
		assert_eq!(hit_font_size(9, 1.0), 12.0);
	}

	#[test]
	fn hit_box_tracks_label_width() {
		let (w, h) = hit_half_extents("abcd", 0, 1.0, 0.6);
		assert!((w - 4.0 * 16.0 * 0.6 / 2.0).abs() < 1e-9);
		assert_eq!(h, 16.0);
	}
}
