//! Radial placement of freshly expanded children.
//!
//! The root fans its children around a full circle. Every deeper node fans
//! its children inside a fixed sector centred on the direction it was itself
//! placed in, so the tree keeps growing outward. There is no collision solver:
//! the narrow sector and a little label-length padding keep density low enough.

use std::f64::consts::{FRAC_PI_2, TAU};

use kurbo::{Point, Vec2};

use super::config::MindMapConfig;
use super::types::TopicTree;

/// The parent state a layout depends on.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Anchor {
	pub position: Point,
	pub depth: usize,
	/// Angle from the anchor's own parent to the anchor. Ignored for the root.
	pub branch_direction: f64,
}

/// Where one child settles, and the direction it branches in.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Placement {
	pub position: Point,
	pub angle: f64,
	pub distance: f64,
}

/// Places one child per descriptor. Pure: same anchor and texts, same output.
pub fn layout_children(
	anchor: &Anchor,
	children: &[TopicTree],
	config: &MindMapConfig,
) -> Vec<Placement> {
	let count = children.len();
	if count == 0 {
		return Vec::new();
	}

	children
		.iter()
		.enumerate()
		.map(|(index, child)| {
			let (angle, distance) = if anchor.depth == 0 {
				(root_angle(index, count), config.root_distance)
			} else {
				(
					sector_angle(anchor.branch_direction, index, count, config.sector_width),
					branch_distance(&child.text, config),
				)
			};
			Placement {
				position: anchor.position + Vec2::from_angle(angle) * distance,
				angle,
				distance,
			}
		})
		.collect()
}

/// Evenly spaced around the circle, first child pointing up.
fn root_angle(index: usize, count: usize) -> f64 {
	TAU / count as f64 * index as f64 - FRAC_PI_2
}

fn sector_angle(direction: f64, index: usize, count: usize, width: f64) -> f64 {
	let direction = if direction.is_finite() { direction } else { 0.0 };
	if count == 1 {
		return direction;
	}
	let start = direction - width / 2.0;
	start + width / (count - 1) as f64 * index as f64
}

/// Longer labels sit a little further out.
pub fn branch_distance(text: &str, config: &MindMapConfig) -> f64 {
	let growth = text.chars().count() as f64 * config.label_growth_per_char;
	config.branch_distance + growth.min(config.label_growth_cap)
}

#[cfg(test)]
mod tests {
	use super::*;

	fn leaves(texts: &[&str]) -> Vec<TopicTree> {
		texts.iter().map(|text| TopicTree::leaf(*text)).collect()
	}

	fn root() -> Anchor {
		Anchor {
			position: Point::ORIGIN,
			depth: 0,
			branch_direction: 0.0,
		}
	}

	#[test]
	fn root_fans_out_on_a_circle() {
		let config = MindMapConfig::default();
		let children = leaves(&["a", "b", "c", "d", "e"]);
		let placed = layout_children(&root(), &children, &config);

		assert_eq!(placed.len(), 5);
		let expected_degrees = [-90.0, -18.0, 54.0, 126.0, 198.0];
		for (placement, degrees) in placed.iter().zip(expected_degrees) {
			let distance = placement.position.distance(Point::ORIGIN);
			assert!((distance - config.root_distance).abs() < 1e-9);
			assert!((placement.angle.to_degrees() - degrees).abs() < 1e-9);
			let actual = placement.position.to_vec2().atan2();
			let wrapped = (actual - placement.angle).rem_euclid(TAU);
			assert!(wrapped < 1e-9 || (TAU - wrapped) < 1e-9);
		}
	}

	#[test]
	fn root_children_ignore_label_length() {
		let config = MindMapConfig::default();
		let children = leaves(&["x", "a much longer label that would otherwise grow the radius"]);
		let placed = layout_children(&root(), &children, &config);
		assert_eq!(placed[0].distance, placed[1].distance);
	}

	#[test]
	fn deeper_children_stay_inside_the_sector() {
		let config = MindMapConfig::default();
		let theta = 0.7;
		let anchor = Anchor {
			position: Point::new(120.0, -80.0),
			depth: 2,
			branch_direction: theta,
		};
		for count in 2..9 {
			let children: Vec<_> = (0..count).map(|i| TopicTree::leaf(format!("n{i}"))).collect();
			let placed = layout_children(&anchor, &children, &config);
			let half = config.sector_width / 2.0;
			for placement in &placed {
				assert!(placement.angle >= theta - half - 1e-12);
				assert!(placement.angle <= theta + half + 1e-12);
			}
			assert!((placed[0].angle - (theta - half)).abs() < 1e-12);
			assert!((placed[count - 1].angle - (theta + half)).abs() < 1e-12);
		}
	}

	#[test]
	fn single_child_follows_the_branch() {
		let config = MindMapConfig::default();
		let anchor = Anchor {
			position: Point::new(10.0, 10.0),
			depth: 1,
			branch_direction: -2.0,
		};
		let placed = layout_children(&anchor, &leaves(&["only"]), &config);
		assert_eq!(placed[0].angle, -2.0);
	}

	#[test]
	fn label_length_grows_distance_up_to_cap() {
		let config = MindMapConfig::default();
		assert!((branch_distance("abcdefghij", &config) - 163.0).abs() < 1e-9);
		let long = "字".repeat(500);
		assert_eq!(branch_distance(&long, &config), 200.0);
	}

	#[test]
	fn layout_is_deterministic() {
		let config = MindMapConfig::default();
		let anchor = Anchor {
			position: Point::new(-3.0, 44.0),
			depth: 3,
			branch_direction: 2.2,
		};
		let children = leaves(&["alpha", "beta", "gamma"]);
		assert_eq!(
			layout_children(&anchor, &children, &config),
			layout_children(&anchor, &children, &config)
		);
		assert!(layout_children(&anchor, &[], &config).is_empty());
	}
}
