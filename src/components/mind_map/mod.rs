//! Radial mind-map on a canvas: layout, camera, animated scene and input.

pub mod animation;
pub mod camera;
mod component;
mod config;
pub mod input;
pub mod label;
pub mod layout;
pub mod render;
pub mod scene;
mod state;
pub mod theme;
mod types;

pub use component::MindMapCanvas;
pub use config::MindMapConfig;
pub use state::{ExpansionPlan, ExpansionSource, ExpansionTicket, MindMapState, Star};
pub use types::{NodeClick, NodeId, TopicTree};
