//! Reusable view components.

pub mod mind_map;
