//! Voxed - a grid-based voxel placement editor core

pub mod core;
pub mod editor;
pub mod render;
pub mod voxel;
