//! Editor orchestration: resolved input events dispatched over the grid.

pub mod config;
pub mod dispatch;

pub use config::EditorConfig;
pub use dispatch::{EditOutcome, Editor, PointerAction, RayHit};
