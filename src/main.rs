//! Voxed - headless scripted editing session
//!
//! Drives the dispatch path against the logging backend, standing in for
//! the windowing/render layer. Run with RUST_LOG=debug to see every
//! backend request.

use voxed::core::logging;
use voxed::core::types::Vec3;
use voxed::editor::{Editor, EditorConfig, PointerAction, RayHit};
use voxed::render::LogRenderer;
use voxed::voxel::snapshot;

fn main() {
    logging::init();

    let mut editor = Editor::new(EditorConfig::default());
    let mut renderer = LogRenderer::new();

    // Simulate a short drag across the ground plane.
    for x in 0..4 {
        let hit = RayHit {
            position: Vec3::new(x as f32, 0.0, 0.0),
            handle: None,
        };
        let outcome = editor.dispatch(PointerAction::Primary, Some(hit), &mut renderer);
        log::info!("primary at x={x}: {outcome:?}");
    }

    // Remove the first voxel by its handle, as a collision hit would.
    let target = editor
        .grid()
        .iter()
        .map(|(coord, record)| (*coord, record.handle()))
        .min_by_key(|(coord, _)| (coord.x, coord.y, coord.z));
    if let Some((coord, handle)) = target {
        let hit = RayHit {
            position: editor.grid().cell_to_world(coord),
            handle: Some(handle),
        };
        let outcome = editor.dispatch(PointerAction::Secondary, Some(hit), &mut renderer);
        log::info!("secondary at {coord}: {outcome:?}");
    }

    log::info!("{} voxels placed", editor.grid().len());

    let path = std::env::temp_dir().join("voxed-demo.json");
    match snapshot::save(editor.grid(), &path) {
        Ok(()) => log::info!("snapshot written to {}", path.display()),
        Err(err) => log::error!("snapshot failed: {err}"),
    }
}
