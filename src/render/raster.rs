use crate::render::scene::Scene;
use crate::render::svg::to_svg;
use crate::utils::error::{Result, ScoreError};
use resvg::{tiny_skia, usvg};

/// Rasterizes a scene to PNG bytes by way of its SVG form. Text is shaped
/// with the system fonts plus `font_path` when one is configured.
pub fn to_png(scene: &Scene, font_path: Option<&str>) -> Result<Vec<u8>> {
    let svg = to_svg(scene);

    let mut options = usvg::Options::default();
    {
        let fontdb = options.fontdb_mut();
        fontdb.load_system_fonts();
        if let Some(path) = font_path {
            fontdb
                .load_font_file(path)
                .map_err(|e| ScoreError::FontError {
                    message: format!("cannot load {}: {}", path, e),
                })?;
        }
    }

    let tree = usvg::Tree::from_str(&svg, &options).map_err(|e| ScoreError::ChartError {
        message: format!("SVG parse failed: {}", e),
    })?;

    let width = scene.width.round().max(1.0) as u32;
    let height = scene.height.round().max(1.0) as u32;
    let mut pixmap = tiny_skia::Pixmap::new(width, height).ok_or_else(|| ScoreError::ChartError {
        message: format!("cannot allocate a {}x{} image", width, height),
    })?;

    resvg::render(&tree, tiny_skia::Transform::default(), &mut pixmap.as_mut());
    tracing::debug!("Rasterized chart to {}x{} PNG", width, height);

    pixmap.encode_png().map_err(|e| ScoreError::ChartError {
        message: format!("PNG encoding failed: {}", e),
    })
}
