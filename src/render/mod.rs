pub mod chart;
pub mod font;
pub mod pdf;
pub mod raster;
pub mod scene;
pub mod svg;

use crate::render::font::PdfFont;
use crate::render::scene::Scene;
use crate::utils::error::Result;
use crate::utils::validation::validate_file_extension;

pub const CHART_EXTENSIONS: [&str; 3] = ["png", "svg", "pdf"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartFormat {
    Png,
    Svg,
    Pdf,
}

impl ChartFormat {
    /// Picks the format from the file extension of `path`.
    pub fn from_path(path: &str) -> Result<Self> {
        let format = match validate_file_extension(path, &CHART_EXTENSIONS)?.as_str() {
            "png" => ChartFormat::Png,
            "svg" => ChartFormat::Svg,
            _ => ChartFormat::Pdf,
        };
        Ok(format)
    }
}

/// Encodes a chart in the requested format.
pub fn render_chart(scene: &Scene, format: ChartFormat, font_path: Option<&str>) -> Result<Vec<u8>> {
    match format {
        ChartFormat::Svg => Ok(svg::to_svg(scene).into_bytes()),
        ChartFormat::Png => raster::to_png(scene, font_path),
        ChartFormat::Pdf => pdf::scene_to_pdf(scene, PdfFont::load(font_path)?),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::error::ScoreError;

    #[test]
    fn test_format_from_path() {
        assert_eq!(ChartFormat::from_path("out/chart.png").unwrap(), ChartFormat::Png);
        assert_eq!(ChartFormat::from_path("chart.SVG").unwrap(), ChartFormat::Svg);
        assert_eq!(ChartFormat::from_path("chart.pdf").unwrap(), ChartFormat::Pdf);
        assert!(matches!(
            ChartFormat::from_path("chart.jpg").unwrap_err(),
            ScoreError::UnsupportedFormat { .. }
        ));
    }
}
