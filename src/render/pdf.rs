//! Minimal PDF page writer on top of `lopdf`. Callers use top-left based
//! coordinates like the rest of `render`; the writer flips them.

use crate::render::font::{PdfFont, FONT_RESOURCE};
use crate::render::scene::{Anchor, Point, Rgb, Scene, Shape};
use crate::utils::error::Result;
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream, StringFormat};

pub const A4_WIDTH: f64 = 595.28;
pub const A4_HEIGHT: f64 = 841.89;

// 以四段貝茲曲線近似圓
const KAPPA: f64 = 0.552_284_75;

fn real(value: f64) -> Object {
    Object::Real(value as f32)
}

/// Text string for the document information dictionary, UTF-16BE with a
/// byte order mark.
fn text_string(text: &str) -> Object {
    let mut bytes = vec![0xFE, 0xFF];
    for unit in text.encode_utf16() {
        bytes.extend_from_slice(&unit.to_be_bytes());
    }
    Object::String(bytes, StringFormat::Hexadecimal)
}

struct Page {
    width: f64,
    height: f64,
    operations: Vec<Operation>,
}

pub struct PdfWriter {
    font: PdfFont,
    title: Option<String>,
    pages: Vec<Page>,
    current: Page,
}

impl PdfWriter {
    pub fn new(font: PdfFont, width: f64, height: f64) -> Self {
        Self {
            font,
            title: None,
            pages: Vec::new(),
            current: Page {
                width,
                height,
                operations: Vec::new(),
            },
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn page_size(&self) -> (f64, f64) {
        (self.current.width, self.current.height)
    }

    pub fn add_page(&mut self, width: f64, height: f64) {
        let finished = std::mem::replace(
            &mut self.current,
            Page {
                width,
                height,
                operations: Vec::new(),
            },
        );
        self.pages.push(finished);
    }

    fn op(&mut self, operator: &str, operands: Vec<Object>) {
        self.current
            .operations
            .push(Operation::new(operator, operands));
    }

    fn flip(&self, y: f64) -> f64 {
        self.current.height - y
    }

    fn set_fill(&mut self, color: Rgb) {
        let (r, g, b) = color.unit();
        self.op("rg", vec![real(r), real(g), real(b)]);
    }

    fn set_stroke(&mut self, color: Rgb, width: f64) {
        let (r, g, b) = color.unit();
        self.op("RG", vec![real(r), real(g), real(b)]);
        self.op("w", vec![real(width)]);
    }

    fn paint(&mut self, fill: Option<Rgb>, stroke: Option<Rgb>, line_width: f64) {
        if let Some(color) = fill {
            self.set_fill(color);
        }
        if let Some(color) = stroke {
            self.set_stroke(color, line_width);
        }
        let operator = match (fill.is_some(), stroke.is_some()) {
            (true, true) => "B",
            (true, false) => "f",
            (false, true) => "S",
            (false, false) => "n",
        };
        self.op(operator, vec![]);
    }

    pub fn rect(&mut self, x: f64, y: f64, width: f64, height: f64, fill: Option<Rgb>, stroke: Option<Rgb>) {
        let bottom = self.flip(y + height);
        self.op("re", vec![real(x), real(bottom), real(width), real(height)]);
        self.paint(fill, stroke, 0.8);
    }

    fn path(&mut self, points: &[Point], close: bool) {
        for (i, point) in points.iter().enumerate() {
            let operator = if i == 0 { "m" } else { "l" };
            let y = self.flip(point.y);
            self.op(operator, vec![real(point.x), real(y)]);
        }
        if close {
            self.op("h", vec![]);
        }
    }

    pub fn polyline(&mut self, points: &[Point], color: Rgb, width: f64) {
        if points.len() < 2 {
            return;
        }
        self.path(points, false);
        self.paint(None, Some(color), width);
    }

    pub fn polygon(&mut self, points: &[Point], fill: Rgb, stroke: Option<Rgb>) {
        if points.len() < 3 {
            return;
        }
        self.path(points, true);
        self.paint(Some(fill), stroke, 1.0);
    }

    pub fn circle(&mut self, center: Point, radius: f64, fill: Rgb) {
        let cx = center.x;
        let cy = self.flip(center.y);
        let k = radius * KAPPA;
        self.op("m", vec![real(cx + radius), real(cy)]);
        let curves = [
            [cx + radius, cy + k, cx + k, cy + radius, cx, cy + radius],
            [cx - k, cy + radius, cx - radius, cy + k, cx - radius, cy],
            [cx - radius, cy - k, cx - k, cy - radius, cx, cy - radius],
            [cx + k, cy - radius, cx + radius, cy - k, cx + radius, cy],
        ];
        for curve in curves {
            self.op("c", curve.iter().map(|v| real(*v)).collect());
        }
        self.op("h", vec![]);
        self.paint(Some(fill), None, 0.0);
    }

    pub fn text_width(&self, text: &str, size: f64) -> f64 {
        self.font.text_width(text, size)
    }

    /// Draws `text` with its baseline anchored at (`x`, `y`), rotated
    /// counter-clockwise by `rotation` degrees.
    pub fn text(&mut self, x: f64, y: f64, text: &str, size: f64, color: Rgb, anchor: Anchor, rotation: f64) {
        let width = self.font.text_width(text, size);
        let shift = match anchor {
            Anchor::Start => 0.0,
            Anchor::Middle => width / 2.0,
            Anchor::End => width,
        };
        let (sin, cos) = rotation.to_radians().sin_cos();
        let start_x = x - shift * cos;
        let start_y = self.flip(y) - shift * sin;
        let encoded = self.font.encode(text);

        self.op("BT", vec![]);
        self.op("Tf", vec![FONT_RESOURCE.into(), real(size)]);
        self.set_fill(color);
        self.op(
            "Tm",
            vec![real(cos), real(sin), real(-sin), real(cos), real(start_x), real(start_y)],
        );
        self.op("Tj", vec![encoded]);
        self.op("ET", vec![]);
    }

    pub fn draw_scene(&mut self, scene: &Scene) {
        let (width, height) = self.page_size();
        self.rect(0.0, 0.0, width, height, Some(scene.background), None);

        for shape in &scene.shapes {
            match shape {
                Shape::Rect {
                    origin,
                    width,
                    height,
                    fill,
                    stroke,
                } => self.rect(origin.x, origin.y, *width, *height, *fill, *stroke),
                Shape::Line {
                    points,
                    color,
                    width,
                } => self.polyline(points, *color, *width),
                Shape::Polygon {
                    points,
                    fill,
                    stroke,
                } => self.polygon(points, *fill, *stroke),
                Shape::Circle {
                    center,
                    radius,
                    fill,
                } => self.circle(*center, *radius, *fill),
                Shape::Text {
                    position,
                    text,
                    size,
                    color,
                    anchor,
                    rotation,
                } => self.text(position.x, position.y, text, *size, *color, *anchor, *rotation),
            }
        }
    }

    /// Assembles the document. Content streams are left uncompressed.
    pub fn finish(mut self) -> Result<Vec<u8>> {
        let last = std::mem::replace(
            &mut self.current,
            Page {
                width: 0.0,
                height: 0.0,
                operations: Vec::new(),
            },
        );
        self.pages.push(last);

        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let font_id = self.font.add_to_document(&mut doc);
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! { FONT_RESOURCE => font_id },
        });

        let mut kids = Vec::with_capacity(self.pages.len());
        for page in self.pages {
            let content = Content {
                operations: page.operations,
            };
            let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode()?));
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
                "Resources" => resources_id,
                "MediaBox" => vec![real(0.0), real(0.0), real(page.width), real(page.height)],
            });
            kids.push(Object::Reference(page_id));
        }

        let count = kids.len() as i64;
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => count,
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        if let Some(title) = &self.title {
            let info_id = doc.add_object(dictionary! {
                "Title" => text_string(title),
                "Producer" => Object::string_literal("score-analyzer"),
            });
            doc.trailer.set("Info", info_id);
        }

        let mut bytes = Vec::new();
        doc.save_to(&mut bytes)?;
        Ok(bytes)
    }
}

/// Renders a chart scene on a page of the same size.
pub fn scene_to_pdf(scene: &Scene, font: PdfFont) -> Result<Vec<u8>> {
    let mut writer = PdfWriter::new(font, scene.width, scene.height);
    writer.draw_scene(scene);
    writer.finish()
}
