use crate::render::scene::{Anchor, Point, Rgb, Scene, Shape};

const FONT_FAMILY: &str = "Helvetica, Arial, 'Noto Sans CJK SC', 'Microsoft YaHei', SimHei, sans-serif";

fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

fn points_attr(points: &[Point]) -> String {
    points
        .iter()
        .map(|p| format!("{:.2},{:.2}", p.x, p.y))
        .collect::<Vec<_>>()
        .join(" ")
}

fn color_or_none(color: Option<Rgb>) -> String {
    color.map(|c| c.to_string()).unwrap_or_else(|| "none".to_string())
}

fn element(shape: &Shape) -> String {
    match shape {
        Shape::Rect {
            origin,
            width,
            height,
            fill,
            stroke,
        } => format!(
            r#"<rect x="{:.2}" y="{:.2}" width="{:.2}" height="{:.2}" fill="{}" stroke="{}"/>"#,
            origin.x,
            origin.y,
            width,
            height,
            color_or_none(*fill),
            color_or_none(*stroke),
        ),
        Shape::Line {
            points,
            color,
            width,
        } => format!(
            r#"<polyline points="{}" fill="none" stroke="{}" stroke-width="{}"/>"#,
            points_attr(points),
            color,
            width
        ),
        Shape::Polygon {
            points,
            fill,
            stroke,
        } => format!(
            r#"<polygon points="{}" fill="{}" stroke="{}"/>"#,
            points_attr(points),
            fill,
            color_or_none(*stroke),
        ),
        Shape::Circle {
            center,
            radius,
            fill,
        } => format!(
            r#"<circle cx="{:.2}" cy="{:.2}" r="{}" fill="{}"/>"#,
            center.x, center.y, radius, fill
        ),
        Shape::Text {
            position,
            text,
            size,
            color,
            anchor,
            rotation,
        } => {
            let anchor = match anchor {
                Anchor::Start => "start",
                Anchor::Middle => "middle",
                Anchor::End => "end",
            };
            let transform = if *rotation == 0.0 {
                String::new()
            } else {
                // SVG 的 y 軸朝下，逆時針角度要取負號
                format!(
                    r#" transform="rotate({} {:.2} {:.2})""#,
                    -rotation, position.x, position.y
                )
            };
            format!(
                r#"<text x="{:.2}" y="{:.2}" font-size="{}" fill="{}" text-anchor="{}"{}>{}</text>"#,
                position.x,
                position.y,
                size,
                color,
                anchor,
                transform,
                escape(text)
            )
        }
    }
}

/// Serializes a scene as a standalone SVG document.
pub fn to_svg(scene: &Scene) -> String {
    let mut lines = Vec::with_capacity(scene.shapes.len() + 3);
    lines.push(format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}" font-family="{font}">"#,
        w = scene.width,
        h = scene.height,
        font = FONT_FAMILY,
    ));
    lines.push(format!(
        r#"<rect x="0" y="0" width="{}" height="{}" fill="{}"/>"#,
        scene.width, scene.height, scene.background
    ));
    lines.extend(scene.shapes.iter().map(element));
    lines.push("</svg>".to_string());

    let mut svg = lines.join("\n");
    svg.push('\n');
    svg
}
