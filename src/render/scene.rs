//! Backend-neutral drawing primitives. Coordinates are pixels with the origin
//! at the top-left corner; each output backend maps them to its own space.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub const WHITE: Rgb = Rgb(0xFF, 0xFF, 0xFF);
    pub const BLACK: Rgb = Rgb(0x00, 0x00, 0x00);
    pub const GREY: Rgb = Rgb(0x80, 0x80, 0x80);
    pub const LIGHT_GREY: Rgb = Rgb(0xDD, 0xDD, 0xDD);

    /// Parses `#RRGGBB`.
    pub fn from_hex(hex: &str) -> Option<Rgb> {
        let digits = hex.strip_prefix('#')?;
        if digits.len() != 6 {
            return None;
        }
        let channel = |i: usize| u8::from_str_radix(digits.get(i..i + 2)?, 16).ok();
        Some(Rgb(channel(0)?, channel(2)?, channel(4)?))
    }

    /// Channels scaled to 0.0..=1.0, as PDF colour operators expect.
    pub fn unit(self) -> (f64, f64, f64) {
        (
            f64::from(self.0) / 255.0,
            f64::from(self.1) / 255.0,
            f64::from(self.2) / 255.0,
        )
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02X}{:02X}{:02X}", self.0, self.1, self.2)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Anchor {
    Start,
    Middle,
    End,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    Rect {
        origin: Point,
        width: f64,
        height: f64,
        fill: Option<Rgb>,
        stroke: Option<Rgb>,
    },
    Line {
        points: Vec<Point>,
        color: Rgb,
        width: f64,
    },
    Polygon {
        points: Vec<Point>,
        fill: Rgb,
        stroke: Option<Rgb>,
    },
    Circle {
        center: Point,
        radius: f64,
        fill: Rgb,
    },
    Text {
        position: Point,
        text: String,
        size: f64,
        color: Rgb,
        anchor: Anchor,
        /// Degrees, counter-clockwise.
        rotation: f64,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Scene {
    pub width: f64,
    pub height: f64,
    pub background: Rgb,
    pub shapes: Vec<Shape>,
}

impl Scene {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            background: Rgb::WHITE,
            shapes: Vec::new(),
        }
    }

    pub fn push(&mut self, shape: Shape) {
        self.shapes.push(shape);
    }

    pub fn filled_rect(&mut self, x: f64, y: f64, width: f64, height: f64, fill: Rgb) {
        self.push(Shape::Rect {
            origin: Point::new(x, y),
            width,
            height,
            fill: Some(fill),
            stroke: None,
        });
    }

    pub fn line(&mut self, points: Vec<Point>, color: Rgb, width: f64) {
        self.push(Shape::Line {
            points,
            color,
            width,
        });
    }

    pub fn text(&mut self, x: f64, y: f64, text: impl Into<String>, size: f64, anchor: Anchor) {
        self.push(Shape::Text {
            position: Point::new(x, y),
            text: text.into(),
            size,
            color: Rgb::BLACK,
            anchor,
            rotation: 0.0,
        });
    }

    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.shapes.iter().filter_map(|shape| match shape {
            Shape::Text { text, .. } => Some(text.as_str()),
            _ => None,
        })
    }
}
