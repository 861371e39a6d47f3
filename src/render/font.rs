//! Fonts for PDF output: the built-in Helvetica, or a TrueType file from disk
//! embedded as a CID font so that CJK subject names render.

use crate::utils::error::{Result, ScoreError};
use lopdf::{dictionary, Document, Object, ObjectId, Stream, StringFormat};
use std::collections::BTreeMap;
use std::path::Path;

pub const FONT_RESOURCE: &str = "F1";

#[derive(Debug, Clone)]
pub enum PdfFont {
    Helvetica,
    TrueType(TrueTypeFont),
}

#[derive(Debug, Clone)]
pub struct TrueTypeFont {
    name: String,
    data: Vec<u8>,
    units_per_em: f64,
    ascender: i64,
    descender: i64,
    cap_height: i64,
    bbox: [i64; 4],
    /// Glyphs drawn so far with their advance (1/1000 em) and source char.
    used: BTreeMap<u16, (i64, char)>,
}

impl PdfFont {
    /// Helvetica when no path is configured; a configured path must exist.
    pub fn load(font_path: Option<&str>) -> Result<Self> {
        match font_path {
            None => Ok(PdfFont::Helvetica),
            Some(path) => {
                if !Path::new(path).is_file() {
                    return Err(ScoreError::FontError {
                        message: format!("font file not found: {}", path),
                    });
                }
                let data = std::fs::read(path)?;
                let name = Path::new(path)
                    .file_stem()
                    .and_then(|s| s.to_str())
                    .unwrap_or("EmbeddedFont");
                Ok(PdfFont::TrueType(TrueTypeFont::parse(name, data)?))
            }
        }
    }

    /// Encodes `text` as a string operand for `Tj`.
    pub fn encode(&mut self, text: &str) -> Object {
        match self {
            PdfFont::Helvetica => {
                let bytes = text
                    .chars()
                    .map(|c| if (c as u32) < 0x100 { c as u8 } else { b'?' })
                    .collect();
                Object::String(bytes, StringFormat::Literal)
            }
            PdfFont::TrueType(font) => font.encode(text),
        }
    }

    pub fn text_width(&self, text: &str, size: f64) -> f64 {
        match self {
            PdfFont::Helvetica => {
                text.chars().map(helvetica_advance).sum::<f64>() * size / 1000.0
            }
            PdfFont::TrueType(font) => font.text_width(text, size),
        }
    }

    /// Adds the font objects to `doc` and returns the font dictionary id.
    pub fn add_to_document(&self, doc: &mut Document) -> ObjectId {
        match self {
            PdfFont::Helvetica => doc.add_object(dictionary! {
                "Type" => "Font",
                "Subtype" => "Type1",
                "BaseFont" => "Helvetica",
                "Encoding" => "WinAnsiEncoding",
            }),
            PdfFont::TrueType(font) => font.add_to_document(doc),
        }
    }
}

/// Approximate Helvetica advance widths in 1/1000 em.
fn helvetica_advance(c: char) -> f64 {
    match c {
        ' ' | '.' | ',' | ':' | ';' | '!' | '|' | 'i' | 'j' | 'l' | '\'' => 278.0,
        'f' | 'r' | 't' | 'I' | '/' | '(' | ')' | '[' | ']' | '-' => 333.0,
        '0'..='9' | 'a' | 'b' | 'd' | 'e' | 'g' | 'h' | 'n' | 'o' | 'p' | 'q' | 'u' => 556.0,
        'c' | 'k' | 's' | 'v' | 'x' | 'y' | 'z' | 'J' => 500.0,
        'm' | 'M' => 833.0,
        'w' | '%' => 889.0,
        'W' => 944.0,
        'A'..='Z' => 667.0,
        _ => 556.0,
    }
}

impl TrueTypeFont {
    pub fn parse(name: &str, data: Vec<u8>) -> Result<Self> {
        let face = ttf_parser::Face::parse(&data, 0).map_err(|e| ScoreError::FontError {
            message: format!("cannot parse {}: {}", name, e),
        })?;

        let units_per_em = f64::from(face.units_per_em());
        let scale = |v: i16| (f64::from(v) * 1000.0 / units_per_em).round() as i64;
        let rect = face.global_bounding_box();
        let ascender = scale(face.ascender());
        let descender = scale(face.descender());
        let cap_height = face.capital_height().map(scale).unwrap_or(ascender);
        let bbox = [
            scale(rect.x_min),
            scale(rect.y_min),
            scale(rect.x_max),
            scale(rect.y_max),
        ];

        // PDF 名稱不可含空白或分隔符
        let name: String = name.chars().filter(|c| c.is_ascii_alphanumeric()).collect();

        Ok(Self {
            name: if name.is_empty() {
                "EmbeddedFont".to_string()
            } else {
                name
            },
            data,
            units_per_em,
            ascender,
            descender,
            cap_height,
            bbox,
            used: BTreeMap::new(),
        })
    }

    fn face(&self) -> Option<ttf_parser::Face<'_>> {
        ttf_parser::Face::parse(&self.data, 0).ok()
    }

    fn advance(&self, face: &ttf_parser::Face<'_>, glyph: ttf_parser::GlyphId) -> i64 {
        face.glyph_hor_advance(glyph)
            .map(|a| (f64::from(a) * 1000.0 / self.units_per_em).round() as i64)
            .unwrap_or(0)
    }

    fn encode(&mut self, text: &str) -> Object {
        let mut bytes = Vec::with_capacity(text.len() * 2);
        let mut glyphs = Vec::new();
        if let Some(face) = self.face() {
            for c in text.chars() {
                let glyph = face.glyph_index(c).unwrap_or(ttf_parser::GlyphId(0));
                glyphs.push((glyph.0, self.advance(&face, glyph), c));
            }
        }
        for (glyph, advance, c) in glyphs {
            bytes.extend_from_slice(&glyph.to_be_bytes());
            self.used.entry(glyph).or_insert((advance, c));
        }
        Object::String(bytes, StringFormat::Hexadecimal)
    }

    fn text_width(&self, text: &str, size: f64) -> f64 {
        let Some(face) = self.face() else {
            return 0.0;
        };
        let units: i64 = text
            .chars()
            .map(|c| self.advance(&face, face.glyph_index(c).unwrap_or(ttf_parser::GlyphId(0))))
            .sum();
        units as f64 * size / 1000.0
    }

    fn to_unicode_cmap(&self) -> String {
        let mut cmap = String::from(
            "/CIDInit /ProcSet findresource begin\n12 dict begin\nbegincmap\n\
             /CIDSystemInfo << /Registry (Adobe) /Ordering (UCS) /Supplement 0 >> def\n\
             /CMapName /Adobe-Identity-UCS def\n/CMapType 2 def\n\
             1 begincodespacerange\n<0000> <FFFF>\nendcodespacerange\n",
        );
        let entries: Vec<(&u16, &(i64, char))> = self.used.iter().collect();
        // bfchar 區塊每段最多 100 筆
        for chunk in entries.chunks(100) {
            cmap.push_str(&format!("{} beginbfchar\n", chunk.len()));
            for (glyph, (_, c)) in chunk {
                let mut units = [0u16; 2];
                let utf16: String = c
                    .encode_utf16(&mut units)
                    .iter()
                    .map(|u| format!("{:04X}", u))
                    .collect();
                cmap.push_str(&format!("<{:04X}> <{}>\n", glyph, utf16));
            }
            cmap.push_str("endbfchar\n");
        }
        cmap.push_str("endcmap\nCMapName currentdict /CMap defineresource pop\nend\nend\n");
        cmap
    }

    fn add_to_document(&self, doc: &mut Document) -> ObjectId {
        let base_font = Object::Name(self.name.as_bytes().to_vec());

        let file_id = doc.add_object(Stream::new(
            dictionary! { "Length1" => self.data.len() as i64 },
            self.data.clone(),
        ));
        let descriptor_id = doc.add_object(dictionary! {
            "Type" => "FontDescriptor",
            "FontName" => base_font.clone(),
            "Flags" => 32,
            "FontBBox" => self.bbox.iter().map(|v| Object::Integer(*v)).collect::<Vec<_>>(),
            "ItalicAngle" => 0,
            "Ascent" => self.ascender,
            "Descent" => self.descender,
            "CapHeight" => self.cap_height,
            "StemV" => 80,
            "FontFile2" => file_id,
        });

        let mut widths = Vec::with_capacity(self.used.len() * 2);
        for (glyph, (advance, _)) in &self.used {
            widths.push(Object::Integer(i64::from(*glyph)));
            widths.push(Object::Array(vec![Object::Integer(*advance)]));
        }

        let cid_font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "CIDFontType2",
            "BaseFont" => base_font.clone(),
            "CIDSystemInfo" => dictionary! {
                "Registry" => Object::string_literal("Adobe"),
                "Ordering" => Object::string_literal("Identity"),
                "Supplement" => 0,
            },
            "FontDescriptor" => descriptor_id,
            "CIDToGIDMap" => "Identity",
            "DW" => 1000,
            "W" => widths,
        });
        let to_unicode_id = doc.add_object(Stream::new(
            dictionary! {},
            self.to_unicode_cmap().into_bytes(),
        ));

        doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type0",
            "BaseFont" => base_font,
            "Encoding" => "Identity-H",
            "DescendantFonts" => vec![Object::Reference(cid_font_id)],
            "ToUnicode" => to_unicode_id,
        })
    }
}
