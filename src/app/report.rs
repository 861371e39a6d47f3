//! A4 score report for one term.

use crate::core::stats::{summarize, TermSummary};
use crate::domain::model::{format_score, ScoreEntry};
use crate::render::font::PdfFont;
use crate::render::pdf::{PdfWriter, A4_HEIGHT, A4_WIDTH};
use crate::render::scene::{Anchor, Rgb};
use crate::utils::error::Result;
use chrono::NaiveDateTime;

pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

const MARGIN: f64 = 50.0;
const ROW_HEIGHT: f64 = 24.0;
const COLUMN_WIDTHS: [f64; 4] = [140.0, 80.0, 80.0, 90.0];
const HEADERS: [&str; 4] = ["Subject", "Score", "Full mark", "Level"];
const HEADER_FILL: Rgb = Rgb(0x4C, 0x72, 0xB0);
const HEADER_TEXT: Rgb = Rgb(0xF5, 0xF5, 0xF5);
const BODY_FILL: Rgb = Rgb(0xF3, 0xF6, 0xFA);
const FAILING_FILL: Rgb = Rgb(0xF8, 0xD7, 0xDA);
const FAILING_TEXT: Rgb = Rgb(0x9B, 0x1C, 0x1C);

pub fn report_title(term: &str) -> String {
    format!("{} score report", term)
}

fn table_row(writer: &mut PdfWriter, top: f64, cells: &[String; 4], fill: Rgb, text: Rgb, size: f64) {
    let mut left = MARGIN;
    for (cell, width) in cells.iter().zip(COLUMN_WIDTHS) {
        writer.rect(left, top, width, ROW_HEIGHT, Some(fill), Some(Rgb::GREY));
        writer.text(
            left + width / 2.0,
            top + ROW_HEIGHT / 2.0 + size * 0.35,
            cell,
            size,
            text,
            Anchor::Middle,
            0.0,
        );
        left += width;
    }
}

fn header_row(writer: &mut PdfWriter, top: f64) {
    let cells = HEADERS.map(str::to_string);
    table_row(writer, top, &cells, HEADER_FILL, HEADER_TEXT, 12.0);
}

/// What a report shows. A term without scores still gets a report with an
/// empty table and no summary line.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportContent {
    pub term: String,
    pub grade: String,
    pub entries: Vec<ScoreEntry>,
    pub summary: Option<TermSummary>,
}

impl ReportContent {
    pub fn new(term: impl Into<String>, grade: impl Into<String>, entries: Vec<ScoreEntry>) -> Self {
        let scores: Vec<f64> = entries.iter().map(|e| e.score).collect();
        Self {
            term: term.into(),
            grade: grade.into(),
            summary: summarize(&scores),
            entries,
        }
    }
}

/// Title, metadata lines and the score table; the table continues on new
/// pages (with the header repeated) when it runs past the bottom margin.
pub fn render_report(
    content: &ReportContent,
    generated_at: NaiveDateTime,
    font: PdfFont,
) -> Result<Vec<u8>> {
    let title = report_title(&content.term);
    let mut writer = PdfWriter::new(font, A4_WIDTH, A4_HEIGHT).with_title(title.as_str());

    writer.text(MARGIN, MARGIN, &title, 16.0, Rgb::BLACK, Anchor::Start, 0.0);

    let mut metadata = vec![
        format!("Grade: {}", content.grade),
        format!("Generated: {}", generated_at.format(TIMESTAMP_FORMAT)),
    ];
    if let Some(summary) = &content.summary {
        metadata.push(format!(
            "Average: {:.1}   Highest: {}   Lowest: {}   Subjects: {}",
            summary.average,
            format_score(summary.highest),
            format_score(summary.lowest),
            summary.subject_count
        ));
    }
    let mut y = 100.0;
    for line in &metadata {
        writer.text(MARGIN, y, line, 12.0, Rgb::BLACK, Anchor::Start, 0.0);
        y += 30.0;
    }

    let mut top = y + 20.0;
    header_row(&mut writer, top);
    top += ROW_HEIGHT;

    for entry in &content.entries {
        if top + ROW_HEIGHT > A4_HEIGHT - MARGIN {
            writer.add_page(A4_WIDTH, A4_HEIGHT);
            top = MARGIN;
            header_row(&mut writer, top);
            top += ROW_HEIGHT;
        }

        let cells = [
            entry.subject.clone(),
            format_score(entry.score),
            entry.full_mark.to_string(),
            entry.level.label().to_string(),
        ];
        let (fill, text) = if entry.is_failing() {
            (FAILING_FILL, FAILING_TEXT)
        } else {
            (BODY_FILL, Rgb::BLACK)
        };
        table_row(&mut writer, top, &cells, fill, text, 11.0);
        top += ROW_HEIGHT;
    }

    tracing::debug!(
        "Rendered report for '{}' with {} rows",
        content.term,
        content.entries.len()
    );
    writer.finish()
}
