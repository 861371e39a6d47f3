//! Chart layout: turns analyses into [`Scene`]s.

use crate::core::grading::LevelDistribution;
use crate::core::stats::{TermAnalysis, TrendAnalysis};
use crate::domain::model::{format_score, Level};
use crate::render::scene::{Anchor, Point, Rgb, Scene, Shape};

const BAR_COLOR: Rgb = Rgb(0x4C, 0x72, 0xB0);
const LEVEL_COLORS: [Rgb; 4] = [
    Rgb(0x55, 0xA8, 0x68),
    Rgb(0x4C, 0x72, 0xB0),
    Rgb(0xC4, 0x4E, 0x52),
    Rgb(0x81, 0x72, 0xB2),
];
const SERIES_COLORS: [Rgb; 10] = [
    Rgb(0x4C, 0x72, 0xB0),
    Rgb(0xDD, 0x84, 0x52),
    Rgb(0x55, 0xA8, 0x68),
    Rgb(0xC4, 0x4E, 0x52),
    Rgb(0x81, 0x72, 0xB2),
    Rgb(0x93, 0x78, 0x60),
    Rgb(0xDA, 0x8B, 0xC3),
    Rgb(0x8C, 0x8C, 0x8C),
    Rgb(0xCC, 0xB9, 0x74),
    Rgb(0x64, 0xB5, 0xCD),
];
const Y_TICKS: usize = 5;
// 圓弧以折線近似，每段不超過 2 度
const ARC_STEP_DEG: f64 = 2.0;

pub fn level_color(level: Level) -> Rgb {
    LEVEL_COLORS[level.index()]
}

/// Vertical value axis of a plot area.
#[derive(Debug, Clone, Copy)]
struct ValueAxis {
    top: f64,
    bottom: f64,
    max: f64,
}

impl ValueAxis {
    fn y(&self, value: f64) -> f64 {
        if self.max <= 0.0 {
            return self.bottom;
        }
        self.bottom - (value / self.max).clamp(0.0, 1.0) * (self.bottom - self.top)
    }

    fn draw(&self, scene: &mut Scene, left: f64, right: f64) {
        for i in 0..=Y_TICKS {
            let value = self.max * i as f64 / Y_TICKS as f64;
            let y = self.y(value);
            if i > 0 {
                scene.line(
                    vec![Point::new(left, y), Point::new(right, y)],
                    Rgb::LIGHT_GREY,
                    0.5,
                );
            }
            scene.text(left - 6.0, y + 4.0, format!("{:.0}", value), 10.0, Anchor::End);
        }
        scene.line(
            vec![Point::new(left, self.top), Point::new(left, self.bottom)],
            Rgb::BLACK,
            1.0,
        );
        scene.line(
            vec![Point::new(left, self.bottom), Point::new(right, self.bottom)],
            Rgb::BLACK,
            1.0,
        );
    }
}

fn rotated_label(scene: &mut Scene, x: f64, y: f64, text: &str, size: f64, rotation: f64) {
    scene.push(Shape::Text {
        position: Point::new(x, y),
        text: text.to_string(),
        size,
        color: Rgb::BLACK,
        anchor: if rotation == 0.0 { Anchor::Middle } else { Anchor::End },
        rotation,
    });
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PieSlice {
    pub level: Level,
    /// Degrees counter-clockwise from the positive x axis.
    pub start: f64,
    pub sweep: f64,
    pub percentage: f64,
}

/// Slices for the non-empty levels, starting at 12 o'clock and running
/// counter-clockwise in level order.
pub fn pie_slices(distribution: &LevelDistribution) -> Vec<PieSlice> {
    let mut start = 90.0;
    distribution
        .iter()
        .filter(|(_, count)| *count > 0)
        .map(|(level, _)| {
            let percentage = distribution.percentage(level);
            let slice = PieSlice {
                level,
                start,
                sweep: percentage * 3.6,
                percentage,
            };
            start += slice.sweep;
            slice
        })
        .collect()
}

fn polar(center: Point, radius: f64, degrees: f64) -> Point {
    let radians = degrees.to_radians();
    Point::new(
        center.x + radius * radians.cos(),
        center.y - radius * radians.sin(),
    )
}

fn sector_points(center: Point, radius: f64, start: f64, sweep: f64) -> Vec<Point> {
    let steps = (sweep / ARC_STEP_DEG).ceil().max(1.0) as usize;
    let mut points = Vec::with_capacity(steps + 2);
    if sweep < 360.0 {
        points.push(center);
    }
    for i in 0..=steps {
        points.push(polar(center, radius, start + sweep * i as f64 / steps as f64));
    }
    points
}

/// Bar chart of one term, a statistics block and the level pie.
pub fn term_chart(analysis: &TermAnalysis, width: u32, height: u32) -> Scene {
    let (w, h) = (f64::from(width), f64::from(height));
    let mut scene = Scene::new(w, h);

    let left = 60.0;
    let right = w * 0.42;
    let axis = ValueAxis {
        top: 60.0,
        bottom: h - 70.0,
        max: analysis.axis_max,
    };

    scene.text(
        (left + right) / 2.0,
        32.0,
        format!("{} score analysis", analysis.term),
        16.0,
        Anchor::Middle,
    );
    axis.draw(&mut scene, left, right);

    let count = analysis.entries.len().max(1) as f64;
    let slot = (right - left) / count;
    let label_rotation = if analysis.entries.len() > 5 { 30.0 } else { 0.0 };
    for (i, entry) in analysis.entries.iter().enumerate() {
        let x = left + slot * i as f64 + slot * 0.2;
        let top = axis.y(entry.score);
        let center = x + slot * 0.3;
        scene.filled_rect(x, top, slot * 0.6, axis.bottom - top, BAR_COLOR);
        scene.text(center, top - 4.0, format_score(entry.score), 10.0, Anchor::Middle);
        rotated_label(
            &mut scene,
            center,
            axis.bottom + 16.0,
            &entry.subject,
            11.0,
            label_rotation,
        );
    }

    let summary = &analysis.summary;
    let stats = [
        "Statistics".to_string(),
        format!("Average: {:.1}", summary.average),
        format!("Highest: {}", format_score(summary.highest)),
        format!("Lowest: {}", format_score(summary.lowest)),
        format!("Subjects: {}", summary.subject_count),
    ];
    let stats_top = h / 2.0 - 40.0;
    for (i, line) in stats.iter().enumerate() {
        scene.text(right + 24.0, stats_top + 20.0 * i as f64, line.as_str(), 12.0, Anchor::Start);
    }

    let center = Point::new(w * 0.78, h * 0.53);
    let radius = (w * 0.17).min(h * 0.33);
    scene.text(center.x, 32.0, "Level distribution", 16.0, Anchor::Middle);
    for slice in pie_slices(&analysis.distribution) {
        scene.push(Shape::Polygon {
            points: sector_points(center, radius, slice.start, slice.sweep),
            fill: level_color(slice.level),
            stroke: Some(Rgb::WHITE),
        });
        let middle = slice.start + slice.sweep / 2.0;
        let outer = polar(center, radius * 1.15, middle);
        let inner = polar(center, radius * 0.6, middle);
        let anchor = if outer.x < center.x - 1.0 {
            Anchor::End
        } else if outer.x > center.x + 1.0 {
            Anchor::Start
        } else {
            Anchor::Middle
        };
        scene.text(outer.x, outer.y + 4.0, slice.level.label(), 12.0, anchor);
        scene.push(Shape::Text {
            position: Point::new(inner.x, inner.y + 4.0),
            text: format!("{:.1}%", slice.percentage),
            size: 11.0,
            color: Rgb::WHITE,
            anchor: Anchor::Middle,
            rotation: 0.0,
        });
    }

    scene
}

/// One line per subject across the term axis, with a legend on the right.
pub fn trend_chart(trend: &TrendAnalysis, width: u32, height: u32) -> Scene {
    let (w, h) = (f64::from(width), f64::from(height));
    let mut scene = Scene::new(w, h);

    let left = 70.0;
    let right = w - 170.0;
    let axis = ValueAxis {
        top: 50.0,
        bottom: h - 100.0,
        max: trend.axis_max,
    };

    scene.text((left + right) / 2.0, 30.0, "Subject score trend", 16.0, Anchor::Middle);
    scene.push(Shape::Text {
        position: Point::new(22.0, (axis.top + axis.bottom) / 2.0),
        text: "Score".to_string(),
        size: 12.0,
        color: Rgb::BLACK,
        anchor: Anchor::Middle,
        rotation: 90.0,
    });
    axis.draw(&mut scene, left, right);

    let padding = 30.0;
    let term_x = |index: usize| -> f64 {
        if trend.terms.len() <= 1 {
            (left + right) / 2.0
        } else {
            left + padding
                + (right - left - 2.0 * padding) * index as f64 / (trend.terms.len() - 1) as f64
        }
    };
    for (i, term) in trend.terms.iter().enumerate() {
        rotated_label(&mut scene, term_x(i), axis.bottom + 14.0, term, 10.0, 45.0);
    }

    for (i, series) in trend.series.iter().enumerate() {
        let color = SERIES_COLORS[i % SERIES_COLORS.len()];
        let points: Vec<Point> = series
            .points
            .iter()
            .filter_map(|p| {
                let index = trend.terms.iter().position(|t| *t == p.term)?;
                Some(Point::new(term_x(index), axis.y(p.score)))
            })
            .collect();

        if points.len() > 1 {
            scene.line(points.clone(), color, 2.0);
        }
        for point in points {
            scene.push(Shape::Circle {
                center: point,
                radius: 4.0,
                fill: color,
            });
        }

        let legend_y = axis.top + 10.0 + 20.0 * i as f64;
        scene.line(
            vec![
                Point::new(right + 20.0, legend_y),
                Point::new(right + 44.0, legend_y),
            ],
            color,
            2.0,
        );
        scene.text(right + 50.0, legend_y + 4.0, series.subject.as_str(), 11.0, Anchor::Start);
    }

    scene
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::grading::GradeThresholds;
    use crate::core::stats::{analyze_term, TrendPoint, TrendSeries};
    use crate::domain::model::Term;

    fn analysis() -> TermAnalysis {
        let mut term = Term::new("Grade 7");
        for (subject, score) in [("Chinese", 95.0), ("Math", 85.0), ("English", 56.0), ("PE", 92.0)] {
            term.scores.insert(subject.to_string(), score);
            term.subjects.push(subject.to_string());
        }
        analyze_term("2024-2025 Term 1", &term, |_| 100, &GradeThresholds::default()).unwrap()
    }

    #[test]
    fn test_pie_slices_cover_full_circle() {
        let slices = pie_slices(&analysis().distribution);
        // Passing 沒有成績，不畫扇形
        assert_eq!(slices.len(), 3);
        assert_eq!(slices[0].level, Level::Excellent);
        assert!((slices[0].percentage - 50.0).abs() < 1e-9);
        assert!((slices[0].start - 90.0).abs() < 1e-9);
        let total: f64 = slices.iter().map(|s| s.sweep).sum();
        assert!((total - 360.0).abs() < 1e-9);
        assert!((slices[1].start - 270.0).abs() < 1e-9);
    }

    #[test]
    fn test_term_chart_bars_scale_to_axis() {
        let analysis = analysis();
        let scene = term_chart(&analysis, 1000, 500);

        let bars: Vec<(f64, f64)> = scene
            .shapes
            .iter()
            .filter_map(|shape| match shape {
                Shape::Rect {
                    origin,
                    height,
                    fill: Some(fill),
                    ..
                } if *fill == BAR_COLOR => Some((origin.y, *height)),
                _ => None,
            })
            .collect();
        assert_eq!(bars.len(), 4);

        // 軸高 370，最大值 110；95 分的柱高應為 370 * 95 / 110
        let plot_height = 500.0 - 70.0 - 60.0;
        assert!((bars[0].1 - plot_height * 95.0 / 110.0).abs() < 1e-6);
        assert!(bars[0].1 > bars[1].1);
    }

    #[test]
    fn test_term_chart_labels() {
        let scene = term_chart(&analysis(), 1000, 500);
        let texts: Vec<&str> = scene.texts().collect();
        assert!(texts.contains(&"2024-2025 Term 1 score analysis"));
        assert!(texts.contains(&"Average: 82.0"));
        assert!(texts.contains(&"Highest: 95"));
        assert!(texts.contains(&"Lowest: 56"));
        assert!(texts.contains(&"Subjects: 4"));
        assert!(texts.contains(&"50.0%"));
        assert!(texts.contains(&"Failing"));
        assert!(!texts.contains(&"Passing"));
    }

    #[test]
    fn test_single_level_pie_is_closed_circle() {
        let mut term = Term::new("Grade 7");
        term.scores.insert("Math".to_string(), 99.0);
        term.subjects.push("Math".to_string());
        let analysis = analyze_term("T", &term, |_| 100, &GradeThresholds::default()).unwrap();
        let slices = pie_slices(&analysis.distribution);
        assert_eq!(slices.len(), 1);
        assert!((slices[0].sweep - 360.0).abs() < 1e-9);
    }

    #[test]
    fn test_trend_chart_draws_series_and_legend() {
        let trend = TrendAnalysis {
            terms: vec!["T1".to_string(), "T2".to_string(), "T3".to_string()],
            series: vec![
                TrendSeries {
                    subject: "Math".to_string(),
                    points: vec![
                        TrendPoint { term: "T1".to_string(), score: 80.0 },
                        TrendPoint { term: "T3".to_string(), score: 90.0 },
                    ],
                },
                TrendSeries {
                    subject: "English".to_string(),
                    points: vec![TrendPoint { term: "T2".to_string(), score: 70.0 }],
                },
            ],
            axis_max: 110.0,
        };

        let scene = trend_chart(&trend, 1000, 500);
        let circles = scene
            .shapes
            .iter()
            .filter(|s| matches!(s, Shape::Circle { .. }))
            .count();
        assert_eq!(circles, 3);

        let texts: Vec<&str> = scene.texts().collect();
        assert!(texts.contains(&"Math"));
        assert!(texts.contains(&"English"));
        assert!(texts.contains(&"T2"));
        assert!(texts.contains(&"Subject score trend"));
    }
}
