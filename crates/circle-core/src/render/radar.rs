//! Geometry for the category radar chart.
//!
//! The chart is drawn as SVG in a square viewbox. Axes start at twelve
//! o'clock and run counter-clockwise, one per category score, each scaled to
//! [`MAX_SCORE`].

use std::f64::consts::PI;

use serde::Serialize;

use crate::types::{short_name_for_label, Category, CategoryScore};

pub const MAX_SCORE: f64 = 100.0;
pub const SPLIT_RINGS: usize = 4;
/// Fills of the split areas from the center outwards, repeating.
pub const RING_FILLS: [&str; 2] = ["#fff", "#f5f5f5"];
pub const SPLIT_LINE: &str = "#ccc";
pub const AXIS_LINE: &str = "#bbb";
pub const SERIES_LINE: &str = "#333";
pub const SERIES_AREA: &str = "rgba(100, 100, 100, 0.2)";
pub const TOOLTIP_TITLE: &str = "各类设施评分";

/// Chart radius as a share of half the viewbox.
const RADIUS_RATIO: f64 = 0.6;
/// Label distance as a multiple of the chart radius.
const LABEL_OFFSET: f64 = 1.15;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RadarAxis {
    pub label: String,
    pub score: f64,
    /// Outer end of the axis line.
    pub end: (f64, f64),
    pub label_at: (f64, f64),
    /// SVG `text-anchor` for the label.
    pub anchor: &'static str,
    /// Data point for this axis.
    pub point: (f64, f64),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RadarRing {
    pub points: String,
    pub fill: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RadarChart {
    pub size: f64,
    pub center: (f64, f64),
    pub radius: f64,
    /// Outermost first, so inner rings paint over outer ones.
    pub rings: Vec<RadarRing>,
    pub axes: Vec<RadarAxis>,
    pub series: String,
    pub tooltip: Vec<String>,
}

fn polar(center: (f64, f64), radius: f64, angle: f64) -> (f64, f64) {
    (center.0 + radius * angle.cos(), center.1 - radius * angle.sin())
}

fn axis_angle(i: usize, n: usize) -> f64 {
    PI / 2.0 + 2.0 * PI * i as f64 / n as f64
}

fn points_attr(points: impl IntoIterator<Item = (f64, f64)>) -> String {
    points
        .into_iter()
        .map(|(x, y)| format!("{x:.2},{y:.2}"))
        .collect::<Vec<_>>()
        .join(" ")
}

fn anchor_for(angle: f64) -> &'static str {
    let c = angle.cos();
    if c.abs() < 0.1 {
        "middle"
    } else if c > 0.0 {
        "start"
    } else {
        "end"
    }
}

/// Lay out the chart in a `size`-wide square. No scores, no chart.
pub fn radar_chart(scores: &[CategoryScore], size: f64) -> Option<RadarChart> {
    if scores.is_empty() {
        return None;
    }
    let n = scores.len();
    let center = (size / 2.0, size / 2.0);
    let radius = size / 2.0 * RADIUS_RATIO;

    let rings = (1..=SPLIT_RINGS)
        .rev()
        .map(|k| {
            let r = radius * k as f64 / SPLIT_RINGS as f64;
            RadarRing {
                points: points_attr((0..n).map(|i| polar(center, r, axis_angle(i, n)))),
                fill: RING_FILLS[(k - 1) % RING_FILLS.len()],
            }
        })
        .collect();

    let axes: Vec<RadarAxis> = scores
        .iter()
        .enumerate()
        .map(|(i, cs)| {
            let angle = axis_angle(i, n);
            let score = if cs.score.is_finite() { cs.score } else { 0.0 };
            let ratio = score.clamp(0.0, MAX_SCORE) / MAX_SCORE;
            RadarAxis {
                label: cs
                    .category()
                    .map(Category::short_name)
                    .unwrap_or_else(|| short_name_for_label(&cs.name))
                    .to_string(),
                score,
                end: polar(center, radius, angle),
                label_at: polar(center, radius * LABEL_OFFSET, angle),
                anchor: anchor_for(angle),
                point: polar(center, radius * ratio, angle),
            }
        })
        .collect();

    let series = points_attr(axes.iter().map(|a| a.point));
    let tooltip = scores
        .iter()
        .zip(&axes)
        .map(|(cs, a)| format!("{}: {:.0}分", cs.name, a.score))
        .collect();

    Some(RadarChart {
        size,
        center,
        radius,
        rings,
        axes,
        series,
        tooltip,
    })
}
