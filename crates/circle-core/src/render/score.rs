use serde::Serialize;

use crate::types::{AnalysisResult, CategoryScore, Grade, FALLBACK_COLOR, FALLBACK_ICON};

/// Shown instead of a total score the backend did not send.
pub const MISSING_SCORE: &str = "—";
pub const MISSING_GRADE: &str = "-";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreBar {
    pub icon: &'static str,
    pub color: &'static str,
    pub name: String,
    /// Bar width in percent, 0 to 100.
    pub width: f64,
    pub label: String,
    pub poi_count: u32,
}

impl ScoreBar {
    pub fn from_score(cs: &CategoryScore) -> Self {
        let category = cs.category();
        Self {
            icon: category.map_or(FALLBACK_ICON, |c| c.icon()),
            color: category.map_or(FALLBACK_COLOR, |c| c.color()),
            name: cs.name.clone(),
            width: if cs.score.is_finite() {
                cs.score.clamp(0.0, 100.0)
            } else {
                0.0
            },
            label: format!("{:.0}", cs.score),
            poi_count: cs.poi_count,
        }
    }

    pub fn style(&self) -> String {
        format!("width: {}%; background: {};", self.width, self.color)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreView {
    pub total: String,
    pub grade: String,
    pub grade_class: String,
    pub summary: String,
    pub bars: Vec<ScoreBar>,
    pub suggestions: Vec<String>,
}

pub fn format_total(total: Option<f64>) -> String {
    match total {
        Some(t) if t.is_finite() => format!("{t:.1}"),
        _ => MISSING_SCORE.to_string(),
    }
}

/// `grade-badge grade-B`; unknown grades keep only the base class.
pub fn grade_class(grade: Option<&str>) -> String {
    match grade.map(str::trim).filter(|g| !g.is_empty()) {
        Some(g) => format!("grade-badge grade-{g}"),
        None => "grade-badge".to_string(),
    }
}

impl ScoreView {
    pub fn from_result(result: &AnalysisResult) -> Self {
        let summary = if result.summary.trim().is_empty() {
            result
                .grade()
                .map(Grade::description)
                .unwrap_or_default()
                .to_string()
        } else {
            result.summary.clone()
        };
        Self {
            total: format_total(result.total_score),
            grade: result
                .grade
                .as_deref()
                .map(str::trim)
                .filter(|g| !g.is_empty())
                .unwrap_or(MISSING_GRADE)
                .to_string(),
            grade_class: grade_class(result.grade.as_deref()),
            summary,
            bars: result.category_scores.iter().map(ScoreBar::from_score).collect(),
            suggestions: result.suggestions.clone(),
        }
    }
}
