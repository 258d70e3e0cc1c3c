//! View-models derived from an analysis result.
//!
//! Each renderer turns part of an [`AnalysisResult`](crate::types::AnalysisResult)
//! into plain data (styles, coordinates, label text, popup markup) that the
//! viewer hands to the map bridge or to Yew components, and that the CLI
//! prints.

pub mod isochrone;
pub mod poi;
pub mod radar;
pub mod score;

use crate::types::LatLng;

pub const LOCATION_PLACEHOLDER: &str = "请在地图上点击选择位置";

/// `(longitude, latitude)` to six decimals for the location card.
pub fn location_lines(point: LatLng) -> (String, String) {
    (format!("{:.6}", point.lng), format!("{:.6}", point.lat))
}

/// Escape text for inclusion in HTML markup.
pub fn html_escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_html_escape() {
        assert_eq!(html_escape("a<b>&\"c'"), "a&lt;b&gt;&amp;&quot;c&#39;");
        assert_eq!(html_escape("社区医院"), "社区医院");
    }

    #[test]
    fn test_location_lines() {
        let (lng, lat) = location_lines(LatLng::new(30.2741, 120.1551));
        assert_eq!(lng, "120.155100");
        assert_eq!(lat, "30.274100");
    }
}
