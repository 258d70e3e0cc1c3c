use serde::Serialize;

use crate::color::adjust_color;
use crate::geo::{distance_m, walk_minutes};
use crate::render::html_escape;
use crate::state::CategoryFilter;
use crate::types::{subtype_label, Category, Feature, FeatureCollection, FeatureKind, LatLng};

pub const UNNAMED_POI: &str = "未命名设施";
pub const POPUP_MAX_WIDTH: u32 = 280;

/// Circle marker options shared by every POI.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkerStyle {
    pub radius: u32,
    pub color: &'static str,
    pub weight: u32,
    pub fill_opacity: f64,
}

pub const MARKER_STYLE: MarkerStyle = MarkerStyle {
    radius: 6,
    color: "#fff",
    weight: 2,
    fill_opacity: 0.8,
};

/// Distance and walk time from the selected point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct WalkInfo {
    pub meters: f64,
    pub minutes: f64,
}

impl WalkInfo {
    pub fn between(origin: LatLng, target: LatLng, walk_speed: f64) -> Self {
        let meters = distance_m(origin, target);
        Self {
            meters,
            minutes: walk_minutes(meters, walk_speed),
        }
    }

    /// `1234米`
    pub fn distance_text(&self) -> String {
        format!("{}米", self.meters.round() as i64)
    }

    /// `约12.3分钟`
    pub fn time_text(&self) -> String {
        format!("约{:.1}分钟", self.minutes)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PoiMarker {
    pub category: Category,
    pub lat: f64,
    pub lng: f64,
    pub fill_color: &'static str,
    pub name: String,
    pub sub_type: String,
    pub walk: Option<WalkInfo>,
    pub popup: String,
}

impl PoiMarker {
    fn from_feature(
        feature: &Feature,
        category: Category,
        at: LatLng,
        origin: Option<LatLng>,
        walk_speed: f64,
    ) -> Self {
        let props = &feature.properties;
        let name = props
            .name
            .as_deref()
            .filter(|n| !n.trim().is_empty())
            .unwrap_or(UNNAMED_POI)
            .to_string();
        let sub_type = subtype_label(props.sub_type.as_deref().unwrap_or_default()).to_string();
        let walk = origin.map(|o| WalkInfo::between(o, at, walk_speed));
        let popup = popup_html(category, &name, &sub_type, at, walk.as_ref());
        Self {
            category,
            lat: at.lat,
            lng: at.lng,
            fill_color: category.color(),
            name,
            sub_type,
            walk,
            popup,
        }
    }
}

/// Markers for every POI feature with a known, visible category and a point
/// geometry, in feature order.
pub fn poi_markers(
    pois: &FeatureCollection,
    filters: &CategoryFilter,
    origin: Option<LatLng>,
    walk_speed: f64,
) -> Vec<PoiMarker> {
    pois.features
        .iter()
        .filter(|f| f.properties.kind == FeatureKind::Poi)
        .filter_map(|f| {
            let category = f.properties.category.as_deref().and_then(Category::from_code)?;
            if !filters.is_visible(category) {
                return None;
            }
            let at = f.point()?;
            Some(PoiMarker::from_feature(f, category, at, origin, walk_speed))
        })
        .collect()
}

/// Popup card markup. `name` and `sub_type` are escaped here.
pub fn popup_html(
    category: Category,
    name: &str,
    sub_type: &str,
    at: LatLng,
    walk: Option<&WalkInfo>,
) -> String {
    let color = category.color();
    let distance = match walk {
        Some(w) => format!(
            "<div class=\"poi-distance\"><span class=\"distance-value\">{}</span><span class=\"walk-time\">🚶 {}</span></div>",
            w.distance_text(),
            w.time_text()
        ),
        None => String::new(),
    };
    format!(
        concat!(
            "<div class=\"poi-popup\">",
            "<div class=\"poi-popup-header\" style=\"background: linear-gradient(135deg, {color}, {dark});\">",
            "<h4><span class=\"poi-icon\">{icon}</span>{name}</h4>",
            "</div>",
            "<div class=\"poi-popup-body\">",
            "<span class=\"poi-category\" style=\"background: {color};\">{label}</span>",
            "<div class=\"poi-info\">",
            "<div class=\"poi-info-item\"><span class=\"label\">类型</span><span class=\"value\">{sub_type}</span></div>",
            "<div class=\"poi-info-item\"><span class=\"label\">坐标</span><span class=\"value\">{lng:.4}, {lat:.4}</span></div>",
            "</div>",
            "{distance}",
            "</div>",
            "</div>"
        ),
        color = color,
        dark = adjust_color(color, -20),
        icon = category.icon(),
        name = html_escape(name),
        label = category.label(),
        sub_type = html_escape(sub_type),
        lng = at.lng,
        lat = at.lat,
        distance = distance,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn pois() -> FeatureCollection {
        let mut unnamed = Feature::poi(LatLng::new(30.2745, 120.1560), "commerce", "", "convenience");
        unnamed.properties.name = None;
        let mut no_geometry = Feature::poi(LatLng::new(0.0, 0.0), "medical", "x", "hospital");
        no_geometry.geometry = None;
        FeatureCollection::new(vec![
            Feature::poi(LatLng::new(30.2750, 120.1560), "medical", "社区<医院>", "hospital"),
            unnamed,
            Feature::poi(LatLng::new(30.2760, 120.1570), "sports", "体育馆", "gym"),
            no_geometry,
            Feature::isochrone(5, vec![]),
        ])
    }

    #[test]
    fn test_markers_skip_unknown_and_hidden() {
        let mut filters = CategoryFilter::default();
        let markers = poi_markers(&pois(), &filters, None, 5.0);
        assert_eq!(markers.len(), 2);
        assert_eq!(markers[0].category, Category::Medical);
        assert_eq!(markers[1].name, UNNAMED_POI);
        assert_eq!(markers[1].sub_type, "便利店");
        assert!(markers[0].walk.is_none());
        assert!(!markers[0].popup.contains("poi-distance"));

        filters.set(Category::Medical, false);
        let markers = poi_markers(&pois(), &filters, None, 5.0);
        assert_eq!(markers.len(), 1);
        assert_eq!(markers[0].category, Category::Commerce);
    }

    #[test]
    fn test_walk_info_from_selection() {
        let origin = LatLng::new(30.2741, 120.1551);
        let markers = poi_markers(&pois(), &CategoryFilter::default(), Some(origin), 5.0);
        let walk = markers[0].walk.unwrap();
        assert_relative_eq!(walk.meters, distance_m(origin, LatLng::new(30.2750, 120.1560)));
        assert_relative_eq!(walk.minutes, walk.meters / (5.0 * 1000.0 / 60.0));
        assert!(markers[0].popup.contains(&walk.distance_text()));
        assert!(markers[0].popup.contains("🚶 约"));
    }

    #[test]
    fn test_walk_text() {
        let w = WalkInfo {
            meters: 832.6,
            minutes: 9.991,
        };
        assert_eq!(w.distance_text(), "833米");
        assert_eq!(w.time_text(), "约10.0分钟");
    }

    #[test]
    fn test_popup_markup() {
        let html = popup_html(
            Category::Medical,
            "社区<医院>",
            "医院",
            LatLng::new(30.27501, 120.15604),
            None,
        );
        assert!(html.contains("linear-gradient(135deg, #e74c3c, #d33828)"));
        assert!(html.contains("社区&lt;医院&gt;"));
        assert!(html.contains("<span class=\"poi-icon\">🏥</span>"));
        assert!(html.contains(">医疗卫生</span>"));
        assert!(html.contains("120.1560, 30.2750"));
    }
}
