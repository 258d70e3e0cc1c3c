use serde::Serialize;

use crate::types::{Feature, FeatureCollection, FeatureKind, Geometry};

/// Leaflet path options for one isochrone band.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PathStyle {
    pub color: &'static str,
    pub fill_color: &'static str,
    pub fill_opacity: f64,
    pub weight: u32,
}

const STYLE_5: PathStyle = PathStyle {
    color: "#2ecc71",
    fill_color: "#2ecc71",
    fill_opacity: 0.3,
    weight: 2,
};

const STYLE_10: PathStyle = PathStyle {
    color: "#3498db",
    fill_color: "#3498db",
    fill_opacity: 0.25,
    weight: 2,
};

const STYLE_15: PathStyle = PathStyle {
    color: "#9b59b6",
    fill_color: "#9b59b6",
    fill_opacity: 0.2,
    weight: 2,
};

/// Exact-match lookup; anything else gets the 15-minute style.
pub fn style_for(minutes: Option<u32>) -> PathStyle {
    match minutes {
        Some(5) => STYLE_5,
        Some(10) => STYLE_10,
        _ => STYLE_15,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IsochroneLayer {
    pub minutes: Option<u32>,
    pub style: PathStyle,
    pub feature: Feature,
}

fn is_area(geometry: &Option<Geometry>) -> bool {
    matches!(
        geometry,
        Some(Geometry::Polygon { .. }) | Some(Geometry::MultiPolygon { .. })
    )
}

/// One polygon per distinct minute threshold, largest first so smaller bands
/// stay on top. The first feature seen for a threshold wins.
pub fn isochrone_layers(collection: &FeatureCollection) -> Vec<IsochroneLayer> {
    let mut layers: Vec<IsochroneLayer> = Vec::new();
    for feature in &collection.features {
        if feature.properties.kind != FeatureKind::Isochrone {
            continue;
        }
        if !is_area(&feature.geometry) {
            log::debug!(
                "skipping {:?}-minute isochrone without polygon geometry: {:?}",
                feature.properties.minutes,
                feature.geometry
            );
            continue;
        }
        let minutes = feature.properties.minutes;
        if layers.iter().any(|l| l.minutes == minutes) {
            continue;
        }
        layers.push(IsochroneLayer {
            minutes,
            style: style_for(minutes),
            feature: feature.clone(),
        });
    }
    layers.sort_by_key(|l| std::cmp::Reverse(l.minutes.unwrap_or(crate::geo::TIME_THRESHOLD_MIN)));
    layers
}
