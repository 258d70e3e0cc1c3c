use serde::Serialize;

/// Zoom used when jumping to a searched or geolocated point.
pub const SELECTION_ZOOM: u8 = 16;

/// Map element id in the page.
pub const MAP_CONTAINER_ID: &str = "map";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BaseLayer {
    #[default]
    Amap,
    OpenStreetMap,
}

fn no_subdomains(s: &&'static [&'static str]) -> bool {
    s.is_empty()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TileSource {
    pub url: &'static str,
    #[serde(skip_serializing_if = "no_subdomains")]
    pub subdomains: &'static [&'static str],
    pub max_zoom: u8,
    pub attribution: &'static str,
}

impl BaseLayer {
    pub const ALL: [BaseLayer; 2] = [BaseLayer::Amap, BaseLayer::OpenStreetMap];

    pub fn key(self) -> &'static str {
        match self {
            BaseLayer::Amap => "amap",
            BaseLayer::OpenStreetMap => "osm",
        }
    }

    pub fn from_key(key: &str) -> Option<BaseLayer> {
        BaseLayer::ALL.into_iter().find(|l| l.key() == key)
    }

    pub fn label(self) -> &'static str {
        match self {
            BaseLayer::Amap => "高德地图",
            BaseLayer::OpenStreetMap => "OpenStreetMap",
        }
    }

    pub fn source(self) -> TileSource {
        match self {
            BaseLayer::Amap => TileSource {
                url: "https://webrd0{s}.is.autonavi.com/appmaptile?lang=zh_cn&size=1&scale=1&style=8&x={x}&y={y}&z={z}",
                subdomains: &["1", "2", "3", "4"],
                max_zoom: 18,
                attribution: "&copy; 高德地图",
            },
            BaseLayer::OpenStreetMap => TileSource {
                url: "https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png",
                subdomains: &[],
                max_zoom: 19,
                attribution: "&copy; <a href=\"https://www.openstreetmap.org/copyright\">OpenStreetMap</a>",
            },
        }
    }
}

/// Path options for the dashed city outline.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OutlineStyle {
    pub color: &'static str,
    pub weight: u32,
    pub fill_opacity: f64,
    pub dash_array: &'static str,
    pub interactive: bool,
}

pub const CITY_OUTLINE: OutlineStyle = OutlineStyle {
    color: "#3498db",
    weight: 2,
    fill_opacity: 0.0,
    dash_array: "5, 5",
    interactive: false,
};

/// Markup of the red dot marking the selected point.
pub const SELECTION_MARKER_HTML: &str = "<div style=\"background:#e74c3c;width:20px;height:20px;border-radius:50%;border:3px solid white;box-shadow:0 2px 6px rgba(0,0,0,0.3);\"></div>";
