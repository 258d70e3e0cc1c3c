use serde::{Deserialize, Deserializer, Serialize};

/// Deserialize `null` the same way as a missing field.
fn null_as_default<'de, D, T>(d: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(d)?.unwrap_or_default())
}

/// A GeoJSON position; a trailing altitude is read and discarded.
struct Position([f64; 2]);

impl<'de> Deserialize<'de> for Position {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        let v = Vec::<f64>::deserialize(d)?;
        if v.len() < 2 {
            return Err(serde::de::Error::invalid_length(
                v.len(),
                &"a position with at least 2 elements",
            ));
        }
        Ok(Position([v[0], v[1]]))
    }
}

fn position<'de, D: Deserializer<'de>>(d: D) -> Result<[f64; 2], D::Error> {
    Ok(Position::deserialize(d)?.0)
}

fn rings<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<Vec<[f64; 2]>>, D::Error> {
    let raw = Vec::<Vec<Position>>::deserialize(d)?;
    Ok(raw
        .into_iter()
        .map(|ring| ring.into_iter().map(|p| p.0).collect())
        .collect())
}

fn polygons<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<Vec<Vec<[f64; 2]>>>, D::Error> {
    let raw = Vec::<Vec<Vec<Position>>>::deserialize(d)?;
    Ok(raw
        .into_iter()
        .map(|poly| {
            poly.into_iter()
                .map(|ring| ring.into_iter().map(|p| p.0).collect())
                .collect()
        })
        .collect())
}

// ─── Coordinates ─────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// GeoJSON position order.
    pub fn to_position(self) -> [f64; 2] {
        [self.lng, self.lat]
    }

    pub fn from_position(p: [f64; 2]) -> Self {
        Self { lat: p[1], lng: p[0] }
    }
}

/// Axis-aligned lat/lng box, south-west to north-east.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub south: f64,
    pub west: f64,
    pub north: f64,
    pub east: f64,
}

impl Bounds {
    pub const fn new(south: f64, west: f64, north: f64, east: f64) -> Self {
        Self {
            south,
            west,
            north,
            east,
        }
    }

    /// Grow every side by `ratio` of the box's height/width.
    pub fn pad(&self, ratio: f64) -> Self {
        let dlat = (self.north - self.south).abs() * ratio;
        let dlng = (self.east - self.west).abs() * ratio;
        Self {
            south: self.south - dlat,
            west: self.west - dlng,
            north: self.north + dlat,
            east: self.east + dlng,
        }
    }

    pub fn contains(&self, p: LatLng) -> bool {
        p.lat >= self.south && p.lat <= self.north && p.lng >= self.west && p.lng <= self.east
    }

    pub fn center(&self) -> LatLng {
        LatLng::new(
            (self.south + self.north) / 2.0,
            (self.west + self.east) / 2.0,
        )
    }

    /// `[[south, west], [north, east]]`, the corner order Leaflet expects.
    pub fn corners(&self) -> [[f64; 2]; 2] {
        [[self.south, self.west], [self.north, self.east]]
    }
}

// ─── Categories ──────────────────────────────────────────────────────

pub const FALLBACK_ICON: &str = "📍";
pub const FALLBACK_COLOR: &str = "#666";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Medical,
    Education,
    Elderly,
    Commerce,
    Culture,
    Public,
    Transport,
    Child,
}

impl Category {
    pub const ALL: [Category; 8] = [
        Category::Medical,
        Category::Education,
        Category::Elderly,
        Category::Commerce,
        Category::Culture,
        Category::Public,
        Category::Transport,
        Category::Child,
    ];

    pub fn from_code(code: &str) -> Option<Category> {
        Category::ALL.into_iter().find(|c| c.code() == code)
    }

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn code(self) -> &'static str {
        match self {
            Category::Medical => "medical",
            Category::Education => "education",
            Category::Elderly => "elderly",
            Category::Commerce => "commerce",
            Category::Culture => "culture",
            Category::Public => "public",
            Category::Transport => "transport",
            Category::Child => "child",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Category::Medical => "医疗卫生",
            Category::Education => "教育设施",
            Category::Elderly => "养老服务",
            Category::Commerce => "商业服务",
            Category::Culture => "文化体育",
            Category::Public => "公共管理",
            Category::Transport => "交通设施",
            Category::Child => "托幼托育",
        }
    }

    /// Two-character radar axis label.
    pub fn short_name(self) -> &'static str {
        match self {
            Category::Medical => "医疗",
            Category::Education => "教育",
            Category::Elderly => "养老",
            Category::Commerce => "商服",
            Category::Culture => "文体",
            Category::Public => "公管",
            Category::Transport => "交通",
            Category::Child => "幼托",
        }
    }

    pub fn icon(self) -> &'static str {
        match self {
            Category::Medical => "🏥",
            Category::Education => "🏫",
            Category::Elderly => "👴",
            Category::Commerce => "🛒",
            Category::Culture => "🎭",
            Category::Public => "🏛️",
            Category::Transport => "🚌",
            Category::Child => "👶",
        }
    }

    pub fn color(self) -> &'static str {
        match self {
            Category::Medical => "#e74c3c",
            Category::Education => "#3498db",
            Category::Elderly => "#e67e22",
            Category::Commerce => "#f39c12",
            Category::Culture => "#27ae60",
            Category::Public => "#9b59b6",
            Category::Transport => "#1abc9c",
            Category::Child => "#ff69b4",
        }
    }
}

/// Display label for a POI sub-type code; unknown codes are shown as-is.
pub fn subtype_label(code: &str) -> &str {
    match code {
        "community_health" => "社区卫生服务中心/站",
        "hospital" => "医院",
        "pharmacy" => "药店",
        "kindergarten" => "幼儿园",
        "primary" => "小学",
        "secondary" => "初中",
        "elderly_center" => "社区养老服务中心",
        "daycare" => "日间照料中心",
        "elderly_activity" => "老年活动室",
        "market" => "菜市场/生鲜超市",
        "supermarket" => "综合超市",
        "convenience" => "便利店",
        "restaurant" => "餐饮服务",
        "culture_center" => "文化活动中心",
        "sports_field" => "健身场地/球场",
        "park" => "公园绿地",
        "library" => "图书室/阅览室",
        "community_service" => "社区服务中心",
        "police" => "派出所/警务室",
        "bank" => "银行网点",
        "post" => "邮政服务",
        "bus_stop" => "公交站点",
        "metro" => "轨道交通站",
        "parking" => "公共停车场",
        "bike_parking" => "非机动车停车",
        "nursery" => "托儿所/托育机构",
        "playground" => "儿童游乐设施",
        other => other,
    }
}

/// Radar label for a category display name when the code is not one we know.
pub fn short_name_for_label(name: &str) -> &str {
    Category::ALL
        .into_iter()
        .find(|c| c.label() == name)
        .map(Category::short_name)
        .unwrap_or(name)
}

// ─── Grades ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Grade {
    A,
    B,
    C,
    D,
    E,
}

impl Grade {
    pub fn parse(s: &str) -> Option<Grade> {
        match s.trim() {
            "A" | "a" => Some(Grade::A),
            "B" | "b" => Some(Grade::B),
            "C" | "c" => Some(Grade::C),
            "D" | "d" => Some(Grade::D),
            "E" | "e" => Some(Grade::E),
            _ => None,
        }
    }

    /// Band a score falls in. Only used to describe a score; the backend's
    /// grade is authoritative.
    pub fn for_score(score: f64) -> Grade {
        match score {
            s if s >= 90.0 => Grade::A,
            s if s >= 75.0 => Grade::B,
            s if s >= 60.0 => Grade::C,
            s if s >= 45.0 => Grade::D,
            _ => Grade::E,
        }
    }

    pub fn letter(self) -> &'static str {
        match self {
            Grade::A => "A",
            Grade::B => "B",
            Grade::C => "C",
            Grade::D => "D",
            Grade::E => "E",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Grade::A => "优秀：15分钟生活圈配套完善，各类设施齐全，居民生活便利度高",
            Grade::B => "良好：生活圈配套较为完善，基本满足日常生活需求",
            Grade::C => "一般：生活圈配套基本满足需求，部分设施有待完善",
            Grade::D => "较差：生活圈配套不足，多项设施缺失，建议重点改善",
            Grade::E => "差：生活圈配套严重不足，急需规划建设",
        }
    }
}

// ─── Analysis result ─────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CategoryScore {
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub score: f64,
    #[serde(default)]
    pub poi_count: u32,
}

impl CategoryScore {
    pub fn category(&self) -> Option<Category> {
        Category::from_code(&self.category)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisResult {
    #[serde(deserialize_with = "null_as_default")]
    pub isochrone: FeatureCollection,
    #[serde(deserialize_with = "null_as_default")]
    pub pois: FeatureCollection,
    pub total_score: Option<f64>,
    pub grade: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub summary: String,
    #[serde(deserialize_with = "null_as_default")]
    pub category_scores: Vec<CategoryScore>,
    #[serde(deserialize_with = "null_as_default")]
    pub suggestions: Vec<String>,
}

impl AnalysisResult {
    pub fn grade(&self) -> Option<Grade> {
        self.grade.as_deref().and_then(Grade::parse)
    }
}

// ─── GeoJSON ─────────────────────────────────────────────────────────

fn feature_collection_type() -> String {
    "FeatureCollection".to_string()
}

fn feature_type() -> String {
    "Feature".to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureCollection {
    #[serde(rename = "type", default = "feature_collection_type")]
    pub kind: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub features: Vec<Feature>,
}

impl Default for FeatureCollection {
    fn default() -> Self {
        Self {
            kind: feature_collection_type(),
            features: Vec::new(),
        }
    }
}

impl FeatureCollection {
    pub fn new(features: Vec<Feature>) -> Self {
        Self {
            kind: feature_collection_type(),
            features,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feature {
    #[serde(rename = "type", default = "feature_type")]
    pub kind: String,
    #[serde(default)]
    pub geometry: Option<Geometry>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub properties: FeatureProperties,
}

impl Feature {
    pub fn poi(at: LatLng, category: &str, name: &str, sub_type: &str) -> Self {
        Self {
            kind: feature_type(),
            geometry: Some(Geometry::Point {
                coordinates: at.to_position(),
            }),
            properties: FeatureProperties {
                kind: FeatureKind::Poi,
                category: Some(category.to_string()),
                name: Some(name.to_string()),
                sub_type: Some(sub_type.to_string()),
                ..Default::default()
            },
        }
    }

    pub fn isochrone(minutes: u32, ring: Vec<[f64; 2]>) -> Self {
        Self {
            kind: feature_type(),
            geometry: Some(Geometry::Polygon {
                coordinates: vec![ring],
            }),
            properties: FeatureProperties {
                kind: FeatureKind::Isochrone,
                minutes: Some(minutes),
                ..Default::default()
            },
        }
    }

    /// Location of a point feature.
    pub fn point(&self) -> Option<LatLng> {
        match self.geometry {
            Some(Geometry::Point { coordinates }) => Some(LatLng::from_position(coordinates)),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Geometry {
    Point {
        #[serde(deserialize_with = "position")]
        coordinates: [f64; 2],
    },
    Polygon {
        #[serde(deserialize_with = "rings")]
        coordinates: Vec<Vec<[f64; 2]>>,
    },
    MultiPolygon {
        #[serde(deserialize_with = "polygons")]
        coordinates: Vec<Vec<Vec<[f64; 2]>>>,
    },
    #[serde(other)]
    Unsupported,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeatureKind {
    Isochrone,
    Poi,
    Origin,
    #[default]
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeatureProperties {
    #[serde(rename = "type", default)]
    pub kind: FeatureKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minutes: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub_type: Option<String>,
}
