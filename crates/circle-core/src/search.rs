//! Address lookup against the public Nominatim service.

use serde::{Deserialize, Serialize};

use crate::error::CircleError;
use crate::types::LatLng;

pub const NOMINATIM_SEARCH_URL: &str = "https://nominatim.openstreetmap.org/search";
pub const COUNTRY_CODES: &str = "cn";
pub const RESULT_LIMIT: u32 = 5;
pub const ACCEPT_LANGUAGE: &str = "zh-CN,zh";

/// Quiet period before an as-you-type lookup fires.
pub const SUGGEST_DEBOUNCE_MS: u32 = 300;

/// Shorter queries hide the suggestion list instead of searching.
pub const MIN_SUGGEST_CHARS: usize = 2;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Place {
    pub name: String,
    pub address: String,
    pub location: LatLng,
}

#[derive(Debug, Deserialize)]
struct NominatimItem {
    display_name: String,
    lat: String,
    lon: String,
}

pub fn should_suggest(query: &str) -> bool {
    query.trim().chars().count() >= MIN_SUGGEST_CHARS
}

/// Trimmed query, or `EmptyQuery`.
pub fn validate_query(query: &str) -> Result<&str, CircleError> {
    let q = query.trim();
    if q.is_empty() {
        Err(CircleError::EmptyQuery)
    } else {
        Ok(q)
    }
}

pub fn search_url(query: &str) -> String {
    format!(
        "{NOMINATIM_SEARCH_URL}?format=json&q={}&countrycodes={COUNTRY_CODES}&limit={RESULT_LIMIT}&addressdetails=1",
        urlencoding::encode(query)
    )
}

/// Parse a Nominatim JSON array. Entries with unusable coordinates are dropped.
pub fn parse_places(body: &str) -> Result<Vec<Place>, CircleError> {
    let items: Vec<NominatimItem> = serde_json::from_str(body)?;
    Ok(items
        .into_iter()
        .filter_map(|item| {
            let lat = item.lat.trim().parse::<f64>().ok()?;
            let lng = item.lon.trim().parse::<f64>().ok()?;
            if !lat.is_finite() || !lng.is_finite() {
                return None;
            }
            let name = item
                .display_name
                .split(',')
                .next()
                .unwrap_or_default()
                .trim()
                .to_string();
            Some(Place {
                name,
                address: item.display_name,
                location: LatLng::new(lat, lng),
            })
        })
        .collect())
}

/// First hit for an explicit search, or `NoResults`.
pub fn first_place(places: &[Place]) -> Result<&Place, CircleError> {
    places.first().ok_or(CircleError::NoResults)
}

/// Toast text for a failed search. Transport and decode errors read as a
/// generic search failure rather than an analysis failure.
pub fn failure_message(err: &CircleError) -> &'static str {
    match err {
        CircleError::EmptyQuery | CircleError::NoResults => err.user_message(),
        _ => "搜索失败，请重试",
    }
}

/// Toast text after jumping to a place.
pub fn located_message(place: &Place) -> String {
    format!("已定位到: {}", place.name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_should_suggest() {
        assert!(!should_suggest(""));
        assert!(!should_suggest("西"));
        assert!(should_suggest("西湖"));
        assert!(should_suggest("ab"));
        assert!(!should_suggest("  a "));
    }

    #[test]
    fn test_validate_query() {
        assert!(matches!(validate_query("   "), Err(CircleError::EmptyQuery)));
        assert_eq!(validate_query(" 西湖 ").unwrap(), "西湖");
    }

    #[test]
    fn test_search_url_encodes_query() {
        let url = search_url("西湖 & 断桥");
        assert!(url.starts_with("https://nominatim.openstreetmap.org/search?format=json&q="));
        assert!(url.contains("q=%E8%A5%BF%E6%B9%96%20%26%20"));
        assert!(url.ends_with("&countrycodes=cn&limit=5&addressdetails=1"));
    }

    #[test]
    fn test_parse_places() {
        let body = r#"[
            {"display_name": "西湖, 西湖区, 杭州市, 浙江省, 中国", "lat": "30.2467", "lon": "120.1485", "address": {}},
            {"display_name": "broken", "lat": "n/a", "lon": "120.0"}
        ]"#;
        let places = parse_places(body).unwrap();
        assert_eq!(places.len(), 1);
        assert_eq!(places[0].name, "西湖");
        assert_eq!(places[0].address, "西湖, 西湖区, 杭州市, 浙江省, 中国");
        assert_eq!(places[0].location, LatLng::new(30.2467, 120.1485));
        assert_eq!(first_place(&places).unwrap().name, "西湖");
        assert!(matches!(first_place(&[]), Err(CircleError::NoResults)));
        assert_eq!(located_message(&places[0]), "已定位到: 西湖");
    }

    #[test]
    fn test_failure_messages() {
        assert_eq!(failure_message(&CircleError::NoResults), "未找到相关地址");
        assert_eq!(failure_message(&CircleError::EmptyQuery), "请输入要搜索的地址");
        assert_eq!(
            failure_message(&CircleError::Http { status: 429 }),
            "搜索失败，请重试"
        );
        assert_eq!(
            failure_message(&CircleError::Network("offline".into())),
            "搜索失败，请重试"
        );
    }
}
