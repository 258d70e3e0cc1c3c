//! Contract with the analysis backend.
//!
//! Transport lives with the caller (gloo-net in the browser, reqwest on the
//! server); this module owns the request body, the URL, and how a raw
//! response becomes an [`AnalysisResult`] or an error.

use serde::{Deserialize, Serialize, Serializer};

use crate::error::CircleError;
use crate::geo::TIME_THRESHOLD_MIN;
use crate::types::{AnalysisResult, LatLng};

/// Mount point of the analysis API relative to the page origin.
pub const API_BASE: &str = "/api/v1";

/// Serialize integral floats as JSON integers, matching how a browser
/// stringifies numbers (`5.0` goes out as `5`).
fn serialize_js_number<S: Serializer>(v: &f64, s: S) -> Result<S::Ok, S::Error> {
    if v.fract() == 0.0 && v.abs() < 1e15 {
        s.serialize_i64(*v as i64)
    } else {
        s.serialize_f64(*v)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyzeRequest {
    #[serde(serialize_with = "serialize_js_number")]
    pub lng: f64,
    #[serde(serialize_with = "serialize_js_number")]
    pub lat: f64,
    #[serde(default = "default_threshold")]
    pub time_threshold: u32,
    #[serde(default = "default_walk_speed", serialize_with = "serialize_js_number")]
    pub walk_speed: f64,
}

fn default_threshold() -> u32 {
    TIME_THRESHOLD_MIN
}

fn default_walk_speed() -> f64 {
    crate::state::DEFAULT_WALK_SPEED
}

impl AnalyzeRequest {
    pub fn new(point: LatLng, walk_speed: f64) -> Self {
        Self {
            lng: point.lng,
            lat: point.lat,
            time_threshold: TIME_THRESHOLD_MIN,
            walk_speed,
        }
    }

    pub fn point(&self) -> LatLng {
        LatLng::new(self.lat, self.lng)
    }

    /// Reject bodies that could not have come from the viewer.
    pub fn validate(&self) -> Result<(), String> {
        if !self.lat.is_finite() || !(-90.0..=90.0).contains(&self.lat) {
            return Err(format!("latitude out of range: {}", self.lat));
        }
        if !self.lng.is_finite() || !(-180.0..=180.0).contains(&self.lng) {
            return Err(format!("longitude out of range: {}", self.lng));
        }
        if !self.walk_speed.is_finite() || self.walk_speed <= 0.0 {
            return Err(format!("walk speed must be positive: {}", self.walk_speed));
        }
        Ok(())
    }

    pub fn to_json(&self) -> Result<String, CircleError> {
        Ok(serde_json::to_string(self)?)
    }
}

/// `{api_base}/analyze`, tolerating a trailing slash on the base.
pub fn analyze_url(api_base: &str) -> String {
    format!("{}/analyze", api_base.trim_end_matches('/'))
}

/// Turn a raw HTTP response into a result.
pub fn decode_response(status: u16, body: &str) -> Result<AnalysisResult, CircleError> {
    if !(200..300).contains(&status) {
        return Err(CircleError::Http { status });
    }
    Ok(serde_json::from_str(body)?)
}

/// Whether the page is served from a development machine. Only such hosts
/// may fall back to mock data after a failed analysis.
pub fn is_local_host(hostname: &str) -> bool {
    matches!(
        hostname.trim().to_ascii_lowercase().as_str(),
        "localhost" | "127.0.0.1" | "::1" | "[::1]"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_body_matches_browser_json() {
        let req = AnalyzeRequest::new(LatLng::new(30.2741, 120.1551), 5.0);
        let value: serde_json::Value = serde_json::from_str(&req.to_json().unwrap()).unwrap();
        assert_eq!(
            value,
            json!({"lng": 120.1551, "lat": 30.2741, "time_threshold": 15, "walk_speed": 5})
        );

        let req = AnalyzeRequest::new(LatLng::new(30.0, 120.0), 4.5);
        let body = req.to_json().unwrap();
        assert!(body.contains("\"walk_speed\":4.5"));
        assert!(body.contains("\"lat\":30,"));
    }

    #[test]
    fn test_request_defaults_and_validation() {
        let req: AnalyzeRequest = serde_json::from_str(r#"{"lng": 120.1, "lat": 30.2}"#).unwrap();
        assert_eq!(req.time_threshold, 15);
        assert_eq!(req.walk_speed, 5.0);
        assert!(req.validate().is_ok());

        let bad = AnalyzeRequest::new(LatLng::new(95.0, 120.0), 5.0);
        assert!(bad.validate().is_err());
        let bad = AnalyzeRequest::new(LatLng::new(30.0, 120.0), 0.0);
        assert!(bad.validate().is_err());
    }

    #[test]
    fn test_analyze_url() {
        assert_eq!(analyze_url(API_BASE), "/api/v1/analyze");
        assert_eq!(analyze_url("http://backend:9000/api/v1/"), "http://backend:9000/api/v1/analyze");
    }

    #[test]
    fn test_decode_response_status() {
        assert!(matches!(
            decode_response(502, "bad gateway"),
            Err(CircleError::Http { status: 502 })
        ));
        assert!(matches!(decode_response(200, "not json"), Err(CircleError::Decode(_))));
        let ok = decode_response(200, r#"{"total_score": 50, "grade": "D"}"#).unwrap();
        assert_eq!(ok.total_score, Some(50.0));
    }

    #[test]
    fn test_local_hosts() {
        assert!(is_local_host("localhost"));
        assert!(is_local_host("127.0.0.1"));
        assert!(is_local_host("[::1]"));
        assert!(!is_local_host("circle.example.com"));
        assert!(!is_local_host("localhost.example.com"));
    }
}
