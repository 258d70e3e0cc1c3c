use crate::geo::circle_ring;
use crate::types::{AnalysisResult, CategoryScore, Feature, FeatureCollection, LatLng};

/// Meters walked per minute at the 5 km/h reference pace used by the mock.
const MOCK_METERS_PER_MINUTE: f64 = 83.33;

const RING_SEGMENTS: usize = 64;

/// Demo result shown on development hosts when the backend is unreachable.
pub fn mock_result(origin: LatLng) -> AnalysisResult {
    let isochrone = FeatureCollection::new(
        [15u32, 10, 5]
            .into_iter()
            .map(|minutes| {
                let radius = minutes as f64 * MOCK_METERS_PER_MINUTE;
                Feature::isochrone(minutes, circle_ring(origin, radius, RING_SEGMENTS))
            })
            .collect(),
    );

    let score = |category: &str, name: &str, score: f64, poi_count: u32| CategoryScore {
        category: category.to_string(),
        name: name.to_string(),
        score,
        poi_count,
    };

    AnalysisResult {
        isochrone,
        pois: FeatureCollection::default(),
        total_score: Some(72.5),
        grade: Some("B".to_string()),
        summary: "良好：生活圈配套较为完善，基本满足日常生活需求".to_string(),
        category_scores: vec![
            score("medical", "医疗卫生", 80.0, 5),
            score("education", "教育设施", 75.0, 3),
            score("commerce", "商业服务", 85.0, 8),
            score("culture", "文化体育", 60.0, 2),
            score("public", "公共服务", 70.0, 4),
            score("transport", "交通设施", 90.0, 6),
            score("elderly", "养老服务", 45.0, 1),
            score("child", "托幼托育", 55.0, 2),
        ],
        suggestions: vec![
            "【文化体育】设施覆盖不足（得分60），建议增设相关配套设施".to_string(),
            "【养老服务】设施覆盖不足（得分45），建议增设相关配套设施".to_string(),
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::distance_m;
    use crate::types::FeatureKind;
    use approx::assert_relative_eq;

    #[test]
    fn test_mock_result_shape() {
        let origin = LatLng::new(30.2741, 120.1551);
        let result = mock_result(origin);
        assert_eq!(result.category_scores.len(), 8);
        assert_eq!(result.suggestions.len(), 2);
        assert!(result.pois.is_empty());

        let minutes: Vec<u32> = result
            .isochrone
            .features
            .iter()
            .map(|f| {
                assert_eq!(f.properties.kind, FeatureKind::Isochrone);
                f.properties.minutes.unwrap()
            })
            .collect();
        assert_eq!(minutes, vec![15, 10, 5]);
    }

    #[test]
    fn test_mock_rings_have_walk_radius() {
        let origin = LatLng::new(41.80, 123.43);
        let result = mock_result(origin);
        let first = &result.isochrone.features[0];
        let Some(crate::types::Geometry::Polygon { coordinates }) = &first.geometry else {
            panic!("expected polygon");
        };
        let d = distance_m(origin, LatLng::from_position(coordinates[0][0]));
        assert_relative_eq!(d, 15.0 * 83.33, max_relative = 1e-6);
    }
}
