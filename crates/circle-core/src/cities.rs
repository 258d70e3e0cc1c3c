use serde::Serialize;

use crate::error::CircleError;
use crate::types::{Bounds, LatLng};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct City {
    pub key: &'static str,
    pub name: &'static str,
    pub center: LatLng,
    pub zoom: u8,
    pub bounds: Bounds,
    pub description: &'static str,
}

pub const DEFAULT_CITY: &str = "hangzhou";

pub static CITIES: [City; 3] = [
    City {
        key: "hangzhou",
        name: "杭州",
        center: LatLng::new(30.2741, 120.1551),
        zoom: 14,
        bounds: Bounds::new(30.1, 119.9, 30.5, 120.5),
        description: "浙江省杭州市",
    },
    City {
        key: "zhuji",
        name: "诸暨",
        center: LatLng::new(29.85, 120.08),
        zoom: 14,
        bounds: Bounds::new(29.6, 120.0, 29.9, 120.4),
        description: "浙江省诸暨市",
    },
    City {
        key: "shenyang",
        name: "沈阳",
        center: LatLng::new(41.80, 123.43),
        zoom: 13,
        bounds: Bounds::new(41.65, 123.2, 41.95, 123.6),
        description: "辽宁省沈阳市",
    },
];

impl City {
    pub fn find(key: &str) -> Result<&'static City, CircleError> {
        CITIES
            .iter()
            .find(|c| c.key == key)
            .ok_or_else(|| CircleError::UnknownCity(key.to_string()))
    }

    pub fn default_city() -> &'static City {
        &CITIES[0]
    }

    /// Pan limit for the map: the city box plus a 10% margin.
    pub fn max_bounds(&self) -> Bounds {
        self.bounds.pad(0.1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_city() {
        assert_eq!(City::find("zhuji").unwrap().name, "诸暨");
        assert_eq!(City::default_city().key, DEFAULT_CITY);
        assert!(matches!(
            City::find("beijing"),
            Err(CircleError::UnknownCity(k)) if k == "beijing"
        ));
    }

    #[test]
    fn test_centers_inside_bounds() {
        for city in &CITIES {
            assert!(city.bounds.contains(city.center), "{}", city.key);
            assert!(city.max_bounds().contains(city.center));
        }
    }
}
