/// Ask for a GPS-grade fix.
pub const ENABLE_HIGH_ACCURACY: bool = true;
/// Give up after this long.
pub const TIMEOUT_MS: u32 = 10_000;
/// Accept a cached position this old.
pub const MAXIMUM_AGE_MS: u32 = 60_000;

pub const LOCATED_MESSAGE: &str = "已定位到当前位置";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeolocationFailure {
    PermissionDenied,
    PositionUnavailable,
    Timeout,
    Unsupported,
    Other,
}

impl GeolocationFailure {
    /// Map a `GeolocationPositionError.code`.
    pub fn from_code(code: u16) -> Self {
        match code {
            1 => GeolocationFailure::PermissionDenied,
            2 => GeolocationFailure::PositionUnavailable,
            3 => GeolocationFailure::Timeout,
            _ => GeolocationFailure::Other,
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            GeolocationFailure::PermissionDenied => "定位权限被拒绝，请在浏览器设置中允许",
            GeolocationFailure::PositionUnavailable => "无法获取位置信息",
            GeolocationFailure::Timeout => "定位超时，请重试",
            GeolocationFailure::Unsupported => "您的浏览器不支持定位功能",
            GeolocationFailure::Other => "定位失败",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_map_to_messages() {
        assert_eq!(
            GeolocationFailure::from_code(1).message(),
            "定位权限被拒绝，请在浏览器设置中允许"
        );
        assert_eq!(GeolocationFailure::from_code(2), GeolocationFailure::PositionUnavailable);
        assert_eq!(GeolocationFailure::from_code(3), GeolocationFailure::Timeout);
        assert_eq!(GeolocationFailure::from_code(0), GeolocationFailure::Other);
        assert_eq!(GeolocationFailure::from_code(9).message(), "定位失败");
    }
}
