use thiserror::Error;

use crate::geolocate::GeolocationFailure;

#[derive(Error, Debug)]
pub enum CircleError {
    #[error("analysis request failed with HTTP status {status}")]
    Http { status: u16 },

    #[error("network error: {0}")]
    Network(String),

    #[error("JSON error: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("search query is empty")]
    EmptyQuery,

    #[error("no address matched the query")]
    NoResults,

    #[error("geolocation failed: {0:?}")]
    Geolocation(GeolocationFailure),

    #[error("unknown city: {0}")]
    UnknownCity(String),

    #[error("invalid walk speed: {0}")]
    InvalidWalkSpeed(f64),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl CircleError {
    /// Text shown to the user in a toast.
    pub fn user_message(&self) -> &'static str {
        match self {
            CircleError::Http { .. } | CircleError::Network(_) | CircleError::Decode(_) => {
                "分析失败，请重试"
            }
            CircleError::EmptyQuery => "请输入要搜索的地址",
            CircleError::NoResults => "未找到相关地址",
            CircleError::Geolocation(failure) => failure.message(),
            CircleError::UnknownCity(_) => "不支持的城市",
            CircleError::InvalidWalkSpeed(_) => "步行速度无效",
            CircleError::Io(_) => "读取文件失败",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_messages() {
        assert_eq!(
            CircleError::Http { status: 500 }.user_message(),
            "分析失败，请重试"
        );
        assert_eq!(CircleError::NoResults.user_message(), "未找到相关地址");
        assert_eq!(
            CircleError::Geolocation(GeolocationFailure::Timeout).user_message(),
            "定位超时，请重试"
        );
    }

    #[test]
    fn test_display() {
        let err = CircleError::Http { status: 503 };
        assert_eq!(
            err.to_string(),
            "analysis request failed with HTTP status 503"
        );
    }
}
