use std::path::PathBuf;
use std::time::Duration;

#[derive(Clone, Debug)]
pub struct Config {
    pub bind_addr: String,
    /// Base URL of the analysis backend; `/analyze` is appended.
    pub backend_url: Option<String>,
    /// Directory holding the built viewer (`index.html`, wasm, assets).
    pub viewer_dir: PathBuf,
    pub upstream_timeout: Duration,
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Self {
        let bind_addr = get("BIND_ADDR").unwrap_or_else(|| "0.0.0.0:8080".to_string());

        let backend_url = get("ANALYSIS_BACKEND_URL")
            .map(|s| s.trim().trim_end_matches('/').to_string())
            .filter(|s| !s.is_empty());

        let viewer_dir = get("VIEWER_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("crates/viewer/dist"));

        let upstream_timeout = get("UPSTREAM_TIMEOUT_SECS")
            .and_then(|s| s.parse::<u64>().ok())
            .map(Duration::from_secs)
            .unwrap_or_else(|| Duration::from_secs(30));

        Self {
            bind_addr,
            backend_url,
            viewer_dir,
            upstream_timeout,
        }
    }
}
