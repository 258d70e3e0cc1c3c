pub mod cities;
pub mod client;
pub mod color;
pub mod error;
pub mod geo;
pub mod geolocate;
pub mod map;
pub mod mock;
pub mod render;
pub mod search;
pub mod state;
pub mod types;

use error::CircleError;
use std::path::Path;
use types::AnalysisResult;

/// Read a saved analysis response from disk.
pub fn load_result(path: &Path) -> Result<AnalysisResult, CircleError> {
    let data = std::fs::read(path)?;
    parse_result(&data)
}

/// Decode an analysis response body.
pub fn parse_result(data: &[u8]) -> Result<AnalysisResult, CircleError> {
    Ok(serde_json::from_slice(data)?)
}
