use circle_core::client::{analyze_url, decode_response, AnalyzeRequest, API_BASE};
use circle_core::error::CircleError;
use circle_core::search::{parse_places, search_url, Place, ACCEPT_LANGUAGE};
use circle_core::types::AnalysisResult;
use gloo::net::http::Request;

/// POST the point and walk speed to the analysis API.
pub async fn analyze(request: &AnalyzeRequest) -> Result<AnalysisResult, CircleError> {
    let body = request.to_json()?;
    let resp = Request::post(&analyze_url(API_BASE))
        .header("Content-Type", "application/json")
        .body(body)
        .map_err(|e| CircleError::Network(e.to_string()))?
        .send()
        .await
        .map_err(|e| CircleError::Network(e.to_string()))?;
    let status = resp.status();
    let text = resp
        .text()
        .await
        .map_err(|e| CircleError::Network(e.to_string()))?;
    decode_response(status, &text)
}

/// Address lookup; at most five places.
pub async fn search_places(query: &str) -> Result<Vec<Place>, CircleError> {
    let resp = Request::get(&search_url(query))
        .header("Accept-Language", ACCEPT_LANGUAGE)
        .send()
        .await
        .map_err(|e| CircleError::Network(e.to_string()))?;
    if !resp.ok() {
        return Err(CircleError::Http {
            status: resp.status(),
        });
    }
    let text = resp
        .text()
        .await
        .map_err(|e| CircleError::Network(e.to_string()))?;
    parse_places(&text)
}
