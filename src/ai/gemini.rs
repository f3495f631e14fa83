use serde_json::{json, Value};
use std::time::Duration;

use super::GenError;

const API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";
const MODEL: &str = "gemini-2.0-flash";

/// One generateContent call. No retry here; the composer owns the retry
/// policy.
pub fn generate(api_key: &str, prompt: &str) -> Result<String, GenError> {
    if api_key.is_empty() {
        return Err(GenError::InvalidKey);
    }

    let url = format!("{}/{}:generateContent?key={}", API_BASE, MODEL, api_key);

    let body = json!({
        "contents": [{"parts": [{"text": prompt}]}]
    });

    let client = reqwest::blocking::Client::builder()
        .timeout(Duration::from_secs(120))
        .build()
        .map_err(|e| GenError::Other(format!("HTTP client error: {}", e)))?;

    let resp = client
        .post(&url)
        .header("Content-Type", "application/json")
        .json(&body)
        .send()
        .map_err(|e| {
            // Transport errors bypass the text classifier; its keywords
            // match the request URL
            if e.is_timeout() {
                GenError::Timeout
            } else {
                GenError::other(&format!("request failed: {}", e))
            }
        })?;

    if !resp.status().is_success() {
        let status = resp.status();
        let text = resp.text().unwrap_or_default();
        return Err(GenError::classify(&format!("{}: {}", status, text)));
    }

    let json: Value = resp
        .json()
        .map_err(|e| GenError::Other(format!("JSON parse error: {}", e)))?;

    let text = json
        .get("candidates")
        .and_then(|c| c.get(0))
        .and_then(|c| c.get("content"))
        .and_then(|c| c.get("parts"))
        .and_then(|p| p.get(0))
        .and_then(|p| p.get("text"))
        .and_then(|t| t.as_str())
        .unwrap_or("")
        .to_string();

    Ok(text)
}
