use serde_json::Value;
use std::time::Duration;

const SHEETS_API_BASE: &str = "https://sheets.googleapis.com/v4/spreadsheets";

#[derive(Debug)]
pub enum SheetsError {
    NotFound,
    PermissionDenied,
    /// Zero rows is an error by contract, not an empty success.
    NoData,
    Other(String),
}

impl std::fmt::Display for SheetsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SheetsError::NotFound => write!(f, "Spreadsheet not found. Check the sheet ID."),
            SheetsError::PermissionDenied => write!(
                f,
                "Permission denied. Make sure the sheet is shared with your account."
            ),
            SheetsError::NoData => write!(f, "No data found in the sheet"),
            SheetsError::Other(detail) => write!(f, "Google Sheets error: {}", detail),
        }
    }
}

/// Fetch a 2-D grid of string cells. Row 0 is the header.
pub fn read(
    access_token: &str,
    spreadsheet_id: &str,
    range: &str,
) -> Result<Vec<Vec<String>>, SheetsError> {
    let url = format!(
        "{}/{}/values/{}",
        SHEETS_API_BASE,
        spreadsheet_id,
        urlencoding::encode(range)
    );

    let client = reqwest::blocking::Client::builder()
        .timeout(Duration::from_secs(30))
        .build()
        .map_err(|e| SheetsError::Other(format!("HTTP client error: {}", e)))?;

    let resp = client
        .get(&url)
        .bearer_auth(access_token)
        .send()
        .map_err(|e| SheetsError::Other(format!("Request failed: {}", e)))?;

    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().unwrap_or_default();
        return Err(classify_status(status.as_u16(), &body));
    }

    let json: Value = resp
        .json()
        .map_err(|e| SheetsError::Other(format!("JSON parse error: {}", e)))?;

    let rows = parse_values(&json);
    if rows.is_empty() {
        return Err(SheetsError::NoData);
    }

    Ok(rows)
}

pub(crate) fn classify_status(status: u16, body: &str) -> SheetsError {
    match status {
        404 => SheetsError::NotFound,
        403 => SheetsError::PermissionDenied,
        _ => SheetsError::Other(api_error_message(status, body)),
    }
}

/// Pull the `error.message` out of a Google API error body, falling back
/// to the status code.
fn api_error_message(status: u16, body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| {
            v.get("error")
                .and_then(|e| e.get("message"))
                .and_then(|m| m.as_str())
                .map(String::from)
        })
        .unwrap_or_else(|| format!("HTTP {} error", status))
}

/// Extract the `values` grid, coercing every cell to a string. Non-string
/// cells render as their JSON text.
pub(crate) fn parse_values(json: &Value) -> Vec<Vec<String>> {
    json.get("values")
        .and_then(|v| v.as_array())
        .map(|rows| {
            rows.iter()
                .map(|row| {
                    row.as_array()
                        .map(|cells| cells.iter().map(cell_to_string).collect())
                        .unwrap_or_default()
                })
                .collect()
        })
        .unwrap_or_default()
}

fn cell_to_string(cell: &Value) -> String {
    match cell {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
