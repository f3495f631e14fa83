use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use chrono::{Local, TimeZone};
use log::info;
use regex::{Regex, RegexBuilder};
use serde_json::{json, Value};
use std::time::Duration;

const GMAIL_API_BASE: &str = "https://gmail.googleapis.com/gmail/v1";

/// Provider errors pass through verbatim; a failed publish is terminal.
#[derive(Debug)]
pub struct GmailError(pub String);

impl std::fmt::Display for GmailError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug)]
pub struct DraftSummary {
    pub id: String,
    pub subject: String,
    pub to: String,
    pub date: String,
}

#[derive(Debug)]
pub struct DraftContent {
    pub subject: String,
    pub to: String,
    pub body: String,
}

// ── Publish ───────────────────────────────────────────

/// Convert the composed markup to HTML, wrap it in the mail shell, and
/// file it as a draft. Returns the provider-assigned draft id.
pub fn create_draft(
    access_token: &str,
    to: &str,
    subject: &str,
    body_markup: &str,
) -> Result<String, GmailError> {
    let html = body_to_html(body_markup);
    let raw = build_raw_message(to, subject, &html);

    let url = format!("{}/users/me/drafts", GMAIL_API_BASE);
    let response = api_post(access_token, &url, &json!({ "message": { "raw": raw } }))?;

    let draft_id = response
        .get("id")
        .and_then(|v| v.as_str())
        .ok_or_else(|| GmailError("Draft response has no id".to_string()))?
        .to_string();

    info!("Draft {} created for {}", draft_id, to);
    Ok(draft_id)
}

/// Markup → HTML: literal `<table>…</table>` blocks pass through
/// untouched (they carry their own inline styles); outside them newlines
/// become line breaks and `* ` bullet markers become bullet glyphs. The
/// result is wrapped in a minimal styled shell.
pub fn body_to_html(markup: &str) -> String {
    let table_re = Regex::new(r"(?s)<table.*?</table>").unwrap();
    let bullet_re = Regex::new(r"\* ").unwrap();

    let mut converted = String::new();
    let mut cursor = 0;
    for m in table_re.find_iter(markup) {
        converted.push_str(&convert_text(&markup[cursor..m.start()], &bullet_re));
        converted.push_str(m.as_str());
        cursor = m.end();
    }
    converted.push_str(&convert_text(&markup[cursor..], &bullet_re));

    format!(
        "<!DOCTYPE html>\n\
         <html>\n\
         <head>\n\
         <meta charset=\"UTF-8\">\n\
         </head>\n\
         <body style=\"font-family: Calibri, Arial, sans-serif; font-size: 14px; line-height: 1.6; color: #000000; margin: 0; padding: 20px;\">\n\
         <div style=\"max-width: 800px;\">\n\
         {}\n\
         </div>\n\
         </body>\n\
         </html>",
        converted
    )
}

fn convert_text(text: &str, bullet_re: &Regex) -> String {
    let with_breaks = text.replace('\n', "<br>");
    bullet_re.replace_all(&with_breaks, "\u{2022} ").into_owned()
}

/// RFC 2822 message with a single text/html part, base64url-encoded
/// (no padding) for the drafts endpoint.
pub(crate) fn build_raw_message(to: &str, subject: &str, html_body: &str) -> String {
    let message = [
        format!("To: {}", to),
        format!("Subject: {}", subject),
        "MIME-Version: 1.0".to_string(),
        "Content-Type: text/html; charset=UTF-8".to_string(),
        String::new(),
        html_body.to_string(),
    ]
    .join("\r\n");

    URL_SAFE_NO_PAD.encode(message.as_bytes())
}

// ── Read side ─────────────────────────────────────────

/// Recent drafts, newest first, with just enough metadata to display.
pub fn list_drafts(
    access_token: &str,
    max_results: usize,
) -> Result<Vec<DraftSummary>, GmailError> {
    let url = format!(
        "{}/users/me/drafts?maxResults={}",
        GMAIL_API_BASE, max_results
    );
    let listing = api_get(access_token, &url)?;

    let ids: Vec<String> = listing
        .get("drafts")
        .and_then(|v| v.as_array())
        .map(|drafts| {
            drafts
                .iter()
                .filter_map(|d| d.get("id").and_then(|v| v.as_str()).map(String::from))
                .collect()
        })
        .unwrap_or_default();

    let mut summaries = Vec::with_capacity(ids.len());
    for id in ids {
        let detail = api_get(
            access_token,
            &format!("{}/users/me/drafts/{}", GMAIL_API_BASE, id),
        )?;
        let message = detail.get("message").cloned().unwrap_or(Value::Null);
        let payload = message.get("payload").cloned().unwrap_or(Value::Null);

        summaries.push(DraftSummary {
            id,
            subject: header_value(&payload, "Subject").unwrap_or_else(|| "No Subject".to_string()),
            to: header_value(&payload, "To").unwrap_or_else(|| "Unknown".to_string()),
            date: internal_date(&message),
        });
    }

    Ok(summaries)
}

/// Full body of one draft, preferring the HTML part and stripping the
/// wrapper markup our own publish step added.
pub fn get_draft(access_token: &str, draft_id: &str) -> Result<DraftContent, GmailError> {
    let detail = api_get(
        access_token,
        &format!("{}/users/me/drafts/{}", GMAIL_API_BASE, draft_id),
    )?;

    let payload = detail
        .get("message")
        .and_then(|m| m.get("payload"))
        .cloned()
        .unwrap_or(Value::Null);

    Ok(DraftContent {
        subject: header_value(&payload, "Subject").unwrap_or_else(|| "No Subject".to_string()),
        to: header_value(&payload, "To").unwrap_or_else(|| "Unknown".to_string()),
        body: strip_wrapper_html(&extract_body(&payload)),
    })
}

/// Pick the body out of a message payload: for multipart messages the
/// text/html part wins, text/plain is the fallback; single-part messages
/// use the payload body directly.
pub(crate) fn extract_body(payload: &Value) -> String {
    if let Some(parts) = payload.get("parts").and_then(|v| v.as_array()) {
        let mut body = String::new();
        for part in parts {
            let mime = part
                .get("mimeType")
                .and_then(|v| v.as_str())
                .unwrap_or_default();
            let data = part
                .get("body")
                .and_then(|b| b.get("data"))
                .and_then(|v| v.as_str());

            match (mime, data) {
                ("text/html", Some(data)) => return decode_body(data),
                ("text/plain", Some(data)) if body.is_empty() => body = decode_body(data),
                _ => {}
            }
        }
        return body;
    }

    payload
        .get("body")
        .and_then(|b| b.get("data"))
        .and_then(|v| v.as_str())
        .map(decode_body)
        .unwrap_or_default()
}

fn decode_body(data: &str) -> String {
    URL_SAFE_NO_PAD
        .decode(data.trim_end_matches('='))
        .ok()
        .and_then(|bytes| String::from_utf8(bytes).ok())
        .unwrap_or_default()
}

/// Best-effort removal of the document shell `body_to_html` wraps around
/// a draft: doctype, html/head/body tags, the styled wrapper divs, and
/// any surplus closing divs they leave behind. A bounded text cleanup for
/// display, not an HTML sanitizer.
pub fn strip_wrapper_html(html: &str) -> String {
    let patterns = [
        r"<!DOCTYPE[^>]*>",
        r"<html[^>]*>",
        r"</html>",
        r"(?s)<head[^>]*>.*?</head>",
        r"<body[^>]*>",
        r"</body>",
        r#"<div style="font-family:[^"]*"[^>]*>"#,
        r#"<div style="max-width:[^"]*"[^>]*>"#,
    ];

    let mut cleaned = html.to_string();
    for pattern in patterns {
        let re = RegexBuilder::new(pattern)
            .case_insensitive(true)
            .build()
            .unwrap();
        cleaned = re.replace_all(&cleaned, "").into_owned();
    }

    // Stripping the wrapper divs orphans their closing tags; drop the
    // surplus from the end.
    let opening = Regex::new(r"(?i)<div").unwrap().find_iter(&cleaned).count();
    let closing = Regex::new(r"(?i)</div>")
        .unwrap()
        .find_iter(&cleaned)
        .count();
    for _ in opening..closing {
        if let Some(pos) = cleaned.rfind("</div>") {
            cleaned.replace_range(pos..pos + "</div>".len(), "");
        }
    }

    cleaned.trim().to_string()
}

// ── Helpers ───────────────────────────────────────────

fn header_value(payload: &Value, name: &str) -> Option<String> {
    payload
        .get("headers")
        .and_then(|v| v.as_array())?
        .iter()
        .find(|h| h.get("name").and_then(|n| n.as_str()) == Some(name))
        .and_then(|h| h.get("value"))
        .and_then(|v| v.as_str())
        .map(String::from)
}

/// Gmail's internalDate is epoch milliseconds.
fn internal_date(message: &Value) -> String {
    message
        .get("internalDate")
        .and_then(|v| v.as_str())
        .and_then(|s| s.parse::<i64>().ok())
        .and_then(|ms| Local.timestamp_millis_opt(ms).single())
        .map(|dt| dt.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| "Unknown".to_string())
}

fn api_get(access_token: &str, url: &str) -> Result<Value, GmailError> {
    let client = http_client()?;
    let resp = client
        .get(url)
        .bearer_auth(access_token)
        .send()
        .map_err(|e| GmailError(format!("Request failed: {}", e)))?;
    read_response(resp)
}

fn api_post(access_token: &str, url: &str, body: &Value) -> Result<Value, GmailError> {
    let client = http_client()?;
    let resp = client
        .post(url)
        .bearer_auth(access_token)
        .json(body)
        .send()
        .map_err(|e| GmailError(format!("Request failed: {}", e)))?;
    read_response(resp)
}

fn http_client() -> Result<reqwest::blocking::Client, GmailError> {
    reqwest::blocking::Client::builder()
        .timeout(Duration::from_secs(30))
        .build()
        .map_err(|e| GmailError(format!("HTTP client error: {}", e)))
}

fn read_response(resp: reqwest::blocking::Response) -> Result<Value, GmailError> {
    let status = resp.status();
    let body = resp
        .text()
        .map_err(|e| GmailError(format!("Failed to read response: {}", e)))?;

    if !status.is_success() {
        let detail = serde_json::from_str::<Value>(&body)
            .ok()
            .and_then(|v| {
                v.get("error")
                    .and_then(|e| e.get("message"))
                    .and_then(|m| m.as_str())
                    .map(String::from)
            })
            .unwrap_or_else(|| format!("HTTP {} error", status));
        return Err(GmailError(detail));
    }

    serde_json::from_str(&body).map_err(|e| GmailError(format!("JSON parse error: {}", e)))
}
