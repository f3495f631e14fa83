use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

const AUTH_ENDPOINT: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const DEFAULT_TOKEN_ENDPOINT: &str = "https://oauth2.googleapis.com/token";
const USERINFO_ENDPOINT: &str = "https://www.googleapis.com/oauth2/v2/userinfo";

/// Out-of-band redirect: the user copies the code from the browser.
const REDIRECT_URI: &str = "urn:ietf:wg:oauth:2.0:oob";

pub const SCOPES: &[&str] = &[
    "https://www.googleapis.com/auth/spreadsheets.readonly",
    "https://www.googleapis.com/auth/gmail.compose",
    "https://www.googleapis.com/auth/userinfo.email",
    "openid",
];

// ── Credential bundle ─────────────────────────────────

/// The delegated OAuth credential set persisted (encrypted) per account.
/// Deserialization validates the required fields: a stored blob missing
/// any of them fails to decode and the account re-authenticates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CredentialBundle {
    pub token: String,
    pub refresh_token: String,
    pub token_uri: String,
    pub client_id: String,
    pub client_secret: String,
    #[serde(default)]
    pub scopes: Vec<String>,
}

// ── Client secrets file ───────────────────────────────

/// A Google Cloud "installed app" OAuth client file (credentials.json).
#[derive(Debug, Clone, Deserialize)]
pub struct ClientSecrets {
    pub client_id: String,
    pub client_secret: String,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
    /// SHA-256 of the raw file, used to detect the same client file being
    /// registered under more than one account.
    #[serde(skip)]
    pub fingerprint: String,
}

fn default_token_uri() -> String {
    DEFAULT_TOKEN_ENDPOINT.to_string()
}

impl ClientSecrets {
    pub fn load(path: &Path) -> Result<Self, String> {
        let bytes = std::fs::read(path)
            .map_err(|e| format!("Failed to read {}: {}", path.display(), e))?;
        let root: Value = serde_json::from_slice(&bytes)
            .map_err(|e| format!("Invalid credentials file: {}", e))?;

        let section = root
            .get("installed")
            .or_else(|| root.get("web"))
            .ok_or("Credentials file has no \"installed\" or \"web\" section")?;

        let mut secrets: ClientSecrets = serde_json::from_value(section.clone())
            .map_err(|e| format!("Invalid credentials file: {}", e))?;
        secrets.fingerprint = fingerprint(&bytes);
        Ok(secrets)
    }
}

// ── Authorization flow ────────────────────────────────

/// The consent URL the user opens in a browser. Offline access so a
/// refresh token is granted.
pub fn authorize_url(secrets: &ClientSecrets) -> String {
    let scope_str = SCOPES.join(" ");
    format!(
        "{}?client_id={}&redirect_uri={}&response_type=code&scope={}&access_type=offline&prompt=consent",
        AUTH_ENDPOINT,
        urlencoding::encode(&secrets.client_id),
        urlencoding::encode(REDIRECT_URI),
        urlencoding::encode(&scope_str),
    )
}

/// Exchange a pasted authorization code for a credential bundle.
pub fn exchange_code(secrets: &ClientSecrets, code: &str) -> Result<CredentialBundle, String> {
    let mut params = HashMap::new();
    params.insert("client_id", secrets.client_id.as_str());
    params.insert("client_secret", secrets.client_secret.as_str());
    params.insert("code", code);
    params.insert("grant_type", "authorization_code");
    params.insert("redirect_uri", REDIRECT_URI);

    let body = post_form(&secrets.token_uri, &params)?;
    let (token, refresh_token, scopes) = parse_token_response(&body)?;

    Ok(CredentialBundle {
        token,
        refresh_token: refresh_token.unwrap_or_default(),
        token_uri: secrets.token_uri.clone(),
        client_id: secrets.client_id.clone(),
        client_secret: secrets.client_secret.clone(),
        scopes,
    })
}

/// Silent refresh: trade the stored refresh token for a fresh access
/// token. Callers drop the credentials and require re-authentication
/// when this fails.
pub fn refresh(bundle: &CredentialBundle) -> Result<CredentialBundle, String> {
    if bundle.refresh_token.is_empty() {
        return Err("No refresh token stored".to_string());
    }

    let mut params = HashMap::new();
    params.insert("client_id", bundle.client_id.as_str());
    params.insert("client_secret", bundle.client_secret.as_str());
    params.insert("refresh_token", bundle.refresh_token.as_str());
    params.insert("grant_type", "refresh_token");

    let token_uri = if bundle.token_uri.is_empty() {
        DEFAULT_TOKEN_ENDPOINT
    } else {
        bundle.token_uri.as_str()
    };

    let body = post_form(token_uri, &params)?;
    let (token, refresh_token, scopes) = parse_token_response(&body)?;

    let mut refreshed = bundle.clone();
    refreshed.token = token;
    if let Some(rt) = refresh_token {
        refreshed.refresh_token = rt;
    }
    if !scopes.is_empty() {
        refreshed.scopes = scopes;
    }
    Ok(refreshed)
}

/// The authenticated user's email address.
pub fn user_email(access_token: &str) -> Result<String, String> {
    let client = reqwest::blocking::Client::builder()
        .timeout(Duration::from_secs(30))
        .build()
        .map_err(|e| format!("HTTP client error: {}", e))?;

    let resp = client
        .get(USERINFO_ENDPOINT)
        .bearer_auth(access_token)
        .send()
        .map_err(|e| format!("Userinfo request failed: {}", e))?;

    if !resp.status().is_success() {
        return Err(format!("Userinfo returned {}", resp.status()));
    }

    let json: Value = resp
        .json()
        .map_err(|e| format!("Userinfo JSON parse error: {}", e))?;

    json.get("email")
        .and_then(|v| v.as_str())
        .map(String::from)
        .ok_or_else(|| "Userinfo response has no email".to_string())
}

/// Opaque fingerprint of a credential file: SHA-256 hex of its bytes.
pub fn fingerprint(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}

// ── Token endpoint plumbing ───────────────────────────

fn post_form(url: &str, params: &HashMap<&str, &str>) -> Result<String, String> {
    let client = reqwest::blocking::Client::builder()
        .timeout(Duration::from_secs(30))
        .build()
        .map_err(|e| format!("HTTP client error: {}", e))?;

    let resp = client
        .post(url)
        .form(params)
        .send()
        .map_err(|e| format!("Token request failed: {}", e))?;

    let status = resp.status();
    let body = resp
        .text()
        .map_err(|e| format!("Failed to read token response: {}", e))?;

    if !status.is_success() {
        // The OAuth error body is more useful than the status line
        if let Ok(parsed) = serde_json::from_str::<Value>(&body) {
            if let Some(desc) = parsed
                .get("error_description")
                .or_else(|| parsed.get("error"))
                .and_then(|v| v.as_str())
            {
                return Err(desc.to_string());
            }
        }
        return Err(format!("Token endpoint returned {}", status));
    }

    Ok(body)
}

/// Parse a token response into (access_token, refresh_token, scopes).
pub(crate) fn parse_token_response(
    body: &str,
) -> Result<(String, Option<String>, Vec<String>), String> {
    let parsed: Value =
        serde_json::from_str(body).map_err(|e| format!("Invalid token response: {}", e))?;

    if let Some(err) = parsed.get("error").and_then(|v| v.as_str()) {
        let desc = parsed
            .get("error_description")
            .and_then(|v| v.as_str())
            .unwrap_or("Unknown error");
        return Err(format!("{}: {}", err, desc));
    }

    let access_token = parsed
        .get("access_token")
        .and_then(|v| v.as_str())
        .ok_or("Missing access_token in response")?
        .to_string();

    let refresh_token = parsed
        .get("refresh_token")
        .and_then(|v| v.as_str())
        .map(String::from);

    let scopes = parsed
        .get("scope")
        .and_then(|v| v.as_str())
        .map(|s| s.split(' ').map(String::from).collect())
        .unwrap_or_default();

    Ok((access_token, refresh_token, scopes))
}
