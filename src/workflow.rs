use chrono::Local;
use log::{info, warn};

use crate::crypto::Cipher;
use crate::db::DbPool;
use crate::google::auth::{self, ClientSecrets, CredentialBundle};
use crate::google::gmail::{self, DraftContent, DraftSummary};
use crate::google::sheets;
use crate::models::draft_history::DraftRecord;
use crate::models::user::User;
use crate::rate_limit::CallPacer;
use crate::report;

/// A loaded account with freshly refreshed credentials, ready for API
/// calls.
pub struct Session {
    pub user_id: i64,
    pub email: String,
    pub api_key: String,
    pub credentials: CredentialBundle,
}

pub struct Report {
    pub subject: String,
    pub recipient: String,
    pub body: String,
    /// `None` for a preview-only run.
    pub draft_id: Option<String>,
}

// ── Login ─────────────────────────────────────────────

/// Finish the authorization flow: exchange the pasted code, resolve the
/// account email, fingerprint the client file, and store everything
/// encrypted. Returns the account email.
pub fn complete_login(
    pool: &DbPool,
    cipher: &Cipher,
    secrets: &ClientSecrets,
    code: &str,
    api_key: &str,
) -> Result<String, String> {
    if api_key.trim().is_empty() {
        return Err("Enter a Gemini API key".to_string());
    }

    let bundle = auth::exchange_code(secrets, code)?;
    let email = auth::user_email(&bundle.token)?;

    if let Some(owner) = User::find_by_fingerprint(pool, &secrets.fingerprint) {
        if owner != email {
            warn!(
                "This credential file is already registered to {}",
                owner
            );
        }
    }

    let user_id = User::save(pool, cipher, &email, api_key.trim(), Some(&bundle))?;
    User::save_fingerprint(pool, &email, &secrets.fingerprint)?;

    info!("Account {} saved (user id {})", email, user_id);
    Ok(email)
}

/// Update just the Gemini API key for an existing account.
pub fn update_api_key(
    pool: &DbPool,
    cipher: &Cipher,
    email: &str,
    api_key: &str,
) -> Result<(), String> {
    if api_key.trim().is_empty() {
        return Err("Enter a Gemini API key".to_string());
    }

    let user = User::get(pool, cipher, email)
        .ok_or_else(|| format!("No account found for {}", email))?;
    User::save(pool, cipher, &user.email, api_key.trim(), user.credentials.as_ref())?;
    Ok(())
}

// ── Session ───────────────────────────────────────────

/// Load an account and silently refresh its access token once. A missing
/// or undecryptable secret, or a failed refresh, drops the credentials
/// and routes the account back to `login`.
pub fn load_session(pool: &DbPool, cipher: &Cipher, email: &str) -> Result<Session, String> {
    let user = User::get(pool, cipher, email)
        .ok_or_else(|| format!("No account found for {}", email))?;

    let api_key = user.gemini_api_key.ok_or_else(|| {
        "Stored Gemini API key could not be read. Run `daybrief login` again.".to_string()
    })?;

    let bundle = user.credentials.ok_or_else(|| {
        "No Google credentials on file. Run `daybrief login` to authenticate.".to_string()
    })?;

    let refreshed = match auth::refresh(&bundle) {
        Ok(b) => b,
        Err(e) => {
            warn!("Token refresh failed for {}: {}", user.email, e);
            let _ = User::clear_credentials(pool, &user.email);
            return Err(
                "Google authorization expired. Run `daybrief login` to re-authenticate."
                    .to_string(),
            );
        }
    };

    // Persist the new access token (and refresh last_login)
    User::save(pool, cipher, &user.email, &api_key, Some(&refreshed))?;

    Ok(Session {
        user_id: user.id,
        email: user.email,
        api_key,
        credentials: refreshed,
    })
}

// ── Report pipeline ───────────────────────────────────

/// The full pipeline: read the sheet, compose the email, and unless this
/// is a preview, file the draft and log it.
pub fn generate_report(
    pool: &DbPool,
    cipher: &Cipher,
    pacer: &CallPacer,
    email: &str,
    sheet_id: &str,
    range: &str,
    recipient: Option<&str>,
    preview: bool,
) -> Result<Report, String> {
    if sheet_id.trim().is_empty() {
        return Err("Enter a Google Sheets ID".to_string());
    }
    if let Some(r) = recipient {
        if r.trim().is_empty() {
            return Err("Enter a recipient email".to_string());
        }
    }

    let session = load_session(pool, cipher, email)?;
    let recipient = recipient.unwrap_or(&session.email).trim().to_string();

    let rows = sheets::read(&session.credentials.token, sheet_id.trim(), range)
        .map_err(|e| e.to_string())?;
    info!("{} rows read from sheet", rows.len());

    let body = report::compose(pacer, &session.api_key, &rows).map_err(|e| e.to_string())?;
    let subject = report::email_subject(Local::now().date_naive());

    let draft_id = if preview {
        None
    } else {
        let id = gmail::create_draft(&session.credentials.token, &recipient, &subject, &body)
            .map_err(|e| e.to_string())?;
        DraftRecord::log(pool, session.user_id, &id, &subject, &recipient);
        Some(id)
    };

    Ok(Report {
        subject,
        recipient,
        body,
        draft_id,
    })
}

// ── Draft inspection ──────────────────────────────────

pub fn list_drafts(
    pool: &DbPool,
    cipher: &Cipher,
    email: &str,
    max_results: usize,
) -> Result<Vec<DraftSummary>, String> {
    let session = load_session(pool, cipher, email)?;
    gmail::list_drafts(&session.credentials.token, max_results).map_err(|e| e.to_string())
}

pub fn show_draft(
    pool: &DbPool,
    cipher: &Cipher,
    email: &str,
    draft_id: &str,
) -> Result<DraftContent, String> {
    let session = load_session(pool, cipher, email)?;
    gmail::get_draft(&session.credentials.token, draft_id).map_err(|e| e.to_string())
}
