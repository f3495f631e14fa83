#![cfg(test)]

use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use std::cell::Cell;
use std::time::{Duration, Instant};

use crate::ai::{prompts, GenError};
use crate::crypto::Cipher;
use crate::db::{run_migrations, DbPool};
use crate::google::auth::{parse_token_response, CredentialBundle};
use crate::google::{gmail, sheets};
use crate::models::draft_history::DraftRecord;
use crate::models::user::User;
use crate::rate_limit::CallPacer;
use crate::report;

use base64::{engine::general_purpose::URL_SAFE, engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use chrono::NaiveDate;
use rusqlite::params;
use serde_json::json;

/// Atomic counter for unique shared-cache DB names so parallel tests don't collide.
static TEST_DB_COUNTER: std::sync::atomic::AtomicU64 = std::sync::atomic::AtomicU64::new(0);

/// Create a fresh in-memory SQLite pool with migrations applied. Uses a
/// named shared-cache in-memory DB so multiple connections see the same data.
fn test_pool() -> DbPool {
    let id = TEST_DB_COUNTER.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
    let uri = format!("file:testdb_{}?mode=memory&cache=shared", id);
    let manager = SqliteConnectionManager::file(uri);
    let pool = Pool::builder()
        .max_size(2)
        .build(manager)
        .expect("Failed to create test pool");
    {
        let conn = pool.get().unwrap();
        conn.execute_batch("PRAGMA foreign_keys=ON;").unwrap();
    }
    run_migrations(&pool).expect("Failed to run migrations");
    pool
}

fn test_cipher() -> Cipher {
    Cipher::new([7u8; 32])
}

fn make_bundle() -> CredentialBundle {
    CredentialBundle {
        token: "ya29.test-access".to_string(),
        refresh_token: "1//refresh".to_string(),
        token_uri: "https://oauth2.googleapis.com/token".to_string(),
        client_id: "client-id.apps.googleusercontent.com".to_string(),
        client_secret: "shhh".to_string(),
        scopes: vec![
            "https://www.googleapis.com/auth/spreadsheets.readonly".to_string(),
            "https://www.googleapis.com/auth/gmail.compose".to_string(),
        ],
    }
}

// ═══════════════════════════════════════════════════════════
// Crypto
// ═══════════════════════════════════════════════════════════

#[test]
fn crypto_roundtrip() {
    let cipher = test_cipher();
    let blob = cipher.encrypt_str("AIzaSy-secret-key").unwrap();
    assert_ne!(blob, "AIzaSy-secret-key");
    assert_eq!(
        cipher.decrypt_str(&blob).as_deref(),
        Some("AIzaSy-secret-key")
    );
}

#[test]
fn crypto_wrong_key_yields_none() {
    let blob = test_cipher().encrypt_str("secret").unwrap();
    let other = Cipher::new([9u8; 32]);
    assert_eq!(other.decrypt_str(&blob), None);
}

#[test]
fn crypto_tampered_blob_yields_none() {
    let cipher = test_cipher();
    let blob = cipher.encrypt_str("secret").unwrap();

    // Flip a character somewhere in the middle of the blob
    let mut tampered: Vec<char> = blob.chars().collect();
    let mid = tampered.len() / 2;
    tampered[mid] = if tampered[mid] == 'A' { 'B' } else { 'A' };
    let tampered: String = tampered.into_iter().collect();

    assert_eq!(cipher.decrypt_str(&tampered), None);
}

#[test]
fn crypto_garbage_blob_yields_none() {
    let cipher = test_cipher();
    assert_eq!(cipher.decrypt_str("not base64 at all!!"), None);
    assert_eq!(cipher.decrypt_str("QUJD"), None); // valid base64, too short
}

#[test]
fn crypto_nonce_varies_between_encryptions() {
    let cipher = test_cipher();
    let a = cipher.encrypt_str("same input").unwrap();
    let b = cipher.encrypt_str("same input").unwrap();
    assert_ne!(a, b);
}

// ═══════════════════════════════════════════════════════════
// Credential store
// ═══════════════════════════════════════════════════════════

#[test]
fn user_save_get_roundtrip() {
    let pool = test_pool();
    let cipher = test_cipher();
    let bundle = make_bundle();

    let user_id = User::save(&pool, &cipher, "a@example.com", "AIzaSy-key", Some(&bundle)).unwrap();
    assert!(user_id > 0);

    let user = User::get(&pool, &cipher, "a@example.com").unwrap();
    assert_eq!(user.id, user_id);
    assert_eq!(user.email, "a@example.com");
    assert_eq!(user.gemini_api_key.as_deref(), Some("AIzaSy-key"));
    assert_eq!(user.credentials, Some(bundle));
}

#[test]
fn user_upsert_keeps_one_row_second_key_wins() {
    let pool = test_pool();
    let cipher = test_cipher();

    let id1 = User::save(&pool, &cipher, "a@example.com", "first-key", None).unwrap();
    let id2 = User::save(&pool, &cipher, "a@example.com", "second-key", None).unwrap();
    assert_eq!(id1, id2);

    let conn = pool.get().unwrap();
    let count: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM users WHERE email = ?1",
            params!["a@example.com"],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(count, 1);

    let user = User::get(&pool, &cipher, "a@example.com").unwrap();
    assert_eq!(user.gemini_api_key.as_deref(), Some("second-key"));
}

#[test]
fn user_get_missing_is_none() {
    let pool = test_pool();
    assert!(User::get(&pool, &test_cipher(), "missing@x.com").is_none());
}

#[test]
fn user_corrupted_secret_degrades_to_none() {
    let pool = test_pool();
    let cipher = test_cipher();
    User::save(&pool, &cipher, "a@example.com", "key", Some(&make_bundle())).unwrap();

    // Corrupt both blobs directly
    let conn = pool.get().unwrap();
    conn.execute(
        "UPDATE users SET gemini_key_encrypted = 'garbage',
                          google_credentials_encrypted = 'garbage'
         WHERE email = ?1",
        params!["a@example.com"],
    )
    .unwrap();

    let user = User::get(&pool, &cipher, "a@example.com").unwrap();
    assert_eq!(user.gemini_api_key, None);
    assert_eq!(user.credentials, None);
}

#[test]
fn user_malformed_bundle_json_degrades_to_none() {
    let pool = test_pool();
    let cipher = test_cipher();
    User::save(&pool, &cipher, "a@example.com", "key", None).unwrap();

    // Encrypted blob that decrypts fine but is missing required fields
    let blob = cipher.encrypt_str(r#"{"token": "only-a-token"}"#).unwrap();
    let conn = pool.get().unwrap();
    conn.execute(
        "UPDATE users SET google_credentials_encrypted = ?1 WHERE email = ?2",
        params![blob, "a@example.com"],
    )
    .unwrap();

    let user = User::get(&pool, &cipher, "a@example.com").unwrap();
    assert_eq!(user.credentials, None);
}

#[test]
fn user_delete_cascades_history() {
    let pool = test_pool();
    let cipher = test_cipher();
    let user_id = User::save(&pool, &cipher, "a@example.com", "key", None).unwrap();

    DraftRecord::log(&pool, user_id, "r-100", "Subject A", "boss@example.com");
    DraftRecord::log(&pool, user_id, "r-101", "Subject B", "boss@example.com");

    User::delete(&pool, "a@example.com").unwrap();

    assert!(User::get(&pool, &cipher, "a@example.com").is_none());
    let conn = pool.get().unwrap();
    let remaining: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM draft_history WHERE user_id = ?1",
            params![user_id],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(remaining, 0);
}

#[test]
fn user_delete_missing_is_err() {
    let pool = test_pool();
    assert!(User::delete(&pool, "missing@x.com").is_err());
}

#[test]
fn user_list_orders_by_last_login() {
    let pool = test_pool();
    let cipher = test_cipher();
    User::save(&pool, &cipher, "old@example.com", "k1", None).unwrap();
    User::save(&pool, &cipher, "new@example.com", "k2", None).unwrap();

    // Separate the logins deterministically (CURRENT_TIMESTAMP only has
    // second resolution)
    let conn = pool.get().unwrap();
    conn.execute(
        "UPDATE users SET last_login = datetime('now', '-1 day') WHERE email = 'old@example.com'",
        [],
    )
    .unwrap();

    assert_eq!(
        User::list_emails(&pool),
        vec!["new@example.com".to_string(), "old@example.com".to_string()]
    );

    // Logging in again moves the stale account back to the front
    conn.execute(
        "UPDATE users SET last_login = datetime('now', '-1 hour') WHERE email = 'new@example.com'",
        [],
    )
    .unwrap();
    drop(conn);
    User::save(&pool, &cipher, "old@example.com", "k1", None).unwrap();
    assert_eq!(
        User::list_emails(&pool),
        vec!["old@example.com".to_string(), "new@example.com".to_string()]
    );
}

#[test]
fn user_clear_credentials() {
    let pool = test_pool();
    let cipher = test_cipher();
    User::save(&pool, &cipher, "a@example.com", "key", Some(&make_bundle())).unwrap();

    User::clear_credentials(&pool, "a@example.com").unwrap();

    let user = User::get(&pool, &cipher, "a@example.com").unwrap();
    assert_eq!(user.credentials, None);
    assert_eq!(user.gemini_api_key.as_deref(), Some("key"));
}

#[test]
fn fingerprint_save_and_lookup() {
    let pool = test_pool();
    let cipher = test_cipher();
    User::save(&pool, &cipher, "a@example.com", "key", None).unwrap();

    assert_eq!(User::find_by_fingerprint(&pool, "abc123"), None);

    User::save_fingerprint(&pool, "a@example.com", "abc123").unwrap();
    assert_eq!(
        User::find_by_fingerprint(&pool, "abc123").as_deref(),
        Some("a@example.com")
    );
}

// ═══════════════════════════════════════════════════════════
// Draft history
// ═══════════════════════════════════════════════════════════

#[test]
fn draft_history_newest_first_with_limit() {
    let pool = test_pool();
    let cipher = test_cipher();
    let user_id = User::save(&pool, &cipher, "a@example.com", "key", None).unwrap();

    for i in 0..5 {
        DraftRecord::log(
            &pool,
            user_id,
            &format!("r-{}", i),
            &format!("Subject {}", i),
            "boss@example.com",
        );
    }

    let records = DraftRecord::list_for_user(&pool, user_id, 3);
    assert_eq!(records.len(), 3);
    assert_eq!(records[0].draft_id, "r-4");
    assert_eq!(records[1].draft_id, "r-3");
    assert_eq!(records[2].draft_id, "r-2");
}

#[test]
fn draft_history_scoped_to_user() {
    let pool = test_pool();
    let cipher = test_cipher();
    let a = User::save(&pool, &cipher, "a@example.com", "key", None).unwrap();
    let b = User::save(&pool, &cipher, "b@example.com", "key", None).unwrap();

    DraftRecord::log(&pool, a, "r-a", "A", "x@example.com");
    DraftRecord::log(&pool, b, "r-b", "B", "x@example.com");

    let records = DraftRecord::list_for_user(&pool, a, 10);
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].draft_id, "r-a");
}

// ═══════════════════════════════════════════════════════════
// Rate limiting
// ═══════════════════════════════════════════════════════════

#[test]
fn pacer_first_call_does_not_wait() {
    let pacer = CallPacer::new(Duration::from_millis(200));
    let start = Instant::now();
    pacer.wait_if_needed();
    assert!(start.elapsed() < Duration::from_millis(50));
}

#[test]
fn pacer_enforces_min_interval_between_dispatches() {
    let pacer = CallPacer::new(Duration::from_millis(150));

    let start = Instant::now();
    pacer.wait_if_needed();
    pacer.record_call(); // first dispatch
    pacer.wait_if_needed(); // must block for the remainder
    pacer.record_call(); // second dispatch

    assert!(start.elapsed() >= Duration::from_millis(150));
}

#[test]
fn pacer_does_not_wait_after_interval_elapsed() {
    let pacer = CallPacer::new(Duration::from_millis(30));
    pacer.record_call();
    std::thread::sleep(Duration::from_millis(40));

    let start = Instant::now();
    pacer.wait_if_needed();
    assert!(start.elapsed() < Duration::from_millis(20));
}

// ═══════════════════════════════════════════════════════════
// Retry policy
// ═══════════════════════════════════════════════════════════

#[test]
fn quota_error_retried_exactly_once_after_backoff() {
    let pacer = CallPacer::new(Duration::from_millis(1));
    let calls = Cell::new(0u32);
    let backoff = Duration::from_millis(40);

    let start = Instant::now();
    let result = report::generate_with_retry(&pacer, backoff, || {
        calls.set(calls.get() + 1);
        if calls.get() == 1 {
            Err(GenError::RateLimited)
        } else {
            Ok("recovered".to_string())
        }
    });

    assert_eq!(result.unwrap(), "recovered");
    assert_eq!(calls.get(), 2);
    assert!(start.elapsed() >= backoff);
}

#[test]
fn quota_error_twice_surfaces_after_single_retry() {
    let pacer = CallPacer::new(Duration::from_millis(1));
    let calls = Cell::new(0u32);

    let result = report::generate_with_retry(&pacer, Duration::from_millis(1), || {
        calls.set(calls.get() + 1);
        Err(GenError::RateLimited)
    });

    assert_eq!(result, Err(GenError::RateLimited));
    assert_eq!(calls.get(), 2);
}

#[test]
fn non_quota_error_never_retried() {
    let pacer = CallPacer::new(Duration::from_millis(1));
    let calls = Cell::new(0u32);

    let result = report::generate_with_retry(&pacer, Duration::from_millis(1), || {
        calls.set(calls.get() + 1);
        Err(GenError::InvalidKey)
    });

    assert_eq!(result, Err(GenError::InvalidKey));
    assert_eq!(calls.get(), 1);
}

#[test]
fn success_needs_single_call() {
    let pacer = CallPacer::new(Duration::from_millis(1));
    let calls = Cell::new(0u32);

    let result = report::generate_with_retry(&pacer, Duration::from_millis(1), || {
        calls.set(calls.get() + 1);
        Ok("done".to_string())
    });

    assert_eq!(result.unwrap(), "done");
    assert_eq!(calls.get(), 1);
}

// ═══════════════════════════════════════════════════════════
// Generation errors
// ═══════════════════════════════════════════════════════════

#[test]
fn gen_error_classification() {
    assert_eq!(
        GenError::classify("400 Bad Request: API key not valid. Please pass a valid API key."),
        GenError::InvalidKey
    );
    assert_eq!(
        GenError::classify("429 Too Many Requests: RESOURCE_EXHAUSTED"),
        GenError::RateLimited
    );
    assert_eq!(
        GenError::classify("You exceeded your current quota, please check your plan."),
        GenError::RateLimited
    );
    assert_eq!(GenError::classify("operation timeout"), GenError::Timeout);
    assert!(matches!(
        GenError::classify("500 Internal Server Error: boom"),
        GenError::Other(_)
    ));
}

#[test]
fn gen_error_detail_truncated_to_300_chars() {
    let long = "x".repeat(500);
    match GenError::classify(&long) {
        GenError::Other(detail) => assert_eq!(detail.chars().count(), 300),
        other => panic!("expected Other, got {:?}", other),
    }
}

#[test]
fn rate_limited_display_carries_guidance() {
    let msg = GenError::RateLimited.to_string();
    assert!(msg.contains("90 seconds"));
    assert!(msg.contains("15 requests"));
}

#[test]
fn only_rate_limited_is_retryable() {
    assert!(GenError::RateLimited.is_retryable());
    assert!(!GenError::InvalidKey.is_retryable());
    assert!(!GenError::Timeout.is_retryable());
    assert!(!GenError::Other("x".to_string()).is_retryable());
}

// ═══════════════════════════════════════════════════════════
// Prompt building
// ═══════════════════════════════════════════════════════════

fn grid(rows: &[&[&str]]) -> Vec<Vec<String>> {
    rows.iter()
        .map(|r| r.iter().map(|c| c.to_string()).collect())
        .collect()
}

#[test]
fn sheet_data_numbering_starts_at_one() {
    let data = prompts::format_sheet_data(&grid(&[
        &["Task", "Status"],
        &["Alpha", "Done"],
        &["Beta", "Open"],
    ]));

    assert!(data.starts_with("COLUMNS: Task | Status\n\n"));
    assert!(data.contains("1. Alpha | Done\n"));
    assert!(data.contains("2. Beta | Open\n"));
}

#[test]
fn short_rows_padded_to_header_width() {
    let data = prompts::format_sheet_data(&grid(&[
        &["Task", "Status", "Target Date"],
        &["Alpha"],
    ]));

    assert!(data.contains("1. Alpha |  | \n"));
}

#[test]
fn long_rows_keep_extra_cells() {
    let data = prompts::format_sheet_data(&grid(&[&["Task"], &["Alpha", "extra"]]));
    assert!(data.contains("1. Alpha | extra\n"));
}

#[test]
fn prompt_example_scenario() {
    let rows = grid(&[
        &["Task", "Status", "Target Date", "Actual Date"],
        &["Fix bug", "Completed", "2024-01-02", "2024-01-02"],
    ]);
    let prompt = prompts::daily_status(&rows, "01/03/2024", "2024-01-02");

    assert!(prompt.contains("1. Fix bug | Completed | 2024-01-02 | 2024-01-02"));
    assert!(prompt.contains("Today: 01/03/2024 | Yesterday: 2024-01-02"));
    // Row-inclusion policy names yesterday for completed items
    assert!(prompt.contains("Status=\"Completed\" AND Actual Date=2024-01-02"));
    assert!(prompt.contains("Status=\"Not Started\" AND Target Date<=01/03/2024"));
}

#[test]
fn prompt_embeds_table_template() {
    let rows = grid(&[&["Task"], &["Alpha"]]);
    let prompt = prompts::daily_status(&rows, "01/03/2024", "01/02/2024");
    assert!(prompt.contains("<table style=\"border-collapse: collapse;"));
    assert!(prompt.contains("Target Date of Completion"));
    assert!(prompt.ends_with("1. Alpha\n"));
}

// ═══════════════════════════════════════════════════════════
// Composer
// ═══════════════════════════════════════════════════════════

#[test]
fn compose_rejects_empty_grid() {
    let pacer = CallPacer::new(Duration::from_millis(1));
    let result = report::compose(&pacer, "some-key", &[]);
    assert!(matches!(result, Err(GenError::Other(_))));
}

#[test]
fn week_of_month_monday_start() {
    // January 2024 starts on a Monday
    let d = |day| NaiveDate::from_ymd_opt(2024, 1, day).unwrap();
    assert_eq!(report::week_of_month(d(1)), 1);
    assert_eq!(report::week_of_month(d(7)), 1);
    assert_eq!(report::week_of_month(d(8)), 2);
    assert_eq!(report::week_of_month(d(31)), 5);
}

#[test]
fn week_of_month_sunday_start() {
    // September 2024 starts on a Sunday
    let d = |day| NaiveDate::from_ymd_opt(2024, 9, day).unwrap();
    assert_eq!(report::week_of_month(d(1)), 1);
    assert_eq!(report::week_of_month(d(2)), 2);
}

#[test]
fn email_subject_format() {
    let date = NaiveDate::from_ymd_opt(2024, 1, 8).unwrap();
    assert_eq!(
        report::email_subject(date),
        "[01/08/2024]: Week 2 Daily Status Report"
    );
}

// ═══════════════════════════════════════════════════════════
// Draft publishing
// ═══════════════════════════════════════════════════════════

#[test]
fn body_transform_tables_pass_through() {
    let table = "<table><tr><td>A\nB</td></tr></table>";
    let html = gmail::body_to_html(&format!("Before\n{}\nAfter", table));

    // The table keeps its raw newline; text outside converts
    assert!(html.contains(table));
    assert!(html.contains("Before<br>"));
    assert!(html.contains("<br>After"));
}

#[test]
fn body_transform_bullets_and_breaks() {
    let html = gmail::body_to_html("Key highlights:\n* first\n* second");
    assert!(html.contains("Key highlights:<br>\u{2022} first<br>\u{2022} second"));
}

#[test]
fn body_transform_wraps_in_shell() {
    let html = gmail::body_to_html("Hello");
    assert!(html.starts_with("<!DOCTYPE html>"));
    assert!(html.contains("font-family: Calibri"));
    assert!(html.contains("max-width: 800px"));
    assert!(html.ends_with("</html>"));
}

#[test]
fn raw_message_is_base64url_with_headers() {
    let raw = gmail::build_raw_message("boss@example.com", "Hello there", "<p>hi</p>");

    assert!(!raw.contains('+'));
    assert!(!raw.contains('/'));
    assert!(!raw.contains('='));

    let decoded = String::from_utf8(URL_SAFE_NO_PAD.decode(&raw).unwrap()).unwrap();
    assert!(decoded.contains("To: boss@example.com\r\n"));
    assert!(decoded.contains("Subject: Hello there\r\n"));
    assert!(decoded.contains("Content-Type: text/html; charset=UTF-8"));
    assert!(decoded.ends_with("<p>hi</p>"));
}

#[test]
fn extract_body_prefers_html_part() {
    let payload = json!({
        "parts": [
            {"mimeType": "text/plain", "body": {"data": URL_SAFE_NO_PAD.encode("plain text")}},
            {"mimeType": "text/html", "body": {"data": URL_SAFE_NO_PAD.encode("<p>rich</p>")}}
        ]
    });
    assert_eq!(gmail::extract_body(&payload), "<p>rich</p>");
}

#[test]
fn extract_body_falls_back_to_plain_part() {
    let payload = json!({
        "parts": [
            {"mimeType": "text/plain", "body": {"data": URL_SAFE_NO_PAD.encode("plain text")}}
        ]
    });
    assert_eq!(gmail::extract_body(&payload), "plain text");
}

#[test]
fn extract_body_single_part_payload() {
    let payload = json!({
        "body": {"data": URL_SAFE_NO_PAD.encode("<b>solo</b>")}
    });
    assert_eq!(gmail::extract_body(&payload), "<b>solo</b>");
}

#[test]
fn extract_body_tolerates_padded_base64() {
    let payload = json!({
        "body": {"data": URL_SAFE.encode("pad me!")}
    });
    assert_eq!(gmail::extract_body(&payload), "pad me!");
}

#[test]
fn strip_wrapper_round_trips_published_body() {
    let html = gmail::body_to_html("Hello\n* item");
    let stripped = gmail::strip_wrapper_html(&html);

    assert!(!stripped.contains("DOCTYPE"));
    assert!(!stripped.contains("<body"));
    assert!(!stripped.contains("<head"));
    assert!(!stripped.contains("max-width"));
    assert!(!stripped.contains("</div>"));
    assert!(stripped.contains("Hello<br>\u{2022} item"));
}

#[test]
fn strip_wrapper_keeps_inner_divs() {
    let html = gmail::body_to_html("<div>kept</div>");
    let stripped = gmail::strip_wrapper_html(&html);
    assert!(stripped.contains("<div>kept</div>"));
}

// ═══════════════════════════════════════════════════════════
// Sheets
// ═══════════════════════════════════════════════════════════

#[test]
fn sheet_values_coerced_to_strings() {
    let json = json!({"values": [["Task", "Count"], ["Alpha", 3, true]]});
    assert_eq!(
        sheets::parse_values(&json),
        vec![
            vec!["Task".to_string(), "Count".to_string()],
            vec!["Alpha".to_string(), "3".to_string(), "true".to_string()],
        ]
    );
}

#[test]
fn sheet_missing_values_is_empty() {
    assert!(sheets::parse_values(&json!({})).is_empty());
}

#[test]
fn sheet_error_classification() {
    assert!(matches!(
        sheets::classify_status(404, ""),
        sheets::SheetsError::NotFound
    ));
    assert!(matches!(
        sheets::classify_status(403, ""),
        sheets::SheetsError::PermissionDenied
    ));

    let body = r#"{"error": {"code": 500, "message": "backend hiccup"}}"#;
    match sheets::classify_status(500, body) {
        sheets::SheetsError::Other(detail) => assert!(detail.contains("backend hiccup")),
        other => panic!("expected Other, got {:?}", other),
    }
}

// ═══════════════════════════════════════════════════════════
// OAuth plumbing
// ═══════════════════════════════════════════════════════════

#[test]
fn token_response_parses_fields() {
    let body = r#"{
        "access_token": "ya29.fresh",
        "refresh_token": "1//rt",
        "expires_in": 3599,
        "scope": "openid https://www.googleapis.com/auth/gmail.compose"
    }"#;

    let (access, refresh, scopes) = parse_token_response(body).unwrap();
    assert_eq!(access, "ya29.fresh");
    assert_eq!(refresh.as_deref(), Some("1//rt"));
    assert_eq!(scopes.len(), 2);
}

#[test]
fn token_response_error_is_err() {
    let body = r#"{"error": "invalid_grant", "error_description": "Token has been revoked"}"#;
    let err = parse_token_response(body).unwrap_err();
    assert!(err.contains("invalid_grant"));
    assert!(err.contains("revoked"));
}
