use rusqlite::{params, OptionalExtension};

use crate::crypto::Cipher;
use crate::db::DbPool;
use crate::google::auth::CredentialBundle;

/// A stored account: one Google identity plus its secrets. Secret fields
/// come back as `None` when absent or when decryption fails (wrong key,
/// corrupted blob); callers route both to re-authentication.
#[derive(Debug)]
pub struct User {
    pub id: i64,
    pub email: String,
    pub gemini_api_key: Option<String>,
    pub credentials: Option<CredentialBundle>,
    pub creds_fingerprint: Option<String>,
    pub created_at: String,
    pub last_login: String,
}

impl User {
    // ── Save / upsert ──

    /// Save or update an account keyed by email. Both secret fields are
    /// encrypted before the write; an existing row gets its secrets
    /// replaced and `last_login` refreshed. Never fails on duplicates.
    pub fn save(
        pool: &DbPool,
        cipher: &Cipher,
        email: &str,
        gemini_api_key: &str,
        credentials: Option<&CredentialBundle>,
    ) -> Result<i64, String> {
        let conn = pool.get().map_err(|e| e.to_string())?;

        let enc_key = cipher.encrypt_str(gemini_api_key)?;
        let enc_creds = match credentials {
            Some(bundle) => {
                let json = serde_json::to_string(bundle)
                    .map_err(|e| format!("Failed to serialize credentials: {}", e))?;
                Some(cipher.encrypt_str(&json)?)
            }
            None => None,
        };

        conn.execute(
            "INSERT INTO users (email, gemini_key_encrypted, google_credentials_encrypted)
             VALUES (?1, ?2, ?3)
             ON CONFLICT(email) DO UPDATE SET
                 gemini_key_encrypted = excluded.gemini_key_encrypted,
                 google_credentials_encrypted = excluded.google_credentials_encrypted,
                 last_login = CURRENT_TIMESTAMP",
            params![email, enc_key, enc_creds],
        )
        .map_err(|e| e.to_string())?;

        conn.query_row(
            "SELECT id FROM users WHERE email = ?1",
            params![email],
            |row| row.get(0),
        )
        .map_err(|e| e.to_string())
    }

    // ── Lookups ──

    pub fn get(pool: &DbPool, cipher: &Cipher, email: &str) -> Option<User> {
        let conn = pool.get().ok()?;

        let raw = conn
            .query_row(
                "SELECT id, email, gemini_key_encrypted, google_credentials_encrypted,
                        creds_fingerprint, created_at, last_login
                 FROM users WHERE email = ?1",
                params![email],
                |row| {
                    Ok((
                        row.get::<_, i64>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, String>(2)?,
                        row.get::<_, Option<String>>(3)?,
                        row.get::<_, Option<String>>(4)?,
                        row.get::<_, String>(5)?,
                        row.get::<_, String>(6)?,
                    ))
                },
            )
            .optional()
            .ok()??;

        let (id, email, enc_key, enc_creds, fingerprint, created_at, last_login) = raw;

        let gemini_api_key = cipher.decrypt_str(&enc_key);
        let credentials = enc_creds
            .and_then(|blob| cipher.decrypt_str(&blob))
            .and_then(|json| serde_json::from_str::<CredentialBundle>(&json).ok());

        Some(User {
            id,
            email,
            gemini_api_key,
            credentials,
            creds_fingerprint: fingerprint,
            created_at,
            last_login,
        })
    }

    /// All registered emails, most recent login first.
    pub fn list_emails(pool: &DbPool) -> Vec<String> {
        let conn = match pool.get() {
            Ok(c) => c,
            Err(_) => return vec![],
        };
        conn.prepare("SELECT email FROM users ORDER BY last_login DESC")
            .and_then(|mut stmt| {
                stmt.query_map([], |row| row.get(0))
                    .map(|rows| rows.filter_map(|r| r.ok()).collect())
            })
            .unwrap_or_default()
    }

    // ── Delete ──

    /// Delete an account and its draft history in one transaction, so a
    /// mid-delete failure never leaves orphaned history rows.
    pub fn delete(pool: &DbPool, email: &str) -> Result<(), String> {
        let mut conn = pool.get().map_err(|e| e.to_string())?;
        let tx = conn.transaction().map_err(|e| e.to_string())?;

        let user_id: Option<i64> = tx
            .query_row(
                "SELECT id FROM users WHERE email = ?1",
                params![email],
                |row| row.get(0),
            )
            .optional()
            .map_err(|e| e.to_string())?;

        let user_id = match user_id {
            Some(id) => id,
            None => return Err(format!("No account found for {}", email)),
        };

        tx.execute(
            "DELETE FROM draft_history WHERE user_id = ?1",
            params![user_id],
        )
        .map_err(|e| e.to_string())?;
        tx.execute("DELETE FROM users WHERE id = ?1", params![user_id])
            .map_err(|e| e.to_string())?;

        tx.commit().map_err(|e| e.to_string())
    }

    // ── Credential maintenance ──

    /// Drop the stored OAuth bundle. Used when a silent refresh fails and
    /// the account has to re-authenticate from scratch.
    pub fn clear_credentials(pool: &DbPool, email: &str) -> Result<(), String> {
        let conn = pool.get().map_err(|e| e.to_string())?;
        conn.execute(
            "UPDATE users SET google_credentials_encrypted = NULL WHERE email = ?1",
            params![email],
        )
        .map_err(|e| e.to_string())?;
        Ok(())
    }

    // ── Fingerprints ──

    /// Which account, if any, already registered this credential-file
    /// fingerprint. Policy on collision is the caller's.
    pub fn find_by_fingerprint(pool: &DbPool, fingerprint: &str) -> Option<String> {
        let conn = pool.get().ok()?;
        conn.query_row(
            "SELECT email FROM users WHERE creds_fingerprint = ?1",
            params![fingerprint],
            |row| row.get(0),
        )
        .optional()
        .ok()?
    }

    pub fn save_fingerprint(pool: &DbPool, email: &str, fingerprint: &str) -> Result<(), String> {
        let conn = pool.get().map_err(|e| e.to_string())?;
        conn.execute(
            "UPDATE users SET creds_fingerprint = ?1 WHERE email = ?2",
            params![fingerprint, email],
        )
        .map_err(|e| e.to_string())?;
        Ok(())
    }
}
