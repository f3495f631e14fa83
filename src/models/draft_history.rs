use rusqlite::params;
use serde::Serialize;

use crate::db::DbPool;

/// One filed draft. Append-only: rows are inserted and cascade-deleted
/// with their owning user, never updated.
#[derive(Debug, Serialize)]
pub struct DraftRecord {
    pub id: i64,
    pub user_id: i64,
    pub draft_id: String,
    pub subject: Option<String>,
    pub recipient: Option<String>,
    pub created_at: String,
}

impl DraftRecord {
    /// Fire-and-forget append. A failed insert loses one history row,
    /// never the draft itself.
    pub fn log(pool: &DbPool, user_id: i64, draft_id: &str, subject: &str, recipient: &str) {
        if let Ok(conn) = pool.get() {
            let _ = conn.execute(
                "INSERT INTO draft_history (user_id, draft_id, subject, recipient)
                 VALUES (?1, ?2, ?3, ?4)",
                params![user_id, draft_id, subject, recipient],
            );
        }
    }

    pub fn list_for_user(pool: &DbPool, user_id: i64, limit: i64) -> Vec<Self> {
        let conn = match pool.get() {
            Ok(c) => c,
            Err(_) => return vec![],
        };

        conn.prepare(
            "SELECT id, user_id, draft_id, subject, recipient, created_at
             FROM draft_history
             WHERE user_id = ?1
             ORDER BY created_at DESC, id DESC
             LIMIT ?2",
        )
        .and_then(|mut stmt| {
            stmt.query_map(params![user_id, limit], |row| {
                Ok(DraftRecord {
                    id: row.get(0)?,
                    user_id: row.get(1)?,
                    draft_id: row.get(2)?,
                    subject: row.get(3)?,
                    recipient: row.get(4)?,
                    created_at: row.get(5)?,
                })
            })
            .map(|rows| rows.filter_map(|r| r.ok()).collect())
        })
        .unwrap_or_default()
    }
}
