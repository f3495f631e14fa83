use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;

pub type DbPool = Pool<SqliteConnectionManager>;

pub fn init_pool() -> Result<DbPool, Box<dyn std::error::Error>> {
    let manager = SqliteConnectionManager::file("data/daybrief.db");
    let pool = Pool::builder().max_size(4).build(manager)?;

    // Enable WAL mode for better concurrent read performance
    let conn = pool.get()?;
    conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")?;

    Ok(pool)
}

pub fn run_migrations(pool: &DbPool) -> Result<(), Box<dyn std::error::Error>> {
    let conn = pool.get()?;

    conn.execute_batch(
        "
        -- Accounts: one row per Google identity, secrets encrypted at rest
        CREATE TABLE IF NOT EXISTS users (
            id INTEGER PRIMARY KEY,
            email TEXT UNIQUE NOT NULL,
            gemini_key_encrypted TEXT NOT NULL,
            google_credentials_encrypted TEXT,
            creds_fingerprint TEXT,
            created_at DATETIME DEFAULT CURRENT_TIMESTAMP,
            last_login DATETIME DEFAULT CURRENT_TIMESTAMP
        );

        -- Draft log: append-only, rows die with their owning user
        CREATE TABLE IF NOT EXISTS draft_history (
            id INTEGER PRIMARY KEY,
            user_id INTEGER NOT NULL,
            draft_id TEXT NOT NULL,
            subject TEXT,
            recipient TEXT,
            created_at DATETIME DEFAULT CURRENT_TIMESTAMP,
            FOREIGN KEY (user_id) REFERENCES users(id)
        );

        CREATE INDEX IF NOT EXISTS idx_draft_history_user ON draft_history(user_id);
        ",
    )?;

    Ok(())
}
