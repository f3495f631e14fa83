use log::{error, info, warn};
use std::fs;
use std::path::Path;
use std::process;

/// Required directories that will be created if missing
const REQUIRED_DIRS: &[&str] = &["data"];

/// Run all boot checks. Call this before opening the database.
/// Creates missing directories and aborts if the data directory is not
/// writable.
pub fn run() {
    info!("daybrief boot check starting...");

    let mut errors = 0u32;

    // ── 1. Directories ─────────────────────────────────
    for dir in REQUIRED_DIRS {
        let path = Path::new(dir);
        if !path.exists() {
            match fs::create_dir_all(path) {
                Ok(_) => info!("  Created directory: {}", dir),
                Err(e) => {
                    error!("  FAILED to create directory {}: {}", dir, e);
                    errors += 1;
                }
            }
        }
    }

    // ── 2. Data directory writable ──────────────────────
    let data_dir = Path::new("data");
    if data_dir.exists() {
        let test_file = data_dir.join(".write_test");
        match fs::write(&test_file, "test") {
            Ok(_) => {
                let _ = fs::remove_file(&test_file);
            }
            Err(e) => {
                error!("  Data directory not writable: {}", e);
                errors += 1;
            }
        }
    }

    // ── 3. Key material ─────────────────────────────────
    if std::env::var(crate::crypto::KEY_ENV_VAR).is_err()
        && Path::new(crate::crypto::KEY_FILE).exists()
    {
        warn!(
            "  Encryption key is read from {}; move it into {} when you can",
            crate::crypto::KEY_FILE,
            crate::crypto::KEY_ENV_VAR
        );
    }

    // ── Summary ─────────────────────────────────────────
    if errors > 0 {
        error!("Boot check FAILED: {} error(s). Aborting.", errors);
        process::exit(1);
    }

    info!("Boot check passed.");
}
