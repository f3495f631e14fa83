use chrono::{Datelike, Days, Local, NaiveDate};
use std::time::Duration;

use crate::ai::{gemini, prompts, GenError};
use crate::rate_limit::CallPacer;

/// Minimum spacing between generation calls, shared across all callers.
pub const MIN_CALL_INTERVAL: Duration = Duration::from_secs(6);
/// Fixed backoff before the single quota retry.
pub const QUOTA_RETRY_BACKOFF: Duration = Duration::from_secs(10);

/// Compose the status email from the sheet grid. Per call:
/// idle → (maybe) waiting-for-rate-limit → calling → success, or one
/// fixed-backoff retry when the failure is quota-classified, or a
/// terminal classified error. Returns the raw generated markup; the
/// caller decides how to render it.
pub fn compose(
    pacer: &CallPacer,
    api_key: &str,
    rows: &[Vec<String>],
) -> Result<String, GenError> {
    if rows.is_empty() {
        return Err(GenError::Other("No data to analyze".to_string()));
    }

    let today = Local::now().date_naive();
    let yesterday = today - Days::new(1);
    let prompt = prompts::daily_status(rows, &fmt_date(today), &fmt_date(yesterday));

    pacer.wait_if_needed();
    generate_with_retry(pacer, QUOTA_RETRY_BACKOFF, || {
        gemini::generate(api_key, &prompt)
    })
}

/// The retry policy, factored over the call itself: dispatch once, and on
/// a quota-classified failure sleep the fixed backoff and dispatch one
/// final time. Any other failure is terminal.
pub(crate) fn generate_with_retry(
    pacer: &CallPacer,
    backoff: Duration,
    mut call: impl FnMut() -> Result<String, GenError>,
) -> Result<String, GenError> {
    pacer.record_call();
    match call() {
        Ok(text) => Ok(text),
        Err(e) if e.is_retryable() => {
            log::warn!(
                "Generation hit a quota limit, retrying once in {}s",
                backoff.as_secs()
            );
            std::thread::sleep(backoff);
            pacer.record_call();
            call()
        }
        Err(e) => Err(e),
    }
}

// ── Subject line ──────────────────────────────────────

/// `[MM/DD/YYYY]: Week N Daily Status Report`
pub fn email_subject(date: NaiveDate) -> String {
    format!(
        "[{}]: Week {} Daily Status Report",
        date.format("%m/%d/%Y"),
        week_of_month(date)
    )
}

/// Week of the month, with weeks anchored on the weekday the month
/// started (Monday-based), so the 1st is always week 1.
pub(crate) fn week_of_month(date: NaiveDate) -> u32 {
    let first_weekday = date
        .with_day(1)
        .map(|d| d.weekday().num_days_from_monday())
        .unwrap_or(0);
    (date.day() + first_weekday - 1) / 7 + 1
}

fn fmt_date(date: NaiveDate) -> String {
    date.format("%m/%d/%Y").to_string()
}
