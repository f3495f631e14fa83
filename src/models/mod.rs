pub mod draft_history;
pub mod user;
