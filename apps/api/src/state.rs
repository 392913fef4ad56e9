//! Shared application state handed to every handler.

use chrono::FixedOffset;
use kasir_db::Database;

/// Shared application state.
///
/// Cheap to clone: the database handle wraps a pooled connection set.
#[derive(Debug, Clone)]
pub struct AppState {
    pub db: Database,

    /// Store time zone; decides which calendar day "today" is.
    pub utc_offset: FixedOffset,
}

impl AppState {
    pub fn new(db: Database, utc_offset: FixedOffset) -> Self {
        AppState { db, utc_offset }
    }
}
