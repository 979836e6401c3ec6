use super::SqliteStore;
use crate::{error::PetResult, persistence::UserSettings};
use chrono::Utc;
use rusqlite::{params, OptionalExtension};

impl SqliteStore {
    // ── Users ─────────────────────────────────────────────────────

    pub(super) fn insert_user_if_missing(&self, user_id: &str) -> PetResult<()> {
        self.conn()?.execute(
            "INSERT OR IGNORE INTO users (user_id, is_muted, created_at) VALUES (?1, 0, ?2)",
            params![user_id, Utc::now().timestamp_millis()],
        )?;
        Ok(())
    }

    pub(super) fn user_settings(&self, user_id: &str) -> PetResult<Option<UserSettings>> {
        let muted = self
            .conn()?
            .query_row(
                "SELECT is_muted FROM users WHERE user_id = ?1",
                params![user_id],
                |row| row.get::<_, i32>(0),
            )
            .optional()?;
        Ok(muted.map(|m| UserSettings { muted: m != 0 }))
    }

    pub(super) fn write_settings(&self, user_id: &str, settings: &UserSettings) -> PetResult<()> {
        self.conn()?.execute(
            "UPDATE users SET is_muted = ?2 WHERE user_id = ?1",
            params![user_id, settings.muted as i32],
        )?;
        Ok(())
    }

    pub fn user_count(&self) -> PetResult<u64> {
        let n: i64 = self
            .conn()?
            .query_row("SELECT COUNT(*) FROM users", [], |row| row.get(0))?;
        Ok(n as u64)
    }
}
