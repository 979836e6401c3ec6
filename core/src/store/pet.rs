use super::SqliteStore;
use crate::{error::PetResult, persistence::PetRecord};
use rusqlite::{params, OptionalExtension};

impl SqliteStore {
    // ── Pets ──────────────────────────────────────────────────────

    pub(super) fn upsert_pet(&self, user_id: &str, pet: &PetRecord) -> PetResult<()> {
        let state_json = serde_json::to_string(pet)?;
        self.conn()?.execute(
            "INSERT INTO pets (user_id, name, species, stage, regenmon_id, last_update, state_json)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
             ON CONFLICT (user_id) DO UPDATE SET
                name        = excluded.name,
                species     = excluded.species,
                stage       = excluded.stage,
                regenmon_id = excluded.regenmon_id,
                last_update = excluded.last_update,
                state_json  = excluded.state_json",
            params![
                user_id,
                pet.name,
                pet.species,
                pet.stage,
                pet.regenmon_id,
                pet.last_update,
                state_json,
            ],
        )?;
        Ok(())
    }

    pub(super) fn pet_for_user(&self, user_id: &str) -> PetResult<Option<PetRecord>> {
        let json = self
            .conn()?
            .query_row(
                "SELECT state_json FROM pets WHERE user_id = ?1",
                params![user_id],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        match json {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    pub(super) fn remove_pet(&self, user_id: &str) -> PetResult<()> {
        self.conn()?
            .execute("DELETE FROM pets WHERE user_id = ?1", params![user_id])?;
        Ok(())
    }

    /// Pets per stage, for the runner's summary.
    pub fn stage_counts(&self) -> PetResult<Vec<(String, u64)>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT stage, COUNT(*) FROM pets GROUP BY stage ORDER BY stage ASC",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)? as u64))
        })?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }
}
