//! SQLite persistence layer.
//!
//! RULE: Only the store talks to the database.
//! The controller reaches it through `PetRepository`; nothing else runs SQL.

mod pet;
mod user;

use crate::{
    error::{PetError, PetResult},
    persistence::{PetRecord, PetRepository, UserRecord, UserSettings},
};
use rusqlite::Connection;
use std::sync::{Mutex, MutexGuard};

pub struct SqliteStore {
    conn: Mutex<Connection>,
    path: Option<String>, // None for :memory:
}

impl SqliteStore {
    /// Open (or create) the database at `path`.
    pub fn open(path: &str) -> PetResult<Self> {
        let conn = Connection::open(path)?;
        // WAL mode only for real files.
        let _ = conn.execute_batch("PRAGMA journal_mode=WAL;");
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        Ok(Self {
            conn: Mutex::new(conn),
            path: Some(path.to_string()),
        })
    }

    /// Open an in-memory database (used in tests).
    pub fn in_memory() -> PetResult<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        Ok(Self {
            conn: Mutex::new(conn),
            path: None,
        })
    }

    pub fn path(&self) -> Option<&str> {
        self.path.as_deref()
    }

    /// Apply all schema migrations in order.
    pub fn migrate(&self) -> PetResult<()> {
        let conn = self.conn()?;
        conn.execute_batch(include_str!("../../../migrations/001_users.sql"))?;
        conn.execute_batch(include_str!("../../../migrations/002_pets.sql"))?;
        Ok(())
    }

    fn conn(&self) -> PetResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| PetError::InvalidState("store connection lock poisoned".into()))
    }
}

impl PetRepository for SqliteStore {
    fn get_user_record(&self, user_id: &str) -> PetResult<Option<UserRecord>> {
        let Some(settings) = self.user_settings(user_id)? else {
            return Ok(None);
        };
        let pet = self.pet_for_user(user_id)?;
        Ok(Some(UserRecord {
            user_id: user_id.to_string(),
            settings,
            pet,
        }))
    }

    fn upsert_user(&self, user_id: &str) -> PetResult<()> {
        self.insert_user_if_missing(user_id)
    }

    fn update_settings(&self, user_id: &str, settings: &UserSettings) -> PetResult<()> {
        self.insert_user_if_missing(user_id)?;
        self.write_settings(user_id, settings)
    }

    fn save_pet_state(&self, user_id: &str, pet: &PetRecord) -> PetResult<()> {
        self.insert_user_if_missing(user_id)?;
        self.upsert_pet(user_id, pet)
    }

    fn delete_pet(&self, user_id: &str) -> PetResult<()> {
        self.remove_pet(user_id)
    }
}
