//! SQLite-backed contact store.
//!
//! Two related tables, `persons` and `phones`, joined on `phones.owner =
//! persons.id`. The store keeps an open session transaction: [`ContactStore::save`]
//! commits it, and dropping the store commits or rolls back depending on the
//! auto-save flag it was opened with.

use std::path::Path;

use chrono::{Local, NaiveDate};
use rusqlite::{params, Connection, OptionalExtension};
use thiserror::Error;
use tracing::{debug, warn};

use crate::model::{ContactRow, NewPerson, NewPhone, PersonPatch, PhonePatch, SearchFilter};
use crate::search::{age_in_years, days_until_birthday, parse_birthday};

const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS persons (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    first_name TEXT NOT NULL,
    last_name TEXT NOT NULL,
    birthday TEXT,
    is_favourite INTEGER NOT NULL DEFAULT 0
);

CREATE TABLE IF NOT EXISTS phones (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    owner INTEGER NOT NULL REFERENCES persons(id),
    number TEXT NOT NULL,
    description TEXT
);

CREATE INDEX IF NOT EXISTS idx_phones_owner ON phones(owner);
"#;

/// The joined read. Each `(?N IS NULL OR ...)` predicate is skipped when the
/// corresponding filter field is absent.
const SEARCH_SQL: &str = "
SELECT p.id, p.first_name, p.last_name, p.birthday, p.is_favourite,
       n.id, n.number, n.description
FROM persons p JOIN phones n ON n.owner = p.id
WHERE (?1 IS NULL OR p.id = ?1)
  AND (?2 IS NULL OR p.first_name = ?2)
  AND (?3 IS NULL OR p.last_name = ?3)
  AND (?4 IS NULL OR p.birthday LIKE ?4)
  AND (?5 IS NULL OR p.is_favourite = ?5)
  AND (?6 IS NULL OR n.id = ?6)
  AND (?7 IS NULL OR n.owner = ?7)
  AND (?8 IS NULL OR n.number = ?8)
  AND (?9 IS NULL OR n.description = ?9)
ORDER BY p.first_name, p.last_name";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

pub struct ContactStore {
    conn: Connection,
    auto_save: bool,
}

impl ContactStore {
    /// Open (or create) the contacts database. Creates both tables, sweeps
    /// out any phone-less person left over from an interrupted run, then
    /// starts the session transaction. A schema failure here is fatal to
    /// the caller.
    pub fn open<P: AsRef<Path>>(path: P, auto_save: bool) -> StoreResult<Self> {
        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA foreign_keys = ON")?;
        conn.execute_batch(SCHEMA_SQL)?;

        let store = Self { conn, auto_save };
        let swept = store.cleanup()?;
        if swept > 0 {
            warn!(swept, "removed phone-less persons left by a previous run");
        }
        store.conn.execute_batch("BEGIN")?;
        Ok(store)
    }

    pub fn auto_save(&self) -> bool {
        self.auto_save
    }

    /// Commit the session transaction and start a new one.
    pub fn save(&self) -> StoreResult<()> {
        self.conn.execute_batch("COMMIT; BEGIN")?;
        debug!("database saved");
        Ok(())
    }

    /// Insert a person together with their first phone number. The pair is
    /// atomic: a phone failure rolls the person back.
    pub fn insert_record(&self, person: &NewPerson, phone: &NewPhone) -> StoreResult<(i64, i64)> {
        self.conn.execute_batch("SAVEPOINT insert_record")?;
        match self.insert_pair(person, phone) {
            Ok(ids) => {
                self.conn.execute_batch("RELEASE insert_record")?;
                Ok(ids)
            }
            Err(e) => {
                if let Err(rollback) = self
                    .conn
                    .execute_batch("ROLLBACK TO insert_record; RELEASE insert_record")
                {
                    warn!("savepoint rollback failed: {rollback}");
                }
                Err(e)
            }
        }
    }

    fn insert_pair(&self, person: &NewPerson, phone: &NewPhone) -> StoreResult<(i64, i64)> {
        self.conn.execute(
            "INSERT INTO persons (first_name, last_name, birthday, is_favourite)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                person.first_name,
                person.last_name,
                person.birthday,
                person.is_favourite
            ],
        )?;
        let person_id = self.conn.last_insert_rowid();
        let phone_id = self.insert_phone(person_id, phone)?;
        Ok((person_id, phone_id))
    }

    /// Insert a phone for an existing person.
    pub fn insert_phone(&self, owner: i64, phone: &NewPhone) -> StoreResult<i64> {
        self.conn.execute(
            "INSERT INTO phones (owner, number, description) VALUES (?1, ?2, ?3)",
            params![owner, phone.number, phone.description],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Apply the non-`None` fields of `patch`, then sweep phone-less persons.
    pub fn update_person(&self, id: i64, patch: &PersonPatch) -> StoreResult<()> {
        if let Some(first_name) = &patch.first_name {
            self.conn.execute(
                "UPDATE persons SET first_name = ?1 WHERE id = ?2",
                params![first_name, id],
            )?;
        }
        if let Some(last_name) = &patch.last_name {
            self.conn.execute(
                "UPDATE persons SET last_name = ?1 WHERE id = ?2",
                params![last_name, id],
            )?;
        }
        if let Some(birthday) = &patch.birthday {
            self.conn.execute(
                "UPDATE persons SET birthday = ?1 WHERE id = ?2",
                params![birthday, id],
            )?;
        }
        if let Some(is_favourite) = patch.is_favourite {
            self.conn.execute(
                "UPDATE persons SET is_favourite = ?1 WHERE id = ?2",
                params![is_favourite, id],
            )?;
        }
        self.cleanup()?;
        Ok(())
    }

    /// Apply the non-`None` fields of `patch`, then sweep phone-less persons
    /// (re-owning a phone can strip its previous owner of their last one).
    pub fn update_phone(&self, id: i64, patch: &PhonePatch) -> StoreResult<()> {
        if let Some(owner) = patch.owner {
            self.conn.execute(
                "UPDATE phones SET owner = ?1 WHERE id = ?2",
                params![owner, id],
            )?;
        }
        if let Some(number) = &patch.number {
            self.conn.execute(
                "UPDATE phones SET number = ?1 WHERE id = ?2",
                params![number, id],
            )?;
        }
        if let Some(description) = &patch.description {
            self.conn.execute(
                "UPDATE phones SET description = ?1 WHERE id = ?2",
                params![description, id],
            )?;
        }
        self.cleanup()?;
        Ok(())
    }

    /// Delete a person and every phone they own.
    pub fn delete_person(&self, id: i64) -> StoreResult<()> {
        self.conn
            .execute("DELETE FROM phones WHERE owner = ?1", params![id])?;
        self.conn
            .execute("DELETE FROM persons WHERE id = ?1", params![id])?;
        Ok(())
    }

    /// Delete one phone; the owner goes too if it was their last number.
    pub fn delete_phone(&self, id: i64) -> StoreResult<()> {
        self.conn
            .execute("DELETE FROM phones WHERE id = ?1", params![id])?;
        self.cleanup()?;
        Ok(())
    }

    /// Delete every person left without a phone number. Idempotent; returns
    /// how many rows were removed.
    pub fn cleanup(&self) -> StoreResult<usize> {
        let removed = self.conn.execute(
            "DELETE FROM persons WHERE id NOT IN (SELECT owner FROM phones)",
            [],
        )?;
        if removed > 0 {
            debug!(removed, "cleanup removed phone-less persons");
        }
        Ok(removed)
    }

    /// Uniqueness probe for the (first, last) name pair.
    pub fn name_exists(&self, first_name: &str, last_name: &str) -> StoreResult<bool> {
        let found: Option<i64> = self
            .conn
            .query_row(
                "SELECT id FROM persons WHERE first_name = ?1 AND last_name = ?2",
                params![first_name, last_name],
                |row| row.get(0),
            )
            .optional()?;
        Ok(found.is_some())
    }

    pub fn person_exists(&self, id: i64) -> StoreResult<bool> {
        let found: Option<i64> = self
            .conn
            .query_row(
                "SELECT id FROM persons WHERE id = ?1",
                params![id],
                |row| row.get(0),
            )
            .optional()?;
        Ok(found.is_some())
    }

    /// Run the joined search with today's date.
    pub fn search(&self, filter: &SearchFilter) -> StoreResult<Vec<ContactRow>> {
        self.search_at(filter, Local::now().date_naive())
    }

    /// Run the joined search against an explicit `today`, so the derived
    /// age and nearest-birthday predicates are reproducible in tests.
    pub fn search_at(&self, filter: &SearchFilter, today: NaiveDate) -> StoreResult<Vec<ContactRow>> {
        let birthday_like = filter.birthday_prefix.as_ref().map(|p| format!("{p}%"));

        let mut stmt = self.conn.prepare(SEARCH_SQL)?;
        let rows = stmt.query_map(
            params![
                filter.person_id,
                filter.first_name,
                filter.last_name,
                birthday_like,
                filter.is_favourite,
                filter.phone_id,
                filter.phone_owner,
                filter.number,
                filter.description,
            ],
            |row| {
                Ok(ContactRow {
                    person_id: row.get(0)?,
                    first_name: row.get(1)?,
                    last_name: row.get(2)?,
                    birthday: row.get(3)?,
                    is_favourite: row.get(4)?,
                    phone_id: row.get(5)?,
                    number: row.get(6)?,
                    description: row.get(7)?,
                    age_years: None,
                })
            },
        )?;

        let age_bounds = filter.age_from.zip(filter.age_to);
        let mut result = Vec::new();
        for row in rows {
            let mut row = row?;
            let birthday = match row.birthday.as_deref() {
                Some(raw) => match parse_birthday(raw) {
                    Some(date) => Some(date),
                    None => {
                        warn!(person = row.person_id, raw, "unparseable birthday on file");
                        None
                    }
                },
                None => None,
            };

            match birthday {
                Some(birthday) => {
                    let age = age_in_years(birthday, today);
                    if let Some((from, to)) = age_bounds {
                        if age < from as i32 || age > to as i32 {
                            continue;
                        }
                    }
                    if filter.nearest_birthday && days_until_birthday(birthday, today) > 30 {
                        continue;
                    }
                    row.age_years = Some(age);
                    result.push(row);
                }
                // Rows without a birthday only pass when no derived
                // predicate was asked for.
                None => {
                    if age_bounds.is_none() && !filter.nearest_birthday {
                        result.push(row);
                    }
                }
            }
        }
        Ok(result)
    }
}

impl Drop for ContactStore {
    fn drop(&mut self) {
        let wrap_up = if self.auto_save { "COMMIT" } else { "ROLLBACK" };
        if let Err(e) = self.conn.execute_batch(wrap_up) {
            warn!("failed to close session transaction with {wrap_up}: {e}");
        }
    }
}
