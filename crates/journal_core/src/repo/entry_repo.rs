//! Entry repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide CRUD and ordered listing over the `entries` table.
//! - Own the (de)serialization of the denormalized `tag_ids` JSON column.
//!
//! # Invariants
//! - Timestamps are persisted as Unix epoch milliseconds.
//! - `update_entry` only touches columns present in the patch; it never stamps
//!   `date_modified` on its own.
//! - Listing order is `date_created` then `id`, in the requested direction.

use crate::model::entry::{Entry, EntryId, EntryPatch};
use crate::model::tag::TagId;
use crate::repo::{RecordRef, RepoError, RepoResult};
use chrono::{DateTime, Utc};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row};

const ENTRY_SELECT_SQL: &str = "SELECT
    id,
    title,
    body,
    type,
    tag_ids,
    date_created,
    date_modified
FROM entries";

/// Insert shape: an entry before the store has assigned its id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryRow {
    pub title: String,
    pub body: String,
    pub kind: String,
    pub tag_ids: Vec<TagId>,
    pub date_created: DateTime<Utc>,
    pub date_modified: DateTime<Utc>,
}

/// Direction of the `date_created` index walk.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DateOrder {
    #[default]
    NewestFirst,
    OldestFirst,
}

/// Query options for listing entries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntryListQuery {
    /// Exact, case-sensitive `type` equality.
    pub kind: Option<String>,
    pub order: DateOrder,
    pub limit: Option<u32>,
}

/// Repository interface for the `entries` collection.
pub trait EntryRepository {
    fn insert_entry(&self, entry: &EntryRow) -> RepoResult<EntryId>;
    /// Inserts all rows in order and returns their ids in the same order.
    fn bulk_insert_entries(&self, entries: &[EntryRow]) -> RepoResult<Vec<EntryId>>;
    fn get_entry(&self, id: EntryId) -> RepoResult<Option<Entry>>;
    fn update_entry(&self, id: EntryId, patch: &EntryPatch) -> RepoResult<()>;
    fn delete_entry(&self, id: EntryId) -> RepoResult<()>;
    fn list_entries(&self, query: &EntryListQuery) -> RepoResult<Vec<Entry>>;
    fn count_entries(&self) -> RepoResult<u64>;
    /// Removes every entry. Id sequences are left to the caller.
    fn clear_entries(&self) -> RepoResult<()>;
}

/// SQLite-backed entry repository.
///
/// Borrows a connection, so it also works over a `rusqlite::Transaction`.
pub struct SqliteEntryRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteEntryRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl EntryRepository for SqliteEntryRepository<'_> {
    fn insert_entry(&self, entry: &EntryRow) -> RepoResult<EntryId> {
        self.conn.execute(
            "INSERT INTO entries (
                title,
                body,
                type,
                tag_ids,
                date_created,
                date_modified
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6);",
            params![
                entry.title.as_str(),
                entry.body.as_str(),
                entry.kind.as_str(),
                encode_tag_ids(&entry.tag_ids)?,
                entry.date_created.timestamp_millis(),
                entry.date_modified.timestamp_millis(),
            ],
        )?;

        Ok(self.conn.last_insert_rowid())
    }

    fn bulk_insert_entries(&self, entries: &[EntryRow]) -> RepoResult<Vec<EntryId>> {
        entries
            .iter()
            .map(|entry| self.insert_entry(entry))
            .collect()
    }

    fn get_entry(&self, id: EntryId) -> RepoResult<Option<Entry>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{ENTRY_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_entry_row(row)?));
        }

        Ok(None)
    }

    fn update_entry(&self, id: EntryId, patch: &EntryPatch) -> RepoResult<()> {
        if patch.is_empty() {
            return if entry_exists(self.conn, id)? {
                Ok(())
            } else {
                Err(RepoError::NotFound(RecordRef::Entry(id)))
            };
        }

        let mut assignments: Vec<&str> = Vec::new();
        let mut bind_values: Vec<Value> = Vec::new();

        if let Some(title) = patch.title.as_ref() {
            assignments.push("title = ?");
            bind_values.push(Value::Text(title.clone()));
        }
        if let Some(body) = patch.body.as_ref() {
            assignments.push("body = ?");
            bind_values.push(Value::Text(body.clone()));
        }
        if let Some(kind) = patch.kind.as_ref() {
            assignments.push("type = ?");
            bind_values.push(Value::Text(kind.clone()));
        }
        if let Some(tag_ids) = patch.tag_ids.as_ref() {
            assignments.push("tag_ids = ?");
            bind_values.push(Value::Text(encode_tag_ids(tag_ids)?));
        }
        if let Some(date_created) = patch.date_created {
            assignments.push("date_created = ?");
            bind_values.push(Value::Integer(date_created.timestamp_millis()));
        }
        if let Some(date_modified) = patch.date_modified {
            assignments.push("date_modified = ?");
            bind_values.push(Value::Integer(date_modified.timestamp_millis()));
        }

        let sql = format!(
            "UPDATE entries SET {} WHERE id = ?;",
            assignments.join(", ")
        );
        bind_values.push(Value::Integer(id));

        let changed = self.conn.execute(&sql, params_from_iter(bind_values))?;
        if changed == 0 {
            return Err(RepoError::NotFound(RecordRef::Entry(id)));
        }

        Ok(())
    }

    fn delete_entry(&self, id: EntryId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM entries WHERE id = ?1;", [id])?;
        if changed == 0 {
            return Err(RepoError::NotFound(RecordRef::Entry(id)));
        }

        Ok(())
    }

    fn list_entries(&self, query: &EntryListQuery) -> RepoResult<Vec<Entry>> {
        let mut sql = format!("{ENTRY_SELECT_SQL} WHERE 1 = 1");
        let mut bind_values: Vec<Value> = Vec::new();

        if let Some(kind) = query.kind.as_ref() {
            sql.push_str(" AND type = ?");
            bind_values.push(Value::Text(kind.clone()));
        }

        match query.order {
            DateOrder::NewestFirst => sql.push_str(" ORDER BY date_created DESC, id DESC"),
            DateOrder::OldestFirst => sql.push_str(" ORDER BY date_created ASC, id ASC"),
        }

        if let Some(limit) = query.limit {
            sql.push_str(" LIMIT ?");
            bind_values.push(Value::Integer(i64::from(limit)));
        }

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut entries = Vec::new();
        while let Some(row) = rows.next()? {
            entries.push(parse_entry_row(row)?);
        }

        Ok(entries)
    }

    fn count_entries(&self) -> RepoResult<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM entries;", [], |row| row.get(0))?;
        u64::try_from(count)
            .map_err(|_| RepoError::InvalidData(format!("negative entry count `{count}`")))
    }

    fn clear_entries(&self) -> RepoResult<()> {
        self.conn.execute("DELETE FROM entries;", [])?;
        Ok(())
    }
}

fn parse_entry_row(row: &Row<'_>) -> RepoResult<Entry> {
    let id: EntryId = row.get("id")?;

    let tag_ids_text: String = row.get("tag_ids")?;
    let tag_ids = serde_json::from_str::<Vec<TagId>>(&tag_ids_text).map_err(|err| {
        RepoError::InvalidData(format!(
            "invalid tag id list `{tag_ids_text}` in entries.tag_ids for entry {id}: {err}"
        ))
    })?;

    Ok(Entry {
        id,
        title: row.get("title")?,
        body: row.get("body")?,
        kind: row.get("type")?,
        tag_ids,
        date_created: parse_millis(row.get("date_created")?, "date_created", id)?,
        date_modified: parse_millis(row.get("date_modified")?, "date_modified", id)?,
    })
}

fn parse_millis(value: i64, column: &str, id: EntryId) -> RepoResult<DateTime<Utc>> {
    DateTime::from_timestamp_millis(value).ok_or_else(|| {
        RepoError::InvalidData(format!(
            "timestamp `{value}` out of range in entries.{column} for entry {id}"
        ))
    })
}

fn encode_tag_ids(tag_ids: &[TagId]) -> RepoResult<String> {
    serde_json::to_string(tag_ids)
        .map_err(|err| RepoError::InvalidData(format!("unencodable tag id list: {err}")))
}

fn entry_exists(conn: &Connection, id: EntryId) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM entries WHERE id = ?1);",
        [id],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}
