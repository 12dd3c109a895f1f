//! Tag repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide CRUD and secondary-key lookups over the `tags` table.
//!
//! # Invariants
//! - No name uniqueness is enforced here; `find_tag_by_name` returns the
//!   oldest match when duplicates exist.
//! - Listings are ordered by `id`, i.e. insertion order.

use crate::model::tag::{NewTag, Tag, TagCategory, TagId, TagPatch};
use crate::repo::{RecordRef, RepoError, RepoResult};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row};

const TAG_SELECT_SQL: &str = "SELECT id, name, category FROM tags";

/// Repository interface for the `tags` collection.
pub trait TagRepository {
    fn insert_tag(&self, tag: &NewTag) -> RepoResult<TagId>;
    /// Inserts all tags in order and returns their ids in the same order.
    fn bulk_insert_tags(&self, tags: &[NewTag]) -> RepoResult<Vec<TagId>>;
    fn get_tag(&self, id: TagId) -> RepoResult<Option<Tag>>;
    /// Exact, case-sensitive name lookup.
    fn find_tag_by_name(&self, name: &str) -> RepoResult<Option<Tag>>;
    fn list_tags(&self) -> RepoResult<Vec<Tag>>;
    fn list_tags_by_category(&self, category: TagCategory) -> RepoResult<Vec<Tag>>;
    /// Returns the tags whose id is in `ids`; unknown ids are skipped.
    fn get_tags_by_ids(&self, ids: &[TagId]) -> RepoResult<Vec<Tag>>;
    fn update_tag(&self, id: TagId, patch: &TagPatch) -> RepoResult<()>;
    fn delete_tag(&self, id: TagId) -> RepoResult<()>;
    fn count_tags(&self) -> RepoResult<u64>;
    /// Removes every tag. Id sequences are left to the caller.
    fn clear_tags(&self) -> RepoResult<()>;
}

/// SQLite-backed tag repository.
pub struct SqliteTagRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteTagRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    fn query_tags(&self, sql: &str, bind_values: Vec<Value>) -> RepoResult<Vec<Tag>> {
        let mut stmt = self.conn.prepare(sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut tags = Vec::new();
        while let Some(row) = rows.next()? {
            tags.push(parse_tag_row(row)?);
        }
        Ok(tags)
    }
}

impl TagRepository for SqliteTagRepository<'_> {
    fn insert_tag(&self, tag: &NewTag) -> RepoResult<TagId> {
        self.conn.execute(
            "INSERT INTO tags (name, category) VALUES (?1, ?2);",
            params![tag.name.as_str(), tag.category.as_str()],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn bulk_insert_tags(&self, tags: &[NewTag]) -> RepoResult<Vec<TagId>> {
        tags.iter().map(|tag| self.insert_tag(tag)).collect()
    }

    fn get_tag(&self, id: TagId) -> RepoResult<Option<Tag>> {
        let mut tags = self.query_tags(
            &format!("{TAG_SELECT_SQL} WHERE id = ?;"),
            vec![Value::Integer(id)],
        )?;
        Ok(tags.pop())
    }

    fn find_tag_by_name(&self, name: &str) -> RepoResult<Option<Tag>> {
        let tags = self.query_tags(
            &format!("{TAG_SELECT_SQL} WHERE name = ? ORDER BY id ASC LIMIT 1;"),
            vec![Value::Text(name.to_string())],
        )?;
        Ok(tags.into_iter().next())
    }

    fn list_tags(&self) -> RepoResult<Vec<Tag>> {
        self.query_tags(&format!("{TAG_SELECT_SQL} ORDER BY id ASC;"), Vec::new())
    }

    fn list_tags_by_category(&self, category: TagCategory) -> RepoResult<Vec<Tag>> {
        self.query_tags(
            &format!("{TAG_SELECT_SQL} WHERE category = ? ORDER BY id ASC;"),
            vec![Value::Text(category.as_str().to_string())],
        )
    }

    fn get_tags_by_ids(&self, ids: &[TagId]) -> RepoResult<Vec<Tag>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let placeholders = vec!["?"; ids.len()].join(", ");
        let bind_values = ids.iter().map(|id| Value::Integer(*id)).collect();
        self.query_tags(
            &format!("{TAG_SELECT_SQL} WHERE id IN ({placeholders}) ORDER BY id ASC;"),
            bind_values,
        )
    }

    fn update_tag(&self, id: TagId, patch: &TagPatch) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE tags
             SET
                name = COALESCE(?1, name),
                category = COALESCE(?2, category)
             WHERE id = ?3;",
            params![
                patch.name.as_deref(),
                patch.category.map(TagCategory::as_str),
                id
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound(RecordRef::Tag(id)));
        }

        Ok(())
    }

    fn delete_tag(&self, id: TagId) -> RepoResult<()> {
        let changed = self.conn.execute("DELETE FROM tags WHERE id = ?1;", [id])?;
        if changed == 0 {
            return Err(RepoError::NotFound(RecordRef::Tag(id)));
        }

        Ok(())
    }

    fn count_tags(&self) -> RepoResult<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM tags;", [], |row| row.get(0))?;
        u64::try_from(count)
            .map_err(|_| RepoError::InvalidData(format!("negative tag count `{count}`")))
    }

    fn clear_tags(&self) -> RepoResult<()> {
        self.conn.execute("DELETE FROM tags;", [])?;
        Ok(())
    }
}

fn parse_tag_row(row: &Row<'_>) -> RepoResult<Tag> {
    let id: TagId = row.get("id")?;
    let category_text: String = row.get("category")?;
    let category = category_text.parse::<TagCategory>().map_err(|_| {
        RepoError::InvalidData(format!(
            "invalid category `{category_text}` in tags.category for tag {id}"
        ))
    })?;

    Ok(Tag {
        id,
        name: row.get("name")?,
        category,
    })
}
