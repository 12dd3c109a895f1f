use chrono::{SubsecRound, TimeZone, Utc};
use journal_core::db::open_db_in_memory;
use journal_core::repo::entry_repo::{DateOrder, EntryListQuery, EntryRow};
use journal_core::{
    EntryPatch, EntryRepository, EntryService, EntryServiceError, EntryValidationError, NewEntry,
    RecordRef, RepoError, SqliteEntryRepository,
};
use rusqlite::Connection;

fn service(conn: &Connection) -> EntryService<SqliteEntryRepository<'_>> {
    EntryService::new(SqliteEntryRepository::new(conn))
}

#[test]
fn create_keeps_caller_journal_date_and_stamps_save_instant() {
    let conn = open_db_in_memory().unwrap();
    let entries = service(&conn);
    let journal_date = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();

    let before = Utc::now().trunc_subsecs(3);
    let id = entries
        .create_entry(
            NewEntry::new("Test", "<p>hi</p>")
                .with_kind("Commentary")
                .with_tag_ids(Vec::new())
                .with_date_created(journal_date),
        )
        .unwrap();
    let after = Utc::now();

    let loaded = entries.get_entry_by_id(id).unwrap().unwrap();
    assert_eq!(loaded.title, "Test");
    assert_eq!(loaded.body, "<p>hi</p>");
    assert_eq!(loaded.kind, "Commentary");
    assert!(loaded.tag_ids.is_empty());
    assert_eq!(loaded.date_created, journal_date);
    assert!(loaded.date_modified >= before && loaded.date_modified <= after);
}

#[test]
fn create_without_journal_date_uses_save_instant_for_both() {
    let conn = open_db_in_memory().unwrap();
    let entries = service(&conn);

    let id = entries.create_entry(NewEntry::new("Tonight", "")).unwrap();
    let loaded = entries.get_entry_by_id(id).unwrap().unwrap();
    assert_eq!(loaded.date_created, loaded.date_modified);
}

#[test]
fn create_assigns_increasing_ids() {
    let conn = open_db_in_memory().unwrap();
    let entries = service(&conn);

    let first = entries.create_entry(NewEntry::new("one", "")).unwrap();
    let second = entries.create_entry(NewEntry::new("two", "")).unwrap();
    assert!(second > first);
}

#[test]
fn create_rejects_blank_title_before_store() {
    let conn = open_db_in_memory().unwrap();
    let entries = service(&conn);

    let err = entries.create_entry(NewEntry::new("  ", "body")).unwrap_err();
    assert!(matches!(
        err,
        EntryServiceError::Validation(EntryValidationError::EmptyTitle)
    ));
    assert!(entries.get_all_entries().unwrap().is_empty());
}

#[test]
fn update_merges_supplied_fields_and_refreshes_modified() {
    let conn = open_db_in_memory().unwrap();
    let entries = service(&conn);
    let journal_date = Utc.with_ymd_and_hms(2024, 12, 25, 20, 0, 0).unwrap();
    let id = entries
        .create_entry(
            NewEntry::new("Draft", "<p>first</p>")
                .with_tag_ids(vec![1, 2])
                .with_date_created(journal_date),
        )
        .unwrap();
    conn.execute(
        "UPDATE entries SET date_modified = 0 WHERE id = ?1;",
        [id],
    )
    .unwrap();

    let updated = entries
        .update_entry(
            id,
            EntryPatch {
                title: Some("Final".to_string()),
                ..EntryPatch::default()
            },
        )
        .unwrap();

    assert_eq!(updated.title, "Final");
    assert_eq!(updated.body, "<p>first</p>");
    assert_eq!(updated.tag_ids, vec![1, 2]);
    assert_eq!(updated.date_created, journal_date);
    assert!(updated.date_modified.timestamp_millis() > 0);
}

#[test]
fn update_can_move_journal_date() {
    let conn = open_db_in_memory().unwrap();
    let entries = service(&conn);
    let id = entries.create_entry(NewEntry::new("Recap", "")).unwrap();
    let moved = Utc.with_ymd_and_hms(2025, 3, 2, 12, 0, 0).unwrap();

    let updated = entries
        .update_entry(
            id,
            EntryPatch {
                date_created: Some(moved),
                ..EntryPatch::default()
            },
        )
        .unwrap();
    assert_eq!(updated.date_created, moved);
}

#[test]
fn update_and_delete_of_missing_entry_return_not_found() {
    let conn = open_db_in_memory().unwrap();
    let entries = service(&conn);

    let err = entries
        .update_entry(404, EntryPatch::default())
        .unwrap_err();
    assert!(matches!(err, EntryServiceError::NotFound(404)));

    let err = entries.delete_entry(404).unwrap_err();
    assert!(matches!(err, EntryServiceError::NotFound(404)));
}

#[test]
fn update_rejects_blank_title() {
    let conn = open_db_in_memory().unwrap();
    let entries = service(&conn);
    let id = entries.create_entry(NewEntry::new("Keep", "")).unwrap();

    let err = entries
        .update_entry(
            id,
            EntryPatch {
                title: Some(" ".to_string()),
                ..EntryPatch::default()
            },
        )
        .unwrap_err();
    assert!(matches!(err, EntryServiceError::Validation(_)));
    assert_eq!(entries.get_entry_by_id(id).unwrap().unwrap().title, "Keep");
}

#[test]
fn delete_is_hard_delete() {
    let conn = open_db_in_memory().unwrap();
    let entries = service(&conn);
    let id = entries.create_entry(NewEntry::new("Gone", "")).unwrap();

    entries.delete_entry(id).unwrap();
    assert!(entries.get_entry_by_id(id).unwrap().is_none());
    let remaining: i64 = conn
        .query_row("SELECT COUNT(*) FROM entries;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(remaining, 0);
}

#[test]
fn recent_entries_are_newest_first_and_limited() {
    let conn = open_db_in_memory().unwrap();
    let entries = service(&conn);
    for day in 1..=12 {
        let date = Utc.with_ymd_and_hms(2025, 4, day, 12, 0, 0).unwrap();
        entries
            .create_entry(NewEntry::new(format!("day {day}"), "").with_date_created(date))
            .unwrap();
    }

    let recent = entries.get_recent_entries(None).unwrap();
    assert_eq!(recent.len(), 10);
    assert_eq!(recent[0].title, "day 12");
    assert_eq!(recent[9].title, "day 3");

    let top_three = entries.get_recent_entries(Some(3)).unwrap();
    let titles: Vec<&str> = top_three.iter().map(|entry| entry.title.as_str()).collect();
    assert_eq!(titles, vec!["day 12", "day 11", "day 10"]);
}

#[test]
fn repository_lists_by_type_and_order() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteEntryRepository::new(&conn);
    let rows = [("a", "Commentary", 3), ("b", "Recap", 1), ("c", "Commentary", 2)]
        .into_iter()
        .map(|(title, kind, day)| {
            let date = Utc.with_ymd_and_hms(2025, 5, day, 0, 0, 0).unwrap();
            EntryRow {
                title: title.to_string(),
                body: String::new(),
                kind: kind.to_string(),
                tag_ids: Vec::new(),
                date_created: date,
                date_modified: date,
            }
        })
        .collect::<Vec<_>>();
    let ids = repo.bulk_insert_entries(&rows).unwrap();
    assert_eq!(ids.len(), 3);

    let commentary_oldest = repo
        .list_entries(&EntryListQuery {
            kind: Some("Commentary".to_string()),
            order: DateOrder::OldestFirst,
            limit: None,
        })
        .unwrap();
    let titles: Vec<&str> = commentary_oldest
        .iter()
        .map(|entry| entry.title.as_str())
        .collect();
    assert_eq!(titles, vec!["c", "a"]);
    assert_eq!(repo.count_entries().unwrap(), 3);
}

#[test]
fn corrupted_tag_list_is_reported_not_masked() {
    let conn = open_db_in_memory().unwrap();
    let entries = service(&conn);
    let id = entries.create_entry(NewEntry::new("Broken", "")).unwrap();
    conn.execute(
        "UPDATE entries SET tag_ids = 'not json' WHERE id = ?1;",
        [id],
    )
    .unwrap();

    let err = SqliteEntryRepository::new(&conn).get_entry(id).unwrap_err();
    assert!(matches!(err, RepoError::InvalidData(_)));
    assert!(!matches!(err, RepoError::NotFound(RecordRef::Entry(_))));
}
