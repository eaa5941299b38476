use pocketnote_core::db::{open_db, open_db_in_memory, DbError};
use pocketnote_core::{decode, Attribute, Note, NoteRepository, RepoError, SqliteNoteRepository};
use rusqlite::{Connection, OpenFlags};

#[test]
fn create_update_read_end_to_end() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteNoteRepository::try_new(&conn).unwrap();

    let created = repo.create_note("plain text").unwrap();
    assert_eq!(created, Note::new(0, "plain text"));

    repo.update_note(&Note::new(0, "<b>bold</b> text")).unwrap();
    let loaded = repo.get_note(0).unwrap();
    assert_eq!(loaded.body, "<b>bold</b> text");

    let buffer = decode(&loaded.body).unwrap();
    assert_eq!(buffer.text(), "bold text");
    assert_eq!(buffer.spans().len(), 1);
    assert_eq!(buffer.spans()[0].attribute, Attribute::Bold);
    assert_eq!((buffer.spans()[0].start, buffer.spans()[0].end), (0, 4));
}

#[test]
fn ids_are_dense_in_creation_order_without_deletes() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteNoteRepository::try_new(&conn).unwrap();

    let ids: Vec<_> = (0..5)
        .map(|idx| repo.create_note(&format!("note {idx}")).unwrap().id)
        .collect();
    assert_eq!(ids, vec![0, 1, 2, 3, 4]);
}

#[test]
fn recreate_after_delete_never_reuses_an_id() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteNoteRepository::try_new(&conn).unwrap();

    let first = repo.create_note("zero").unwrap();
    let second = repo.create_note("one").unwrap();
    assert_eq!((first.id, second.id), (0, 1));

    assert!(repo.delete_note(&first).unwrap());
    let third = repo.create_note("two").unwrap();

    assert_eq!(third.id, 2);
    let ids: Vec<_> = repo.list_notes().unwrap().iter().map(|n| n.id).collect();
    assert_eq!(ids, vec![1, 2]);
}

#[test]
fn clear_all_empties_store_but_keeps_counter() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteNoteRepository::try_new(&conn).unwrap();
    for idx in 0..3 {
        repo.create_note(&format!("n{idx}")).unwrap();
    }

    assert_eq!(repo.clear_all().unwrap(), 3);
    assert_eq!(repo.count_notes().unwrap(), 0);
    assert!(repo.list_notes().unwrap().is_empty());
    assert_eq!(repo.create_note("after wipe").unwrap().id, 3);
}

#[test]
fn read_and_update_surface_not_found() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteNoteRepository::try_new(&conn).unwrap();

    assert!(repo.find_note(42).unwrap().is_none());
    assert!(matches!(repo.get_note(42), Err(RepoError::NotFound(42))));

    let err = repo.update_note(&Note::new(42, "x")).unwrap_err();
    assert!(matches!(err, RepoError::NotFound(42)));
    assert_eq!(repo.count_notes().unwrap(), 0);
}

#[test]
fn delete_missing_id_is_a_noop() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteNoteRepository::try_new(&conn).unwrap();
    repo.create_note("keep").unwrap();

    assert!(!repo.delete_note(&Note::new(9, "")).unwrap());
    assert_eq!(repo.count_notes().unwrap(), 1);
}

#[test]
fn empty_body_is_stored() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteNoteRepository::try_new(&conn).unwrap();

    let created = repo.create_note("").unwrap();
    assert_eq!(repo.get_note(created.id).unwrap().body, "");
}

#[test]
fn list_is_ascending_by_id() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteNoteRepository::try_new(&conn).unwrap();
    for body in ["c", "a", "b"] {
        repo.create_note(body).unwrap();
    }
    repo.update_note(&Note::new(0, "z")).unwrap();

    let listed = repo.list_notes().unwrap();
    let ids: Vec<_> = listed.iter().map(|note| note.id).collect();
    assert_eq!(ids, vec![0, 1, 2]);
    assert_eq!(listed[0].body, "z");
}

#[test]
fn counter_skips_past_externally_inserted_ids() {
    let conn = open_db_in_memory().unwrap();
    conn.execute("INSERT INTO notes (id, body) VALUES (7, 'imported');", [])
        .unwrap();
    let repo = SqliteNoteRepository::try_new(&conn).unwrap();

    assert_eq!(repo.create_note("fresh").unwrap().id, 8);
}

#[test]
fn out_of_range_persisted_id_is_invalid_data() {
    let conn = open_db_in_memory().unwrap();
    conn.execute("INSERT INTO notes (id, body) VALUES (-1, 'broken');", [])
        .unwrap();
    let repo = SqliteNoteRepository::try_new(&conn).unwrap();

    let err = repo.list_notes().unwrap_err();
    assert!(matches!(err, RepoError::InvalidData(_)));
}

#[test]
fn create_on_unwritable_store_is_a_db_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("notes.sqlite3");
    drop(open_db(&path).unwrap());

    let conn = Connection::open_with_flags(&path, OpenFlags::SQLITE_OPEN_READ_ONLY).unwrap();
    let repo = SqliteNoteRepository::try_new(&conn).unwrap();

    let err = repo.create_note("x").unwrap_err();
    assert!(matches!(err, RepoError::Db(DbError::Sqlite(_))), "{err:?}");
    assert_eq!(repo.count_notes().unwrap(), 0);
}
