use pocketnote_core::db::open_db_in_memory;
use pocketnote_core::{
    filter_notes, Attribute, FormattedText, Note, NoteService, SqliteNoteRepository,
};

#[test]
fn search_is_case_sensitive_substring() {
    let notes = vec![
        Note::new(0, "Hello World"),
        Note::new(1, "hello there"),
        Note::new(2, "Goodbye"),
    ];

    let hits = filter_notes("Hello", notes);
    assert_eq!(hits, vec![Note::new(0, "Hello World")]);
}

#[test]
fn empty_query_matches_every_note() {
    let notes = vec![Note::new(0, "a"), Note::new(1, "<b>b</b>")];
    assert_eq!(filter_notes("", notes.clone()), notes);
}

#[test]
fn query_spanning_formatting_boundaries_matches() {
    let notes = vec![Note::new(0, "<b>Hel</b><i>lo</i>")];
    assert_eq!(filter_notes("Hello", notes).len(), 1);
}

#[test]
fn service_search_reads_current_store_state() {
    let conn = open_db_in_memory().unwrap();
    let service = NoteService::new(SqliteNoteRepository::try_new(&conn).unwrap());

    let mut greeting = FormattedText::plain("Hello World");
    greeting.apply(Attribute::Bold, 0, 5).unwrap();
    service.create_note(&greeting).unwrap();
    service
        .create_note(&FormattedText::plain("hello there"))
        .unwrap();
    service.create_note(&FormattedText::plain("Goodbye")).unwrap();

    let hits = service.search("Hello").unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].id, 0);

    service.delete_note(0).unwrap();
    assert!(service.search("Hello").unwrap().is_empty());
    assert_eq!(service.search("").unwrap().len(), 2);
}
