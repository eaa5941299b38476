use pocketnote_core::{FormattedText, NoteRepository, SharedNoteStore};
use std::collections::BTreeSet;
use std::sync::Arc;
use std::thread;

#[test]
fn concurrent_creates_get_distinct_ids() {
    let store = Arc::new(SharedNoteStore::open_in_memory().unwrap());

    let handles: Vec<_> = (0..4)
        .map(|worker| {
            let store = Arc::clone(&store);
            thread::spawn(move || {
                (0..10)
                    .map(|idx| {
                        store
                            .with_repo(|repo| repo.create_note(&format!("w{worker} n{idx}")))
                            .unwrap()
                            .id
                    })
                    .collect::<Vec<_>>()
            })
        })
        .collect();

    let ids: BTreeSet<_> = handles
        .into_iter()
        .flat_map(|handle| handle.join().unwrap())
        .collect();
    assert_eq!(ids, (0..40).collect::<BTreeSet<_>>());
    assert_eq!(store.with_repo(|repo| repo.count_notes()).unwrap(), 40);
}

#[test]
fn service_access_goes_through_the_same_connection() {
    let dir = tempfile::tempdir().unwrap();
    let store = SharedNoteStore::open(dir.path().join("shared.db")).unwrap();

    let created = store
        .with_service(|service| service.create_note(&FormattedText::plain("shared")))
        .unwrap();
    let loaded = store
        .with_repo(|repo| repo.get_note(created.id))
        .unwrap();
    assert_eq!(loaded.body, "shared");

    let conn = store.into_inner().unwrap();
    let count: i64 = conn
        .query_row("SELECT COUNT(*) FROM notes;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(count, 1);
}
