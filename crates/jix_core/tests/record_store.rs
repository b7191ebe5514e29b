use jix_core::codec::CodecError;
use jix_core::db::{open_db, open_db_in_memory};
use jix_core::{
    ChangeBus, Collection, EcdhKeyPair, Note, NoteRepository, Notebook, NotebookRepository,
    RecordStore, Records, RepoError, SecondaryKey,
};
use rusqlite::params;

fn note(id: &str, notebook_id: &str, content: &str) -> Note {
    Note {
        id: id.to_string(),
        creator_id: "u1".to_string(),
        notebook_id: notebook_id.to_string(),
        name: format!("name of {id}"),
        content: content.to_string(),
        public: true,
        synced: false,
    }
}

#[test]
fn put_then_get_returns_latest_value() {
    let conn = open_db_in_memory().unwrap();
    let store = RecordStore::try_new(&conn).unwrap();

    let mut record = note("u1:a", "nb1", "v1");
    assert_eq!(store.put_note(&record, None).unwrap(), "u1:a");
    assert_eq!(store.get_note("u1:a", None).unwrap(), Some(record.clone()));

    record.content = "v2".to_string();
    record.synced = true;
    store.put_note(&record, None).unwrap();
    assert_eq!(store.get_note("u1:a", None).unwrap(), Some(record));

    let rows: i64 = conn
        .query_row("SELECT COUNT(*) FROM notes;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(rows, 1);
}

#[test]
fn get_of_unknown_id_is_absent() {
    let conn = open_db_in_memory().unwrap();
    let store = RecordStore::try_new(&conn).unwrap();
    assert!(store.get_note("nope", None).unwrap().is_none());
    assert!(store.get_notebook("nope", None).unwrap().is_none());
}

#[test]
fn secondary_scan_returns_only_matching_notebook() {
    let conn = open_db_in_memory().unwrap();
    let store = RecordStore::try_new(&conn).unwrap();

    for id in ["u1:c", "u1:a", "u1:b"] {
        store.put_note(&note(id, "nb1", "x"), None).unwrap();
    }
    store.put_note(&note("u1:d", "nb2", "x"), None).unwrap();

    let found = store
        .list_by_secondary_key(&SecondaryKey::NoteNotebook("nb1".to_string()), None)
        .unwrap();
    let Records::Notes(notes) = found else {
        panic!("expected notes");
    };
    let ids: Vec<&str> = notes.iter().map(|n| n.id.as_str()).collect();
    assert_eq!(ids, vec!["u1:a", "u1:b", "u1:c"]);

    assert_eq!(store.count_notes_in_notebook("nb1").unwrap(), 3);
    assert_eq!(store.count_notes_in_notebook("nb2").unwrap(), 1);
    assert_eq!(store.count_notes_in_notebook("nb3").unwrap(), 0);

    let by_creator = store
        .list_by_secondary_key(&SecondaryKey::NoteCreator("u1".to_string()), None)
        .unwrap();
    assert_eq!(by_creator.len(), 4);
}

#[test]
fn notebooks_are_scanned_by_creator() {
    let conn = open_db_in_memory().unwrap();
    let store = RecordStore::try_new(&conn).unwrap();

    store
        .put_notebook(&Notebook::with_id("u1:x", "u1", "Work"), None)
        .unwrap();
    store
        .put_notebook(&Notebook::with_id("u2:y", "u2", "Home"), None)
        .unwrap();

    let found = store
        .list_by_secondary_key(&SecondaryKey::NotebookCreator("u1".to_string()), None)
        .unwrap();
    match found {
        Records::Notebooks(items) => {
            assert_eq!(items.len(), 1);
            assert_eq!(items[0].name, "Work");
        }
        other => panic!("unexpected records: {other:?}"),
    }
}

#[test]
fn orphaned_note_is_stored() {
    let conn = open_db_in_memory().unwrap();
    let store = RecordStore::try_new(&conn).unwrap();
    store.put_note(&note("u1:o", "missing-notebook", "x"), None).unwrap();
    assert!(store.get_note("u1:o", None).unwrap().is_some());
}

#[test]
fn private_records_are_encrypted_at_rest() {
    let conn = open_db_in_memory().unwrap();
    let store = RecordStore::try_new(&conn).unwrap();
    let alice = EcdhKeyPair::generate();
    let bob = EcdhKeyPair::generate();
    let cipher = alice.derive(&bob.public_key()).unwrap();

    let mut secret = note("u1:s", "nb1", "- [ ] burn after reading");
    secret.public = false;

    assert!(matches!(
        store.put_note(&secret, None),
        Err(RepoError::Codec(CodecError::MissingHelper { .. }))
    ));

    store.put_note(&secret, Some(&cipher)).unwrap();

    let stored: Vec<u8> = conn
        .query_row(
            "SELECT content FROM notes WHERE id = ?1;",
            params!["u1:s"],
            |row| row.get(0),
        )
        .unwrap();
    assert_ne!(stored, secret.content.as_bytes());
    assert!(!String::from_utf8_lossy(&stored).contains("burn"));

    assert!(matches!(
        store.get_note("u1:s", None),
        Err(RepoError::Codec(CodecError::MissingHelper { .. }))
    ));
    let peer_cipher = bob.derive(&alice.public_key()).unwrap();
    assert_eq!(store.get_note("u1:s", Some(&peer_cipher)).unwrap(), Some(secret));
}

#[test]
fn scan_over_mixed_notebook_needs_a_helper() {
    let conn = open_db_in_memory().unwrap();
    let store = RecordStore::try_new(&conn).unwrap();
    let cipher = EcdhKeyPair::generate()
        .derive(&EcdhKeyPair::generate().public_key())
        .unwrap();

    store.put_note(&note("u1:open", "nb1", "visible"), None).unwrap();
    let mut hidden = note("u1:shut", "nb1", "hidden");
    hidden.public = false;
    store.put_note(&hidden, Some(&cipher)).unwrap();

    assert!(matches!(
        store.list_notes_by_notebook("nb1", None),
        Err(RepoError::Codec(CodecError::MissingHelper { id })) if id == "u1:shut"
    ));

    let notes = store.list_notes_by_notebook("nb1", Some(&cipher)).unwrap();
    let contents: Vec<&str> = notes.iter().map(|n| n.content.as_str()).collect();
    assert_eq!(contents, vec!["visible", "hidden"]);
}

#[test]
fn invalid_flags_are_rejected_on_read() {
    let conn = open_db_in_memory().unwrap();
    let store = RecordStore::try_new(&conn).unwrap();
    store.put_note(&note("u1:f", "nb1", "x"), None).unwrap();
    conn.execute("UPDATE notes SET public = 7 WHERE id = 'u1:f';", [])
        .unwrap();

    assert!(matches!(
        store.get_note("u1:f", None),
        Err(RepoError::Codec(CodecError::InvalidFlag { value: 7, .. }))
    ));
}

#[test]
fn write_validation_rejects_blank_ids() {
    let conn = open_db_in_memory().unwrap();
    let store = RecordStore::try_new(&conn).unwrap();
    assert!(matches!(
        store.put_note(&note("", "nb1", "x"), None),
        Err(RepoError::Validation(_))
    ));
}

#[test]
fn live_query_refreshes_after_relevant_writes() {
    let conn = open_db_in_memory().unwrap();
    let store = RecordStore::try_new(&conn).unwrap();

    let mut live = store
        .observe(&[Collection::Notes], |s: &RecordStore<'_>| {
            s.count_notes_in_notebook("nb1")
        })
        .unwrap();
    assert_eq!(*live.current(), 0);
    assert!(live.poll().unwrap().is_none());

    store
        .put_notebook(&Notebook::with_id("u1:nb", "u1", "ignored"), None)
        .unwrap();
    assert!(live.poll().unwrap().is_none());

    store.put_note(&note("u1:a", "nb1", "x"), None).unwrap();
    store.put_note(&note("u1:b", "nb1", "x"), None).unwrap();
    assert_eq!(live.poll().unwrap(), Some(&2));
    assert!(live.poll().unwrap().is_none());

    assert_eq!(store.bus().subscriber_count(), 1);
    live.cancel();
    assert_eq!(store.bus().subscriber_count(), 0);
}

#[test]
fn live_query_wakes_on_write_from_another_connection() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("live.sqlite3");
    let bus = ChangeBus::new();

    let reader_conn = open_db(&path).unwrap();
    let reader = RecordStore::with_bus(&reader_conn, bus.clone()).unwrap();
    let mut live = reader
        .observe(&[Collection::Notes], |s: &RecordStore<'_>| {
            s.list_notes_by_notebook("nb1", None)
        })
        .unwrap();
    assert!(live.current().is_empty());

    std::thread::scope(|scope| {
        let writer_path = path.clone();
        let writer_bus = bus.clone();
        scope.spawn(move || {
            let conn = open_db(&writer_path).unwrap();
            let writer = RecordStore::with_bus(&conn, writer_bus).unwrap();
            writer.put_note(&note("u1:w", "nb1", "from writer"), None).unwrap();
        });

        let notes = live.wait().unwrap();
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].content, "from writer");
    });
}
