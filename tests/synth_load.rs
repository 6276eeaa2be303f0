use tempfile::TempDir;

use engagement_predictor::config::SynthConfig;
use engagement_predictor::loader::{load_all, open_store, table_count};
use engagement_predictor::synth::generate_to;

fn small() -> SynthConfig {
    SynthConfig {
        users: 25,
        days: 4,
        avg_events_per_day: 3.0,
        seed: 11,
    }
}

#[test]
fn generated_files_load_into_sqlite() {
    let dir = TempDir::new().expect("tempdir");
    let users = dir.path().join("users.csv");
    let events = dir.path().join("events.csv");
    let db = dir.path().join("store/telemetry.db");

    let generated = generate_to(&small(), &users, &events).expect("generate");
    assert_eq!(generated.users, 25);
    assert!(generated.events > 0);

    let loaded = load_all(&db, &users, &events).expect("load");
    assert_eq!(loaded.users, generated.users);
    assert_eq!(loaded.events, generated.events);

    let conn = open_store(&db).expect("reopen");
    assert_eq!(table_count(&conn, "users").unwrap(), generated.users);
    assert_eq!(table_count(&conn, "events").unwrap(), generated.events);
}

#[test]
fn reloading_replaces_rather_than_appends() {
    let dir = TempDir::new().expect("tempdir");
    let users = dir.path().join("users.csv");
    let events = dir.path().join("events.csv");
    let db = dir.path().join("telemetry.db");

    let generated = generate_to(&small(), &users, &events).expect("generate");
    load_all(&db, &users, &events).expect("first load");
    load_all(&db, &users, &events).expect("second load");

    let conn = open_store(&db).expect("reopen");
    assert_eq!(table_count(&conn, "users").unwrap(), generated.users);
    assert_eq!(table_count(&conn, "events").unwrap(), generated.events);
}

#[test]
fn same_seed_same_files() {
    let a = TempDir::new().unwrap();
    let b = TempDir::new().unwrap();
    for dir in [&a, &b] {
        generate_to(&small(), &dir.path().join("u.csv"), &dir.path().join("e.csv")).unwrap();
    }
    let read = |d: &TempDir, f: &str| std::fs::read(d.path().join(f)).unwrap();
    assert_eq!(read(&a, "u.csv"), read(&b, "u.csv"));
    assert_eq!(read(&a, "e.csv"), read(&b, "e.csv"));
}
