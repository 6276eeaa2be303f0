//! Bulk load of the generated CSV tables into SQLite.
//!
//! Each load drops and recreates its table, so the store always mirrors the
//! latest files. All rows of a table go in through a single transaction.

use rusqlite::{params, Connection, Transaction};
use serde::Serialize;
use std::path::Path;
use tracing::{debug, info};

use crate::errors::{EngageError, EngageResult};
use crate::synth::{EventRecord, UserRecord};

/// Rows between progress log lines.
pub const CHUNK_SIZE: usize = 5000;

pub const USERS_DDL: &str = "CREATE TABLE users (
    user_id TEXT PRIMARY KEY,
    signup_date TEXT NOT NULL,
    user_tier TEXT NOT NULL,
    org_size TEXT NOT NULL
)";

pub const EVENTS_DDL: &str = "CREATE TABLE events (
    event_id TEXT PRIMARY KEY,
    user_id TEXT NOT NULL,
    ts TEXT NOT NULL,
    event_type TEXT NOT NULL,
    device_type TEXT NOT NULL,
    region TEXT NOT NULL,
    session_id TEXT,
    duration_sec REAL,
    latency_ms REAL NOT NULL,
    crash INTEGER NOT NULL
)";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LoadSummary {
    pub users: usize,
    pub events: usize,
}

pub fn open_store(path: &Path) -> EngageResult<Connection> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .map_err(|e| EngageError::io(format!("creating {}", parent.display()), e))?;
        }
    }
    Connection::open(path).map_err(|e| EngageError::database(format!("opening {}", path.display()), e))
}

fn replace_table(tx: &Transaction<'_>, table: &str, ddl: &str) -> EngageResult<()> {
    tx.execute_batch(&format!("DROP TABLE IF EXISTS {table}; {ddl};"))
        .map_err(|e| EngageError::database(format!("recreating {table}"), e))
}

fn reader(path: &Path) -> EngageResult<csv::Reader<std::fs::File>> {
    csv::Reader::from_path(path).map_err(|e| EngageError::csv(format!("opening {}", path.display()), e))
}

pub fn load_users(conn: &mut Connection, path: &Path) -> EngageResult<usize> {
    info!("Loading users from {}", path.display());
    let mut rdr = reader(path)?;
    let tx = conn.transaction()?;
    replace_table(&tx, "users", USERS_DDL)?;

    let mut count = 0;
    {
        let mut stmt = tx.prepare(
            "INSERT INTO users (user_id, signup_date, user_tier, org_size) VALUES (?1, ?2, ?3, ?4)",
        )?;
        for row in rdr.deserialize() {
            let user: UserRecord = row?;
            stmt.execute(params![
                user.user_id,
                user.signup_date.to_string(),
                user.user_tier,
                user.org_size
            ])?;
            count += 1;
            if count % CHUNK_SIZE == 0 {
                debug!("users: {count} rows");
            }
        }
    }
    tx.commit()?;
    info!("Users loaded: {count}");
    Ok(count)
}

pub fn load_events(conn: &mut Connection, path: &Path) -> EngageResult<usize> {
    info!("Loading events from {}", path.display());
    let mut rdr = reader(path)?;
    let tx = conn.transaction()?;
    replace_table(&tx, "events", EVENTS_DDL)?;

    let mut count = 0;
    {
        let mut stmt = tx.prepare(
            "INSERT INTO events (event_id, user_id, ts, event_type, device_type, region, \
             session_id, duration_sec, latency_ms, crash) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
        )?;
        for row in rdr.deserialize() {
            let event: EventRecord = row?;
            stmt.execute(params![
                event.event_id.to_string(),
                event.user_id,
                event.ts.to_string(),
                event.event_type,
                event.device_type,
                event.region,
                event.session_id,
                event.duration_sec,
                event.latency_ms,
                event.crash
            ])?;
            count += 1;
            if count % CHUNK_SIZE == 0 {
                debug!("events: {count} rows");
            }
        }
    }
    tx.commit()?;
    info!("Events loaded: {count}");
    Ok(count)
}

/// Replace both tables from their CSV files.
pub fn load_all(db_path: &Path, users_csv: &Path, events_csv: &Path) -> EngageResult<LoadSummary> {
    let mut conn = open_store(db_path)?;
    let users = load_users(&mut conn, users_csv)?;
    let events = load_events(&mut conn, events_csv)?;
    Ok(LoadSummary { users, events })
}

pub fn table_count(conn: &Connection, table: &str) -> EngageResult<usize> {
    let count: i64 = conn
        .query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| row.get(0))
        .map_err(|e| EngageError::database(format!("counting {table}"), e))?;
    Ok(count as usize)
}
