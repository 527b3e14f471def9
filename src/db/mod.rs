pub mod migrations;
pub mod queries;

use anyhow::Context;
use rusqlite::Connection;

/// Opens (or creates) the database at `path` and brings the schema up to
/// date. Use `:memory:` for throwaway test databases.
pub fn init_db(path: &str) -> anyhow::Result<Connection> {
    let conn = Connection::open(path).with_context(|| format!("failed to open database {path}"))?;

    conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")
        .context("failed to configure database")?;

    migrations::run_migrations(&conn)?;

    tracing::debug!("database ready at {path}");
    Ok(conn)
}
