use std::fs;
use std::path::Path;

use anyhow::Context;
use rusqlite::Connection;

/// Applies every `*.sql` file in `dir` not yet recorded, in file-name order.
pub fn run_migrations(conn: &Connection, dir: &Path) -> anyhow::Result<usize> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS _migrations (
            name TEXT PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        );",
    )
    .context("failed to create migrations table")?;

    if !dir.exists() {
        tracing::warn!(dir = %dir.display(), "migrations directory not found, skipping");
        return Ok(0);
    }

    let mut files: Vec<_> = fs::read_dir(dir)
        .with_context(|| format!("failed to read migrations directory {}", dir.display()))?
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.extension().is_some_and(|ext| ext == "sql"))
        .collect();
    files.sort();

    let mut applied = 0;
    for path in files {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();

        let already_applied: bool = conn
            .query_row(
                "SELECT COUNT(*) > 0 FROM _migrations WHERE name = ?1",
                [&name],
                |row| row.get(0),
            )
            .context("failed to check migration status")?;
        if already_applied {
            continue;
        }

        let sql = fs::read_to_string(&path)
            .with_context(|| format!("failed to read migration file: {name}"))?;

        conn.execute_batch(&format!(
            "BEGIN;\n{sql}\nINSERT INTO _migrations (name) VALUES ('{}');\nCOMMIT;",
            name.replace('\'', "''")
        ))
        .with_context(|| format!("failed to apply migration: {name}"))?;

        tracing::info!(migration = %name, "applied migration");
        applied += 1;
    }

    Ok(applied)
}
