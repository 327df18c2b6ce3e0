use rusqlite::{Connection, params};
use std::fs;
use std::path::Path;
use crate::error::{Result, KitchenError};

/// Tables, views, indexes and triggers every migrated database must contain.
pub const EXPECTED_TABLES: &[&str] = &["ingredient", "schema_migrations", "step", "utensil"];
pub const EXPECTED_VIEWS: &[&str] = &["detailed_recipe", "detailed_step", "recipe"];
pub const EXPECTED_INDEXES: &[&str] = &[
    "idx_step_input_output",
    "idx_step_input_utensil",
    "idx_step_utensil_output",
];
pub const EXPECTED_TRIGGERS: &[&str] = &[
    "trg_ingredient_type_keeps_steps",
    "trg_step_input_not_end",
    "trg_step_output_not_start",
];

/// A numbered SQL script from the migrations directory
struct Migration {
    version: u32,
    name: String,
    sql: String,
}

fn ensure_migrations_table(conn: &Connection) -> Result<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS schema_migrations (
            version INTEGER PRIMARY KEY,
            name TEXT NOT NULL,
            applied_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
        )",
        [],
    )?;
    Ok(())
}

/// Names of the applied migrations, in version order
pub fn get_applied_migrations(conn: &Connection) -> Result<Vec<String>> {
    let mut stmt = conn.prepare("SELECT name FROM schema_migrations ORDER BY version")?;
    let names = stmt
        .query_map([], |row| row.get::<_, String>(0))?
        .collect::<std::result::Result<Vec<_>, rusqlite::Error>>()?;
    Ok(names)
}

/// Read `NNN_name.sql` files, sorted by version
fn load_migrations(migrations_dir: &Path) -> Result<Vec<Migration>> {
    let mut migrations = Vec::new();

    for entry in fs::read_dir(migrations_dir)? {
        let path = entry?.path();
        if path.extension().and_then(|s| s.to_str()) != Some("sql") {
            continue;
        }

        let filename = path.file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| KitchenError::Config("Invalid migration filename".to_string()))?;

        // "001_core_tables.sql" -> 1
        let version_str = filename.split('_').next().unwrap_or_default();
        let version: u32 = version_str.parse()
            .map_err(|_| KitchenError::Config(format!("Invalid migration version in {}", filename)))?;

        migrations.push(Migration {
            version,
            name: filename.trim_end_matches(".sql").to_string(),
            sql: fs::read_to_string(&path)?,
        });
    }

    migrations.sort_by_key(|m| m.version);

    if let Some(pair) = migrations.windows(2).find(|w| w[0].version == w[1].version) {
        return Err(KitchenError::Config(format!(
            "Duplicate migration version {}: {} and {}",
            pair[0].version, pair[0].name, pair[1].name
        )));
    }

    Ok(migrations)
}

/// Run all pending migrations, each in its own transaction
pub fn run_migrations(conn: &mut Connection, migrations_dir: &Path) -> Result<()> {
    ensure_migrations_table(conn)?;

    let applied = get_applied_migrations(conn)?;
    let pending: Vec<Migration> = load_migrations(migrations_dir)?
        .into_iter()
        .filter(|m| !applied.contains(&m.name))
        .collect();

    if pending.is_empty() {
        log::debug!("Schema up to date ({} migrations applied)", applied.len());
        return Ok(());
    }

    for migration in pending {
        log::info!("Applying migration: {} (version {})", migration.name, migration.version);

        let tx = conn.transaction()?;
        tx.execute_batch(&migration.sql).map_err(|e| {
            KitchenError::Config(format!("Failed to execute migration {}: {}", migration.name, e))
        })?;
        tx.execute(
            "INSERT INTO schema_migrations (version, name) VALUES (?1, ?2)",
            params![migration.version, migration.name],
        )?;
        tx.commit()?;
    }

    log::info!("All migrations completed");
    Ok(())
}

fn schema_objects(conn: &Connection, kind: &str) -> Result<Vec<String>> {
    let mut stmt = conn.prepare("SELECT name FROM sqlite_master WHERE type = ?1 ORDER BY name")?;
    let names = stmt
        .query_map([kind], |row| row.get::<_, String>(0))?
        .collect::<std::result::Result<Vec<_>, rusqlite::Error>>()?;
    Ok(names)
}

fn require_all(kind: &str, present: &[String], expected: &[&str]) -> Result<()> {
    let missing: Vec<&str> = expected
        .iter()
        .copied()
        .filter(|name| !present.iter().any(|p| p == name))
        .collect();
    if missing.is_empty() {
        log::debug!("✓ All {} {}s exist", expected.len(), kind);
        Ok(())
    } else {
        for name in &missing {
            log::error!("Missing {}: {}", kind, name);
        }
        Err(KitchenError::Config(format!("Missing {}s: {}", kind, missing.join(", "))))
    }
}

/// Verify that the migrated schema contains every object the store relies on,
/// that foreign keys are enforced and that SQLite reports no corruption.
pub fn verify_schema(conn: &Connection) -> Result<()> {
    require_all("table", &schema_objects(conn, "table")?, EXPECTED_TABLES)?;
    require_all("view", &schema_objects(conn, "view")?, EXPECTED_VIEWS)?;
    require_all("index", &schema_objects(conn, "index")?, EXPECTED_INDEXES)?;
    require_all("trigger", &schema_objects(conn, "trigger")?, EXPECTED_TRIGGERS)?;

    let foreign_keys: i32 = conn.query_row("PRAGMA foreign_keys", [], |row| row.get(0))?;
    if foreign_keys != 1 {
        return Err(KitchenError::Config("Foreign keys not enabled".to_string()));
    }

    let integrity: String = conn.query_row("PRAGMA integrity_check", [], |row| row.get(0))?;
    if integrity != "ok" {
        return Err(KitchenError::Config(format!("Database integrity check failed: {}", integrity)));
    }

    log::info!("✓ Database schema verification complete");
    Ok(())
}
