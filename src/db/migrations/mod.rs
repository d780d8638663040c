use crate::error::Error;
use anyhow::Result;
use sqlx::{Executor, PgPool};
use tracing::info;

/// Schema scripts in execution order. Every script is idempotent, so the
/// full list runs on each start.
const MIGRATIONS: &[(&str, &str)] = &[
    ("001_accounts.sql", include_str!("sql/001_accounts.sql")),
    (
        "002_attendance_records.sql",
        include_str!("sql/002_attendance_records.sql"),
    ),
    (
        "003_incident_reports.sql",
        include_str!("sql/003_incident_reports.sql"),
    ),
    (
        "004_emergency_alarms.sql",
        include_str!("sql/004_emergency_alarms.sql"),
    ),
    // Indexes go after every table exists
    ("add_indexes.sql", include_str!("sql/add_indexes.sql")),
];

pub async fn run_migrations(pool: &PgPool) -> Result<()> {
    for (name, _) in MIGRATIONS {
        run_single_migration(pool, name).await?;
    }

    Ok(())
}

/// Run a specific migration script by name
pub async fn run_single_migration(pool: &PgPool, migration_name: &str) -> Result<()> {
    let sql = MIGRATIONS
        .iter()
        .find(|(name, _)| *name == migration_name)
        .map(|(_, sql)| *sql)
        .ok_or_else(|| Error::Database(format!("Migration {} not found", migration_name)))?;

    pool.execute(sql)
        .await
        .map_err(|e| Error::Database(format!("Migration {} failed: {}", migration_name, e)))?;

    info!("Applied migration: {}", migration_name);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn indexes_run_last() {
        let names: Vec<&str> = MIGRATIONS.iter().map(|(name, _)| *name).collect();
        assert_eq!(names.last(), Some(&"add_indexes.sql"));
        assert!(names[..names.len() - 1].windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn attendance_table_carries_the_daily_constraint() {
        let (_, sql) = MIGRATIONS
            .iter()
            .find(|(name, _)| name.contains("attendance"))
            .unwrap();
        assert!(sql.contains("UNIQUE (officer_id, local_date)"));
    }
}
