//! Schema setup for the site store.

use std::path::Path;

use sqlx::migrate::Migrator;
use sqlx::SqlitePool;

use crate::error_handling::DatabaseError;

/// Applies the migrations in `migrations/` (the `tracked_sites` table).
pub async fn run_migrations(pool: &SqlitePool) -> Result<(), DatabaseError> {
    let dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("migrations");
    let migrator = Migrator::new(dir.as_path()).await?;
    log::debug!(
        "Applying {} migration(s) from {}",
        migrator.iter().count(),
        dir.display()
    );
    migrator.run(pool).await?;
    Ok(())
}
