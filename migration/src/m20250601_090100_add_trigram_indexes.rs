//! Enables `pg_trgm` and adds trigram indexes for fuzzy search.
//!
//! Only PostgreSQL has the extension; on other backends this migration is a
//! no-op and similarity is computed in process.

use sea_orm_migration::prelude::*;
use sea_orm_migration::sea_orm::{ConnectionTrait, DbBackend};

#[derive(DeriveMigrationName)]
pub struct Migration;

const TRIGRAM_INDEXES: &[(&str, &str)] = &[
    ("idx_content_title_trgm", "title"),
    ("idx_content_description_trgm", "description"),
    ("idx_content_platform_name_trgm", "platform_name"),
];

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        if manager.get_database_backend() != DbBackend::Postgres {
            return Ok(());
        }

        let db = manager.get_connection();
        db.execute_unprepared("CREATE EXTENSION IF NOT EXISTS pg_trgm")
            .await?;

        for (name, column) in TRIGRAM_INDEXES {
            db.execute_unprepared(&format!(
                "CREATE INDEX IF NOT EXISTS {name} ON content USING gin ({column} gin_trgm_ops)"
            ))
            .await?;
        }

        db.execute_unprepared(
            "CREATE INDEX IF NOT EXISTS idx_tag_name_trgm ON tag USING gin (name gin_trgm_ops)",
        )
        .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        if manager.get_database_backend() != DbBackend::Postgres {
            return Ok(());
        }

        let db = manager.get_connection();
        for (name, _) in TRIGRAM_INDEXES {
            db.execute_unprepared(&format!("DROP INDEX IF EXISTS {name}"))
                .await?;
        }
        db.execute_unprepared("DROP INDEX IF EXISTS idx_tag_name_trgm")
            .await?;

        // pg_trgm itself is left installed.
        Ok(())
    }
}
