use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let conn = manager.get_connection();

        // Upserts conflict on this index.
        conn.execute_unprepared(
            "CREATE UNIQUE INDEX IF NOT EXISTS idx_website_content_section_field ON website_content(section, field)",
        )
        .await?;

        conn.execute_unprepared(
            "CREATE INDEX IF NOT EXISTS idx_website_content_updated_at ON website_content(updated_at)",
        )
        .await?;

        conn.execute_unprepared(
            "CREATE INDEX IF NOT EXISTS idx_login_attempts_email ON login_attempts(email, attempted_at)",
        )
        .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let conn = manager.get_connection();

        conn.execute_unprepared("DROP INDEX IF EXISTS idx_login_attempts_email")
            .await?;
        conn.execute_unprepared("DROP INDEX IF EXISTS idx_website_content_updated_at")
            .await?;
        conn.execute_unprepared("DROP INDEX IF EXISTS idx_website_content_section_field")
            .await?;

        Ok(())
    }
}
