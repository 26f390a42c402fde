use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .get_connection()
            .execute_unprepared(
                "CREATE TYPE meeting_notes.transcription_status AS ENUM (
                    'pending',
                    'completed',
                    'failed',
                    'not_requested'
                )",
            )
            .await?;

        // We use execute_unprepared() so the table is qualified with the
        // meeting_notes schema regardless of the connection's search_path.
        let create_table_sql = "CREATE TABLE IF NOT EXISTS meeting_notes.audio_files (
            id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            filename VARCHAR(512) NOT NULL,
            original_filename VARCHAR(512) NOT NULL,
            filepath TEXT NOT NULL,
            duration DOUBLE PRECISION NOT NULL DEFAULT 0,
            department VARCHAR(255),
            language TEXT NOT NULL DEFAULT '[]',
            upload_time TIMESTAMPTZ NOT NULL DEFAULT now(),
            transcript_path TEXT,
            transcription_status meeting_notes.transcription_status NOT NULL DEFAULT 'not_requested',
            created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
            updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
            CONSTRAINT audio_files_filename_unique UNIQUE (filename)
        )";

        manager
            .get_connection()
            .execute_unprepared(create_table_sql)
            .await?;

        // Listing is always newest first
        manager
            .get_connection()
            .execute_unprepared(
                "CREATE INDEX IF NOT EXISTS audio_files_upload_time_idx
                ON meeting_notes.audio_files(upload_time DESC)",
            )
            .await?;

        manager
            .get_connection()
            .execute_unprepared(
                "CREATE INDEX IF NOT EXISTS audio_files_department_idx
                ON meeting_notes.audio_files(department)",
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .get_connection()
            .execute_unprepared("DROP TABLE IF EXISTS meeting_notes.audio_files")
            .await?;

        manager
            .get_connection()
            .execute_unprepared("DROP TYPE IF EXISTS meeting_notes.transcription_status")
            .await?;

        Ok(())
    }
}
