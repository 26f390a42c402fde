pub use sea_orm_migration::prelude::*;

mod m20241020_090000_create_schema;
mod m20241020_091500_create_audio_files;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20241020_090000_create_schema::Migration),
            Box::new(m20241020_091500_create_audio_files::Migration),
        ]
    }
}
