use sea_orm_migration::prelude::*;

mod initial_001;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![Box::new(initial_001::Migration)]
    }

    /// Own bookkeeping table so several modules can share one database.
    fn migration_table_name() -> DynIden {
        Alias::new("auth_migrations").into_iden()
    }
}
