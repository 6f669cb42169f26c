pub use sea_orm_migration::prelude::*;

mod m20250301_000001_create_users_table;
mod m20250301_000002_create_gigs_table;
mod m20250301_000003_create_bids_table;
mod m20250302_000001_add_marketplace_indexes;
mod m20250315_000001_normalize_legacy_bid_status;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250301_000001_create_users_table::Migration),
            Box::new(m20250301_000002_create_gigs_table::Migration),
            Box::new(m20250301_000003_create_bids_table::Migration),
            Box::new(m20250302_000001_add_marketplace_indexes::Migration),
            Box::new(m20250315_000001_normalize_legacy_bid_status::Migration),
        ]
    }
}
