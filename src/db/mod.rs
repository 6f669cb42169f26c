pub mod bids;
pub mod gigs;
pub mod users;

use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};

/// Create a SeaORM connection pool for the given database URL.
pub async fn create_pool(database_url: &str) -> Result<DatabaseConnection, DbErr> {
    let mut options = ConnectOptions::new(database_url.to_owned());
    options.sqlx_logging(false);
    Database::connect(options).await
}
