//! Shared fixtures: an in-memory SQLite database with the real migrations
//! applied, plus helpers that seed users, gigs and bids through the services.
#![allow(dead_code)]

use gigflow_backend::db::users::find_or_create_from_auth;
use gigflow_backend::models::bids::{self, CreateBid};
use gigflow_backend::models::gigs::{self, CreateGig};
use gigflow_backend::models::users::{self, CreateUserFromAuth};
use gigflow_backend::services::{bids as bid_service, gigs as gig_service};
use migration::{Migrator, MigratorTrait};
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use uuid::Uuid;

/// A single pooled connection so every query sees the same in-memory database.
pub async fn setup_db() -> DatabaseConnection {
    let mut options = ConnectOptions::new("sqlite::memory:".to_owned());
    options
        .max_connections(1)
        .min_connections(1)
        .sqlx_logging(false);

    let db = Database::connect(options)
        .await
        .expect("Failed to open in-memory SQLite");
    Migrator::up(&db, None)
        .await
        .expect("Failed to run migrations");
    db
}

pub async fn seed_user(db: &DatabaseConnection, name: &str) -> users::Model {
    let id = Uuid::new_v4();
    find_or_create_from_auth(
        db,
        CreateUserFromAuth {
            id,
            email: format!("{}-{id}@example.com", name.to_lowercase()),
            display_name: Some(name.to_string()),
            avatar_url: None,
            auth_provider: "test".to_string(),
        },
    )
    .await
    .expect("Failed to seed user")
}

pub fn gig_input(title: &str) -> CreateGig {
    CreateGig {
        title: title.to_string(),
        description: "Build a small landing page with a contact form.".to_string(),
        budget: 500.0,
        category: None,
        deadline: None,
    }
}

pub async fn seed_gig(db: &DatabaseConnection, client: &users::Model, title: &str) -> gigs::Model {
    gig_service::create_gig(db, client.id, gig_input(title))
        .await
        .expect("Failed to seed gig")
}

pub fn bid_input(gig_id: Uuid, amount: f64) -> CreateBid {
    CreateBid {
        gig_id,
        proposal: "I have shipped a dozen of these.".to_string(),
        amount,
        estimated_days: 7,
    }
}

pub async fn seed_bid(
    db: &DatabaseConnection,
    gig: &gigs::Model,
    freelancer: &users::Model,
    amount: f64,
) -> bids::Model {
    bid_service::submit_bid(db, freelancer.id, bid_input(gig.id, amount))
        .await
        .expect("Failed to seed bid")
}
