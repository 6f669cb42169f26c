use actix_web::{HttpResponse, web};
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use uuid::Uuid;

use crate::auth::middleware::AuthenticatedUser;
use crate::cache::GigCache;
use crate::error::MarketError;
use crate::models::bids::{CreateBid, UpdateBid};
use crate::notify::Presence;
use crate::services::bids as bid_service;
use crate::services::hire::hire_bid;
use crate::services::views;

/// POST /api/bids
pub async fn submit_bid(
    user: AuthenticatedUser,
    db: web::Data<DatabaseConnection>,
    body: web::Json<CreateBid>,
) -> Result<HttpResponse, MarketError> {
    let bid = bid_service::submit_bid(db.get_ref(), user.0.id, body.into_inner()).await?;
    let view = views::bid_view(db.get_ref(), bid).await?;
    Ok(HttpResponse::Created().json(view))
}

/// GET /api/bids/mine
pub async fn my_bids(
    user: AuthenticatedUser,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, MarketError> {
    let bids = bid_service::my_bids(db.get_ref(), user.0.id).await?;
    Ok(HttpResponse::Ok().json(bids))
}

/// GET /api/bids/gig/{gig_id}: gig owner only.
pub async fn bids_for_gig(
    user: AuthenticatedUser,
    db: web::Data<DatabaseConnection>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, MarketError> {
    let bids = bid_service::bids_for_gig(db.get_ref(), path.into_inner(), user.0.id).await?;
    Ok(HttpResponse::Ok().json(bids))
}

/// PUT /api/bids/{id}
pub async fn update_bid(
    user: AuthenticatedUser,
    db: web::Data<DatabaseConnection>,
    path: web::Path<Uuid>,
    body: web::Json<UpdateBid>,
) -> Result<HttpResponse, MarketError> {
    let bid =
        bid_service::edit_bid(db.get_ref(), path.into_inner(), user.0.id, body.into_inner())
            .await?;
    Ok(HttpResponse::Ok().json(bid))
}

/// DELETE /api/bids/{id}
pub async fn withdraw_bid(
    user: AuthenticatedUser,
    db: web::Data<DatabaseConnection>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, MarketError> {
    let id = path.into_inner();
    bid_service::withdraw_bid(db.get_ref(), id, user.0.id).await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": format!("Bid {id} withdrawn"),
    })))
}

/// PATCH /api/bids/{id}/hire
pub async fn hire(
    user: AuthenticatedUser,
    db: web::Data<DatabaseConnection>,
    cache: web::Data<GigCache>,
    presence: web::Data<Arc<dyn Presence>>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, MarketError> {
    let outcome = hire_bid(
        db.get_ref(),
        presence.get_ref().as_ref(),
        path.into_inner(),
        user.0.id,
    )
    .await?;
    cache.invalidate(outcome.gig.gig.id).await;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Freelancer hired successfully",
        "gig": outcome.gig,
        "bid": outcome.bid,
    })))
}
