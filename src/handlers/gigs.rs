use actix_web::{HttpResponse, web};
use sea_orm::DatabaseConnection;
use uuid::Uuid;

use crate::auth::middleware::AuthenticatedUser;
use crate::cache::GigCache;
use crate::error::MarketError;
use crate::models::gigs::{CreateGig, GigListQuery, UpdateGig};
use crate::services::gigs as gig_service;
use crate::services::views;

/// GET /api/gigs: public listing, open gigs unless `status` says otherwise.
pub async fn list_gigs(
    db: web::Data<DatabaseConnection>,
    query: web::Query<GigListQuery>,
) -> Result<HttpResponse, MarketError> {
    let page = gig_service::list_gigs(db.get_ref(), &query).await?;
    Ok(HttpResponse::Ok().json(page))
}

/// GET /api/gigs/{id}
pub async fn get_gig(
    db: web::Data<DatabaseConnection>,
    cache: web::Data<GigCache>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, MarketError> {
    let id = path.into_inner();

    if let Some(hit) = cache.get(id).await {
        return Ok(HttpResponse::Ok().json(hit));
    }

    let view = gig_service::get_gig(db.get_ref(), id).await?;
    cache.put(&view).await;
    Ok(HttpResponse::Ok().json(view))
}

/// GET /api/gigs/mine
pub async fn my_gigs(
    user: AuthenticatedUser,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, MarketError> {
    let gigs = gig_service::my_gigs(db.get_ref(), user.0.id).await?;
    Ok(HttpResponse::Ok().json(gigs))
}

/// POST /api/gigs: the caller becomes the owner.
pub async fn create_gig(
    user: AuthenticatedUser,
    db: web::Data<DatabaseConnection>,
    body: web::Json<CreateGig>,
) -> Result<HttpResponse, MarketError> {
    let gig = gig_service::create_gig(db.get_ref(), user.0.id, body.into_inner()).await?;
    let view = views::gig_view(db.get_ref(), gig).await?;
    Ok(HttpResponse::Created().json(view))
}

/// PUT /api/gigs/{id}
pub async fn update_gig(
    user: AuthenticatedUser,
    db: web::Data<DatabaseConnection>,
    cache: web::Data<GigCache>,
    path: web::Path<Uuid>,
    body: web::Json<UpdateGig>,
) -> Result<HttpResponse, MarketError> {
    let id = path.into_inner();
    let gig = gig_service::edit_gig(db.get_ref(), id, user.0.id, body.into_inner()).await?;
    cache.invalidate(id).await;
    Ok(HttpResponse::Ok().json(gig))
}

/// PATCH /api/gigs/{id}/cancel
pub async fn cancel_gig(
    user: AuthenticatedUser,
    db: web::Data<DatabaseConnection>,
    cache: web::Data<GigCache>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, MarketError> {
    let id = path.into_inner();
    let gig = gig_service::cancel_gig(db.get_ref(), id, user.0.id).await?;
    cache.invalidate(id).await;
    Ok(HttpResponse::Ok().json(gig))
}

/// DELETE /api/gigs/{id}: removes the gig and every bid on it.
pub async fn delete_gig(
    user: AuthenticatedUser,
    db: web::Data<DatabaseConnection>,
    cache: web::Data<GigCache>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, MarketError> {
    let id = path.into_inner();
    gig_service::delete_gig(db.get_ref(), id, user.0.id).await?;
    cache.invalidate(id).await;
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": format!("Gig {id} deleted"),
    })))
}
