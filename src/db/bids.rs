use sea_orm::prelude::Expr;
use sea_orm::*;
use uuid::Uuid;

use crate::models::bids::{self, BidStatus, CreateBid, UpdateBid};

/// Insert a new bid (defaults to Pending status). Input must already be validated.
pub async fn insert_bid<C: ConnectionTrait>(
    db: &C,
    input: CreateBid,
    freelancer_id: Uuid,
) -> Result<bids::Model, DbErr> {
    let new_bid = bids::ActiveModel {
        id: Set(Uuid::new_v4()),
        gig_id: Set(input.gig_id),
        freelancer_id: Set(freelancer_id),
        proposal: Set(input.proposal),
        amount: Set(input.amount),
        estimated_days: Set(input.estimated_days),
        status: Set(BidStatus::Pending),
        created_at: Set(chrono::Utc::now()),
        updated_at: Set(None),
    };

    new_bid.insert(db).await
}

/// Fetch a single bid by ID.
pub async fn get_bid_by_id<C: ConnectionTrait>(
    db: &C,
    id: Uuid,
) -> Result<Option<bids::Model>, DbErr> {
    bids::Entity::find_by_id(id).one(db).await
}

/// Whether this freelancer already bid on this gig.
pub async fn bid_exists_for_gig_and_freelancer<C: ConnectionTrait>(
    db: &C,
    gig_id: Uuid,
    freelancer_id: Uuid,
) -> Result<bool, DbErr> {
    let count = bids::Entity::find()
        .filter(bids::Column::GigId.eq(gig_id))
        .filter(bids::Column::FreelancerId.eq(freelancer_id))
        .count(db)
        .await?;

    Ok(count > 0)
}

/// Fetch all bids on a gig, newest first.
pub async fn get_bids_by_gig<C: ConnectionTrait>(
    db: &C,
    gig_id: Uuid,
) -> Result<Vec<bids::Model>, DbErr> {
    bids::Entity::find()
        .filter(bids::Column::GigId.eq(gig_id))
        .order_by_desc(bids::Column::CreatedAt)
        .order_by_desc(bids::Column::Id)
        .all(db)
        .await
}

/// Fetch all bids placed by a freelancer, newest first.
pub async fn get_bids_by_freelancer<C: ConnectionTrait>(
    db: &C,
    freelancer_id: Uuid,
) -> Result<Vec<bids::Model>, DbErr> {
    bids::Entity::find()
        .filter(bids::Column::FreelancerId.eq(freelancer_id))
        .order_by_desc(bids::Column::CreatedAt)
        .order_by_desc(bids::Column::Id)
        .all(db)
        .await
}

/// Apply bidder edits to a bid that is still pending. Returns rows affected.
pub async fn update_pending_bid<C: ConnectionTrait>(
    db: &C,
    id: Uuid,
    input: UpdateBid,
) -> Result<u64, DbErr> {
    let mut update = bids::Entity::update_many()
        .col_expr(bids::Column::UpdatedAt, Expr::value(chrono::Utc::now()));

    if let Some(proposal) = input.proposal {
        update = update.col_expr(bids::Column::Proposal, Expr::value(proposal));
    }
    if let Some(amount) = input.amount {
        update = update.col_expr(bids::Column::Amount, Expr::value(amount));
    }
    if let Some(days) = input.estimated_days {
        update = update.col_expr(bids::Column::EstimatedDays, Expr::value(days));
    }

    let result = update
        .filter(bids::Column::Id.eq(id))
        .filter(bids::Column::Status.eq(BidStatus::Pending))
        .exec(db)
        .await?;

    Ok(result.rows_affected)
}

/// Delete a bid only while it is pending. Returns rows affected.
pub async fn delete_pending_bid<C: ConnectionTrait>(db: &C, id: Uuid) -> Result<u64, DbErr> {
    let result = bids::Entity::delete_many()
        .filter(bids::Column::Id.eq(id))
        .filter(bids::Column::Status.eq(BidStatus::Pending))
        .exec(db)
        .await?;

    Ok(result.rows_affected)
}

/// Delete every bid on a gig, whatever its status.
pub async fn delete_bids_by_gig<C: ConnectionTrait>(db: &C, gig_id: Uuid) -> Result<u64, DbErr> {
    let result = bids::Entity::delete_many()
        .filter(bids::Column::GigId.eq(gig_id))
        .exec(db)
        .await?;

    Ok(result.rows_affected)
}

/// `pending → hired` for one bid. Returns rows affected (0 or 1).
pub async fn mark_hired<C: ConnectionTrait>(
    db: &C,
    id: Uuid,
    now: chrono::DateTime<chrono::Utc>,
) -> Result<u64, DbErr> {
    let result = bids::Entity::update_many()
        .col_expr(bids::Column::Status, Expr::value(BidStatus::Hired))
        .col_expr(bids::Column::UpdatedAt, Expr::value(now))
        .filter(bids::Column::Id.eq(id))
        .filter(bids::Column::Status.eq(BidStatus::Pending))
        .exec(db)
        .await?;

    Ok(result.rows_affected)
}

/// `pending → rejected` for every other bid on the gig. Bids that are already
/// resolved keep their status.
pub async fn reject_pending_siblings<C: ConnectionTrait>(
    db: &C,
    gig_id: Uuid,
    hired_bid_id: Uuid,
    now: chrono::DateTime<chrono::Utc>,
) -> Result<u64, DbErr> {
    let result = bids::Entity::update_many()
        .col_expr(bids::Column::Status, Expr::value(BidStatus::Rejected))
        .col_expr(bids::Column::UpdatedAt, Expr::value(now))
        .filter(bids::Column::GigId.eq(gig_id))
        .filter(bids::Column::Id.ne(hired_bid_id))
        .filter(bids::Column::Status.eq(BidStatus::Pending))
        .exec(db)
        .await?;

    Ok(result.rows_affected)
}
