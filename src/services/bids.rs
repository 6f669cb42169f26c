//! Bid lifecycle on the freelancer side, plus the owner's view of a gig's bids.

use sea_orm::{ConnectionTrait, TransactionSession, TransactionTrait};
use uuid::Uuid;

use crate::auth::authorization::{ensure_bidder, ensure_gig_owner};
use crate::db::bids as bid_db;
use crate::db::gigs as gig_db;
use crate::error::{MarketError, MarketResult};
use crate::models::bids::{self, BidView, CreateBid, UpdateBid};
use crate::services::views;

pub const PROPOSAL_MAX: usize = 1000;

const DUPLICATE_BID: &str = "You have already placed a bid on this gig";

fn validate_proposal(proposal: &str) -> MarketResult<String> {
    let proposal = proposal.trim();
    if proposal.is_empty() {
        return Err(MarketError::Validation(
            "Proposal cannot be empty".to_string(),
        ));
    }
    if proposal.chars().count() > PROPOSAL_MAX {
        return Err(MarketError::Validation(format!(
            "Proposal cannot be more than {PROPOSAL_MAX} characters"
        )));
    }
    Ok(proposal.to_string())
}

fn validate_amount(amount: f64) -> MarketResult<f64> {
    if amount.is_finite() && amount >= 0.0 {
        Ok(amount)
    } else {
        Err(MarketError::Validation(
            "Amount must be a non-negative number".to_string(),
        ))
    }
}

fn validate_days(days: i32) -> MarketResult<i32> {
    if days >= 1 {
        Ok(days)
    } else {
        Err(MarketError::Validation(
            "Estimated days must be at least 1".to_string(),
        ))
    }
}

pub fn validate_new_bid(input: CreateBid) -> MarketResult<CreateBid> {
    Ok(CreateBid {
        gig_id: input.gig_id,
        proposal: validate_proposal(&input.proposal)?,
        amount: validate_amount(input.amount)?,
        estimated_days: validate_days(input.estimated_days)?,
    })
}

pub fn validate_bid_changes(input: UpdateBid) -> MarketResult<UpdateBid> {
    Ok(UpdateBid {
        proposal: input.proposal.as_deref().map(validate_proposal).transpose()?,
        amount: input.amount.map(validate_amount).transpose()?,
        estimated_days: input.estimated_days.map(validate_days).transpose()?,
    })
}

async fn load_bid<C: ConnectionTrait>(db: &C, bid_id: Uuid) -> MarketResult<bids::Model> {
    bid_db::get_bid_by_id(db, bid_id)
        .await?
        .ok_or_else(|| MarketError::NotFound(format!("Bid {bid_id} not found")))
}

fn ensure_pending(bid: &bids::Model, action: &str) -> MarketResult<()> {
    if bid.status.is_terminal() {
        return Err(MarketError::InvalidState(format!(
            "Cannot {action} a bid that is {}",
            bid.status.display_label().to_lowercase()
        )));
    }
    Ok(())
}

/// Place a pending bid on an open gig.
///
/// The gig row is share-locked for the length of the transaction, so a
/// concurrent hire or cancel waits for the insert to land or roll back.
pub async fn submit_bid<C>(
    db: &C,
    freelancer_id: Uuid,
    input: CreateBid,
) -> MarketResult<bids::Model>
where
    C: ConnectionTrait + TransactionTrait,
{
    let input = validate_new_bid(input)?;
    let txn = db.begin().await?;

    let gig = gig_db::get_gig_for_share(&txn, input.gig_id)
        .await?
        .ok_or_else(|| MarketError::NotFound(format!("Gig {} not found", input.gig_id)))?;

    if !gig.status.is_open() {
        return Err(MarketError::InvalidState(
            "This gig is no longer accepting bids".to_string(),
        ));
    }
    if gig.client_id == freelancer_id {
        return Err(MarketError::Forbidden(
            "You cannot bid on your own gig".to_string(),
        ));
    }
    if bid_db::bid_exists_for_gig_and_freelancer(&txn, gig.id, freelancer_id).await? {
        return Err(MarketError::Conflict(DUPLICATE_BID.to_string()));
    }

    // The unique index still catches a duplicate that slipped past the check.
    let bid = bid_db::insert_bid(&txn, input, freelancer_id)
        .await
        .map_err(|e| MarketError::from_insert(e, DUPLICATE_BID))?;

    txn.commit().await?;
    tracing::info!(bid_id = %bid.id, gig_id = %bid.gig_id, %freelancer_id, "bid submitted");
    Ok(bid)
}

/// Bidder edit of a pending bid.
pub async fn edit_bid<C: ConnectionTrait>(
    db: &C,
    bid_id: Uuid,
    actor_id: Uuid,
    input: UpdateBid,
) -> MarketResult<bids::Model> {
    let bid = load_bid(db, bid_id).await?;
    ensure_bidder(&bid, actor_id, "update this bid")?;
    ensure_pending(&bid, "update")?;

    let changes = validate_bid_changes(input)?;
    if bid_db::update_pending_bid(db, bid_id, changes).await? == 0 {
        return Err(MarketError::InvalidState(
            "Bid is no longer pending".to_string(),
        ));
    }

    load_bid(db, bid_id).await
}

/// Bidder withdrawal. Only pending bids can be taken back.
pub async fn withdraw_bid<C: ConnectionTrait>(
    db: &C,
    bid_id: Uuid,
    actor_id: Uuid,
) -> MarketResult<()> {
    let bid = load_bid(db, bid_id).await?;
    ensure_bidder(&bid, actor_id, "withdraw this bid")?;
    ensure_pending(&bid, "withdraw")?;

    if bid_db::delete_pending_bid(db, bid_id).await? == 0 {
        return Err(MarketError::InvalidState(
            "Bid is no longer pending".to_string(),
        ));
    }

    tracing::info!(%bid_id, gig_id = %bid.gig_id, "bid withdrawn");
    Ok(())
}

/// All bids on a gig. Only the gig owner may look.
pub async fn bids_for_gig<C: ConnectionTrait>(
    db: &C,
    gig_id: Uuid,
    actor_id: Uuid,
) -> MarketResult<Vec<BidView>> {
    let gig = gig_db::get_gig_by_id(db, gig_id)
        .await?
        .ok_or_else(|| MarketError::NotFound(format!("Gig {gig_id} not found")))?;
    ensure_gig_owner(&gig, actor_id, "view bids on this gig")?;

    let bids = bid_db::get_bids_by_gig(db, gig_id).await?;
    views::bid_views(db, bids).await
}

pub async fn my_bids<C: ConnectionTrait>(db: &C, freelancer_id: Uuid) -> MarketResult<Vec<BidView>> {
    let bids = bid_db::get_bids_by_freelancer(db, freelancer_id).await?;
    views::bid_views(db, bids).await
}
