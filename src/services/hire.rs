//! The hire transition: one pending bid wins, its open gig becomes `assigned`,
//! and every other pending bid on that gig is rejected.
//!
//! All three writes share one database transaction. The conditional
//! `open → assigned` update on the gig row is where concurrent hires on the
//! same gig serialize: whoever updates it first wins, the rest see zero rows
//! and fail with `InvalidState`.
//!
//! The freelancer is notified only after commit, and that step can never fail
//! the hire.

use sea_orm::{ConnectionTrait, TransactionSession, TransactionTrait};
use serde::Serialize;
use uuid::Uuid;

use crate::auth::authorization::ensure_gig_owner;
use crate::db::bids as bid_db;
use crate::db::gigs as gig_db;
use crate::error::{MarketError, MarketResult};
use crate::models::bids::{self, BidView};
use crate::models::gigs::{self, GigView};
use crate::notify::Presence;
use crate::notify::dispatch::announce_hire;
use crate::services::views;

#[derive(Debug, Clone, Serialize)]
pub struct HireOutcome {
    pub gig: GigView,
    pub bid: BidView,
}

/// Hire `bid_id` on behalf of `actor_id`, who must own the bid's gig.
pub async fn hire_bid<C>(
    db: &C,
    presence: &dyn Presence,
    bid_id: Uuid,
    actor_id: Uuid,
) -> MarketResult<HireOutcome>
where
    C: ConnectionTrait + TransactionTrait,
{
    let (gig, bid) = match commit_hire(db, bid_id, actor_id).await {
        Ok(committed) => committed,
        Err(e) => {
            if matches!(e, MarketError::InvalidState(_)) {
                tracing::warn!(%bid_id, %actor_id, error = %e, "hire rejected");
            }
            return Err(e);
        }
    };

    tracing::info!(
        gig_id = %gig.id,
        %bid_id,
        freelancer_id = %bid.freelancer_id,
        "bid hired"
    );

    announce_hire(presence, &gig, &bid).await;

    // The hire is durable at this point; a failed lookup only costs the
    // owner and freelancer names in the response.
    let gig_view = match views::gig_view(db, gig.clone()).await {
        Ok(view) => view,
        Err(e) => {
            tracing::warn!(gig_id = %gig.id, error = ?e, "could not resolve gig owner after hire");
            views::bare_gig_view(gig.clone())
        }
    };
    let bid_view = match views::bid_view(db, bid.clone()).await {
        Ok(view) => view,
        Err(e) => {
            tracing::warn!(%bid_id, error = ?e, "could not resolve bidder after hire");
            views::bare_bid_view(bid, Some(gig.title.clone()))
        }
    };

    Ok(HireOutcome {
        gig: gig_view,
        bid: bid_view,
    })
}

/// Preconditions and writes, all inside one transaction. Returns the gig and
/// bid as committed.
async fn commit_hire<C>(
    db: &C,
    bid_id: Uuid,
    actor_id: Uuid,
) -> MarketResult<(gigs::Model, bids::Model)>
where
    C: ConnectionTrait + TransactionTrait,
{
    let txn = db.begin().await?;

    let bid = bid_db::get_bid_by_id(&txn, bid_id)
        .await?
        .ok_or_else(|| MarketError::NotFound(format!("Bid {bid_id} not found")))?;

    let gig = gig_db::get_gig_by_id(&txn, bid.gig_id)
        .await?
        .ok_or_else(|| MarketError::NotFound(format!("Gig {} not found", bid.gig_id)))?;

    ensure_gig_owner(&gig, actor_id, "hire freelancers")?;
    if !gig.status.is_open() {
        return Err(MarketError::InvalidState(
            "This gig is no longer open".to_string(),
        ));
    }
    if bid.status.is_terminal() {
        return Err(MarketError::InvalidState(format!(
            "Bid has already been {}",
            bid.status.display_label().to_lowercase()
        )));
    }

    let now = chrono::Utc::now();

    if gig_db::assign_open_gig(&txn, gig.id, bid.id, now).await? == 0 {
        txn.rollback().await?;
        return Err(MarketError::InvalidState(
            "This gig is no longer open".to_string(),
        ));
    }
    if bid_db::mark_hired(&txn, bid.id, now).await? == 0 {
        txn.rollback().await?;
        return Err(MarketError::InvalidState(
            "Bid is no longer pending".to_string(),
        ));
    }
    let rejected = bid_db::reject_pending_siblings(&txn, gig.id, bid.id, now).await?;

    let gig = gig_db::get_gig_by_id(&txn, gig.id)
        .await?
        .ok_or_else(|| MarketError::NotFound(format!("Gig {} not found", bid.gig_id)))?;
    let bid = bid_db::get_bid_by_id(&txn, bid.id)
        .await?
        .ok_or_else(|| MarketError::NotFound(format!("Bid {bid_id} not found")))?;

    txn.commit().await?;
    tracing::debug!(gig_id = %gig.id, rejected, "sibling bids rejected");

    Ok((gig, bid))
}
