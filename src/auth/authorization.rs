use uuid::Uuid;

use crate::error::{MarketError, MarketResult};
use crate::models::{bids, gigs};

pub fn ensure_gig_owner(gig: &gigs::Model, actor_id: Uuid, action: &str) -> MarketResult<()> {
    if gig.client_id == actor_id {
        Ok(())
    } else {
        Err(MarketError::Forbidden(format!("Only the gig owner can {action}")))
    }
}

pub fn ensure_bidder(bid: &bids::Model, actor_id: Uuid, action: &str) -> MarketResult<()> {
    if bid.freelancer_id == actor_id {
        Ok(())
    } else {
        Err(MarketError::Forbidden(format!(
            "Only the freelancer who placed this bid can {action}"
        )))
    }
}
