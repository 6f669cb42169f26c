use crate::models::{bids, gigs};
use crate::notify::presence::{Delivery, Presence};
use crate::notify::protocol::ServerEvent;

/// Tell the hired freelancer they won. Call only after the hire is committed.
///
/// Best effort: the outcome is logged and returned for inspection, never
/// turned into an error.
pub async fn announce_hire(
    presence: &dyn Presence,
    gig: &gigs::Model,
    bid: &bids::Model,
) -> Delivery {
    let event = ServerEvent::hired(gig.id, &gig.title);
    let delivery = presence.send(bid.freelancer_id, event).await;

    match delivery {
        Delivery::Delivered => tracing::info!(
            gig_id = %gig.id,
            freelancer_id = %bid.freelancer_id,
            "hire notification sent"
        ),
        Delivery::NotConnected => tracing::info!(
            gig_id = %gig.id,
            freelancer_id = %bid.freelancer_id,
            "freelancer not connected, hire notification dropped"
        ),
        Delivery::Closed => tracing::info!(
            gig_id = %gig.id,
            freelancer_id = %bid.freelancer_id,
            "freelancer connection closed, hire notification dropped"
        ),
    }

    delivery
}
