use sea_orm::ConnectionTrait;
use std::collections::HashMap;

use crate::db::gigs as gig_db;
use crate::db::users as user_db;
use crate::error::MarketResult;
use crate::models::bids::{self, BidView};
use crate::models::gigs::{self, GigView};
use crate::models::users::PartyView;

/// Attach owner identities to gigs, batching the user lookup.
pub async fn gig_views<C: ConnectionTrait>(
    db: &C,
    gigs: Vec<gigs::Model>,
) -> MarketResult<Vec<GigView>> {
    let client_ids = gigs.iter().map(|g| g.client_id).collect();
    let owners = user_db::get_users_by_ids(db, client_ids).await?;

    Ok(gigs
        .into_iter()
        .map(|gig| {
            let client = owners.get(&gig.client_id).cloned().map(PartyView::from);
            GigView { gig, client }
        })
        .collect())
}

pub async fn gig_view<C: ConnectionTrait>(db: &C, gig: gigs::Model) -> MarketResult<GigView> {
    let client = user_db::get_user_by_id(db, gig.client_id)
        .await?
        .map(PartyView::from);
    Ok(GigView { gig, client })
}

/// Attach gig titles and bidder identities to bids, batching both lookups.
pub async fn bid_views<C: ConnectionTrait>(
    db: &C,
    bids: Vec<bids::Model>,
) -> MarketResult<Vec<BidView>> {
    let gig_ids = bids.iter().map(|b| b.gig_id).collect();
    let freelancer_ids = bids.iter().map(|b| b.freelancer_id).collect();

    let titles: HashMap<_, _> = gig_db::get_gigs_by_ids(db, gig_ids)
        .await?
        .into_iter()
        .map(|g| (g.id, g.title))
        .collect();
    let freelancers = user_db::get_users_by_ids(db, freelancer_ids).await?;

    Ok(bids
        .into_iter()
        .map(|bid| BidView {
            status_label: bid.status.display_label(),
            gig_title: titles.get(&bid.gig_id).cloned(),
            freelancer: freelancers.get(&bid.freelancer_id).cloned().map(PartyView::from),
            bid,
        })
        .collect())
}

pub async fn bid_view<C: ConnectionTrait>(db: &C, bid: bids::Model) -> MarketResult<BidView> {
    let gig_title = gig_db::get_gig_by_id(db, bid.gig_id).await?.map(|g| g.title);
    let freelancer = user_db::get_user_by_id(db, bid.freelancer_id)
        .await?
        .map(PartyView::from);

    Ok(BidView {
        status_label: bid.status.display_label(),
        gig_title,
        freelancer,
        bid,
    })
}

/// Views without any lookups, for when resolution fails after a committed write.
pub fn bare_gig_view(gig: gigs::Model) -> GigView {
    GigView { gig, client: None }
}

pub fn bare_bid_view(bid: bids::Model, gig_title: Option<String>) -> BidView {
    BidView {
        status_label: bid.status.display_label(),
        gig_title,
        freelancer: None,
        bid,
    }
}
