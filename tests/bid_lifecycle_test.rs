//! Bid submission, bidder edits and withdrawal, and the owner's view of bids.
mod common;

use common::{bid_input, seed_bid, seed_gig, seed_user, setup_db};
use gigflow_backend::db::bids::{get_bid_by_id, get_bids_by_gig};
use gigflow_backend::error::MarketError;
use gigflow_backend::models::bids::{BidStatus, UpdateBid};
use gigflow_backend::notify::PresenceHub;
use gigflow_backend::services::bids::{
    bids_for_gig, edit_bid, my_bids, submit_bid, withdraw_bid,
};
use gigflow_backend::services::gigs::cancel_gig;
use gigflow_backend::services::hire::hire_bid;
use uuid::Uuid;

#[tokio::test]
async fn submit_creates_a_pending_bid() {
    let db = setup_db().await;
    let client = seed_user(&db, "Client").await;
    let freelancer = seed_user(&db, "Freelancer").await;
    let gig = seed_gig(&db, &client, "Podcast editing").await;

    let mut input = bid_input(gig.id, 0.0);
    input.proposal = "  Happy to do this pro bono.  ".to_string();
    let bid = submit_bid(&db, freelancer.id, input).await.unwrap();

    assert_eq!(bid.status, BidStatus::Pending);
    assert_eq!(bid.gig_id, gig.id);
    assert_eq!(bid.freelancer_id, freelancer.id);
    assert_eq!(bid.proposal, "Happy to do this pro bono.");
    assert_eq!(bid.amount, 0.0);
}

#[tokio::test]
async fn owner_cannot_bid_on_own_gig() {
    let db = setup_db().await;
    let client = seed_user(&db, "Client").await;
    let gig = seed_gig(&db, &client, "Self bidding").await;

    let err = submit_bid(&db, client.id, bid_input(gig.id, 100.0))
        .await
        .unwrap_err();
    assert!(matches!(err, MarketError::Forbidden(_)), "got {err:?}");
    assert!(get_bids_by_gig(&db, gig.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn second_bid_from_same_freelancer_conflicts() {
    let db = setup_db().await;
    let client = seed_user(&db, "Client").await;
    let freelancer = seed_user(&db, "Freelancer").await;
    let gig = seed_gig(&db, &client, "Duplicate bids").await;
    let original = seed_bid(&db, &gig, &freelancer, 100.0).await;

    let err = submit_bid(&db, freelancer.id, bid_input(gig.id, 90.0))
        .await
        .unwrap_err();
    assert!(matches!(err, MarketError::Conflict(_)), "got {err:?}");

    let bids = get_bids_by_gig(&db, gig.id).await.unwrap();
    assert_eq!(bids, vec![original]);
}

#[tokio::test]
async fn bidding_on_missing_or_closed_gig_fails() {
    let db = setup_db().await;
    let client = seed_user(&db, "Client").await;
    let freelancer = seed_user(&db, "Freelancer").await;

    let err = submit_bid(&db, freelancer.id, bid_input(Uuid::new_v4(), 10.0))
        .await
        .unwrap_err();
    assert!(matches!(err, MarketError::NotFound(_)), "got {err:?}");

    let gig = seed_gig(&db, &client, "Closed for bids").await;
    cancel_gig(&db, gig.id, client.id).await.unwrap();

    let err = submit_bid(&db, freelancer.id, bid_input(gig.id, 10.0))
        .await
        .unwrap_err();
    assert!(matches!(err, MarketError::InvalidState(_)), "got {err:?}");
}

#[tokio::test]
async fn bidding_after_hire_is_invalid_state() {
    let db = setup_db().await;
    let presence = PresenceHub::new();
    let client = seed_user(&db, "Client").await;
    let gig = seed_gig(&db, &client, "Already filled").await;
    let bid = seed_bid(&db, &gig, &seed_user(&db, "Early").await, 10.0).await;
    hire_bid(&db, &presence, bid.id, client.id).await.unwrap();

    let late = seed_user(&db, "Late").await;
    let err = submit_bid(&db, late.id, bid_input(gig.id, 5.0))
        .await
        .unwrap_err();
    assert!(matches!(err, MarketError::InvalidState(_)), "got {err:?}");
}

#[tokio::test]
async fn submit_validates_fields() {
    let db = setup_db().await;
    let client = seed_user(&db, "Client").await;
    let freelancer = seed_user(&db, "Freelancer").await;
    let gig = seed_gig(&db, &client, "Validation gig").await;

    let mut empty = bid_input(gig.id, 10.0);
    empty.proposal = "   ".to_string();
    let mut long = bid_input(gig.id, 10.0);
    long.proposal = "p".repeat(1001);
    let negative = bid_input(gig.id, -1.0);
    let mut zero_days = bid_input(gig.id, 10.0);
    zero_days.estimated_days = 0;

    for input in [empty, long, negative, zero_days] {
        let err = submit_bid(&db, freelancer.id, input).await.unwrap_err();
        assert!(matches!(err, MarketError::Validation(_)), "got {err:?}");
    }
}

#[tokio::test]
async fn bidder_can_edit_pending_bid() {
    let db = setup_db().await;
    let client = seed_user(&db, "Client").await;
    let freelancer = seed_user(&db, "Freelancer").await;
    let gig = seed_gig(&db, &client, "Editable bid").await;
    let bid = seed_bid(&db, &gig, &freelancer, 100.0).await;

    let updated = edit_bid(
        &db,
        bid.id,
        freelancer.id,
        UpdateBid {
            amount: Some(80.0),
            ..Default::default()
        },
    )
    .await
    .unwrap();

    assert_eq!(updated.amount, 80.0);
    assert_eq!(updated.proposal, bid.proposal);
    assert_eq!(updated.status, BidStatus::Pending);
}

#[tokio::test]
async fn only_the_bidder_can_edit_or_withdraw() {
    let db = setup_db().await;
    let client = seed_user(&db, "Client").await;
    let freelancer = seed_user(&db, "Freelancer").await;
    let gig = seed_gig(&db, &client, "Guarded bid").await;
    let bid = seed_bid(&db, &gig, &freelancer, 100.0).await;

    let err = edit_bid(
        &db,
        bid.id,
        client.id,
        UpdateBid {
            amount: Some(1.0),
            ..Default::default()
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, MarketError::Forbidden(_)), "got {err:?}");

    let err = withdraw_bid(&db, bid.id, client.id).await.unwrap_err();
    assert!(matches!(err, MarketError::Forbidden(_)), "got {err:?}");
    assert!(get_bid_by_id(&db, bid.id).await.unwrap().is_some());
}

#[tokio::test]
async fn resolved_bids_cannot_be_edited_or_withdrawn() {
    let db = setup_db().await;
    let presence = PresenceHub::new();
    let client = seed_user(&db, "Client").await;
    let winner = seed_user(&db, "Winner").await;
    let loser = seed_user(&db, "Loser").await;
    let gig = seed_gig(&db, &client, "Resolved bids").await;
    let won = seed_bid(&db, &gig, &winner, 100.0).await;
    let lost = seed_bid(&db, &gig, &loser, 120.0).await;
    hire_bid(&db, &presence, won.id, client.id).await.unwrap();

    let err = edit_bid(
        &db,
        won.id,
        winner.id,
        UpdateBid {
            amount: Some(1_000.0),
            ..Default::default()
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, MarketError::InvalidState(_)), "got {err:?}");

    let err = withdraw_bid(&db, lost.id, loser.id).await.unwrap_err();
    assert!(matches!(err, MarketError::InvalidState(_)), "got {err:?}");

    let won_after = get_bid_by_id(&db, won.id).await.unwrap().unwrap();
    assert_eq!(won_after.status, BidStatus::Hired);
    assert_eq!(won_after.amount, 100.0);
    assert!(get_bid_by_id(&db, lost.id).await.unwrap().is_some());
}

#[tokio::test]
async fn withdraw_removes_pending_bid_and_allows_a_new_one() {
    let db = setup_db().await;
    let client = seed_user(&db, "Client").await;
    let freelancer = seed_user(&db, "Freelancer").await;
    let gig = seed_gig(&db, &client, "Second thoughts").await;
    let bid = seed_bid(&db, &gig, &freelancer, 100.0).await;

    withdraw_bid(&db, bid.id, freelancer.id).await.unwrap();
    assert!(get_bid_by_id(&db, bid.id).await.unwrap().is_none());

    let again = seed_bid(&db, &gig, &freelancer, 95.0).await;
    assert_eq!(again.status, BidStatus::Pending);

    let err = withdraw_bid(&db, bid.id, freelancer.id).await.unwrap_err();
    assert!(matches!(err, MarketError::NotFound(_)), "got {err:?}");
}

#[tokio::test]
async fn only_gig_owner_sees_bids_on_a_gig() {
    let db = setup_db().await;
    let client = seed_user(&db, "Client").await;
    let freelancer = seed_user(&db, "Freelancer").await;
    let gig = seed_gig(&db, &client, "Private bids").await;
    seed_bid(&db, &gig, &freelancer, 100.0).await;

    let views = bids_for_gig(&db, gig.id, client.id).await.unwrap();
    assert_eq!(views.len(), 1);
    assert_eq!(views[0].gig_title.as_deref(), Some("Private bids"));
    assert_eq!(
        views[0].freelancer.as_ref().map(|f| f.id),
        Some(freelancer.id)
    );
    assert_eq!(views[0].status_label, "Pending");

    let err = bids_for_gig(&db, gig.id, freelancer.id).await.unwrap_err();
    assert!(matches!(err, MarketError::Forbidden(_)), "got {err:?}");
}

#[tokio::test]
async fn my_bids_lists_the_callers_bids_across_gigs() {
    let db = setup_db().await;
    let client = seed_user(&db, "Client").await;
    let freelancer = seed_user(&db, "Freelancer").await;
    let someone = seed_user(&db, "Someone").await;
    let g1 = seed_gig(&db, &client, "First gig here").await;
    let g2 = seed_gig(&db, &client, "Second gig here").await;
    seed_bid(&db, &g1, &freelancer, 10.0).await;
    seed_bid(&db, &g2, &freelancer, 20.0).await;
    seed_bid(&db, &g2, &someone, 30.0).await;

    let mine = my_bids(&db, freelancer.id).await.unwrap();
    assert_eq!(mine.len(), 2);
    assert!(mine.iter().all(|v| v.bid.freelancer_id == freelancer.id));
    let titles: Vec<_> = mine.iter().filter_map(|v| v.gig_title.clone()).collect();
    assert!(titles.contains(&"First gig here".to_string()));
    assert!(titles.contains(&"Second gig here".to_string()));
}

#[test]
fn legacy_accepted_status_reads_as_hired() {
    assert_eq!(BidStatus::parse_legacy("accepted"), Some(BidStatus::Hired));
    assert_eq!(BidStatus::parse_legacy("Hired"), Some(BidStatus::Hired));
    assert_eq!(BidStatus::parse_legacy("pending"), Some(BidStatus::Pending));
    assert_eq!(BidStatus::parse_legacy("withdrawn"), None);
    assert_eq!(BidStatus::Hired.display_label(), "Hired");
    assert!(BidStatus::Rejected.is_terminal());
    assert!(!BidStatus::Pending.is_terminal());
}
