//! Hire transition against a real (in-memory) database.
//!
//! Run with: `cargo test --test hire_test`
mod common;

use common::{seed_bid, seed_gig, seed_user, setup_db};
use gigflow_backend::db::bids::{get_bid_by_id, get_bids_by_gig};
use gigflow_backend::db::gigs::get_gig_by_id;
use gigflow_backend::error::MarketError;
use gigflow_backend::models::bids::{self, BidStatus};
use gigflow_backend::models::gigs::GigStatus;
use gigflow_backend::notify::{ConnectionHandle, Presence, PresenceHub, ServerEvent};
use gigflow_backend::services::hire::hire_bid;
use sea_orm::{ActiveModelTrait, DatabaseConnection, IntoActiveModel, Set};
use uuid::Uuid;

async fn bid_status(db: &DatabaseConnection, id: Uuid) -> BidStatus {
    get_bid_by_id(db, id).await.unwrap().unwrap().status
}

#[tokio::test]
async fn hire_assigns_gig_and_rejects_the_other_bid() {
    let db = setup_db().await;
    let presence = PresenceHub::new();
    let client = seed_user(&db, "Client").await;
    let f1 = seed_user(&db, "Fiona").await;
    let f2 = seed_user(&db, "Farid").await;

    let gig = seed_gig(&db, &client, "Landing page").await;
    let b1 = seed_bid(&db, &gig, &f1, 450.0).await;
    let b2 = seed_bid(&db, &gig, &f2, 480.0).await;

    let outcome = hire_bid(&db, &presence, b1.id, client.id).await.unwrap();

    assert_eq!(outcome.gig.gig.status, GigStatus::Assigned);
    assert_eq!(outcome.gig.gig.accepted_bid, Some(b1.id));
    assert_eq!(outcome.bid.bid.status, BidStatus::Hired);
    assert_eq!(outcome.bid.status_label, "Hired");
    assert_eq!(outcome.bid.gig_title.as_deref(), Some("Landing page"));

    let stored = get_gig_by_id(&db, gig.id).await.unwrap().unwrap();
    assert_eq!(stored.status, GigStatus::Assigned);
    assert!(stored.status.has_assignment());
    assert_eq!(stored.accepted_bid, Some(b1.id));
    assert_eq!(bid_status(&db, b1.id).await, BidStatus::Hired);
    assert_eq!(bid_status(&db, b2.id).await, BidStatus::Rejected);
}

#[tokio::test]
async fn hire_with_many_pending_bids_leaves_exactly_one_hired() {
    let db = setup_db().await;
    let presence = PresenceHub::new();
    let client = seed_user(&db, "Client").await;
    let gig = seed_gig(&db, &client, "Data pipeline").await;

    let mut bid_ids = Vec::new();
    for i in 0..5 {
        let freelancer = seed_user(&db, &format!("Freelancer{i}")).await;
        bid_ids.push(seed_bid(&db, &gig, &freelancer, 100.0 + i as f64).await.id);
    }

    hire_bid(&db, &presence, bid_ids[2], client.id).await.unwrap();

    let bids = get_bids_by_gig(&db, gig.id).await.unwrap();
    let hired: Vec<_> = bids.iter().filter(|b| b.status == BidStatus::Hired).collect();
    let rejected = bids.iter().filter(|b| b.status == BidStatus::Rejected).count();

    assert_eq!(hired.len(), 1);
    assert_eq!(hired[0].id, bid_ids[2]);
    assert_eq!(rejected, 4);
}

#[tokio::test]
async fn already_resolved_siblings_keep_their_status() {
    let db = setup_db().await;
    let presence = PresenceHub::new();
    let client = seed_user(&db, "Client").await;
    let gig = seed_gig(&db, &client, "Mobile app").await;

    let winner = seed_bid(&db, &gig, &seed_user(&db, "Winner").await, 300.0).await;
    let pending = seed_bid(&db, &gig, &seed_user(&db, "Pending").await, 310.0).await;
    let old = seed_bid(&db, &gig, &seed_user(&db, "Old").await, 320.0).await;
    let old_id = old.id;

    let before = chrono::Utc::now() - chrono::Duration::days(1);
    let mut rejected_earlier: bids::ActiveModel = old.into_active_model();
    rejected_earlier.status = Set(BidStatus::Rejected);
    rejected_earlier.updated_at = Set(Some(before));
    rejected_earlier.update(&db).await.unwrap();

    hire_bid(&db, &presence, winner.id, client.id).await.unwrap();

    assert_eq!(bid_status(&db, pending.id).await, BidStatus::Rejected);
    let untouched = get_bid_by_id(&db, old_id).await.unwrap().unwrap();
    assert_eq!(untouched.status, BidStatus::Rejected);
    assert_eq!(untouched.updated_at, Some(before));
}

#[tokio::test]
async fn second_hire_fails_with_invalid_state_and_changes_nothing() {
    let db = setup_db().await;
    let presence = PresenceHub::new();
    let client = seed_user(&db, "Client").await;
    let gig = seed_gig(&db, &client, "Logo design").await;
    let b1 = seed_bid(&db, &gig, &seed_user(&db, "One").await, 50.0).await;
    let b2 = seed_bid(&db, &gig, &seed_user(&db, "Two").await, 60.0).await;

    hire_bid(&db, &presence, b1.id, client.id).await.unwrap();
    let gig_after_first = get_gig_by_id(&db, gig.id).await.unwrap().unwrap();
    let b1_after_first = get_bid_by_id(&db, b1.id).await.unwrap().unwrap();

    // Same bid again.
    let err = hire_bid(&db, &presence, b1.id, client.id).await.unwrap_err();
    assert!(matches!(err, MarketError::InvalidState(_)), "got {err:?}");

    // A different bid.
    let err = hire_bid(&db, &presence, b2.id, client.id).await.unwrap_err();
    assert!(matches!(err, MarketError::InvalidState(_)), "got {err:?}");

    assert_eq!(get_gig_by_id(&db, gig.id).await.unwrap().unwrap(), gig_after_first);
    assert_eq!(get_bid_by_id(&db, b1.id).await.unwrap().unwrap(), b1_after_first);
    assert_eq!(bid_status(&db, b2.id).await, BidStatus::Rejected);
}

#[tokio::test]
async fn concurrent_hires_on_one_gig_let_only_one_win() {
    let db = setup_db().await;
    let presence = PresenceHub::new();
    let client = seed_user(&db, "Client").await;
    let gig = seed_gig(&db, &client, "Checkout flow").await;
    let b1 = seed_bid(&db, &gig, &seed_user(&db, "Racer1").await, 200.0).await;
    let b2 = seed_bid(&db, &gig, &seed_user(&db, "Racer2").await, 210.0).await;

    let (r1, r2) = tokio::join!(
        hire_bid(&db, &presence, b1.id, client.id),
        hire_bid(&db, &presence, b2.id, client.id),
    );

    let wins = [r1.is_ok(), r2.is_ok()].iter().filter(|ok| **ok).count();
    assert_eq!(wins, 1);
    let loser = if r1.is_ok() { r2 } else { r1 };
    assert!(matches!(loser, Err(MarketError::InvalidState(_))));

    let bids = get_bids_by_gig(&db, gig.id).await.unwrap();
    let hired: Vec<_> = bids.iter().filter(|b| b.status == BidStatus::Hired).collect();
    assert_eq!(hired.len(), 1);

    let stored = get_gig_by_id(&db, gig.id).await.unwrap().unwrap();
    assert_eq!(stored.accepted_bid, Some(hired[0].id));
}

#[tokio::test]
async fn hired_freelancer_receives_notification_when_connected() {
    let db = setup_db().await;
    let presence = PresenceHub::new();
    let client = seed_user(&db, "Client").await;
    let freelancer = seed_user(&db, "Online").await;
    let gig = seed_gig(&db, &client, "API integration").await;
    let bid = seed_bid(&db, &gig, &freelancer, 700.0).await;

    let (handle, mut rx) = ConnectionHandle::open();
    presence.register(freelancer.id, handle).await;

    hire_bid(&db, &presence, bid.id, client.id).await.unwrap();

    let event = rx.try_recv().expect("hire event should be queued");
    assert_eq!(event, ServerEvent::hired(gig.id, "API integration"));

    let json = serde_json::to_value(&event).unwrap();
    assert_eq!(json["type"], "hired");
    assert_eq!(json["gigId"], gig.id.to_string());
    assert_eq!(json["gigTitle"], "API integration");
    assert!(rx.try_recv().is_err(), "exactly one event");
}

#[tokio::test]
async fn hire_succeeds_when_freelancer_is_offline() {
    let db = setup_db().await;
    let presence = PresenceHub::new();
    let client = seed_user(&db, "Client").await;
    let freelancer = seed_user(&db, "Offline").await;
    let gig = seed_gig(&db, &client, "Email templates").await;
    let bid = seed_bid(&db, &gig, &freelancer, 90.0).await;

    assert!(!presence.is_connected(freelancer.id).await);
    let outcome = hire_bid(&db, &presence, bid.id, client.id).await.unwrap();
    assert_eq!(outcome.bid.bid.status, BidStatus::Hired);
}

#[tokio::test]
async fn hire_succeeds_when_freelancer_socket_already_closed() {
    let db = setup_db().await;
    let presence = PresenceHub::new();
    let client = seed_user(&db, "Client").await;
    let freelancer = seed_user(&db, "Gone").await;
    let gig = seed_gig(&db, &client, "Blog migration").await;
    let bid = seed_bid(&db, &gig, &freelancer, 120.0).await;

    let (handle, rx) = ConnectionHandle::open();
    presence.register(freelancer.id, handle).await;
    drop(rx);

    hire_bid(&db, &presence, bid.id, client.id).await.unwrap();
    assert!(!presence.is_connected(freelancer.id).await);
}

#[tokio::test]
async fn only_the_gig_owner_can_hire() {
    let db = setup_db().await;
    let presence = PresenceHub::new();
    let client = seed_user(&db, "Client").await;
    let stranger = seed_user(&db, "Stranger").await;
    let freelancer = seed_user(&db, "Bidder").await;
    let gig = seed_gig(&db, &client, "Dashboard").await;
    let bid = seed_bid(&db, &gig, &freelancer, 80.0).await;

    let err = hire_bid(&db, &presence, bid.id, stranger.id).await.unwrap_err();
    assert!(matches!(err, MarketError::Forbidden(_)), "got {err:?}");

    // The bidder cannot hire themselves either.
    let err = hire_bid(&db, &presence, bid.id, freelancer.id).await.unwrap_err();
    assert!(matches!(err, MarketError::Forbidden(_)), "got {err:?}");

    assert_eq!(bid_status(&db, bid.id).await, BidStatus::Pending);
    let stored = get_gig_by_id(&db, gig.id).await.unwrap().unwrap();
    assert_eq!(stored.status, GigStatus::Open);
    assert_eq!(stored.accepted_bid, None);
}

#[tokio::test]
async fn hiring_an_unknown_bid_is_not_found() {
    let db = setup_db().await;
    let presence = PresenceHub::new();
    let client = seed_user(&db, "Client").await;

    let err = hire_bid(&db, &presence, Uuid::new_v4(), client.id)
        .await
        .unwrap_err();
    assert!(matches!(err, MarketError::NotFound(_)), "got {err:?}");
}

#[tokio::test]
async fn cannot_hire_on_a_cancelled_gig() {
    let db = setup_db().await;
    let presence = PresenceHub::new();
    let client = seed_user(&db, "Client").await;
    let gig = seed_gig(&db, &client, "Translation").await;
    let bid = seed_bid(&db, &gig, &seed_user(&db, "Linguist").await, 40.0).await;

    gigflow_backend::services::gigs::cancel_gig(&db, gig.id, client.id)
        .await
        .unwrap();

    let err = hire_bid(&db, &presence, bid.id, client.id).await.unwrap_err();
    assert!(matches!(err, MarketError::InvalidState(_)), "got {err:?}");
    assert_eq!(bid_status(&db, bid.id).await, BidStatus::Pending);
}

#[tokio::test]
async fn rejected_bid_on_open_gig_cannot_be_hired() {
    let db = setup_db().await;
    let presence = PresenceHub::new();
    let client = seed_user(&db, "Client").await;
    let gig = seed_gig(&db, &client, "Newsletter template").await;
    let bid = seed_bid(&db, &gig, &seed_user(&db, "Writer").await, 90.0).await;
    let bid_id = bid.id;

    let mut rejected: bids::ActiveModel = bid.into_active_model();
    rejected.status = Set(BidStatus::Rejected);
    rejected.update(&db).await.unwrap();

    let err = hire_bid(&db, &presence, bid_id, client.id).await.unwrap_err();
    assert!(matches!(err, MarketError::InvalidState(_)), "got {err:?}");

    // The gig itself was open the whole time and stays that way.
    let stored = get_gig_by_id(&db, gig.id).await.unwrap().unwrap();
    assert_eq!(stored.status, GigStatus::Open);
    assert_eq!(stored.accepted_bid, None);
    assert_eq!(bid_status(&db, bid_id).await, BidStatus::Rejected);
}

#[tokio::test]
async fn stranger_on_an_assigned_gig_is_forbidden_not_invalid_state() {
    let db = setup_db().await;
    let presence = PresenceHub::new();
    let client = seed_user(&db, "Client").await;
    let stranger = seed_user(&db, "Stranger").await;
    let gig = seed_gig(&db, &client, "Pitch deck").await;
    let winner = seed_bid(&db, &gig, &seed_user(&db, "Designer").await, 150.0).await;
    let other = seed_bid(&db, &gig, &seed_user(&db, "Illustrator").await, 160.0).await;

    hire_bid(&db, &presence, winner.id, client.id).await.unwrap();

    // Ownership is checked before the gig state, so the gig's status is not
    // revealed to someone who does not own it.
    for bid_id in [winner.id, other.id] {
        let err = hire_bid(&db, &presence, bid_id, stranger.id).await.unwrap_err();
        assert!(matches!(err, MarketError::Forbidden(_)), "got {err:?}");
    }
}

#[tokio::test]
async fn concurrent_delete_and_hire_leave_a_consistent_gig() {
    let db = setup_db().await;
    let presence = PresenceHub::new();
    let client = seed_user(&db, "Client").await;
    let gig = seed_gig(&db, &client, "Booking widget").await;
    let target = seed_bid(&db, &gig, &seed_user(&db, "Builder").await, 250.0).await;
    for i in 0..3 {
        seed_bid(&db, &gig, &seed_user(&db, &format!("Other{i}")).await, 260.0 + i as f64).await;
    }

    let (hired, deleted) = tokio::join!(
        hire_bid(&db, &presence, target.id, client.id),
        gigflow_backend::services::gigs::delete_gig(&db, gig.id, client.id),
    );

    assert!(
        hired.is_ok() != deleted.is_ok(),
        "exactly one side must win: hire {hired:?}, delete {deleted:?}"
    );

    let stored = get_gig_by_id(&db, gig.id).await.unwrap();
    let bids = get_bids_by_gig(&db, gig.id).await.unwrap();
    match hired {
        Ok(_) => {
            let err = deleted.unwrap_err();
            assert!(matches!(err, MarketError::InvalidState(_)), "got {err:?}");

            let stored = stored.expect("assigned gig survives");
            assert_eq!(stored.status, GigStatus::Assigned);
            assert_eq!(stored.accepted_bid, Some(target.id));
            assert_eq!(bids.len(), 4);
            assert_eq!(bids.iter().filter(|b| b.status == BidStatus::Hired).count(), 1);
        }
        Err(err) => {
            assert!(
                matches!(err, MarketError::NotFound(_) | MarketError::InvalidState(_)),
                "got {err:?}"
            );
            assert!(stored.is_none());
            assert!(bids.is_empty());
        }
    }
}
