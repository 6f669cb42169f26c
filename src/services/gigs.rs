//! Gig lifecycle: creation, owner edits, cancellation, deletion and listing.
//!
//! A gig only changes while `open`. Moving it to `assigned` belongs to the
//! hire transition in [`super::hire`]; nothing here touches `accepted_bid`.

use sea_orm::{ConnectionTrait, TransactionSession, TransactionTrait};
use uuid::Uuid;

use crate::auth::authorization::ensure_gig_owner;
use crate::db::bids as bid_db;
use crate::db::gigs::{self as gig_db, GigFilter};
use crate::error::{MarketError, MarketResult};
use crate::models::gigs::{
    self, CreateGig, GigCursor, GigListQuery, GigPage, GigStatus, GigView, UpdateGig,
};
use crate::services::views;

pub const TITLE_MIN: usize = 5;
pub const TITLE_MAX: usize = 100;
pub const DESCRIPTION_MIN: usize = 20;
pub const DESCRIPTION_MAX: usize = 2000;

fn validate_title(title: &str) -> MarketResult<String> {
    let title = title.trim();
    let len = title.chars().count();
    if len < TITLE_MIN {
        return Err(MarketError::Validation(format!(
            "Title must be at least {TITLE_MIN} characters long"
        )));
    }
    if len > TITLE_MAX {
        return Err(MarketError::Validation(format!(
            "Title cannot be more than {TITLE_MAX} characters"
        )));
    }
    Ok(title.to_string())
}

fn validate_description(description: &str) -> MarketResult<String> {
    let description = description.trim();
    let len = description.chars().count();
    if len < DESCRIPTION_MIN {
        return Err(MarketError::Validation(format!(
            "Description must be at least {DESCRIPTION_MIN} characters long"
        )));
    }
    if len > DESCRIPTION_MAX {
        return Err(MarketError::Validation(format!(
            "Description cannot be more than {DESCRIPTION_MAX} characters"
        )));
    }
    Ok(description.to_string())
}

fn validate_budget(budget: f64) -> MarketResult<f64> {
    if budget.is_finite() && budget > 0.0 {
        Ok(budget)
    } else {
        Err(MarketError::Validation(
            "Budget must be a valid number greater than 0".to_string(),
        ))
    }
}

/// Trim and bound-check a new gig.
pub fn validate_new_gig(input: CreateGig) -> MarketResult<CreateGig> {
    Ok(CreateGig {
        title: validate_title(&input.title)?,
        description: validate_description(&input.description)?,
        budget: validate_budget(input.budget)?,
        category: input.category,
        deadline: input.deadline,
    })
}

/// Same bounds as creation, applied only to the fields being changed.
pub fn validate_gig_changes(input: UpdateGig) -> MarketResult<UpdateGig> {
    Ok(UpdateGig {
        title: input.title.as_deref().map(validate_title).transpose()?,
        description: input
            .description
            .as_deref()
            .map(validate_description)
            .transpose()?,
        budget: input.budget.map(validate_budget).transpose()?,
        category: input.category,
        deadline: input.deadline,
    })
}

pub async fn create_gig<C: ConnectionTrait>(
    db: &C,
    client_id: Uuid,
    input: CreateGig,
) -> MarketResult<gigs::Model> {
    let input = validate_new_gig(input)?;
    let gig = gig_db::insert_gig(db, input, client_id).await?;
    tracing::info!(gig_id = %gig.id, %client_id, "gig created");
    Ok(gig)
}

async fn load_gig<C: ConnectionTrait>(db: &C, gig_id: Uuid) -> MarketResult<gigs::Model> {
    gig_db::get_gig_by_id(db, gig_id)
        .await?
        .ok_or_else(|| MarketError::NotFound(format!("Gig {gig_id} not found")))
}

fn ensure_editable(gig: &gigs::Model) -> MarketResult<()> {
    if gig.accepted_bid.is_some() {
        return Err(MarketError::InvalidState(
            "Cannot update a gig with an accepted bid".to_string(),
        ));
    }
    if !gig.status.is_open() {
        return Err(MarketError::InvalidState(format!(
            "Cannot update a gig that is {}",
            status_name(gig.status)
        )));
    }
    Ok(())
}

fn status_name(status: GigStatus) -> &'static str {
    match status {
        GigStatus::Open => "open",
        GigStatus::Assigned => "assigned",
        GigStatus::InProgress => "in progress",
        GigStatus::Completed => "completed",
        GigStatus::Cancelled => "cancelled",
    }
}

/// Owner edit of an open, unassigned gig.
pub async fn edit_gig<C: ConnectionTrait>(
    db: &C,
    gig_id: Uuid,
    actor_id: Uuid,
    input: UpdateGig,
) -> MarketResult<gigs::Model> {
    let gig = load_gig(db, gig_id).await?;
    ensure_gig_owner(&gig, actor_id, "update this gig")?;
    ensure_editable(&gig)?;

    let changes = validate_gig_changes(input)?;
    if gig_db::update_open_gig(db, gig_id, changes).await? == 0 {
        // Hired, cancelled or deleted between the read and the write.
        return Err(MarketError::InvalidState(
            "Gig is no longer open for edits".to_string(),
        ));
    }

    load_gig(db, gig_id).await
}

/// `open → cancelled`. Pending bids stay as they are and can still be withdrawn.
pub async fn cancel_gig<C: ConnectionTrait>(
    db: &C,
    gig_id: Uuid,
    actor_id: Uuid,
) -> MarketResult<gigs::Model> {
    let gig = load_gig(db, gig_id).await?;
    ensure_gig_owner(&gig, actor_id, "cancel this gig")?;
    if !gig.status.is_open() {
        return Err(MarketError::InvalidState(format!(
            "Only open gigs can be cancelled; this gig is {}",
            status_name(gig.status)
        )));
    }

    if gig_db::cancel_open_gig(db, gig_id).await? == 0 {
        return Err(MarketError::InvalidState(
            "Gig is no longer open".to_string(),
        ));
    }

    tracing::info!(%gig_id, "gig cancelled");
    load_gig(db, gig_id).await
}

/// Delete an open gig together with every bid on it, in one transaction.
pub async fn delete_gig<C>(db: &C, gig_id: Uuid, actor_id: Uuid) -> MarketResult<()>
where
    C: ConnectionTrait + TransactionTrait,
{
    let txn = db.begin().await?;

    // Gig row first, then its bids: the same order the hire takes.
    let gig = gig_db::get_gig_for_update(&txn, gig_id)
        .await?
        .ok_or_else(|| MarketError::NotFound(format!("Gig {gig_id} not found")))?;
    ensure_gig_owner(&gig, actor_id, "delete this gig")?;
    if !gig.status.is_open() {
        return Err(MarketError::InvalidState(format!(
            "Only open gigs can be deleted; this gig is {}",
            status_name(gig.status)
        )));
    }

    let removed_bids = bid_db::delete_bids_by_gig(&txn, gig_id).await?;
    if gig_db::delete_open_gig(&txn, gig_id).await? == 0 {
        txn.rollback().await?;
        return Err(MarketError::InvalidState(
            "Gig is no longer open".to_string(),
        ));
    }

    txn.commit().await?;
    tracing::info!(%gig_id, removed_bids, "gig deleted");
    Ok(())
}

/// `None` lifts the status filter.
pub fn status_filter(raw: Option<&str>) -> MarketResult<Option<GigStatus>> {
    match raw.map(str::trim) {
        None | Some("") => Ok(Some(GigStatus::Open)),
        Some("all") => Ok(None),
        Some(other) => GigStatus::parse(other)
            .map(Some)
            .ok_or_else(|| MarketError::Validation(format!("Unknown gig status: {other}"))),
    }
}

/// One page of the public listing. Open gigs only unless a status is asked for.
pub async fn list_gigs<C: ConnectionTrait>(
    db: &C,
    query: &GigListQuery,
) -> MarketResult<GigPage> {
    let filter = GigFilter {
        status: status_filter(query.status.as_deref())?,
        category: query.category,
        search: query
            .search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string),
    };

    let cursor = match (query.cursor_created_at, query.cursor_id) {
        (Some(cursor_created_at), Some(cursor_id)) => Some(GigCursor {
            cursor_created_at,
            cursor_id,
        }),
        (None, None) => None,
        _ => {
            return Err(MarketError::Validation(
                "cursor_created_at and cursor_id must be given together".to_string(),
            ));
        }
    };

    let limit = query.limit();
    // One extra row tells us whether another page exists.
    let mut rows = gig_db::list_gigs(db, &filter, limit + 1, cursor).await?;
    let has_more = rows.len() as u64 > limit;
    rows.truncate(limit as usize);

    let next_cursor = if has_more {
        rows.last().map(|g| GigCursor {
            cursor_created_at: g.created_at,
            cursor_id: g.id,
        })
    } else {
        None
    };

    Ok(GigPage {
        items: views::gig_views(db, rows).await?,
        next_cursor,
    })
}

pub async fn get_gig<C: ConnectionTrait>(db: &C, gig_id: Uuid) -> MarketResult<GigView> {
    let gig = load_gig(db, gig_id).await?;
    views::gig_view(db, gig).await
}

/// Every gig the caller owns, whatever its status.
pub async fn my_gigs<C: ConnectionTrait>(db: &C, client_id: Uuid) -> MarketResult<Vec<gigs::Model>> {
    Ok(gig_db::get_gigs_by_client(db, client_id).await?)
}
