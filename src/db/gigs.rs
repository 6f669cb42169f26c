use sea_orm::prelude::Expr;
use sea_orm::sea_query::LikeExpr;
use sea_orm::*;
use uuid::Uuid;

use crate::models::gigs::{self, Category, CreateGig, GigCursor, GigStatus, UpdateGig};

/// Insert a new open gig. Input must already be validated.
pub async fn insert_gig<C: ConnectionTrait>(
    db: &C,
    input: CreateGig,
    client_id: Uuid,
) -> Result<gigs::Model, DbErr> {
    let new_gig = gigs::ActiveModel {
        id: Set(Uuid::new_v4()),
        title: Set(input.title),
        description: Set(input.description),
        budget: Set(input.budget),
        category: Set(input.category.unwrap_or_default()),
        deadline: Set(input.deadline),
        status: Set(GigStatus::Open),
        client_id: Set(client_id),
        accepted_bid: Set(None),
        created_at: Set(chrono::Utc::now()),
        updated_at: Set(None),
    };

    new_gig.insert(db).await
}

/// Fetch a single gig by ID.
pub async fn get_gig_by_id<C: ConnectionTrait>(
    db: &C,
    id: Uuid,
) -> Result<Option<gigs::Model>, DbErr> {
    gigs::Entity::find_by_id(id).one(db).await
}

/// Fetch a gig and hold a shared row lock until the surrounding transaction
/// ends, so the gig cannot leave `open` underneath the caller.
pub async fn get_gig_for_share<C: ConnectionTrait>(
    db: &C,
    id: Uuid,
) -> Result<Option<gigs::Model>, DbErr> {
    gigs::Entity::find_by_id(id).lock_shared().one(db).await
}

/// Fetch a gig and hold an exclusive row lock until the surrounding
/// transaction ends. Anything that writes both a gig and its bids takes this
/// (or the conditional gig update) before touching the bids.
pub async fn get_gig_for_update<C: ConnectionTrait>(
    db: &C,
    id: Uuid,
) -> Result<Option<gigs::Model>, DbErr> {
    gigs::Entity::find_by_id(id).lock_exclusive().one(db).await
}

/// Fetch gigs by ID, in no particular order.
pub async fn get_gigs_by_ids<C: ConnectionTrait>(
    db: &C,
    ids: Vec<Uuid>,
) -> Result<Vec<gigs::Model>, DbErr> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }

    gigs::Entity::find()
        .filter(gigs::Column::Id.is_in(ids))
        .all(db)
        .await
}

/// Fetch all gigs owned by a client, newest first.
pub async fn get_gigs_by_client<C: ConnectionTrait>(
    db: &C,
    client_id: Uuid,
) -> Result<Vec<gigs::Model>, DbErr> {
    gigs::Entity::find()
        .filter(gigs::Column::ClientId.eq(client_id))
        .order_by_desc(gigs::Column::CreatedAt)
        .order_by_desc(gigs::Column::Id)
        .all(db)
        .await
}

/// Filter for the public listing. `status: None` means every status.
#[derive(Debug, Clone, Default)]
pub struct GigFilter {
    pub status: Option<GigStatus>,
    pub category: Option<Category>,
    pub search: Option<String>,
}

/// One page of gigs ordered by `(created_at, id)` descending, starting after `cursor`.
pub async fn list_gigs<C: ConnectionTrait>(
    db: &C,
    filter: &GigFilter,
    limit: u64,
    cursor: Option<GigCursor>,
) -> Result<Vec<gigs::Model>, DbErr> {
    let mut query = gigs::Entity::find();

    if let Some(status) = filter.status {
        query = query.filter(gigs::Column::Status.eq(status));
    }
    if let Some(category) = filter.category {
        query = query.filter(gigs::Column::Category.eq(category));
    }
    if let Some(search) = &filter.search {
        let pattern = contains_pattern(search);
        query = query.filter(
            Condition::any()
                .add(gigs::Column::Title.like(LikeExpr::new(pattern.clone()).escape('\\')))
                .add(gigs::Column::Description.like(LikeExpr::new(pattern).escape('\\'))),
        );
    }

    if let Some(cursor) = cursor {
        query = query.filter(
            Condition::any()
                .add(gigs::Column::CreatedAt.lt(cursor.cursor_created_at))
                .add(
                    Condition::all()
                        .add(gigs::Column::CreatedAt.eq(cursor.cursor_created_at))
                        .add(gigs::Column::Id.lt(cursor.cursor_id)),
                ),
        );
    }

    query
        .order_by_desc(gigs::Column::CreatedAt)
        .order_by_desc(gigs::Column::Id)
        .limit(limit)
        .all(db)
        .await
}

/// `%text%` with LIKE wildcards in `text` matched literally (escape char `\`).
fn contains_pattern(text: &str) -> String {
    let mut pattern = String::with_capacity(text.len() + 2);
    pattern.push('%');
    for c in text.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

/// Apply owner edits to a gig that is still open and unassigned.
///
/// Returns the number of rows touched; zero means the gig left `open`
/// (or vanished) after the caller last looked at it.
pub async fn update_open_gig<C: ConnectionTrait>(
    db: &C,
    id: Uuid,
    input: UpdateGig,
) -> Result<u64, DbErr> {
    let mut update = gigs::Entity::update_many()
        .col_expr(gigs::Column::UpdatedAt, Expr::value(chrono::Utc::now()));

    if let Some(title) = input.title {
        update = update.col_expr(gigs::Column::Title, Expr::value(title));
    }
    if let Some(description) = input.description {
        update = update.col_expr(gigs::Column::Description, Expr::value(description));
    }
    if let Some(budget) = input.budget {
        update = update.col_expr(gigs::Column::Budget, Expr::value(budget));
    }
    if let Some(category) = input.category {
        update = update.col_expr(gigs::Column::Category, Expr::value(category));
    }
    if let Some(deadline) = input.deadline {
        update = update.col_expr(gigs::Column::Deadline, Expr::value(deadline));
    }

    let result = update
        .filter(gigs::Column::Id.eq(id))
        .filter(gigs::Column::Status.eq(GigStatus::Open))
        .filter(gigs::Column::AcceptedBid.is_null())
        .exec(db)
        .await?;

    Ok(result.rows_affected)
}

/// Move an open gig to `cancelled`. Returns rows affected (0 or 1).
pub async fn cancel_open_gig<C: ConnectionTrait>(db: &C, id: Uuid) -> Result<u64, DbErr> {
    let result = gigs::Entity::update_many()
        .col_expr(gigs::Column::Status, Expr::value(GigStatus::Cancelled))
        .col_expr(gigs::Column::UpdatedAt, Expr::value(chrono::Utc::now()))
        .filter(gigs::Column::Id.eq(id))
        .filter(gigs::Column::Status.eq(GigStatus::Open))
        .exec(db)
        .await?;

    Ok(result.rows_affected)
}

/// Claim an open gig for a bid: `open → assigned` with `accepted_bid` set.
///
/// The `status = open` guard makes this the serialization point for
/// concurrent hires; the loser sees 0 rows affected.
pub async fn assign_open_gig<C: ConnectionTrait>(
    db: &C,
    id: Uuid,
    bid_id: Uuid,
    now: chrono::DateTime<chrono::Utc>,
) -> Result<u64, DbErr> {
    let result = gigs::Entity::update_many()
        .col_expr(gigs::Column::Status, Expr::value(GigStatus::Assigned))
        .col_expr(gigs::Column::AcceptedBid, Expr::value(bid_id))
        .col_expr(gigs::Column::UpdatedAt, Expr::value(now))
        .filter(gigs::Column::Id.eq(id))
        .filter(gigs::Column::Status.eq(GigStatus::Open))
        .filter(gigs::Column::AcceptedBid.is_null())
        .exec(db)
        .await?;

    Ok(result.rows_affected)
}

/// Delete a gig only while it is open. Returns rows affected (0 or 1).
pub async fn delete_open_gig<C: ConnectionTrait>(db: &C, id: Uuid) -> Result<u64, DbErr> {
    let result = gigs::Entity::delete_many()
        .filter(gigs::Column::Id.eq(id))
        .filter(gigs::Column::Status.eq(GigStatus::Open))
        .exec(db)
        .await?;

    Ok(result.rows_affected)
}
