use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::users::PartyView;

/// Bid status stored as a lowercase string in the database.
///
/// `pending` is the only non-terminal state. Rows written by older releases
/// may say `accepted`; the legacy migration rewrites them to `hired`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumIter, DeriveActiveEnum,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
#[serde(rename_all = "snake_case")]
pub enum BidStatus {
    #[sea_orm(string_value = "pending")]
    Pending,
    #[sea_orm(string_value = "hired")]
    Hired,
    #[sea_orm(string_value = "rejected")]
    Rejected,
}

impl BidStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Pending)
    }

    /// Parses any spelling seen in the wild, folding `accepted` into `Hired`.
    pub fn parse_legacy(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "pending" => Some(Self::Pending),
            "hired" | "accepted" => Some(Self::Hired),
            "rejected" => Some(Self::Rejected),
            _ => None,
        }
    }

    pub fn display_label(&self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Hired => "Hired",
            Self::Rejected => "Rejected",
        }
    }
}

/// SeaORM entity for the `bids` table.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "bids")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub gig_id: Uuid,
    pub freelancer_id: Uuid,
    #[sea_orm(column_type = "Text")]
    pub proposal: String,
    #[sea_orm(column_type = "Double")]
    pub amount: f64,
    pub estimated_days: i32,
    pub status: BidStatus,
    pub created_at: DateTimeUtc,
    pub updated_at: Option<DateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::gigs::Entity",
        from = "Column::GigId",
        to = "super::gigs::Column::Id"
    )]
    Gig,
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::FreelancerId",
        to = "super::users::Column::Id"
    )]
    Freelancer,
}

impl Related<super::gigs::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Gig.def()
    }
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Freelancer.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

// ── DTOs ──

/// Request body for POST /api/bids. The bidder comes from the JWT.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateBid {
    pub gig_id: Uuid,
    pub proposal: String,
    pub amount: f64,
    pub estimated_days: i32,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateBid {
    pub proposal: Option<String>,
    pub amount: Option<f64>,
    pub estimated_days: Option<i32>,
}

/// A bid with the gig title and bidder identity resolved for display.
#[derive(Debug, Clone, Serialize)]
pub struct BidView {
    #[serde(flatten)]
    pub bid: Model,
    pub status_label: &'static str,
    pub gig_title: Option<String>,
    pub freelancer: Option<PartyView>,
}
