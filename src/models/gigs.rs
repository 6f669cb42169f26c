use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::users::PartyView;

/// Gig lifecycle: `open → assigned → in-progress → completed`, or `open → cancelled`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumIter, DeriveActiveEnum,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
#[serde(rename_all = "kebab-case")]
pub enum GigStatus {
    #[sea_orm(string_value = "open")]
    Open,
    #[sea_orm(string_value = "assigned")]
    Assigned,
    #[sea_orm(string_value = "in-progress")]
    InProgress,
    #[sea_orm(string_value = "completed")]
    Completed,
    #[sea_orm(string_value = "cancelled")]
    Cancelled,
}

impl GigStatus {
    /// Only open gigs take new bids or owner edits.
    pub fn is_open(&self) -> bool {
        matches!(self, Self::Open)
    }

    /// States in which `accepted_bid` must be set.
    pub fn has_assignment(&self) -> bool {
        matches!(self, Self::Assigned | Self::InProgress | Self::Completed)
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "open" => Some(Self::Open),
            "assigned" => Some(Self::Assigned),
            "in-progress" => Some(Self::InProgress),
            "completed" => Some(Self::Completed),
            "cancelled" => Some(Self::Cancelled),
            _ => None,
        }
    }
}

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, EnumIter, DeriveActiveEnum,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
#[serde(rename_all = "snake_case")]
pub enum Category {
    #[sea_orm(string_value = "web_development")]
    WebDevelopment,
    #[sea_orm(string_value = "mobile_development")]
    MobileDevelopment,
    #[sea_orm(string_value = "data_science")]
    DataScience,
    #[sea_orm(string_value = "design")]
    Design,
    #[sea_orm(string_value = "video_editing")]
    VideoEditing,
    #[sea_orm(string_value = "content_writing")]
    ContentWriting,
    #[default]
    #[sea_orm(string_value = "other")]
    Other,
}

/// SeaORM entity for the `gigs` table.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "gigs")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub title: String,
    #[sea_orm(column_type = "Text")]
    pub description: String,
    #[sea_orm(column_type = "Double")]
    pub budget: f64,
    pub category: Category,
    pub deadline: Option<chrono::NaiveDate>,
    pub status: GigStatus,
    pub client_id: Uuid,
    pub accepted_bid: Option<Uuid>,
    pub created_at: DateTimeUtc,
    pub updated_at: Option<DateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::bids::Entity")]
    Bids,
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::ClientId",
        to = "super::users::Column::Id"
    )]
    Client,
}

impl Related<super::bids::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Bids.def()
    }
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Client.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

// ── DTOs ──

#[derive(Debug, Clone, Deserialize)]
pub struct CreateGig {
    pub title: String,
    pub description: String,
    pub budget: f64,
    pub category: Option<Category>,
    pub deadline: Option<chrono::NaiveDate>,
}

/// Owner edits. Status and the accepted bid only change through cancel and hire.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateGig {
    pub title: Option<String>,
    pub description: Option<String>,
    pub budget: Option<f64>,
    pub category: Option<Category>,
    pub deadline: Option<chrono::NaiveDate>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GigListQuery {
    /// Absent means `open`; `all` lifts the status filter.
    pub status: Option<String>,
    pub category: Option<Category>,
    pub search: Option<String>,
    pub limit: Option<u64>,
    pub cursor_created_at: Option<chrono::DateTime<chrono::Utc>>,
    pub cursor_id: Option<Uuid>,
}

impl GigListQuery {
    pub fn limit(&self) -> u64 {
        self.limit.unwrap_or(20).clamp(1, 100)
    }
}

/// Position after the last gig of a page; pass it back to continue the listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GigCursor {
    pub cursor_created_at: DateTimeUtc,
    pub cursor_id: Uuid,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GigView {
    #[serde(flatten)]
    pub gig: Model,
    pub client: Option<PartyView>,
}

#[derive(Debug, Clone, Serialize)]
pub struct GigPage {
    pub items: Vec<GigView>,
    pub next_cursor: Option<GigCursor>,
}
