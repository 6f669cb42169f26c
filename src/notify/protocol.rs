use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Events the server pushes to a connected user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerEvent {
    /// The recipient's bid won the gig.
    #[serde(rename_all = "camelCase")]
    Hired {
        gig_id: Uuid,
        gig_title: String,
        message: String,
    },
}

impl ServerEvent {
    pub fn hired(gig_id: Uuid, gig_title: &str) -> Self {
        Self::Hired {
            gig_id,
            gig_title: gig_title.to_string(),
            message: format!("You have been hired for \"{gig_title}\""),
        }
    }
}
