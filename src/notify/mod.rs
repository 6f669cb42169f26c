pub mod dispatch;
pub mod presence;
pub mod protocol;
pub mod session;

pub use presence::{ConnectionHandle, Delivery, Presence, PresenceHub};
pub use protocol::ServerEvent;
